//! The model import dialog.
//!
//! Thin egui wiring over [`ImportWorkflow`]: the file picker stages,
//! the Import button confirms, closing the dialog discards staged work.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::assets::{AssetImported, AssetRegistry, ModelImporter};
use crate::editor::{ImportContext, ImportWorkflow};
use crate::shaders::ShaderProviders;

use super::EditorNotices;

/// Extensions offered by the file picker. Extension-less files also pass
/// the staging filter but cannot be expressed as a picker filter.
fn picker_extensions() -> Vec<&'static str> {
    crate::assets::SUPPORTED_MODEL_FORMATS
        .iter()
        .copied()
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[derive(Resource, Default)]
pub struct ImportDialogState {
    pub is_open: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn import_dialog_ui(
    mut contexts: EguiContexts,
    mut dialog: ResMut<ImportDialogState>,
    mut workflow: ResMut<ImportWorkflow>,
    importer: Res<ModelImporter>,
    mut registry: ResMut<AssetRegistry>,
    mut shaders: ResMut<ShaderProviders>,
    mut notices: ResMut<EditorNotices>,
    mut imported_events: MessageWriter<AssetImported>,
) -> Result {
    if !dialog.is_open {
        return Ok(());
    }

    let mut should_close = false;

    egui::Window::new("Import Model")
        .collapsible(false)
        .resizable(true)
        .default_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label(egui::RichText::new("Import 3D models into the project").size(14.0));
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("Project: {}", registry.root().display()))
                    .weak()
                    .small(),
            );
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(
                    "The recommended format is separate .gltf (bin file, gltf file, \
                     external textures). Binary .glb and embedded .gltf import without \
                     automatic material attributes.",
                )
                .weak()
                .small(),
            );

            ui.separator();

            if ui.button("Browse Files...").clicked()
                && let Some(picked) = rfd::FileDialog::new()
                    .add_filter("3D Models", &picker_extensions())
                    .set_title("Select models to import")
                    .pick_files()
            {
                for path in picked {
                    if let Err(e) = workflow.stage(&importer, &path) {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        notices.error(format!("{name}: {e}"));
                    }
                }
            }

            if let Some(folder) = workflow.picked().last().and_then(|p| p.parent()) {
                ui.label(
                    egui::RichText::new(format!("Picked from: {}", folder.display()))
                        .weak()
                        .small(),
                );
            }

            if !workflow.is_empty() {
                ui.separator();
                ui.label(format!("Staged {} model(s):", workflow.staged().len()));
                egui::ScrollArea::vertical()
                    .max_height(150.0)
                    .show(ui, |ui| {
                        for staged in workflow.staged() {
                            if let Some(name) = staged.file.file_name() {
                                ui.label(format!(
                                    "  {}  ({} dependencies, {} bones)",
                                    name.to_string_lossy(),
                                    staged.dependencies.len(),
                                    staged.info.num_bones,
                                ));
                            }
                        }
                    });
            }

            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Import").clicked() {
                    let mut ctx = ImportContext {
                        registry: &mut registry,
                        importer: &importer,
                        shaders: &mut shaders,
                    };
                    match workflow.confirm_import(&mut ctx) {
                        Ok(report) => {
                            for outcome in &report.outcomes {
                                match &outcome.result {
                                    Ok(asset) => {
                                        imported_events.write(AssetImported {
                                            id: asset.id.clone(),
                                            name: asset.name.clone(),
                                        });
                                        notices.success(format!("Model imported: {}", asset.name));
                                    }
                                    Err(e) => {
                                        notices.error(format!("{}: {e}", outcome.source_name));
                                    }
                                }
                            }
                            if let Some(bones) = report.shader_rebuilt {
                                notices.info(format!("Max bone count increased to {bones}"));
                            }
                            info!(
                                "Import finished: {} succeeded, {} failed, batch bone count {}",
                                report.succeeded(),
                                report.failed(),
                                report.batch_num_bones
                            );
                            should_close = true;
                        }
                        // Nothing staged: report it and keep the dialog open
                        Err(e) => notices.error(e.to_string()),
                    }
                }

                if ui.button("Close").clicked() {
                    should_close = true;
                }
            });
        });

    if should_close {
        workflow.cleanup(&importer);
        workflow.reset();
        dialog.is_open = false;
    }

    Ok(())
}
