//! The model-placement brush tab.
//!
//! Shows the project's model assets as a filterable tile grid, lets the
//! user build a palette by clicking tiles, and hands the palette plus a
//! density value to the placement brush on apply.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::assets::{AssetId, AssetRegistry, ModelAsset};
use crate::constants::{MAX_THUMBNAILS_PER_FRAME, THUMBNAIL_SIZE};
use crate::editor::{BrushAssetSelection, ModelPlacementBrush, SceneSelection};

use super::DialogState;
use super::import_dialog::ImportDialogState;

#[derive(Resource, Default)]
pub struct BrushTabState {
    pub search_buffer: String,
    pub density_buffer: String,
    /// One-time palette reload and field sync after the registry scan.
    pub initialized: bool,
}

/// Decoded tile previews, keyed by asset id. Assets whose dependencies
/// contain no decodable image are remembered so they are not retried
/// every frame.
#[derive(Resource, Default)]
pub struct ThumbnailCache {
    thumbnails: HashMap<AssetId, egui::TextureHandle>,
    failed: HashSet<AssetId>,
}

#[allow(clippy::too_many_arguments)]
pub fn brush_tab_ui(
    mut contexts: EguiContexts,
    mut tab: ResMut<BrushTabState>,
    mut palette: ResMut<BrushAssetSelection>,
    registry: Res<AssetRegistry>,
    mut brush: ResMut<ModelPlacementBrush>,
    mut scene_selection: ResMut<SceneSelection>,
    mut cache: ResMut<ThumbnailCache>,
    mut import_dialog: ResMut<ImportDialogState>,
    dialog_state: Res<DialogState>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    if !tab.initialized {
        palette.reload(&registry);
        tab.density_buffer = palette.density().to_string();
        tab.initialized = true;
    }

    load_pending_thumbnails(ctx, &palette, &registry, &mut cache);

    egui::SidePanel::left("model_placement_panel")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Model Placement");
            ui.label(
                egui::RichText::new("Places models randomly on the terrain")
                    .weak()
                    .small(),
            );
            ui.add_space(4.0);

            if ui.button("Import models...").clicked() {
                import_dialog.is_open = true;
            }

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Search:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut tab.search_buffer).desired_width(120.0),
                );
                if response.changed() {
                    palette.filter(&tab.search_buffer);
                }
                if ui.button("clear selection").clicked() {
                    palette.clear();
                }
            });

            ui.separator();

            let tiles: Vec<(AssetId, String, bool, String)> = palette
                .entries()
                .iter()
                .filter(|e| e.visible)
                .map(|e| {
                    let details = registry
                        .model(&e.id)
                        .map(|m| {
                            format!(
                                "{} materials, {} bones",
                                m.resolved_materials.len(),
                                m.meta.num_bones
                            )
                        })
                        .unwrap_or_default();
                    (e.id.clone(), e.name.clone(), e.selected, details)
                })
                .collect();

            egui::ScrollArea::vertical()
                .max_height(360.0)
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for (id, name, selected, details) in &tiles {
                            let clicked = asset_tile(ui, &cache, id, name, *selected, details);
                            if clicked {
                                palette.toggle(id);
                            }
                        }
                    });
                });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Density");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut tab.density_buffer).desired_width(65.0),
                );
                if response.changed()
                    && let Ok(value) = tab.density_buffer.trim().parse::<f32>()
                {
                    // Out-of-range input keeps the last valid value
                    palette.set_density(value);
                }
            });

            let modal_open = dialog_state.any_modal_open;
            if ui
                .add_enabled(!modal_open, egui::Button::new("apply"))
                .clicked()
            {
                palette.confirm(&mut brush);
                scene_selection.reassert();
                debug!(
                    "Applied brush palette ({} models), selection revision {}",
                    palette.selected().len(),
                    scene_selection.revision()
                );
            }
        });

    Ok(())
}

/// Draws one palette tile; returns true when it was clicked.
fn asset_tile(
    ui: &mut egui::Ui,
    cache: &ThumbnailCache,
    id: &AssetId,
    name: &str,
    selected: bool,
    details: &str,
) -> bool {
    let size = THUMBNAIL_SIZE as f32;
    ui.vertical(|ui| {
        ui.set_width(size);
        let response = match cache.thumbnails.get(id) {
            Some(handle) => ui.add(
                egui::ImageButton::new(
                    egui::Image::new(handle).fit_to_exact_size(egui::vec2(size, size)),
                )
                .selected(selected),
            ),
            None => ui.add_sized([size, size], egui::SelectableLabel::new(selected, "3D")),
        };
        let response = if details.is_empty() {
            response
        } else {
            response.on_hover_text(details)
        };
        ui.label(egui::RichText::new(name).small());
        response.clicked()
    })
    .inner
}

/// Decodes a bounded number of missing tile previews per frame.
fn load_pending_thumbnails(
    ctx: &egui::Context,
    palette: &BrushAssetSelection,
    registry: &AssetRegistry,
    cache: &mut ThumbnailCache,
) {
    let pending: Vec<AssetId> = palette
        .entries()
        .iter()
        .filter(|e| {
            e.visible && !cache.thumbnails.contains_key(&e.id) && !cache.failed.contains(&e.id)
        })
        .map(|e| e.id.clone())
        .take(MAX_THUMBNAILS_PER_FRAME)
        .collect();

    for id in pending {
        let image = registry
            .model(&id)
            .and_then(first_image_dependency)
            .and_then(|path| load_thumbnail(&path));
        match image {
            Some(color_image) => {
                let handle = ctx.load_texture(
                    format!("palette-thumb-{id}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                cache.thumbnails.insert(id, handle);
            }
            None => {
                cache.failed.insert(id);
            }
        }
    }
}

fn first_image_dependency(model: &ModelAsset) -> Option<PathBuf> {
    let extensions = ["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff", "tif"];
    model
        .dependencies
        .iter()
        .find(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .cloned()
}

fn load_thumbnail(path: &Path) -> Option<egui::ColorImage> {
    let decoded = image::open(path).ok()?;
    let thumb = decoded.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8();
    let size = [thumb.width() as usize, thumb.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        thumb.as_raw(),
    ))
}
