pub mod brush_tab;
pub mod import_dialog;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::assets::{AssetImported, AssetRegistry};
use crate::editor::BrushAssetSelection;

/// Resource that tracks whether any modal dialog is currently open.
/// Editor input handlers should check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// One transient user-visible notification line.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// The editor's toast area. Workflow outcomes land here so they outlive
/// the dialog that produced them.
#[derive(Resource, Default)]
pub struct EditorNotices {
    entries: Vec<Notice>,
}

impl EditorNotices {
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Error, text.into());
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Info, text.into());
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, kind: NoticeKind, text: String) {
        self.entries.push(Notice { kind, text });
        // Keep the toast area short; old lines scroll away for good
        let overflow = self.entries.len().saturating_sub(6);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
    }
}

/// Renders the toast area in the bottom-right corner.
fn notices_ui(mut contexts: EguiContexts, mut notices: ResMut<EditorNotices>) -> Result {
    if notices.entries().is_empty() {
        return Ok(());
    }

    egui::Window::new("Notifications")
        .anchor(egui::Align2::RIGHT_BOTTOM, [-8.0, -8.0])
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .show(contexts.ctx_mut()?, |ui| {
            for notice in notices.entries() {
                let color = match notice.kind {
                    NoticeKind::Success => egui::Color32::from_rgb(110, 200, 110),
                    NoticeKind::Error => egui::Color32::from_rgb(220, 100, 100),
                    NoticeKind::Info => ui.visuals().text_color(),
                };
                ui.label(egui::RichText::new(&notice.text).color(color));
            }
            if ui.small_button("dismiss").clicked() {
                notices.clear();
            }
        });

    Ok(())
}

/// Rebuilds the brush palette when new model assets arrive.
fn reload_palette_on_import(
    mut events: MessageReader<AssetImported>,
    mut palette: ResMut<BrushAssetSelection>,
    registry: Res<AssetRegistry>,
) {
    let mut reload = false;
    for _ in events.read() {
        reload = true;
    }
    if reload {
        palette.reload(&registry);
    }
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    import_dialog: Res<import_dialog::ImportDialogState>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = import_dialog.is_open;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<EditorNotices>()
            .init_resource::<import_dialog::ImportDialogState>()
            .init_resource::<brush_tab::BrushTabState>()
            .init_resource::<brush_tab::ThumbnailCache>()
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Side panel first so floating windows fit beside it
                    brush_tab::brush_tab_ui,
                    import_dialog::import_dialog_ui,
                    notices_ui,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                reload_palette_on_import.run_if(on_message::<AssetImported>),
            )
            .add_systems(First, update_dialog_state);
    }
}
