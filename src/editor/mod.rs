pub mod brush;
pub mod import;
pub mod palette;

pub use brush::ModelPlacementBrush;
pub use import::{ImportContext, ImportError, ImportReport, ImportWorkflow, ImportedAsset};
pub use palette::BrushAssetSelection;

use bevy::prelude::*;

use crate::shaders::ShaderProviders;

/// The object currently selected in the scene outline.
///
/// Scene views watch `revision`; re-asserting the selection bumps it so
/// they refresh even when the selected object is unchanged.
#[derive(Resource, Default)]
pub struct SceneSelection {
    pub current: Option<String>,
    revision: u64,
}

impl SceneSelection {
    /// Re-publishes the current selection unchanged.
    pub fn reassert(&mut self) {
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShaderProviders>()
            .init_resource::<ImportWorkflow>()
            .init_resource::<BrushAssetSelection>()
            .init_resource::<ModelPlacementBrush>()
            .init_resource::<SceneSelection>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassert_keeps_selection_and_bumps_revision() {
        let mut selection = SceneSelection::default();
        selection.current = Some("terrain_01".into());
        let revision = selection.revision();

        selection.reassert();
        assert_eq!(selection.current.as_deref(), Some("terrain_01"));
        assert_eq!(selection.revision(), revision + 1);
    }
}
