//! Brush palette selection state.
//!
//! The model-placement tab shows every model asset in the library as a
//! candidate tile. Filtering hides tiles instead of removing them so the
//! selection survives a search, and the selection itself is only handed
//! to the brush on an explicit apply.

use bevy::prelude::Resource;

use crate::assets::{AssetId, AssetKind, AssetRegistry};
use crate::constants::DEFAULT_BRUSH_DENSITY;

use super::brush::ModelPlacementBrush;

/// One candidate tile in the palette grid.
#[derive(Debug, Clone)]
pub struct PaletteEntry {
    pub id: AssetId,
    pub name: String,
    pub visible: bool,
    pub selected: bool,
}

#[derive(Resource)]
pub struct BrushAssetSelection {
    entries: Vec<PaletteEntry>,
    /// Selected model ids in selection order; set semantics.
    selected: Vec<AssetId>,
    search: String,
    density: f32,
}

impl Default for BrushAssetSelection {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            selected: Vec::new(),
            search: String::new(),
            density: DEFAULT_BRUSH_DENSITY,
        }
    }
}

impl BrushAssetSelection {
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn selected(&self) -> &[AssetId] {
        &self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Rebuilds the candidate list from the library's model assets,
    /// preserving library order. Selected ids that no longer exist are
    /// pruned; surviving ones keep their tile marked.
    pub fn reload(&mut self, registry: &AssetRegistry) {
        self.entries = registry
            .assets()
            .iter()
            .filter(|a| a.kind() == AssetKind::Model)
            .map(|a| PaletteEntry {
                id: a.id().clone(),
                name: a.name().to_string(),
                visible: true,
                selected: false,
            })
            .collect();
        self.selected
            .retain(|id| self.entries.iter().any(|e| &e.id == id));

        let search = self.search.clone();
        self.filter(&search);
        self.sync_indicators();
    }

    /// Case-insensitive substring filter over display names. Hides
    /// non-matching tiles; the selection set is untouched.
    pub fn filter(&mut self, query: &str) {
        self.search = query.to_string();
        let needle = query.to_lowercase();
        for entry in &mut self.entries {
            entry.visible = entry.name.to_lowercase().contains(&needle);
        }
    }

    /// Flips membership of `id` in the selection set and its tile
    /// indicator. Returns the new selected state.
    pub fn toggle(&mut self, id: &AssetId) -> bool {
        let now_selected = match self.selected.iter().position(|s| s == id) {
            Some(index) => {
                self.selected.remove(index);
                false
            }
            None => {
                self.selected.push(id.clone());
                true
            }
        };
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.id == id) {
            entry.selected = now_selected;
        }
        now_selected
    }

    /// Empties the selection and clears every tile indicator.
    pub fn clear(&mut self) {
        self.selected.clear();
        for entry in &mut self.entries {
            entry.selected = false;
        }
    }

    /// Publishes the current palette and density to the placement brush.
    pub fn confirm(&self, brush: &mut ModelPlacementBrush) {
        brush.set_model_assets(self.selected.clone());
        brush.set_density(self.density);
    }

    /// Accepts finite, non-negative values; anything else is rejected and
    /// the last valid value kept.
    pub fn set_density(&mut self, value: f32) -> bool {
        if !value.is_finite() || value < 0.0 {
            return false;
        }
        self.density = value;
        true
    }

    /// Tab reset: drops search text and selection.
    pub fn reset(&mut self) {
        self.search.clear();
        self.clear();
        for entry in &mut self.entries {
            entry.visible = true;
        }
    }

    fn sync_indicators(&mut self) {
        for entry in &mut self.entries {
            entry.selected = self.selected.contains(&entry.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::importer::ModelImporter;

    fn registry_with_models(names: &[&str]) -> AssetRegistry {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = AssetRegistry::new(dir.path().join("project"));
        for name in names {
            let source = dir.path().join(format!("{name}.gltf"));
            std::fs::write(&source, "{}").unwrap();
            let staged = ModelImporter::new(dir.path().join("staging"))
                .stage_to_temp(&source)
                .unwrap();
            let model = registry.create_model_asset(&staged).unwrap();
            registry.register_model(model);
        }
        registry
    }

    fn palette(names: &[&str]) -> BrushAssetSelection {
        let registry = registry_with_models(names);
        let mut palette = BrushAssetSelection::default();
        palette.reload(&registry);
        palette
    }

    #[test]
    fn test_reload_lists_models_in_library_order() {
        let palette = palette(&["oak", "rock", "fern"]);
        let names: Vec<_> = palette.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["oak", "rock", "fern"]);
        assert!(palette.entries().iter().all(|e| e.visible && !e.selected));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut palette = palette(&["oak"]);
        let id = palette.entries()[0].id.clone();

        assert!(palette.toggle(&id));
        assert_eq!(palette.selected(), &[id.clone()]);
        assert!(palette.entries()[0].selected);

        assert!(!palette.toggle(&id));
        assert!(palette.selected().is_empty());
        assert!(!palette.entries()[0].selected);
    }

    #[test]
    fn test_empty_filter_shows_all_candidates() {
        let mut palette = palette(&["oak", "rock"]);
        palette.filter("oa");
        palette.filter("");
        assert!(palette.entries().iter().all(|e| e.visible));
    }

    #[test]
    fn test_filter_is_case_insensitive_and_hides_non_matches() {
        let mut palette = palette(&["Oak", "rock"]);
        let oak = palette.entries()[0].id.clone();
        palette.toggle(&oak);

        palette.filter("OAK");
        assert!(palette.entries()[0].visible);
        assert!(!palette.entries()[1].visible);
        // Selection survives filtering
        assert_eq!(palette.selected(), &[oak]);

        palette.filter("no-such-model");
        assert!(palette.entries().iter().all(|e| !e.visible));
        assert_eq!(palette.selected().len(), 1);
    }

    #[test]
    fn test_clear_empties_selection_and_indicators() {
        let mut palette = palette(&["oak", "rock"]);
        let first = palette.entries()[0].id.clone();
        let second = palette.entries()[1].id.clone();
        palette.toggle(&first);
        palette.toggle(&second);

        palette.clear();
        assert!(palette.selected().is_empty());
        assert!(palette.entries().iter().all(|e| !e.selected));
    }

    #[test]
    fn test_confirm_publishes_selection_and_density() {
        let mut palette = palette(&["oak", "rock"]);
        let first = palette.entries()[0].id.clone();
        palette.toggle(&first);
        palette.set_density(2.5);

        let mut brush = ModelPlacementBrush::default();
        palette.confirm(&mut brush);
        assert_eq!(brush.model_assets(), &[first]);
        assert_eq!(brush.density(), 2.5);
    }

    #[test]
    fn test_invalid_density_keeps_last_valid_value() {
        let mut palette = palette(&[]);
        assert!(palette.set_density(1.25));
        assert!(!palette.set_density(f32::NAN));
        assert!(!palette.set_density(-0.5));
        assert!(!palette.set_density(f32::INFINITY));
        assert_eq!(palette.density(), 1.25);
    }

    #[test]
    fn test_reset_drops_search_and_selection() {
        let mut palette = palette(&["oak", "rock"]);
        let oak = palette.entries()[0].id.clone();
        palette.toggle(&oak);
        palette.filter("oa");

        palette.reset();
        assert!(palette.search().is_empty());
        assert!(palette.selected().is_empty());
        assert!(palette.entries().iter().all(|e| e.visible && !e.selected));
    }

    #[test]
    fn test_reload_keeps_selection_for_surviving_assets() {
        let registry = registry_with_models(&["oak", "rock"]);
        let mut palette = BrushAssetSelection::default();
        palette.reload(&registry);
        let oak = palette.entries()[0].id.clone();
        palette.toggle(&oak);

        palette.reload(&registry);
        assert_eq!(palette.selected(), &[oak]);
        assert!(palette.entries()[0].selected);

        // Ids gone from the library are pruned on reload
        let other = registry_with_models(&["fern"]);
        palette.reload(&other);
        assert!(palette.selected().is_empty());
    }
}
