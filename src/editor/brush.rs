//! Model-placement brush surface.
//!
//! The brush stroke itself (raycasting the terrain, scattering
//! instances) lives with the terrain tools; this resource is the
//! contract the palette tab publishes into: which model assets to place
//! and how densely.

use bevy::prelude::Resource;

use crate::assets::AssetId;
use crate::constants::DEFAULT_BRUSH_DENSITY;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ModelPlacementBrush {
    models: Vec<AssetId>,
    density: f32,
}

impl Default for ModelPlacementBrush {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            density: DEFAULT_BRUSH_DENSITY,
        }
    }
}

impl ModelPlacementBrush {
    /// Replaces the palette the brush draws from.
    pub fn set_model_assets(&mut self, models: Vec<AssetId>) {
        self.models = models;
    }

    pub fn model_assets(&self) -> &[AssetId] {
        &self.models
    }

    pub fn set_density(&mut self, density: f32) {
        self.density = density;
    }

    pub fn density(&self) -> f32 {
        self.density
    }
}
