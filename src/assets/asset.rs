//! Asset data model: identifiers, model/material assets, and meta records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::MATERIAL_NAME_PREFIX_LEN;

/// Stable identifier assigned to an asset when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Leading characters used when deriving material names from a model id.
    pub fn short_prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(MATERIAL_NAME_PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Model,
    Material,
}

/// A material declared inside a staged source file, identified by the id
/// the file itself uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMaterial {
    pub id: String,
}

/// PBR attribute set read from the staged source where available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAttributes {
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: [f32; 3],
    pub double_sided: bool,
}

impl Default for MaterialAttributes {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: [0.0, 0.0, 0.0],
            double_sided: false,
        }
    }
}

/// One material asset per material referenced by an imported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAsset {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub attributes: MaterialAttributes,
}

impl MaterialAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AssetId::generate(),
            name: name.into(),
            attributes: MaterialAttributes::default(),
        }
    }
}

/// The persisted meta record of a model asset: identity plus import-time
/// derived properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub num_bones: u32,
    /// Source-file material id -> generated material asset id.
    #[serde(default)]
    pub default_materials: BTreeMap<String, AssetId>,
}

/// A model asset in the project library.
///
/// The mesh itself stays on disk; this record carries what the editor
/// needs: the meta document, the source materials seen at import time,
/// and the dependency files copied into the store alongside the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub meta: ModelMeta,
    pub materials: Vec<SourceMaterial>,
    pub dependencies: Vec<PathBuf>,
    /// Live material handles, filled in by `AssetRegistry::apply_dependencies`.
    pub resolved_materials: Vec<AssetId>,
}

impl ModelAsset {
    pub fn id(&self) -> &AssetId {
        &self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }
}

/// Library entry, enumerable across kinds the way the browser iterates it.
#[derive(Debug, Clone)]
pub enum Asset {
    Model(ModelAsset),
    Material(MaterialAsset),
}

impl Asset {
    pub fn id(&self) -> &AssetId {
        match self {
            Asset::Model(m) => m.id(),
            Asset::Material(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Asset::Model(m) => m.name(),
            Asset::Material(m) => &m.name,
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Model(_) => AssetKind::Model,
            Asset::Material(_) => AssetKind::Material,
        }
    }

    pub fn as_model(&self) -> Option<&ModelAsset> {
        match self {
            Asset::Model(m) => Some(m),
            Asset::Material(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(AssetId::generate(), AssetId::generate());
    }

    #[test]
    fn test_short_prefix_truncates() {
        let id = AssetId::from("abcdef123456");
        assert_eq!(id.short_prefix(), "abcd");
    }

    #[test]
    fn test_short_prefix_of_short_id() {
        let id = AssetId::from("ab");
        assert_eq!(id.short_prefix(), "ab");
    }

    #[test]
    fn test_material_attributes_default() {
        let attrs = MaterialAttributes::default();
        assert_eq!(attrs.base_color_factor, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(attrs.metallic_factor, 1.0);
        assert_eq!(attrs.roughness_factor, 1.0);
        assert!(!attrs.double_sided);
    }

    #[test]
    fn test_asset_kind_accessors() {
        let model = Asset::Model(ModelAsset {
            meta: ModelMeta {
                id: AssetId::from("m1"),
                name: "tree".into(),
                num_bones: 0,
                default_materials: BTreeMap::new(),
            },
            materials: Vec::new(),
            dependencies: Vec::new(),
            resolved_materials: Vec::new(),
        });
        let material = Asset::Material(MaterialAsset::new("bark"));

        assert_eq!(model.kind(), AssetKind::Model);
        assert_eq!(material.kind(), AssetKind::Material);
        assert!(model.as_model().is_some());
        assert!(material.as_model().is_none());
        assert_eq!(model.name(), "tree");
        assert_eq!(material.name(), "bark");
    }

    #[test]
    fn test_model_meta_serialization_round_trip() {
        let mut meta = ModelMeta {
            id: AssetId::from("abcd1234"),
            name: "rock".into(),
            num_bones: 12,
            default_materials: BTreeMap::new(),
        };
        meta.default_materials
            .insert("stone".into(), AssetId::from("ffff0000"));

        let json = serde_json::to_string(&meta).unwrap();
        let parsed: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }
}
