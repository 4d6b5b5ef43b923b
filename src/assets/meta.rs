//! Meta-record persistence.
//!
//! Each model asset directory carries one meta document recording the
//! asset's identity and import-time derived properties. Writes are
//! synchronous; callers run on the UI thread for one-shot operations.

use std::path::{Path, PathBuf};

use super::asset::ModelMeta;

pub const META_FILE_NAME: &str = "model.meta.json";

/// Path of the meta document inside a model asset directory.
pub fn meta_file_path(model_dir: &Path) -> PathBuf {
    model_dir.join(META_FILE_NAME)
}

pub fn save_model_meta(model_dir: &Path, meta: &ModelMeta) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(meta).map_err(std::io::Error::other)?;
    std::fs::write(meta_file_path(model_dir), json)
}

pub fn load_model_meta(model_dir: &Path) -> std::io::Result<ModelMeta> {
    let json = std::fs::read_to_string(meta_file_path(model_dir))?;
    serde_json::from_str(&json).map_err(std::io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::asset::AssetId;
    use std::collections::BTreeMap;

    #[test]
    fn test_meta_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut meta = ModelMeta {
            id: AssetId::from("0123abcd"),
            name: "fence".into(),
            num_bones: 7,
            default_materials: BTreeMap::new(),
        };
        meta.default_materials
            .insert("wood".into(), AssetId::from("beef0001"));

        save_model_meta(dir.path(), &meta).unwrap();
        let loaded = load_model_meta(dir.path()).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_load_missing_meta_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_model_meta(dir.path()).is_err());
    }
}
