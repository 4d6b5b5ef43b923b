//! The project asset library.
//!
//! Assets live in an on-disk store under the project root (`models/` and
//! `materials/`) and in an in-memory list preserving library order. All
//! persistence is synchronous.

use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use thiserror::Error;
use tracing::{info, warn};

use super::asset::{Asset, AssetId, MaterialAsset, ModelAsset, ModelMeta, SourceMaterial};
use super::importer::StagedModel;
use super::meta::{self, META_FILE_NAME};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("an asset named '{0}' already exists")]
    AlreadyExists(String),
}

#[derive(Resource)]
pub struct AssetRegistry {
    root: PathBuf,
    assets: Vec<Asset>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new(crate::paths::default_project_dir())
    }
}

impl AssetRegistry {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            assets: Vec::new(),
        }
    }

    /// Rebuilds a registry from a project's on-disk store.
    pub fn scan(root: PathBuf) -> std::io::Result<Self> {
        let mut registry = Self::new(root);

        let models_dir = registry.models_dir();
        if models_dir.is_dir() {
            for dir in sorted_entries(&models_dir)? {
                if !dir.is_dir() {
                    continue;
                }
                let meta = match meta::load_model_meta(&dir) {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!("Skipping model directory {:?}: {}", dir, e);
                        continue;
                    }
                };
                let materials = meta
                    .default_materials
                    .keys()
                    .map(|id| SourceMaterial { id: id.clone() })
                    .collect();
                let dependencies = collect_files(&dir)?
                    .into_iter()
                    .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(META_FILE_NAME))
                    .collect();
                registry.assets.push(Asset::Model(ModelAsset {
                    meta,
                    materials,
                    dependencies,
                    resolved_materials: Vec::new(),
                }));
            }
        }

        let materials_dir = registry.materials_dir();
        if materials_dir.is_dir() {
            for file in sorted_entries(&materials_dir)? {
                if file.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let json = std::fs::read_to_string(&file)?;
                match serde_json::from_str::<MaterialAsset>(&json) {
                    Ok(material) => registry.assets.push(Asset::Material(material)),
                    Err(e) => warn!("Skipping material file {:?}: {}", file, e),
                }
            }
        }

        // Resolve model material references now that materials are known
        let material_ids: std::collections::HashSet<AssetId> = registry
            .assets
            .iter()
            .filter(|a| a.kind() == super::asset::AssetKind::Material)
            .map(|a| a.id().clone())
            .collect();
        for asset in &mut registry.assets {
            if let Asset::Model(model) = asset {
                model.resolved_materials = model
                    .meta
                    .default_materials
                    .values()
                    .filter(|id| material_ids.contains(*id))
                    .cloned()
                    .collect();
            }
        }

        info!(
            "Scanned {} assets from {:?}",
            registry.assets.len(),
            registry.root
        );
        Ok(registry)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All known assets in library order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn model(&self, id: &AssetId) -> Option<&ModelAsset> {
        self.assets
            .iter()
            .filter_map(Asset::as_model)
            .find(|m| m.id() == id)
    }

    fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    fn materials_dir(&self) -> PathBuf {
        self.root.join("materials")
    }

    fn has_asset_named(&self, name: &str) -> bool {
        self.assets.iter().any(|a| a.name() == name)
    }

    /// Materializes a model asset from a staged file: derives the asset
    /// name from the file stem, rejects duplicates, and copies the staged
    /// file plus dependencies into the project store.
    pub fn create_model_asset(&mut self, staged: &StagedModel) -> Result<ModelAsset, RegistryError> {
        let name = staged
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        let model_dir = self.models_dir().join(&name);
        if self.has_asset_named(&name) || model_dir.exists() {
            return Err(RegistryError::AlreadyExists(name));
        }
        std::fs::create_dir_all(&model_dir)?;

        let file_name = staged
            .file
            .file_name()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "unnamed staged file"))?;
        std::fs::copy(&staged.file, model_dir.join(file_name))?;

        let staging_dir = staged.file.parent();
        let mut dependencies = Vec::new();
        for dep in &staged.dependencies {
            let relative = staging_dir
                .and_then(|dir| dep.strip_prefix(dir).ok())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(dep.file_name().unwrap_or_default()));
            let target = model_dir.join(&relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(dep, &target)?;
            dependencies.push(target);
        }

        Ok(ModelAsset {
            meta: ModelMeta {
                id: AssetId::generate(),
                name,
                num_bones: staged.info.num_bones,
                default_materials: Default::default(),
            },
            materials: staged.info.materials.clone(),
            dependencies,
            resolved_materials: Vec::new(),
        })
    }

    pub fn create_material_asset(&mut self, name: &str) -> Result<MaterialAsset, RegistryError> {
        if self.has_asset_named(name) || self.material_file(name).exists() {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        Ok(MaterialAsset::new(name))
    }

    /// Persists a material asset and enters it into the library.
    pub fn save_material_asset(&mut self, material: &MaterialAsset) -> Result<(), RegistryError> {
        let dir = self.materials_dir();
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(material).map_err(std::io::Error::other)?;
        std::fs::write(self.material_file(&material.name), json)?;
        self.assets.push(Asset::Material(material.clone()));
        Ok(())
    }

    fn material_file(&self, name: &str) -> PathBuf {
        self.materials_dir().join(format!("{name}.mat.json"))
    }

    /// Writes the model's meta record to its store directory.
    pub fn save_model_meta(&self, model: &ModelAsset) -> Result<(), RegistryError> {
        let dir = self.models_dir().join(model.name());
        meta::save_model_meta(&dir, &model.meta)?;
        Ok(())
    }

    /// Resolves the model's material mapping into live handles. Entries
    /// that no longer resolve are reported as an i/o failure so the
    /// import surfaces them per item.
    pub fn apply_dependencies(&self, model: &mut ModelAsset) -> Result<(), RegistryError> {
        let resolved = self.resolve_materials(model);
        if resolved.len() != model.meta.default_materials.len() {
            return Err(RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("unresolved material references on '{}'", model.name()),
            )));
        }
        model.resolved_materials = resolved;
        Ok(())
    }

    fn resolve_materials(&self, model: &ModelAsset) -> Vec<AssetId> {
        model
            .meta
            .default_materials
            .values()
            .filter(|id| {
                self.assets
                    .iter()
                    .any(|a| a.kind() == super::asset::AssetKind::Material && a.id() == *id)
            })
            .cloned()
            .collect()
    }

    /// Enters a finished model asset into the library.
    pub fn register_model(&mut self, model: ModelAsset) -> AssetId {
        let id = model.id().clone();
        self.assets.push(Asset::Model(model));
        id
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn collect_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in sorted_entries(dir)? {
        if entry.is_dir() {
            files.extend(collect_files(&entry)?);
        } else {
            files.push(entry);
        }
    }
    Ok(files)
}
