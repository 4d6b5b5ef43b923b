//! The model import workflow.
//!
//! Files picked in the import dialog are staged first and committed on
//! confirmation. Confirmation walks the staged batch in staging order and
//! converts each entry into a persisted model asset plus one material
//! asset per source material; a failing entry is reported and skipped,
//! never aborting the rest of the batch. Staged files are discarded when
//! the batch completes or the dialog closes, whichever comes first.

use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use thiserror::Error;
use tracing::{info, warn};

use crate::assets::{
    AssetId, AssetRegistry, ModelImporter, RegistryError, StagedModel, file_extension,
    is_supported_model_file,
};
use crate::paths;
use crate::shaders::ShaderProviders;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported model format '.{0}'")]
    UnsupportedFormat(String),
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("a model named '{0}' already exists")]
    AssetAlreadyExists(String),
    #[error("there is nothing to import")]
    NothingToImport,
}

impl From<RegistryError> for ImportError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Io(e) => ImportError::Io(e),
            RegistryError::AlreadyExists(name) => ImportError::AssetAlreadyExists(name),
        }
    }
}

/// Collaborators the confirm step works against, passed in by the caller.
pub struct ImportContext<'a> {
    pub registry: &'a mut AssetRegistry,
    pub importer: &'a ModelImporter,
    pub shaders: &'a mut ShaderProviders,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedAsset {
    pub id: AssetId,
    pub name: String,
}

/// Per-item result of a confirmed batch, in staging order.
#[derive(Debug)]
pub struct ImportOutcome {
    pub source_name: String,
    pub result: Result<ImportedAsset, ImportError>,
}

#[derive(Debug)]
pub struct ImportReport {
    pub outcomes: Vec<ImportOutcome>,
    /// Set when the batch grew the shader configuration, carrying the new
    /// bone capacity.
    pub shader_rebuilt: Option<u32>,
    /// The bone-count high-water mark written to every model in the batch.
    pub batch_num_bones: u32,
}

impl ImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[derive(Resource, Default)]
pub struct ImportWorkflow {
    staged: Vec<StagedModel>,
    /// Picker input state shown in the dialog; cleared by `reset`.
    picked: Vec<PathBuf>,
}

impl ImportWorkflow {
    pub fn staged(&self) -> &[StagedModel] {
        &self.staged
    }

    pub fn picked(&self) -> &[PathBuf] {
        &self.picked
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Stages a picked file for import. Multi-select calls this once per
    /// file; entries accumulate in pick order.
    pub fn stage(
        &mut self,
        importer: &ModelImporter,
        file: &Path,
    ) -> Result<&StagedModel, ImportError> {
        if !is_supported_model_file(file) {
            return Err(ImportError::UnsupportedFormat(file_extension(file)));
        }
        let staged = importer.stage_to_temp(file)?;
        self.picked.push(file.to_path_buf());
        self.staged.push(staged);
        let newest = self.staged.len() - 1;
        Ok(&self.staged[newest])
    }

    /// Imports every staged model, then discards the staged files.
    ///
    /// The bone count written to each model's meta record is the largest
    /// count staged anywhere in the batch, computed once up front, so the
    /// shared shader configuration is sized for the whole batch. A
    /// failing item is recorded in the report and the loop continues.
    pub fn confirm_import(
        &mut self,
        ctx: &mut ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        if self.staged.is_empty() {
            return Err(ImportError::NothingToImport);
        }

        let batch_num_bones = self
            .staged
            .iter()
            .map(|s| s.info.num_bones)
            .max()
            .unwrap_or(0);

        let mut outcomes = Vec::new();
        let mut shader_rebuilt = None;
        for staged in &self.staged {
            let source_name = staged
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string());

            let result = import_one(staged, batch_num_bones, ctx);
            match &result {
                Ok(asset) => {
                    // Strictly-greater comparison, so at most one rebuild
                    // per batch: every item carries the same high-water mark.
                    if ctx.shaders.rebuild_if_exceeds(batch_num_bones) {
                        info!("Max bone count increased to {batch_num_bones}");
                        shader_rebuilt = Some(batch_num_bones);
                    }
                    info!("Imported model asset '{}'", asset.name);
                }
                Err(e) => warn!("Import of '{source_name}' failed: {e}"),
            }
            outcomes.push(ImportOutcome {
                source_name,
                result,
            });
        }

        self.cleanup(ctx.importer);

        Ok(ImportReport {
            outcomes,
            shader_rebuilt,
            batch_num_bones,
        })
    }

    /// Discards staged files. A staging directory is deleted only when it
    /// is a real directory proven to live inside the importer's staging
    /// root; anything else is silently left alone. The pending list is
    /// cleared unconditionally.
    pub fn cleanup(&mut self, importer: &ModelImporter) -> Vec<PathBuf> {
        let mut deleted = Vec::new();
        for staged in &self.staged {
            let Some(dir) = staged.staging_dir() else {
                continue;
            };
            if !dir.is_dir() || !paths::is_within_dir(importer.staging_root(), dir) {
                continue;
            }
            match std::fs::remove_dir_all(dir) {
                Ok(()) => {
                    info!("Deleted staged model directory {:?}", dir);
                    deleted.push(dir.to_path_buf());
                }
                Err(e) => warn!("Failed to delete staged directory {:?}: {e}", dir),
            }
        }
        self.staged.clear();
        deleted
    }

    /// Clears picker input state without touching staged files. The
    /// dialog's close path calls `cleanup` separately.
    pub fn reset(&mut self) {
        self.picked.clear();
    }
}

fn import_one(
    staged: &StagedModel,
    batch_num_bones: u32,
    ctx: &mut ImportContext<'_>,
) -> Result<ImportedAsset, ImportError> {
    let mut model = ctx.registry.create_model_asset(staged)?;
    let prefix = model.id().short_prefix().to_string();

    let sources = model.materials.clone();
    for source in &sources {
        let material_name = format!("{}_{}", prefix, source.id);
        let mut material = ctx.registry.create_material_asset(&material_name)?;
        ctx.importer
            .populate_material_attributes(staged, source, &mut material)?;
        ctx.registry.save_material_asset(&material)?;
        model
            .meta
            .default_materials
            .insert(source.id.clone(), material.id);
    }

    model.meta.num_bones = batch_num_bones;
    ctx.registry.save_model_meta(&model)?;
    ctx.registry.apply_dependencies(&mut model)?;

    let name = model.name().to_string();
    let id = ctx.registry.register_model(model);
    Ok(ImportedAsset { id, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Asset;

    struct Fixture {
        _dir: tempfile::TempDir,
        source_dir: PathBuf,
        importer: ModelImporter,
        registry: AssetRegistry,
        shaders: ShaderProviders,
        workflow: ImportWorkflow,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let source_dir = dir.path().join("sources");
            std::fs::create_dir_all(&source_dir).unwrap();
            let importer = ModelImporter::new(dir.path().join("staging"));
            let registry = AssetRegistry::new(dir.path().join("project"));
            Self {
                source_dir,
                importer,
                registry,
                shaders: ShaderProviders::default(),
                workflow: ImportWorkflow::default(),
                _dir: dir,
            }
        }

        fn write_gltf(&self, name: &str, num_bones: usize) -> PathBuf {
            let joints: Vec<String> = (0..num_bones).map(|j| j.to_string()).collect();
            let json = format!(
                r#"{{
                    "materials": [{{ "name": "skin" }}],
                    "skins": [{{ "joints": [{}] }}]
                }}"#,
                joints.join(", ")
            );
            let path = self.source_dir.join(format!("{name}.gltf"));
            std::fs::write(&path, json).unwrap();
            path
        }

        fn ctx(&mut self) -> ImportContext<'_> {
            ImportContext {
                registry: &mut self.registry,
                importer: &self.importer,
                shaders: &mut self.shaders,
            }
        }

        fn confirm(&mut self) -> Result<ImportReport, ImportError> {
            let mut workflow = std::mem::take(&mut self.workflow);
            let result = workflow.confirm_import(&mut self.ctx());
            self.workflow = workflow;
            result
        }

        fn model_bones(&self, name: &str) -> u32 {
            self.registry
                .assets()
                .iter()
                .filter_map(Asset::as_model)
                .find(|m| m.name() == name)
                .map(|m| m.meta.num_bones)
                .unwrap()
        }
    }

    #[test]
    fn test_unsupported_format_is_rejected_at_staging() {
        let mut fx = Fixture::new();
        let bad = fx.source_dir.join("readme.txt");
        std::fs::write(&bad, "not a model").unwrap();

        let err = fx.workflow.stage(&fx.importer, &bad).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "txt"));
        assert!(fx.workflow.is_empty());
    }

    #[test]
    fn test_confirm_imports_every_staged_model_and_empties_the_list() {
        let mut fx = Fixture::new();
        for name in ["oak", "rock", "fern"] {
            let path = fx.write_gltf(name, 0);
            fx.workflow.stage(&fx.importer, &path).unwrap();
        }
        assert_eq!(fx.workflow.staged().len(), 3);

        let report = fx.confirm().unwrap();
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 0);
        assert!(fx.workflow.is_empty());

        let models: Vec<_> = fx
            .registry
            .assets()
            .iter()
            .filter_map(Asset::as_model)
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(models, vec!["oak", "rock", "fern"]);
    }

    #[test]
    fn test_materials_are_created_named_and_mapped() {
        let mut fx = Fixture::new();
        let path = fx.write_gltf("oak", 4);
        fx.workflow.stage(&fx.importer, &path).unwrap();

        let report = fx.confirm().unwrap();
        let imported = report.outcomes[0].result.as_ref().unwrap();

        let model = fx.registry.model(&imported.id).unwrap();
        let material_id = model.meta.default_materials.get("skin").unwrap();
        let expected_name = format!("{}_skin", imported.id.short_prefix());
        assert!(
            fx.registry
                .assets()
                .iter()
                .any(|a| a.id() == material_id && a.name() == expected_name)
        );
        assert_eq!(model.resolved_materials, vec![material_id.clone()]);
    }

    #[test]
    fn test_failing_item_does_not_abort_the_batch() {
        let mut fx = Fixture::new();
        let first = fx.write_gltf("oak", 0);
        let second = fx.write_gltf("rock", 0);
        fx.workflow.stage(&fx.importer, &first).unwrap();
        fx.workflow.stage(&fx.importer, &second).unwrap();

        // Break the first staged file so its import hits an i/o failure
        std::fs::remove_file(&fx.workflow.staged()[0].file).unwrap();

        let report = fx.confirm().unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(
            report.outcomes[0].result,
            Err(ImportError::Io(_))
        ));
        assert!(report.outcomes[1].result.is_ok());
        assert_eq!(fx.model_bones("rock"), 0);
    }

    #[test]
    fn test_duplicate_name_fails_per_item() {
        let mut fx = Fixture::new();
        let path = fx.write_gltf("oak", 0);
        fx.workflow.stage(&fx.importer, &path).unwrap();
        fx.workflow.stage(&fx.importer, &path).unwrap();

        let report = fx.confirm().unwrap();
        assert!(report.outcomes[0].result.is_ok());
        assert!(matches!(
            &report.outcomes[1].result,
            Err(ImportError::AssetAlreadyExists(name)) if name.as_str() == "oak"
        ));
    }

    #[test]
    fn test_batch_bone_high_water_mark_is_written_to_every_model() {
        let mut fx = Fixture::new();
        for (name, bones) in [("walker", 10), ("giant", 40), ("crawler", 25)] {
            let path = fx.write_gltf(name, bones);
            fx.workflow.stage(&fx.importer, &path).unwrap();
        }

        let report = fx.confirm().unwrap();
        assert_eq!(report.batch_num_bones, 40);
        assert_eq!(report.shader_rebuilt, Some(40));
        for name in ["walker", "giant", "crawler"] {
            assert_eq!(fx.model_bones(name), 40);
        }
        assert_eq!(fx.shaders.max_num_bones(), 40);
        // A second batch with the same count no longer grows the config
        assert!(!fx.shaders.rebuild_if_exceeds(40));
    }

    #[test]
    fn test_shader_config_is_untouched_when_capacity_suffices() {
        let mut fx = Fixture::new();
        fx.shaders.rebuild_if_exceeds(64);
        let path = fx.write_gltf("walker", 10);
        fx.workflow.stage(&fx.importer, &path).unwrap();

        let report = fx.confirm().unwrap();
        assert_eq!(report.shader_rebuilt, None);
        assert_eq!(fx.shaders.max_num_bones(), 64);
        // The meta still records the batch mark, not the shader capacity
        assert_eq!(fx.model_bones("walker"), 10);
    }

    #[test]
    fn test_confirm_with_nothing_staged_is_an_error() {
        let mut fx = Fixture::new();
        let before = fx.registry.assets().len();
        let err = fx.confirm().unwrap_err();
        assert!(matches!(err, ImportError::NothingToImport));
        assert_eq!(fx.registry.assets().len(), before);
    }

    #[test]
    fn test_cleanup_deletes_only_directories_inside_the_staging_root() {
        let mut fx = Fixture::new();
        let path = fx.write_gltf("oak", 0);
        fx.workflow.stage(&fx.importer, &path).unwrap();
        let staged_dir = fx.workflow.staged()[0]
            .staging_dir()
            .unwrap()
            .to_path_buf();

        // Forge an entry whose "staging" directory lives outside the root
        let outside = tempfile::tempdir().unwrap();
        let foreign = outside.path().join("models/hand-made.gltf");
        std::fs::create_dir_all(foreign.parent().unwrap()).unwrap();
        std::fs::write(&foreign, "{}").unwrap();
        fx.workflow.staged.push(StagedModel {
            file: foreign.clone(),
            dependencies: Vec::new(),
            info: Default::default(),
        });

        let deleted = fx.workflow.cleanup(&fx.importer);
        assert_eq!(deleted, vec![staged_dir.clone()]);
        assert!(!staged_dir.exists());
        assert!(foreign.exists());
        assert!(fx.workflow.is_empty());
    }

    #[test]
    fn test_reset_clears_picker_state_but_not_staged_files() {
        let mut fx = Fixture::new();
        let path = fx.write_gltf("oak", 0);
        fx.workflow.stage(&fx.importer, &path).unwrap();
        assert_eq!(fx.workflow.picked().len(), 1);

        fx.workflow.reset();
        assert!(fx.workflow.picked().is_empty());
        assert_eq!(fx.workflow.staged().len(), 1);
        assert!(fx.workflow.staged()[0].file.exists());
    }
}
