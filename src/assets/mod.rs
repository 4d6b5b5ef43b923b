pub mod asset;
pub mod importer;
pub mod meta;
pub mod registry;

pub use asset::{
    Asset, AssetId, AssetKind, MaterialAsset, MaterialAttributes, ModelAsset, ModelMeta,
    SourceMaterial,
};
pub use importer::{
    ModelImporter, ModelInfo, SUPPORTED_MODEL_FORMATS, StagedModel, file_extension,
    is_supported_model_file,
};
pub use registry::{AssetRegistry, RegistryError};

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded, SetLastProjectRequest};
use crate::paths;

/// Posted once per model asset that finishes importing.
#[derive(Message)]
pub struct AssetImported {
    pub id: AssetId,
    pub name: String,
}

pub struct AssetsPlugin;

impl Plugin for AssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelImporter>()
            .init_resource::<AssetRegistry>()
            .add_message::<AssetImported>()
            .add_systems(Startup, init_registry_from_config.after(ConfigLoaded));
    }
}

/// Opens the asset store of the configured project, falling back to the
/// default project (and recording it) on first run or when the configured
/// path has gone missing.
fn init_registry_from_config(
    mut registry: ResMut<AssetRegistry>,
    config: Res<AppConfig>,
    mut set_project: MessageWriter<SetLastProjectRequest>,
) {
    let root = match &config.data.last_project_path {
        Some(path) if path.exists() => path.clone(),
        Some(path) => {
            warn!("Configured project no longer exists: {:?}", path);
            paths::default_project_dir()
        }
        None => {
            let root = paths::default_project_dir();
            set_project.write(SetLastProjectRequest { path: root.clone() });
            root
        }
    };

    if let Err(e) = paths::setup_default_project(&root) {
        warn!("Failed to create project store at {:?}: {}", root, e);
    }

    match AssetRegistry::scan(root) {
        Ok(scanned) => *registry = scanned,
        Err(e) => warn!("Failed to scan project assets: {}", e),
    }
}
