use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Editor configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfigData {
    /// Project whose asset store is opened on startup
    #[serde(default)]
    pub last_project_path: Option<PathBuf>,
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to record the opened project path
#[derive(Message)]
pub struct SetLastProjectRequest {
    pub path: PathBuf,
}

/// Load configuration from disk, falling back to defaults on any error
fn load_config() -> AppConfig {
    let config_path = crate::paths::config_file();

    let data = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    data
                }
                Err(e) => {
                    warn!("Failed to parse config file, using defaults: {}", e);
                    AppConfigData::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file, using defaults: {}", e);
                AppConfigData::default()
            }
        }
    } else {
        info!("No config file found, using defaults");
        AppConfigData::default()
    };

    AppConfig {
        data,
        config_path,
        dirty: false,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(mut config: ResMut<AppConfig>) {
    *config = load_config();
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to record the opened project path
fn set_last_project_system(
    mut events: MessageReader<SetLastProjectRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_project_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Set last project to {:?}", event.path);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetLastProjectRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    set_last_project_system.run_if(on_message::<SetLastProjectRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert!(data.last_project_path.is_none());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            last_project_path: Some(PathBuf::from("/path/to/project")),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, data);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let parsed: AppConfigData =
            serde_json::from_str(r#"{ "last_project_path": null }"#).unwrap();
        assert_eq!(parsed, AppConfigData::default());
    }
}
