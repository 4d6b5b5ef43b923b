//! Model staging and source-file probing.
//!
//! Picked files are copied into a unique directory under the staging root
//! together with any dependency files the source references, and wait
//! there until the user confirms or abandons the import. Only the glTF
//! JSON document is inspected (material names, skin joint counts,
//! external URIs); mesh data is never parsed here. Automatic material
//! attributes therefore work for separate `.gltf` files only — binary
//! and foreign formats stage fine but probe to zero materials and bones.

use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde_json::Value;
use tracing::debug;

use super::asset::{MaterialAttributes, SourceMaterial};

/// File extensions accepted by the import dialog. The empty entry admits
/// extension-less files.
pub const SUPPORTED_MODEL_FORMATS: &[&str] = &["", "gltf", "g3db", "glb", "obj", "fbx", "dae"];

/// Lowercased extension of `path`, or the empty string when there is none.
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported_model_file(path: &Path) -> bool {
    SUPPORTED_MODEL_FORMATS.contains(&file_extension(path).as_str())
}

/// What the probe learned about a staged source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelInfo {
    pub materials: Vec<SourceMaterial>,
    pub num_bones: u32,
}

/// A staged copy of a picked model file, pending import confirmation.
#[derive(Debug, Clone)]
pub struct StagedModel {
    /// The staged model file inside its staging directory.
    pub file: PathBuf,
    /// Dependency files copied alongside it (buffers, textures, .mtl).
    pub dependencies: Vec<PathBuf>,
    pub info: ModelInfo,
}

impl StagedModel {
    /// The per-model staging directory, i.e. the staged file's parent.
    pub fn staging_dir(&self) -> Option<&Path> {
        self.file.parent()
    }
}

/// Stages model files into a temp working area and reads material data
/// back out of them.
#[derive(Resource)]
pub struct ModelImporter {
    staging_root: PathBuf,
}

impl Default for ModelImporter {
    fn default() -> Self {
        Self::new(crate::paths::staging_root())
    }
}

impl ModelImporter {
    pub fn new(staging_root: PathBuf) -> Self {
        Self { staging_root }
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Copies `source` and its discovered dependencies into a fresh
    /// staging directory and probes the copy.
    pub fn stage_to_temp(&self, source: &Path) -> std::io::Result<StagedModel> {
        let dir_name = uuid::Uuid::new_v4().simple().to_string();
        let staging_dir = self.staging_root.join(&dir_name[..8]);
        std::fs::create_dir_all(&staging_dir)?;

        let file_name = source.file_name().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name")
        })?;
        let staged_file = staging_dir.join(file_name);
        std::fs::copy(source, &staged_file)?;

        let mut dependencies = Vec::new();
        for relative in discover_dependencies(source)? {
            let Some(source_dir) = source.parent() else {
                continue;
            };
            let dep_source = source_dir.join(&relative);
            if !dep_source.is_file() {
                debug!("Skipping missing dependency {:?}", dep_source);
                continue;
            }
            let dep_target = staging_dir.join(&relative);
            if let Some(parent) = dep_target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&dep_source, &dep_target)?;
            dependencies.push(dep_target);
        }

        let info = probe(&staged_file)?;
        debug!(
            "Staged {:?} with {} dependencies, {} materials, {} bones",
            staged_file,
            dependencies.len(),
            info.materials.len(),
            info.num_bones
        );

        Ok(StagedModel {
            file: staged_file,
            dependencies,
            info,
        })
    }

    /// Reads material data for `source` out of the staged file and writes
    /// it into `target`. Formats without a readable material table leave
    /// the target's attributes at their defaults.
    pub fn populate_material_attributes(
        &self,
        staged: &StagedModel,
        source: &SourceMaterial,
        target: &mut super::asset::MaterialAsset,
    ) -> std::io::Result<()> {
        if file_extension(&staged.file) != "gltf" {
            return Ok(());
        }

        let doc = read_gltf_document(&staged.file)?;
        if let Some(attrs) = gltf_material_attributes(&doc, &source.id) {
            target.attributes = attrs;
        }
        Ok(())
    }
}

/// Dependency file paths referenced by `source`, relative to its directory.
fn discover_dependencies(source: &Path) -> std::io::Result<Vec<PathBuf>> {
    match file_extension(source).as_str() {
        "gltf" => {
            let doc = read_gltf_document(source)?;
            Ok(gltf_external_uris(&doc).into_iter().map(PathBuf::from).collect())
        }
        "obj" => {
            let text = std::fs::read_to_string(source)?;
            Ok(text
                .lines()
                .filter_map(|line| line.trim().strip_prefix("mtllib "))
                .map(|name| PathBuf::from(name.trim()))
                .collect())
        }
        _ => Ok(Vec::new()),
    }
}

fn probe(staged_file: &Path) -> std::io::Result<ModelInfo> {
    if file_extension(staged_file) != "gltf" {
        return Ok(ModelInfo::default());
    }
    let doc = read_gltf_document(staged_file)?;
    Ok(probe_gltf(&doc))
}

fn read_gltf_document(path: &Path) -> std::io::Result<Value> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(std::io::Error::other)
}

fn probe_gltf(doc: &Value) -> ModelInfo {
    let materials = doc
        .get("materials")
        .and_then(Value::as_array)
        .map(|materials| {
            materials
                .iter()
                .enumerate()
                .map(|(index, material)| SourceMaterial {
                    id: material
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("material_{index}")),
                })
                .collect()
        })
        .unwrap_or_default();

    let num_bones = doc
        .get("skins")
        .and_then(Value::as_array)
        .and_then(|skins| {
            skins
                .iter()
                .filter_map(|skin| skin.get("joints").and_then(Value::as_array))
                .map(|joints| joints.len() as u32)
                .max()
        })
        .unwrap_or(0);

    ModelInfo { materials, num_bones }
}

/// Relative `buffers[].uri` and `images[].uri` entries. Embedded data
/// URIs and absolute locations are not staging dependencies.
fn gltf_external_uris(doc: &Value) -> Vec<String> {
    let mut uris = Vec::new();
    for key in ["buffers", "images"] {
        let Some(entries) = doc.get(key).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let Some(uri) = entry.get("uri").and_then(Value::as_str) else {
                continue;
            };
            if uri.starts_with("data:") || uri.contains("://") || uri.starts_with('/') {
                continue;
            }
            uris.push(uri.to_string());
        }
    }
    uris
}

fn gltf_material_attributes(doc: &Value, source_id: &str) -> Option<MaterialAttributes> {
    let materials = doc.get("materials")?.as_array()?;
    let material = materials.iter().enumerate().find_map(|(index, material)| {
        let name = material
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("material_{index}"));
        (name == source_id).then_some(material)
    })?;

    let mut attrs = MaterialAttributes::default();
    if let Some(pbr) = material.get("pbrMetallicRoughness") {
        if let Some(factor) = float_array::<4>(pbr.get("baseColorFactor")) {
            attrs.base_color_factor = factor;
        }
        if let Some(metallic) = pbr.get("metallicFactor").and_then(Value::as_f64) {
            attrs.metallic_factor = metallic as f32;
        }
        if let Some(roughness) = pbr.get("roughnessFactor").and_then(Value::as_f64) {
            attrs.roughness_factor = roughness as f32;
        }
    }
    if let Some(emissive) = float_array::<3>(material.get("emissiveFactor")) {
        attrs.emissive_factor = emissive;
    }
    if let Some(double_sided) = material.get("doubleSided").and_then(Value::as_bool) {
        attrs.double_sided = double_sided;
    }
    Some(attrs)
}

fn float_array<const N: usize>(value: Option<&Value>) -> Option<[f32; N]> {
    let array = value?.as_array()?;
    if array.len() != N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, entry) in out.iter_mut().zip(array) {
        *slot = entry.as_f64()? as f32;
    }
    Some(out)
}
