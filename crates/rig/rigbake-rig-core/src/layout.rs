//! Pack-relative folder layout for one exported project.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RigError;
use crate::resource::ResourceLocation;

/// Where models, textures and animation datasets of a project land inside the packs.
/// All paths are relative to the resource-pack (or data-pack) root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportLayout {
    pub namespace: String,
    pub project_name: String,
}

impl ExportLayout {
    pub fn new(namespace: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            project_name: project_name.into(),
        }
    }

    /// `assets/<ns>/models/item/<project>`
    pub fn model_folder(&self) -> PathBuf {
        PathBuf::from("assets")
            .join(&self.namespace)
            .join("models")
            .join("item")
            .join(&self.project_name)
    }

    /// `assets/<ns>/textures/item/<project>`
    pub fn texture_folder(&self) -> PathBuf {
        PathBuf::from("assets")
            .join(&self.namespace)
            .join("textures")
            .join("item")
            .join(&self.project_name)
    }

    /// `data/<ns>/rigbake/<project>/animations`
    pub fn dataset_folder(&self) -> PathBuf {
        PathBuf::from("data")
            .join(&self.namespace)
            .join("rigbake")
            .join(&self.project_name)
            .join("animations")
    }

    /// Model file for a bone, optionally nested under a variant folder.
    pub fn bone_model_path(&self, variant: Option<&str>, bone_name: &str) -> PathBuf {
        let mut path = self.model_folder();
        if let Some(variant) = variant {
            path = path.join(variant);
        }
        path.join(format!("{bone_name}.json"))
    }

    pub fn texture_path(&self, texture_stem: &str) -> PathBuf {
        self.texture_folder().join(format!("{texture_stem}.png"))
    }

    /// Resolve a pack path to its location, naming `owner` in the error.
    pub fn locate(&self, owner: &str, path: &Path) -> Result<ResourceLocation, RigError> {
        ResourceLocation::from_pack_path(path).map_err(|_| RigError::InvalidResourcePath {
            owner: owner.to_string(),
            path: path.display().to_string(),
        })
    }
}
