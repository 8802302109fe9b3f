//! Export configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use rigbake_animation_core::BakingConfig;
use rigbake_rig_core::{ExportLayout, RenderConfig, ResourceLocation};

use crate::error::ExportError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Namespace every generated model, texture and dataset lives under.
    pub namespace: String,
    pub project_name: String,
    /// Resource pack root, relative to the sink.
    pub resource_pack: PathBuf,
    /// Data pack root, relative to the sink.
    pub data_pack: PathBuf,
    /// Vanilla item whose model carries the Custom Model Data overrides.
    pub display_item: String,
    pub first_custom_model_data: u32,
    /// Threads used to serialize animation datasets. `0` lets rayon decide.
    pub serialization_workers: usize,
    pub render: RenderConfig,
    pub baking: BakingConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            namespace: "rigbake".to_string(),
            project_name: "rig".to_string(),
            resource_pack: PathBuf::from("resource_pack"),
            data_pack: PathBuf::from("data_pack"),
            display_item: "minecraft:white_dye".to_string(),
            first_custom_model_data: 1,
            serialization_workers: 4,
            render: RenderConfig::default(),
            baking: BakingConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ExportError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Namespace and project name must be usable as resource-location segments.
    pub fn validate(&self) -> Result<(), ExportError> {
        ResourceLocation::new(self.namespace.as_str(), self.project_name.as_str()).map_err(
            |e| ExportError::InvalidConfig {
                reason: e.to_string(),
            },
        )?;
        if self.project_name.contains('/') {
            return Err(ExportError::InvalidConfig {
                reason: format!("project name '{}' must be one segment", self.project_name),
            });
        }
        self.display_item()?;
        Ok(())
    }

    pub fn layout(&self) -> ExportLayout {
        ExportLayout::new(self.namespace.as_str(), self.project_name.as_str())
    }

    pub fn display_item(&self) -> Result<ResourceLocation, ExportError> {
        ResourceLocation::parse(&self.display_item).map_err(|e| ExportError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// `assets/<item ns>/models/item/<item>.json`, relative to the resource pack.
    pub fn predicate_path(&self) -> Result<PathBuf, ExportError> {
        let item = self.display_item()?;
        Ok(PathBuf::from("assets")
            .join(&item.namespace)
            .join("models")
            .join("item")
            .join(format!("{}.json", item.path)))
    }

    /// Key under which this rig's IDs are recorded in the predicate file.
    pub fn rig_key(&self) -> String {
        format!("{}:{}", self.namespace, self.project_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbake_rig_core::TargetVersion;

    #[test]
    fn partial_json_fills_defaults() {
        let config = ExportConfig::from_json_str(
            r#"{ "namespace": "zoo", "project_name": "dragon",
                 "render": { "target_version": "1.20.4" } }"#,
        )
        .unwrap();
        assert_eq!(config.render.target_version, TargetVersion::V1_20_4);
        assert_eq!(config.render.model_size_budget, 24.0);
        assert_eq!(config.baking.ticks_per_second, 20);
        assert_eq!(config.first_custom_model_data, 1);
        assert_eq!(config.rig_key(), "zoo:dragon");
        assert_eq!(
            config.predicate_path().unwrap(),
            PathBuf::from("assets/minecraft/models/item/white_dye.json")
        );
    }

    #[test]
    fn rejects_unusable_names() {
        let err = ExportConfig::from_json_str(r#"{ "project_name": "My Dragon" }"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig { .. }));
        let err = ExportConfig::from_json_str(r#"{ "display_item": "white_dye" }"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig { .. }));
    }
}
