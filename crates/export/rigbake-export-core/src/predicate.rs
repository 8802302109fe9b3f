//! The display item's model file, shared by every rig exported into the same pack.
//!
//! ```json
//! {
//!   "parent": "minecraft:item/generated",
//!   "textures": { "layer0": "minecraft:item/white_dye" },
//!   "overrides": [ { "predicate": { "custom_model_data": 1 }, "model": "ns:item/rig/head" } ],
//!   "rigbake": { "rigs": { "ns:rig": [1] } }
//! }
//! ```
//!
//! The `rigbake` block records which IDs each rig owns. A file without it was not written
//! by this exporter.

use hashbrown::HashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use rigbake_rig_core::ResourceLocation;

use crate::cmd::CmdAssignment;
use crate::error::ExportError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Predicate {
    pub custom_model_data: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PredicateOverride {
    pub predicate: Predicate,
    pub model: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PredicateMeta {
    /// Rig key (`namespace:project`) to the IDs it owns.
    #[serde(default)]
    pub rigs: IndexMap<String, Vec<u32>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PredicateFile {
    pub parent: String,
    #[serde(default)]
    pub textures: IndexMap<String, String>,
    #[serde(default)]
    pub overrides: Vec<PredicateOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rigbake: Option<PredicateMeta>,
    /// Keys we do not manage, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PredicateFile {
    /// Fresh model for a vanilla flat item.
    pub fn for_item(item: &ResourceLocation) -> Self {
        let mut textures = IndexMap::new();
        textures.insert(
            "layer0".to_string(),
            format!("{}:item/{}", item.namespace, item.path),
        );
        Self {
            parent: "minecraft:item/generated".to_string(),
            textures,
            overrides: Vec::new(),
            rigbake: Some(PredicateMeta::default()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_slice(path: &str, bytes: &[u8]) -> Result<Self, ExportError> {
        serde_json::from_slice(bytes).map_err(|e| ExportError::CorruptPredicateFile {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn is_foreign(&self) -> bool {
        self.rigbake.is_none()
    }

    /// IDs owned by every rig except `rig_key`.
    pub fn sibling_ids(&self, rig_key: &str) -> HashSet<u32> {
        self.rigbake
            .iter()
            .flat_map(|meta| meta.rigs.iter())
            .filter(|(key, _)| key.as_str() != rig_key)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// Drop `rig_key`'s previous overrides and record `assignments` in their place.
    pub fn replace_rig(&mut self, rig_key: &str, assignments: &[CmdAssignment]) {
        let meta = self.rigbake.get_or_insert_with(PredicateMeta::default);
        if let Some(previous) = meta.rigs.shift_remove(rig_key) {
            let previous: HashSet<u32> = previous.into_iter().collect();
            self.overrides
                .retain(|o| !previous.contains(&o.predicate.custom_model_data));
        }

        let mut ids: Vec<u32> = assignments.iter().map(|a| a.custom_model_data).collect();
        ids.sort_unstable();
        meta.rigs.insert(rig_key.to_string(), ids);

        self.overrides
            .extend(assignments.iter().map(|a| PredicateOverride {
                predicate: Predicate {
                    custom_model_data: a.custom_model_data,
                },
                model: a.model.to_string(),
            }));
        self.overrides
            .sort_by_key(|o| o.predicate.custom_model_data);
    }
}
