//! Deterministic Custom Model Data assignment.
//!
//! IDs are handed out in a fixed order so re-exporting an unchanged project produces the
//! same predicate overrides: base bones by name, then variant models by variant name and
//! bone name.

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_rig_core::{CustomModelDataAllocator, RenderedRig, ResourceLocation};

/// One model reachable through the display item's `custom_model_data` predicate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CmdAssignment {
    pub custom_model_data: u32,
    pub model: ResourceLocation,
    pub bone: Uuid,
    /// `None` for the base model.
    pub variant: Option<String>,
}

/// Fill `custom_model_data` on every bone and variant model of `rig`.
pub fn assign_custom_model_data(
    rig: &mut RenderedRig,
    allocator: &mut CustomModelDataAllocator,
) -> Vec<CmdAssignment> {
    let mut assignments = Vec::new();

    let mut bones: Vec<Uuid> = rig.bone_map.keys().copied().collect();
    bones.sort_by(|a, b| rig.bone_map[a].name.cmp(&rig.bone_map[b].name));
    for uuid in &bones {
        let Some(bone) = rig.bone_map.get_mut(uuid) else {
            continue;
        };
        let id = allocator.get();
        bone.custom_model_data = Some(id);
        assignments.push(CmdAssignment {
            custom_model_data: id,
            model: bone.resource_location.clone(),
            bone: bone.uuid,
            variant: None,
        });
    }

    let mut variant_names: Vec<String> = rig.variant_models.keys().cloned().collect();
    variant_names.sort();
    for name in variant_names {
        let Some(variant) = rig.variant_models.get_mut(&name) else {
            continue;
        };
        let mut models: Vec<(String, Uuid)> = variant
            .models
            .keys()
            .map(|uuid| {
                let bone_name = rig
                    .bone_map
                    .get(uuid)
                    .map(|b| b.name.clone())
                    .unwrap_or_default();
                (bone_name, *uuid)
            })
            .collect();
        models.sort();
        for (_, uuid) in models {
            let Some(model) = variant.models.get_mut(&uuid) else {
                continue;
            };
            let id = allocator.get();
            model.custom_model_data = Some(id);
            assignments.push(CmdAssignment {
                custom_model_data: id,
                model: model.resource_location.clone(),
                bone: uuid,
                variant: Some(name.clone()),
            });
        }
    }

    debug!(
        "assigned {} custom model data ids (next candidate {})",
        assignments.len(),
        allocator.current()
    );
    assignments
}
