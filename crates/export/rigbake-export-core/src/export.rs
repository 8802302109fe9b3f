//! One export pass: render, bake, allocate, assemble, write.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::json;

use rigbake_animation_core::{
    render_animations, AnimationSpec, NoProgress, PoseEvaluator, RenderedAnimation,
};
use rigbake_rig_core::{
    render_rig, CustomModelDataAllocator, RenderedRig, ResourceLocation, RotationWarning,
    SceneGraph, TargetVersion,
};

use crate::cmd::{assign_custom_model_data, CmdAssignment};
use crate::config::ExportConfig;
use crate::confirm::ExportConfirm;
use crate::dataset::serialize_datasets;
use crate::error::ExportError;
use crate::predicate::PredicateFile;
use crate::vfs::{merge_json, write_tree, FileContent, ResourceSink, VirtualFolder};

/// What an export produced. Nothing is written unless every step succeeded.
#[derive(Clone, Debug)]
pub struct ExportReport {
    pub rig: RenderedRig,
    pub animations: Vec<RenderedAnimation>,
    pub assignments: Vec<CmdAssignment>,
    pub warnings: Vec<RotationWarning>,
    pub files_written: usize,
    /// Sink paths the host fills with texture images.
    pub texture_paths: Vec<PathBuf>,
}

/// `(resource pack, data pack)` format numbers for `version`.
pub fn pack_formats(version: TargetVersion) -> (u32, u32) {
    match version {
        TargetVersion::V1_19_4 => (13, 12),
        TargetVersion::V1_20_4 => (22, 26),
        TargetVersion::V1_21_4 => (46, 61),
    }
}

fn pack_meta(format: u32, project: &str) -> FileContent {
    FileContent::Json(json!({
        "pack": {
            "pack_format": format,
            "description": format!("{project} (rigbake)"),
        }
    }))
}

fn json_bytes<T: serde::Serialize>(value: &T) -> Result<FileContent, ExportError> {
    Ok(FileContent::Bytes(serde_json::to_vec_pretty(value)?))
}

/// Existing predicate file, or a fresh one. Asks before taking over a foreign file.
fn load_predicate<S, C>(
    sink: &S,
    path: &Path,
    item: &ResourceLocation,
    confirm: &mut C,
) -> Result<PredicateFile, ExportError>
where
    S: ResourceSink + ?Sized,
    C: ExportConfirm + ?Sized,
{
    let Some(bytes) = sink.read(path)? else {
        return Ok(PredicateFile::for_item(item));
    };
    let existing = PredicateFile::from_slice(&path.display().to_string(), &bytes)?;
    if !existing.is_foreign() {
        return Ok(existing);
    }
    warn!("{} was not generated by rigbake", path.display());
    if !confirm.confirm_overwrite(path) {
        return Err(ExportError::Cancelled {
            path: path.display().to_string(),
        });
    }
    Ok(PredicateFile::for_item(item))
}

/// Export `scene` and `animations` into `sink`.
///
/// Both packs are assembled in memory first; `sink` is only read (for the shared
/// predicate file) until the final write.
pub fn export_project<E, C, S>(
    scene: &SceneGraph,
    animations: &[AnimationSpec],
    evaluator: &mut E,
    config: &ExportConfig,
    confirm: &mut C,
    sink: &mut S,
) -> Result<ExportReport, ExportError>
where
    E: PoseEvaluator + ?Sized,
    C: ExportConfirm + ?Sized,
    S: ResourceSink + ?Sized,
{
    config.validate()?;
    let layout = config.layout();
    let rp = config.resource_pack.as_path();
    let dp = config.data_pack.as_path();

    let rendered = render_rig(scene, &layout, &config.render)?;
    let mut rig = rendered.rig;
    let baked = render_animations(
        scene,
        &rig,
        animations,
        evaluator,
        &config.baking,
        &mut NoProgress,
    )?;

    let predicate_path = rp.join(config.predicate_path()?);
    let item = config.display_item()?;
    let mut predicate = load_predicate(&*sink, &predicate_path, &item, confirm)?;
    let rig_key = config.rig_key();
    let mut allocator = CustomModelDataAllocator::with_used_ids(
        config.first_custom_model_data,
        predicate.sibling_ids(&rig_key),
    );
    let assignments = assign_custom_model_data(&mut rig, &mut allocator);
    predicate.replace_rig(&rig_key, &assignments);

    let mut root = VirtualFolder::new("");
    let (rp_format, dp_format) = pack_formats(config.render.target_version);
    root.add_file(
        &rp.join("pack.mcmeta"),
        pack_meta(rp_format, &config.project_name),
    );
    root.add_file(
        &dp.join("pack.mcmeta"),
        pack_meta(dp_format, &config.project_name),
    );

    for (uuid, model) in &rig.models {
        if let Some(bone) = rig.bone_map.get(uuid) {
            root.add_file(&rp.join(&bone.model_path), json_bytes(model)?);
        }
    }
    for variant in rig.variant_models.values() {
        for model in variant.models.values() {
            root.add_file(&rp.join(&model.model_path), json_bytes(&model.model)?);
        }
    }
    root.add_file(
        &predicate_path,
        FileContent::Bytes(predicate.to_json_vec()?),
    );

    let dataset_folder = dp.join(layout.dataset_folder());
    let datasets = serialize_datasets(&baked, config.serialization_workers)?;
    for (anim, bytes) in baked.iter().zip(datasets) {
        ResourceLocation::new(config.namespace.as_str(), anim.name.as_str())?;
        root.add_file(
            &dataset_folder.join(format!("{}.json", anim.name)),
            FileContent::Bytes(bytes),
        );
    }
    if let Some(project_folder) = dataset_folder.parent() {
        root.add_file(&project_folder.join("rig.json"), json_bytes(&rig)?);
    }

    let files_written = write_tree(sink, &root, Some(&merge_json))?;
    let texture_paths = rig.textures.values().map(|t| rp.join(&t.path)).collect();
    info!(
        "exported '{}': {} bones, {} animations, {} custom model data ids, {} files",
        config.project_name,
        rig.bone_map.len(),
        baked.len(),
        assignments.len(),
        files_written
    );

    Ok(ExportReport {
        rig,
        animations: baked,
        assignments,
        warnings: rendered.warnings,
        files_written,
        texture_paths,
    })
}
