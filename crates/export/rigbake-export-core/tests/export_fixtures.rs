use std::path::Path;

use anyhow::Result;
use serde_json::json;

use rigbake_animation_core::{AnimationSpec, KeyframePoseEvaluator};
use rigbake_export_core::{
    export_project, AlwaysConfirm, ExportConfig, ExportError, ExportReport, FsSink,
    MemorySink, NeverConfirm, PredicateFile, ResourceSink,
};
use rigbake_rig_core::SceneGraph;

const PREDICATE: &str = "resource_pack/assets/minecraft/models/item/white_dye.json";

fn dragon() -> Result<(SceneGraph, Vec<AnimationSpec>)> {
    let scene = SceneGraph::from_json_str(&rigbake_test_fixtures::scenes::json("dragon")?)?;
    let anims =
        AnimationSpec::list_from_json_str(&rigbake_test_fixtures::animations::json("dragon")?)?;
    Ok((scene, anims))
}

fn config() -> ExportConfig {
    ExportConfig {
        namespace: "ns".into(),
        project_name: "dragon".into(),
        ..ExportConfig::default()
    }
}

fn export<S: ResourceSink>(sink: &mut S) -> Result<ExportReport, ExportError> {
    let (scene, anims) = dragon().expect("dragon fixtures");
    let mut evaluator = KeyframePoseEvaluator::new(&scene);
    export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config(),
        &mut AlwaysConfirm,
        sink,
    )
}

fn cmd_of(report: &ExportReport, variant: Option<&str>, bone: &str) -> u32 {
    report
        .assignments
        .iter()
        .find(|a| a.variant.as_deref() == variant && report.rig.bone_map[&a.bone].name == bone)
        .map(|a| a.custom_model_data)
        .expect("assignment")
}

#[test]
fn writes_models_predicate_and_datasets() -> Result<()> {
    let mut sink = MemorySink::new();
    let report = export(&mut sink)?;

    assert_eq!(report.files_written, 13);
    assert_eq!(sink.files.len(), 13);
    for path in [
        "resource_pack/pack.mcmeta",
        "data_pack/pack.mcmeta",
        "resource_pack/assets/ns/models/item/dragon/head.json",
        "resource_pack/assets/ns/models/item/dragon/red/fin.json",
        "data_pack/data/ns/rigbake/dragon/animations/walk.json",
        "data_pack/data/ns/rigbake/dragon/animations/roar.json",
        "data_pack/data/ns/rigbake/dragon/rig.json",
        PREDICATE,
    ] {
        assert!(sink.files.contains_key(Path::new(path)), "missing {path}");
    }

    let walk = sink
        .json("data_pack/data/ns/rigbake/dragon/animations/walk.json")
        .unwrap();
    assert_eq!(walk["duration"], 21);
    assert_eq!(walk["frames"][10]["variant"]["name"], "red");
    assert!(walk["frames"][10]["nodes"]["head"].is_array());

    let mcmeta = sink.json("resource_pack/pack.mcmeta").unwrap();
    assert_eq!(mcmeta["pack"]["pack_format"], 46);

    assert_eq!(
        report.texture_paths[0],
        Path::new("resource_pack/assets/ns/textures/item/dragon/skin.png")
    );
    Ok(())
}

#[test]
fn custom_model_data_follows_name_order() -> Result<()> {
    let mut sink = MemorySink::new();
    let report = export(&mut sink)?;

    assert_eq!(cmd_of(&report, None, "body"), 1);
    assert_eq!(cmd_of(&report, None, "fin"), 2);
    assert_eq!(cmd_of(&report, None, "head"), 3);
    assert_eq!(cmd_of(&report, None, "tail"), 4);
    assert_eq!(cmd_of(&report, Some("red"), "body"), 5);
    assert_eq!(cmd_of(&report, Some("red"), "fin"), 6);
    assert_eq!(cmd_of(&report, Some("red"), "head"), 7);

    let head = report.rig.bone_by_name("head").unwrap();
    assert_eq!(head.custom_model_data, Some(3));

    let predicate = sink.json(PREDICATE).unwrap();
    let overrides = predicate["overrides"].as_array().unwrap();
    assert_eq!(overrides.len(), 7);
    assert_eq!(overrides[2]["predicate"]["custom_model_data"], 3);
    assert_eq!(overrides[2]["model"], "ns:item/dragon/head");
    assert_eq!(overrides[6]["model"], "ns:item/dragon/red/head");
    assert_eq!(predicate["rigbake"]["rigs"]["ns:dragon"], json!([1, 2, 3, 4, 5, 6, 7]));
    Ok(())
}

#[test]
fn sibling_rig_ids_are_skipped_and_reexport_is_stable() -> Result<()> {
    let mut sink = MemorySink::new();
    let mut shared = PredicateFile::for_item(&"minecraft:white_dye".parse()?);
    let cat = rigbake_export_core::CmdAssignment {
        custom_model_data: 2,
        model: "ns:item/cat/body".parse()?,
        bone: uuid::Uuid::nil(),
        variant: None,
    };
    let cat_head = rigbake_export_core::CmdAssignment {
        custom_model_data: 3,
        model: "ns:item/cat/head".parse()?,
        ..cat.clone()
    };
    shared.replace_rig("ns:cat", &[cat, cat_head]);
    sink.write(Path::new(PREDICATE), &shared.to_json_vec()?)?;

    let first = export(&mut sink)?;
    assert_eq!(cmd_of(&first, None, "body"), 1);
    assert_eq!(cmd_of(&first, None, "fin"), 4);
    assert_eq!(cmd_of(&first, Some("red"), "head"), 9);

    let second = export(&mut sink)?;
    assert_eq!(first.assignments, second.assignments);

    let predicate = PredicateFile::from_slice(PREDICATE, &sink.read(Path::new(PREDICATE))?.unwrap())?;
    assert_eq!(predicate.overrides.len(), 9);
    let meta = predicate.rigbake.unwrap();
    assert_eq!(meta.rigs["ns:cat"], vec![2, 3]);
    assert_eq!(meta.rigs["ns:dragon"], vec![1, 4, 5, 6, 7, 8, 9]);
    Ok(())
}

#[test]
fn declining_a_foreign_predicate_cancels_cleanly() -> Result<()> {
    let vanilla = br#"{ "parent": "minecraft:item/generated",
                        "textures": { "layer0": "minecraft:item/white_dye" } }"#;
    let mut sink = MemorySink::new();
    sink.write(Path::new(PREDICATE), vanilla)?;

    let (scene, anims) = dragon()?;
    let mut evaluator = KeyframePoseEvaluator::new(&scene);
    let err = export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config(),
        &mut NeverConfirm,
        &mut sink,
    )
    .unwrap_err();
    assert!(err.is_expected());
    assert!(matches!(err, ExportError::Cancelled { .. }));
    assert_eq!(sink.files.len(), 1, "nothing written after cancelling");

    let mut asked = Vec::new();
    let mut confirm = |path: &Path| {
        asked.push(path.to_path_buf());
        true
    };
    export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config(),
        &mut confirm,
        &mut sink,
    )?;
    assert_eq!(asked, vec![Path::new(PREDICATE).to_path_buf()]);
    let predicate = sink.json(PREDICATE).unwrap();
    assert!(predicate.get("rigbake").is_some());
    Ok(())
}

#[test]
fn bake_errors_abort_before_writing() -> Result<()> {
    let (scene, mut anims) = dragon()?;
    anims.truncate(1);
    let mut sink = MemorySink::new();
    let mut evaluator = KeyframePoseEvaluator::new(&scene);
    let err = export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config(),
        &mut AlwaysConfirm,
        &mut sink,
    )
    .unwrap_err();
    assert_eq!(err.category(), "reference");
    assert!(!err.is_expected());
    assert!(sink.files.is_empty());
    Ok(())
}

#[test]
fn locator_named_like_a_bone_aborts_before_writing() -> Result<()> {
    let json = rigbake_test_fixtures::scenes::json("dragon")?.replace("\"mouth\"", "\"head\"");
    let scene = SceneGraph::from_json_str(&json)?;
    let anims =
        AnimationSpec::list_from_json_str(&rigbake_test_fixtures::animations::json("dragon")?)?;
    let mut sink = MemorySink::new();
    let mut evaluator = KeyframePoseEvaluator::new(&scene);
    let err = export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config(),
        &mut AlwaysConfirm,
        &mut sink,
    )
    .unwrap_err();
    assert_eq!(err.category(), "validation");
    assert!(err.to_string().contains("head"));
    assert!(sink.files.is_empty());
    Ok(())
}

#[test]
fn project_named_assets_exports() -> Result<()> {
    let mut sink = MemorySink::new();
    let (scene, anims) = dragon()?;
    let mut evaluator = KeyframePoseEvaluator::new(&scene);
    let config = ExportConfig {
        project_name: "assets".into(),
        ..config()
    };
    let report = export_project(
        &scene,
        &anims,
        &mut evaluator,
        &config,
        &mut AlwaysConfirm,
        &mut sink,
    )?;
    assert_eq!(report.files_written, 13);
    let head = report.rig.bone_by_name("head").unwrap();
    assert_eq!(head.resource_location.to_string(), "ns:item/assets/head");
    assert!(sink
        .files
        .contains_key(Path::new("resource_pack/assets/ns/models/item/assets/red/head.json")));
    Ok(())
}

#[test]
fn fs_sink_merges_existing_pack_meta() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mcmeta = dir.path().join("resource_pack/pack.mcmeta");
    std::fs::create_dir_all(mcmeta.parent().unwrap())?;
    std::fs::write(
        &mcmeta,
        r#"{ "pack": { "pack_format": 1, "description": "mine" }, "filter": { "block": [] } }"#,
    )?;

    let mut sink = FsSink::new(dir.path());
    let report = export(&mut sink)?;
    assert_eq!(report.files_written, 13);

    let merged: serde_json::Value = serde_json::from_slice(&std::fs::read(&mcmeta)?)?;
    assert_eq!(merged["pack"]["pack_format"], 46);
    assert_eq!(merged["filter"], json!({ "block": [] }));
    assert!(dir
        .path()
        .join("resource_pack/assets/ns/models/item/dragon/body.json")
        .exists());
    Ok(())
}
