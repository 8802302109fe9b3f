//! Shared JSON fixtures for rigbake tests, looked up by name through
//! `fixtures/manifest.json` at the workspace root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    scenes: HashMap<String, String>,
    animations: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Scene-graph snapshots (`SceneGraph` JSON).
pub mod scenes {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.scenes.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.scenes, "scene", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_json(lookup(&MANIFEST.scenes, "scene", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.scenes, "scene", name)?))
    }
}

/// Animation lists (JSON arrays of `AnimationSpec`).
pub mod animations {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.animations.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.animations, "animation", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_json(lookup(&MANIFEST.animations, "animation", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.animations, "animation", name)?))
    }
}
