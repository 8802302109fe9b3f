//! Namespaced resource locations (`namespace:path/to/thing`).
//!
//! Grammar:
//!   namespace ':' path
//! - namespace: one or more of `[a-z0-9_.-]`
//! - path: `/`-separated segments of `[a-z0-9_.-]`, no empty segments
//!
//! Locations are derived from pack-relative file paths
//! (`assets/<namespace>/<models|textures>/<path>.<ext>`) via
//! [`ResourceLocation::from_pack_path`].

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use crate::error::RigError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
}

fn valid_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn invalid(location: &str, reason: &str) -> RigError {
    RigError::InvalidResourceLocation {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, RigError> {
        let loc = Self {
            namespace: namespace.into(),
            path: path.into(),
        };
        loc.validate()?;
        Ok(loc)
    }

    /// Parse `namespace:path`. A missing namespace is an error (no implicit default).
    pub fn parse(s: &str) -> Result<Self, RigError> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| invalid(s, "missing ':' separator"))?;
        Self::new(namespace, path)
    }

    fn validate(&self) -> Result<(), RigError> {
        let full = self.to_string();
        if self.namespace.is_empty() {
            return Err(invalid(&full, "empty namespace"));
        }
        if !self.namespace.chars().all(valid_namespace_char) {
            return Err(invalid(&full, "namespace contains invalid characters"));
        }
        if self.path.is_empty() {
            return Err(invalid(&full, "empty path"));
        }
        for segment in self.path.split('/') {
            if segment.is_empty() {
                return Err(invalid(&full, "empty path segment"));
            }
            if !segment.chars().all(valid_namespace_char) {
                return Err(invalid(&full, "path contains invalid characters"));
            }
        }
        Ok(())
    }

    /// Derive the location of a pack file such as
    /// `assets/ns/models/item/rig/head.json` -> `ns:item/rig/head`.
    ///
    /// Anything before the first `assets` component (the pack root) is ignored, so later
    /// segments may themselves be named `assets`.
    pub fn from_pack_path(path: &Path) -> Result<Self, RigError> {
        let display = path.display().to_string();
        let bad = || RigError::InvalidResourcePath {
            owner: display.clone(),
            path: display.clone(),
        };

        let mut parts: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(os) => parts.push(os.to_str().ok_or_else(bad)?.to_string()),
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => return Err(bad()),
            }
        }
        let assets = parts.iter().position(|p| p == "assets").ok_or_else(bad)?;
        let rest = &parts[assets + 1..];
        // namespace, kind, at least one path segment
        if rest.len() < 3 || !matches!(rest[1].as_str(), "models" | "textures") {
            return Err(bad());
        }
        let namespace = &rest[0];
        let mut segments: Vec<String> = rest[2..].to_vec();
        if let Some(last) = segments.last_mut() {
            if let Some((stem, _ext)) = last.rsplit_once('.') {
                *last = stem.to_string();
            }
        }
        Self::new(namespace.clone(), segments.join("/")).map_err(|_| bad())
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceLocation {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ResourceLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceLocation::parse(&s).map_err(de::Error::custom)
    }
}
