//! In-memory pack file tree and the sinks it is written to.
//!
//! The exporter assembles everything into a [`VirtualFolder`] first and only touches the
//! sink once the whole tree exists, so a failed export writes nothing.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, trace};
use serde_json::Value;

use crate::error::ExportError;

#[derive(Clone, Debug, PartialEq)]
pub enum FileContent {
    /// Merged with existing JSON at the same path when the writer has a merge function.
    Json(Value),
    Bytes(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VirtualFile {
    pub name: String,
    pub content: FileContent,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualFolder {
    pub name: String,
    pub folders: IndexMap<String, VirtualFolder>,
    pub files: IndexMap<String, VirtualFile>,
}

impl VirtualFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Folder at `path`, creating missing levels.
    pub fn folder_mut(&mut self, path: &Path) -> &mut VirtualFolder {
        let mut folder = self;
        for part in path.iter() {
            let name = part.to_string_lossy().into_owned();
            folder = folder
                .folders
                .entry(name.clone())
                .or_insert_with(|| VirtualFolder::new(name));
        }
        folder
    }

    /// Add or replace the file at `path` (relative to this folder).
    pub fn add_file(&mut self, path: &Path, content: FileContent) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let folder = match path.parent() {
            Some(parent) => self.folder_mut(parent),
            None => self,
        };
        folder.files.insert(name.clone(), VirtualFile { name, content });
    }

    pub fn file(&self, path: &Path) -> Option<&VirtualFile> {
        let name = path.file_name()?.to_string_lossy();
        let mut folder = self;
        if let Some(parent) = path.parent() {
            for part in parent.iter() {
                folder = folder.folders.get(part.to_string_lossy().as_ref())?;
            }
        }
        folder.files.get(name.as_ref())
    }

    /// Every file with its path relative to this folder, folders before files, in
    /// insertion order.
    pub fn files(&self) -> Vec<(PathBuf, &VirtualFile)> {
        let mut out = Vec::new();
        self.collect(PathBuf::new(), &mut out);
        out
    }

    fn collect<'a>(&'a self, prefix: PathBuf, out: &mut Vec<(PathBuf, &'a VirtualFile)>) {
        for (name, folder) in &self.folders {
            folder.collect(prefix.join(name), out);
        }
        for (name, file) in &self.files {
            out.push((prefix.join(name), file));
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len() + self.folders.values().map(|f| f.file_count()).sum::<usize>()
    }
}

/// Destination for exported files. Paths are relative to the sink root.
pub trait ResourceSink {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, ExportError>;
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), ExportError>;
}

/// Combines the JSON already at a path with the newly generated JSON.
pub type JsonMerge = dyn Fn(&Path, Value, Value) -> Value;

/// Objects merge key by key (new values win, nested objects recurse); anything else is
/// replaced.
pub fn merge_json(path: &Path, existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut base), Value::Object(update)) => {
            for (key, value) in update {
                let merged = match base.remove(&key) {
                    Some(old) => merge_json(path, old, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

/// Write every file of `root` into `sink`, returning the number of files written.
pub fn write_tree<S: ResourceSink + ?Sized>(
    sink: &mut S,
    root: &VirtualFolder,
    merge: Option<&JsonMerge>,
) -> Result<usize, ExportError> {
    let files = root.files();
    for (path, file) in &files {
        let bytes = match (&file.content, merge) {
            (FileContent::Json(value), Some(merge)) => {
                let value = match sink.read(path)? {
                    Some(existing) => match serde_json::from_slice::<Value>(&existing) {
                        Ok(existing) => merge(path.as_path(), existing, value.clone()),
                        Err(_) => value.clone(),
                    },
                    None => value.clone(),
                };
                serde_json::to_vec_pretty(&value)?
            }
            (FileContent::Json(value), None) => serde_json::to_vec_pretty(value)?,
            (FileContent::Bytes(bytes), _) => bytes.clone(),
        };
        trace!("writing {}", path.display());
        sink.write(path, &bytes)?;
    }
    debug!("wrote {} files", files.len());
    Ok(files.len())
}

/// Keeps written files in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub files: IndexMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(&self, path: impl AsRef<Path>) -> Option<Value> {
        self.files
            .get(path.as_ref())
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

impl ResourceSink for MemorySink {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, ExportError> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

/// Writes below a directory on disk, creating folders as needed.
#[derive(Clone, Debug)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSink for FsSink {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, ExportError> {
        let full = self.root.join(path);
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ExportError::io(&full, err)),
        }
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        fs::write(&full, bytes).map_err(|e| ExportError::io(&full, e))
    }
}
