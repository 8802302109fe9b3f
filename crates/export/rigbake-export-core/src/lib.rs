//! rigbake export core
//!
//! Drives a full export: renders the rig, bakes the animations, assigns Custom Model Data
//! against the shared display-item model, and writes the resource and data packs through a
//! [`ResourceSink`].

pub mod cmd;
pub mod config;
pub mod confirm;
pub mod dataset;
pub mod error;
pub mod export;
pub mod predicate;
pub mod vfs;

// Re-exports for consumers
pub use cmd::{assign_custom_model_data, CmdAssignment};
pub use config::ExportConfig;
pub use confirm::{AlwaysConfirm, ExportConfirm, NeverConfirm};
pub use dataset::{serialize_datasets, AnimationDataset, DatasetFrame};
pub use error::ExportError;
pub use export::{export_project, pack_formats, ExportReport};
pub use predicate::{Predicate, PredicateFile, PredicateMeta, PredicateOverride};
pub use vfs::{
    merge_json, write_tree, FileContent, FsSink, JsonMerge, MemorySink, ResourceSink,
    VirtualFile, VirtualFolder,
};

pub type Result<T> = core::result::Result<T, ExportError>;
