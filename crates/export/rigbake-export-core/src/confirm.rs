//! Asking the user before clobbering files another tool wrote.

use std::path::Path;

/// Blocking confirmation hook. Returning `false` cancels the export.
pub trait ExportConfirm {
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Overwrite without asking (batch exports).
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysConfirm;

impl ExportConfirm for AlwaysConfirm {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Never overwrite foreign files.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverConfirm;

impl ExportConfirm for NeverConfirm {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        false
    }
}

impl<F> ExportConfirm for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        self(path)
    }
}
