//! rigbake-math-core: the linear algebra layer shared by the rig and animation crates.
//!
//! Three small value types:
//! - [`Vector`]: an immutable `(x, y, z)` triple.
//! - [`Matrix`]: three column vectors, the images of the unit basis under a linear map.
//! - [`Gimbals`]: Euler angles in degrees, composed X then Y then Z.
//!
//! Composition order is fixed across the workspace: `a.transform(b)` applies `a` first and
//! `b` second, so a child's local matrix composed through its parent's global matrix reads
//! `child.transform(&parent)`.

pub mod gimbals;
pub mod matrix;
pub mod vector;

pub use gimbals::Gimbals;
pub use matrix::Matrix;
pub use vector::Vector;

/// Absolute tolerance used by the `approx_eq` helpers.
pub const EPSILON: f64 = 1e-9;
