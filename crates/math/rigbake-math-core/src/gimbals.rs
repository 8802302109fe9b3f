//! Euler-angle rotation in degrees.
//!
//! The rotation about X is applied first, then Y, then Z, which is the bone rotation
//! convention of the authoring tool. [`Gimbals::to_matrix`] and
//! [`Matrix::to_gimbals`](crate::Matrix::to_gimbals) are inverses of each other away from
//! gimbal lock; they are not interchangeable with a textbook intrinsic XYZ decomposition.

use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;
use crate::vector::Vector;

/// Rotation angles about X, Y and Z, in degrees. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Gimbals {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Gimbals {
    pub const ZERO: Gimbals = Gimbals::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build the rotation matrix `Rx`, composed with `Ry`, then with `Rz`.
    pub fn to_matrix(&self) -> Matrix {
        let (sx, cx) = self.x.to_radians().sin_cos();
        let (sy, cy) = self.y.to_radians().sin_cos();
        let (sz, cz) = self.z.to_radians().sin_cos();

        let rx = Matrix::new(
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, cx, sx),
            Vector::new(0.0, -sx, cx),
        );
        let ry = Matrix::new(
            Vector::new(cy, 0.0, -sy),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(sy, 0.0, cy),
        );
        let rz = Matrix::new(
            Vector::new(cz, sz, 0.0),
            Vector::new(-sz, cz, 0.0),
            Vector::new(0.0, 0.0, 1.0),
        );

        rx.transform(&ry).transform(&rz)
    }

    /// Component-wise sum, used when layering an animated rotation over a rest rotation.
    #[inline]
    pub fn add(&self, other: Gimbals) -> Gimbals {
        Gimbals::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn approx_eq(&self, other: &Gimbals, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }
}

impl From<[f64; 3]> for Gimbals {
    fn from(v: [f64; 3]) -> Self {
        Gimbals::new(v[0], v[1], v[2])
    }
}

impl From<Gimbals> for [f64; 3] {
    fn from(g: Gimbals) -> Self {
        g.to_array()
    }
}

impl From<Vector> for Gimbals {
    fn from(v: Vector) -> Self {
        Gimbals::new(v.x, v.y, v.z)
    }
}
