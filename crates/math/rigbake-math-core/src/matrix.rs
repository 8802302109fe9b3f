//! 3x3 column matrix and its decomposition back into gimbal angles.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::gimbals::Gimbals;
use crate::vector::Vector;

/// A linear map stored as the images of the unit basis vectors (columns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub x: Vector,
    pub y: Vector,
    pub z: Vector,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(Vector::UNIT_X, Vector::UNIT_Y, Vector::UNIT_Z);

    #[inline]
    pub const fn new(x: Vector, y: Vector, z: Vector) -> Self {
        Self { x, y, z }
    }

    /// Compose two maps: `self` first, then `other`.
    ///
    /// Each column of `self` is mapped through `other`, so
    /// `a.transform(&b).apply(v) == b.apply(a.apply(v))`.
    #[inline]
    pub fn transform(&self, other: &Matrix) -> Matrix {
        Matrix::new(
            self.x.transform(other),
            self.y.transform(other),
            self.z.transform(other),
        )
    }

    /// Map a vector through this matrix.
    #[inline]
    pub fn apply(&self, v: Vector) -> Vector {
        v.transform(self)
    }

    /// Scale each column by the matching component of `v` (non-uniform scale on the right).
    #[inline]
    pub fn multiply(&self, v: Vector) -> Matrix {
        Matrix::new(self.x.multiply(v.x), self.y.multiply(v.y), self.z.multiply(v.z))
    }

    /// Uniform scale of every column.
    #[inline]
    pub fn multiply_scalar(&self, s: f64) -> Matrix {
        Matrix::new(self.x.multiply(s), self.y.multiply(s), self.z.multiply(s))
    }

    /// Column lengths, i.e. the per-axis scale baked into this matrix.
    #[inline]
    pub fn column_lengths(&self) -> Vector {
        Vector::new(self.x.length(), self.y.length(), self.z.length())
    }

    /// Divide each column by the matching component of `scale`.
    /// A zero component leaves a zero column.
    #[inline]
    pub fn normalize_columns(&self, scale: Vector) -> Matrix {
        Matrix::new(
            self.x.divide(scale.x),
            self.y.divide(scale.y),
            self.z.divide(scale.z),
        )
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::new(
            Vector::new(self.x.x, self.y.x, self.z.x),
            Vector::new(self.x.y, self.y.y, self.z.y),
            Vector::new(self.x.z, self.y.z, self.z.z),
        )
    }

    /// Recover gimbal angles (degrees) assuming `self` is a pure rotation.
    ///
    /// Y comes from the X column's Z component, Z from the X column's X/Y components
    /// (suppressed at gimbal lock), and X from the Y column with Y and Z undone.
    pub fn to_gimbals(&self) -> Gimbals {
        let col_x = self.x;
        let col_y = self.y;

        let y = (-col_x.z).atan2((col_x.x * col_x.x + col_x.y * col_x.y).sqrt());

        // 0 exactly at +-90 deg on Y, 1 everywhere else.
        let unlocked = ((y + FRAC_PI_2) % PI).min(1.0).ceil();
        let z = col_x.y.atan2(col_x.x) * unlocked;

        let (sy, cy) = y.sin_cos();
        let (sz, cz) = z.sin_cos();
        // Undo Z, then Y, on the Y column; what remains is (0, cos x, sin x).
        let wx = cz * col_y.x + sz * col_y.y;
        let wy = -sz * col_y.x + cz * col_y.y;
        let wz = col_y.z;
        let cos_x = wy;
        let sin_x = sy * wx + cy * wz;
        let x = sin_x.atan2(cos_x);

        Gimbals::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Flatten into a row-major 4x4 affine matrix with `translation` in the last column.
    pub fn to_row_major_4x4(&self, translation: Vector) -> [f64; 16] {
        [
            self.x.x,
            self.y.x,
            self.z.x,
            translation.x,
            self.x.y,
            self.y.y,
            self.z.y,
            translation.y,
            self.x.z,
            self.y.z,
            self.z.z,
            translation.z,
            0.0,
            0.0,
            0.0,
            1.0,
        ]
    }

    pub fn approx_eq(&self, other: &Matrix, eps: f64) -> bool {
        self.x.approx_eq(&other.x, eps)
            && self.y.approx_eq(&other.y, eps)
            && self.z.approx_eq(&other.z, eps)
    }
}
