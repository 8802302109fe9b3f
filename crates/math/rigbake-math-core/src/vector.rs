//! Immutable 3D vector.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

use crate::matrix::Matrix;

/// A triple of finite floats. Serialized as a plain `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector::new(0.0, 0.0, 0.0);
    pub const ONE: Vector = Vector::new(1.0, 1.0, 1.0);
    pub const UNIT_X: Vector = Vector::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Vector = Vector::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Vector = Vector::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Express this vector in the basis given by `matrix`'s columns.
    #[inline]
    pub fn transform(&self, matrix: &Matrix) -> Vector {
        matrix
            .x
            .multiply(self.x)
            .add(matrix.y.multiply(self.y))
            .add(matrix.z.multiply(self.z))
    }

    #[inline]
    pub fn add(&self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn sub(&self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn multiply(&self, scalar: f64) -> Vector {
        Vector::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }

    /// Component-wise product.
    #[inline]
    pub fn scale(&self, other: Vector) -> Vector {
        Vector::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Divide by a scalar. Dividing by zero yields [`Vector::ZERO`] instead of infinities.
    #[inline]
    pub fn divide(&self, scalar: f64) -> Vector {
        if scalar == 0.0 {
            return Vector::ZERO;
        }
        self.multiply(1.0 / scalar)
    }

    #[inline]
    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm.
    #[inline]
    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Largest component.
    #[inline]
    pub fn max_element(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    #[inline]
    pub fn min(&self, other: Vector) -> Vector {
        Vector::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    #[inline]
    pub fn max(&self, other: Vector) -> Vector {
        Vector::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn approx_eq(&self, other: &Vector, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }
}

impl From<[f64; 3]> for Vector {
    fn from(v: [f64; 3]) -> Self {
        Vector::new(v[0], v[1], v[2])
    }
}

impl From<Vector> for [f64; 3] {
    fn from(v: Vector) -> Self {
        v.to_array()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.multiply(-1.0)
    }
}
