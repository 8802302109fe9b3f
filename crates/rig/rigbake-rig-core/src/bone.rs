//! Bone hierarchy: a host-independent re-derivation of the scene's transform chain.
//!
//! Trees are built fresh for every sampled pose and thrown away afterwards. Local bones
//! are parent-relative; [`Bone::to_global`] produces a world-space leaf, and
//! [`Bone::export_root`] flattens a whole tree depth-first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_math_core::{Gimbals, Matrix, Vector};

/// Which scene-node kind a bone stands for.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Bone,
    Locator,
    Camera,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub id: Uuid,
    pub name: String,
    pub kind: NodeKind,
    /// Pivot, relative to the parent for local bones and absolute for global ones.
    pub origin: Vector,
    pub children: Vec<Bone>,
    rot: Gimbals,
    scale: Vector,
    matrix: Matrix,
}

impl Bone {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        kind: NodeKind,
        origin: Vector,
        rot: Gimbals,
        scale: Vector,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            origin,
            children: Vec::new(),
            rot,
            scale,
            matrix: Self::compose(rot, scale),
        }
    }

    /// The virtual scene root: identity transform at the origin.
    pub fn root() -> Self {
        Self::new(
            Uuid::nil(),
            "root",
            NodeKind::Bone,
            Vector::ZERO,
            Gimbals::ZERO,
            Vector::ONE,
        )
    }

    fn compose(rot: Gimbals, scale: Vector) -> Matrix {
        rot.to_matrix().multiply(scale)
    }

    pub fn with_children(mut self, children: Vec<Bone>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: Bone) {
        self.children.push(child);
    }

    #[inline]
    pub fn rot(&self) -> Gimbals {
        self.rot
    }

    #[inline]
    pub fn scale(&self) -> Vector {
        self.scale
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn set_rot(&mut self, rot: Gimbals) {
        self.rot = rot;
        self.matrix = Self::compose(self.rot, self.scale);
    }

    pub fn set_scale(&mut self, scale: Vector) {
        self.scale = scale;
        self.matrix = Self::compose(self.rot, self.scale);
    }

    /// Compose this parent-relative bone with an already-global `parent`.
    ///
    /// Scale is re-read from the composed columns rather than multiplied through, so a
    /// non-uniform parent scale shows up correctly on rotated children. The result has no
    /// children.
    pub fn to_global(&self, parent: &Bone) -> Bone {
        let matrix = self.matrix.transform(&parent.matrix);
        let scale = matrix.column_lengths();
        let rot = matrix.normalize_columns(scale).to_gimbals();
        let origin = self.origin.transform(&parent.matrix).add(parent.origin);
        Bone {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            origin,
            children: Vec::new(),
            rot,
            scale,
            matrix,
        }
    }

    /// This bone globalized against `parent`, followed by every descendant, each globalized
    /// against its own parent's global form (depth-first pre-order).
    pub fn export_children(&self, parent: &Bone) -> Vec<Bone> {
        let global = self.to_global(parent);
        let mut out = Vec::with_capacity(1 + self.children.len());
        for child in &self.children {
            let sub = child.export_children(&global);
            out.extend(sub);
        }
        out.insert(0, global);
        out
    }

    /// Flatten a virtual root's subtree. The root itself is treated as already global and
    /// is not part of the output.
    pub fn export_root(&self) -> Vec<Bone> {
        self.children
            .iter()
            .flat_map(|child| child.export_children(self))
            .collect()
    }
}
