//! Meshes whose cells are isolated vertices.

use crate::primitive::PrimitiveType;

use super::{impl_mesh_family, MeshCore};

/// A set of vertices without connectivity.
///
/// Tuples of a point mesh carry no local ids: `(-1, -1, -1, vertex, hash)`.
#[derive(Clone, Debug)]
pub struct PointMesh {
    pub(crate) core: MeshCore,
}

impl PointMesh {
    /// A point mesh with `count` vertices `0..count`.
    pub fn new(count: usize) -> Self {
        let mut core = MeshCore::new(PrimitiveType::Vertex);
        for v in core.attributes_mut().reserve(PrimitiveType::Vertex, count) {
            core.set_active(PrimitiveType::Vertex, v, true);
        }
        Self { core }
    }

    /// Append `count` fresh vertices, returning their ids.
    pub fn add_points(&mut self, count: usize) -> Vec<i64> {
        let ids: Vec<i64> = self
            .core
            .attributes_mut()
            .reserve(PrimitiveType::Vertex, count)
            .collect();
        for &v in &ids {
            self.core.set_active(PrimitiveType::Vertex, v, true);
        }
        ids
    }
}

impl Default for PointMesh {
    fn default() -> Self {
        Self::new(0)
    }
}

impl_mesh_family!(PointMesh);
