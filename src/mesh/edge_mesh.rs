//! One-dimensional meshes: polylines, loops and self loops.

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::{build, impl_mesh_family, vertex_count_of, MeshCore};

/// A mesh whose top simplices are edges.
///
/// Facet `i` of an edge is its local vertex `i`; a vertex shared by two edges
/// makes them neighbors. A self loop `[v, v]` is its own neighbor on both
/// sides.
#[derive(Clone, Debug)]
pub struct EdgeMesh {
    pub(crate) core: MeshCore,
}

impl EdgeMesh {
    pub fn new() -> Self {
        Self {
            core: MeshCore::new(PrimitiveType::Edge),
        }
    }

    /// Build from edge → vertex pairs; vertices are `0..=max id`.
    pub fn from_edges(edges: &[[i64; 2]]) -> Result<Self, MeshError> {
        Self::from_edges_with_vertex_count(vertex_count_of(edges), edges)
    }

    pub fn from_edges_with_vertex_count(
        vertex_count: usize,
        edges: &[[i64; 2]],
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        build::initialize(&mut mesh.core, vertex_count, edges)?;
        Ok(mesh)
    }

    /// The two vertices of edge `eid` in storage order.
    pub fn ev_from_eid(&self, eid: i64) -> [i64; 2] {
        let ev = self.core.cell_vertices(eid);
        [ev[0], ev[1]]
    }
}

impl Default for EdgeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl_mesh_family!(EdgeMesh);
