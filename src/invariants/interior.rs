use crate::mesh::{Mesh, MeshVariant};
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;

use super::Invariant;

/// Only edges away from the boundary.
#[derive(Copy, Clone, Debug, Default)]
pub struct InteriorEdgeInvariant;

impl Invariant for InteriorEdgeInvariant {
    fn name(&self) -> &str {
        "interior_edge"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        let edge = Simplex::edge(*simplex.tuple());
        !mesh.is_boundary(&edge)
    }
}

/// The vertex of the target tuple must be interior.
///
/// For an edge this pins the endpoint that a collapse removes.
#[derive(Copy, Clone, Debug, Default)]
pub struct InteriorVertexInvariant;

impl Invariant for InteriorVertexInvariant {
    fn name(&self) -> &str {
        "interior_vertex"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        if mesh.top_simplex_type() == PrimitiveType::Vertex {
            return true;
        }
        !mesh.is_boundary(&Simplex::vertex(*simplex.tuple()))
    }
}
