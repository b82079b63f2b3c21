use crate::mesh::{Mesh, MeshVariant};
use crate::primitive::PrimitiveType;
use crate::simplex::{valence, Simplex};
use crate::tuple::Tuple;

use super::Invariant;

/// Keeps every vertex touched by an operation at or above a valence.
#[derive(Copy, Clone, Debug)]
pub struct MinIncidentValenceInvariant {
    min_valence: usize,
}

impl MinIncidentValenceInvariant {
    pub fn new(min_valence: usize) -> Self {
        Self { min_valence }
    }

    fn vertex_ok(&self, mesh: &MeshVariant, t: &Tuple) -> bool {
        valence(mesh.core(), &Simplex::vertex(*t)) >= self.min_valence
    }
}

impl Invariant for MinIncidentValenceInvariant {
    fn name(&self) -> &str {
        "min_incident_valence"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        let t = *simplex.tuple();
        if simplex.primitive_type() == PrimitiveType::Vertex {
            return self.vertex_ok(mesh, &t);
        }
        self.vertex_ok(mesh, &t) && self.vertex_ok(mesh, &mesh.switch_vertex(&t))
    }

    fn after(&self, mesh: &MeshVariant, modified: &[Tuple]) -> bool {
        let core = mesh.core();
        modified.iter().all(|t| {
            core.cell_vertices(t.global_cid()).iter().all(|&v| {
                core.tuple_from_id(PrimitiveType::Vertex, v)
                    .is_ok_and(|vt| self.vertex_ok(mesh, &vt))
            })
        })
    }
}
