use log::trace;

use crate::mesh::{Mesh, MeshVariant};
use crate::primitive::PrimitiveType;
use crate::simplex::{link_condition, Simplex};

use super::Invariant;

/// Rejects edges whose collapse would break manifoldness of the mesh the
/// invariant is evaluated on.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinkConditionInvariant;

impl Invariant for LinkConditionInvariant {
    fn name(&self) -> &str {
        "link_condition"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        simplex.primitive_type() == PrimitiveType::Edge && link_condition(mesh.core(), simplex)
    }
}

/// Link condition on the root and on every descendant carrying a piece of
/// the edge.
///
/// A descendant without an edge over the root edge is not constrained.
#[derive(Copy, Clone, Debug, Default)]
pub struct MultiMeshLinkConditionInvariant;

impl Invariant for MultiMeshLinkConditionInvariant {
    fn name(&self) -> &str {
        "multi_mesh_link_condition"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        if !LinkConditionInvariant.before(mesh, simplex) {
            return false;
        }
        for id in mesh.descendant_ids() {
            let Ok(child) = mesh.mesh(&id) else {
                return false;
            };
            if child.top_cell_dimension() == 0 {
                continue;
            }
            let Ok(tuples) = mesh.map_from_root(&id, simplex) else {
                return false;
            };
            for t in tuples {
                if !link_condition(child.core(), &Simplex::edge(t)) {
                    trace!("link condition fails in child {id}");
                    return false;
                }
            }
        }
        true
    }
}
