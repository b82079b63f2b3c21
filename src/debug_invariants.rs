//! Opt-in structural sweeps over a mesh and the tree below it.
//!
//! A tree is consistent when every mesh in it passes
//! [`validate_connectivity`](crate::mesh::validity::validate_connectivity),
//! every parent/child map pairs live tuples at their current hashes
//! ([`check_map_valid`](crate::multimesh::check_map_valid)), and every mesh
//! sits at the same scope depth as its parent. The sweeps are O(N) in the
//! size of the tree.

use crate::mesh::{Mesh, MeshCore, validity};
use crate::mesh_error::MeshError;
use crate::multimesh::check_map_valid;

/// Whether [`debug_invariants!`](crate::debug_invariants!) runs its checks.
pub const CHECKS_ENABLED: bool = cfg!(any(feature = "strict-invariants", feature = "check-invariants"));

/// Consistency checks of a mesh together with its descendants.
pub trait DebugInvariants {
    /// Panic on the first violation when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// The first violation in this mesh or below it.
    fn validate_invariants(&self) -> Result<(), MeshError>;
}

impl<M: Mesh + ?Sized> DebugInvariants for M {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "mesh ", self.mesh_id());
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        validate_subtree(self.core())?;
        check_map_valid(self.core())
    }
}

fn validate_subtree(core: &MeshCore) -> Result<(), MeshError> {
    validity::validate_connectivity(core)?;
    let depth = core.attributes().scope_depth();
    for child in core.multi_mesh().children() {
        let child_core = child.mesh().core();
        let found = child_core.attributes().scope_depth();
        if found != depth {
            return Err(MeshError::ScopeMismatch {
                expected: depth,
                found,
            });
        }
        validate_subtree(child_core)?;
    }
    Ok(())
}

/// Run a fallible check and panic with `[invariants] <context>: <error>` on
/// failure, when [`CHECKS_ENABLED`] is set.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:expr),+ $(,)?) => {
        if $crate::debug_invariants::CHECKS_ENABLED {
            if let Err(e) = $expr {
                let mut context = String::new();
                $(context.push_str(&$ctx.to_string());)+
                panic!("[invariants] {context}: {e}");
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshgen;
    use crate::multimesh::same_simplex_dimension_surjection;

    #[test]
    fn consistent_trees_pass() {
        let mut m = meshgen::one_ear().unwrap();
        let copy = meshgen::one_ear().unwrap();
        same_simplex_dimension_surjection(&mut m, copy, &[0, 1]).unwrap();
        m.validate_invariants().unwrap();
        m.debug_assert_invariants();
    }

    #[test]
    fn scopes_must_span_the_tree() {
        let mut m = meshgen::one_ear().unwrap();
        let copy = meshgen::one_ear().unwrap();
        same_simplex_dimension_surjection(&mut m, copy, &[0, 1]).unwrap();
        m.core_mut().multi_mesh.children_mut()[0]
            .mesh_mut()
            .core_mut()
            .attributes_mut()
            .push_scope();
        assert_eq!(
            m.validate_invariants(),
            Err(MeshError::ScopeMismatch {
                expected: 0,
                found: 1
            })
        );
    }
}
