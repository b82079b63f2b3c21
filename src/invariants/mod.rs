//! Predicates gating operations.
//!
//! An [`Invariant`] is asked twice per operation: `before` on the target
//! simplex, prior to any mutation, and `after` on the top cells the
//! operation produced, while the edit can still be rolled back. Invariants
//! only read the mesh. Operations evaluate them on the multi-mesh root.

mod interior;
mod inversion;
mod link;
mod todo;
mod valence;

use crate::mesh::MeshVariant;
use crate::simplex::Simplex;
use crate::tuple::Tuple;

pub use interior::{InteriorEdgeInvariant, InteriorVertexInvariant};
pub use inversion::SimplexInversionInvariant;
pub use link::{LinkConditionInvariant, MultiMeshLinkConditionInvariant};
pub use todo::TodoInvariant;
pub use valence::MinIncidentValenceInvariant;

pub trait Invariant: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// May the operation start on `simplex`?
    fn before(&self, _mesh: &MeshVariant, _simplex: &Simplex) -> bool {
        true
    }

    /// Is the result acceptable? `modified` holds one tuple per top cell the
    /// operation created or changed.
    fn after(&self, _mesh: &MeshVariant, _modified: &[Tuple]) -> bool {
        true
    }
}

/// Conjunction of invariants, evaluated in insertion order.
#[derive(Default)]
pub struct InvariantCollection {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, invariant: impl Invariant + 'static) -> &mut Self {
        self.invariants.push(Box::new(invariant));
        self
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }

    /// Name of the first invariant rejecting `simplex`, if any.
    pub fn first_rejecting_before(&self, mesh: &MeshVariant, simplex: &Simplex) -> Option<&str> {
        self.invariants
            .iter()
            .find(|i| !i.before(mesh, simplex))
            .map(|i| i.name())
    }

    /// Name of the first invariant rejecting the result, if any.
    pub fn first_rejecting_after(&self, mesh: &MeshVariant, modified: &[Tuple]) -> Option<&str> {
        self.invariants
            .iter()
            .find(|i| !i.after(mesh, modified))
            .map(|i| i.name())
    }
}

impl std::fmt::Debug for InvariantCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.invariants.iter().map(|i| i.name()))
            .finish()
    }
}

impl Invariant for InvariantCollection {
    fn name(&self) -> &str {
        "collection"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        self.invariants.iter().all(|i| i.before(mesh, simplex))
    }

    fn after(&self, mesh: &MeshVariant, modified: &[Tuple]) -> bool {
        self.invariants.iter().all(|i| i.after(mesh, modified))
    }
}
