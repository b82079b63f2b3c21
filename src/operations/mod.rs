//! Invariant-gated, transactional mesh edits.
//!
//! Every [`Operation`] runs through the same pipeline:
//!
//! 1. map the target simplex to the multi-mesh root and validate its tuple;
//! 2. evaluate the `before` side of the operation's invariants;
//! 3. open a scope on the root (it covers every mesh of the tree);
//! 4. execute the edit on the root, which propagates it to all children;
//! 5. recompute derived attributes (see [`crate::transfer`]) around the
//!    result;
//! 6. evaluate the `after` side on the modified top cells;
//! 7. commit, or roll back and report nothing.
//!
//! Recoverable failures (stale tuples, rejected invariants, edits the
//! executor refuses) never escape [`Operation::apply`]: they are logged at
//! `debug` level and yield an empty result, leaving the tree unchanged.

mod collapse;
mod face_split;
mod smooth;
mod split;
mod swap;

use log::debug;

use crate::debug_invariants::DebugInvariants;
use crate::invariants::{Invariant, InvariantCollection};
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;
use crate::strategy::StrategyTable;
use crate::transfer::{apply_transfers, TransferStrategy};
use crate::tuple::Tuple;

pub use collapse::EdgeCollapse;
pub use face_split::FaceSplit;
pub use smooth::VertexLaplacianSmooth;
pub use split::EdgeSplit;
pub use swap::EdgeSwap;

/// What an executed operation hands back to the pipeline, in root terms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Executed {
    /// Result simplices of the root mesh.
    pub simplices: Vec<Simplex>,
    /// One tuple per created or changed top cell, for `after` checks.
    pub modified: Vec<Tuple>,
}

/// Values an operation computed from a read-only view of the mesh, written
/// later by [`Operation::apply_prepared`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreparedEdit {
    values: Vec<f64>,
}

impl PreparedEdit {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

pub trait Operation: Send + Sync {
    fn name(&self) -> &'static str;

    /// Type of the simplices the operation accepts.
    fn primitive_type(&self) -> PrimitiveType;

    /// Mesh of the tree whose simplices the operation accepts and returns.
    fn mesh_id(&self) -> &MeshId;

    fn invariants(&self) -> &InvariantCollection;

    fn invariants_mut(&mut self) -> &mut InvariantCollection;

    /// Derived attributes recomputed after every edit.
    fn transfers(&self) -> &[Box<dyn TransferStrategy>] {
        &[]
    }

    /// Perform the edit on the root. Runs inside an open scope; an error
    /// rolls it back.
    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError>;

    /// Compute the edit on `simplex` of the target mesh without touching the
    /// mesh. Only operations whose effect depends on nothing but the closed
    /// star of the simplex return `Some`; the colored scheduler prepares a
    /// whole batch of disjoint stars at once.
    fn prepare(&self, _root: &MeshVariant, _simplex: &Simplex) -> Option<PreparedEdit> {
        None
    }

    /// Write a prepared edit. Runs inside an open scope like
    /// [`execute`](Self::execute), which it defaults to.
    fn execute_prepared(
        &self,
        root: &mut MeshVariant,
        simplex: &Simplex,
        _prepared: PreparedEdit,
    ) -> Result<Executed, MeshError> {
        self.execute(root, simplex)
    }

    fn add_invariant(&mut self, invariant: impl Invariant + 'static) -> &mut Self
    where
        Self: Sized,
    {
        self.invariants_mut().add(invariant);
        self
    }

    /// `simplex` of the target mesh as a simplex of the root, with its tuple
    /// checked against the root.
    fn to_root(&self, root: &MeshVariant, simplex: &Simplex) -> Result<Simplex, MeshError> {
        if simplex.primitive_type() != self.primitive_type() {
            return Err(MeshError::UnsupportedPrimitive {
                primitive: simplex.primitive_type(),
                top: root.mesh(self.mesh_id())?.top_simplex_type(),
            });
        }
        if !root.is_multi_mesh_root() {
            return Err(MeshError::UnsupportedOperation(self.name()));
        }
        let tuple = if self.mesh_id().is_root() {
            *simplex.tuple()
        } else {
            root.mesh(self.mesh_id())?.core().validate_tuple(simplex.tuple())?;
            root.map_to_root_tuple(self.mesh_id(), simplex.tuple())?
        };
        root.core().validate_tuple(&tuple)?;
        Ok(Simplex::new(simplex.primitive_type(), tuple))
    }

    /// Whether the operation would start on `simplex`: the tuple is live and
    /// every `before` check passes. Does not touch the mesh.
    fn is_applicable(&self, root: &MeshVariant, simplex: &Simplex) -> bool {
        self.to_root(root, simplex)
            .is_ok_and(|s| self.invariants().before(root, &s))
    }

    /// Run the full pipeline on `simplex` of the target mesh.
    ///
    /// Returns the result simplices in the target mesh, or an empty vector
    /// when the operation did not apply.
    fn apply(&self, root: &mut MeshVariant, simplex: &Simplex) -> Vec<Simplex> {
        let outcome = run_pipeline(self, root, simplex, |root, target| self.execute(root, target));
        report(self, simplex, outcome)
    }

    /// [`apply`](Self::apply) with the values of an earlier
    /// [`prepare`](Self::prepare). Invariants are still checked against the
    /// current mesh.
    fn apply_prepared(&self, root: &mut MeshVariant, simplex: &Simplex, prepared: PreparedEdit) -> Vec<Simplex> {
        let outcome = run_pipeline(self, root, simplex, |root, target| {
            self.execute_prepared(root, target, prepared)
        });
        report(self, simplex, outcome)
    }
}

fn report<O: Operation + ?Sized>(
    op: &O,
    simplex: &Simplex,
    outcome: Result<Vec<Simplex>, MeshError>,
) -> Vec<Simplex> {
    match outcome {
        Ok(out) => out,
        Err(e) => {
            debug!("{} on {:?} did not apply: {e}", op.name(), simplex.primitive_type());
            Vec::new()
        }
    }
}

fn run_pipeline<O: Operation + ?Sized>(
    op: &O,
    root: &mut MeshVariant,
    simplex: &Simplex,
    execute: impl FnOnce(&mut MeshVariant, &Simplex) -> Result<Executed, MeshError>,
) -> Result<Vec<Simplex>, MeshError> {
    let target = op.to_root(root, simplex)?;
    if let Some(name) = op.invariants().first_rejecting_before(root, &target) {
        debug!("{}: rejected by `{name}` before execution", op.name());
        return Ok(Vec::new());
    }

    let token = root.begin_scope();
    let executed = match execute(root, &target) {
        Ok(executed) => executed,
        Err(e) => {
            root.rollback_scope(token)?;
            return Err(e);
        }
    };
    if let Err(e) = apply_transfers(op.transfers(), root, &executed.simplices) {
        root.rollback_scope(token)?;
        return Err(e);
    }
    if let Some(name) = op.invariants().first_rejecting_after(root, &executed.modified) {
        debug!("{}: rejected by `{name}` after execution, rolling back", op.name());
        root.rollback_scope(token)?;
        return Ok(Vec::new());
    }
    root.commit_scope(token)?;

    crate::debug_invariants!(root.validate_invariants(), "after ", op.name());

    from_root(root, op.mesh_id(), executed.simplices)
}

/// Express root result simplices in the mesh at `id`.
fn from_root(root: &MeshVariant, id: &MeshId, simplices: Vec<Simplex>) -> Result<Vec<Simplex>, MeshError> {
    if id.is_root() {
        return Ok(simplices);
    }
    let target = root.mesh(id)?;
    let top = target.top_simplex_type();
    let mut out: Vec<Simplex> = Vec::new();
    for s in simplices {
        let pt = s.primitive_type().min(top);
        for t in root.map_from_root(id, &s)? {
            let image = Simplex::new(pt, t);
            if !out.iter().any(|o| target.simplices_equal(o, &image)) {
                out.push(image);
            }
        }
    }
    Ok(out)
}

/// One tuple per cell id.
pub(crate) fn cell_tuples(root: &MeshVariant, cells: &[i64]) -> Vec<Tuple> {
    let core = root.core();
    cells.iter().map(|&c| core.tuple_from_cell(c)).collect()
}

/// Invariants, strategies and transfers every operation carries.
#[derive(Debug, Default)]
pub(crate) struct OperationSettings {
    pub(crate) mesh_id: MeshId,
    pub(crate) invariants: InvariantCollection,
    pub(crate) strategies: StrategyTable,
    pub(crate) transfers: Vec<Box<dyn TransferStrategy>>,
}

impl OperationSettings {
    pub(crate) fn new(mesh_id: MeshId) -> Self {
        Self {
            mesh_id,
            ..Self::default()
        }
    }
}

/// Implements the bookkeeping methods of [`Operation`] and strategy setters
/// for a type with a `settings: OperationSettings` field.
macro_rules! operation_settings {
    ($name:ident) => {
        impl $name {
            /// Strategies applied to user attributes of every mesh the edit
            /// touches.
            pub fn strategies(&self) -> &$crate::strategy::StrategyTable {
                &self.settings.strategies
            }

            pub fn strategies_mut(&mut self) -> &mut $crate::strategy::StrategyTable {
                &mut self.settings.strategies
            }

            pub fn set_strategy<T: $crate::strategy::StrategyValue>(
                &mut self,
                mesh: $crate::multimesh::MeshId,
                handle: $crate::attribute::TypedAttributeHandle<T>,
                strategy: $crate::strategy::AttributeStrategy<T>,
            ) -> &mut Self {
                self.settings.strategies.set(mesh, handle, strategy);
                self
            }

            /// Recompute a derived attribute after every edit.
            pub fn add_transfer(
                &mut self,
                transfer: impl $crate::transfer::TransferStrategy + 'static,
            ) -> &mut Self {
                self.settings.transfers.push(Box::new(transfer));
                self
            }
        }
    };
}

pub(crate) use operation_settings;

/// Forwarding bodies for the settings accessors of [`Operation`].
macro_rules! settings_accessors {
    () => {
        fn mesh_id(&self) -> &$crate::multimesh::MeshId {
            &self.settings.mesh_id
        }

        fn invariants(&self) -> &$crate::invariants::InvariantCollection {
            &self.settings.invariants
        }

        fn invariants_mut(&mut self) -> &mut $crate::invariants::InvariantCollection {
            &mut self.settings.invariants
        }

        fn transfers(&self) -> &[Box<dyn $crate::transfer::TransferStrategy>] {
            &self.settings.transfers
        }
    };
}

pub(crate) use settings_accessors;
