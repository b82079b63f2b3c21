//! Drivers applying an operation over many simplices.
//!
//! A [`Scheduler`] collects the candidate simplices of an operation's target
//! mesh up front and applies the operation to each in turn. Candidates made
//! stale by earlier edits fail fast inside the operation pipeline and are
//! counted as failures. Colored passes group vertices whose closed stars are
//! disjoint: within one color every candidate is checked and prepared from
//! the same read-only mesh (in parallel with the `rayon` feature), then the
//! prepared edits are committed one after another.

use std::ops::AddAssign;
use std::sync::Arc;

use log::{debug, info};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attribute::TypedAttributeHandle;
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::operations::{Operation, PreparedEdit};
use crate::primitive::PrimitiveType;
use crate::simplex::{one_ring, Simplex};

/// Name of the vertex attribute written by [`color_vertices`].
pub const COLOR_ATTRIBUTE: &str = "color";

/// Priority of a candidate; lower values run first.
pub type PriorityFn = Arc<dyn Fn(&MeshVariant, &Simplex) -> f64 + Send + Sync>;

/// Counters of one or more passes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub performed: usize,
    pub successful: usize,
    pub failed: usize,
}

impl SchedulerStats {
    fn record(&mut self, applied: bool) {
        self.performed += 1;
        if applied {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl AddAssign for SchedulerStats {
    fn add_assign(&mut self, rhs: Self) {
        self.performed += rhs.performed;
        self.successful += rhs.successful;
        self.failed += rhs.failed;
    }
}

#[derive(Clone)]
pub struct SchedulerOptions {
    /// Sort candidates by this key before a pass.
    pub priority: Option<PriorityFn>,
    /// Operations between two evaluations of a stop predicate.
    pub stop_check_frequency: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            priority: None,
            stop_check_frequency: 1,
        }
    }
}

impl std::fmt::Debug for SchedulerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerOptions")
            .field("priority", &self.priority.as_ref().map(|_| "<fn>"))
            .field("stop_check_frequency", &self.stop_check_frequency)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    options: SchedulerOptions,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SchedulerOptions) -> Self {
        Self {
            options,
            stats: SchedulerStats::default(),
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Totals over every pass run by this scheduler.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    fn candidates<O: Operation + ?Sized>(&self, op: &O, root: &MeshVariant) -> Result<Vec<Simplex>, MeshError> {
        let simplices = root.mesh(op.mesh_id())?.get_all_simplices(op.primitive_type());
        Ok(self.sorted(root, simplices))
    }

    fn sorted(&self, root: &MeshVariant, simplices: Vec<Simplex>) -> Vec<Simplex> {
        let Some(priority) = &self.options.priority else {
            return simplices;
        };
        #[cfg(feature = "rayon")]
        let keys: Vec<f64> = simplices.par_iter().map(|s| priority(root, s)).collect();
        #[cfg(not(feature = "rayon"))]
        let keys: Vec<f64> = simplices.iter().map(|s| priority(root, s)).collect();
        let mut keyed: Vec<(f64, Simplex)> = keys.into_iter().zip(simplices).collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, s)| s).collect()
    }

    fn finish<O: Operation + ?Sized>(&mut self, op: &O, pass: SchedulerStats) -> SchedulerStats {
        info!(
            "{}: {} performed, {} successful, {} failed",
            op.name(),
            pass.performed,
            pass.successful,
            pass.failed
        );
        self.stats += pass;
        pass
    }

    /// Apply `op` once to every live simplex of its type in its target mesh.
    pub fn run_operation_on_all<O: Operation + ?Sized>(
        &mut self,
        op: &O,
        root: &mut MeshVariant,
    ) -> Result<SchedulerStats, MeshError> {
        self.run_operation_on_all_until(op, root, |_| false)
    }

    /// Like [`run_operation_on_all`](Self::run_operation_on_all), asking
    /// `should_stop` every `stop_check_frequency` operations whether to end
    /// the pass early.
    pub fn run_operation_on_all_until<O: Operation + ?Sized>(
        &mut self,
        op: &O,
        root: &mut MeshVariant,
        mut should_stop: impl FnMut(&MeshVariant) -> bool,
    ) -> Result<SchedulerStats, MeshError> {
        let candidates = self.candidates(op, root)?;
        let every = self.options.stop_check_frequency.max(1);
        let mut pass = SchedulerStats::default();
        for (i, s) in candidates.iter().enumerate() {
            if i % every == 0 && should_stop(root) {
                debug!("{}: stopped after {i} of {} candidates", op.name(), candidates.len());
                break;
            }
            pass.record(!op.apply(root, s).is_empty());
        }
        Ok(self.finish(op, pass))
    }

    /// Apply `op` to the given simplices of its target mesh, in order.
    pub fn run_operation_on_simplices<O: Operation + ?Sized>(
        &mut self,
        op: &O,
        root: &mut MeshVariant,
        simplices: &[Simplex],
    ) -> SchedulerStats {
        let mut pass = SchedulerStats::default();
        for s in simplices {
            pass.record(!op.apply(root, s).is_empty());
        }
        self.finish(op, pass)
    }

    /// Apply a vertex operation color by color.
    ///
    /// Within one color the candidates are checked against the operation's
    /// `before` invariants and prepared ([`Operation::prepare`]) from the
    /// mesh as it stands before the batch, in parallel with `rayon`. Their
    /// stars are disjoint, so no commit of the batch changes what another
    /// member read. The prepared edits are then committed in order;
    /// operations that cannot prepare run their full pipeline at that point.
    /// Candidates rejected up front count as failed.
    pub fn run_operation_on_all_with_coloring<O: Operation + ?Sized>(
        &mut self,
        op: &O,
        root: &mut MeshVariant,
        colors: TypedAttributeHandle<i64>,
    ) -> Result<SchedulerStats, MeshError> {
        if op.primitive_type() != PrimitiveType::Vertex {
            return Err(MeshError::UnsupportedPrimitive {
                primitive: op.primitive_type(),
                top: root.mesh(op.mesh_id())?.top_simplex_type(),
            });
        }
        let batches = color_batches(root.mesh(op.mesh_id())?, colors)?;

        let mut pass = SchedulerStats::default();
        for (color, batch) in batches.into_iter().enumerate() {
            let batch = self.sorted(root, batch);
            let shared: &MeshVariant = root;
            let prepare = |s: &Simplex| {
                if !op.is_applicable(shared, s) {
                    return Ready::Rejected;
                }
                op.prepare(shared, s).map_or(Ready::Deferred, Ready::Prepared)
            };
            #[cfg(feature = "rayon")]
            let ready: Vec<Ready> = batch.par_iter().map(prepare).collect();
            #[cfg(not(feature = "rayon"))]
            let ready: Vec<Ready> = batch.iter().map(prepare).collect();
            debug!(
                "{}: color {color} has {} candidates, {} prepared",
                op.name(),
                batch.len(),
                ready.iter().filter(|r| matches!(r, Ready::Prepared(_))).count()
            );
            for (s, ready) in batch.iter().zip(ready) {
                let applied = match ready {
                    Ready::Rejected => false,
                    Ready::Prepared(edit) => !op.apply_prepared(root, s, edit).is_empty(),
                    Ready::Deferred => !op.apply(root, s).is_empty(),
                };
                pass.record(applied);
            }
        }
        Ok(self.finish(op, pass))
    }
}

/// State of one colored candidate after the read-only phase.
enum Ready {
    Rejected,
    Prepared(PreparedEdit),
    Deferred,
}

/// Live vertices of `mesh` grouped by their value in `colors`; vertices with
/// a negative color are left out.
pub fn color_batches<M: Mesh>(
    mesh: &M,
    colors: TypedAttributeHandle<i64>,
) -> Result<Vec<Vec<Simplex>>, MeshError> {
    let accessor = mesh.create_const_accessor(colors);
    let mut batches: Vec<Vec<Simplex>> = Vec::new();
    for v in mesh.get_all_simplices(PrimitiveType::Vertex) {
        let c = accessor.scalar(v.tuple())?;
        if c < 0 {
            continue;
        }
        let c = c as usize;
        if batches.len() <= c {
            batches.resize_with(c + 1, Vec::new);
        }
        batches[c].push(v);
    }
    Ok(batches)
}

/// Greedy coloring of the vertices of `mesh` such that two vertices at most
/// two edges apart get different colors, so their closed stars are
/// disjoint.
///
/// Colors are written to the `i64` vertex attribute [`COLOR_ATTRIBUTE`]
/// (registered on first use, `-1` for dead vertices). Returns its handle and
/// the number of colors used.
pub fn color_vertices<M: Mesh>(mesh: &mut M) -> Result<(TypedAttributeHandle<i64>, usize), MeshError> {
    let handle = match mesh.get_attribute_handle::<i64>(COLOR_ATTRIBUTE, PrimitiveType::Vertex) {
        Ok(handle) => handle,
        Err(_) => mesh.register_attribute::<i64>(COLOR_ATTRIBUTE, PrimitiveType::Vertex, 1, -1)?,
    };
    let capacity = mesh.capacity(PrimitiveType::Vertex);
    let mut colors = vec![-1i64; capacity];
    let mut used = 0usize;
    for v in mesh.get_all_simplices(PrimitiveType::Vertex) {
        let core = mesh.core();
        let mut taken: Vec<i64> = Vec::new();
        for u in one_ring(core, &v) {
            taken.push(colors[core.simplex_id(&u) as usize]);
            for w in one_ring(core, &u) {
                taken.push(colors[core.simplex_id(&w) as usize]);
            }
        }
        let color = (0..).find(|c| !taken.contains(c)).unwrap_or_default();
        colors[core.simplex_id(&v) as usize] = color;
        used = used.max(color as usize + 1);
    }
    let mut accessor = mesh.create_accessor(handle);
    for (id, color) in colors.into_iter().enumerate() {
        accessor.set_scalar_by_id(id as i64, color)?;
    }
    Ok((handle, used))
}
