use crate::executor::{EdgeEdit, EditKind};
use crate::invariants::{Invariant, InteriorEdgeInvariant, MultiMeshLinkConditionInvariant};
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::{self, MeshId};
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;
use crate::strategy::StrategyTable;
use crate::tuple::Tuple;

use super::{cell_tuples, operation_settings, settings_accessors, Executed, Operation, OperationSettings};

/// Replace an interior edge `(a, b)` by the edges joining the vertices
/// around it.
///
/// Runs as a split of `(a, b)` followed by a collapse of the new vertex onto
/// `c`, the vertex opposite the edge in the tuple's face. On a triangle mesh
/// this flips the diagonal of the two triangles around the edge. On a
/// tetrahedral mesh with `n` tets around the edge it produces `2n - 4` tets
/// fanned from `c`: the 3-2 swap for `n = 3`, the 4-4 swap for `n = 4`.
///
/// Returns the new edges from `c`, or, when there are none (`n = 3`), the
/// face spanned by the ring. The operation's strategy table drives the
/// split; the collapse uses its own table, which by default keeps the values
/// of `c`.
#[derive(Debug)]
pub struct EdgeSwap {
    settings: OperationSettings,
    collapse_strategies: StrategyTable,
}

impl EdgeSwap {
    pub fn new() -> Self {
        Self::on(MeshId::root())
    }

    pub fn on(mesh_id: MeshId) -> Self {
        let mut settings = OperationSettings::new(mesh_id);
        settings.invariants.add(InteriorEdgeInvariant);
        Self {
            settings,
            collapse_strategies: StrategyTable::new(),
        }
    }

    pub fn collapse_strategies_mut(&mut self) -> &mut StrategyTable {
        &mut self.collapse_strategies
    }
}

impl Default for EdgeSwap {
    fn default() -> Self {
        Self::new()
    }
}

operation_settings!(EdgeSwap);

impl Operation for EdgeSwap {
    fn name(&self) -> &'static str {
        "edge_swap"
    }

    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::Edge
    }

    settings_accessors!();

    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError> {
        if !matches!(
            root.top_simplex_type(),
            PrimitiveType::Face | PrimitiveType::Tetrahedron
        ) {
            return Err(MeshError::UnsupportedOperation(self.name()));
        }
        let t = *simplex.tuple();
        let ring = ring_vertices(root, &t);
        let c = root.core().vertex_sequence(&t, 3)[2];
        if ring.len() < 2 {
            return Err(MeshError::NonManifoldResult(format!(
                "edge has the same opposite vertex {c} on both sides"
            )));
        }
        let fresh: Vec<i64> = ring
            .iter()
            .copied()
            .filter(|&x| x != c && root.core().find_tuple_from_vertices(&[c, x]).is_none())
            .collect();

        let split = multimesh::edit_edge(
            root.core_mut(),
            &t,
            EdgeEdit::Split,
            &self.settings.strategies,
        )?;
        let EditKind::Split { m, .. } = split.kind else {
            return Err(MeshError::UnsupportedOperation(self.name()));
        };
        let spoke = root
            .core()
            .find_tuple_from_vertices(&[m, c])
            .ok_or_else(|| MeshError::CorruptConnectivity(format!("split left no edge ({m}, {c})")))?;
        if !MultiMeshLinkConditionInvariant.before(root, &Simplex::edge(spoke)) {
            return Err(MeshError::NonManifoldResult(format!(
                "an edge from {c} across the ring already exists"
            )));
        }
        let collapse = multimesh::edit_edge(
            root.core_mut(),
            &spoke,
            EdgeEdit::Collapse,
            &self.collapse_strategies,
        )?;

        let core = root.core();
        let simplices = if fresh.is_empty() {
            let face = core
                .find_tuple_from_vertices(&ring)
                .ok_or_else(|| MeshError::CorruptConnectivity(format!("swap left no face {ring:?}")))?;
            vec![Simplex::face(face)]
        } else {
            fresh
                .iter()
                .map(|&x| {
                    core.find_tuple_from_vertices(&[c, x])
                        .map(Simplex::edge)
                        .ok_or_else(|| MeshError::CorruptConnectivity(format!("swap left no edge ({c}, {x})")))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Executed {
            simplices,
            modified: cell_tuples(root, &collapse.new_cells),
        })
    }
}

/// Vertices of the cells around the edge of `t`, the edge excluded, in
/// ascending order.
fn ring_vertices(root: &MeshVariant, t: &Tuple) -> Vec<i64> {
    let core = root.core();
    let ends = core.vertex_sequence(t, 2);
    let mut ring: Vec<i64> = core
        .cells_containing(&ends, t.global_cid())
        .into_iter()
        .flat_map(|cell| core.cell_vertices(cell).to_vec())
        .filter(|v| !ends.contains(v))
        .collect();
    ring.sort_unstable();
    ring.dedup();
    ring
}
