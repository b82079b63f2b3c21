use crate::executor::{EdgeEdit, EditKind};
use crate::invariants::{Invariant, MultiMeshLinkConditionInvariant};
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::{self, MeshId};
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;
use crate::strategy::StrategyTable;
use crate::tuple::Tuple;

use super::{cell_tuples, operation_settings, settings_accessors, Executed, Operation, OperationSettings};

/// Insert a vertex inside a triangle, connecting it to the three corners.
///
/// On a tetrahedral mesh each tet on either side of the face becomes three.
/// Runs as a split of the tuple's edge `(a, b)` at `m`, a split of `(m, c)`
/// at `n`, and a collapse of `m` onto `a`. With the default mean strategy `n`
/// ends up at `(a + b) / 4 + c / 2`; the collapse uses its own table, which
/// by default keeps the values of `a`.
///
/// Returns the new vertex.
#[derive(Debug)]
pub struct FaceSplit {
    settings: OperationSettings,
    collapse_strategies: StrategyTable,
}

impl FaceSplit {
    pub fn new() -> Self {
        Self::on(MeshId::root())
    }

    pub fn on(mesh_id: MeshId) -> Self {
        Self {
            settings: OperationSettings::new(mesh_id),
            collapse_strategies: StrategyTable::new(),
        }
    }

    pub fn collapse_strategies_mut(&mut self) -> &mut StrategyTable {
        &mut self.collapse_strategies
    }

    fn split(&self, root: &mut MeshVariant, t: &Tuple) -> Result<i64, MeshError> {
        let record = multimesh::edit_edge(root.core_mut(), t, EdgeEdit::Split, &self.settings.strategies)?;
        match record.kind {
            EditKind::Split { m, .. } => Ok(m),
            _ => Err(MeshError::UnsupportedOperation(self.name())),
        }
    }

    fn edge(root: &MeshVariant, a: i64, b: i64) -> Result<Tuple, MeshError> {
        root.core()
            .find_tuple_from_vertices(&[a, b])
            .ok_or_else(|| MeshError::CorruptConnectivity(format!("face split left no edge ({a}, {b})")))
    }
}

impl Default for FaceSplit {
    fn default() -> Self {
        Self::new()
    }
}

operation_settings!(FaceSplit);

impl Operation for FaceSplit {
    fn name(&self) -> &'static str {
        "face_split"
    }

    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::Face
    }

    settings_accessors!();

    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError> {
        if root.top_simplex_type() < PrimitiveType::Face {
            return Err(MeshError::UnsupportedOperation(self.name()));
        }
        let t = *simplex.tuple();
        let corners = root.core().vertex_sequence(&t, 3);
        let (a, c) = (corners[0], corners[2]);

        let m = self.split(root, &t)?;
        let spoke = Self::edge(root, m, c)?;
        let n = self.split(root, &spoke)?;

        let fold = Self::edge(root, m, a)?;
        if !MultiMeshLinkConditionInvariant.before(root, &Simplex::edge(fold)) {
            return Err(MeshError::NonManifoldResult(format!(
                "vertex {m} cannot fold onto {a}"
            )));
        }
        multimesh::edit_edge(root.core_mut(), &fold, EdgeEdit::Collapse, &self.collapse_strategies)?;

        let center = root.core().tuple_from_id(PrimitiveType::Vertex, n)?;
        let around = root.core().cells_around_vertex(n);
        Ok(Executed {
            simplices: vec![Simplex::vertex(center)],
            modified: cell_tuples(root, &around),
        })
    }
}
