use crate::executor::EdgeEdit;
use crate::invariants::MultiMeshLinkConditionInvariant;
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::{self, MeshId};
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;

use super::{cell_tuples, operation_settings, settings_accessors, Executed, Operation, OperationSettings};

/// Merge the vertex of the tuple into the other endpoint of its edge.
///
/// The link condition is checked on every mesh of the tree before anything
/// changes. Returns the surviving vertex.
#[derive(Debug)]
pub struct EdgeCollapse {
    settings: OperationSettings,
}

impl EdgeCollapse {
    pub fn new() -> Self {
        Self::on(MeshId::root())
    }

    pub fn on(mesh_id: MeshId) -> Self {
        let mut settings = OperationSettings::new(mesh_id);
        settings.invariants.add(MultiMeshLinkConditionInvariant);
        Self { settings }
    }
}

impl Default for EdgeCollapse {
    fn default() -> Self {
        Self::new()
    }
}

operation_settings!(EdgeCollapse);

impl Operation for EdgeCollapse {
    fn name(&self) -> &'static str {
        "edge_collapse"
    }

    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::Edge
    }

    settings_accessors!();

    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError> {
        let record = multimesh::edit_edge(
            root.core_mut(),
            simplex.tuple(),
            EdgeEdit::Collapse,
            &self.settings.strategies,
        )?;
        let (_, b) = record.kind.endpoints();
        // b may have moved, so every cell around it counts as modified
        let around = root.core().cells_around_vertex(b);
        Ok(Executed {
            simplices: record.result.map(Simplex::vertex).into_iter().collect(),
            modified: cell_tuples(root, &around),
        })
    }
}
