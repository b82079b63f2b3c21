use crate::executor::EdgeEdit;
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::{self, MeshId};
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;

use super::{cell_tuples, operation_settings, settings_accessors, Executed, Operation, OperationSettings};

/// Insert a vertex in the middle of an edge.
///
/// Returns the new vertex. User attributes follow the operation's strategy
/// table, positions default to the edge midpoint.
#[derive(Debug)]
pub struct EdgeSplit {
    settings: OperationSettings,
}

impl EdgeSplit {
    /// Split edges of the root mesh.
    pub fn new() -> Self {
        Self::on(MeshId::root())
    }

    /// Split edges of the mesh at `mesh_id`.
    pub fn on(mesh_id: MeshId) -> Self {
        Self {
            settings: OperationSettings::new(mesh_id),
        }
    }
}

impl Default for EdgeSplit {
    fn default() -> Self {
        Self::new()
    }
}

operation_settings!(EdgeSplit);

impl Operation for EdgeSplit {
    fn name(&self) -> &'static str {
        "edge_split"
    }

    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::Edge
    }

    settings_accessors!();

    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError> {
        let record = multimesh::edit_edge(
            root.core_mut(),
            simplex.tuple(),
            EdgeEdit::Split,
            &self.settings.strategies,
        )?;
        let result = record
            .result
            .ok_or(MeshError::UnsupportedOperation("edge_split"))?;
        Ok(Executed {
            simplices: vec![Simplex::vertex(result)],
            modified: cell_tuples(root, &record.new_cells),
        })
    }
}
