//! Edge edits on edge meshes.

use crate::mesh::{EdgeMesh, Mesh};
use crate::mesh_error::MeshError;
use crate::tuple::Tuple;

use super::{EditRecord, IncidentCellData, LocalEditor};

/// Split/collapse executor for one edge of an [`EdgeMesh`].
///
/// The edge is its own only incident cell; its ears are the edges before and
/// after it.
pub struct EdgeMeshOperationExecutor<'a> {
    editor: LocalEditor<'a>,
}

impl<'a> EdgeMeshOperationExecutor<'a> {
    pub fn new(mesh: &'a mut EdgeMesh, tuple: &Tuple) -> Result<Self, MeshError> {
        Ok(Self {
            editor: LocalEditor::new(mesh.core_mut(), tuple)?,
        })
    }

    pub fn incident_edge_data(&self) -> Option<&IncidentCellData> {
        self.editor.incident_cell_datas().first()
    }

    pub fn split_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.split_edge()
    }

    pub fn collapse_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.collapse_edge()
    }
}
