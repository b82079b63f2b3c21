//! Edge edits on tetrahedral meshes.

use crate::mesh::{Mesh, TetMesh};
use crate::mesh_error::MeshError;
use crate::tuple::Tuple;

use super::{EditRecord, IncidentCellData, LocalEditor};

/// Split/collapse executor for one edge of a [`TetMesh`].
///
/// The incident tets are listed in the order they are reached walking around
/// the edge from the tuple's tet; each carries the two vertices opposite the
/// edge and the neighbors across its two faces that contain only one
/// endpoint.
pub struct TetMeshOperationExecutor<'a> {
    editor: LocalEditor<'a>,
}

impl<'a> TetMeshOperationExecutor<'a> {
    pub fn new(mesh: &'a mut TetMesh, tuple: &Tuple) -> Result<Self, MeshError> {
        Ok(Self {
            editor: LocalEditor::new(mesh.core_mut(), tuple)?,
        })
    }

    pub fn incident_tet_datas(&self) -> &[IncidentCellData] {
        self.editor.incident_cell_datas()
    }

    pub fn endpoints(&self) -> (i64, i64) {
        self.editor.endpoints()
    }

    /// Whether the edge lies on the boundary: walking around it hits a
    /// boundary face.
    pub fn is_boundary_edge(&self) -> bool {
        let core = self.editor.core();
        let (a, b) = self.editor.endpoints();
        self.incident_tet_datas().iter().any(|data| {
            let cv = core.cell_vertices(data.cid);
            data.opposite_vids.iter().any(|&o| {
                // the face (a, b, other opposite) is facet `o`
                cv.iter()
                    .position(|&v| v == o)
                    .is_some_and(|local| core.cell_neighbors(data.cid)[local] < 0)
                    && cv.contains(&a)
                    && cv.contains(&b)
            })
        })
    }

    pub fn split_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.split_edge()
    }

    pub fn collapse_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.collapse_edge()
    }
}
