//! Edge edits on triangle meshes.

use crate::mesh::{Mesh, TriMesh};
use crate::mesh_error::MeshError;
use crate::tuple::Tuple;

use super::{EditRecord, IncidentCellData, LocalEditor};

/// Split/collapse executor for one edge of a [`TriMesh`].
///
/// Each incident face carries its opposite vertex and its two ears: the
/// neighbor across the edge `(a, c)` and the one across `(b, c)`.
pub struct TriMeshOperationExecutor<'a> {
    editor: LocalEditor<'a>,
}

impl<'a> TriMeshOperationExecutor<'a> {
    pub fn new(mesh: &'a mut TriMesh, tuple: &Tuple) -> Result<Self, MeshError> {
        Ok(Self {
            editor: LocalEditor::new(mesh.core_mut(), tuple)?,
        })
    }

    /// One entry per face incident to the edge, starting with the tuple's face.
    pub fn incident_face_datas(&self) -> &[IncidentCellData] {
        self.editor.incident_cell_datas()
    }

    pub fn endpoints(&self) -> (i64, i64) {
        self.editor.endpoints()
    }

    pub fn split_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.split_edge()
    }

    pub fn collapse_edge(self) -> Result<EditRecord, MeshError> {
        self.editor.collapse_edge()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshgen;
    use crate::primitive::PrimitiveType;

    #[test]
    fn ears_of_interior_edge() {
        let mut m = meshgen::hex_plus_two().unwrap();
        let t = m.core().find_tuple_from_vertices(&[4, 5]).unwrap();
        let exec = TriMeshOperationExecutor::new(&mut m, &t).unwrap();
        assert_eq!(exec.endpoints(), (4, 5));
        let datas = exec.incident_face_datas();
        assert_eq!(datas.len(), 2);
        // face 2 = (4, 5, 1) and face 7 = (4, 8, 5)
        assert_eq!(datas[0].cid, 2);
        assert_eq!(datas[0].opposite_vids.as_slice(), &[1]);
        assert_eq!(datas[0].ears[0].cid, 1);
        assert_eq!(datas[0].ears[1].cid, 3);
        assert_eq!(datas[1].cid, 7);
        assert_eq!(datas[1].ears[0].cid, 6);
        assert_eq!(datas[1].ears[1].cid, -1);
    }

    #[test]
    fn split_interior_edge_of_hex() {
        let mut m = meshgen::hex_plus_two().unwrap();
        let t = m.core().find_tuple_from_vertices(&[4, 5]).unwrap();
        let record = TriMeshOperationExecutor::new(&mut m, &t)
            .unwrap()
            .split_edge()
            .unwrap();
        assert_eq!(m.count(PrimitiveType::Vertex), 10);
        assert_eq!(m.count(PrimitiveType::Face), 10);
        assert_eq!(record.created[2].len(), 4);
        assert!(m.is_connectivity_valid());
    }
}
