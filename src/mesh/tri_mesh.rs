//! Triangle meshes.

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::{build, impl_mesh_family, vertex_count_of, MeshCore};

/// A two-dimensional simplicial mesh.
///
/// Connectivity tables: `FV`, `FE`, `FF` per face; `VF`, `EF` per vertex and
/// edge. Local edge `i` of a face is the one opposite local vertex `i`.
#[derive(Clone, Debug)]
pub struct TriMesh {
    pub(crate) core: MeshCore,
}

impl TriMesh {
    pub fn new() -> Self {
        Self {
            core: MeshCore::new(PrimitiveType::Face),
        }
    }

    /// Build from face → vertex triples; vertices are `0..=max id`.
    pub fn from_faces(faces: &[[i64; 3]]) -> Result<Self, MeshError> {
        Self::from_faces_with_vertex_count(vertex_count_of(faces), faces)
    }

    pub fn from_faces_with_vertex_count(
        vertex_count: usize,
        faces: &[[i64; 3]],
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        build::initialize(&mut mesh.core, vertex_count, faces)?;
        Ok(mesh)
    }

    /// Vertices of face `fid` in storage order.
    pub fn fv_from_fid(&self, fid: i64) -> [i64; 3] {
        let fv = self.core.cell_vertices(fid);
        [fv[0], fv[1], fv[2]]
    }

    /// Edges of face `fid`, edge `i` opposite vertex `i`.
    pub fn fe_from_fid(&self, fid: i64) -> [i64; 3] {
        let fe = self.core.cell_simplices(1, fid);
        [fe[0], fe[1], fe[2]]
    }

    /// Neighbors of face `fid` across edge `i`, `-1` on the boundary.
    pub fn ff_from_fid(&self, fid: i64) -> [i64; 3] {
        let ff = self.core.cell_neighbors(fid);
        [ff[0], ff[1], ff[2]]
    }
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl_mesh_family!(TriMesh);
