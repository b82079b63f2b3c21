//! Tetrahedral meshes.

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::{build, impl_mesh_family, vertex_count_of, MeshCore};

/// A three-dimensional simplicial mesh.
///
/// Connectivity tables: `TV`, `TE`, `TF`, `TT` per tetrahedron; `VT`, `ET`,
/// `FT` per lower simplex. Local face `i` is opposite local vertex `i`.
#[derive(Clone, Debug)]
pub struct TetMesh {
    pub(crate) core: MeshCore,
}

impl TetMesh {
    pub fn new() -> Self {
        Self {
            core: MeshCore::new(PrimitiveType::Tetrahedron),
        }
    }

    /// Build from tet → vertex quadruples; vertices are `0..=max id`.
    pub fn from_tets(tets: &[[i64; 4]]) -> Result<Self, MeshError> {
        Self::from_tets_with_vertex_count(vertex_count_of(tets), tets)
    }

    pub fn from_tets_with_vertex_count(
        vertex_count: usize,
        tets: &[[i64; 4]],
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        build::initialize(&mut mesh.core, vertex_count, tets)?;
        Ok(mesh)
    }

    pub fn tv_from_tid(&self, tid: i64) -> [i64; 4] {
        let tv = self.core.cell_vertices(tid);
        [tv[0], tv[1], tv[2], tv[3]]
    }

    /// Neighbors of tet `tid` across face `i`, `-1` on the boundary.
    pub fn tt_from_tid(&self, tid: i64) -> [i64; 4] {
        let tt = self.core.cell_neighbors(tid);
        [tt[0], tt[1], tt[2], tt[3]]
    }
}

impl Default for TetMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl_mesh_family!(TetMesh);
