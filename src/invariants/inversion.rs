use log::trace;

use crate::attribute::TypedAttributeHandle;
use crate::mesh::{Mesh, MeshVariant};
use crate::predicates::{orient, Orientation, OrientationMode};
use crate::tuple::Tuple;

use super::Invariant;

/// Every modified top cell must stay positively oriented, with vertices in
/// storage order and coordinates read from `position`.
///
/// Triangles need 2D positions, tetrahedra 3D positions; any other pairing
/// fails the check.
#[derive(Copy, Clone, Debug)]
pub struct SimplexInversionInvariant {
    position: TypedAttributeHandle<f64>,
    mode: OrientationMode,
}

impl SimplexInversionInvariant {
    pub fn new(position: TypedAttributeHandle<f64>) -> Self {
        Self::with_mode(position, OrientationMode::default())
    }

    pub fn with_mode(position: TypedAttributeHandle<f64>, mode: OrientationMode) -> Self {
        Self { position, mode }
    }
}

impl Invariant for SimplexInversionInvariant {
    fn name(&self) -> &str {
        "simplex_inversion"
    }

    fn after(&self, mesh: &MeshVariant, modified: &[Tuple]) -> bool {
        let core = mesh.core();
        let positions = mesh.create_const_accessor(self.position);
        modified.iter().all(|t| {
            let cell = t.global_cid();
            let coords: Vec<&[f64]> = core
                .cell_vertices(cell)
                .iter()
                .map(|&v| positions.vector_by_id(v))
                .collect();
            let ok = orient(&coords, self.mode) == Some(Orientation::Positive);
            if !ok {
                trace!("cell {cell} is inverted or degenerate");
            }
            ok
        })
    }
}
