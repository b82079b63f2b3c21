//! Closed sum over the four mesh families.

use super::{EdgeMesh, Mesh, MeshCore, PointMesh, TetMesh, TriMesh};

/// Any mesh family.
///
/// Used wherever meshes of different dimension live side by side, most
/// notably in multi-mesh trees.
#[derive(Clone, Debug)]
pub enum MeshVariant {
    Point(PointMesh),
    Edge(EdgeMesh),
    Tri(TriMesh),
    Tet(TetMesh),
}

/// Evaluate `$body` with `$m` bound to the inner mesh of a [`MeshVariant`].
#[macro_export]
macro_rules! visit_mesh {
    ($variant:expr, $m:ident => $body:expr) => {
        match $variant {
            $crate::mesh::MeshVariant::Point($m) => $body,
            $crate::mesh::MeshVariant::Edge($m) => $body,
            $crate::mesh::MeshVariant::Tri($m) => $body,
            $crate::mesh::MeshVariant::Tet($m) => $body,
        }
    };
}

impl Mesh for MeshVariant {
    fn core(&self) -> &MeshCore {
        visit_mesh!(self, m => m.core())
    }

    fn core_mut(&mut self) -> &mut MeshCore {
        visit_mesh!(self, m => m.core_mut())
    }
}

macro_rules! variant_conversions {
    ($family:ident, $variant:ident, $as_ref:ident, $as_mut:ident) => {
        impl From<$family> for MeshVariant {
            fn from(m: $family) -> Self {
                MeshVariant::$variant(m)
            }
        }

        impl MeshVariant {
            pub fn $as_ref(&self) -> Option<&$family> {
                match self {
                    MeshVariant::$variant(m) => Some(m),
                    _ => None,
                }
            }

            pub fn $as_mut(&mut self) -> Option<&mut $family> {
                match self {
                    MeshVariant::$variant(m) => Some(m),
                    _ => None,
                }
            }
        }
    };
}

variant_conversions!(PointMesh, Point, as_point_mesh, as_point_mesh_mut);
variant_conversions!(EdgeMesh, Edge, as_edge_mesh, as_edge_mesh_mut);
variant_conversions!(TriMesh, Tri, as_tri_mesh, as_tri_mesh_mut);
variant_conversions!(TetMesh, Tet, as_tet_mesh, as_tet_mesh_mut);
