use crate::attribute::TypedAttributeHandle;
use crate::mesh::{Mesh, MeshVariant};
use crate::multimesh::MeshId;
use crate::simplex::Simplex;

use super::Invariant;

/// Accepts a simplex only while a tag attribute holds a marker value.
///
/// The tag may live on a descendant: the root simplex is mapped down to the
/// mesh at `mesh_id` and accepted when any image carries the marker.
#[derive(Clone, Debug)]
pub struct TodoInvariant {
    mesh_id: MeshId,
    handle: TypedAttributeHandle<i64>,
    marker: i64,
}

impl TodoInvariant {
    pub fn new(mesh_id: MeshId, handle: TypedAttributeHandle<i64>) -> Self {
        Self::with_marker(mesh_id, handle, 1)
    }

    pub fn with_marker(mesh_id: MeshId, handle: TypedAttributeHandle<i64>, marker: i64) -> Self {
        Self {
            mesh_id,
            handle,
            marker,
        }
    }
}

impl Invariant for TodoInvariant {
    fn name(&self) -> &str {
        "todo"
    }

    fn before(&self, mesh: &MeshVariant, simplex: &Simplex) -> bool {
        let Ok(target) = mesh.mesh(&self.mesh_id) else {
            return false;
        };
        let tuples = if self.mesh_id.is_root() {
            vec![*simplex.tuple()]
        } else {
            match mesh.map_from_root(&self.mesh_id, simplex) {
                Ok(t) => t,
                Err(_) => return false,
            }
        };
        let tags = target.create_const_accessor(self.handle);
        tuples
            .iter()
            .any(|t| tags.scalar(t).is_ok_and(|x| x == self.marker))
    }
}
