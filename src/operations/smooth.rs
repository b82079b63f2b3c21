use crate::attribute::TypedAttributeHandle;
use crate::mesh::{Mesh, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;
use crate::simplex::{one_ring, Simplex};

use super::{
    cell_tuples, operation_settings, settings_accessors, Executed, Operation, OperationSettings,
    PreparedEdit,
};

/// Move a vertex to the mean position of its one-ring.
///
/// Only `position`, an attribute of the root, is written; connectivity and
/// tuples are unchanged. Pair with
/// [`InteriorVertexInvariant`](crate::invariants::InteriorVertexInvariant)
/// to keep the boundary fixed and with
/// [`SimplexInversionInvariant`](crate::invariants::SimplexInversionInvariant)
/// to reject moves that flip a cell.
#[derive(Debug)]
pub struct VertexLaplacianSmooth {
    settings: OperationSettings,
    position: TypedAttributeHandle<f64>,
}

impl VertexLaplacianSmooth {
    pub fn new(position: TypedAttributeHandle<f64>) -> Self {
        Self::on(MeshId::root(), position)
    }

    pub fn on(mesh_id: MeshId, position: TypedAttributeHandle<f64>) -> Self {
        Self {
            settings: OperationSettings::new(mesh_id),
            position,
        }
    }
}

operation_settings!(VertexLaplacianSmooth);

impl Operation for VertexLaplacianSmooth {
    fn name(&self) -> &'static str {
        "vertex_laplacian_smooth"
    }

    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::Vertex
    }

    settings_accessors!();

    fn execute(&self, root: &mut MeshVariant, simplex: &Simplex) -> Result<Executed, MeshError> {
        let vertex = Simplex::vertex(*simplex.tuple());
        let mean = self.ring_mean(root, &vertex)?;
        self.write(root, &vertex, &mean)
    }

    fn prepare(&self, root: &MeshVariant, simplex: &Simplex) -> Option<PreparedEdit> {
        let target = self.to_root(root, simplex).ok()?;
        let mean = self.ring_mean(root, &Simplex::vertex(*target.tuple())).ok()?;
        Some(PreparedEdit::new(mean))
    }

    fn execute_prepared(
        &self,
        root: &mut MeshVariant,
        simplex: &Simplex,
        prepared: PreparedEdit,
    ) -> Result<Executed, MeshError> {
        self.write(root, &Simplex::vertex(*simplex.tuple()), prepared.values())
    }
}

impl VertexLaplacianSmooth {
    fn ring_mean(&self, root: &MeshVariant, vertex: &Simplex) -> Result<Vec<f64>, MeshError> {
        let ring = one_ring(root.core(), vertex);
        if ring.is_empty() {
            return Err(MeshError::UnsupportedOperation(self.name()));
        }
        let positions = root.create_const_accessor(self.position);
        let mut mean = vec![0.0; positions.dimension()];
        for u in &ring {
            for (acc, x) in mean.iter_mut().zip(positions.simplex_vector(u)?) {
                *acc += x;
            }
        }
        let n = ring.len() as f64;
        mean.iter_mut().for_each(|x| *x /= n);
        Ok(mean)
    }

    fn write(&self, root: &mut MeshVariant, vertex: &Simplex, values: &[f64]) -> Result<Executed, MeshError> {
        let v = root.simplex_id(vertex);
        root.create_accessor(self.position).set_vector_by_id(v, values)?;
        let around = root.core().cells_around_vertex(v);
        Ok(Executed {
            simplices: vec![*vertex],
            modified: cell_tuples(root, &around),
        })
    }
}
