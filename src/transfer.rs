//! Derived attributes recomputed after every edit.
//!
//! A [`TransferStrategy`] owns one attribute whose values are a function of
//! another attribute on neighboring simplices: edge lengths from vertex
//! positions, face areas from positions, vertex tags from incident faces.
//! Operations run their transfers on the closed star of the result simplices
//! after the edit and before the `after` checks, so invariants see up to date
//! values and a failed transfer rolls the edit back.

use std::fmt;
use std::sync::Arc;

use crate::attribute::{Accessor, AttributeValue, ConstAccessor, TypedAttributeHandle};
use crate::mesh::{Mesh, MeshCore, MeshVariant};
use crate::mesh_error::MeshError;
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;
use crate::simplex::{closed_star, cofaces_of_dimension, faces, Simplex, SimplexCollection};

/// Computes a new value from the source values of the neighboring simplices,
/// one slice per neighbor.
pub type TransferFn<T, P> = Arc<dyn Fn(&[&[P]]) -> Vec<T> + Send + Sync>;

/// Recomputes one attribute of one mesh of the tree.
pub trait TransferStrategy: Send + Sync + fmt::Debug {
    /// Mesh holding the attribute.
    fn mesh_id(&self) -> &MeshId;

    /// Type of the simplices the attribute lives on.
    fn primitive_type(&self) -> PrimitiveType;

    /// Recompute the value of `simplex`, a simplex of
    /// [`primitive_type`](Self::primitive_type).
    fn run(&self, core: &mut MeshCore, simplex: &Simplex) -> Result<(), MeshError>;

    /// Recompute the value of every live simplex.
    fn update_all(&self, root: &mut MeshVariant) -> Result<(), MeshError> {
        let pt = self.primitive_type();
        let mesh = root.mesh_mut(self.mesh_id())?;
        for s in mesh.get_all_simplices(pt) {
            self.run(mesh.core_mut(), &s)?;
        }
        Ok(())
    }
}

/// An attribute computed from a single source attribute of the same mesh.
///
/// The neighbors of a simplex are the simplex itself when both attributes
/// live on the same primitive, its faces when the source is lower
/// dimensional and its cofaces when the source is higher dimensional.
pub struct SingleAttributeTransfer<T, P> {
    mesh_id: MeshId,
    target: TypedAttributeHandle<T>,
    source: TypedAttributeHandle<P>,
    functor: TransferFn<T, P>,
}

impl<T: AttributeValue, P: AttributeValue> fmt::Debug for SingleAttributeTransfer<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleAttributeTransfer")
            .field("mesh_id", &self.mesh_id)
            .field("target", &self.target)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<T: AttributeValue, P: AttributeValue> SingleAttributeTransfer<T, P> {
    pub fn new(
        mesh_id: MeshId,
        target: TypedAttributeHandle<T>,
        source: TypedAttributeHandle<P>,
        functor: impl Fn(&[&[P]]) -> Vec<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            mesh_id,
            target,
            source,
            functor: Arc::new(functor),
        }
    }

    pub fn target(&self) -> TypedAttributeHandle<T> {
        self.target
    }

    pub fn source(&self) -> TypedAttributeHandle<P> {
        self.source
    }

    fn neighbors(&self, core: &MeshCore, simplex: &Simplex) -> Vec<Simplex> {
        let from = self.source.primitive_type();
        let to = self.target.primitive_type();
        if from == to {
            vec![*simplex]
        } else if from < to {
            faces(core, simplex).simplex_vector_of(from)
        } else {
            cofaces_of_dimension(core, simplex, from)
        }
    }
}

impl SingleAttributeTransfer<f64, f64> {
    /// Euclidean length of each edge from vertex positions.
    pub fn edge_length(
        mesh_id: MeshId,
        length: TypedAttributeHandle<f64>,
        positions: TypedAttributeHandle<f64>,
    ) -> Self {
        debug_assert_eq!(length.primitive_type(), PrimitiveType::Edge);
        debug_assert_eq!(positions.primitive_type(), PrimitiveType::Vertex);
        Self::new(mesh_id, length, positions, |ends: &[&[f64]]| match ends {
            [p, q] => vec![p.iter().zip(*q).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt()],
            _ => vec![0.0],
        })
    }
}

impl<T: AttributeValue, P: AttributeValue> TransferStrategy for SingleAttributeTransfer<T, P> {
    fn mesh_id(&self) -> &MeshId {
        &self.mesh_id
    }

    fn primitive_type(&self) -> PrimitiveType {
        self.target.primitive_type()
    }

    fn run(&self, core: &mut MeshCore, simplex: &Simplex) -> Result<(), MeshError> {
        let value = {
            let source = ConstAccessor::new(core, self.source);
            let inputs = self
                .neighbors(core, simplex)
                .iter()
                .map(|s| source.simplex_vector(s))
                .collect::<Result<Vec<_>, _>>()?;
            (self.functor)(&inputs)
        };
        Accessor::new(core, self.target).set_vector(simplex.tuple(), &value)
    }
}

/// Run every transfer on the neighborhood of `results`, simplices of the
/// root.
pub(crate) fn apply_transfers(
    transfers: &[Box<dyn TransferStrategy>],
    root: &mut MeshVariant,
    results: &[Simplex],
) -> Result<(), MeshError> {
    for transfer in transfers {
        let id = transfer.mesh_id().clone();
        let seeds = if id.is_root() {
            results.to_vec()
        } else {
            let top = root.mesh(&id)?.top_simplex_type();
            let mut seeds = Vec::new();
            for s in results {
                let pt = s.primitive_type().min(top);
                seeds.extend(root.map_from_root(&id, s)?.into_iter().map(|t| Simplex::new(pt, t)));
            }
            seeds
        };
        let mesh = root.mesh_mut(&id)?;
        let mut region = SimplexCollection::new();
        for seed in &seeds {
            region = region.union(&closed_star(mesh.core(), seed));
        }
        for s in region.simplex_vector_of(transfer.primitive_type()) {
            transfer.run(mesh.core_mut(), &s)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshgen;

    #[test]
    fn edge_lengths_follow_positions() {
        let (mut m, p) = meshgen::single_triangle_with_positions().unwrap();
        let length = m
            .register_attribute::<f64>("length", PrimitiveType::Edge, 1, 0.0)
            .unwrap();
        let transfer = SingleAttributeTransfer::edge_length(MeshId::root(), length, p);
        let mut root = MeshVariant::from(m);
        transfer.update_all(&mut root).unwrap();

        let acc = root.create_const_accessor(length);
        let mut lengths: Vec<f64> = root
            .get_all(PrimitiveType::Edge)
            .iter()
            .map(|t| acc.scalar(t).unwrap())
            .collect();
        lengths.sort_by(f64::total_cmp);
        assert_eq!(lengths[0], 1.0);
        assert_eq!(lengths[1], 1.0);
        assert!((lengths[2] - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn higher_dimensional_sources_read_cofaces() {
        let mut m = meshgen::two_neighbors().unwrap();
        let area = m
            .register_attribute::<f64>("area", PrimitiveType::Face, 1, 1.0)
            .unwrap();
        let star = m
            .register_attribute::<f64>("star_area", PrimitiveType::Vertex, 1, 0.0)
            .unwrap();
        let transfer = SingleAttributeTransfer::new(MeshId::root(), star, area, |faces: &[&[f64]]| {
            vec![faces.iter().map(|f| f[0]).sum()]
        });
        let mut root = MeshVariant::from(m);
        transfer.update_all(&mut root).unwrap();

        let acc = root.create_const_accessor(star);
        assert_eq!(acc.scalar_by_id(0), 3.0);
        assert_eq!(acc.scalar_by_id(1), 2.0);
        assert_eq!(acc.scalar_by_id(4), 1.0);
    }
}
