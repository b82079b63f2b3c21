//! Simplex handles and neighborhood queries.

pub mod collection;
pub mod link_condition;
pub mod neighborhood;

use serde::{Deserialize, Serialize};

use crate::primitive::PrimitiveType;
use crate::tuple::Tuple;

pub use collection::SimplexCollection;
pub use link_condition::link_condition;
pub use neighborhood::{
    closed_star, cofaces_of_dimension, faces, link, one_ring, open_star, top_dimension_cofaces,
    valence,
};

/// A `k`-simplex given by its type and any tuple that contains it.
///
/// `PartialEq` compares the tuples exactly; two different tuples may name the
/// same simplex, see [`Mesh::simplices_equal`](crate::mesh::Mesh::simplices_equal).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Simplex {
    primitive: PrimitiveType,
    tuple: Tuple,
}

impl Simplex {
    pub const fn new(primitive: PrimitiveType, tuple: Tuple) -> Self {
        Self { primitive, tuple }
    }

    pub const fn vertex(tuple: Tuple) -> Self {
        Self::new(PrimitiveType::Vertex, tuple)
    }

    pub const fn edge(tuple: Tuple) -> Self {
        Self::new(PrimitiveType::Edge, tuple)
    }

    pub const fn face(tuple: Tuple) -> Self {
        Self::new(PrimitiveType::Face, tuple)
    }

    pub const fn tetrahedron(tuple: Tuple) -> Self {
        Self::new(PrimitiveType::Tetrahedron, tuple)
    }

    pub const fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    pub const fn dimension(&self) -> usize {
        self.primitive.dimension()
    }

    pub const fn tuple(&self) -> &Tuple {
        &self.tuple
    }
}

/// A simplex identified by its global id, totally ordered by (type, id).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdSimplex {
    primitive: PrimitiveType,
    id: i64,
}

impl IdSimplex {
    pub const fn new(primitive: PrimitiveType, id: i64) -> Self {
        Self { primitive, id }
    }

    pub const fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}
