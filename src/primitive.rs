//! Simplex dimensions.

use serde::{Deserialize, Serialize};

/// The kind of simplex a handle refers to, ordered by dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Vertex = 0,
    Edge = 1,
    Face = 2,
    Tetrahedron = 3,
}

impl PrimitiveType {
    /// All primitive types in increasing dimension.
    pub const ALL: [PrimitiveType; 4] = [
        PrimitiveType::Vertex,
        PrimitiveType::Edge,
        PrimitiveType::Face,
        PrimitiveType::Tetrahedron,
    ];

    /// Topological dimension (vertex = 0, ..., tetrahedron = 3).
    pub const fn dimension(self) -> usize {
        self as usize
    }

    /// Inverse of [`PrimitiveType::dimension`].
    pub const fn from_dimension(dimension: usize) -> Option<Self> {
        match dimension {
            0 => Some(PrimitiveType::Vertex),
            1 => Some(PrimitiveType::Edge),
            2 => Some(PrimitiveType::Face),
            3 => Some(PrimitiveType::Tetrahedron),
            _ => None,
        }
    }

    /// Primitive types up to and including `self`.
    pub fn up_to(self) -> impl Iterator<Item = PrimitiveType> {
        Self::ALL.into_iter().take(self.dimension() + 1)
    }

    /// Lower-case name used in logs and attribute names.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Vertex => "vertex",
            PrimitiveType::Edge => "edge",
            PrimitiveType::Face => "face",
            PrimitiveType::Tetrahedron => "tetrahedron",
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
