//! MeshError: unified error type for wmtk public APIs
//!
//! Recoverable conditions (stale tuples, rejected invariants) are turned into
//! empty operation results by the operation layer; everything else reaching a
//! caller as `Err` is either bad input or a detected structural defect.

use thiserror::Error;

use crate::primitive::PrimitiveType;

/// Unified error type for mesh construction, navigation and editing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The tuple's recorded hash no longer matches the cell's current hash.
    #[error("stale tuple: cell {cell} has hash {current}, tuple carries {found}")]
    StaleTuple { cell: i64, found: i64, current: i64 },
    /// The tuple refers to a deleted or never-allocated cell.
    #[error("tuple refers to inactive cell {0}")]
    InactiveCell(i64),
    /// The requested simplex id is deleted or out of range.
    #[error("{primitive:?} {id} is not an active simplex")]
    InactiveSimplex { primitive: PrimitiveType, id: i64 },
    /// A local edit would leave a facet shared by more than two cells.
    #[error("edit would produce a non-manifold result: {0}")]
    NonManifoldResult(String),
    /// No simplex slot could be obtained for the given primitive.
    #[error("simplex allocation exhausted for {0:?}")]
    AllocationExhausted(PrimitiveType),
    /// The primitive does not exist in a mesh of the given top dimension.
    #[error("primitive {primitive:?} is not supported by a mesh with top simplex {top:?}")]
    UnsupportedPrimitive {
        primitive: PrimitiveType,
        top: PrimitiveType,
    },
    /// The operation cannot run on this kind of mesh.
    #[error("operation `{0}` is not supported on this mesh")]
    UnsupportedOperation(&'static str),
    /// Construction input was malformed (bad ids, non-manifold facets, ...).
    #[error("invalid mesh input: {0}")]
    InvalidInput(String),
    /// No attribute with the given name/primitive was registered.
    #[error("attribute `{0}` not found")]
    AttributeNotFound(String),
    /// An attribute with the given name already exists on that primitive.
    #[error("attribute `{name}` already registered on {primitive:?}")]
    DuplicateAttribute {
        name: String,
        primitive: PrimitiveType,
    },
    /// A vector write did not match the attribute's arity.
    #[error("attribute `{name}` expects {expected} values per simplex, got {found}")]
    AttributeDimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Scopes were closed out of order.
    #[error("scope mismatch: innermost scope has depth {expected}, token has depth {found}")]
    ScopeMismatch { expected: usize, found: usize },
    /// No mesh lives at the given multi-mesh path.
    #[error("no mesh at multi-mesh path {0:?}")]
    MeshNotFound(Vec<usize>),
    /// Parent/child maps disagree with each other or with connectivity.
    #[error("multi-mesh map inconsistency: {0}")]
    MapInconsistent(String),
    /// Connectivity tables violate symmetry or incidence invariants.
    #[error("connectivity corrupted: {0}")]
    CorruptConnectivity(String),
}
