#![cfg_attr(docsrs, feature(doc_cfg))]
//! # wmtk
//!
//! wmtk is a simplicial mesh library built around atomic local edits. It stores
//! point, edge, triangle and tetrahedral meshes as flat per-simplex attribute
//! arrays, navigates them with small hash-checked [`Tuple`](tuple::Tuple)
//! handles, and edits them with edge splits and collapses that keep
//! connectivity, user attributes and lower-dimensional child meshes
//! consistent.
//!
//! ## Features
//! - Tuple navigation (`switch_vertex/edge/face/tetrahedron`) with staleness
//!   detection through per-cell hashes
//! - Typed attributes with nested transactional scopes and free-list slot reuse
//! - Split and collapse executors for edge, triangle and tetrahedral meshes,
//!   with swaps and face splits composed from them
//! - Per-attribute split/collapse strategies and derived attributes
//!   recomputed after every edit
//! - Multi-mesh trees whose children follow every edit of the root
//! - Invariant-gated operations (link condition, inversion, interior-only,
//!   valence, todo tags) with exact rollback on rejection
//! - Schedulers with priorities, early exit and vertex coloring
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! wmtk = "0.1"
//! # Optional features:
//! # features = ["rayon", "check-invariants"]
//! ```
//!
//! ```
//! use wmtk::prelude::*;
//!
//! let mut mesh = MeshVariant::from(TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap());
//! let edge = Simplex::edge(mesh.tuple_from_id(PrimitiveType::Edge, 2).unwrap());
//! let result = EdgeSplit::new().apply(&mut mesh, &edge);
//! assert_eq!(result.len(), 1);
//! assert_eq!(mesh.count(PrimitiveType::Face), 4);
//! ```
//!
//! ## Error handling
//!
//! Fallible APIs return [`MeshError`](mesh_error::MeshError). Operations
//! never return errors: an operation that does not apply yields an empty
//! result and leaves every mesh of the tree untouched.
//!
//! ## Invariant checks
//!
//! With the `check-invariants` or `strict-invariants` feature every committed
//! operation sweeps connectivity and multi-mesh maps and panics on the first
//! violation. The sweeps are O(N).

pub mod attribute;
pub mod debug_invariants;
pub mod executor;
pub mod invariants;
pub mod io;
pub mod mesh;
pub mod mesh_error;
pub mod meshgen;
pub mod multimesh;
pub mod operations;
pub mod predicates;
pub mod primitive;
pub mod scheduler;
pub mod simplex;
pub mod strategy;
pub mod transfer;
pub mod tuple;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::attribute::{
        Accessor, AttributeHandle, ConstAccessor, MeshAttributeHandle, TypedAttributeHandle,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::executor::{EdgeEdit, EditKind, EditRecord};
    pub use crate::invariants::{
        InteriorEdgeInvariant, InteriorVertexInvariant, Invariant, InvariantCollection,
        LinkConditionInvariant, MinIncidentValenceInvariant, MultiMeshLinkConditionInvariant,
        SimplexInversionInvariant, TodoInvariant,
    };
    pub use crate::io::{MemoryWriter, MeshWriter};
    pub use crate::mesh::{EdgeMesh, Mesh, MeshVariant, PointMesh, ScopeToken, TetMesh, TriMesh};
    pub use crate::mesh_error::MeshError;
    pub use crate::multimesh::{
        check_map_valid, extract_child_mesh_from_tag, register_child_mesh,
        same_simplex_dimension_surjection, MeshId,
    };
    pub use crate::operations::{
        EdgeCollapse, EdgeSplit, EdgeSwap, FaceSplit, Operation, PreparedEdit,
        VertexLaplacianSmooth,
    };
    pub use crate::predicates::{Orientation, OrientationMode};
    pub use crate::primitive::PrimitiveType;
    pub use crate::scheduler::{color_batches, color_vertices, Scheduler, SchedulerOptions, SchedulerStats};
    pub use crate::simplex::{IdSimplex, Simplex, SimplexCollection};
    pub use crate::strategy::{
        AttributeStrategy, CollapseRule, SplitRibRule, SplitSpineRule, StrategyTable,
    };
    pub use crate::transfer::{SingleAttributeTransfer, TransferStrategy};
    pub use crate::tuple::Tuple;
}
