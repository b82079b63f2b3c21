//! Atomic edge edits.
//!
//! Every edit follows the same steps:
//!
//! 1. gather the cells around the edge (the *patch*) and the cells bordering
//!    it across a facet;
//! 2. allocate ids for the simplices that appear;
//! 3. rewrite connectivity of the patch and glue it back to its border;
//! 4. report what was created, merged and deleted in an [`EditRecord`], which
//!    attribute strategies and multi-mesh propagation consume.
//!
//! The family-specific executors ([`TriMeshOperationExecutor`],
//! [`TetMeshOperationExecutor`], [`EdgeMeshOperationExecutor`]) expose the
//! per-cell neighborhood data of the patch and forward to the shared engine
//! in [`rewire`].

pub mod edge_mesh;
pub mod rewire;
pub mod tet_mesh;
pub mod tri_mesh;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::mesh::local::facets;
use crate::mesh::MeshCore;
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;
use crate::tuple::Tuple;

pub use edge_mesh::EdgeMeshOperationExecutor;
pub use tet_mesh::TetMeshOperationExecutor;
pub use tri_mesh::TriMeshOperationExecutor;

/// Which edit to run on an edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeEdit {
    Split,
    Collapse,
}

/// An edit that was carried out, with the global vertex ids involved.
///
/// `a` is the vertex of the input tuple, `b` the other endpoint. A collapse
/// removes `a` and keeps `b`; a split inserts `m` between them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    Split { a: i64, b: i64, m: i64 },
    Collapse { a: i64, b: i64 },
}

impl EditKind {
    pub fn endpoints(&self) -> (i64, i64) {
        match *self {
            EditKind::Split { a, b, .. } | EditKind::Collapse { a, b } => (a, b),
        }
    }
}

/// Where the data of a created simplex comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// A piece of the old simplex with this id (same dimension).
    Spine(i64),
    /// Spans between two old simplices: the one on the tuple's side and the
    /// one on the other side.
    Rib(i64, i64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSimplex {
    pub id: i64,
    pub provenance: Provenance,
}

/// Everything an edit changed, indexed by simplex dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: EditKind,
    /// Canonical result tuple: the new vertex of a split (looking at the
    /// `b` half of the spine), the surviving vertex of a collapse.
    pub result: Option<Tuple>,
    pub created: [Vec<CreatedSimplex>; 4],
    /// `(survivor, removed)` pairs of a collapse.
    pub merged: [Vec<(i64, i64)>; 4],
    pub deleted: [Vec<i64>; 4],
    /// Cells that existed around the edge before the edit.
    pub old_cells: Vec<i64>,
    /// Cells making up the patch after the edit.
    pub new_cells: Vec<i64>,
    /// New cells plus border cells whose neighbor table changed.
    pub touched_cells: Vec<i64>,
}

impl EditRecord {
    pub(crate) fn new(kind: EditKind) -> Self {
        Self {
            kind,
            result: None,
            created: Default::default(),
            merged: Default::default(),
            deleted: Default::default(),
            old_cells: Vec::new(),
            new_cells: Vec::new(),
            touched_cells: Vec::new(),
        }
    }

    pub fn created_ids(&self, pt: PrimitiveType) -> impl Iterator<Item = i64> + '_ {
        self.created[pt.dimension()].iter().map(|c| c.id)
    }
}

/// Neighbor of an incident cell across a facet not containing the whole
/// edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ear {
    /// Neighbor cell, `-1` on the boundary.
    pub cid: i64,
    /// Global id of the shared facet.
    pub fid: i64,
}

/// One cell around the edited edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidentCellData {
    pub cid: i64,
    /// Vertices of the cell other than the edge endpoints, in storage order.
    pub opposite_vids: SmallVec<[i64; 2]>,
    /// `[a-side, b-side]`: across the facet missing `b`, and the one missing
    /// `a`.
    pub ears: [Ear; 2],
}

/// Shared front end of the family executors.
///
/// Holds the mesh, the validated edge and the data of its incident cells.
pub struct LocalEditor<'a> {
    core: &'a mut MeshCore,
    tuple: Tuple,
    a: i64,
    b: i64,
    incident: Vec<IncidentCellData>,
}

impl<'a> LocalEditor<'a> {
    pub fn new(core: &'a mut MeshCore, tuple: &Tuple) -> Result<Self, MeshError> {
        core.validate_tuple(tuple)?;
        let k = core.top_dim();
        if k == 0 {
            return Err(MeshError::UnsupportedPrimitive {
                primitive: PrimitiveType::Edge,
                top: core.top_simplex_type(),
            });
        }
        let ends = core.vertex_sequence(tuple, 2);
        let (a, b) = (ends[0], ends[1]);
        let incident = core
            .cells_containing(&[a, b], tuple.global_cid())
            .into_iter()
            .map(|cid| incident_cell_data(core, cid, a, b))
            .collect();
        Ok(Self {
            core,
            tuple: *tuple,
            a,
            b,
            incident,
        })
    }

    pub fn endpoints(&self) -> (i64, i64) {
        (self.a, self.b)
    }

    pub fn incident_cell_datas(&self) -> &[IncidentCellData] {
        &self.incident
    }

    pub fn core(&self) -> &MeshCore {
        self.core
    }

    pub fn split_edge(self) -> Result<EditRecord, MeshError> {
        rewire::split(self.core, &self.tuple)
    }

    pub fn collapse_edge(self) -> Result<EditRecord, MeshError> {
        rewire::collapse(self.core, &self.tuple)
    }

    pub fn run(self, edit: EdgeEdit) -> Result<EditRecord, MeshError> {
        match edit {
            EdgeEdit::Split => self.split_edge(),
            EdgeEdit::Collapse => self.collapse_edge(),
        }
    }
}

fn incident_cell_data(core: &MeshCore, cid: i64, a: i64, b: i64) -> IncidentCellData {
    let k = core.top_dim();
    let cv = core.cell_vertices(cid);
    let opposite_vids = cv.iter().copied().filter(|&v| v != a && v != b).collect();
    let ear = |missing: i64| {
        let local = cv.iter().position(|&v| v == missing).unwrap_or(0);
        // facet i is opposite local vertex i for triangles and tets; for an
        // edge the facet missing `missing` is the other local vertex
        let facet = if k == 1 { 1 - local } else { local };
        debug_assert!(facet < facets(k).len());
        Ear {
            cid: core.cell_neighbors(cid)[facet],
            fid: core.simplex_id_in_cell(k - 1, cid, facet),
        }
    };
    IncidentCellData {
        cid,
        opposite_vids,
        ears: [ear(b), ear(a)],
    }
}

/// Run `edit` on the edge of `tuple` in any mesh with edges.
pub fn edit_edge(core: &mut MeshCore, tuple: &Tuple, edit: EdgeEdit) -> Result<EditRecord, MeshError> {
    LocalEditor::new(core, tuple)?.run(edit)
}
