//! Trees of meshes linked by simplex maps.
//!
//! A child mesh of top dimension `d` is attached to a parent of top dimension
//! `k >= d`. Every child cell is paired with one `d`-simplex of the parent:
//!
//! - the child stores `[child tuple, parent tuple]` on its top cells
//!   (`multimesh_map_to_parent`);
//! - the parent stores `[parent tuple, child tuple]` on its `d`-simplices
//!   (`multimesh_map_to_child_{i}`), or the null tuple where nothing maps.
//!
//! The two tuples of a pair see their simplex in the same vertex order, so a
//! pair also fixes how child vertices correspond to parent vertices. Edits
//! always run on the root and are propagated down; see [`propagate`].

pub mod maps;
pub mod propagate;
pub mod register;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::attribute::TypedAttributeHandle;
use crate::mesh::{Mesh, MeshCore, MeshVariant, VertexKey};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;
use crate::simplex::{neighborhood, Simplex};
use crate::tuple::Tuple;

pub use propagate::edit_edge;
pub use register::{extract_child_mesh_from_tag, register_child_mesh, same_simplex_dimension_surjection};
pub use validate::check_map_valid;

/// Path of a mesh in its multi-mesh tree: child indices from the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(Vec<usize>);

impl MeshId {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_path(path: &[usize]) -> Self {
        Self(path.to_vec())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn path(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A registered child and the parent-side map pointing into it.
#[derive(Clone, Debug)]
pub struct ChildData {
    mesh: Box<MeshVariant>,
    map_to_child: TypedAttributeHandle<i64>,
}

impl ChildData {
    pub fn mesh(&self) -> &MeshVariant {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut MeshVariant {
        &mut self.mesh
    }

    /// Parent attribute holding the maps into this child.
    pub fn map_handle(&self) -> TypedAttributeHandle<i64> {
        self.map_to_child
    }
}

/// Multi-mesh state of one mesh: its id, its map to the parent, and its
/// children.
#[derive(Clone, Debug, Default)]
pub struct MultiMeshManager {
    id: MeshId,
    map_to_parent: Option<TypedAttributeHandle<i64>>,
    children: Vec<ChildData>,
}

impl MultiMeshManager {
    pub fn mesh_id(&self) -> MeshId {
        self.id.clone()
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn children(&self) -> &[ChildData] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ChildData] {
        &mut self.children
    }

    /// Child-side attribute holding the map to the parent.
    pub fn map_to_parent_handle(&self) -> Option<TypedAttributeHandle<i64>> {
        self.map_to_parent
    }

    pub(crate) fn push_child(&mut self, mesh: MeshVariant, map_to_child: TypedAttributeHandle<i64>) {
        self.children.push(ChildData {
            mesh: Box::new(mesh),
            map_to_child,
        });
    }

    pub(crate) fn set_map_to_parent(&mut self, handle: TypedAttributeHandle<i64>) {
        self.map_to_parent = Some(handle);
    }

    /// Move the children out, e.g. to edit them next to their parent.
    pub(crate) fn take_children(&mut self) -> Vec<ChildData> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn restore_children(&mut self, children: Vec<ChildData>) {
        self.children = children;
    }

    /// Re-root this mesh (and its subtree) at `id`.
    pub(crate) fn set_id(&mut self, id: MeshId) {
        for (i, child) in self.children.iter_mut().enumerate() {
            child.mesh.core_mut().multi_mesh.set_id(id.child(i));
        }
        self.id = id;
    }
}

/// Vertex sequence of length `n` of each side of a stored pair.
fn pair_sequences(mine: &MeshCore, other: &MeshCore, pair: &(Tuple, Tuple), n: usize) -> (VertexKey, VertexKey) {
    (
        mine.vertex_sequence(&pair.0, n),
        other.vertex_sequence(&pair.1, n),
    )
}

/// Rename `sequence` from one side of a pair to the other.
fn translate(sequence: &[i64], from: &[i64], to: &[i64]) -> Option<VertexKey> {
    sequence
        .iter()
        .map(|v| from.iter().position(|x| x == v).map(|i| to[i]))
        .collect()
}

/// The parent tuple of a child tuple.
///
/// `t` may be any tuple of the child; the result sees the same vertices in
/// the same order inside the parent cell recorded for `t`'s cell.
pub fn map_to_parent_tuple(parent: &MeshCore, child: &MeshCore, t: &Tuple) -> Result<Tuple, MeshError> {
    let handle = child
        .multi_mesh()
        .map_to_parent_handle()
        .ok_or_else(|| MeshError::MapInconsistent("mesh has no parent".into()))?;
    child.validate_tuple(t)?;
    let n = child.top_dim() + 1;
    let pair = maps::read_pair(child, handle, t.global_cid()).ok_or_else(|| {
        MeshError::MapInconsistent(format!("child cell {} has no parent", t.global_cid()))
    })?;
    let (from, to) = pair_sequences(child, parent, &pair, n);
    translate(&child.vertex_sequence(t, n), &from, &to)
        .and_then(|seq| parent.tuple_from_vertices_in_cell(pair.1.global_cid(), &seq))
        .ok_or_else(|| {
            MeshError::MapInconsistent(format!("child cell {} maps to a stale parent tuple", t.global_cid()))
        })
}

/// Child tuples of a parent simplex.
///
/// Simplices of dimension at most the child's top dimension map to every
/// child simplex over one of their mapped cofaces; higher-dimensional ones
/// map to the child simplices over their mapped faces.
pub fn map_to_child_tuples(parent: &MeshCore, child_index: usize, s: &Simplex) -> Vec<Tuple> {
    let Some(child) = parent.multi_mesh().children().get(child_index) else {
        return Vec::new();
    };
    let child_core = child.mesh().core();
    let handle = child.map_handle();
    let dc = child_core.top_dim();
    let pt = PrimitiveType::ALL[dc];
    let n = dc + 1;

    let carriers: Vec<Simplex> = if s.dimension() <= dc {
        neighborhood::cofaces_of_dimension(parent, s, pt)
    } else {
        neighborhood::faces(parent, s).simplex_vector_of(pt)
    };
    let prefix = parent.simplex_vertices(s);
    let mut out = Vec::new();
    for carrier in carriers {
        let id = parent.simplex_id(&carrier);
        let Some(pair) = maps::read_pair(parent, handle, id) else {
            continue;
        };
        let (from, to) = pair_sequences(parent, child_core, &pair, n);
        // carrier vertices, starting with the queried simplex when it is a face
        let mut seq: VertexKey = if s.dimension() <= dc {
            prefix.clone()
        } else {
            SmallVec::new()
        };
        let rest: VertexKey = parent
            .simplex_vertices(&carrier)
            .into_iter()
            .filter(|v| !seq.contains(v))
            .collect();
        seq.extend(rest);
        if let Some(t) = translate(&seq, &from, &to)
            .and_then(|cs| child_core.tuple_from_vertices_in_cell(pair.1.global_cid(), &cs))
        {
            if !out.iter().any(|x: &Tuple| x.same_ids(&t)) {
                out.push(t);
            }
        }
    }
    out
}

impl MeshVariant {
    /// The mesh at `id` below this one.
    pub fn mesh(&self, id: &MeshId) -> Result<&MeshVariant, MeshError> {
        let mut current = self;
        for &i in relative_path(self, id)? {
            current = current
                .core()
                .multi_mesh()
                .children()
                .get(i)
                .map(ChildData::mesh)
                .ok_or_else(|| MeshError::MeshNotFound(id.path().to_vec()))?;
        }
        Ok(current)
    }

    pub fn mesh_mut(&mut self, id: &MeshId) -> Result<&mut MeshVariant, MeshError> {
        let path = relative_path(self, id)?.to_vec();
        let mut current = self;
        for i in path {
            current = current
                .core_mut()
                .multi_mesh
                .children_mut()
                .get_mut(i)
                .map(ChildData::mesh_mut)
                .ok_or_else(|| MeshError::MeshNotFound(id.path().to_vec()))?;
        }
        Ok(current)
    }

    /// Ids of every mesh below this one, parents before children.
    pub fn descendant_ids(&self) -> Vec<MeshId> {
        fn collect(mesh: &MeshVariant, out: &mut Vec<MeshId>) {
            for child in mesh.core().multi_mesh().children() {
                out.push(child.mesh().mesh_id());
                collect(child.mesh(), out);
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    /// Map a tuple of the mesh at `id` up to this (root) mesh.
    pub fn map_to_root_tuple(&self, id: &MeshId, t: &Tuple) -> Result<Tuple, MeshError> {
        let path = relative_path(self, id)?;
        let mut chain: Vec<&MeshCore> = vec![self.core()];
        let mut current = self;
        for &i in path {
            current = current
                .core()
                .multi_mesh()
                .children()
                .get(i)
                .map(ChildData::mesh)
                .ok_or_else(|| MeshError::MeshNotFound(id.path().to_vec()))?;
            chain.push(current.core());
        }
        let mut t = *t;
        for pair in chain.windows(2).rev() {
            t = map_to_parent_tuple(pair[0], pair[1], &t)?;
        }
        Ok(t)
    }

    /// Map a simplex of this mesh down to the mesh at `id`.
    pub fn map_from_root(&self, id: &MeshId, s: &Simplex) -> Result<Vec<Tuple>, MeshError> {
        let path = relative_path(self, id)?;
        let mut current = self;
        let mut simplices = vec![*s];
        for &i in path {
            let parent = current.core();
            let child = parent
                .multi_mesh()
                .children()
                .get(i)
                .ok_or_else(|| MeshError::MeshNotFound(id.path().to_vec()))?;
            let pt = s.primitive_type().min(child.mesh().top_simplex_type());
            simplices = simplices
                .iter()
                .flat_map(|x| map_to_child_tuples(parent, i, x))
                .map(|t| Simplex::new(pt, t))
                .collect();
            current = child.mesh();
        }
        Ok(simplices.into_iter().map(|x| *x.tuple()).collect())
    }
}

/// `id` relative to `mesh`, which must be one of its ancestors.
fn relative_path<'a>(mesh: &MeshVariant, id: &'a MeshId) -> Result<&'a [usize], MeshError> {
    let own = mesh.core().multi_mesh().mesh_id();
    id.path()
        .strip_prefix(own.path())
        .ok_or_else(|| MeshError::MeshNotFound(id.path().to_vec()))
}
