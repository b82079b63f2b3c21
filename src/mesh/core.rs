//! Storage and navigation shared by every mesh type.
//!
//! A [`MeshCore`] owns the attribute manager of one mesh together with the
//! handles of its connectivity tables:
//!
//! | table | content | meshes |
//! |-------|---------|--------|
//! | cell → vertices | `EV`/`FV`/`TV` | edge, tri, tet |
//! | cell → edges | `FE`/`TE` | tri, tet |
//! | cell → faces | `TF` | tet |
//! | cell → neighbor across facet `i` | `EE`/`FF`/`TT` (`-1` on the boundary) | edge, tri, tet |
//! | `d`-simplex → one incident cell | `VE`/`VF`/`EF`/`VT`/`ET`/`FT` | edge, tri, tet |
//!
//! plus a liveness flag per primitive and a hash per cell. Point meshes have
//! no tables: their cells are their vertices.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::attribute::{AttributeManager, AttributeRole, TypedAttributeHandle};
use crate::mesh_error::MeshError;
use crate::multimesh::MultiMeshManager;
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;
use crate::tuple::Tuple;

use super::Mesh;
use super::local::{
    self, complete_sequence, facets, flag_from_sequence, local_simplices, sequence_from_flag,
};

/// Sorted or sequence-ordered global vertex ids of one simplex.
pub type VertexKey = SmallVec<[i64; 4]>;

type Flag = SmallVec<[usize; 3]>;

/// Checkpoint returned by [`MeshCore::begin_scope`].
///
/// Every token must be handed back exactly once, to either
/// [`MeshCore::commit_scope`] or [`MeshCore::rollback_scope`], innermost first.
#[must_use = "a scope must be committed or rolled back"]
#[derive(Debug, PartialEq, Eq)]
pub struct ScopeToken {
    depth: usize,
}

impl ScopeToken {
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Attribute storage, connectivity handles and multi-mesh links of one mesh.
#[derive(Clone, Debug)]
pub struct MeshCore {
    top: PrimitiveType,
    pub(crate) attributes: AttributeManager,
    flags: [Option<TypedAttributeHandle<i8>>; 4],
    hash: TypedAttributeHandle<i64>,
    cell_simplices: [Option<TypedAttributeHandle<i64>>; 3],
    cell_neighbors: Option<TypedAttributeHandle<i64>>,
    incident_cells: [Option<TypedAttributeHandle<i64>>; 3],
    pub(crate) multi_mesh: MultiMeshManager,
}

fn cell_letter(top: usize) -> char {
    match top {
        1 => 'e',
        2 => 'f',
        _ => 't',
    }
}

fn simplex_letter(d: usize) -> char {
    match d {
        0 => 'v',
        1 => 'e',
        2 => 'f',
        _ => 't',
    }
}

impl MeshCore {
    /// An empty mesh whose top simplices have type `top`.
    pub fn new(top: PrimitiveType) -> Self {
        let k = top.dimension();
        let mut attributes = AttributeManager::new(top);
        let mut flags = [None; 4];
        for pt in top.up_to() {
            flags[pt.dimension()] =
                Some(attributes.register_unchecked("flags", pt, 1, 0i8, AttributeRole::Internal));
        }
        let hash = attributes.register_unchecked("hash", top, 1, 0i64, AttributeRole::Hash);

        let mut cell_simplices = [None; 3];
        let mut cell_neighbors = None;
        let mut incident_cells = [None; 3];
        if k > 0 {
            let c = cell_letter(k);
            for d in 0..k {
                let arity = local_simplices(k, d).len();
                cell_simplices[d] = Some(attributes.register_unchecked(
                    &format!("{c}{}", simplex_letter(d)),
                    top,
                    arity,
                    -1i64,
                    AttributeRole::Internal,
                ));
                incident_cells[d] = Some(attributes.register_unchecked(
                    &format!("{}{c}", simplex_letter(d)),
                    PrimitiveType::ALL[d],
                    1,
                    -1i64,
                    AttributeRole::Internal,
                ));
            }
            cell_neighbors = Some(attributes.register_unchecked(
                &format!("{c}{c}"),
                top,
                k + 1,
                -1i64,
                AttributeRole::Internal,
            ));
        }

        Self {
            top,
            attributes,
            flags,
            hash,
            cell_simplices,
            cell_neighbors,
            incident_cells,
            multi_mesh: MultiMeshManager::default(),
        }
    }

    pub fn top_simplex_type(&self) -> PrimitiveType {
        self.top
    }

    pub fn top_dim(&self) -> usize {
        self.top.dimension()
    }

    pub fn attributes(&self) -> &AttributeManager {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeManager {
        &mut self.attributes
    }

    pub fn multi_mesh(&self) -> &MultiMeshManager {
        &self.multi_mesh
    }

    pub fn capacity(&self, pt: PrimitiveType) -> usize {
        if pt > self.top {
            return 0;
        }
        self.attributes.capacity(pt)
    }

    pub(crate) fn hash_handle(&self) -> TypedAttributeHandle<i64> {
        self.hash
    }

    // ---------------------------------------------------------------------
    // raw table access
    // ---------------------------------------------------------------------

    /// Whether `id` is a live simplex of type `pt`.
    pub fn is_active(&self, pt: PrimitiveType, id: i64) -> bool {
        let Some(flags) = self.flags.get(pt.dimension()).copied().flatten() else {
            return false;
        };
        id >= 0
            && (id as usize) < self.attributes.capacity(pt)
            && self.attributes.get(flags).scalar(id as usize) == 1
    }

    pub(crate) fn set_active(&mut self, pt: PrimitiveType, id: i64, active: bool) {
        if let Some(flags) = self.flags[pt.dimension()] {
            self.attributes
                .get_mut(flags)
                .set_scalar(id as usize, i8::from(active));
        }
    }

    /// Current version of a cell.
    pub fn cell_hash(&self, cell: i64) -> i64 {
        self.attributes.get(self.hash).scalar(cell as usize)
    }

    pub(crate) fn bump_hash(&mut self, cell: i64) {
        let next = self.cell_hash(cell) + 1;
        self.attributes
            .get_mut(self.hash)
            .set_scalar(cell as usize, next);
    }

    /// Global vertex ids of a cell in storage order.
    pub fn cell_vertices(&self, cell: i64) -> &[i64] {
        self.cell_simplices(0, cell)
    }

    /// Global ids of the local `d`-simplices of a cell, `d < top`.
    pub(crate) fn cell_simplices(&self, d: usize, cell: i64) -> &[i64] {
        match self.cell_simplices.get(d).copied().flatten() {
            Some(h) => self.attributes.get(h).vector(cell as usize),
            None => &[],
        }
    }

    pub(crate) fn set_cell_simplices(&mut self, d: usize, cell: i64, ids: &[i64]) {
        if let Some(h) = self.cell_simplices[d] {
            self.attributes.get_mut(h).set_vector(cell as usize, ids);
        }
    }

    /// Neighbor cells across each facet, `-1` on the boundary.
    pub fn cell_neighbors(&self, cell: i64) -> &[i64] {
        match self.cell_neighbors {
            Some(h) => self.attributes.get(h).vector(cell as usize),
            None => &[],
        }
    }

    pub(crate) fn set_cell_neighbor(&mut self, cell: i64, facet: usize, neighbor: i64) {
        if let Some(h) = self.cell_neighbors {
            self.attributes
                .get_mut(h)
                .set_entry(cell as usize, facet, neighbor);
        }
    }

    /// One cell containing the `d`-simplex `id`, `-1` if none is recorded.
    pub(crate) fn incident_cell(&self, d: usize, id: i64) -> i64 {
        if d == self.top_dim() {
            return id;
        }
        match self.incident_cells.get(d).copied().flatten() {
            Some(h) => self.attributes.get(h).scalar(id as usize),
            None => -1,
        }
    }

    pub(crate) fn set_incident_cell(&mut self, d: usize, id: i64, cell: i64) {
        if let Some(h) = self.incident_cells.get(d).copied().flatten() {
            self.attributes.get_mut(h).set_scalar(id as usize, cell);
        }
    }

    /// Global id of the `local`-th `d`-simplex of a cell.
    pub(crate) fn simplex_id_in_cell(&self, d: usize, cell: i64, local: usize) -> i64 {
        if d == self.top_dim() {
            cell
        } else {
            self.cell_simplices(d, cell)[local]
        }
    }

    /// Sorted vertex set of the `local`-th `d`-simplex of a cell.
    pub(crate) fn local_key(&self, cell: i64, d: usize, local: usize) -> VertexKey {
        let k = self.top_dim();
        if k == 0 {
            return SmallVec::from_slice(&[cell]);
        }
        let cv = self.cell_vertices(cell);
        let mut key: VertexKey = local_simplices(k, d)[local].iter().map(|&l| cv[l]).collect();
        key.sort_unstable();
        key
    }

    // ---------------------------------------------------------------------
    // tuples
    // ---------------------------------------------------------------------

    fn flag(&self, t: &Tuple) -> Flag {
        let locals = [t.local_vid(), t.local_eid(), t.local_fid()];
        locals[..self.top_dim()]
            .iter()
            .map(|&l| l.max(0) as usize)
            .collect()
    }

    fn tuple_from_flag(&self, cell: i64, flag: &[usize]) -> Tuple {
        let local = |d: usize| flag.get(d).map_or(-1, |&i| i as i8);
        Tuple::new(local(0), local(1), local(2), cell, self.cell_hash(cell))
    }

    /// Whether the tuple's cell and local ids index into the tables, live or
    /// not.
    fn in_bounds(&self, t: &Tuple) -> bool {
        let cell = t.global_cid();
        cell >= 0 && (cell as usize) < self.capacity(self.top) && self.tuple_locals_in_range(t)
    }

    fn tuple_locals_in_range(&self, t: &Tuple) -> bool {
        let k = self.top_dim();
        let locals = [t.local_vid(), t.local_eid(), t.local_fid()];
        locals.iter().enumerate().all(|(d, &l)| {
            if d < k {
                l >= 0 && (l as usize) < local_simplices(k, d).len()
            } else {
                l == -1
            }
        })
    }

    /// Global id of the `pt`-simplex of a tuple, `-1` for a null tuple or
    /// one whose ids fall outside the tables.
    ///
    /// Reads connectivity only; use [`validate_tuple`](Self::validate_tuple)
    /// to reject stale tuples.
    pub fn id(&self, t: &Tuple, pt: PrimitiveType) -> i64 {
        let d = pt.dimension();
        let k = self.top_dim();
        if d > k || !self.in_bounds(t) {
            return -1;
        }
        if d == k {
            return t.global_cid();
        }
        self.cell_simplices(d, t.global_cid())
            .get(self.flag(t)[d])
            .copied()
            .unwrap_or(-1)
    }

    /// Global id of a simplex.
    pub fn simplex_id(&self, s: &Simplex) -> i64 {
        self.id(s.tuple(), s.primitive_type())
    }

    /// Whether a tuple refers to a live cell at its current version.
    pub fn is_valid(&self, t: &Tuple) -> bool {
        self.validate_tuple(t).is_ok()
    }

    pub fn validate_tuple(&self, t: &Tuple) -> Result<(), MeshError> {
        let cell = t.global_cid();
        if t.is_null() || !self.is_active(self.top, cell) || !self.tuple_locals_in_range(t) {
            return Err(MeshError::InactiveCell(cell));
        }
        let current = self.cell_hash(cell);
        if current != t.hash() {
            return Err(MeshError::StaleTuple {
                cell,
                found: t.hash(),
                current,
            });
        }
        Ok(())
    }

    /// Switch the `pt`-simplex of a tuple.
    ///
    /// Switches below the top dimension stay inside the cell; switching the
    /// top simplex crosses the tuple's facet and returns `None` on the
    /// boundary. A stale or dead tuple switches to `None`.
    pub fn switch_tuple(&self, t: &Tuple, pt: PrimitiveType) -> Option<Tuple> {
        let d = pt.dimension();
        let k = self.top_dim();
        if d > k || !self.is_valid(t) {
            return None;
        }
        let mut flag = self.flag(t);
        if d < k {
            local::switch_in_flag(k, &mut flag, d);
            return Some(self.tuple_from_flag(t.global_cid(), &flag));
        }
        if k == 0 {
            return None;
        }
        let cell = t.global_cid();
        let neighbor = self.cell_neighbors(cell)[flag[k - 1]];
        if neighbor < 0 {
            return None;
        }
        if k == 1 && neighbor == cell {
            return Some(self.tuple_from_flag(cell, &[1 - flag[0]]));
        }
        let mut next = Flag::new();
        for (j, &local) in flag.iter().enumerate() {
            let id = self.cell_simplices(j, cell)[local];
            let pos = self.cell_simplices(j, neighbor).iter().position(|&x| x == id)?;
            next.push(pos);
        }
        Some(self.tuple_from_flag(neighbor, &next))
    }

    /// Apply a sequence of switches; `None` if any crosses the boundary.
    pub fn switch_tuples(&self, t: &Tuple, sequence: &[PrimitiveType]) -> Option<Tuple> {
        sequence
            .iter()
            .try_fold(*t, |acc, &pt| self.switch_tuple(&acc, pt))
    }

    /// Local vertex switch; never crosses the boundary. A stale tuple comes
    /// back unchanged, and still stale.
    pub fn switch_vertex(&self, t: &Tuple) -> Tuple {
        self.switch_tuple(t, PrimitiveType::Vertex).unwrap_or(*t)
    }

    /// Whether the tuple's local orientation agrees with the cell's storage
    /// order.
    pub fn is_ccw(&self, t: &Tuple) -> bool {
        let k = self.top_dim();
        if k == 0 || !self.in_bounds(t) {
            return true;
        }
        local::is_even_permutation(&sequence_from_flag(k, &self.flag(t)))
    }

    /// Canonical tuple of a cell: its vertices in storage order.
    pub fn tuple_from_cell(&self, cell: i64) -> Tuple {
        let k = self.top_dim();
        let seq: SmallVec<[usize; 4]> = (0..=k).collect();
        let flag = flag_from_sequence(k, &seq).unwrap_or_default();
        self.tuple_from_flag(cell, &flag)
    }

    /// A tuple whose `pt`-simplex is `id`.
    pub fn tuple_from_id(&self, pt: PrimitiveType, id: i64) -> Result<Tuple, MeshError> {
        if !self.is_active(pt, id) {
            return Err(MeshError::InactiveSimplex { primitive: pt, id });
        }
        let k = self.top_dim();
        let d = pt.dimension();
        if d == k {
            return Ok(self.tuple_from_cell(id));
        }
        let cell = self.incident_cell(d, id);
        if cell < 0 || !self.is_active(self.top, cell) {
            return Err(MeshError::InactiveSimplex { primitive: pt, id });
        }
        let local = self
            .cell_simplices(d, cell)
            .iter()
            .position(|&x| x == id)
            .ok_or_else(|| {
                MeshError::CorruptConnectivity(format!(
                    "{pt:?} {id} points at cell {cell} which does not contain it"
                ))
            })?;
        let seq = complete_sequence(k, local_simplices(k, d)[local]);
        let flag = flag_from_sequence(k, &seq).unwrap_or_default();
        Ok(self.tuple_from_flag(cell, &flag))
    }

    /// The first `n` vertices visited by `v, sv, sv∘se, sv∘se∘sf` from `t`.
    ///
    /// Reads connectivity only and ignores the tuple's hash. Empty for a
    /// tuple whose ids fall outside the tables.
    pub fn vertex_sequence(&self, t: &Tuple, n: usize) -> VertexKey {
        let k = self.top_dim();
        if !self.in_bounds(t) {
            return VertexKey::new();
        }
        if k == 0 {
            return SmallVec::from_slice(&[t.global_cid()]);
        }
        let cv = self.cell_vertices(t.global_cid());
        sequence_from_flag(k, &self.flag(t))
            .iter()
            .take(n)
            .map(|&l| cv[l])
            .collect()
    }

    /// Vertices of a simplex, ordered as seen from its tuple.
    pub fn simplex_vertices(&self, s: &Simplex) -> VertexKey {
        self.vertex_sequence(s.tuple(), s.dimension() + 1)
    }

    /// The tuple of `cell` whose vertex sequence starts with `sequence`.
    pub fn tuple_from_vertices_in_cell(&self, cell: i64, sequence: &[i64]) -> Option<Tuple> {
        let k = self.top_dim();
        if k == 0 {
            return (sequence == [cell]).then(|| self.tuple_from_flag(cell, &[]));
        }
        let cv = self.cell_vertices(cell);
        let mut locals: SmallVec<[usize; 4]> = SmallVec::new();
        for v in sequence {
            let l = cv.iter().position(|x| x == v)?;
            if locals.contains(&l) {
                return None;
            }
            locals.push(l);
        }
        let flag = flag_from_sequence(k, &complete_sequence(k, &locals))?;
        Some(self.tuple_from_flag(cell, &flag))
    }

    /// A tuple, in the lowest-id live cell containing all `sequence`
    /// vertices, whose vertex sequence starts with `sequence`.
    pub fn find_tuple_from_vertices(&self, sequence: &[i64]) -> Option<Tuple> {
        let first = *sequence.first()?;
        self.cells_around_vertex(first)
            .into_iter()
            .filter(|&c| {
                let k = self.top_dim();
                k == 0 || sequence.iter().all(|v| self.cell_vertices(c).contains(v))
            })
            .min()
            .and_then(|c| self.tuple_from_vertices_in_cell(c, sequence))
    }

    // ---------------------------------------------------------------------
    // neighborhoods
    // ---------------------------------------------------------------------

    /// Live cells containing all `vertices`, reached from `start` across
    /// facets that contain them. Work is bounded by the star size.
    pub fn cells_containing(&self, vertices: &[i64], start: i64) -> Vec<i64> {
        let k = self.top_dim();
        if !self.is_active(self.top, start) {
            return Vec::new();
        }
        if k == 0 {
            return if vertices.iter().all(|&v| v == start) {
                vec![start]
            } else {
                Vec::new()
            };
        }
        let contains_all = |cell: i64, locals: &[usize]| {
            let cv = self.cell_vertices(cell);
            vertices
                .iter()
                .all(|v| locals.iter().any(|&l| cv[l] == *v))
        };
        if !contains_all(start, local_simplices(k, k)[0]) {
            return Vec::new();
        }
        let mut visited = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for (i, facet) in facets(k).iter().enumerate() {
                if !contains_all(cell, facet) {
                    continue;
                }
                let n = self.cell_neighbors(cell)[i];
                if n >= 0 && !visited.contains(&n) {
                    visited.push(n);
                    queue.push_back(n);
                }
            }
        }
        visited
    }

    /// Live cells containing vertex `v`.
    pub fn cells_around_vertex(&self, v: i64) -> Vec<i64> {
        if !self.is_active(PrimitiveType::Vertex, v) {
            return Vec::new();
        }
        let start = self.incident_cell(0, v);
        if start < 0 {
            return Vec::new();
        }
        self.cells_containing(&[v], start)
    }

    /// Ids of the top-dimensional cells containing a simplex.
    pub fn top_coface_cells(&self, s: &Simplex) -> Vec<i64> {
        let vertices = self.simplex_vertices(s);
        self.cells_containing(&vertices, s.tuple().global_cid())
    }

    /// Whether the simplex lies in a facet with no neighbor.
    pub fn is_boundary(&self, s: &Simplex) -> bool {
        let k = self.top_dim();
        if k == 0 || s.dimension() >= k {
            return false;
        }
        let vertices = self.simplex_vertices(s);
        self.cells_containing(&vertices, s.tuple().global_cid())
            .into_iter()
            .any(|cell| {
                let cv = self.cell_vertices(cell);
                facets(k).iter().enumerate().any(|(i, facet)| {
                    self.cell_neighbors(cell)[i] < 0
                        && vertices.iter().all(|v| facet.iter().any(|&l| cv[l] == *v))
                })
            })
    }

    /// Ids of all live simplices of a type, ascending.
    pub fn active_ids(&self, pt: PrimitiveType) -> Vec<i64> {
        (0..self.capacity(pt) as i64)
            .filter(|&id| self.is_active(pt, id))
            .collect()
    }

    /// Number of live simplices of a type.
    pub fn count(&self, pt: PrimitiveType) -> usize {
        (0..self.capacity(pt) as i64)
            .filter(|&id| self.is_active(pt, id))
            .count()
    }

    /// One tuple per live simplex of a type, ordered by id.
    pub fn get_all(&self, pt: PrimitiveType) -> Vec<Tuple> {
        self.active_ids(pt)
            .into_iter()
            .filter_map(|id| self.tuple_from_id(pt, id).ok())
            .collect()
    }

    // ---------------------------------------------------------------------
    // scopes
    // ---------------------------------------------------------------------

    /// Open a nested scope over this mesh and all of its descendants.
    pub fn begin_scope(&mut self) -> ScopeToken {
        self.push_scope_recursive();
        ScopeToken {
            depth: self.attributes.scope_depth(),
        }
    }

    /// Keep every change made since the matching `begin_scope`.
    pub fn commit_scope(&mut self, token: ScopeToken) -> Result<(), MeshError> {
        self.check_token(&token)?;
        self.close_scope_recursive(true);
        Ok(())
    }

    /// Undo every change made since the matching `begin_scope`.
    pub fn rollback_scope(&mut self, token: ScopeToken) -> Result<(), MeshError> {
        self.check_token(&token)?;
        self.close_scope_recursive(false);
        Ok(())
    }

    fn check_token(&self, token: &ScopeToken) -> Result<(), MeshError> {
        let expected = self.attributes.scope_depth();
        if token.depth != expected {
            return Err(MeshError::ScopeMismatch {
                expected,
                found: token.depth,
            });
        }
        Ok(())
    }

    fn push_scope_recursive(&mut self) {
        self.attributes.push_scope();
        for child in self.multi_mesh.children_mut() {
            child.mesh_mut().core_mut().push_scope_recursive();
        }
    }

    fn close_scope_recursive(&mut self, keep: bool) {
        if keep {
            self.attributes.commit_scope();
        } else {
            self.attributes.rollback_scope();
        }
        for child in self.multi_mesh.children_mut() {
            child.mesh_mut().core_mut().close_scope_recursive(keep);
        }
    }
}
