//! Stars, links and cofaces.
//!
//! All queries start from the simplex's own cell and walk across facets that
//! contain the simplex, so their cost is bounded by the size of its star.

use smallvec::SmallVec;

use crate::mesh::local::local_simplices;
use crate::mesh::{MeshCore, VertexKey};
use crate::primitive::PrimitiveType;

use super::{IdSimplex, Simplex, SimplexCollection};

/// Every sub-simplex of `cell` (the cell included) with its sorted vertices.
pub(crate) fn simplices_of_cell(core: &MeshCore, cell: i64) -> Vec<(IdSimplex, Simplex, VertexKey)> {
    let k = core.top_dim();
    let mut out = Vec::new();
    if k == 0 {
        let s = Simplex::vertex(core.tuple_from_cell(cell));
        out.push((IdSimplex::new(PrimitiveType::Vertex, cell), s, SmallVec::from_slice(&[cell])));
        return out;
    }
    let cv = core.cell_vertices(cell);
    for d in 0..=k {
        let pt = PrimitiveType::ALL[d];
        for (local, locals) in local_simplices(k, d).iter().enumerate() {
            let sequence: VertexKey = locals.iter().map(|&l| cv[l]).collect();
            let Some(t) = core.tuple_from_vertices_in_cell(cell, &sequence) else {
                continue;
            };
            let mut key = sequence;
            key.sort_unstable();
            let id = core.simplex_id_in_cell(d, cell, local);
            out.push((IdSimplex::new(pt, id), Simplex::new(pt, t), key));
        }
    }
    out
}

fn contains_all(key: &[i64], vertices: &[i64]) -> bool {
    vertices.iter().all(|v| key.contains(v))
}

/// Top-dimensional cells containing `s`, each as a tuple that also
/// represents `s`.
pub fn top_dimension_cofaces(core: &MeshCore, s: &Simplex) -> Vec<Simplex> {
    let top = core.top_simplex_type();
    let vertices = core.simplex_vertices(s);
    core.cells_containing(&vertices, s.tuple().global_cid())
        .into_iter()
        .filter_map(|cell| core.tuple_from_vertices_in_cell(cell, &vertices))
        .map(|t| Simplex::new(top, t))
        .collect()
}

/// Proper faces of `s`.
pub fn faces(core: &MeshCore, s: &Simplex) -> SimplexCollection {
    let vertices = core.simplex_vertices(s);
    let entries = simplices_of_cell(core, s.tuple().global_cid())
        .into_iter()
        .filter(|(id, _, key)| {
            id.primitive_type() < s.primitive_type() && contains_all(&vertices, key)
        })
        .map(|(id, simplex, _)| (id, simplex))
        .collect();
    SimplexCollection::from_entries(entries)
}

/// Simplices having `s` as a face, `s` included.
pub fn open_star(core: &MeshCore, s: &Simplex) -> SimplexCollection {
    let vertices = core.simplex_vertices(s);
    let mut entries = Vec::new();
    for cell in core.cells_containing(&vertices, s.tuple().global_cid()) {
        entries.extend(
            simplices_of_cell(core, cell)
                .into_iter()
                .filter(|(_, _, key)| contains_all(key, &vertices))
                .map(|(id, simplex, _)| (id, simplex)),
        );
    }
    SimplexCollection::from_entries(entries)
}

/// Closure of the open star.
pub fn closed_star(core: &MeshCore, s: &Simplex) -> SimplexCollection {
    let vertices = core.simplex_vertices(s);
    let mut entries = Vec::new();
    for cell in core.cells_containing(&vertices, s.tuple().global_cid()) {
        entries.extend(
            simplices_of_cell(core, cell)
                .into_iter()
                .map(|(id, simplex, _)| (id, simplex)),
        );
    }
    SimplexCollection::from_entries(entries)
}

/// Simplices of the closed star sharing no vertex with `s`.
pub fn link(core: &MeshCore, s: &Simplex) -> SimplexCollection {
    let vertices = core.simplex_vertices(s);
    let mut entries = Vec::new();
    for cell in core.cells_containing(&vertices, s.tuple().global_cid()) {
        entries.extend(
            simplices_of_cell(core, cell)
                .into_iter()
                .filter(|(_, _, key)| !key.iter().any(|v| vertices.contains(v)))
                .map(|(id, simplex, _)| (id, simplex)),
        );
    }
    SimplexCollection::from_entries(entries)
}

/// Simplices of type `pt` having `s` as a face.
pub fn cofaces_of_dimension(core: &MeshCore, s: &Simplex, pt: PrimitiveType) -> Vec<Simplex> {
    open_star(core, s).simplex_vector_of(pt)
}

/// Vertices sharing an edge with vertex `v`.
///
/// In a point mesh the one-ring is empty.
pub fn one_ring(core: &MeshCore, v: &Simplex) -> Vec<Simplex> {
    debug_assert_eq!(v.primitive_type(), PrimitiveType::Vertex);
    if core.top_dim() == 0 {
        return Vec::new();
    }
    let vid = core.simplex_id(v);
    let mut entries = Vec::new();
    for cell in core.cells_containing(&[vid], v.tuple().global_cid()) {
        entries.extend(
            simplices_of_cell(core, cell)
                .into_iter()
                .filter(|(id, _, _)| id.primitive_type() == PrimitiveType::Vertex && id.id() != vid)
                .map(|(id, simplex, _)| (id, simplex)),
        );
    }
    SimplexCollection::from_entries(entries).simplex_vector()
}

/// Number of edges at vertex `v`.
pub fn valence(core: &MeshCore, v: &Simplex) -> usize {
    one_ring(core, v).len()
}
