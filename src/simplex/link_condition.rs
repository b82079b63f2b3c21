//! Topological collapsibility of an edge.
//!
//! The test works on vertex sets: for an edge `(a, b)` it compares
//! `lk(a) ∩ lk(b)` with `lk(ab)`. Boundaries are closed off by coning every
//! boundary facet over a virtual vertex, so collapsing an interior edge whose
//! endpoints both touch the boundary is rejected as well.

use std::collections::BTreeSet;

use crate::mesh::local::facets;
use crate::mesh::{MeshCore, VertexKey};
use crate::primitive::PrimitiveType;

use super::Simplex;

/// Id of the virtual vertex coned over the boundary.
const DUMMY_VERTEX: i64 = -1;

type KeySet = BTreeSet<VertexKey>;

/// Nonempty subsets of `vertices`, each sorted.
fn subsets(vertices: &[i64]) -> impl Iterator<Item = VertexKey> + '_ {
    (1u32..(1 << vertices.len())).map(move |mask| {
        let mut key: VertexKey = vertices
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &v)| v)
            .collect();
        key.sort_unstable();
        key
    })
}

/// Link of the simplex spanned by `center` inside the cells `cells`,
/// including the cone over boundary facets.
fn link_keys(core: &MeshCore, center: &[i64], cells: &[i64]) -> KeySet {
    let k = core.top_dim();
    let mut out = KeySet::new();
    for &cell in cells {
        let cv = core.cell_vertices(cell);
        let rest: VertexKey = cv.iter().copied().filter(|v| !center.contains(v)).collect();
        out.extend(subsets(&rest));
        for (i, facet) in facets(k).iter().enumerate() {
            if core.cell_neighbors(cell)[i] >= 0 {
                continue;
            }
            let fv: VertexKey = facet.iter().map(|&l| cv[l]).collect();
            if !center.iter().all(|v| fv.contains(v)) {
                continue;
            }
            let mut coned: VertexKey = fv.iter().copied().filter(|v| !center.contains(v)).collect();
            coned.push(DUMMY_VERTEX);
            out.extend(subsets(&coned).filter(|key| key.contains(&DUMMY_VERTEX)));
        }
    }
    out
}

/// Whether collapsing `edge` keeps the mesh a manifold (with boundary).
pub fn link_condition(core: &MeshCore, edge: &Simplex) -> bool {
    debug_assert_eq!(edge.primitive_type(), PrimitiveType::Edge);
    let vertices = core.simplex_vertices(edge);
    let (a, b) = (vertices[0], vertices[1]);
    if a == b || core.top_dim() == 0 {
        return false;
    }
    let cell = edge.tuple().global_cid();
    let lk_a = link_keys(core, &[a], &core.cells_containing(&[a], cell));
    let lk_b = link_keys(core, &[b], &core.cells_containing(&[b], cell));
    let lk_ab = link_keys(core, &[a, b], &core.cells_containing(&[a, b], cell));
    lk_a.intersection(&lk_b).eq(lk_ab.iter())
}
