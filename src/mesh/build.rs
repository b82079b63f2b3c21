//! Construction of connectivity tables from cell → vertex lists.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::core::{MeshCore, VertexKey};
use super::local::{facets, local_simplices};

/// Fill an empty `core` with `vertex_count` vertices and the given cells.
///
/// Sub-simplex ids are assigned in order of first appearance while walking
/// the cells in order and their local sub-simplices in table order. Facets
/// shared by more than two cells are rejected. Repeated vertices inside a
/// cell are only accepted for edge meshes (self loops).
pub(crate) fn initialize<C: AsRef<[i64]>>(
    core: &mut MeshCore,
    vertex_count: usize,
    cells: &[C],
) -> Result<(), MeshError> {
    let k = core.top_dim();
    if core.capacity(PrimitiveType::Vertex) != 0 {
        return Err(MeshError::InvalidInput(
            "mesh connectivity is already initialized".into(),
        ));
    }
    let vertex_range = core
        .attributes_mut()
        .reserve(PrimitiveType::Vertex, vertex_count);
    for v in vertex_range {
        core.set_active(PrimitiveType::Vertex, v, true);
    }
    if k == 0 {
        return Ok(());
    }

    for (c, cell) in cells.iter().enumerate() {
        let cell = cell.as_ref();
        if cell.len() != k + 1 {
            return Err(MeshError::InvalidInput(format!(
                "cell {c} has {} vertices, expected {}",
                cell.len(),
                k + 1
            )));
        }
        if let Some(v) = cell.iter().find(|&&v| v < 0 || v as usize >= vertex_count) {
            return Err(MeshError::InvalidInput(format!(
                "cell {c} references vertex {v} outside 0..{vertex_count}"
            )));
        }
        if k > 1 && has_repeats(cell) {
            return Err(MeshError::InvalidInput(format!(
                "cell {c} repeats a vertex: {cell:?}"
            )));
        }
    }

    let top = core.top_simplex_type();
    let cell_range = core.attributes_mut().reserve(top, cells.len());
    for (cid, cell) in cell_range.clone().zip(cells) {
        core.set_active(top, cid, true);
        core.set_cell_simplices(0, cid, cell.as_ref());
    }

    // interior sub-simplices, numbered by first appearance
    for d in 1..k {
        let pt = PrimitiveType::ALL[d];
        let mut ids: HashMap<VertexKey, i64> = HashMap::new();
        let mut per_cell = Vec::with_capacity(cells.len());
        for cid in cell_range.clone() {
            let mut row: SmallVec<[i64; 6]> = SmallVec::new();
            for local in 0..local_simplices(k, d).len() {
                let key = core.local_key(cid, d, local);
                let next = ids.len() as i64;
                let id = *ids.entry(key).or_insert(next);
                row.push(id);
            }
            per_cell.push(row);
        }
        let range = core.attributes_mut().reserve(pt, ids.len());
        for id in range {
            core.set_active(pt, id, true);
        }
        for (cid, row) in cell_range.clone().zip(per_cell) {
            core.set_cell_simplices(d, cid, &row);
        }
    }

    // neighbors across facets
    let mut facet_owners: HashMap<VertexKey, SmallVec<[(i64, usize); 2]>> = HashMap::new();
    for cid in cell_range.clone() {
        for i in 0..facets(k).len() {
            let key = core.local_key(cid, k - 1, i);
            facet_owners.entry(key).or_default().push((cid, i));
        }
    }
    for (key, owners) in &facet_owners {
        match owners.as_slice() {
            [_] => {}
            [(c0, i0), (c1, i1)] => {
                core.set_cell_neighbor(*c0, *i0, *c1);
                core.set_cell_neighbor(*c1, *i1, *c0);
            }
            _ => {
                return Err(MeshError::InvalidInput(format!(
                    "facet {key:?} is shared by {} cells",
                    owners.len()
                )));
            }
        }
    }

    // one incident cell per sub-simplex
    for cid in cell_range {
        for d in 0..k {
            let row: SmallVec<[i64; 6]> = core.cell_simplices(d, cid).iter().copied().collect();
            for id in row {
                if core.incident_cell(d, id) < 0 {
                    core.set_incident_cell(d, id, cid);
                }
            }
        }
    }
    Ok(())
}

fn has_repeats(cell: &[i64]) -> bool {
    cell.iter()
        .enumerate()
        .any(|(i, v)| cell[i + 1..].contains(v))
}
