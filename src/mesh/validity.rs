//! Full connectivity sweep used by tests and the invariant-checking features.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::core::{MeshCore, VertexKey};
use super::local::{facets, local_simplices};

fn corrupt(msg: String) -> MeshError {
    MeshError::CorruptConnectivity(msg)
}

/// Check every live cell and sub-simplex of `core`.
///
/// Verified, in order:
/// - attribute lengths equal capacities;
/// - live cells reference live sub-simplices, and a sub-simplex id names the
///   same vertex set in every cell that lists it;
/// - a facet is shared by at most two live cells, which then point at each
///   other, and a facet owned by one cell has neighbor `-1`;
/// - every live sub-simplex points at a live cell that contains it.
pub fn validate_connectivity(core: &MeshCore) -> Result<(), MeshError> {
    core.attributes().validate_lengths()?;
    let k = core.top_dim();
    if k == 0 {
        return Ok(());
    }
    let top = core.top_simplex_type();
    let cells = core.active_ids(top);

    let mut keys: [HashMap<i64, VertexKey>; 3] = Default::default();
    for &cell in &cells {
        for d in 0..k {
            let pt = PrimitiveType::ALL[d];
            for local in 0..local_simplices(k, d).len() {
                let id = core.cell_simplices(d, cell)[local];
                if !core.is_active(pt, id) {
                    return Err(corrupt(format!(
                        "cell {cell} references inactive {pt} {id}"
                    )));
                }
                let key = core.local_key(cell, d, local);
                match keys[d].get(&id) {
                    Some(existing) if *existing != key => {
                        return Err(corrupt(format!(
                            "{pt} {id} is {existing:?} in one cell and {key:?} in cell {cell}"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        keys[d].insert(id, key);
                    }
                }
            }
        }
    }

    let mut owners: HashMap<VertexKey, SmallVec<[(i64, usize); 2]>> = HashMap::new();
    for &cell in &cells {
        for i in 0..facets(k).len() {
            owners
                .entry(core.local_key(cell, k - 1, i))
                .or_default()
                .push((cell, i));
        }
    }
    for (key, list) in &owners {
        match list.as_slice() {
            [(c, i)] => {
                let n = core.cell_neighbors(*c)[*i];
                if n != -1 {
                    return Err(corrupt(format!(
                        "boundary facet {key:?} of cell {c} points at {n}"
                    )));
                }
            }
            [(c0, i0), (c1, i1)] => {
                if core.cell_neighbors(*c0)[*i0] != *c1 || core.cell_neighbors(*c1)[*i1] != *c0 {
                    return Err(corrupt(format!(
                        "cells {c0} and {c1} share facet {key:?} but are not mutual neighbors"
                    )));
                }
            }
            _ => {
                return Err(corrupt(format!(
                    "facet {key:?} is shared by {} cells",
                    list.len()
                )));
            }
        }
    }

    for d in 0..k {
        let pt = PrimitiveType::ALL[d];
        for id in core.active_ids(pt) {
            if d == 0 && !keys[0].contains_key(&id) {
                // isolated vertices carry no incident cell
                continue;
            }
            let cell = core.incident_cell(d, id);
            if !core.is_active(top, cell) || !core.cell_simplices(d, cell).contains(&id) {
                return Err(corrupt(format!(
                    "{pt} {id} points at cell {cell} which does not contain it"
                )));
            }
        }
    }
    Ok(())
}

/// Boolean form of [`validate_connectivity`].
pub fn is_connectivity_valid(core: &MeshCore) -> bool {
    match validate_connectivity(core) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("connectivity check failed: {e}");
            false
        }
    }
}
