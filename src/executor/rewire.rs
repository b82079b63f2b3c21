//! Dimension-independent connectivity rewrite behind split and collapse.
//!
//! Both edits are described as a [`Patch`]: the old cells around the edge and
//! the cells replacing them, each with its vertex list and its sub-simplex
//! ids. Sub-simplices are identified by their sorted vertex sets, which is
//! unambiguous inside the patch of a simplicial complex. Gluing the patch back
//! into the mesh only needs the facet keys of its border.

use hashbrown::{HashMap, HashSet};
use log::{trace, warn};
use smallvec::SmallVec;

use crate::mesh::local::{facets, local_simplices};
use crate::mesh::{MeshCore, VertexKey};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;
use crate::tuple::Tuple;

use super::{CreatedSimplex, EditKind, EditRecord, Provenance};

type IdRow = SmallVec<[i64; 6]>;

#[derive(Clone, Debug)]
struct PatchCell {
    id: i64,
    /// Global vertex ids in storage order.
    vertices: VertexKey,
    /// Old cell this one was derived from.
    origin: i64,
    /// Ids of the local `d`-simplices for `d < top`; row 0 is `vertices`.
    subs: [IdRow; 3],
}

#[derive(Debug)]
struct Patch {
    old_cells: Vec<i64>,
    cells: Vec<PatchCell>,
    deleted: [Vec<i64>; 4],
}

fn sorted_key(vertices: &[i64], locals: &[usize]) -> VertexKey {
    let mut key: VertexKey = locals.iter().map(|&l| vertices[l]).collect();
    key.sort_unstable();
    key
}

fn replace(key: &[i64], from: i64, to: i64) -> VertexKey {
    let mut out: VertexKey = key.iter().map(|&v| if v == from { to } else { v }).collect();
    out.sort_unstable();
    out
}

/// Id of the `d`-simplex with vertex set `key` inside old cell `cell`.
fn id_in_cell(core: &MeshCore, cell: i64, d: usize, key: &[i64]) -> Option<i64> {
    if d == 0 {
        return Some(key[0]);
    }
    let cv = core.cell_vertices(cell);
    local_simplices(core.top_dim(), d)
        .iter()
        .position(|locals| sorted_key(cv, locals).as_slice() == key)
        .map(|j| core.cell_simplices(d, cell)[j])
}

fn not_found(what: &str, key: &[i64], cell: i64) -> MeshError {
    MeshError::CorruptConnectivity(format!("{what} {key:?} not found in cell {cell}"))
}

fn allocate(core: &mut MeshCore, pt: PrimitiveType, count: usize) -> Vec<i64> {
    let ids = core.attributes_mut().allocate(pt, count);
    for &id in &ids {
        core.set_active(pt, id, true);
    }
    ids
}

/// Split the edge of `tuple`, inserting a vertex `m` between its endpoints.
pub fn split(core: &mut MeshCore, tuple: &Tuple) -> Result<EditRecord, MeshError> {
    core.validate_tuple(tuple)?;
    let k = core.top_dim();
    let ends = core.vertex_sequence(tuple, 2);
    let (a, b) = (ends[0], ends[1]);
    if k == 0 || a == b {
        return Err(MeshError::UnsupportedOperation("split of a degenerate edge"));
    }
    let old_cells = core.cells_containing(&[a, b], tuple.global_cid());
    trace!("split ({a}, {b}): {} incident cells", old_cells.len());

    let m = allocate(core, PrimitiveType::Vertex, 1)[0];
    let top = core.top_simplex_type();
    let cell_ids = allocate(core, top, 2 * old_cells.len());

    let mut cells: Vec<PatchCell> = Vec::with_capacity(cell_ids.len());
    for (i, &origin) in old_cells.iter().enumerate() {
        let cv = core.cell_vertices(origin);
        let halves = [
            cv.iter().map(|&v| if v == b { m } else { v }).collect::<VertexKey>(),
            cv.iter().map(|&v| if v == a { m } else { v }).collect::<VertexKey>(),
        ];
        for (h, vertices) in halves.into_iter().enumerate() {
            cells.push(PatchCell {
                id: cell_ids[2 * i + h],
                subs: [vertices.iter().copied().collect(), IdRow::new(), IdRow::new()],
                vertices,
                origin,
            });
        }
    }

    let mut record = EditRecord::new(EditKind::Split { a, b, m });
    record.created[0].push(CreatedSimplex {
        id: m,
        provenance: Provenance::Rib(a, b),
    });

    // sub-simplices: keys through m are new, everything else is inherited
    for d in 1..k {
        let pt = PrimitiveType::ALL[d];
        let mut fresh: Vec<(VertexKey, Provenance)> = Vec::new();
        let mut fresh_index: HashMap<VertexKey, usize> = HashMap::new();
        let mut rows: Vec<SmallVec<[Result<i64, usize>; 6]>> = Vec::with_capacity(cells.len());
        for cell in &cells {
            let mut row = SmallVec::new();
            for locals in local_simplices(k, d) {
                let key = sorted_key(&cell.vertices, locals);
                if key.contains(&m) {
                    let slot = match fresh_index.get(&key) {
                        Some(&slot) => slot,
                        None => {
                            let provenance = if key.contains(&a) {
                                let old = replace(&key, m, b);
                                Provenance::Spine(
                                    id_in_cell(core, cell.origin, d, &old)
                                        .ok_or_else(|| not_found("spine", &old, cell.origin))?,
                                )
                            } else if key.contains(&b) {
                                let old = replace(&key, m, a);
                                Provenance::Spine(
                                    id_in_cell(core, cell.origin, d, &old)
                                        .ok_or_else(|| not_found("spine", &old, cell.origin))?,
                                )
                            } else {
                                let (ka, kb) = (replace(&key, m, a), replace(&key, m, b));
                                Provenance::Rib(
                                    id_in_cell(core, cell.origin, d, &ka)
                                        .ok_or_else(|| not_found("rib side", &ka, cell.origin))?,
                                    id_in_cell(core, cell.origin, d, &kb)
                                        .ok_or_else(|| not_found("rib side", &kb, cell.origin))?,
                                )
                            };
                            fresh.push((key.clone(), provenance));
                            fresh_index.insert(key, fresh.len() - 1);
                            fresh.len() - 1
                        }
                    };
                    row.push(Err(slot));
                } else {
                    let id = id_in_cell(core, cell.origin, d, &key)
                        .ok_or_else(|| not_found("face", &key, cell.origin))?;
                    row.push(Ok(id));
                }
            }
            rows.push(row);
        }
        let ids = allocate(core, pt, fresh.len());
        record.created[d] = ids
            .iter()
            .zip(&fresh)
            .map(|(&id, (_, provenance))| CreatedSimplex {
                id,
                provenance: *provenance,
            })
            .collect();
        for (cell, row) in cells.iter_mut().zip(rows) {
            cell.subs[d] = row
                .into_iter()
                .map(|entry| entry.unwrap_or_else(|slot| ids[slot]))
                .collect();
        }
    }
    record.created[k] = cells
        .iter()
        .map(|c| CreatedSimplex {
            id: c.id,
            provenance: Provenance::Spine(c.origin),
        })
        .collect();

    // old simplices through both endpoints disappear
    let mut deleted: [Vec<i64>; 4] = Default::default();
    for &cell in &old_cells {
        for d in 1..k {
            let cv = core.cell_vertices(cell);
            for (j, locals) in local_simplices(k, d).iter().enumerate() {
                let key = sorted_key(cv, locals);
                if key.contains(&a) && key.contains(&b) {
                    let id = core.cell_simplices(d, cell)[j];
                    if !deleted[d].contains(&id) {
                        deleted[d].push(id);
                    }
                }
            }
        }
    }
    deleted[k] = old_cells.clone();

    let patch = Patch {
        old_cells,
        cells,
        deleted,
    };
    apply_patch(core, patch, &mut record)?;

    record.result = record
        .new_cells
        .get(1)
        .and_then(|&cell| {
            let mut sequence: VertexKey = SmallVec::from_slice(&[m, b]);
            sequence.extend(
                core.cell_vertices(cell)
                    .iter()
                    .copied()
                    .filter(|&v| v != m && v != b),
            );
            core.tuple_from_vertices_in_cell(cell, &sequence)
        });
    Ok(record)
}

/// Collapse the edge of `tuple`: its vertex `a` is merged into the other
/// endpoint `b`.
///
/// The caller is responsible for the link condition; without it the
/// rewritten patch may duplicate simplices outside of it.
pub fn collapse(core: &mut MeshCore, tuple: &Tuple) -> Result<EditRecord, MeshError> {
    core.validate_tuple(tuple)?;
    let k = core.top_dim();
    let ends = core.vertex_sequence(tuple, 2);
    let (a, b) = (ends[0], ends[1]);
    if k == 0 || a == b {
        return Err(MeshError::UnsupportedOperation("collapse of a degenerate edge"));
    }
    let old_cells = core.cells_containing(&[a], tuple.global_cid());
    trace!("collapse ({a} -> {b}): {} cells around {a}", old_cells.len());

    // every old sub-simplex of the patch by vertex set
    let mut old_ids: [HashMap<VertexKey, i64>; 3] = Default::default();
    for &cell in &old_cells {
        let cv = core.cell_vertices(cell);
        for d in 1..k {
            for (j, locals) in local_simplices(k, d).iter().enumerate() {
                old_ids[d].insert(sorted_key(cv, locals), core.cell_simplices(d, cell)[j]);
            }
        }
    }

    let mut record = EditRecord::new(EditKind::Collapse { a, b });
    let mut deleted: [Vec<i64>; 4] = Default::default();
    let mut merged_ids: [HashMap<i64, i64>; 3] = Default::default();
    for d in 1..k {
        for (key, &id) in &old_ids[d] {
            if !key.contains(&a) {
                continue;
            }
            if key.contains(&b) {
                deleted[d].push(id);
                continue;
            }
            if let Some(&survivor) = old_ids[d].get(&replace(key, a, b)) {
                merged_ids[d].insert(id, survivor);
                record.merged[d].push((survivor, id));
                deleted[d].push(id);
            }
        }
        deleted[d].sort_unstable();
        record.merged[d].sort_unstable();
    }
    deleted[0].push(a);
    record.merged[0].push((b, a));

    let mut cells = Vec::new();
    for &cell in &old_cells {
        let cv = core.cell_vertices(cell);
        if cv.contains(&b) {
            deleted[k].push(cell);
            continue;
        }
        let vertices: VertexKey = cv.iter().map(|&v| if v == a { b } else { v }).collect();
        let mut subs: [IdRow; 3] = [vertices.iter().copied().collect(), IdRow::new(), IdRow::new()];
        for d in 1..k {
            subs[d] = core
                .cell_simplices(d, cell)
                .iter()
                .map(|id| *merged_ids[d].get(id).unwrap_or(id))
                .collect();
        }
        cells.push(PatchCell {
            id: cell,
            vertices,
            origin: cell,
            subs,
        });
    }

    let patch = Patch {
        old_cells,
        cells,
        deleted,
    };
    apply_patch(core, patch, &mut record)?;

    record.result = record
        .new_cells
        .iter()
        .min()
        .and_then(|&cell| core.tuple_from_vertices_in_cell(cell, &[b]))
        .or_else(|| core.find_tuple_from_vertices(&[b]));
    Ok(record)
}

/// Write the patch into the mesh and glue it to its border.
fn apply_patch(core: &mut MeshCore, patch: Patch, record: &mut EditRecord) -> Result<(), MeshError> {
    let k = core.top_dim();
    let top = core.top_simplex_type();
    let Patch {
        old_cells,
        cells,
        deleted,
    } = patch;

    // border cells by facet key, and every sub-simplex the patch used to own
    let in_patch: HashSet<i64> = old_cells.iter().copied().collect();
    let mut border: HashMap<VertexKey, (i64, usize)> = HashMap::new();
    let mut old_subs: [Vec<i64>; 3] = Default::default();
    for &cell in &old_cells {
        let cv = core.cell_vertices(cell);
        for (i, locals) in facets(k).iter().enumerate() {
            let n = core.cell_neighbors(cell)[i];
            if n < 0 || in_patch.contains(&n) {
                continue;
            }
            let key = sorted_key(cv, locals);
            let j = facet_towards(core, n, cell, &key)?;
            border.insert(key, (n, j));
        }
        for (d, subs) in old_subs.iter_mut().enumerate().take(k) {
            subs.extend_from_slice(core.cell_simplices(d, cell));
        }
    }

    let reused: HashSet<i64> = cells.iter().map(|c| c.id).collect();
    for &cell in &old_cells {
        core.bump_hash(cell);
        if !reused.contains(&cell) {
            core.set_active(top, cell, false);
        }
    }

    for cell in &cells {
        core.set_active(top, cell.id, true);
        for d in 0..k {
            core.set_cell_simplices(d, cell.id, &cell.subs[d]);
        }
        for i in 0..facets(k).len() {
            core.set_cell_neighbor(cell.id, i, -1);
        }
    }

    // neighbors inside the patch and across its border
    let mut owners: HashMap<VertexKey, SmallVec<[(i64, usize); 2]>> = HashMap::new();
    for cell in &cells {
        for (i, locals) in facets(k).iter().enumerate() {
            owners
                .entry(sorted_key(&cell.vertices, locals))
                .or_default()
                .push((cell.id, i));
        }
    }
    let mut glued: HashSet<VertexKey> = HashSet::new();
    for (key, list) in &owners {
        let outside = border.get(key).copied();
        match (list.as_slice(), outside) {
            ([(c, i)], None) => core.set_cell_neighbor(*c, *i, -1),
            ([(c, i)], Some((n, j))) => {
                core.set_cell_neighbor(*c, *i, n);
                core.set_cell_neighbor(n, j, *c);
                glued.insert(key.clone());
            }
            ([(c0, i0), (c1, i1)], None) => {
                core.set_cell_neighbor(*c0, *i0, *c1);
                core.set_cell_neighbor(*c1, *i1, *c0);
            }
            _ => {
                warn!("edit produced facet {key:?} with {} patch cells", list.len());
                return Err(MeshError::NonManifoldResult(format!(
                    "facet {key:?} would be shared by more than two cells"
                )));
            }
        }
    }
    for (key, &(n, j)) in &border {
        if !glued.contains(key) {
            core.set_cell_neighbor(n, j, -1);
        }
    }

    for cell in &cells {
        for d in 0..k {
            for &id in &cell.subs[d] {
                core.set_incident_cell(d, id, cell.id);
            }
        }
    }

    for (d, ids) in deleted.iter().enumerate() {
        for &id in ids {
            if d == k && reused.contains(&id) {
                continue;
            }
            core.set_active(PrimitiveType::ALL[d], id, false);
        }
    }

    // surviving simplices whose incident cell went away
    let border_cells: Vec<i64> = {
        let mut v: Vec<i64> = border.values().map(|&(n, _)| n).collect();
        v.sort_unstable();
        v.dedup();
        v
    };
    for d in 0..k {
        let pt = PrimitiveType::ALL[d];
        let mut ids = std::mem::take(&mut old_subs[d]);
        ids.sort_unstable();
        ids.dedup();
        for id in ids {
            if !core.is_active(pt, id) {
                continue;
            }
            let current = core.incident_cell(d, id);
            if core.is_active(top, current) && core.cell_simplices(d, current).contains(&id) {
                continue;
            }
            match border_cells
                .iter()
                .copied()
                .find(|&n| core.cell_simplices(d, n).contains(&id))
            {
                Some(n) => core.set_incident_cell(d, id, n),
                None if d == 0 => core.set_incident_cell(d, id, -1),
                None => {
                    warn!("{pt} {id} lost every incident cell");
                    return Err(MeshError::NonManifoldResult(format!(
                        "{pt} {id} would be left without an incident cell"
                    )));
                }
            }
        }
    }

    for cell in &cells {
        if !in_patch.contains(&cell.id) {
            core.bump_hash(cell.id);
        }
    }

    for (d, ids) in deleted.iter().enumerate() {
        let pt = PrimitiveType::ALL[d];
        for &id in ids {
            if d == k && reused.contains(&id) {
                continue;
            }
            core.attributes_mut().release(pt, id);
        }
    }

    record.new_cells = cells.iter().map(|c| c.id).collect();
    record.touched_cells = record
        .new_cells
        .iter()
        .copied()
        .chain(border_cells)
        .collect();
    record.old_cells = old_cells;
    let mut deleted = deleted;
    deleted[k].retain(|id| !reused.contains(id));
    record.deleted = deleted;
    trace!(
        "patch rewired: {} old cells, {} new cells, {} border cells",
        record.old_cells.len(),
        record.new_cells.len(),
        record.touched_cells.len() - record.new_cells.len()
    );
    Ok(())
}

/// Facet index of border cell `n` that points back at patch cell `cell`.
fn facet_towards(core: &MeshCore, n: i64, cell: i64, key: &[i64]) -> Result<usize, MeshError> {
    let k = core.top_dim();
    let nv = core.cell_vertices(n);
    facets(k)
        .iter()
        .enumerate()
        .position(|(j, locals)| {
            core.cell_neighbors(n)[j] == cell && sorted_key(nv, locals).as_slice() == key
        })
        .ok_or_else(|| {
            MeshError::CorruptConnectivity(format!(
                "cell {n} does not point back at {cell} across {key:?}"
            ))
        })
}
