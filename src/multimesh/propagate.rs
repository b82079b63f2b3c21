//! Running an edge edit on a mesh and everything below it.
//!
//! Before the parent is touched, every child records the map entries of the
//! parent patch (`Entry`) and looks up the child edges over the edited edge.
//! A child cut along a seam can carry several copies of one parent vertex,
//! so an edge may have more than one child edge above it; each copy is
//! edited on its own. The parent edit runs, then each child runs the same
//! edit on its edges and the entries are re-attached to the rewired
//! simplices by vertex sequence. Conflicts are detected before the parent
//! changes.

use hashbrown::{HashMap, HashSet};
use log::{debug, trace};

use crate::executor::{self, EdgeEdit, EditKind, EditRecord};
use crate::mesh::{Mesh, MeshCore, VertexKey};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;
use crate::strategy::StrategyTable;
use crate::tuple::Tuple;

use super::{maps, ChildData};

/// A map entry of the parent patch, as seen before the edit.
#[derive(Clone, Debug)]
struct Entry {
    parent_seq: VertexKey,
    child_cell: i64,
    child_seq: VertexKey,
}

#[derive(Debug)]
struct ChildPlan {
    entries: Vec<Entry>,
    /// Child vertex pairs `(over a, over b)` of the edges to edit.
    edges: Vec<[i64; 2]>,
}

/// Ids of the `d`-simplices of `cell`.
fn sub_ids(core: &MeshCore, cell: i64, d: usize) -> Vec<i64> {
    let k = core.top_dim();
    if d == k {
        vec![cell]
    } else if d == 0 {
        core.cell_vertices(cell).to_vec()
    } else {
        core.cell_simplices(d, cell).to_vec()
    }
}

/// Map entries of the `dc`-simplices of `cells`.
fn entries_of(parent: &MeshCore, child: &ChildData, cells: &[i64]) -> Vec<Entry> {
    let child_core = child.mesh().core();
    let dc = child_core.top_dim();
    let n = dc + 1;
    let mut ids: Vec<i64> = cells.iter().flat_map(|&c| sub_ids(parent, c, dc)).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
        .filter_map(|id| maps::read_pair(parent, child.map_handle(), id))
        .map(|pair| Entry {
            parent_seq: parent.vertex_sequence(&pair.0, n),
            child_cell: pair.1.global_cid(),
            child_seq: child_core.vertex_sequence(&pair.1, n),
        })
        .collect()
}

fn plan_child(
    parent: &MeshCore,
    child: &ChildData,
    edit: EdgeEdit,
    (a, b): (i64, i64),
    region: &[i64],
) -> Result<ChildPlan, MeshError> {
    let dc = child.mesh().core().top_dim();
    let entries = entries_of(parent, child, region);

    let mut edges: Vec<[i64; 2]> = Vec::new();
    if dc > 0 {
        for e in &entries {
            let (Some(pa), Some(pb)) = (
                e.parent_seq.iter().position(|&v| v == a),
                e.parent_seq.iter().position(|&v| v == b),
            ) else {
                continue;
            };
            let pair = [e.child_seq[pa], e.child_seq[pb]];
            if !edges.contains(&pair) {
                edges.push(pair);
            }
        }
    }

    if dc > 0 && edit == EdgeEdit::Collapse {
        // after renaming a to b, no two surviving child cells may sit on the
        // same parent simplex
        let mut around = region.to_vec();
        around.extend(parent.cells_around_vertex(b));
        around.sort_unstable();
        around.dedup();
        let mut claimed: HashMap<VertexKey, i64> = HashMap::new();
        for e in entries_of(parent, child, &around) {
            if e.parent_seq.contains(&a) && e.parent_seq.contains(&b) {
                continue;
            }
            let mut key: VertexKey =
                e.parent_seq.iter().map(|&v| if v == a { b } else { v }).collect();
            key.sort_unstable();
            if let Some(&other) = claimed.get(&key) {
                if other != e.child_cell {
                    return Err(MeshError::MapInconsistent(format!(
                        "collapsing ({a}, {b}) would put child cells {other} and {} of child {} on one parent simplex",
                        e.child_cell,
                        child.mesh().core().multi_mesh().mesh_id()
                    )));
                }
            }
            claimed.insert(key, e.child_cell);
        }
    }
    Ok(ChildPlan { entries, edges })
}

/// Run `edit` on the edge of `tuple` in `core`, then mirror it into every
/// descendant and update all maps and user attributes.
pub fn edit_edge(
    core: &mut MeshCore,
    tuple: &Tuple,
    edit: EdgeEdit,
    strategies: &StrategyTable,
) -> Result<EditRecord, MeshError> {
    core.validate_tuple(tuple)?;
    if core.top_dim() == 0 {
        return Err(MeshError::UnsupportedPrimitive {
            primitive: PrimitiveType::Edge,
            top: core.top_simplex_type(),
        });
    }
    let ends = core.vertex_sequence(tuple, 2);
    let (a, b) = (ends[0], ends[1]);
    let region = match edit {
        EdgeEdit::Split => core.cells_containing(&[a, b], tuple.global_cid()),
        EdgeEdit::Collapse => core.cells_containing(&[a], tuple.global_cid()),
    };
    let plans = core
        .multi_mesh()
        .children()
        .iter()
        .map(|child| plan_child(core, child, edit, (a, b), &region))
        .collect::<Result<Vec<_>, _>>()?;

    let record = executor::edit_edge(core, tuple, edit)?;
    let id = core.multi_mesh().mesh_id();
    strategies.apply(&id, core, &record)?;
    trace!("mesh {id}: {:?} done, following {} children", record.kind, plans.len());

    let mut children = core.multi_mesh.take_children();
    let result = children
        .iter_mut()
        .zip(plans)
        .try_for_each(|(child, plan)| follow(core, child, plan, edit, &record, strategies));
    core.multi_mesh.restore_children(children);
    result?;
    Ok(record)
}

#[derive(Debug)]
struct Target {
    child_cell: i64,
    parent_seq: VertexKey,
    child_seq: VertexKey,
    renamed: bool,
}

fn follow(
    parent: &mut MeshCore,
    child: &mut ChildData,
    plan: ChildPlan,
    edit: EdgeEdit,
    record: &EditRecord,
    strategies: &StrategyTable,
) -> Result<(), MeshError> {
    let handle = child.map_handle();
    let cc = child.mesh_mut().core_mut();
    let mut child_records: Vec<EditRecord> = Vec::with_capacity(plan.edges.len());
    for pair in &plan.edges {
        let t = cc.find_tuple_from_vertices(pair).ok_or_else(|| {
            MeshError::MapInconsistent(format!("child edge {pair:?} vanished during the edit"))
        })?;
        child_records.push(edit_edge(cc, &t, edit, strategies)?);
    }
    let child_handle = cc
        .multi_mesh()
        .map_to_parent_handle()
        .ok_or_else(|| MeshError::MapInconsistent("child without parent map".into()))?;
    let dc = cc.top_dim();
    let pt = PrimitiveType::ALL[dc];

    let mut to_parent: HashMap<i64, i64> = HashMap::new();
    for e in &plan.entries {
        to_parent.extend(e.child_seq.iter().copied().zip(e.parent_seq.iter().copied()));
    }
    if let EditKind::Split { m, .. } = record.kind {
        for cr in &child_records {
            if let EditKind::Split { m: child_m, .. } = cr.kind {
                to_parent.insert(child_m, m);
            }
        }
    }
    let rename = |v: i64| match record.kind {
        EditKind::Collapse { a, b } if v == a => b,
        _ => v,
    };

    for &id in &record.deleted[dc] {
        maps::clear(parent, handle, id);
    }
    let mut rebuilt: HashSet<i64> = HashSet::new();
    for cr in &child_records {
        for &id in &cr.deleted[dc] {
            maps::clear(cc, child_handle, id);
        }
        rebuilt.extend(cr.old_cells.iter().copied());
    }

    let mut targets: Vec<Target> = plan
        .entries
        .iter()
        .filter(|e| !rebuilt.contains(&e.child_cell) && cc.is_active(pt, e.child_cell))
        .map(|e| {
            let parent_seq: VertexKey = e.parent_seq.iter().map(|&v| rename(v)).collect();
            Target {
                renamed: parent_seq != e.parent_seq,
                child_cell: e.child_cell,
                parent_seq,
                child_seq: e.child_seq.clone(),
            }
        })
        .collect();
    for cr in &child_records {
        for &c in cr.new_cells.iter().filter(|&&c| cc.is_active(pt, c)) {
            let child_seq = cc.vertex_sequence(&cc.tuple_from_cell(c), dc + 1);
            let parent_seq = child_seq
                .iter()
                .map(|v| to_parent.get(v).map(|&p| rename(p)))
                .collect::<Option<VertexKey>>()
                .ok_or_else(|| {
                    MeshError::MapInconsistent(format!("new child cell {c} has an unmapped vertex"))
                })?;
            targets.push(Target {
                child_cell: c,
                parent_seq,
                child_seq,
                renamed: false,
            });
        }
    }
    // simplices that kept their vertices claim their parent first
    targets.sort_by_key(|t| t.renamed);

    let mut claimed: HashMap<VertexKey, i64> = HashMap::new();
    for t in targets {
        let mut key = t.parent_seq.clone();
        key.sort_unstable();
        if let Some(&other) = claimed.get(&key) {
            if dc == 0 {
                debug!("point {} merged into point {other}", t.child_cell);
                maps::clear(cc, child_handle, t.child_cell);
                cc.set_active(pt, t.child_cell, false);
                cc.bump_hash(t.child_cell);
                cc.attributes_mut().release(pt, t.child_cell);
                continue;
            }
            return Err(MeshError::MapInconsistent(format!(
                "child cells {other} and {} map to the same parent simplex {key:?}",
                t.child_cell
            )));
        }
        claimed.insert(key, t.child_cell);

        let parent_tuple = parent.find_tuple_from_vertices(&t.parent_seq).ok_or_else(|| {
            MeshError::MapInconsistent(format!("no parent simplex {:?}", t.parent_seq))
        })?;
        let child_tuple = cc
            .tuple_from_vertices_in_cell(t.child_cell, &t.child_seq)
            .ok_or_else(|| {
                MeshError::MapInconsistent(format!("child cell {} lost its vertices", t.child_cell))
            })?;
        let pid = parent.id(&parent_tuple, pt);
        maps::write_pair(parent, handle, pid, &parent_tuple, &child_tuple);
        maps::write_pair(cc, child_handle, t.child_cell, &child_tuple, &parent_tuple);
    }
    Ok(())
}
