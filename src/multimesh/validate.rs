//! Consistency sweep over multi-mesh maps.

use hashbrown::HashMap;
use log::warn;

use crate::mesh::{Mesh, MeshCore};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::maps;

fn inconsistent(msg: String) -> MeshError {
    warn!("{msg}");
    MeshError::MapInconsistent(msg)
}

/// Check the maps between `core` and each of its descendants.
///
/// Every live child cell must map to a live parent simplex that maps back
/// to it, every mapped parent simplex must map to a live child cell, and
/// every child vertex must sit over a single parent vertex. Several child
/// vertices may share a parent vertex.
pub fn check_map_valid(core: &MeshCore) -> Result<(), MeshError> {
    for (index, child) in core.multi_mesh().children().iter().enumerate() {
        let cc = child.mesh().core();
        let dc = cc.top_dim();
        let pt = PrimitiveType::ALL[dc];
        let n = dc + 1;
        let to_child = child.map_handle();
        let to_parent = cc
            .multi_mesh()
            .map_to_parent_handle()
            .ok_or_else(|| inconsistent(format!("child {index} has no parent map")))?;

        let mut vertex_to_parent: HashMap<i64, i64> = HashMap::new();
        for cell in cc.active_ids(pt) {
            let (ct, pt_tuple) = maps::read_pair(cc, to_parent, cell)
                .ok_or_else(|| inconsistent(format!("child cell {cell} is not mapped")))?;
            if ct.global_cid() != cell || !cc.is_valid(&ct) {
                return Err(inconsistent(format!("child cell {cell} stores a foreign tuple")));
            }
            if !core.is_valid(&pt_tuple) {
                return Err(inconsistent(format!(
                    "child cell {cell} maps to stale parent tuple {pt_tuple}"
                )));
            }
            let pid = core.id(&pt_tuple, pt);
            let (back_p, back_c) = maps::read_pair(core, to_child, pid).ok_or_else(|| {
                inconsistent(format!("parent {pt} {pid} does not map back to child cell {cell}"))
            })?;
            if back_c.global_cid() != cell || !core.is_valid(&back_p) || !cc.is_valid(&back_c) {
                return Err(inconsistent(format!(
                    "parent {pt} {pid} maps to {back_c} instead of child cell {cell}"
                )));
            }
            let forward: Vec<(i64, i64)> = cc
                .vertex_sequence(&ct, n)
                .into_iter()
                .zip(core.vertex_sequence(&pt_tuple, n))
                .collect();
            let mut backward: Vec<(i64, i64)> = cc
                .vertex_sequence(&back_c, n)
                .into_iter()
                .zip(core.vertex_sequence(&back_p, n))
                .collect();
            let mut sorted = forward.clone();
            sorted.sort_unstable();
            backward.sort_unstable();
            if sorted != backward {
                return Err(inconsistent(format!(
                    "child cell {cell} and parent {pt} {pid} disagree on their vertices"
                )));
            }
            for (c, p) in forward {
                if *vertex_to_parent.entry(c).or_insert(p) != p {
                    return Err(inconsistent(format!(
                        "child vertex {c} sits over more than one parent vertex"
                    )));
                }
            }
        }

        for pid in core.active_ids(pt) {
            if let Some((_, ct)) = maps::read_pair(core, to_child, pid) {
                if !cc.is_active(pt, ct.global_cid()) {
                    return Err(inconsistent(format!(
                        "parent {pt} {pid} maps to dead child cell {}",
                        ct.global_cid()
                    )));
                }
            }
        }

        check_map_valid(child.mesh().core())?;
    }
    Ok(())
}

impl crate::mesh::MeshVariant {
    /// [`check_map_valid`] over the subtree of this mesh.
    pub fn check_map_valid(&self) -> Result<(), MeshError> {
        check_map_valid(self.core())
    }
}
