//! Attaching child meshes.

use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::attribute::{AttributeValue, TypedAttributeHandle};
use crate::mesh::{EdgeMesh, Mesh, MeshCore, MeshVariant, PointMesh, TetMesh, TriMesh};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;
use crate::tuple::Tuple;

use super::{maps, MeshId};

/// Each child vertex must sit over one parent vertex. A parent vertex may
/// carry several child vertices (a child cut along a seam), but every child
/// cell and every parent simplex is listed at most once.
fn check_pairs(
    parent: &MeshCore,
    child: &MeshCore,
    pairs: &[(Tuple, Tuple)],
) -> Result<(), MeshError> {
    let n = child.top_dim() + 1;
    let pt = child.top_simplex_type();
    let mut to_parent: HashMap<i64, i64> = HashMap::new();
    let mut child_cells: HashSet<i64> = HashSet::new();
    let mut parent_ids: HashSet<i64> = HashSet::new();
    for (ptuple, ctuple) in pairs {
        parent.validate_tuple(ptuple)?;
        child.validate_tuple(ctuple)?;
        if !child_cells.insert(ctuple.global_cid()) {
            return Err(MeshError::MapInconsistent(format!(
                "child cell {} is listed twice",
                ctuple.global_cid()
            )));
        }
        let pid = parent.id(ptuple, pt);
        if !parent_ids.insert(pid) {
            return Err(MeshError::MapInconsistent(format!("parent {pt} {pid} is listed twice")));
        }
        let ps = parent.vertex_sequence(ptuple, n);
        let cs = child.vertex_sequence(ctuple, n);
        for (&c, &p) in cs.iter().zip(&ps) {
            if *to_parent.entry(c).or_insert(p) != p {
                return Err(MeshError::MapInconsistent(format!(
                    "child vertex {c} sits over parent vertices {} and {p}",
                    to_parent[&c]
                )));
            }
        }
    }
    Ok(())
}

/// Attach `child` below `parent`, pairing the cell of each child tuple with
/// the simplex of the parent tuple it is listed with.
///
/// Pairs are `(parent tuple, child tuple)`; both tuples must see their
/// simplex in corresponding vertex order. Returns the id of the new child.
pub fn register_child_mesh<M: Mesh + ?Sized>(
    parent: &mut M,
    child: impl Into<MeshVariant>,
    pairs: &[(Tuple, Tuple)],
) -> Result<MeshId, MeshError> {
    let mut child = child.into();
    let parent = parent.core_mut();
    let dc = child.top_cell_dimension();
    if dc > parent.top_dim() {
        return Err(MeshError::InvalidInput(format!(
            "a child of dimension {dc} cannot hang below a mesh of dimension {}",
            parent.top_dim()
        )));
    }
    if !child.is_multi_mesh_root() || child.core().multi_mesh().map_to_parent_handle().is_some() {
        return Err(MeshError::InvalidInput("child mesh already has a parent".into()));
    }
    for depth in [parent.attributes().scope_depth(), child.core().attributes().scope_depth()] {
        if depth != 0 {
            return Err(MeshError::ScopeMismatch {
                expected: 0,
                found: depth,
            });
        }
    }
    check_pairs(parent, child.core(), pairs)?;

    let pt = PrimitiveType::ALL[dc];
    let index = parent.multi_mesh().children().len();
    let to_child = maps::register_map(parent, &maps::map_to_child_name(index), pt);
    let to_parent = maps::register_map(child.core_mut(), maps::MAP_TO_PARENT_NAME, pt);
    for (ptuple, ctuple) in pairs {
        let pid = parent.id(ptuple, pt);
        maps::write_pair(parent, to_child, pid, ptuple, ctuple);
        maps::write_pair(child.core_mut(), to_parent, ctuple.global_cid(), ctuple, ptuple);
    }

    let id = parent.multi_mesh().mesh_id().child(index);
    let child_core = child.core_mut();
    child_core.multi_mesh.set_map_to_parent(to_parent);
    child_core.multi_mesh.set_id(id.clone());
    debug!("registered {pt} child {id} with {} mapped cells", pairs.len());
    parent.multi_mesh.push_child(child, to_child);
    Ok(id)
}

/// Attach a child whose cell `i` is parent cell `parent_cells[i]`, both
/// seen through their canonical tuples.
pub fn same_simplex_dimension_surjection<M: Mesh + ?Sized>(
    parent: &mut M,
    child: impl Into<MeshVariant>,
    parent_cells: &[i64],
) -> Result<MeshId, MeshError> {
    let child = child.into();
    if child.top_simplex_type() != parent.core().top_simplex_type() {
        return Err(MeshError::InvalidInput(
            "surjection needs meshes of the same dimension".into(),
        ));
    }
    let child_cells = child.core().active_ids(child.top_simplex_type());
    if child_cells.len() != parent_cells.len() {
        return Err(MeshError::InvalidInput(format!(
            "{} child cells but {} parent cells",
            child_cells.len(),
            parent_cells.len()
        )));
    }
    let pairs: Vec<(Tuple, Tuple)> = child_cells
        .iter()
        .zip(parent_cells)
        .map(|(&c, &p)| {
            if !parent.core().is_active(parent.core().top_simplex_type(), p) {
                return Err(MeshError::InactiveCell(p));
            }
            Ok((parent.core().tuple_from_cell(p), child.core().tuple_from_cell(c)))
        })
        .collect::<Result<_, _>>()?;
    register_child_mesh(parent, child, &pairs)
}

/// Build a child from every parent simplex whose `tag` equals `value` and
/// attach it. The child has the tag's primitive as top simplex.
pub fn extract_child_mesh_from_tag<M, T>(
    parent: &mut M,
    tag: TypedAttributeHandle<T>,
    value: T,
) -> Result<MeshId, MeshError>
where
    M: Mesh + ?Sized,
    T: AttributeValue,
{
    let core = parent.core();
    let pt = tag.primitive_type();
    let n = pt.dimension() + 1;
    let attr = core.attributes().get(tag);
    let tuples: Vec<Tuple> = core
        .active_ids(pt)
        .into_iter()
        .filter(|&id| attr.scalar(id as usize) == value)
        .map(|id| core.tuple_from_id(pt, id))
        .collect::<Result<_, _>>()?;

    let mut renumber: HashMap<i64, i64> = HashMap::new();
    let cells: Vec<Vec<i64>> = tuples
        .iter()
        .map(|t| {
            core.vertex_sequence(t, n)
                .iter()
                .map(|&v| {
                    let next = renumber.len() as i64;
                    *renumber.entry(v).or_insert(next)
                })
                .collect()
        })
        .collect();
    let vertex_count = renumber.len();

    let child: MeshVariant = match pt {
        PrimitiveType::Vertex => PointMesh::new(vertex_count).into(),
        PrimitiveType::Edge => {
            EdgeMesh::from_edges_with_vertex_count(vertex_count, &fixed::<2>(&cells))?.into()
        }
        PrimitiveType::Face => {
            TriMesh::from_faces_with_vertex_count(vertex_count, &fixed::<3>(&cells))?.into()
        }
        PrimitiveType::Tetrahedron => {
            TetMesh::from_tets_with_vertex_count(vertex_count, &fixed::<4>(&cells))?.into()
        }
    };
    let pairs: Vec<(Tuple, Tuple)> = tuples
        .iter()
        .zip(&cells)
        .enumerate()
        .map(|(i, (&t, cell))| {
            let ct = match pt {
                PrimitiveType::Vertex => child.core().tuple_from_cell(cell[0]),
                _ => child.core().tuple_from_cell(i as i64),
            };
            (t, ct)
        })
        .collect();
    register_child_mesh(parent, child, &pairs)
}

fn fixed<const N: usize>(cells: &[Vec<i64>]) -> Vec<[i64; N]> {
    cells
        .iter()
        .map(|c| {
            let mut out = [0; N];
            out.copy_from_slice(&c[..N]);
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;
    use crate::multimesh::{check_map_valid, map_to_parent_tuple};
    use crate::simplex::Simplex;

    #[test]
    fn boundary_edges_become_an_edge_child() {
        let mut m = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        let tag = m
            .register_attribute::<i64>("boundary", PrimitiveType::Edge, 1, 0)
            .unwrap();
        for t in m.get_all(PrimitiveType::Edge) {
            if m.is_boundary(&Simplex::edge(t)) {
                let id = m.id(&t, PrimitiveType::Edge);
                m.create_accessor(tag).set_scalar_by_id(id, 1).unwrap();
            }
        }
        let id = extract_child_mesh_from_tag(&mut m, tag, 1).unwrap();
        assert_eq!(id, MeshId::from_path(&[0]));
        let child = m.core().multi_mesh().children()[0].mesh();
        assert_eq!(child.count(PrimitiveType::Edge), 4);
        assert_eq!(child.count(PrimitiveType::Vertex), 4);
        assert_eq!(child.mesh_id(), id);
        check_map_valid(m.core()).unwrap();
    }

    #[test]
    fn surjection_requires_matching_counts() {
        let mut m = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        let child = TriMesh::from_faces(&[[0, 1, 2]]).unwrap();
        assert!(same_simplex_dimension_surjection(&mut m, child, &[0, 1]).is_err());
        let child = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        same_simplex_dimension_surjection(&mut m, child, &[0, 1]).unwrap();
        check_map_valid(m.core()).unwrap();
    }

    #[test]
    fn inconsistent_pairs_are_rejected() {
        let mut m = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        let child = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        let pairs = [
            (m.core().tuple_from_cell(0), child.core().tuple_from_cell(1)),
            (m.core().tuple_from_cell(1), child.core().tuple_from_cell(0)),
        ];
        assert!(matches!(
            register_child_mesh(&mut m, child, &pairs),
            Err(MeshError::MapInconsistent(_))
        ));
    }

    #[test]
    fn cut_children_share_parent_vertices() {
        let mut m = crate::meshgen::two_neighbors().unwrap();
        let child = crate::meshgen::two_neighbors_cut_on_edge01().unwrap();
        let id = same_simplex_dimension_surjection(&mut m, child, &[0, 1, 2]).unwrap();
        check_map_valid(m.core()).unwrap();

        let child = m.core().multi_mesh().children()[0].mesh();
        assert_eq!(child.mesh_id(), id);
        assert_eq!(child.count(PrimitiveType::Vertex), 7);
        for (c, p) in [(0, 0), (6, 0), (1, 1), (5, 1)] {
            let t = child.tuple_from_id(PrimitiveType::Vertex, c).unwrap();
            let up = map_to_parent_tuple(m.core(), child.core(), &t).unwrap();
            assert_eq!(m.id(&up, PrimitiveType::Vertex), p, "child vertex {c}");
        }
    }
}
