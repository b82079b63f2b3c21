mod common;

use common::{counts, edge, vertex_ids};
use wmtk::mesh::{Mesh, MeshVariant, TriMesh};
use wmtk::meshgen;
use wmtk::operations::{EdgeCollapse, EdgeSplit, EdgeSwap, Operation};
use wmtk::primitive::PrimitiveType;

fn tri(mesh: &MeshVariant) -> &TriMesh {
    mesh.as_tri_mesh().unwrap()
}

#[test]
fn split_single_triangle() {
    let mut m = MeshVariant::from(meshgen::single_triangle().unwrap());
    let e = edge(&m, 1, 2);
    let out = EdgeSplit::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].primitive_type(), PrimitiveType::Vertex);
    assert_eq!(m.simplex_id(&out[0]), 3);
    assert_eq!(out[0].tuple().global_cid(), 2);
    assert_eq!(counts(&m), vec![4, 5, 2]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn split_interior_edge_of_hex() {
    let mut m = MeshVariant::from(meshgen::hex_plus_two().unwrap());
    assert_eq!(counts(&m), vec![9, 16, 8]);
    let e = edge(&m, 4, 5);
    let out = EdgeSplit::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(m.count(PrimitiveType::Vertex), 10);
    assert_eq!(m.count(PrimitiveType::Face), 10);
    // the middle edge became two, plus one rib per incident face
    assert_eq!(m.count(PrimitiveType::Edge), 19);
    assert!(m.is_connectivity_valid());
    assert!(m.core().find_tuple_from_vertices(&[4, 5]).is_none());
}

#[test]
fn split_boundary_edge() {
    let mut m = MeshVariant::from(meshgen::hex_plus_two().unwrap());
    let e = edge(&m, 5, 6);
    assert!(m.is_boundary(&e));
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![10, 18, 9]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn split_on_free_mesh() {
    let mut m = MeshVariant::from(meshgen::free_tri_mesh(3).unwrap());
    let e = edge(&m, 3, 4);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![10, 11, 4]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn split_result_sees_the_second_half() {
    let mut m = MeshVariant::from(meshgen::quad().unwrap());
    let e = edge(&m, 1, 2);
    let out = EdgeSplit::new().apply(&mut m, &e);
    let spine = wmtk::simplex::Simplex::edge(*out[0].tuple());
    assert_eq!(vertex_ids(&m, &spine), vec![4, 2]);
}

#[test]
fn collapse_hex_edge() {
    let mut m = MeshVariant::from(meshgen::hex_plus_two().unwrap());
    let e = edge(&m, 4, 5);
    let out = EdgeCollapse::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(m.simplex_id(&out[0]), 5);
    assert_eq!(m.count(PrimitiveType::Vertex), 8);
    assert_eq!(m.count(PrimitiveType::Face), 6);
    assert!(!m.core().is_active(PrimitiveType::Face, 2));
    assert!(!m.core().is_active(PrimitiveType::Face, 7));
    assert!(!m.core().is_active(PrimitiveType::Vertex, 4));

    let t = tri(&m);
    assert_eq!(t.fv_from_fid(0), [3, 5, 0]);
    assert_eq!(t.fv_from_fid(1), [5, 1, 0]);
    assert_eq!(t.fv_from_fid(5), [3, 7, 5]);
    assert_eq!(t.fv_from_fid(6), [7, 8, 5]);
    assert_eq!(t.fv_from_fid(3), [5, 2, 1]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn collapse_removes_shared_cells_only() {
    let mut m = MeshVariant::from(meshgen::two_neighbors().unwrap());
    let e = edge(&m, 1, 2);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![4, 5, 2]);
    assert_eq!(tri(&m).fv_from_fid(1), [3, 2, 0]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn collapse_rejected_by_link_condition_changes_nothing() {
    let mut m = MeshVariant::from(meshgen::three_neighbors().unwrap());
    let before = tri(&m).clone();
    let e = edge(&m, 0, 2);
    assert!(EdgeCollapse::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), counts(&before));
    for f in 0..4 {
        assert_eq!(tri(&m).fv_from_fid(f), before.fv_from_fid(f));
    }
    // the input tuple is still usable
    assert!(m.is_valid(e.tuple()));
}

#[test]
fn stale_input_yields_empty_result() {
    let mut m = MeshVariant::from(meshgen::hex_plus_two().unwrap());
    let e = edge(&m, 4, 5);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    let snapshot = counts(&m);
    assert!(EdgeSplit::new().apply(&mut m, &e).is_empty());
    assert!(EdgeCollapse::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), snapshot);
}

#[test]
fn operations_reject_wrong_primitive() {
    let mut m = MeshVariant::from(meshgen::quad().unwrap());
    let v = common::vertex(&m, 0);
    assert!(EdgeSplit::new().apply(&mut m, &v).is_empty());
    assert_eq!(m.count(PrimitiveType::Face), 2);
}

#[test]
fn swap_flips_the_diagonal() {
    let mut m = MeshVariant::from(meshgen::quad().unwrap());
    let e = edge(&m, 1, 2);
    let out = EdgeSwap::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    let mut ends = vertex_ids(&m, &out[0]);
    ends.sort_unstable();
    assert_eq!(ends, vec![0, 3]);
    assert_eq!(m.count(PrimitiveType::Vertex), 4);
    assert_eq!(m.count(PrimitiveType::Edge), 5);
    assert_eq!(m.count(PrimitiveType::Face), 2);
    assert!(m.core().find_tuple_from_vertices(&[1, 2]).is_none());
    assert!(m.is_connectivity_valid());
}

#[test]
fn swap_rejects_boundary_edges() {
    let mut m = MeshVariant::from(meshgen::quad().unwrap());
    let e = edge(&m, 0, 1);
    assert!(EdgeSwap::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![4, 5, 2]);
}

#[test]
fn swap_rejects_existing_diagonal() {
    // the swap of (0, 1) would create (2, 3), which already exists
    let mut m = MeshVariant::from(
        TriMesh::from_faces(&[[0, 1, 2], [1, 0, 3], [2, 1, 3], [0, 2, 3]]).unwrap(),
    );
    let e = edge(&m, 0, 1);
    assert!(!m.is_boundary(&e));
    assert!(EdgeSwap::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![4, 6, 4]);
    assert!(m.is_connectivity_valid());
}
