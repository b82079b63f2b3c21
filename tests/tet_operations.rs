mod common;

use common::{counts, edge, vertex_ids};
use itertools::Itertools;
use wmtk::invariants::SimplexInversionInvariant;
use wmtk::mesh::{Mesh, MeshVariant};
use wmtk::meshgen;
use wmtk::operations::{EdgeCollapse, EdgeSplit, EdgeSwap, FaceSplit, Operation};
use wmtk::primitive::PrimitiveType;
use wmtk::simplex::Simplex;

#[test]
fn split_shared_edge_of_two_tets() {
    let mut m = MeshVariant::from(meshgen::two_tets().unwrap());
    assert_eq!(counts(&m), vec![5, 9, 7, 2]);
    let e = edge(&m, 1, 2);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![6, 13, 12, 4]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn split_ring_edge_keeps_orientation() {
    let (mesh, p) = meshgen::six_tet_ring_with_positions().unwrap();
    let mut m = MeshVariant::from(mesh);
    let mut split = EdgeSplit::new();
    split.add_invariant(SimplexInversionInvariant::new(p));
    let e = edge(&m, 0, 1);
    let out = split.apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(m.count(PrimitiveType::Vertex), 9);
    assert_eq!(m.count(PrimitiveType::Tetrahedron), 12);

    let positions = m.create_const_accessor(p);
    let mid = positions.vector(out[0].tuple()).unwrap();
    for x in mid {
        assert!(x.abs() < 1e-12);
    }
}

#[test]
fn split_then_collapse_restores_the_ring() {
    let mut m = MeshVariant::from(meshgen::six_tet_ring().unwrap());
    let original = counts(&m);
    assert_eq!(original, vec![8, 19, 18, 6]);
    let e = edge(&m, 0, 1);
    let out = EdgeSplit::new().apply(&mut m, &e);
    let mid = m.simplex_id(&out[0]);
    let spoke = edge(&m, mid, 0);
    let back = EdgeCollapse::new().apply(&mut m, &spoke);
    assert_eq!(back.len(), 1);
    assert_eq!(m.simplex_id(&back[0]), 0);
    assert_eq!(counts(&m), original);
    assert!(m.is_connectivity_valid());
    assert!(m.core().find_tuple_from_vertices(&[0, 1]).is_some());
}

#[test]
fn collapse_corner_of_two_tets() {
    let mut m = MeshVariant::from(meshgen::two_tets().unwrap());
    let e = edge(&m, 0, 1);
    let out = EdgeCollapse::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(m.simplex_id(&out[0]), 1);
    assert_eq!(counts(&m), vec![4, 6, 4, 1]);
    assert!(!m.core().is_active(PrimitiveType::Tetrahedron, 0));
    assert_eq!(m.as_tet_mesh().unwrap().tv_from_tid(1), [1, 2, 3, 4]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn three_tets_swap_into_two() {
    let mut m = MeshVariant::from(meshgen::tet_ring(3).unwrap());
    assert_eq!(counts(&m), vec![5, 10, 9, 3]);
    let e = edge(&m, 0, 1);
    let out = EdgeSwap::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].primitive_type(), PrimitiveType::Face);
    assert_eq!(vertex_ids(&m, &out[0]).into_iter().sorted().collect_vec(), vec![2, 3, 4]);
    assert_eq!(counts(&m), vec![5, 9, 7, 2]);
    assert!(m.core().find_tuple_from_vertices(&[0, 1]).is_none());
    assert!(m.is_connectivity_valid());
}

#[test]
fn four_tets_swap_into_four() {
    let mut m = MeshVariant::from(meshgen::tet_ring(4).unwrap());
    assert_eq!(counts(&m), vec![6, 13, 12, 4]);
    let e = edge(&m, 0, 1);
    let out = EdgeSwap::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].primitive_type(), PrimitiveType::Edge);
    assert_eq!(counts(&m), vec![6, 13, 12, 4]);
    assert!(m.core().find_tuple_from_vertices(&[0, 1]).is_none());
    let diagonal = vertex_ids(&m, &out[0]).into_iter().sorted().collect_vec();
    assert!(diagonal == vec![2, 4] || diagonal == vec![3, 5], "{diagonal:?}");
    assert!(m.is_connectivity_valid());
}

#[test]
fn six_tet_ring_swaps_into_a_fan() {
    let mut m = MeshVariant::from(meshgen::six_tet_ring().unwrap());
    let e = edge(&m, 0, 1);
    let out = EdgeSwap::new().apply(&mut m, &e);
    assert_eq!(out.len(), 3);
    assert_eq!(counts(&m), vec![8, 21, 22, 8]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn boundary_edges_do_not_swap() {
    let mut m = MeshVariant::from(meshgen::two_tets().unwrap());
    let e = edge(&m, 1, 2);
    assert!(EdgeSwap::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![5, 9, 7, 2]);
}

#[test]
fn collapse_that_pinches_the_ring_is_rejected() {
    // both ends of the axis are on the boundary and share the whole ring
    let mut m = MeshVariant::from(meshgen::six_tet_ring().unwrap());
    let e = edge(&m, 0, 1);
    assert!(EdgeCollapse::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![8, 19, 18, 6]);
    assert!(m.is_connectivity_valid());
}

#[test]
fn interior_face_splits_both_tets() {
    let mut m = MeshVariant::from(meshgen::two_tets().unwrap());
    let f = Simplex::face(m.core().find_tuple_from_vertices(&[1, 2, 3]).unwrap());
    let out = FaceSplit::new().apply(&mut m, &f);
    assert_eq!(out.len(), 1);
    let n = m.simplex_id(&out[0]);
    assert_eq!(counts(&m), vec![6, 14, 15, 6]);
    for x in 0..5 {
        assert!(m.core().find_tuple_from_vertices(&[n, x]).is_some(), "no edge ({n}, {x})");
    }
    assert!(m.core().find_tuple_from_vertices(&[1, 2, 3]).is_none());
    assert!(m.is_connectivity_valid());
}

#[test]
fn boundary_face_split_keeps_orientation() {
    let (mesh, p) = meshgen::single_tet_with_positions().unwrap();
    let mut m = MeshVariant::from(mesh);
    let mut split = FaceSplit::new();
    split.add_invariant(SimplexInversionInvariant::new(p));
    let f = Simplex::face(m.core().find_tuple_from_vertices(&[0, 1, 2]).unwrap());
    let out = split.apply(&mut m, &f);
    assert_eq!(out.len(), 1);
    assert_eq!(counts(&m), vec![5, 10, 9, 3]);

    let positions = m.create_const_accessor(p);
    let center = positions.vector(out[0].tuple()).unwrap();
    assert_eq!(center, &[0.25, 0.5, 0.0]);
}

#[test]
fn grid_edges_split_everywhere() {
    let (mesh, p) = meshgen::tet_grid(1).unwrap();
    let mut m = MeshVariant::from(mesh);
    let mut split = EdgeSplit::new();
    split.add_invariant(SimplexInversionInvariant::new(p));
    let edges = m.get_all_simplices(PrimitiveType::Edge);
    let mut applied = 0;
    for e in &edges {
        // earlier splits make some of these tuples stale
        if m.is_valid(e.tuple()) && !split.apply(&mut m, e).is_empty() {
            applied += 1;
        }
    }
    assert!(applied > 0);
    assert_eq!(m.count(PrimitiveType::Vertex), 8 + applied);
    assert!(m.is_connectivity_valid());
}
