mod common;

use common::{assert_tree_valid, counts, edge, vertex_ids};
use itertools::Itertools;
use wmtk::mesh::{Mesh, MeshVariant, TriMesh};
use wmtk::mesh_error::MeshError;
use wmtk::meshgen;
use wmtk::multimesh::{extract_child_mesh_from_tag, same_simplex_dimension_surjection, MeshId};
use wmtk::operations::{EdgeCollapse, EdgeSplit, Operation};
use wmtk::primitive::PrimitiveType;
use wmtk::simplex::Simplex;

/// Tag the edges `(a, b)` with 1 and hang them below `mesh` as an edge mesh.
fn edge_child(mut mesh: TriMesh, edges: &[(i64, i64)]) -> (MeshVariant, MeshId) {
    let tag = mesh
        .register_attribute::<i64>("tag", PrimitiveType::Edge, 1, 0)
        .unwrap();
    for &(a, b) in edges {
        let id = mesh.simplex_id(&edge(&mesh, a, b));
        mesh.create_accessor(tag).set_scalar_by_id(id, 1).unwrap();
    }
    let id = extract_child_mesh_from_tag(&mut mesh, tag, 1).unwrap();
    (MeshVariant::from(mesh), id)
}

/// The boundary loop 0-1-2-6-5-8-7-3 of the hexagon fixture as a child.
fn hex_with_boundary_child() -> (MeshVariant, MeshId) {
    edge_child(
        meshgen::hex_plus_two().unwrap(),
        &[(0, 1), (1, 2), (2, 6), (6, 5), (5, 8), (8, 7), (7, 3), (3, 0)],
    )
}

fn child_counts(root: &MeshVariant, id: &MeshId) -> Vec<usize> {
    counts(root.mesh(id).unwrap())
}

#[test]
fn boundary_child_follows_splits() {
    let (mut m, id) = hex_with_boundary_child();
    assert_eq!(child_counts(&m, &id), vec![8, 8]);

    let e = edge(&m, 5, 6);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![10, 18, 9]);
    assert_eq!(child_counts(&m, &id), vec![9, 9]);
    assert_tree_valid(&m);

    // interior edges have no image in the child
    let e = edge(&m, 4, 5);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(child_counts(&m, &id), vec![9, 9]);
    assert_tree_valid(&m);
}

#[test]
fn boundary_child_follows_collapses() {
    let (mut m, id) = hex_with_boundary_child();
    let e = edge(&m, 0, 1);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![8, 14, 7]);
    assert_eq!(child_counts(&m, &id), vec![7, 7]);
    assert_tree_valid(&m);

    // 4 is interior: the child keeps its loop
    let e = edge(&m, 4, 5);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(child_counts(&m, &id), vec![7, 7]);
    assert_tree_valid(&m);
}

#[test]
fn child_link_condition_blocks_the_root() {
    // the child is the triangle loop around face (4, 5, 1)
    let (mut m, id) = edge_child(meshgen::hex_plus_two().unwrap(), &[(4, 5), (5, 1), (1, 4)]);
    let e = edge(&m, 4, 5);
    assert!(EdgeCollapse::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![9, 16, 8]);
    assert_eq!(child_counts(&m, &id), vec![3, 3]);
    assert!(m.is_valid(e.tuple()));
    assert_tree_valid(&m);
}

#[test]
fn maps_round_trip() {
    let (m, id) = hex_with_boundary_child();
    let child = m.mesh(&id).unwrap();
    for s in child.get_all_simplices(PrimitiveType::Edge) {
        let up = m.map_to_root_tuple(&id, s.tuple()).unwrap();
        assert!(m.is_boundary(&Simplex::edge(up)));
        let down = m.map_from_root(&id, &Simplex::edge(up)).unwrap();
        assert_eq!(down.len(), 1);
        assert!(child.simplices_equal(&Simplex::edge(down[0]), &s));
    }
    // an interior edge has no image
    let interior = edge(&m, 4, 5);
    assert!(m.map_from_root(&id, &interior).unwrap().is_empty());
}

#[test]
fn operations_target_a_child() {
    let (mut m, id) = hex_with_boundary_child();
    let target = m.mesh(&id).unwrap().get_all_simplices(PrimitiveType::Edge)[0];
    let out = EdgeSplit::on(id.clone()).apply(&mut m, &target);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].primitive_type(), PrimitiveType::Vertex);
    let child = m.mesh(&id).unwrap();
    assert!(child.is_valid(out[0].tuple()));
    assert_eq!(child_counts(&m, &id), vec![9, 9]);
    assert_eq!(m.count(PrimitiveType::Vertex), 10);
    assert_tree_valid(&m);

    // operations are always applied through the root
    let e = m.mesh(&id).unwrap().get_all_simplices(PrimitiveType::Edge)[0];
    let child = m.mesh_mut(&id).unwrap();
    assert!(EdgeSplit::on(id.clone()).apply(child, &e).is_empty());
    assert_eq!(child_counts(&m, &id), vec![9, 9]);
}

#[test]
fn point_children_merge_on_collapse() {
    let mut mesh = meshgen::hex_plus_two().unwrap();
    let tag = mesh
        .register_attribute::<i64>("tag", PrimitiveType::Vertex, 1, 0)
        .unwrap();
    mesh.create_accessor(tag).set_scalar_by_id(0, 1).unwrap();
    mesh.create_accessor(tag).set_scalar_by_id(1, 1).unwrap();
    let id = extract_child_mesh_from_tag(&mut mesh, tag, 1).unwrap();
    let mut m = MeshVariant::from(mesh);
    assert_eq!(m.mesh(&id).unwrap().count(PrimitiveType::Vertex), 2);

    let e = edge(&m, 0, 1);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(m.mesh(&id).unwrap().count(PrimitiveType::Vertex), 1);
    assert_tree_valid(&m);
}

#[test]
fn surjective_child_mirrors_every_edit() {
    let mut mesh = meshgen::one_ear().unwrap();
    let copy = meshgen::one_ear().unwrap();
    let id = same_simplex_dimension_surjection(&mut mesh, copy, &[0, 1]).unwrap();
    let mut m = MeshVariant::from(mesh);

    let e = edge(&m, 0, 1);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(child_counts(&m, &id), counts(&m));
    assert_tree_valid(&m);
}

#[test]
fn grandchildren_follow_through_their_parent() {
    let (mut m, id) = hex_with_boundary_child();
    {
        let child = m.mesh_mut(&id).unwrap();
        let tag = child
            .register_attribute::<i64>("corner", PrimitiveType::Vertex, 1, 0)
            .unwrap();
        for v in child.get_all(PrimitiveType::Vertex) {
            child.create_accessor(tag).set_scalar(&v, 1).unwrap();
        }
        let grandchild = extract_child_mesh_from_tag(child, tag, 1).unwrap();
        assert_eq!(grandchild, id.child(0));
    }
    assert_eq!(m.descendant_ids(), vec![id.clone(), id.child(0)]);
    assert_eq!(m.mesh(&id.child(0)).unwrap().count(PrimitiveType::Vertex), 8);

    let e = edge(&m, 0, 1);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(m.mesh(&id.child(0)).unwrap().count(PrimitiveType::Vertex), 7);
    assert_tree_valid(&m);
}

#[test]
fn registration_needs_closed_scopes() {
    let mut m = meshgen::one_ear().unwrap();
    let token = m.begin_scope();
    let copy = meshgen::one_ear().unwrap();
    assert!(matches!(
        same_simplex_dimension_surjection(&mut m, copy, &[0, 1]),
        Err(MeshError::ScopeMismatch { .. })
    ));
    m.rollback_scope(token).unwrap();
    assert!(m.core().multi_mesh().children().is_empty());
}

/// [`meshgen::two_neighbors`] with its cut-open copy as a child: child
/// vertices 5 and 6 sit over root vertices 1 and 0.
fn cut_child() -> (MeshVariant, MeshId) {
    let mut mesh = meshgen::two_neighbors().unwrap();
    let child = meshgen::two_neighbors_cut_on_edge01().unwrap();
    let id = same_simplex_dimension_surjection(&mut mesh, child, &[0, 1, 2]).unwrap();
    (MeshVariant::from(mesh), id)
}

#[test]
fn cut_edges_map_to_both_copies() {
    let (m, id) = cut_child();
    assert_eq!(child_counts(&m, &id), vec![7, 8, 3]);
    assert_tree_valid(&m);

    let child = m.mesh(&id).unwrap();
    let copies: Vec<Vec<i64>> = m
        .map_from_root(&id, &edge(&m, 0, 1))
        .unwrap()
        .into_iter()
        .map(|t| vertex_ids(child, &Simplex::edge(t)).into_iter().sorted().collect::<Vec<i64>>())
        .sorted()
        .collect();
    assert_eq!(copies, vec![vec![0, 1], vec![5, 6]]);
}

#[test]
fn cut_child_splits_both_copies() {
    let (mut m, id) = cut_child();
    let e = edge(&m, 0, 1);
    assert_eq!(EdgeSplit::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![6, 10, 5]);
    // each copy of the cut edge is on the child boundary
    assert_eq!(child_counts(&m, &id), vec![9, 12, 5]);
    assert_tree_valid(&m);
}

#[test]
fn cut_child_follows_collapses_beside_the_cut() {
    let (mut m, id) = cut_child();
    let e = edge(&m, 1, 2);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![4, 5, 2]);
    // child vertices 2 and 5 now both sit over root vertex 2
    assert_eq!(child_counts(&m, &id), vec![6, 6, 2]);
    assert_tree_valid(&m);
}

#[test]
fn collapse_that_stacks_child_edges_is_rejected() {
    // both child edges would land on root edge (1, 4)
    let (mut m, id) = edge_child(meshgen::hex_plus_two().unwrap(), &[(0, 4), (1, 4)]);
    let e = edge(&m, 0, 1);
    assert!(EdgeCollapse::new().apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), vec![9, 16, 8]);
    assert_eq!(child_counts(&m, &id), vec![3, 2]);
    assert!(m.is_valid(e.tuple()));
    assert_tree_valid(&m);
}

#[test]
fn collapse_may_pinch_a_child() {
    let (mut m, id) = edge_child(meshgen::hex_plus_two().unwrap(), &[(0, 3), (1, 2)]);
    let e = edge(&m, 0, 1);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &e).len(), 1);
    assert_eq!(counts(&m), vec![8, 14, 7]);
    assert_eq!(child_counts(&m, &id), vec![4, 2]);
    assert_tree_valid(&m);
}

/// Unit cube of six tets with its boundary surface as a triangle child.
fn cube_with_surface() -> (MeshVariant, MeshId) {
    let (mut mesh, _) = meshgen::tet_grid(1).unwrap();
    let tag = mesh
        .register_attribute::<i64>("surface", PrimitiveType::Face, 1, 0)
        .unwrap();
    for s in mesh.get_all_simplices(PrimitiveType::Face) {
        if mesh.is_boundary(&s) {
            let id = mesh.simplex_id(&s);
            mesh.create_accessor(tag).set_scalar_by_id(id, 1).unwrap();
        }
    }
    let id = extract_child_mesh_from_tag(&mut mesh, tag, 1).unwrap();
    (MeshVariant::from(mesh), id)
}

fn boundary_faces(m: &MeshVariant) -> usize {
    m.get_all_simplices(PrimitiveType::Face)
        .into_iter()
        .filter(|s| m.is_boundary(s))
        .count()
}

#[test]
fn surface_child_follows_tet_edits() {
    let (mut m, id) = cube_with_surface();
    assert_eq!(child_counts(&m, &id), vec![8, 18, 12]);
    assert_eq!(boundary_faces(&m), 12);

    let e = edge(&m, 0, 1);
    let out = EdgeSplit::new().apply(&mut m, &e);
    assert_eq!(out.len(), 1);
    assert_eq!(child_counts(&m, &id), vec![9, 21, 14]);
    assert_eq!(boundary_faces(&m), 14);
    assert_tree_valid(&m);

    let mid = m.simplex_id(&out[0]);
    let spoke = edge(&m, mid, 0);
    assert_eq!(EdgeCollapse::new().apply(&mut m, &spoke).len(), 1);
    assert_eq!(child_counts(&m, &id), vec![8, 18, 12]);
    assert_eq!(boundary_faces(&m), 12);
    assert_tree_valid(&m);
}
