#![allow(dead_code)]

use wmtk::mesh::{Mesh, MeshVariant};
use wmtk::primitive::PrimitiveType;
use wmtk::simplex::Simplex;

/// The edge `(a, b)` seen from `a`.
pub fn edge<M: Mesh + ?Sized>(mesh: &M, a: i64, b: i64) -> Simplex {
    let t = mesh
        .core()
        .find_tuple_from_vertices(&[a, b])
        .unwrap_or_else(|| panic!("no edge ({a}, {b})"));
    Simplex::edge(t)
}

pub fn vertex<M: Mesh + ?Sized>(mesh: &M, v: i64) -> Simplex {
    Simplex::vertex(mesh.tuple_from_id(PrimitiveType::Vertex, v).unwrap())
}

/// Vertex ids of a result simplex.
pub fn vertex_ids<M: Mesh + ?Sized>(mesh: &M, s: &Simplex) -> Vec<i64> {
    mesh.core().simplex_vertices(s).to_vec()
}

pub fn counts<M: Mesh + ?Sized>(mesh: &M) -> Vec<usize> {
    mesh.top_simplex_type()
        .up_to()
        .map(|pt| mesh.count(pt))
        .collect()
}

pub fn assert_tree_valid(mesh: &MeshVariant) {
    assert!(mesh.is_connectivity_valid());
    mesh.check_map_valid().unwrap();
    for id in mesh.descendant_ids() {
        assert!(mesh.mesh(&id).unwrap().is_connectivity_valid(), "child {id}");
    }
}
