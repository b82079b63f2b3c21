mod common;

use wmtk::mesh::{Mesh, TetMesh, TriMesh};
use wmtk::mesh_error::MeshError;
use wmtk::meshgen;
use wmtk::primitive::PrimitiveType;
use wmtk::simplex::Simplex;
use wmtk::tuple::Tuple;

/// Every tuple of every live cell.
fn all_tuples<M: Mesh>(mesh: &M) -> Vec<Tuple> {
    let top = mesh.top_simplex_type();
    let mut out = Vec::new();
    for cell in mesh.get_all(top) {
        let mut frontier = vec![cell];
        while let Some(t) = frontier.pop() {
            if out.iter().any(|u: &Tuple| u == &t) {
                continue;
            }
            out.push(t);
            for pt in top.up_to().filter(|&pt| pt != top) {
                if let Some(s) = mesh.switch_tuple(&t, pt) {
                    frontier.push(s);
                }
            }
        }
    }
    out
}

fn assert_double_switch<M: Mesh>(mesh: &M) {
    for t in all_tuples(mesh) {
        for pt in mesh.top_simplex_type().up_to() {
            if let Some(s) = mesh.switch_tuple(&t, pt) {
                assert_eq!(mesh.switch_tuple(&s, pt), Some(t), "{pt} switch of {t}");
            }
        }
    }
}

#[test]
fn tri_tuples_enumerate_every_flag() {
    let m = meshgen::hex_plus_two().unwrap();
    // 3! tuples per triangle
    assert_eq!(all_tuples(&m).len(), 6 * m.count(PrimitiveType::Face));
}

#[test]
fn double_switch_is_identity_tri() {
    assert_double_switch(&meshgen::hex_plus_two().unwrap());
    assert_double_switch(&meshgen::edge_region().unwrap());
}

#[test]
fn double_switch_is_identity_tet() {
    assert_double_switch(&meshgen::two_tets().unwrap());
    assert_double_switch(&meshgen::six_tet_ring().unwrap());
}

#[test]
fn double_switch_is_identity_edge() {
    assert_double_switch(&meshgen::loop_lines().unwrap());
    assert_double_switch(&meshgen::multiple_lines(4).unwrap());
}

#[test]
fn switching_off_the_boundary_fails() {
    let m = TriMesh::from_faces(&[[0, 1, 2]]).unwrap();
    let t = m.tuple_from_id(PrimitiveType::Face, 0).unwrap();
    assert!(m.switch_face(&t).is_none());
    assert!(m.is_boundary(&Simplex::edge(t)));

    let tet = TetMesh::from_tets(&[[0, 1, 2, 3]]).unwrap();
    let t = tet.tuple_from_id(PrimitiveType::Tetrahedron, 0).unwrap();
    assert!(tet.switch_tetrahedron(&t).is_none());
}

#[test]
fn switch_vertex_flips_the_edge_ends() {
    let m = meshgen::quad().unwrap();
    let e = common::edge(&m, 1, 2);
    let flipped = m.switch_vertex(e.tuple());
    assert_eq!(common::vertex_ids(&m, &Simplex::edge(flipped)), vec![2, 1]);
    assert!(m.simplices_equal(&e, &Simplex::edge(flipped)));
    assert_ne!(e.tuple(), &flipped);
}

#[test]
fn orientation_alternates_under_switches() {
    let m = meshgen::one_ear().unwrap();
    for t in all_tuples(&m) {
        for pt in [PrimitiveType::Vertex, PrimitiveType::Edge] {
            let s = m.switch_tuple(&t, pt).unwrap();
            assert_ne!(m.is_ccw(&t), m.is_ccw(&s));
        }
    }
}

#[test]
fn stale_tuples_are_rejected() {
    let mut m = meshgen::one_ear().unwrap();
    let stale = common::edge(&m, 0, 1);
    let face = m.tuple_from_id(PrimitiveType::Face, 0).unwrap();
    let t = *common::edge(&m, 1, 2).tuple();
    wmtk::executor::edit_edge(m.core_mut(), &t, wmtk::executor::EdgeEdit::Split).unwrap();
    assert!(!m.is_valid(stale.tuple()));
    assert!(!m.is_valid(&face));
    assert!(matches!(
        m.core().validate_tuple(stale.tuple()),
        Err(MeshError::StaleTuple { .. }) | Err(MeshError::InactiveCell(_))
    ));
}

#[test]
fn stale_tuples_neither_navigate_nor_write() {
    let mut m = meshgen::single_triangle().unwrap();
    let weight = m
        .register_attribute::<f64>("weight", PrimitiveType::Vertex, 1, 0.0)
        .unwrap();
    let stale = m.tuple_from_id(PrimitiveType::Vertex, 1).unwrap();
    // the second split hands out ids freed by the first
    for (a, b) in [(0, 1), (1, 2)] {
        let t = *common::edge(&m, a, b).tuple();
        wmtk::executor::edit_edge(m.core_mut(), &t, wmtk::executor::EdgeEdit::Split).unwrap();
    }
    assert!(!m.is_valid(&stale));
    assert!(!m.is_valid(&m.switch_vertex(&stale)));
    assert!(m.switch_edge(&stale).is_none());
    assert!(m.switch_tuples(&stale, &[PrimitiveType::Vertex]).is_none());

    assert!(m.create_const_accessor(weight).scalar(&stale).is_err());
    assert!(matches!(
        m.create_accessor(weight).set_scalar(&stale, 42.0),
        Err(MeshError::StaleTuple { .. }) | Err(MeshError::InactiveCell(_))
    ));
    let weights = m.create_const_accessor(weight);
    for v in m.get_all(PrimitiveType::Vertex) {
        assert_eq!(weights.scalar(&v).unwrap(), 0.0);
    }
}

#[test]
fn null_tuples_have_no_ids() {
    let m = meshgen::single_triangle().unwrap();
    for pt in PrimitiveType::Face.up_to() {
        assert_eq!(m.id(&Tuple::null(), pt), -1);
    }
    assert!(m.switch_edge(&Tuple::null()).is_none());
    assert!(m.core().vertex_sequence(&Tuple::null(), 3).is_empty());
}

#[test]
fn untouched_cells_keep_their_tuples() {
    let mut m = meshgen::two_neighbors().unwrap();
    // face 2 = (0, 2, 4) does not contain edge (0, 1)
    let far = m.tuple_from_id(PrimitiveType::Face, 2).unwrap();
    let t = *common::edge(&m, 0, 1).tuple();
    wmtk::executor::edit_edge(m.core_mut(), &t, wmtk::executor::EdgeEdit::Split).unwrap();
    assert!(m.is_valid(&far));
}
