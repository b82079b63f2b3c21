mod common;

use common::{assert_tree_valid, counts, edge};
use wmtk::attribute::TypedAttributeHandle;
use wmtk::mesh::{Mesh, MeshVariant};
use wmtk::meshgen;
use wmtk::multimesh::{extract_child_mesh_from_tag, MeshId};
use wmtk::operations::{EdgeCollapse, EdgeSplit, FaceSplit, Operation};
use wmtk::primitive::PrimitiveType;
use wmtk::simplex::Simplex;
use wmtk::transfer::{SingleAttributeTransfer, TransferStrategy};

fn assert_lengths_current<M: Mesh>(
    m: &M,
    length: TypedAttributeHandle<f64>,
    p: TypedAttributeHandle<f64>,
) {
    let lengths = m.create_const_accessor(length);
    let positions = m.create_const_accessor(p);
    for t in m.get_all(PrimitiveType::Edge) {
        let ends = m.core().vertex_sequence(&t, 2);
        let (a, b) = (positions.vector_by_id(ends[0]), positions.vector_by_id(ends[1]));
        let expected = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt();
        let found = lengths.scalar(&t).unwrap();
        assert!((found - expected).abs() < 1e-12, "edge {ends:?}: {found} != {expected}");
    }
}

#[test]
fn edge_lengths_stay_current_through_edits() {
    let (mut mesh, p) = meshgen::hex_plus_two_with_positions().unwrap();
    let length = mesh
        .register_attribute::<f64>("length", PrimitiveType::Edge, 1, 0.0)
        .unwrap();
    let mut m = MeshVariant::from(mesh);
    let lengths = || SingleAttributeTransfer::edge_length(MeshId::root(), length, p);
    lengths().update_all(&mut m).unwrap();
    assert_lengths_current(&m, length, p);

    let mut face_split = FaceSplit::new();
    face_split.add_transfer(lengths());
    let f = Simplex::face(m.core().find_tuple_from_vertices(&[3, 7, 4]).unwrap());
    assert_eq!(face_split.apply(&mut m, &f).len(), 1);
    assert_lengths_current(&m, length, p);

    let mut split = EdgeSplit::new();
    split.add_transfer(lengths());
    let e = edge(&m, 1, 5);
    assert_eq!(split.apply(&mut m, &e).len(), 1);
    assert_lengths_current(&m, length, p);

    let mut collapse = EdgeCollapse::new();
    collapse.add_transfer(lengths());
    let e = edge(&m, 4, 5);
    assert_eq!(collapse.apply(&mut m, &e).len(), 1);
    assert_lengths_current(&m, length, p);
}

#[test]
fn child_attributes_are_recomputed_in_the_child() {
    let mut mesh = meshgen::hex_plus_two().unwrap();
    let tag = mesh
        .register_attribute::<i64>("tag", PrimitiveType::Edge, 1, 0)
        .unwrap();
    for (a, b) in [(0, 1), (1, 2), (2, 6), (6, 5), (5, 8), (8, 7), (7, 3), (3, 0)] {
        let id = mesh.simplex_id(&edge(&mesh, a, b));
        mesh.create_accessor(tag).set_scalar_by_id(id, 1).unwrap();
    }
    let id = extract_child_mesh_from_tag(&mut mesh, tag, 1).unwrap();
    let mut m = MeshVariant::from(mesh);

    let (weight, total) = {
        let child = m.mesh_mut(&id).unwrap();
        let weight = child
            .register_attribute::<f64>("weight", PrimitiveType::Vertex, 1, 0.0)
            .unwrap();
        let total = child
            .register_attribute::<f64>("total", PrimitiveType::Edge, 1, 0.0)
            .unwrap();
        for v in child.get_all(PrimitiveType::Vertex) {
            let w = child.id(&v, PrimitiveType::Vertex) as f64;
            child.create_accessor(weight).set_scalar(&v, w).unwrap();
        }
        (weight, total)
    };
    let sum = || {
        SingleAttributeTransfer::new(id.clone(), total, weight, |ends: &[&[f64]]| {
            vec![ends.iter().map(|w| w[0]).sum()]
        })
    };
    sum().update_all(&mut m).unwrap();

    let mut split = EdgeSplit::new();
    split.add_transfer(sum());
    let e = edge(&m, 5, 6);
    assert_eq!(split.apply(&mut m, &e).len(), 1);
    assert_tree_valid(&m);

    let child = m.mesh(&id).unwrap();
    let weights = child.create_const_accessor(weight);
    let totals = child.create_const_accessor(total);
    for t in child.get_all(PrimitiveType::Edge) {
        let ends = child.core().vertex_sequence(&t, 2);
        let expected = weights.scalar_by_id(ends[0]) + weights.scalar_by_id(ends[1]);
        assert_eq!(totals.scalar(&t).unwrap(), expected, "child edge {ends:?}");
    }
}

#[test]
fn failing_transfers_roll_the_edit_back() {
    let (mut mesh, p) = meshgen::hex_plus_two_with_positions().unwrap();
    let length = mesh
        .register_attribute::<f64>("length", PrimitiveType::Edge, 1, 0.0)
        .unwrap();
    let mut m = MeshVariant::from(mesh);
    let before = counts(&m);

    let mut split = EdgeSplit::new();
    // one value too many for a scalar attribute
    split.add_transfer(SingleAttributeTransfer::new(
        MeshId::root(),
        length,
        p,
        |_: &[&[f64]]| vec![0.0, 0.0],
    ));
    let e = edge(&m, 4, 5);
    assert!(split.apply(&mut m, &e).is_empty());
    assert_eq!(counts(&m), before);
    assert!(m.is_valid(e.tuple()));
    assert_tree_valid(&m);
}
