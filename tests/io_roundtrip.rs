mod common;

use common::edge;
use wmtk::io::{AttributeValues, MemoryWriter};
use wmtk::mesh::{Mesh, MeshVariant};
use wmtk::meshgen;
use wmtk::multimesh::maps::{map_to_child_name, MAP_TO_PARENT_NAME, MAP_ARITY};
use wmtk::multimesh::{extract_child_mesh_from_tag, MeshId};
use wmtk::operations::{EdgeCollapse, Operation};
use wmtk::primitive::PrimitiveType;

fn dump(mesh: &MeshVariant) -> MemoryWriter {
    let mut writer = MemoryWriter::new();
    mesh.serialize(&mut writer);
    writer
}

#[test]
fn trees_are_dumped_parents_first() {
    let (mut mesh, _) = meshgen::hex_plus_two_with_positions().unwrap();
    let tag = mesh
        .register_attribute::<i64>("tag", PrimitiveType::Edge, 1, 0)
        .unwrap();
    for (a, b) in [(0, 1), (1, 2)] {
        let id = mesh.simplex_id(&edge(&mesh, a, b));
        mesh.create_accessor(tag).set_scalar_by_id(id, 1).unwrap();
    }
    let id = extract_child_mesh_from_tag(&mut mesh, tag, 1).unwrap();
    let m = MeshVariant::from(mesh);

    let w = dump(&m);
    assert_eq!(w.meshes.len(), 2);
    assert_eq!(w.meshes[0].id, MeshId::root());
    assert_eq!(w.meshes[1].id, id);
    assert_eq!(w.meshes[1].top, Some(PrimitiveType::Edge));
    assert_eq!(w.meshes[1].capacities, vec![3, 2]);

    let root = w.mesh(&MeshId::root()).unwrap();
    let to_child = root
        .attribute(&map_to_child_name(0), PrimitiveType::Edge)
        .unwrap();
    assert!(to_child.internal);
    assert_eq!(to_child.arity, MAP_ARITY);
    let tags = root.attribute("tag", PrimitiveType::Edge).unwrap();
    assert!(!tags.internal);
    let child = w.mesh(&id).unwrap();
    assert!(child.attribute(MAP_TO_PARENT_NAME, PrimitiveType::Edge).is_some());
}

#[test]
fn dumps_survive_json() {
    let (mesh, _) = meshgen::hex_plus_two_with_positions().unwrap();
    let mut m = MeshVariant::from(mesh);
    let e = edge(&m, 4, 5);
    EdgeCollapse::new().apply(&mut m, &e);

    let w = dump(&m);
    // deleted slots stay in the dump
    assert_eq!(w.meshes[0].capacities[0], 9);
    let positions = w.meshes[0]
        .attribute(meshgen::POSITION_ATTRIBUTE, PrimitiveType::Vertex)
        .unwrap();
    assert!(matches!(&positions.values, AttributeValues::Double(v) if v.len() == 18));

    let json = serde_json::to_string(&w).unwrap();
    let back: MemoryWriter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, w);
}
