//! Attribute dumps through a visitor.
//!
//! A mesh hands its top simplex type, per-primitive capacities and every
//! attribute (internal tables included) to a [`MeshWriter`]. File formats
//! are left to writer implementations; [`MemoryWriter`] keeps everything in
//! memory and is `serde`-serializable.

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeRole, AttributeValue, AttributeVisitor};
use crate::mesh::{Mesh, MeshCore};
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;

/// Values of one attribute, borrowed from the mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeData<'a> {
    Char(&'a [i8]),
    Long(&'a [i64]),
    Double(&'a [f64]),
}

/// Everything a writer learns about one attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRecord<'a> {
    pub name: &'a str,
    pub primitive: PrimitiveType,
    pub arity: usize,
    pub internal: bool,
    pub data: AttributeData<'a>,
}

/// Sink for [`Mesh::serialize`](crate::mesh::Mesh::serialize).
pub trait MeshWriter {
    /// Called once before anything else.
    fn write_header(&mut self, id: &MeshId, top: PrimitiveType, capacities: &[usize]);
    fn write_attribute(&mut self, attribute: AttributeRecord<'_>);
    /// Called once per child, after all attributes of the parent.
    fn write_child(&mut self, index: usize, child: &MeshCore) {
        let _ = index;
        write_core(child, self);
    }
}

struct Forward<'w, W: ?Sized> {
    writer: &'w mut W,
    primitive: PrimitiveType,
}

impl<W: MeshWriter + ?Sized> Forward<'_, W> {
    fn forward<T: AttributeValue>(&mut self, a: &Attribute<T>, data: AttributeData<'_>) {
        self.writer.write_attribute(AttributeRecord {
            name: a.name(),
            primitive: self.primitive,
            arity: a.dimension(),
            internal: a.role() != AttributeRole::User,
            data,
        });
    }
}

impl<W: MeshWriter + ?Sized> AttributeVisitor for Forward<'_, W> {
    fn visit_char(&mut self, attribute: &Attribute<i8>) {
        self.forward(attribute, AttributeData::Char(attribute.as_slice()));
    }

    fn visit_long(&mut self, attribute: &Attribute<i64>) {
        self.forward(attribute, AttributeData::Long(attribute.as_slice()));
    }

    fn visit_double(&mut self, attribute: &Attribute<f64>) {
        self.forward(attribute, AttributeData::Double(attribute.as_slice()));
    }
}

/// Hand the contents of `core`, then of its children, to `writer`.
pub(crate) fn write_core<W: MeshWriter + ?Sized>(core: &MeshCore, writer: &mut W) {
    let top = core.top_simplex_type();
    let capacities: Vec<usize> = top.up_to().map(|pt| core.capacity(pt)).collect();
    writer.write_header(&core.multi_mesh().mesh_id(), top, &capacities);
    for primitive in top.up_to() {
        let mut forward = Forward {
            writer: &mut *writer,
            primitive,
        };
        core.attributes().visit(primitive, &mut forward);
    }
    for (index, child) in core.multi_mesh().children().iter().enumerate() {
        writer.write_child(index, child.mesh().core());
    }
}

/// Owned copy of one attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValues {
    Char(Vec<i8>),
    Long(Vec<i64>),
    Double(Vec<f64>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredAttribute {
    pub name: String,
    pub primitive: PrimitiveType,
    pub arity: usize,
    pub internal: bool,
    pub values: AttributeValues,
}

/// One mesh of a dump.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredMesh {
    pub id: MeshId,
    pub top: Option<PrimitiveType>,
    pub capacities: Vec<usize>,
    pub attributes: Vec<StoredAttribute>,
}

impl StoredMesh {
    pub fn attribute(&self, name: &str, primitive: PrimitiveType) -> Option<&StoredAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.primitive == primitive)
    }
}

/// Writer collecting every mesh of a tree, parents before children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryWriter {
    pub meshes: Vec<StoredMesh>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, id: &MeshId) -> Option<&StoredMesh> {
        self.meshes.iter().find(|m| &m.id == id)
    }
}

impl MeshWriter for MemoryWriter {
    fn write_header(&mut self, id: &MeshId, top: PrimitiveType, capacities: &[usize]) {
        self.meshes.push(StoredMesh {
            id: id.clone(),
            top: Some(top),
            capacities: capacities.to_vec(),
            attributes: Vec::new(),
        });
    }

    fn write_attribute(&mut self, attribute: AttributeRecord<'_>) {
        let values = match attribute.data {
            AttributeData::Char(v) => AttributeValues::Char(v.to_vec()),
            AttributeData::Long(v) => AttributeValues::Long(v.to_vec()),
            AttributeData::Double(v) => AttributeValues::Double(v.to_vec()),
        };
        if let Some(mesh) = self.meshes.last_mut() {
            mesh.attributes.push(StoredAttribute {
                name: attribute.name.to_string(),
                primitive: attribute.primitive,
                arity: attribute.arity,
                internal: attribute.internal,
                values,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;

    #[test]
    fn memory_writer_sees_connectivity_and_user_data() {
        let mut m = TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]]).unwrap();
        m.register_attribute::<f64>("vertices", PrimitiveType::Vertex, 2, 0.5)
            .unwrap();
        let mut w = MemoryWriter::new();
        m.serialize(&mut w);
        assert_eq!(w.meshes.len(), 1);
        let mesh = &w.meshes[0];
        assert_eq!(mesh.top, Some(PrimitiveType::Face));
        assert_eq!(mesh.capacities, vec![4, 5, 2]);

        let fv = mesh.attribute("fv", PrimitiveType::Face).unwrap();
        assert!(fv.internal);
        assert_eq!(fv.values, AttributeValues::Long(vec![0, 1, 2, 3, 1, 0]));

        let p = mesh.attribute("vertices", PrimitiveType::Vertex).unwrap();
        assert!(!p.internal);
        assert_eq!(p.arity, 2);
        assert_eq!(p.values, AttributeValues::Double(vec![0.5; 8]));
    }
}
