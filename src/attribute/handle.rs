//! Opaque attribute handles.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;

/// Typed reference to one attribute of a mesh.
///
/// Handles stay valid across topology edits; the storage behind them grows
/// with the mesh capacity.
#[derive(Debug)]
pub struct TypedAttributeHandle<T> {
    primitive: PrimitiveType,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedAttributeHandle<T> {
    pub(crate) const fn new(primitive: PrimitiveType, index: usize) -> Self {
        Self {
            primitive,
            index,
            _marker: PhantomData,
        }
    }

    pub const fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    pub(crate) const fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for TypedAttributeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedAttributeHandle<T> {}

impl<T> PartialEq for TypedAttributeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.primitive == other.primitive && self.index == other.index
    }
}

impl<T> Eq for TypedAttributeHandle<T> {}

impl<T> Hash for TypedAttributeHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primitive.hash(state);
        self.index.hash(state);
    }
}

/// Type-erased attribute handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeHandle {
    Char(TypedAttributeHandle<i8>),
    Long(TypedAttributeHandle<i64>),
    Double(TypedAttributeHandle<f64>),
}

impl AttributeHandle {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            AttributeHandle::Char(h) => h.primitive_type(),
            AttributeHandle::Long(h) => h.primitive_type(),
            AttributeHandle::Double(h) => h.primitive_type(),
        }
    }
}

/// An attribute handle together with the multi-mesh path of its owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshAttributeHandle {
    mesh: MeshId,
    handle: AttributeHandle,
}

impl MeshAttributeHandle {
    pub fn new(mesh: MeshId, handle: impl Into<AttributeHandle>) -> Self {
        Self {
            mesh,
            handle: handle.into(),
        }
    }

    pub fn mesh_id(&self) -> &MeshId {
        &self.mesh
    }

    pub fn handle(&self) -> AttributeHandle {
        self.handle
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.handle.primitive_type()
    }
}

impl From<TypedAttributeHandle<i8>> for AttributeHandle {
    fn from(h: TypedAttributeHandle<i8>) -> Self {
        AttributeHandle::Char(h)
    }
}

impl From<TypedAttributeHandle<i64>> for AttributeHandle {
    fn from(h: TypedAttributeHandle<i64>) -> Self {
        AttributeHandle::Long(h)
    }
}

impl From<TypedAttributeHandle<f64>> for AttributeHandle {
    fn from(h: TypedAttributeHandle<f64>) -> Self {
        AttributeHandle::Double(h)
    }
}
