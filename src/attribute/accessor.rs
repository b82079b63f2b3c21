//! Borrowing views that read and write attribute values through tuples.
//!
//! Tuple-taking methods check the tuple against the mesh first, so a tuple
//! that outlived an edit yields [`MeshError::StaleTuple`] instead of reaching
//! whatever simplex now occupies its old id.

use crate::mesh::MeshCore;
use crate::mesh_error::MeshError;
use crate::simplex::Simplex;
use crate::tuple::Tuple;

use super::attribute::Attribute;
use super::handle::TypedAttributeHandle;
use super::value::AttributeValue;

fn index_of<T: AttributeValue>(
    core: &MeshCore,
    handle: TypedAttributeHandle<T>,
    t: &Tuple,
) -> Result<usize, MeshError> {
    core.validate_tuple(t)?;
    Ok(core.id(t, handle.primitive_type()) as usize)
}

/// Read-only access to one attribute.
pub struct ConstAccessor<'a, T: AttributeValue> {
    core: &'a MeshCore,
    handle: TypedAttributeHandle<T>,
}

impl<'a, T: AttributeValue> ConstAccessor<'a, T> {
    pub fn new(core: &'a MeshCore, handle: TypedAttributeHandle<T>) -> Self {
        Self { core, handle }
    }

    pub fn attribute(&self) -> &'a Attribute<T> {
        self.core.attributes().get(self.handle)
    }

    pub fn dimension(&self) -> usize {
        self.attribute().dimension()
    }

    fn index(&self, t: &Tuple) -> Result<usize, MeshError> {
        index_of(self.core, self.handle, t)
    }

    /// Values of the simplex of the handle's primitive type containing `t`.
    pub fn vector(&self, t: &Tuple) -> Result<&'a [T], MeshError> {
        Ok(self.attribute().vector(self.index(t)?))
    }

    pub fn scalar(&self, t: &Tuple) -> Result<T, MeshError> {
        Ok(self.attribute().scalar(self.index(t)?))
    }

    pub fn simplex_vector(&self, s: &Simplex) -> Result<&'a [T], MeshError> {
        debug_assert_eq!(s.primitive_type(), self.handle.primitive_type());
        self.vector(s.tuple())
    }

    pub fn vector_by_id(&self, id: i64) -> &'a [T] {
        self.attribute().vector(id as usize)
    }

    pub fn scalar_by_id(&self, id: i64) -> T {
        self.attribute().scalar(id as usize)
    }
}

/// Read-write access to one attribute.
///
/// Writes are journaled by any open scope.
pub struct Accessor<'a, T: AttributeValue> {
    core: &'a mut MeshCore,
    handle: TypedAttributeHandle<T>,
}

impl<'a, T: AttributeValue> Accessor<'a, T> {
    pub fn new(core: &'a mut MeshCore, handle: TypedAttributeHandle<T>) -> Self {
        Self { core, handle }
    }

    pub fn as_const(&self) -> ConstAccessor<'_, T> {
        ConstAccessor::new(self.core, self.handle)
    }

    pub fn dimension(&self) -> usize {
        self.core.attributes().get(self.handle).dimension()
    }

    fn index(&self, t: &Tuple) -> Result<usize, MeshError> {
        index_of(self.core, self.handle, t)
    }

    pub fn vector(&self, t: &Tuple) -> Result<&[T], MeshError> {
        let index = self.index(t)?;
        Ok(self.core.attributes().get(self.handle).vector(index))
    }

    pub fn scalar(&self, t: &Tuple) -> Result<T, MeshError> {
        let index = self.index(t)?;
        Ok(self.core.attributes().get(self.handle).scalar(index))
    }

    pub fn vector_by_id(&self, id: i64) -> &[T] {
        self.core.attributes().get(self.handle).vector(id as usize)
    }

    pub fn scalar_by_id(&self, id: i64) -> T {
        self.core.attributes().get(self.handle).scalar(id as usize)
    }

    /// Overwrite all values of the simplex containing `t`.
    pub fn set_vector(&mut self, t: &Tuple, values: &[T]) -> Result<(), MeshError> {
        let index = self.index(t)? as i64;
        self.set_vector_by_id(index, values)
    }

    pub fn set_scalar(&mut self, t: &Tuple, value: T) -> Result<(), MeshError> {
        self.set_vector(t, &[value])
    }

    pub fn set_vector_by_id(&mut self, id: i64, values: &[T]) -> Result<(), MeshError> {
        let attribute = self.core.attributes_mut().get_mut(self.handle);
        if values.len() != attribute.dimension() {
            return Err(MeshError::AttributeDimensionMismatch {
                name: attribute.name().to_string(),
                expected: attribute.dimension(),
                found: values.len(),
            });
        }
        if id < 0 || id as usize >= attribute.len() {
            return Err(MeshError::InactiveSimplex {
                primitive: self.handle.primitive_type(),
                id,
            });
        }
        attribute.set_vector(id as usize, values);
        Ok(())
    }

    pub fn set_scalar_by_id(&mut self, id: i64, value: T) -> Result<(), MeshError> {
        self.set_vector_by_id(id, &[value])
    }
}
