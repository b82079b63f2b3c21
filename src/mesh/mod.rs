//! Simplicial meshes: connectivity storage, navigation and the [`Mesh`] trait.
//!
//! The four mesh families ([`PointMesh`], [`EdgeMesh`], [`TriMesh`],
//! [`TetMesh`]) share one storage layout, [`MeshCore`], and differ only in
//! their top dimension. Generic code is written against [`Mesh`]; code that
//! must hold any family (multi-mesh children, invariants) uses
//! [`MeshVariant`].

pub mod build;
pub mod core;
pub mod edge_mesh;
pub mod local;
pub mod point_mesh;
pub mod tet_mesh;
pub mod tri_mesh;
pub mod validity;
pub mod variant;

pub use self::core::{MeshCore, ScopeToken, VertexKey};
pub use edge_mesh::EdgeMesh;
pub use point_mesh::PointMesh;
pub use tet_mesh::TetMesh;
pub use tri_mesh::TriMesh;
pub use variant::MeshVariant;

use crate::attribute::{Accessor, AttributeRole, AttributeValue, ConstAccessor, TypedAttributeHandle};
use crate::io::MeshWriter;
use crate::mesh_error::MeshError;
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;
use crate::simplex::Simplex;
use crate::tuple::Tuple;

/// Capabilities shared by every mesh family.
///
/// Only [`core`](Mesh::core) and [`core_mut`](Mesh::core_mut) are required;
/// everything else forwards to the shared storage.
pub trait Mesh {
    fn core(&self) -> &MeshCore;
    fn core_mut(&mut self) -> &mut MeshCore;

    fn top_simplex_type(&self) -> PrimitiveType {
        self.core().top_simplex_type()
    }

    fn top_cell_dimension(&self) -> usize {
        self.core().top_dim()
    }

    /// Slots (live and deleted) for `pt`.
    fn capacity(&self, pt: PrimitiveType) -> usize {
        self.core().capacity(pt)
    }

    /// Live simplices of type `pt`.
    fn count(&self, pt: PrimitiveType) -> usize {
        self.core().count(pt)
    }

    /// Path of this mesh in its multi-mesh tree.
    fn mesh_id(&self) -> MeshId {
        self.core().multi_mesh().mesh_id()
    }

    fn is_multi_mesh_root(&self) -> bool {
        self.core().multi_mesh().is_root()
    }

    fn id(&self, t: &Tuple, pt: PrimitiveType) -> i64 {
        self.core().id(t, pt)
    }

    fn simplex_id(&self, s: &Simplex) -> i64 {
        self.core().simplex_id(s)
    }

    fn is_valid(&self, t: &Tuple) -> bool {
        self.core().is_valid(t)
    }

    fn is_ccw(&self, t: &Tuple) -> bool {
        self.core().is_ccw(t)
    }

    fn switch_tuple(&self, t: &Tuple, pt: PrimitiveType) -> Option<Tuple> {
        self.core().switch_tuple(t, pt)
    }

    fn switch_tuples(&self, t: &Tuple, sequence: &[PrimitiveType]) -> Option<Tuple> {
        self.core().switch_tuples(t, sequence)
    }

    fn switch_vertex(&self, t: &Tuple) -> Tuple {
        self.core().switch_vertex(t)
    }

    fn switch_edge(&self, t: &Tuple) -> Option<Tuple> {
        self.switch_tuple(t, PrimitiveType::Edge)
    }

    fn switch_face(&self, t: &Tuple) -> Option<Tuple> {
        self.switch_tuple(t, PrimitiveType::Face)
    }

    fn switch_tetrahedron(&self, t: &Tuple) -> Option<Tuple> {
        self.switch_tuple(t, PrimitiveType::Tetrahedron)
    }

    fn is_boundary(&self, s: &Simplex) -> bool {
        self.core().is_boundary(s)
    }

    fn tuple_from_id(&self, pt: PrimitiveType, id: i64) -> Result<Tuple, MeshError> {
        self.core().tuple_from_id(pt, id)
    }

    /// One tuple per live simplex of type `pt`, in id order.
    fn get_all(&self, pt: PrimitiveType) -> Vec<Tuple> {
        self.core().get_all(pt)
    }

    fn get_all_simplices(&self, pt: PrimitiveType) -> Vec<Simplex> {
        self.get_all(pt)
            .into_iter()
            .map(|t| Simplex::new(pt, t))
            .collect()
    }

    /// Whether two simplices name the same element of this mesh.
    fn simplices_equal(&self, a: &Simplex, b: &Simplex) -> bool {
        a.primitive_type() == b.primitive_type() && self.simplex_id(a) == self.simplex_id(b)
    }

    fn register_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
        pt: PrimitiveType,
        arity: usize,
        default_value: T,
    ) -> Result<TypedAttributeHandle<T>, MeshError>
    where
        Self: Sized,
    {
        self.core_mut()
            .attributes_mut()
            .register(name, pt, arity, default_value, AttributeRole::User)
    }

    fn get_attribute_handle<T: AttributeValue>(
        &self,
        name: &str,
        pt: PrimitiveType,
    ) -> Result<TypedAttributeHandle<T>, MeshError>
    where
        Self: Sized,
    {
        self.core()
            .attributes()
            .handle(name, pt)
            .ok_or_else(|| MeshError::AttributeNotFound(name.to_string()))
    }

    fn has_attribute<T: AttributeValue>(&self, name: &str, pt: PrimitiveType) -> bool
    where
        Self: Sized,
    {
        self.core().attributes().handle::<T>(name, pt).is_some()
    }

    fn create_const_accessor<T: AttributeValue>(
        &self,
        handle: TypedAttributeHandle<T>,
    ) -> ConstAccessor<'_, T>
    where
        Self: Sized,
    {
        ConstAccessor::new(self.core(), handle)
    }

    fn create_accessor<T: AttributeValue>(
        &mut self,
        handle: TypedAttributeHandle<T>,
    ) -> Accessor<'_, T>
    where
        Self: Sized,
    {
        Accessor::new(self.core_mut(), handle)
    }

    fn begin_scope(&mut self) -> ScopeToken {
        self.core_mut().begin_scope()
    }

    fn commit_scope(&mut self, token: ScopeToken) -> Result<(), MeshError> {
        self.core_mut().commit_scope(token)
    }

    fn rollback_scope(&mut self, token: ScopeToken) -> Result<(), MeshError> {
        self.core_mut().rollback_scope(token)
    }

    /// Run `f` inside a scope: commit on `Ok`, roll back on `Err`.
    fn with_scope<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, MeshError>,
    ) -> Result<R, MeshError>
    where
        Self: Sized,
    {
        let token = self.begin_scope();
        match f(self) {
            Ok(value) => {
                self.commit_scope(token)?;
                Ok(value)
            }
            Err(e) => {
                self.rollback_scope(token)?;
                Err(e)
            }
        }
    }

    fn validate_connectivity(&self) -> Result<(), MeshError> {
        validity::validate_connectivity(self.core())
    }

    fn is_connectivity_valid(&self) -> bool {
        validity::is_connectivity_valid(self.core())
    }

    /// Hand every attribute of every primitive to `writer`.
    fn serialize(&self, writer: &mut dyn MeshWriter) {
        crate::io::write_core(self.core(), writer);
    }
}

/// Implements [`Mesh`] for a newtype over
/// [`MeshCore`].
macro_rules! impl_mesh_family {
    ($name:ident) => {
        impl $crate::mesh::Mesh for $name {
            fn core(&self) -> &$crate::mesh::MeshCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut $crate::mesh::MeshCore {
                &mut self.core
            }
        }
    };
}

pub(crate) use impl_mesh_family;

/// Largest vertex id referenced by `cells`, plus one.
pub(crate) fn vertex_count_of<C: AsRef<[i64]>>(cells: &[C]) -> usize {
    cells
        .iter()
        .flat_map(|c| c.as_ref().iter().copied())
        .max()
        .map_or(0, |m| (m + 1).max(0) as usize)
}
