//! Per-mesh attribute registry, capacity bookkeeping and free lists.
//!
//! Every attribute registered on primitive `d` always holds exactly
//! `capacity(d)` slots. Slots of deleted simplices stay in place (their flag is
//! cleared) and are handed out again by [`AttributeManager::allocate`] before
//! the arrays grow. Scopes journal attribute writes, capacities and free-list
//! traffic so that a rollback restores all three exactly.

use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

use super::attribute::{Attribute, AttributeRole, Journaled};
use super::handle::TypedAttributeHandle;
use super::value::AttributeValue;

/// All attributes of one primitive, grouped by value type.
#[derive(Clone, Debug, Default)]
pub struct TypedAttributes {
    pub(crate) chars: Vec<Attribute<i8>>,
    pub(crate) longs: Vec<Attribute<i64>>,
    pub(crate) doubles: Vec<Attribute<f64>>,
}

impl TypedAttributes {
    fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn Journaled)) {
        self.chars.iter_mut().for_each(|a| f(a));
        self.longs.iter_mut().for_each(|a| f(a));
        self.doubles.iter_mut().for_each(|a| f(a));
    }

    fn for_each(&self, mut f: impl FnMut(&dyn Journaled)) {
        self.chars.iter().for_each(|a| f(a));
        self.longs.iter().for_each(|a| f(a));
        self.doubles.iter().for_each(|a| f(a));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FreeListOp {
    Popped { dim: usize, id: i64 },
    Pushed { dim: usize },
}

#[derive(Clone, Debug)]
struct ManagerFrame {
    capacities: [usize; 4],
    free_ops: Vec<FreeListOp>,
}

/// Owner of all attribute storage of one mesh.
#[derive(Clone, Debug)]
pub struct AttributeManager {
    top: PrimitiveType,
    stores: [TypedAttributes; 4],
    capacities: [usize; 4],
    free_lists: [Vec<i64>; 4],
    frames: Vec<ManagerFrame>,
}

impl AttributeManager {
    pub fn new(top: PrimitiveType) -> Self {
        Self {
            top,
            stores: Default::default(),
            capacities: [0; 4],
            free_lists: Default::default(),
            frames: Vec::new(),
        }
    }

    pub fn top_simplex_type(&self) -> PrimitiveType {
        self.top
    }

    /// Number of slots (live and deleted) for `pt`.
    pub fn capacity(&self, pt: PrimitiveType) -> usize {
        self.capacities[pt.dimension()]
    }

    /// Deleted slots currently available for reuse.
    pub fn free_slots(&self, pt: PrimitiveType) -> &[i64] {
        &self.free_lists[pt.dimension()]
    }

    /// Register a new attribute on `pt`.
    pub fn register<T: AttributeValue>(
        &mut self,
        name: &str,
        pt: PrimitiveType,
        arity: usize,
        default_value: T,
        role: AttributeRole,
    ) -> Result<TypedAttributeHandle<T>, MeshError> {
        if pt > self.top {
            return Err(MeshError::UnsupportedPrimitive {
                primitive: pt,
                top: self.top,
            });
        }
        if arity == 0 {
            return Err(MeshError::InvalidInput(format!(
                "attribute `{name}` must store at least one value per simplex"
            )));
        }
        if self.handle::<T>(name, pt).is_some() {
            return Err(MeshError::DuplicateAttribute {
                name: name.to_string(),
                primitive: pt,
            });
        }
        Ok(self.register_unchecked(name, pt, arity, default_value, role))
    }

    /// Registration for names and primitives already known to be valid.
    pub(crate) fn register_unchecked<T: AttributeValue>(
        &mut self,
        name: &str,
        pt: PrimitiveType,
        arity: usize,
        default_value: T,
        role: AttributeRole,
    ) -> TypedAttributeHandle<T> {
        let d = pt.dimension();
        let column = T::column_mut(&mut self.stores[d]);
        column.push(Attribute::new(
            name,
            arity,
            default_value,
            role,
            self.capacities[d],
            self.frames.len(),
        ));
        TypedAttributeHandle::new(pt, column.len() - 1)
    }

    /// Look up an attribute by name.
    pub fn handle<T: AttributeValue>(
        &self,
        name: &str,
        pt: PrimitiveType,
    ) -> Option<TypedAttributeHandle<T>> {
        if pt > self.top {
            return None;
        }
        T::column(&self.stores[pt.dimension()])
            .iter()
            .position(|a| a.name() == name)
            .map(|i| TypedAttributeHandle::new(pt, i))
    }

    /// All handles of type `T` registered on `pt`.
    pub fn handles<T: AttributeValue>(&self, pt: PrimitiveType) -> Vec<TypedAttributeHandle<T>> {
        (0..T::column(&self.stores[pt.dimension()]).len())
            .map(|i| TypedAttributeHandle::new(pt, i))
            .collect()
    }

    pub fn get<T: AttributeValue>(&self, handle: TypedAttributeHandle<T>) -> &Attribute<T> {
        &T::column(&self.stores[handle.primitive_type().dimension()])[handle.index()]
    }

    pub(crate) fn get_mut<T: AttributeValue>(
        &mut self,
        handle: TypedAttributeHandle<T>,
    ) -> &mut Attribute<T> {
        &mut T::column_mut(&mut self.stores[handle.primitive_type().dimension()])[handle.index()]
    }

    /// Hand out `count` slot ids for `pt`, reusing deleted slots first.
    ///
    /// Reused slots are reset to the default values of every attribute except
    /// cell hashes.
    pub(crate) fn allocate(&mut self, pt: PrimitiveType, count: usize) -> Vec<i64> {
        let d = pt.dimension();
        let mut ids = Vec::with_capacity(count);
        let mut grow = 0;
        for _ in 0..count {
            match self.free_lists[d].pop() {
                Some(id) => {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.free_ops.push(FreeListOp::Popped { dim: d, id });
                    }
                    self.stores[d].for_each_mut(|a| {
                        if a.role() != AttributeRole::Hash {
                            a.reset(id as usize);
                        }
                    });
                    ids.push(id);
                }
                None => {
                    ids.push((self.capacities[d] + grow) as i64);
                    grow += 1;
                }
            }
        }
        if grow > 0 {
            self.capacities[d] += grow;
            let capacity = self.capacities[d];
            self.stores[d].for_each_mut(|a| a.resize(capacity));
        }
        ids
    }

    /// Grow `pt` by `count` fresh slots, bypassing the free list.
    pub(crate) fn reserve(&mut self, pt: PrimitiveType, count: usize) -> std::ops::Range<i64> {
        let d = pt.dimension();
        let start = self.capacities[d];
        self.capacities[d] += count;
        let capacity = self.capacities[d];
        self.stores[d].for_each_mut(|a| a.resize(capacity));
        start as i64..capacity as i64
    }

    /// Return a deleted slot to the free list.
    pub(crate) fn release(&mut self, pt: PrimitiveType, id: i64) {
        let d = pt.dimension();
        self.free_lists[d].push(id);
        if let Some(frame) = self.frames.last_mut() {
            frame.free_ops.push(FreeListOp::Pushed { dim: d });
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn push_scope(&mut self) {
        self.frames.push(ManagerFrame {
            capacities: self.capacities,
            free_ops: Vec::new(),
        });
        for store in &mut self.stores {
            store.for_each_mut(|a| a.push_frame());
        }
    }

    pub(crate) fn commit_scope(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for store in &mut self.stores {
            store.for_each_mut(|a| a.commit_frame());
        }
        if let Some(parent) = self.frames.last_mut() {
            parent.free_ops.extend(frame.free_ops);
        }
    }

    pub(crate) fn rollback_scope(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for op in frame.free_ops.iter().rev() {
            match *op {
                FreeListOp::Popped { dim, id } => self.free_lists[dim].push(id),
                FreeListOp::Pushed { dim } => {
                    self.free_lists[dim].pop();
                }
            }
        }
        self.capacities = frame.capacities;
        for (d, store) in self.stores.iter_mut().enumerate() {
            let capacity = self.capacities[d];
            store.for_each_mut(|a| {
                a.rollback_frame();
                a.resize(capacity);
            });
        }
    }

    /// Check that every attribute holds exactly `capacity` slots.
    pub fn validate_lengths(&self) -> Result<(), MeshError> {
        for (d, store) in self.stores.iter().enumerate() {
            let mut bad = None;
            store.for_each(|a| {
                if a.slot_count() != self.capacities[d] {
                    bad = Some(a.slot_count());
                }
            });
            if let Some(found) = bad {
                return Err(MeshError::CorruptConnectivity(format!(
                    "attribute on dimension {d} has {found} slots, capacity is {}",
                    self.capacities[d]
                )));
            }
        }
        Ok(())
    }

    /// Visit every attribute of `pt` in registration order, grouped by type.
    pub fn visit(&self, pt: PrimitiveType, visitor: &mut dyn AttributeVisitor) {
        let store = &self.stores[pt.dimension()];
        store.chars.iter().for_each(|a| visitor.visit_char(a));
        store.longs.iter().for_each(|a| visitor.visit_long(a));
        store.doubles.iter().for_each(|a| visitor.visit_double(a));
    }
}

/// Read-only visitor over heterogeneous attributes.
pub trait AttributeVisitor {
    fn visit_char(&mut self, attribute: &Attribute<i8>);
    fn visit_long(&mut self, attribute: &Attribute<i64>);
    fn visit_double(&mut self, attribute: &Attribute<f64>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (AttributeManager, TypedAttributeHandle<f64>) {
        let mut m = AttributeManager::new(PrimitiveType::Face);
        m.reserve(PrimitiveType::Vertex, 3);
        let h = m
            .register("p", PrimitiveType::Vertex, 2, 0.0, AttributeRole::User)
            .unwrap();
        (m, h)
    }

    #[test]
    fn registration_matches_capacity_and_rejects_duplicates() {
        let (mut m, h) = manager();
        assert_eq!(m.get(h).len(), 3);
        assert!(matches!(
            m.register::<f64>("p", PrimitiveType::Vertex, 2, 0.0, AttributeRole::User),
            Err(MeshError::DuplicateAttribute { .. })
        ));
        assert!(matches!(
            m.register::<f64>("q", PrimitiveType::Tetrahedron, 1, 0.0, AttributeRole::User),
            Err(MeshError::UnsupportedPrimitive { .. })
        ));
        assert_eq!(m.handle::<f64>("p", PrimitiveType::Vertex), Some(h));
        assert_eq!(m.handle::<i64>("p", PrimitiveType::Vertex), None);
    }

    #[test]
    fn allocation_reuses_released_slots_with_defaults() {
        let (mut m, h) = manager();
        m.get_mut(h).set_vector(1, &[4.0, 5.0]);
        m.release(PrimitiveType::Vertex, 1);
        assert_eq!(m.allocate(PrimitiveType::Vertex, 2), vec![1, 3]);
        assert_eq!(m.capacity(PrimitiveType::Vertex), 4);
        assert_eq!(m.get(h).vector(1), &[0.0, 0.0]);
        m.validate_lengths().unwrap();
    }

    #[test]
    fn rollback_restores_capacity_and_free_list() {
        let (mut m, h) = manager();
        m.release(PrimitiveType::Vertex, 2);
        m.push_scope();
        let ids = m.allocate(PrimitiveType::Vertex, 2);
        assert_eq!(ids, vec![2, 3]);
        m.get_mut(h).set_vector(0, &[1.0, 1.0]);
        m.release(PrimitiveType::Vertex, 0);
        m.rollback_scope();
        assert_eq!(m.capacity(PrimitiveType::Vertex), 3);
        assert_eq!(m.free_slots(PrimitiveType::Vertex), &[2]);
        assert_eq!(m.get(h).vector(0), &[0.0, 0.0]);
        m.validate_lengths().unwrap();
    }

    #[test]
    fn committed_inner_scope_is_undone_by_outer_rollback() {
        let (mut m, h) = manager();
        m.push_scope();
        m.push_scope();
        m.allocate(PrimitiveType::Vertex, 1);
        m.get_mut(h).set_vector(2, &[8.0, 8.0]);
        m.commit_scope();
        assert_eq!(m.scope_depth(), 1);
        m.rollback_scope();
        assert_eq!(m.capacity(PrimitiveType::Vertex), 3);
        assert_eq!(m.get(h).vector(2), &[0.0, 0.0]);
    }
}
