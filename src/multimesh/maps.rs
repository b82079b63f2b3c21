//! Storage of tuple pairs in `i64` attributes.
//!
//! A map entry has `2 * TUPLE_SIZE` slots: the owner's tuple followed by the
//! tuple in the other mesh. Unmapped entries hold the null tuple twice.

use crate::attribute::{AttributeRole, TypedAttributeHandle};
use crate::mesh::MeshCore;
use crate::primitive::PrimitiveType;
use crate::tuple::{Tuple, TUPLE_SIZE};

pub const MAP_ARITY: usize = 2 * TUPLE_SIZE;

pub const MAP_TO_PARENT_NAME: &str = "multimesh_map_to_parent";

pub fn map_to_child_name(index: usize) -> String {
    format!("multimesh_map_to_child_{index}")
}

pub(crate) fn register_map(core: &mut MeshCore, name: &str, pt: PrimitiveType) -> TypedAttributeHandle<i64> {
    core.attributes_mut()
        .register_unchecked(name, pt, MAP_ARITY, -1i64, AttributeRole::Internal)
}

/// `(own tuple, other tuple)` stored for simplex `id`, if it is mapped.
pub fn read_pair(core: &MeshCore, handle: TypedAttributeHandle<i64>, id: i64) -> Option<(Tuple, Tuple)> {
    let attr = core.attributes().get(handle);
    if id < 0 || (id as usize) >= attr.len() {
        return None;
    }
    let slots = attr.vector(id as usize);
    let mine = Tuple::from_slots(&slots[..TUPLE_SIZE]);
    let other = Tuple::from_slots(&slots[TUPLE_SIZE..]);
    (!mine.is_null() && !other.is_null()).then_some((mine, other))
}

pub(crate) fn write_pair(
    core: &mut MeshCore,
    handle: TypedAttributeHandle<i64>,
    id: i64,
    mine: &Tuple,
    other: &Tuple,
) {
    let mut slots = [0i64; MAP_ARITY];
    slots[..TUPLE_SIZE].copy_from_slice(&mine.to_slots());
    slots[TUPLE_SIZE..].copy_from_slice(&other.to_slots());
    core.attributes_mut()
        .get_mut(handle)
        .set_vector(id as usize, &slots);
}

pub(crate) fn clear(core: &mut MeshCore, handle: TypedAttributeHandle<i64>, id: i64) {
    if read_pair(core, handle, id).is_some() {
        core.attributes_mut()
            .get_mut(handle)
            .set_vector(id as usize, &[-1; MAP_ARITY]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, TriMesh};

    #[test]
    fn entries_start_unmapped() {
        let mut m = TriMesh::from_faces(&[[0, 1, 2]]).unwrap();
        let h = register_map(m.core_mut(), &map_to_child_name(0), PrimitiveType::Edge);
        assert_eq!(m.core().attributes().get(h).dimension(), MAP_ARITY);
        assert!(read_pair(m.core(), h, 0).is_none());

        let t = m.core().tuple_from_cell(0);
        write_pair(m.core_mut(), h, 2, &t, &t);
        assert_eq!(read_pair(m.core(), h, 2), Some((t, t)));
        clear(m.core_mut(), h, 2);
        assert!(read_pair(m.core(), h, 2).is_none());
    }
}
