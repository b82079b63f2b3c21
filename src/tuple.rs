//! Local navigation handles.
//!
//! A [`Tuple`] names one vertex, one edge and one face of a top-dimensional
//! cell by their local indices inside that cell, plus the cell's global id and
//! the cell hash observed when the tuple was produced. Local indices a mesh
//! does not use are stored as `-1`.

use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;

/// Number of `i64` slots a tuple occupies inside a multi-mesh map attribute.
pub const TUPLE_SIZE: usize = 5;

/// Immutable "simplex as seen from a cell" handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple {
    local_vid: i8,
    local_eid: i8,
    local_fid: i8,
    global_cid: i64,
    hash: i64,
}

assert_eq_size!(Tuple, [u64; 3]);

impl Tuple {
    pub const fn new(local_vid: i8, local_eid: i8, local_fid: i8, global_cid: i64, hash: i64) -> Self {
        Self {
            local_vid,
            local_eid,
            local_fid,
            global_cid,
            hash,
        }
    }

    /// The null tuple; never valid in any mesh.
    pub const fn null() -> Self {
        Self::new(-1, -1, -1, -1, -1)
    }

    pub const fn is_null(&self) -> bool {
        self.global_cid < 0
    }

    pub const fn local_vid(&self) -> i8 {
        self.local_vid
    }

    pub const fn local_eid(&self) -> i8 {
        self.local_eid
    }

    pub const fn local_fid(&self) -> i8 {
        self.local_fid
    }

    pub const fn global_cid(&self) -> i64 {
        self.global_cid
    }

    pub const fn hash(&self) -> i64 {
        self.hash
    }

    /// Same cell and local ids, regardless of the recorded hash.
    pub fn same_ids(&self, other: &Tuple) -> bool {
        self.local_vid == other.local_vid
            && self.local_eid == other.local_eid
            && self.local_fid == other.local_fid
            && self.global_cid == other.global_cid
    }

    pub(crate) const fn with_hash(self, hash: i64) -> Self {
        Self { hash, ..self }
    }

    pub(crate) fn to_slots(self) -> [i64; TUPLE_SIZE] {
        [
            i64::from(self.local_vid),
            i64::from(self.local_eid),
            i64::from(self.local_fid),
            self.global_cid,
            self.hash,
        ]
    }

    pub(crate) fn from_slots(slots: &[i64]) -> Self {
        debug_assert_eq!(slots.len(), TUPLE_SIZE);
        if slots[3] < 0 {
            return Self::null();
        }
        Self::new(
            slots[0] as i8,
            slots[1] as i8,
            slots[2] as i8,
            slots[3],
            slots[4],
        )
    }
}

impl Default for Tuple {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return f.write_str("Tuple(null)");
        }
        write!(
            f,
            "Tuple(lv={}, le={}, lf={}, cell={}, hash={})",
            self.local_vid, self.local_eid, self.local_fid, self.global_cid, self.hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_round_trip_and_null() {
        let t = Tuple::new(2, 1, -1, 17, 4);
        assert_eq!(Tuple::from_slots(&t.to_slots()), t);
        assert!(Tuple::from_slots(&[-1; TUPLE_SIZE]).is_null());
        assert!(Tuple::default().is_null());
    }

    #[test]
    fn same_ids_ignores_hash() {
        let t = Tuple::new(0, 2, -1, 3, 0);
        assert!(t.same_ids(&t.with_hash(9)));
        assert_ne!(t, t.with_hash(9));
    }
}
