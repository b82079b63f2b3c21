//! Sorted, deduplicated sets of simplices.

use itertools::Itertools;

use crate::mesh::MeshCore;
use crate::primitive::PrimitiveType;

use super::{IdSimplex, Simplex};

/// A set of simplices keyed by `(type, global id)`.
///
/// Each entry keeps one representative tuple so members can still be used for
/// navigation. Set operations compare ids only.
#[derive(Clone, Debug, Default)]
pub struct SimplexCollection {
    entries: Vec<(IdSimplex, Simplex)>,
}

impl SimplexCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect simplices of `core`, dropping duplicates.
    pub fn from_simplices(core: &MeshCore, simplices: impl IntoIterator<Item = Simplex>) -> Self {
        let mut c = Self {
            entries: simplices
                .into_iter()
                .map(|s| (IdSimplex::new(s.primitive_type(), core.simplex_id(&s)), s))
                .collect(),
        };
        c.sort_and_clean();
        c
    }

    pub(crate) fn from_entries(entries: Vec<(IdSimplex, Simplex)>) -> Self {
        let mut c = Self { entries };
        c.sort_and_clean();
        c
    }

    fn sort_and_clean(&mut self) {
        self.entries.sort_by_key(|(id, _)| *id);
        self.entries.dedup_by_key(|(id, _)| *id);
    }

    /// Insert one simplex, keeping the collection sorted.
    pub fn add(&mut self, core: &MeshCore, s: Simplex) {
        let key = IdSimplex::new(s.primitive_type(), core.simplex_id(&s));
        if let Err(pos) = self.entries.binary_search_by_key(&key, |(id, _)| *id) {
            self.entries.insert(pos, (key, s));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &IdSimplex) -> bool {
        self.entries.binary_search_by_key(id, |(k, _)| *k).is_ok()
    }

    pub fn contains_simplex(&self, core: &MeshCore, s: &Simplex) -> bool {
        self.contains(&IdSimplex::new(s.primitive_type(), core.simplex_id(s)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Simplex> + '_ {
        self.entries.iter().map(|(_, s)| s)
    }

    pub fn ids(&self) -> impl Iterator<Item = IdSimplex> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn simplex_vector(&self) -> Vec<Simplex> {
        self.iter().copied().collect()
    }

    /// Members of one type, in id order.
    pub fn simplex_vector_of(&self, pt: PrimitiveType) -> Vec<Simplex> {
        self.entries
            .iter()
            .filter(|(id, _)| id.primitive_type() == pt)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .merge_by(other.entries.iter(), |a, b| a.0 <= b.0)
                .dedup_by(|a, b| a.0 == b.0)
                .copied()
                .collect(),
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| other.contains(id))
                .copied()
                .collect(),
        }
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| !other.contains(id))
                .copied()
                .collect(),
        }
    }

    /// Whether both collections hold the same simplices.
    pub fn same_simplices(&self, other: &Self) -> bool {
        self.ids().eq(other.ids())
    }
}

type Entry = (IdSimplex, Simplex);

fn entry_simplex((_, s): Entry) -> Simplex {
    s
}

impl IntoIterator for SimplexCollection {
    type Item = Simplex;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Entry>, fn(Entry) -> Simplex>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(entry_simplex as fn(Entry) -> Simplex)
    }
}
