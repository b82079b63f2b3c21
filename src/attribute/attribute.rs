//! Journaled per-simplex storage.
//!
//! An [`Attribute`] stores `arity` values per simplex in one flat vector.
//! While scopes are open every overwrite of a slot that existed when the
//! innermost scope began is recorded as `(flat index, old value)`; slots
//! appended inside the scope are simply truncated away on rollback.

use super::value::AttributeValue;

/// How the allocator treats an attribute when a deleted slot is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeRole {
    /// Caller-registered data; reset on reuse, driven by update strategies.
    User,
    /// Connectivity, flags and multi-mesh maps; reset on reuse.
    Internal,
    /// Cell versions; never reset so stale tuples stay stale.
    Hash,
}

#[derive(Clone, Debug)]
struct Frame<T> {
    start_len: usize,
    writes: Vec<(usize, T)>,
}

/// Values of one registered attribute, `arity` entries per simplex.
#[derive(Clone, Debug)]
pub struct Attribute<T> {
    name: String,
    arity: usize,
    default_value: T,
    role: AttributeRole,
    data: Vec<T>,
    frames: Vec<Frame<T>>,
}

impl<T: AttributeValue> Attribute<T> {
    pub(crate) fn new(
        name: &str,
        arity: usize,
        default_value: T,
        role: AttributeRole,
        count: usize,
        open_scopes: usize,
    ) -> Self {
        let data = vec![default_value; count * arity];
        let frames = (0..open_scopes)
            .map(|_| Frame {
                start_len: data.len(),
                writes: Vec::new(),
            })
            .collect();
        Self {
            name: name.to_string(),
            arity,
            default_value,
            role,
            data,
            frames,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values stored per simplex.
    pub fn dimension(&self) -> usize {
        self.arity
    }

    pub fn default_value(&self) -> T {
        self.default_value
    }

    pub fn role(&self) -> AttributeRole {
        self.role
    }

    /// Number of simplex slots (equals the mesh capacity for this primitive).
    pub fn len(&self) -> usize {
        self.data.len() / self.arity
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn vector(&self, index: usize) -> &[T] {
        &self.data[index * self.arity..(index + 1) * self.arity]
    }

    pub fn scalar(&self, index: usize) -> T {
        debug_assert_eq!(self.arity, 1, "scalar access to vector attribute `{}`", self.name);
        self.data[index * self.arity]
    }

    pub(crate) fn set_entry(&mut self, index: usize, offset: usize, value: T) {
        let flat = index * self.arity + offset;
        let old = std::mem::replace(&mut self.data[flat], value);
        if let Some(frame) = self.frames.last_mut() {
            if flat < frame.start_len && old != value {
                frame.writes.push((flat, old));
            }
        }
    }

    pub(crate) fn set_vector(&mut self, index: usize, values: &[T]) {
        debug_assert_eq!(values.len(), self.arity);
        for (offset, &v) in values.iter().enumerate() {
            self.set_entry(index, offset, v);
        }
    }

    pub(crate) fn set_scalar(&mut self, index: usize, value: T) {
        self.set_entry(index, 0, value);
    }

    /// Number of journaled writes in the innermost scope.
    pub fn pending_writes(&self) -> usize {
        self.frames.last().map_or(0, |f| f.writes.len())
    }
}

/// Type-erased journal operations used by the attribute manager.
pub(crate) trait Journaled {
    fn role(&self) -> AttributeRole;
    fn resize(&mut self, count: usize);
    fn reset(&mut self, index: usize);
    fn push_frame(&mut self);
    fn commit_frame(&mut self);
    fn rollback_frame(&mut self);
    fn slot_count(&self) -> usize;
}

impl<T: AttributeValue> Journaled for Attribute<T> {
    fn role(&self) -> AttributeRole {
        self.role
    }

    fn resize(&mut self, count: usize) {
        self.data.resize(count * self.arity, self.default_value);
    }

    fn reset(&mut self, index: usize) {
        for offset in 0..self.arity {
            self.set_entry(index, offset, self.default_value);
        }
    }

    fn push_frame(&mut self) {
        self.frames.push(Frame {
            start_len: self.data.len(),
            writes: Vec::new(),
        });
    }

    fn commit_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if let Some(parent) = self.frames.last_mut() {
            let limit = parent.start_len;
            parent
                .writes
                .extend(frame.writes.into_iter().filter(|&(flat, _)| flat < limit));
        }
    }

    fn rollback_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for &(flat, old) in frame.writes.iter().rev() {
            self.data[flat] = old;
        }
        self.data.truncate(frame.start_len);
    }

    fn slot_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(count: usize) -> Attribute<f64> {
        Attribute::new("p", 2, 0.0, AttributeRole::User, count, 0)
    }

    #[test]
    fn rollback_restores_old_values_and_length() {
        let mut a = attr(3);
        a.set_vector(1, &[1.0, 2.0]);
        a.push_frame();
        a.set_vector(1, &[5.0, 6.0]);
        a.resize(5);
        a.set_vector(4, &[9.0, 9.0]);
        assert_eq!(a.len(), 5);
        a.rollback_frame();
        assert_eq!(a.len(), 3);
        assert_eq!(a.vector(1), &[1.0, 2.0]);
    }

    #[test]
    fn nested_commit_then_outer_rollback() {
        let mut a = attr(2);
        a.push_frame();
        a.set_scalar(0, 3.0);
        a.push_frame();
        a.set_scalar(1, 4.0);
        a.commit_frame();
        assert_eq!(a.vector(1), &[4.0, 0.0]);
        a.rollback_frame();
        assert_eq!(a.as_slice(), &[0.0; 4]);
    }

    #[test]
    fn inner_rollback_keeps_outer_writes() {
        let mut a = attr(2);
        a.push_frame();
        a.set_scalar(0, 3.0);
        a.push_frame();
        a.set_scalar(0, 7.0);
        a.rollback_frame();
        assert_eq!(a.scalar_at(0), 3.0);
        a.commit_frame();
        assert_eq!(a.scalar_at(0), 3.0);
        assert_eq!(a.pending_writes(), 0);
    }

    impl Attribute<f64> {
        fn scalar_at(&self, index: usize) -> f64 {
            self.vector(index)[0]
        }
    }
}
