//! Local index tables of a single cell.
//!
//! Sub-simplices are listed as sorted local vertex indices. Facet `i` of a
//! triangle or tetrahedron is the one opposite local vertex `i`; facet `i` of
//! an edge is its local vertex `i`. A tuple's facet index is therefore the
//! local index of its `(top - 1)`-simplex in every mesh type.

use smallvec::SmallVec;

pub(crate) type LocalSet = SmallVec<[usize; 4]>;

static POINT_CELL: &[&[usize]] = &[&[0]];

static EDGE_VERTICES: &[&[usize]] = &[&[0], &[1]];
static EDGE_CELL: &[&[usize]] = &[&[0, 1]];

static TRI_VERTICES: &[&[usize]] = &[&[0], &[1], &[2]];
static TRI_EDGES: &[&[usize]] = &[&[1, 2], &[0, 2], &[0, 1]];
static TRI_CELL: &[&[usize]] = &[&[0, 1, 2]];

static TET_VERTICES: &[&[usize]] = &[&[0], &[1], &[2], &[3]];
static TET_EDGES: &[&[usize]] = &[&[0, 1], &[0, 2], &[0, 3], &[1, 2], &[1, 3], &[2, 3]];
static TET_FACES: &[&[usize]] = &[&[1, 2, 3], &[0, 2, 3], &[0, 1, 3], &[0, 1, 2]];
static TET_CELL: &[&[usize]] = &[&[0, 1, 2, 3]];

/// Local `dim`-simplices of a cell of dimension `top`.
pub(crate) fn local_simplices(top: usize, dim: usize) -> &'static [&'static [usize]] {
    match (top, dim) {
        (0, 0) => POINT_CELL,
        (1, 0) => EDGE_VERTICES,
        (1, 1) => EDGE_CELL,
        (2, 0) => TRI_VERTICES,
        (2, 1) => TRI_EDGES,
        (2, 2) => TRI_CELL,
        (3, 0) => TET_VERTICES,
        (3, 1) => TET_EDGES,
        (3, 2) => TET_FACES,
        (3, 3) => TET_CELL,
        _ => &[],
    }
}

/// Facets of a cell of dimension `top >= 1`.
pub(crate) fn facets(top: usize) -> &'static [&'static [usize]] {
    if top == 0 {
        return &[];
    }
    local_simplices(top, top - 1)
}

/// Index of the local `dim`-simplex with exactly the given (sorted) vertices.
pub(crate) fn find_local(top: usize, dim: usize, sorted: &[usize]) -> Option<usize> {
    local_simplices(top, dim).iter().position(|s| *s == sorted)
}

/// Flag indices `[i_0, .., i_{top-1}]` of a local vertex sequence.
///
/// Entry `d` is the local index of the `d`-simplex spanned by the first
/// `d + 1` entries of `sequence`, which must be a permutation of `0..=top`.
pub(crate) fn flag_from_sequence(top: usize, sequence: &[usize]) -> Option<SmallVec<[usize; 3]>> {
    let mut flag = SmallVec::new();
    let mut prefix: LocalSet = SmallVec::new();
    for d in 0..top {
        prefix.push(*sequence.get(d)?);
        let mut sorted = prefix.clone();
        sorted.sort_unstable();
        flag.push(find_local(top, d, &sorted)?);
    }
    Some(flag)
}

/// Local vertex sequence `[s_0, s_1 \ s_0, ..., cell \ s_{top-1}]` of a flag.
pub(crate) fn sequence_from_flag(top: usize, flag: &[usize]) -> LocalSet {
    let mut seq = LocalSet::new();
    for d in 0..=top {
        let s: &[usize] = if d == top {
            local_simplices(top, top)[0]
        } else {
            local_simplices(top, d)[flag[d]]
        };
        if let Some(&v) = s.iter().find(|v| !seq.contains(v)) {
            seq.push(v);
        }
    }
    seq
}

/// Complete a partial local vertex sequence with the remaining local vertices
/// in increasing order.
pub(crate) fn complete_sequence(top: usize, partial: &[usize]) -> LocalSet {
    let mut seq: LocalSet = partial.iter().copied().collect();
    for v in 0..=top {
        if !seq.contains(&v) {
            seq.push(v);
        }
    }
    seq
}

/// Whether a permutation of `0..n` is even.
pub(crate) fn is_even_permutation(seq: &[usize]) -> bool {
    let mut inversions = 0;
    for i in 0..seq.len() {
        for j in i + 1..seq.len() {
            if seq[i] > seq[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 0
}

/// Replace `s_d` in the flag by the other `d`-simplex between `s_{d-1}` and
/// `s_{d+1}`.
pub(crate) fn switch_in_flag(top: usize, flag: &mut [usize], d: usize) {
    debug_assert!(d < top);
    let current = local_simplices(top, d)[flag[d]];
    let upper: &[usize] = if d + 1 == top {
        local_simplices(top, top)[0]
    } else {
        local_simplices(top, d + 1)[flag[d + 1]]
    };
    let Some(&extra) = upper.iter().find(|v| !current.contains(v)) else {
        return;
    };
    let mut target: LocalSet = if d == 0 {
        LocalSet::new()
    } else {
        local_simplices(top, d - 1)[flag[d - 1]].iter().copied().collect()
    };
    target.push(extra);
    target.sort_unstable();
    if let Some(i) = find_local(top, d, &target) {
        flag[d] = i;
    }
}
