//! Orientation predicates for triangles and tetrahedra.
//!
//! Three evaluation modes are offered:
//!
//! - [`OrientationMode::Fast`]: plain `f64` determinant, sign may be wrong for
//!   nearly degenerate inputs.
//! - [`OrientationMode::Exact`]: the determinant is evaluated with
//!   floating-point expansions (sums of non-overlapping `f64` components), so
//!   its sign is always correct.
//! - [`OrientationMode::Adaptive`]: the fast value is accepted when it clears a
//!   static error bound, otherwise the exact path decides. This is the default.

use serde::{Deserialize, Serialize};

/// Sign of an orientation determinant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Negative,
    Zero,
    Positive,
}

impl Orientation {
    pub fn from_value(v: f64) -> Self {
        if v > 0.0 {
            Orientation::Positive
        } else if v < 0.0 {
            Orientation::Negative
        } else {
            Orientation::Zero
        }
    }
}

/// How orientation determinants are evaluated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrientationMode {
    Fast,
    Exact,
    #[default]
    Adaptive,
}

const EPSILON: f64 = f64::EPSILON * 0.5;
const CCW_ERRBOUND_A: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const O3D_ERRBOUND_A: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

// ---------------------------------------------------------------------------
// expansion arithmetic
// ---------------------------------------------------------------------------

/// `a + b = s + e` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bv = s - a;
    let av = s - bv;
    (s, (a - av) + (b - bv))
}

/// `a - b = s + e` exactly.
#[inline]
fn two_diff(a: f64, b: f64) -> (f64, f64) {
    two_sum(a, -b)
}

/// `a * b = p + e` exactly.
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// An exact value represented as a sum of `f64` components in increasing
/// magnitude.
#[derive(Clone, Debug, Default)]
struct Expansion(Vec<f64>);

impl Expansion {
    #[cfg(test)]
    fn from_f64(v: f64) -> Self {
        Expansion(vec![v])
    }

    fn from_parts(hi: f64, lo: f64) -> Self {
        Expansion(vec![lo, hi]).compressed()
    }

    fn compressed(mut self) -> Self {
        self.0.retain(|&c| c != 0.0);
        self
    }

    fn grow(&self, b: f64) -> Self {
        let mut q = b;
        let mut h = Vec::with_capacity(self.0.len() + 1);
        for &e in &self.0 {
            let (s, err) = two_sum(q, e);
            h.push(err);
            q = s;
        }
        h.push(q);
        Expansion(h).compressed()
    }

    fn add(&self, other: &Self) -> Self {
        other.0.iter().fold(self.clone(), |acc, &c| acc.grow(c))
    }

    fn neg(&self) -> Self {
        Expansion(self.0.iter().map(|c| -c).collect())
    }

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    fn scale(&self, b: f64) -> Self {
        let mut out = Expansion::default();
        for &e in &self.0 {
            let (p, err) = two_product(e, b);
            out = out.grow(err).grow(p);
        }
        out
    }

    fn mul(&self, other: &Self) -> Self {
        other
            .0
            .iter()
            .fold(Expansion::default(), |acc, &c| acc.add(&self.scale(c)))
    }

    /// Sign of the represented value: the sign of its largest component.
    fn sign(&self) -> Orientation {
        self.0
            .iter()
            .rev()
            .find(|&&c| c != 0.0)
            .map_or(Orientation::Zero, |&c| Orientation::from_value(c))
    }
}

fn diff(a: f64, b: f64) -> Expansion {
    let (s, e) = two_diff(a, b);
    Expansion::from_parts(s, e)
}

// ---------------------------------------------------------------------------
// 2D
// ---------------------------------------------------------------------------

fn orient2d_fast(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn orient2d_exact(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> Orientation {
    let bx = diff(b[0], a[0]);
    let by = diff(b[1], a[1]);
    let cx = diff(c[0], a[0]);
    let cy = diff(c[1], a[1]);
    bx.mul(&cy).sub(&by.mul(&cx)).sign()
}

/// Orientation of the triangle `(a, b, c)`: positive when counter-clockwise.
pub fn orient2d(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2], mode: OrientationMode) -> Orientation {
    match mode {
        OrientationMode::Fast => Orientation::from_value(orient2d_fast(a, b, c)),
        OrientationMode::Exact => orient2d_exact(a, b, c),
        OrientationMode::Adaptive => {
            let left = (b[0] - a[0]) * (c[1] - a[1]);
            let right = (b[1] - a[1]) * (c[0] - a[0]);
            let det = left - right;
            let bound = CCW_ERRBOUND_A * (left.abs() + right.abs());
            if det > bound || -det > bound {
                Orientation::from_value(det)
            } else {
                orient2d_exact(a, b, c)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3D
// ---------------------------------------------------------------------------

fn orient3d_fast(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3], d: &[f64; 3]) -> f64 {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
    u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
        + u[2] * (v[0] * w[1] - v[1] * w[0])
}

fn orient3d_exact(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3], d: &[f64; 3]) -> Orientation {
    let u: Vec<Expansion> = (0..3).map(|i| diff(b[i], a[i])).collect();
    let v: Vec<Expansion> = (0..3).map(|i| diff(c[i], a[i])).collect();
    let w: Vec<Expansion> = (0..3).map(|i| diff(d[i], a[i])).collect();
    let m0 = v[1].mul(&w[2]).sub(&v[2].mul(&w[1]));
    let m1 = v[0].mul(&w[2]).sub(&v[2].mul(&w[0]));
    let m2 = v[0].mul(&w[1]).sub(&v[1].mul(&w[0]));
    u[0].mul(&m0).sub(&u[1].mul(&m1)).add(&u[2].mul(&m2)).sign()
}

/// Orientation of the tetrahedron `(a, b, c, d)`: positive when
/// `det[b - a; c - a; d - a] > 0`.
pub fn orient3d(
    a: &[f64; 3],
    b: &[f64; 3],
    c: &[f64; 3],
    d: &[f64; 3],
    mode: OrientationMode,
) -> Orientation {
    match mode {
        OrientationMode::Fast => Orientation::from_value(orient3d_fast(a, b, c, d)),
        OrientationMode::Exact => orient3d_exact(a, b, c, d),
        OrientationMode::Adaptive => {
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
            let det = orient3d_fast(a, b, c, d);
            let permanent = u[0].abs() * ((v[1] * w[2]).abs() + (v[2] * w[1]).abs())
                + u[1].abs() * ((v[0] * w[2]).abs() + (v[2] * w[0]).abs())
                + u[2].abs() * ((v[0] * w[1]).abs() + (v[1] * w[0]).abs());
            let bound = O3D_ERRBOUND_A * permanent;
            if det > bound || -det > bound {
                Orientation::from_value(det)
            } else {
                orient3d_exact(a, b, c, d)
            }
        }
    }
}

/// Orientation of a simplex given as 2D (triangle) or 3D (tetrahedron)
/// points packed row-wise in `coords`.
///
/// Returns `None` when the arity does not match the number of points.
pub fn orient(coords: &[&[f64]], mode: OrientationMode) -> Option<Orientation> {
    match coords {
        [a, b, c] if a.len() == 2 && b.len() == 2 && c.len() == 2 => Some(orient2d(
            &[a[0], a[1]],
            &[b[0], b[1]],
            &[c[0], c[1]],
            mode,
        )),
        [a, b, c, d] if [a, b, c, d].iter().all(|p| p.len() == 3) => Some(orient3d(
            &[a[0], a[1], a[2]],
            &[b[0], b[1], b[2]],
            &[c[0], c[1], c[2]],
            &[d[0], d[1], d[2]],
            mode,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_orientations() {
        for mode in [OrientationMode::Fast, OrientationMode::Exact, OrientationMode::Adaptive] {
            assert_eq!(
                orient2d(&[0.0, 0.0], &[1.0, 0.0], &[0.0, 1.0], mode),
                Orientation::Positive
            );
            assert_eq!(
                orient2d(&[0.0, 0.0], &[0.0, 1.0], &[1.0, 0.0], mode),
                Orientation::Negative
            );
            assert_eq!(
                orient2d(&[0.0, 0.0], &[1.0, 1.0], &[2.0, 2.0], mode),
                Orientation::Zero
            );
            assert_eq!(
                orient3d(
                    &[0.0, 0.0, 0.0],
                    &[1.0, 0.0, 0.0],
                    &[0.0, 1.0, 0.0],
                    &[0.0, 0.0, 1.0],
                    mode
                ),
                Orientation::Positive
            );
        }
    }

    #[test]
    fn near_degenerate_triangle_needs_exact_arithmetic() {
        let p = [0.5 + f64::EPSILON / 2.0, 0.5];
        let q = [12.0, 12.0];
        let r = [24.0, 24.0];
        assert_eq!(orient2d(&p, &q, &r, OrientationMode::Exact), Orientation::Negative);
        assert_eq!(orient2d(&p, &q, &r, OrientationMode::Adaptive), Orientation::Negative);
    }

    #[test]
    fn expansion_products_are_exact() {
        let a = Expansion::from_f64(1.0 + f64::EPSILON);
        let sq = a.mul(&a);
        // (1 + e)^2 = 1 + 2e + e^2 needs more than one double
        assert!(sq.0.len() >= 2);
        let back = sq.sub(&Expansion::from_f64(1.0)).sub(&Expansion::from_f64(2.0 * f64::EPSILON));
        assert_eq!(back.sign(), Orientation::Positive);
    }

    #[test]
    fn orient_dispatches_on_arity() {
        let pts: [&[f64]; 3] = [&[0.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]];
        assert_eq!(orient(&pts, OrientationMode::Adaptive), Some(Orientation::Positive));
        let bad: [&[f64]; 3] = [&[0.0, 0.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]];
        assert_eq!(orient(&bad, OrientationMode::Adaptive), None);
    }
}
