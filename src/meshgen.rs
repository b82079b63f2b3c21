//! Small meshes for tests, benchmarks and examples.
//!
//! Triangle fixtures follow the layouts sketched next to each function.
//! Vertex positions, where provided, live in an `f64` vertex attribute named
//! [`POSITION_ATTRIBUTE`] and make every cell positively oriented.

use crate::attribute::TypedAttributeHandle;
use crate::mesh::{EdgeMesh, Mesh, TetMesh, TriMesh};
use crate::mesh_error::MeshError;
use crate::primitive::PrimitiveType;

/// Name of the position attribute written by this module.
pub const POSITION_ATTRIBUTE: &str = "vertices";

/// Register [`POSITION_ATTRIBUTE`] with `N` coordinates and fill it.
pub fn add_positions<M: Mesh, const N: usize>(
    mesh: &mut M,
    coords: &[[f64; N]],
) -> Result<TypedAttributeHandle<f64>, MeshError> {
    let handle = mesh.register_attribute(POSITION_ATTRIBUTE, PrimitiveType::Vertex, N, 0.0)?;
    let mut acc = mesh.create_accessor(handle);
    for (v, p) in coords.iter().enumerate() {
        acc.set_vector_by_id(v as i64, p)?;
    }
    Ok(handle)
}

// ---------------------------------------------------------------------------
// triangles
// ---------------------------------------------------------------------------

/// ```text
///   2
///   | \
///   0---1
/// ```
pub fn single_triangle() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 1, 2]])
}

pub fn single_triangle_with_positions() -> Result<(TriMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = single_triangle()?;
    let p = add_positions(&mut m, &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])?;
    Ok((m, p))
}

/// ```text
///   3---0
///    \ / \
///     1---2
/// ```
pub fn one_ear() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0]])
}

/// ```text
///   3---0---4
///    \ / \ /
///     1---2
/// ```
pub fn two_neighbors() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0], [0, 2, 4]])
}

/// [`two_neighbors`] cut open along edge `(0, 1)`: the face across the cut
/// uses `5` and `6` where the others use `1` and `0`.
///
/// ```text
///   3---6   0---4
///    \ /   / \ /
///     5   1---2
/// ```
pub fn two_neighbors_cut_on_edge01() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 1, 2], [3, 5, 6], [0, 2, 4]])
}

/// ```text
///   3---0---4
///    \ / \ /
///     1---2
///      \ /
///       5
/// ```
pub fn three_neighbors() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 1, 2], [3, 1, 0], [0, 2, 4], [5, 2, 1]])
}

/// ```text
///   0---1
///   | / |
///   2---3
/// ```
pub fn quad() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[[0, 2, 1], [1, 2, 3]])
}

/// ```text
///     0---1---2
///    / \ / \ / \
///   3---4---5---6
///    \ / \ /
///     7---8
/// ```
pub fn hex_plus_two() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[
        [3, 4, 0],
        [4, 1, 0],
        [4, 5, 1],
        [5, 2, 1],
        [5, 6, 2],
        [3, 7, 4],
        [7, 8, 4],
        [4, 8, 5],
    ])
}

const HEX_POSITIONS: [[f64; 2]; 10] = [
    [0.5, 1.0],
    [1.5, 1.0],
    [2.5, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
    [2.0, 0.0],
    [3.0, 0.0],
    [0.5, -1.0],
    [1.5, -1.0],
    [2.5, -1.0],
];

pub fn hex_plus_two_with_positions() -> Result<(TriMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = hex_plus_two()?;
    let p = add_positions(&mut m, &HEX_POSITIONS[..9])?;
    Ok((m, p))
}

/// ```text
///     0---1---2
///    / \ / \ / \
///   3---4---5---6
///    \ / \ / \ /
///     7---8---9
/// ```
pub fn edge_region() -> Result<TriMesh, MeshError> {
    TriMesh::from_faces(&[
        [3, 4, 0],
        [4, 1, 0],
        [4, 5, 1],
        [5, 2, 1],
        [5, 6, 2],
        [3, 7, 4],
        [7, 8, 4],
        [4, 8, 5],
        [8, 9, 5],
        [5, 9, 6],
    ])
}

pub fn edge_region_with_positions() -> Result<(TriMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = edge_region()?;
    let p = add_positions(&mut m, &HEX_POSITIONS)?;
    Ok((m, p))
}

/// `face_count` triangles sharing no vertex; face `i` has vertices
/// `3i, 3i + 1, 3i + 2`.
pub fn free_tri_mesh(face_count: usize) -> Result<TriMesh, MeshError> {
    let faces: Vec<[i64; 3]> = (0..face_count as i64)
        .map(|f| [3 * f, 3 * f + 1, 3 * f + 2])
        .collect();
    TriMesh::from_faces(&faces)
}

/// Regular `nx` by `ny` grid of unit squares, two triangles each, with
/// positions. Vertex `(i, j)` has id `j * (nx + 1) + i`.
pub fn tri_grid(nx: usize, ny: usize) -> Result<(TriMesh, TypedAttributeHandle<f64>), MeshError> {
    let w = nx as i64 + 1;
    let v = |i: usize, j: usize| j as i64 * w + i as i64;
    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            faces.push([v(i, j), v(i + 1, j), v(i + 1, j + 1)]);
            faces.push([v(i, j), v(i + 1, j + 1), v(i, j + 1)]);
        }
    }
    let mut m = TriMesh::from_faces_with_vertex_count((nx + 1) * (ny + 1), &faces)?;
    let coords: Vec<[f64; 2]> = (0..=ny)
        .flat_map(|j| (0..=nx).map(move |i| [i as f64, j as f64]))
        .collect();
    let p = add_positions(&mut m, &coords)?;
    Ok((m, p))
}

// ---------------------------------------------------------------------------
// tetrahedra
// ---------------------------------------------------------------------------

pub fn single_tet() -> Result<TetMesh, MeshError> {
    TetMesh::from_tets(&[[0, 1, 2, 3]])
}

const TET_POSITIONS: [[f64; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];

pub fn single_tet_with_positions() -> Result<(TetMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = single_tet()?;
    let p = add_positions(&mut m, &TET_POSITIONS[..4])?;
    Ok((m, p))
}

/// Two tets glued along face `(1, 2, 3)`.
pub fn two_tets() -> Result<TetMesh, MeshError> {
    TetMesh::from_tets(&[[0, 1, 2, 3], [1, 2, 3, 4]])
}

pub fn two_tets_with_positions() -> Result<(TetMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = two_tets()?;
    let p = add_positions(&mut m, &TET_POSITIONS)?;
    Ok((m, p))
}

/// `n` tets around the interior edge `(0, 1)`; vertices `2..n + 2` form the
/// ring.
pub fn tet_ring(n: i64) -> Result<TetMesh, MeshError> {
    let tets: Vec<[i64; 4]> = (0..n).map(|i| [0, 1, 2 + i, 2 + (i + 1) % n]).collect();
    TetMesh::from_tets(&tets)
}

/// Six tets around the interior edge `(0, 1)`; vertices `2..8` form the
/// ring in the plane `z = 0`.
pub fn six_tet_ring() -> Result<TetMesh, MeshError> {
    tet_ring(6)
}

pub fn six_tet_ring_with_positions() -> Result<(TetMesh, TypedAttributeHandle<f64>), MeshError> {
    let mut m = six_tet_ring()?;
    let mut coords = vec![[0.0, 0.0, -1.0], [0.0, 0.0, 1.0]];
    coords.extend((0..6).map(|i| {
        let angle = std::f64::consts::FRAC_PI_3 * i as f64;
        [angle.cos(), angle.sin(), 0.0]
    }));
    let p = add_positions(&mut m, &coords)?;
    Ok((m, p))
}

/// Regular grid of `n^3` unit cubes, six tets per cube around the cube
/// diagonal, with positions.
pub fn tet_grid(n: usize) -> Result<(TetMesh, TypedAttributeHandle<f64>), MeshError> {
    let w = n as i64 + 1;
    let v = |c: [i64; 3]| (c[2] * w + c[1]) * w + c[0];
    // axis orders of the six tets and their parity
    const ORDERS: [([usize; 3], bool); 6] = [
        ([0, 1, 2], true),
        ([1, 2, 0], true),
        ([2, 0, 1], true),
        ([0, 2, 1], false),
        ([1, 0, 2], false),
        ([2, 1, 0], false),
    ];
    let mut tets = Vec::with_capacity(6 * n * n * n);
    for k in 0..n as i64 {
        for j in 0..n as i64 {
            for i in 0..n as i64 {
                for (order, even) in ORDERS {
                    let mut c = [i, j, k];
                    let mut path = [v(c); 4];
                    for (step, &axis) in order.iter().enumerate() {
                        c[axis] += 1;
                        path[step + 1] = v(c);
                    }
                    if !even {
                        path.swap(2, 3);
                    }
                    tets.push(path);
                }
            }
        }
    }
    let count = (w * w * w) as usize;
    let mut m = TetMesh::from_tets_with_vertex_count(count, &tets)?;
    let coords: Vec<[f64; 3]> = (0..w)
        .flat_map(|k| (0..w).flat_map(move |j| (0..w).map(move |i| [i as f64, j as f64, k as f64])))
        .collect();
    let p = add_positions(&mut m, &coords)?;
    Ok((m, p))
}

// ---------------------------------------------------------------------------
// edges
// ---------------------------------------------------------------------------

pub fn single_line() -> Result<EdgeMesh, MeshError> {
    EdgeMesh::from_edges(&[[0, 1]])
}

pub fn two_segments() -> Result<EdgeMesh, MeshError> {
    EdgeMesh::from_edges(&[[0, 1], [1, 2]])
}

/// Open polyline through `count + 1` vertices.
pub fn multiple_lines(count: usize) -> Result<EdgeMesh, MeshError> {
    let edges: Vec<[i64; 2]> = (0..count as i64).map(|i| [i, i + 1]).collect();
    EdgeMesh::from_edges(&edges)
}

/// Closed loop `0 - 1 - ... - 5 - 0`.
pub fn loop_lines() -> Result<EdgeMesh, MeshError> {
    EdgeMesh::from_edges(&[[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 0]])
}

/// Two edges between the same two vertices.
pub fn two_line_loop() -> Result<EdgeMesh, MeshError> {
    EdgeMesh::from_edges(&[[0, 1], [1, 0]])
}

pub fn self_loop() -> Result<EdgeMesh, MeshError> {
    EdgeMesh::from_edges(&[[0, 0]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{orient, Orientation, OrientationMode};

    fn all_positive<M: Mesh>(m: &M, p: TypedAttributeHandle<f64>) -> bool {
        let top = m.top_simplex_type();
        let acc = m.create_const_accessor(p);
        m.core().active_ids(top).into_iter().all(|c| {
            let coords: Vec<&[f64]> = m
                .core()
                .cell_vertices(c)
                .iter()
                .map(|&v| acc.vector_by_id(v))
                .collect();
            orient(&coords, OrientationMode::Exact) == Some(Orientation::Positive)
        })
    }

    #[test]
    fn triangle_fixtures_are_valid() {
        for (m, v, f) in [
            (single_triangle().unwrap(), 3, 1),
            (one_ear().unwrap(), 4, 2),
            (two_neighbors().unwrap(), 5, 3),
            (three_neighbors().unwrap(), 6, 4),
            (quad().unwrap(), 4, 2),
            (hex_plus_two().unwrap(), 9, 8),
            (edge_region().unwrap(), 10, 10),
            (free_tri_mesh(3).unwrap(), 9, 3),
        ] {
            assert_eq!(m.count(PrimitiveType::Vertex), v);
            assert_eq!(m.count(PrimitiveType::Face), f);
            assert!(m.is_connectivity_valid());
        }
    }

    #[test]
    fn positioned_fixtures_are_positively_oriented() {
        let (m, p) = hex_plus_two_with_positions().unwrap();
        assert!(all_positive(&m, p));
        let (m, p) = edge_region_with_positions().unwrap();
        assert!(all_positive(&m, p));
        let (m, p) = tri_grid(3, 2).unwrap();
        assert_eq!(m.count(PrimitiveType::Face), 12);
        assert!(all_positive(&m, p));
        let (m, p) = two_tets_with_positions().unwrap();
        assert!(all_positive(&m, p));
        let (m, p) = six_tet_ring_with_positions().unwrap();
        assert!(all_positive(&m, p));
        let (m, p) = tet_grid(2).unwrap();
        assert_eq!(m.count(PrimitiveType::Tetrahedron), 48);
        assert_eq!(m.count(PrimitiveType::Vertex), 27);
        assert!(m.is_connectivity_valid());
        assert!(all_positive(&m, p));
    }

    #[test]
    fn edge_fixtures() {
        assert_eq!(loop_lines().unwrap().count(PrimitiveType::Edge), 6);
        assert_eq!(multiple_lines(4).unwrap().count(PrimitiveType::Vertex), 5);
        assert!(two_line_loop().unwrap().is_connectivity_valid());
        assert!(self_loop().unwrap().is_connectivity_valid());
    }
}
