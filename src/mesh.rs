//! Parametric heart mesh generation
//!
//! The surface is sampled on a `(u, v)` grid with `u` in `[0, 2π]` and `v` in
//! `[0, π]`. Both ends are inclusive, so the column at `u = 2π` duplicates the
//! column at `u = 0` and the mesh closes visually without wrapping indices.

use crate::math::{face_normal, normalize};
use std::f64::consts::PI;

/// Default number of divisions in the u-direction
pub const U_STEPS: u32 = 64;
/// Default number of divisions in the v-direction
pub const V_STEPS: u32 = 32;
/// Upper bound on the distance of any surface point from the Y-axis, so the
/// heart stays inside this radius at every yaw
pub const HEART_RADIUS: f64 = 20.0;

/// Indexed triangle mesh with smooth per-vertex normals
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f64; 3]>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
    pub normals: Vec<[f64; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates over triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Axis-aligned bounding box as `(min, max)`
    pub fn bounds(&self) -> ([f64; 3], [f64; 3]) {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for position in &self.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }
        (min, max)
    }
}

/// Point on the heart surface for parameters `u` and `v`
pub fn heart_point(u: f64, v: f64) -> [f64; 3] {
    let x = v.sin() * (15.0 * u.sin() - 4.0 * (3.0 * u).sin());
    let y = v.sin()
        * (15.0 * u.cos() - 5.0 * (2.0 * u).cos() - 2.0 * (3.0 * u).cos() - (2.0 * u).cos());
    let z = 8.0 * v.cos();
    [x, y, z]
}

/// Generates the heart mesh at the default resolution
pub fn generate_heart_mesh() -> Mesh {
    generate_heart_mesh_with(U_STEPS, V_STEPS)
}

/// Generates the heart mesh with `(u_steps + 1) × (v_steps + 1)` vertices
/// and `2 × u_steps × v_steps` triangles.
pub fn generate_heart_mesh_with(u_steps: u32, v_steps: u32) -> Mesh {
    let u_step_size = 2.0 * PI / u_steps as f64;
    let v_step_size = PI / v_steps as f64;
    let row = u_steps + 1;

    let mut positions = Vec::with_capacity((row * (v_steps + 1)) as usize);
    for vi in 0..=v_steps {
        let v = vi as f64 * v_step_size;
        for ui in 0..=u_steps {
            let u = ui as f64 * u_step_size;
            positions.push(heart_point(u, v));
        }
    }

    // Two triangles per grid cell
    let mut indices = Vec::with_capacity((u_steps * v_steps * 6) as usize);
    for vi in 0..v_steps {
        for ui in 0..u_steps {
            let current = vi * row + ui;
            let next = current + row;

            indices.extend_from_slice(&[current, current + 1, next]);
            indices.extend_from_slice(&[next, current + 1, next + 1]);
        }
    }

    let normals = compute_vertex_normals(&positions, &indices);

    Mesh {
        positions,
        indices,
        normals,
    }
}

/// Smooth vertex normals: area-weighted sum of incident face normals,
/// normalized. Degenerate faces add nothing.
pub fn compute_vertex_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![[0.0; 3]; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let normal = face_normal(&positions[a], &positions[b], &positions[c]);
        for &index in &[a, b, c] {
            normals[index][0] += normal[0];
            normals[index][1] += normal[1];
            normals[index][2] += normal[2];
        }
    }
    normals.iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::length;

    const EPSILON: f64 = 1e-9;

    fn vertex(mesh: &Mesh, vi: u32, ui: u32) -> [f64; 3] {
        mesh.positions[(vi * (U_STEPS + 1) + ui) as usize]
    }

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for axis in 0..3 {
            assert!((a[axis] - b[axis]).abs() < EPSILON, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_heart_counts() {
        let mesh = generate_heart_mesh();
        assert_eq!(mesh.vertex_count(), 2145);
        assert_eq!(mesh.normals.len(), 2145);
        assert_eq!(mesh.triangle_count(), 4096);
        assert_eq!(mesh.indices.len(), 12288);
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = generate_heart_mesh();
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_first_cell_triangles() {
        let mesh = generate_heart_mesh();
        assert_eq!(&mesh.indices[0..6], &[0, 1, 65, 65, 1, 66]);
    }

    #[test]
    fn test_poles_collapse() {
        let mesh = generate_heart_mesh();
        for ui in 0..=U_STEPS {
            assert_close(vertex(&mesh, 0, ui), [0.0, 0.0, 8.0]);
            assert_close(vertex(&mesh, V_STEPS, ui), [0.0, 0.0, -8.0]);
        }
    }

    #[test]
    fn test_seam_columns_match() {
        let mesh = generate_heart_mesh();
        for vi in 0..=V_STEPS {
            assert_close(vertex(&mesh, vi, 0), vertex(&mesh, vi, U_STEPS));
        }
    }

    #[test]
    fn test_equator_point() {
        // u = 0, v = π/2: x = 0, y = 15 - 5 - 2 - 1
        let mesh = generate_heart_mesh();
        assert_close(vertex(&mesh, V_STEPS / 2, 0), [0.0, 7.0, 0.0]);
    }

    #[test]
    fn test_normals_normalized() {
        // Pole vertices may only touch degenerate faces, so check the interior rows
        let mesh = generate_heart_mesh();
        let row = (U_STEPS + 1) as usize;
        for normal in &mesh.normals[row..mesh.vertex_count() - row] {
            let len = length(normal);
            assert!((len - 1.0).abs() < 1e-6, "Normal not normalized: {}", len);
        }
    }

    #[test]
    fn test_bounds() {
        let (min, max) = generate_heart_mesh().bounds();
        assert!((max[2] - 8.0).abs() < EPSILON);
        assert!((min[2] + 8.0).abs() < EPSILON);
        assert!(min[1] < -18.0 && max[1] > 6.0);
        assert!((min[0] + max[0]).abs() < 1e-6, "heart should be symmetric in x");
    }

    #[test]
    fn test_within_radius_at_any_yaw() {
        for mesh in [generate_heart_mesh(), generate_heart_mesh_with(512, 512)] {
            for p in &mesh.positions {
                assert!((p[0] * p[0] + p[2] * p[2]).sqrt() <= HEART_RADIUS, "{:?}", p);
            }
        }
    }

    #[test]
    fn test_custom_resolution() {
        let mesh = generate_heart_mesh_with(8, 4);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        assert_eq!(mesh.triangle_count(), 2 * 8 * 4);
    }

    #[test]
    fn test_degenerate_faces_contribute_nothing() {
        let positions = [[0.0; 3], [0.0; 3], [0.0; 3], [1.0, 0.0, 0.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|n| *n == [0.0; 3]));
    }
}
