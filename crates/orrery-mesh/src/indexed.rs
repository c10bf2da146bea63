//! Indexed, smooth-shaded UV-sphere.
//!
//! Shares ring vertices between neighbouring triangles and uses radial
//! normals. The longitude seam is duplicated (`split + 1` columns per ring)
//! so `u` runs from 0 to 1 without wrapping, and each pole gets one vertex
//! per longitude step so the cap triangles can carry distinct `u` values.
//! Cap triangles here have non-zero area; the flat soup's zero-area cap
//! triangles have no counterpart.

use glam::{Vec2, Vec3};

use crate::error::MeshError;
use crate::sphere::{check_vertex_budget, validate_arguments};
use crate::triangle::Triangle;
use crate::vertex_format::SphereVertex;

/// Shared vertices plus a triangle-list index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedSphere {
    /// Interleaved vertices.
    pub vertices: Vec<SphereVertex>,
    /// Triangle list, three indices per triangle, same winding as the flat soup.
    pub indices: Vec<u32>,
}

impl IndexedSphere {
    /// Number of triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Resolves one indexed triangle to its positions and texture coordinates.
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let ids = self.indices.get(index * 3..index * 3 + 3)?;
        let mut positions = [Vec3::ZERO; 3];
        let mut uvs = [Vec2::ZERO; 3];
        for (k, &id) in ids.iter().enumerate() {
            let v = self.vertices.get(id as usize)?;
            positions[k] = Vec3::from_array(v.position);
            uvs[k] = Vec2::from_array(v.uv);
        }
        Some(Triangle::new(positions, uvs))
    }
}

/// Generates an indexed UV-sphere with `split` longitude and latitude divisions.
///
/// # Errors
///
/// Same argument checks as [`crate::generate`].
pub fn generate_indexed(split: u32, radius: f32) -> Result<IndexedSphere, MeshError> {
    validate_arguments(split, radius)?;
    let vertex_count = check_vertex_budget(split, indexed_vertex_count(split))?;

    let n = split as usize;
    let step = 1.0 / split as f32;
    let columns = split + 1;
    let rings = split - 1;

    let mut vertices = Vec::with_capacity(vertex_count);

    for latitude in 1..split {
        let theta = std::f32::consts::PI * (latitude as f32 / split as f32);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let v = 1.0 - latitude as f32 * step;
        for column in 0..columns {
            // column == split lands back on phi = 2pi; reuse phi = 0 exactly
            let phi = std::f32::consts::TAU * ((column % split) as f32 / split as f32);
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            vertices.push(SphereVertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [column as f32 * step, v],
            });
        }
    }

    let north_base = vertices.len() as u32;
    for column in 0..split {
        vertices.push(SphereVertex {
            position: [0.0, radius, 0.0],
            normal: [0.0, 1.0, 0.0],
            uv: [(column as f32 + 0.5) * step, 1.0],
        });
    }
    let south_base = vertices.len() as u32;
    for column in 0..split {
        vertices.push(SphereVertex {
            position: [0.0, -radius, 0.0],
            normal: [0.0, -1.0, 0.0],
            uv: [(column as f32 + 0.5) * step, 0.0],
        });
    }

    let ring = |r: u32, c: u32| r * columns + c;
    let mut indices = Vec::with_capacity(6 * n * (n - 1));

    for c in 0..split {
        indices.extend_from_slice(&[ring(0, c), ring(0, c + 1), north_base + c]);
    }
    for r in 0..rings - 1 {
        for c in 0..split {
            let (top, top_next) = (ring(r, c), ring(r, c + 1));
            let (bottom, bottom_next) = (ring(r + 1, c), ring(r + 1, c + 1));
            indices.extend_from_slice(&[top, bottom, top_next]);
            indices.extend_from_slice(&[bottom, bottom_next, top_next]);
        }
    }
    let last = rings - 1;
    for c in 0..split {
        indices.extend_from_slice(&[ring(last, c), south_base + c, ring(last, c + 1)]);
    }

    Ok(IndexedSphere { vertices, indices })
}

/// `(split - 1)` rings of `split + 1` columns plus `split` vertices per pole.
fn indexed_vertex_count(split: u32) -> Option<u64> {
    let split = u64::from(split);
    (split - 1).checked_mul(split + 1)?.checked_add(2 * split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_split_beyond_index_range() {
        for split in [70_000, u32::MAX] {
            let err = generate_indexed(split, 1.0).unwrap_err();
            assert!(
                matches!(err, MeshError::InvalidArgument { name: "split", .. }),
                "split {split}"
            );
        }
        // 65536^2 + 2 * 65536 - 1 exceeds u32, one less fits
        assert_eq!(indexed_vertex_count(65_535), Some(4_294_967_294));
        assert_eq!(indexed_vertex_count(65_536), Some(4_295_098_367));
    }

    #[test]
    fn test_counts() {
        for split in [3u32, 4, 10, 50] {
            let sphere = generate_indexed(split, 1.0).unwrap();
            let s = split as usize;
            assert_eq!(sphere.vertices.len(), (s - 1) * (s + 1) + 2 * s);
            assert_eq!(sphere.triangle_count(), 2 * s * (s - 1));
        }
    }

    #[test]
    fn test_indices_in_range() {
        let sphere = generate_indexed(9, 2.0).unwrap();
        let len = sphere.vertices.len() as u32;
        assert!(sphere.indices.iter().all(|&i| i < len));
    }

    #[test]
    fn test_vertices_on_sphere_with_radial_normals() {
        let radius = 5.0;
        let sphere = generate_indexed(16, radius).unwrap();
        for v in &sphere.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((p.length() - radius).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((p / radius - n).length() < 1e-5);
        }
    }

    #[test]
    fn test_every_triangle_faces_outward() {
        let sphere = generate_indexed(12, 1.0).unwrap();
        for i in 0..sphere.triangle_count() {
            let tri = sphere.triangle(i).unwrap();
            assert!(!tri.is_degenerate(), "triangle {i} has zero area");
            assert!(
                tri.normal().dot(tri.centroid()) > 0.0,
                "triangle {i} faces inward"
            );
        }
    }

    #[test]
    fn test_seam_column_duplicates_position_with_u_one() {
        let split = 6u32;
        let sphere = generate_indexed(split, 1.0).unwrap();
        let columns = (split + 1) as usize;
        for r in 0..(split - 1) as usize {
            let first = sphere.vertices[r * columns];
            let seam = sphere.vertices[r * columns + split as usize];
            assert_eq!(first.position, seam.position);
            assert_eq!(first.uv[0], 0.0);
            assert_eq!(seam.uv[0], 1.0);
        }
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        assert!(generate_indexed(2, 1.0).is_err());
        assert!(generate_indexed(8, -3.0).is_err());
    }

    #[test]
    fn test_triangle_out_of_range_is_none() {
        let sphere = generate_indexed(3, 1.0).unwrap();
        assert!(sphere.triangle(sphere.triangle_count()).is_none());
    }
}
