//! UV-sphere generation as an unindexed, flat-shaded triangle soup.
//!
//! The sphere is swept from the north pole (+Y) to the south pole in `split`
//! latitude bands. Each band is triangulated against the ring above it, two
//! triangles per longitude step:
//!
//! ```text
//!   prev[i] ---- prev[i+1]        A: prev[i], cur[i],   prev[i+1]
//!     |  A    /    |              B: cur[i],  cur[i+1], prev[i+1]
//!     |    /   B   |
//!   cur[i] ----- cur[i+1]
//! ```
//!
//! Both caps reuse the band routine against a ring of `split` coincident pole
//! points, so one triangle per quad at each cap has zero area.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::attribute::{MeshAttribute, NORMAL, POSITION, UV};
use crate::error::MeshError;
use crate::triangle::Triangle;
use crate::vertex_format::SphereVertex;

/// Smallest accepted longitude/latitude split count.
pub const MIN_SPLIT: u32 = 3;

/// Largest vertex count a generated mesh may have. Draw ranges and indices are `u32`.
pub const MAX_VERTICES: u64 = u32::MAX as u64;

/// Largest split [`generate`] accepts: `6 * split^2` must stay within [`MAX_VERTICES`].
pub const MAX_SPLIT: u32 = 26_754;

/// Flat vertex, normal and texture-coordinate buffers of a generated sphere.
///
/// Every three consecutive vertices form one triangle; there is no index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SphereMesh {
    /// Positions, `x, y, z` per vertex.
    pub vertices: Vec<f32>,
    /// Unit normals, `x, y, z` per vertex, constant across each triangle.
    pub normals: Vec<f32>,
    /// Texture coordinates, `u, v` per vertex.
    pub texcoords: Vec<f32>,
}

/// Generates a UV-sphere with `split` longitude and latitude divisions.
///
/// # Errors
///
/// Returns [`MeshError::InvalidArgument`] when `split < 3`, when the mesh would
/// exceed [`MAX_VERTICES`] vertices, or when `radius` is not a positive finite
/// number.
///
/// # Examples
///
/// ```
/// let mesh = orrery_mesh::generate(4, 1.0).unwrap();
/// assert_eq!(mesh.triangle_count(), 32);
/// assert_eq!(mesh.vertices.len(), mesh.normals.len());
/// ```
pub fn generate(split: u32, radius: f32) -> Result<SphereMesh, MeshError> {
    let triangles = triangulate(split, radius)?;
    Ok(SphereMesh::from_triangles(&triangles))
}

/// Builds the sphere as structured triangles in emission order.
///
/// # Errors
///
/// Same argument checks as [`generate`].
pub fn triangulate(split: u32, radius: f32) -> Result<Vec<Triangle>, MeshError> {
    validate_arguments(split, radius)?;
    let vertex_count = check_vertex_budget(split, soup_vertex_count(split))?;

    let n = split as usize;
    let step = 1.0 / split as f32;
    let mut triangles = Vec::with_capacity(vertex_count / 3);

    let mut previous = vec![Vec3::new(0.0, radius, 0.0); n];
    for latitude in 0..split - 1 {
        let current = latitude_ring(split, latitude, radius);
        let v_top = 1.0 - latitude as f32 * step;
        let v_bottom = 1.0 - (latitude + 1) as f32 * step;
        emit_band(&mut triangles, &previous, &current, step, v_top, v_bottom);
        previous = current;
    }

    let south = vec![Vec3::new(0.0, -radius, 0.0); n];
    emit_band(&mut triangles, &previous, &south, step, step, 0.0);

    Ok(triangles)
}

pub(crate) fn validate_arguments(split: u32, radius: f32) -> Result<(), MeshError> {
    if split < MIN_SPLIT {
        return Err(MeshError::invalid(
            "split",
            format!("must be at least {MIN_SPLIT}, got {split}"),
        ));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::invalid(
            "radius",
            format!("must be a positive finite number, got {radius}"),
        ));
    }
    Ok(())
}

/// Vertices of the flat soup: `2 * split^2` triangles of 3 vertices.
pub(crate) fn soup_vertex_count(split: u32) -> Option<u64> {
    let split = u64::from(split);
    split.checked_mul(split)?.checked_mul(6)
}

/// Accepts `vertices` if it fits [`MAX_VERTICES`] and its flat float
/// buffers (3 floats per vertex) are addressable.
pub(crate) fn check_vertex_budget(split: u32, vertices: Option<u64>) -> Result<usize, MeshError> {
    vertices
        .filter(|&count| count <= MAX_VERTICES)
        .and_then(|count| usize::try_from(count).ok())
        .filter(|count| count.checked_mul(3).is_some())
        .ok_or_else(|| {
            MeshError::invalid(
                "split",
                format!("{split} produces more than {MAX_VERTICES} vertices"),
            )
        })
}

/// Points of the ring below band `latitude`, longitude step 0 at angle 0.
pub(crate) fn latitude_ring(split: u32, latitude: u32, radius: f32) -> Vec<Vec3> {
    let theta = PI * ((latitude + 1) as f32 / split as f32);
    let y = theta.cos() * radius;
    let xz = theta.sin() * radius;

    (0..split)
        .map(|longitude| {
            let phi = TAU * (longitude as f32 / split as f32);
            Vec3::new(xz * phi.cos(), y, xz * phi.sin())
        })
        .collect()
}

/// Emits the two triangles of every quad between `previous` and `current`.
///
/// The last quad closes the ring back to index 0 but keeps its texture
/// coordinates at `u = 1 - step ..= 1` so the seam never samples across the
/// texture's left edge.
fn emit_band(
    out: &mut Vec<Triangle>,
    previous: &[Vec3],
    current: &[Vec3],
    step: f32,
    v_top: f32,
    v_bottom: f32,
) {
    let n = previous.len();
    for i in 0..n {
        let next = (i + 1) % n;
        let (u0, u1) = if next == 0 {
            (1.0 - step, 1.0)
        } else {
            (step * i as f32, step * (i + 1) as f32)
        };

        out.push(Triangle::new(
            [previous[i], current[i], previous[next]],
            [
                Vec2::new(u0, v_top),
                Vec2::new(u0, v_bottom),
                Vec2::new(u1, v_top),
            ],
        ));
        out.push(Triangle::new(
            [current[i], current[next], previous[next]],
            [
                Vec2::new(u0, v_bottom),
                Vec2::new(u1, v_bottom),
                Vec2::new(u1, v_top),
            ],
        ));
    }
}

impl SphereMesh {
    /// Flattens triangles into parallel buffers, broadcasting each face normal
    /// to its three vertices.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut vertices = Vec::with_capacity(triangles.len() * 9);
        let mut normals = Vec::with_capacity(triangles.len() * 9);
        let mut texcoords = Vec::with_capacity(triangles.len() * 6);

        for triangle in triangles {
            let normal = triangle.normal().to_array();
            for (position, uv) in triangle.positions.iter().zip(&triangle.uvs) {
                vertices.extend_from_slice(&position.to_array());
                normals.extend_from_slice(&normal);
                texcoords.extend_from_slice(&uv.to_array());
            }
        }

        Self {
            vertices,
            normals,
            texcoords,
        }
    }

    /// Number of vertices (draw count for an unindexed triangle list).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of emitted triangles, including zero-area cap triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Returns `true` when the mesh holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The name -> flat array mapping consumed by attribute-buffer uploads.
    pub fn attributes(&self) -> [MeshAttribute<'_>; 3] {
        [
            MeshAttribute::new(POSITION, 3, &self.vertices),
            MeshAttribute::new(NORMAL, 3, &self.normals),
            MeshAttribute::new(UV, 2, &self.texcoords),
        ]
    }

    /// Interleaves the three buffers into one vertex array.
    pub fn to_interleaved(&self) -> Vec<SphereVertex> {
        self.vertices
            .chunks_exact(3)
            .zip(self.normals.chunks_exact(3))
            .zip(self.texcoords.chunks_exact(2))
            .map(|((p, n), t)| SphereVertex {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
                uv: [t[0], t[1]],
            })
            .collect()
    }
}
