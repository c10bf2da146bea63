//! A single emitted triangle carried through sphere generation.

use glam::{Vec2, Vec3};

/// One triangle of the sphere soup: three positions and their texture coordinates.
///
/// The vertex order is the emission order. Flat normals are derived from the
/// triangle itself so no stride arithmetic over flattened buffers is needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex positions in emission order.
    pub positions: [Vec3; 3],
    /// Texture coordinates aligned with `positions`.
    pub uvs: [Vec2; 3],
}

impl Triangle {
    /// Creates a triangle from three positions and their texture coordinates.
    pub fn new(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self { positions, uvs }
    }

    /// Un-normalized face vector `(c - a) × (b - a)`.
    ///
    /// Sphere triangles are emitted clockwise when viewed from outside in a
    /// right-handed frame, so this operand order points away from the center.
    fn face_vector(&self) -> Vec3 {
        let [a, b, c] = self.positions;
        (c - a).cross(b - a)
    }

    /// Unit normal pointing out of the sphere.
    ///
    /// Zero-area triangles (the seeded pole rings produce one per quad at each
    /// cap) have no face direction; they get the radial direction through
    /// their centroid instead.
    pub fn normal(&self) -> Vec3 {
        self.face_vector()
            .try_normalize()
            .unwrap_or_else(|| self.centroid().normalize_or_zero())
    }

    /// Surface area.
    pub fn area(&self) -> f32 {
        self.face_vector().length() * 0.5
    }

    /// Arithmetic mean of the three positions.
    pub fn centroid(&self) -> Vec3 {
        let [a, b, c] = self.positions;
        (a + b + c) / 3.0
    }

    /// Returns `true` when the triangle has no well-defined face direction.
    pub fn is_degenerate(&self) -> bool {
        self.face_vector().try_normalize().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: Vec3, b: Vec3, c: Vec3) -> Triangle {
        Triangle::new([a, b, c], [Vec2::ZERO; 3])
    }

    #[test]
    fn test_normal_of_clockwise_triangle_points_toward_viewer() {
        // Seen from +X looking toward the origin, (0,1,0) -> (0,0,0) -> (0,1,1)
        // runs clockwise; the normal must face +X.
        let t = tri(
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let n = t.normal();
        assert!((n - Vec3::X).length() < 1e-6, "normal = {n}");
    }

    #[test]
    fn test_area_of_unit_right_triangle() {
        let t = tri(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((t.area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_vertices_are_degenerate() {
        let pole = Vec3::new(0.0, 2.0, 0.0);
        let t = tri(pole, Vec3::new(1.0, 1.0, 0.0), pole);
        assert!(t.is_degenerate());
        assert_eq!(t.area(), 0.0);
    }

    #[test]
    fn test_degenerate_normal_is_radial_unit_vector() {
        let pole = Vec3::new(0.0, 2.0, 0.0);
        let ring = Vec3::new(1.0, 1.0, 0.0);
        let t = tri(pole, ring, pole);
        let n = t.normal();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n - t.centroid().normalize()).length() < 1e-6);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let t = tri(3.0 * Vec3::X, 3.0 * Vec3::Y, 3.0 * Vec3::Z);
        assert_eq!(t.centroid(), Vec3::ONE);
    }
}
