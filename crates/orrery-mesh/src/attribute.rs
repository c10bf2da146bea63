//! Named flat attribute arrays handed to the renderer.

/// Attribute name for vertex positions (3 components).
pub const POSITION: &str = "position";
/// Attribute name for vertex normals (3 components).
pub const NORMAL: &str = "normal";
/// Attribute name for texture coordinates (2 components).
pub const UV: &str = "uv";

/// A borrowed, named, flat float array with a fixed component count per vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshAttribute<'a> {
    /// Attribute name the renderer binds by.
    pub name: &'static str,
    /// Floats per vertex (1..=4).
    pub components: u32,
    /// Flat data, `components` floats per vertex.
    pub data: &'a [f32],
}

impl<'a> MeshAttribute<'a> {
    /// Creates a new attribute view.
    pub fn new(name: &'static str, components: u32, data: &'a [f32]) -> Self {
        Self {
            name,
            components,
            data,
        }
    }

    /// Number of whole vertices described by `data`.
    pub fn vertex_count(&self) -> usize {
        match self.components {
            0 => 0,
            c => self.data.len() / c as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_count_divides_by_components() {
        let data = [0.0; 12];
        assert_eq!(MeshAttribute::new(POSITION, 3, &data).vertex_count(), 4);
        assert_eq!(MeshAttribute::new(UV, 2, &data).vertex_count(), 6);
    }

    #[test]
    fn test_zero_components_has_no_vertices() {
        let data = [0.0; 3];
        assert_eq!(MeshAttribute::new("broken", 0, &data).vertex_count(), 0);
    }
}
