//! Full-screen background quad in clip space.

use crate::attribute::{MeshAttribute, POSITION, UV};

/// Two triangles covering clip space at `z = 0`, with texture coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadMesh {
    /// Clip-space positions, `x, y, z` per vertex.
    pub vertices: Vec<f32>,
    /// Texture coordinates, `u, v` per vertex. `v = 1` at the top edge.
    pub texcoords: Vec<f32>,
}

const QUAD_POSITIONS: [f32; 18] = [
    -1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    1.0, -1.0, 0.0,
];

const QUAD_TEXCOORDS: [f32; 12] = [
    0.0, 1.0, //
    0.0, 0.0, //
    1.0, 1.0, //
    0.0, 0.0, //
    1.0, 1.0, //
    1.0, 0.0,
];

/// Returns the fixed six-vertex background quad.
pub fn background_quad() -> QuadMesh {
    QuadMesh {
        vertices: QUAD_POSITIONS.to_vec(),
        texcoords: QUAD_TEXCOORDS.to_vec(),
    }
}

impl QuadMesh {
    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Named attribute arrays for upload.
    pub fn attributes(&self) -> [MeshAttribute<'_>; 2] {
        [
            MeshAttribute::new(POSITION, 3, &self.vertices),
            MeshAttribute::new(UV, 2, &self.texcoords),
        ]
    }
}
