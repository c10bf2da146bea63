//! Interleaved vertex format for single-buffer uploads of sphere meshes.
//!
//! ## Attribute Packing
//!
//! | Offset | Size | Field    |
//! |--------|------|----------|
//! | 0      | 12   | position |
//! | 12     | 12   | normal   |
//! | 24     | 8    | uv       |

use std::mem;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// One interleaved sphere vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    /// Position on the sphere surface.
    pub position: [f32; 3],
    /// Flat face normal of the owning triangle.
    pub normal: [f32; 3],
    /// Equirectangular texture coordinate.
    pub uv: [f32; 2],
}

/// Byte offset of [`SphereVertex::normal`].
pub const NORMAL_OFFSET: u64 = mem::size_of::<[f32; 3]>() as u64;
/// Byte offset of [`SphereVertex::uv`].
pub const UV_OFFSET: u64 = NORMAL_OFFSET + mem::size_of::<[f32; 3]>() as u64;

const_assert_eq!(mem::size_of::<SphereVertex>(), 32);
const_assert_eq!(UV_OFFSET, 24);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_casts_to_bytes() {
        let verts = [SphereVertex::default(); 4];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 128);
    }

    #[test]
    fn test_field_offsets() {
        let v = SphereVertex {
            position: [1.0, 2.0, 3.0],
            normal: [4.0, 5.0, 6.0],
            uv: [7.0, 8.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats[(NORMAL_OFFSET / 4) as usize], 4.0);
        assert_eq!(floats[(UV_OFFSET / 4) as usize], 7.0);
    }
}
