//! Per-attribute vertex buffers for GPU rendering.
//!
//! Meshes hand over a name -> flat `f32` array mapping. Each named array is
//! uploaded into its own vertex buffer, and a pipeline's [`AttributeLayout`]
//! decides which slot and shader location each name binds to.

use orrery_mesh::MeshAttribute;
use wgpu::util::DeviceExt;

/// Errors raised while uploading or binding attribute buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("no vertex attributes supplied")]
    Empty,

    #[error("attribute '{name}' has {components} components, expected 1..=4")]
    InvalidComponents { name: String, components: u32 },

    #[error("attribute '{name}' has {len} floats, not a multiple of {components}")]
    RaggedData {
        name: String,
        len: usize,
        components: u32,
    },

    #[error("attribute '{name}' describes {found} vertices, expected {expected}")]
    VertexCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("attribute '{name}' supplied more than once")]
    DuplicateAttribute { name: String },

    #[error("attribute '{name}' required by the pipeline was not uploaded")]
    MissingAttribute { name: String },

    #[error("attribute '{name}' has {found} components, pipeline expects {expected}")]
    ComponentMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
}

/// Checks a set of named arrays and returns their common vertex count.
pub fn validate_attributes(attributes: &[MeshAttribute<'_>]) -> Result<usize, BufferError> {
    let expected = attributes.first().ok_or(BufferError::Empty)?.vertex_count();

    for (i, attr) in attributes.iter().enumerate() {
        if !(1..=4).contains(&attr.components) {
            return Err(BufferError::InvalidComponents {
                name: attr.name.to_string(),
                components: attr.components,
            });
        }
        if attr.data.len() % attr.components as usize != 0 {
            return Err(BufferError::RaggedData {
                name: attr.name.to_string(),
                len: attr.data.len(),
                components: attr.components,
            });
        }
        if attributes[..i].iter().any(|a| a.name == attr.name) {
            return Err(BufferError::DuplicateAttribute {
                name: attr.name.to_string(),
            });
        }
        let found = attr.vertex_count();
        if found != expected {
            return Err(BufferError::VertexCountMismatch {
                name: attr.name.to_string(),
                expected,
                found,
            });
        }
    }

    Ok(expected)
}

fn float_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

struct UploadedAttribute {
    name: &'static str,
    components: u32,
    buffer: wgpu::Buffer,
}

/// One GPU vertex buffer per named attribute array, all with the same vertex count.
pub struct AttributeBuffers {
    attributes: Vec<UploadedAttribute>,
    vertex_count: u32,
}

impl AttributeBuffers {
    /// Validate and upload each attribute array into its own vertex buffer.
    pub fn upload(
        device: &wgpu::Device,
        label: &str,
        attributes: &[MeshAttribute<'_>],
    ) -> Result<Self, BufferError> {
        let vertex_count = validate_attributes(attributes)?;

        let attributes = attributes
            .iter()
            .map(|attr| UploadedAttribute {
                name: attr.name,
                components: attr.components,
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}-{}", label, attr.name)),
                    contents: bytemuck::cast_slice(attr.data),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                }),
            })
            .collect();

        log::debug!("Uploaded '{}' with {} vertices", label, vertex_count);

        Ok(Self {
            attributes,
            vertex_count: vertex_count as u32,
        })
    }

    /// Number of vertices shared by every attribute.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Names of the uploaded attributes, in upload order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|a| a.name)
    }

    /// Bind each attribute the layout asks for to the layout's slot for it.
    ///
    /// Uploaded attributes the layout does not mention are left unbound.
    pub fn bind(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        layout: &AttributeLayout,
    ) -> Result<(), BufferError> {
        for (slot, wanted) in layout.slots.iter().enumerate() {
            let uploaded = self
                .attributes
                .iter()
                .find(|a| a.name == wanted.name)
                .ok_or_else(|| BufferError::MissingAttribute {
                    name: wanted.name.to_string(),
                })?;
            if uploaded.components != wanted.components {
                return Err(BufferError::ComponentMismatch {
                    name: wanted.name.to_string(),
                    expected: wanted.components,
                    found: uploaded.components,
                });
            }
            render_pass.set_vertex_buffer(slot as u32, uploaded.buffer.slice(..));
        }
        Ok(())
    }

    /// Draw every vertex as an unindexed triangle list.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSlot {
    name: &'static str,
    components: u32,
}

/// Maps attribute names to vertex buffer slots and shader locations.
///
/// Slot `i` holds the `i`-th attribute and feeds `@location(i)`.
#[derive(Debug, Clone)]
pub struct AttributeLayout {
    slots: Vec<AttributeSlot>,
    wgpu_attributes: Vec<wgpu::VertexAttribute>,
}

impl AttributeLayout {
    /// Build a layout from `(name, components)` pairs in location order.
    pub fn new(attributes: &[(&'static str, u32)]) -> Self {
        let slots = attributes
            .iter()
            .map(|&(name, components)| AttributeSlot { name, components })
            .collect::<Vec<_>>();
        let wgpu_attributes = slots
            .iter()
            .enumerate()
            .map(|(location, slot)| wgpu::VertexAttribute {
                format: float_format(slot.components),
                offset: 0,
                shader_location: location as u32,
            })
            .collect();
        Self {
            slots,
            wgpu_attributes,
        }
    }

    /// Shader location bound to `name`, if the layout uses it.
    pub fn location(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .position(|s| s.name == name)
            .map(|i| i as u32)
    }

    /// Number of vertex buffer slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the layout binds no attributes.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// One tightly packed buffer layout per slot, for pipeline creation.
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.slots
            .iter()
            .zip(&self.wgpu_attributes)
            .map(|(slot, attribute)| wgpu::VertexBufferLayout {
                array_stride: (slot.components as usize * std::mem::size_of::<f32>())
                    as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(attribute),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::test_device;
    use orrery_mesh::attribute::{NORMAL, POSITION, UV};

    #[test]
    fn test_validate_returns_shared_vertex_count() {
        let positions = [0.0; 9];
        let uvs = [0.0; 6];
        let attrs = [
            MeshAttribute::new(POSITION, 3, &positions),
            MeshAttribute::new(UV, 2, &uvs),
        ];
        assert_eq!(validate_attributes(&attrs), Ok(3));
    }

    #[test]
    fn test_validate_rejects_empty_set() {
        assert_eq!(validate_attributes(&[]), Err(BufferError::Empty));
    }

    #[test]
    fn test_validate_rejects_bad_component_count() {
        let data = [0.0; 10];
        let err = validate_attributes(&[MeshAttribute::new("wide", 5, &data)]).unwrap_err();
        assert!(matches!(err, BufferError::InvalidComponents { components: 5, .. }));
        let err = validate_attributes(&[MeshAttribute::new("none", 0, &data)]).unwrap_err();
        assert!(matches!(err, BufferError::InvalidComponents { components: 0, .. }));
    }

    #[test]
    fn test_validate_rejects_ragged_data() {
        let data = [0.0; 8];
        let err = validate_attributes(&[MeshAttribute::new(POSITION, 3, &data)]).unwrap_err();
        assert!(matches!(err, BufferError::RaggedData { len: 8, .. }));
    }

    #[test]
    fn test_validate_rejects_vertex_count_mismatch() {
        let positions = [0.0; 9];
        let normals = [0.0; 6];
        let attrs = [
            MeshAttribute::new(POSITION, 3, &positions),
            MeshAttribute::new(NORMAL, 3, &normals),
        ];
        let err = validate_attributes(&attrs).unwrap_err();
        assert_eq!(
            err,
            BufferError::VertexCountMismatch {
                name: NORMAL.to_string(),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let data = [0.0; 3];
        let attrs = [
            MeshAttribute::new(POSITION, 3, &data),
            MeshAttribute::new(POSITION, 3, &data),
        ];
        assert!(matches!(
            validate_attributes(&attrs),
            Err(BufferError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_sphere_attributes_validate() {
        let mesh = orrery_mesh::generate(8, 1.0).unwrap();
        let count = validate_attributes(&mesh.attributes());
        assert_eq!(count, Ok(mesh.vertex_count()));
    }

    #[test]
    fn test_layout_assigns_locations_in_order() {
        let layout = AttributeLayout::new(&[(POSITION, 3), (NORMAL, 3), (UV, 2)]);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.location(POSITION), Some(0));
        assert_eq!(layout.location(UV), Some(2));
        assert_eq!(layout.location("color"), None);
    }

    #[test]
    fn test_layout_buffer_strides_and_formats() {
        let layout = AttributeLayout::new(&[(POSITION, 3), (UV, 2)]);
        let buffers = layout.buffer_layouts();
        assert_eq!(buffers.len(), 2);
        let (position, uv) = (&buffers[0], &buffers[1]);
        assert_eq!(position.array_stride, 12);
        assert_eq!(position.attributes[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(uv.array_stride, 8);
        assert_eq!(uv.attributes[0].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(uv.attributes[0].shader_location, 1);
        assert_eq!(uv.attributes[0].offset, 0);
    }

    #[test]
    fn test_upload_sphere_attributes() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mesh = orrery_mesh::generate(6, 2.0).unwrap();
        let buffers = AttributeBuffers::upload(&device, "sphere", &mesh.attributes()).unwrap();
        assert_eq!(buffers.vertex_count() as usize, mesh.vertex_count());
        let names: Vec<_> = buffers.names().collect();
        assert_eq!(names, [POSITION, NORMAL, UV]);
    }

    #[test]
    fn test_upload_rejects_invalid_set_before_touching_device() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let result = AttributeBuffers::upload(&device, "empty", &[]);
        assert!(matches!(result, Err(BufferError::Empty)));
    }
}
