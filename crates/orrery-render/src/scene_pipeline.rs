//! Render pipelines for the three scene parts: background, sun, and earth.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use orrery_mesh::attribute::{NORMAL, POSITION, UV};
use std::sync::Arc;

use crate::buffer::{AttributeBuffers, AttributeLayout, BufferError};
use crate::depth::DepthBuffer;
use crate::shader::{EntryPoints, ShaderError, ShaderLibrary, ShaderProgram};
use crate::texture::SceneTexture;

pub const BACKGROUND_SHADER_SOURCE: &str = include_str!("shaders/background.wgsl");
pub const SUN_SHADER_SOURCE: &str = include_str!("shaders/sun.wgsl");
pub const EARTH_SHADER_SOURCE: &str = include_str!("shaders/earth.wgsl");

/// Per-draw transforms. `normal` holds `transpose(inverse(model))`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal: normal_matrix(model).to_cols_array_2d(),
        }
    }
}

/// Inverse-transpose of the model's upper 3x3, widened back to a 4x4.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose())
}

/// Point light parameters for the lit pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub color: [f32; 3],
    pub ambient_strength: f32,
    pub sun_position: [f32; 3],
    pub _pad: f32,
}

impl LightUniform {
    pub fn new(color: Vec3, ambient_strength: f32, sun_position: Vec3) -> Self {
        Self {
            color: color.to_array(),
            ambient_strength,
            sun_position: sun_position.to_array(),
            _pad: 0.0,
        }
    }
}

impl Default for LightUniform {
    /// White light at the origin with 10% ambient.
    fn default() -> Self {
        Self::new(Vec3::ONE, 0.1, Vec3::ZERO)
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<TransformUniform>(), 256);
static_assertions::const_assert_eq!(std::mem::size_of::<LightUniform>(), 32);

/// Which scene part a pipeline draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    /// Clip-space quad, depth test disabled.
    Background,
    /// Unlit textured sphere.
    Sun,
    /// Lit textured sphere.
    Earth,
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [SceneKind::Background, SceneKind::Sun, SceneKind::Earth];

    pub fn shader_name(self) -> &'static str {
        match self {
            SceneKind::Background => "background",
            SceneKind::Sun => "sun",
            SceneKind::Earth => "earth",
        }
    }

    pub fn shader_source(self) -> &'static str {
        match self {
            SceneKind::Background => BACKGROUND_SHADER_SOURCE,
            SceneKind::Sun => SUN_SHADER_SOURCE,
            SceneKind::Earth => EARTH_SHADER_SOURCE,
        }
    }

    /// Vertex attributes in shader location order.
    pub fn attribute_layout(self) -> AttributeLayout {
        match self {
            SceneKind::Background | SceneKind::Sun => {
                AttributeLayout::new(&[(POSITION, 3), (UV, 2)])
            }
            SceneKind::Earth => AttributeLayout::new(&[(POSITION, 3), (NORMAL, 3), (UV, 2)]),
        }
    }

    pub fn uses_transform(self) -> bool {
        !matches!(self, SceneKind::Background)
    }

    pub fn uses_light(self) -> bool {
        matches!(self, SceneKind::Earth)
    }

    fn depth_stencil_state(self) -> wgpu::DepthStencilState {
        match self {
            SceneKind::Background => DepthBuffer::disabled_depth_stencil_state(),
            SceneKind::Sun | SceneKind::Earth => DepthBuffer::depth_stencil_state(),
        }
    }

    fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            SceneKind::Background => None,
            SceneKind::Sun | SceneKind::Earth => Some(wgpu::Face::Back),
        }
    }
}

/// Fails with [`ShaderError::LinkFailed`] when the program reads a vertex
/// location the attribute layout does not provide.
fn check_vertex_inputs(
    name: &str,
    program: &ShaderProgram,
    layout: &AttributeLayout,
) -> Result<(), ShaderError> {
    let provided = layout.len() as u32;
    let missing: Vec<String> = program
        .interface
        .vertex_inputs
        .iter()
        .filter(|&&location| location >= provided)
        .map(u32::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShaderError::LinkFailed {
            name: name.to_string(),
            message: format!(
                "vertex input location(s) {} have no attribute",
                missing.join(", ")
            ),
        })
    }
}

/// One compiled scene pipeline plus the attribute layout it was built for.
pub struct ScenePipeline {
    pub kind: SceneKind,
    pub pipeline: wgpu::RenderPipeline,
    pub attributes: AttributeLayout,
    pub program: Arc<ShaderProgram>,
}

impl ScenePipeline {
    /// Bind everything for one draw and issue it.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        buffers: &AttributeBuffers,
        texture: &SceneTexture,
        uniforms: Option<&BodyUniforms>,
    ) -> Result<(), BufferError> {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &texture.bind_group, &[]);
        if let Some(uniforms) = uniforms {
            render_pass.set_bind_group(1, &uniforms.bind_group, &[]);
        }
        buffers.bind(render_pass, &self.attributes)?;
        buffers.draw(render_pass);
        Ok(())
    }
}

/// Uniform buffers and bind group (group 1) for one sphere.
pub struct BodyUniforms {
    pub transform_buffer: wgpu::Buffer,
    pub light_buffer: Option<wgpu::Buffer>,
    pub bind_group: wgpu::BindGroup,
}

impl BodyUniforms {
    /// Upload this frame's transforms.
    pub fn write_transform(&self, queue: &wgpu::Queue, transform: &TransformUniform) {
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::bytes_of(transform));
    }

    /// Upload light parameters. No-op for unlit bodies.
    pub fn write_light(&self, queue: &wgpu::Queue, light: &LightUniform) {
        if let Some(buffer) = &self.light_buffer {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(light));
        }
    }
}

/// The background, sun, and earth pipelines with their uniform layouts.
pub struct ScenePipelines {
    pub background: ScenePipeline,
    pub sun: ScenePipeline,
    pub earth: ScenePipeline,
    unlit_uniform_layout: wgpu::BindGroupLayout,
    lit_uniform_layout: wgpu::BindGroupLayout,
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

impl ScenePipelines {
    /// Compile the three scene programs and build their pipelines.
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        surface_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, ShaderError> {
        let transform_entry = || {
            uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                std::mem::size_of::<TransformUniform>(),
            )
        };
        let unlit_uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("unlit-uniform-bgl"),
                entries: &[transform_entry()],
            });
        let lit_uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit-uniform-bgl"),
            entries: &[
                transform_entry(),
                uniform_entry(
                    1,
                    wgpu::ShaderStages::FRAGMENT,
                    std::mem::size_of::<LightUniform>(),
                ),
            ],
        });

        let build =
            |shaders: &mut ShaderLibrary, kind: SceneKind| -> Result<ScenePipeline, ShaderError> {
                let uniform_layout = match kind {
                    SceneKind::Background => None,
                    SceneKind::Sun => Some(&unlit_uniform_layout),
                    SceneKind::Earth => Some(&lit_uniform_layout),
                };
                build_pipeline(
                    device,
                    shaders,
                    kind,
                    surface_format,
                    texture_layout,
                    uniform_layout,
                )
            };

        let background = build(shaders, SceneKind::Background)?;
        let sun = build(shaders, SceneKind::Sun)?;
        let earth = build(shaders, SceneKind::Earth)?;

        Ok(Self {
            background,
            sun,
            earth,
            unlit_uniform_layout,
            lit_uniform_layout,
        })
    }

    pub fn get(&self, kind: SceneKind) -> &ScenePipeline {
        match kind {
            SceneKind::Background => &self.background,
            SceneKind::Sun => &self.sun,
            SceneKind::Earth => &self.earth,
        }
    }

    /// Create uniform buffers for a sphere drawn with `kind`'s pipeline.
    ///
    /// Returns `None` for the background, which has no transforms.
    pub fn create_body_uniforms(
        &self,
        device: &wgpu::Device,
        kind: SceneKind,
    ) -> Option<BodyUniforms> {
        use wgpu::util::DeviceExt;

        if !kind.uses_transform() {
            return None;
        }
        let label = kind.shader_name();
        let identity = TransformUniform::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-transform")),
            contents: bytemuck::bytes_of(&identity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = kind.uses_light().then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-light")),
                contents: bytemuck::bytes_of(&LightUniform::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: transform_buffer.as_entire_binding(),
        }];
        if let Some(light) = &light_buffer {
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: light.as_entire_binding(),
            });
        }
        let layout = if kind.uses_light() {
            &self.lit_uniform_layout
        } else {
            &self.unlit_uniform_layout
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-uniforms")),
            layout,
            entries: &entries,
        });

        Some(BodyUniforms {
            transform_buffer,
            light_buffer,
            bind_group,
        })
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    shaders: &mut ShaderLibrary,
    kind: SceneKind,
    surface_format: wgpu::TextureFormat,
    texture_layout: &wgpu::BindGroupLayout,
    uniform_layout: Option<&wgpu::BindGroupLayout>,
) -> Result<ScenePipeline, ShaderError> {
    let name = kind.shader_name();
    let program = shaders.compile(device, name, kind.shader_source(), EntryPoints::default())?;
    let attributes = kind.attribute_layout();
    check_vertex_inputs(name, &program, &attributes)?;

    let mut bind_group_layouts = vec![texture_layout];
    bind_group_layouts.extend(uniform_layout);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{name}-pipeline-layout")),
        bind_group_layouts: &bind_group_layouts,
        immediate_size: 0,
    });

    let vertex_buffers = attributes.buffer_layouts();
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name}-pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &program.module,
            entry_point: Some(program.entry_points.vertex),
            buffers: &vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // sphere triangles are emitted clockwise seen from outside
            front_face: wgpu::FrontFace::Cw,
            cull_mode: kind.cull_mode(),
            ..Default::default()
        },
        depth_stencil: Some(kind.depth_stencil_state()),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &program.module,
            entry_point: Some(program.entry_points.fragment),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    });

    log::debug!("Built {name} pipeline");

    Ok(ScenePipeline {
        kind,
        pipeline,
        attributes,
        program,
    })
}
