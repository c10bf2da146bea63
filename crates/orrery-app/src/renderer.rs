//! GPU resources for the scene and the per-frame draw sequence.

use glam::Vec3;
use orrery_config::{CameraConfig, Config};
use orrery_mesh::{MeshError, background_quad, generate};
use orrery_render::{
    AttributeBuffers, BodyUniforms, BufferError, Camera, DepthBuffer, FrameEncoder, LightUniform,
    LoadStatus, RenderContext, RenderPassBuilder, SceneKind, ScenePipelines, SceneTexture,
    ShaderError, ShaderLibrary, SurfaceError, TextureBindings, TextureLoader, TransformUniform,
};
use tracing::{debug, error, info};

use crate::scene::SceneState;

/// Failure while building the scene's GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("failed to generate {body} mesh: {source}")]
    Mesh {
        body: &'static str,
        #[source]
        source: MeshError,
    },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("{0:?} pipeline has no uniform bindings")]
    MissingUniforms(SceneKind),
}

/// Build the fixed camera from config. The aspect ratio is set on resize.
pub fn camera_from_config(config: &CameraConfig) -> Camera {
    Camera {
        eye: Vec3::from_array(config.eye),
        target: Vec3::from_array(config.target),
        up: Vec3::from_array(config.up),
        fov_y: config.fov_y_degrees.to_radians(),
        near: config.near,
        far: config.far,
        ..Camera::default()
    }
}

/// A texture that shows a black placeholder until its image finishes decoding.
struct TextureSlot {
    label: &'static str,
    loader: TextureLoader,
    texture: SceneTexture,
}

impl TextureSlot {
    fn new(
        gpu: &RenderContext,
        bindings: &TextureBindings,
        label: &'static str,
        loader: TextureLoader,
    ) -> Self {
        Self {
            label,
            loader,
            texture: bindings.placeholder(&gpu.device, &gpu.queue, label),
        }
    }

    /// Swap in the decoded image once it is available.
    fn poll(&mut self, gpu: &RenderContext, bindings: &TextureBindings) {
        match self.loader.poll() {
            LoadStatus::Ready(image) => {
                match bindings.create(&gpu.device, &gpu.queue, self.label, &image) {
                    Ok(texture) => {
                        info!(
                            "Loaded {} texture from {} ({}x{})",
                            self.label,
                            self.loader.path().display(),
                            image.width,
                            image.height
                        );
                        self.texture = texture;
                    }
                    Err(e) => error!("Failed to upload {} texture: {e}", self.label),
                }
            }
            LoadStatus::Failed(e) => {
                error!("Failed to load {} texture: {e}", self.label);
            }
            LoadStatus::Pending | LoadStatus::Consumed => {}
        }
    }
}

/// Geometry and uniforms of one drawn object.
struct Body {
    buffers: AttributeBuffers,
    uniforms: Option<BodyUniforms>,
}

/// Everything needed to draw a frame: pipelines, meshes, textures, depth.
pub struct SceneRenderer {
    pipelines: ScenePipelines,
    bindings: TextureBindings,
    depth: DepthBuffer,
    background: Body,
    sun: Body,
    earth: Body,
    background_texture: TextureSlot,
    sun_texture: TextureSlot,
    earth_texture: TextureSlot,
}

impl SceneRenderer {
    /// Start texture decoding, compile the pipelines and upload the meshes.
    pub fn new(gpu: &RenderContext, config: &Config) -> Result<Self, RendererError> {
        // Decode on worker threads while the rest is set up.
        let background_loader = TextureLoader::spawn(config.assets.background_path());
        let sun_loader = TextureLoader::spawn(config.assets.sun_path());
        let earth_loader = TextureLoader::spawn(config.assets.earth_path());

        let bindings = TextureBindings::new(&gpu.device);
        let mut shaders = ShaderLibrary::new();
        let pipelines = ScenePipelines::new(
            &gpu.device,
            &mut shaders,
            gpu.surface_format,
            &bindings.layout,
        )?;

        let (width, height) = gpu.size();
        let depth = DepthBuffer::new(&gpu.device, width, height);

        let quad = background_quad();
        let background = Body {
            buffers: AttributeBuffers::upload(&gpu.device, "background", &quad.attributes())?,
            uniforms: None,
        };

        let scene = &config.scene;
        let sun_mesh = generate(scene.sun.split, scene.sun.radius)
            .map_err(|source| RendererError::Mesh {
                body: "sun",
                source,
            })?;
        let earth_mesh = generate(scene.earth.split, scene.earth.radius)
            .map_err(|source| RendererError::Mesh {
                body: "earth",
                source,
            })?;
        debug!(
            "Generated sun ({} triangles) and earth ({} triangles)",
            sun_mesh.triangle_count(),
            earth_mesh.triangle_count()
        );

        let sun = Body {
            buffers: AttributeBuffers::upload(&gpu.device, "sun", &sun_mesh.attributes())?,
            uniforms: Some(
                pipelines
                    .create_body_uniforms(&gpu.device, SceneKind::Sun)
                    .ok_or(RendererError::MissingUniforms(SceneKind::Sun))?,
            ),
        };
        let earth = Body {
            buffers: AttributeBuffers::upload(&gpu.device, "earth", &earth_mesh.attributes())?,
            uniforms: Some(
                pipelines
                    .create_body_uniforms(&gpu.device, SceneKind::Earth)
                    .ok_or(RendererError::MissingUniforms(SceneKind::Earth))?,
            ),
        };

        let background_texture = TextureSlot::new(gpu, &bindings, "background", background_loader);
        let sun_texture = TextureSlot::new(gpu, &bindings, "sun", sun_loader);
        let earth_texture = TextureSlot::new(gpu, &bindings, "earth", earth_loader);

        info!("Scene initialized with {} shader programs", shaders.len());

        Ok(Self {
            pipelines,
            bindings,
            depth,
            background,
            sun,
            earth,
            background_texture,
            sun_texture,
            earth_texture,
        })
    }

    /// Follow the surface size. No-op when unchanged.
    pub fn resize(&mut self, gpu: &RenderContext, width: u32, height: u32) {
        self.depth.resize(&gpu.device, width, height);
    }

    /// Upload this frame's uniforms and draw background, sun and earth.
    pub fn render(
        &mut self,
        gpu: &RenderContext,
        camera: &Camera,
        scene: &SceneState,
        seconds: f32,
    ) -> Result<(), SurfaceError> {
        for slot in [
            &mut self.background_texture,
            &mut self.sun_texture,
            &mut self.earth_texture,
        ] {
            slot.poll(gpu, &self.bindings);
        }

        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        if let Some(uniforms) = &self.sun.uniforms {
            uniforms.write_transform(
                &gpu.queue,
                &TransformUniform::new(scene.sun_model(seconds), view, projection),
            );
        }
        if let Some(uniforms) = &self.earth.uniforms {
            uniforms.write_transform(
                &gpu.queue,
                &TransformUniform::new(scene.earth_model(seconds), view, projection),
            );
            uniforms.write_light(
                &gpu.queue,
                &LightUniform::new(Vec3::ONE, scene.ambient_strength, scene.sun_position()),
            );
        }

        let surface_texture = gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&gpu.device, &gpu.queue, surface_texture);
        let builder = RenderPassBuilder::new()
            .depth(&self.depth)
            .label("scene-pass");
        if let Some(mut pass) = frame.begin_render_pass(&builder) {
            let draws = [
                (SceneKind::Background, &self.background, &self.background_texture),
                (SceneKind::Sun, &self.sun, &self.sun_texture),
                (SceneKind::Earth, &self.earth, &self.earth_texture),
            ];
            for (kind, body, slot) in draws {
                if let Err(e) = self.pipelines.get(kind).draw(
                    &mut pass,
                    &body.buffers,
                    &slot.texture,
                    body.uniforms.as_ref(),
                ) {
                    error!("Skipping {kind:?} draw: {e}");
                }
            }
        }
        frame.submit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_from_default_config() {
        let camera = camera_from_config(&CameraConfig::default());
        assert_eq!(camera.eye, Vec3::new(10.0, -90.0, 90.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_camera_from_custom_config() {
        let config = CameraConfig {
            eye: [0.0, 0.0, 50.0],
            fov_y_degrees: 90.0,
            far: 500.0,
            ..CameraConfig::default()
        };
        let camera = camera_from_config(&config);
        assert_eq!(camera.eye, Vec3::new(0.0, 0.0, 50.0));
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(camera.far, 500.0);
    }

    #[test]
    fn test_mesh_error_names_body() {
        let err = RendererError::Mesh {
            body: "earth",
            source: generate(2, 10.0).unwrap_err(),
        };
        assert!(err.to_string().starts_with("failed to generate earth mesh"));
    }
}
