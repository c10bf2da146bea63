//! wgpu rendering for the orrery scene: surface management, shader programs,
//! attribute buffers, textures, camera, and the background/sun/earth pipelines.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod scene_pipeline;
pub mod shader;
pub mod texture;

pub use buffer::{AttributeBuffers, AttributeLayout, BufferError, validate_attributes};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{BLACK, FrameEncoder, RenderPassBuilder};
pub use scene_pipeline::{
    BodyUniforms, LightUniform, SceneKind, ScenePipeline, ScenePipelines, TransformUniform,
    normal_matrix,
};
pub use shader::{
    EntryPoints, ProgramInterface, ShaderError, ShaderLibrary, ShaderProgram, validate_program,
};
pub use texture::{
    DecodedImage, LoadStatus, SceneTexture, TextureBindings, TextureError, TextureLoader,
    decode_image_file,
};
