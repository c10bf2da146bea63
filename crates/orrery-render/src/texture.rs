//! Scene textures: background image decoding on worker threads, placeholder
//! textures, and the texture + sampler bind groups used by the scene pipelines.
//!
//! A [`SceneTexture`] starts life as a 1x1 black placeholder so the scene can
//! be drawn before any image is decoded. A [`TextureLoader`] decodes the image
//! on its own thread and hands the pixels back exactly once.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::TryRecvError;

/// Texel format for all scene textures. Decoding sRGB texels keeps colors
/// unchanged once they are written to an sRGB surface.
pub const SCENE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Errors that can occur while loading or creating textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the given dimensions.
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Width or height exceeds the device's 2D texture limit.
    #[error("texture {width}x{height} exceeds the device limit of {max} texels per side")]
    TooLarge { width: u32, height: u32, max: u32 },

    /// The image file could not be read.
    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image bytes could not be decoded.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The decode thread exited without delivering a result.
    #[error("image loader for {path} stopped without a result")]
    WorkerLost { path: PathBuf },
}

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Wrap raw RGBA8 pixels after checking the size.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureError> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: rgba.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// The 1x1 opaque black image drawn until a real image arrives.
    pub fn black() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        }
    }
}

/// Read and decode an image file into RGBA8 pixels.
pub fn decode_image_file(path: &Path) -> Result<DecodedImage, TextureError> {
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba(width, height, rgba.into_raw())
}

/// State of a [`TextureLoader`] as seen by the render loop.
#[derive(Debug)]
pub enum LoadStatus {
    /// Still decoding.
    Pending,
    /// Decoded pixels, returned by exactly one poll.
    Ready(DecodedImage),
    /// Loading failed, returned by exactly one poll.
    Failed(TextureError),
    /// The result was already handed out.
    Consumed,
}

/// One-shot background image decode.
pub struct TextureLoader {
    path: PathBuf,
    receiver: Option<crossbeam_channel::Receiver<Result<DecodedImage, TextureError>>>,
    handle: Option<JoinHandle<()>>,
}

impl TextureLoader {
    /// Start decoding `path` on a new thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker_path = path.clone();

        let handle = std::thread::spawn(move || {
            let _ = tx.send(decode_image_file(&worker_path));
        });
        log::debug!("Loading texture {}", path.display());

        Self {
            path,
            receiver: Some(rx),
            handle: Some(handle),
        }
    }

    /// Path being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check for a result without blocking.
    pub fn poll(&mut self) -> LoadStatus {
        let Some(receiver) = &self.receiver else {
            return LoadStatus::Consumed;
        };
        let status = match receiver.try_recv() {
            Ok(Ok(image)) => LoadStatus::Ready(image),
            Ok(Err(err)) => LoadStatus::Failed(err),
            Err(TryRecvError::Empty) => return LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => LoadStatus::Failed(TextureError::WorkerLost {
                path: self.path.clone(),
            }),
        };
        self.finish();
        status
    }

    /// Block until the result is available. Returns `Consumed` if it was already taken.
    pub fn wait(&mut self) -> LoadStatus {
        let Some(receiver) = &self.receiver else {
            return LoadStatus::Consumed;
        };
        let status = match receiver.recv() {
            Ok(Ok(image)) => LoadStatus::Ready(image),
            Ok(Err(err)) => LoadStatus::Failed(err),
            Err(_) => LoadStatus::Failed(TextureError::WorkerLost {
                path: self.path.clone(),
            }),
        };
        self.finish();
        status
    }

    fn finish(&mut self) {
        self.receiver = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A GPU texture with its view and ready-to-bind bind group.
pub struct SceneTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    /// `true` until real image data has been uploaded.
    pub is_placeholder: bool,
}

/// Shared sampler and bind group layout for scene textures.
///
/// Binding 0 is the texture, binding 1 a nearest-filtering, clamp-to-edge sampler.
pub struct TextureBindings {
    pub layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl TextureBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self { layout, sampler }
    }

    /// The 1x1 black texture drawn before the real image is available.
    pub fn placeholder(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
    ) -> SceneTexture {
        let black = DecodedImage::black();
        let mut texture = self.upload_unchecked(device, queue, label, &black);
        texture.is_placeholder = true;
        texture
    }

    /// Upload decoded pixels into a new texture.
    ///
    /// Images wider or taller than the device's `max_texture_dimension_2d`
    /// are rejected with [`TextureError::TooLarge`].
    pub fn create(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> Result<SceneTexture, TextureError> {
        validate_dimensions(image.width, image.height)?;
        check_texture_limit(
            image.width,
            image.height,
            device.limits().max_texture_dimension_2d,
        )?;
        let expected = image.width as usize * image.height as usize * 4;
        if image.rgba.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: image.rgba.len(),
                expected,
                width: image.width,
                height: image.height,
            });
        }
        Ok(self.upload_unchecked(device, queue, label, image))
    }

    fn upload_unchecked(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> SceneTexture {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SCENE_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        SceneTexture {
            texture,
            view,
            bind_group,
            dimensions: (image.width, image.height),
            is_placeholder: false,
        }
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn check_texture_limit(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}
