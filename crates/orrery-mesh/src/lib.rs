//! Sphere and background-quad geometry: UV-sphere triangle soup, an indexed
//! variant, and the flat attribute arrays the renderer uploads.

pub mod attribute;
pub mod error;
pub mod indexed;
pub mod quad;
pub mod sphere;
pub mod triangle;
pub mod vertex_format;

pub use attribute::MeshAttribute;
pub use error::MeshError;
pub use indexed::{IndexedSphere, generate_indexed};
pub use quad::{QuadMesh, background_quad};
pub use sphere::{MAX_SPLIT, MAX_VERTICES, MIN_SPLIT, SphereMesh, generate, triangulate};
pub use triangle::Triangle;
pub use vertex_format::SphereVertex;
