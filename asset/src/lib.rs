//! # crpg asset core
//!
//! Packed static-mesh files and the asset library for the crpg engine.
//!
//! - [`mesh`] - Binary record types (vertices, descriptors, bounds)
//! - [`file`] - Mesh file codec and the random-access [`MeshFileHandle`]
//! - [`library`] - Identifier-to-file resolution with a handle cache
//! - [`vulkan`] - Vertex-input descriptions for the pipeline layer
//!
//! Asset files are produced offline by the converter tool, indexed by a
//! library index file, and served by identifier at run time. Everything
//! here is single-threaded and synchronous; callers that load assets in
//! parallel add their own locking around the [`Library`].

pub mod error;
pub mod file;
pub mod library;
pub mod mesh;
#[cfg(feature = "vulkan")]
pub mod vulkan;

pub use error::AssetError;
pub use file::{
    encode_mesh_file, write_mesh_file, MeshFileHandle, MeshFileHeader, MESH_FILE_MAGIC,
};
pub use library::{AssetRef, AssetType, Library, MeshData, LIBRARY_MAGIC};
pub use mesh::{AssetId, BoundingBox, StaticMeshData, StaticVertex, NULL_ASSET_ID};
#[cfg(feature = "vulkan")]
pub use vulkan::VertexInputDescription;
