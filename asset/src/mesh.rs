//! Binary record types shared by the packed mesh file and the library index.
//!
//! This module provides:
//! - [`AssetId`] - Stable numeric identifier assigned by the name interner
//! - [`BoundingBox`] - Axis-aligned bounds of one mesh
//! - [`StaticVertex`] - The fixed on-disk vertex record
//! - [`StaticMeshData`] - The per-mesh descriptor stored in a mesh file
//!
//! All records are `#[repr(C)]` plain-old-data so that encode and decode
//! are flat byte copies of the in-memory representation. The layout is
//! native byte order and shared between the converter and the engine;
//! files are not portable across differing endianness.

use bytemuck::{Pod, Zeroable};
use nalgebra::Vector3;

/// Stable numeric identifier for a named asset.
///
/// Identifiers are assigned by the name interner, start at 1, and are
/// never reused. `0` is reserved as the null identifier.
pub type AssetId = u32;

/// Reserved identifier meaning "no asset".
pub const NULL_ASSET_ID: AssetId = 0;

/// Pack a magic tag into the fixed 32-byte header field, NUL padded.
pub(crate) const fn pack_magic(tag: &str) -> [u8; 32] {
    let bytes = tag.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < bytes.len() {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

/// Axis-aligned bounding box of one mesh.
///
/// Once grown from at least one point, `min[i] <= max[i]` holds on every
/// axis. A zero-vertex mesh leaves the box zeroed and its contents are
/// meaningless.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    /// Create a degenerate box containing exactly one point.
    pub fn from_point(point: Vector3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box to contain `point`.
    pub fn grow(&mut self, point: Vector3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Center of the box.
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Half-extents of the box along each axis.
    pub fn half_extents(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }
}

/// The fixed vertex record of a packed mesh file.
///
/// 11 floats, 44 bytes. Written once by the converter and consumed as a
/// byte-exact array by the renderer; never rewritten in place.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StaticVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
}

/// Per-mesh descriptor stored in the descriptor array of a mesh file.
///
/// `vertex_offset` / `index_offset` are element counts into the shared
/// vertex and index arenas of the file, not byte positions; several
/// meshes in one file each name their own sub-range of the shared pools.
/// The texture slots hold interned asset identifiers and default to
/// [`NULL_ASSET_ID`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StaticMeshData {
    pub bounds: BoundingBox,
    pub id: AssetId,
    pub color: AssetId,
    pub normal: AssetId,
    pub roughness: AssetId,
    pub occlusion: AssetId,
    pub emission: AssetId,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

impl StaticMeshData {
    /// Create a descriptor with the given identifier and everything else
    /// zeroed.
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            ..Zeroable::zeroed()
        }
    }

    /// Set the bounding box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the vertex sub-range within the file's shared vertex arena.
    pub fn with_vertex_range(mut self, offset: u32, count: u32) -> Self {
        self.vertex_offset = offset;
        self.vertex_count = count;
        self
    }

    /// Set the index sub-range within the file's shared index arena.
    pub fn with_index_range(mut self, offset: u32, count: u32) -> Self {
        self.index_offset = offset;
        self.index_count = count;
        self
    }

    /// Set the color texture identifier.
    pub fn with_color_texture(mut self, id: AssetId) -> Self {
        self.color = id;
        self
    }

    /// Set the normal-map texture identifier.
    pub fn with_normal_texture(mut self, id: AssetId) -> Self {
        self.normal = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_record_sizes() {
        // On-disk layout; these sizes are load-bearing for offset math.
        assert_eq!(size_of::<StaticVertex>(), 44);
        assert_eq!(size_of::<BoundingBox>(), 24);
        assert_eq!(size_of::<StaticMeshData>(), 64);
    }

    #[test]
    fn test_pack_magic() {
        let magic = pack_magic("crpg:asset:static-mesh");
        assert_eq!(&magic[..22], b"crpg:asset:static-mesh");
        assert!(magic[22..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bounding_box_grow() {
        let mut bounds = BoundingBox::from_point(Vector3::new(1.0, 2.0, 3.0));
        bounds.grow(Vector3::new(-1.0, 5.0, 0.0));

        assert_eq!(bounds.min, Vector3::new(-1.0, 2.0, 0.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 5.0, 3.0));
        assert_eq!(bounds.center(), Vector3::new(0.0, 3.5, 1.5));
        assert_eq!(bounds.half_extents(), Vector3::new(1.0, 1.5, 1.5));
    }

    #[test]
    fn test_descriptor_builder() {
        let desc = StaticMeshData::new(7)
            .with_vertex_range(3, 5)
            .with_index_range(9, 12)
            .with_color_texture(21);

        assert_eq!(desc.id, 7);
        assert_eq!(desc.vertex_offset, 3);
        assert_eq!(desc.vertex_count, 5);
        assert_eq!(desc.index_offset, 9);
        assert_eq!(desc.index_count, 12);
        assert_eq!(desc.color, 21);
        assert_eq!(desc.normal, NULL_ASSET_ID);
        assert_eq!(desc.emission, NULL_ASSET_ID);
    }
}
