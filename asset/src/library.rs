//! Asset library: identifier-to-file resolution with a handle cache.
//!
//! The library index is a single binary file mapping asset identifiers to
//! the packed files that hold them:
//!
//! ```text
//! [LibraryHeader][RawAssetRef; asset_ref_count][path blob; path_byte_count]
//! ```
//!
//! Each reference record names an asset, its type tag, and a byte offset
//! into the blob of NUL-terminated path strings. The index is built by
//! tooling, persisted as one file, and loaded wholesale when a
//! [`Library`] opens.
//!
//! At run time the library resolves identifiers to paths, lazily opens
//! one [`MeshFileHandle`] per distinct path, and keeps every handle
//! cached for its own lifetime; asset-file counts are assumed small
//! enough that nothing is ever evicted. Dropping the library closes all
//! cached handles, which in turn release their streams.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::mem::size_of;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::error::AssetError;
use crate::file::MeshFileHandle;
use crate::mesh::{pack_magic, AssetId, StaticMeshData, StaticVertex};

/// Magic string identifying a library index file.
pub const LIBRARY_MAGIC: &str = "crpg:asset:library";

/// Kind of asset a library reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    StaticMesh,
    Texture,
}

impl AssetType {
    fn from_tag(tag: u32) -> Result<Self, AssetError> {
        match tag {
            0 => Ok(Self::StaticMesh),
            1 => Ok(Self::Texture),
            other => Err(AssetError::BadAssetType(other)),
        }
    }

    fn tag(self) -> u32 {
        match self {
            Self::StaticMesh => 0,
            Self::Texture => 1,
        }
    }
}

/// Header of a library index file.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LibraryHeader {
    /// [`LIBRARY_MAGIC`], NUL padded to 32 bytes.
    magic: [u8; 32],
    asset_ref_count: u32,
    path_byte_count: u32,
}

/// On-disk asset reference record.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawAssetRef {
    asset_id: u32,
    asset_type: u32,
    /// Byte offset of a NUL-terminated path string within the blob.
    path_offset: u32,
}

/// A decoded asset reference: identifier, type, and source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub id: AssetId,
    pub kind: AssetType,
    pub path: String,
}

/// One mesh read back through the library: descriptor plus payload.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub descriptor: StaticMeshData,
    pub vertices: Vec<StaticVertex>,
    pub indices: Vec<u16>,
}

/// Resolves asset identifiers to mesh data without the caller knowing
/// which physical file holds them.
///
/// The library exclusively owns its index contents and its cache of open
/// mesh file handles. The cache map and each handle's stream cursor are
/// unsynchronized; callers loading assets from several threads must wrap
/// the library in their own lock.
#[derive(Debug)]
pub struct Library {
    refs: Vec<AssetRef>,
    handles: HashMap<String, MeshFileHandle>,
}

impl Library {
    /// Create an empty library with no references.
    pub fn new() -> Self {
        Self {
            refs: Vec::new(),
            handles: HashMap::new(),
        }
    }

    /// Load a library index from disk.
    ///
    /// Validates the magic string, the asset-type tags, and that every
    /// path offset lands on a NUL-terminated UTF-8 string inside the
    /// blob.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path.as_ref())?;
        let library = Self::decode_index(&bytes)?;
        log::debug!(
            "opened library index {:?}: {} references",
            path.as_ref(),
            library.refs.len()
        );
        Ok(library)
    }

    /// Decode a library index from raw bytes.
    fn decode_index(bytes: &[u8]) -> Result<Self, AssetError> {
        let header_size = size_of::<LibraryHeader>();
        if bytes.len() < header_size {
            return Err(AssetError::Truncated { section: "header" });
        }
        let header: LibraryHeader = bytemuck::pod_read_unaligned(&bytes[..header_size]);
        if header.magic != pack_magic(LIBRARY_MAGIC) {
            return Err(AssetError::BadMagic {
                expected: LIBRARY_MAGIC,
            });
        }

        let ref_count = header.asset_ref_count as usize;
        let refs_size = ref_count * size_of::<RawAssetRef>();
        let blob_start = header_size + refs_size;
        let blob_end = blob_start + header.path_byte_count as usize;
        if bytes.len() < blob_start {
            return Err(AssetError::Truncated {
                section: "asset reference array",
            });
        }
        if bytes.len() < blob_end {
            return Err(AssetError::Truncated { section: "path blob" });
        }
        let blob = &bytes[blob_start..blob_end];

        let mut refs = Vec::with_capacity(ref_count);
        for i in 0..ref_count {
            let record_start = header_size + i * size_of::<RawAssetRef>();
            let raw: RawAssetRef = bytemuck::pod_read_unaligned(
                &bytes[record_start..record_start + size_of::<RawAssetRef>()],
            );

            let offset = raw.path_offset as usize;
            if offset >= blob.len() {
                return Err(AssetError::BadPathBlob(format!(
                    "path offset {offset} is outside the {} byte blob",
                    blob.len()
                )));
            }
            let terminator = blob[offset..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| {
                    AssetError::BadPathBlob(format!(
                        "path at offset {offset} is not NUL terminated"
                    ))
                })?;
            let path = std::str::from_utf8(&blob[offset..offset + terminator])
                .map_err(|_| {
                    AssetError::BadPathBlob(format!("path at offset {offset} is not UTF-8"))
                })?
                .to_owned();

            refs.push(AssetRef {
                id: raw.asset_id,
                kind: AssetType::from_tag(raw.asset_type)?,
                path,
            });
        }

        Ok(Self {
            refs,
            handles: HashMap::new(),
        })
    }

    /// Encode the current index to bytes.
    fn encode_index(&self) -> Vec<u8> {
        let mut blob = Vec::new();
        let mut raw_refs = Vec::with_capacity(self.refs.len());
        for asset_ref in &self.refs {
            raw_refs.push(RawAssetRef {
                asset_id: asset_ref.id,
                asset_type: asset_ref.kind.tag(),
                path_offset: blob.len() as u32,
            });
            blob.extend_from_slice(asset_ref.path.as_bytes());
            blob.push(0);
        }

        let header = LibraryHeader {
            magic: pack_magic(LIBRARY_MAGIC),
            asset_ref_count: self.refs.len() as u32,
            path_byte_count: blob.len() as u32,
        };

        let mut bytes = Vec::with_capacity(
            size_of::<LibraryHeader>() + raw_refs.len() * size_of::<RawAssetRef>() + blob.len(),
        );
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(bytemuck::cast_slice(&raw_refs));
        bytes.extend_from_slice(&blob);
        bytes
    }

    /// Write the current index to disk; round-trips with [`open`](Self::open).
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        std::fs::write(path.as_ref(), self.encode_index())?;
        log::debug!(
            "persisted library index {:?}: {} references",
            path.as_ref(),
            self.refs.len()
        );
        Ok(())
    }

    /// Append a static-mesh reference to the in-memory index.
    ///
    /// Tool-side operation for index building; not used at render time.
    pub fn add_mesh_reference(&mut self, id: AssetId, path: impl Into<String>) {
        self.refs.push(AssetRef {
            id,
            kind: AssetType::StaticMesh,
            path: path.into(),
        });
    }

    /// Append a texture reference to the in-memory index.
    pub fn add_texture_reference(&mut self, id: AssetId, path: impl Into<String>) {
        self.refs.push(AssetRef {
            id,
            kind: AssetType::Texture,
            path: path.into(),
        });
    }

    /// All references in the index, in record order.
    pub fn refs(&self) -> &[AssetRef] {
        &self.refs
    }

    /// Number of distinct files currently held open by the handle cache.
    pub fn cached_handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Resolve an identifier to its source path, first match wins.
    ///
    /// An identifier missing from the index is a broken-index error, not
    /// an absent result; this is deliberately harder than the per-file
    /// descriptor miss.
    fn resolve_path(&self, id: AssetId) -> Result<&str, AssetError> {
        self.refs
            .iter()
            .find(|asset_ref| asset_ref.id == id)
            .map(|asset_ref| asset_ref.path.as_str())
            .ok_or(AssetError::UnresolvedAsset(id))
    }

    /// Get the cached handle for `path`, opening the file on first use.
    fn handle_for(&mut self, path: &str) -> Result<&mut MeshFileHandle, AssetError> {
        match self.handles.entry(path.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(MeshFileHandle::open(path)?)),
        }
    }

    /// Look up the descriptor for mesh `id`.
    ///
    /// Returns `Ok(None)` when the source file resolved from the index
    /// does not contain the identifier.
    pub fn get_mesh_descriptor(
        &mut self,
        id: AssetId,
    ) -> Result<Option<StaticMeshData>, AssetError> {
        let path = self.resolve_path(id)?.to_owned();
        let handle = self.handle_for(&path)?;
        Ok(handle.find_descriptor(id).copied())
    }

    /// Read mesh `id` into caller buffers pre-sized to its descriptor
    /// counts.
    ///
    /// Returns `Ok(false)` when the resolved source file does not contain
    /// the identifier.
    pub fn read_mesh(
        &mut self,
        id: AssetId,
        vertices: &mut [StaticVertex],
        indices: &mut [u16],
    ) -> Result<bool, AssetError> {
        let path = self.resolve_path(id)?.to_owned();
        let handle = self.handle_for(&path)?;
        handle.read_mesh(id, vertices, indices)
    }

    /// Read mesh `id`, allocating buffers sized from its descriptor.
    pub fn read_mesh_data(&mut self, id: AssetId) -> Result<Option<MeshData>, AssetError> {
        let Some(descriptor) = self.get_mesh_descriptor(id)? else {
            return Ok(None);
        };
        let mut vertices = vec![StaticVertex::zeroed(); descriptor.vertex_count as usize];
        let mut indices = vec![0u16; descriptor.index_count as usize];
        let path = self.resolve_path(id)?.to_owned();
        let handle = self.handle_for(&path)?;
        handle.read_mesh(id, &mut vertices, &mut indices)?;
        Ok(Some(MeshData {
            descriptor,
            vertices,
            indices,
        }))
    }

    /// Read several meshes in one call.
    ///
    /// Every identifier must resolve through the index. An identifier
    /// whose resolved file turns out not to contain it is skipped with a
    /// warning rather than failing the whole batch.
    pub fn read_meshes(&mut self, ids: &[AssetId]) -> Result<Vec<MeshData>, AssetError> {
        let mut result = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.read_mesh_data(id)? {
                Some(data) => result.push(data),
                None => log::warn!("mesh {id} is indexed but missing from its source file"),
            }
        }
        Ok(result)
    }

    /// Close every cached handle and empty the cache.
    ///
    /// Dropping the library has the same effect; this exists for callers
    /// that want to release file descriptors at a chosen point.
    pub fn close(&mut self) {
        for handle in self.handles.values_mut() {
            handle.close();
        }
        self.handles.clear();
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}
