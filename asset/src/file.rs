//! Packed static-mesh file codec and random-access handle.
//!
//! A mesh file is a header, a descriptor array, a shared vertex arena,
//! and a shared 16-bit index arena, in that order:
//!
//! ```text
//! [MeshFileHeader][StaticMeshData; mesh_count][StaticVertex; vertex_count][u16; index_count]
//! ```
//!
//! The write path ([`encode_mesh_file`] / [`write_mesh_file`]) is a flat
//! byte copy of the records. The read path ([`MeshFileHandle`]) loads only
//! the header and descriptor array eagerly; vertex and index payloads stay
//! on disk and are served by offset-computed partial reads, so a handle
//! over a large file stays cheap to hold open.
//!
//! Byte offsets are always derived from the header counts rather than
//! stored in the file, which keeps the format compact and the arithmetic
//! in one place ([`MeshFileHandle::vertex_offset_to_bytes`] and
//! [`MeshFileHandle::index_offset_to_bytes`]).

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::mem::size_of;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::error::AssetError;
use crate::mesh::{pack_magic, AssetId, StaticMeshData, StaticVertex};

/// Magic string identifying a packed static-mesh file.
pub const MESH_FILE_MAGIC: &str = "crpg:asset:static-mesh";

/// Header of a packed static-mesh file.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshFileHeader {
    /// [`MESH_FILE_MAGIC`], NUL padded to 32 bytes.
    pub magic: [u8; 32],
    /// Number of descriptors in the descriptor array.
    pub mesh_count: u32,
    /// Total number of vertices in the shared vertex arena.
    pub vertex_count: u32,
    /// Total number of indices in the shared index arena.
    pub index_count: u32,
}

/// Check that every descriptor's sub-ranges stay inside the shared arenas.
fn check_ranges(
    meshes: &[StaticMeshData],
    vertex_total: u32,
    index_total: u32,
) -> Result<(), AssetError> {
    for mesh in meshes {
        let vertex_end = mesh.vertex_offset as u64 + mesh.vertex_count as u64;
        let index_end = mesh.index_offset as u64 + mesh.index_count as u64;
        if vertex_end > vertex_total as u64 || index_end > index_total as u64 {
            return Err(AssetError::DescriptorOutOfRange(mesh.id));
        }
    }
    Ok(())
}

/// Encode descriptors and shared arenas into mesh-file bytes.
///
/// Indices are taken as `u32` and narrowed to the 16-bit on-disk
/// representation; any value above `u16::MAX` is an
/// [`AssetError::IndexTooLarge`]. Duplicate descriptor identifiers and
/// sub-ranges outside the arenas are rejected, so every file produced
/// here satisfies the format invariants.
///
/// Zero meshes, vertices, or indices are all representable; the header
/// counts are simply 0.
pub fn encode_mesh_file(
    meshes: &[StaticMeshData],
    vertices: &[StaticVertex],
    indices: &[u32],
) -> Result<Vec<u8>, AssetError> {
    let mut seen = HashSet::with_capacity(meshes.len());
    for mesh in meshes {
        if !seen.insert(mesh.id) {
            return Err(AssetError::DuplicateMeshId(mesh.id));
        }
    }
    check_ranges(meshes, vertices.len() as u32, indices.len() as u32)?;

    let mut packed = Vec::with_capacity(indices.len());
    for &index in indices {
        if index > u16::MAX as u32 {
            return Err(AssetError::IndexTooLarge { value: index });
        }
        packed.push(index as u16);
    }

    let header = MeshFileHeader {
        magic: pack_magic(MESH_FILE_MAGIC),
        mesh_count: meshes.len() as u32,
        vertex_count: vertices.len() as u32,
        index_count: indices.len() as u32,
    };

    let mut bytes = Vec::with_capacity(
        size_of::<MeshFileHeader>()
            + meshes.len() * size_of::<StaticMeshData>()
            + vertices.len() * size_of::<StaticVertex>()
            + packed.len() * size_of::<u16>(),
    );
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    bytes.extend_from_slice(bytemuck::cast_slice(meshes));
    bytes.extend_from_slice(bytemuck::cast_slice(vertices));
    bytes.extend_from_slice(bytemuck::cast_slice(&packed));
    Ok(bytes)
}

/// Encode a mesh file and write it to `path`.
pub fn write_mesh_file(
    path: impl AsRef<Path>,
    meshes: &[StaticMeshData],
    vertices: &[StaticVertex],
    indices: &[u32],
) -> Result<(), AssetError> {
    let bytes = encode_mesh_file(meshes, vertices, indices)?;
    std::fs::write(path.as_ref(), &bytes)?;
    log::debug!(
        "wrote mesh file {:?}: {} meshes, {} vertices, {} indices",
        path.as_ref(),
        meshes.len(),
        vertices.len(),
        indices.len()
    );
    Ok(())
}

/// Read exactly `buf.len()` bytes, reporting a short file as truncation.
fn read_section<R: Read>(
    stream: &mut R,
    buf: &mut [u8],
    section: &'static str,
) -> Result<(), AssetError> {
    stream.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            AssetError::Truncated { section }
        } else {
            AssetError::Io(err)
        }
    })
}

/// An open, randomly-addressable view over one packed mesh file.
///
/// The handle exclusively owns its stream and its in-memory copy of the
/// descriptor array. It starts open on successful decode and transitions
/// to closed exactly once, either through [`close`](Self::close) or when
/// dropped; closing releases the stream on every exit path. Reads after
/// close return [`AssetError::Closed`].
///
/// The handle keeps a mutable stream cursor, so callers that share one
/// handle across threads must add their own synchronization.
#[derive(Debug)]
pub struct MeshFileHandle<R: Read + Seek = File> {
    stream: Option<R>,
    header: MeshFileHeader,
    meshes: Vec<StaticMeshData>,
}

impl MeshFileHandle<File> {
    /// Open a packed mesh file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = File::open(path.as_ref())?;
        log::debug!("opened mesh file {:?}", path.as_ref());
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> MeshFileHandle<R> {
    /// Decode the header and descriptor array from `stream`.
    ///
    /// The vertex and index payload is left on the stream; only offsets
    /// are retained for later partial reads. The magic string and every
    /// descriptor sub-range are validated before the handle is returned.
    pub fn from_reader(mut stream: R) -> Result<Self, AssetError> {
        let mut header = MeshFileHeader::zeroed();
        read_section(&mut stream, bytemuck::bytes_of_mut(&mut header), "header")?;
        if header.magic != pack_magic(MESH_FILE_MAGIC) {
            return Err(AssetError::BadMagic {
                expected: MESH_FILE_MAGIC,
            });
        }

        let mut meshes = vec![StaticMeshData::zeroed(); header.mesh_count as usize];
        read_section(
            &mut stream,
            bytemuck::cast_slice_mut(&mut meshes),
            "descriptor array",
        )?;
        check_ranges(&meshes, header.vertex_count, header.index_count)?;

        Ok(Self {
            stream: Some(stream),
            header,
            meshes,
        })
    }

    /// The decoded file header.
    pub fn header(&self) -> &MeshFileHeader {
        &self.header
    }

    /// The decoded descriptor array.
    pub fn descriptors(&self) -> &[StaticMeshData] {
        &self.meshes
    }

    /// Whether the handle can still serve reads.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Find the descriptor for `id` by linear scan.
    ///
    /// If a file carries duplicate identifiers (which this codec's write
    /// path refuses to produce, but foreign files may contain), the
    /// **last** matching descriptor wins.
    pub fn find_descriptor(&self, id: AssetId) -> Option<&StaticMeshData> {
        self.meshes.iter().rfind(|mesh| mesh.id == id)
    }

    /// Byte position of element `vertex_offset` of the vertex arena.
    pub fn vertex_offset_to_bytes(&self, vertex_offset: u64) -> u64 {
        (size_of::<MeshFileHeader>()
            + self.header.mesh_count as usize * size_of::<StaticMeshData>()) as u64
            + vertex_offset * size_of::<StaticVertex>() as u64
    }

    /// Byte position of element `index_offset` of the index arena.
    ///
    /// The index arena starts where the vertex arena ends.
    pub fn index_offset_to_bytes(&self, index_offset: u64) -> u64 {
        self.vertex_offset_to_bytes(self.header.vertex_count as u64)
            + index_offset * size_of::<u16>() as u64
    }

    /// Read the vertex and index data of mesh `id` into caller buffers.
    ///
    /// Returns `Ok(false)` if no descriptor matches `id`. The buffers
    /// must be pre-sized to at least the descriptor's `vertex_count` and
    /// `index_count`; exactly that many records are read into their
    /// leading elements.
    pub fn read_mesh(
        &mut self,
        id: AssetId,
        vertices: &mut [StaticVertex],
        indices: &mut [u16],
    ) -> Result<bool, AssetError> {
        if self.stream.is_none() {
            return Err(AssetError::Closed);
        }
        let Some(mesh) = self.find_descriptor(id).copied() else {
            return Ok(false);
        };

        let vertex_bytes = self.vertex_offset_to_bytes(mesh.vertex_offset as u64);
        let index_bytes = self.index_offset_to_bytes(mesh.index_offset as u64);

        // Checked above; the stream cannot disappear in between.
        let Some(stream) = self.stream.as_mut() else {
            return Err(AssetError::Closed);
        };

        stream.seek(SeekFrom::Start(vertex_bytes))?;
        read_section(
            stream,
            bytemuck::cast_slice_mut(&mut vertices[..mesh.vertex_count as usize]),
            "vertex data",
        )?;

        stream.seek(SeekFrom::Start(index_bytes))?;
        read_section(
            stream,
            bytemuck::cast_slice_mut(&mut indices[..mesh.index_count as usize]),
            "index data",
        )?;

        Ok(true)
    }

    /// Release the stream and drop the descriptor array.
    ///
    /// Calling `close` on an already closed handle is a no-op.
    pub fn close(&mut self) {
        self.stream = None;
        self.meshes.clear();
    }
}

impl<R: Read + Seek> fmt::Display for MeshFileHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "static mesh file: {} meshes, {} vertices, {} indices",
            self.header.mesh_count, self.header.vertex_count, self.header.index_count
        )?;
        for mesh in &self.meshes {
            writeln!(f, "  mesh {} {{", mesh.id)?;
            writeln!(
                f,
                "    vertices: {}..{}",
                mesh.vertex_offset,
                mesh.vertex_offset + mesh.vertex_count
            )?;
            writeln!(
                f,
                "    indices:  {}..{}",
                mesh.index_offset,
                mesh.index_offset + mesh.index_count
            )?;
            writeln!(
                f,
                "    bounds:   min ({}, {}, {}) max ({}, {}, {})",
                mesh.bounds.min.x,
                mesh.bounds.min.y,
                mesh.bounds.min.z,
                mesh.bounds.max.x,
                mesh.bounds.max.y,
                mesh.bounds.max.z
            )?;
            writeln!(f, "  }}")?;
        }
        Ok(())
    }
}
