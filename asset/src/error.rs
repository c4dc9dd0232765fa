//! Asset error types.

use std::fmt;

use crate::mesh::AssetId;

/// Errors that can occur while encoding, decoding, or serving assets.
#[derive(Debug)]
pub enum AssetError {
    /// An IO error occurred while reading or writing an asset file.
    Io(std::io::Error),
    /// The file does not start with the expected magic string.
    BadMagic {
        /// The magic string that was expected at the start of the file.
        expected: &'static str,
    },
    /// The file ends before the named section is complete.
    Truncated {
        /// Which section of the file was cut short.
        section: &'static str,
    },
    /// An index value does not fit in the 16-bit on-disk representation.
    IndexTooLarge {
        /// The offending index value.
        value: u32,
    },
    /// Two descriptors in one mesh file carry the same identifier.
    DuplicateMeshId(AssetId),
    /// A descriptor addresses vertex or index data outside the shared arenas.
    DescriptorOutOfRange(AssetId),
    /// An asset-reference record carries an unknown asset-type tag.
    BadAssetType(u32),
    /// The path blob of a library index is inconsistent with its records.
    BadPathBlob(String),
    /// An identifier could not be resolved to a source file by the library.
    ///
    /// Unlike a per-file descriptor miss this indicates a broken index,
    /// so it surfaces as an error rather than an absent result.
    UnresolvedAsset(AssetId),
    /// The handle was closed and can no longer serve reads.
    Closed,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::BadMagic { expected } => {
                write!(f, "bad magic number, expected {expected:?}")
            }
            Self::Truncated { section } => {
                write!(f, "file ends before the {section} is complete")
            }
            Self::IndexTooLarge { value } => {
                write!(f, "index value {value} does not fit in 16 bits")
            }
            Self::DuplicateMeshId(id) => write!(f, "duplicate mesh id {id} in one file"),
            Self::DescriptorOutOfRange(id) => {
                write!(f, "descriptor for mesh {id} addresses data outside the file")
            }
            Self::BadAssetType(tag) => write!(f, "unknown asset type tag {tag}"),
            Self::BadPathBlob(msg) => write!(f, "invalid path blob: {msg}"),
            Self::UnresolvedAsset(id) => {
                write!(f, "asset {id} is not present in the library index")
            }
            Self::Closed => write!(f, "mesh file handle is closed"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
