//! Error types for mesh conversion.

use std::fmt;

/// Errors that can occur while converting a glTF document.
#[derive(Debug)]
pub enum ConvertError {
    /// Failed to read or parse the glTF document.
    Gltf(gltf::Error),
    /// Failed to encode or register the packed output.
    Asset(crpg_asset::AssetError),
    /// Failed to load or persist the identifier store.
    StrId(crpg_strid::StrIdError),
    /// The document does not hold exactly one mesh.
    MeshCount(usize),
    /// The mesh does not hold exactly one primitive.
    PrimitiveCount(usize),
    /// The mesh carries no name to intern an identifier from.
    MissingMeshName,
    /// A required vertex attribute is absent.
    MissingAttribute(&'static str),
    /// The primitive is not indexed.
    NonIndexed,
    /// An attribute's element count differs from the position count.
    CountMismatch {
        /// The attribute whose count is off.
        attribute: &'static str,
        /// Number of elements the attribute provides.
        count: usize,
        /// Number of positions, which fixes the vertex count.
        vertex_count: usize,
    },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gltf(err) => write!(f, "glTF error: {err}"),
            Self::Asset(err) => write!(f, "asset error: {err}"),
            Self::StrId(err) => write!(f, "identifier store error: {err}"),
            Self::MeshCount(count) => {
                write!(f, "expected exactly 1 mesh in this document, got {count}")
            }
            Self::PrimitiveCount(count) => {
                write!(f, "expected exactly 1 primitive in this mesh, got {count}")
            }
            Self::MissingMeshName => write!(f, "the mesh has no name to intern"),
            Self::MissingAttribute(attribute) => {
                write!(f, "this mesh has no {attribute} attribute")
            }
            Self::NonIndexed => write!(f, "the primitive has no index data"),
            Self::CountMismatch {
                attribute,
                count,
                vertex_count,
            } => write!(
                f,
                "{attribute} count ({count}) != position count ({vertex_count})"
            ),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gltf(err) => Some(err),
            Self::Asset(err) => Some(err),
            Self::StrId(err) => Some(err),
            _ => None,
        }
    }
}

impl From<gltf::Error> for ConvertError {
    fn from(err: gltf::Error) -> Self {
        Self::Gltf(err)
    }
}

impl From<crpg_asset::AssetError> for ConvertError {
    fn from(err: crpg_asset::AssetError) -> Self {
        Self::Asset(err)
    }
}

impl From<crpg_strid::StrIdError> for ConvertError {
    fn from(err: crpg_strid::StrIdError) -> Self {
        Self::StrId(err)
    }
}
