//! Single-mesh glTF import.
//!
//! This is a specialized reader for single-mesh glTF exports as produced
//! by Blender: one mesh, one primitive, indexed, with POSITION, NORMAL,
//! TEXCOORD_0, and TANGENT attributes. Anything else is rejected rather
//! than partially converted.

use std::path::Path;

use nalgebra::Vector3;

use crpg_asset::{BoundingBox, StaticMeshData, StaticVertex};
use crpg_strid::IdTable;

use crate::error::ConvertError;

/// The result of importing one glTF document.
pub struct ImportedMesh {
    /// The mesh name the identifier was interned from.
    pub name: String,
    pub descriptor: StaticMeshData,
    pub vertices: Vec<StaticVertex>,
    pub indices: Vec<u32>,
}

/// Import a single-mesh glTF file, interning its name through `table`.
///
/// The descriptor's identifier comes from the mesh name; offsets are zero
/// because the converter packs one mesh per file. Index values wider than
/// 16 bits are caught later by the mesh file encoder.
pub fn import_static_mesh(
    path: impl AsRef<Path>,
    table: &mut IdTable,
) -> Result<ImportedMesh, ConvertError> {
    let (document, buffers, _images) = gltf::import(path.as_ref())?;

    let mut meshes = document.meshes();
    let mesh = match (meshes.next(), meshes.next()) {
        (Some(mesh), None) => mesh,
        _ => return Err(ConvertError::MeshCount(document.meshes().count())),
    };
    let name = mesh
        .name()
        .ok_or(ConvertError::MissingMeshName)?
        .to_owned();

    let mut primitives = mesh.primitives();
    let primitive = match (primitives.next(), primitives.next()) {
        (Some(primitive), None) => primitive,
        _ => return Err(ConvertError::PrimitiveCount(mesh.primitives().count())),
    };

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or(ConvertError::MissingAttribute("POSITION"))?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .ok_or(ConvertError::MissingAttribute("NORMAL"))?
        .collect();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .ok_or(ConvertError::MissingAttribute("TEXCOORD_0"))?
        .into_f32()
        .collect();
    let tangents: Vec<[f32; 4]> = reader
        .read_tangents()
        .ok_or(ConvertError::MissingAttribute("TANGENT"))?
        .collect();
    let indices: Vec<u32> = reader
        .read_indices()
        .ok_or(ConvertError::NonIndexed)?
        .into_u32()
        .collect();

    let vertices = assemble_vertices(&positions, &uvs, &normals, &tangents)?;

    let id = table.get_id(&name);
    let descriptor = StaticMeshData::new(id)
        .with_bounds(bounds_of(&positions))
        .with_vertex_range(0, vertices.len() as u32)
        .with_index_range(0, indices.len() as u32);

    log::debug!(
        "imported mesh {name:?} as id {id}: {} vertices, {} indices",
        vertices.len(),
        indices.len()
    );

    Ok(ImportedMesh {
        name,
        descriptor,
        vertices,
        indices,
    })
}

/// Interleave per-attribute streams into packed vertex records.
///
/// The position count fixes the vertex count; every other attribute must
/// match it. glTF tangents are vec4 with a handedness sign in `w`, which
/// the packed format does not keep.
fn assemble_vertices(
    positions: &[[f32; 3]],
    uvs: &[[f32; 2]],
    normals: &[[f32; 3]],
    tangents: &[[f32; 4]],
) -> Result<Vec<StaticVertex>, ConvertError> {
    let vertex_count = positions.len();
    let check = |attribute: &'static str, count: usize| {
        if count == vertex_count {
            Ok(())
        } else {
            Err(ConvertError::CountMismatch {
                attribute,
                count,
                vertex_count,
            })
        }
    };
    check("NORMAL", normals.len())?;
    check("TEXCOORD_0", uvs.len())?;
    check("TANGENT", tangents.len())?;

    let vertices = positions
        .iter()
        .zip(uvs)
        .zip(normals)
        .zip(tangents)
        .map(|(((&position, &uv), &normal), &tangent)| StaticVertex {
            position,
            uv,
            normal,
            tangent: [tangent[0], tangent[1], tangent[2]],
        })
        .collect();
    Ok(vertices)
}

/// Accumulate the bounding box of a position stream.
///
/// A zero-vertex mesh yields a zeroed box whose contents are meaningless.
fn bounds_of(positions: &[[f32; 3]]) -> BoundingBox {
    let mut iter = positions.iter();
    let Some(&first) = iter.next() else {
        return BoundingBox::from_point(Vector3::zeros());
    };

    let mut bounds = BoundingBox::from_point(Vector3::from(first));
    for &position in iter {
        bounds.grow(Vector3::from(position));
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_vertices() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let uvs = [[0.0, 0.0], [1.0, 1.0]];
        let normals = [[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let tangents = [[1.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, -1.0]];

        let vertices = assemble_vertices(&positions, &uvs, &normals, &tangents).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(vertices[1].uv, [1.0, 1.0]);
        // The handedness sign in w is dropped.
        assert_eq!(vertices[1].tangent, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_assemble_rejects_count_mismatch() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let uvs = [[0.0, 0.0], [1.0, 1.0]];
        let normals = [[0.0, 1.0, 0.0]];
        let tangents = [[1.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0]];

        let err = assemble_vertices(&positions, &uvs, &normals, &tangents).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::CountMismatch {
                attribute: "NORMAL",
                count: 1,
                vertex_count: 2,
            }
        ));
    }

    #[test]
    fn test_bounds_of_positions() {
        let positions = [[1.0, 2.0, 3.0], [-1.0, 4.0, 0.0], [0.0, 0.0, 5.0]];
        let bounds = bounds_of(&positions);
        assert_eq!(bounds.min, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 4.0, 5.0));
    }

    #[test]
    fn test_bounds_of_empty_stream() {
        let bounds = bounds_of(&[]);
        assert_eq!(bounds.min, Vector3::zeros());
        assert_eq!(bounds.max, Vector3::zeros());
    }
}
