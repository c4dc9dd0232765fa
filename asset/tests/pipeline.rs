//! End-to-end pipeline test: pack mesh files, index them in a library,
//! persist everything, and read the geometry back byte-exactly.

use std::path::PathBuf;

use crpg_asset::{
    write_mesh_file, BoundingBox, Library, StaticMeshData, StaticVertex,
};
use nalgebra::Vector3;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("crpg_pipeline_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn vertex(position: [f32; 3]) -> StaticVertex {
    StaticVertex {
        position,
        uv: [position[0], position[1]],
        normal: [0.0, 0.0, 1.0],
        tangent: [1.0, 0.0, 0.0],
    }
}

#[test]
fn test_pack_index_and_read_back() {
    let dir = temp_dir("pack_index_read");

    // One file holding a single triangle.
    let triangle_vertices = vec![
        vertex([0.0, 0.0, 0.0]),
        vertex([1.0, 0.0, 0.0]),
        vertex([0.0, 1.0, 0.0]),
    ];
    let mut triangle_bounds = BoundingBox::from_point(Vector3::new(0.0, 0.0, 0.0));
    triangle_bounds.grow(Vector3::new(1.0, 0.0, 0.0));
    triangle_bounds.grow(Vector3::new(0.0, 1.0, 0.0));
    let triangle = StaticMeshData::new(7)
        .with_bounds(triangle_bounds)
        .with_vertex_range(0, 3)
        .with_index_range(0, 3);
    let triangle_path = dir.join("triangle.mesh");
    write_mesh_file(&triangle_path, &[triangle], &triangle_vertices, &[0, 1, 2]).unwrap();

    // A second file packing two quads into shared arenas.
    let quad_vertices: Vec<StaticVertex> = (0..8)
        .map(|i| vertex([i as f32, (i % 4) as f32, 0.0]))
        .collect();
    let quad_indices = [0u32, 1, 2, 2, 3, 0, 0, 1, 2, 2, 3, 0];
    let quads = [
        StaticMeshData::new(8)
            .with_vertex_range(0, 4)
            .with_index_range(0, 6),
        StaticMeshData::new(9)
            .with_vertex_range(4, 4)
            .with_index_range(6, 6),
    ];
    let quads_path = dir.join("quads.mesh");
    write_mesh_file(&quads_path, &quads, &quad_vertices, &quad_indices).unwrap();

    // Index both files and persist the library.
    let index_path = dir.join("assets.lib");
    let mut library = Library::new();
    library.add_mesh_reference(7, triangle_path.to_str().unwrap());
    library.add_mesh_reference(8, quads_path.to_str().unwrap());
    library.add_mesh_reference(9, quads_path.to_str().unwrap());
    library.persist(&index_path).unwrap();

    // Reopen from disk, the way the renderer would.
    let mut library = Library::open(&index_path).unwrap();

    let triangle_data = library.read_mesh_data(7).unwrap().unwrap();
    assert_eq!(triangle_data.vertices, triangle_vertices);
    assert_eq!(triangle_data.indices, [0, 1, 2]);
    assert_eq!(triangle_data.descriptor.bounds.max, Vector3::new(1.0, 1.0, 0.0));

    // The second quad reads exactly its own sub-range of the shared pools.
    let second_quad = library.read_mesh_data(9).unwrap().unwrap();
    assert_eq!(second_quad.vertices, quad_vertices[4..8]);
    assert_eq!(second_quad.indices, [0, 1, 2, 2, 3, 0]);

    // Both quad meshes came through one cached handle.
    assert_eq!(library.cached_handle_count(), 2);
    library.read_mesh_data(8).unwrap().unwrap();
    assert_eq!(library.cached_handle_count(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}
