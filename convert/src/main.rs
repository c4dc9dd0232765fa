//! Mesh converter: packs a single-mesh glTF export into the engine's
//! binary mesh format and optionally registers it in a library index.

mod error;
mod import;

use std::path::PathBuf;

use clap::Parser;

use crpg_asset::{write_mesh_file, Library};
use crpg_strid::IdTable;

use error::ConvertError;

#[derive(Parser, Debug)]
#[command(
    name = "convert-gltf",
    about = "Convert a single-mesh glTF file to a packed mesh file",
    version
)]
struct Args {
    /// The glTF file to convert (.gltf or .glb).
    input: PathBuf,

    /// Output path for the packed mesh file.
    output: PathBuf,

    /// Identifier store used to intern the mesh name.
    #[arg(long, default_value = ".iddb")]
    iddb: PathBuf,

    /// Library index to register the converted mesh in. Created if it
    /// does not exist yet.
    #[arg(long)]
    library: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), ConvertError> {
    let mut table = IdTable::load(&args.iddb)?;
    let imported = import::import_static_mesh(&args.input, &mut table)?;
    table.persist(&args.iddb)?;

    write_mesh_file(
        &args.output,
        &[imported.descriptor],
        &imported.vertices,
        &imported.indices,
    )?;
    log::info!(
        "converted {:?} -> {:?} (mesh {:?} = id {}, {} vertices, {} indices)",
        args.input,
        args.output,
        imported.name,
        imported.descriptor.id,
        imported.vertices.len(),
        imported.indices.len()
    );

    if let Some(library_path) = &args.library {
        let mut library = if library_path.exists() {
            Library::open(library_path)?
        } else {
            Library::new()
        };
        library.add_mesh_reference(imported.descriptor.id, args.output.to_string_lossy());
        library.persist(library_path)?;
        log::info!(
            "registered mesh {} in library index {:?}",
            imported.descriptor.id,
            library_path
        );
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
