//! Identifier store tool.
//!
//! `lookup` prints the id for one name; `preproc` expands `ID("...")`
//! markers in a source file to numeric literals on stdout. Both commands
//! write the (possibly grown) table back to the store before exiting.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crpg_strid::{expand_markers, IdTable, StrIdError};

#[derive(Parser, Debug)]
#[command(name = "str-id", about = "Interned-identifier store tool", version)]
struct Args {
    /// Path to the identifier store (one name per line).
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the identifier for a name, interning it if new.
    Lookup {
        /// The name to look up.
        name: String,
    },
    /// Expand ID("...") markers in a file to numeric literals on stdout.
    Preproc {
        /// The source file to preprocess.
        input: PathBuf,
    },
}

fn run(args: Args) -> Result<(), StrIdError> {
    let mut table = IdTable::load(&args.db)?;

    match args.command {
        Command::Lookup { name } => {
            println!("{}", table.get_id(&name));
        }
        Command::Preproc { input } => {
            let source = std::fs::read_to_string(&input)?;
            let expanded = expand_markers(&mut table, &source)?;
            print!("{expanded}");
        }
    }

    table.persist(&args.db)
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
