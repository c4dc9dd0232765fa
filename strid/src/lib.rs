//! Deterministic name interning with a line-oriented persistent store.
//!
//! [`IdTable`] maps human-readable names to stable numeric identifiers.
//! Identifiers start at 1 and are handed out in interning order; `0` is
//! reserved to mean "no asset". The table persists as a plain text file
//! with one name per line, where line N (1-indexed) holds the name of
//! identifier N, so [`IdTable::load`] and [`IdTable::persist`] round-trip
//! losslessly and ids stay stable across tool runs.
//!
//! Names are never removed or renumbered. The table is an explicit owned
//! value passed into whatever needs interning; there is no process-wide
//! instance. Single-writer offline use is assumed and no file locking is
//! performed.
//!
//! [`expand_markers`] implements the source preprocessing step: every
//! `ID("name")` marker in the input text is replaced by the interned
//! numeric literal for `name`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Reserved identifier meaning "no name".
pub const NULL_ID: u32 = 0;

/// Errors from loading, persisting, or preprocessing with an [`IdTable`].
#[derive(Debug)]
pub enum StrIdError {
    /// An IO error occurred while reading or writing the store.
    Io(std::io::Error),
    /// The input ended in the middle of an `ID("...")` marker.
    UnterminatedMarker,
    /// An `ID("...")` marker spans a line break.
    MarkerContainsNewline,
    /// The closing `")` of a marker is missing or mangled.
    MalformedMarker {
        /// The byte found where `)` was expected, if any.
        found: Option<char>,
    },
}

impl fmt::Display for StrIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::UnterminatedMarker => {
                write!(f, "end of input while scanning an ID(\"...\") marker")
            }
            Self::MarkerContainsNewline => {
                write!(f, "line break inside an ID(\"...\") marker")
            }
            Self::MalformedMarker { found: Some(ch) } => {
                write!(f, "malformed ID(\"...\") marker, found {ch:?} after the name")
            }
            Self::MalformedMarker { found: None } => {
                write!(f, "malformed ID(\"...\") marker, input ended after the name")
            }
        }
    }
}

impl std::error::Error for StrIdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StrIdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Name-to-identifier table with a persistent line-oriented store.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl IdTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from its store, assigning identifiers by line order.
    ///
    /// The first line becomes id 1, the second id 2, and so on. A store
    /// that cannot be opened is an error; tools treat that as fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StrIdError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut table = Self::new();
        for line in content.lines() {
            table.get_id(line);
        }
        log::debug!(
            "loaded id table {:?}: {} names",
            path.as_ref(),
            table.len()
        );
        Ok(table)
    }

    /// Return the identifier for `name`, interning it if new.
    ///
    /// Idempotent: interning the same name again returns the same id.
    /// New names receive the next sequential id, starting at 1; freed
    /// ids do not exist because names are never removed.
    pub fn get_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        self.names.push(name.to_owned());
        let id = self.names.len() as u32;
        self.ids.insert(name.to_owned(), id);
        id
    }

    /// Return the identifier for `name` without interning.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Return the name interned under `id`, if any.
    pub fn name_of(&self, id: u32) -> Option<&str> {
        if id == NULL_ID {
            return None;
        }
        self.names.get(id as usize - 1).map(String::as_str)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Overwrite the store with one name per line, in id order.
    ///
    /// Round-trips with [`load`](Self::load).
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), StrIdError> {
        let mut out = String::new();
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        std::fs::write(path.as_ref(), out)?;
        Ok(())
    }
}

/// Replace every `ID("name")` marker in `input` with the interned
/// numeric literal `(Nu32)` for `name`.
///
/// Unknown names are interned on the spot, so a preprocessing run can
/// grow the table; the caller persists it afterwards. Markers may not
/// span line breaks, and a missing closing `")` is an error.
pub fn expand_markers(table: &mut IdTable, input: &str) -> Result<String, StrIdError> {
    const OPEN: &[u8] = b"ID(\"";

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i..].starts_with(OPEN) {
            i += 1;
            continue;
        }

        let name_start = i + OPEN.len();
        let mut j = name_start;
        loop {
            match bytes.get(j) {
                None => return Err(StrIdError::UnterminatedMarker),
                Some(b'\n') => return Err(StrIdError::MarkerContainsNewline),
                Some(b'"') => break,
                Some(_) => j += 1,
            }
        }
        match bytes.get(j + 1) {
            Some(b')') => {}
            other => {
                return Err(StrIdError::MalformedMarker {
                    found: other.map(|&b| b as char),
                })
            }
        }

        out.push_str(&input[plain_start..i]);
        let id = table.get_id(&input[name_start..j]);
        out.push_str(&format!("({id}u32)"));

        i = j + 2;
        plain_start = i;
    }

    out.push_str(&input[plain_start..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crpg_strid_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = IdTable::new();
        assert_eq!(table.get_id("rock"), 1);
        assert_eq!(table.get_id("tree"), 2);
        assert_eq!(table.get_id("rock"), 1);
        assert_eq!(table.get_id("tree"), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut table = IdTable::new();
        let first = table.get_id("anything");
        assert_eq!(first, 1);
        assert_ne!(first, NULL_ID);
    }

    #[test]
    fn test_name_of() {
        let mut table = IdTable::new();
        table.get_id("rock");
        table.get_id("tree");

        assert_eq!(table.name_of(1), Some("rock"));
        assert_eq!(table.name_of(2), Some("tree"));
        assert_eq!(table.name_of(NULL_ID), None);
        assert_eq!(table.name_of(3), None);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let mut table = IdTable::new();
        table.get_id("rock");

        assert_eq!(table.lookup("rock"), Some(1));
        assert_eq!(table.lookup("tree"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_persist_load_roundtrip() {
        let dir = temp_dir("roundtrip");
        let store = dir.join("names.iddb");

        let mut table = IdTable::new();
        table.get_id("rock");
        table.get_id("tree");
        table.get_id("player");
        table.persist(&store).unwrap();

        let mut reloaded = IdTable::load(&store).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.get_id("rock"), 1);
        assert_eq!(reloaded.get_id("tree"), 2);
        assert_eq!(reloaded.get_id("player"), 3);
        // A fresh name continues the sequence.
        assert_eq!(reloaded.get_id("door"), 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_assigns_line_order() {
        let dir = temp_dir("line_order");
        let store = dir.join("names.iddb");
        std::fs::write(&store, "alpha\nbeta\ngamma\n").unwrap();

        let table = IdTable::load(&store).unwrap();
        assert_eq!(table.lookup("alpha"), Some(1));
        assert_eq!(table.lookup("beta"), Some(2));
        assert_eq!(table.lookup("gamma"), Some(3));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_store_is_an_error() {
        let dir = temp_dir("missing_store");
        let result = IdTable::load(dir.join("nope.iddb"));
        assert!(matches!(result, Err(StrIdError::Io(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_expand_single_marker() {
        let mut table = IdTable::new();
        table.get_id("rock");

        let out = expand_markers(&mut table, "let id = ID(\"rock\");").unwrap();
        assert_eq!(out, "let id = (1u32);");
    }

    #[test]
    fn test_expand_interns_unknown_names() {
        let mut table = IdTable::new();
        table.get_id("rock");

        let out = expand_markers(&mut table, "ID(\"tree\") ID(\"rock\")").unwrap();
        assert_eq!(out, "(2u32) (1u32)");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_expand_leaves_plain_text_untouched() {
        let mut table = IdTable::new();
        let input = "fn main() { println!(\"ID\"); }\n";
        let out = expand_markers(&mut table, input).unwrap();
        assert_eq!(out, input);
        assert!(table.is_empty());
    }

    #[test]
    fn test_expand_marker_at_end_of_input() {
        let mut table = IdTable::new();
        let out = expand_markers(&mut table, "tail = ID(\"end\")").unwrap();
        assert_eq!(out, "tail = (1u32)");
    }

    #[test]
    fn test_expand_rejects_unterminated_marker() {
        let mut table = IdTable::new();
        let err = expand_markers(&mut table, "ID(\"never-closed").unwrap_err();
        assert!(matches!(err, StrIdError::UnterminatedMarker));
    }

    #[test]
    fn test_expand_rejects_newline_in_marker() {
        let mut table = IdTable::new();
        let err = expand_markers(&mut table, "ID(\"split\nname\")").unwrap_err();
        assert!(matches!(err, StrIdError::MarkerContainsNewline));
    }

    #[test]
    fn test_expand_rejects_missing_close_paren() {
        let mut table = IdTable::new();
        let err = expand_markers(&mut table, "ID(\"rock\"!").unwrap_err();
        assert!(matches!(
            err,
            StrIdError::MalformedMarker { found: Some('!') }
        ));

        let err = expand_markers(&mut table, "ID(\"rock\"").unwrap_err();
        assert!(matches!(err, StrIdError::MalformedMarker { found: None }));
    }
}
