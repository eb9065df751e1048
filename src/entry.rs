use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::{latex, reader, writer};

/// A field value: literal text, or an uninterpolated concatenation of
/// macros and text as in `month = jan # "~1"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Expression(Vec<Piece>),
}

/// One operand of a `#` concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Macro(String),
}

/// A single `@type{key, ...}` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// The entry type as written after `@`, lowercased.
    pub kind: String,
    /// The citation key.
    pub key: String,
    /// Fields in input order, with lowercased names.
    pub fields: Vec<(String, Value)>,
}

impl Entry {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Replace the value of `field`, or append the field if absent.
    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }
}

/// A bibliography file: entries plus everything else that appears around
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    /// Free text and `@comment` blocks. Regions the reader could not parse
    /// land here as well, so nothing written by hand is silently dropped.
    pub comments: Vec<String>,
    /// `@preamble` contents, kept verbatim.
    pub preambles: Vec<String>,
    /// `@string` definitions in input order.
    pub strings: Vec<(String, Value)>,
    pub entries: Vec<Entry>,
}

impl Database {
    /// Parse a bibliography.
    ///
    /// The reader does not fail: a region it cannot make sense of is
    /// skipped up to the next `@` and preserved as a comment.
    pub fn parse(input: &str) -> Database {
        reader::parse(input)
    }

    /// Read and parse a bibliography file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Database, Error> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Ok(Database::parse(&input))
    }

    /// Normalize the LaTeX in every entry.
    ///
    /// Unicode characters become their LaTeX escapes, whitespace runs
    /// collapse to single spaces, accents are flattened to the unbracketed
    /// form, and page ranges use a single dash.
    pub fn cleanup(&mut self) {
        for entry in &mut self.entries {
            latex::cleanup_entry(entry);
        }
    }

    /// Render the bibliography in canonical form.
    ///
    /// With `sort`, entries are ordered by citation key and strings by
    /// name; otherwise input order is kept.
    pub fn to_bibtex(&self, sort: bool) -> String {
        writer::to_bibtex(self, sort)
    }
}
