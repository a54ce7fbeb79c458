//! Stream layer map parser.
//!
//! Record grammar, one record per line:
//!
//! ```text
//! <layer> <purpose> <gds_layer> <gds_datatype> <anything-not-#>* [# <alias> ...]
//! ```
//!
//! Lines whose first non-whitespace character is `#` are full-line comments;
//! they and blank lines are skipped silently. Non-blank lines that fail the
//! grammar are skipped with a diagnostic, never aborting the parse: malformed
//! records are expected noise in real vendor files.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use thiserror::Error;

use crate::resolve::NameResolver;
use crate::{GdsLayer, LayerMap, LayerRecord};

/// Parses stream layer map files into a grouped [`LayerMap`].
///
/// Grouping keys are produced by the injected [`NameResolver`].
#[derive(Debug, Clone, Default)]
pub struct Parser<R> {
    resolver: R,
}

/// An error arising from reading a stream layer map.
///
/// Malformed records are not errors; they are skipped with a diagnostic.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Error trying to open or read the given file.
    #[error("failed to read file at path `{path:?}`: {err:?}")]
    FailedToRead {
        /// The path we attempted to read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },
    /// An I/O error reading from the input stream.
    #[error("error reading input stream: {0}")]
    Io(#[from] std::io::Error),
}

impl<R: NameResolver> Parser<R> {
    /// Makes a new parser with the given name resolution policy.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Parses the file at the given path.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<LayerMap, ParserError> {
        let path = path.as_ref();
        tracing::debug!("reading stream layer map file: {:?}", path);
        let data = std::fs::read_to_string(path).map_err(|err| ParserError::FailedToRead {
            path: path.into(),
            err,
        })?;
        Ok(self.parse_str(&data))
    }

    /// Parses records from the given reader.
    pub fn parse(&self, reader: impl Read) -> Result<LayerMap, ParserError> {
        let mut map = LayerMap::new();
        for (i, line) in BufReader::new(reader).lines().enumerate() {
            self.parse_line(&mut map, i + 1, &line?);
        }
        Ok(map)
    }

    /// Parses records from the given string.
    pub fn parse_str(&self, data: &str) -> LayerMap {
        let mut map = LayerMap::new();
        for (i, line) in data.lines().enumerate() {
            self.parse_line(&mut map, i + 1, line);
        }
        map
    }

    fn parse_line(&self, map: &mut LayerMap, lineno: usize, line: &str) {
        match scan_record(line) {
            Scan::Record(record) => {
                let key =
                    self.resolver
                        .resolve(record.alias.as_deref(), &record.layer, &record.purpose);
                map.insert(key, record);
            }
            Scan::Skip => {}
            Scan::Malformed => {
                tracing::warn!("skipping malformed record on line {lineno}: {line}");
            }
        }
    }
}

/// The outcome of scanning a single line.
enum Scan {
    /// A record matching the grammar.
    Record(LayerRecord),
    /// A blank line or full-line comment.
    Skip,
    /// A non-blank, non-comment line that fails the grammar.
    Malformed,
}

fn scan_record(line: &str) -> Scan {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Scan::Skip;
    }

    // Everything after the first `#` is the trailing comment; its first
    // token, if any, is the alias.
    let (body, comment) = match line.split_once('#') {
        Some((body, comment)) => (body, Some(comment)),
        None => (line, None),
    };

    let mut fields = body.split_whitespace();
    let (Some(layer), Some(purpose), Some(gds_layer), Some(gds_datatype)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Scan::Malformed;
    };
    let (Some(gds_layer), Some(gds_datatype)) = (parse_uint(gds_layer), parse_uint(gds_datatype))
    else {
        return Scan::Malformed;
    };
    // Fields after the datatype are permitted and ignored.

    let alias = comment
        .and_then(|c| c.split_whitespace().next())
        .map(ArcStr::from);

    Scan::Record(LayerRecord {
        layer: ArcStr::from(layer),
        purpose: ArcStr::from(purpose),
        gds: GdsLayer(gds_layer, gds_datatype),
        alias,
    })
}

/// Parses a base-10 non-negative integer consisting of digits only.
///
/// Signs and radix prefixes do not match the record grammar.
fn parse_uint(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
