//! Via-stack extraction from LEF via blocks.
//!
//! Recognized subset, repeated any number of times and interleaved with
//! arbitrary other LEF content:
//!
//! ```text
//! VIA <via_name> [args] DEFAULT
//!   LAYER <layer_name> ;
//!   ... (other lines ignored)
//! END <via_name>
//! ```
//!
//! This is not a general LEF parser. Only the layer sequence of each default
//! via is extracted; geometry (`RECT` lines and the like) is skipped.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ordered layer sequence a named via connects.
///
/// Order is physical stack order as encountered in the via block
/// (e.g. lower metal, via cut, upper metal); duplicates are kept.
pub type ViaStack = Vec<ArcStr>;

/// Via stacks keyed by via name.
///
/// Iteration order is definition order. A via name defined more than once
/// keeps only its last definition.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViaMap {
    vias: IndexMap<ArcStr, ViaStack>,
}

impl ViaMap {
    /// Creates an empty via map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the layer stack for the given via, if any.
    pub fn get(&self, name: &str) -> Option<&ViaStack> {
        self.vias.get(name)
    }

    /// Iterates over `(via_name, stack)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &ViaStack)> {
        self.vias.iter()
    }

    /// The number of vias.
    pub fn len(&self) -> usize {
        self.vias.len()
    }

    /// Returns `true` if the map contains no vias.
    pub fn is_empty(&self) -> bool {
        self.vias.is_empty()
    }

    fn insert(&mut self, name: ArcStr, stack: ViaStack) {
        self.vias.insert(name, stack);
    }
}

/// An error arising from reading a LEF via file.
#[derive(Debug, Error)]
pub enum ViaParserError {
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

#[derive(Debug, Clone, Default)]
enum State {
    /// Looking for the next `VIA ... DEFAULT` line.
    #[default]
    Scanning,
    /// Inside a via block, accumulating `LAYER` lines.
    InVia { name: ArcStr, layers: ViaStack },
}

/// Extracts via stacks from the given LEF text.
pub fn parse(data: &str) -> ViaMap {
    let mut map = ViaMap::new();
    let mut state = State::Scanning;
    for line in data.lines() {
        state = step(&mut map, state, line);
    }
    // EOF inside a via block discards the incomplete via.
    map
}

/// Extracts via stacks from the given reader.
pub fn parse_reader(reader: impl Read) -> Result<ViaMap, ViaParserError> {
    let mut map = ViaMap::new();
    let mut state = State::Scanning;
    for line in BufReader::new(reader).lines() {
        state = step(&mut map, state, &line?);
    }
    Ok(map)
}

/// Extracts via stacks from the file at the given path.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ViaMap, ViaParserError> {
    let path = path.as_ref();
    tracing::debug!("reading LEF via file: {:?}", path);
    let data = std::fs::read_to_string(path).map_err(|err| ViaParserError::FailedToRead {
        path: path.into(),
        err,
    })?;
    Ok(parse(&data))
}

fn step(map: &mut ViaMap, state: State, line: &str) -> State {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return state;
    };
    match state {
        State::Scanning => {
            // Only `VIA <name> ... DEFAULT` opens a block. The `DEFAULT`
            // keyword is matched case-insensitively; the via name is not.
            if first == "VIA" {
                if let Some(name) = tokens.next() {
                    if tokens.any(|t| t.eq_ignore_ascii_case("DEFAULT")) {
                        return State::InVia {
                            name: ArcStr::from(name),
                            layers: Vec::new(),
                        };
                    }
                }
            }
            State::Scanning
        }
        State::InVia { name, mut layers } => {
            if first == "END" {
                map.insert(name, layers);
                State::Scanning
            } else {
                if first == "LAYER" {
                    if let Some(layer) = tokens.next() {
                        let layer = layer.trim_end_matches(';');
                        if !layer.is_empty() {
                            layers.push(ArcStr::from(layer));
                        }
                    }
                }
                State::InVia { name, layers }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEF_VIAS: &str = r#"
VERSION 5.8 ;
BUSBITCHARS "[]" ;

VIA VIA9Pad Default
  LAYER M9 ;
    RECT -0.5 -0.5 0.5 0.5 ;
  LAYER Pad ;
    RECT -0.6 -0.6 0.6 0.6 ;
  LAYER V9 ;
    RECT -0.4 -0.4 0.4 0.4 ;
END VIA9Pad

VIA nondefault_via
  LAYER M1 ;
END nondefault_via

LAYER stray ;
"#;

    #[test]
    fn parse_via_stack_in_order() {
        let map = parse(LEF_VIAS);
        assert_eq!(map.len(), 1);
        let stack = map.get("VIA9Pad").unwrap();
        assert_eq!(stack, &vec!["M9", "Pad", "V9"]);
    }

    #[test]
    fn non_default_vias_are_skipped() {
        let map = parse(LEF_VIAS);
        assert!(map.get("nondefault_via").is_none());
    }

    #[test]
    fn layer_lines_outside_via_blocks_are_ignored() {
        let map = parse("LAYER M1 ;\nLAYER M2 ;\n");
        assert!(map.is_empty());
    }

    #[test]
    fn duplicate_via_name_keeps_last_definition() {
        let map = parse(
            "VIA v1 DEFAULT\n\
             LAYER M1 ;\n\
             LAYER V1 ;\n\
             LAYER M2 ;\n\
             END v1\n\
             VIA v1 DEFAULT\n\
             LAYER M2 ;\n\
             LAYER V2 ;\n\
             LAYER M3 ;\n\
             END v1\n",
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("v1").unwrap(), &vec!["M2", "V2", "M3"]);
    }

    #[test]
    fn unterminated_via_is_discarded() {
        let map = parse("VIA v1 DEFAULT\nLAYER M1 ;\n");
        assert!(map.is_empty());
    }

    #[test]
    fn duplicate_layers_are_kept() {
        let map = parse(
            "VIA stacked DEFAULT\n\
             LAYER M1 ;\n\
             LAYER V1 ;\n\
             LAYER M1 ;\n\
             END stacked\n",
        );
        assert_eq!(map.get("stacked").unwrap(), &vec!["M1", "V1", "M1"]);
    }

    #[test]
    fn semicolon_may_be_attached_to_layer_name() {
        let map = parse("VIA v DEFAULT\nLAYER M1;\nEND v\n");
        assert_eq!(map.get("v").unwrap(), &vec!["M1"]);
    }
}
