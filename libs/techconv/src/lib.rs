//! Technology description assembly.
//!
//! Consumes the sorted layer map and via stacks produced by [`streammap`] and
//! [`lefvia`] and assembles a [`Technology`]: layer mapping entries plus via
//! connectivity, with a plain-text writer.


use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;

use arcstr::ArcStr;
use itertools::Itertools;
use lefvia::ViaMap;
use serde::{Deserialize, Serialize};
use streammap::{GdsLayer, SortedLayerMap};

/// A layer mapping entry: a display name bound to one or more GDS
/// layer/datatype pairs.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LayerMapEntry {
    /// The display name of the layer.
    pub name: ArcStr,
    /// The GDS pairs this name maps to.
    pub layers: Vec<GdsLayer>,
}

/// A connection registered for a three-layer via stack.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// The lower conducting layer.
    pub lower: ArcStr,
    /// The via cut layer.
    pub cut: ArcStr,
    /// The upper conducting layer.
    pub upper: ArcStr,
}

/// A minimal technology description: layer mapping plus via connectivity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    /// The technology name.
    pub name: ArcStr,
    /// Layer mapping entries, in output order.
    pub layer_map: Vec<LayerMapEntry>,
    /// Via connectivity, in via definition order.
    pub connections: Vec<Connection>,
}

impl Technology {
    /// Creates an empty technology with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            layer_map: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Builds a technology from a sorted layer map and via stacks.
    pub fn from_maps(name: impl Into<ArcStr>, map: &SortedLayerMap, vias: &ViaMap) -> Self {
        let mut tech = Self::new(name);
        tech.add_layers(map);
        tech.add_vias(vias);
        tech
    }

    /// Adds layer mapping entries for each group in the sorted map.
    ///
    /// Each group contributes one entry using only its first record; a
    /// single-entry mapping cannot represent the later records, which are
    /// typically alternate datatypes of the same layer. Groups with more than
    /// one record additionally contribute a symbolic-alias entry expressing
    /// the union of all pairs.
    pub fn add_layers(&mut self, map: &SortedLayerMap) {
        for (key, group) in map.iter() {
            let first = group.first().expect("layer groups must not be empty");
            self.layer_map.push(LayerMapEntry {
                name: key.clone(),
                layers: vec![first.gds],
            });
            if group.len() > 1 {
                self.layer_map.push(LayerMapEntry {
                    name: key.clone(),
                    layers: group.iter().map(|r| r.gds).collect(),
                });
            }
        }
    }

    /// Registers a lower/cut/upper connection for each three-layer via stack.
    ///
    /// Stacks of any other length carry no representable connectivity and are
    /// skipped with a diagnostic.
    pub fn add_vias(&mut self, vias: &ViaMap) {
        for (name, stack) in vias.iter() {
            match stack.as_slice() {
                [lower, cut, upper] => self.connections.push(Connection {
                    lower: lower.clone(),
                    cut: cut.clone(),
                    upper: upper.clone(),
                }),
                _ => tracing::warn!(
                    "skipping via {} with {} layers; connectivity requires exactly 3",
                    name,
                    stack.len()
                ),
            }
        }
    }

    /// Writes this technology to a file.
    ///
    /// The parent directory will be created if it does not exist.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        self.write(&mut file)?;
        Ok(())
    }
}

/// A layer name escaped for use in a mapping expression.
///
/// Names beginning with a digit must be single-quoted (e.g. `'1Layer'`) so
/// the consuming tool does not read them as numbers.
struct ExprName<'a>(&'a str);

impl Display for ExprName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.starts_with(|c: char| c.is_ascii_digit()) {
            write!(f, "'{}'", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

pub trait WriteTech {
    fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()>;
}

impl WriteTech for LayerMapEntry {
    fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(
            out,
            "{}: {}",
            ExprName(&self.name),
            self.layers.iter().join("+")
        )
    }
}

impl WriteTech for Connection {
    fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{} {} {}", self.lower, self.cut, self.upper)
    }
}

impl WriteTech for Technology {
    fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "TECHNOLOGY {} ;", self.name)?;
        if !self.layer_map.is_empty() {
            writeln!(out, "LAYERMAP {} ;", self.layer_map.len())?;
            for entry in self.layer_map.iter() {
                write!(out, "  - ")?;
                entry.write(out)?;
                writeln!(out, " ;")?;
            }
            writeln!(out, "END LAYERMAP")?;
        }
        if !self.connections.is_empty() {
            writeln!(out, "CONNECTIVITY {} ;", self.connections.len())?;
            for c in self.connections.iter() {
                write!(out, "  - ")?;
                c.write(out)?;
                writeln!(out, " ;")?;
            }
            writeln!(out, "END CONNECTIVITY")?;
        }
        write!(out, "END TECHNOLOGY {}", self.name)?;
        Ok(())
    }
}
