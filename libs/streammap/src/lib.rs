//! Virtuoso stream layer map parsing and grouping.
//!
//! A stream layer map lists layer/purpose pairs together with their GDS
//! layer/datatype codes, one record per line. This crate parses such files
//! into a [`LayerMap`]: records grouped under a resolved layer name, with
//! both group order and in-group record order matching the input file.
//! [`LayerMap::sorted`] produces the deterministically ordered view consumed
//! by downstream writers.

pub mod parse;
pub mod resolve;
pub mod write;

#[cfg(test)]
mod tests;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A GDS layer specification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct GdsLayer(pub u16, pub u16);

impl Display for GdsLayer {
    /// Formats the layer as `layer/datatype`, e.g. `99/0`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// A single record from a stream layer map file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// The vendor layer name.
    pub layer: ArcStr,
    /// The purpose name.
    pub purpose: ArcStr,
    /// The GDS layer/datatype pair.
    pub gds: GdsLayer,
    /// The design-manual alias from the trailing comment, if any.
    pub alias: Option<ArcStr>,
}

/// Records sharing one resolved key, in input order.
///
/// The first record is significant: downstream formats that can represent
/// only one mapping per layer always take `group[0]`.
pub type LayerGroup = Vec<LayerRecord>;

/// A grouped stream layer map keyed by resolved layer name.
///
/// Iteration order is key-insertion order, which in turn is the order in
/// which keys first appeared in the input file.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LayerMap {
    groups: IndexMap<ArcStr, LayerGroup>,
}

impl LayerMap {
    /// Creates an empty layer map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the group for `key`, creating the group if absent.
    ///
    /// Never replaces existing records; first-seen order is preserved.
    pub fn insert(&mut self, key: ArcStr, record: LayerRecord) {
        self.groups.entry(key).or_default().push(record);
    }

    /// Returns the group for the given key, if any.
    pub fn get(&self, key: &str) -> Option<&LayerGroup> {
        self.groups.get(key)
    }

    /// Iterates over `(key, group)` pairs in key-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &LayerGroup)> {
        self.groups.iter()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ArcStr> {
        self.groups.keys()
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if the map contains no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Produces a view of this map ordered by the GDS layer number of each
    /// group's first record.
    ///
    /// The sort is stable and ascending: groups with equal layer numbers keep
    /// their relative key-insertion order, so sorting an already-sorted map
    /// changes nothing.
    pub fn sorted(&self) -> SortedLayerMap<'_> {
        let mut entries: Vec<_> = self.groups.iter().collect();
        entries.sort_by_key(|(_, group)| {
            group
                .first()
                .expect("layer groups must not be empty")
                .gds
                .0
        });
        SortedLayerMap { entries }
    }
}

/// A [`LayerMap`] view in deterministic output order.
///
/// See [`LayerMap::sorted`].
#[derive(Debug, Clone)]
pub struct SortedLayerMap<'a> {
    entries: Vec<(&'a ArcStr, &'a LayerGroup)>,
}

impl<'a> SortedLayerMap<'a> {
    /// Iterates over `(key, group)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a ArcStr, &'a LayerGroup)> + '_ {
        self.entries.iter().map(|&(k, g)| (k, g))
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the view contains no groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
