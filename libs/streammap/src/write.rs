//! Layer map file writer.

use std::io::Write;
use std::path::Path;

use crate::SortedLayerMap;

/// Writes a layer map file.
///
/// One line per record, in sorted-group order:
/// `<key> <gds_layer> <gds_datatype>`. Keys are written verbatim; quoting of
/// digit-leading names applies only when names are embedded in expressions,
/// not in this file.
pub fn write_layer_map<W: Write>(map: &SortedLayerMap, out: &mut W) -> std::io::Result<()> {
    for (key, group) in map.iter() {
        for record in group.iter() {
            writeln!(out, "{} {} {}", key, record.gds.0, record.gds.1)?;
        }
    }
    Ok(())
}

/// Writes a layer map file to the given path.
///
/// The parent directory will be created if it does not exist.
pub fn write_layer_map_to_file(
    map: &SortedLayerMap,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    write_layer_map(map, &mut file)
}
