use anyhow::Context;
use clap::Parser as ClapParser;
use std::path::{Path, PathBuf};
use streammap::parse::{Parser, ParserError};
use streammap::resolve::Policy;
use streammap::write::write_layer_map_to_file;
use streammap::LayerMap;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    eprintln!("input file: {:?}", &args.input_file);
    eprintln!("layer name mapper: {}", &args.layer_name_mapper);
    eprintln!("output: {:?}", &args.output_file);
    strm2lmap(args)?;
    eprintln!("Layer map writing complete.");

    Ok(())
}

/// Arguments to [`strm2lmap`].
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Convert a Virtuoso stream layer map to a two-column layer map file"
)]
pub struct Args {
    /// The path to the input stream layer map.
    #[arg(short, long = "input_file")]
    input_file: PathBuf,
    /// The path where the output layer map should be saved.
    ///
    /// The file and its parent directories will be created if necessary.
    /// If the file already exists, it will be overwritten.
    #[arg(short, long = "output_file")]
    output_file: PathBuf,
    /// The layer name mapping policy: alias, layer, or lpp.
    #[arg(short = 'm', long = "layer_name_mapper", default_value_t)]
    layer_name_mapper: Policy,
}

/// Convert the given stream layer map to a layer map file.
pub fn strm2lmap(args: Args) -> anyhow::Result<()> {
    let parser = Parser::new(args.layer_name_mapper);
    let map = read_input(&parser, &args.input_file)?;
    write_layer_map_to_file(&map.sorted(), &args.output_file)
        .with_context(|| format!("Failed to write layer map to {:?}.", args.output_file))?;
    Ok(())
}

/// Reads the input map, treating an unopenable file as an empty map.
fn read_input(parser: &Parser<Policy>, path: &Path) -> anyhow::Result<LayerMap> {
    match parser.parse_file(path) {
        Ok(map) => Ok(map),
        Err(ParserError::FailedToRead { path, .. }) => {
            eprintln!("Error: can't open {}", path.display());
            Ok(LayerMap::new())
        }
        Err(e) => Err(e).with_context(|| "Failed to parse input stream layer map."),
    }
}
