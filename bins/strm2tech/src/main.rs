use anyhow::Context;
use clap::Parser as ClapParser;
use lefvia::{ViaMap, ViaParserError};
use std::path::{Path, PathBuf};
use streammap::parse::{Parser, ParserError};
use streammap::resolve::Policy;
use streammap::LayerMap;
use techconv::Technology;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    eprintln!("input file: {:?}", &args.input_file);
    eprintln!("LEF file: {:?}", &args.lef_file);
    eprintln!("layer name mapper: {}", &args.layer_name_mapper);
    eprintln!("output: {:?}", &args.output_file);
    strm2tech(args)?;
    eprintln!("Technology writing complete.");

    Ok(())
}

/// Arguments to [`strm2tech`].
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Assemble a technology description from a Virtuoso stream layer map \
                  and an optional LEF via file"
)]
pub struct Args {
    /// The path to the input stream layer map.
    #[arg(short, long = "input_file")]
    input_file: PathBuf,
    /// The path where the output technology description should be saved.
    ///
    /// The file and its parent directories will be created if necessary.
    /// If the file already exists, it will be overwritten.
    #[arg(short, long = "output_file")]
    output_file: PathBuf,
    /// The layer name mapping policy: alias, layer, or lpp.
    #[arg(short = 'm', long = "layer_name_mapper", default_value_t)]
    layer_name_mapper: Policy,
    /// The path to a LEF file providing via connectivity.
    #[arg(short, long = "lef_file")]
    lef_file: Option<PathBuf>,
    /// The technology name.
    #[arg(short, long, default_value = "default")]
    name: String,
}

/// Assemble and write a technology description from the given inputs.
pub fn strm2tech(args: Args) -> anyhow::Result<()> {
    let parser = Parser::new(args.layer_name_mapper);
    let map = read_layers(&parser, &args.input_file)?;
    let vias = match args.lef_file {
        Some(ref path) => read_vias(path)?,
        None => ViaMap::new(),
    };

    let tech = Technology::from_maps(&*args.name, &map.sorted(), &vias);
    tech.write_to_file(&args.output_file)
        .with_context(|| format!("Failed to write technology to {:?}.", args.output_file))?;
    Ok(())
}

/// Reads the input map, treating an unopenable file as an empty map.
fn read_layers(parser: &Parser<Policy>, path: &Path) -> anyhow::Result<LayerMap> {
    match parser.parse_file(path) {
        Ok(map) => Ok(map),
        Err(ParserError::FailedToRead { path, .. }) => {
            eprintln!("Error: can't open {}", path.display());
            Ok(LayerMap::new())
        }
        Err(e) => Err(e).with_context(|| "Failed to parse input stream layer map."),
    }
}

/// Reads via stacks, treating an unopenable file as an empty map.
fn read_vias(path: &Path) -> anyhow::Result<ViaMap> {
    match lefvia::parse_file(path) {
        Ok(vias) => Ok(vias),
        Err(ViaParserError::FailedToRead { path, .. }) => {
            eprintln!("Error: can't open {}", path.display());
            Ok(ViaMap::new())
        }
        Err(e) => Err(e).with_context(|| "Failed to parse input LEF file."),
    }
}
