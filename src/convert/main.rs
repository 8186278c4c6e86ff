//! Converts the IAU constellation boundary listing into a GeoJSON catalogue.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use asterism::catalog::{parse_boundaries, write_feature_collection};

#[derive(Parser, Debug)]
#[command(name = "convert")]
#[command(about = "Convert constbnd.dat into a constellation GeoJSON catalogue")]
struct Args {
    /// Boundary listing (ra hours, dec degrees, constellation codes)
    #[arg(short, long, default_value = "data/constbnd.dat")]
    input: PathBuf,

    /// Output GeoJSON file
    #[arg(short, long, default_value = "data/const.geojson")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Reading boundaries from {}", args.input.display());
    let file = File::open(&args.input).context("Failed to open boundary listing")?;
    let boundaries = parse_boundaries(BufReader::new(file))?;

    let features = boundaries.into_features();
    let count = features.len();

    let out = File::create(&args.output).context("Failed to create output file")?;
    let mut writer = BufWriter::new(out);
    write_feature_collection(features, &mut writer)?;
    writer.flush()?;

    info!("Wrote {} constellations to {}", count, args.output.display());
    Ok(())
}
