//! Batch matcher.
//!
//! Loads an activity feed and a constellation catalogue, then prints the
//! best-matching constellation for each activity as one JSON line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use asterism::catalog::{CatalogCache, CatalogSource};
use asterism::config::Config;
use asterism::track::{load_activities, ActivityTrack};
use asterism::{match_regions, MatchResult, MatchService, RegionIndex};

#[derive(Parser, Debug)]
#[command(name = "matcher")]
#[command(about = "Match recorded activities to IAU constellations")]
struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Constellation catalogue (GeoJSON, optionally gzipped)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Activity feed (JSON array of activities)
    #[arg(short, long)]
    activities: Option<PathBuf>,

    /// Only match the activity at this feed position
    #[arg(long)]
    activity: Option<usize>,

    /// Score every region instead of using the spatial index
    #[arg(long)]
    full_scan: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct MatchLine<'a> {
    index: usize,
    id: i64,
    label: &'a str,
    #[serde(flatten)]
    result: MatchResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let source = match &args.catalog {
        Some(path) => CatalogSource::File(path.clone()),
        None => config.catalog.source()?,
    };
    let activities_path = args
        .activities
        .clone()
        .or(config.activities.path.clone())
        .context("No activity feed given (use --activities or activities.path)")?;

    info!("Asterism Matcher");
    info!("Catalogue: {}", source);

    let cache = CatalogCache::new(source);
    let catalogue = cache
        .load()
        .await
        .context("Failed to load constellation catalogue")?;

    let mut tracks = load_activities(&activities_path).context("Failed to load activities")?;
    if let Some(wanted) = args.activity {
        tracks.retain(|t| t.index == wanted);
        if tracks.is_empty() {
            anyhow::bail!("No activity with a track at position {}", wanted);
        }
    }
    if tracks.is_empty() {
        warn!("Activity feed has no tracks to match");
        return Ok(());
    }

    let service = MatchService::new(RegionIndex::build(Arc::clone(&catalogue)));

    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let results: Vec<(&ActivityTrack, MatchResult)> = tracks
        .par_iter()
        .map(|track| {
            let result = if args.full_scan {
                match_regions(&track.points, &catalogue)
            } else {
                service.match_track(track)
            };
            pb.inc(1);
            (track, result)
        })
        .collect();
    pb.finish_and_clear();

    let matched = results.iter().filter(|(_, r)| r.is_match()).count();
    info!("Matched {}/{} activities", matched, results.len());

    for (track, result) in results {
        let line = MatchLine {
            index: track.index,
            id: track.id,
            label: &track.label,
            result,
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(())
}
