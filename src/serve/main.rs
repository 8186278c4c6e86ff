//! Match server for the mission dashboard.
//!
//! Serves constellation matches for ad-hoc point lists and for the
//! activities of a loaded feed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use asterism::catalog::{CatalogCache, CatalogSource};
use asterism::config::Config;
use asterism::track::{load_activities, ActivityTrack};
use asterism::{GeoPoint, MatchResult, MatchService, RegionIndex};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Constellation match server")]
struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides server.listen)
    #[arg(short, long)]
    listen: Option<String>,

    /// Constellation catalogue file (overrides catalog.path / catalog.url)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Constellation catalogue URL (overrides catalog.path / catalog.url)
    #[arg(long, conflicts_with = "catalog")]
    catalog_url: Option<String>,

    /// Activity feed to expose under /v1/activities
    #[arg(short, long)]
    activities: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Application state shared across handlers
struct AppState {
    cache: CatalogCache,
    service: MatchService,
    tracks: Vec<ActivityTrack>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let source = match (&args.catalog, &args.catalog_url) {
        (Some(path), _) => CatalogSource::File(path.clone()),
        (None, Some(url)) => CatalogSource::Url(url.clone()),
        (None, None) => config.catalog.source()?,
    };
    let listen = args.listen.clone().unwrap_or(config.server.listen.clone());

    info!("Asterism Match Server");
    info!("Loading catalogue from {}", source);

    let cache = CatalogCache::new(source);
    let catalogue = cache
        .load()
        .await
        .context("Failed to load constellation catalogue")?;
    let service = MatchService::new(RegionIndex::build(catalogue));

    let tracks = match args.activities.as_ref().or(config.activities.path.as_ref()) {
        Some(path) => load_activities(path).context("Failed to load activities")?,
        None => {
            info!("No activity feed configured, /v1/activities will be empty");
            Vec::new()
        }
    };

    let state = Arc::new(AppState {
        cache,
        service,
        tracks,
    });

    let app = router(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/match", post(match_handler))
        .route("/v1/activities", get(activities_handler))
        .route("/v1/activities/{index}/match", get(activity_match_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let regions = state.cache.get().map(|c| c.len()).unwrap_or(0);

    Json(HealthResponse {
        status: if regions > 0 { "ok" } else { "degraded" },
        regions,
        activities: state.tracks.len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    regions: usize,
    activities: usize,
}

#[derive(Deserialize)]
struct MatchRequest {
    /// `{lat, lng}` objects or `[lat, lng]` pairs
    points: Vec<GeoPoint>,
}

/// Match an ad-hoc list of points
async fn match_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MatchRequest>,
) -> Json<MatchResult> {
    Json(state.service.best_match(&request.points))
}

#[derive(Serialize)]
struct ActivitySummary {
    index: usize,
    id: i64,
    label: String,
    points: usize,
}

/// List the activities available for matching
async fn activities_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ActivitySummary>> {
    Json(
        state
            .tracks
            .iter()
            .map(|t| ActivitySummary {
                index: t.index,
                id: t.id,
                label: t.label.clone(),
                points: t.points.len(),
            })
            .collect(),
    )
}

#[derive(Serialize)]
struct ActivityMatchResponse {
    index: usize,
    label: String,
    result: MatchResult,
}

/// Match a single activity from the feed
async fn activity_match_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ActivityMatchResponse>, (StatusCode, String)> {
    let track = state
        .tracks
        .iter()
        .find(|t| t.index == index)
        .ok_or_else(|| {
            tracing::debug!("No activity track at position {}", index);
            (
                StatusCode::NOT_FOUND,
                format!("no activity track at position {}", index),
            )
        })?;

    Ok(Json(ActivityMatchResponse {
        index,
        label: track.label.clone(),
        result: state.service.match_track(track),
    }))
}
