//! Replay camera commands against a recorded embedding without a GPU.
//!
//! Loads the recorded API responses, mounts the headless renderer, applies the
//! requested zoom, runs the clock until animations and timers settle, and prints
//! the resulting frame as JSON.

mod transport;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use embedscope_core::{DataRect, DatasetState, ManualClock, PointIndex, SharedClock};
use embedscope_engine::{AppState, ViewEngine};
use embedscope_io::location::{encode_component, MemoryLocation, CAMERA_PARAM};
use embedscope_io::{ApiClient, ExplorerConfig};
use embedscope_renderer::{CanvasSize, HeadlessFactory};

use transport::FileTransport;

const STEP_MS: u64 = 50;

#[derive(Parser)]
#[command(name = "embedscope-replay", version, about)]
#[command(group(ArgGroup::new("zoom").multiple(false)))]
struct Args {
    /// Recorded `get_embeddings` response
    embeddings: PathBuf,

    /// Recorded `get_embedding_details` response
    #[arg(long)]
    details: Option<PathBuf>,

    /// Explorer config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting camera as "x,y,distance"
    #[arg(long)]
    at: Option<String>,

    #[arg(long, group = "zoom")]
    zoom_to_point: Option<PointIndex>,

    #[arg(long, group = "zoom")]
    zoom_to_origin: bool,

    /// Rectangle as "x,y,width,height"
    #[arg(long, group = "zoom", value_parser = parse_rect)]
    zoom_to_area: Option<DataRect>,

    /// Zoom to the default framing
    #[arg(long, group = "zoom")]
    reset_framing: bool,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Simulated time to run after the command
    #[arg(long, default_value_t = 3000)]
    settle_ms: u64,
}

fn parse_rect(s: &str) -> Result<DataRect, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [x, y, width, height] => Ok(DataRect::new(*x, *y, *width, *height)),
        _ => Err(format!("expected x,y,width,height, got {} values", values.len())),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    let transport = FileTransport::open(
        &config.api_base_url,
        &args.embeddings,
        args.details.as_deref(),
    )?;
    let mut api = ApiClient::new(config.api_base_url.clone(), transport);

    let clock = ManualClock::new();
    let shared: SharedClock = Rc::new(clock.clone());
    let app = AppState::new(shared.clone(), config.error_dismiss_ms);
    let query = args
        .at
        .as_deref()
        .map(|at| format!("{CAMERA_PARAM}={}", encode_component(at)))
        .unwrap_or_default();
    let mut engine = ViewEngine::new(
        config,
        HeadlessFactory::new(shared.clone()),
        MemoryLocation::new(query.clone()),
        &query,
        shared,
        app,
    );
    engine
        .mount(CanvasSize::new(args.width, args.height))
        .context("mounting renderer")?;

    let dataset = match api.fetch_embeddings() {
        Ok(points) => DatasetState::from_points(points),
        Err(err) => DatasetState::Failed(err.to_string()),
    };
    engine.set_dataset(dataset).context("drawing embeddings")?;

    if let Some(handlers) = engine.app().zoom_slot().get() {
        if let Some(index) = args.zoom_to_point {
            handlers.zoom_to_point(index);
        } else if args.zoom_to_origin {
            handlers.zoom_to_origin();
        } else if let Some(rect) = args.zoom_to_area {
            handlers.zoom_to_area(rect);
        } else if args.reset_framing {
            handlers.reset_framing();
        }
    }
    engine.pump();

    for _ in 0..args.settle_ms.div_ceil(STEP_MS) {
        clock.advance(STEP_MS);
        if let Some(renderer) = engine.renderer_mut() {
            renderer.advance();
        }
        engine.pump();
        engine.tick();
        for request in engine.take_label_requests() {
            let result = api.fetch_details(&request.indices);
            engine.resolve_labels(request.ticket, result);
        }
    }

    if engine.renderer().is_some_and(|r| r.is_animating()) {
        log::warn!("Camera still moving after {} ms", args.settle_ms);
    }
    let frame = engine.frame();
    log::info!(
        "Settled at {} in {:?} mode with {} labels",
        frame.camera,
        frame.mode,
        frame.labels.len()
    );
    println!("{}", frame.to_json()?);
    Ok(())
}
