//! camfov CLI - trace obstacles and draw camera field-of-view regions
//!
//! Reads JSON scene documents, extracts obstacle curves and writes the
//! resulting regions as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use camfov::{
    dori_distance, dori_layers, heading_indicator, DoriLevel, FovPlanner, FovSettings,
    LayerRequest, MemoryRegionStore, RenderRequest, FOV_LAYER,
};

mod output;
mod scene;

use output::{CameraRecord, DrawOutput, RegionRecord, TraceOutput};
use scene::{LinkFilter, Scene};

const DEFAULT_CONFIG: &str = "camfov.toml";

#[derive(Parser)]
#[command(name = "camfov")]
#[command(about = "Camera field-of-view regions clipped by building obstacles", long_about = None)]
struct Cli {
    /// Settings file (TOML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract obstacle curves from a scene
    Trace {
        /// Scene document
        scene: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Linked models to include: all, none, or comma-separated names
        #[arg(long, default_value = "all")]
        links: String,
    },
    /// Draw field-of-view regions for the cameras of a scene
    Draw {
        /// Scene document
        scene: PathBuf,
        /// Only this camera
        #[arg(long)]
        camera: Option<u64>,
        /// DORI layers to add, e.g. detection,recognition
        #[arg(long, value_delimiter = ',')]
        dori: Vec<String>,
        /// Override the camera range, in meters
        #[arg(long)]
        range: Option<f64>,
        /// Ray spacing in degrees
        #[arg(long)]
        resolution: Option<f64>,
        /// Linked models to include: all, none, or comma-separated names
        #[arg(long, default_value = "all")]
        links: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print DORI distances for a sensor
    Dori {
        /// Horizontal resolution in pixels
        #[arg(long)]
        pixels: Option<u32>,
        /// Field of view in degrees
        #[arg(long)]
        fov: Option<f64>,
    },
    /// Print the effective settings
    Settings {
        /// Write default settings if the file does not exist
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    match cli.command {
        Commands::Trace {
            scene,
            output,
            links,
        } => {
            let settings = load_settings(&config)?;
            trace(&settings, &scene, output.as_deref(), &LinkFilter::parse(&links))?;
        }
        Commands::Draw {
            scene,
            camera,
            dori,
            range,
            resolution,
            links,
            output,
        } => {
            let settings = load_settings(&config)?;
            let levels = dori
                .iter()
                .map(|s| s.parse::<DoriLevel>())
                .collect::<camfov::Result<Vec<_>>>()?;
            let opts = DrawOptions {
                camera,
                levels,
                range,
                resolution,
                links: LinkFilter::parse(&links),
            };
            draw(settings, &scene, &opts, output.as_deref())?;
        }
        Commands::Dori { pixels, fov } => {
            let settings = load_settings(&config)?;
            let pixels = pixels.unwrap_or(settings.horizontal_resolution_px);
            let fov = fov.unwrap_or(settings.default_fov_deg);
            println!("{pixels} px, {fov}° field of view");
            for level in DoriLevel::ALL {
                let d = dori_distance(pixels, fov, level)?;
                println!(
                    "  {:<15} {:>4} px/m  {:>7.1} m",
                    level.to_string(),
                    level.pixels_per_meter(),
                    d
                );
            }
        }
        Commands::Settings { init } => {
            let settings = if init {
                FovSettings::load_or_init(&config)?
            } else {
                load_settings(&config)?
            };
            print!("{}", settings.to_toml_string()?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Settings from `path`, or the defaults when it does not exist.
fn load_settings(path: &Path) -> Result<FovSettings> {
    if path.exists() {
        FovSettings::load(path).with_context(|| format!("cannot load {}", path.display()))
    } else {
        log::debug!("{} not found, using default settings", path.display());
        Ok(FovSettings::default())
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn trace(
    settings: &FovSettings,
    path: &Path,
    output: Option<&Path>,
    links: &LinkFilter,
) -> Result<()> {
    let scene = Scene::load(path)?;
    log::info!("scene {} (version {})", path.display(), scene.version);
    let set = scene.obstacles(&settings.extract_options(), links)?;
    let stats = set.stats();
    eprintln!(
        "{} obstacles ({} duplicates, {} filtered, {} failed)",
        set.len(),
        stats.duplicates,
        stats.filtered,
        stats.failed
    );
    write_json(&TraceOutput::new(&set, scene.unit), output)
}

struct DrawOptions {
    camera: Option<u64>,
    levels: Vec<DoriLevel>,
    range: Option<f64>,
    resolution: Option<f64>,
    links: LinkFilter,
}

fn draw(
    settings: FovSettings,
    path: &Path,
    opts: &DrawOptions,
    output: Option<&Path>,
) -> Result<()> {
    let scene = Scene::load(path)?;
    let obstacles = scene.obstacles(&settings.extract_options(), &opts.links)?;
    let cameras = scene.cameras(opts.camera)?;
    if cameras.is_empty() {
        bail!("scene {} has no cameras", path.display());
    }

    let mut planner = FovPlanner::new(settings)?;
    let mut store = MemoryRegionStore::new();
    let mut out = DrawOutput::default();

    for cam in &cameras {
        let fov_deg = cam.fov_deg.unwrap_or(planner.settings().default_fov_deg);
        let range = opts.range.unwrap_or(cam.range);
        let mut layers = vec![LayerRequest::new(FOV_LAYER, range)];
        layers.extend(dori_layers(
            planner.settings().horizontal_resolution_px,
            fov_deg,
            &opts.levels,
        )?);

        let request = RenderRequest {
            camera: cam.id,
            position: cam.position,
            orientation_deg: cam.heading_deg,
            fov_deg: Some(fov_deg),
            layers,
            resolution_deg: opts.resolution,
        };
        let report = planner
            .render(&mut store, &request, &obstacles)
            .with_context(|| format!("drawing {}", cam.id))?;
        for (key, err) in &report.failed {
            log::warn!("{key} not drawn: {err}");
        }
        out.add_failures(&report);

        let profile = planner.camera_profile(&request, &request.layers[0]);
        let indicator = heading_indicator(&profile).ok();
        out.cameras
            .push(CameraRecord::new(cam.id.0, cam.heading_deg, indicator, scene.unit));
    }

    out.regions = store
        .iter()
        .map(|(_, region)| RegionRecord::new(&region.key, &region.boundary, scene.unit))
        .collect();
    eprintln!(
        "{} region(s) for {} camera(s), {} failed",
        out.regions.len(),
        cameras.len(),
        out.failed.len()
    );
    write_json(&out, output)
}
