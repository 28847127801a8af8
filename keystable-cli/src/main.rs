use clap::Parser;
use keystable::io::{FileImageSource, OverlayFileSink};
use keystable::{
    match_against_store, DetectConfig, Detector, ImageSource, Keypoint, KeypointStore, Matcher,
    MemoryStore, RenderSink, Tolerance,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Stable keypoint detection and matching (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    gradient_threshold: f64,
    size: usize,
    sigma: f64,
    parallel: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            gradient_threshold: cfg.gradient_threshold,
            size: cfg.size,
            sigma: cfg.sigma,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectConfigJson> for DetectConfig {
    fn from(value: DetectConfigJson) -> Self {
        Self {
            gradient_threshold: value.gradient_threshold,
            size: value.size,
            sigma: value.sigma,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToleranceJson {
    gradient_magnitude: f64,
    gradient_orientation: f64,
    descriptor_mean: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    render_path: Option<String>,
    reference_path: Option<String>,
    store_path: Option<String>,
    sizes: Option<Vec<usize>>,
    detect: DetectConfigJson,
    tolerance: ToleranceJson,
}

#[derive(Debug, Serialize)]
struct KeypointRecord {
    x: usize,
    y: usize,
    descriptor_mean: f64,
    gradient_magnitude: f64,
    gradient_orientation: f64,
}

impl From<Keypoint> for KeypointRecord {
    fn from(value: Keypoint) -> Self {
        Self {
            x: value.x,
            y: value.y,
            descriptor_mean: value.descriptor_mean,
            gradient_magnitude: value.gradient_magnitude,
            gradient_orientation: value.gradient_orientation,
        }
    }
}

fn records(keypoints: Vec<Keypoint>) -> Vec<KeypointRecord> {
    keypoints.into_iter().map(KeypointRecord::from).collect()
}

#[derive(Debug, Serialize)]
struct Output {
    keypoints: Vec<KeypointRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_matches: Option<Vec<KeypointRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_matches: Option<Vec<KeypointRecord>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("keystable=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let tolerance = Tolerance::new(
        config.tolerance.gradient_magnitude,
        config.tolerance.gradient_orientation,
        config.tolerance.descriptor_mean,
    )?;
    let detector = Detector::new(config.detect.into());
    let detect = |source: &FileImageSource| -> Result<Vec<Keypoint>, keystable::KeystableError> {
        match &config.sizes {
            Some(sizes) => detector.detect_stable_with_sizes(&source.get_pixel_buffer()?, sizes),
            None => detector.detect_stable_from(source),
        }
    };

    let source = FileImageSource::new(&config.image_path);
    let keypoints = detect(&source)?;
    tracing::info!(count = keypoints.len(), "stable keypoints detected");

    if let Some(path) = &config.render_path {
        let image = source.get_pixel_buffer()?;
        OverlayFileSink::new(path).render(&image, &keypoints)?;
    }

    let reference_matches = match &config.reference_path {
        Some(path) => {
            let reference = detect(&FileImageSource::new(path))?;
            let matcher = Matcher::new(reference).with_tolerance(tolerance);
            Some(records(matcher.match_queries(&keypoints)))
        }
        None => None,
    };

    let store_matches = match &config.store_path {
        Some(path) => {
            let mut store = MemoryStore::open(path)?;
            let matches = match_against_store(&store, &keypoints, &tolerance)?;
            store.insert_many(&keypoints)?;
            store.save(path)?;
            Some(records(matches))
        }
        None => None,
    };

    let output = Output {
        keypoints: records(keypoints),
        reference_matches,
        store_matches,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
