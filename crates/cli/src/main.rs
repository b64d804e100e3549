use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use photo_events_core::grouping::domain::extras_resolver::SharedFaceMatching;
use photo_events_core::pipeline::cluster_config::{ClusterConfig, ResolverKind};
use photo_events_core::pipeline::cluster_events_use_case::ClusterEventsUseCase;
use photo_events_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use photo_events_core::shared::constants::MAX_BATCH_SIZE;
use photo_events_core::shared::photo_record::PhotoRecord;

/// Cluster a batch of photos into events by who appears in them.
#[derive(Parser)]
#[command(name = "photo-events")]
struct Cli {
    /// JSON file holding the batch: an array of photo records.
    input: PathBuf,

    /// Write the result JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity resolver: dbscan or greedy_anchor.
    #[arg(long)]
    resolver: Option<String>,

    /// Cosine-distance radius for merging faces into one identity.
    #[arg(long)]
    identity_epsilon: Option<f64>,

    /// Minimum faces per identity (2 discards singletons as noise).
    #[arg(long)]
    min_identity_size: Option<usize>,

    /// Cosine similarity for the greedy_anchor resolver.
    #[arg(long)]
    anchor_threshold: Option<f64>,

    /// Outfit distance below which photos stay in one event.
    #[arg(long)]
    outfit_threshold: Option<f64>,

    /// Shared-face ratio needed to attach a leftover photo to an event.
    #[arg(long)]
    extras_ratio: Option<f64>,

    /// How leftover faces match events: identity_label or cosine.
    #[arg(long)]
    extras_matching: Option<String>,

    /// Cosine similarity for cosine extras matching.
    #[arg(long)]
    match_threshold: Option<f64>,

    /// Maximum photos per batch (default 20).
    #[arg(long, conflicts_with = "no_batch_limit")]
    max_batch: Option<usize>,

    /// Accept batches of any size.
    #[arg(long)]
    no_batch_limit: bool,

    /// Pretty-print the result JSON.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if let Some(path) = cluster_batch(&cli)? {
        log::info!("Result written to {}", path.display());
    }
    Ok(())
}

/// Clusters the input batch and writes the result JSON.
///
/// Returns the output path, or `None` when the result went to stdout.
fn cluster_batch(cli: &Cli) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }

    let config = build_config(&cli)?;
    log::info!(
        "Resolver {}, epsilon {}, outfit threshold {}, extras ratio {}",
        config.resolver,
        config.identity_epsilon,
        config.outfit_threshold,
        config.extras_ratio
    );

    let photos = read_batch(&cli.input)?;
    let mut use_case = ClusterEventsUseCase::new(config, Box::new(StdoutPipelineLogger::new()))?;
    let report = use_case.execute(&photos)?;
    use_case.summary();

    for line in report.summary_lines() {
        log::info!("{line}");
    }

    let result = report.to_result();
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, json)?;
            Ok(Some(path.clone()))
        }
        None => {
            println!("{json}");
            Ok(None)
        }
    }
}

fn build_config(cli: &Cli) -> Result<ClusterConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ClusterConfig::load(path)?,
        None => ClusterConfig::default(),
    };

    if let Some(resolver) = &cli.resolver {
        config.resolver = parse_resolver(resolver)?;
    }
    if let Some(v) = cli.identity_epsilon {
        config.identity_epsilon = v;
    }
    if let Some(v) = cli.min_identity_size {
        config.min_identity_size = v;
    }
    if let Some(v) = cli.anchor_threshold {
        config.anchor_threshold = v;
    }
    if let Some(v) = cli.outfit_threshold {
        config.outfit_threshold = v;
    }
    if let Some(v) = cli.extras_ratio {
        config.extras_ratio = v;
    }
    if let Some(matching) = &cli.extras_matching {
        config.extras_matching = parse_matching(matching)?;
    }
    if let Some(v) = cli.match_threshold {
        config.match_threshold = v;
    }
    if cli.no_batch_limit {
        config.max_batch_size = None;
    } else if let Some(v) = cli.max_batch {
        config.max_batch_size = Some(v);
    } else if config.max_batch_size.is_none() {
        config.max_batch_size = Some(MAX_BATCH_SIZE);
    }

    config.validate()?;
    Ok(config)
}

fn read_batch(path: &Path) -> Result<Vec<PhotoRecord>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    let photos: Vec<PhotoRecord> = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid batch file {}: {e}", path.display()))?;
    log::info!("Loaded {} photos from {}", photos.len(), path.display());
    Ok(photos)
}

fn parse_resolver(name: &str) -> Result<ResolverKind, String> {
    match name {
        "dbscan" => Ok(ResolverKind::Dbscan),
        "greedy_anchor" | "greedy-anchor" => Ok(ResolverKind::GreedyAnchor),
        other => Err(format!(
            "Resolver must be 'dbscan' or 'greedy_anchor', got '{other}'"
        )),
    }
}

fn parse_matching(name: &str) -> Result<SharedFaceMatching, String> {
    match name {
        "identity_label" | "label" => Ok(SharedFaceMatching::IdentityLabel),
        "cosine" => Ok(SharedFaceMatching::Cosine),
        other => Err(format!(
            "Extras matching must be 'identity_label' or 'cosine', got '{other}'"
        )),
    }
}
