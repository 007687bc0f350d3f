//! plan-mix - Inspect the crossfade the engine would run
//!
//! Analyzes two WAV files as an outgoing/incoming pair, validates the
//! transition, and prints the resulting crossfade plan. Useful for
//! tuning cue detection and transition settings against real material
//! without wiring up a player.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use segue_common::config::EngineConfig;
use segue_common::key::CamelotKey;
use segue_common::types::{TrackAnalysis, TrackInfo};
use segue_engine::analysis::SampleSource;
use segue_engine::executor::NullDeck;
use segue_engine::transition::{CrossfadeConfig, ValidationResult};
use segue_engine::SegueEngine;

/// Command-line arguments for plan-mix
#[derive(Parser, Debug)]
#[command(name = "plan-mix")]
#[command(about = "Analyze two tracks and print the crossfade plan")]
#[command(version)]
struct Args {
    /// WAV file for the outgoing (currently playing) track
    outgoing: PathBuf,

    /// WAV file for the incoming (next) track
    incoming: PathBuf,

    /// BPM of the outgoing track
    #[arg(long)]
    bpm_out: Option<f64>,

    /// BPM of the incoming track
    #[arg(long)]
    bpm_in: Option<f64>,

    /// Camelot key of the outgoing track, e.g. 8A
    #[arg(long)]
    key_out: Option<String>,

    /// Camelot key of the incoming track, e.g. 8A
    #[arg(long)]
    key_in: Option<String>,

    /// Manual outro cue for the outgoing track, normalized to [0, 1]
    #[arg(long)]
    outro_out: Option<f64>,

    /// Manual intro cue for the incoming track, normalized to [0, 1]
    #[arg(long)]
    intro_in: Option<f64>,

    /// Engine configuration file (TOML)
    #[arg(short, long, env = "SEGUE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

/// Streams samples out of a WAV file in fixed-size blocks
struct WavSource {
    reader: hound::WavReader<std::io::BufReader<std::fs::File>>,
    sample_rate: u32,
    channels: usize,
}

const BLOCK_SAMPLES: usize = 8192;

impl WavSource {
    fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels as usize,
            reader,
        })
    }

    fn duration_seconds(&self) -> f64 {
        f64::from(self.reader.duration()) / f64::from(self.sample_rate)
    }
}

impl SampleSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn next_block(&mut self) -> segue_engine::Result<Option<Vec<f32>>> {
        let spec = self.reader.spec();
        let mut block = Vec::with_capacity(BLOCK_SAMPLES);
        match spec.sample_format {
            hound::SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(BLOCK_SAMPLES) {
                    let s = sample
                        .map_err(|e| segue_engine::Error::Analysis(format!("WAV read error: {}", e)))?;
                    block.push(s);
                }
            }
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                for sample in self.reader.samples::<i32>().take(BLOCK_SAMPLES) {
                    let s = sample
                        .map_err(|e| segue_engine::Error::Analysis(format!("WAV read error: {}", e)))?;
                    block.push(s as f32 / scale);
                }
            }
        }
        if block.is_empty() {
            Ok(None)
        } else {
            Ok(Some(block))
        }
    }
}

/// Everything the run produced, for the --json output
#[derive(Serialize)]
struct PlanReport {
    outgoing: TrackAnalysis,
    incoming: TrackAnalysis,
    validation: ValidationResult,
    plan: CrossfadeConfig,
}

fn build_track(
    path: &Path,
    source: &WavSource,
    bpm: Option<f64>,
    key: Option<&str>,
    intro_cue: Option<f64>,
    outro_cue: Option<f64>,
) -> Result<TrackInfo> {
    let mut track = TrackInfo::new(Uuid::new_v4(), source.duration_seconds());
    track.title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string());
    track.bpm = bpm;
    track.key = key
        .map(|k| CamelotKey::parse(k).with_context(|| format!("Invalid Camelot key '{}'", k)))
        .transpose()?;
    track.cues.intro_end = intro_cue;
    track.cues.outro_start = outro_cue;
    Ok(track)
}

fn describe_track(label: &str, track: &TrackInfo, analysis: &TrackAnalysis) {
    println!(
        "{}: {} ({:.1}s{}{})",
        label,
        track.display_title(),
        track.duration_seconds,
        track
            .bpm
            .map(|b| format!(", {:.1} BPM", b))
            .unwrap_or_default(),
        track
            .key
            .map(|k| format!(", {}", k))
            .unwrap_or_default(),
    );
    println!(
        "  intro end    {:.3}  ({:?})",
        analysis.intro_end, analysis.intro_source
    );
    println!(
        "  outro start  {:.3}  ({:?})",
        analysis.outro_start, analysis.outro_source
    );
    println!(
        "  gradient     {:.3}  -> {} transition",
        analysis.energy_gradient, analysis.transition_type
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "segue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let engine = SegueEngine::new(config, Arc::new(NullDeck));

    let outgoing_source = WavSource::open(&args.outgoing)?;
    let incoming_source = WavSource::open(&args.incoming)?;

    let outgoing = build_track(
        &args.outgoing,
        &outgoing_source,
        args.bpm_out,
        args.key_out.as_deref(),
        None,
        args.outro_out,
    )?;
    let incoming = build_track(
        &args.incoming,
        &incoming_source,
        args.bpm_in,
        args.key_in.as_deref(),
        args.intro_in,
        None,
    )?;

    let outgoing_analysis = engine
        .request_analysis(outgoing.clone(), Box::new(outgoing_source))
        .await
        .context("Analysis of the outgoing track failed")?;
    let incoming_analysis = engine
        .request_analysis(incoming.clone(), Box::new(incoming_source))
        .await
        .context("Analysis of the incoming track failed")?;

    let validation = engine.validate(&outgoing, &incoming);
    let plan = engine.compute_crossfade(&outgoing, &incoming).await;

    if args.json {
        let report = PlanReport {
            outgoing: (*outgoing_analysis).clone(),
            incoming: (*incoming_analysis).clone(),
            validation,
            plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    describe_track("Outgoing", &outgoing, &outgoing_analysis);
    describe_track("Incoming", &incoming, &incoming_analysis);

    println!(
        "Validation: beat match {}, keys {}{}",
        if validation.beat_match_possible {
            "ok"
        } else {
            "not possible"
        },
        if validation.key_compatible {
            "compatible"
        } else {
            "clashing"
        },
        validation
            .reason
            .as_deref()
            .map(|r| format!(" ({})", r))
            .unwrap_or_default(),
    );

    match &plan.fallback_reason {
        Some(reason) => println!(
            "Plan: fixed {:.1}s linear ramp at {:.3} ({})",
            plan.duration_seconds, plan.start_position, reason
        ),
        None => {
            println!(
                "Plan: {:.2}s {} ramp over {:.1} beats, starting at {:.3}",
                plan.duration_seconds, plan.curve, plan.beats, plan.start_position
            );
            println!("  incoming fades in from {:.3}", plan.fade_in_start);
            match &plan.sync {
                Some(sync) => println!(
                    "  beat sync: rate ratio {:.4} ({:.1} -> {:.1} BPM)",
                    sync.rate_ratio, sync.incoming_bpm, sync.outgoing_bpm
                ),
                None => println!("  beat sync: off"),
            }
        }
    }

    Ok(())
}
