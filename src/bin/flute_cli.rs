use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use virtual_flute::analysis::{FingeringClassifier, NOTE_TABLE};
use virtual_flute::audio::synth::{generate_note_set, DEFAULT_NOTE_DURATION};
use virtual_flute::config::AppConfig;
use virtual_flute::fixtures::{ExpectationDiff, FixtureCatalog, FixtureProcessor, FixtureRun};

#[derive(Parser, Debug)]
#[command(
    name = "flute_cli",
    about = "Virtual flute tools: fixture replay, note generation, and audition"
)]
struct Cli {
    /// Override directory containing fixture scripts (defaults to ./fixtures)
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,
    /// JSON configuration file (defaults apply when missing)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a frame script and optionally compare against its expectations
    Replay {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List fixture scripts on disk
    ListFixtures,
    /// Synthesize the eight note samples as WAV files
    GenerateNotes {
        #[arg(long, default_value = "notes")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
        #[arg(long)]
        duration_ms: Option<u64>,
    },
    /// Play every note sample once through the default output device
    TestNotes {
        #[arg(long)]
        notes_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 1_000)]
        hold_ms: u64,
    },
    /// Print the fingering table
    Fingerings,
    /// Print the effective configuration as JSON
    DumpConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };
    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_default();

    match cli.command {
        Commands::Replay { fixture, output } => run_replay(&catalog, config, &fixture, output),
        Commands::ListFixtures => run_list(&catalog),
        Commands::GenerateNotes {
            out_dir,
            sample_rate,
            duration_ms,
        } => run_generate(&out_dir, sample_rate, duration_ms),
        Commands::TestNotes { notes_dir, hold_ms } => {
            let notes_dir = notes_dir.unwrap_or_else(|| config.audio.notes_dir.clone());
            run_test_notes(&config, &notes_dir, Duration::from_millis(hold_ms))
        }
        Commands::Fingerings => run_fingerings(&config),
        Commands::DumpConfig => {
            config.validate().context("validating configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::from(0))
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn run_replay(
    catalog: &FixtureCatalog,
    config: AppConfig,
    fixture: &str,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let script = catalog.load(fixture)?;
    let run = FixtureProcessor::new(config)
        .run(&script)
        .with_context(|| format!("replaying fixture {}", fixture))?;

    emit_report(&run, output_path)?;

    if let Some(expectations) = script.expectations() {
        match expectations.verify(&run.frames) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_list(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let names = catalog.discover()?;
    if names.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }
    for name in names {
        println!("{name}");
    }
    Ok(ExitCode::from(0))
}

fn run_generate(out_dir: &Path, sample_rate: u32, duration_ms: Option<u64>) -> Result<ExitCode> {
    let duration = duration_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_NOTE_DURATION);
    let written = generate_note_set(out_dir, sample_rate, duration)
        .with_context(|| format!("generating notes into {}", out_dir.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(ExitCode::from(0))
}

#[cfg(feature = "live_audio")]
fn run_test_notes(config: &AppConfig, notes_dir: &Path, hold: Duration) -> Result<ExitCode> {
    use virtual_flute::analysis::Note;
    use virtual_flute::audio::{CueOutput, CueSink};

    let (output, sink) = CueOutput::open(notes_dir, config.audio.cue_queue_capacity)
        .context("opening audio output")?;
    println!("Output at {} Hz", output.sample_rate());

    for note in Note::ALL {
        if !sink.has_cue(note) {
            println!("{note}: missing");
            continue;
        }
        println!("{note}: {:.2} Hz", note.frequency_hz());
        sink.trigger(note);
        std::thread::sleep(hold);
    }
    Ok(ExitCode::from(0))
}

#[cfg(not(feature = "live_audio"))]
fn run_test_notes(_config: &AppConfig, _notes_dir: &Path, _hold: Duration) -> Result<ExitCode> {
    anyhow::bail!("test-notes needs audio output; rebuild with `--features live_audio`")
}

fn run_fingerings(config: &AppConfig) -> Result<ExitCode> {
    let classifier = FingeringClassifier::from_config(&config.classifier);
    println!("note  fingering  freq_hz  (1 = hole open, LI LM LR LP RI RM RR RP)");
    for (note, pattern) in NOTE_TABLE {
        let (_, score) = classifier.best_match(pattern);
        println!(
            "{:<4}  {}   {:>7.2}  score {}",
            note.name(),
            pattern,
            note.frequency_hz(),
            score
        );
    }
    Ok(ExitCode::from(0))
}

fn emit_report(run: &FixtureRun, output_path: Option<PathBuf>) -> Result<()> {
    let report = ReplayReportPayload {
        frame_count: run.frames.len(),
        event_count: run.events.len(),
        run,
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct ReplayReportPayload<'a> {
    frame_count: usize,
    event_count: usize,
    #[serde(flatten)]
    run: &'a FixtureRun,
}
