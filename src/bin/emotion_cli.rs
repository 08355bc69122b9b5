use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emotion_sense::analysis::FrameResult;
use emotion_sense::config::ClassifierConfig;
use emotion_sense::fixtures::{
    ExpectationDiff, FixtureCatalog, FixtureProcessor, FixtureSummary,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "emotion_cli",
    about = "Deterministic fixture harness for the emotion classifier"
)]
struct Cli {
    /// Override directory containing fixture scripts (defaults to ./fixtures)
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,
    /// Classifier configuration JSON (defaults to built-in tuning)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a fixture and optionally compare against expectations
    Classify {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Stream per-frame results for a fixture to stdout as JSON lines
    Stream {
        #[arg(long)]
        fixture: String,
        /// Only print frames where the reported state changed
        #[arg(long)]
        changes_only: bool,
    },
    /// List available fixtures on disk
    DumpFixtures,
    /// Print the effective classifier configuration
    PrintConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

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
    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_default();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Classify {
            fixture,
            expect,
            output,
        } => run_classify(&catalog, config, &fixture, expect, output),
        Commands::Stream {
            fixture,
            changes_only,
        } => run_stream(&catalog, config, &fixture, changes_only),
        Commands::DumpFixtures => run_dump(&catalog),
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::from(0))
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => ClassifierConfig::try_load_from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ClassifierConfig::default()),
    }
}

fn run_classify(
    catalog: &FixtureCatalog,
    config: ClassifierConfig,
    fixture: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(config);
    let data = catalog.load(fixture, override_expect)?;
    let actual = processor
        .run(&data)
        .with_context(|| format!("processing fixture {}", fixture))?;

    emit_report(&data.metadata.name, data.script.frame_dt, &actual, output_path)?;

    if let Some(expectations) = data.expectations {
        match expectations.verify(&actual) {
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

fn run_stream(
    catalog: &FixtureCatalog,
    config: ClassifierConfig,
    fixture: &str,
    changes_only: bool,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(config);
    let data = catalog.load(fixture, None)?;
    let actual = processor
        .run(&data)
        .with_context(|| format!("processing fixture {}", fixture))?;

    for result in actual
        .iter()
        .filter(|result| !changes_only || result.switched.is_some())
    {
        println!("{}", serde_json::to_string(result)?);
    }

    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    if fixtures.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for metadata in fixtures {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    Ok(ExitCode::from(0))
}

fn emit_report(
    fixture: &str,
    frame_dt: f32,
    results: &[FrameResult],
    output_path: Option<PathBuf>,
) -> Result<()> {
    let report = FixtureReportPayload {
        fixture,
        frame_dt,
        summary: FixtureSummary::from_results(results),
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
struct FixtureReportPayload<'a> {
    fixture: &'a str,
    frame_dt: f32,
    #[serde(flatten)]
    summary: FixtureSummary,
}
