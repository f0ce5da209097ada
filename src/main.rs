//! gridflow command line
//!
//! Runs and validates pipeline files and lists the built-in filters.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gridflow::{
    config::{EngineSettings, PipelineFile},
    data::ContainerRegistry,
    pipeline::{ChannelObserver, FilterKind, Pipeline, PipelineMessage, ParameterValue, RunReport},
    GridFlowError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gridflow", version, about = "Dataflow pipelines for voxel datasets")]
struct Cli {
    /// Log at debug level regardless of settings
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and execute a pipeline file
    Run {
        pipeline: PathBuf,

        /// Restore the data when the run fails or is cancelled
        #[arg(long)]
        rollback: bool,
    },
    /// Preflight a pipeline file without executing it
    Validate { pipeline: PathBuf },
    /// List built-in filters and their parameters
    Filters,
}

fn init_logging(settings: &EngineSettings, verbose: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "gridflow=debug"
    } else {
        settings.log_filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, "gridflow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// An explicit settings file must load. The default one falls back to
/// defaults, handing back the error to log once logging is running.
fn load_settings(path: Option<&Path>) -> anyhow::Result<(EngineSettings, Option<GridFlowError>)> {
    match path {
        Some(path) => Ok((EngineSettings::load(path)?, None)),
        None => Ok(EngineSettings::load_or_default()),
    }
}

/// Point IO filters left at the default store root at the configured one.
fn apply_store_root(pipeline: &mut Pipeline, settings: &EngineSettings) -> anyhow::Result<()> {
    let root = settings.store_root.to_string_lossy().to_string();
    for index in 0..pipeline.len() {
        let Some(filter) = pipeline.filter_mut(index) else {
            continue;
        };
        if filter.parameter("store_root") == Some(ParameterValue::Text(".".to_string())) {
            filter.set_parameter("store_root", ParameterValue::Text(root.clone()))?;
        }
    }
    Ok(())
}

fn load_pipeline(path: &Path, settings: &EngineSettings) -> anyhow::Result<Pipeline> {
    let file = PipelineFile::load(path)?;
    let mut pipeline = file
        .build()
        .with_context(|| format!("Failed to build pipeline from {:?}", path))?;
    apply_store_root(&mut pipeline, settings)?;
    Ok(pipeline)
}

fn print_report(report: &RunReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic);
    }
    let elapsed = report.finished_at - report.started_at;
    println!(
        "{}: {} ({} filters executed, {} ms{})",
        report.pipeline,
        report.state,
        report.filters_executed,
        elapsed.num_milliseconds(),
        if report.rolled_back { ", rolled back" } else { "" }
    );
}

fn run(path: &Path, rollback: bool, settings: &EngineSettings) -> anyhow::Result<RunReport> {
    let mut pipeline = load_pipeline(path, settings)?;
    let (mut observer, rx) = ChannelObserver::bounded(settings.progress_channel_capacity);
    let rollback = rollback || settings.rollback_on_failure;

    let worker = std::thread::spawn(move || {
        let mut registry = ContainerRegistry::new();
        let report = if rollback {
            pipeline.run_with_rollback(&mut registry, &mut observer)
        } else {
            pipeline.run(&mut registry, &mut observer)
        };
        if observer.dropped() > 0 {
            tracing::warn!(dropped = observer.dropped(), "Progress messages dropped");
        }
        report
    });

    // Ends once the worker drops the observer.
    for msg in rx.iter() {
        match msg {
            PipelineMessage::FilterStarted { index, phase, name } => {
                tracing::debug!(index, phase = phase.display_name(), filter = %name, "Filter started");
            }
            PipelineMessage::Progress { index, percent, status } => {
                eprintln!("[{}] {:>3}% {}", index, percent, status);
            }
            _ => {}
        }
    }

    match worker.join() {
        Ok(report) => Ok(report),
        Err(_) => bail!("Pipeline worker panicked"),
    }
}

fn validate(path: &Path, settings: &EngineSettings) -> anyhow::Result<RunReport> {
    let mut pipeline = load_pipeline(path, settings)?;
    let registry = ContainerRegistry::new();
    Ok(pipeline.preflight(&registry, &mut gridflow::pipeline::LogObserver))
}

fn list_filters() {
    for kind in FilterKind::all() {
        let filter = kind.create();
        println!("{} ({}) [{}]", kind.id(), kind.display_name(), filter.group());
        for line in kind.description().lines() {
            println!("    {}", line.trim());
        }
        for info in filter.parameters() {
            let units = if info.units.is_empty() {
                String::new()
            } else {
                format!(" {}", info.units)
            };
            println!(
                "    - {}: {} = {}{}  ({})",
                info.name, info.kind, info.default, units, info.label
            );
        }
        println!();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let (settings, settings_error) = load_settings(cli.settings.as_deref())?;
    let _guard = init_logging(&settings, cli.verbose)?;
    if let Some(e) = settings_error {
        tracing::warn!("Failed to load settings, using defaults: {}", e);
    }

    let report = match &cli.command {
        Command::Run { pipeline, rollback } => run(pipeline, *rollback, &settings)?,
        Command::Validate { pipeline } => validate(pipeline, &settings)?,
        Command::Filters => {
            list_filters();
            return Ok(ExitCode::SUCCESS);
        }
    };

    print_report(&report);
    if report.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
