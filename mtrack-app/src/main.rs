mod app;
mod headless;
mod keymap;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mtrack_core::TrialResult;
use mtrack_experiment::TrialConfig;
use mtrack_render::PromptFont;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::headless::Snapshot;

#[derive(Parser, Debug)]
#[command(name = "mtrack")]
#[command(version)]
#[command(about = "Moving-target tracking trial")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fullscreen window driven by the physical keyboard.
    Window(RunArgs),
    /// Replay a JSON key script without a window.
    Replay {
        #[command(flatten)]
        run: RunArgs,

        /// JSON array of `{ "at_ms": f64, "code": u32 }`.
        #[arg(long)]
        script: PathBuf,

        /// Run on a virtual clock: instant and fully deterministic.
        #[arg(long)]
        virtual_clock: bool,

        /// Write the last drawn frame as a PNG.
        #[arg(long, value_name = "PNG")]
        snapshot: Option<PathBuf>,

        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,
    },
    /// Keycodes from standard input, one per line.
    Stdin(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Trial configuration TOML.
    #[arg(short, long, default_value = "trial.toml")]
    config: PathBuf,

    /// Where to write the result (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Result)]
    format: OutputFormat,

    /// TTF/OTF font for the prompt line; DejaVu Sans when omitted.
    #[arg(long, value_name = "FONT")]
    font: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Structured event lists.
    Result,
    /// Both lists as JSON-encoded strings, the layout trial loggers store.
    TrialData,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args);

    let (run, result) = match &args.command {
        Command::Window(run) => {
            let config = load_config(&run.config)?;
            let font = load_font(run.font.as_deref())?;
            (run, App::new(config, font).run()?)
        }
        Command::Replay {
            run,
            script,
            virtual_clock,
            snapshot,
            width,
            height,
        } => {
            let config = load_config(&run.config)?;
            let snapshot = match snapshot.as_deref() {
                Some(path) => Some(Snapshot {
                    path,
                    width: *width,
                    height: *height,
                    font: load_font(run.font.as_deref())?,
                }),
                None => None,
            };
            let result = headless::replay_script(config, script, *virtual_clock, snapshot)?;
            (run, result)
        }
        Command::Stdin(run) => {
            let config = load_config(&run.config)?;
            (run, headless::read_stdin(config)?)
        }
    };

    info!(
        frames = result.frame_count(),
        responses = result.response_count(),
        "trial finished"
    );
    write_result(&result, run)
}

fn load_config(path: &Path) -> Result<TrialConfig> {
    let config = TrialConfig::load(path)
        .with_context(|| format!("loading trial config {}", path.display()))?;
    info!(
        stimulus = %config.stimulus,
        speed = config.speed,
        frame_time_ms = config.frame_time_ms,
        frame_gap_ms = config.frame_gap_ms,
        "config loaded"
    );
    Ok(config)
}

fn load_font(path: Option<&Path>) -> Result<PromptFont> {
    let font = match path {
        Some(path) => PromptFont::load(path)?,
        None => PromptFont::bundled()?,
    };
    Ok(font)
}

fn write_result(result: &TrialResult, run: &RunArgs) -> Result<()> {
    let mut out: Box<dyn Write> = match &run.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    match run.format {
        OutputFormat::Result => serde_json::to_writer_pretty(&mut out, result)?,
        OutputFormat::TrialData => {
            serde_json::to_writer_pretty(&mut out, &result.to_trial_data()?)?
        }
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Logs go to stderr; stdout carries the result.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
