//! # CLI Module
//!
//! Command-line interface for dual-strategy plate recognition.
//!
//! ## Usage
//! ```bash
//! # Human-readable report
//! plate-duo car.jpg
//!
//! # One "shape|||color" line for instrument software
//! plate-duo car.jpg --output line
//!
//! # Bounded wait and cropped regions written to disk
//! plate-duo car.jpg --timeout-ms 5000 --save-regions ./regions
//! ```
//!
//! ## Exit Codes
//! - `0` - both strategies completed
//! - `1` - any run failure (missing file, decode, initialization, strategy)
//! - `2` - invalid arguments

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use plate_duo::core::encoder::{
    write_line, JsonEncoder, LineEncoder, OutputEncoding, ReportEncoder, ResultEncoder,
};
use plate_duo::core::orchestrator::Orchestrator;
use plate_duo::core::recognizer::{initialize_recognizer, RecognizerConfig};
use plate_duo::error::{PlateError, Result};
use plate_duo::events::{Event, EventChannel, EventReceiver};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Plate Duo - recognize a license plate with two strategies at once
#[derive(Parser, Debug)]
#[command(name = "plate-duo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Image to recognize
    image: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Text encoding of everything written to stdout
    #[arg(short, long, default_value = "utf8")]
    encoding: Encoding,

    /// Fail if the strategies need longer than this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Downscale images wider than this before recognition
    #[arg(long, default_value = "1000")]
    max_width: u32,

    /// Write cropped plate regions into this directory
    #[arg(long)]
    save_regions: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Labeled report with colors
    Pretty,
    /// Single "shape|||color" line
    Line,
    /// JSON document for scripting
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Encoding {
    /// UTF-8 without byte order mark
    Utf8,
    /// UTF-8 with byte order mark
    Utf8Bom,
    /// UTF-16 little endian with byte order mark
    Utf16le,
    /// GBK (Simplified Chinese Windows ANSI code page)
    Gbk,
}

impl From<Encoding> for OutputEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => OutputEncoding::Utf8,
            Encoding::Utf8Bom => OutputEncoding::Utf8Bom,
            Encoding::Utf16le => OutputEncoding::Utf16Le,
            Encoding::Gbk => OutputEncoding::Gbk,
        }
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    plate_duo::init_tracing(if cli.verbose { "plate_duo=debug" } else { "warn" });

    let encoder = encoder_for(cli.output, cli.verbose);

    match execute(&cli, encoder.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_failure(&cli, encoder.as_ref(), &error);
            ExitCode::FAILURE
        }
    }
}

fn encoder_for(output: OutputFormat, verbose: bool) -> Box<dyn ResultEncoder> {
    match output {
        OutputFormat::Pretty => Box::new(ReportEncoder::new(verbose)),
        OutputFormat::Line => Box::new(LineEncoder::new()),
        OutputFormat::Json => Box::new(JsonEncoder::new(true)),
    }
}

fn execute(cli: &Cli, encoder: &dyn ResultEncoder) -> Result<()> {
    let timeout = match cli.timeout_ms {
        Some(0) => {
            return Err(PlateError::Config(
                "--timeout-ms must be greater than zero".to_string(),
            ))
        }
        Some(ms) => Some(Duration::from_millis(ms)),
        None => None,
    };

    let pretty = matches!(cli.output, OutputFormat::Pretty);
    let term = Term::stderr();

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Plate Duo").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!("Processing {}", style(cli.image.display()).dim()))
            .ok();
    }

    // Built once per process, before any image work
    let config = RecognizerConfig {
        max_width: cli.max_width,
        ..RecognizerConfig::default()
    };
    let recognizer = initialize_recognizer(&config).map_err(|e| PlateError::Initialization {
        reason: e.to_string(),
    })?;

    let orchestrator = Orchestrator::builder()
        .recognizer(Arc::new(recognizer))
        .timeout(timeout)
        .build();

    let (sender, receiver) = EventChannel::new();
    let progress = pretty.then(spinner);
    let event_thread = listen(receiver, progress, cli.verbose);

    let result = orchestrator.run_with_events(&cli.image, &sender);

    drop(sender);
    event_thread.join().ok();

    let outcome = result?;

    // Regions first: a failed save must not follow a result line on stdout
    let written = match &cli.save_regions {
        Some(dir) => outcome.save_regions(dir)?,
        None => Vec::new(),
    };

    write_line(io::stdout().lock(), &encoder.encode(&outcome), cli.encoding.into())?;

    if pretty {
        for path in written {
            term.write_line(&format!("  {} {}", style("saved").dim(), path.display()))
                .ok();
        }
    }

    Ok(())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Drive the spinner from run events.
///
/// Stops at the first terminal event rather than at channel close: a
/// timed-out worker keeps its sender alive until it finishes.
fn listen(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Some(event) = receiver.recv() {
            match event {
                Event::StateChanged { state } => {
                    if let Some(ref pb) = progress {
                        pb.set_message(state.to_string());
                    }
                }
                Event::StrategyFinished {
                    strategy,
                    duration_ms,
                    succeeded,
                } => {
                    if let (Some(pb), true) = (&progress, verbose) {
                        let mark = if succeeded {
                            style("✓").green()
                        } else {
                            style("✗").red()
                        };
                        pb.println(format!(
                            "  {} {} strategy ({}ms)",
                            mark, strategy, duration_ms
                        ));
                    }
                }
                Event::Completed { .. } | Event::Failed { .. } => {
                    if let Some(ref pb) = progress {
                        pb.finish_and_clear();
                    }
                    break;
                }
                _ => {}
            }
        }
    })
}

fn report_failure(cli: &Cli, encoder: &dyn ResultEncoder, error: &PlateError) {
    let message = encoder.encode_failure(error);
    match cli.output {
        OutputFormat::Pretty => {
            Term::stderr().write_line(&message).ok();
        }
        // Script consumers read stdout only
        OutputFormat::Line | OutputFormat::Json => {
            write_line(io::stdout().lock(), &message, cli.encoding.into()).ok();
        }
    }
}
