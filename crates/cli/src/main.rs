//! RISC-V pipeline trace CLI.
//!
//! This binary turns a stage-event log captured from the 5-stage core into an
//! execution trace. It performs:
//! 1. **Loading:** Reads a JSON-array or newline-delimited log from a file or stdin.
//! 2. **Tracking:** Streams the events through the in-flight tracker.
//! 3. **Rendering:** Prints one line per retired instruction to stdout, in retirement order.
//! 4. **Reporting:** Optionally prints trace statistics to stderr.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use rvtrace_core::config::Config;
use rvtrace_core::event::{InputFormat, open_events};
use rvtrace_core::format::TraceFormatter;
use rvtrace_core::stats::STATS_SECTIONS;
use rvtrace_core::tracker::Tracker;
use rvtrace_core::TraceError;

#[derive(Parser, Debug)]
#[command(
    name = "rvtrace",
    author,
    version,
    about = "Reconstruct a per-instruction trace from RISC-V pipeline stage logs",
    long_about = "Reads the per-stage event log of a 5-stage in-order RISC-V core and prints one line per retired instruction.\n\nLogging goes to stderr and is controlled by RUST_LOG (default: warn).\n\nExamples:\n  rvtrace trace/log.json\n  rvtrace --stats --timing < log.ndjson\n  rvtrace --config trace.json --keep-stale log.json"
)]
struct Cli {
    /// Event log to read; omit or pass `-` for stdin.
    log: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log layout (overrides the configuration file).
    #[arg(short, long, value_enum)]
    format: Option<LogFormat>,

    /// Print trace statistics to stderr after the trace.
    #[arg(long)]
    stats: bool,

    /// Statistics sections to print (implies --stats).
    #[arg(long, value_delimiter = ',', value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS.iter().copied()))]
    stats_sections: Vec<String>,

    /// Append issue cycle, latency and stall cycles to every line.
    #[arg(long)]
    timing: bool,

    /// Keep wrong-path fetches in flight instead of flushing them at decode.
    #[arg(long)]
    keep_stale: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Auto,
    Array,
    Lines,
}

impl From<LogFormat> for InputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Auto => Self::Auto,
            LogFormat::Array => Self::Array,
            LogFormat::Lines => Self::Lines,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("rvtrace: {e}");
        process::exit(1);
    }
}

/// Builds the effective configuration: file values, then command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, TraceError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(format) = cli.format {
        config.input.format = format.into();
    }
    if cli.timing {
        config.format.show_timing = true;
    }
    if cli.keep_stale {
        config.tracker.flush_stale = false;
    }
    Ok(config)
}

fn open_log(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>, TraceError> {
    match path {
        Some(path) if path.as_os_str() != "-" => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Streams the log through the tracker and prints the trace.
fn run(cli: &Cli) -> Result<(), TraceError> {
    let config = load_config(cli)?;
    let formatter = TraceFormatter::new(config.format);
    let mut tracker = Tracker::new(config.tracker);

    let events = open_events(open_log(cli.log.as_ref())?, config.input.format)?;
    let mut out = BufWriter::new(io::stdout().lock());

    for event in events {
        if let Some(inst) = tracker.step(&event?)? {
            let line = formatter.render(&inst);
            if line.anomaly {
                tracker.stats_mut().anomalies += 1;
            }
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    let summary = tracker.finish();
    if !summary.in_flight.is_empty() {
        warn!(count = summary.in_flight.len(), "instructions still in flight at end of log");
        for inst in &summary.in_flight {
            warn!(tag = %inst.tag, pc = inst.pc, ir = inst.ir, "never retired");
        }
    }

    if cli.stats || !cli.stats_sections.is_empty() {
        eprintln!("{}", summary.stats.report(&cli.stats_sections));
    }
    Ok(())
}
