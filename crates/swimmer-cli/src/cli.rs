use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::info;
use swimmer_core::{prepare_chart, DateParseOptions, DateSystem, PreparedChart};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::report::write_text_report;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DateSystemArg {
    Excel1900,
    Excel1904,
}

impl From<DateSystemArg> for DateSystem {
    fn from(arg: DateSystemArg) -> Self {
        match arg {
            DateSystemArg::Excel1900 => DateSystem::Excel1900,
            DateSystemArg::Excel1904 => DateSystem::Excel1904,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "swimmer",
    version,
    about = "Normalize a wide swimmer plot table into per-row relative intervals and events."
)]
pub struct Args {
    /// Source file: `.json`, `.xlsx`, `.xlsm`, `.xls`, `.xlsb` or `.ods`.
    input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Indent JSON output.
    #[arg(long)]
    pretty: bool,

    /// Date system for serial day numbers.
    #[arg(long, value_enum, default_value_t = DateSystemArg::Excel1900)]
    date_system: DateSystemArg,

    /// Numbers below this are read as Unix milliseconds rather than serial days.
    #[arg(long, value_name = "N", default_value_t = 1000.0)]
    serial_threshold: f64,

    /// More logging on stderr (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run_with_args(args)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .try_init();
}

pub fn run_with_args(args: Args) -> Result<()> {
    let options = DateParseOptions {
        date_system: args.date_system.into(),
        serial_threshold: args.serial_threshold,
    };

    let sources = swimmer_io::open_source(&args.input)
        .with_context(|| format!("load {}", args.input.display()))?;
    let chart = prepare_chart(&sources, &options)
        .with_context(|| format!("prepare chart data from {}", args.input.display()))?;
    info!(
        "{} rows with timeline entries from {}",
        chart.row_numbers.len(),
        args.input.display()
    );

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            emit(&mut out, &args, &chart)
                .and_then(|()| out.flush().map_err(Into::into))
                .with_context(|| format!("write {}", path.display()))
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            emit(&mut handle, &args, &chart).and_then(|()| handle.flush().map_err(Into::into))
        }
    };

    match written {
        Err(err) if is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

fn emit<W: Write>(out: &mut W, args: &Args, chart: &PreparedChart) -> Result<()> {
    match args.format {
        OutputFormat::Json => {
            if args.pretty {
                serde_json::to_writer_pretty(&mut *out, chart)?;
            } else {
                serde_json::to_writer(&mut *out, chart)?;
            }
            out.write_all(b"\n")?;
        }
        OutputFormat::Text => write_text_report(out, &args.input, chart)?,
    }
    Ok(())
}

/// A downstream reader closing early (`swimmer ... | head`) is not a failure.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map(|e| e.kind() == io::ErrorKind::BrokenPipe)
            .or_else(|| {
                cause
                    .downcast_ref::<serde_json::Error>()
                    .and_then(|e| e.io_error_kind())
                    .map(|kind| kind == io::ErrorKind::BrokenPipe)
            })
            .unwrap_or(false)
    })
}
