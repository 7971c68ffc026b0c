//! `lane-detect` command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lane_detect::{init_logging, run_sequence, RunConfig, RunError, RunPaths};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Lane detection over image sequences",
    long_about = "Detects lane lines frame by frame, writes overlay PNGs and an optional JSON-lines report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    log_level: LevelFilter,

    /// Log JSON lines (builds with the `tracing` feature only; level from RUST_LOG)
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every image of a directory
    Run(RunArgs),
    /// Print the default configuration as JSON
    Config,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory of input frames (png, jpg, bmp), processed in file-name order
    #[arg(short = 'i', long = "input", value_name = "INPUT_DIR")]
    input: PathBuf,

    /// Directory where overlay frames are written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// JSON configuration; missing fields take their defaults
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write one JSON report line per processed frame
    #[arg(long, value_name = "REPORT")]
    report: Option<PathBuf>,

    /// Stop after this many frames (overrides the config)
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,

    /// Save search-window drawings into this directory
    #[arg(long, value_name = "DIR")]
    windows_dir: Option<PathBuf>,
}

fn run(args: RunArgs) -> Result<(), RunError> {
    let mut config = match args.config.as_deref() {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if args.max_frames.is_some() {
        config.max_frames = args.max_frames;
    }
    if let Some(dir) = args.windows_dir {
        config.debug.windows_dir = Some(dir.display().to_string());
    }

    let paths = RunPaths {
        input: args.input,
        output: args.output,
        report: args.report,
    };
    let summary = run_sequence(&config, &paths)?;
    println!(
        "frames read: {}, processed: {}, unsaved: {}, failed: {}, final mode: {:?}",
        summary.frames_read,
        summary.frames_processed,
        summary.unsaved_frames,
        summary.failed_frames,
        summary.final_mode
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Config => {
            println!("{}", RunConfig::default().to_json_pretty());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
