//! Frame-by-frame lane detection.
//!
//! This crate ties the workspace together:
//! - re-exports of the building blocks (`core`, `preproc`, `search`),
//! - [`LaneTracker`]: the per-frame combined and yellow passes, the
//!   detection-mode switch and the carried line fits,
//! - overlays for visual inspection,
//! - a single-threaded [`Runner`] that moves frames from a [`FrameSource`]
//!   through preprocessing and tracking into [`FrameSink`]s,
//! - the `lane-detect` command-line tool (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use lane_detect::{run_sequence, RunConfig, RunPaths};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::default();
//! let paths = RunPaths {
//!     input: PathBuf::from("frames"),
//!     output: PathBuf::from("out"),
//!     report: Some(PathBuf::from("out/report.jsonl")),
//! };
//! let summary = run_sequence(&config, &paths)?;
//! println!("{} frames, final mode {:?}", summary.frames_processed, summary.final_mode);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `lane_detect::core`: gray images, homographies, line fits, logging.
//! - `lane_detect::preproc`: color filtering, bird's-eye warp, edge binaries.
//! - `lane_detect::search`: histogram, sliding windows, fitting, direction.

pub use lane_detect_core as core;
pub use lane_detect_preproc as preproc;
pub use lane_detect_search as search;

mod config;
mod error;
mod mode;
mod overlay;
mod runner;
mod sink;
mod source;
mod tracker;

pub use config::{DebugOutputs, RunConfig};
pub use error::{FrameError, RunError, SinkError, SourceError};
pub use mode::{DetectionMode, ModeController, ModePolicy};
pub use overlay::{draw_search_windows, render_overlay};
pub use runner::{run_sequence, DebugState, FrameOutput, RunPaths, RunSummary, Runner};
pub use sink::{FrameRecord, FrameReport, FrameSink, PngSequenceSink, ReportSink};
pub use source::{FrameSource, ImageSequenceSource, MemorySource, SourceFrame};
pub use tracker::{LaneTracker, PassResult, TrackerOutput, TrackerParams};

pub use lane_detect_core::{LanePair, LineFit, Side};
pub use lane_detect_search::{Direction, DirectionReport, LaneType};

/// Install logging for binaries.
///
/// With the `tracing` feature this is [`lane_detect_core::init_tracing`]:
/// filtered by `RUST_LOG` (default `info`), `level` is ignored and `json`
/// selects JSON lines. Otherwise the stderr logger is installed at `level`
/// and `json` is ignored.
pub fn init_logging(level: log::LevelFilter, json: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        lane_detect_core::init_tracing(json);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = json;
        if let Err(err) = lane_detect_core::init_with_level(level) {
            eprintln!("logger already installed: {err}");
        }
    }
}
