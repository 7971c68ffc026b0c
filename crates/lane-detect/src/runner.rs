use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbImage;
use lane_detect_preproc::{FramePreprocessor, LanePreprocessor};
use lane_detect_search::Histogram;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    draw_search_windows, render_overlay, DetectionMode, FrameError, FrameRecord, FrameReport,
    FrameSink, FrameSource, ImageSequenceSource, LaneTracker, PngSequenceSink, ReportSink,
    RunConfig, RunError, SinkError, SourceFrame,
};

/// One-shot debug bookkeeping owned by the run loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugState {
    pub histogram_dumped: bool,
}

/// Counters reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames_read: usize,
    /// Frames the tracker accepted, including those a sink failed to save.
    pub frames_processed: usize,
    /// Tracked frames whose output could not be written.
    pub unsaved_frames: usize,
    /// Frames rejected before tracking; the tracker state skipped them.
    pub failed_frames: usize,
    /// The stop signal ended the run before the source was exhausted.
    pub stopped: bool,
    pub final_mode: DetectionMode,
}

/// What a successfully processed frame produced.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub report: FrameReport,
    pub overlay: RgbImage,
}

/// Drives frames from a source through preprocessing, the lane tracker and
/// the sinks.
///
/// Single-threaded. The stop flag is checked once per frame; a failing frame
/// is logged and counted, never fatal. A frame that fails to decode,
/// preprocess or track leaves the tracker untouched. Sinks run after the
/// tracker has committed the frame, so a sink error only loses that frame's
/// output and is counted in [`RunSummary::unsaved_frames`].
pub struct Runner<P: FramePreprocessor> {
    preprocessor: P,
    tracker: LaneTracker,
    sinks: Vec<Box<dyn FrameSink>>,
    window_sink: Option<Box<dyn FrameSink>>,
    histogram_path: Option<PathBuf>,
    debug: DebugState,
    stop: Arc<AtomicBool>,
}

impl<P: FramePreprocessor> Runner<P> {
    pub fn new(preprocessor: P, tracker: LaneTracker) -> Self {
        Self {
            preprocessor,
            tracker,
            sinks: Vec::new(),
            window_sink: None,
            histogram_path: None,
            debug: DebugState::default(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    /// Receive the search-window drawings of the authoritative pass.
    /// The tracker must record windows (`SearchParams::record_windows`).
    pub fn set_window_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.window_sink = Some(sink);
    }

    /// Dump the first processed frame's histogram to `path` as JSON.
    pub fn set_histogram_path(&mut self, path: PathBuf) {
        self.histogram_path = Some(path);
    }

    /// Setting the returned flag ends the run before the next frame.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn tracker(&self) -> &LaneTracker {
        &self.tracker
    }

    pub fn debug_state(&self) -> &DebugState {
        &self.debug
    }

    fn dump_histogram(&mut self, histogram: &Histogram) -> Result<(), SinkError> {
        let Some(path) = self.histogram_path.as_ref() else {
            return Ok(());
        };
        if self.debug.histogram_dumped {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(histogram)?;
        fs::write(path, json).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;
        info!("wrote histogram to {}", path.display());
        self.debug.histogram_dumped = true;
        Ok(())
    }

    /// Run one frame through the whole chain and hand it to the sinks.
    ///
    /// On [`FrameError::Sink`] the tracker has already advanced past the frame.
    pub fn process_frame(&mut self, frame: &SourceFrame) -> Result<FrameOutput, FrameError> {
        let prepared = self.preprocessor.prepare(&frame.image)?;
        let output = self
            .tracker
            .process(&prepared.combined.view(), &prepared.yellow.view())?;

        let report = FrameReport::new(frame.index, frame.path.as_deref(), &output);
        let overlay = render_overlay(&prepared, &output.fits, &output.direction);
        let pass = output.authoritative_pass();

        self.dump_histogram(&pass.histogram)?;

        let record = FrameRecord {
            index: frame.index,
            image: &overlay,
            report: &report,
        };
        for sink in &mut self.sinks {
            sink.write_frame(&record)?;
        }
        if let Some(sink) = self.window_sink.as_mut() {
            let binary = match pass.lane_type {
                lane_detect_search::LaneType::Combined => &prepared.combined,
                lane_detect_search::LaneType::Yellow => &prepared.yellow,
            };
            let drawing = draw_search_windows(binary, &pass.outcome.windows);
            sink.write_frame(&FrameRecord {
                image: &drawing,
                ..record
            })?;
        }

        Ok(FrameOutput { report, overlay })
    }

    fn flush_sinks(&mut self) {
        for sink in self.sinks.iter_mut().chain(self.window_sink.as_mut()) {
            if let Err(err) = sink.flush() {
                warn!("failed to flush sink: {err}");
            }
        }
    }

    /// Consume `source` until it ends or the stop flag is raised.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> RunSummary {
        let mut summary = RunSummary::default();

        loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("stop requested, ending run");
                summary.stopped = true;
                break;
            }
            let Some(next) = source.next_frame() else {
                break;
            };
            summary.frames_read += 1;

            let result = next
                .map_err(FrameError::from)
                .and_then(|frame| self.process_frame(&frame).map(|out| (frame.index, out)));
            match result {
                Ok((index, out)) => {
                    summary.frames_processed += 1;
                    debug!(
                        "frame {index}: {:?} ({} px off center)",
                        out.report.direction.direction,
                        out.report.direction.deviation_px
                    );
                }
                Err(FrameError::Sink(err)) => {
                    summary.frames_processed += 1;
                    summary.unsaved_frames += 1;
                    warn!("frame {} tracked but not saved: {err}", summary.frames_read - 1);
                }
                Err(err) => {
                    summary.failed_frames += 1;
                    warn!("frame {} skipped: {err}", summary.frames_read - 1);
                }
            }
        }

        self.flush_sinks();
        summary.final_mode = self.tracker.mode();
        info!(
            "run finished: {} read, {} processed ({} unsaved), {} failed, final mode {:?}",
            summary.frames_read,
            summary.frames_processed,
            summary.unsaved_frames,
            summary.failed_frames,
            summary.final_mode
        );
        summary
    }
}

/// Where a directory run reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunPaths {
    /// Directory of input frames.
    pub input: PathBuf,
    /// Directory receiving the overlay PNGs.
    pub output: PathBuf,
    /// Optional JSON-lines report.
    pub report: Option<PathBuf>,
}

/// Process every frame of `paths.input` with `config`.
///
/// Setup problems (bad config, missing input, unwritable output) are errors;
/// per-frame failures only show up in the summary.
pub fn run_sequence(config: &RunConfig, paths: &RunPaths) -> Result<RunSummary, RunError> {
    config.validate()?;
    let preprocessor = LanePreprocessor::new(config.preproc.clone())?;

    let mut tracker_params = config.tracker.clone();
    if config.debug.windows_dir.is_some() {
        tracker_params.search.record_windows = true;
    }
    let tracker = LaneTracker::new(tracker_params)?;

    let mut source = ImageSequenceSource::open(&paths.input)?;
    if let Some(max) = config.max_frames {
        source = source.with_max_frames(max);
    }

    let mut runner = Runner::new(preprocessor, tracker);
    runner.add_sink(Box::new(PngSequenceSink::create(&paths.output)?));
    if let Some(report) = paths.report.as_deref() {
        runner.add_sink(Box::new(ReportSink::create(report)?));
    }
    if let Some(dir) = config.debug.windows_dir.as_deref() {
        runner.set_window_sink(Box::new(PngSequenceSink::with_prefix(
            Path::new(dir),
            "windows",
        )?));
    }
    if let Some(path) = config.debug.histogram_path.as_deref() {
        runner.set_histogram_path(PathBuf::from(path));
    }

    info!(
        "processing {} frames from {}",
        source.len(),
        paths.input.display()
    );
    Ok(runner.run(&mut source))
}
