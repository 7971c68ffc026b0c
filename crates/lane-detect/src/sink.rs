use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use lane_detect_core::{LanePair, LineFit};
use lane_detect_search::{DirectionReport, FitSource, LaneType};
use serde::{Deserialize, Serialize};

use crate::{DetectionMode, SinkError, TrackerOutput};

/// Per-frame summary written by [`ReportSink`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub mode: DetectionMode,
    pub authoritative: LaneType,
    pub fits: LanePair<LineFit>,
    pub fit_sources: LanePair<FitSource>,
    pub sides_ok: LanePair<bool>,
    pub yellow_dominant: bool,
    pub direction: DirectionReport,
}

impl FrameReport {
    pub fn new(index: usize, source: Option<&Path>, output: &TrackerOutput) -> Self {
        let pass = output.authoritative_pass();
        Self {
            index,
            source: source.map(|p| p.display().to_string()),
            mode: output.mode,
            authoritative: output.authoritative,
            fits: output.fits,
            fit_sources: pass.fits.sources,
            sides_ok: pass.outcome.sides_ok,
            yellow_dominant: output.yellow.outcome.yellow_dominant,
            direction: output.direction,
        }
    }
}

/// One processed frame on its way to the sinks.
#[derive(Clone, Copy, Debug)]
pub struct FrameRecord<'a> {
    pub index: usize,
    pub image: &'a RgbImage,
    pub report: &'a FrameReport,
}

/// Destination for processed frames.
pub trait FrameSink {
    fn write_frame(&mut self, record: &FrameRecord<'_>) -> Result<(), SinkError>;

    /// Push buffered output to disk.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<(), SinkError> {
    fs::create_dir_all(dir).map_err(|source| SinkError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes every frame as `<prefix>_NNNNNN.png` into a directory.
#[derive(Clone, Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
}

impl PngSequenceSink {
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        Self::with_prefix(dir, "frame")
    }

    pub fn with_prefix(dir: &Path, prefix: &str) -> Result<Self, SinkError> {
        create_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{index:06}.png", self.prefix))
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, record: &FrameRecord<'_>) -> Result<(), SinkError> {
        let path = self.frame_path(record.index);
        record
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| SinkError::Encode { path, source })
    }
}

/// Appends one JSON object per frame to a file (JSON lines).
#[derive(Debug)]
pub struct ReportSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        let file = File::create(path).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl FrameSink for ReportSink {
    fn write_frame(&mut self, record: &FrameRecord<'_>) -> Result<(), SinkError> {
        let line = serde_json::to_string(record.report)?;
        writeln!(self.writer, "{line}").map_err(|e| self.io_error(e))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_detect_search::Direction;

    fn report(index: usize) -> FrameReport {
        FrameReport {
            index,
            source: None,
            mode: DetectionMode::Combined,
            authoritative: LaneType::Combined,
            fits: LineFit::seed_pair(400),
            fit_sources: LanePair::new(FitSource::Fresh, FitSource::Carried),
            sides_ok: LanePair::new(true, false),
            yellow_dominant: false,
            direction: DirectionReport {
                direction: Direction::Centered,
                lane_center_x: 200,
                deviation_px: 0.0,
                row: 299.0,
            },
        }
    }

    #[test]
    fn png_sink_numbers_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out_dir = dir.path().join("frames");
        let mut sink = PngSequenceSink::create(&out_dir).expect("sink");
        let img = RgbImage::new(4, 4);
        let rep = report(7);
        sink.write_frame(&FrameRecord {
            index: 7,
            image: &img,
            report: &rep,
        })
        .expect("write");

        let written = out_dir.join("frame_000007.png");
        assert!(written.is_file());
        assert_eq!(image::open(written).expect("decode").width(), 4);
    }

    #[test]
    fn report_sink_writes_one_json_line_per_frame() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/report.jsonl");
        let mut sink = ReportSink::create(&path).expect("sink");
        let img = RgbImage::new(1, 1);
        for i in 0..3 {
            let rep = report(i);
            sink.write_frame(&FrameRecord {
                index: i,
                image: &img,
                report: &rep,
            })
            .expect("write");
        }
        sink.flush().expect("flush");

        let text = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let parsed: FrameReport = serde_json::from_str(lines[2]).expect("parse");
        assert_eq!(parsed, report(2));
        assert!(lines[0].contains(r#""mode":"combined""#));
        assert!(lines[0].contains(r#""direction":"centered""#));
    }
}
