use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::info;

use crate::SourceError;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// One decoded input frame.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    /// Position in the stream, starting at 0.
    pub index: usize,
    pub path: Option<PathBuf>,
    pub image: RgbImage,
}

/// Produces frames one at a time. `None` ends the stream; an `Err` item only
/// spoils that frame.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Result<SourceFrame, SourceError>>;
}

/// Every image file of a directory, in file-name order.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::NotADirectory(dir.to_path_buf()));
        }
        let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        paths.sort();

        info!("found {} frames in {}", paths.len(), dir.display());
        Ok(Self { paths, next: 0 })
    }

    /// Keep at most the first `max_frames` frames.
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.paths.truncate(max_frames);
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<Result<SourceFrame, SourceError>> {
        let index = self.next;
        let path = self.paths.get(index)?.clone();
        self.next += 1;

        let decoded = image::open(&path).map_err(|source| SourceError::Decode {
            path: path.clone(),
            source,
        });
        Some(decoded.map(|img| SourceFrame {
            index,
            path: Some(path),
            image: img.to_rgb8(),
        }))
    }
}

/// Frames already in memory, mostly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: std::collections::VecDeque<RgbImage>,
    next: usize,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            next: 0,
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Option<Result<SourceFrame, SourceError>> {
        let image = self.frames.pop_front()?;
        let index = self.next;
        self.next += 1;
        Some(Ok(SourceFrame {
            index,
            path: None,
            image,
        }))
    }
}
