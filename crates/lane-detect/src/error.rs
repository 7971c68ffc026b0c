use std::path::PathBuf;

use lane_detect_preproc::PreprocError;
use lane_detect_search::SearchError;

/// Reading frames from disk failed.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("input `{0}` is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode `{path}`: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Persisting a processed frame failed.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode `{path}`: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to serialize frame report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can go wrong while handling a single frame. The run loop
/// logs it and moves on to the next frame.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Preproc(#[from] PreprocError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Setup failures that prevent a run from starting.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("failed to read config `{path}`: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config `{path}`: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Preproc(#[from] PreprocError),
    #[error(transparent)]
    Search(#[from] SearchError),
}
