use lane_detect_core::ImageError;

/// Errors returned by the search stage. All of them reject the input before
/// any computation happens.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    InvalidInput(#[from] ImageError),
    #[error("histogram is empty")]
    EmptyHistogram,
    #[error("histogram has {histogram} bins but the frame is {width} pixels wide")]
    HistogramMismatch { histogram: usize, width: usize },
    #[error("binary sources differ in size: {first_width}x{first_height} vs {second_width}x{second_height}")]
    SizeMismatch {
        first_width: usize,
        first_height: usize,
        second_width: usize,
        second_height: usize,
    },
    #[error("histogram ROI proportion must be a finite value >= 1 (got {0})")]
    InvalidRoiProportion(f32),
    #[error("invalid search parameter `{field}`: {reason}")]
    InvalidParams {
        field: &'static str,
        reason: &'static str,
    },
}

/// A straight line could not be fitted to a pixel set.
///
/// Never escapes `fit_lines`: the previous fit is substituted instead.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("degenerate line fit ({points} points over {distinct_rows} distinct rows)")]
    Degenerate { points: usize, distinct_rows: usize },
}
