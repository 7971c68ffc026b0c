use lane_detect_core::GrayImageView;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::SearchError;

/// Column-wise sum of pixel values over the lower part of a binary frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<u32>,
}

impl Histogram {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Split column between the left and right lane halves.
    pub fn midpoint(&self) -> usize {
        self.bins.len() / 2
    }
}

/// First row included in the histogram: the bottom `floor(height / p)` rows
/// are summed, so `p = 1` covers the whole frame.
fn roi_start_row(height: usize, roi_proportion: f32) -> usize {
    let rows = ((height as f64 / roi_proportion as f64).floor() as usize).min(height);
    height - rows
}

/// Sum pixel values per column over the bottom `floor(height / roi_proportion)` rows.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(width = frame.width, height = frame.height))
)]
pub fn build_histogram(
    frame: &GrayImageView<'_>,
    roi_proportion: f32,
) -> Result<Histogram, SearchError> {
    frame.validate()?;
    if !roi_proportion.is_finite() || roi_proportion < 1.0 {
        return Err(SearchError::InvalidRoiProportion(roi_proportion));
    }

    let mut bins = vec![0u32; frame.width];
    for y in roi_start_row(frame.height, roi_proportion)..frame.height {
        for (bin, &v) in bins.iter_mut().zip(frame.row(y)) {
            *bin += v as u32;
        }
    }

    Ok(Histogram { bins })
}
