use serde::{Deserialize, Serialize};

use crate::SearchError;

/// Configuration for the histogram + sliding-window search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of windows stacked vertically per side.
    pub window_count: usize,
    /// Half-width of a window in pixels; a window spans `[x - offset, x + offset)`.
    pub offset: u32,
    /// A window is adequate when it holds strictly more pixels than this.
    pub min_pixels: usize,
    /// The histogram sums the bottom `floor(height / roi_proportion)` rows.
    /// `1.0` means the whole frame, `2.0` the lower half.
    pub roi_proportion: f32,
    /// Record every window rectangle in the outcome (window debug mode).
    pub record_windows: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            window_count: 20,
            offset: 15,
            min_pixels: 50,
            roi_proportion: 1.0,
            record_windows: false,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.window_count == 0 {
            return Err(SearchError::InvalidParams {
                field: "window_count",
                reason: "must be positive",
            });
        }
        if self.offset == 0 {
            return Err(SearchError::InvalidParams {
                field: "offset",
                reason: "must be positive",
            });
        }
        if self.min_pixels == 0 {
            return Err(SearchError::InvalidParams {
                field: "min_pixels",
                reason: "must be positive",
            });
        }
        if !self.roi_proportion.is_finite() || self.roi_proportion < 1.0 {
            return Err(SearchError::InvalidRoiProportion(self.roi_proportion));
        }
        Ok(())
    }
}

/// Which row the lane-center is read at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookAhead {
    /// Midpoint of the bottom-up lane-center polyline: row `h - 1 - h / 2`.
    Midpoint,
    /// Fixed bird's-eye row.
    Row(u32),
}

/// Configuration for classifying the vehicle position against the lane center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionParams {
    pub lookahead: LookAhead,
    /// Deviations within `±center_tolerance_px` count as centered.
    pub center_tolerance_px: f64,
}

impl Default for DirectionParams {
    fn default() -> Self {
        Self {
            lookahead: LookAhead::Midpoint,
            center_tolerance_px: 50.0,
        }
    }
}
