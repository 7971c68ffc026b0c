use lane_detect_core::{ImageError, LanePair, LineFit};
use serde::{Deserialize, Serialize};

use crate::{DirectionParams, LookAhead, SearchError};

/// Where the vehicle sits relative to the lane center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Centered,
    Right,
}

impl Direction {
    /// Numeric code: `-1` left, `0` centered, `1` right.
    pub fn code(self) -> i8 {
        match self {
            Direction::Left => -1,
            Direction::Centered => 0,
            Direction::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionReport {
    pub direction: Direction,
    /// Lane-center column at the look-ahead row, truncated to a pixel.
    pub lane_center_x: i64,
    /// `frame_width / 2 - |lane_center_x|`.
    pub deviation_px: f64,
    /// Row the lines were evaluated at.
    pub row: f64,
}

fn lookahead_row(lookahead: LookAhead, frame_height: usize) -> f64 {
    match lookahead {
        LookAhead::Midpoint => (frame_height - 1 - frame_height / 2) as f64,
        LookAhead::Row(r) => r as f64,
    }
}

/// Classify the frame center against the lane center read off both fits.
pub fn evaluate_direction(
    fits: &LanePair<LineFit>,
    frame_height: usize,
    frame_width: usize,
    params: &DirectionParams,
) -> Result<DirectionReport, SearchError> {
    if frame_width == 0 || frame_height == 0 {
        return Err(ImageError::Empty {
            width: frame_width,
            height: frame_height,
        }
        .into());
    }

    let row = lookahead_row(params.lookahead, frame_height);
    let center = (fits.left.x_at(row) + fits.right.x_at(row)) / 2.0;
    let lane_center_x = center.trunc() as i64;
    let deviation_px = (frame_width / 2) as f64 - lane_center_x.abs() as f64;

    let tol = params.center_tolerance_px;
    let direction = if deviation_px.abs() <= tol {
        Direction::Centered
    } else if deviation_px < -tol {
        Direction::Left
    } else {
        Direction::Right
    };

    Ok(DirectionReport {
        direction,
        lane_center_x,
        deviation_px,
        row,
    })
}
