//! Sliding-window lane search on bird's-eye binary frames.
//!
//! ## Quickstart
//!
//! ```
//! use lane_detect_core::{GrayImage, LineFit};
//! use lane_detect_search::{
//!     build_histogram, fit_lines, search_lanes, LaneType, SearchParams,
//! };
//!
//! let frame = GrayImage::new(400, 600);
//! let params = SearchParams::default();
//! let histogram = build_histogram(&frame.view(), params.roi_proportion).unwrap();
//! let outcome = search_lanes(&frame.view(), &histogram, LaneType::Combined, &params).unwrap();
//! let previous = LineFit::seed_pair(frame.width);
//! let fits = fit_lines(outcome.points(), &previous, outcome.sides_ok);
//! assert_eq!(fits.fits, previous);
//! ```
//!
//! Algorithm:
//! 1. Sum the lower part of the binary frame column-wise into a histogram.
//! 2. Take the strongest column on each half as the left/right lane base.
//! 3. Walk a fixed number of windows bottom-to-top per side, collecting the
//!    non-zero pixels inside each window and re-centering the next window on
//!    the mean column of windows with enough pixels.
//! 4. A side is usable when more than a third of its windows were adequate.
//! 5. Fit `x = slope * y + intercept` per usable side; otherwise carry the
//!    previous frame's fit.

mod bases;
mod direction;
mod error;
mod fit;
mod histogram;
mod params;
mod window;

pub use bases::{locate_lane_bases, LaneBases};
pub use direction::{evaluate_direction, Direction, DirectionReport};
pub use error::{FitError, SearchError};
pub use fit::{fit_line, fit_lines, FitSource, LaneFits};
pub use histogram::{build_histogram, Histogram};
pub use params::{DirectionParams, LookAhead, SearchParams};
pub use window::{
    adequacy_quota, is_yellow_dominant, search_lanes, LaneType, SearchOutcome, SearchWindow,
};
