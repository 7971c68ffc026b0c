//! Preprocessing chain that turns camera frames into bird's-eye binaries.
//!
//! Per frame:
//! 1. downscale to the working resolution and cut the region of interest,
//! 2. split it into a combined source (white and yellow markings, or the HLS
//!    lightness channel) and a yellow-only source,
//! 3. warp both into the bird's-eye view,
//! 4. blur, take the horizontal Sobel gradient, threshold and open.
//!
//! [`LanePreprocessor`] runs the whole chain behind the [`FramePreprocessor`]
//! trait; the individual stages are exported for debugging and tests.

mod birdseye;
mod color;
mod edges;
mod error;
mod morphology;
mod params;
mod pipeline;
mod roi;

pub use birdseye::BirdseyeTransform;
pub use color::{color_sources, rgb_to_gray, rgb_to_hls, ColorSources};
pub use edges::{gaussian_blur, sobel_x_abs, threshold_binary};
pub use error::PreprocError;
pub use morphology::{dilate, erode, opening};
pub use params::{BirdseyePoints, ChannelMode, HlsRange, PreprocParams};
pub use pipeline::{FramePreprocessor, LanePreprocessor, PreparedFrame};
pub use roi::{downscale, extract_roi};
