use serde::{Deserialize, Serialize};

use crate::PreprocError;

/// Inclusive HLS box in OpenCV 8-bit ranges: `H` in `[0, 180)`, `L` and `S`
/// in `[0, 255]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlsRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HlsRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hls: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hls[i] && hls[i] <= self.upper[i])
    }
}

/// Which image feeds the combined binary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// White and yellow masked colors.
    ColorFiltered,
    /// The HLS lightness channel.
    #[default]
    Lightness,
}

/// Trapezoid in ROI pixel coordinates that maps onto the bird's-eye rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BirdseyePoints {
    pub left_upper: [f32; 2],
    pub right_upper: [f32; 2],
    pub left_lower: [f32; 2],
    pub right_lower: [f32; 2],
}

impl Default for BirdseyePoints {
    fn default() -> Self {
        Self {
            left_upper: [270.0, 20.0],
            right_upper: [370.0, 20.0],
            left_lower: [40.0, 220.0],
            right_lower: [600.0, 220.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocParams {
    pub target_width: u32,
    pub target_height: u32,
    /// Rows above this are cut off (and kept for reconstruction).
    pub crop_top: u32,
    /// Columns cut from both the left and the right edge.
    pub crop_side: u32,
    pub yellow: HlsRange,
    pub white: HlsRange,
    pub channel_mode: ChannelMode,
    pub birdseye: BirdseyePoints,
    /// Horizontal inset of the lower bird's-eye corners.
    pub birdseye_inset: f32,
    pub blur_sigma: f32,
    pub sobel_threshold_color: u8,
    pub sobel_threshold_lightness: u8,
    /// Side of the square opening kernel; must be odd.
    pub opening_kernel: usize,
    pub opening_iterations: usize,
}

impl Default for PreprocParams {
    fn default() -> Self {
        Self {
            target_width: 640,
            target_height: 480,
            crop_top: 250,
            crop_side: 0,
            yellow: HlsRange::new([15, 80, 50], [30, 200, 255]),
            white: HlsRange::new([0, 100, 0], [180, 255, 255]),
            channel_mode: ChannelMode::Lightness,
            birdseye: BirdseyePoints::default(),
            birdseye_inset: 150.0,
            blur_sigma: 1.1,
            sobel_threshold_color: 80,
            sobel_threshold_lightness: 40,
            opening_kernel: 3,
            opening_iterations: 1,
        }
    }
}

impl PreprocParams {
    /// Edge threshold for the active channel mode.
    pub fn sobel_threshold(&self) -> u8 {
        match self.channel_mode {
            ChannelMode::ColorFiltered => self.sobel_threshold_color,
            ChannelMode::Lightness => self.sobel_threshold_lightness,
        }
    }

    /// Size of the ROI after downscaling and cropping.
    pub fn roi_size(&self) -> (u32, u32) {
        (
            self.target_width.saturating_sub(2 * self.crop_side),
            self.target_height.saturating_sub(self.crop_top),
        )
    }

    pub fn validate(&self) -> Result<(), PreprocError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(PreprocError::InvalidParams {
                field: "target_width/target_height",
                reason: "must be positive",
            });
        }
        let (roi_w, roi_h) = self.roi_size();
        if roi_w == 0 || roi_h == 0 {
            return Err(PreprocError::EmptyRoi {
                width: self.target_width,
                height: self.target_height,
                crop_top: self.crop_top,
                crop_side: self.crop_side,
            });
        }
        if !self.birdseye_inset.is_finite()
            || self.birdseye_inset < 0.0
            || 2.0 * self.birdseye_inset >= roi_w as f32
        {
            return Err(PreprocError::InvalidParams {
                field: "birdseye_inset",
                reason: "must be non-negative and less than half the ROI width",
            });
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(PreprocError::InvalidParams {
                field: "blur_sigma",
                reason: "must be positive",
            });
        }
        if self.opening_kernel == 0 || self.opening_kernel % 2 == 0 {
            return Err(PreprocError::InvalidParams {
                field: "opening_kernel",
                reason: "must be odd",
            });
        }
        Ok(())
    }
}
