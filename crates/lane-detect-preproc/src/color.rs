//! HLS conversion and color masking.
//!
//! Conversions follow the OpenCV 8-bit conventions so the HLS ranges in
//! [`PreprocParams`] carry over directly: hue is halved to fit `[0, 180)`,
//! lightness and saturation are scaled to `[0, 255]`.

use image::RgbImage;
use lane_detect_core::GrayImage;

use crate::{ChannelMode, PreprocParams};

/// Convert one RGB pixel to 8-bit HLS.
pub fn rgb_to_hls(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let vmax = r.max(g).max(b);
    let vmin = r.min(g).min(b);
    let diff = vmax - vmin;
    let l = (vmax + vmin) * 0.5;

    let (h, s) = if diff <= f32::EPSILON {
        (0.0, 0.0)
    } else {
        let s = if l < 0.5 {
            diff / (vmax + vmin)
        } else {
            diff / (2.0 - vmax - vmin)
        };
        let mut h = if vmax == r {
            60.0 * (g - b) / diff
        } else if vmax == g {
            120.0 + 60.0 * (b - r) / diff
        } else {
            240.0 + 60.0 * (r - g) / diff
        };
        if h < 0.0 {
            h += 360.0;
        }
        (h, s)
    };

    [
        (h * 0.5).round().min(179.0) as u8,
        (l * 255.0).round().clamp(0.0, 255.0) as u8,
        (s * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Luma with the BT.601 weights, in 14-bit fixed point.
#[inline]
pub fn rgb_to_gray(rgb: [u8; 3]) -> u8 {
    let y = 4899 * rgb[0] as u32 + 9617 * rgb[1] as u32 + 1868 * rgb[2] as u32;
    ((y + (1 << 13)) >> 14).min(255) as u8
}

/// Grayscale single-channel sources for the two search passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorSources {
    /// White and yellow markings, or the lightness channel.
    pub combined: GrayImage,
    /// Yellow-masked markings only.
    pub yellow: GrayImage,
}

/// Split an RGB ROI into the combined and the yellow-only gray sources.
pub fn color_sources(roi: &RgbImage, params: &PreprocParams) -> ColorSources {
    let width = roi.width() as usize;
    let height = roi.height() as usize;
    let mut combined = GrayImage::new(width, height);
    let mut yellow = GrayImage::new(width, height);

    for (i, px) in roi.pixels().enumerate() {
        let hls = rgb_to_hls(px.0);
        let gray = rgb_to_gray(px.0);
        let is_yellow = params.yellow.contains(hls);

        combined.data[i] = match params.channel_mode {
            ChannelMode::Lightness => hls[1],
            ChannelMode::ColorFiltered if is_yellow || params.white.contains(hls) => gray,
            ChannelMode::ColorFiltered => 0,
        };
        if is_yellow {
            yellow.data[i] = gray;
        }
    }

    ColorSources { combined, yellow }
}
