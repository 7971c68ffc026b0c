use image::RgbImage;
use lane_detect_core::{GrayImage, ImageError};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    color_sources, downscale, extract_roi, gaussian_blur, opening, sobel_x_abs, threshold_binary,
    BirdseyeTransform, PreprocError, PreprocParams,
};

/// Everything the lane search and the overlay need from one input frame.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    /// Bird's-eye binary of the combined (white + yellow or lightness) source.
    pub combined: GrayImage,
    /// Bird's-eye binary of the yellow-masked source.
    pub yellow: GrayImage,
    /// Downscaled, cropped color frame.
    pub roi: RgbImage,
    /// Band above the ROI, kept to rebuild the full frame.
    pub discarded: RgbImage,
    pub birdseye: BirdseyeTransform,
}

/// Turns a color frame into the two bird's-eye binaries.
pub trait FramePreprocessor {
    fn prepare(&self, frame: &RgbImage) -> Result<PreparedFrame, PreprocError>;
}

/// Downscale, crop, color-mask, warp and binarize.
#[derive(Clone, Debug)]
pub struct LanePreprocessor {
    params: PreprocParams,
    birdseye: BirdseyeTransform,
}

impl LanePreprocessor {
    pub fn new(params: PreprocParams) -> Result<Self, PreprocError> {
        params.validate()?;
        let (roi_w, roi_h) = params.roi_size();
        let birdseye = BirdseyeTransform::new(
            roi_w as usize,
            roi_h as usize,
            &params.birdseye,
            params.birdseye_inset,
        )?;
        Ok(Self { params, birdseye })
    }

    pub fn params(&self) -> &PreprocParams {
        &self.params
    }

    pub fn birdseye(&self) -> &BirdseyeTransform {
        &self.birdseye
    }

    /// Grayscale bird's-eye image -> opened binary.
    fn binarize(&self, birdseye: &GrayImage) -> GrayImage {
        let p = &self.params;
        let blurred = gaussian_blur(&birdseye.view(), p.blur_sigma);
        let gradient = sobel_x_abs(&blurred.view());
        let binary = threshold_binary(&gradient.view(), p.sobel_threshold());
        opening(&binary.view(), p.opening_kernel, p.opening_iterations)
    }
}

impl FramePreprocessor for LanePreprocessor {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    fn prepare(&self, frame: &RgbImage) -> Result<PreparedFrame, PreprocError> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return Err(ImageError::Empty {
                width: w as usize,
                height: h as usize,
            }
            .into());
        }

        let scaled = downscale(frame, &self.params);
        let (roi, discarded) = extract_roi(&scaled, &self.params)?;
        let sources = color_sources(&roi, &self.params);

        let combined = self.binarize(&self.birdseye.warp(&sources.combined.view()));
        let yellow = self.binarize(&self.birdseye.warp(&sources.yellow.view()));
        debug!(
            "prepared {}x{} frame: {} combined / {} yellow candidate pixels",
            w,
            h,
            combined.count_nonzero(),
            yellow.count_nonzero()
        );

        Ok(PreparedFrame {
            combined,
            yellow,
            roi,
            discarded,
            birdseye: self.birdseye,
        })
    }
}
