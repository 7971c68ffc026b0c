use lane_detect_core::{
    homography_from_4pt, warp_perspective_gray, GrayImage, GrayImageView, Homography,
};
use nalgebra::Point2;

use crate::{BirdseyePoints, PreprocError};

/// Perspective mapping between the ROI and its bird's-eye view.
///
/// Both images share the same size. The source trapezoid maps onto
/// `[0,0] [w,0] [inset,h] [w-inset,h]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdseyeTransform {
    pub width: usize,
    pub height: usize,
    /// ROI pixel -> bird's-eye pixel.
    pub to_birdseye: Homography,
    /// Bird's-eye pixel -> ROI pixel.
    pub to_roi: Homography,
}

impl BirdseyeTransform {
    pub fn new(
        width: usize,
        height: usize,
        points: &BirdseyePoints,
        inset: f32,
    ) -> Result<Self, PreprocError> {
        let p = |v: [f32; 2]| Point2::new(v[0], v[1]);
        let src = [
            p(points.left_upper),
            p(points.right_upper),
            p(points.left_lower),
            p(points.right_lower),
        ];
        let (w, h) = (width as f32, height as f32);
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(inset, h),
            Point2::new(w - inset, h),
        ];

        let to_birdseye = homography_from_4pt(&src, &dst).ok_or(PreprocError::DegenerateBirdseye)?;
        let to_roi = homography_from_4pt(&dst, &src).ok_or(PreprocError::DegenerateBirdseye)?;

        Ok(Self {
            width,
            height,
            to_birdseye,
            to_roi,
        })
    }

    /// Warp an ROI-space image into the bird's-eye view.
    pub fn warp(&self, roi: &GrayImageView<'_>) -> GrayImage {
        warp_perspective_gray(roi, self.to_roi, self.width, self.height)
    }

    /// Warp a bird's-eye image back onto the ROI.
    pub fn unwarp(&self, birdseye: &GrayImageView<'_>) -> GrayImage {
        warp_perspective_gray(birdseye, self.to_birdseye, self.width, self.height)
    }
}
