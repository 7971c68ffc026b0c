use image::{imageops, RgbImage};

use crate::{PreprocError, PreprocParams};

/// Resize to the working resolution. Frames already at that size are copied.
pub fn downscale(frame: &RgbImage, params: &PreprocParams) -> RgbImage {
    if frame.dimensions() == (params.target_width, params.target_height) {
        return frame.clone();
    }
    imageops::resize(
        frame,
        params.target_width,
        params.target_height,
        imageops::FilterType::Triangle,
    )
}

/// Cut the region of interest out of a downscaled frame.
///
/// Returns `(roi, discarded)`: the ROI covers rows `[crop_top, h)` and
/// columns `[crop_side, w - crop_side)`; `discarded` is the band above it over
/// the same columns.
pub fn extract_roi(
    frame: &RgbImage,
    params: &PreprocParams,
) -> Result<(RgbImage, RgbImage), PreprocError> {
    let (w, h) = frame.dimensions();
    let empty = PreprocError::EmptyRoi {
        width: w,
        height: h,
        crop_top: params.crop_top,
        crop_side: params.crop_side,
    };
    if params.crop_top >= h || 2 * params.crop_side >= w {
        return Err(empty);
    }
    let roi_w = w - 2 * params.crop_side;

    let roi = imageops::crop_imm(
        frame,
        params.crop_side,
        params.crop_top,
        roi_w,
        h - params.crop_top,
    )
    .to_image();
    let discarded =
        imageops::crop_imm(frame, params.crop_side, 0, roi_w, params.crop_top).to_image();

    Ok((roi, discarded))
}
