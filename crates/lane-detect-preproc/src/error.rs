use lane_detect_core::ImageError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PreprocError {
    #[error(transparent)]
    InvalidInput(#[from] ImageError),
    #[error("ROI is empty: frame {width}x{height} with crop_top={crop_top}, crop_side={crop_side}")]
    EmptyRoi {
        width: u32,
        height: u32,
        crop_top: u32,
        crop_side: u32,
    },
    #[error("bird's-eye source points do not define a perspective transform")]
    DegenerateBirdseye,
    #[error("invalid preprocessing parameter `{field}`: {reason}")]
    InvalidParams {
        field: &'static str,
        reason: &'static str,
    },
}
