//! Core types and utilities for lane detection.
//!
//! This crate is intentionally small: single-channel image views, the
//! perspective machinery used for the bird's-eye projection, and the
//! straight-line lane model shared by the search and orchestration crates.
//! It does *not* depend on any concrete image decoding library.

mod homography;
mod image;
mod lane;
mod logger;

pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, ImageError};
pub use lane::{LanePair, LineFit, PixelPoint, Side};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
