//! Drawing helpers: the lane overlay on the camera frame and the search
//! windows on a bird's-eye binary.

use std::ops::Range;

use image::{Rgb, RgbImage};
use lane_detect_core::{GrayImage, LanePair, LineFit};
use lane_detect_preproc::PreparedFrame;
use lane_detect_search::{Direction, DirectionReport, SearchWindow};

const LANE_FILL: [u8; 3] = [0, 120, 0];
const CENTER_LINE: [u8; 3] = [0, 0, 255];
const CENTER_HALF_WIDTH: f64 = 1.0;
const OVERLAY_WEIGHT: f32 = 0.5;

const MARKER_SIZE: u32 = 16;
const MARKER_STEP: i64 = 40;
const MARKER_CENTERED: Rgb<u8> = Rgb([0, 255, 0]);
const MARKER_OFF_CENTER: Rgb<u8> = Rgb([255, 0, 0]);

const WINDOW_ADEQUATE: Rgb<u8> = Rgb([0, 255, 0]);
const WINDOW_INADEQUATE: Rgb<u8> = Rgb([255, 0, 0]);

/// Columns `ceil(lo)..=floor(hi)` clipped to `[0, width)`.
fn column_span(lo: f64, hi: f64, width: usize) -> Range<usize> {
    if !lo.is_finite() || !hi.is_finite() || hi < 0.0 {
        return 0..0;
    }
    let start = lo.ceil().max(0.0) as usize;
    let end = ((hi.floor() + 1.0).max(0.0) as usize).min(width);
    start.min(end)..end
}

/// Paint the lane polygon and its center line in bird's-eye space, one
/// plane per color channel.
fn paint_lane(fits: &LanePair<LineFit>, width: usize, height: usize) -> [GrayImage; 3] {
    let mut planes = [
        GrayImage::new(width, height),
        GrayImage::new(width, height),
        GrayImage::new(width, height),
    ];
    for y in 0..height {
        let xl = fits.left.x_at(y as f64);
        let xr = fits.right.x_at(y as f64);
        for x in column_span(xl.min(xr), xl.max(xr), width) {
            for (plane, &v) in planes.iter_mut().zip(&LANE_FILL) {
                plane.set(x, y, v);
            }
        }
        let xc = ((xl + xr) / 2.0).round();
        for x in column_span(xc - CENTER_HALF_WIDTH, xc + CENTER_HALF_WIDTH, width) {
            for (plane, &v) in planes.iter_mut().zip(&CENTER_LINE) {
                plane.set(x, y, v);
            }
        }
    }
    planes
}

fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, size: u32, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for y in y0.max(0)..(y0 + size as i64).min(h) {
        for x in x0.max(0)..(x0 + size as i64).min(w) {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Blend the lane overlay onto the ROI, restack the discarded band on top
/// and mark the direction near the bottom edge.
pub fn render_overlay(
    prepared: &PreparedFrame,
    fits: &LanePair<LineFit>,
    direction: &DirectionReport,
) -> RgbImage {
    let birdseye = &prepared.birdseye;
    let planes = paint_lane(fits, birdseye.width, birdseye.height)
        .map(|plane| birdseye.unwarp(&plane.view()));

    let roi = &prepared.roi;
    let top = prepared.discarded.height();
    let mut out = RgbImage::new(roi.width(), top + roi.height());

    for (x, y, px) in prepared.discarded.enumerate_pixels() {
        if x < out.width() {
            out.put_pixel(x, y, *px);
        }
    }
    for (x, y, px) in roi.enumerate_pixels() {
        let (xu, yu) = (x as usize, y as usize);
        let mut blended = px.0;
        if xu < birdseye.width && yu < birdseye.height {
            for (c, value) in blended.iter_mut().enumerate() {
                let add = planes[c].get(xu, yu) as f32 * OVERLAY_WEIGHT;
                *value = (*value as f32 + add).round().min(255.0) as u8;
            }
        }
        out.put_pixel(x, top + y, Rgb(blended));
    }

    let color = match direction.direction {
        Direction::Centered => MARKER_CENTERED,
        Direction::Left | Direction::Right => MARKER_OFF_CENTER,
    };
    let cx = out.width() as i64 / 2 + direction.direction.code() as i64 * MARKER_STEP;
    let y0 = out.height() as i64 - 2 * MARKER_SIZE as i64;
    fill_rect(
        &mut out,
        cx - MARKER_SIZE as i64 / 2,
        y0,
        MARKER_SIZE,
        color,
    );

    out
}

/// Binary frame as RGB with every recorded window outlined; adequate
/// windows in green, the rest in red.
pub fn draw_search_windows(binary: &GrayImage, windows: &[SearchWindow]) -> RgbImage {
    let (w, h) = (binary.width as u32, binary.height as u32);
    let mut out = RgbImage::from_fn(w, h, |x, y| {
        let v = binary.get(x as usize, y as usize);
        Rgb([v, v, v])
    });

    for win in windows {
        let color = if win.adequate {
            WINDOW_ADEQUATE
        } else {
            WINDOW_INADEQUATE
        };
        let x0 = win.x_low.max(0);
        let x1 = (win.x_high - 1).min(w as i64 - 1);
        let y0 = win.y_low as i64;
        let y1 = (win.y_high as i64 - 1).min(h as i64 - 1);
        if x0 > x1 || y0 > y1 {
            continue;
        }
        for x in x0..=x1 {
            out.put_pixel(x as u32, y0 as u32, color);
            out.put_pixel(x as u32, y1 as u32, color);
        }
        for y in y0..=y1 {
            if win.x_low >= 0 {
                out.put_pixel(x0 as u32, y as u32, color);
            }
            if win.x_high <= w as i64 {
                out.put_pixel(x1 as u32, y as u32, color);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_detect_core::{Homography, Side};
    use lane_detect_preproc::BirdseyeTransform;

    fn identity_prepared(w: u32, roi_h: u32, top: u32) -> PreparedFrame {
        PreparedFrame {
            combined: GrayImage::new(w as usize, roi_h as usize),
            yellow: GrayImage::new(w as usize, roi_h as usize),
            roi: RgbImage::from_pixel(w, roi_h, Rgb([10, 10, 10])),
            discarded: RgbImage::from_pixel(w, top, Rgb([200, 0, 200])),
            birdseye: BirdseyeTransform {
                width: w as usize,
                height: roi_h as usize,
                to_birdseye: Homography::identity(),
                to_roi: Homography::identity(),
            },
        }
    }

    fn report(direction: Direction) -> DirectionReport {
        DirectionReport {
            direction,
            lane_center_x: 0,
            deviation_px: 0.0,
            row: 0.0,
        }
    }

    #[test]
    fn column_span_clips_to_the_frame() {
        assert_eq!(column_span(2.5, 5.0, 10), 3..6);
        assert_eq!(column_span(-4.0, 2.2, 10), 0..3);
        assert_eq!(column_span(8.0, 30.0, 10), 8..10);
        assert_eq!(column_span(-9.0, -1.0, 10), 0..0);
        assert_eq!(column_span(f64::NAN, 3.0, 10), 0..0);
        assert_eq!(column_span(12.0, 14.0, 10), 10..10);
    }

    #[test]
    fn overlay_fills_between_lines_and_restacks_the_band() {
        let prepared = identity_prepared(100, 40, 20);
        let fits = LanePair::new(LineFit::vertical(20.0), LineFit::vertical(80.0));
        let out = render_overlay(&prepared, &fits, &report(Direction::Centered));

        assert_eq!(out.dimensions(), (100, 60));
        assert_eq!(out.get_pixel(5, 5), &Rgb([200, 0, 200]));
        // Inside the lane: 10 + 0.5 * 120 on green.
        assert_eq!(out.get_pixel(30, 25), &Rgb([10, 70, 10]));
        // Outside the lane the ROI is untouched.
        assert_eq!(out.get_pixel(5, 25), &Rgb([10, 10, 10]));
        // Center line at column 50.
        assert_eq!(out.get_pixel(50, 25), &Rgb([10, 10, 138]));
    }

    #[test]
    fn direction_marker_moves_with_the_direction() {
        let prepared = identity_prepared(200, 60, 0);
        let fits = LanePair::new(LineFit::vertical(-50.0), LineFit::vertical(-40.0));

        let left = render_overlay(&prepared, &fits, &report(Direction::Left));
        assert_eq!(left.get_pixel(60, 30), &MARKER_OFF_CENTER);
        let centered = render_overlay(&prepared, &fits, &report(Direction::Centered));
        assert_eq!(centered.get_pixel(100, 30), &MARKER_CENTERED);
        assert_eq!(centered.get_pixel(60, 30), &Rgb([10, 10, 10]));
    }

    #[test]
    fn windows_are_outlined_by_adequacy() {
        let mut binary = GrayImage::new(50, 20);
        binary.set(10, 15, 255);
        let windows = [
            SearchWindow {
                side: Side::Left,
                index: 0,
                x_low: 5,
                x_high: 15,
                y_low: 10,
                y_high: 20,
                pixel_count: 60,
                adequate: true,
            },
            SearchWindow {
                side: Side::Right,
                index: 0,
                x_low: 40,
                x_high: 60,
                y_low: 10,
                y_high: 20,
                pixel_count: 0,
                adequate: false,
            },
        ];
        let out = draw_search_windows(&binary, &windows);
        assert_eq!(out.get_pixel(10, 15), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(5, 12), &WINDOW_ADEQUATE);
        assert_eq!(out.get_pixel(14, 19), &WINDOW_ADEQUATE);
        assert_eq!(out.get_pixel(45, 10), &WINDOW_INADEQUATE);
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
