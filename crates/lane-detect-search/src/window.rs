use std::fmt;

use lane_detect_core::{GrayImageView, LanePair, PixelPoint, Side};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{locate_lane_bases, Histogram, LaneBases, SearchError, SearchParams};

/// Which binary source a search runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneType {
    /// White and yellow markings (or the lightness channel).
    Combined,
    /// Yellow-masked markings only; adequate windows also count towards
    /// yellow dominance.
    Yellow,
}

impl fmt::Display for LaneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneType::Combined => f.write_str("combined"),
            LaneType::Yellow => f.write_str("yellow"),
        }
    }
}

/// One window of a search pass, recorded for debug drawing.
///
/// `x_low..x_high` and `y_low..y_high` are half-open and may extend past the
/// frame border; only the clipped part was scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub side: Side,
    pub index: usize,
    pub x_low: i64,
    pub x_high: i64,
    pub y_low: usize,
    pub y_high: usize,
    pub pixel_count: usize,
    pub adequate: bool,
}

/// Result of one sliding-window pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Collected pixels per side, bottom window first, row-major inside a window.
    pub points: LanePair<Vec<PixelPoint>>,
    /// Whether each side had enough adequate windows to be fitted.
    pub sides_ok: LanePair<bool>,
    /// Both sides had enough adequate windows on a yellow pass.
    pub yellow_dominant: bool,
    pub adequate_windows: LanePair<usize>,
    pub yellow_windows: LanePair<usize>,
    pub bases: LaneBases,
    /// Empty unless `SearchParams::record_windows` is set.
    pub windows: Vec<SearchWindow>,
}

impl SearchOutcome {
    pub fn points(&self) -> LanePair<&[PixelPoint]> {
        LanePair::new(&self.points.left[..], &self.points.right[..])
    }
}

/// Number of adequate windows a side has to exceed: `round(window_count / 3)`.
pub fn adequacy_quota(window_count: usize) -> usize {
    (window_count as f64 / 3.0).round() as usize
}

/// Yellow dominance holds when both sides exceed the adequacy quota.
pub fn is_yellow_dominant(yellow_windows: LanePair<usize>, window_count: usize) -> bool {
    let quota = adequacy_quota(window_count);
    yellow_windows.left > quota && yellow_windows.right > quota
}

struct SideState {
    current_x: i64,
    adequate: usize,
    yellow: usize,
    points: Vec<PixelPoint>,
}

impl SideState {
    fn new(base: usize) -> Self {
        Self {
            current_x: base as i64,
            adequate: 0,
            yellow: 0,
            points: Vec::new(),
        }
    }
}

/// Append every non-zero pixel of the (clipped) window to `out`, returning
/// how many were added.
fn collect_window(
    frame: &GrayImageView<'_>,
    x_low: i64,
    x_high: i64,
    y_low: usize,
    y_high: usize,
    out: &mut Vec<PixelPoint>,
) -> usize {
    let x0 = x_low.max(0) as usize;
    let x1 = x_high.clamp(0, frame.width as i64) as usize;
    if x0 >= x1 {
        return 0;
    }

    let before = out.len();
    for y in y_low..y_high {
        let row = frame.row(y);
        for (x, &v) in row[x0..x1].iter().enumerate() {
            if v != 0 {
                out.push(PixelPoint::new((x0 + x) as u32, y as u32));
            }
        }
    }
    out.len() - before
}

fn mean_column(points: &[PixelPoint]) -> f64 {
    let sum: u64 = points.iter().map(|p| p.x as u64).sum();
    sum as f64 / points.len() as f64
}

/// Walk `window_count` windows bottom-to-top on both sides of the frame.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(frame, histogram, params),
        fields(width = frame.width, height = frame.height, lane_type = %lane_type)
    )
)]
pub fn search_lanes(
    frame: &GrayImageView<'_>,
    histogram: &Histogram,
    lane_type: LaneType,
    params: &SearchParams,
) -> Result<SearchOutcome, SearchError> {
    frame.validate()?;
    params.validate()?;
    if histogram.len() != frame.width {
        return Err(SearchError::HistogramMismatch {
            histogram: histogram.len(),
            width: frame.width,
        });
    }
    let window_count = params.window_count;
    let bases = locate_lane_bases(histogram)?;
    // Zero on frames shorter than the window count: every window is empty.
    let window_h = frame.height / window_count;
    let offset = params.offset as i64;

    let mut state = LanePair::new(SideState::new(bases.left), SideState::new(bases.right));
    let mut windows = Vec::new();

    for w in 0..window_count {
        let y_low = frame.height - (w + 1) * window_h;
        let y_high = frame.height - w * window_h;

        for side in Side::BOTH {
            let st = state.get_mut(side);
            let x_low = st.current_x - offset;
            let x_high = st.current_x + offset;

            let start = st.points.len();
            let count = collect_window(frame, x_low, x_high, y_low, y_high, &mut st.points);
            let adequate = count > params.min_pixels;
            if adequate {
                st.adequate += 1;
                if lane_type == LaneType::Yellow {
                    st.yellow += 1;
                }
                st.current_x = mean_column(&st.points[start..]).round() as i64;
            }

            if params.record_windows {
                windows.push(SearchWindow {
                    side,
                    index: w,
                    x_low,
                    x_high,
                    y_low,
                    y_high,
                    pixel_count: count,
                    adequate,
                });
            }
        }
    }

    let quota = adequacy_quota(window_count);
    let adequate_windows = LanePair::new(state.left.adequate, state.right.adequate);
    let yellow_windows = LanePair::new(state.left.yellow, state.right.yellow);
    let sides_ok = adequate_windows.map(|n| n > quota);
    let yellow_dominant = is_yellow_dominant(yellow_windows, window_count);

    debug!(
        "{lane_type} search: bases ({}, {}), adequate {}/{} of {window_count} (quota {quota}), yellow {}/{}",
        bases.left,
        bases.right,
        adequate_windows.left,
        adequate_windows.right,
        yellow_windows.left,
        yellow_windows.right
    );

    Ok(SearchOutcome {
        points: LanePair::new(state.left.points, state.right.points),
        sides_ok,
        yellow_dominant,
        adequate_windows,
        yellow_windows,
        bases,
        windows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_histogram;
    use lane_detect_core::GrayImage;

    fn params(window_count: usize, offset: u32, min_pixels: usize) -> SearchParams {
        SearchParams {
            window_count,
            offset,
            min_pixels,
            roi_proportion: 1.0,
            record_windows: true,
        }
    }

    fn fill(frame: &mut GrayImage, xs: std::ops::Range<usize>, ys: std::ops::Range<usize>) {
        for y in ys {
            for x in xs.clone() {
                frame.set(x, y, 255);
            }
        }
    }

    fn run(frame: &GrayImage, lane_type: LaneType, p: &SearchParams) -> SearchOutcome {
        let hist = build_histogram(&frame.view(), p.roi_proportion).expect("histogram");
        search_lanes(&frame.view(), &hist, lane_type, p).expect("search")
    }

    #[test]
    fn quota_rounds_a_third_of_the_window_count() {
        assert_eq!(adequacy_quota(20), 7);
        assert_eq!(adequacy_quota(15), 5);
        assert_eq!(adequacy_quota(10), 3);
        assert_eq!(adequacy_quota(8), 3);
        assert_eq!(adequacy_quota(1), 0);
    }

    #[test]
    fn yellow_dominance_boundary_on_both_sides() {
        // window_count = 9 -> quota = 3
        let n = 9;
        assert!(!is_yellow_dominant(LanePair::new(3, 3), n));
        assert!(!is_yellow_dominant(LanePair::new(4, 3), n));
        assert!(!is_yellow_dominant(LanePair::new(3, 4), n));
        assert!(!is_yellow_dominant(LanePair::new(2, 9), n));
        assert!(is_yellow_dominant(LanePair::new(4, 4), n));
        assert!(is_yellow_dominant(LanePair::new(5, 9), n));
    }

    #[test]
    fn single_column_window_is_adequate_on_its_side() {
        // One column of 30 pixels filling the bottom window (height 30).
        let mut frame = GrayImage::new(100, 90);
        fill(&mut frame, 20..21, 60..90);
        let p = params(3, 10, 10);

        let out = run(&frame, LaneType::Combined, &p);
        assert_eq!(out.bases.left, 20);
        assert_eq!(out.adequate_windows.left, 1);
        // quota = round(3 / 3) = 1, one adequate window does not exceed it.
        assert!(!out.sides_ok.left);
        assert_eq!(out.points.left.len(), 30);
        assert!(out.points.left.iter().all(|pt| pt.x == 20));
        assert!(out.windows[0].adequate);
        assert_eq!(out.windows[0].side, Side::Left);
    }

    #[test]
    fn column_spanning_the_frame_makes_its_side_adequate() {
        let mut frame = GrayImage::new(100, 90);
        fill(&mut frame, 70..71, 0..90);
        let p = params(3, 10, 10);

        let out = run(&frame, LaneType::Combined, &p);
        assert_eq!(out.bases.right, 70);
        assert_eq!(out.adequate_windows.right, 3);
        assert!(out.sides_ok.right);
        assert!(!out.sides_ok.left);
        assert!(out.points.left.is_empty());
        assert!(!out.yellow_dominant);
    }

    #[test]
    fn all_zero_frame_leaves_both_sides_inadequate() {
        let frame = GrayImage::new(64, 40);
        let out = run(&frame, LaneType::Yellow, &params(4, 8, 1));
        assert_eq!(out.sides_ok, LanePair::new(false, false));
        assert!(!out.yellow_dominant);
        assert!(out.points.left.is_empty() && out.points.right.is_empty());
    }

    #[test]
    fn yellow_dominance_follows_window_counts_from_pixels() {
        // 9 windows of height 10, quota 3. Stripes cover `k` bottom windows.
        let build = |left_windows: usize, right_windows: usize| {
            let mut frame = GrayImage::new(100, 90);
            fill(&mut frame, 20..24, 90 - left_windows * 10..90);
            fill(&mut frame, 76..80, 90 - right_windows * 10..90);
            frame
        };
        let p = params(9, 10, 5);

        for (l, r, expected) in [
            (3, 3, false),
            (4, 3, false),
            (3, 4, false),
            (4, 4, true),
            (2, 5, false),
            (5, 5, true),
        ] {
            let out = run(&build(l, r), LaneType::Yellow, &p);
            assert_eq!(out.yellow_windows, LanePair::new(l, r), "counts for ({l}, {r})");
            assert_eq!(out.yellow_dominant, expected, "dominance for ({l}, {r})");
        }

        // The same pixels on a combined pass never signal yellow.
        let out = run(&build(5, 5), LaneType::Combined, &p);
        assert_eq!(out.yellow_windows, LanePair::new(0, 0));
        assert!(!out.yellow_dominant);
        assert_eq!(out.sides_ok, LanePair::new(true, true));
    }

    #[test]
    fn windows_recenter_on_drifting_lane() {
        // A diagonal stripe: x grows by 1 every 2 rows going up.
        let mut frame = GrayImage::new(200, 100);
        for y in 0..100 {
            let x = 40 + (99 - y) / 2;
            fill(&mut frame, x..x + 3, y..y + 1);
        }
        let p = params(10, 12, 5);
        let out = run(&frame, LaneType::Combined, &p);

        assert_eq!(out.adequate_windows.left, 10);
        let left_windows: Vec<_> = out.windows.iter().filter(|w| w.side == Side::Left).collect();
        assert!(left_windows.last().unwrap().x_low > left_windows[0].x_low + 15);
        assert_eq!(out.points.left.len(), 300);
    }

    #[test]
    fn windows_clip_at_the_frame_border() {
        let mut frame = GrayImage::new(50, 20);
        fill(&mut frame, 0..2, 0..20);
        let out = run(&frame, LaneType::Combined, &params(2, 10, 3));
        assert_eq!(out.windows[0].x_low, -10);
        assert_eq!(out.points.left.len(), 40);
        assert!(out.sides_ok.left);
    }

    #[test]
    fn mismatched_histogram_is_rejected() {
        let frame = GrayImage::new(10, 10);
        let hist = Histogram { bins: vec![0; 9] };
        assert_eq!(
            search_lanes(&frame.view(), &hist, LaneType::Combined, &params(2, 3, 1)),
            Err(SearchError::HistogramMismatch {
                histogram: 9,
                width: 10
            })
        );
    }

    #[test]
    fn frame_shorter_than_window_count_leaves_both_sides_inadequate() {
        let mut frame = GrayImage::new(400, 15);
        fill(&mut frame, 95..105, 0..15);
        fill(&mut frame, 295..305, 0..15);
        let p = SearchParams {
            record_windows: true,
            ..SearchParams::default()
        };

        let out = run(&frame, LaneType::Yellow, &p);
        assert_eq!(out.bases.left, 95);
        assert_eq!(out.sides_ok, LanePair::new(false, false));
        assert_eq!(out.adequate_windows, LanePair::new(0, 0));
        assert!(!out.yellow_dominant);
        assert!(out.points.left.is_empty() && out.points.right.is_empty());
        assert_eq!(out.windows.len(), 2 * p.window_count);
        assert!(out.windows.iter().all(|w| w.y_low == w.y_high && w.pixel_count == 0));
    }
}
