use lane_detect_core::{GrayImageView, LanePair, LineFit};
use lane_detect_search::{
    build_histogram, evaluate_direction, fit_lines, search_lanes, DirectionParams,
    DirectionReport, Histogram, LaneFits, LaneType, SearchError, SearchOutcome, SearchParams,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DetectionMode, ModeController, ModePolicy};

/// Search, direction and mode settings for a [`LaneTracker`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    pub search: SearchParams,
    pub direction: DirectionParams,
    pub mode_policy: ModePolicy,
}

/// Histogram, search and fit of one binary source.
#[derive(Clone, Debug, PartialEq)]
pub struct PassResult {
    pub lane_type: LaneType,
    pub histogram: Histogram,
    pub outcome: SearchOutcome,
    pub fits: LaneFits,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackerOutput {
    /// Mode after this frame.
    pub mode: DetectionMode,
    /// Pass whose fits were committed.
    pub authoritative: LaneType,
    /// `None` while locked to yellow.
    pub combined: Option<PassResult>,
    pub yellow: PassResult,
    /// Fits carried into the next frame.
    pub fits: LanePair<LineFit>,
    pub direction: DirectionReport,
}

impl TrackerOutput {
    pub fn authoritative_pass(&self) -> &PassResult {
        match (self.authoritative, &self.combined) {
            (LaneType::Combined, Some(pass)) => pass,
            _ => &self.yellow,
        }
    }
}

/// Frame-to-frame lane state: the carried fits and the detection mode.
///
/// Fits are seeded with vertical lines at a quarter and three quarters of the
/// first frame's width. A frame that fails leaves the state untouched.
#[derive(Clone, Debug)]
pub struct LaneTracker {
    params: TrackerParams,
    mode: ModeController,
    fits: Option<LanePair<LineFit>>,
}

impl LaneTracker {
    pub fn new(params: TrackerParams) -> Result<Self, SearchError> {
        params.search.validate()?;
        let mode = ModeController::new(params.mode_policy);
        Ok(Self {
            params,
            mode,
            fits: None,
        })
    }

    /// Start from known fits instead of the width-based seed.
    pub fn with_fits(mut self, fits: LanePair<LineFit>) -> Self {
        self.fits = Some(fits);
        self
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode.mode()
    }

    pub fn fits(&self) -> Option<&LanePair<LineFit>> {
        self.fits.as_ref()
    }

    fn run_pass(
        &self,
        frame: &GrayImageView<'_>,
        lane_type: LaneType,
        previous: &LanePair<LineFit>,
    ) -> Result<PassResult, SearchError> {
        let search = &self.params.search;
        let histogram = build_histogram(frame, search.roi_proportion)?;
        let outcome = search_lanes(frame, &histogram, lane_type, search)?;
        let fits = fit_lines(outcome.points(), previous, outcome.sides_ok);
        debug!(
            "{lane_type} pass: sides ok ({}, {}), sources ({:?}, {:?})",
            outcome.sides_ok.left, outcome.sides_ok.right, fits.sources.left, fits.sources.right
        );
        Ok(PassResult {
            lane_type,
            histogram,
            outcome,
            fits,
        })
    }

    /// Process one frame given its combined and yellow-only bird's-eye
    /// binaries (same size).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, combined, yellow), fields(mode = ?self.mode.mode()))
    )]
    pub fn process(
        &mut self,
        combined: &GrayImageView<'_>,
        yellow: &GrayImageView<'_>,
    ) -> Result<TrackerOutput, SearchError> {
        combined.validate()?;
        yellow.validate()?;
        if (combined.width, combined.height) != (yellow.width, yellow.height) {
            return Err(SearchError::SizeMismatch {
                first_width: combined.width,
                first_height: combined.height,
                second_width: yellow.width,
                second_height: yellow.height,
            });
        }
        let previous = self
            .fits
            .unwrap_or_else(|| LineFit::seed_pair(yellow.width));

        let combined_pass = if self.mode.runs_combined_pass() {
            Some(self.run_pass(combined, LaneType::Combined, &previous)?)
        } else {
            None
        };
        let yellow_pass = self.run_pass(yellow, LaneType::Yellow, &previous)?;

        let authoritative = self.mode.observe(yellow_pass.outcome.yellow_dominant);
        let committed = match (authoritative, &combined_pass) {
            (LaneType::Combined, Some(pass)) => pass.fits.fits,
            _ => yellow_pass.fits.fits,
        };
        self.fits = Some(committed);

        let direction = evaluate_direction(
            &committed,
            yellow.height,
            yellow.width,
            &self.params.direction,
        )?;

        Ok(TrackerOutput {
            mode: self.mode.mode(),
            authoritative,
            combined: combined_pass,
            yellow: yellow_pass,
            fits: committed,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lane_detect_core::GrayImage;
    use lane_detect_search::{Direction, FitSource};

    fn stripes(width: usize, height: usize, centers: &[usize]) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for y in 0..height {
            for &c in centers {
                for x in c - 5..c + 5 {
                    img.set(x, y, 255);
                }
            }
        }
        img
    }

    fn params(policy: ModePolicy) -> TrackerParams {
        TrackerParams {
            search: SearchParams {
                window_count: 10,
                offset: 15,
                min_pixels: 5,
                ..SearchParams::default()
            },
            direction: DirectionParams::default(),
            mode_policy: policy,
        }
    }

    #[test]
    fn combined_pass_is_authoritative_without_yellow() {
        let mut tracker = LaneTracker::new(params(ModePolicy::Latching)).expect("tracker");
        let combined = stripes(400, 600, &[100, 300]);
        let yellow = GrayImage::new(400, 600);

        let out = tracker.process(&combined.view(), &yellow.view()).expect("frame");
        assert_eq!(out.mode, DetectionMode::Combined);
        assert_eq!(out.authoritative, LaneType::Combined);
        assert!(out.combined.is_some());
        assert_eq!(out.authoritative_pass().lane_type, LaneType::Combined);
        assert_abs_diff_eq!(out.fits.left.intercept, 100.0, epsilon = 1.0);
        assert_abs_diff_eq!(out.fits.right.intercept, 300.0, epsilon = 1.0);
        assert_eq!(out.direction.direction, Direction::Centered);
        // The yellow pass found nothing and carried the seed.
        assert_eq!(out.yellow.fits.fits, LineFit::seed_pair(400));
    }

    #[test]
    fn yellow_dominance_locks_and_skips_the_combined_pass() {
        let mut tracker = LaneTracker::new(params(ModePolicy::Latching)).expect("tracker");
        let combined = stripes(400, 600, &[80, 320]);
        let yellow = stripes(400, 600, &[120, 280]);

        let first = tracker.process(&combined.view(), &yellow.view()).expect("frame");
        assert_eq!(first.mode, DetectionMode::YellowLocked);
        assert_eq!(first.authoritative, LaneType::Yellow);
        assert!(first.combined.is_some());
        assert_abs_diff_eq!(first.fits.left.intercept, 120.0, epsilon = 1.0);

        let blank = GrayImage::new(400, 600);
        let second = tracker.process(&combined.view(), &blank.view()).expect("frame");
        assert!(second.combined.is_none());
        assert_eq!(second.mode, DetectionMode::YellowLocked);
        // Nothing yellow: the locked tracker keeps its previous fits.
        assert_eq!(second.fits, first.fits);
        assert_eq!(
            second.yellow.fits.sources,
            LanePair::new(FitSource::Carried, FitSource::Carried)
        );
    }

    #[test]
    fn reversible_tracker_returns_to_combined() {
        let mut tracker = LaneTracker::new(params(ModePolicy::Reversible { release_after: 2 }))
            .expect("tracker");
        let combined = stripes(400, 600, &[80, 320]);
        let yellow = stripes(400, 600, &[120, 280]);
        let blank = GrayImage::new(400, 600);

        tracker.process(&combined.view(), &yellow.view()).expect("lock");
        tracker.process(&combined.view(), &blank.view()).expect("miss 1");
        let released = tracker.process(&combined.view(), &blank.view()).expect("miss 2");
        assert_eq!(released.mode, DetectionMode::Combined);

        let next = tracker.process(&combined.view(), &blank.view()).expect("combined");
        assert_eq!(next.authoritative, LaneType::Combined);
        assert_abs_diff_eq!(next.fits.left.intercept, 80.0, epsilon = 1.0);
    }

    #[test]
    fn failed_frame_leaves_state_untouched() {
        let mut tracker = LaneTracker::new(params(ModePolicy::Latching)).expect("tracker");
        let good = stripes(400, 600, &[100, 300]);
        let blank = GrayImage::new(400, 600);
        tracker.process(&good.view(), &blank.view()).expect("frame");
        let before = *tracker.fits().expect("fits");

        let yellow = stripes(400, 599, &[120, 280]);
        assert_eq!(
            tracker.process(&good.view(), &yellow.view()).map(|_| ()),
            Err(SearchError::SizeMismatch {
                first_width: 400,
                first_height: 600,
                second_width: 400,
                second_height: 599,
            })
        );
        assert_eq!(tracker.fits(), Some(&before));
        assert_eq!(tracker.mode(), DetectionMode::Combined);
    }

    #[test]
    fn short_frame_carries_the_previous_fits() {
        let mut tracker = LaneTracker::new(params(ModePolicy::Latching)).expect("tracker");
        let good = stripes(400, 600, &[100, 300]);
        let blank = GrayImage::new(400, 600);
        let first = tracker.process(&good.view(), &blank.view()).expect("frame");

        // 5 rows for 10 windows: all windows are empty.
        let short = stripes(400, 5, &[150, 250]);
        let out = tracker.process(&short.view(), &short.view()).expect("short frame");
        assert_eq!(out.fits, first.fits);
        assert_eq!(
            out.authoritative_pass().fits.sources,
            LanePair::new(FitSource::Carried, FitSource::Carried)
        );
        assert_eq!(out.mode, DetectionMode::Combined);
    }

    #[test]
    fn invalid_search_params_are_rejected() {
        let mut p = params(ModePolicy::Latching);
        p.search.window_count = 0;
        assert!(LaneTracker::new(p).is_err());
    }
}
