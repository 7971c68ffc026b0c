use lane_detect_core::{LanePair, LineFit, PixelPoint, Side};
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::FitError;

const RANK_EPS: f64 = 1e-9;

/// Where a side's fit for the current frame came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitSource {
    /// Fitted on this frame's pixels.
    Fresh,
    /// Side was not adequate; previous fit carried forward.
    Carried,
    /// Side was adequate but the fit was degenerate; previous fit substituted.
    Recovered,
}

/// Output of [`fit_lines`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneFits {
    pub fits: LanePair<LineFit>,
    pub sources: LanePair<FitSource>,
}

/// Ordinary least-squares fit of `x = slope * y + intercept`.
///
/// Rows are centred before solving; needs at least two distinct rows.
pub fn fit_line(points: &[PixelPoint]) -> Result<LineFit, FitError> {
    let n = points.len();
    let distinct_rows = count_distinct_rows(points);
    let degenerate = FitError::Degenerate {
        points: n,
        distinct_rows,
    };
    if n < 2 || distinct_rows < 2 {
        return Err(degenerate);
    }

    let y_mean = points.iter().map(|p| p.y as f64).sum::<f64>() / n as f64;
    let a = DMatrix::<f64>::from_fn(n, 2, |r, c| {
        if c == 0 {
            points[r].y as f64 - y_mean
        } else {
            1.0
        }
    });
    let b = DVector::<f64>::from_iterator(n, points.iter().map(|p| p.x as f64));

    let svd = a.svd(true, true);
    if svd.rank(RANK_EPS) < 2 {
        return Err(degenerate);
    }
    let sol = svd.solve(&b, RANK_EPS).map_err(|_| degenerate)?;

    let slope = sol[0];
    let intercept = sol[1] - slope * y_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(degenerate);
    }
    Ok(LineFit::new(slope, intercept))
}

fn count_distinct_rows(points: &[PixelPoint]) -> usize {
    let mut rows: Vec<u32> = points.iter().map(|p| p.y).collect();
    rows.sort_unstable();
    rows.dedup();
    rows.len()
}

/// Fit both sides, carrying the previous fit for every side that is not
/// adequate or whose pixels do not support a line.
///
/// Pure: identical inputs always give identical output, and the previous fits
/// are only copied, never modified.
pub fn fit_lines(
    points: LanePair<&[PixelPoint]>,
    previous: &LanePair<LineFit>,
    sides_ok: LanePair<bool>,
) -> LaneFits {
    let mut fits = *previous;
    let mut sources = LanePair::new(FitSource::Carried, FitSource::Carried);

    for side in Side::BOTH {
        if !*sides_ok.get(side) {
            continue;
        }
        match fit_line(points.get(side)) {
            Ok(fit) => {
                *fits.get_mut(side) = fit;
                *sources.get_mut(side) = FitSource::Fresh;
            }
            Err(err) => {
                debug!("{side:?} lane kept its previous fit: {err}");
                *sources.get_mut(side) = FitSource::Recovered;
            }
        }
    }

    LaneFits { fits, sources }
}
