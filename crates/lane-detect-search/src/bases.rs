use serde::{Deserialize, Serialize};

use crate::{Histogram, SearchError};

/// Starting columns of the left and right lane searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneBases {
    pub left: usize,
    pub right: usize,
    pub midpoint: usize,
}

/// Index of the first maximum, or `None` for an empty slice.
fn first_argmax(values: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Pick the strongest column on each side of the histogram midpoint.
///
/// Ties resolve to the first occurrence. An all-zero histogram yields
/// `(0, midpoint)`.
pub fn locate_lane_bases(histogram: &Histogram) -> Result<LaneBases, SearchError> {
    if histogram.is_empty() {
        return Err(SearchError::EmptyHistogram);
    }
    let midpoint = histogram.midpoint();
    let (left_half, right_half) = histogram.bins.split_at(midpoint);

    let left = first_argmax(left_half).unwrap_or(0);
    let right = midpoint + first_argmax(right_half).unwrap_or(0);

    Ok(LaneBases {
        left,
        right,
        midpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(bins: &[u32]) -> Histogram {
        Histogram {
            bins: bins.to_vec(),
        }
    }

    #[test]
    fn picks_peak_on_each_half() {
        let bases = locate_lane_bases(&hist(&[0, 3, 9, 1, 0, 2, 0, 8])).expect("bases");
        assert_eq!(
            bases,
            LaneBases {
                left: 2,
                right: 7,
                midpoint: 4
            }
        );
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let bases = locate_lane_bases(&hist(&[5, 5, 1, 0, 7, 7, 7])).expect("bases");
        // midpoint = 3: left half [5, 5, 1], right half [0, 7, 7, 7]
        assert_eq!(bases.left, 0);
        assert_eq!(bases.right, 4);
    }

    #[test]
    fn all_zero_histogram_defaults_to_zero_and_midpoint() {
        let bases = locate_lane_bases(&hist(&[0; 10])).expect("bases");
        assert_eq!(bases.left, 0);
        assert_eq!(bases.right, 5);
    }

    #[test]
    fn single_column_has_empty_left_half() {
        let bases = locate_lane_bases(&hist(&[4])).expect("bases");
        assert_eq!(bases.left, 0);
        assert_eq!(bases.right, 0);
    }

    #[test]
    fn empty_histogram_is_rejected() {
        assert_eq!(
            locate_lane_bases(&hist(&[])),
            Err(SearchError::EmptyHistogram)
        );
    }
}
