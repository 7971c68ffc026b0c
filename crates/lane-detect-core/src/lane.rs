use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pixel coordinate of a lane candidate (`x` = column, `y` = row).
pub type PixelPoint = Point2<u32>;

/// Lane side relative to the frame midline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// A value held once per lane side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePair<T> {
    pub left: T,
    pub right: T,
}

impl<T> LanePair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> LanePair<U> {
        LanePair {
            left: f(self.left),
            right: f(self.right),
        }
    }

    pub fn as_ref(&self) -> LanePair<&T> {
        LanePair {
            left: &self.left,
            right: &self.right,
        }
    }
}

/// Straight lane model in bird's-eye pixel space: `x = slope * y + intercept`.
///
/// The column is modelled as a function of the row because lane markings are
/// close to vertical after the perspective warp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Vertical line through column `x`.
    pub fn vertical(x: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: x,
        }
    }

    #[inline]
    pub fn x_at(&self, y: f64) -> f64 {
        self.slope * y + self.intercept
    }

    /// Seed fits used before any frame produced a fit: vertical lines at a
    /// quarter and three quarters of the frame width.
    pub fn seed_pair(frame_width: usize) -> LanePair<LineFit> {
        let w = frame_width as f64;
        LanePair::new(LineFit::vertical(w / 4.0), LineFit::vertical(3.0 * w / 4.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_evaluates_column_from_row() {
        let fit = LineFit::new(0.5, 100.0);
        assert_relative_eq!(fit.x_at(0.0), 100.0);
        assert_relative_eq!(fit.x_at(40.0), 120.0);
    }

    #[test]
    fn seed_pair_splits_frame_in_quarters() {
        let seeds = LineFit::seed_pair(400);
        assert_eq!(seeds.left, LineFit::vertical(100.0));
        assert_eq!(seeds.right, LineFit::vertical(300.0));
    }

    #[test]
    fn pair_accessors_follow_side() {
        let mut pair = LanePair::new(1, 2);
        *pair.get_mut(Side::Right) += 10;
        assert_eq!(*pair.get(Side::Left), 1);
        assert_eq!(*pair.get(Side::Right), 12);
        assert_eq!(pair.map(|v| v * 2), LanePair::new(2, 24));
    }

    #[test]
    fn fits_serialize_as_plain_coefficients() {
        let json = serde_json::to_string(&LineFit::new(0.25, 12.0)).expect("serialize");
        assert_eq!(json, r#"{"slope":0.25,"intercept":12.0}"#);
    }
}
