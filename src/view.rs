use nalgebra::Vector2;

use crate::math::{Point, ScreenPoint};

/// Mapping between screen pixels and board units.
///
/// The editing core never owns pan or zoom; callers hand the current
/// transform in with each event and the core uses it only to map pointer
/// positions and to express fixed pixel tolerances in board units.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
    pub pan: Vector2<f64>,
    pub pixels_per_unit: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vector2::new(0.0, 0.0),
            pixels_per_unit: 1.0,
        }
    }
}

impl ViewTransform {
    /// Maps a board point to screen pixels.
    #[must_use]
    pub fn to_screen(&self, p: Point) -> ScreenPoint {
        ScreenPoint::new(
            f64::from(p.x) * self.pixels_per_unit + self.pan.x,
            f64::from(p.y) * self.pixels_per_unit + self.pan.y,
        )
    }

    /// Maps a screen position to the nearest board point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_board(&self, s: ScreenPoint) -> Point {
        Point::new(
            ((s.x - self.pan.x) / self.pixels_per_unit).round() as i32,
            ((s.y - self.pan.y) / self.pixels_per_unit).round() as i32,
        )
    }

    /// Converts an on-screen tolerance to board units.
    #[must_use]
    pub fn board_tolerance(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_unit
    }

    /// True when `s` lies within `pixels` of `p` on screen, measured as
    /// Manhattan distance. Zoom does not change the feel of the hit target.
    #[must_use]
    pub fn hits_point(&self, s: ScreenPoint, p: Point, pixels: f64) -> bool {
        let q = self.to_screen(p);
        (s.x - q.x).abs() + (s.y - q.y).abs() <= pixels
    }
}

/// Snaps a point to the given grid pitch. A pitch of zero or less leaves
/// the point untouched.
#[must_use]
pub fn snap_to_grid(p: Point, grid: i32) -> Point {
    if grid <= 0 {
        return p;
    }
    let half = grid / 2;
    Point::new(
        (p.x + half).div_euclid(grid) * grid,
        (p.y + half).div_euclid(grid) * grid,
    )
}
