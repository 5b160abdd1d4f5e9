use super::{cross, Point, Vector};
use crate::error::GeometryError;

/// Parametric line-line intersection.
///
/// Returns the scalar `t` such that `p1 + t * d1` lies on the line
/// `(p2, d2)`. The denominator is tested as an exact integer cross
/// product, so every caller sees the same definition of "parallel" with no
/// floating-point drift.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] when the lines are parallel.
#[allow(clippy::cast_precision_loss)]
pub fn line_intersect_param(
    p1: Point,
    d1: Vector,
    p2: Point,
    d2: Vector,
) -> Result<f64, GeometryError> {
    let denom = cross(d2, d1);
    if denom == 0 {
        return Err(GeometryError::Degenerate(
            "parallel lines do not intersect".to_owned(),
        ));
    }
    let w = p1 - p2;
    let numer = i64::from(d2.y) * i64::from(w.x) - i64::from(d2.x) * i64::from(w.y);
    Ok(numer as f64 / denom as f64)
}

/// Evaluates `p + d * t`, rounding each coordinate to the nearest board unit.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn param_point(p: Point, d: Vector, t: f64) -> Point {
    Point::new(
        (f64::from(p.x) + f64::from(d.x) * t).round() as i32,
        (f64::from(p.y) + f64::from(d.y) * t).round() as i32,
    )
}

/// Returns the intersection point of the lines `(p1, d1)` and `(p2, d2)`.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] when the lines are parallel.
pub fn line_intersect_point(
    p1: Point,
    d1: Vector,
    p2: Point,
    d2: Vector,
) -> Result<Point, GeometryError> {
    let t = line_intersect_param(p1, d1, p2, d2)?;
    Ok(param_point(p1, d1, t))
}
