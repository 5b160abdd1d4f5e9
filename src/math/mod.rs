pub mod distance;
pub mod intersect;

pub use distance::point_segment_distance;
pub use intersect::{line_intersect_param, line_intersect_point, param_point};

/// 2D board-space point, in integer board units.
pub type Point = nalgebra::Point2<i32>;

/// 2D board-space displacement vector.
pub type Vector = nalgebra::Vector2<i32>;

/// 2D device-space (pixel) point.
pub type ScreenPoint = nalgebra::Point2<f64>;

/// Signum function: returns -1, 0 or +1.
///
/// `sign(0) == 0`; a zero sign means "no constraint" wherever secant
/// component signs gate the no-flip clamp.
#[must_use]
pub fn sign(x: i32) -> i32 {
    x.signum()
}

/// Rotates a vector by 90 degrees: `(x, y) -> (-y, x)`.
#[must_use]
pub fn perp(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}

/// Dot product, widened to `i64` so board-unit coordinates cannot overflow.
#[must_use]
pub fn dot(a: Vector, b: Vector) -> i64 {
    i64::from(a.x) * i64::from(b.x) + i64::from(a.y) * i64::from(b.y)
}

/// 2D cross product (z component), widened to `i64`.
#[must_use]
pub fn cross(a: Vector, b: Vector) -> i64 {
    i64::from(a.x) * i64::from(b.y) - i64::from(a.y) * i64::from(b.x)
}

/// Returns true iff the two direction vectors are parallel.
///
/// Exact integer test; equivalent to `dot(d1, perp(d2)) == 0`.
#[must_use]
pub fn is_parallel(d1: Vector, d2: Vector) -> bool {
    cross(d1, d2) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0), 0);
        assert_eq!(sign(17), 1);
        assert_eq!(sign(-4), -1);
    }

    #[test]
    fn perp_rotates_ccw() {
        assert_eq!(perp(Vector::new(1, 0)), Vector::new(0, 1));
        assert_eq!(perp(Vector::new(0, 1)), Vector::new(-1, 0));
        assert_eq!(perp(Vector::new(3, 4)), Vector::new(-4, 3));
    }

    #[test]
    fn perp_is_orthogonal() {
        let v = Vector::new(12, -7);
        assert_eq!(dot(v, perp(v)), 0);
    }

    #[test]
    fn parallel_vectors() {
        assert!(is_parallel(Vector::new(2, 4), Vector::new(1, 2)));
        assert!(is_parallel(Vector::new(-3, 0), Vector::new(5, 0)));
        assert!(!is_parallel(Vector::new(1, 0), Vector::new(1, 1)));
    }

    #[test]
    fn wide_products_do_not_overflow() {
        let a = Vector::new(i32::MAX, i32::MAX);
        let b = Vector::new(i32::MAX, -i32::MAX);
        assert_eq!(dot(a, b), 0);
        assert!(cross(a, b) < 0);
    }
}
