use super::Point;

/// Returns the minimum distance from `p` to the segment `a`→`b`,
/// in board units.
///
/// Used for hit testing segments and outline lines against a pointer
/// position converted to board coordinates.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let px = f64::from(p.x);
    let py = f64::from(p.y);
    let ax = f64::from(a.x);
    let ay = f64::from(a.y);
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        // Degenerate segment (zero length).
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((px - ax) * dx + (py - ay) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = ax + t * dx;
    let closest_y = ay + t * dy;

    ((px - closest_x).powi(2) + (py - closest_y).powi(2)).sqrt()
}
