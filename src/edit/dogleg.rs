use crate::math::{sign, Point};

/// Shape of the two-leg route between a fixed start and the cursor.
///
/// Routes are restricted to horizontal, vertical, and 45-degree legs.
/// The two modes differ in which leg comes first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoglegMode {
    /// Axis-aligned leg first, 45-degree leg second.
    #[default]
    StraightDiagonal,
    /// 45-degree leg first, axis-aligned leg second.
    DiagonalStraight,
}

impl DoglegMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::StraightDiagonal => Self::DiagonalStraight,
            Self::DiagonalStraight => Self::StraightDiagonal,
        }
    }

    /// Corner vertex of the dogleg from `start` to `end`.
    ///
    /// The longer axis determines whether the straight leg is horizontal
    /// or vertical; the diagonal leg absorbs the shorter axis exactly, so
    /// both legs land on integer coordinates. When `start == end` (or the
    /// route is already a single straight or diagonal leg) the corner
    /// coincides with one endpoint and the degenerate leg is empty.
    #[must_use]
    pub fn corner(self, start: Point, end: Point) -> Point {
        let d = end - start;
        match self {
            Self::StraightDiagonal => {
                if d.x.abs() > d.y.abs() {
                    Point::new(end.x - sign(d.x) * d.y.abs(), start.y)
                } else {
                    Point::new(start.x, end.y - sign(d.y) * d.x.abs())
                }
            }
            Self::DiagonalStraight => {
                if d.x.abs() > d.y.abs() {
                    Point::new(start.x + sign(d.x) * d.y.abs(), end.y)
                } else {
                    Point::new(end.x, start.y + sign(d.y) * d.x.abs())
                }
            }
        }
    }
}
