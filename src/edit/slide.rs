use crate::error::{GeometryError, Result, TopologyError};
use crate::graph::{SegmentId, TraceGraph, VertexId};
use crate::math::{
    line_intersect_param, line_intersect_point, param_point, perp, sign, Point, Vector,
};

/// Maximum clamp-and-retry passes before a slide update is rejected.
const MAX_CLAMP_RETRIES: usize = 4;

/// What holds one end of a sliding segment in place.
///
/// With a neighbor, the endpoint rides along the neighbor's carrier line
/// and is clamped at the neighbor's far vertex. A free endpoint instead
/// rides the perpendicular through its original position, preserving the
/// segment's length and angle on that side.
#[derive(Clone, Copy, Debug)]
struct SlideConstraint {
    neighbor: Option<SegmentId>,
    fixed: Point,
    dir: Vector,
}

/// Solves endpoint positions for a segment dragged parallel to itself.
///
/// The solver is built once at drag start and fed cursor positions; each
/// update yields new endpoint candidates or an error, in which case the
/// previous candidates remain current (the caller keeps showing them).
#[derive(Debug)]
pub struct SlideSolver {
    seg: SegmentId,
    v1: VertexId,
    v2: VertexId,
    p1: Point,
    p2: Point,
    secant: Vector,
    sign_x: i32,
    sign_y: i32,
    side1: SlideConstraint,
    side2: SlideConstraint,
}

impl SlideSolver {
    /// Prepares a slide of `seg`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] when an endpoint has
    /// more than one other segment attached (the slide would tear the
    /// junction), and [`GeometryError::Degenerate`] for a zero-length
    /// segment.
    pub fn new(graph: &TraceGraph, seg: SegmentId) -> Result<Self> {
        if graph.is_zero_length(seg)? {
            return Err(GeometryError::Degenerate(
                "cannot slide a zero-length segment".to_owned(),
            )
            .into());
        }
        let data = graph.segment(seg)?;
        let (v1, v2) = (data.v1, data.v2);
        let p1 = graph.position(v1)?;
        let p2 = graph.position(v2)?;
        let secant = p2 - p1;

        let side1 = Self::constraint(graph, seg, v1, p1, secant)?;
        let side2 = Self::constraint(graph, seg, v2, p2, secant)?;

        Ok(Self {
            seg,
            v1,
            v2,
            p1,
            p2,
            secant,
            sign_x: sign(secant.x),
            sign_y: sign(secant.y),
            side1,
            side2,
        })
    }

    fn constraint(
        graph: &TraceGraph,
        seg: SegmentId,
        v: VertexId,
        pos: Point,
        secant: Vector,
    ) -> Result<SlideConstraint> {
        let others = graph.other_segments_at(v, seg);
        match others.as_slice() {
            [] => Ok(SlideConstraint {
                neighbor: None,
                fixed: pos,
                dir: perp(secant),
            }),
            [n] => {
                let far = graph.other_vertex(*n, v)?;
                let fixed = graph.position(far)?;
                Ok(SlideConstraint {
                    neighbor: Some(*n),
                    fixed,
                    dir: pos - fixed,
                })
            }
            _ => Err(TopologyError::InvalidTopology(
                "segment endpoint is a junction of three or more segments".to_owned(),
            )
            .into()),
        }
    }

    /// The segment being slid.
    #[must_use]
    pub fn segment(&self) -> SegmentId {
        self.seg
    }

    /// The segment's vertices, in endpoint order.
    #[must_use]
    pub fn vertices(&self) -> (VertexId, VertexId) {
        (self.v1, self.v2)
    }

    /// Current endpoint candidates.
    #[must_use]
    pub fn endpoints(&self) -> (Point, Point) {
        (self.p1, self.p2)
    }

    /// Neighbor segments pinned to each endpoint, if any.
    #[must_use]
    pub fn neighbors(&self) -> (Option<SegmentId>, Option<SegmentId>) {
        (self.side1.neighbor, self.side2.neighbor)
    }

    /// Recomputes endpoint candidates for the segment carried through
    /// `pos`.
    ///
    /// Each pass intersects the carrier line (through `pos`, parallel to
    /// the original segment) with both constraint lines. An endpoint that
    /// would overshoot its neighbor's far vertex clamps the carrier to
    /// that vertex and retries; a result that reverses the segment's
    /// direction clamps to the constraint-line intersection and retries.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] when the carrier is parallel
    /// to a constraint line or the retry budget is exhausted. The stored
    /// candidates are unchanged on error.
    pub fn update(&mut self, pos: Point) -> Result<(Point, Point)> {
        let mut pos = pos;
        for _ in 0..MAX_CLAMP_RETRIES {
            let t1 = line_intersect_param(self.side1.fixed, self.side1.dir, pos, self.secant)?;
            let new1 = param_point(self.side1.fixed, self.side1.dir, t1);
            if t1 < 0.0 && self.side1.neighbor.is_some() {
                pos = self.side1.fixed;
                continue;
            }

            let t2 = line_intersect_param(self.side2.fixed, self.side2.dir, pos, self.secant)?;
            let new2 = param_point(self.side2.fixed, self.side2.dir, t2);
            if t2 < 0.0 && self.side2.neighbor.is_some() {
                pos = self.side2.fixed;
                continue;
            }

            // A slide may shorten the segment but never reverse it.
            let s = new2 - new1;
            if (sign(s.x) != 0 && sign(s.x) != self.sign_x)
                || (sign(s.y) != 0 && sign(s.y) != self.sign_y)
            {
                pos = line_intersect_point(
                    self.side1.fixed,
                    self.side1.dir,
                    self.side2.fixed,
                    self.side2.dir,
                )?;
                continue;
            }

            self.p1 = new1;
            self.p2 = new2;
            return Ok((new1, new2));
        }
        Err(GeometryError::Degenerate("slide position cannot be satisfied".to_owned()).into())
    }
}
