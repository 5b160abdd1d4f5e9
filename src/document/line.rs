use std::collections::HashSet;

use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::graph::{Layer, SegmentStyle};
use crate::math::{distance::point_segment_distance, Point, Vector};

slotmap::new_key_type! {
    /// Unique identifier for an outline line.
    pub struct LineId;
}

/// An outline/silkscreen line of a footprint.
///
/// Unlike trace segments, lines are free-standing: they do not share
/// vertices and are not part of the trace graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    /// Stroke width in board units.
    pub width: i32,
    pub layer: Layer,
    /// Straight or arc rendering of the span.
    pub style: SegmentStyle,
}

impl Line {
    /// Creates a straight line between two points.
    ///
    /// # Panics
    ///
    /// Debug builds panic when `width` is not positive.
    #[must_use]
    pub fn new(start: Point, end: Point, layer: Layer, width: i32) -> Self {
        debug_assert!(width > 0, "width must be positive, got {width}");
        Self {
            start,
            end,
            width,
            layer,
            style: SegmentStyle::Straight,
        }
    }

    /// Returns a copy with the given curve style.
    #[must_use]
    pub fn with_style(self, style: SegmentStyle) -> Self {
        Self { style, ..self }
    }

    /// Returns a copy translated by `delta`.
    #[must_use]
    pub fn translated(self, delta: Vector) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
            ..self
        }
    }

    /// Returns true if `pos` lies within `radius` board units of the line.
    ///
    /// Arcs are hit-tested against their chord.
    #[must_use]
    pub fn hit_test(&self, pos: Point, radius: f64) -> bool {
        point_segment_distance(pos, self.start, self.end) <= radius
    }
}

/// Arena of outline lines with the same detach/attach liveness model as
/// the trace graph, so deleting a line undoes to the identical handle.
#[derive(Debug, Default)]
pub struct LineStore {
    lines: SlotMap<LineId, Line>,
    live: HashSet<LineId>,
}

impl LineStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a line and returns its id.
    pub fn add(&mut self, line: Line) -> LineId {
        let id = self.lines.insert(line);
        self.live.insert(id);
        id
    }

    /// Returns a reference to a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not found in the arena.
    pub fn line(&self, id: LineId) -> Result<&Line, TopologyError> {
        self.lines
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("line".into()))
    }

    /// Replaces a line's geometry and attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not found.
    pub fn set(&mut self, id: LineId, line: Line) -> Result<(), TopologyError> {
        let slot = self
            .lines
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("line".into()))?;
        *slot = line;
        Ok(())
    }

    /// Returns true if the line is currently part of the document.
    #[must_use]
    pub fn is_live(&self, id: LineId) -> bool {
        self.live.contains(&id)
    }

    /// Removes a line from the document without freeing its arena slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not attached.
    pub fn detach(&mut self, id: LineId) -> Result<(), TopologyError> {
        if !self.live.remove(&id) {
            return Err(TopologyError::InvalidTopology("line is not attached".into()));
        }
        Ok(())
    }

    /// Re-attaches a previously detached line under its original id.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not found or already attached.
    pub fn attach(&mut self, id: LineId) -> Result<(), TopologyError> {
        if !self.lines.contains_key(id) {
            return Err(TopologyError::EntityNotFound("line".into()));
        }
        if !self.live.insert(id) {
            return Err(TopologyError::InvalidTopology(
                "line is already attached".into(),
            ));
        }
        Ok(())
    }

    /// Number of live lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if the store holds no live lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterates over the live lines.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, &Line)> {
        self.lines.iter().filter(|(id, _)| self.live.contains(id))
    }

    /// Returns the live line nearest to `pos` within `radius` board
    /// units, if any.
    #[must_use]
    pub fn line_at(&self, pos: Point, radius: f64) -> Option<LineId> {
        self.iter()
            .filter(|(_, l)| l.hit_test(pos, radius))
            .min_by(|(_, a), (_, b)| {
                let da = point_segment_distance(pos, a.start, a.end);
                let db = point_segment_distance(pos, b.start, b.end);
                da.total_cmp(&db)
            })
            .map(|(id, _)| id)
    }
}
