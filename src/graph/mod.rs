pub mod segment;
pub mod vertex;

pub use segment::{Layer, SegmentAttrs, SegmentData, SegmentId, SegmentStyle};
pub use vertex::{VertexData, VertexId};

use std::collections::HashSet;

use slotmap::{SecondaryMap, SlotMap};

use crate::error::TopologyError;
use crate::math::{is_parallel, Point, Vector};

/// Arena that owns all vertices and segments of one routing net context.
///
/// Entities reference each other via typed ids (generational indices);
/// adjacency lives in a side table, so there are no ownership cycles.
///
/// Removal *detaches* an entity instead of freeing its arena slot: the
/// undo machinery relies on re-attaching the identical handle when a
/// commit is reverted. A vertex is live iff at least one live segment is
/// incident to it; counts and iteration see live entities only.
#[derive(Debug, Default)]
pub struct TraceGraph {
    vertices: SlotMap<VertexId, VertexData>,
    segments: SlotMap<SegmentId, SegmentData>,
    adjacency: SecondaryMap<VertexId, Vec<SegmentId>>,
    live: HashSet<SegmentId>,
}

impl TraceGraph {
    /// Creates a new, empty trace graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its id.
    pub fn add_vertex(&mut self, pos: Point) -> VertexId {
        let id = self.vertices.insert(VertexData::new(pos));
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn position(&self, v: VertexId) -> Result<Point, TopologyError> {
        self.vertices
            .get(v)
            .map(|data| data.pos)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Moves a vertex to a new position.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn move_vertex(&mut self, v: VertexId, pos: Point) -> Result<(), TopologyError> {
        let data = self
            .vertices
            .get_mut(v)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?;
        data.pos = pos;
        Ok(())
    }

    /// Returns the ids of all live segments incident to a vertex.
    #[must_use]
    pub fn segments_of(&self, v: VertexId) -> &[SegmentId] {
        self.adjacency.get(v).map_or(&[], Vec::as_slice)
    }

    /// Returns the live segments incident to `v`, excluding `excluding`.
    #[must_use]
    pub fn other_segments_at(&self, v: VertexId, excluding: SegmentId) -> Vec<SegmentId> {
        self.segments_of(v)
            .iter()
            .copied()
            .filter(|&s| s != excluding)
            .collect()
    }

    /// Returns the number of live segments incident to a vertex.
    #[must_use]
    pub fn degree(&self, v: VertexId) -> usize {
        self.segments_of(v).len()
    }

    /// Number of live vertices (vertices with at least one live segment).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.iter().filter(|(_, segs)| !segs.is_empty()).count()
    }

    // --- Segment operations ---

    /// Inserts a segment between two distinct vertices and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` if `v1 == v2`, or `EntityNotFound` if
    /// either endpoint does not exist.
    pub fn add_segment(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        attrs: SegmentAttrs,
    ) -> Result<SegmentId, TopologyError> {
        if v1 == v2 {
            return Err(TopologyError::InvalidTopology(
                "segment endpoints must be distinct".into(),
            ));
        }
        if !self.vertices.contains_key(v1) || !self.vertices.contains_key(v2) {
            return Err(TopologyError::EntityNotFound("vertex".into()));
        }
        let id = self.segments.insert(SegmentData { v1, v2, attrs });
        self.adjacency[v1].push(id);
        self.adjacency[v2].push(id);
        self.live.insert(id);
        Ok(id)
    }

    /// Returns a reference to the segment data.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found in the arena.
    pub fn segment(&self, id: SegmentId) -> Result<&SegmentData, TopologyError> {
        self.segments
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("segment".into()))
    }

    /// Returns the drawing attributes of a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found.
    pub fn attrs(&self, id: SegmentId) -> Result<SegmentAttrs, TopologyError> {
        Ok(self.segment(id)?.attrs)
    }

    /// Replaces the drawing attributes of a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found.
    pub fn set_attrs(&mut self, id: SegmentId, attrs: SegmentAttrs) -> Result<(), TopologyError> {
        let data = self
            .segments
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("segment".into()))?;
        data.attrs = attrs;
        Ok(())
    }

    /// Returns true if the segment is currently part of the graph.
    #[must_use]
    pub fn is_live(&self, id: SegmentId) -> bool {
        self.live.contains(&id)
    }

    /// Number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.live.len()
    }

    /// Iterates over the live segments.
    pub fn iter_segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentData)> {
        self.segments.iter().filter(|(id, _)| self.live.contains(id))
    }

    /// Removes a segment from the graph without freeing its arena slot.
    ///
    /// The adjacency entries at both endpoints are dropped; an endpoint
    /// left with no incident segments is no longer live.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found or not attached.
    pub fn detach_segment(&mut self, id: SegmentId) -> Result<(), TopologyError> {
        if !self.live.remove(&id) {
            return Err(TopologyError::InvalidTopology(
                "segment is not attached".into(),
            ));
        }
        let (v1, v2) = {
            let data = self.segment(id)?;
            (data.v1, data.v2)
        };
        if let Some(segs) = self.adjacency.get_mut(v1) {
            segs.retain(|&s| s != id);
        }
        if let Some(segs) = self.adjacency.get_mut(v2) {
            segs.retain(|&s| s != id);
        }
        Ok(())
    }

    /// Re-attaches a previously detached segment under its original id.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found or already attached.
    pub fn attach_segment(&mut self, id: SegmentId) -> Result<(), TopologyError> {
        if self.live.contains(&id) {
            return Err(TopologyError::InvalidTopology(
                "segment is already attached".into(),
            ));
        }
        let (v1, v2) = {
            let data = self.segment(id)?;
            (data.v1, data.v2)
        };
        self.adjacency
            .get_mut(v1)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?
            .push(id);
        self.adjacency
            .get_mut(v2)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?
            .push(id);
        self.live.insert(id);
        Ok(())
    }

    // --- Traversal helpers ---

    /// Returns the endpoint of `seg` opposite to `v`.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found or `v` is not one of
    /// its endpoints.
    pub fn other_vertex(&self, seg: SegmentId, v: VertexId) -> Result<VertexId, TopologyError> {
        let data = self.segment(seg)?;
        if v == data.v1 {
            Ok(data.v2)
        } else if v == data.v2 {
            Ok(data.v1)
        } else {
            Err(TopologyError::InvalidTopology(
                "vertex is not an endpoint of the segment".into(),
            ))
        }
    }

    /// Returns the vertex shared by two segments, if any.
    #[must_use]
    pub fn common_vertex(&self, a: SegmentId, b: SegmentId) -> Option<VertexId> {
        let (sa, sb) = (self.segments.get(a)?, self.segments.get(b)?);
        if sa.v1 == sb.v1 || sa.v1 == sb.v2 {
            Some(sa.v1)
        } else if sa.v2 == sb.v1 || sa.v2 == sb.v2 {
            Some(sa.v2)
        } else {
            None
        }
    }

    /// Re-points one endpoint of a live segment from `from` to `to`,
    /// updating adjacency on both vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not attached, `from` is not one
    /// of its endpoints, `to` does not exist, or the swap would collapse
    /// the segment into a loop (`to` equal to the other endpoint).
    pub fn swap_vertex(
        &mut self,
        seg: SegmentId,
        from: VertexId,
        to: VertexId,
    ) -> Result<(), TopologyError> {
        if !self.is_live(seg) {
            return Err(TopologyError::InvalidTopology(
                "segment is not attached".into(),
            ));
        }
        if !self.vertices.contains_key(to) {
            return Err(TopologyError::EntityNotFound("vertex".into()));
        }
        let other = self.other_vertex(seg, from)?;
        if to == other {
            return Err(TopologyError::InvalidTopology(
                "swap would collapse the segment into a loop".into(),
            ));
        }
        let data = self
            .segments
            .get_mut(seg)
            .ok_or_else(|| TopologyError::EntityNotFound("segment".into()))?;
        if data.v1 == from {
            data.v1 = to;
        } else {
            data.v2 = to;
        }
        if let Some(segs) = self.adjacency.get_mut(from) {
            segs.retain(|&s| s != seg);
        }
        self.adjacency
            .get_mut(to)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?
            .push(seg);
        Ok(())
    }

    // --- Geometry queries ---

    /// Direction vector of a segment (`v2 - v1`).
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or an endpoint is not found.
    pub fn direction(&self, seg: SegmentId) -> Result<Vector, TopologyError> {
        let data = self.segment(seg)?;
        Ok(self.position(data.v2)? - self.position(data.v1)?)
    }

    /// Returns true if the segment's endpoints coincide.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or an endpoint is not found.
    pub fn is_zero_length(&self, seg: SegmentId) -> Result<bool, TopologyError> {
        let data = self.segment(seg)?;
        Ok(self.position(data.v1)? == self.position(data.v2)?)
    }

    /// Returns true if two segments are parallel (zero cross product of
    /// their direction vectors).
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is not found.
    pub fn parallel(&self, a: SegmentId, b: SegmentId) -> Result<bool, TopologyError> {
        Ok(is_parallel(self.direction(a)?, self.direction(b)?))
    }

    /// Returns the live segments with at least one endpoint inside the
    /// axis-aligned rectangle `[min, max]` (inclusive).
    ///
    /// Point/rectangle query for external renderers and selection.
    #[must_use]
    pub fn segments_in_rect(&self, min: Point, max: Point) -> Vec<SegmentId> {
        let inside = |p: Point| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;
        self.iter_segments()
            .filter(|(_, data)| {
                let p1 = self.vertices.get(data.v1).map(|v| v.pos);
                let p2 = self.vertices.get(data.v2).map(|v| v.pos);
                p1.is_some_and(inside) || p2.is_some_and(inside)
            })
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attrs() -> SegmentAttrs {
        SegmentAttrs::new(Layer::TopCopper, 10)
    }

    #[test]
    fn add_and_query_segment() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let s = g.add_segment(a, b, attrs()).unwrap();

        assert_eq!(g.segment_count(), 1);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.segments_of(a), &[s]);
        assert_eq!(g.other_vertex(s, a).unwrap(), b);
        assert_eq!(g.direction(s).unwrap(), Vector::new(100, 0));
    }

    #[test]
    fn loop_segment_rejected() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        assert!(matches!(
            g.add_segment(a, a, attrs()),
            Err(TopologyError::InvalidTopology(_))
        ));
    }

    #[test]
    fn detach_and_attach_keep_the_same_id() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(50, 50));
        let s = g.add_segment(a, b, attrs()).unwrap();

        g.detach_segment(s).unwrap();
        assert!(!g.is_live(s));
        assert_eq!(g.segment_count(), 0);
        // Endpoints with no live segments are no longer counted.
        assert_eq!(g.vertex_count(), 0);

        g.attach_segment(s).unwrap();
        assert!(g.is_live(s));
        assert_eq!(g.segments_of(a), &[s]);
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn double_detach_rejected() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(50, 50));
        let s = g.add_segment(a, b, attrs()).unwrap();
        g.detach_segment(s).unwrap();
        assert!(g.detach_segment(s).is_err());
    }

    #[test]
    fn swap_vertex_updates_adjacency() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let c = g.add_vertex(Point::new(100, 100));
        let s = g.add_segment(a, b, attrs()).unwrap();

        g.swap_vertex(s, b, c).unwrap();
        assert!(g.segments_of(b).is_empty());
        assert_eq!(g.segments_of(c), &[s]);
        assert_eq!(g.other_vertex(s, a).unwrap(), c);
    }

    #[test]
    fn swap_to_other_endpoint_rejected() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let s = g.add_segment(a, b, attrs()).unwrap();
        assert!(g.swap_vertex(s, a, b).is_err());
    }

    #[test]
    fn common_vertex_of_chain() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let c = g.add_vertex(Point::new(200, 0));
        let s1 = g.add_segment(a, b, attrs()).unwrap();
        let s2 = g.add_segment(b, c, attrs()).unwrap();
        assert_eq!(g.common_vertex(s1, s2), Some(b));
    }

    #[test]
    fn parallel_and_zero_length() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let c = g.add_vertex(Point::new(250, 0));
        let d = g.add_vertex(Point::new(100, 0));
        let s1 = g.add_segment(a, b, attrs()).unwrap();
        let s2 = g.add_segment(b, c, attrs()).unwrap();
        let s3 = g.add_segment(b, d, attrs()).unwrap();

        assert!(g.parallel(s1, s2).unwrap());
        assert!(!g.is_zero_length(s1).unwrap());
        assert!(g.is_zero_length(s3).unwrap());
    }

    #[test]
    fn rect_query_finds_endpoints() {
        let mut g = TraceGraph::new();
        let a = g.add_vertex(Point::new(0, 0));
        let b = g.add_vertex(Point::new(100, 0));
        let c = g.add_vertex(Point::new(500, 500));
        let d = g.add_vertex(Point::new(600, 500));
        let s1 = g.add_segment(a, b, attrs()).unwrap();
        let _s2 = g.add_segment(c, d, attrs()).unwrap();

        let hits = g.segments_in_rect(Point::new(-10, -10), Point::new(110, 10));
        assert_eq!(hits, vec![s1]);
    }
}
