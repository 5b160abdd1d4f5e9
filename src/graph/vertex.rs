use crate::math::Point;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the trace graph.
    pub struct VertexId;
}

/// Data associated with a trace vertex.
///
/// Vertices are the endpoints of trace segments. Incident segments are
/// tracked by the graph's adjacency table, not by the vertex itself, so
/// the vertex/segment relationship stays non-owning in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexData {
    /// Board-space position of the vertex.
    pub pos: Point,
}

impl VertexData {
    /// Creates a new vertex at the given position.
    #[must_use]
    pub fn new(pos: Point) -> Self {
        Self { pos }
    }
}
