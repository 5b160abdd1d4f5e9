pub mod line;

pub use line::{Line, LineId, LineStore};

use crate::graph::TraceGraph;

/// The shared mutable editing document: copper traces plus footprint
/// outline lines.
///
/// All mutation goes through [`crate::command::Transaction`]; live
/// previews held by editing sessions never touch the document, so a
/// concurrent reader always observes either the pre- or post-commit
/// state. A `Transaction` holds `&mut Document`, which statically rules
/// out a commit re-entering another commit.
#[derive(Debug, Default)]
pub struct Document {
    /// The trace vertex/segment graph.
    pub traces: TraceGraph,
    /// Free-standing outline lines.
    pub outline: LineStore,
}

impl Document {
    /// Creates a new, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
