use tracing::debug;

use crate::document::{Document, Line, LineId};
use crate::error::{Result, TopologyError};
use crate::graph::{SegmentAttrs, SegmentId, VertexId};
use crate::math::Point;

/// Reference to a segment endpoint when building a creation op: either an
/// existing vertex (chaining onto committed geometry) or a fresh position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRef {
    Existing(VertexId),
    New(Point),
}

/// Ids of the entities materialized by a `CreateSegment` op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedSegment {
    pub seg: SegmentId,
    pub v1: VertexId,
    pub v2: VertexId,
}

/// One invertible mutation of the document.
///
/// Every variant carries the plain data needed to exactly undo itself;
/// `created` fields are filled on first application so a redo re-attaches
/// the identical handles.
#[derive(Clone, Debug)]
pub enum EditOp {
    CreateSegment {
        v1: EndpointRef,
        v2: EndpointRef,
        attrs: SegmentAttrs,
        created: Option<CreatedSegment>,
    },
    DetachSegment {
        seg: SegmentId,
    },
    SwapVertex {
        seg: SegmentId,
        from: VertexId,
        to: VertexId,
    },
    MoveVertex {
        vertex: VertexId,
        from: Point,
        to: Point,
    },
    SetSegmentAttrs {
        seg: SegmentId,
        from: SegmentAttrs,
        to: SegmentAttrs,
    },
    CreateLine {
        line: Line,
        created: Option<LineId>,
    },
    DeleteLine {
        line: LineId,
    },
    EditLine {
        line: LineId,
        from: Line,
        to: Line,
    },
}

impl EditOp {
    fn apply(&mut self, doc: &mut Document) -> Result<()> {
        match self {
            Self::CreateSegment {
                v1,
                v2,
                attrs,
                created,
            } => {
                if let Some(made) = created {
                    doc.traces.attach_segment(made.seg)?;
                } else {
                    let v1 = resolve_endpoint(doc, *v1);
                    let v2 = resolve_endpoint(doc, *v2);
                    let seg = doc.traces.add_segment(v1, v2, *attrs)?;
                    *created = Some(CreatedSegment { seg, v1, v2 });
                }
                Ok(())
            }
            Self::DetachSegment { seg } => Ok(doc.traces.detach_segment(*seg)?),
            Self::SwapVertex { seg, from, to } => Ok(doc.traces.swap_vertex(*seg, *from, *to)?),
            Self::MoveVertex { vertex, to, .. } => Ok(doc.traces.move_vertex(*vertex, *to)?),
            Self::SetSegmentAttrs { seg, to, .. } => Ok(doc.traces.set_attrs(*seg, *to)?),
            Self::CreateLine { line, created } => {
                if let Some(id) = created {
                    doc.outline.attach(*id)?;
                } else {
                    *created = Some(doc.outline.add(*line));
                }
                Ok(())
            }
            Self::DeleteLine { line } => Ok(doc.outline.detach(*line)?),
            Self::EditLine { line, to, .. } => Ok(doc.outline.set(*line, *to)?),
        }
    }

    fn unapply(&mut self, doc: &mut Document) -> Result<()> {
        match self {
            Self::CreateSegment { created, .. } => {
                let made = created.ok_or_else(|| {
                    TopologyError::InvalidTopology("undo of an op that never ran".into())
                })?;
                Ok(doc.traces.detach_segment(made.seg)?)
            }
            Self::DetachSegment { seg } => Ok(doc.traces.attach_segment(*seg)?),
            Self::SwapVertex { seg, from, to } => Ok(doc.traces.swap_vertex(*seg, *to, *from)?),
            Self::MoveVertex { vertex, from, .. } => Ok(doc.traces.move_vertex(*vertex, *from)?),
            Self::SetSegmentAttrs { seg, from, .. } => Ok(doc.traces.set_attrs(*seg, *from)?),
            Self::CreateLine { created, .. } => {
                let id = created.ok_or_else(|| {
                    TopologyError::InvalidTopology("undo of an op that never ran".into())
                })?;
                Ok(doc.outline.detach(id)?)
            }
            Self::DeleteLine { line } => Ok(doc.outline.attach(*line)?),
            Self::EditLine { line, from, .. } => Ok(doc.outline.set(*line, *from)?),
        }
    }
}

fn resolve_endpoint(doc: &mut Document, endpoint: EndpointRef) -> VertexId {
    match endpoint {
        EndpointRef::Existing(v) => v,
        EndpointRef::New(pos) => doc.traces.add_vertex(pos),
    }
}

/// An atomic, externally invertible composite command.
///
/// Child ops run front-to-back on `apply` and back-to-front on `unapply`,
/// so a move plus the simplification it triggered undoes as one step.
#[derive(Debug)]
pub struct EditCommand {
    label: &'static str,
    ops: Vec<EditOp>,
}

impl EditCommand {
    /// Human-readable label for undo history display.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Number of child ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if the command holds no ops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Applies all child ops, front to back.
    ///
    /// # Errors
    ///
    /// Returns an error if an op cannot be applied; the document is not
    /// rolled back in that case (this indicates a violated invariant, not
    /// a user-visible condition).
    pub fn apply(&mut self, doc: &mut Document) -> Result<()> {
        for op in &mut self.ops {
            op.apply(doc)?;
        }
        Ok(())
    }

    /// Reverts all child ops, back to front.
    ///
    /// # Errors
    ///
    /// Returns an error if an op cannot be reverted.
    pub fn unapply(&mut self, doc: &mut Document) -> Result<()> {
        for op in self.ops.iter_mut().rev() {
            op.unapply(doc)?;
        }
        Ok(())
    }
}

/// Builds an [`EditCommand`] while applying each op to the document as it
/// is recorded, so later ops (the topology simplifier in particular)
/// observe the effect of earlier ones.
///
/// Call [`Transaction::commit`] to hand the finished, already-applied
/// command to the undo stack; dropping an empty transaction records
/// nothing.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    cmd: EditCommand,
}

impl<'a> Transaction<'a> {
    /// Starts a new transaction against the document.
    pub fn new(doc: &'a mut Document, label: &'static str) -> Self {
        Self {
            doc,
            cmd: EditCommand {
                label,
                ops: Vec::new(),
            },
        }
    }

    /// Read access to the document mid-transaction.
    #[must_use]
    pub fn doc(&self) -> &Document {
        self.doc
    }

    /// Number of ops recorded so far.
    #[must_use]
    pub fn op_count(&self) -> usize {
        self.cmd.ops.len()
    }

    fn record(&mut self, mut op: EditOp) -> Result<()> {
        op.apply(self.doc)?;
        self.cmd.ops.push(op);
        Ok(())
    }

    /// Creates a segment, materializing `New` endpoints as fresh vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints are not distinct live vertices.
    pub fn create_segment(
        &mut self,
        v1: EndpointRef,
        v2: EndpointRef,
        attrs: SegmentAttrs,
    ) -> Result<CreatedSegment> {
        self.record(EditOp::CreateSegment {
            v1,
            v2,
            attrs,
            created: None,
        })?;
        match self.cmd.ops.last() {
            Some(EditOp::CreateSegment {
                created: Some(made),
                ..
            }) => Ok(*made),
            _ => Err(TopologyError::InvalidTopology("segment creation op lost".into()).into()),
        }
    }

    /// Detaches a segment from the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not attached.
    pub fn detach_segment(&mut self, seg: SegmentId) -> Result<()> {
        self.record(EditOp::DetachSegment { seg })
    }

    /// Re-points one endpoint of a segment to another vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the swap is not topologically valid.
    pub fn swap_vertex(&mut self, seg: SegmentId, from: VertexId, to: VertexId) -> Result<()> {
        self.record(EditOp::SwapVertex { seg, from, to })
    }

    /// Moves a vertex, recording its current position for undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn move_vertex(&mut self, vertex: VertexId, to: Point) -> Result<()> {
        let from = self.doc.traces.position(vertex)?;
        if from == to {
            return Ok(());
        }
        self.record(EditOp::MoveVertex { vertex, from, to })
    }

    /// Replaces a segment's drawing attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found.
    pub fn set_segment_attrs(&mut self, seg: SegmentId, to: SegmentAttrs) -> Result<()> {
        let from = self.doc.traces.attrs(seg)?;
        if from == to {
            return Ok(());
        }
        self.record(EditOp::SetSegmentAttrs { seg, from, to })
    }

    /// Adds an outline line to the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the op cannot be recorded.
    pub fn create_line(&mut self, line: Line) -> Result<LineId> {
        self.record(EditOp::CreateLine {
            line,
            created: None,
        })?;
        match self.cmd.ops.last() {
            Some(EditOp::CreateLine {
                created: Some(id), ..
            }) => Ok(*id),
            _ => Err(TopologyError::InvalidTopology("line creation op lost".into()).into()),
        }
    }

    /// Deletes an outline line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not attached.
    pub fn delete_line(&mut self, line: LineId) -> Result<()> {
        self.record(EditOp::DeleteLine { line })
    }

    /// Replaces a line's geometry/attributes, recording the current value
    /// for undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not found.
    pub fn edit_line(&mut self, line: LineId, to: Line) -> Result<()> {
        let from = *self.doc.outline.line(line)?;
        if from == to {
            return Ok(());
        }
        self.record(EditOp::EditLine { line, from, to })
    }

    /// Finishes the transaction, handing the already-applied command to
    /// the undo stack. A transaction that recorded nothing is dropped
    /// without creating an undo entry.
    pub fn commit(self, undo: &mut UndoStack) {
        if self.cmd.is_empty() {
            return;
        }
        debug!(label = self.cmd.label, ops = self.cmd.len(), "commit");
        undo.push(self.cmd);
    }
}

/// Bounded undo/redo history of applied commands.
///
/// Pushing a new command clears the redo side; exceeding the depth limit
/// drops the oldest entry.
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: Vec<EditCommand>,
    redo: Vec<EditCommand>,
    max_depth: usize,
}

impl UndoStack {
    /// Creates an unbounded undo stack.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(0)
    }

    /// Creates an undo stack keeping at most `max_depth` commands
    /// (`0` means unbounded).
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Records an already-applied command.
    pub fn push(&mut self, cmd: EditCommand) {
        self.redo.clear();
        self.undo.push(cmd);
        if self.max_depth > 0 && self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Returns true if there is a command to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns true if there is a command to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Reverts the most recent command. Returns `false` when there is
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be reverted.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut cmd) = self.undo.pop() else {
            return Ok(false);
        };
        cmd.unapply(doc)?;
        debug!(label = cmd.label(), "undo");
        self.redo.push(cmd);
        Ok(true)
    }

    /// Re-applies the most recently undone command. Returns `false` when
    /// there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be re-applied.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut cmd) = self.redo.pop() else {
            return Ok(false);
        };
        cmd.apply(doc)?;
        debug!(label = cmd.label(), "redo");
        self.undo.push(cmd);
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::Layer;

    fn attrs() -> SegmentAttrs {
        SegmentAttrs::new(Layer::TopCopper, 10)
    }

    #[test]
    fn create_segment_undo_redo_is_id_stable() {
        let mut doc = Document::new();
        let mut undo = UndoStack::new();

        let mut txn = Transaction::new(&mut doc, "route trace segment");
        let made = txn
            .create_segment(
                EndpointRef::New(Point::new(0, 0)),
                EndpointRef::New(Point::new(100, 0)),
                attrs(),
            )
            .unwrap();
        txn.commit(&mut undo);

        assert!(doc.traces.is_live(made.seg));
        assert!(undo.undo(&mut doc).unwrap());
        assert!(!doc.traces.is_live(made.seg));
        assert_eq!(doc.traces.vertex_count(), 0);

        assert!(undo.redo(&mut doc).unwrap());
        assert!(doc.traces.is_live(made.seg));
        assert_eq!(doc.traces.position(made.v1).unwrap(), Point::new(0, 0));
        assert_eq!(doc.traces.position(made.v2).unwrap(), Point::new(100, 0));
    }

    #[test]
    fn composite_command_undoes_as_one_step() {
        let mut doc = Document::new();
        let mut undo = UndoStack::new();

        let mut txn = Transaction::new(&mut doc, "setup");
        let made = txn
            .create_segment(
                EndpointRef::New(Point::new(0, 0)),
                EndpointRef::New(Point::new(100, 0)),
                attrs(),
            )
            .unwrap();
        txn.commit(&mut undo);

        // Move both endpoints and change attributes in one command.
        let mut txn = Transaction::new(&mut doc, "edit");
        txn.move_vertex(made.v1, Point::new(10, 10)).unwrap();
        txn.move_vertex(made.v2, Point::new(110, 10)).unwrap();
        txn.set_segment_attrs(made.seg, SegmentAttrs::new(Layer::BottomCopper, 20))
            .unwrap();
        txn.commit(&mut undo);

        assert!(undo.undo(&mut doc).unwrap());
        assert_eq!(doc.traces.position(made.v1).unwrap(), Point::new(0, 0));
        assert_eq!(doc.traces.position(made.v2).unwrap(), Point::new(100, 0));
        assert_eq!(doc.traces.attrs(made.seg).unwrap(), attrs());

        assert!(undo.redo(&mut doc).unwrap());
        assert_eq!(doc.traces.position(made.v1).unwrap(), Point::new(10, 10));
        assert_eq!(
            doc.traces.attrs(made.seg).unwrap(),
            SegmentAttrs::new(Layer::BottomCopper, 20)
        );
    }

    #[test]
    fn push_clears_redo() {
        let mut doc = Document::new();
        let mut undo = UndoStack::new();

        let mut txn = Transaction::new(&mut doc, "first");
        txn.create_line(Line::new(
            Point::new(0, 0),
            Point::new(10, 0),
            Layer::SilkTop,
            5,
        ))
        .unwrap();
        txn.commit(&mut undo);

        assert!(undo.undo(&mut doc).unwrap());
        assert!(undo.can_redo());

        let mut txn = Transaction::new(&mut doc, "second");
        txn.create_line(Line::new(
            Point::new(0, 0),
            Point::new(0, 10),
            Layer::SilkTop,
            5,
        ))
        .unwrap();
        txn.commit(&mut undo);

        assert!(!undo.can_redo());
        assert_eq!(doc.outline.len(), 1);
    }

    #[test]
    fn line_delete_undo_restores_the_same_id() {
        let mut doc = Document::new();
        let mut undo = UndoStack::new();
        let line = Line::new(Point::new(0, 0), Point::new(50, 50), Layer::SilkTop, 5);

        let mut txn = Transaction::new(&mut doc, "draw line");
        let id = txn.create_line(line).unwrap();
        txn.commit(&mut undo);

        let mut txn = Transaction::new(&mut doc, "delete line");
        txn.delete_line(id).unwrap();
        txn.commit(&mut undo);
        assert!(!doc.outline.is_live(id));

        assert!(undo.undo(&mut doc).unwrap());
        assert!(doc.outline.is_live(id));
        assert_eq!(doc.outline.line(id).unwrap(), &line);
    }

    #[test]
    fn empty_transaction_records_nothing() {
        let mut doc = Document::new();
        let mut undo = UndoStack::new();
        let txn = Transaction::new(&mut doc, "noop");
        txn.commit(&mut undo);
        assert!(!undo.can_undo());
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut doc = Document::new();
        let mut undo = UndoStack::with_max_depth(2);
        for _ in 0..3 {
            let mut txn = Transaction::new(&mut doc, "line");
            txn.create_line(Line::new(
                Point::new(0, 0),
                Point::new(1, 1),
                Layer::SilkTop,
                1,
            ))
            .unwrap();
            txn.commit(&mut undo);
        }
        assert!(undo.undo(&mut doc).unwrap());
        assert!(undo.undo(&mut doc).unwrap());
        assert!(!undo.undo(&mut doc).unwrap());
        // The first line survives because its command fell off the stack.
        assert_eq!(doc.outline.len(), 1);
    }
}
