use super::{Action, EditContext, Key, Overlay, PointerEvent, Session, Status};
use crate::command::Transaction;
use crate::document::{Document, Line};
use crate::edit::{cleanup_chain, remove_and_join, SlideSolver};
use crate::error::Result;
use crate::graph::{SegmentId, TraceGraph, VertexId};

enum State {
    Selected,
    Moving(SlideSolver),
}

/// Edits one committed trace segment: slide it parallel to itself, or
/// delete it and heal the surrounding trace.
///
/// A press starts the slide only when the move solver accepts the local
/// topology; a junction endpoint leaves the segment selected but
/// immovable. The release commits the move together with the cleanup it
/// triggers, as one undo step. If cleanup removes the segment itself the
/// session ends.
pub struct SegmentSession {
    seg: SegmentId,
    state: State,
}

impl SegmentSession {
    #[must_use]
    pub fn new(seg: SegmentId) -> Self {
        Self {
            seg,
            state: State::Selected,
        }
    }

    /// True while a slide preview is in progress.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self.state, State::Moving(_))
    }

    /// The run of segments a slide of `seg` can affect, in chain order.
    fn affected_chain(graph: &TraceGraph, solver: &SlideSolver) -> Vec<SegmentId> {
        let seg = solver.segment();
        let (v1, v2) = solver.vertices();
        let (n1, n2) = solver.neighbors();
        let mut chain = Vec::with_capacity(5);
        if let Some(n) = n1 {
            if let Some(outer) = Self::sole_far_neighbor(graph, n, v1) {
                chain.push(outer);
            }
            chain.push(n);
        }
        chain.push(seg);
        if let Some(n) = n2 {
            chain.push(n);
            if let Some(outer) = Self::sole_far_neighbor(graph, n, v2) {
                chain.push(outer);
            }
        }
        chain
    }

    fn sole_far_neighbor(graph: &TraceGraph, n: SegmentId, near: VertexId) -> Option<SegmentId> {
        let far = graph.other_vertex(n, near).ok()?;
        match graph.other_segments_at(far, n).as_slice() {
            [outer] => Some(*outer),
            _ => None,
        }
    }

    fn finish_slide(&mut self, ctx: &mut EditContext<'_>, solver: &SlideSolver) -> Result<Status> {
        let chain = Self::affected_chain(&ctx.doc.traces, solver);
        let (v1, v2) = solver.vertices();
        let (p1, p2) = solver.endpoints();

        let mut txn = Transaction::new(ctx.doc, "move segment");
        txn.move_vertex(v1, p1)?;
        txn.move_vertex(v2, p2)?;
        cleanup_chain(&mut txn, &chain)?;
        txn.commit(ctx.undo);

        if ctx.doc.traces.is_live(self.seg) {
            Ok(Status::Active)
        } else {
            Ok(Status::Finished)
        }
    }

    fn delete(&mut self, ctx: &mut EditContext<'_>) -> Result<Status> {
        let mut txn = Transaction::new(ctx.doc, "delete segment");
        remove_and_join(&mut txn, self.seg)?;
        txn.commit(ctx.undo);
        Ok(Status::Finished)
    }
}

impl Session for SegmentSession {
    fn on_pointer_move(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        if let State::Moving(solver) = &mut self.state {
            // No solution this frame keeps the previous valid preview.
            let _ = solver.update(ctx.board_pos(ev));
        }
        Ok(Status::Active)
    }

    fn on_pointer_down(&mut self, ctx: &mut EditContext<'_>, _ev: PointerEvent) -> Result<Status> {
        if matches!(self.state, State::Selected) {
            // A branching endpoint rejects the move; stay selected.
            if let Ok(solver) = SlideSolver::new(&ctx.doc.traces, self.seg) {
                self.state = State::Moving(solver);
            }
        }
        Ok(Status::Active)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditContext<'_>, _ev: PointerEvent) -> Result<Status> {
        match std::mem::replace(&mut self.state, State::Selected) {
            State::Selected => Ok(Status::Active),
            State::Moving(solver) => self.finish_slide(ctx, &solver),
        }
    }

    fn on_key(&mut self, ctx: &mut EditContext<'_>, key: Key) -> Result<Status> {
        match key {
            Key::Escape => {
                if self.is_moving() {
                    // The preview never touched the document.
                    self.state = State::Selected;
                }
                Ok(Status::Finished)
            }
            Key::Delete => {
                if self.is_moving() {
                    return Ok(Status::Active);
                }
                self.delete(ctx)
            }
        }
    }

    fn actions(&self) -> Vec<Action> {
        match self.state {
            State::Selected => vec![Action::Delete],
            State::Moving(_) => Vec::new(),
        }
    }

    fn on_action(&mut self, ctx: &mut EditContext<'_>, action: Action) -> Result<Status> {
        if action == Action::Delete && !self.is_moving() {
            return self.delete(ctx);
        }
        Ok(Status::Active)
    }

    fn overlay(&self, doc: &Document) -> Overlay {
        let mut overlay = Overlay {
            selected_segment: Some(self.seg),
            ..Overlay::default()
        };
        let State::Moving(solver) = &self.state else {
            return overlay;
        };
        let Ok(attrs) = doc.traces.attrs(self.seg) else {
            return overlay;
        };

        let (p1, p2) = solver.endpoints();
        let (v1, v2) = solver.vertices();
        let (n1, n2) = solver.neighbors();

        overlay.hidden_segments.push(self.seg);
        if p1 != p2 {
            overlay.lines.push(Line::new(p1, p2, attrs.layer, attrs.width));
        }
        overlay.handles.push(p1);
        overlay.handles.push(p2);

        for (n, v, p) in [(n1, v1, p1), (n2, v2, p2)] {
            let Some(n) = n else { continue };
            overlay.hidden_segments.push(n);
            let far = doc
                .traces
                .other_vertex(n, v)
                .and_then(|f| doc.traces.position(f));
            if let (Ok(far), Ok(nattrs)) = (far, doc.traces.attrs(n)) {
                if far != p {
                    overlay
                        .lines
                        .push(Line::new(far, p, nattrs.layer, nattrs.width));
                }
            }
        }
        overlay
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{EndpointRef, Transaction};
    use crate::graph::{Layer, SegmentAttrs};
    use crate::math::Point;
    use crate::session::test_util::Fixture;

    fn attrs() -> SegmentAttrs {
        SegmentAttrs::new(Layer::TopCopper, 10)
    }

    fn build_chain(fix: &mut Fixture, pts: &[Point]) -> Vec<SegmentId> {
        let mut txn = Transaction::new(&mut fix.doc, "chain");
        let mut segs = Vec::new();
        let mut prev = None;
        for pair in pts.windows(2) {
            let v1 = prev.map_or(EndpointRef::New(pair[0]), EndpointRef::Existing);
            let made = txn
                .create_segment(v1, EndpointRef::New(pair[1]), attrs())
                .unwrap();
            prev = Some(made.v2);
            segs.push(made.seg);
        }
        txn.commit(&mut fix.undo);
        segs
    }

    #[test]
    fn drag_slides_the_segment_and_commits_one_undo_step() {
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[
                Point::new(0, 0),
                Point::new(100, 0),
                Point::new(100, 100),
                Point::new(200, 100),
            ],
        );
        let mut s = SegmentSession::new(segs[1]);
        let mut ctx = fix.ctx();
        s.on_pointer_down(&mut ctx, PointerEvent::at(100.0, 50.0))
            .unwrap();
        assert!(s.is_moving());
        s.on_pointer_move(&mut ctx, PointerEvent::at(150.0, 50.0))
            .unwrap();
        let status = s
            .on_pointer_up(&mut ctx, PointerEvent::at(150.0, 50.0))
            .unwrap();
        drop(ctx);

        assert_eq!(status, Status::Active);
        let data = *fix.doc.traces.segment(segs[1]).unwrap();
        assert_eq!(fix.doc.traces.position(data.v1).unwrap(), Point::new(150, 0));
        assert_eq!(
            fix.doc.traces.position(data.v2).unwrap(),
            Point::new(150, 100)
        );

        // One undo restores the pre-drag positions.
        assert!(fix.undo.undo(&mut fix.doc).unwrap());
        assert_eq!(fix.doc.traces.position(data.v1).unwrap(), Point::new(100, 0));
        assert_eq!(
            fix.doc.traces.position(data.v2).unwrap(),
            Point::new(100, 100)
        );
    }

    #[test]
    fn junction_rejects_the_move_but_keeps_selection() {
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[Point::new(0, 0), Point::new(100, 0), Point::new(100, 100)],
        );
        // Third segment at the shared vertex makes it a junction.
        let shared = fix.doc.traces.common_vertex(segs[0], segs[1]).unwrap();
        let mut txn = Transaction::new(&mut fix.doc, "stub");
        txn.create_segment(
            EndpointRef::Existing(shared),
            EndpointRef::New(Point::new(200, 0)),
            attrs(),
        )
        .unwrap();
        txn.commit(&mut fix.undo);

        let mut s = SegmentSession::new(segs[0]);
        let mut ctx = fix.ctx();
        let status = s
            .on_pointer_down(&mut ctx, PointerEvent::at(50.0, 0.0))
            .unwrap();
        drop(ctx);
        assert_eq!(status, Status::Active);
        assert!(!s.is_moving());
    }

    #[test]
    fn sliding_onto_a_neighbor_collapses_it() {
        // U shape: sliding the bottom up to y=0 collapses both legs and
        // merges everything into the single span (0,0)-(200,0)... here the
        // outer segments are collinear, so one segment remains.
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[
                Point::new(0, 0),
                Point::new(50, 0),
                Point::new(50, 80),
                Point::new(150, 80),
                Point::new(150, 0),
                Point::new(200, 0),
            ],
        );
        let mut s = SegmentSession::new(segs[2]);
        let mut ctx = fix.ctx();
        s.on_pointer_down(&mut ctx, PointerEvent::at(100.0, 80.0))
            .unwrap();
        s.on_pointer_move(&mut ctx, PointerEvent::at(100.0, 0.0))
            .unwrap();
        let status = s
            .on_pointer_up(&mut ctx, PointerEvent::at(100.0, 0.0))
            .unwrap();
        drop(ctx);

        // The two vertical legs collapsed and the three horizontal runs
        // merged into one segment spanning the full width.
        assert_eq!(status, Status::Finished);
        assert_eq!(fix.doc.traces.segment_count(), 1);
        assert_eq!(fix.doc.traces.vertex_count(), 2);

        // A single undo brings the whole U back.
        assert!(fix.undo.undo(&mut fix.doc).unwrap());
        assert_eq!(fix.doc.traces.segment_count(), 5);
        for seg in &segs {
            assert!(fix.doc.traces.is_live(*seg));
        }
    }

    #[test]
    fn sliding_to_zero_length_removes_the_segment_and_repoints() {
        // V shape: pushing the bottom past the apex pins it there with
        // zero length; the commit removes it and joins the legs.
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[
                Point::new(0, 100),
                Point::new(40, 0),
                Point::new(60, 0),
                Point::new(100, 100),
            ],
        );
        let mut s = SegmentSession::new(segs[1]);
        let mut ctx = fix.ctx();
        s.on_pointer_down(&mut ctx, PointerEvent::at(50.0, 0.0))
            .unwrap();
        s.on_pointer_move(&mut ctx, PointerEvent::at(50.0, -200.0))
            .unwrap();
        let status = s
            .on_pointer_up(&mut ctx, PointerEvent::at(50.0, -200.0))
            .unwrap();
        drop(ctx);

        assert_eq!(status, Status::Finished);
        assert!(!fix.doc.traces.is_live(segs[1]));
        // One segment and one vertex fewer; the legs now meet at the apex.
        assert_eq!(fix.doc.traces.segment_count(), 2);
        assert_eq!(fix.doc.traces.vertex_count(), 3);
        let apex = fix.doc.traces.common_vertex(segs[0], segs[2]).unwrap();
        assert_eq!(
            fix.doc.traces.position(apex).unwrap(),
            Point::new(50, -25)
        );
    }

    #[test]
    fn collinear_chain_move_merges_to_one_span() {
        // A-B-C-D collinear with degree-2 interior vertices: committing a
        // slide that leaves everything collinear merges all three segments.
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[
                Point::new(0, 0),
                Point::new(50, 0),
                Point::new(100, 0),
                Point::new(150, 0),
            ],
        );
        let mut s = SegmentSession::new(segs[1]);
        let mut ctx = fix.ctx();
        s.on_pointer_down(&mut ctx, PointerEvent::at(75.0, 0.0))
            .unwrap();
        // The carrier is collinear with both neighbors: every update is
        // degenerate, so the release commits at the original positions and
        // cleanup still merges the collinear run.
        s.on_pointer_move(&mut ctx, PointerEvent::at(75.0, 30.0))
            .unwrap();
        let status = s
            .on_pointer_up(&mut ctx, PointerEvent::at(75.0, 30.0))
            .unwrap();
        drop(ctx);

        // The merge keeps the last segment of the run, so the tracked
        // segment is gone and the session ends.
        assert_eq!(status, Status::Finished);
        assert_eq!(fix.doc.traces.segment_count(), 1);
        assert!(!fix.doc.traces.is_live(segs[1]));
        let data = *fix.doc.traces.segment(segs[2]).unwrap();
        let a = fix.doc.traces.position(data.v1).unwrap();
        let b = fix.doc.traces.position(data.v2).unwrap();
        assert_eq!((a.x.min(b.x), a.x.max(b.x)), (0, 150));
    }

    #[test]
    fn escape_during_move_leaves_the_document_untouched() {
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[Point::new(0, 0), Point::new(100, 0), Point::new(100, 100)],
        );
        let before = fix.doc.traces.segment_count();
        let mut s = SegmentSession::new(segs[0]);
        let mut ctx = fix.ctx();
        s.on_pointer_down(&mut ctx, PointerEvent::at(50.0, 0.0))
            .unwrap();
        s.on_pointer_move(&mut ctx, PointerEvent::at(50.0, 40.0))
            .unwrap();
        let status = s.on_key(&mut ctx, Key::Escape).unwrap();
        drop(ctx);

        assert_eq!(status, Status::Finished);
        assert_eq!(fix.doc.traces.segment_count(), before);
        // Nothing was committed: the next undo is the chain seed itself.
        assert!(fix.undo.undo(&mut fix.doc).unwrap());
        assert_eq!(fix.doc.traces.segment_count(), 0);
    }

    #[test]
    fn delete_heals_the_trace_and_finishes() {
        let mut fix = Fixture::new();
        let segs = build_chain(
            &mut fix,
            &[Point::new(0, 0), Point::new(50, 0), Point::new(50, 80)],
        );
        let mut s = SegmentSession::new(segs[1]);
        let mut ctx = fix.ctx();
        let status = s.on_key(&mut ctx, Key::Delete).unwrap();
        drop(ctx);
        assert_eq!(status, Status::Finished);
        assert!(!fix.doc.traces.is_live(segs[1]));
        assert_eq!(fix.doc.traces.segment_count(), 1);
    }
}
