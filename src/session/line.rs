use super::{
    Action, EditContext, Key, Overlay, PointerEvent, Session, Status, BODY_HIT_TOLERANCE_PX,
    VERTEX_HIT_TOLERANCE_PX,
};
use crate::command::Transaction;
use crate::document::{Document, Line, LineId};
use crate::error::Result;
use crate::graph::SegmentStyle;
use crate::math::Point;

/// Which end of the line a vertex edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    Start,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Selected,
    VertexSelected(End),
    VertexMove(End),
    PickReference,
    LineMove,
}

/// Edits one committed outline line: drag either endpoint freely, or
/// translate the whole line via a picked reference point.
///
/// All dragging happens on a working copy; the document changes only
/// when a drag is released, as a single undoable edit. Escape during a
/// drag falls back to the last committed shape; Escape at rest ends the
/// session.
#[derive(Debug)]
pub struct LineSession {
    line: LineId,
    state: State,
    /// Shape shown while editing; equals `saved` outside a drag.
    preview: Line,
    /// Last committed shape, restored on Escape mid-drag.
    saved: Line,
    reference: Point,
    cursor: Point,
}

impl LineSession {
    /// Starts editing `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not live in the document.
    pub fn new(doc: &Document, line: LineId) -> Result<Self> {
        let shape = *doc.outline.line(line)?;
        Ok(Self {
            line,
            state: State::Selected,
            preview: shape,
            saved: shape,
            reference: shape.start,
            cursor: shape.start,
        })
    }

    fn endpoint(&self, end: End) -> Point {
        match end {
            End::Start => self.preview.start,
            End::End => self.preview.end,
        }
    }

    fn set_endpoint(&mut self, end: End, pos: Point) {
        match end {
            End::Start => self.preview.start = pos,
            End::End => self.preview.end = pos,
        }
    }

    fn hit_end(&self, ctx: &EditContext<'_>, ev: PointerEvent) -> Option<End> {
        for end in [End::Start, End::End] {
            if ctx
                .view
                .hits_point(ev.screen, self.endpoint(end), VERTEX_HIT_TOLERANCE_PX)
            {
                return Some(end);
            }
        }
        None
    }

    /// Tests the pointer against the line body, away from the endpoint
    /// handles. Uses the raw board position so snapping cannot pull the
    /// pointer off the line.
    fn hit_body(&self, ctx: &EditContext<'_>, ev: PointerEvent) -> bool {
        let pos = ctx.view.to_board(ev.screen);
        let radius = ctx.view.board_tolerance(BODY_HIT_TOLERANCE_PX);
        self.preview.hit_test(pos, radius)
    }

    fn commit_preview(&mut self, ctx: &mut EditContext<'_>, label: &'static str) -> Result<()> {
        let mut txn = Transaction::new(ctx.doc, label);
        txn.edit_line(self.line, self.preview)?;
        txn.commit(ctx.undo);
        self.saved = self.preview;
        Ok(())
    }
}

impl Session for LineSession {
    fn on_pointer_move(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        let pos = ctx.board_pos(ev);
        self.cursor = pos;
        match self.state {
            State::VertexSelected(end) => {
                self.state = State::VertexMove(end);
                self.set_endpoint(end, pos);
            }
            State::VertexMove(end) => self.set_endpoint(end, pos),
            State::LineMove => self.preview = self.saved.translated(pos - self.reference),
            State::Selected | State::PickReference => {}
        }
        Ok(Status::Active)
    }

    fn on_pointer_down(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        if matches!(self.state, State::Selected | State::VertexSelected(_)) {
            if let Some(end) = self.hit_end(&*ctx, ev) {
                self.state = State::VertexSelected(end);
            } else if self.hit_body(&*ctx, ev) {
                // Grabbing the body drags the whole line.
                self.reference = ctx.board_pos(ev);
                self.state = State::LineMove;
            }
        }
        Ok(Status::Active)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        let pos = ctx.board_pos(ev);
        match self.state {
            State::VertexMove(_) => {
                self.commit_preview(ctx, "move line vertex")?;
                self.state = State::Selected;
            }
            State::PickReference => {
                self.reference = pos;
                self.state = State::LineMove;
            }
            State::LineMove => {
                self.preview = self.saved.translated(pos - self.reference);
                self.commit_preview(ctx, "move line")?;
                self.state = State::Selected;
            }
            State::Selected | State::VertexSelected(_) => {}
        }
        Ok(Status::Active)
    }

    fn on_key(&mut self, ctx: &mut EditContext<'_>, key: Key) -> Result<Status> {
        match key {
            Key::Escape => match self.state {
                State::Selected | State::VertexSelected(_) => Ok(Status::Finished),
                State::VertexMove(_) | State::PickReference | State::LineMove => {
                    self.preview = self.saved;
                    self.state = State::Selected;
                    Ok(Status::Active)
                }
            },
            Key::Delete => {
                if self.state != State::Selected {
                    return Ok(Status::Active);
                }
                let mut txn = Transaction::new(ctx.doc, "delete line");
                txn.delete_line(self.line)?;
                txn.commit(ctx.undo);
                Ok(Status::Finished)
            }
        }
    }

    fn actions(&self) -> Vec<Action> {
        match self.state {
            State::Selected => vec![
                Action::MoveLine,
                Action::Delete,
                Action::SetStyle(SegmentStyle::Straight),
                Action::SetStyle(SegmentStyle::ArcCw),
                Action::SetStyle(SegmentStyle::ArcCcw),
            ],
            _ => Vec::new(),
        }
    }

    fn on_action(&mut self, ctx: &mut EditContext<'_>, action: Action) -> Result<Status> {
        match action {
            Action::MoveLine if self.state == State::Selected => {
                self.state = State::PickReference;
                Ok(Status::Active)
            }
            Action::SetStyle(style) if self.state == State::Selected => {
                self.preview = self.preview.with_style(style);
                self.commit_preview(ctx, "set line style")?;
                Ok(Status::Active)
            }
            Action::Delete => self.on_key(ctx, Key::Delete),
            _ => Ok(Status::Active),
        }
    }

    fn overlay(&self, _doc: &Document) -> Overlay {
        let mut overlay = Overlay {
            selected_line: Some(self.line),
            handles: vec![self.preview.start, self.preview.end],
            ..Overlay::default()
        };
        if self.preview == self.saved {
            return overlay;
        }
        overlay.hidden_lines.push(self.line);
        overlay.lines.push(self.preview);
        overlay
    }
}
