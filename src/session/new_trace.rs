use super::{Action, EditContext, Key, Overlay, PointerEvent, Session, Status};
use crate::command::{EndpointRef, Transaction};
use crate::document::{Document, Line};
use crate::edit::DoglegMode;
use crate::error::Result;
use crate::graph::{SegmentAttrs, VertexId};
use crate::math::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    PickStart,
    PickEnd,
}

/// Routes a new trace as a chain of dogleg leg pairs.
///
/// The first click fixes the route start; from then on both legs follow
/// the pointer as rubber-band geometry. Each further click commits the
/// first leg, re-anchors the route at the former corner, and flips the
/// dogleg orientation for the next pair. Escape ends the session; legs
/// already committed stay.
#[derive(Debug)]
pub struct NewTraceSession {
    state: State,
    mode: DoglegMode,
    attrs: SegmentAttrs,
    start: Point,
    cursor: Point,
    /// Committed vertex the next leg chains onto, once one exists.
    anchor: Option<VertexId>,
}

impl NewTraceSession {
    #[must_use]
    pub fn new(attrs: SegmentAttrs) -> Self {
        Self {
            state: State::PickStart,
            mode: DoglegMode::default(),
            attrs,
            start: Point::new(0, 0),
            cursor: Point::new(0, 0),
            anchor: None,
        }
    }

    /// Current dogleg orientation.
    #[must_use]
    pub fn mode(&self) -> DoglegMode {
        self.mode
    }

    fn commit_leg(&mut self, ctx: &mut EditContext<'_>, end: Point) -> Result<()> {
        let mid = self.mode.corner(self.start, end);
        if mid == self.start {
            // The pointer never left the anchor; nothing to commit.
            return Ok(());
        }
        let v1 = self
            .anchor
            .map_or(EndpointRef::New(self.start), EndpointRef::Existing);
        let mut txn = Transaction::new(ctx.doc, "route trace leg");
        let made = txn.create_segment(v1, EndpointRef::New(mid), self.attrs)?;
        txn.commit(ctx.undo);

        self.anchor = Some(made.v2);
        self.start = mid;
        self.mode = self.mode.toggled();
        Ok(())
    }
}

impl Session for NewTraceSession {
    fn on_pointer_move(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        self.cursor = ctx.board_pos(ev);
        Ok(Status::Active)
    }

    fn on_pointer_down(&mut self, _ctx: &mut EditContext<'_>, _ev: PointerEvent) -> Result<Status> {
        Ok(Status::Active)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status> {
        let pos = ctx.board_pos(ev);
        self.cursor = pos;
        match self.state {
            State::PickStart => {
                self.start = pos;
                self.state = State::PickEnd;
            }
            State::PickEnd => self.commit_leg(ctx, pos)?,
        }
        Ok(Status::Active)
    }

    fn on_key(&mut self, _ctx: &mut EditContext<'_>, key: Key) -> Result<Status> {
        match key {
            Key::Escape => Ok(Status::Finished),
            Key::Delete => Ok(Status::Active),
        }
    }

    fn actions(&self) -> Vec<Action> {
        match self.state {
            State::PickStart => Vec::new(),
            State::PickEnd => vec![Action::ToggleCorner],
        }
    }

    fn on_action(&mut self, _ctx: &mut EditContext<'_>, action: Action) -> Result<Status> {
        if action == Action::ToggleCorner {
            self.mode = self.mode.toggled();
        }
        Ok(Status::Active)
    }

    fn overlay(&self, _doc: &Document) -> Overlay {
        let mut overlay = Overlay {
            crosshair: Some(self.cursor),
            ..Overlay::default()
        };
        if self.state == State::PickEnd {
            let mid = self.mode.corner(self.start, self.cursor);
            for (a, b) in [(self.start, mid), (mid, self.cursor)] {
                if a != b {
                    overlay.lines.push(Line::new(
                        a,
                        b,
                        self.attrs.layer,
                        self.attrs.width,
                    ));
                }
            }
        }
        overlay
    }
}
