use super::{Action, EditContext, Key, Overlay, PointerEvent, Session, Status};
use crate::command::Transaction;
use crate::document::{Document, Line};
use crate::error::Result;
use crate::graph::{Layer, SegmentStyle};
use crate::math::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    PickStart,
    PickEnd,
}

/// Draws outline lines one at a time: pick a start, then each click
/// commits one line and re-arms at the click point, chaining the next
/// line onto the last endpoint.
///
/// The curve type can be changed mid-session and applies to the next
/// line drawn, never to lines already committed.
#[derive(Debug)]
pub struct NewLineSession {
    state: State,
    layer: Layer,
    width: i32,
    style: SegmentStyle,
    start: Point,
    cursor: Point,
}

impl NewLineSession {
    #[must_use]
    pub fn new(layer: Layer, width: i32) -> Self {
        Self {
            state: State::PickStart,
            layer,
            width,
            style: SegmentStyle::Straight,
            start: Point::new(0, 0),
            cursor: Point::new(0, 0),
        }
    }

    /// Curve type for the next line.
    #[must_use]
    pub fn style(&self) -> SegmentStyle {
        self.style
    }

    fn rubber_line(&self, end: Point) -> Line {
        Line::new(self.start, end, self.layer, self.width).with_style(self.style)
    }
}

impl Session for NewLineSession {
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
            State::PickEnd => {
                if pos != self.start {
                    let mut txn = Transaction::new(ctx.doc, "draw line");
                    txn.create_line(self.rubber_line(pos))?;
                    txn.commit(ctx.undo);
                    self.start = pos;
                }
            }
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
        vec![
            Action::SetStyle(SegmentStyle::Straight),
            Action::SetStyle(SegmentStyle::ArcCw),
            Action::SetStyle(SegmentStyle::ArcCcw),
        ]
    }

    fn on_action(&mut self, _ctx: &mut EditContext<'_>, action: Action) -> Result<Status> {
        if let Action::SetStyle(style) = action {
            self.style = style;
        }
        Ok(Status::Active)
    }

    fn overlay(&self, _doc: &Document) -> Overlay {
        let mut overlay = Overlay {
            crosshair: Some(self.cursor),
            ..Overlay::default()
        };
        if self.state == State::PickEnd && self.cursor != self.start {
            overlay.lines.push(self.rubber_line(self.cursor));
        }
        overlay
    }
}
