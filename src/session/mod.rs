//! Interactive editing sessions.
//!
//! A session is a short-lived state machine that turns pointer and key
//! events into graph edits. Live previews never touch the document;
//! every mutation goes through a [`Transaction`](crate::command::Transaction)
//! at commit time, so the document only ever shows committed states.

pub mod line;
pub mod new_line;
pub mod new_trace;
pub mod segment;

pub use line::LineSession;
pub use new_line::NewLineSession;
pub use new_trace::NewTraceSession;
pub use segment::SegmentSession;

use crate::command::UndoStack;
use crate::document::{Document, Line, LineId};
use crate::error::Result;
use crate::graph::{SegmentId, SegmentStyle};
use crate::math::{Point, ScreenPoint};
use crate::view::ViewTransform;

/// On-screen half-width of an endpoint grab handle, in pixels.
pub const VERTEX_HIT_TOLERANCE_PX: f64 = 20.0;

/// On-screen distance within which a click selects a line body, in pixels.
pub const BODY_HIT_TOLERANCE_PX: f64 = 10.0;

/// A pointer event in device coordinates.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    pub screen: ScreenPoint,
}

impl PointerEvent {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            screen: ScreenPoint::new(x, y),
        }
    }
}

/// Keys a session reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
}

/// Commands a session offers beyond raw pointer input. The host queries
/// [`Session::actions`] to populate menus or shortcut bindings and feeds
/// the chosen action back through [`Session::on_action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Flip the dogleg orientation of the leg pair being routed.
    ToggleCorner,
    /// Curve type applied to the next outline segment drawn.
    SetStyle(SegmentStyle),
    /// Begin a whole-line translate by picking a reference point.
    MoveLine,
    /// Delete the selected object.
    Delete,
}

/// Whether the session survives the event just handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    Finished,
}

/// Everything a session may touch while handling one event.
///
/// Mutation of the document is only possible through a transaction built
/// on `doc`; holding the exclusive borrow here also rules out a commit
/// starting inside another commit.
pub struct EditContext<'a> {
    pub doc: &'a mut Document,
    pub undo: &'a mut UndoStack,
    pub view: &'a ViewTransform,
    pub snap: &'a dyn Fn(Point) -> Point,
}

impl EditContext<'_> {
    /// Maps a pointer event to a snapped board position.
    #[must_use]
    pub fn board_pos(&self, ev: PointerEvent) -> Point {
        (self.snap)(self.view.to_board(ev.screen))
    }
}

/// Preview state a renderer needs to draw one session frame.
///
/// `lines` carries rubber-band geometry that exists only in the session;
/// `hidden_*` name committed entities the renderer should suppress while
/// the session shows a replacement preview for them.
#[derive(Debug, Default)]
pub struct Overlay {
    pub crosshair: Option<Point>,
    pub lines: Vec<Line>,
    pub handles: Vec<Point>,
    pub hidden_segments: Vec<SegmentId>,
    pub hidden_lines: Vec<LineId>,
    pub selected_segment: Option<SegmentId>,
    pub selected_line: Option<LineId>,
}

/// One interactive editing state machine.
///
/// Events are processed one at a time and to completion; a handler either
/// leaves the document untouched or commits exactly one undoable command.
pub trait Session {
    /// Handles pointer motion.
    ///
    /// # Errors
    ///
    /// Returns an error if the session's subject vanished from the
    /// document.
    fn on_pointer_move(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status>;

    /// Handles a pointer press.
    ///
    /// # Errors
    ///
    /// Returns an error if the session's subject vanished from the
    /// document.
    fn on_pointer_down(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status>;

    /// Handles a pointer release.
    ///
    /// # Errors
    ///
    /// Returns an error if a commit could not be recorded.
    fn on_pointer_up(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) -> Result<Status>;

    /// Handles a key press.
    ///
    /// # Errors
    ///
    /// Returns an error if a commit could not be recorded.
    fn on_key(&mut self, ctx: &mut EditContext<'_>, key: Key) -> Result<Status>;

    /// Actions available in the current state.
    fn actions(&self) -> Vec<Action>;

    /// Applies one of the offered actions.
    ///
    /// # Errors
    ///
    /// Returns an error if a commit could not be recorded.
    fn on_action(&mut self, ctx: &mut EditContext<'_>, action: Action) -> Result<Status>;

    /// Preview state for the renderer.
    fn overlay(&self, doc: &Document) -> Overlay;
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::{EditContext, UndoStack, ViewTransform};
    use crate::document::Document;
    use crate::math::Point;

    pub fn identity_snap(p: Point) -> Point {
        p
    }

    pub struct Fixture {
        pub doc: Document,
        pub undo: UndoStack,
        pub view: ViewTransform,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                doc: Document::new(),
                undo: UndoStack::new(),
                view: ViewTransform::default(),
            }
        }

        pub fn ctx(&mut self) -> EditContext<'_> {
            EditContext {
                doc: &mut self.doc,
                undo: &mut self.undo,
                view: &self.view,
                snap: &identity_snap,
            }
        }
    }
}
