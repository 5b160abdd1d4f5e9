//! Interactive PCB trace and outline editing engine.
//!
//! `tracekit` is the geometry and topology core of a board editor: a
//! vertex/segment trace graph with arena storage, a dogleg route
//! synthesizer, a constrained segment-move solver, a post-edit topology
//! simplifier, an undo-integrated commit protocol, and the four editing
//! session state machines that drive them from pointer input.
//!
//! The crate renders nothing and owns no event loop. A host feeds
//! pointer and key events into a [`session::Session`], hands it the
//! current [`view::ViewTransform`] and grid snap, and draws the
//! [`session::Overlay`] the session exposes. The document only ever
//! changes inside a [`command::Transaction`] commit, so an undo step
//! always reverts exactly one user-visible edit.

pub mod command;
pub mod document;
pub mod edit;
pub mod error;
pub mod graph;
pub mod math;
pub mod session;
pub mod view;

pub use error::{Result, TracekitError};
