//! Interactive editing algorithms: dogleg route synthesis, constrained
//! segment sliding, and post-edit topology cleanup.

pub mod cleanup;
pub mod dogleg;
pub mod slide;

pub use cleanup::{cleanup_chain, remove_and_join};
pub use dogleg::DoglegMode;
pub use slide::SlideSolver;
