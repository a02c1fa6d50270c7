//! Motion services composed into a panel's presentation context.

pub mod animation;
pub mod gesture;

pub use animation::{AnimationCoordinator, MotionPhase};
pub use gesture::{DragOutcome, GestureCoordinator};
