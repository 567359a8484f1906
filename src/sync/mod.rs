//! Multi-mode synchronization.
//!
//! Keeps one markup document consistent across the visual surface, the raw
//! markup buffer, and the markdown buffer. Exactly one of them is live at a
//! time; switching modes commits the outgoing buffer before the incoming one
//! is derived.

mod mode;
mod synchronizer;

pub use mode::{Mode, ModeState};
pub use synchronizer::ModeSynchronizer;
