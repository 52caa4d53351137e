//! MCAP rollout recording for gridgym environments.
//!
//! Recorded `(before, action, after)` transitions and captured frames go
//! to JSON-encoded MCAP channels, one topic per frame type. See
//! [`RolloutRecorder`](recorder::RolloutRecorder) and
//! [`export_rollout`](recorder::export_rollout).

pub mod recorder;
pub mod types;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::recorder::{RolloutRecorder, export_rollout};
    pub use crate::types::{ImageFrame, TransitionFrame};
}
