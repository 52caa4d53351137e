//! Serializable frame types written as MCAP message payloads.
//!
//! Each frame type corresponds to one MCAP topic:
//! - `TransitionFrame` → `/transition`
//! - `ImageFrame`      → `/frame`

use serde::{Deserialize, Serialize};

use gridgym_core::types::GameState;

// ---------------------------------------------------------------------------
// TransitionFrame
// ---------------------------------------------------------------------------

/// One recorded environment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionFrame {
    /// Step number within the rollout, starting at 0.
    pub step: u32,
    /// State before the action.
    pub before: GameState,
    /// Action index applied.
    pub action: usize,
    /// State after the action.
    pub after: GameState,
}

// ---------------------------------------------------------------------------
// ImageFrame
// ---------------------------------------------------------------------------

/// A raw RGBA frame captured from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    /// Step number the frame belongs to.
    pub step: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Tightly packed RGBA bytes, row-major.
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::{AvatarState, GridPos};

    #[test]
    fn transition_frame_roundtrip() {
        let frame = TransitionFrame {
            step: 3,
            before: GameState::at(GridPos::new(1, 1)),
            action: 2,
            after: GameState::Alive(AvatarState::at(GridPos::new(1, 2)).with_presence(vec![true])),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let frame2: TransitionFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, frame2);
    }

    #[test]
    fn image_frame_roundtrip() {
        let frame = ImageFrame {
            step: 0,
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 0, 255, 0, 255],
        };
        let json = serde_json::to_string(&frame).unwrap();
        let frame2: ImageFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, frame2);
    }
}
