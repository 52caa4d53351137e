//! MCAP-backed rollout recorder.
//!
//! [`RolloutRecorder`] owns an open MCAP file with two JSON-encoded
//! channels, `/transition` and `/frame`. Call
//! [`finish`](RolloutRecorder::finish) for a valid file; dropping the
//! recorder finalizes best-effort.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use mcap::records::MessageHeader;
use mcap::write::Writer as McapWriter;
use tracing::debug;

use gridgym_core::traits::SpriteSimulation;
use gridgym_env::env::GameEnvironment;

use crate::types::{ImageFrame, TransitionFrame};

// ---------------------------------------------------------------------------
// RolloutRecorder
// ---------------------------------------------------------------------------

/// Writes rollout transitions and captured frames to an MCAP file.
pub struct RolloutRecorder {
    writer: Option<McapWriter<BufWriter<File>>>,
    transition_channel: u16,
    frame_channel: u16,
    sequence: u32,
}

impl RolloutRecorder {
    /// Open an MCAP file and register the `/transition` and `/frame`
    /// channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the MCAP header
    /// cannot be written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::create(path.as_ref())?;
        let mut writer = McapWriter::new(BufWriter::new(file))?;

        // Schema data is optional for JSON encoding.
        let schema_id = writer.add_schema("json", "jsonschema", &[])?;
        let transition_channel =
            writer.add_channel(schema_id, "/transition", "application/json", &BTreeMap::new())?;
        let frame_channel =
            writer.add_channel(schema_id, "/frame", "application/json", &BTreeMap::new())?;

        debug!(path = %path.as_ref().display(), "opened rollout recording");
        Ok(Self {
            writer: Some(writer),
            transition_channel,
            frame_channel,
            sequence: 0,
        })
    }

    fn write_json(
        &mut self,
        channel_id: u16,
        timestamp_ns: u64,
        payload: &[u8],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        if let Some(ref mut w) = self.writer {
            w.write_to_known_channel(
                &MessageHeader {
                    channel_id,
                    sequence: seq,
                    log_time: timestamp_ns,
                    publish_time: timestamp_ns,
                },
                payload,
            )?;
        }
        Ok(())
    }

    /// Serialize and write one transition.
    ///
    /// # Errors
    ///
    /// Serialization or MCAP write failures.
    pub fn write_transition(
        &mut self,
        frame: &TransitionFrame,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let payload = serde_json::to_vec(frame)?;
        self.write_json(self.transition_channel, u64::from(frame.step), &payload)
    }

    /// Serialize and write one captured frame.
    ///
    /// # Errors
    ///
    /// Serialization or MCAP write failures.
    pub fn write_frame(&mut self, frame: &ImageFrame) -> Result<(), Box<dyn std::error::Error>> {
        let payload = serde_json::to_vec(frame)?;
        self.write_json(self.frame_channel, u64::from(frame.step), &payload)
    }

    /// Finalize the MCAP file. Must be called before drop for a valid
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if the MCAP footer cannot be written.
    pub fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(mut w) = self.writer.take() {
            w.finish()?;
        }
        Ok(())
    }
}

impl Drop for RolloutRecorder {
    fn drop(&mut self) {
        // Best-effort finish; errors are silently ignored on drop.
        let _ = self.finish();
    }
}

// ---------------------------------------------------------------------------
// export_rollout
// ---------------------------------------------------------------------------

/// Write the environment's recorded transitions, plus one final captured
/// frame when the engine renders. Returns the number of transitions
/// written.
///
/// # Errors
///
/// MCAP or serialization failures from the recorder.
pub fn export_rollout<S: SpriteSimulation>(
    env: &GameEnvironment<S>,
    recorder: &mut RolloutRecorder,
) -> Result<usize, Box<dyn std::error::Error>> {
    let transitions = env.transitions();
    for (i, t) in transitions.iter().enumerate() {
        recorder.write_transition(&TransitionFrame {
            step: i as u32,
            before: t.before.clone(),
            action: t.action,
            after: t.after.clone(),
        })?;
    }
    if let Some(frame) = env.sim().capture_frame() {
        recorder.write_frame(&ImageFrame {
            step: transitions.len() as u32,
            width: frame.width,
            height: frame.height,
            data: frame.data,
        })?;
    }
    debug!(transitions = transitions.len(), "exported rollout");
    Ok(transitions.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::{GameState, GridPos};

    fn transition(step: u32) -> TransitionFrame {
        TransitionFrame {
            step,
            before: GameState::at(GridPos::new(step as i32, 0)),
            action: 3,
            after: GameState::at(GridPos::new(step as i32 + 1, 0)),
        }
    }

    #[test]
    fn writes_a_valid_nonempty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollout.mcap");

        let mut recorder = RolloutRecorder::open(&path).unwrap();
        recorder.write_transition(&transition(0)).unwrap();
        recorder.write_transition(&transition(1)).unwrap();
        recorder
            .write_frame(&ImageFrame {
                step: 2,
                width: 1,
                height: 1,
                data: vec![0, 0, 0, 255],
            })
            .unwrap();
        recorder.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        // MCAP magic bytes.
        assert_eq!(&bytes[..8], b"\x89MCAP0\r\n");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = RolloutRecorder::open(dir.path().join("r.mcap")).unwrap();
        recorder.finish().unwrap();
        recorder.finish().unwrap();
        // Writes after finish are silently dropped, matching drop-time
        // behavior.
        recorder.write_transition(&transition(0)).unwrap();
    }

    #[test]
    fn drop_finalizes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.mcap");
        {
            let mut recorder = RolloutRecorder::open(&path).unwrap();
            recorder.write_transition(&transition(0)).unwrap();
        }
        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
    }
}
