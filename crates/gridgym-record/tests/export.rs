//! End-to-end export of a recorded fixture rollout.

use gridgym_core::config::EnvConfig;
use gridgym_core::types::ActionSet;
use gridgym_env::env::GameEnvironment;
use gridgym_record::prelude::*;
use gridgym_test_utils::prelude::*;

#[test]
fn exports_recorded_transitions_and_a_frame() {
    let config = EnvConfig {
        recording_enabled: true,
        ..EnvConfig::default()
    };
    let mut env = GameEnvironment::new(maze_game(), ActionSet::default(), config).unwrap();

    // Four moves to the goal.
    for &a in &[3_usize, 3, 2, 2] {
        env.perform_action(Some(a), false).unwrap();
    }
    assert_eq!(env.transitions().len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maze.mcap");
    let mut recorder = RolloutRecorder::open(&path).unwrap();
    let written = export_rollout(&env, &mut recorder).unwrap();
    recorder.finish().unwrap();

    assert_eq!(written, 4);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89MCAP0\r\n");
    // Transitions and the fixture's captured frame are both present.
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/transition"));
    assert!(text.contains("/frame"));
}
