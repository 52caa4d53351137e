//! Task, episode-runner, and policy-building tests.

use gridgym_agents::agents::{InputSnapshot, InteractiveAgent, RandomAgent, ScriptedAgent};
use gridgym_agents::policy::PolicyDrivenAgent;
use gridgym_core::config::EnvConfig;
use gridgym_core::error::{GridGymError, SolverError};
use gridgym_core::types::{ActionSet, Direction};
use gridgym_env::env::GameEnvironment;
use gridgym_env::task::{GameTask, run_episode};
use gridgym_test_utils::prelude::*;

fn maze_task(max_steps: u32) -> GameTask<FixtureSim> {
    let config = EnvConfig {
        max_episode_steps: max_steps,
        ..EnvConfig::default()
    };
    GameTask::new(GameEnvironment::new(maze_game(), ActionSet::default(), config).unwrap())
}

const DOWN: usize = 2;
const RIGHT: usize = 3;

// -- GameTask --

#[test]
fn winning_scores_plus_one() {
    let mut task = maze_task(50);
    let mut agent = ScriptedAgent::from_indices(&[RIGHT, RIGHT, DOWN, DOWN]);
    let ret = run_episode(&mut task, &mut agent).unwrap();

    assert!((ret - 1.0).abs() < f32::EPSILON);
    assert!(task.won());
    assert_eq!(task.steps(), 4);
}

#[test]
fn losing_scores_minus_one() {
    let config = EnvConfig {
        max_episode_steps: 10,
        ..EnvConfig::default()
    };
    let env = GameEnvironment::new(key_door_game(false), ActionSet::default(), config).unwrap();
    let mut task = GameTask::new(env);
    // Straight onto the trap.
    let mut agent = ScriptedAgent::from_indices(&[DOWN]);
    let ret = run_episode(&mut task, &mut agent).unwrap();

    assert!((ret + 1.0).abs() < f32::EPSILON);
    assert!(!task.won());
}

#[test]
fn step_cap_finishes_with_zero_return() {
    let mut task = maze_task(5);
    let mut agent = ScriptedAgent::new(vec![None]);
    let ret = run_episode(&mut task, &mut agent).unwrap();

    assert!(ret.abs() < f32::EPSILON);
    assert!(!task.won());
    assert_eq!(task.steps(), 5);
}

#[test]
fn reset_rewinds_the_bookkeeping() {
    let mut task = maze_task(50);
    let mut agent = ScriptedAgent::from_indices(&[RIGHT, RIGHT, DOWN, DOWN]);
    run_episode(&mut task, &mut agent).unwrap();
    assert!(task.is_finished());

    task.reset().unwrap();
    assert!(!task.is_finished());
    assert_eq!(task.steps(), 0);
}

#[test]
fn random_agent_runs_to_completion() {
    let mut task = maze_task(30);
    let mut agent = RandomAgent::new(4, 7);
    let ret = run_episode(&mut task, &mut agent).unwrap();
    assert!(task.is_finished());
    assert!((-1.0..=1.0).contains(&ret));
}

// -- interactive interrupts --

#[test]
fn quit_ends_the_episode_normally() {
    let mut task = maze_task(50);
    let input = QueuedInput::new([
        InputSnapshot {
            direction: Some(Direction::Right),
            quit: false,
        },
        InputSnapshot {
            direction: None,
            quit: true,
        },
    ]);
    let mut agent = InteractiveAgent::new(input, ActionSet::default());

    let ret = run_episode(&mut task, &mut agent).unwrap();
    assert!(ret.abs() < f32::EPSILON);
    assert_eq!(task.steps(), 1);
    assert!(!task.is_finished());
}

// -- build_optimal --

#[test]
fn optimal_policy_wins_the_maze() {
    let mut env =
        GameEnvironment::new(maze_game(), ActionSet::default(), EnvConfig::default()).unwrap();

    let mut converter = ExhaustiveConverter::default();
    let solver = ValueIterationSolver::default();
    let mut agent =
        PolicyDrivenAgent::build_optimal(&mut env, &mut converter, &solver, 0.95, 0).unwrap();
    assert!(agent.num_states() > 1);

    let mut task = GameTask::new(env);
    let ret = run_episode(&mut task, &mut agent).unwrap();
    assert!((ret - 1.0).abs() < f32::EPSILON);
    assert!(task.won());
    // Shortest path is four moves.
    assert_eq!(task.steps(), 4);
}

#[test]
fn solver_failure_propagates() {
    let mut env =
        GameEnvironment::new(maze_game(), ActionSet::default(), EnvConfig::default()).unwrap();
    let mut converter = ExhaustiveConverter::default();

    let err =
        PolicyDrivenAgent::build_optimal(&mut env, &mut converter, &FailingSolver, 0.95, 0)
            .unwrap_err();
    assert!(matches!(
        err,
        GridGymError::Solver(SolverError::NotConverged { .. })
    ));
}

#[test]
fn converter_failure_propagates() {
    let mut env =
        GameEnvironment::new(maze_game(), ActionSet::default(), EnvConfig::default()).unwrap();

    let err = PolicyDrivenAgent::build_optimal(
        &mut env,
        &mut FailingConverter,
        &ValueIterationSolver::default(),
        0.95,
        0,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        GridGymError::Solver(SolverError::Environment { .. })
    ));
}
