//! gridgym command-line demo.
//!
//! Provides four modes of operation:
//! - `headless`: run N random-agent episodes on a demo level and print statistics
//! - `record`: record a random rollout to an MCAP file
//! - `solve`: build an optimal policy for the maze demo and replay it
//! - `info`: print workspace crate versions and configuration

use clap::{Parser, Subcommand};
use tracing::warn;

use gridgym_agents::prelude::*;
use gridgym_core::prelude::*;
use gridgym_env::prelude::*;
use gridgym_record::prelude::*;
use gridgym_test_utils::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Observation bridge and RL environment wrapper for grid sprite games.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run random-agent episodes on the key/door demo level.
    Headless {
        /// Number of episodes to run.
        #[arg(short = 'n', long, default_value_t = 1)]
        episodes: u32,

        /// Maximum steps per episode.
        #[arg(short, long, default_value_t = 100)]
        max_steps: u32,

        /// Random seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },

    /// Record a random rollout on the key/door demo level.
    Record {
        /// Output MCAP path.
        #[arg(short, long, default_value = "rollout.mcap")]
        out: String,

        /// Number of actions to roll out.
        #[arg(long, default_value_t = 20)]
        steps: u32,

        /// Random seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },

    /// Solve the maze demo level and replay the optimal policy.
    Solve {
        /// Discount factor for the solver.
        #[arg(short, long, default_value_t = 0.99)]
        discount: f64,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_headless(episodes: u32, max_steps: u32, seed: u64) -> Result<(), GridGymError> {
    let config = EnvConfig {
        max_episode_steps: max_steps,
        ..EnvConfig::default()
    };
    let env = GameEnvironment::new(key_door_game(false), ActionSet::default(), config)?;
    let mut task = GameTask::new(env);

    let seeds = RunSeeds::new(seed);
    let mut wins = 0;
    let mut total_steps = 0;
    for ep in 0..episodes {
        let mut agent = RandomAgent::new(
            task.env().actions().len(),
            seeds.agent_seed(u64::from(ep), "random"),
        );
        let ret = run_episode(&mut task, &mut agent)?;
        if task.won() {
            wins += 1;
        }
        total_steps += task.steps();
        println!(
            "episode {}: steps={}, return={:.1}, won={}",
            ep + 1,
            task.steps(),
            ret,
            task.won()
        );
    }

    println!("\ntotal: episodes={episodes}, steps={total_steps}, wins={wins}");
    Ok(())
}

fn run_record(out: &str, steps: u32, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let config = EnvConfig {
        recording_enabled: true,
        ..EnvConfig::default()
    };
    let mut env = GameEnvironment::new(key_door_game(false), ActionSet::default(), config)?;

    let mut agent = RandomAgent::new(env.actions().len(), seed);
    for _ in 0..steps {
        if env.is_done().ended {
            break;
        }
        let action = agent.act(&env.get_state()?).map_err(GridGymError::from)?;
        env.perform_action(action, false)?;
    }

    let mut recorder = RolloutRecorder::open(out)?;
    let written = export_rollout(&env, &mut recorder)?;
    recorder.finish()?;
    println!("wrote {written} transitions to {out}");
    Ok(())
}

fn run_solve(discount: f64) -> Result<(), GridGymError> {
    let mut env = GameEnvironment::new(maze_game(), ActionSet::default(), EnvConfig::default())?;

    let mut converter = ExhaustiveConverter::default();
    let solver = ValueIterationSolver::default();
    let agent = PolicyDrivenAgent::build_optimal(&mut env, &mut converter, &solver, discount, 0)?;
    println!("solved: {} states enumerated", agent.num_states());

    let mut task = GameTask::new(env);
    let mut agent = agent;
    let ret = run_episode(&mut task, &mut agent)?;
    println!(
        "replay: steps={}, return={ret:.1}, won={}",
        task.steps(),
        task.won()
    );
    Ok(())
}

fn run_info() {
    println!("gridgym v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  gridgym-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  gridgym-env        {}", env!("CARGO_PKG_VERSION"));
    println!("  gridgym-agents     {}", env!("CARGO_PKG_VERSION"));
    println!("  gridgym-record     {}", env!("CARGO_PKG_VERSION"));
    println!("  gridgym-test-utils {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2021");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Headless {
            episodes,
            max_steps,
            seed,
        }) => run_headless(episodes, max_steps, seed).map_err(Into::into),
        Some(Commands::Record { out, steps, seed }) => run_record(&out, steps, seed),
        Some(Commands::Solve { discount }) => run_solve(discount).map_err(Into::into),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => run_headless(1, 100, 0).map_err(Into::into),
    };

    if let Err(e) = result {
        warn!("run failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
