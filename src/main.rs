//! Chill Rider entry point
//!
//! Plays a few headless runs with the autopilot and prints the leaderboard.
//!
//! Usage: `chill-rider [settings.json] [runs]`

use chill_rider::sim::autopilot;
use chill_rider::sim::{Command, GameState, RunPhase, apply_command, create_game};
use chill_rider::{Leaderboard, RunSummary, Settings};

const DEFAULT_RUNS: u32 = 3;
/// The run clock advances one second per this many moves
const MOVES_PER_SECOND: u32 = 4;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path).unwrap_or_else(|err| {
            log::warn!("{err}; using default settings");
            Settings::default()
        }),
        None => Settings::default(),
    };
    let runs = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_RUNS);

    log::info!("Chill Rider (headless) starting, {} runs", runs);

    let mut board = Leaderboard::new();
    for run in 0..runs {
        let mut options = settings.game_options();
        // A fixed seed still gives each run its own city
        options.seed = options.seed.map(|seed| seed.wrapping_add(u64::from(run)));

        let state = play(create_game(options));
        let summary = RunSummary::from(&state);
        log::info!(
            "Run {}: seed {} level {} deliveries {} coins {} distance {}",
            run + 1,
            summary.seed,
            summary.level,
            summary.deliveries,
            summary.coins,
            summary.distance
        );
        if let Some(rank) = board.add(summary) {
            log::debug!("Run {} placed #{}", run + 1, rank);
        }
    }

    print_leaderboard(&board);
}

/// Ride until the clock runs out or the move budget is spent
fn play(mut state: GameState) -> GameState {
    let budget = state.options.run_seconds.saturating_mul(MOVES_PER_SECOND);
    let mut moves = 0;

    while state.phase == RunPhase::Riding && moves < budget {
        if let Some(offer) = &state.upgrade_offer {
            let command = match offer.choices.first() {
                Some(choice) => {
                    log::info!(
                        "Taking {} level {}: {}",
                        choice.key.label(),
                        choice.next_level,
                        choice.key.effect()
                    );
                    Command::ChooseUpgrade { key: choice.key }
                }
                None => Command::SkipUpgrade,
            };
            state = apply_command(state, command);
        }

        state = match autopilot::next_move(&state) {
            Some(direction) => apply_command(state, Command::Move { direction }),
            None => {
                log::warn!("Autopilot stuck at level {}, regenerating", state.level);
                apply_command(state, Command::RegenerateMap)
            }
        };
        moves += 1;
        if let Some(popup) = state.current_tile().malus_popup() {
            log::debug!("{popup}");
        }

        if moves % MOVES_PER_SECOND == 0 {
            state = apply_command(state, Command::Tick { seconds: 1 });
        }
    }
    state
}

fn print_leaderboard(board: &Leaderboard) {
    println!("\n=== Leaderboard ===");
    if board.is_empty() {
        println!("(no deliveries yet)");
        return;
    }
    println!(
        "{:>4}  {:>10}  {:>5}  {:>10}  {:>5}  {:>8}",
        "#", "seed", "level", "deliveries", "coins", "distance"
    );
    for (i, run) in board.entries.iter().enumerate() {
        println!(
            "{:>4}  {:>10}  {:>5}  {:>10}  {:>5}  {:>8}",
            i + 1,
            run.seed,
            run.level,
            run.deliveries,
            run.coins,
            run.distance
        );
    }
}
