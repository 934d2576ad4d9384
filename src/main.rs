//! Filler-Rust command line.
//!
//! ## Usage
//!
//! - `filler-rust` - Play a short demo match
//! - `filler-rust protocol` - Start the text protocol on stdin/stdout
//! - `filler-rust match --p1 ultra --p2 master` - Play one CPU-vs-CPU game
//! - `filler-rust presets` - List board and palette sizes

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use filler_rust::constants::{BOARD_PRESETS, PALETTE_SIZES};
use filler_rust::cpu::{CpuPlayer, Difficulty};
use filler_rust::generate::generate_with_report;
use filler_rust::protocol::ProtocolEngine;
use filler_rust::state::{GameSettings, GameState};

/// Filler-Rust: flood-fill territory game engine
#[derive(Parser)]
#[command(name = "filler-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server on stdin/stdout
    Protocol,
    /// Play a CPU-vs-CPU match and print the result
    Match(MatchArgs),
    /// Run a small demo match
    Demo,
    /// List the named board sizes and palette sizes
    Presets,
}

#[derive(Args)]
struct MatchArgs {
    /// Board width in cells
    #[arg(long, default_value_t = 25)]
    cols: usize,
    /// Board height in cells
    #[arg(long, default_value_t = 20)]
    rows: usize,
    /// Named board size (see `presets`), overrides --cols and --rows
    #[arg(long)]
    preset: Option<String>,
    /// Number of colors
    #[arg(long, default_value_t = 7)]
    palette: usize,
    /// Difficulty of player 1
    #[arg(long, default_value_t = Difficulty::Master)]
    p1: Difficulty,
    /// Difficulty of player 2
    #[arg(long, default_value_t = Difficulty::Standard)]
    p2: Difficulty,
    /// Seed for the board and the CPUs
    #[arg(long)]
    seed: Option<u64>,
    /// Print the board after every move
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Protocol) => ProtocolEngine::new().run(),
        Some(Commands::Match(args)) => run_match(&args),
        Some(Commands::Presets) => {
            list_presets();
            Ok(())
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn list_presets() {
    println!("Boards:");
    for (label, cols, rows) in BOARD_PRESETS {
        println!("  {label:<8} {} cells", cols * rows);
    }
    let palettes: Vec<String> = PALETTE_SIZES.iter().map(|p| p.to_string()).collect();
    println!("Palettes: {}", palettes.join(", "));
}

fn run_match(args: &MatchArgs) -> Result<()> {
    let settings = match &args.preset {
        Some(label) => GameSettings::preset(label, args.palette),
        None => GameSettings::new(args.cols, args.rows, args.palette),
    }
    .context("invalid board settings")?;
    let seed = args.seed.unwrap_or_else(|| fastrand::u64(..));
    let mut rng = fastrand::Rng::with_seed(seed);

    let (mut state, report) = generate_with_report(&settings, &mut rng);
    println!(
        "{}x{} board, {} colors, seed {seed}{}",
        settings.cols,
        settings.rows,
        settings.palette_size,
        if report.degraded { " (degraded start)" } else { "" }
    );
    println!("P1: {}  P2: {}\n", args.p1, args.p2);

    let mut cpu = CpuPlayer::with_seed(rng.u64(..));
    let turns = play_out(&mut state, &mut cpu, [args.p1, args.p2], args.verbose)?;

    println!("{state}");
    print_result(&state, turns);
    Ok(())
}

/// Alternate CPU moves until the board is full or a side is stuck.
fn play_out(state: &mut GameState, cpu: &mut CpuPlayer, tiers: [Difficulty; 2], verbose: bool) -> Result<usize> {
    let mut turns = 0;
    while !state.is_game_over() {
        let player = state.current_player;
        let tier = tiers[player.index() - 1];
        let Some(color) = cpu.pick_move(state, player, tier) else {
            println!("Player {player} has no legal color; stopping.");
            break;
        };
        *state = state
            .try_apply_move(player, color)
            .with_context(|| format!("player {player} ({tier}) chose color {color}"))?;
        turns += 1;
        if verbose {
            println!("Turn {turns}: player {player} plays {color}");
            println!("{state}");
        }
    }
    Ok(turns)
}

fn print_result(state: &GameState, turns: usize) {
    let result = state.winner();
    match result.winner {
        Some(p) => println!("Player {p} wins {}-{} after {turns} turns", result.score1, result.score2),
        None => println!("Draw {}-{} after {turns} turns", result.score1, result.score2),
    }
}

fn run_demo() -> Result<()> {
    println!("Filler-Rust: flood-fill territory game\n");

    let settings = GameSettings::new(16, 10, 6)?;
    let mut rng = fastrand::Rng::with_seed(2024);
    let (mut state, _) = generate_with_report(&settings, &mut rng);
    println!("=== Starting board ===");
    println!("{state}");

    println!("=== Champion (P1) vs Standard (P2) ===");
    let mut cpu = CpuPlayer::with_seed(2024);
    let turns = play_out(&mut state, &mut cpu, [Difficulty::Champion, Difficulty::Standard], false)?;
    println!("{state}");
    print_result(&state, turns);
    Ok(())
}
