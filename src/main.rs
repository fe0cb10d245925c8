//! Kanoodle Solver CLI
//!
//! Solves polyomino tiling puzzles from the command line: either a built-in
//! demo piece set, or a piece set and optional partial board loaded from
//! JSON files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use kanoodle_solver::cache::NoopCache;
use kanoodle_solver::grid::{format_board, Board};
use kanoodle_solver::pieces::{demo_tetrominoes, demo_trominoes, Piece};
use kanoodle_solver::session::SessionRegistry;
use kanoodle_solver::solver::{self, SessionOutcome};

#[derive(Parser)]
#[command(name = "kanoodle-solver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a built-in demo piece set.
    Demo {
        /// Which demo piece set to use.
        #[arg(value_enum, default_value = "trominoes")]
        set: DemoSet,
        /// Stop after this many solutions.
        #[arg(long)]
        max_samples: Option<usize>,
    },
    /// Solve pieces and an optional partial board loaded from JSON files.
    Solve {
        /// Board width.
        #[arg(long)]
        width: usize,
        /// Board height.
        #[arg(long)]
        height: usize,
        /// Path to a JSON array of pieces: [{id, name, shape, color}].
        #[arg(long)]
        pieces: PathBuf,
        /// Path to a JSON 2D array pinning some pieces onto the board.
        #[arg(long)]
        board: Option<PathBuf>,
        /// Stop after this many solutions.
        #[arg(long)]
        max_samples: Option<usize>,
        /// Stop after this many milliseconds.
        #[arg(long)]
        max_time_ms: Option<u64>,
    },
    /// Demonstrate the incremental session API: create a session on a demo
    /// piece set and pull solutions one batch at a time.
    SessionDemo {
        #[arg(long, default_value_t = 1)]
        batch_size: usize,
        /// Session key to register and resume under.
        #[arg(long, default_value = "solve:demo")]
        key: String,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum DemoSet {
    Trominoes,
    Tetrominoes,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Demo {
        set: DemoSet::Trominoes,
        max_samples: None,
    }) {
        Command::Demo { set, max_samples } => run_demo(set, max_samples),
        Command::Solve {
            width,
            height,
            pieces,
            board,
            max_samples,
            max_time_ms,
        } => run_solve(width, height, pieces, board, max_samples, max_time_ms),
        Command::SessionDemo { batch_size, key } => run_session_demo(batch_size, key),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn demo_pieces(set: DemoSet) -> (usize, usize, Vec<Piece>) {
    match set {
        DemoSet::Trominoes => (3, 3, demo_trominoes()),
        DemoSet::Tetrominoes => (4, 4, demo_tetrominoes()),
    }
}

fn run_demo(set: DemoSet, max_samples: Option<usize>) -> kanoodle_solver::Result<()> {
    let (width, height, pieces) = demo_pieces(set);
    info!(width, height, num_pieces = pieces.len(), "solving demo board");

    let result = solver::solve_partial(width, height, &pieces, None, max_samples, None)?;
    print_solve_result(&result.solutions, &result.message, result.solution_count);
    Ok(())
}

fn run_solve(
    width: usize,
    height: usize,
    pieces_path: PathBuf,
    board_path: Option<PathBuf>,
    max_samples: Option<usize>,
    max_time_ms: Option<u64>,
) -> kanoodle_solver::Result<()> {
    let pieces_json = std::fs::read_to_string(&pieces_path)
        .map_err(|e| kanoodle_solver::SolverError::InvalidInput(format!("reading {pieces_path:?}: {e}")))?;
    let pieces: Vec<Piece> = serde_json::from_str(&pieces_json)
        .map_err(|e| kanoodle_solver::SolverError::InvalidInput(format!("parsing pieces JSON: {e}")))?;

    let board: Option<Board> = match board_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| kanoodle_solver::SolverError::InvalidInput(format!("reading {path:?}: {e}")))?;
            Some(
                serde_json::from_str(&json)
                    .map_err(|e| kanoodle_solver::SolverError::InvalidInput(format!("parsing board JSON: {e}")))?,
            )
        }
        None => None,
    };

    info!(width, height, num_pieces = pieces.len(), "solving");
    let result = solver::solve_partial(width, height, &pieces, board.as_ref(), max_samples, max_time_ms)?;
    let json = serde_json::to_string_pretty(&result).expect("solve results are always serializable");
    println!("{json}");
    Ok(())
}

fn run_session_demo(batch_size: usize, key: String) -> kanoodle_solver::Result<()> {
    let (width, height, pieces) = demo_pieces(DemoSet::Trominoes);
    let registry = SessionRegistry::new();
    let cache = NoopCache;

    let outcome = solver::create_session(&registry, &key, width, height, pieces, None)?;
    let id = match outcome {
        SessionOutcome::Created { id } => id,
        SessionOutcome::Unsolvable { message } => {
            println!("{message}");
            return Ok(());
        }
    };

    loop {
        let batch = solver::session_next_batch(&registry, &cache, &id, batch_size, None)?;
        for board in &batch.solutions {
            print!("{}", format_board(board));
            println!();
        }
        println!("{}", batch.message);
        if batch.exhausted {
            break;
        }
    }
    Ok(())
}

fn print_solve_result(solutions: &[Board], message: &str, solution_count: usize) {
    for (i, board) in solutions.iter().enumerate() {
        println!("Solution {}:", i + 1);
        print!("{}", format_board(board));
        println!();
    }
    println!("{message} (total enumerated: {solution_count})");
}
