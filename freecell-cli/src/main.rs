mod display;

use std::io::stdin;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use freecell_common::board::Board;
use freecell_solver::{
    DEFAULT_FRONTIER_CAP, DEFAULT_MAX_STATES, SolveReport, Solver, SolverConfig, Termination,
};

const SAMPLE_GAME: &str = "\
Deal files look something like this:

: 6C 9S 2H AC JD AS 9C 7H
: 2D AD QC KD JC JS 3D 2C
: KC TD 7D 9D QD TS 6D 6H
: 8S TH 3H KS 2S QS 8C KH
: AH JH 7C 8H 5H 8D 5D 3S
: 4S TC 4D QH 4C 3C 5C 6S
: 9H 4H 5S 7S

The colons are optional, but the game data isn't. You may use numbers in
place of 'A', 'T', 'J', 'Q', and 'K'.";

/// Heuristic FreeCell solver: reads a deal and prints a winning move list.
#[derive(Parser)]
#[command(author, version, about, after_help = SAMPLE_GAME)]
struct Cli {
    /// Deal file describing the initial layout
    file: PathBuf,
    /// Step through the solution one board at a time
    #[arg(long)]
    interactive: bool,
    /// Print each board alongside its move
    #[arg(long, alias = "print_boards")]
    print_boards: bool,
    /// Max boards to visit before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_STATES, value_name = "NUM")]
    max_states: usize,
    /// Max open boards held at once; the worst are pruned beyond this
    #[arg(long, default_value_t = DEFAULT_FRONTIER_CAP, value_name = "NUM")]
    frontier_cap: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("Parsing board from \"{}\"...", cli.file.display());
    let content = match std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to open input file '{}'", cli.file.display()))
    {
        Ok(content) => content,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(2);
        }
    };

    let deal = match Board::parse(&content) {
        Ok(deal) => deal,
        Err(err) => {
            eprintln!("Failed to parse deal: {err:#}");
            return ExitCode::from(2);
        }
    };
    println!("Evaluates as the following board:");
    println!("{}", display::render_board(&deal));

    let config = SolverConfig {
        max_states: cli.max_states,
        frontier_cap: cli.frontier_cap,
        progress: true,
        ..SolverConfig::default()
    };
    let report = Solver::new(config).solve(deal);

    match report.termination {
        Termination::Solved => println!("Solution found."),
        Termination::Exhausted => println!("Search space exhausted."),
        Termination::StateBudget => {
            println!("Gave up after visiting {} boards.", report.states)
        }
        Termination::Interrupted => println!("Search interrupted."),
    }

    let Some(moves) = &report.solution else {
        eprintln!("Solution could not be found.");
        return ExitCode::from(1);
    };
    print_summary(&report, moves.len());

    for step in moves {
        if cli.interactive || cli.print_boards {
            println!("\n{}", display::render_board(&step.board));
        }
        println!("{}", step.action);
        if cli.interactive {
            let mut line = String::new();
            let _ = stdin().read_line(&mut line);
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(report: &SolveReport, move_count: usize) {
    println!(
        "✓ Solved in {move_count} Moves — Time: {}, States: {}\n",
        format_elapsed(report.elapsed),
        report.states
    );
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.subsec_millis())
    } else if secs < 120 {
        let tenths = elapsed.subsec_millis() / 100;
        format!("{secs}.{tenths}s")
    } else {
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}
