use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use freecell_common::board::Board;
use freecell_common::moves::Move;

use crate::frontier::Frontier;
use crate::graph::{MoveGraph, NodeId};
use crate::heuristic::{self, Weights};
use crate::movegen;

/// Maximum open boards held at once; beyond this the worst are dropped.
pub const DEFAULT_FRONTIER_CAP: usize = 1_200_000;
/// Maximum boards interned in the move graph before giving up.
pub const DEFAULT_MAX_STATES: usize = 50_000_000;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub weights: Weights,
    /// Frontier memory ceiling; pruning keeps the open set at or under it.
    pub frontier_cap: usize,
    /// Visited-state budget; the graph is otherwise uncapped.
    pub max_states: usize,
    /// Whether to generate foundation-to-cascade pulls. They rescue a few
    /// deals at the cost of a wider search.
    pub pull_from_foundation: bool,
    /// Emit status lines to stderr on coarse intervals.
    pub progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            weights: Weights::default(),
            frontier_cap: DEFAULT_FRONTIER_CAP,
            max_states: DEFAULT_MAX_STATES,
            pull_from_foundation: true,
            progress: false,
        }
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Solved,
    /// The frontier emptied with no win: the reachable space is exhausted.
    Exhausted,
    /// The visited-state budget was hit first.
    StateBudget,
    /// The stop flag was raised.
    Interrupted,
}

/// One step of a solution: the move taken and the board it produced.
#[derive(Debug, Clone)]
pub struct SolvedMove {
    pub action: Move,
    pub board: Board,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    /// The winning line, in play order. `Some` with an empty list means
    /// the deal was already won.
    pub solution: Option<Vec<SolvedMove>>,
    pub termination: Termination,
    /// Boards popped and expanded.
    pub searched: usize,
    /// Boards interned in the move graph.
    pub states: usize,
    pub peak_frontier: usize,
    pub elapsed: Duration,
}

/// Solves a deal with the default configuration.
pub fn solve(deal: Board) -> SolveReport {
    Solver::new(SolverConfig::default()).solve(deal)
}

pub struct Solver {
    config: SolverConfig,
    stop: Option<Arc<AtomicBool>>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config, stop: None }
    }

    /// Installs a flag checked between pops; raising it ends the search
    /// with [`Termination::Interrupted`].
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Runs the search to completion. Never fails: a deal with no solution
    /// inside the budget yields a report with `solution: None`.
    pub fn solve(&self, deal: Board) -> SolveReport {
        let timer = Instant::now();
        let mut graph = MoveGraph::with_capacity(self.config.frontier_cap.min(self.config.max_states));
        let mut frontier = Frontier::new();

        let root_score = heuristic::score(&deal, 0, &self.config.weights);
        let root = graph.insert_root(&deal, root_score);
        frontier.push(root_score, deal, root);

        let mut searched = 0usize;
        let mut peak_frontier = 1usize;
        let mut best_completion = 0u32;

        let (termination, winner) = loop {
            if let Some(stop) = &self.stop
                && stop.load(Ordering::Relaxed)
            {
                break (Termination::Interrupted, None);
            }
            if graph.len() >= self.config.max_states {
                break (Termination::StateBudget, None);
            }
            let Some(open) = frontier.pop_best() else {
                break (Termination::Exhausted, None);
            };
            if open.board.is_won() {
                break (Termination::Solved, Some(open.node));
            }

            let children = movegen::expand(
                &open.board,
                open.node,
                &mut graph,
                &self.config.weights,
                self.config.pull_from_foundation,
            );
            for child in children {
                frontier.push(graph.node(child.node).score, child.board, child.node);
            }
            peak_frontier = peak_frontier.max(frontier.len());

            searched += 1;
            let completion = open.board.completion();
            if self.config.progress && (searched & 0x1FF == 0 || completion > best_completion) {
                eprint!(
                    "\rSearched {searched} boards [{}:{}]; {} moves deep; maybe {completion}% complete...",
                    frontier.len(),
                    graph.len(),
                    graph.node(open.node).depth,
                );
            }
            best_completion = best_completion.max(completion);

            while frontier.len() > self.config.frontier_cap {
                frontier.drop_worst();
            }
        };
        if self.config.progress {
            eprintln!();
        }

        SolveReport {
            solution: winner.map(|node| reconstruct(&graph, node)),
            termination,
            searched,
            states: graph.len(),
            peak_frontier,
            elapsed: timer.elapsed(),
        }
    }
}

/// Walks predecessor links from the winning node back to the root and
/// returns the line in play order, each move paired with the board it
/// produced.
fn reconstruct(graph: &MoveGraph, winner: NodeId) -> Vec<SolvedMove> {
    let mut moves = Vec::with_capacity(graph.node(winner).depth as usize);
    let mut id = winner;
    while !graph.node(id).mv.is_null() {
        moves.push(SolvedMove {
            action: graph.node(id).mv,
            board: graph.board(id),
        });
        id = graph.node(id).parent;
    }
    moves.reverse();
    moves
}
