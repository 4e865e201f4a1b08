use freecell_common::board::{Board, DECK_SIZE, TOTAL_CASCADES};
use freecell_common::card::TOTAL_SUITS;
use freecell_common::moves::{Endpoint, Move};

use crate::graph::{MoveGraph, NodeId, Visit};
use crate::heuristic::Weights;

/// A successor newly added to the graph, ready for the frontier. Its
/// heuristic score lives on the graph node.
pub(crate) struct Expansion {
    pub node: NodeId,
    pub board: Board,
}

/// Enumerates every legal single-card transition out of `board` and interns
/// each child. Returns only the children whose fingerprints were new;
/// already-known boards are relaxed or discarded inside the graph and never
/// re-enqueued.
///
/// Candidate order: for each cascade, reserve cards onto it, then it onto
/// every cascade, onto the reserve, onto the foundation, then foundation
/// pulls onto it (all of which need the cascade non-empty except the
/// reserve drops); finally each reserve card onto the foundation.
pub(crate) fn expand(
    board: &Board,
    parent: NodeId,
    graph: &mut MoveGraph,
    weights: &Weights,
    pull_from_foundation: bool,
) -> Vec<Expansion> {
    let depth = graph.node(parent).depth + 1;
    let mut out = Vec::new();

    for i in 0..TOTAL_CASCADES {
        for slot in 0..board.reserve.len() {
            let card = board.reserve[slot];
            if board.tableau_accepts(i, card) {
                let mv = Move::new(card, Endpoint::cascade_top(board, i));
                visit(graph, &mut out, parent, depth, weights, mv, board.reserve_to_tableau(slot, i));
            }
        }

        let Some(top) = board.cascade_top(i) else {
            continue;
        };

        for j in 0..TOTAL_CASCADES {
            if board.tableau_accepts(j, top) {
                let mv = Move::new(top, Endpoint::cascade_top(board, j));
                visit(graph, &mut out, parent, depth, weights, mv, board.tableau_to_tableau(i, j));
            }
        }

        if !board.reserve_is_full() {
            let mv = Move::new(top, Endpoint::EmptyReserve);
            visit(graph, &mut out, parent, depth, weights, mv, board.tableau_to_reserve(i));
        }

        if board.foundation_accepts(top) {
            let mv = Move::new(top, Endpoint::Foundation);
            visit(graph, &mut out, parent, depth, weights, mv, board.tableau_to_foundation(i));
        }

        if pull_from_foundation {
            for suit in 0..TOTAL_SUITS as u8 {
                if board.foundation_pull_valid(suit, i) {
                    let mv = Move::new(board.foundation_top(suit), Endpoint::cascade_top(board, i));
                    visit(graph, &mut out, parent, depth, weights, mv, board.foundation_to_tableau(suit, i));
                }
            }
        }
    }

    for slot in 0..board.reserve.len() {
        let card = board.reserve[slot];
        if board.foundation_accepts(card) {
            let mv = Move::new(card, Endpoint::Foundation);
            visit(graph, &mut out, parent, depth, weights, mv, board.reserve_to_foundation(slot));
        }
    }

    out
}

fn visit(
    graph: &mut MoveGraph,
    out: &mut Vec<Expansion>,
    parent: NodeId,
    depth: u32,
    weights: &Weights,
    mv: Move,
    child: Board,
) {
    assert_eq!(
        child.total_cards(),
        DECK_SIZE,
        "successor lost or duplicated a card"
    );
    let score = crate::heuristic::score(&child, depth, weights);
    if let Visit::New(node) = graph.visit(&child, parent, mv, depth, score) {
        out.push(Expansion { node, board: child });
    }
}
