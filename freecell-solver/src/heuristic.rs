use freecell_common::board::Board;

/// Heuristic weights, fixed at solver construction.
///
/// The contract is the monotonic directions, not the values: foundation
/// progress helps, depth hurts, buried high cards hurt, ordered stacks
/// help. Smaller `greed` widens the search but finds better lines; larger
/// `move_cost` shortens solutions at the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    /// Bias toward cards already on the foundation.
    pub greed: i32,
    /// Deduction per move taken from the root.
    pub move_cost: i32,
    /// Cost of a high card stacked over a lower one, scaled by how deeply
    /// the obstruction is buried.
    pub inversion_penalty: i32,
    /// Reward per descending adjacent pair in a cascade.
    pub stack_reward: i32,
}

impl Weights {
    /// All-zero weights leave every board with the same score, so the
    /// frontier degrades to insertion order: breadth-first search.
    pub const FIFO: Weights = Weights {
        greed: 0,
        move_cost: 0,
        inversion_penalty: 0,
        stack_reward: 0,
    };
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            greed: 32,
            move_cost: 8,
            inversion_penalty: 64,
            stack_reward: 4,
        }
    }
}

pub(crate) fn score(board: &Board, depth: u32, weights: &Weights) -> i32 {
    let placed: i32 = board.foundation.iter().map(|&f| i32::from(f)).sum();
    let mut score = placed * weights.greed;

    for cascade in &board.cascades {
        for i in 1..cascade.len() {
            if cascade[i].face() > cascade[i - 1].face() {
                score -= (cascade.len() - i) as i32 * weights.inversion_penalty;
            } else {
                score += weights.stack_reward;
            }
        }
    }

    score - depth as i32 * weights.move_cost
}
