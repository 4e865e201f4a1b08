use ahash::RandomState;

use freecell_common::board::{Board, Fingerprint, RESERVE_SLOTS};
use freecell_common::card::Card;
use freecell_common::moves::Move;

pub(crate) type NodeId = u32;

/// One visited board. The fingerprint plus the reserve snapshot is enough
/// to rebuild the full board; the reserve is stored here rather than in the
/// fingerprint so that reserve-slot permutations collapse to one node.
pub(crate) struct Node {
    key: Fingerprint,
    reserve: [Card; RESERVE_SLOTS],
    pub parent: NodeId,
    pub mv: Move,
    pub depth: u32,
    pub score: i32,
}

pub(crate) enum Visit {
    /// First time this fingerprint was seen; a node was created.
    New(NodeId),
    /// Known fingerprint reached by a strictly shorter path; predecessor,
    /// move, depth and reserve were overwritten in place.
    Relaxed,
    /// Known fingerprint, no better than the stored path.
    Known,
}

/// The move graph: every board discovered so far, interned by canonical
/// fingerprint.
///
/// Nodes live in an append-only arena and refer to their predecessors by
/// index; the graph is acyclic because depth strictly decreases along
/// parent links. A prime-sized linear-probing table indexes the arena by
/// fingerprint. Nodes are never removed: frontier pruning must not
/// resurrect duplicates.
pub(crate) struct MoveGraph {
    nodes: Vec<Node>,
    buckets: Vec<u32>,
    hasher: RandomState,
}

impl MoveGraph {
    /// Creates a graph with probing storage reserved up front for roughly
    /// `expected` boards.
    pub fn with_capacity(expected: usize) -> Self {
        MoveGraph {
            nodes: Vec::with_capacity(expected),
            buckets: vec![0; next_prime(expected * 2 + 1)],
            hasher: RandomState::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// Rebuilds the stored board for a node.
    pub fn board(&self, id: NodeId) -> Board {
        let node = self.node(id);
        Board::deserialize(&node.key, &node.reserve)
    }

    pub fn insert_root(&mut self, board: &Board, score: i32) -> NodeId {
        match self.visit(board, 0, Move::default(), 0, score) {
            Visit::New(id) => id,
            _ => unreachable!("root inserted into a non-empty graph"),
        }
    }

    /// Interns `board`. A new fingerprint creates a node; a known one is
    /// relaxed if `depth` beats the stored path (keeping the stored score)
    /// and discarded otherwise.
    pub fn visit(
        &mut self,
        board: &Board,
        parent: NodeId,
        mv: Move,
        depth: u32,
        score: i32,
    ) -> Visit {
        // Worst case the probe needs a free slot, so grow first.
        if (self.nodes.len() + 1) * 4 > self.buckets.len() * 3 {
            self.grow();
        }

        let key = board.serialize();
        let (slot, existing) = self.probe(&key);
        match existing {
            None => {
                let id = self.nodes.len() as NodeId;
                self.nodes.push(Node {
                    key,
                    reserve: pack_reserve(&board.reserve),
                    parent,
                    mv,
                    depth,
                    score,
                });
                self.buckets[slot] = id + 1;
                Visit::New(id)
            }
            Some(id) => {
                let node = &mut self.nodes[id as usize];
                if depth < node.depth {
                    node.parent = parent;
                    node.mv = mv;
                    node.depth = depth;
                    node.reserve = pack_reserve(&board.reserve);
                    Visit::Relaxed
                } else {
                    Visit::Known
                }
            }
        }
    }

    /// Linear probe: the bucket holding `key`'s node, or the free slot
    /// where it would be inserted. Buckets store node index + 1; 0 is
    /// empty.
    fn probe(&self, key: &Fingerprint) -> (usize, Option<NodeId>) {
        let hash = self.hasher.hash_one(key.as_bytes());
        let mut slot = (hash % self.buckets.len() as u64) as usize;
        loop {
            match self.buckets[slot] {
                0 => return (slot, None),
                entry => {
                    let id = entry - 1;
                    if self.nodes[id as usize].key == *key {
                        return (slot, Some(id));
                    }
                }
            }
            slot += 1;
            if slot == self.buckets.len() {
                slot = 0;
            }
        }
    }

    fn grow(&mut self) {
        self.buckets = vec![0u32; next_prime(self.buckets.len() * 2)];
        for (index, node) in self.nodes.iter().enumerate() {
            let hash = self.hasher.hash_one(node.key.as_bytes());
            let mut slot = (hash % self.buckets.len() as u64) as usize;
            while self.buckets[slot] != 0 {
                slot += 1;
                if slot == self.buckets.len() {
                    slot = 0;
                }
            }
            self.buckets[slot] = index as u32 + 1;
        }
    }
}

fn pack_reserve(reserve: &[Card]) -> [Card; RESERVE_SLOTS] {
    let mut slots = [Card::EMPTY; RESERVE_SLOTS];
    slots[..reserve.len()].copy_from_slice(reserve);
    slots
}

/// Smallest prime at or above `n`. Prime table sizes keep linear probing
/// well-distributed even for hash functions with poor low bits.
fn next_prime(n: usize) -> usize {
    if n <= 2 {
        return 2;
    }
    // Walk odd candidates, trial-dividing by odd divisors up to the root.
    let mut candidate = n | 1;
    loop {
        let mut divisor = 3;
        while divisor * divisor <= candidate && candidate % divisor != 0 {
            divisor += 2;
        }
        if divisor * divisor > candidate {
            return candidate;
        }
        candidate += 2;
    }
}
