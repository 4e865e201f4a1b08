use crate::board::Board;
use crate::card::Card;

const EMPTY_CASCADE: u8 = 0xFD;
const EMPTY_RESERVE: u8 = 0xFE;
const FOUNDATION: u8 = 0xFF;

/// One endpoint of a move: the top card of a specific cascade, a specific
/// reserve card, the foundation, or an empty pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Card(Card),
    EmptyCascade,
    EmptyReserve,
    Foundation,
}

impl Endpoint {
    /// The endpoint a move onto `cascade` targets: its top card, or the
    /// empty-cascade sentinel.
    pub fn cascade_top(board: &Board, cascade: usize) -> Self {
        match board.cascade_top(cascade) {
            Some(card) => Endpoint::Card(card),
            None => Endpoint::EmptyCascade,
        }
    }

    fn encode(self) -> u8 {
        match self {
            Endpoint::Card(card) => card.to_byte(),
            Endpoint::EmptyCascade => EMPTY_CASCADE,
            Endpoint::EmptyReserve => EMPTY_RESERVE,
            Endpoint::Foundation => FOUNDATION,
        }
    }

    fn decode(byte: u8) -> Self {
        match byte {
            EMPTY_CASCADE => Endpoint::EmptyCascade,
            EMPTY_RESERVE => Endpoint::EmptyReserve,
            FOUNDATION => Endpoint::Foundation,
            card => Endpoint::Card(Card::from_byte(card)),
        }
    }
}

/// A single-card transition, packed into three bytes for node storage. The
/// source is always a concrete card; the zero source marks the null move of
/// the search root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Move {
    source: u8,
    dest: u8,
    count: u8,
}

impl Move {
    pub fn new(source: Card, dest: Endpoint) -> Self {
        Move {
            source: source.to_byte(),
            dest: dest.encode(),
            count: 1,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.source == 0
    }

    #[inline]
    pub fn source(&self) -> Card {
        Card::from_byte(self.source)
    }

    #[inline]
    pub fn dest(&self) -> Endpoint {
        Endpoint::decode(self.dest)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count as usize
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dest = match self.dest() {
            Endpoint::Card(card) => format!("the {}", card.name()),
            Endpoint::EmptyCascade => "an empty cascade".to_string(),
            Endpoint::EmptyReserve => "an empty reserve".to_string(),
            Endpoint::Foundation => "the foundation".to_string(),
        };
        write!(f, "Move the {} onto {dest}", self.source().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str) -> Card {
        Card::parse(code).unwrap()
    }

    #[test]
    fn test_null_move() {
        assert!(Move::default().is_null());
        assert!(!Move::new(card("7D"), Endpoint::Foundation).is_null());
    }

    #[test]
    fn test_rendering() {
        let onto_card = Move::new(card("7D"), Endpoint::Card(card("8C")));
        assert_eq!(
            onto_card.to_string(),
            "Move the Seven of Diamonds onto the Eight of Clubs"
        );

        let onto_foundation = Move::new(card("AS"), Endpoint::Foundation);
        assert_eq!(
            onto_foundation.to_string(),
            "Move the Ace of Spades onto the foundation"
        );

        let onto_empty = Move::new(card("KH"), Endpoint::EmptyCascade);
        assert_eq!(
            onto_empty.to_string(),
            "Move the King of Hearts onto an empty cascade"
        );

        let into_reserve = Move::new(card("2C"), Endpoint::EmptyReserve);
        assert_eq!(
            into_reserve.to_string(),
            "Move the Two of Clubs onto an empty reserve"
        );
    }

    #[test]
    fn test_endpoint_round_trip() {
        for endpoint in [
            Endpoint::Card(card("QH")),
            Endpoint::EmptyCascade,
            Endpoint::EmptyReserve,
            Endpoint::Foundation,
        ] {
            let mv = Move::new(card("3S"), endpoint);
            assert_eq!(mv.dest(), endpoint);
            assert_eq!(mv.source(), card("3S"));
            assert_eq!(mv.count(), 1);
        }
    }

    #[test]
    fn test_cascade_top_endpoint() {
        let board = Board::parse(": 8C\n").unwrap();
        assert_eq!(
            Endpoint::cascade_top(&board, 0),
            Endpoint::Card(card("8C"))
        );
        assert_eq!(Endpoint::cascade_top(&board, 1), Endpoint::EmptyCascade);
    }
}
