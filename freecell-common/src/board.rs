use anyhow::{Context, Result, bail};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::card::{ACE, Card, KING, TOTAL_SUITS};

pub const TOTAL_CASCADES: usize = 8;
pub const RESERVE_SLOTS: usize = 4;
pub const DECK_SIZE: usize = 52;

const CASCADE_DEPTH: usize = 24;

/// Byte length of a canonical fingerprint: four foundation counters plus a
/// length byte per cascade plus one byte per card.
pub const FINGERPRINT_SIZE: usize = TOTAL_SUITS + TOTAL_CASCADES + DECK_SIZE;

pub type Cascade = SmallVec<[Card; CASCADE_DEPTH]>;

/// Canonical serialization of cascades + foundation, zero-padded to a fixed
/// width. The encoding is self-delimiting (each cascade is length-prefixed
/// and every board has exactly eight), so byte equality of the padded array
/// is exactly board-identity for de-duplication. Reserve contents are
/// deliberately excluded: boards differing only in reserve-slot order are
/// the same search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub cascades: [Cascade; TOTAL_CASCADES],
    pub reserve: SmallVec<[Card; RESERVE_SLOTS]>,
    pub foundation: [u8; TOTAL_SUITS],
}

impl Board {
    /// Parses the deal format: whitespace-separated card tokens, where a
    /// `:` (or a line break, as in the reference implementation) resets the
    /// cascade cursor to 0 and each token lands on the next cascade.
    ///
    /// A deal that does not contain each of the 52 cards exactly once is
    /// accepted with a warning enumerating the missing and duplicated
    /// cards.
    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Self::default();
        let mut census: BTreeMap<u8, usize> = BTreeMap::new();

        for raw_line in content.split(['\n', '\r']) {
            let mut cascade = 0usize;
            for token in raw_line.split([' ', '\t']) {
                for (colons, token) in token.split(':').enumerate() {
                    if colons > 0 {
                        cascade = 0;
                    }
                    if token.is_empty() {
                        continue;
                    }
                    let card = Card::parse(token)
                        .with_context(|| format!("Failed to read card '{token}'"))?;
                    if cascade >= TOTAL_CASCADES {
                        bail!("deal describes more than {TOTAL_CASCADES} cascades");
                    }
                    board.cascades[cascade].push(card);
                    cascade += 1;
                    *census.entry(card.to_byte()).or_default() += 1;
                }
            }
        }

        if census.len() != DECK_SIZE {
            eprintln!("WARNING: input does not contain all 52 card faces.");
            for suit in 0..TOTAL_SUITS as u8 {
                for face in ACE..=KING {
                    let card = Card::new(face, suit);
                    if !census.contains_key(&card.to_byte()) {
                        eprintln!("- Missing {}", card.name());
                    }
                }
            }
        }
        for (&byte, &count) in &census {
            if count > 1 {
                eprintln!(
                    "WARNING: {} appears {count} times.",
                    Card::from_byte(byte).name()
                );
            }
        }

        Ok(board)
    }

    pub fn is_won(&self) -> bool {
        self.foundation.iter().all(|&f| f == KING)
    }

    /// Progress percentage: foundationed cards over the full deck.
    pub fn completion(&self) -> u32 {
        let placed: u32 = self.foundation.iter().map(|&f| f as u32).sum();
        placed * 100 / DECK_SIZE as u32
    }

    /// Cards on the board, counting each foundation as its counter value.
    pub fn total_cards(&self) -> usize {
        let placed: usize = self.foundation.iter().map(|&f| f as usize).sum();
        let stacked: usize = self.cascades.iter().map(|c| c.len()).sum();
        placed + stacked + self.reserve.len()
    }

    pub fn serialize(&self) -> Fingerprint {
        let mut bytes = [0u8; FINGERPRINT_SIZE];
        bytes[..TOTAL_SUITS].copy_from_slice(&self.foundation);
        let mut i = TOTAL_SUITS;
        for cascade in &self.cascades {
            bytes[i] = cascade.len() as u8;
            i += 1;
            for &card in cascade {
                bytes[i] = card.to_byte();
                i += 1;
            }
        }
        Fingerprint(bytes)
    }

    /// Rebuilds the board a fingerprint was taken from, given the reserve
    /// contents the fingerprint omits.
    pub fn deserialize(fingerprint: &Fingerprint, reserve: &[Card]) -> Self {
        let bytes = &fingerprint.0;
        let mut board = Self::default();
        board.foundation.copy_from_slice(&bytes[..TOTAL_SUITS]);
        let mut i = TOTAL_SUITS;
        for cascade in &mut board.cascades {
            let count = bytes[i] as usize;
            i += 1;
            for _ in 0..count {
                cascade.push(Card::from_byte(bytes[i]));
                i += 1;
            }
        }
        for &card in reserve {
            if !card.is_empty() {
                board.reserve.push(card);
            }
        }
        board
    }

    /// Row-major deal-format output, the inverse of [`Board::parse`] for a
    /// freshly dealt board.
    pub fn to_deal_string(&self) -> String {
        let mut out = String::new();
        for row in 0.. {
            let mut line = String::from(":");
            let mut more = false;
            for cascade in &self.cascades {
                match cascade.get(row) {
                    Some(card) => {
                        line.push(' ');
                        line.push_str(&card.code());
                        more = true;
                    }
                    None => line.push_str("   "),
                }
            }
            if !more {
                break;
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    #[inline]
    pub fn cascade_top(&self, cascade: usize) -> Option<Card> {
        self.cascades[cascade].last().copied()
    }

    pub fn foundation_top(&self, suit: u8) -> Card {
        match self.foundation[suit as usize] {
            0 => Card::EMPTY,
            face => Card::new(face, suit),
        }
    }

    // --- Move legality -----------------------------------------------------

    /// A cascade accepts a card when it is empty or its top continues the
    /// descending alternating-color sequence.
    pub fn tableau_accepts(&self, cascade: usize, card: Card) -> bool {
        match self.cascade_top(cascade) {
            None => true,
            Some(top) => card.stacks_on(top),
        }
    }

    pub fn foundation_accepts(&self, card: Card) -> bool {
        self.foundation[card.suit() as usize] == card.face() - 1
    }

    #[inline]
    pub fn reserve_is_full(&self) -> bool {
        self.reserve.len() >= RESERVE_SLOTS
    }

    /// Whether the top foundation card of `suit` may be pulled back down
    /// onto `cascade`.
    pub fn foundation_pull_valid(&self, suit: u8, cascade: usize) -> bool {
        let face = self.foundation[suit as usize];
        if face == 0 {
            return false;
        }
        match self.cascade_top(cascade) {
            None => true,
            Some(top) => {
                top.face() == face + 1 && top.color() != Card::new(face, suit).color()
            }
        }
    }

    // --- Appliers ----------------------------------------------------------
    //
    // Each produces the post-move board and leaves `self` untouched. The
    // caller is responsible for legality; an impossible transition aborts.

    pub fn reserve_to_tableau(&self, slot: usize, cascade: usize) -> Board {
        let mut next = self.clone();
        let card = next.reserve.remove(slot);
        next.cascades[cascade].push(card);
        next
    }

    pub fn tableau_to_tableau(&self, source: usize, dest: usize) -> Board {
        let mut next = self.clone();
        let card = next.cascades[source].pop().expect("move from empty cascade");
        next.cascades[dest].push(card);
        next
    }

    pub fn tableau_to_reserve(&self, source: usize) -> Board {
        assert!(!self.reserve_is_full(), "move to full reserve");
        let mut next = self.clone();
        let card = next.cascades[source].pop().expect("move from empty cascade");
        next.reserve.push(card);
        next
    }

    pub fn tableau_to_foundation(&self, source: usize) -> Board {
        let mut next = self.clone();
        let card = next.cascades[source].pop().expect("move from empty cascade");
        next.foundation[card.suit() as usize] += 1;
        next
    }

    pub fn foundation_to_tableau(&self, suit: u8, cascade: usize) -> Board {
        let card = self.foundation_top(suit);
        assert!(!card.is_empty(), "pull from empty foundation");
        let mut next = self.clone();
        next.foundation[suit as usize] -= 1;
        next.cascades[cascade].push(card);
        next
    }

    pub fn reserve_to_foundation(&self, slot: usize) -> Board {
        let mut next = self.clone();
        let card = next.reserve.remove(slot);
        next.foundation[card.suit() as usize] += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CLUB, DIAMOND, HEART, SPADE};

    const REFERENCE_DEAL: &str = ": 6C 9S 2H AC JD AS 9C 7H\n\
                                  : 2D AD QC KD JC JS 3D 2C\n\
                                  : KC TD 7D 9D QD TS 6D 6H\n\
                                  : 8S TH 3H KS 2S QS 8C KH\n\
                                  : AH JH 7C 8H 5H 8D 5D 3S\n\
                                  : 4S TC 4D QH 4C 3C 5C 6S\n\
                                  : 9H 4H 5S 7S\n";

    fn card(code: &str) -> Card {
        Card::parse(code).unwrap()
    }

    #[test]
    fn test_parse_reference_deal() {
        let board = Board::parse(REFERENCE_DEAL).unwrap();
        assert_eq!(board.total_cards(), DECK_SIZE);
        let lengths: Vec<usize> = board.cascades.iter().map(|c| c.len()).collect();
        assert_eq!(lengths, [7, 7, 7, 7, 6, 6, 6, 6]);
        assert_eq!(board.cascades[0][0], card("6C"));
        assert_eq!(board.cascade_top(3), Some(card("7S")));
        assert!(board.reserve.is_empty());
        assert_eq!(board.foundation, [0; 4]);
        assert_eq!(board.completion(), 0);
        assert!(!board.is_won());
    }

    #[test]
    fn test_parse_without_colons() {
        let plain = REFERENCE_DEAL.replace(':', " ");
        assert_eq!(Board::parse(&plain).unwrap(), Board::parse(REFERENCE_DEAL).unwrap());
    }

    #[test]
    fn test_parse_incomplete_deal_proceeds() {
        let board = Board::parse(": 6C 9S 2H\n").unwrap();
        assert_eq!(board.total_cards(), 3);
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        assert!(Board::parse(": 6C 9S ZZ\n").is_err());
        assert!(Board::parse(": 1C 2C 3C 4C 5C 6C 7C 8C 9C\n").is_err());
    }

    #[test]
    fn test_deal_string_round_trip() {
        let board = Board::parse(REFERENCE_DEAL).unwrap();
        let rendered = board.to_deal_string();
        assert_eq!(Board::parse(&rendered).unwrap(), board);
        assert_eq!(rendered, REFERENCE_DEAL);
    }

    #[test]
    fn test_fingerprint_round_trip() {
        let board = Board::parse(REFERENCE_DEAL).unwrap();
        let restored = Board::deserialize(&board.serialize(), &board.reserve);
        assert_eq!(restored, board);
        assert_eq!(restored.serialize(), board.serialize());
    }

    #[test]
    fn test_fingerprint_ignores_reserve_order() {
        let mut a = Board::parse(REFERENCE_DEAL).unwrap();
        a = a.tableau_to_reserve(0);
        a = a.tableau_to_reserve(1);
        let mut b = a.clone();
        b.reserve.swap(0, 1);
        assert_ne!(a.reserve, b.reserve);
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn test_fingerprint_tracks_cascade_changes() {
        let board = Board::parse(REFERENCE_DEAL).unwrap();
        let moved = board.tableau_to_reserve(0);
        assert_ne!(board.serialize(), moved.serialize());
    }

    #[test]
    fn test_won_board() {
        let mut board = Board::default();
        board.foundation = [KING; 4];
        assert!(board.is_won());
        assert_eq!(board.completion(), 100);
        assert_eq!(board.total_cards(), DECK_SIZE);
    }

    #[test]
    fn test_tableau_accepts() {
        let mut board = Board::default();
        board.cascades[0].push(card("8C"));
        assert!(board.tableau_accepts(0, card("7D")));
        assert!(board.tableau_accepts(0, card("7H")));
        assert!(!board.tableau_accepts(0, card("7C")));
        assert!(!board.tableau_accepts(0, card("6D")));
        assert!(board.tableau_accepts(1, card("2S")));
    }

    #[test]
    fn test_foundation_accepts() {
        let mut board = Board::default();
        assert!(board.foundation_accepts(card("AS")));
        assert!(!board.foundation_accepts(card("2S")));
        board.foundation[SPADE as usize] = 1;
        assert!(board.foundation_accepts(card("2S")));
        assert!(!board.foundation_accepts(card("2H")));
    }

    #[test]
    fn test_foundation_pull() {
        let mut board = Board::default();
        board.foundation[HEART as usize] = 6;
        board.cascades[0].push(card("7S"));
        board.cascades[1].push(card("7D"));
        assert!(board.foundation_pull_valid(HEART, 0));
        assert!(!board.foundation_pull_valid(HEART, 1));
        assert!(board.foundation_pull_valid(HEART, 2));
        assert!(!board.foundation_pull_valid(SPADE, 0));

        let pulled = board.foundation_to_tableau(HEART, 0);
        assert_eq!(pulled.foundation[HEART as usize], 5);
        assert_eq!(pulled.cascade_top(0), Some(card("6H")));
        assert_eq!(pulled.total_cards(), board.total_cards());
    }

    #[test]
    fn test_appliers_preserve_input() {
        let board = Board::parse(REFERENCE_DEAL).unwrap();
        let snapshot = board.clone();

        let to_reserve = board.tableau_to_reserve(2);
        assert_eq!(board, snapshot);
        assert_eq!(to_reserve.reserve.as_slice(), [card("5S")]);
        assert_eq!(to_reserve.cascades[2].len(), 6);
        assert_eq!(to_reserve.total_cards(), DECK_SIZE);

        let back = to_reserve.reserve_to_tableau(0, 3);
        assert!(back.reserve.is_empty());
        assert_eq!(back.cascade_top(3), Some(card("5S")));
        assert_eq!(back.total_cards(), DECK_SIZE);
    }

    #[test]
    fn test_tableau_to_foundation_and_back() {
        let mut board = Board::default();
        board.foundation[DIAMOND as usize] = 2;
        board.cascades[5].push(card("3D"));
        let up = board.tableau_to_foundation(5);
        assert_eq!(up.foundation[DIAMOND as usize], 3);
        assert!(up.cascades[5].is_empty());

        let down = up.foundation_to_tableau(DIAMOND, 5);
        assert_eq!(down, board);
    }

    #[test]
    fn test_reserve_to_foundation() {
        let mut board = Board::default();
        board.foundation[CLUB as usize] = 9;
        board.reserve.push(card("TC"));
        let next = board.reserve_to_foundation(0);
        assert_eq!(next.foundation[CLUB as usize], 10);
        assert!(next.reserve.is_empty());
    }
}
