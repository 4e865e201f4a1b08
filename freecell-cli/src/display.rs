use freecell_common::board::{Board, RESERVE_SLOTS};
use freecell_common::card::{Card, TOTAL_SUITS};

/// Renders a board as card glyphs: the reserve and foundation header row,
/// a blank line, then the cascade grid top-down. Empty slots show the card
/// back.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    for slot in 0..RESERVE_SLOTS {
        let card = board.reserve.get(slot).copied().unwrap_or(Card::EMPTY);
        out.push(card.glyph());
        out.push(' ');
    }
    out.push_str("      ");
    for suit in 0..TOTAL_SUITS as u8 {
        out.push(board.foundation_top(suit).glyph());
        out.push(' ');
    }
    out.push_str("\n\n");

    for row in 0.. {
        let mut line = String::new();
        let mut more = false;
        for cascade in &board.cascades {
            match cascade.get(row) {
                None => line.push_str(if line.is_empty() { " " } else { "   " }),
                Some(card) => {
                    if !line.is_empty() {
                        line.push_str("  ");
                    }
                    line.push(card.glyph());
                    more = true;
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_board() {
        let board = Board::default();
        let rendered = render_board(&board);
        // Header row only: four reserve backs, four foundation backs.
        assert_eq!(rendered.matches('\u{1F0A0}').count(), 8);
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn test_render_cascades() {
        let board = Board::parse(": AS 2S\n: 3S\n").unwrap();
        let rendered = render_board(&board);
        let rows: Vec<&str> = rendered.lines().skip(2).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains('\u{1F0A1}'));
        assert!(rows[0].contains('\u{1F0A2}'));
        assert!(rows[1].contains('\u{1F0A3}'));
    }
}
