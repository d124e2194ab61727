//! Convention-level reasoning: focus detection, clue interpretation,
//! connection (prompt/finesse) search and play/discard interpretation.

mod focus;
mod interpret;

pub use focus::{Focus, determine_focus, find_bad_touch, find_chop, find_finesse, find_prompt};
pub use interpret::{
    ClueInterpretation, ClueOutcome, Connection, ConnectionKind, interpret_clue,
    interpret_discard, interpret_play,
};

use hanabi_core::game::{Game, MAX_CLUE_TOKENS};

/// Rule-set selection: `level` gates which sub-rules are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convention {
    pub level: u8,
}

impl Convention {
    /// Finesses and prompts become available.
    pub const FINESSE: u8 = 2;
    /// Chop moves, including the Order Chop Move.
    pub const BASIC_CM: u8 = 4;

    pub const fn new(level: u8) -> Self {
        Self { level }
    }
}

impl Default for Convention {
    fn default() -> Self {
        Self { level: 1 }
    }
}

/// How excusable a contentless clue is, judged from `giver`'s position
/// before the token is spent. Higher values mean the giver had fewer
/// alternatives, so receivers read less into it.
pub fn stall_severity(game: &Game, giver: usize) -> u8 {
    if game.clue_tokens() == MAX_CLUE_TOKENS && game.turn_count() != 0 {
        return 4;
    }
    if game.hand(giver).is_locked(game.common()) {
        return 3;
    }
    if game.early_game() {
        return 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::{Convention, stall_severity};
    use hanabi_core::game::Game;
    use hanabi_core::model::clue::Clue;
    use hanabi_core::model::variant::Variant;

    #[test]
    fn level_gates() {
        let convention = Convention::default();
        assert!(convention.level < Convention::FINESSE);
        assert!(Convention::new(5).level >= Convention::BASIC_CM);
    }

    #[test]
    fn early_game_counts_as_mild_stall() {
        let game = Game::new(Variant::no_variant(), 3, 0).unwrap();
        // Turn 0 at full tokens is not yet an 8-token stall.
        assert_eq!(stall_severity(&game, 1), 1);
    }

    #[test]
    fn full_tokens_past_the_opening_is_a_hard_stall() {
        let mut game = Game::new(Variant::no_variant(), 3, 0).unwrap();
        game.set_turn(4, 1);
        assert_eq!(stall_severity(&game, 1), 4);
    }

    #[test]
    fn locked_giver_is_a_severe_stall() {
        let mut game = Game::new(Variant::no_variant(), 2, 0).unwrap();
        for order in 0..5 {
            game.handle_draw(1, order, None).unwrap();
        }
        game.apply_clue_touch(1, Clue::rank(4), &[0, 1, 2]).unwrap();
        game.apply_clue_touch(1, Clue::rank(5), &[3, 4]).unwrap();
        assert_eq!(stall_severity(&game, 1), 3);
    }
}
