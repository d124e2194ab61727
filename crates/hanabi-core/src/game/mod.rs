mod state;

pub use state::{Game, GameError, MAX_CLUE_TOKENS};
