pub mod action;
pub mod card;
pub mod clue;
pub mod deck;
pub mod hand;
pub mod identity;
pub mod variant;
