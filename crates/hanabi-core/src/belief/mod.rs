//! Belief tables and the elimination engine.
//!
//! Each [`Beliefs`] table is one knowledge perspective: either the
//! common projection (derivable by every player, including a card's
//! owner) or a single player's private view. Perspectives never alias;
//! simulation clones whole tables.

mod counts;
mod table;

pub use counts::IdentityCounts;
pub use table::{Beliefs, Perspective};
