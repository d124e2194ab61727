//! Turn selection: collects playables, clues and urgent actions, then
//! walks the decision ladder to a single `PerformAction`.

pub mod clues;
pub mod priority;
pub mod urgency;

pub use clues::{
    ClueCandidate, ClueResult, FixClue, SaveClue, evaluate_clue, find_clue_value, find_fix_clues,
    find_play_clues, find_save_clues, select_play_clue,
};
pub use priority::{determine_playable_priorities, order_1s};
pub use urgency::{find_urgent_actions, hand_loaded};

use hanabi_core::game::{Game, MAX_CLUE_TOKENS};
use hanabi_core::model::action::PerformAction;
use hanabi_core::model::clue::Clue;
use hanabi_core::model::identity::MAX_RANK;
use tracing::{Level, event};

use crate::convention::{Convention, find_chop, stall_severity};

/// Minimum value for a play clue to be worth a token.
const MIN_CLUE_VALUE: f64 = 1.0;

/// Picks our action for this turn. Total: some action always comes
/// back, even with zero tokens and a locked hand.
pub fn take_action(game: &Game, convention: Convention) -> PerformAction {
    let playables = playable_orders(game);
    let play_clues = find_play_clues(game, convention);
    let save_clues = find_save_clues(game, convention);
    let fix_clues = find_fix_clues(game, convention);
    let priorities = determine_playable_priorities(game, &playables);
    let urgent = find_urgent_actions(
        game,
        convention,
        &play_clues,
        &save_clues,
        &fix_clues,
        &priorities,
    );

    for bucket in &urgent[..4] {
        if let Some(&action) = bucket.first() {
            log_choice(game, action, "urgent");
            return action;
        }
    }

    if let Some(&order) = priorities.iter().flatten().next() {
        let action = PerformAction::Play { target: order };
        log_choice(game, action, "play");
        return action;
    }

    for bucket in &urgent[4..] {
        if let Some(&action) = bucket.first() {
            log_choice(game, action, "deferred_urgent");
            return action;
        }
    }

    if let Some(best) = select_play_clue(&play_clues)
        && best.value >= MIN_CLUE_VALUE
    {
        let action = best.perform();
        log_choice(game, action, "play_clue");
        return action;
    }

    // Discarding is illegal at eight tokens; a locked hand with
    // tokens left also stalls rather than give up a protected card.
    if game.clue_tokens() == MAX_CLUE_TOKENS
        || (game.clue_tokens() > 0 && stall_severity(game, game.our_index()) >= 3)
    {
        let action = stall_clue(game, &play_clues);
        log_choice(game, action, "stall");
        return action;
    }

    if let Some(&order) = trash_orders(game).first() {
        let action = PerformAction::Discard { target: order };
        log_choice(game, action, "discard_trash");
        return action;
    }

    if let Some(chop) = find_chop(game, game.our_index()) {
        let action = PerformAction::Discard { target: chop };
        log_choice(game, action, "discard_chop");
        return action;
    }

    // Locked with no tokens: something protected has to go.
    let target = forced_discard(game);
    event!(
        target: "hanabi_bot::action",
        Level::WARN,
        order = target, "locked hand forced to discard a protected card"
    );
    PerformAction::Discard { target }
}

/// Orders in our hand we are entitled to play: blind plays from
/// finesses, plus cards whose every remaining inference is playable.
pub fn playable_orders(game: &Game) -> Vec<usize> {
    game.our_hand()
        .iter()
        .filter(|&order| {
            let card = game.our_view().card(order);
            if card.finessed || card.rewinded {
                return true;
            }
            let known = card.possible.iter().all(|id| game.is_playable(id));
            let inferred = card.is_saved()
                && !card.inferred.is_empty()
                && card.inferred.iter().all(|id| game.is_playable(id));
            known || inferred
        })
        .collect()
}

/// Orders in our hand that are certainly trash.
pub fn trash_orders(game: &Game) -> Vec<usize> {
    game.our_hand()
        .iter()
        .filter(|&order| {
            let card = game.our_view().card(order);
            !card.possible.is_empty() && card.possible.iter().all(|id| game.is_basic_trash(id))
        })
        .collect()
}

/// Any legal clue, preferring the best scored candidate, then a 5
/// stall, then the first touch we can find. Hands are never all empty
/// while it is our turn.
fn stall_clue(game: &Game, play_clues: &[ClueCandidate]) -> PerformAction {
    if let Some(best) = select_play_clue(play_clues) {
        return best.perform();
    }
    for step in 1..game.num_players() {
        let target = (game.our_index() + step) % game.num_players();
        let five = game
            .hand(target)
            .iter()
            .any(|order| game.identity_of(order).is_some_and(|id| id.rank == MAX_RANK));
        if five {
            return PerformAction::RankClue {
                target,
                value: MAX_RANK as usize,
            };
        }
    }
    for step in 1..game.num_players() {
        let target = (game.our_index() + step) % game.num_players();
        for rank in 1..=MAX_RANK as usize {
            if !clues::touched_orders(game, target, Clue::rank(rank)).is_empty() {
                return PerformAction::RankClue {
                    target,
                    value: rank,
                };
            }
        }
    }
    // Unreachable in a legal position; discard the chop-most card.
    PerformAction::Discard {
        target: game.our_hand().orders().last().copied().unwrap_or(0),
    }
}

/// With everything protected, give up the least informative card:
/// lowest minimum rank, leftmost on ties.
fn forced_discard(game: &Game) -> usize {
    game.our_hand()
        .iter()
        .min_by_key(|&order| {
            let card = game.our_view().card(order);
            let rank = card.possible.min_rank().unwrap_or(MAX_RANK);
            let slot = game.our_hand().slot_of(order).unwrap_or(usize::MAX);
            (rank, slot)
        })
        .unwrap_or(0)
}

fn log_choice(game: &Game, action: PerformAction, reason: &str) {
    event!(
        target: "hanabi_bot::action",
        Level::INFO,
        turn = game.turn_count(),
        tokens = game.clue_tokens(),
        strikes = game.strikes(),
        score = game.score(),
        action = ?action,
        reason,
    );
}
