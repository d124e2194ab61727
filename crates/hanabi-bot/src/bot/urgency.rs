use hanabi_core::game::Game;
use hanabi_core::model::action::PerformAction;
use hanabi_core::model::clue::Clue;
use hanabi_core::model::hand::ChopMode;
use hanabi_core::model::identity::Identity;
use tracing::{Level, event};

use super::clues::{ClueCandidate, FixClue, SaveClue, select_play_clue};
use super::priority::{PRIORITY_BUCKETS, order_1s};
use crate::convention::Convention;

/// Number of urgency buckets, scanned around our own play step.
pub const URGENCY_BUCKETS: usize = 9;

/// Actions that cannot wait, graded by how soon they matter:
/// 0. unlock the next player
/// 1. save the next player's chop (or Order Chop Move for it)
/// 2. give the next player a play over their save, or fix trash
/// 3. urgent fix for the next player
/// 4-7. the same four tiers for players further away
/// 8. saves that can wait until after we act
pub fn find_urgent_actions(
    game: &Game,
    convention: Convention,
    play_clues: &[ClueCandidate],
    save_clues: &[Option<SaveClue>],
    fix_clues: &[Vec<FixClue>],
    playable_priorities: &[Vec<usize>; PRIORITY_BUCKETS],
) -> [Vec<PerformAction>; URGENCY_BUCKETS] {
    let mut buckets: [Vec<PerformAction>; URGENCY_BUCKETS] = Default::default();
    let can_clue = game.clue_tokens() > 0;

    for distance in 1..game.num_players() {
        let target = (game.our_index() + distance) % game.num_players();
        let next = distance == 1;
        let base = if next { 0 } else { 4 };
        let save = save_clues[target];
        let locked = game.hand(target).is_locked(game.common());

        if save.is_some() || locked {
            // A player with something to do will not discard; their
            // chop keeps for now.
            if hand_loaded(game, target) {
                if let Some(save) = save
                    && can_clue
                {
                    buckets[8].push(save.perform());
                }
                continue;
            }

            if let Some(play) = find_unlock(game, target) {
                buckets[base].push(play);
                continue;
            }

            if game.clue_tokens() > 1
                && let Some(clue) = find_play_over_save(game, target, play_clues, locked)
            {
                buckets[base + 2].push(clue);
                continue;
            }

            if can_clue
                && let Some(fix) = fix_clues[target].iter().find(|f| f.urgent && f.trash)
            {
                buckets[base + 2].push(fix.perform());
                continue;
            }

            if convention.level >= Convention::BASIC_CM
                && let Some(play) = find_order_chop_move(game, target, distance, playable_priorities)
            {
                event!(
                    target: "hanabi_bot::action",
                    Level::INFO,
                    target_player = target, "ordering a 1 to chop move"
                );
                buckets[base + 1].push(play);
                continue;
            }

            if let Some(save) = save
                && can_clue
            {
                buckets[base + 1].push(save.perform());
            }
        }

        if can_clue && !fix_clues[target].is_empty() {
            if let Some(fix) = fix_clues[target].iter().find(|f| f.urgent) {
                buckets[if next { 3 } else { 7 }].push(fix.perform());
            } else {
                buckets[7].push(fix_clues[target][0].perform());
            }
        }
    }
    buckets
}

/// The player has a known play or known trash, so they will not be
/// discarding from chop this turn.
pub fn hand_loaded(game: &Game, player: usize) -> bool {
    game.hand(player).iter().any(|order| {
        let card = game.common().card(order);
        let playable = card.is_saved()
            && !card.inferred.is_empty()
            && card.inferred.iter().all(|id| game.is_playable(id));
        let trash = card.possible.iter().all(|id| game.is_basic_trash(id));
        playable || trash
    })
}

/// A play from our own hand that makes a card in the locked player's
/// hand playable. Only certain cards qualify; guessing into a locked
/// hand loses the game state.
fn find_unlock(game: &Game, target: usize) -> Option<PerformAction> {
    for order in game.hand(target).iter() {
        let Some(identity) = game.identity_of(order) else {
            continue;
        };
        if game.playable_away(identity) != 1 {
            continue;
        }
        let needed = Identity::new(identity.suit, identity.rank - 1);
        let ours = game.our_hand().iter().find(|&o| {
            let card = game.our_view().card(o);
            card.identity_known() == Some(needed)
                || (card.is_saved() && card.inferred.singleton() == Some(needed))
        });
        if let Some(connecting) = ours {
            return Some(PerformAction::Play { target: connecting });
        }
    }
    None
}

/// A play clue to `target` that gives them a playable card now (or
/// one that becomes playable as the clue's other plays resolve),
/// sparing the save. A locked hand takes any non-negative clue.
fn find_play_over_save(
    game: &Game,
    target: usize,
    play_clues: &[ClueCandidate],
    locked: bool,
) -> Option<PerformAction> {
    let threshold = if locked { 0.0 } else { 1.0 };
    let viable: Vec<ClueCandidate> = play_clues
        .iter()
        .filter(|candidate| {
            candidate.target == target
                && candidate.value >= threshold
                && candidate
                    .result
                    .playables
                    .iter()
                    .any(|&(player, order)| player == target && resolves(game, candidate, order))
        })
        .cloned()
        .collect();
    select_play_clue(&viable).map(ClueCandidate::perform)
}

/// The card plays immediately, or every missing rank below it is
/// covered by another of the clue's plays held by a seat that acts
/// after us but before the target reaches their turn.
fn resolves(game: &Game, candidate: &ClueCandidate, order: usize) -> bool {
    let Some(identity) = game.identity_of(order) else {
        return false;
    };
    let num_players = game.num_players();
    let seat = |player: usize| (player + num_players - game.our_index()) % num_players;
    let target_seat = seat(candidate.target);
    let stack = game.play_stack(identity.suit);
    ((stack + 1)..identity.rank).all(|rank| {
        let step = Identity::new(identity.suit, rank);
        candidate.result.playables.iter().any(|&(player, other)| {
            other != order
                && seat(player) > 0
                && seat(player) < target_seat
                && game.identity_of(other) == Some(step)
        })
    })
}

/// Order Chop Move: when we hold several playable 1s and nothing more
/// urgent, playing a later-fresh 1 tells the player at the matching
/// seat distance to shield their chop. Skipped when their next chop
/// would be critical.
fn find_order_chop_move(
    game: &Game,
    target: usize,
    distance: usize,
    playable_priorities: &[Vec<usize>; PRIORITY_BUCKETS],
) -> Option<PerformAction> {
    // Higher-priority plays would mask the signal.
    if playable_priorities[..4].iter().any(|bucket| !bucket.is_empty()) {
        return None;
    }
    // Only still-unknown 1s carry the signal; a pinned 1 has an
    // obvious reason to play first.
    let ones: Vec<usize> = playable_priorities[4]
        .iter()
        .copied()
        .filter(|&order| {
            let card = game.our_view().card(order);
            !card.clues().is_empty() && card.clues().iter().all(|&clue| clue == Clue::rank(1))
        })
        .collect();
    let ordered = order_1s(game, &ones);
    if ordered.len() <= distance {
        return None;
    }

    let chop = game.hand(target).chop(game.common(), ChopMode::Normal)?;
    let next_chop = game
        .hand(target)
        .orders()
        .iter()
        .rev()
        .copied()
        .find(|&order| order != chop && !game.common().card(order).is_saved());
    if let Some(next_chop) = next_chop
        && let Some(identity) = game.identity_of(next_chop)
        && game.is_critical(identity)
    {
        return None;
    }
    Some(PerformAction::Play {
        target: ordered[distance],
    })
}
