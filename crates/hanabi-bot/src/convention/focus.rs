use hanabi_core::game::Game;
use hanabi_core::model::clue::ClueKind;
use hanabi_core::model::hand::ChopMode;
use hanabi_core::model::identity::Identity;

/// The single card a clue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub order: usize,
    pub on_chop: bool,
}

/// Chop under the common view, with newly-clued cards not yet
/// shielding (the mode used while a clue is being interpreted).
pub fn find_chop(game: &Game, player: usize) -> Option<usize> {
    game.hand(player).chop(game.common(), ChopMode::Normal)
}

/// Picks the focus of a clue touching `list` in `target`'s hand.
///
/// Priority: chop if touched, else leftmost newly-touched card, else
/// leftmost touched chop-moved card, else leftmost touched card. With
/// `before_touch` the clue flags have not been applied yet, so "newly
/// touched" means not yet clued.
pub fn determine_focus(
    game: &Game,
    target: usize,
    list: &[usize],
    before_touch: bool,
) -> Option<Focus> {
    if list.is_empty() {
        return None;
    }
    if let Some(chop) = find_chop(game, target)
        && list.contains(&chop)
    {
        return Some(Focus {
            order: chop,
            on_chop: true,
        });
    }

    let hand = game.hand(target);
    let fresh = hand.iter().find(|&order| {
        let card = game.common().card(order);
        let newly = if before_touch { !card.clued } else { card.newly_clued };
        list.contains(&order) && newly
    });
    if let Some(order) = fresh {
        return Some(Focus {
            order,
            on_chop: false,
        });
    }

    let moved = hand
        .iter()
        .find(|&order| list.contains(&order) && game.common().card(order).chop_moved);
    if let Some(order) = moved {
        return Some(Focus {
            order,
            on_chop: false,
        });
    }

    hand.iter().find(|order| list.contains(order)).map(|order| Focus {
        order,
        on_chop: false,
    })
}

/// Leftmost previously-clued card in `player`'s hand that could be
/// `identity` and actually received a clue pointing at it. A card
/// clued only by an unrelated colour or rank cannot be prompted.
pub fn find_prompt(
    game: &Game,
    player: usize,
    identity: Identity,
    ignore: &[usize],
) -> Option<usize> {
    game.hand(player).iter().find(|&order| {
        if ignore.contains(&order) {
            return false;
        }
        let card = game.common().card(order);
        card.clued
            && !card.newly_clued
            && card.identity_known().is_none()
            && card.inferred.contains(identity)
            && card.clues().iter().any(|clue| match clue.kind {
                ClueKind::Colour => clue.value == identity.suit,
                ClueKind::Rank => clue.value == identity.rank as usize,
            })
    })
}

/// The finesse position: leftmost card with no clue and no pending
/// blind play.
pub fn find_finesse(game: &Game, player: usize, ignore: &[usize]) -> Option<usize> {
    game.hand(player).iter().find(|&order| {
        let card = game.common().card(order);
        !ignore.contains(&order) && !card.clued && !card.finessed
    })
}

/// Touched cards (other than the focus) that the clue should not have
/// included: basic trash, copies already protected elsewhere,
/// duplicates within the same clue, or duplicates of a card we
/// already strongly suspect in our own hand.
pub fn find_bad_touch(game: &Game, list: &[usize], focus_order: usize) -> Vec<usize> {
    let mut bad = Vec::new();
    for &order in list {
        if order == focus_order {
            continue;
        }
        let identity = match game
            .identity_of(order)
            .or_else(|| game.common().card(order).identity_known())
        {
            Some(identity) => identity,
            None => continue,
        };

        let duplicated_in_clue = list.iter().any(|&other| {
            other != order && other < order && game.identity_of(other) == Some(identity)
        });
        let suspected_in_our_hand = game.our_hand().iter().any(|ours| {
            let card = game.our_view().card(ours);
            card.is_saved() && card.inferred.len() <= 2 && card.inferred.contains(identity)
        });

        if game.is_basic_trash(identity)
            || game.is_saved_elsewhere(identity, order)
            || duplicated_in_clue
            || suspected_in_our_hand
        {
            bad.push(order);
        }
    }
    bad
}
