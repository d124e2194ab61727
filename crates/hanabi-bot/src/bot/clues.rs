use hanabi_core::game::Game;
use hanabi_core::model::action::PerformAction;
use hanabi_core::model::clue::{Clue, ClueKind};
use hanabi_core::model::identity::{Identity, IdentitySet, MAX_RANK};
use tracing::{Level, event};

use crate::convention::{ClueInterpretation, Convention, interpret_clue};

/// Measured effects of a simulated clue, the inputs to clue scoring.
#[derive(Debug, Clone)]
pub struct ClueResult {
    pub new_touched: usize,
    pub bad_touch: usize,
    /// Cards that become known plays, as (player, order).
    pub playables: Vec<(usize, usize)>,
    pub finesses: usize,
    pub elim: usize,
}

/// A legal clue together with its simulated outcome.
#[derive(Debug, Clone)]
pub struct ClueCandidate {
    pub target: usize,
    pub clue: Clue,
    pub focus: usize,
    pub interpretation: ClueInterpretation,
    pub result: ClueResult,
    pub value: f64,
}

impl ClueCandidate {
    pub fn perform(&self) -> PerformAction {
        perform_clue(self.target, self.clue)
    }
}

/// A clue protecting another player's chop.
#[derive(Debug, Clone, Copy)]
pub struct SaveClue {
    pub target: usize,
    pub clue: Clue,
}

impl SaveClue {
    pub fn perform(&self) -> PerformAction {
        perform_clue(self.target, self.clue)
    }
}

/// A clue correcting a belief that would otherwise cause a misplay or
/// waste a protected slot on trash.
#[derive(Debug, Clone, Copy)]
pub struct FixClue {
    pub target: usize,
    pub clue: Clue,
    pub order: usize,
    /// The holder believes the card is playable right now.
    pub urgent: bool,
    /// The card is actually trash.
    pub trash: bool,
}

impl FixClue {
    pub fn perform(&self) -> PerformAction {
        perform_clue(self.target, self.clue)
    }
}

pub fn perform_clue(target: usize, clue: Clue) -> PerformAction {
    match clue.kind {
        ClueKind::Colour => PerformAction::ColourClue {
            target,
            value: clue.value,
        },
        ClueKind::Rank => PerformAction::RankClue {
            target,
            value: clue.value,
        },
    }
}

/// The clue-scoring formula. Tuned for touch efficiency: finesses and
/// new plays dominate, elimination breaks ties, bad touch is punished
/// on top of the touches it wastes.
pub fn find_clue_value(result: &ClueResult) -> f64 {
    result.finesses as f64
        + 0.5
            * ((result.new_touched as f64 - result.bad_touch as f64)
                + result.playables.len() as f64)
        + 0.01 * result.elim as f64
        - 1.5 * result.bad_touch as f64
}

/// Highest value wins; on an exact tie the earlier candidate stands,
/// so enumeration order (target, then colour, then rank) is part of
/// the contract.
pub fn select_play_clue(candidates: &[ClueCandidate]) -> Option<&ClueCandidate> {
    let mut best: Option<&ClueCandidate> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.value > b.value) {
            best = Some(candidate);
        }
    }
    best
}

/// Orders in `target`'s hand the clue would touch. Empty when the
/// clue is illegal (a colour with no matching cards, for instance).
pub fn touched_orders(game: &Game, target: usize, clue: Clue) -> Vec<usize> {
    game.hand(target)
        .iter()
        .filter(|&order| {
            game.identity_of(order)
                .is_some_and(|id| game.variant().touches(id, clue))
        })
        .collect()
}

/// Cards the table can count as plays: immediately playable
/// inferences, extended to cards that come playable once the earlier
/// plays resolve (committed chain focuses included).
fn known_playables(game: &Game) -> Vec<(usize, usize)> {
    let mut stacks: Vec<u8> = (0..game.variant().suit_count())
        .map(|suit| game.play_stack(suit))
        .collect();
    let mut plays: Vec<(usize, usize)> = Vec::new();
    let mut changed = true;
    while changed {
        changed = false;
        for player in 0..game.num_players() {
            for order in game.hand(player).iter() {
                if plays.contains(&(player, order)) {
                    continue;
                }
                let card = game.common().card(order);
                let playable = card.is_saved()
                    && !card.inferred.is_empty()
                    && card
                        .inferred
                        .iter()
                        .all(|id| stacks[id.suit] + 1 == id.rank);
                if playable {
                    plays.push((player, order));
                    // Only a pinned identity advances the stack for
                    // cards behind it.
                    if let Some(id) = card.inferred.singleton() {
                        stacks[id.suit] = id.rank;
                        changed = true;
                    }
                }
            }
        }
    }
    plays
}

fn finessed_count(game: &Game) -> usize {
    game.common()
        .cards()
        .iter()
        .filter(|card| card.in_hand() && card.finessed)
        .count()
}

/// Simulates giving `clue` and measures what it accomplishes. Returns
/// `None` for illegal or empty clues.
pub fn evaluate_clue(
    game: &Game,
    convention: Convention,
    target: usize,
    clue: Clue,
) -> Option<ClueCandidate> {
    if target == game.our_index() || !game.variant().is_cluable(clue) {
        return None;
    }
    let list = touched_orders(game, target, clue);
    if list.is_empty() {
        return None;
    }

    let plays_before = known_playables(game);
    let finesses_before = finessed_count(game);
    let new_touched = list
        .iter()
        .filter(|&&order| !game.common().card(order).clued)
        .count();

    let mut sim = game.clone();
    let outcome = interpret_clue(&mut sim, convention, game.our_index(), target, clue, &list).ok()?;
    sim.clear_newly_clued(&list);

    // A clue with no coherent reading (or one re-touching a known
    // card) teaches nothing worth a token here; fixes are searched
    // separately.
    if matches!(
        outcome.interpretation,
        ClueInterpretation::Ambiguous | ClueInterpretation::Fix
    ) {
        return None;
    }

    // A play reading must be truthful: the focus has to play right
    // now, or through a committed chain that avoids our own hand.
    if outcome.interpretation == ClueInterpretation::Play {
        let focus_id = game.identity_of(outcome.focus)?;
        let through_chain = !outcome.connections.is_empty()
            && outcome
                .connections
                .iter()
                .all(|connection| connection.player != game.our_index());
        if !game.is_playable(focus_id) && !through_chain {
            return None;
        }
    }

    let playables: Vec<(usize, usize)> = known_playables(&sim)
        .into_iter()
        .filter(|play| !plays_before.contains(play))
        .collect();
    let finesses = finessed_count(&sim).saturating_sub(finesses_before);

    let result = ClueResult {
        new_touched,
        bad_touch: outcome.bad_touch.len(),
        playables,
        finesses,
        elim: outcome.elim,
    };
    let value = find_clue_value(&result);
    Some(ClueCandidate {
        target,
        clue,
        focus: outcome.focus,
        interpretation: outcome.interpretation,
        result,
        value,
    })
}

/// Every viable play clue, enumerated in deterministic order.
pub fn find_play_clues(game: &Game, convention: Convention) -> Vec<ClueCandidate> {
    let mut candidates = Vec::new();
    if game.clue_tokens() == 0 {
        return candidates;
    }
    for step in 1..game.num_players() {
        let target = (game.our_index() + step) % game.num_players();
        for suit in game.variant().clue_colours() {
            if let Some(candidate) = evaluate_clue(game, convention, target, Clue::colour(suit))
                && candidate.interpretation == ClueInterpretation::Play
            {
                candidates.push(candidate);
            }
        }
        for rank in 1..=MAX_RANK as usize {
            if let Some(candidate) = evaluate_clue(game, convention, target, Clue::rank(rank))
                && candidate.interpretation == ClueInterpretation::Play
            {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Per-player save clue for the chop, where one is needed and legal.
pub fn find_save_clues(game: &Game, convention: Convention) -> Vec<Option<SaveClue>> {
    let mut saves = vec![None; game.num_players()];
    if game.clue_tokens() == 0 {
        return saves;
    }
    for player in 0..game.num_players() {
        if player == game.our_index() {
            continue;
        }
        let Some(chop) = crate::convention::find_chop(game, player) else {
            continue;
        };
        let Some(identity) = game.identity_of(chop) else {
            continue;
        };
        let clue = if identity.rank == 5 {
            Some(Clue::rank(5))
        } else if game.is_critical(identity) {
            best_save_shape(game, convention, player, chop, identity)
        } else if identity.rank == 2
            && !game.is_saved_elsewhere(identity, chop)
            && game.visible_count(identity, chop) == 0
        {
            Some(Clue::rank(2))
        } else {
            None
        };
        if let Some(clue) = clue {
            saves[player] = Some(SaveClue {
                target: player,
                clue,
            });
        }
    }
    saves
}

/// Criticals may be saved by rank or colour; take whichever wastes
/// fewer touches, rank first on ties.
fn best_save_shape(
    game: &Game,
    convention: Convention,
    target: usize,
    chop: usize,
    identity: Identity,
) -> Option<Clue> {
    let mut best: Option<(usize, Clue)> = None;
    for clue in [
        Clue::rank(identity.rank as usize),
        Clue::colour(identity.suit),
    ] {
        if !game.variant().is_cluable(clue) {
            continue;
        }
        let Some(candidate) = evaluate_clue(game, convention, target, clue) else {
            continue;
        };
        // A shape that drags the focus off the chop saves nothing.
        if candidate.focus != chop {
            continue;
        }
        let bad = candidate.result.bad_touch;
        if best.is_none_or(|(b, _)| bad < b) {
            best = Some((bad, clue));
        }
    }
    best.map(|(_, clue)| clue)
}

/// Cards other players believe wrongly, with a clue that corrects the
/// belief. Indexed by player.
pub fn find_fix_clues(game: &Game, _convention: Convention) -> Vec<Vec<FixClue>> {
    let mut fixes = vec![Vec::new(); game.num_players()];
    if game.clue_tokens() == 0 {
        return fixes;
    }
    for player in 0..game.num_players() {
        if player == game.our_index() {
            continue;
        }
        for order in game.hand(player).iter() {
            let Some(identity) = game.identity_of(order) else {
                continue;
            };
            let card = game.common().card(order);
            if !card.is_saved() || card.inferred.is_empty() || card.inferred.contains(identity) {
                continue;
            }
            let urgent =
                card.finessed || card.inferred.iter().all(|id| game.is_playable(id));
            let trash = game.is_basic_trash(identity);
            let Some(clue) = distinguishing_clue(game, card.inferred, identity) else {
                event!(
                    target: "hanabi_bot::clue",
                    Level::DEBUG,
                    player, order, "wrong belief has no distinguishing clue"
                );
                continue;
            };
            fixes[player].push(FixClue {
                target: player,
                clue,
                order,
                urgent,
                trash,
            });
        }
    }
    fixes
}

/// A clue that touches the real card but rules out at least one wrong
/// inference.
fn distinguishing_clue(game: &Game, inferred: IdentitySet, identity: Identity) -> Option<Clue> {
    let candidates = [
        Clue::rank(identity.rank as usize),
        Clue::colour(identity.suit),
    ];
    candidates.into_iter().find(|&clue| {
        game.variant().is_cluable(clue)
            && game.variant().touches(identity, clue)
            && inferred.iter().any(|id| !game.variant().touches(id, clue))
    })
}

#[cfg(test)]
mod tests {
    use super::{
        ClueResult, evaluate_clue, find_clue_value, find_play_clues, find_save_clues,
        select_play_clue,
    };
    use crate::convention::Convention;
    use hanabi_core::game::Game;
    use hanabi_core::model::clue::Clue;
    use hanabi_core::model::identity::Identity;
    use hanabi_core::model::variant::Variant;

    fn deal(game: &mut Game, player: usize, identities: &[Option<Identity>]) {
        for &identity in identities {
            let order = game.common().len();
            game.handle_draw(player, order, identity).unwrap();
        }
    }

    fn id(suit: usize, rank: u8) -> Identity {
        Identity::new(suit, rank)
    }

    #[test]
    fn value_formula_weighs_bad_touch_heavily() {
        let clean = ClueResult {
            new_touched: 2,
            bad_touch: 0,
            playables: vec![(1, 5)],
            finesses: 0,
            elim: 3,
        };
        let dirty = ClueResult {
            new_touched: 2,
            bad_touch: 1,
            playables: vec![(1, 5)],
            finesses: 0,
            elim: 3,
        };
        assert!(find_clue_value(&clean) > find_clue_value(&dirty) + 1.0);
    }

    #[test]
    fn value_formula_rises_with_touches_and_playables() {
        let base = ClueResult {
            new_touched: 1,
            bad_touch: 0,
            playables: vec![],
            finesses: 0,
            elim: 2,
        };
        let more_touched = ClueResult {
            new_touched: 2,
            ..base.clone()
        };
        let more_playable = ClueResult {
            playables: vec![(1, 5)],
            ..base.clone()
        };
        assert!(find_clue_value(&more_touched) > find_clue_value(&base));
        assert!(find_clue_value(&more_playable) > find_clue_value(&base));
    }

    #[test]
    fn first_candidate_wins_ties() {
        let result = ClueResult {
            new_touched: 1,
            bad_touch: 0,
            playables: vec![],
            finesses: 0,
            elim: 0,
        };
        let candidates = vec![
            super::ClueCandidate {
                target: 1,
                clue: Clue::colour(0),
                focus: 5,
                interpretation: crate::convention::ClueInterpretation::Play,
                result: result.clone(),
                value: 1.0,
            },
            super::ClueCandidate {
                target: 1,
                clue: Clue::rank(1),
                focus: 5,
                interpretation: crate::convention::ClueInterpretation::Play,
                result,
                value: 1.0,
            },
        ];
        let best = select_play_clue(&candidates).unwrap();
        assert_eq!(best.clue, Clue::colour(0));
    }

    #[test]
    fn playable_one_makes_a_viable_clue() {
        let mut game = Game::new(Variant::no_variant(), 2, 0).unwrap();
        deal(&mut game, 0, &[None, None, None, None, None]);
        deal(
            &mut game,
            1,
            &[Some(id(0, 1)), Some(id(1, 3)), Some(id(2, 4)), Some(id(3, 2)), Some(id(4, 5))],
        );

        let candidate = evaluate_clue(&game, Convention::new(1), 1, Clue::rank(1)).unwrap();
        assert_eq!(candidate.result.new_touched, 1);
        assert_eq!(candidate.result.playables.len(), 1);
        assert_eq!(candidate.result.bad_touch, 0);
        assert!(candidate.value >= 1.0);

        let all = find_play_clues(&game, Convention::new(1));
        assert!(!all.is_empty());
    }

    #[test]
    fn lying_play_clue_is_rejected() {
        let mut game = Game::new(Variant::no_variant(), 2, 0).unwrap();
        deal(&mut game, 0, &[None, None, None, None, None]);
        // Slot 3 green 3 is nowhere near playable.
        deal(
            &mut game,
            1,
            &[Some(id(0, 1)), Some(id(1, 3)), Some(id(2, 3)), Some(id(3, 2)), Some(id(4, 5))],
        );

        assert!(evaluate_clue(&game, Convention::new(1), 1, Clue::colour(2)).is_none());
    }

    #[test]
    fn critical_chop_gets_a_save_clue() {
        let mut game = Game::new(Variant::no_variant(), 2, 0).unwrap();
        deal(&mut game, 0, &[None, None, None, None, None]);
        deal(
            &mut game,
            1,
            &[Some(id(1, 4)), Some(id(1, 4)), Some(id(2, 3)), Some(id(3, 1)), Some(id(4, 2))],
        );
        game.on_discard(1, 5, id(1, 4), false).unwrap();
        deal(&mut game, 1, &[Some(id(0, 3))]);

        let saves = find_save_clues(&game, Convention::new(1));
        let save = saves[1].expect("critical chop needs a save");
        assert_eq!(save.target, 1);
    }

    #[test]
    fn untroubled_chop_needs_no_save() {
        let mut game = Game::new(Variant::no_variant(), 2, 0).unwrap();
        deal(&mut game, 0, &[None, None, None, None, None]);
        deal(
            &mut game,
            1,
            &[Some(id(1, 3)), Some(id(0, 1)), Some(id(2, 3)), Some(id(3, 1)), Some(id(4, 2))],
        );
        let saves = find_save_clues(&game, Convention::new(1));
        assert!(saves[1].is_none());
    }
}
