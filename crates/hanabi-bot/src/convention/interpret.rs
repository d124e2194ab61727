use hanabi_core::game::{Game, GameError};
use hanabi_core::model::clue::{Clue, ClueKind};
use hanabi_core::model::identity::{Identity, IdentitySet};
use tracing::{Level, event};

use super::focus::{Focus, determine_focus, find_bad_touch, find_chop, find_finesse, find_prompt};
use super::{Convention, stall_severity};
use crate::bot::priority::order_1s;

/// How a connecting card is expected to arrive on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Already publicly known (clued and identified).
    Known,
    /// A previously-clued card pointed out again.
    Prompt,
    /// A blind play from finesse position.
    Finesse,
}

/// One link in the chain between the play stacks and a clue's focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub kind: ConnectionKind,
    pub player: usize,
    pub order: usize,
    pub identity: Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClueInterpretation {
    Play,
    Save,
    Fix,
    /// No consistent reading; the focus keeps only touch information.
    Ambiguous,
}

/// Everything a clue changed, for logging and clue scoring.
#[derive(Debug, Clone)]
pub struct ClueOutcome {
    pub interpretation: ClueInterpretation,
    pub focus: usize,
    pub focus_on_chop: bool,
    pub bad_touch: Vec<usize>,
    pub connections: Vec<Connection>,
    /// `possible` entries removed across the common view.
    pub elim: usize,
}

/// Interprets a clue under the active convention level and applies the
/// resulting narrowing to every perspective.
pub fn interpret_clue(
    game: &mut Game,
    convention: Convention,
    giver: usize,
    target: usize,
    clue: Clue,
    list: &[usize],
) -> Result<ClueOutcome, GameError> {
    let Focus {
        order: focus,
        on_chop,
    } = determine_focus(game, target, list, true).ok_or(GameError::EmptyClue)?;
    // Judged from the giver's position before the token is spent.
    let severity = stall_severity(game, giver);

    let before = game.common().card(focus).clone();
    let was_known_playable = before.is_saved()
        && !before.inferred.is_empty()
        && before.inferred.iter().all(|id| game.is_playable(id));
    let was_known_trash = before.possible.iter().all(|id| game.is_basic_trash(id));

    let possible_before = possible_total(game);
    game.apply_clue_touch(target, clue, list)?;
    let elim = possible_before.saturating_sub(possible_total(game));

    if on_chop && game.common().card(focus).newly_clued {
        game.common_mut().card_mut(focus).chop_when_first_clued = true;
        for player in 0..game.num_players() {
            game.view_mut(player).card_mut(focus).chop_when_first_clued = true;
        }
    }

    let bad_touch = find_bad_touch(game, list, focus);

    if was_known_playable || was_known_trash {
        event!(
            target: "hanabi_bot::clue",
            Level::DEBUG,
            giver, target, focus, "clue re-touches a known card, reading as fix"
        );
        return Ok(ClueOutcome {
            interpretation: ClueInterpretation::Fix,
            focus,
            focus_on_chop: on_chop,
            bad_touch,
            connections: Vec::new(),
            elim,
        });
    }

    // Play readings: directly playable identities, plus identities
    // whose missing lower ranks are all reachable through connections.
    let mut play_ids = IdentitySet::EMPTY;
    let mut chains: Vec<(Identity, Vec<Connection>)> = Vec::new();
    for id in game.common().card(focus).possible.iter() {
        let away = game.playable_away(id);
        if away == 0 {
            play_ids = play_ids.with(id);
        } else if away > 0 && convention.level >= Convention::FINESSE {
            if let Some(chain) = find_connections(game, giver, target, id, focus) {
                play_ids = play_ids.with(id);
                chains.push((id, chain));
            }
        }
    }

    let mut save_ids = IdentitySet::EMPTY;
    if on_chop {
        for id in game.common().card(focus).possible.iter() {
            if save_applicable(game, id, clue, focus) {
                save_ids = save_ids.with(id);
            }
        }
    }

    let union = play_ids.union(save_ids);
    if union.is_empty() {
        // A giver with no better options gets the benefit of the
        // doubt; otherwise the clue is genuinely surprising.
        if severity > 0 {
            event!(
                target: "hanabi_bot::clue",
                Level::DEBUG,
                giver, target, focus, severity, "contentless clue from a stall position"
            );
        } else {
            event!(
                target: "hanabi_bot::clue",
                Level::WARN,
                giver, target, focus, "no consistent reading, keeping touch information only"
            );
        }
        game.common_mut().card_mut(focus).reset_inferences();
        return Ok(ClueOutcome {
            interpretation: ClueInterpretation::Ambiguous,
            focus,
            focus_on_chop: on_chop,
            bad_touch,
            connections: Vec::new(),
            elim,
        });
    }

    if !game.common_mut().card_mut(focus).intersect_inferred(union) {
        // Unreachable when the union was built from `possible`.
        event!(target: "hanabi_bot::clue", Level::WARN, focus, "focus narrowing rejected");
    }
    for player in 0..game.num_players() {
        game.view_mut(player).card_mut(focus).intersect_inferred(union);
    }

    // Commit a connection chain only when it is the sole reading;
    // otherwise later turns will disambiguate.
    let mut connections = Vec::new();
    if save_ids.is_empty()
        && union.is_singleton()
        && let Some((_, chain)) = chains.first()
    {
        for connection in chain {
            apply_connection(game, *connection);
            event!(
                target: "hanabi_bot::clue",
                Level::INFO,
                player = connection.player,
                order = connection.order,
                identity = %connection.identity,
                kind = ?connection.kind,
                "connection committed"
            );
        }
        connections = chain.clone();
    } else if !chains.is_empty() {
        event!(
            target: "hanabi_bot::clue",
            Level::DEBUG,
            focus, readings = union.len(), "multiple readings, deferring connections"
        );
    }

    let interpretation = if save_ids.is_empty() {
        ClueInterpretation::Play
    } else {
        ClueInterpretation::Save
    };
    event!(
        target: "hanabi_bot::clue",
        Level::DEBUG,
        giver, target, focus, ?interpretation, elim, bad = bad_touch.len(), "clue interpreted"
    );

    Ok(ClueOutcome {
        interpretation,
        focus,
        focus_on_chop: on_chop,
        bad_touch,
        connections,
        elim,
    })
}

/// A revealed play. Returns true when the revealed identity
/// contradicts the prior inference and a rewind is warranted.
pub fn interpret_play(
    game: &mut Game,
    convention: Convention,
    player: usize,
    order: usize,
    identity: Identity,
) -> Result<bool, GameError> {
    if !game.common().knows(order) {
        return Err(GameError::UnknownOrder { player, order });
    }
    let card = game.common().card(order);
    let contradiction = !card.rewinded && !card.inferred.contains(identity);
    if contradiction {
        event!(
            target: "hanabi_bot::rewind",
            Level::WARN,
            player, order, identity = %identity, "play contradicts prior inference"
        );
    }
    if convention.level >= Convention::BASIC_CM && identity.rank == 1 {
        apply_order_chop_move(game, player, order);
    }
    game.on_play(player, order, identity)?;
    Ok(contradiction)
}

/// Playing a later 1 out of freshness order signals the player at the
/// matching seat distance to shield their chop.
fn apply_order_chop_move(game: &mut Game, player: usize, order: usize) {
    let ones: Vec<usize> = game
        .hand(player)
        .iter()
        .filter(|&o| {
            let card = game.common().card(o);
            !card.clues().is_empty() && card.clues().iter().all(|&clue| clue == Clue::rank(1))
        })
        .collect();
    let ordered = order_1s(game, &ones);
    let Some(position) = ordered.iter().position(|&o| o == order) else {
        return;
    };
    if position == 0 || position >= game.num_players() {
        return;
    }
    let target = (player + position) % game.num_players();
    if target == player {
        return;
    }
    let Some(chop) = find_chop(game, target) else {
        return;
    };
    game.common_mut().card_mut(chop).chop_moved = true;
    for viewer in 0..game.num_players() {
        game.view_mut(viewer).card_mut(chop).chop_moved = true;
    }
    event!(
        target: "hanabi_bot::clue",
        Level::INFO,
        player, order, target_player = target, chop, "out-of-order 1 read as a chop move"
    );
}

/// A discard (deliberate or bombed). Contradiction is only meaningful
/// for cards the conventions were protecting.
pub fn interpret_discard(
    game: &mut Game,
    player: usize,
    order: usize,
    identity: Identity,
    failed: bool,
) -> Result<bool, GameError> {
    if !game.common().knows(order) {
        return Err(GameError::UnknownOrder { player, order });
    }
    let card = game.common().card(order);
    let contradiction = !card.rewinded && card.is_saved() && !card.inferred.contains(identity);
    if contradiction {
        event!(
            target: "hanabi_bot::rewind",
            Level::WARN,
            player, order, identity = %identity, failed, "discard contradicts prior inference"
        );
    }
    game.on_discard(player, order, identity, failed)?;
    Ok(contradiction)
}

fn possible_total(game: &Game) -> usize {
    game.common()
        .cards()
        .iter()
        .filter(|card| card.in_hand())
        .map(|card| card.possible.len())
        .sum()
}

fn apply_connection(game: &mut Game, connection: Connection) {
    let single = IdentitySet::single(connection.identity);
    let common = game.common_mut().card_mut(connection.order);
    if connection.kind == ConnectionKind::Finesse {
        common.finessed = true;
    }
    common.intersect_inferred(single);
    for player in 0..game.num_players() {
        let card = game.view_mut(player).card_mut(connection.order);
        if connection.kind == ConnectionKind::Finesse {
            card.finessed = true;
        }
        card.intersect_inferred(single);
    }
}

/// Whether a chop clue can be read as saving this identity.
fn save_applicable(game: &Game, identity: Identity, clue: Clue, focus: usize) -> bool {
    if game.is_basic_trash(identity) {
        return false;
    }
    if identity.rank == 5 {
        return clue.kind == ClueKind::Rank && clue.value == 5;
    }
    if game.is_critical(identity) {
        return true;
    }
    identity.rank == 2
        && clue.kind == ClueKind::Rank
        && clue.value == 2
        && !game.is_saved_elsewhere(identity, focus)
        && game.visible_count(identity, focus) == 0
}

/// Searches for a full chain covering every missing rank below
/// `identity`. Fails if any rank has no reachable connecting card.
fn find_connections(
    game: &Game,
    giver: usize,
    target: usize,
    identity: Identity,
    focus: usize,
) -> Option<Vec<Connection>> {
    let mut chain = Vec::new();
    let mut ignore = vec![focus];
    let stack = game.play_stack(identity.suit);
    for rank in (stack + 1)..identity.rank {
        let step = Identity::new(identity.suit, rank);
        let connection = find_connecting(game, giver, target, step, &ignore)?;
        ignore.push(connection.order);
        chain.push(connection);
    }
    Some(chain)
}

/// One connecting card for `identity`: known copies first, then
/// prompts and finesses in turn order after the giver. Hands we can
/// see must actually hold the card; our own hand is taken on faith.
fn find_connecting(
    game: &Game,
    giver: usize,
    target: usize,
    identity: Identity,
    ignore: &[usize],
) -> Option<Connection> {
    for player in 0..game.num_players() {
        for order in game.hand(player).iter() {
            if ignore.contains(&order) {
                continue;
            }
            let card = game.common().card(order);
            let known = card.is_saved()
                && (game.identity_of(order) == Some(identity)
                    || card.identity_known() == Some(identity));
            if known {
                return Some(Connection {
                    kind: ConnectionKind::Known,
                    player,
                    order,
                    identity,
                });
            }
        }
    }

    for step in 1..game.num_players() {
        let player = (giver + step) % game.num_players();
        if player == target {
            continue;
        }
        let unseen = player == game.our_index();
        if let Some(order) = find_prompt(game, player, identity, ignore) {
            if unseen || game.identity_of(order) == Some(identity) {
                return Some(Connection {
                    kind: ConnectionKind::Prompt,
                    player,
                    order,
                    identity,
                });
            }
            // The leftmost matching clued card is the wrong copy; a
            // finesse behind it would misfire, so skip this player.
            continue;
        }
        if let Some(order) = find_finesse(game, player, ignore)
            && (unseen || game.identity_of(order) == Some(identity))
        {
            return Some(Connection {
                kind: ConnectionKind::Finesse,
                player,
                order,
                identity,
            });
        }
    }
    None
}
