//! Drives one game from an ordered action stream: applies each frame,
//! asks the decision ladder for a move on our turn, and rewinds the
//! whole game when a revealed card contradicts prior inference.

use hanabi_core::game::{Game, GameError};
use hanabi_core::model::action::{Action, PerformAction};
use hanabi_core::model::identity::Identity;
use hanabi_core::model::variant::Variant;
use tracing::{Level, event};

use crate::bot::take_action;
use crate::convention::{Convention, interpret_clue, interpret_discard, interpret_play};

/// A human-readable annotation for one of our own cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub turn: u32,
    pub order: usize,
    pub text: String,
}

pub struct Session {
    game: Game,
    convention: Convention,
    log: Vec<Action>,
    notes: Vec<Note>,
    /// Replaying history; suppress actions and notes.
    catching_up: bool,
    game_over: bool,
}

impl Session {
    pub fn new(
        variant: Variant,
        num_players: usize,
        our_index: usize,
        convention: Convention,
    ) -> Result<Self, GameError> {
        Ok(Self {
            game: Game::new(variant, num_players, our_index)?,
            convention,
            log: Vec::new(),
            notes: Vec::new(),
            catching_up: false,
            game_over: false,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Applies one frame from the transport. Returns the action to
    /// perform when the frame hands us the turn. Errors here mean the
    /// stream can no longer be trusted; the caller should disconnect.
    pub fn handle_action(&mut self, action: &Action) -> Result<Option<PerformAction>, GameError> {
        if self.game_over {
            return Ok(None);
        }
        self.log.push(action.clone());

        match *action {
            Action::Draw {
                player_index,
                order,
                ..
            } => {
                self.game.handle_draw(player_index, order, action.identity())?;
            }
            Action::Clue {
                giver,
                target,
                clue,
                ref list,
            } => {
                interpret_clue(&mut self.game, self.convention, giver, target, clue, list)?;
                self.game.clear_newly_clued(list);
            }
            Action::Play {
                player_index,
                order,
                ..
            } => {
                let identity = action
                    .identity()
                    .ok_or(GameError::MissingIdentity { order })?;
                if interpret_play(&mut self.game, self.convention, player_index, order, identity)? {
                    self.rewind(player_index, order, identity)?;
                }
            }
            Action::Discard {
                player_index,
                order,
                failed,
                ..
            } => {
                let identity = action
                    .identity()
                    .ok_or(GameError::MissingIdentity { order })?;
                if interpret_discard(&mut self.game, player_index, order, identity, failed)? {
                    self.rewind(player_index, order, identity)?;
                }
            }
            Action::Turn {
                num,
                current_player_index,
            } => {
                if current_player_index >= 0 {
                    let current = current_player_index as usize;
                    self.game.set_turn(num, current);
                    if current == self.game.our_index() && !self.catching_up {
                        let chosen = take_action(&self.game, self.convention);
                        self.refresh_notes(num);
                        return Ok(Some(chosen));
                    }
                }
            }
            Action::GameOver => {
                self.game_over = true;
                event!(
                    target: "hanabi_bot::action",
                    Level::INFO,
                    score = self.game.score(),
                    strikes = self.game.strikes(),
                    "game over"
                );
            }
            Action::Rewind { order, .. } => {
                // Only ever injected by `rewind` itself: pin the card.
                let identity = action
                    .identity()
                    .ok_or(GameError::MissingIdentity { order })?;
                self.game.reveal(order, identity);
                self.game.common_mut().card_mut(order).finessed = true;
                self.game.common_mut().card_mut(order).rewinded = true;
                for player in 0..self.game.num_players() {
                    let card = self.game.view_mut(player).card_mut(order);
                    card.finessed = true;
                    card.rewinded = true;
                }
                self.game.refresh_elimination();
            }
        }
        Ok(None)
    }

    /// Replays the whole game with the surprising card's identity
    /// pinned right after its draw. Deterministic, and idempotent via
    /// the `rewinded` flag.
    fn rewind(
        &mut self,
        player: usize,
        order: usize,
        identity: Identity,
    ) -> Result<(), GameError> {
        if self.game.common().knows(order) && self.game.common().card(order).rewinded {
            return Ok(());
        }
        let draw_index = self
            .log
            .iter()
            .position(|frame| matches!(*frame, Action::Draw { order: o, .. } if o == order))
            .ok_or(GameError::UnknownOrder { player, order })?;
        event!(
            target: "hanabi_bot::rewind",
            Level::INFO,
            player, order, identity = %identity, frames = self.log.len(),
            "replaying with pinned identity"
        );

        let mut frames: Vec<Action> = self.log[..=draw_index].to_vec();
        frames.push(Action::Rewind {
            player_index: player,
            order,
            suit_index: identity.suit as i32,
            rank: identity.rank as i32,
        });
        frames.extend_from_slice(&self.log[draw_index + 1..]);

        let mut fresh = Session::new(
            self.game.variant().clone(),
            self.game.num_players(),
            self.game.our_index(),
            self.convention,
        )?;
        fresh.catching_up = true;
        for frame in &frames {
            fresh.handle_action(frame)?;
        }
        fresh.catching_up = self.catching_up;
        fresh.notes = std::mem::take(&mut self.notes);
        *self = fresh;
        Ok(())
    }

    /// Regenerates notes for our protected cards at the start of our
    /// turn.
    fn refresh_notes(&mut self, turn: u32) {
        for order in self.game.our_hand().iter() {
            let card = self.game.our_view().card(order);
            if !card.is_saved() {
                continue;
            }
            let mut text = card
                .inferred
                .iter()
                .map(|id| self.game.variant().short_name(id))
                .collect::<Vec<_>>()
                .join(",");
            if card.finessed {
                text.push_str(" [f]");
            }
            if card.chop_moved {
                text.push_str(" [cm]");
            }
            self.notes.push(Note { turn, order, text });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::convention::Convention;
    use hanabi_core::game::GameError;
    use hanabi_core::model::action::{Action, PerformAction};
    use hanabi_core::model::clue::Clue;
    use hanabi_core::model::variant::Variant;

    fn draw(player_index: usize, order: usize, suit_index: i32, rank: i32) -> Action {
        Action::Draw {
            player_index,
            order,
            suit_index,
            rank,
        }
    }

    fn session() -> Session {
        Session::new(Variant::no_variant(), 2, 0, Convention::new(1)).unwrap()
    }

    fn deal_opening(session: &mut Session) {
        // Our hand is hidden; partner's is visible.
        for order in 0..5 {
            session.handle_action(&draw(0, order, -1, -1)).unwrap();
        }
        let partner = [(0, 1), (1, 3), (2, 4), (3, 2), (4, 5)];
        for (i, (suit, rank)) in partner.into_iter().enumerate() {
            session.handle_action(&draw(1, 5 + i, suit, rank)).unwrap();
        }
    }

    #[test]
    fn turn_frame_yields_an_action() {
        let mut session = session();
        deal_opening(&mut session);
        let action = session
            .handle_action(&Action::Turn {
                num: 0,
                current_player_index: 0,
            })
            .unwrap();
        assert!(action.is_some());
    }

    #[test]
    fn other_players_turn_yields_nothing() {
        let mut session = session();
        deal_opening(&mut session);
        let action = session
            .handle_action(&Action::Turn {
                num: 0,
                current_player_index: 1,
            })
            .unwrap();
        assert!(action.is_none());
    }

    #[test]
    fn missing_identity_on_play_is_fatal() {
        let mut session = session();
        deal_opening(&mut session);
        let result = session.handle_action(&Action::Play {
            player_index: 1,
            order: 5,
            suit_index: -1,
            rank: -1,
        });
        assert_eq!(result, Err(GameError::MissingIdentity { order: 5 }));
    }

    #[test]
    fn play_frame_with_undrawn_order_is_fatal() {
        let mut session = session();
        deal_opening(&mut session);
        let result = session.handle_action(&Action::Play {
            player_index: 1,
            order: 99,
            suit_index: 0,
            rank: 1,
        });
        assert_eq!(result, Err(GameError::UnknownOrder { player: 1, order: 99 }));
    }

    #[test]
    fn surprising_discard_rewinds_and_recovers() {
        let mut session = session();
        // Partner's chop is a yellow 3.
        for order in 0..5 {
            session.handle_action(&draw(0, order, -1, -1)).unwrap();
        }
        let partner = [(1, 3), (0, 4), (2, 4), (3, 2), (4, 5)];
        for (i, (suit, rank)) in partner.into_iter().enumerate() {
            session.handle_action(&draw(1, 5 + i, suit, rank)).unwrap();
        }

        // A yellow clue on the chop reads as yellow 1: the common view
        // now believes order 5 is playable.
        session
            .handle_action(&Action::Clue {
                giver: 0,
                target: 1,
                clue: Clue::colour(1),
                list: vec![5],
            })
            .unwrap();
        let inferred = session.game().common().card(5).inferred;
        assert_eq!(
            inferred.singleton(),
            Some(hanabi_core::model::identity::Identity::new(1, 1))
        );

        // Partner plays it and bombs: the server reports a failed
        // discard revealing yellow 3, contradicting the inference.
        session
            .handle_action(&Action::Discard {
                player_index: 1,
                order: 5,
                suit_index: 1,
                rank: 3,
                failed: true,
            })
            .unwrap();
        assert!(session.game().common().card(5).rewinded);
        assert_eq!(session.game().strikes(), 1);
        assert!(session.game().invariants_hold());
    }

    #[test]
    fn game_over_stops_processing() {
        let mut session = session();
        deal_opening(&mut session);
        session.handle_action(&Action::GameOver).unwrap();
        assert!(session.is_over());
        let ignored = session
            .handle_action(&Action::Turn {
                num: 3,
                current_player_index: 0,
            })
            .unwrap();
        assert!(ignored.is_none());
    }

    #[test]
    fn notes_written_on_our_turn() {
        let mut session = session();
        deal_opening(&mut session);
        session
            .handle_action(&Action::Clue {
                giver: 1,
                target: 0,
                clue: Clue::rank(1),
                list: vec![2],
            })
            .unwrap();
        session
            .handle_action(&Action::Turn {
                num: 1,
                current_player_index: 0,
            })
            .unwrap();
        let notes = session.notes();
        assert!(!notes.is_empty());
        assert_eq!(notes[0].order, 2);
        assert!(notes[0].text.contains('1'));
    }

    #[test]
    fn emitted_action_is_legal() {
        let mut session = session();
        deal_opening(&mut session);
        session
            .handle_action(&Action::Clue {
                giver: 1,
                target: 0,
                clue: Clue::rank(1),
                list: vec![2],
            })
            .unwrap();
        let action = session
            .handle_action(&Action::Turn {
                num: 1,
                current_player_index: 0,
            })
            .unwrap()
            .unwrap();
        // The clued 1 is a known play.
        assert_eq!(action, PerformAction::Play { target: 2 });
    }
}
