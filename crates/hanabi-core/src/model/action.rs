use crate::model::clue::Clue;
use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};

/// One step of the ordered action stream delivered by the transport.
///
/// Hidden identities (the bot's own draws) arrive as `suit_index: -1`,
/// `rank: -1`; `identity()` maps those to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    Draw {
        player_index: usize,
        order: usize,
        suit_index: i32,
        rank: i32,
    },
    #[serde(rename_all = "camelCase")]
    Clue {
        giver: usize,
        target: usize,
        clue: Clue,
        list: Vec<usize>,
    },
    #[serde(rename_all = "camelCase")]
    Play {
        player_index: usize,
        order: usize,
        suit_index: i32,
        rank: i32,
    },
    #[serde(rename_all = "camelCase")]
    Discard {
        player_index: usize,
        order: usize,
        suit_index: i32,
        rank: i32,
        failed: bool,
    },
    #[serde(rename_all = "camelCase")]
    Turn {
        num: u32,
        current_player_index: i32,
    },
    GameOver,
    #[serde(rename_all = "camelCase")]
    Rewind {
        player_index: usize,
        order: usize,
        suit_index: i32,
        rank: i32,
    },
}

pub(crate) fn identity_from_wire(suit_index: i32, rank: i32) -> Option<Identity> {
    if suit_index >= 0 && rank >= 1 {
        Some(Identity::new(suit_index as usize, rank as u8))
    } else {
        None
    }
}

impl Action {
    /// The revealed identity carried by a draw/play/discard/rewind
    /// frame, when visible.
    pub fn identity(&self) -> Option<Identity> {
        match *self {
            Action::Draw {
                suit_index, rank, ..
            }
            | Action::Play {
                suit_index, rank, ..
            }
            | Action::Discard {
                suit_index, rank, ..
            }
            | Action::Rewind {
                suit_index, rank, ..
            } => identity_from_wire(suit_index, rank),
            _ => None,
        }
    }
}

/// The single action the bot emits on its own turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PerformAction {
    /// `target` is a card order in our own hand.
    Play { target: usize },
    /// `target` is a card order in our own hand.
    Discard { target: usize },
    /// `target` is a player index; `value` a suit index.
    ColourClue { target: usize, value: usize },
    /// `target` is a player index; `value` a rank.
    RankClue { target: usize, value: usize },
}

#[cfg(test)]
mod tests {
    use super::{Action, PerformAction};
    use crate::model::clue::{Clue, ClueKind};
    use crate::model::identity::Identity;

    #[test]
    fn clue_frame_parses() {
        let json = r#"{"type":"clue","clue":{"type":1,"value":1},"giver":0,"list":[8,9],"target":1}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        match action {
            Action::Clue {
                giver,
                target,
                clue,
                list,
            } => {
                assert_eq!(giver, 0);
                assert_eq!(target, 1);
                assert_eq!(clue, Clue { kind: ClueKind::Rank, value: 1 });
                assert_eq!(list, vec![8, 9]);
            }
            other => panic!("expected clue, got {other:?}"),
        }
    }

    #[test]
    fn hidden_draw_has_no_identity() {
        let json = r#"{"type":"draw","playerIndex":0,"order":2,"suitIndex":-1,"rank":-1}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(action.identity(), None);
    }

    #[test]
    fn visible_draw_carries_identity() {
        let json = r#"{"type":"draw","playerIndex":1,"order":5,"suitIndex":1,"rank":2}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(action.identity(), Some(Identity::new(1, 2)));
    }

    #[test]
    fn discard_frame_roundtrips() {
        let action = Action::Discard {
            player_index: 2,
            order: 12,
            suit_index: 0,
            rank: 3,
            failed: true,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""type":"discard""#));
        assert!(json.contains(r#""failed":true"#));
        assert_eq!(serde_json::from_str::<Action>(&json).unwrap(), action);
    }

    #[test]
    fn turn_and_game_over_parse() {
        let turn: Action =
            serde_json::from_str(r#"{"type":"turn","num":1,"currentPlayerIndex":1}"#).unwrap();
        assert_eq!(
            turn,
            Action::Turn {
                num: 1,
                current_player_index: 1
            }
        );
        let over: Action = serde_json::from_str(r#"{"type":"gameOver"}"#).unwrap();
        assert_eq!(over, Action::GameOver);
    }

    #[test]
    fn perform_action_serializes_with_tag() {
        let action = PerformAction::RankClue { target: 2, value: 5 };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""type":"rankClue""#));
    }
}
