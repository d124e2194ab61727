use core::fmt;
use serde::{Deserialize, Serialize};

/// Wire encoding uses 0 for colour and 1 for rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ClueKind {
    Colour,
    Rank,
}

impl TryFrom<u8> for ClueKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClueKind::Colour),
            1 => Ok(ClueKind::Rank),
            other => Err(format!("unknown clue kind {other}")),
        }
    }
}

impl From<ClueKind> for u8 {
    fn from(kind: ClueKind) -> u8 {
        match kind {
            ClueKind::Colour => 0,
            ClueKind::Rank => 1,
        }
    }
}

/// A signal naming a colour (by suit index) or a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clue {
    #[serde(rename = "type")]
    pub kind: ClueKind,
    pub value: usize,
}

impl Clue {
    pub const fn colour(value: usize) -> Self {
        Self {
            kind: ClueKind::Colour,
            value,
        }
    }

    pub const fn rank(value: usize) -> Self {
        Self {
            kind: ClueKind::Rank,
            value,
        }
    }
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ClueKind::Colour => write!(f, "colour {}", self.value),
            ClueKind::Rank => write!(f, "rank {}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clue, ClueKind};

    #[test]
    fn wire_roundtrip() {
        let clue = Clue::rank(2);
        let json = serde_json::to_string(&clue).unwrap();
        assert_eq!(json, r#"{"type":1,"value":2}"#);
        let back: Clue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clue);
    }

    #[test]
    fn unknown_kind_rejected() {
        let result = serde_json::from_str::<Clue>(r#"{"type":7,"value":2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Clue::colour(3).kind, ClueKind::Colour);
        assert_eq!(Clue::rank(5).kind, ClueKind::Rank);
    }
}
