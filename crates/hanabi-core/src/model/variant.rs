use crate::model::clue::{Clue, ClueKind};
use crate::model::identity::{Identity, IdentitySet, MAX_RANK, MAX_SUITS};
use serde::Deserialize;

/// How a suit reacts to colour clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourResponse {
    /// Touched by its own colour only.
    Matching,
    /// Touched by every colour clue (rainbow-like).
    Every,
    /// Never touched by a colour clue (white-like).
    Untouched,
}

/// How a suit reacts to rank clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankResponse {
    Matching,
    /// Touched by every rank clue (pink-like).
    Every,
    /// Never touched by a rank clue (null/brown-like).
    Untouched,
}

#[derive(Debug, Clone)]
pub struct SuitDef {
    name: String,
    colour: ColourResponse,
    rank: RankResponse,
    dark: bool,
}

impl SuitDef {
    /// Derives clue behaviour from the suit's published name, the same
    /// table the upstream variant registry uses.
    pub fn from_name(name: &str) -> Self {
        let colour = if name.contains("Rainbow") || name.contains("Omni") || name.contains("Prism")
        {
            ColourResponse::Every
        } else if name.contains("White")
            || name.contains("Gray")
            || name.contains("Light Pink")
            || name.contains("Null")
        {
            ColourResponse::Untouched
        } else {
            ColourResponse::Matching
        };

        let rank = if (name.contains("Pink") && !name.contains("Light Pink"))
            || name.contains("Omni")
            || name.contains("Light Pink")
        {
            RankResponse::Every
        } else if name.contains("Null") || name.contains("Brown") || name.contains("Muddy") {
            RankResponse::Untouched
        } else {
            RankResponse::Matching
        };

        let dark = name.starts_with("Dark")
            || name.starts_with("Gray")
            || name.starts_with("Cocoa")
            || name == "Black";

        Self {
            name: name.to_string(),
            colour,
            rank,
            dark,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour_response(&self) -> ColourResponse {
        self.colour
    }

    pub fn rank_response(&self) -> RankResponse {
        self.rank
    }

    /// Dark suits have one physical copy per identity.
    pub fn is_dark(&self) -> bool {
        self.dark
    }
}

/// Transport descriptor for a variant, as published by the game server.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantDescriptor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub suits: Vec<String>,
}

/// The enumerable identity space of one game: suit list plus per-suit
/// clue behaviour. Treated as opaque configuration by everything else.
#[derive(Debug, Clone)]
pub struct Variant {
    name: String,
    suits: Vec<SuitDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    SuitCountOutOfRange(usize),
    Json(String),
}

impl Variant {
    pub fn new(name: &str, suit_names: &[&str]) -> Result<Self, VariantError> {
        if !(4..=MAX_SUITS).contains(&suit_names.len()) {
            return Err(VariantError::SuitCountOutOfRange(suit_names.len()));
        }
        Ok(Self {
            name: name.to_string(),
            suits: suit_names.iter().map(|s| SuitDef::from_name(s)).collect(),
        })
    }

    /// The five-suit baseline with no special behaviour.
    pub fn no_variant() -> Self {
        Self::new("No Variant", &["Red", "Yellow", "Green", "Blue", "Purple"])
            .expect("baseline suit list is valid")
    }

    pub fn from_descriptor(descriptor: &VariantDescriptor) -> Result<Self, VariantError> {
        let names: Vec<&str> = descriptor.suits.iter().map(String::as_str).collect();
        Self::new(&descriptor.name, &names)
    }

    pub fn from_json(json: &str) -> Result<Self, VariantError> {
        let descriptor: VariantDescriptor =
            serde_json::from_str(json).map_err(|e| VariantError::Json(e.to_string()))?;
        Self::from_descriptor(&descriptor)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suits(&self) -> &[SuitDef] {
        &self.suits
    }

    pub fn suit_count(&self) -> usize {
        self.suits.len()
    }

    pub fn identities(&self) -> impl Iterator<Item = Identity> + '_ {
        (0..self.suits.len())
            .flat_map(|suit| (1..=MAX_RANK).map(move |rank| Identity::new(suit, rank)))
    }

    pub fn all_identities(&self) -> IdentitySet {
        IdentitySet::all(self.suit_count())
    }

    /// Physical copies of an identity in the deck.
    pub fn copies(&self, identity: Identity) -> u8 {
        if self.suits[identity.suit].is_dark() {
            return 1;
        }
        match identity.rank {
            1 => 3,
            2 | 3 | 4 => 2,
            5 => 1,
            _ => 0,
        }
    }

    pub fn deck_size(&self) -> usize {
        self.identities().map(|id| self.copies(id) as usize).sum()
    }

    /// Suit indices that can be named directly by a colour clue.
    pub fn clue_colours(&self) -> Vec<usize> {
        self.suits
            .iter()
            .enumerate()
            .filter(|(_, suit)| suit.colour_response() == ColourResponse::Matching)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_cluable(&self, clue: Clue) -> bool {
        match clue.kind {
            ClueKind::Colour => self
                .suits
                .get(clue.value)
                .is_some_and(|suit| suit.colour_response() == ColourResponse::Matching),
            ClueKind::Rank => (1..=MAX_RANK as usize).contains(&clue.value),
        }
    }

    /// Whether `clue` touches a card of the given identity.
    pub fn touches(&self, identity: Identity, clue: Clue) -> bool {
        let suit = &self.suits[identity.suit];
        match clue.kind {
            ClueKind::Colour => match suit.colour_response() {
                ColourResponse::Matching => identity.suit == clue.value,
                ColourResponse::Every => true,
                ColourResponse::Untouched => false,
            },
            ClueKind::Rank => match suit.rank_response() {
                RankResponse::Matching => identity.rank as usize == clue.value,
                RankResponse::Every => true,
                RankResponse::Untouched => false,
            },
        }
    }

    pub fn touched_set(&self, clue: Clue) -> IdentitySet {
        self.identities()
            .filter(|&identity| self.touches(identity, clue))
            .collect()
    }

    /// Short label like `r1`, used in logs and notes.
    pub fn short_name(&self, identity: Identity) -> String {
        let initial = self.suits[identity.suit]
            .name()
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('?');
        format!("{}{}", initial, identity.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColourResponse, RankResponse, SuitDef, Variant};
    use crate::model::clue::Clue;
    use crate::model::identity::Identity;

    fn rainbow() -> Variant {
        Variant::new("Rainbow (5 Suits)", &["Red", "Yellow", "Green", "Blue", "Rainbow"]).unwrap()
    }

    #[test]
    fn rainbow_touched_by_every_colour() {
        let variant = rainbow();
        let rainbow_one = Identity::new(4, 1);
        assert!(variant.touches(rainbow_one, Clue::colour(0)));
        assert!(variant.touches(rainbow_one, Clue::colour(3)));
        assert!(!variant.is_cluable(Clue::colour(4)));
        assert_eq!(variant.clue_colours(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn white_untouched_by_colour() {
        let variant =
            Variant::new("White (5 Suits)", &["Red", "Yellow", "Green", "Blue", "White"]).unwrap();
        let white_one = Identity::new(4, 1);
        assert!(!variant.touches(white_one, Clue::colour(0)));
        assert!(!variant.is_cluable(Clue::colour(4)));
    }

    #[test]
    fn pink_touched_by_every_rank_but_colour_cluable() {
        let variant =
            Variant::new("Pink (5 Suits)", &["Red", "Yellow", "Green", "Blue", "Pink"]).unwrap();
        let pink_five = Identity::new(4, 5);
        assert!(variant.touches(pink_five, Clue::rank(1)));
        assert!(variant.is_cluable(Clue::colour(4)));
    }

    #[test]
    fn black_is_dark_and_cluable() {
        let variant =
            Variant::new("Black (5 Suits)", &["Red", "Yellow", "Green", "Blue", "Black"]).unwrap();
        assert!(variant.is_cluable(Clue::colour(4)));
        assert_eq!(variant.copies(Identity::new(4, 1)), 1);
        assert_eq!(variant.copies(Identity::new(0, 1)), 3);
    }

    #[test]
    fn dark_suit_names_have_single_copies() {
        let dark_names = [
            "Dark Null",
            "Dark Brown",
            "Cocoa Rainbow",
            "Gray",
            "Black",
            "Dark Rainbow",
            "Gray Pink",
            "Dark Pink",
            "Dark Omni",
            "Dark Prism",
        ];
        for name in dark_names {
            let suit = SuitDef::from_name(name);
            assert!(suit.is_dark(), "{name} should be dark");
        }
        assert!(!SuitDef::from_name("Rainbow").is_dark());
    }

    #[test]
    fn suit_behaviour_table() {
        assert_eq!(SuitDef::from_name("Rainbow").colour_response(), ColourResponse::Every);
        assert_eq!(SuitDef::from_name("White").colour_response(), ColourResponse::Untouched);
        assert_eq!(SuitDef::from_name("Pink").rank_response(), RankResponse::Every);
        assert_eq!(SuitDef::from_name("Null").rank_response(), RankResponse::Untouched);
        assert_eq!(SuitDef::from_name("Red").colour_response(), ColourResponse::Matching);
    }

    #[test]
    fn descriptor_parses_from_json() {
        let variant = Variant::from_json(
            r#"{"id": 16, "name": "Rainbow (5 Suits)", "suits": ["Red", "Yellow", "Green", "Blue", "Rainbow"]}"#,
        )
        .unwrap();
        assert_eq!(variant.suit_count(), 5);
        assert_eq!(variant.short_name(Identity::new(4, 2)), "r2");
    }

    #[test]
    fn rejects_bad_suit_counts() {
        assert!(Variant::new("Tiny", &["Red", "Blue"]).is_err());
    }

    #[test]
    fn deck_size_counts_copies() {
        assert_eq!(Variant::no_variant().deck_size(), 50);
    }
}
