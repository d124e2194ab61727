use crate::model::identity::Identity;
use crate::model::variant::Variant;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A physical deck for a variant, used to drive self-play streams and
/// deterministic replay tests.
#[derive(Debug, Clone)]
pub struct Deck {
    identities: Vec<Identity>,
}

impl Deck {
    pub fn standard(variant: &Variant) -> Self {
        let mut identities = Vec::with_capacity(variant.deck_size());
        for identity in variant.identities() {
            for _ in 0..variant.copies(identity) {
                identities.push(identity);
            }
        }
        Self { identities }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(variant: &Variant, rng: &mut R) -> Self {
        let mut deck = Self::standard(variant);
        deck.identities.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(variant: &Variant, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(variant, &mut rng)
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::variant::Variant;

    #[test]
    fn standard_deck_matches_copy_counts() {
        let variant = Variant::no_variant();
        let deck = Deck::standard(&variant);
        assert_eq!(deck.identities().len(), 50);
    }

    #[test]
    fn seeded_shuffle_is_deterministic() {
        let variant = Variant::no_variant();
        let a = Deck::shuffled_with_seed(&variant, 7);
        let b = Deck::shuffled_with_seed(&variant, 7);
        assert_eq!(a.identities(), b.identities());
    }

    #[test]
    fn different_seeds_differ() {
        let variant = Variant::no_variant();
        let a = Deck::shuffled_with_seed(&variant, 1);
        let b = Deck::shuffled_with_seed(&variant, 2);
        assert_ne!(a.identities(), b.identities());
    }
}
