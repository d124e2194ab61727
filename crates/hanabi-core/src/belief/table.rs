use super::counts::IdentityCounts;
use crate::model::card::CardBelief;
use crate::model::identity::Identity;
use crate::model::variant::Variant;

/// Which knowledge projection a table models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// Derivable by any player without using own-hand visibility.
    Common,
    /// What this player can additionally deduce from what they see.
    Player(usize),
}

/// One belief table, keyed by card order.
#[derive(Debug, Clone)]
pub struct Beliefs {
    perspective: Perspective,
    cards: Vec<CardBelief>,
}

impl Beliefs {
    pub fn new(perspective: Perspective) -> Self {
        Self {
            perspective,
            cards: Vec::new(),
        }
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn knows(&self, order: usize) -> bool {
        order < self.cards.len()
    }

    pub fn card(&self, order: usize) -> &CardBelief {
        &self.cards[order]
    }

    pub fn card_mut(&mut self, order: usize) -> &mut CardBelief {
        &mut self.cards[order]
    }

    pub fn cards(&self) -> &[CardBelief] {
        &self.cards
    }

    /// Registers a newly drawn card. Orders are assigned monotonically
    /// at draw time, so the table grows by appending.
    pub fn on_draw(&mut self, order: usize, variant: &Variant) {
        debug_assert_eq!(order, self.cards.len(), "draws arrive in order");
        self.cards.push(CardBelief::new(order, variant.all_identities()));
    }

    /// Collapses a card to the singleton true identity in this
    /// perspective.
    pub fn fix_identity(&mut self, order: usize, identity: Identity) {
        self.cards[order].reveal(identity);
    }

    /// Removes `identity` from every in-hand card except those listed.
    /// Returns the number of `possible` entries removed.
    pub fn eliminate(&mut self, identity: Identity, except: &[usize]) -> usize {
        let mut removed = 0;
        for card in &mut self.cards {
            if !card.in_hand() || except.contains(&card.order()) {
                continue;
            }
            if card.rule_out(identity) {
                removed += 1;
            }
        }
        removed
    }

    /// Runs copy-count elimination to a fixed point.
    ///
    /// `settled` carries the copies accounted for outside this table
    /// (play stacks and discard pile). Cards whose `possible` is a
    /// singleton pin a further copy each; whenever an identity is fully
    /// accounted for it is removed from every other card, which can
    /// create new singletons and cascade. Returns the total number of
    /// `possible` entries removed.
    pub fn run_elimination(&mut self, variant: &Variant, settled: &IdentityCounts) -> usize {
        let mut removed_total = 0;
        loop {
            let mut counts = *settled;
            let mut pinned: Vec<(Identity, usize)> = Vec::new();
            for card in &self.cards {
                if !card.in_hand() {
                    continue;
                }
                if let Some(identity) = card.identity_known() {
                    counts.add(identity);
                    pinned.push((identity, card.order()));
                }
            }

            let mut removed_pass = 0;
            for identity in variant.identities() {
                if counts.get(identity) < variant.copies(identity) {
                    continue;
                }
                let keep: Vec<usize> = pinned
                    .iter()
                    .filter(|(id, _)| *id == identity)
                    .map(|(_, order)| *order)
                    .collect();
                removed_pass += self.eliminate(identity, &keep);
            }

            removed_total += removed_pass;
            if removed_pass == 0 {
                return removed_total;
            }
        }
    }

    /// `inferred ⊆ possible` for every card; holds after every action.
    pub fn invariants_hold(&self) -> bool {
        self.cards
            .iter()
            .all(|card| card.inferred.is_subset_of(card.possible))
    }
}
