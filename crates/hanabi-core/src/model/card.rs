use crate::model::clue::Clue;
use crate::model::identity::{Identity, IdentitySet};

/// Belief state for one physical card slot within a single knowledge
/// perspective.
///
/// `possible` holds what any observer of this perspective could still
/// rule in; `inferred` is the convention-narrowed subset. Both only
/// shrink within a turn, except under a rewind.
#[derive(Debug, Clone)]
pub struct CardBelief {
    order: usize,
    pub possible: IdentitySet,
    pub inferred: IdentitySet,
    pub clued: bool,
    pub newly_clued: bool,
    pub finessed: bool,
    pub chop_moved: bool,
    pub rewinded: bool,
    pub chop_when_first_clued: bool,
    clues: Vec<Clue>,
    in_hand: bool,
}

impl CardBelief {
    pub fn new(order: usize, all: IdentitySet) -> Self {
        Self {
            order,
            possible: all,
            inferred: all,
            clued: false,
            newly_clued: false,
            finessed: false,
            chop_moved: false,
            rewinded: false,
            chop_when_first_clued: false,
            clues: Vec::new(),
            in_hand: true,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn record_clue(&mut self, clue: Clue) {
        self.clues.push(clue);
    }

    /// Still held in some hand; departed cards are counted from the
    /// play stacks and discard pile instead.
    pub fn in_hand(&self) -> bool {
        self.in_hand
    }

    pub fn depart(&mut self) {
        self.in_hand = false;
    }

    /// The card is protected by convention state (not free to discard).
    pub fn is_saved(&self) -> bool {
        self.clued || self.finessed || self.chop_moved
    }

    pub fn identity_known(&self) -> Option<Identity> {
        self.possible.singleton()
    }

    /// Collapses both sets to the revealed true identity.
    pub fn reveal(&mut self, identity: Identity) {
        self.possible = IdentitySet::single(identity);
        self.inferred = self.possible;
    }

    /// Removes `identity` from both sets. Returns true if `possible`
    /// changed. An emptied `inferred` resets to `possible` (weakest
    /// interpretation); callers log that condition.
    pub fn rule_out(&mut self, identity: Identity) -> bool {
        let before = self.possible;
        self.possible = self.possible.without(identity);
        self.inferred = self.inferred.intersect(self.possible);
        if self.inferred.is_empty() && !self.possible.is_empty() {
            self.inferred = self.possible;
        }
        self.possible != before
    }

    /// Intersects `possible` with a touch constraint, keeping
    /// `inferred` consistent.
    pub fn restrict_possible(&mut self, allowed: IdentitySet) {
        self.possible = self.possible.intersect(allowed);
        self.inferred = self.inferred.intersect(self.possible);
        if self.inferred.is_empty() && !self.possible.is_empty() {
            self.inferred = self.possible;
        }
    }

    /// Narrows `inferred` to a convention interpretation. The argument
    /// is clamped to `possible`; an empty result leaves `inferred`
    /// untouched and reports failure.
    pub fn intersect_inferred(&mut self, interpretation: IdentitySet) -> bool {
        let narrowed = self.inferred.intersect(interpretation).intersect(self.possible);
        if narrowed.is_empty() {
            return false;
        }
        self.inferred = narrowed;
        true
    }

    /// Drops all convention narrowing, keeping only public knowledge.
    pub fn reset_inferences(&mut self) {
        self.inferred = self.possible;
    }
}
