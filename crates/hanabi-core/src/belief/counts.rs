use crate::model::identity::{Identity, MAX_RANK, MAX_SUITS};

/// Copies of each identity already accounted for in some perspective:
/// played, discarded, or pinned to a known card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityCounts([u8; MAX_SUITS * MAX_RANK as usize]);

impl IdentityCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: Identity) -> u8 {
        self.0[identity.bit_index() as usize]
    }

    pub fn add(&mut self, identity: Identity) {
        let slot = &mut self.0[identity.bit_index() as usize];
        *slot = slot.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityCounts;
    use crate::model::identity::Identity;

    #[test]
    fn counts_accumulate_per_identity() {
        let mut counts = IdentityCounts::new();
        let id = Identity::new(2, 3);
        assert_eq!(counts.get(id), 0);
        counts.add(id);
        counts.add(id);
        assert_eq!(counts.get(id), 2);
        assert_eq!(counts.get(Identity::new(2, 4)), 0);
    }
}
