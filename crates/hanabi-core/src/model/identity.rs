use core::fmt;
use serde::{Deserialize, Serialize};

/// Upper bounds for the identity bitset. No supported variant exceeds
/// six suits or rank 5.
pub const MAX_SUITS: usize = 6;
pub const MAX_RANK: u8 = 5;

/// A (suit, rank) pair drawn from the variant's suit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "suitIndex")]
    pub suit: usize,
    pub rank: u8,
}

impl Identity {
    pub const fn new(suit: usize, rank: u8) -> Self {
        Self { suit, rank }
    }

    pub(crate) const fn bit_index(self) -> u32 {
        self.suit as u32 * MAX_RANK as u32 + (self.rank as u32 - 1)
    }

    const fn from_bit_index(index: u32) -> Self {
        Self {
            suit: (index / MAX_RANK as u32) as usize,
            rank: (index % MAX_RANK as u32) as u8 + 1,
        }
    }
}

/// Set of identities packed into a bitmask, one bit per (suit, rank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IdentitySet(u32);

impl IdentitySet {
    pub const EMPTY: Self = Self(0);

    /// Every identity of a variant with `num_suits` suits.
    pub fn all(num_suits: usize) -> Self {
        let bits = (num_suits * MAX_RANK as usize) as u32;
        if bits >= 32 {
            Self(u32::MAX)
        } else {
            Self((1u32 << bits) - 1)
        }
    }

    pub fn single(identity: Identity) -> Self {
        Self(1 << identity.bit_index())
    }

    pub fn contains(self, identity: Identity) -> bool {
        self.0 & (1 << identity.bit_index()) != 0
    }

    pub fn with(self, identity: Identity) -> Self {
        Self(self.0 | (1 << identity.bit_index()))
    }

    pub fn without(self, identity: Identity) -> Self {
        Self(self.0 & !(1 << identity.bit_index()))
    }

    pub fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn subtract(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_singleton(self) -> bool {
        self.0.count_ones() == 1
    }

    /// The sole member, if exactly one identity remains.
    pub fn singleton(self) -> Option<Identity> {
        if self.is_singleton() {
            Some(Identity::from_bit_index(self.0.trailing_zeros()))
        } else {
            None
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Identity> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros();
            bits &= bits - 1;
            Some(Identity::from_bit_index(index))
        })
    }

    /// Lowest rank among the remaining identities.
    pub fn min_rank(self) -> Option<u8> {
        self.iter().map(|id| id.rank).min()
    }
}

impl FromIterator<Identity> for IdentitySet {
    fn from_iter<T: IntoIterator<Item = Identity>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |set, identity| set.with(identity))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}r{}", self.suit, self.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, IdentitySet};

    #[test]
    fn all_covers_every_identity() {
        let set = IdentitySet::all(5);
        assert_eq!(set.len(), 25);
        assert!(set.contains(Identity::new(0, 1)));
        assert!(set.contains(Identity::new(4, 5)));
        assert!(!set.contains(Identity::new(5, 1)));
    }

    #[test]
    fn singleton_roundtrip() {
        let id = Identity::new(3, 4);
        let set = IdentitySet::single(id);
        assert!(set.is_singleton());
        assert_eq!(set.singleton(), Some(id));
    }

    #[test]
    fn subtract_and_intersect() {
        let a: IdentitySet = [Identity::new(0, 1), Identity::new(1, 2)].into_iter().collect();
        let b = IdentitySet::single(Identity::new(0, 1));
        assert_eq!(a.subtract(b).singleton(), Some(Identity::new(1, 2)));
        assert_eq!(a.intersect(b), b);
        assert!(b.is_subset_of(a));
    }

    #[test]
    fn iter_yields_in_bit_order() {
        let set: IdentitySet = [Identity::new(1, 3), Identity::new(0, 2)].into_iter().collect();
        let items: Vec<_> = set.iter().collect();
        assert_eq!(items, vec![Identity::new(0, 2), Identity::new(1, 3)]);
        assert_eq!(set.min_rank(), Some(2));
    }
}
