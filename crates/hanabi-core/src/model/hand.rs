use crate::belief::Beliefs;

/// Which clued cards shield the chop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChopMode {
    /// Newly-clued cards do not shield yet (mid-interpretation).
    #[default]
    Normal,
    /// Every clued card shields, newly clued included.
    IncludeNew,
}

/// Ordered card slots for one player, newest at slot 1 (index 0).
#[derive(Debug, Clone, Default)]
pub struct Hand {
    orders: Vec<usize>,
}

impl Hand {
    pub fn new() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn draw(&mut self, order: usize) {
        self.orders.insert(0, order);
    }

    /// Removes a card by order, returning its slot index.
    pub fn remove(&mut self, order: usize) -> Option<usize> {
        let index = self.orders.iter().position(|&o| o == order)?;
        self.orders.remove(index);
        Some(index)
    }

    pub fn contains(&self, order: usize) -> bool {
        self.orders.contains(&order)
    }

    /// 1-based slot for notes and logs.
    pub fn slot_of(&self, order: usize) -> Option<usize> {
        self.orders.iter().position(|&o| o == order).map(|i| i + 1)
    }

    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.orders.iter().copied()
    }

    /// The rightmost card not protected by convention state, if any.
    pub fn chop(&self, beliefs: &Beliefs, mode: ChopMode) -> Option<usize> {
        for &order in self.orders.iter().rev() {
            let card = beliefs.card(order);
            let shielded = card.chop_moved
                || (card.clued && (mode == ChopMode::IncludeNew || !card.newly_clued));
            if !shielded {
                return Some(order);
            }
        }
        None
    }

    /// Every card is clued, finessed or chop-moved; no free discard.
    pub fn is_locked(&self, beliefs: &Beliefs) -> bool {
        !self.is_empty() && self.orders.iter().all(|&order| beliefs.card(order).is_saved())
    }
}
