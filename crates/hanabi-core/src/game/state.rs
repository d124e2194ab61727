use crate::belief::{Beliefs, IdentityCounts, Perspective};
use crate::model::clue::Clue;
use crate::model::hand::Hand;
use crate::model::identity::{Identity, MAX_RANK};
use crate::model::variant::Variant;

pub const MAX_CLUE_TOKENS: u8 = 8;

/// Errors that mean the action stream can no longer be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    PlayerOutOfRange(usize),
    PlayerCountOutOfRange(usize),
    OutOfOrderDraw { expected: usize, actual: usize },
    UnknownOrder { player: usize, order: usize },
    /// A play/discard frame arrived without the revealed identity.
    MissingIdentity { order: usize },
    EmptyClue,
}

/// The single owned game state: hands, stacks, tokens and both
/// knowledge perspectives. Everything takes it as an explicit
/// parameter; there are no process-wide singletons.
#[derive(Debug, Clone)]
pub struct Game {
    variant: Variant,
    num_players: usize,
    our_index: usize,
    hands: Vec<Hand>,
    /// True identity by order, where visible to us.
    identities: Vec<Option<Identity>>,
    common: Beliefs,
    views: Vec<Beliefs>,
    play_stacks: Vec<u8>,
    discards: Vec<Identity>,
    clue_tokens: u8,
    strikes: u8,
    turn_count: u32,
    current_player: usize,
    early_game: bool,
}

impl Game {
    pub fn new(variant: Variant, num_players: usize, our_index: usize) -> Result<Self, GameError> {
        if !(2..=6).contains(&num_players) {
            return Err(GameError::PlayerCountOutOfRange(num_players));
        }
        if our_index >= num_players {
            return Err(GameError::PlayerOutOfRange(our_index));
        }
        let suit_count = variant.suit_count();
        Ok(Self {
            variant,
            num_players,
            our_index,
            hands: vec![Hand::new(); num_players],
            identities: Vec::new(),
            common: Beliefs::new(Perspective::Common),
            views: (0..num_players)
                .map(|p| Beliefs::new(Perspective::Player(p)))
                .collect(),
            play_stacks: vec![0; suit_count],
            discards: Vec::new(),
            clue_tokens: MAX_CLUE_TOKENS,
            strikes: 0,
            turn_count: 0,
            current_player: 0,
            early_game: true,
        })
    }

    /// Cards dealt per player, by player count.
    pub const fn hand_size(num_players: usize) -> usize {
        match num_players {
            2 | 3 => 5,
            4 | 5 => 4,
            _ => 3,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn our_index(&self) -> usize {
        self.our_index
    }

    pub fn hand(&self, player: usize) -> &Hand {
        &self.hands[player]
    }

    pub fn our_hand(&self) -> &Hand {
        &self.hands[self.our_index]
    }

    pub fn common(&self) -> &Beliefs {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut Beliefs {
        &mut self.common
    }

    pub fn view(&self, player: usize) -> &Beliefs {
        &self.views[player]
    }

    pub fn view_mut(&mut self, player: usize) -> &mut Beliefs {
        &mut self.views[player]
    }

    /// Our private view: common knowledge plus everything we see.
    pub fn our_view(&self) -> &Beliefs {
        &self.views[self.our_index]
    }

    pub fn identity_of(&self, order: usize) -> Option<Identity> {
        self.identities.get(order).copied().flatten()
    }

    pub fn holder_of(&self, order: usize) -> Option<usize> {
        (0..self.num_players).find(|&p| self.hands[p].contains(order))
    }

    pub fn play_stack(&self, suit: usize) -> u8 {
        self.play_stacks[suit]
    }

    pub fn play_stacks(&self) -> &[u8] {
        &self.play_stacks
    }

    pub fn discards(&self) -> &[Identity] {
        &self.discards
    }

    pub fn clue_tokens(&self) -> u8 {
        self.clue_tokens
    }

    pub fn strikes(&self) -> u8 {
        self.strikes
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn set_turn(&mut self, num: u32, current_player: usize) {
        self.turn_count = num;
        self.current_player = current_player;
    }

    /// No deliberate discard has happened yet.
    pub fn early_game(&self) -> bool {
        self.early_game
    }

    pub fn next_player(&self, player: usize) -> usize {
        (player + 1) % self.num_players
    }

    pub fn score(&self) -> u32 {
        self.play_stacks.iter().map(|&r| r as u32).sum()
    }

    // --- action bookkeeping -------------------------------------------------

    pub fn handle_draw(
        &mut self,
        player: usize,
        order: usize,
        identity: Option<Identity>,
    ) -> Result<(), GameError> {
        if player >= self.num_players {
            return Err(GameError::PlayerOutOfRange(player));
        }
        if order != self.identities.len() {
            return Err(GameError::OutOfOrderDraw {
                expected: self.identities.len(),
                actual: order,
            });
        }
        self.identities.push(identity);
        self.hands[player].draw(order);
        self.common.on_draw(order, &self.variant);
        for view in &mut self.views {
            view.on_draw(order, &self.variant);
        }
        if let Some(identity) = identity {
            // Every player except the holder sees this card.
            for p in 0..self.num_players {
                if p != player {
                    self.views[p].fix_identity(order, identity);
                }
            }
        }
        self.refresh_elimination();
        Ok(())
    }

    /// Applies the mechanical part of a clue: token spend, touch
    /// constraints and flags in every perspective. Interpretation is
    /// the convention layer's job and runs before flags are set.
    pub fn apply_clue_touch(
        &mut self,
        target: usize,
        clue: Clue,
        list: &[usize],
    ) -> Result<(), GameError> {
        if target >= self.num_players {
            return Err(GameError::PlayerOutOfRange(target));
        }
        if list.is_empty() {
            return Err(GameError::EmptyClue);
        }
        for &order in list {
            if !self.hands[target].contains(order) {
                return Err(GameError::UnknownOrder {
                    player: target,
                    order,
                });
            }
        }

        self.clue_tokens = self.clue_tokens.saturating_sub(1);
        let touched = self.variant.touched_set(clue);
        let untouched = self.variant.all_identities().subtract(touched);

        let orders: Vec<usize> = self.hands[target].orders().to_vec();
        for order in orders {
            let hit = list.contains(&order);
            for table in self.tables_mut() {
                let card = table.card_mut(order);
                if hit {
                    card.restrict_possible(touched);
                } else {
                    card.restrict_possible(untouched);
                }
            }
            if hit {
                for table in self.tables_mut() {
                    let card = table.card_mut(order);
                    card.newly_clued = !card.clued;
                    card.clued = true;
                    card.record_clue(clue);
                }
            }
        }
        self.refresh_elimination();
        Ok(())
    }

    /// Clears the transient newly-clued marker once a clue has been
    /// fully interpreted.
    pub fn clear_newly_clued(&mut self, list: &[usize]) {
        for &order in list {
            for table in self.tables_mut() {
                table.card_mut(order).newly_clued = false;
            }
        }
    }

    /// Reveals a card's true identity to every perspective.
    pub fn reveal(&mut self, order: usize, identity: Identity) {
        if order < self.identities.len() {
            self.identities[order] = Some(identity);
        }
        self.common.fix_identity(order, identity);
        for view in &mut self.views {
            view.fix_identity(order, identity);
        }
    }

    pub fn on_play(
        &mut self,
        player: usize,
        order: usize,
        identity: Identity,
    ) -> Result<(), GameError> {
        self.remove_from_hand(player, order)?;
        self.reveal(order, identity);
        self.depart(order);
        self.play_stacks[identity.suit] = identity.rank;
        if identity.rank == MAX_RANK && self.clue_tokens < MAX_CLUE_TOKENS {
            // Completing a stack refunds a token.
            self.clue_tokens += 1;
        }
        self.refresh_elimination();
        Ok(())
    }

    pub fn on_discard(
        &mut self,
        player: usize,
        order: usize,
        identity: Identity,
        failed: bool,
    ) -> Result<(), GameError> {
        self.remove_from_hand(player, order)?;
        self.reveal(order, identity);
        self.depart(order);
        self.discards.push(identity);
        if failed {
            self.strikes = self.strikes.saturating_add(1);
        } else {
            if self.clue_tokens < MAX_CLUE_TOKENS {
                self.clue_tokens += 1;
            }
            self.early_game = false;
        }
        self.refresh_elimination();
        Ok(())
    }

    /// Re-runs elimination on every perspective to its fixed point.
    /// Returns the entries removed from the common table.
    pub fn refresh_elimination(&mut self) -> usize {
        let settled = self.settled_counts();
        let removed = self.common.run_elimination(&self.variant, &settled);
        for view in &mut self.views {
            view.run_elimination(&self.variant, &settled);
        }
        removed
    }

    fn settled_counts(&self) -> IdentityCounts {
        let mut counts = IdentityCounts::new();
        for (suit, &stack) in self.play_stacks.iter().enumerate() {
            for rank in 1..=stack {
                counts.add(Identity::new(suit, rank));
            }
        }
        for &identity in &self.discards {
            counts.add(identity);
        }
        counts
    }

    fn remove_from_hand(&mut self, player: usize, order: usize) -> Result<(), GameError> {
        if player >= self.num_players {
            return Err(GameError::PlayerOutOfRange(player));
        }
        self.hands[player]
            .remove(order)
            .map(|_| ())
            .ok_or(GameError::UnknownOrder { player, order })
    }

    fn depart(&mut self, order: usize) {
        self.common.card_mut(order).depart();
        for view in &mut self.views {
            view.card_mut(order).depart();
        }
    }

    fn tables_mut(&mut self) -> impl Iterator<Item = &mut Beliefs> {
        std::iter::once(&mut self.common).chain(self.views.iter_mut())
    }

    // --- derived queries ----------------------------------------------------

    /// Distance from playable: 0 means immediately playable.
    pub fn playable_away(&self, identity: Identity) -> i32 {
        identity.rank as i32 - (self.play_stacks[identity.suit] as i32 + 1)
    }

    pub fn is_playable(&self, identity: Identity) -> bool {
        self.playable_away(identity) == 0
    }

    pub fn copies_left(&self, identity: Identity) -> u8 {
        let gone = self.discards.iter().filter(|&&d| d == identity).count() as u8;
        self.variant.copies(identity).saturating_sub(gone)
    }

    /// Highest rank this suit can still reach given the discard pile.
    pub fn max_usable_rank(&self, suit: usize) -> u8 {
        let mut rank = self.play_stacks[suit];
        while rank < MAX_RANK {
            if self.copies_left(Identity::new(suit, rank + 1)) == 0 {
                return rank;
            }
            rank += 1;
        }
        MAX_RANK
    }

    /// Already played, or unreachable because a needed copy is gone.
    pub fn is_basic_trash(&self, identity: Identity) -> bool {
        identity.rank <= self.play_stacks[identity.suit]
            || identity.rank > self.max_usable_rank(identity.suit)
    }

    /// Losing the last copy would make the suit unfinishable.
    pub fn is_critical(&self, identity: Identity) -> bool {
        !self.is_basic_trash(identity) && self.copies_left(identity) == 1
    }

    /// Another card with this identity is already protected (clued,
    /// finessed or chop-moved) somewhere else.
    pub fn is_saved_elsewhere(&self, identity: Identity, exclude_order: usize) -> bool {
        self.hands.iter().flat_map(|hand| hand.iter()).any(|order| {
            if order == exclude_order {
                return false;
            }
            let card = self.common.card(order);
            if !card.is_saved() {
                return false;
            }
            self.identity_of(order) == Some(identity)
                || card.inferred.singleton() == Some(identity)
        })
    }

    /// Copies of `identity` visible to us in hands, excluding one order.
    pub fn visible_count(&self, identity: Identity, exclude_order: usize) -> usize {
        self.hands
            .iter()
            .flat_map(|hand| hand.iter())
            .filter(|&order| order != exclude_order && self.identity_of(order) == Some(identity))
            .count()
    }

    /// Both perspectives stay internally consistent.
    pub fn invariants_hold(&self) -> bool {
        self.common.invariants_hold() && self.views.iter().all(Beliefs::invariants_hold)
    }
}

#[cfg(test)]
mod tests {
    use super::{Game, GameError, MAX_CLUE_TOKENS};
    use crate::model::clue::Clue;
    use crate::model::identity::Identity;
    use crate::model::variant::Variant;

    fn two_player_game() -> Game {
        Game::new(Variant::no_variant(), 2, 0).unwrap()
    }

    fn deal(game: &mut Game, player: usize, identities: &[Option<Identity>]) {
        for &identity in identities {
            let order = game.identities.len();
            game.handle_draw(player, order, identity).unwrap();
        }
    }

    #[test]
    fn hand_sizes_follow_player_count() {
        assert_eq!(Game::hand_size(2), 5);
        assert_eq!(Game::hand_size(3), 5);
        assert_eq!(Game::hand_size(4), 4);
        assert_eq!(Game::hand_size(6), 3);
    }

    #[test]
    fn draw_out_of_order_is_a_protocol_error() {
        let mut game = two_player_game();
        let result = game.handle_draw(0, 5, None);
        assert_eq!(
            result,
            Err(GameError::OutOfOrderDraw {
                expected: 0,
                actual: 5
            })
        );
    }

    #[test]
    fn visible_draw_is_fixed_in_other_views_only() {
        let mut game = two_player_game();
        let r1 = Identity::new(0, 1);
        deal(&mut game, 1, &[Some(r1)]);

        // We (player 0) see partner's card; the common view does not.
        assert_eq!(game.view(0).card(0).identity_known(), Some(r1));
        assert_eq!(game.view(1).card(0).identity_known(), None);
        assert_eq!(game.common().card(0).identity_known(), None);
    }

    #[test]
    fn clue_spends_a_token_and_sets_flags() {
        let mut game = two_player_game();
        deal(&mut game, 1, &[Some(Identity::new(0, 1)), Some(Identity::new(1, 3))]);

        game.apply_clue_touch(1, Clue::colour(0), &[0]).unwrap();
        assert_eq!(game.clue_tokens(), MAX_CLUE_TOKENS - 1);
        let card = game.common().card(0);
        assert!(card.clued && card.newly_clued);
        // Touched card keeps only red; the untouched card rules red out.
        assert!(card.possible.iter().all(|id| id.suit == 0));
        assert!(game.common().card(1).possible.iter().all(|id| id.suit != 0));
    }

    #[test]
    fn empty_clue_is_rejected() {
        let mut game = two_player_game();
        deal(&mut game, 1, &[Some(Identity::new(0, 1))]);
        assert_eq!(game.apply_clue_touch(1, Clue::colour(2), &[]), Err(GameError::EmptyClue));
    }

    #[test]
    fn play_updates_stack_and_refunds_on_completion() {
        let mut game = two_player_game();
        deal(&mut game, 1, &[Some(Identity::new(0, 1))]);
        game.apply_clue_touch(1, Clue::rank(1), &[0]).unwrap();
        assert_eq!(game.clue_tokens(), MAX_CLUE_TOKENS - 1);

        game.on_play(1, 0, Identity::new(0, 1)).unwrap();
        assert_eq!(game.play_stack(0), 1);
        assert_eq!(game.score(), 1);
        // Rank 1 does not complete a stack; no refund.
        assert_eq!(game.clue_tokens(), MAX_CLUE_TOKENS - 1);
    }

    #[test]
    fn failed_discard_adds_strike_without_token() {
        let mut game = two_player_game();
        deal(&mut game, 1, &[Some(Identity::new(2, 3))]);
        game.apply_clue_touch(1, Clue::rank(3), &[0]).unwrap();

        game.on_discard(1, 0, Identity::new(2, 3), true).unwrap();
        assert_eq!(game.strikes(), 1);
        assert_eq!(game.clue_tokens(), MAX_CLUE_TOKENS - 1);
        assert!(game.early_game());
    }

    #[test]
    fn deliberate_discard_refunds_and_ends_early_game() {
        let mut game = two_player_game();
        deal(&mut game, 1, &[Some(Identity::new(2, 3))]);
        game.apply_clue_touch(1, Clue::rank(3), &[0]).unwrap();
        game.on_discard(1, 0, Identity::new(2, 3), false).unwrap();
        assert_eq!(game.clue_tokens(), MAX_CLUE_TOKENS);
        assert!(!game.early_game());
    }

    #[test]
    fn critical_tracks_discards_and_dark_suits() {
        let mut game = two_player_game();
        let y2 = Identity::new(1, 2);
        assert!(!game.is_critical(y2));
        game.discards.push(y2);
        assert!(game.is_critical(y2));
        // Fives are always single copies.
        assert!(game.is_critical(Identity::new(3, 5)));

        let black = Game::new(
            Variant::new("Black (5 Suits)", &["Red", "Yellow", "Green", "Blue", "Black"]).unwrap(),
            2,
            0,
        )
        .unwrap();
        assert!(black.is_critical(Identity::new(4, 1)));
        assert!(!black.is_critical(Identity::new(0, 1)));
    }

    #[test]
    fn trash_covers_played_and_dead_ranks() {
        let mut game = two_player_game();
        let r1 = Identity::new(0, 1);
        game.play_stacks[0] = 1;
        assert!(game.is_basic_trash(r1));
        // Both red 3s discarded: red 4 and 5 become unreachable.
        game.discards.push(Identity::new(0, 3));
        game.discards.push(Identity::new(0, 3));
        assert_eq!(game.max_usable_rank(0), 2);
        assert!(game.is_basic_trash(Identity::new(0, 4)));
        assert!(!game.is_basic_trash(Identity::new(0, 2)));
    }

    #[test]
    fn invariants_hold_after_mixed_actions() {
        let mut game = two_player_game();
        deal(
            &mut game,
            1,
            &[
                Some(Identity::new(0, 1)),
                Some(Identity::new(1, 4)),
                Some(Identity::new(0, 5)),
            ],
        );
        deal(&mut game, 0, &[None, None]);
        game.apply_clue_touch(1, Clue::colour(0), &[0, 2]).unwrap();
        game.on_play(1, 0, Identity::new(0, 1)).unwrap();
        assert!(game.invariants_hold());
    }
}
