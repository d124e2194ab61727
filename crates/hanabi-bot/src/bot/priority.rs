use hanabi_core::game::Game;
use hanabi_core::model::identity::{Identity, MAX_RANK};

/// Number of play priority buckets.
pub const PRIORITY_BUCKETS: usize = 6;

/// Sorts our playable cards into priority buckets:
/// 0. blind plays from finesses or rewinds
/// 1. cards whose successor sits in someone else's hand
/// 2. cards whose successor sits only in our own hand
/// 3. known fives
/// 4. cards with several possible identities
/// 5. everything else, lowest rank first, most recent first on ties
pub fn determine_playable_priorities(
    game: &Game,
    playables: &[usize],
) -> [Vec<usize>; PRIORITY_BUCKETS] {
    let mut buckets: [Vec<usize>; PRIORITY_BUCKETS] = Default::default();
    let mut tail: Vec<(u8, usize)> = Vec::new();

    for &order in playables {
        let card = game.our_view().card(order);
        if card.finessed || card.rewinded {
            buckets[0].push(order);
            continue;
        }

        let ids = if card.inferred.is_empty() {
            card.possible
        } else {
            card.inferred
        };

        // Every possible identity must connect for the card to count
        // as connecting; one dead end drops it out of buckets 1-2.
        let mut priority = 1;
        for id in ids.iter() {
            if id.rank >= MAX_RANK {
                priority = 3;
                break;
            }
            match holder_of_identity(game, Identity::new(id.suit, id.rank + 1)) {
                Some(player) if player == game.our_index() => priority = priority.max(2),
                Some(_) => {}
                None => {
                    priority = 3;
                    break;
                }
            }
        }
        if priority < 3 {
            buckets[priority].push(order);
            continue;
        }

        let min_rank = ids.min_rank().unwrap_or(MAX_RANK);
        if min_rank == MAX_RANK {
            buckets[3].push(order);
        } else if ids.len() > 1 {
            buckets[4].push(order);
        } else {
            tail.push((min_rank, order));
        }
    }

    // Lowest rank first; the more recent draw wins ties because it is
    // likelier to still have a useful successor behind it.
    tail.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    buckets[5] = tail.into_iter().map(|(_, order)| order).collect();
    buckets
}

/// Who visibly holds a copy of `identity`, if anyone. Our own hand
/// counts only where our view has pinned the card down.
fn holder_of_identity(game: &Game, identity: Identity) -> Option<usize> {
    for player in 0..game.num_players() {
        for order in game.hand(player).iter() {
            let held = if player == game.our_index() {
                game.our_view().card(order).identity_known() == Some(identity)
            } else {
                game.identity_of(order) == Some(identity)
            };
            if held {
                return Some(player);
            }
        }
    }
    None
}

/// Freshness order for multiple playable 1s: cards clued on the chop
/// of the starting hand go first, then fresh draws newest-first, then
/// starting-hand cards oldest-first.
pub fn order_1s(game: &Game, orders: &[usize]) -> Vec<usize> {
    let starting = game.num_players() * Game::hand_size(game.num_players());
    let mut sorted: Vec<usize> = orders.to_vec();
    sorted.sort_by(|&a, &b| {
        let (card_a, card_b) = (game.our_view().card(a), game.our_view().card(b));
        let (start_a, start_b) = (a < starting, b < starting);
        let chop_a = card_a.chop_when_first_clued && start_a;
        let chop_b = card_b.chop_when_first_clued && start_b;
        if chop_a != chop_b {
            return chop_b.cmp(&chop_a);
        }
        if start_a != start_b {
            // Fresh draws before starting-hand cards.
            return start_a.cmp(&start_b);
        }
        if start_a {
            a.cmp(&b)
        } else {
            b.cmp(&a)
        }
    });
    sorted
}
