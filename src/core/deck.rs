//! Deck construction, shuffling, reshuffling and dealing.
//!
//! All functions take persistent vectors and return new ones; nothing here
//! mutates a vector the caller still holds.

use im::Vector;

use super::card::{Card, CardId, Rank, Suit};
use super::config::JOKER_COUNT;
use super::player::Player;
use super::rng::GameRng;

/// Build an unshuffled deck: 52 suited cards, plus two jokers if requested.
///
/// Card ids are assigned sequentially from 0.
#[must_use]
pub fn create_deck(include_jokers: bool) -> Vector<Card> {
    let mut next_id = 0u32;
    let mut deck = Vector::new();
    for suit in Suit::ALL {
        for rank in Rank::all() {
            deck.push_back(Card::suited(CardId(next_id), suit, rank));
            next_id += 1;
        }
    }
    if include_jokers {
        for _ in 0..JOKER_COUNT {
            deck.push_back(Card::joker(CardId(next_id)));
            next_id += 1;
        }
    }
    deck
}

/// Return a shuffled copy of `cards`.
#[must_use]
pub fn shuffle(cards: &Vector<Card>, rng: &mut GameRng) -> Vector<Card> {
    let mut buffer: Vec<Card> = cards.iter().copied().collect();
    rng.shuffle(&mut buffer);
    buffer.into_iter().collect()
}

/// Rebuild the draw pile from the discard pile.
///
/// Everything except the top discard is shuffled together with the current
/// deck; the top discard stays put. An empty discard pile leaves both piles
/// untouched.
#[must_use]
pub fn refill_deck(
    deck: &Vector<Card>,
    discard_pile: &Vector<Card>,
    rng: &mut GameRng,
) -> (Vector<Card>, Vector<Card>) {
    let Some(top) = discard_pile.front().copied() else {
        return (deck.clone(), discard_pile.clone());
    };

    let mut pool = deck.clone();
    pool.append(discard_pile.clone().split_off(1));
    (shuffle(&pool, rng), Vector::unit(top))
}

/// Deal `init_hand_size` consecutive cards to each player in seat order.
///
/// Player `i` receives `deck[i*h .. (i+1)*h]`; the remainder is the new deck.
/// Callers validate settings first, so the deck always covers the deal.
#[must_use]
pub fn deal_cards(
    players: &Vector<Player>,
    deck: &Vector<Card>,
    init_hand_size: usize,
) -> (Vector<Player>, Vector<Card>) {
    let mut remaining = deck.clone();
    let dealt = players
        .iter()
        .map(|player| {
            let take = init_hand_size.min(remaining.len());
            let rest = remaining.split_off(take);
            let hand = std::mem::replace(&mut remaining, rest);
            player.clone().with_hand(hand)
        })
        .collect();
    (dealt, remaining)
}
