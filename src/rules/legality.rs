//! Card legality and special effects.
//!
//! ## Playing
//!
//! - A joker is always playable
//! - With damage pending, only a blocking card may be played
//! - On a joker with no damage pending, anything goes
//! - Otherwise the card must share rank or suit with the top card
//!
//! ## Blocking
//!
//! | top card | blocks                          |
//! |----------|---------------------------------|
//! | 2        | any 2, or the Ace of that suit  |
//! | Ace      | any Ace                         |
//! | other    | joker only                      |
//!
//! ## Effects
//!
//! Jack skips ahead, King steps back, Queen reverses direction. A 2 adds 2
//! damage, an Ace 5 and a joker 7.

use crate::core::{Card, CardFace, Direction, Rank};

/// Check whether `card` may be played on `top` with `damage` pending.
#[must_use]
pub fn is_valid_play(card: &Card, top: &Card, damage: u32) -> bool {
    if card.is_joker() {
        return true;
    }
    if damage > 0 {
        return can_block(card, top);
    }
    match (card.face, top.face) {
        (_, CardFace::Joker) => true,
        (
            CardFace::Suited { suit, rank },
            CardFace::Suited {
                suit: top_suit,
                rank: top_rank,
            },
        ) => rank == top_rank || suit == top_suit,
        (CardFace::Joker, _) => true,
    }
}

/// Check whether `card` counters the damage carried by `top`.
#[must_use]
pub fn can_block(card: &Card, top: &Card) -> bool {
    match top.face {
        CardFace::Suited { rank, suit } if rank == Rank::TWO => {
            card.has_rank(Rank::TWO) || (card.has_rank(Rank::ACE) && card.suit() == Some(suit))
        }
        CardFace::Suited { rank, .. } if rank == Rank::ACE => card.has_rank(Rank::ACE),
        _ => card.is_joker(),
    }
}

/// Damage a card adds when its effect is applied.
#[must_use]
pub fn attack_value(card: &Card) -> u32 {
    match card.face {
        CardFace::Joker => 7,
        CardFace::Suited { rank, .. } if rank == Rank::ACE => 5,
        CardFace::Suited { rank, .. } if rank == Rank::TWO => 2,
        CardFace::Suited { .. } => 0,
    }
}

/// Direction after `card`'s effect: a Queen reverses it.
#[must_use]
pub fn change_direction(card: &Card, direction: Direction) -> Direction {
    if card.has_rank(Rank::QUEEN) {
        direction.reversed()
    } else {
        direction
    }
}

/// Whether playing `card` should be followed by `APPLY_SPECIAL_EFFECT`.
#[must_use]
pub fn has_special_effect(card: &Card) -> bool {
    match card.face {
        CardFace::Joker => true,
        CardFace::Suited { rank, .. } => matches!(rank.value(), 1 | 2 | 11 | 12 | 13),
    }
}

/// First card in `hand` that may be played on `top`.
///
/// Returns the hand index together with the card.
pub fn find_playable_card<'a>(
    hand: impl IntoIterator<Item = &'a Card>,
    top: &Card,
    damage: u32,
) -> Option<(usize, &'a Card)> {
    hand.into_iter()
        .enumerate()
        .find(|(_, card)| is_valid_play(card, top, damage))
}
