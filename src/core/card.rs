//! Card identity and faces.
//!
//! ## Card
//!
//! A card is an id plus a face: either a suited rank card or a joker.
//! Cards are immutable values; moving a card between deck, hands and the
//! discard pile never changes it.
//!
//! ## Wire Shape
//!
//! Cards serialize as `{id, isJoker, rank?, suit?}`, the shape clients
//! already speak. Deserialization rejects suited cards missing a rank or
//! suit and ranks outside `1..=13`.

use serde::{Deserialize, Serialize};

/// Card identifier, unique within a game.
///
/// Ids are assigned sequentially when a deck is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// The four suits, in observation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// All suits in observation order.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    /// Position of this suit in [`Suit::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Card rank, 1 (Ace) through 13 (King).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(1);
    pub const TWO: Rank = Rank(2);
    pub const JACK: Rank = Rank(11);
    pub const QUEEN: Rank = Rank(12);
    pub const KING: Rank = Rank(13);

    /// Number of distinct ranks.
    pub const COUNT: usize = 13;

    /// Create a rank, returning `None` outside `1..=13`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 13 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Raw rank value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Zero-based position for one-hot and histogram features.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Iterate over every rank, Ace first.
    pub fn all() -> impl Iterator<Item = Rank> {
        (1..=13).map(Rank)
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::new(value).ok_or_else(|| format!("rank {value} outside 1..=13"))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.0
    }
}

/// What is printed on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardFace {
    Suited { suit: Suit, rank: Rank },
    Joker,
}

/// A single playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CardRepr", into = "CardRepr")]
pub struct Card {
    pub id: CardId,
    pub face: CardFace,
}

impl Card {
    /// Create a suited card.
    #[must_use]
    pub const fn suited(id: CardId, suit: Suit, rank: Rank) -> Self {
        Self {
            id,
            face: CardFace::Suited { suit, rank },
        }
    }

    /// Create a joker.
    #[must_use]
    pub const fn joker(id: CardId) -> Self {
        Self {
            id,
            face: CardFace::Joker,
        }
    }

    #[must_use]
    pub const fn is_joker(&self) -> bool {
        matches!(self.face, CardFace::Joker)
    }

    /// Rank of a suited card, `None` for jokers.
    #[must_use]
    pub const fn rank(&self) -> Option<Rank> {
        match self.face {
            CardFace::Suited { rank, .. } => Some(rank),
            CardFace::Joker => None,
        }
    }

    /// Suit of a suited card, `None` for jokers.
    #[must_use]
    pub const fn suit(&self) -> Option<Suit> {
        match self.face {
            CardFace::Suited { suit, .. } => Some(suit),
            CardFace::Joker => None,
        }
    }

    /// Check whether this card has the given rank.
    #[must_use]
    pub fn has_rank(&self, rank: Rank) -> bool {
        self.rank() == Some(rank)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.face {
            CardFace::Suited { suit, rank } => write!(f, "{}:{:?}", rank.value(), suit),
            CardFace::Joker => write!(f, "Joker"),
        }
    }
}

/// Flat wire representation of a card.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRepr {
    id: CardId,
    #[serde(default)]
    is_joker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rank: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suit: Option<Suit>,
}

impl TryFrom<CardRepr> for Card {
    type Error = String;

    fn try_from(repr: CardRepr) -> Result<Self, Self::Error> {
        if repr.is_joker {
            return Ok(Card::joker(repr.id));
        }
        match (repr.suit, repr.rank) {
            (Some(suit), Some(rank)) => Ok(Card::suited(repr.id, suit, rank)),
            _ => Err(format!("suited card {} needs both rank and suit", repr.id)),
        }
    }
}

impl From<Card> for CardRepr {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            is_joker: card.is_joker(),
            rank: card.rank(),
            suit: card.suit(),
        }
    }
}
