//! Action masking over the discrete action space.
//!
//! The action space has `maxHandSize + 1` slots: slot `i < maxHandSize`
//! plays hand card `i` of seat 0, the last slot draws. A mask marks the
//! legal slots; masking replaces illegal scores with a large negative
//! sentinel so that argmax never lands on them.

use crate::core::{Action, GameState};
use crate::error::{OneCardError, Result};
use crate::rules::is_valid_play;

/// Score written over illegal slots.
pub const MASKED_SCORE: f32 = -1.0e9;

/// Best scores at or below this mean every slot was masked.
pub const NO_ACTION_THRESHOLD: f32 = -1.0e8;

/// Legal-action mask for seat 0.
///
/// Before the opening flip every held card counts as playable.
#[must_use]
pub fn build_action_mask(state: &GameState, max_hand_size: usize) -> Vec<bool> {
    let mut mask = vec![false; max_hand_size + 1];
    let Some(seat) = state.players.front() else {
        return mask;
    };
    let hand_len = seat.hand_len();

    match state.top_card() {
        None => {
            for slot in mask.iter_mut().take(hand_len.min(max_hand_size)) {
                *slot = true;
            }
        }
        Some(top) => {
            for (slot, card) in mask.iter_mut().zip(seat.hand.iter()).take(max_hand_size) {
                *slot = is_valid_play(card, top, state.damage);
            }
        }
    }

    mask[max_hand_size] = hand_len < max_hand_size;
    mask
}

/// Replace the scores of illegal slots with [`MASKED_SCORE`].
pub fn apply_action_mask(scores: &[f32], mask: &[bool]) -> Result<Vec<f32>> {
    if scores.len() != mask.len() {
        return Err(OneCardError::DimensionMismatch {
            scores: scores.len(),
            mask: mask.len(),
        });
    }
    Ok(scores
        .iter()
        .zip(mask)
        .map(|(&score, &legal)| if legal { score } else { MASKED_SCORE })
        .collect())
}

/// Index of the best masked score; ties go to the lowest index.
///
/// NaN scores never win.
pub fn select_action(masked_scores: &[f32]) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in masked_scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    match best {
        Some((index, score)) if score > NO_ACTION_THRESHOLD => Ok(index),
        _ => Err(OneCardError::NoValidAction),
    }
}

/// Turn a selected slot back into an engine action for seat 0.
///
/// The draw slot draws `max(1, damage)` cards.
pub fn map_action_index_to_action(
    index: usize,
    state: &GameState,
    max_hand_size: usize,
) -> Result<Action> {
    if index > max_hand_size {
        return Err(OneCardError::OutOfRange {
            index,
            max: max_hand_size,
        });
    }
    if index == max_hand_size {
        return Ok(Action::draw(state.damage.max(1)));
    }

    let hand_len = state.players.front().map_or(0, |p| p.hand_len());
    if index >= hand_len {
        return Err(OneCardError::HandExceeded { index, hand_len });
    }
    Ok(Action::play(0, index))
}
