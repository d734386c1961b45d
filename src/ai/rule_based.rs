//! Rule-based move choice.
//!
//! Scan the hand in order and play the first legal card; with nothing
//! playable, draw the pending damage (at least one card).

use crate::core::{Action, GameState};
use crate::error::{OneCardError, Result};
use crate::rules::find_playable_card;

/// Pick the current player's move by brute force.
///
/// Fails with `InvalidState` when nobody is seated at the current index.
pub fn choose_rule_based_action(state: &GameState) -> Result<Action> {
    let player = state.current_player().ok_or_else(|| {
        OneCardError::InvalidState(format!(
            "no player at index {}",
            state.current_player_index
        ))
    })?;

    let playable = state
        .top_card()
        .and_then(|top| find_playable_card(player.hand.iter(), top, state.damage));

    Ok(match playable {
        Some((card_index, _)) => Action::play(state.current_player_index, card_index),
        None => Action::draw(state.damage.max(1)),
    })
}
