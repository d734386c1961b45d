//! The transition function.
//!
//! [`transition`] maps `(state, action)` to a new state and never touches
//! the state it was given. Legality of *which* card is played is the
//! caller's concern (see [`is_valid_play`](super::is_valid_play)); the
//! engine only rejects actions it cannot apply at all: bad indices, a
//! finished game, a game that has not started.
//!
//! ## Composition
//!
//! Playing a card and applying its effect are two separate actions. Callers
//! issue `PLAY_CARD`, then `APPLY_SPECIAL_EFFECT` for special cards, then
//! `NEXT_TURN`. [`play_with_effect`] bundles the first two.

use tracing::debug;

use super::legality::{attack_value, change_direction, has_special_effect, is_valid_play};
use crate::core::{Action, ActionPayload, Card, GameState, GameStatus, Rank};
use crate::error::{OneCardError, Result};

/// Outcome of a single engine step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepResult {
    /// State after the action.
    pub state: GameState,
    /// Whether the game is finished.
    pub done: bool,
    /// The action that was applied.
    pub action: Action,
}

/// Apply `action` to `state`, returning the new state.
///
/// ## Errors
///
/// - `InvalidState`: the game is finished, or a turn action arrives before
///   the game has started, or there is no card to flip on start
/// - `IllegalAction`: a seat or card index is out of range, or a draw of 0
pub fn transition(state: &GameState, action: &Action) -> Result<GameState> {
    if state.is_finished() {
        return Err(OneCardError::InvalidState(format!(
            "{} after the game has finished",
            action.kind()
        )));
    }

    match action {
        Action::StartGame => start_game(state),
        Action::PlayCard {
            player_index,
            card_index,
        } => {
            require_playing(state, action)?;
            play_card(state, *player_index, *card_index)
        }
        Action::DrawCard { amount } => {
            require_playing(state, action)?;
            draw_cards(state, *amount)
        }
        Action::NextTurn => {
            require_playing(state, action)?;
            let mut next = state.clone();
            next.current_player_index = state.next_player_index();
            Ok(next)
        }
        Action::ApplySpecialEffect { effect_card } => {
            require_playing(state, action)?;
            Ok(apply_special_effect(state, effect_card.as_ref()))
        }
        Action::EndGame { winner_index } => end_game(state, *winner_index),
    }
}

/// Apply a wire payload. An unrecognized `type` returns the state unchanged.
pub fn transition_payload(state: &GameState, payload: ActionPayload) -> Result<GameState> {
    let kind = payload.kind.clone();
    match payload.into_action()? {
        Some(action) => transition(state, &action),
        None => {
            debug!(action_type = %kind, "ignoring unrecognized action type");
            Ok(state.clone())
        }
    }
}

/// Apply `action` and report whether the game is over.
pub fn step(state: &GameState, action: Action) -> Result<StepResult> {
    let state = transition(state, &action)?;
    let done = state.is_finished();
    Ok(StepResult {
        state,
        done,
        action,
    })
}

/// Apply actions in order, stopping once the game finishes.
pub fn apply_actions(
    state: &GameState,
    actions: impl IntoIterator<Item = Action>,
) -> Result<GameState> {
    let mut current = state.clone();
    for action in actions {
        if current.is_finished() {
            break;
        }
        current = transition(&current, &action)?;
    }
    Ok(current)
}

/// Play a card and, if it carries an effect and the game goes on, apply it.
pub fn play_with_effect(
    state: &GameState,
    player_index: usize,
    card_index: usize,
) -> Result<StepResult> {
    let card = card_at(state, player_index, card_index)?;
    let action = Action::play(player_index, card_index);

    let mut next = transition(state, &action)?;
    if has_special_effect(&card) && !next.is_finished() {
        next = transition(&next, &Action::effect(card))?;
    }

    let done = next.is_finished();
    Ok(StepResult {
        state: next,
        done,
        action,
    })
}

/// Actions the current player could legally take: each playable card, then
/// a draw when the hand has room.
#[must_use]
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    let (Some(player), Some(top)) = (state.current_player(), state.top_card()) else {
        return Vec::new();
    };
    if !state.is_playing() {
        return Vec::new();
    }

    let seat = state.current_player_index;
    let mut actions: Vec<Action> = player
        .hand
        .iter()
        .enumerate()
        .filter(|(_, card)| is_valid_play(card, top, state.damage))
        .map(|(index, _)| Action::play(seat, index))
        .collect();
    if player.hand_len() < state.settings.max_hand_size {
        actions.push(Action::draw(state.damage.max(1)));
    }
    actions
}

fn require_playing(state: &GameState, action: &Action) -> Result<()> {
    if state.game_status == GameStatus::Playing {
        Ok(())
    } else {
        Err(OneCardError::InvalidState(format!(
            "{} before the game has started",
            action.kind()
        )))
    }
}

fn card_at(state: &GameState, player_index: usize, card_index: usize) -> Result<Card> {
    let player = state.players.get(player_index).ok_or_else(|| {
        OneCardError::IllegalAction(format!(
            "player index {player_index} out of {} seats",
            state.player_count()
        ))
    })?;
    player.hand.get(card_index).copied().ok_or_else(|| {
        OneCardError::IllegalAction(format!(
            "card index {card_index} out of {} cards",
            player.hand_len()
        ))
    })
}

fn start_game(state: &GameState) -> Result<GameState> {
    let mut next = GameState::with_rng(state.settings.clone(), state.rng().clone())?;
    let opening = next
        .deck
        .pop_back()
        .ok_or_else(|| OneCardError::InvalidState("no card left to flip".into()))?;
    next.discard_pile.push_front(opening);
    next.game_status = GameStatus::Playing;
    Ok(next)
}

fn play_card(state: &GameState, player_index: usize, card_index: usize) -> Result<GameState> {
    card_at(state, player_index, card_index)?;

    let mut next = state.clone();
    let mut played = None;
    if let Some(player) = next.players.get_mut(player_index) {
        played = Some(player.hand.remove(card_index));
    }
    if let Some(card) = played {
        next.discard_pile.push_front(card);
    }

    if let Some(winner) = next.players.iter().find(|p| p.hand.is_empty()).cloned() {
        next.game_status = GameStatus::Finished;
        next.winner = Some(winner);
    }
    Ok(next)
}

fn draw_cards(state: &GameState, amount: u32) -> Result<GameState> {
    if amount == 0 {
        return Err(OneCardError::IllegalAction("draw amount must be at least 1".into()));
    }

    let mut next = state.clone();
    let seat = next.current_player_index;
    let max_hand_size = next.settings.max_hand_size;

    for _ in 0..amount {
        let hand_len = next.players.get(seat).map_or(0, |p| p.hand_len());
        if hand_len >= max_hand_size {
            break;
        }
        if next.deck.is_empty() {
            next.reshuffle_discard();
        }
        let Some(card) = next.deck.pop_front() else {
            break;
        };
        if let Some(player) = next.players.get_mut(seat) {
            player.hand.push_back(card);
        }
    }

    next.damage = 0;
    Ok(next)
}

fn apply_special_effect(state: &GameState, effect_card: Option<&Card>) -> GameState {
    let Some(card) = effect_card else {
        return state.clone();
    };

    let mut next = state.clone();
    next.current_player_index = match card.rank() {
        Some(rank) if rank == Rank::JACK => state.next_player_index(),
        Some(rank) if rank == Rank::KING => state.prev_player_index(),
        _ => state.current_player_index,
    };
    next.direction = change_direction(card, state.direction);
    next.damage = state.damage + attack_value(card);
    next
}

fn end_game(state: &GameState, winner_index: usize) -> Result<GameState> {
    let winner = state.players.get(winner_index).cloned().ok_or_else(|| {
        OneCardError::IllegalAction(format!(
            "winner index {winner_index} out of {} seats",
            state.player_count()
        ))
    })?;

    let mut next = state.clone();
    next.game_status = GameStatus::Finished;
    next.winner = Some(winner);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, Direction, GameSettings, Suit};
    use im::Vector;

    fn card(id: u32, rank: u8, suit: Suit) -> Card {
        Card::suited(CardId(id), suit, Rank::new(rank).unwrap())
    }

    fn started(settings: GameSettings) -> GameState {
        let waiting = GameState::with_seed(settings, 11).unwrap();
        transition(&waiting, &Action::StartGame).unwrap()
    }

    #[test]
    fn test_start_game_flips_one_card() {
        let state = started(GameSettings::default());

        assert_eq!(state.game_status, GameStatus::Playing);
        assert_eq!(state.deck.len(), 41);
        assert_eq!(state.discard_pile.len(), 1);
        assert!(state.players.iter().all(|p| p.hand_len() == 5));
        assert!(state.verify_integrity().is_ok());
    }

    #[test]
    fn test_start_game_is_deterministic_per_rng() {
        let waiting = GameState::with_seed(GameSettings::default(), 3).unwrap();
        let a = transition(&waiting, &Action::StartGame).unwrap();
        let b = transition(&waiting, &Action::StartGame).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_turn_actions_require_started_game() {
        let waiting = GameState::with_seed(GameSettings::default(), 1).unwrap();
        let result = transition(&waiting, &Action::NextTurn);
        assert!(matches!(result, Err(OneCardError::InvalidState(_))));
    }

    #[test]
    fn test_play_card_moves_card_to_top() {
        let state = started(GameSettings::default());
        let played = state.players[0].hand[2];

        let next = transition(&state, &Action::play(0, 2)).unwrap();

        assert_eq!(next.top_card(), Some(&played));
        assert_eq!(next.players[0].hand_len(), 4);
        assert_eq!(state.players[0].hand_len(), 5);
        assert!(next.verify_integrity().is_ok());
    }

    #[test]
    fn test_play_card_rejects_bad_indices() {
        let state = started(GameSettings::default());
        assert!(matches!(
            transition(&state, &Action::play(5, 0)),
            Err(OneCardError::IllegalAction(_))
        ));
        assert!(matches!(
            transition(&state, &Action::play(0, 5)),
            Err(OneCardError::IllegalAction(_))
        ));
    }

    #[test]
    fn test_draw_stops_at_max_hand() {
        let state = started(GameSettings::default().with_max_hand_size(7));
        let next = transition(&state, &Action::draw(10)).unwrap();
        assert_eq!(next.players[0].hand_len(), 7);
        assert_eq!(next.damage, 0);
    }

    #[test]
    fn test_draw_takes_front_of_deck() {
        let state = started(GameSettings::default());
        let front = *state.deck.front().unwrap();
        let next = transition(&state, &Action::draw(1)).unwrap();
        assert_eq!(next.players[0].hand.back(), Some(&front));
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut state = started(GameSettings::default());
        let mut discard = state.discard_pile.clone();
        discard.append(state.deck.clone());
        state.deck = Vector::new();
        state.discard_pile = discard;
        let top = state.discard_pile[0];

        let next = transition(&state, &Action::draw(2)).unwrap();

        assert_eq!(next.discard_pile, Vector::unit(top));
        assert_eq!(next.players[0].hand_len(), 7);
        assert_eq!(next.deck.len(), 39);
        assert!(next.verify_integrity().is_ok());
    }

    #[test]
    fn test_draw_with_nothing_to_draw_still_clears_damage() {
        let mut state = started(GameSettings::default());
        let top = state.discard_pile[0];
        let stash: Vector<Card> = state.deck.clone();
        state.deck = Vector::new();
        state.discard_pile = Vector::unit(top);
        state.players[1].hand.append(stash);
        state.damage = 5;

        let next = transition(&state, &Action::draw(3)).unwrap();

        assert_eq!(next.players[0].hand_len(), 5);
        assert_eq!(next.damage, 0);
    }

    #[test]
    fn test_next_turn_wraps() {
        let mut state = started(GameSettings::default().with_players(3));
        state.current_player_index = 2;
        let next = transition(&state, &Action::NextTurn).unwrap();
        assert_eq!(next.current_player_index, 0);

        state.direction = Direction::Counterclockwise;
        state.current_player_index = 0;
        let next = transition(&state, &Action::NextTurn).unwrap();
        assert_eq!(next.current_player_index, 2);
    }

    #[test]
    fn test_jack_and_king_shift_current() {
        let mut state = started(GameSettings::default().with_players(4));
        state.current_player_index = 1;

        let jack = transition(&state, &Action::effect(card(900, 11, Suit::Clubs))).unwrap();
        assert_eq!(jack.current_player_index, 2);

        let king = transition(&state, &Action::effect(card(901, 13, Suit::Clubs))).unwrap();
        assert_eq!(king.current_player_index, 0);
    }

    #[test]
    fn test_damage_accumulates() {
        let state = started(GameSettings::default());
        let two = card(900, 2, Suit::Hearts);
        let ace = card(901, 1, Suit::Hearts);

        let next = apply_actions(
            &state,
            [Action::effect(two), Action::effect(ace), Action::effect(Card::joker(CardId(902)))],
        )
        .unwrap();
        assert_eq!(next.damage, 14);
    }

    #[test]
    fn test_effect_without_card_is_noop() {
        let state = started(GameSettings::default());
        let next = transition(&state, &Action::ApplySpecialEffect { effect_card: None }).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_end_game_sets_winner() {
        let state = started(GameSettings::default());
        let result = step(&state, Action::EndGame { winner_index: 1 }).unwrap();
        assert!(result.done);
        assert_eq!(result.state.winner.as_ref().map(|w| w.id.as_str()), Some("player-1"));

        assert!(matches!(
            transition(&result.state, &Action::NextTurn),
            Err(OneCardError::InvalidState(_))
        ));
        assert!(matches!(
            transition(&state, &Action::EndGame { winner_index: 4 }),
            Err(OneCardError::IllegalAction(_))
        ));
    }

    #[test]
    fn test_unknown_payload_is_noop() {
        let state = started(GameSettings::default());
        let next = transition_payload(&state, ActionPayload::of_kind("TELEPORT")).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_play_with_effect_applies_queen() {
        let mut state = started(GameSettings::default());
        state.players[0].hand.push_front(card(900, 12, Suit::Spades));

        let result = play_with_effect(&state, 0, 0).unwrap();

        assert_eq!(result.state.direction, Direction::Counterclockwise);
        assert_eq!(result.action, Action::play(0, 0));
        assert!(!result.done);
    }

    #[test]
    fn test_play_with_effect_skips_effect_on_win() {
        let mut state = started(GameSettings::default());
        state.players[0].hand = Vector::unit(card(900, 2, Suit::Spades));

        let result = play_with_effect(&state, 0, 0).unwrap();

        assert!(result.done);
        assert_eq!(result.state.damage, 0);
    }

    #[test]
    fn test_legal_actions_include_draw() {
        let state = started(GameSettings::default());
        let actions = legal_actions(&state);
        assert_eq!(actions.last(), Some(&Action::draw(1)));
    }
}
