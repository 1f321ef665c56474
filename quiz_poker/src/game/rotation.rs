//! Seat rotation helpers. Pure functions over the seat-ordered player list.

use super::entities::Player;

/// Seat of the dealer for a round (rounds are 1-indexed).
///
/// The dealer button rotates over in-play seats only, so inactive and
/// eliminated players are never dealt the button. Returns `None` when
/// nobody is in play.
#[must_use]
pub fn dealer_for_round(round_number: u32, players: &[Player]) -> Option<usize> {
    let in_play: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_in_play())
        .map(|(idx, _)| idx)
        .collect();

    if in_play.is_empty() {
        return None;
    }

    let turn = round_number.saturating_sub(1) as usize % in_play.len();
    Some(in_play[turn])
}

/// Next seat after `from` that can still act, searching forward and
/// wrapping around. `from` itself is considered last.
#[must_use]
pub fn next_to_act(from: usize, players: &[Player]) -> Option<usize> {
    let n = players.len();
    (1..=n)
        .map(|offset| (from + offset) % n)
        .find(|&idx| players[idx].is_in_play() && !players[idx].has_folded)
}
