//! In-memory game rooms for online play.
//!
//! A room holds one authoritative [`GameState`], remembers which seats are
//! taken, and owns a [`CpuPlayer`] so CPU decisions in different rooms never
//! share a simulation substrate. All operations take `&mut self`, which
//! serializes decisions within a store; callers running rooms on several
//! threads wrap the store (or individual rooms) in their own lock.
//!
//! Transport is out of scope. The payload types serialize to the JSON shape
//! clients expect (`validMoves`, `gameOver`, winner as `0`/`1`/`2`).

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::cpu::{CpuPlayer, Difficulty};
use crate::generate::generate_with_report;
use crate::state::{GameResult, GameSettings, GameState, MoveError, Player};

pub type RoomId = String;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found: {0}")]
    NotFound(RoomId),

    #[error("room {0} already has two players")]
    Full(RoomId),

    #[error("illegal move: {0}")]
    Move(#[from] MoveError),

    #[error("player {0} has no legal move")]
    NoLegalMove(Player),
}

/// What gets broadcast after every move.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub state: GameState,
    /// Legal colors for the player now on turn.
    pub valid_moves: Vec<bool>,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

impl MoveOutcome {
    pub fn of(state: &GameState) -> Self {
        let game_over = state.is_game_over();
        Self {
            state: state.clone(),
            valid_moves: state.valid_moves(state.current_player),
            game_over,
            result: game_over.then(|| state.winner()),
        }
    }
}

/// A board shown before a room exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub state: GameState,
    pub valid_moves: Vec<bool>,
}

pub struct Room {
    pub id: RoomId,
    pub settings: GameSettings,
    pub state: GameState,
    seats: [bool; 2],
    cpu: CpuPlayer,
}

impl Room {
    pub fn is_seated(&self, player: Player) -> bool {
        self.seats[player.index() - 1]
    }

    pub fn is_full(&self) -> bool {
        self.seats.iter().all(|&s| s)
    }
}

pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    rng: fastrand::Rng,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Deterministic boards, room ids and CPU choices.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            rooms: HashMap::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn new_room_id(&mut self) -> RoomId {
        loop {
            let id = format!("{:016x}{:016x}", self.rng.u64(..), self.rng.u64(..));
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Open a room with a fresh board; nobody is seated yet.
    pub fn create(&mut self, settings: GameSettings) -> &Room {
        let (state, report) = generate_with_report(&settings, &mut self.rng);
        let id = self.new_room_id();
        log::info!(
            "room {} created: {}x{} with {} colors ({} attempts{})",
            id,
            settings.cols,
            settings.rows,
            settings.palette_size,
            report.attempts,
            if report.degraded { ", degraded" } else { "" }
        );
        let room = Room {
            id: id.clone(),
            settings,
            state,
            seats: [false; 2],
            cpu: CpuPlayer::with_seed(self.rng.u64(..)),
        };
        self.rooms.entry(id).or_insert(room)
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    /// Take the first free seat: player 1, then player 2.
    pub fn join(&mut self, room_id: &str) -> Result<Player, RoomError> {
        let room = self.room_mut(room_id)?;
        let player = Player::ALL
            .into_iter()
            .find(|&p| !room.is_seated(p))
            .ok_or_else(|| RoomError::Full(room_id.to_string()))?;
        room.seats[player.index() - 1] = true;
        log::info!("room {} joined by player {}", room_id, player);
        Ok(player)
    }

    pub fn apply_move(&mut self, room_id: &str, player: Player, color: u8) -> Result<MoveOutcome, RoomError> {
        let room = self.room_mut(room_id)?;
        room.state = room.state.try_apply_move(player, color)?;
        Ok(MoveOutcome::of(&room.state))
    }

    /// Let the room's CPU pick and play a color for `player`.
    pub fn cpu_move(
        &mut self,
        room_id: &str,
        player: Player,
        difficulty: Difficulty,
    ) -> Result<(u8, MoveOutcome), RoomError> {
        let room = self.room_mut(room_id)?;
        let color = room
            .cpu
            .pick_move(&room.state, player, difficulty)
            .ok_or(RoomError::NoLegalMove(player))?;
        room.state = room.state.try_apply_move(player, color)?;
        Ok((color, MoveOutcome::of(&room.state)))
    }

    /// Generate a board without opening a room.
    pub fn preview(&mut self, settings: &GameSettings) -> Preview {
        let (state, _) = generate_with_report(settings, &mut self.rng);
        let valid_moves = state.valid_moves(state.current_player);
        Preview { state, valid_moves }
    }

    /// Close a room; later requests for it fail with `NotFound`.
    pub fn remove(&mut self, room_id: &str) -> Option<Room> {
        let room = self.rooms.remove(room_id);
        if room.is_some() {
            log::info!("room {} closed", room_id);
        }
        room
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GameSettings {
        GameSettings::new(10, 8, 5).unwrap()
    }

    #[test]
    fn test_create_and_join() {
        let mut store = RoomStore::with_seed(1);
        let id = store.create(settings()).id.clone();
        assert_eq!(id.len(), 32);
        assert_eq!(store.len(), 1);

        assert_eq!(store.join(&id), Ok(Player::One));
        assert_eq!(store.join(&id), Ok(Player::Two));
        assert_eq!(store.join(&id), Err(RoomError::Full(id.clone())));
        assert!(store.get(&id).unwrap().is_full());
    }

    #[test]
    fn test_unknown_room() {
        let mut store = RoomStore::with_seed(1);
        assert_eq!(store.join("nope"), Err(RoomError::NotFound("nope".into())));
        assert!(matches!(
            store.apply_move("nope", Player::One, 0),
            Err(RoomError::NotFound(_))
        ));
    }

    #[test]
    fn test_moves_update_room_state() {
        let mut store = RoomStore::with_seed(2);
        let id = store.create(settings()).id.clone();
        let state = store.get(&id).unwrap().state.clone();

        let err = store.apply_move(&id, Player::Two, 0).unwrap_err();
        assert!(matches!(err, RoomError::Move(MoveError::NotYourTurn { .. })));
        assert_eq!(store.get(&id).unwrap().state, state);

        let color = (0..5u8).find(|&c| state.valid_moves(Player::One)[c as usize]).unwrap();
        let outcome = store.apply_move(&id, Player::One, color).unwrap();
        assert_eq!(outcome.state.current_player, Player::Two);
        assert_eq!(outcome.valid_moves, outcome.state.valid_moves(Player::Two));
        assert!(!outcome.game_over);
        assert_eq!(outcome.result, None);

        let (cpu_color, outcome) = store.cpu_move(&id, Player::Two, Difficulty::Master).unwrap();
        assert_eq!(outcome.state.player_color[2], cpu_color);
        assert_eq!(outcome.state.current_player, Player::One);
    }

    #[test]
    fn test_outcome_json_shape() {
        let state = GameState::from_parts(2, 1, 3, vec![1, 2], vec![0, 1], [0, 0, 1], Player::One);
        let json = serde_json::to_value(MoveOutcome::of(&state)).unwrap();
        assert_eq!(json["gameOver"], true);
        assert_eq!(json["result"]["winner"], 0);
        assert_eq!(json["validMoves"], serde_json::json!([false, false, true]));
        assert_eq!(json["state"]["currentPlayer"], 1);
        assert_eq!(json["state"]["playerColor"], serde_json::json!([0, 0, 1]));
    }

    #[test]
    fn test_remove_closes_room() {
        let mut store = RoomStore::with_seed(4);
        let id = store.create(settings()).id.clone();
        let other = store.create(settings()).id.clone();
        assert_eq!(store.join(&id), Ok(Player::One));

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(removed.is_seated(Player::One));
        assert!(store.remove(&id).is_none());
        assert_eq!(store.join(&id), Err(RoomError::NotFound(id.clone())));
        assert_eq!(store.len(), 1);
        assert!(store.get(&other).is_some());
    }

    #[test]
    fn test_preview_has_no_room() {
        let mut store = RoomStore::with_seed(3);
        let preview = store.preview(&settings());
        assert!(store.is_empty());
        assert_eq!(preview.valid_moves.len(), 5);
        assert_eq!(preview.state.current_player, Player::One);
    }
}
