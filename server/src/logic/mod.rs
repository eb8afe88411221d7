use std::{env, sync::Arc, time::Instant};

use dashmap::{DashMap, Entry};
use nanoid::nanoid;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use minesweeper_core::{Game, GameError, GameParams, GameStatus, Move};

/// Live games keyed by session id.
pub type Sessions = Arc<DashMap<String, Arc<Mutex<Session>>>>;

pub struct Session {
    game: Game,
    last_activity: Instant,
}

/// Largest width or height accepted for a new game.
pub fn max_field_dimension() -> usize {
    env::var("MAX_FIELD_DIMENSION")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100)
}

/// Rejects boards the server does not want to hold in memory. The engine
/// validates the mine count itself.
pub fn validate_params(params: &GameParams) -> Result<(), String> {
    let max = max_field_dimension();
    if params.width > max || params.height > max {
        return Err(format!(
            "field of {}x{} exceeds the maximum dimension of {}",
            params.width, params.height, max
        ));
    }
    Ok(())
}

impl Session {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            last_activity: Instant::now(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Replaces the current game wholesale.
    pub fn restart(&mut self, game: Game) {
        self.game = game;
        self.last_activity = Instant::now();
    }

    pub fn should_cleanup(&self, inactive_timeout_secs: u64) -> bool {
        let elapsed = Instant::now().duration_since(self.last_activity).as_secs();
        elapsed > inactive_timeout_secs
    }

    pub fn play(&mut self, mv: Move) -> Result<GameStatus, GameError> {
        self.last_activity = Instant::now();
        let status = self.game.play(mv)?;
        let pos = mv.pos();
        match status {
            GameStatus::Lost => info!("Mine hit at ({}, {}), game lost", pos.x, pos.y),
            GameStatus::Won => info!("All mines flagged, game won"),
            GameStatus::Playing => {}
        }
        Ok(status)
    }
}

/// Stores `session` under a fresh id, growing the id length when collisions
/// keep happening.
#[instrument(level = "trace", skip(sessions, session))]
pub fn add_session(sessions: &Sessions, session: Session) -> String {
    let mut id_length = 12;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match sessions.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Session ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(session)));
                    info!("Created new session with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

pub fn get_session(sessions: &Sessions, id: &str) -> Option<Arc<Mutex<Session>>> {
    sessions.get(id).map(|entry| entry.value().clone())
}

#[cfg(test)]
mod tests {
    use minesweeper_core::{Field, Pos};

    use super::*;

    fn session() -> Session {
        Session::new(Game::from_field(
            Field::with_mines(2, 2, &[(0, 0)]).unwrap(),
        ))
    }

    #[test]
    fn add_session_stores_under_new_id() {
        let sessions: Sessions = Arc::new(DashMap::new());
        let a = add_session(&sessions, session());
        let b = add_session(&sessions, session());

        assert_ne!(a, b);
        assert_eq!(a.len(), 12);
        assert!(get_session(&sessions, &a).is_some());
        assert!(get_session(&sessions, "missing").is_none());
    }

    #[test]
    fn fresh_session_is_kept() {
        assert!(!session().should_cleanup(60));
    }

    #[test]
    fn moves_update_status() {
        let mut session = session();
        assert_eq!(
            session.play(Move::Reveal { pos: Pos { x: 1, y: 1 } }),
            Ok(GameStatus::Playing)
        );
        assert_eq!(
            session.play(Move::Flag { pos: Pos { x: 0, y: 0 } }),
            Ok(GameStatus::Won)
        );
        assert_eq!(
            session.play(Move::Unflag { pos: Pos { x: 0, y: 0 } }),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn oversized_params_rejected() {
        let params = GameParams {
            width: 10_000,
            height: 2,
            mines: 1,
        };
        assert!(validate_params(&params).is_err());
        assert!(validate_params(&GameParams::default()).is_ok());
    }
}
