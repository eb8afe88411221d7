use serde::{Deserialize, Serialize};

use crate::{cell::CellState, game::GameStatus};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub x: isize,
    pub y: isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
    pub mines: isize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
            mines: 10,
        }
    }
}

/// A player move as sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum Move {
    #[serde(rename = "reveal")]
    Reveal { pos: Pos },
    #[serde(rename = "flag")]
    Flag { pos: Pos },
    #[serde(rename = "unflag")]
    Unflag { pos: Pos },
}

impl Move {
    pub fn pos(&self) -> Pos {
        match *self {
            Move::Reveal { pos } | Move::Flag { pos } | Move::Unflag { pos } => pos,
        }
    }
}

/// Everything a client may see of a game. Mines stay hidden until revealed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub status: GameStatus,
    pub field: Vec<Vec<CellState>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn params_fill_missing_fields() {
        let params: GameParams = serde_json::from_value(json!({ "width": 16 })).unwrap();
        assert_eq!(
            params,
            GameParams {
                width: 16,
                height: 9,
                mines: 10
            }
        );
    }

    #[test]
    fn moves_are_tagged_by_action() {
        let value = serde_json::to_value(Move::Flag {
            pos: Pos { x: 2, y: -1 },
        })
        .unwrap();
        assert_eq!(value, json!({ "action": "flag", "pos": { "x": 2, "y": -1 } }));

        let parsed: Move =
            serde_json::from_value(json!({ "action": "unflag", "pos": { "x": 0, "y": 3 } }))
                .unwrap();
        assert_eq!(parsed, Move::Unflag { pos: Pos { x: 0, y: 3 } });
        assert!(serde_json::from_value::<Move>(json!({ "action": "dig" })).is_err());
    }

    #[test]
    fn snapshot_wire_format() {
        let snapshot = GameSnapshot {
            width: 2,
            height: 1,
            mines: 1,
            status: GameStatus::Lost,
            field: vec![vec![CellState::Mine, CellState::Revealed { adjacent: 1 }]],
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "width": 2,
                "height": 1,
                "mines": 1,
                "status": "lost",
                "field": [[{ "state": "mine" }, { "state": "revealed", "adjacent": 1 }]],
            })
        );
        assert_eq!(serde_json::from_value::<GameSnapshot>(value).unwrap(), snapshot);
    }
}
