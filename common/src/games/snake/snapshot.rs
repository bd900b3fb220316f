//! JSON shapes exchanged with the external decision service.
//!
//! Every frame is `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use super::game_state::SnakeGame;
use super::types::Heading;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Head first.
    pub snake_position: Vec<[i32; 2]>,
    pub food_position: [i32; 2],
    pub score: u32,
    pub direction: Heading,
    pub game_over: bool,
}

impl Snapshot {
    pub fn of(game: &SnakeGame) -> Self {
        Self {
            snake_position: game.snake().segments().map(Into::into).collect(),
            food_position: game.food().into(),
            score: game.score(),
            direction: game.heading(),
            game_over: game.status().is_terminal(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    GameState(Snapshot),
    GameOver(Snapshot),
}

impl OutboundMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundMessage::GameState(_) => "game_state",
            OutboundMessage::GameOver(_) => "game_over",
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to encode {}: {}", self.event_name(), e))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDecision {
    pub action: Heading,
}

/// Aggregates published by the decision service; display only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiStats {
    pub games_played: u32,
    pub ai_high_score: u32,
    pub average_score: f64,
    pub exploration_rate: f64,
    pub total_reward: f64,
    pub scores: Vec<u32>,
    pub rewards: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    AiDecision(AiDecision),
    AiStatsUpdate(AiStats),
}

impl InboundMessage {
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Unrecognized inbound message: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::games::snake::grid::Grid;
    use crate::games::snake::types::Position;

    #[test]
    fn test_game_state_wire_shape() {
        let game = SnakeGame::with_state(
            Grid::default(),
            &[Position::new(6, 5), Position::new(5, 5)],
            Heading::Right,
            Position::new(1, 2),
            1,
        );
        let message = OutboundMessage::GameState(Snapshot::of(&game));
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "game_state",
                "data": {
                    "snake_position": [[6, 5], [5, 5]],
                    "food_position": [1, 2],
                    "score": 0,
                    "direction": "right",
                    "game_over": false
                }
            })
        );
    }

    #[test]
    fn test_terminal_snapshot_is_flagged() {
        let mut game = SnakeGame::with_state(
            Grid::default(),
            &[Position::new(0, 0)],
            Heading::Up,
            Position::new(4, 4),
            1,
        );
        game.step();
        let snapshot = Snapshot::of(&game);
        assert!(snapshot.game_over);
        assert_eq!(snapshot.snake_position, vec![[0, 0]]);
        assert_eq!(OutboundMessage::GameOver(snapshot).event_name(), "game_over");
    }

    #[test]
    fn test_decision_parses() {
        let message = InboundMessage::from_json(r#"{"event":"ai_decision","data":{"action":"left"}}"#).unwrap();
        assert_eq!(message, InboundMessage::AiDecision(AiDecision { action: Heading::Left }));
    }

    #[test]
    fn test_stats_tolerate_missing_fields() {
        let text = r#"{"event":"ai_stats_update","data":{"games_played":3,"average_score":12.5,"scores":[10,20,0]}}"#;
        let InboundMessage::AiStatsUpdate(stats) = InboundMessage::from_json(text).unwrap() else {
            panic!("expected stats");
        };
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.scores, vec![10, 20, 0]);
        assert!(stats.rewards.is_empty());
    }

    #[test]
    fn test_unknown_event_and_bad_action_rejected() {
        assert!(InboundMessage::from_json(r#"{"event":"reset_game","data":{}}"#).is_err());
        assert!(InboundMessage::from_json(r#"{"event":"ai_decision","data":{"action":"north"}}"#).is_err());
        assert!(InboundMessage::from_json("not json").is_err());
    }
}
