//! JSON shapes exchanged with presentation clients over `/ws`.

use serde::{Deserialize, Serialize};

use common::games::snake::{AiStats, EndReason, Heading, RunStatus, SnakeGame, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerCommand {
    Direction { direction: Heading },
    Play,
    Restart,
    ToggleAi,
    ToggleFast,
}

impl ViewerCommand {
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Unrecognized viewer command: {}", e))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub status: RunStatus,
    pub end_reason: Option<EndReason>,
    pub high_score: u32,
    pub ai_mode: bool,
    pub fast_mode: bool,
    pub grid_width: i32,
    pub grid_height: i32,
}

impl GameView {
    pub fn of(game: &SnakeGame, high_score: u32, ai_mode: bool, fast_mode: bool) -> Self {
        Self {
            snapshot: Snapshot::of(game),
            status: game.status(),
            end_reason: game.end_reason(),
            high_score,
            ai_mode,
            fast_mode,
            grid_width: game.grid().width,
            grid_height: game.grid().height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOverView {
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub reason: EndReason,
    /// The restart overlay is only for a human player.
    pub show_overlay: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    State(GameView),
    GameOver(GameOverView),
    AiStats(AiStats),
}

impl ViewEvent {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to encode view event: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::games::SessionRng;
    use serde_json::json;

    #[test]
    fn test_commands_parse() {
        assert_eq!(
            ViewerCommand::from_json(r#"{"type":"direction","direction":"up"}"#).unwrap(),
            ViewerCommand::Direction { direction: Heading::Up }
        );
        assert_eq!(ViewerCommand::from_json(r#"{"type":"toggle_ai"}"#).unwrap(), ViewerCommand::ToggleAi);
        assert_eq!(ViewerCommand::from_json(r#"{"type":"play"}"#).unwrap(), ViewerCommand::Play);
        assert!(ViewerCommand::from_json(r#"{"type":"direction","direction":"sideways"}"#).is_err());
        assert!(ViewerCommand::from_json(r#"{"type":"pause"}"#).is_err());
    }

    #[test]
    fn test_state_event_flattens_snapshot() {
        let game = SnakeGame::new(SessionRng::new(8));
        let event = ViewEvent::State(GameView::of(&game, 40, true, false));
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "state");
        assert_eq!(value["snake_position"], json!([[5, 5]]));
        assert_eq!(value["direction"], "right");
        assert_eq!(value["high_score"], 40);
        assert_eq!(value["ai_mode"], true);
        assert_eq!(value["grid_width"], 12);
        assert!(value["end_reason"].is_null());
    }

    #[test]
    fn test_game_over_event_shape() {
        let event = ViewEvent::GameOver(GameOverView {
            score: 30,
            high_score: 30,
            new_high_score: true,
            reason: EndReason::WallCollision,
            show_overlay: true,
        });
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "game_over");
        assert_eq!(value["new_high_score"], true);
        assert_eq!(value["show_overlay"], true);
    }
}
