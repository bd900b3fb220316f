mod bridge;
mod food;
mod game_state;
mod grid;
mod high_score;
mod snake;
mod snapshot;
mod types;

pub use bridge::{DecisionBridge, DecisionSink, AUTO_RESTART_DELAY};
pub use food::FoodPlacer;
pub use game_state::{SnakeGame, StepOutcome};
pub use grid::Grid;
pub use high_score::{HighScoreTracker, HIGH_SCORE_KEY};
pub use snake::Snake;
pub use snapshot::{AiDecision, AiStats, InboundMessage, OutboundMessage, Snapshot};
pub use types::{EndReason, Heading, Position, RunStatus, FOOD_REWARD, GRID_SIZE, START_HEADING, START_POSITION};
