use std::time::Duration;

use super::game_state::{SnakeGame, StepOutcome};
use super::snapshot::{OutboundMessage, Snapshot};
use super::types::{Heading, RunStatus};

pub const AUTO_RESTART_DELAY: Duration = Duration::from_millis(1000);

/// Outbound half of the external decision channel.
///
/// Implementations must not block; when the channel is down `emit` drops
/// the message.
pub trait DecisionSink {
    fn emit(&self, message: OutboundMessage);
}

/// The only place automated control touches the game. Inbound decisions
/// go through `SnakeGame::set_heading` like manual keys do.
pub struct DecisionBridge<S: DecisionSink> {
    sink: S,
    automated: bool,
    restart_delay: Duration,
}

impl<S: DecisionSink> DecisionBridge<S> {
    pub fn new(sink: S, restart_delay: Duration) -> Self {
        Self {
            sink,
            automated: false,
            restart_delay,
        }
    }

    pub fn is_automated(&self) -> bool {
        self.automated
    }

    /// Switching on mid-game sends the current state so the decision
    /// service can answer before the next tick.
    pub fn set_automated(&mut self, automated: bool, game: &SnakeGame) {
        self.automated = automated;
        if automated && game.status() == RunStatus::Running {
            self.sink.emit(OutboundMessage::GameState(Snapshot::of(game)));
        }
    }

    pub fn apply_decision(&self, game: &mut SnakeGame, action: Heading) -> bool {
        self.automated && game.set_heading(action)
    }

    pub fn apply_manual(&self, game: &mut SnakeGame, heading: Heading) -> bool {
        !self.automated && game.set_heading(heading)
    }

    /// Called after every `step()`. Returns the auto-restart delay when the
    /// step ended an automated game.
    pub fn after_step(&self, game: &SnakeGame, outcome: &StepOutcome) -> Option<Duration> {
        if !self.automated {
            return None;
        }

        if outcome.ended.is_some() {
            self.sink.emit(OutboundMessage::GameOver(Snapshot::of(game)));
            return Some(self.restart_delay);
        }

        if game.status() == RunStatus::Running {
            self.sink.emit(OutboundMessage::GameState(Snapshot::of(game)));
        }
        None
    }
}
