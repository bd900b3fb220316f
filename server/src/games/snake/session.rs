use std::future::pending;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use common::games::snake::{
    AiStats, DecisionBridge, DecisionSink, EndReason, Heading, HighScoreTracker, RunStatus, SnakeGame,
};
use common::log;
use common::store::KeyValueStore;

use super::view::{GameOverView, GameView, ViewEvent, ViewerCommand};
use crate::broadcaster::ViewerBroadcaster;
use crate::server_config::ServerSettings;
use crate::tick_scheduler::{Tick, TickScheduler};

#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    Viewer(ViewerCommand),
    AiDecision(Heading),
    AiStats(AiStats),
    /// Resend the current view, e.g. to a freshly connected viewer.
    Refresh,
}

/// Owns the one running game. Everything that touches it arrives through
/// `run`, so at most one step is ever in flight.
pub struct GameSession<S: KeyValueStore, D: DecisionSink + Send + 'static> {
    game: SnakeGame,
    scheduler: TickScheduler,
    ticks: mpsc::Receiver<Tick>,
    bridge: DecisionBridge<D>,
    high_scores: HighScoreTracker<S>,
    viewers: ViewerBroadcaster,
    settings: ServerSettings,
    fast_mode: bool,
    pending_restart: Option<Instant>,
}

impl<S: KeyValueStore, D: DecisionSink + Send + 'static> GameSession<S, D> {
    pub fn new(
        game: SnakeGame,
        store: S,
        sink: D,
        viewers: ViewerBroadcaster,
        settings: ServerSettings,
    ) -> Self {
        let (scheduler, ticks) = TickScheduler::new(settings.normal_tick());
        Self {
            game,
            scheduler,
            ticks,
            bridge: DecisionBridge::new(sink, settings.auto_restart_delay()),
            high_scores: HighScoreTracker::load(store),
            viewers,
            settings,
            fast_mode: false,
            pending_restart: None,
        }
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        log!(
            "Game session started (seed {}, high score {})",
            self.game.seed(),
            self.high_scores.best()
        );

        loop {
            tokio::select! {
                Some(tick) = self.ticks.recv() => {
                    if self.scheduler.is_current(tick) {
                        self.on_tick().await;
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                _ = wait_for(self.pending_restart) => {
                    log!("Auto-restarting game");
                    self.restart().await;
                }
            }
        }

        self.scheduler.stop();
        log!("Game session stopped");
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Viewer(ViewerCommand::Direction { direction }) => self.on_direction(direction).await,
            SessionCommand::Viewer(ViewerCommand::Play) => self.on_play().await,
            SessionCommand::Viewer(ViewerCommand::Restart) => self.restart().await,
            SessionCommand::Viewer(ViewerCommand::ToggleAi) => self.toggle_ai().await,
            SessionCommand::Viewer(ViewerCommand::ToggleFast) => self.toggle_fast().await,
            SessionCommand::AiDecision(action) => {
                self.bridge.apply_decision(&mut self.game, action);
            }
            SessionCommand::AiStats(stats) => self.viewers.broadcast(ViewEvent::AiStats(stats)).await,
            SessionCommand::Refresh => self.publish_state().await,
        }
    }

    async fn on_tick(&mut self) {
        let outcome = self.game.step();
        if let Some(delay) = self.bridge.after_step(&self.game, &outcome) {
            self.pending_restart = Some(Instant::now() + delay);
        }
        match outcome.ended {
            Some(reason) => self.finish_game(reason).await,
            None => self.publish_state().await,
        }
    }

    async fn finish_game(&mut self, reason: EndReason) {
        self.scheduler.stop();
        let score = self.game.score();
        let new_high_score = self.high_scores.record(score);
        log!(
            "Game finished: {:?} with score {}{}",
            reason,
            score,
            if new_high_score { " (new high score)" } else { "" }
        );

        self.publish_state().await;
        self.viewers
            .broadcast(ViewEvent::GameOver(GameOverView {
                score,
                high_score: self.high_scores.best(),
                new_high_score,
                reason,
                show_overlay: !self.bridge.is_automated(),
            }))
            .await;
    }

    async fn on_direction(&mut self, heading: Heading) {
        let status = self.game.status();
        if status.is_terminal() {
            return;
        }
        if status == RunStatus::Idle {
            self.begin();
        }
        self.bridge.apply_manual(&mut self.game, heading);
        self.publish_state().await;
    }

    async fn on_play(&mut self) {
        match self.game.status() {
            RunStatus::Idle => {
                self.begin();
                self.publish_state().await;
            }
            RunStatus::Running => {
                self.scheduler.stop();
                self.pending_restart = None;
                self.game.reset();
                self.publish_state().await;
            }
            RunStatus::Over | RunStatus::Won => self.restart().await,
        }
    }

    async fn restart(&mut self) {
        self.pending_restart = None;
        self.scheduler.stop();
        self.game.reset();
        self.begin();
        self.publish_state().await;
    }

    fn begin(&mut self) {
        if self.game.start() {
            let interval = self.current_interval();
            self.scheduler.start(interval);
        }
    }

    async fn toggle_ai(&mut self) {
        let automated = !self.bridge.is_automated();
        self.bridge.set_automated(automated, &self.game);
        if !automated {
            self.pending_restart = None;
            if self.fast_mode {
                self.fast_mode = false;
                self.scheduler.set_interval(self.settings.normal_tick());
            }
        }
        log!("AI mode {}", if automated { "on" } else { "off" });
        self.publish_state().await;
    }

    async fn toggle_fast(&mut self) {
        if !self.bridge.is_automated() {
            return;
        }
        self.fast_mode = !self.fast_mode;
        let interval = self.current_interval();
        self.scheduler.set_interval(interval);
        log!(
            "Fast mode {} ({}ms per tick)",
            if self.fast_mode { "on" } else { "off" },
            self.scheduler.interval().as_millis()
        );
        self.publish_state().await;
    }

    fn current_interval(&self) -> Duration {
        if self.fast_mode {
            self.settings.fast_tick()
        } else {
            self.settings.normal_tick()
        }
    }

    async fn publish_state(&self) {
        let view = GameView::of(
            &self.game,
            self.high_scores.best(),
            self.bridge.is_automated(),
            self.fast_mode,
        );
        self.viewers.broadcast(ViewEvent::State(view)).await;
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
