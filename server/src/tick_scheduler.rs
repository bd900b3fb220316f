use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// Drives the game at a fixed cadence through a channel of `Tick`s.
///
/// Every `start` bumps the generation; ticks from an older timer that are
/// still queued fail `is_current` and must be dropped by the receiver.
pub struct TickScheduler {
    sender: mpsc::Sender<Tick>,
    task: Option<JoinHandle<()>>,
    interval: Duration,
    generation: u64,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> (Self, mpsc::Receiver<Tick>) {
        // Capacity 1: a tick that finds the previous one unconsumed is dropped.
        let (sender, receiver) = mpsc::channel(1);
        let scheduler = Self {
            sender,
            task: None,
            interval,
            generation: 0,
        };
        (scheduler, receiver)
    }

    pub fn start(&mut self, interval: Duration) {
        self.stop();
        self.interval = interval;
        self.generation += 1;
        self.task = Some(tokio::spawn(run_timer(
            interval,
            self.generation,
            self.sender.clone(),
        )));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Restarts the timer when running; time already elapsed is discarded.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        if self.is_running() {
            self.start(interval);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_current(&self, tick: Tick) -> bool {
        self.is_running() && tick.generation == self.generation
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(period: Duration, generation: u64, sender: mpsc::Sender<Tick>) {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        timer.tick().await;
        match sender.try_send(Tick { generation }) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Closed(_)) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    const NORMAL: Duration = Duration::from_millis(200);
    const FAST: Duration = Duration::from_millis(50);

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected about {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_interval() {
        let (mut scheduler, mut ticks) = TickScheduler::new(NORMAL);
        let started = Instant::now();
        scheduler.start(NORMAL);

        let tick = ticks.recv().await.unwrap();
        assert!(scheduler.is_current(tick));
        assert_close(started.elapsed(), NORMAL);

        ticks.recv().await.unwrap();
        assert_close(started.elapsed(), NORMAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_silences_timer() {
        let (mut scheduler, mut ticks) = TickScheduler::new(NORMAL);
        scheduler.start(NORMAL);
        scheduler.stop();

        assert!(!scheduler.is_running());
        assert!(timeout(Duration::from_secs(2), ticks.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_restarts_and_discards_elapsed_time() {
        let (mut scheduler, mut ticks) = TickScheduler::new(NORMAL);
        let started = Instant::now();
        scheduler.start(NORMAL);

        sleep(Duration::from_millis(120)).await;
        scheduler.set_interval(FAST);
        assert_eq!(scheduler.interval(), FAST);

        let tick = ticks.recv().await.unwrap();
        assert!(scheduler.is_current(tick));
        assert_close(started.elapsed(), Duration::from_millis(170));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_while_stopped_does_not_start() {
        let (mut scheduler, mut ticks) = TickScheduler::new(NORMAL);
        scheduler.set_interval(FAST);
        assert!(!scheduler.is_running());
        assert!(timeout(Duration::from_secs(1), ticks.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_tick_is_not_current() {
        let (mut scheduler, mut ticks) = TickScheduler::new(NORMAL);
        scheduler.start(NORMAL);
        sleep(NORMAL + Duration::from_millis(10)).await;

        scheduler.start(NORMAL);
        let stale = ticks.recv().await.unwrap();
        assert!(!scheduler.is_current(stale));

        let fresh = ticks.recv().await.unwrap();
        assert!(scheduler.is_current(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconsumed_ticks_do_not_pile_up() {
        let (mut scheduler, mut ticks) = TickScheduler::new(FAST);
        scheduler.start(FAST);
        sleep(FAST * 10 + Duration::from_millis(10)).await;

        assert!(ticks.try_recv().is_ok());
        assert!(ticks.try_recv().is_err());
    }
}
