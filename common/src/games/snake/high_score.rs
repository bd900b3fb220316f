use crate::log;
use crate::store::KeyValueStore;

pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

pub struct HighScoreTracker<S: KeyValueStore> {
    store: S,
    best: u32,
}

impl<S: KeyValueStore> HighScoreTracker<S> {
    pub fn load(store: S) -> Self {
        let best = store.get(HIGH_SCORE_KEY).unwrap_or(0);
        Self { store, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Returns true when `score` is a new record. Equal scores never write.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.set(HIGH_SCORE_KEY, score) {
            log!("Failed to persist high score {}: {}", score, e);
        }
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_loads_stored_value() {
        let tracker = HighScoreTracker::load(MemoryStore::with_value(HIGH_SCORE_KEY, 90));
        assert_eq!(tracker.best(), 90);
    }

    #[test]
    fn test_absent_value_is_zero() {
        let tracker = HighScoreTracker::load(MemoryStore::new());
        assert_eq!(tracker.best(), 0);
    }

    #[test]
    fn test_only_strictly_greater_scores_update() {
        let mut tracker = HighScoreTracker::load(MemoryStore::with_value(HIGH_SCORE_KEY, 50));

        assert!(!tracker.record(40));
        assert!(!tracker.record(50));
        assert_eq!(tracker.store().write_count(), 0);

        assert!(tracker.record(60));
        assert_eq!(tracker.best(), 60);
        assert_eq!(tracker.store().get(HIGH_SCORE_KEY), Some(60));

        assert!(!tracker.record(60));
        assert_eq!(tracker.store().write_count(), 1);
    }

    #[test]
    fn test_zero_score_on_empty_store_is_not_a_record() {
        let mut tracker = HighScoreTracker::load(MemoryStore::new());
        assert!(!tracker.record(0));
        assert_eq!(tracker.store().get(HIGH_SCORE_KEY), None);
    }
}
