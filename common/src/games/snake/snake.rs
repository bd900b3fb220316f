use std::collections::{HashSet, VecDeque};

use super::types::Position;

/// Head-first body. `body_set` mirrors `body` for O(1) occupancy checks.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Position>,
    body_set: HashSet<Position>,
}

impl Snake {
    pub fn new(start: Position) -> Self {
        let mut body = VecDeque::new();
        let mut body_set = HashSet::new();
        body.push_back(start);
        body_set.insert(start);
        Self { body, body_set }
    }

    #[cfg(test)]
    pub(crate) fn from_segments(segments: &[Position]) -> Self {
        let mut snake = Self::new(segments[0]);
        for &segment in &segments[1..] {
            assert!(snake.body_set.insert(segment), "duplicate segment {}", segment);
            snake.body.push_back(segment);
        }
        snake
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body_set.contains(&pos)
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub(super) fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
        self.body_set.insert(pos);
    }

    /// Never removes the last remaining segment.
    pub(super) fn pop_tail(&mut self) {
        if self.body.len() > 1
            && let Some(tail) = self.body.pop_back()
        {
            self.body_set.remove(&tail);
        }
    }
}
