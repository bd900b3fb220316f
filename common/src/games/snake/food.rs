use crate::games::SessionRng;
use super::grid::Grid;
use super::snake::Snake;
use super::types::Position;

const SAMPLE_ATTEMPTS_PER_CELL: usize = 4;

pub struct FoodPlacer {
    rng: SessionRng,
}

impl FoodPlacer {
    pub fn new(rng: SessionRng) -> Self {
        Self { rng }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Uniform over the cells `snake` does not cover; `None` on a full board.
    ///
    /// Rejection sampling first, then a uniform pick among the enumerated free
    /// cells once the attempt budget is spent, so the call always returns.
    pub fn place(&mut self, grid: &Grid, snake: &Snake) -> Option<Position> {
        if grid.is_full(snake) {
            return None;
        }

        for _ in 0..grid.cell_count() * SAMPLE_ATTEMPTS_PER_CELL {
            let pos = Position::new(
                self.rng.random_range(0..grid.width),
                self.rng.random_range(0..grid.height),
            );
            if !snake.contains(pos) {
                return Some(pos);
            }
        }

        let free: Vec<Position> = grid.free_cells(snake).collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.random_range(0..free.len())])
    }
}
