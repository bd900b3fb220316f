use super::snake::Snake;
use super::types::{Position, GRID_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::square(GRID_SIZE)
    }
}

impl Grid {
    pub fn square(size: i32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Row-major.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn is_free(&self, pos: Position, snake: &Snake) -> bool {
        self.contains(pos) && !snake.contains(pos)
    }

    pub fn free_cells<'a>(&'a self, snake: &'a Snake) -> impl Iterator<Item = Position> + 'a {
        self.cells().filter(move |&pos| !snake.contains(pos))
    }

    pub fn is_full(&self, snake: &Snake) -> bool {
        snake.len() >= self.cell_count()
    }
}
