use crate::games::SessionRng;
use super::food::FoodPlacer;
use super::grid::Grid;
use super::snake::Snake;
use super::types::{EndReason, Heading, Position, RunStatus, FOOD_REWARD, START_HEADING, START_POSITION};

/// What a single `step()` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub status: RunStatus,
    pub grew: bool,
    /// Set only on the step that caused the terminal transition.
    pub ended: Option<EndReason>,
}

/// Single-player snake on a fixed grid.
///
/// `step()` is pure with respect to the outside world: it never sleeps,
/// never emits, and is driven by an external scheduler.
pub struct SnakeGame {
    grid: Grid,
    snake: Snake,
    food: Position,
    heading: Heading,
    score: u32,
    status: RunStatus,
    end_reason: Option<EndReason>,
    food_placer: FoodPlacer,
}

impl SnakeGame {
    pub fn new(rng: SessionRng) -> Self {
        let mut game = Self {
            grid: Grid::default(),
            snake: Snake::new(START_POSITION),
            food: START_POSITION,
            heading: START_HEADING,
            score: 0,
            status: RunStatus::Idle,
            end_reason: None,
            food_placer: FoodPlacer::new(rng),
        };
        game.reset();
        game
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn seed(&self) -> u64 {
        self.food_placer.seed()
    }

    pub fn reset(&mut self) {
        self.snake = Snake::new(START_POSITION);
        self.heading = START_HEADING;
        self.score = 0;
        self.status = RunStatus::Idle;
        self.end_reason = None;
        // A single segment never fills the board.
        self.place_food();
    }

    pub fn start(&mut self) -> bool {
        if self.status != RunStatus::Idle {
            return false;
        }
        self.status = RunStatus::Running;
        true
    }

    /// Applies to manual and automated input alike.
    pub fn set_heading(&mut self, proposed: Heading) -> bool {
        if self.status != RunStatus::Running || proposed.is_opposite(self.heading) {
            return false;
        }
        self.heading = proposed;
        true
    }

    pub fn step(&mut self) -> StepOutcome {
        if self.status != RunStatus::Running {
            return StepOutcome {
                status: self.status,
                grew: false,
                ended: None,
            };
        }

        let next_head = self.snake.head().moved(self.heading);

        if !self.grid.contains(next_head) {
            return self.finish(EndReason::WallCollision, false);
        }
        if self.snake.contains(next_head) {
            return self.finish(EndReason::SelfCollision, false);
        }

        self.snake.push_head(next_head);

        let grew = next_head == self.food;
        if grew {
            self.score += FOOD_REWARD;
            if !self.place_food() {
                return self.finish(EndReason::BoardFull, true);
            }
        } else {
            self.snake.pop_tail();
        }

        StepOutcome {
            status: self.status,
            grew,
            ended: None,
        }
    }

    fn finish(&mut self, reason: EndReason, grew: bool) -> StepOutcome {
        self.status = reason.status();
        self.end_reason = Some(reason);
        StepOutcome {
            status: self.status,
            grew,
            ended: Some(reason),
        }
    }

    fn place_food(&mut self) -> bool {
        match self.food_placer.place(&self.grid, &self.snake) {
            Some(food) => {
                self.food = food;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(
        grid: Grid,
        segments: &[Position],
        heading: Heading,
        food: Position,
        seed: u64,
    ) -> Self {
        Self {
            grid,
            snake: Snake::from_segments(segments),
            food,
            heading,
            score: 0,
            status: RunStatus::Running,
            end_reason: None,
            food_placer: FoodPlacer::new(SessionRng::new(seed)),
        }
    }
}
