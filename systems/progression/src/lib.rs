#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns food consumption into score and body changes.

use snake3d_core::{Command, Event, FoodKind, SnakeView};

/// Points awarded for a plain food item.
const NORMAL_POINTS: i32 = 1;

/// Points awarded for a golden food item.
const GOLDEN_POINTS: i32 = 3;

/// Penalty applied by a poison food item.
const POISON_POINTS: i32 = -1;

/// Body length a snake must exceed before poison also shrinks it.
const POISON_SHRINK_GUARD: usize = 5;

/// Progression system mapping `FoodEaten` events to score and body commands.
#[derive(Debug, Default)]
pub struct Progression {
    scratch: Vec<Command>,
}

impl Progression {
    /// Creates a new progression system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits score adjustments plus grow/shrink commands for eaten food.
    pub fn handle(&mut self, events: &[Event], snake: &SnakeView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for event in events {
            let Event::FoodEaten { kind, .. } = event else {
                continue;
            };
            match kind {
                FoodKind::Normal => {
                    self.scratch.push(Command::AdjustScore {
                        delta: NORMAL_POINTS,
                    });
                    self.scratch.push(Command::GrowSnake);
                }
                FoodKind::Golden => {
                    self.scratch.push(Command::AdjustScore {
                        delta: GOLDEN_POINTS,
                    });
                    self.scratch.push(Command::GrowSnake);
                }
                FoodKind::Poison => {
                    self.scratch.push(Command::AdjustScore {
                        delta: POISON_POINTS,
                    });
                    // The world floors length at 4 on its own; the extra
                    // guard here keeps short snakes untouched entirely.
                    if snake.len() > POISON_SHRINK_GUARD {
                        self.scratch.push(Command::ShrinkSnake);
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake3d_core::{Cell, Direction};

    fn snake_of_len(len: usize) -> SnakeView {
        let body: Vec<Cell> = (0..len as i32).map(|i| Cell::new(-i, 0)).collect();
        SnakeView::new(body.clone(), body, Direction::East)
    }

    fn eaten(kind: FoodKind) -> Vec<Event> {
        vec![Event::FoodEaten {
            cell: Cell::new(0, 0),
            kind,
        }]
    }

    #[test]
    fn normal_food_scores_one_and_grows() {
        let mut progression = Progression::new();
        let mut commands = Vec::new();
        progression.handle(&eaten(FoodKind::Normal), &snake_of_len(3), &mut commands);
        assert_eq!(
            commands,
            vec![Command::AdjustScore { delta: 1 }, Command::GrowSnake]
        );
    }

    #[test]
    fn golden_food_scores_three_and_grows() {
        let mut progression = Progression::new();
        let mut commands = Vec::new();
        progression.handle(&eaten(FoodKind::Golden), &snake_of_len(3), &mut commands);
        assert_eq!(
            commands,
            vec![Command::AdjustScore { delta: 3 }, Command::GrowSnake]
        );
    }

    #[test]
    fn poison_shrinks_only_above_the_guard_length() {
        let mut progression = Progression::new();

        let mut commands = Vec::new();
        progression.handle(&eaten(FoodKind::Poison), &snake_of_len(5), &mut commands);
        assert_eq!(commands, vec![Command::AdjustScore { delta: -1 }]);

        commands.clear();
        progression.handle(&eaten(FoodKind::Poison), &snake_of_len(6), &mut commands);
        assert_eq!(
            commands,
            vec![Command::AdjustScore { delta: -1 }, Command::ShrinkSnake]
        );
    }

    #[test]
    fn unrelated_events_emit_nothing() {
        let mut progression = Progression::new();
        let mut commands = Vec::new();
        progression.handle(
            &[Event::SnakeAdvanced {
                from: Cell::new(0, 0),
                to: Cell::new(1, 0),
            }],
            &snake_of_len(3),
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
