use rand::Rng;
use rand::seq::IndexedRandom;

use crate::infra::{Direction, Position};
use crate::state::Map;

/// A roaming enemy doing a random walk that never turns straight back unless cornered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub position: Position,
    /// `None` while boxed in with no passable neighbour.
    pub heading: Option<Direction>,
    /// Ticks to wait between moves; 0 and 1 both mean "move every tick".
    pub move_delay: u32,
    timer: u32,
}

impl Enemy {
    pub fn new(position: Position, heading: Option<Direction>, move_delay: u32) -> Self {
        Self {
            position,
            heading,
            move_delay,
            timer: 0,
        }
    }

    /// Spawns at `position` with a random heading drawn from all passable neighbours.
    pub fn spawn<R: Rng + ?Sized>(
        map: &Map,
        position: Position,
        move_delay: u32,
        rng: &mut R,
    ) -> Self {
        let options = valid_directions(map, position);
        Self::new(position, options.choose(rng).copied(), move_delay)
    }

    /// Advances exactly one simulation tick.
    pub fn step<R: Rng + ?Sized>(&mut self, map: &Map, rng: &mut R) {
        self.timer += 1;
        if self.timer < self.move_delay {
            return;
        }
        self.timer = 0;

        let options = valid_directions(map, self.position);
        if options.is_empty() {
            return;
        }

        let backward = self.heading.map(Direction::reverse);
        let forward: Vec<Direction> = options
            .iter()
            .copied()
            .filter(|d| Some(*d) != backward)
            .collect();

        let direction = match forward.choose(rng) {
            Some(&d) => d,
            // Dead end: the reverse is the only valid option.
            None => options[0],
        };

        self.heading = Some(direction);
        self.position = self.position.step(direction);
        tracing::trace!(
            "enemy moved {:?} to ({}, {})",
            direction,
            self.position.row,
            self.position.col
        );
    }
}

fn valid_directions(map: &Map, pos: Position) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|d| map.is_passable(&pos.step(*d)))
        .collect()
}
