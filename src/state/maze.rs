use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, warn};

use crate::config::MazeConfig;
use crate::error::GenerationError;
use crate::infra::{AStar, Position};
use crate::state::{Enemy, Map, Tile};

/// An accepted maze. Immutable for the rest of its lifetime; key pickup is tracked by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    pub map: Map,
    pub start: Position,
    pub goal: Position,
    pub keys: Vec<Position>,
    pub traps: Vec<Position>,
    /// Enemies in their spawn state
    pub enemies: Vec<Enemy>,
}

impl Maze {
    pub fn width(&self) -> i32 {
        self.map.width
    }

    pub fn height(&self) -> i32 {
        self.map.height
    }
}

/// Column bands used to keep start, keys and goal apart.
#[derive(Debug, Default)]
struct Zones {
    left: Vec<Position>,
    middle: Vec<Position>,
    right: Vec<Position>,
}

impl Zones {
    fn split(open: &[Position], width: i32) -> Self {
        let mut zones = Zones::default();
        for &pos in open {
            if pos.col < width / 4 {
                zones.left.push(pos);
            } else if pos.col > (width * 3) / 4 {
                zones.right.push(pos);
            } else {
                zones.middle.push(pos);
            }
        }
        zones
    }
}

/// Why a single construction attempt was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    TooFewOpenCells,
    EmptyZone,
    NotEnoughKeyCells,
    Unreachable,
}

/// Smallest width or height that leaves room for rooms, zones and a border.
pub const MIN_MAZE_SIDE: i32 = 5;

pub struct MazeGenerator {
    config: MazeConfig,
}

impl MazeGenerator {
    pub fn new(config: MazeConfig) -> Self {
        Self { config }
    }

    /// Builds mazes until one satisfies zoning and reachability, or the attempt cap runs out.
    #[tracing::instrument(level = "debug", skip(self, rng), fields(width = self.config.width, height = self.config.height))]
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Maze, GenerationError> {
        let (width, height) = (self.config.width, self.config.height);
        if width < MIN_MAZE_SIDE || height < MIN_MAZE_SIDE {
            return Err(GenerationError::TooSmall {
                width,
                height,
                min: MIN_MAZE_SIDE,
            });
        }

        for attempt in 1..=self.config.max_generation_attempts {
            match self.try_generate(rng) {
                Ok(maze) => {
                    debug!(
                        "maze accepted after {} attempt(s): start ({}, {}), goal ({}, {}), {} key(s), {} trap(s), {} enemies",
                        attempt,
                        maze.start.row,
                        maze.start.col,
                        maze.goal.row,
                        maze.goal.col,
                        maze.keys.len(),
                        maze.traps.len(),
                        maze.enemies.len()
                    );
                    return Ok(maze);
                }
                Err(rejection) => debug!("attempt {} rejected: {:?}", attempt, rejection),
            }
        }

        warn!(
            "gave up after {} attempts",
            self.config.max_generation_attempts
        );
        Err(GenerationError::Exhausted {
            attempts: self.config.max_generation_attempts,
            width: self.config.width,
            height: self.config.height,
            keys: self.config.key_count,
        })
    }

    fn try_generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Maze, Rejection> {
        let (width, height) = (self.config.width, self.config.height);
        let mut map = carve(width, height, rng);

        let open = map.interior_positions(Tile::Empty);
        if open.len() < ((width * height) / 4) as usize {
            return Err(Rejection::TooFewOpenCells);
        }

        let zones = Zones::split(&open, width);
        let (Some(&start), Some(&goal)) = (zones.left.choose(rng), zones.right.choose(rng)) else {
            return Err(Rejection::EmptyZone);
        };
        if zones.middle.is_empty() {
            return Err(Rejection::EmptyZone);
        }
        if zones.middle.len() < self.config.key_count {
            return Err(Rejection::NotEnoughKeyCells);
        }
        let keys: Vec<Position> = zones
            .middle
            .choose_multiple(rng, self.config.key_count)
            .copied()
            .collect();

        let is_reserved = |pos: &Position| *pos == start || *pos == goal || keys.contains(pos);

        // Short on candidates: place what fits rather than regenerate.
        let trap_candidates: Vec<Position> =
            open.iter().copied().filter(|p| !is_reserved(p)).collect();
        let traps: Vec<Position> = trap_candidates
            .choose_multiple(rng, self.config.trap_count)
            .copied()
            .collect();

        map.insert(goal, Tile::Goal);
        for &key in &keys {
            map.insert(key, Tile::Key);
        }
        for &trap in &traps {
            map.insert(trap, Tile::Trap);
        }

        let safe_cells: Vec<Position> = trap_candidates
            .iter()
            .copied()
            .filter(|p| !traps.contains(p))
            .collect();
        let spawn_cells: Vec<Position> = safe_cells
            .choose_multiple(rng, self.config.enemy_count)
            .copied()
            .collect();
        let enemies = spawn_cells
            .into_iter()
            .map(|pos| Enemy::spawn(&map, pos, self.config.enemy_move_delay, rng))
            .collect();

        let maze = Maze {
            map,
            start,
            goal,
            keys,
            traps,
            enemies,
        };
        if !is_solvable(&maze) {
            return Err(Rejection::Unreachable);
        }
        Ok(maze)
    }
}

/// Every key and the goal must be reachable from the start without crossing walls or traps.
pub fn is_solvable(maze: &Maze) -> bool {
    maze.keys
        .iter()
        .chain(std::iter::once(&maze.goal))
        .all(|&target| AStar::find_path(&maze.map, maze.start, target).is_some())
}

/// Perfect maze by depth-first backtracking over odd-coordinate rooms, using an explicit stack.
fn carve<R: Rng + ?Sized>(width: i32, height: i32, rng: &mut R) -> Map {
    let mut map = Map::filled(width, height, Tile::Wall);

    let mut row = rng.random_range(1..=height - 2);
    let mut col = rng.random_range(1..=width - 2);
    if row % 2 == 0 {
        row = (row - 1).max(1);
    }
    if col % 2 == 0 {
        col = (col - 1).max(1);
    }

    let root = Position::new(row, col);
    map.insert(root, Tile::Empty);
    let mut stack = vec![(root, shuffled_rooms(root, rng), 0usize)];

    while let Some((current, rooms, next)) = stack.last_mut() {
        let Some(&room) = rooms.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        let current = *current;

        let interior =
            room.row > 0 && room.row < height - 1 && room.col > 0 && room.col < width - 1;
        if interior && map.get(&room) == Some(Tile::Wall) {
            let between =
                Position::new((current.row + room.row) / 2, (current.col + room.col) / 2);
            map.insert(between, Tile::Empty);
            map.insert(room, Tile::Empty);
            stack.push((room, shuffled_rooms(room, rng), 0));
        }
    }

    map
}

fn shuffled_rooms<R: Rng + ?Sized>(pos: Position, rng: &mut R) -> [Position; 4] {
    let mut rooms = [
        Position::new(pos.row - 2, pos.col),
        Position::new(pos.row + 2, pos.col),
        Position::new(pos.row, pos.col - 2),
        Position::new(pos.row, pos.col + 2),
    ];
    rooms.shuffle(rng);
    rooms
}
