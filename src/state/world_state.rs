use rand::Rng;
use serde::Serialize;

use crate::infra::Position;
use crate::state::{AgentState, Enemy, Maze, Tile};

/// How the agent and an enemy met during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Agent and enemy exchanged cells without ever sharing one.
    Swap,
    /// Agent stepped onto the cell an enemy stood on.
    AgentEnteredEnemy,
    /// An enemy stepped onto the agent's cell.
    EnemyEnteredAgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub kind: CollisionKind,
    pub enemy_index: usize,
    pub position: Position,
}

/// Checks one tick in which the agent moved `agent_from -> agent_to` while each enemy
/// moved `enemies_before[i] -> enemies_after[i]`. Enemies are checked in index order.
pub fn detect_collision(
    agent_from: Position,
    agent_to: Position,
    enemies_before: &[Position],
    enemies_after: &[Position],
) -> Option<Collision> {
    for (enemy_index, (&before, &after)) in enemies_before.iter().zip(enemies_after).enumerate() {
        let kind = if agent_to == before && after == agent_from && agent_from != agent_to {
            CollisionKind::Swap
        } else if agent_to == before {
            CollisionKind::AgentEnteredEnemy
        } else if agent_to == after {
            CollisionKind::EnemyEnteredAgent
        } else {
            continue;
        };
        return Some(Collision {
            kind,
            enemy_index,
            position: agent_to,
        });
    }
    None
}

/// Read-only view of the board handed to a renderer each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Row-major tile codes
    pub tiles: Vec<Vec<u8>>,
    pub agent: Position,
    pub enemies: Vec<Position>,
    pub collected_keys: Vec<Position>,
    pub uncollected_keys: Vec<Position>,
    pub goal: Position,
    pub start: Position,
    pub path: Option<Vec<Position>>,
}

/// Everything the simulation mutates while an episode runs on one maze.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub maze: Maze,
    pub agent: AgentState,
    pub enemies: Vec<Enemy>,
    pub last_path: Option<Vec<Position>>,
    pub tick: u64,
}

impl WorldState {
    pub fn new(maze: Maze) -> Self {
        let agent = AgentState::new(maze.start, maze.keys.len());
        let enemies = maze.enemies.clone();
        Self {
            maze,
            agent,
            enemies,
            last_path: None,
            tick: 0,
        }
    }

    /// Back to the start cell with nothing collected and enemies at their spawn points.
    pub fn reset(&mut self) {
        self.agent = AgentState::new(self.maze.start, self.maze.keys.len());
        self.enemies = self.maze.enemies.clone();
        self.last_path = None;
        self.tick = 0;
    }

    pub fn uncollected_keys(&self) -> impl Iterator<Item = Position> + '_ {
        self.maze
            .keys
            .iter()
            .copied()
            .filter(|key| !self.agent.has_collected(key))
    }

    pub fn nearest_uncollected_key(&self) -> Option<Position> {
        let here = self.agent.position;
        self.uncollected_keys().min_by_key(|key| here.distance(key))
    }

    pub fn enemy_positions(&self) -> Vec<Position> {
        self.enemies.iter().map(|e| e.position).collect()
    }

    /// Advances every enemy by one tick in index order.
    pub fn advance_enemies<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for enemy in &mut self.enemies {
            enemy.step(&self.maze.map, rng);
        }
        self.tick += 1;
    }

    pub fn snapshot(&self) -> Snapshot {
        let (collected_keys, uncollected_keys) = self
            .maze
            .keys
            .iter()
            .copied()
            .partition(|key| self.agent.has_collected(key));
        Snapshot {
            tiles: self.maze.map.codes(),
            agent: self.agent.position,
            enemies: self.enemy_positions(),
            collected_keys,
            uncollected_keys,
            goal: self.maze.goal,
            start: self.maze.start,
            path: self.last_path.clone(),
        }
    }

    pub fn draw_ascii_map(&self) -> String {
        let mut output = String::new();

        // ANSI color codes
        const RESET: &str = "\x1b[0m";
        const AGENT: &str = "\x1b[1;34m"; // Bright blue
        const ENEMY: &str = "\x1b[1;35m"; // Bright magenta
        const WALL: &str = "\x1b[90m"; // Dark gray
        const GOAL: &str = "\x1b[1;32m"; // Bright green
        const KEY: &str = "\x1b[1;33m"; // Bright yellow
        const TRAP: &str = "\x1b[1;31m"; // Bright red
        const PATH: &str = "\x1b[37m"; // White

        let enemies = self.enemy_positions();
        let path = self.last_path.as_deref().unwrap_or(&[]);

        for (pos, tile) in self.maze.map.iter() {
            let cell = if pos == self.agent.position {
                format!("{}@{}", AGENT, RESET)
            } else if enemies.contains(&pos) {
                format!("{}e{}", ENEMY, RESET)
            } else {
                match tile {
                    Tile::Wall => format!("{}█{}", WALL, RESET),
                    Tile::Trap => format!("{}x{}", TRAP, RESET),
                    Tile::Goal => format!("{}G{}", GOAL, RESET),
                    Tile::Key if !self.agent.has_collected(&pos) => format!("{}k{}", KEY, RESET),
                    _ if pos == self.maze.start => "S".to_string(),
                    _ if path.contains(&pos) => format!("{}·{}", PATH, RESET),
                    _ => " ".to_string(),
                }
            };
            output.push_str(&cell);
            if pos.col == self.maze.map.width - 1 {
                output.push('\n');
            }
        }

        output
    }
}
