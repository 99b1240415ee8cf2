mod enemy;
mod map;
mod maze;
mod player_state;
mod world_state;

pub use enemy::Enemy;
pub use map::{Map, Tile};
pub use maze::{MIN_MAZE_SIDE, Maze, MazeGenerator, is_solvable};
pub use player_state::AgentState;
pub use world_state::{Collision, CollisionKind, Snapshot, WorldState, detect_collision};
