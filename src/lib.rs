pub mod config;
pub mod error;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::RunError;
pub use infra::{AStar, Direction, Position};
pub use state::{Map, Maze, MazeGenerator, WorldState};
