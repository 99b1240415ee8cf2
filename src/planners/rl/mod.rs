//! Tabular reinforcement-learning strategy selection
//!
//! The learner never moves the agent itself; it picks a macro action and the
//! environment turns that into a planned walk:
//!
//! ```text
//! WorldState ──► MacroState ──► StrategySelector ──► MacroAction
//!                                                        │
//!                                     resolve_target + AStar::find_path
//!                                                        │
//!                         MazeEnv walks the route, enemies move every step
//!                                                        │
//!                         reward ──► StrategySelector::update
//! ```

pub mod action_space;
pub mod env;
pub mod game;
pub mod metrics;
pub mod persistence;
pub mod policy;
pub mod train;

pub use action_space::{MacroAction, MacroState, NUM_ACTIONS, NUM_STATES, resolve_target};
pub use env::{EnvConfig, EpisodeMode, EpisodeSummary, MazeEnv, StepResult, Termination};
pub use game::DemoRunner;
pub use metrics::{EvaluationMetrics, MovingAverage, TrainingMetrics};
pub use persistence::{LoadPolicy, load_table, save_table};
pub use policy::{QTable, StrategySelector};
pub use train::{Trainer, prepare_selector};
