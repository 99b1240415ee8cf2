mod composite_observer;
mod default_observer;
mod game_observer;
mod heatmap;
mod pathfinding;
mod types;

pub use composite_observer::CompositeObserver;
pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use heatmap::{Heatmap, HeatmapObserver};
pub use pathfinding::AStar;
pub use types::{Direction, Position};
