use crate::infra::Position;
use crate::planners::rl::{EpisodeSummary, MacroAction, MacroState};
use crate::state::{Collision, Maze, WorldState};

/// Trait for observing simulation events. Every callback is synchronous and read-only.
pub trait GameObserver {
    /// Called after a new maze has been accepted
    fn on_maze_generated(&mut self, _maze: &Maze, _generation: usize) {}

    /// Called when an episode starts on the current maze
    fn on_episode_start(&mut self, episode: usize, world: &WorldState);

    /// Called when the learner has picked a strategy and a target has been resolved
    fn on_strategy_selected(
        &mut self,
        state: MacroState,
        action: MacroAction,
        target: Position,
        world: &WorldState,
    );

    /// Called after every agent step (the agent visited `position`)
    fn on_agent_moved(&mut self, _position: Position, _world: &WorldState) {
        // Default implementation does nothing
    }

    /// Called when an enemy catches the agent
    fn on_agent_died(&mut self, _collision: &Collision, _world: &WorldState) {}

    /// Called when the episode is over
    fn on_episode_finished(&mut self, episode: usize, summary: &EpisodeSummary);
}
