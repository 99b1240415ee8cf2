use tracing::{debug, info, trace};

use crate::infra::{GameObserver, Position};
use crate::planners::rl::{EpisodeSummary, MacroAction, MacroState};
use crate::state::{Collision, Maze, WorldState};

/// Logs simulation events through `tracing`.
pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_maze_generated(&mut self, maze: &Maze, generation: usize) {
        info!(
            "Maze #{} ready: {}x{}, {} key(s), {} trap(s), {} enemies",
            generation,
            maze.width(),
            maze.height(),
            maze.keys.len(),
            maze.traps.len(),
            maze.enemies.len()
        );
    }

    fn on_episode_start(&mut self, episode: usize, world: &WorldState) {
        debug!(
            "Episode {} starts at ({}, {})",
            episode, world.agent.position.row, world.agent.position.col
        );
        trace!("\n{}", world.draw_ascii_map());
    }

    fn on_strategy_selected(
        &mut self,
        state: MacroState,
        action: MacroAction,
        target: Position,
        _world: &WorldState,
    ) {
        debug!(
            "state {} -> {} towards ({}, {})",
            state.index(),
            action,
            target.row,
            target.col
        );
    }

    fn on_agent_died(&mut self, collision: &Collision, world: &WorldState) {
        debug!(
            "Caught by enemy {} at ({}, {}) [{:?}]",
            collision.enemy_index, collision.position.row, collision.position.col, collision.kind
        );
        trace!("\n{}", world.draw_ascii_map());
    }

    fn on_episode_finished(&mut self, episode: usize, summary: &EpisodeSummary) {
        debug!(
            "Episode {} finished: {:?}, reward {:.1}, {} decision(s), {} step(s)",
            episode, summary.termination, summary.reward, summary.decisions, summary.steps
        );
    }
}
