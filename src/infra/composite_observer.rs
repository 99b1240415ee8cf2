use crate::infra::{GameObserver, Position};
use crate::planners::rl::{EpisodeSummary, MacroAction, MacroState};
use crate::state::{Collision, Maze, WorldState};

/// Fans every event out to a list of observers, in order.
pub struct CompositeObserver {
    observers: Vec<Box<dyn GameObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Box<dyn GameObserver>>) -> Self {
        Self { observers }
    }
}

impl GameObserver for CompositeObserver {
    fn on_maze_generated(&mut self, maze: &Maze, generation: usize) {
        for observer in &mut self.observers {
            observer.on_maze_generated(maze, generation);
        }
    }

    fn on_episode_start(&mut self, episode: usize, world: &WorldState) {
        for observer in &mut self.observers {
            observer.on_episode_start(episode, world);
        }
    }

    fn on_strategy_selected(
        &mut self,
        state: MacroState,
        action: MacroAction,
        target: Position,
        world: &WorldState,
    ) {
        for observer in &mut self.observers {
            observer.on_strategy_selected(state, action, target, world);
        }
    }

    fn on_agent_moved(&mut self, position: Position, world: &WorldState) {
        for observer in &mut self.observers {
            observer.on_agent_moved(position, world);
        }
    }

    fn on_agent_died(&mut self, collision: &Collision, world: &WorldState) {
        for observer in &mut self.observers {
            observer.on_agent_died(collision, world);
        }
    }

    fn on_episode_finished(&mut self, episode: usize, summary: &EpisodeSummary) {
        for observer in &mut self.observers {
            observer.on_episode_finished(episode, summary);
        }
    }
}
