//! Macro action space and the discrete state the strategy learner observes

use std::fmt;

use crate::infra::Position;
use crate::state::WorldState;

/// Number of distinct macro states
pub const NUM_STATES: usize = 4;
/// Number of macro actions
pub const NUM_ACTIONS: usize = 2;

/// High-level intent; path planning turns it into concrete steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroAction {
    SeekKey,
    SeekGoal,
}

impl MacroAction {
    pub const ALL: [MacroAction; NUM_ACTIONS] = [MacroAction::SeekKey, MacroAction::SeekGoal];

    pub fn index(self) -> usize {
        match self {
            MacroAction::SeekKey => 0,
            MacroAction::SeekGoal => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for MacroAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroAction::SeekKey => write!(f, "SEEK KEY"),
            MacroAction::SeekGoal => write!(f, "SEEK GOAL"),
        }
    }
}

/// Lookup code built from (has all keys, goal discovered): `2 * keys + goal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroState(usize);

impl MacroState {
    pub fn new(has_all_keys: bool, goal_discovered: bool) -> Self {
        Self(usize::from(has_all_keys) * 2 + usize::from(goal_discovered))
    }

    pub fn observe(world: &WorldState) -> Self {
        Self::new(world.agent.has_all_keys(), world.agent.goal_discovered)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_STATES).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn has_all_keys(self) -> bool {
        self.0 >= 2
    }

    pub fn goal_discovered(self) -> bool {
        self.0 % 2 == 1
    }
}

/// Resolves a macro action to the cell the agent should head for.
///
/// Seeking a key falls back to the goal once every key is collected.
pub fn resolve_target(world: &WorldState, action: MacroAction) -> (MacroAction, Position) {
    match action {
        MacroAction::SeekKey => match world.nearest_uncollected_key() {
            Some(key) => (MacroAction::SeekKey, key),
            None => (MacroAction::SeekGoal, world.maze.goal),
        },
        MacroAction::SeekGoal => (MacroAction::SeekGoal, world.maze.goal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_state_encoding() {
        assert_eq!(MacroState::new(false, false).index(), 0);
        assert_eq!(MacroState::new(false, true).index(), 1);
        assert_eq!(MacroState::new(true, false).index(), 2);
        assert_eq!(MacroState::new(true, true).index(), 3);

        let state = MacroState::new(true, false);
        assert!(state.has_all_keys());
        assert!(!state.goal_discovered());
        assert_eq!(MacroState::from_index(4), None);
    }

    #[test]
    fn test_action_index_round_trip() {
        for action in MacroAction::ALL {
            assert_eq!(MacroAction::from_index(action.index()), Some(action));
        }
        assert_eq!(MacroAction::from_index(2), None);
        assert_eq!(MacroAction::SeekGoal.to_string(), "SEEK GOAL");
    }
}
