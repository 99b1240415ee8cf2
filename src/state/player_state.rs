use std::collections::BTreeSet;

use crate::infra::Position;

/// Per-episode agent progress. Recreated on every reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    pub position: Position,
    pub goal_discovered: bool,
    collected: BTreeSet<Position>,
    key_count: usize,
}

impl AgentState {
    pub fn new(start: Position, key_count: usize) -> Self {
        Self {
            position: start,
            goal_discovered: false,
            collected: BTreeSet::new(),
            key_count,
        }
    }

    /// Records a pickup. Returns false if this key was already collected.
    pub fn collect(&mut self, key: Position) -> bool {
        self.collected.insert(key)
    }

    pub fn has_collected(&self, key: &Position) -> bool {
        self.collected.contains(key)
    }

    pub fn collected(&self) -> &BTreeSet<Position> {
        &self.collected
    }

    /// True once every key in the maze has been picked up.
    pub fn has_all_keys(&self) -> bool {
        self.collected.len() == self.key_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_all_keys_tracks_collection() {
        let mut agent = AgentState::new(Position::new(1, 1), 2);
        assert!(!agent.has_all_keys());
        assert!(agent.collect(Position::new(3, 5)));
        assert!(!agent.collect(Position::new(3, 5)));
        assert!(!agent.has_all_keys());
        assert!(agent.collect(Position::new(5, 7)));
        assert!(agent.has_all_keys());
        assert!(agent.has_collected(&Position::new(5, 7)));
    }
}
