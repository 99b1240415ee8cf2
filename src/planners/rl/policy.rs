//! Tabular action-value learner with epsilon-greedy macro action selection

use rand::Rng;

use crate::config::LearnerConfig;
use crate::error::TableError;

use super::action_space::{MacroAction, MacroState, NUM_ACTIONS, NUM_STATES};

/// Action values indexed by `[state][action]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: [[f64; NUM_ACTIONS]; NUM_STATES],
}

impl Default for QTable {
    fn default() -> Self {
        Self {
            values: [[0.0; NUM_ACTIONS]; NUM_STATES],
        }
    }
}

impl QTable {
    /// Number of values in the flat representation
    pub const LEN: usize = NUM_STATES * NUM_ACTIONS;

    pub fn get(&self, state: MacroState, action: MacroAction) -> f64 {
        self.values[state.index()][action.index()]
    }

    pub fn set(&mut self, state: MacroState, action: MacroAction, value: f64) {
        self.values[state.index()][action.index()] = value;
    }

    pub fn max_value(&self, state: MacroState) -> f64 {
        self.values[state.index()]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action; ties go to the lower index (seek key).
    pub fn best_action(&self, state: MacroState) -> MacroAction {
        let row = &self.values[state.index()];
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        MacroAction::ALL[best]
    }

    /// Row-major `state * NUM_ACTIONS + action` layout.
    pub fn to_flat(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn from_flat(flat: &[f64]) -> Result<Self, TableError> {
        if flat.len() != Self::LEN {
            return Err(TableError::Shape {
                expected: Self::LEN,
                found: flat.len(),
            });
        }
        let mut table = Self::default();
        for (i, &value) in flat.iter().enumerate() {
            table.values[i / NUM_ACTIONS][i % NUM_ACTIONS] = value;
        }
        Ok(table)
    }
}

/// Picks a macro strategy per decision and learns from the resulting reward.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    table: QTable,
    epsilon: f64,
    config: LearnerConfig,
}

impl StrategySelector {
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            table: QTable::default(),
            epsilon: config.epsilon_start,
            config,
        }
    }

    pub fn with_table(config: LearnerConfig, table: QTable) -> Self {
        Self {
            table,
            ..Self::new(config)
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn set_table(&mut self, table: QTable) {
        self.table = table;
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Epsilon-greedy choice: explore uniformly with probability epsilon.
    pub fn choose_action<R: Rng + ?Sized>(&self, state: MacroState, rng: &mut R) -> MacroAction {
        if rng.random::<f64>() < self.epsilon {
            MacroAction::ALL[rng.random_range(0..NUM_ACTIONS)]
        } else {
            self.table.best_action(state)
        }
    }

    pub fn greedy_action(&self, state: MacroState) -> MacroAction {
        self.table.best_action(state)
    }

    /// One-step update `Q = (1 - a) Q + a (r + g max Q')`. Returns the new value.
    pub fn update(
        &mut self,
        state: MacroState,
        action: MacroAction,
        reward: f64,
        next_state: MacroState,
    ) -> f64 {
        let alpha = self.config.learning_rate;
        let old_value = self.table.get(state, action);
        let next_max = self.table.max_value(next_state);
        let new_value =
            (1.0 - alpha) * old_value + alpha * (reward + self.config.discount * next_max);
        self.table.set(state, action, new_value);
        tracing::trace!(
            "Q[{}][{}]: {:.3} -> {:.3} (reward {:.1})",
            state.index(),
            action.index(),
            old_value,
            new_value,
            reward
        );
        new_value
    }

    /// Multiplicative decay after an episode, never below the floor.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }
}
