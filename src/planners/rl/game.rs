//! Greedy demonstration runs of a trained selector

use rand::Rng;

use crate::config::Config;
use crate::error::GenerationError;
use crate::infra::GameObserver;
use crate::state::MazeGenerator;

use super::env::{EnvConfig, EpisodeMode, MazeEnv};
use super::metrics::EvaluationMetrics;
use super::policy::StrategySelector;

/// Plays greedy episodes, each on a freshly generated maze.
pub struct DemoRunner {
    generator: MazeGenerator,
    env_config: EnvConfig,
    metrics: EvaluationMetrics,
}

impl DemoRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            generator: MazeGenerator::new(config.maze.clone()),
            env_config: EnvConfig {
                rewards: config.rewards.clone(),
                max_strategic_steps: config.train.max_strategic_steps,
                wait_radius: config.train.demo_wait_radius,
            },
            metrics: EvaluationMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    pub fn run<R: Rng + ?Sized>(
        &mut self,
        selector: &mut StrategySelector,
        episodes: usize,
        rng: &mut R,
        observer: &mut dyn GameObserver,
    ) -> Result<&EvaluationMetrics, GenerationError> {
        for episode in 1..=episodes {
            let maze = self.generator.generate(rng)?;
            observer.on_maze_generated(&maze, episode);
            let mut env = MazeEnv::new(maze, self.env_config.clone());

            let summary =
                env.run_episode(episode, selector, EpisodeMode::Greedy, rng, observer);
            tracing::info!(
                "Demo {}/{}: {:?} after {} decision(s), {} step(s), reward {:.1}",
                episode,
                episodes,
                summary.termination,
                summary.decisions,
                summary.steps,
                summary.reward
            );
            self.metrics.record_episode(&summary);
        }

        self.metrics.print_summary();
        Ok(&self.metrics)
    }
}
