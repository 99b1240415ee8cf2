//! Episode-based training loop for the strategy selector

use rand::Rng;

use crate::config::{Config, TrainConfig};
use crate::error::{GenerationError, RunError};
use crate::infra::GameObserver;
use crate::state::MazeGenerator;

use super::env::{EnvConfig, EpisodeMode, MazeEnv};
use super::metrics::TrainingMetrics;
use super::persistence::LoadPolicy;
use super::policy::StrategySelector;

/// Builds the selector for a run from the table settings in `config.train`.
///
/// A restored table is played as it is (epsilon 0, no training, file untouched) unless
/// `resume_training` is set. Otherwise the selector is trained, and the result is saved
/// when `save_table` is set.
pub fn prepare_selector<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
    observer: &mut dyn GameObserver,
) -> Result<StrategySelector, RunError> {
    let train = &config.train;
    let mut selector = StrategySelector::new(config.learner.clone());
    let restored = train.load_table
        && selector.restore(&train.table_path, LoadPolicy::from_required(train.require_table))?;

    if restored && !train.resume_training {
        tracing::info!("Using the restored table without further training");
        selector.set_epsilon(0.0);
        return Ok(selector);
    }

    let mut trainer = Trainer::with_selector(config, selector);
    trainer.train(rng, observer)?;
    let selector = trainer.into_selector();
    if train.save_table {
        selector.persist(&train.table_path)?;
    }
    Ok(selector)
}

/// Runs learning episodes, regenerating the maze every `regenerate_every` episodes.
pub struct Trainer {
    generator: MazeGenerator,
    selector: StrategySelector,
    env_config: EnvConfig,
    config: TrainConfig,
    metrics: TrainingMetrics,
    generations: usize,
}

impl Trainer {
    pub fn new(config: &Config) -> Self {
        Self::with_selector(config, StrategySelector::new(config.learner.clone()))
    }

    /// Continue training a selector that was restored from disk
    pub fn with_selector(config: &Config, selector: StrategySelector) -> Self {
        Self {
            generator: MazeGenerator::new(config.maze.clone()),
            selector,
            env_config: EnvConfig {
                rewards: config.rewards.clone(),
                max_strategic_steps: config.train.max_strategic_steps,
                wait_radius: None,
            },
            config: config.train.clone(),
            metrics: TrainingMetrics::default(),
            generations: 0,
        }
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    pub fn into_selector(self) -> StrategySelector {
        self.selector
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Mazes generated so far
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn train<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        observer: &mut dyn GameObserver,
    ) -> Result<&TrainingMetrics, GenerationError> {
        tracing::info!(
            "Starting training: {} episodes, new maze every {} episode(s)",
            self.config.episodes,
            self.config.regenerate_every
        );

        let mut env: Option<MazeEnv> = None;
        for episode in 1..=self.config.episodes {
            if (episode - 1) % self.config.regenerate_every == 0 {
                let maze = self.generator.generate(rng)?;
                self.generations += 1;
                observer.on_maze_generated(&maze, self.generations);
                env = Some(match env.take() {
                    Some(mut env) => {
                        env.reset_with_maze(maze);
                        env
                    }
                    None => MazeEnv::new(maze, self.env_config.clone()),
                });
            }

            let Some(env) = env.as_mut() else {
                continue;
            };
            let summary =
                env.run_episode(episode, &mut self.selector, EpisodeMode::Learn, rng, observer);
            self.selector.decay_epsilon();
            self.metrics.record_episode(&summary);

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                self.metrics.log_to_console(self.selector.epsilon());
            }
        }

        tracing::info!(
            "Training complete: {} wins, {} deaths, {} dead ends over {} episodes",
            self.metrics.wins,
            self.metrics.deaths,
            self.metrics.dead_ends,
            self.metrics.episodes
        );
        Ok(&self.metrics)
    }
}
