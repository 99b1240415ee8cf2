use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::state::MIN_MAZE_SIDE;

/// Maze shape and population.
#[derive(Debug, Clone)]
pub struct MazeConfig {
    pub width: i32,
    pub height: i32,
    pub enemy_count: usize,
    pub key_count: usize,
    pub trap_count: usize,
    /// Ticks between enemy moves (0 = every tick)
    pub enemy_move_delay: u32,
    /// Full regenerations tried before giving up
    pub max_generation_attempts: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 25,
            enemy_count: 4,
            key_count: 1,
            trap_count: 5,
            enemy_move_delay: 0,
            max_generation_attempts: 1000,
        }
    }
}

/// Reward magnitudes applied by the episode loop.
#[derive(Debug, Clone)]
pub struct RewardConfig {
    pub goal: f64,
    pub key: f64,
    pub dead_end: f64,
    pub step: f64,
    pub enemy_collision: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            goal: 100.0,
            key: 20.0,
            dead_end: -50.0,
            step: -1.0,
            enemy_collision: -100.0,
        }
    }
}

/// Tabular learner hyperparameters.
#[derive(Debug, Clone)]
pub struct LearnerConfig {
    pub learning_rate: f64,
    pub discount: f64,
    pub epsilon_start: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_decay: 0.999,
            epsilon_min: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub episodes: usize,
    /// Episodes between maze regenerations
    pub regenerate_every: usize,
    /// Strategic decisions allowed per episode
    pub max_strategic_steps: usize,
    pub log_interval: usize,
    pub seed: Option<u64>,
    pub table_path: PathBuf,
    pub load_table: bool,
    /// Abort when the table file is missing instead of starting cold
    pub require_table: bool,
    pub save_table: bool,
    /// Keep training after a table was restored
    pub resume_training: bool,
    pub demo_episodes: usize,
    /// Demo agents hold position while an enemy is this close to their next cell
    pub demo_wait_radius: Option<i32>,
    pub reports_folder: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 3000,
            regenerate_every: 50,
            max_strategic_steps: 50,
            log_interval: 100,
            seed: None,
            table_path: PathBuf::from("q_table.json"),
            load_table: true,
            require_table: false,
            save_table: true,
            resume_training: false,
            demo_episodes: 5,
            demo_wait_radius: Some(2),
            reports_folder: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub maze: MazeConfig,
    pub rewards: RewardConfig,
    pub learner: LearnerConfig,
    pub train: TrainConfig,
}

fn env_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Parse {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn override_with<T: FromStr>(target: &mut T, key: &str) -> Result<(), ConfigError> {
    if let Some(value) = env_var(key)? {
        *target = value;
    }
    Ok(())
}

impl Config {
    /// Defaults overridden by `MAZE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let maze = &mut config.maze;
        override_with(&mut maze.width, "MAZE_WIDTH")?;
        override_with(&mut maze.height, "MAZE_HEIGHT")?;
        override_with(&mut maze.enemy_count, "MAZE_ENEMIES")?;
        override_with(&mut maze.key_count, "MAZE_KEYS")?;
        override_with(&mut maze.trap_count, "MAZE_TRAPS")?;
        override_with(&mut maze.enemy_move_delay, "MAZE_ENEMY_DELAY")?;
        override_with(&mut maze.max_generation_attempts, "MAZE_MAX_ATTEMPTS")?;

        let rewards = &mut config.rewards;
        override_with(&mut rewards.goal, "MAZE_REWARD_GOAL")?;
        override_with(&mut rewards.key, "MAZE_REWARD_KEY")?;
        override_with(&mut rewards.dead_end, "MAZE_REWARD_DEAD_END")?;
        override_with(&mut rewards.step, "MAZE_REWARD_STEP")?;
        override_with(&mut rewards.enemy_collision, "MAZE_REWARD_ENEMY")?;

        let learner = &mut config.learner;
        override_with(&mut learner.learning_rate, "MAZE_LEARNING_RATE")?;
        override_with(&mut learner.discount, "MAZE_DISCOUNT")?;
        override_with(&mut learner.epsilon_start, "MAZE_EPSILON_START")?;
        override_with(&mut learner.epsilon_decay, "MAZE_EPSILON_DECAY")?;
        override_with(&mut learner.epsilon_min, "MAZE_EPSILON_MIN")?;

        let train = &mut config.train;
        override_with(&mut train.episodes, "MAZE_EPISODES")?;
        override_with(&mut train.regenerate_every, "MAZE_REGEN_EVERY")?;
        override_with(&mut train.max_strategic_steps, "MAZE_STRATEGIC_STEPS")?;
        override_with(&mut train.log_interval, "MAZE_LOG_INTERVAL")?;
        override_with(&mut train.table_path, "MAZE_TABLE_PATH")?;
        override_with(&mut train.load_table, "MAZE_LOAD_TABLE")?;
        override_with(&mut train.require_table, "MAZE_REQUIRE_TABLE")?;
        override_with(&mut train.save_table, "MAZE_SAVE_TABLE")?;
        override_with(&mut train.resume_training, "MAZE_RESUME_TRAINING")?;
        override_with(&mut train.demo_episodes, "MAZE_DEMO_EPISODES")?;
        if let Some(radius) = env_var::<i32>("MAZE_DEMO_WAIT_RADIUS")? {
            train.demo_wait_radius = (radius >= 0).then_some(radius);
        }
        train.seed = env_var("MAZE_SEED")?;
        train.reports_folder = env_var("MAZE_REPORTS_FOLDER")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

        if self.maze.width < MIN_MAZE_SIDE || self.maze.height < MIN_MAZE_SIDE {
            return fail("maze width and height must be >= 5");
        }
        if self.maze.key_count == 0 {
            return fail("maze.key_count must be >= 1");
        }
        if self.maze.max_generation_attempts == 0 {
            return fail("maze.max_generation_attempts must be > 0");
        }
        if !(self.learner.learning_rate > 0.0 && self.learner.learning_rate <= 1.0) {
            return fail("learner.learning_rate must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.learner.discount) {
            return fail("learner.discount must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.learner.epsilon_start)
            || !(0.0..=1.0).contains(&self.learner.epsilon_min)
        {
            return fail("learner epsilon values must be in [0, 1]");
        }
        if !(self.learner.epsilon_decay > 0.0 && self.learner.epsilon_decay <= 1.0) {
            return fail("learner.epsilon_decay must be in (0, 1]");
        }
        if self.learner.epsilon_min > self.learner.epsilon_start {
            return fail("learner.epsilon_min must not exceed epsilon_start");
        }
        if self.train.regenerate_every == 0 {
            return fail("train.regenerate_every must be > 0");
        }
        if self.train.max_strategic_steps == 0 {
            return fail("train.max_strategic_steps must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.maze.width, 40);
        assert_eq!(config.maze.height, 25);
        assert!((config.rewards.enemy_collision + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_zero_keys() {
        let mut config = Config::default();
        config.maze.key_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_floor_above_start() {
        let mut config = Config::default();
        config.learner.epsilon_start = 0.1;
        config.learner.epsilon_min = 0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_learning_rate() {
        let mut config = Config::default();
        config.learner.learning_rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_reads_process_overrides() {
        // SAFETY: no other test reads these keys.
        unsafe {
            env::set_var("MAZE_REGEN_EVERY", "7");
            env::set_var("MAZE_DEMO_WAIT_RADIUS", "-1");
        }
        let config = Config::from_env();
        unsafe {
            env::remove_var("MAZE_REGEN_EVERY");
            env::remove_var("MAZE_DEMO_WAIT_RADIUS");
        }

        let config = config.unwrap();
        assert_eq!(config.train.regenerate_every, 7);
        assert_eq!(config.train.demo_wait_radius, None);
    }

    #[test]
    fn test_env_var_parse_error() {
        // SAFETY: the key is unique to this test.
        unsafe { env::set_var("MAZE_TEST_ONLY_WIDTH", "wide") };
        let result: Result<Option<i32>, _> = env_var("MAZE_TEST_ONLY_WIDTH");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        unsafe { env::remove_var("MAZE_TEST_ONLY_WIDTH") };
    }
}
