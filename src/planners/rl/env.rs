//! Episode environment: turns a macro action into a walk through the maze and a reward

use rand::Rng;
use tracing::trace;

use crate::config::RewardConfig;
use crate::infra::{AStar, GameObserver, Position};
use crate::state::{Maze, Tile, WorldState, detect_collision};

use super::action_space::{MacroAction, MacroState, resolve_target};
use super::policy::StrategySelector;

/// Environment configuration
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Reward magnitudes
    pub rewards: RewardConfig,
    /// Strategic decisions allowed before the episode is cut off
    pub max_strategic_steps: usize,
    /// Hold position while an enemy is within this Manhattan distance of the next cell.
    /// `None` walks the route without pausing.
    pub wait_radius: Option<i32>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            rewards: RewardConfig::default(),
            max_strategic_steps: 50,
            wait_radius: None,
        }
    }
}

/// Consecutive ticks the agent holds before stepping forward anyway
pub const MAX_CONSECUTIVE_WAITS: usize = 20;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Reached the goal holding every key
    Won,
    /// An enemy intercepted the agent
    Caught,
    /// The planner found no route to the target
    DeadEnd,
    /// Decision budget used up
    OutOfDecisions,
}

/// Result of one strategic decision
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Macro state after the walk
    pub next_state: MacroState,
    /// Reward earned by this decision
    pub reward: f64,
    /// Action actually pursued (seeking a key falls back to the goal)
    pub pursued: MacroAction,
    /// Cells the agent walked
    pub cells_walked: usize,
    /// Keys picked up during the walk
    pub keys_collected: usize,
    /// Set once the episode is over
    pub termination: Option<Termination>,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.termination.is_some()
    }
}

/// Outcome of a whole episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub termination: Termination,
    pub reward: f64,
    /// Strategic decisions taken
    pub decisions: usize,
    /// Grid cells walked
    pub steps: usize,
    pub keys_collected: usize,
}

impl EpisodeSummary {
    pub fn is_win(&self) -> bool {
        self.termination == Termination::Won
    }

    pub fn is_death(&self) -> bool {
        self.termination == Termination::Caught
    }
}

/// How the selector is used while an episode runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeMode {
    /// Epsilon-greedy choices and a table update after every decision
    Learn,
    /// Highest-valued action only, table untouched
    Greedy,
}

/// Single-agent maze environment
pub struct MazeEnv {
    world: WorldState,
    config: EnvConfig,
    decisions: usize,
    steps: usize,
    total_reward: f64,
    keys_collected: usize,
}

impl MazeEnv {
    pub fn new(maze: Maze, config: EnvConfig) -> Self {
        Self {
            world: WorldState::new(maze),
            config,
            decisions: 0,
            steps: 0,
            total_reward: 0.0,
            keys_collected: 0,
        }
    }

    /// Restart on the current maze
    pub fn reset(&mut self) -> MacroState {
        self.world.reset();
        self.decisions = 0;
        self.steps = 0;
        self.total_reward = 0.0;
        self.keys_collected = 0;
        self.observe()
    }

    /// Restart on a new maze
    pub fn reset_with_maze(&mut self, maze: Maze) -> MacroState {
        self.world = WorldState::new(maze);
        self.reset()
    }

    pub fn observe(&self) -> MacroState {
        MacroState::observe(&self.world)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Executes one strategic decision: resolve the target, plan a route and walk it
    /// cell by cell while every enemy advances once per agent step.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        action: MacroAction,
        rng: &mut R,
        observer: &mut dyn GameObserver,
    ) -> StepResult {
        let state = self.observe();
        let (pursued, target) = resolve_target(&self.world, action);
        observer.on_strategy_selected(state, pursued, target, &self.world);

        let rewards = self.config.rewards.clone();
        let mut reward = 0.0;
        let mut cells_walked = 0;
        let mut keys_collected = 0;
        let mut termination = None;

        match AStar::find_path(&self.world.maze.map, self.world.agent.position, target) {
            None => {
                trace!("No route to ({}, {})", target.row, target.col);
                self.world.last_path = None;
                reward += rewards.dead_end;
                termination = Some(Termination::DeadEnd);
            }
            Some(path) => {
                self.world.last_path = Some(path.clone());
                let mut route = path.into_iter().peekable();
                let mut waited = 0;
                while let Some(&next) = route.peek() {
                    let from = self.world.agent.position;
                    let enemies_before = self.world.enemy_positions();
                    let holding =
                        waited < MAX_CONSECUTIVE_WAITS && self.threatened(next, &enemies_before);
                    if holding {
                        waited += 1;
                        trace!("Holding at ({}, {}), enemy near next cell", from.row, from.col);
                    } else {
                        waited = 0;
                        route.next();
                        self.world.agent.position = next;
                    }
                    self.world.advance_enemies(rng);
                    if !holding {
                        cells_walked += 1;
                        reward += rewards.step;
                        observer.on_agent_moved(next, &self.world);
                    }

                    // A held tick has from == to, so only an enemy stepping in can hit.
                    let enemies_after = self.world.enemy_positions();
                    if let Some(collision) = detect_collision(
                        from,
                        self.world.agent.position,
                        &enemies_before,
                        &enemies_after,
                    ) {
                        reward += rewards.enemy_collision;
                        observer.on_agent_died(&collision, &self.world);
                        termination = Some(Termination::Caught);
                        break;
                    }
                    if holding {
                        continue;
                    }

                    match self.world.maze.map.get(&next) {
                        Some(Tile::Key) if self.world.agent.collect(next) => {
                            reward += rewards.key;
                            keys_collected += 1;
                        }
                        Some(Tile::Goal) => {
                            self.world.agent.goal_discovered = true;
                            if self.world.agent.has_all_keys() {
                                reward += rewards.goal;
                                termination = Some(Termination::Won);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        self.decisions += 1;
        self.steps += cells_walked;
        self.keys_collected += keys_collected;
        self.total_reward += reward;
        if termination.is_none() && self.decisions >= self.config.max_strategic_steps {
            termination = Some(Termination::OutOfDecisions);
        }

        StepResult {
            next_state: self.observe(),
            reward,
            pursued,
            cells_walked,
            keys_collected,
            termination,
        }
    }

    fn threatened(&self, cell: Position, enemies: &[Position]) -> bool {
        self.config
            .wait_radius
            .is_some_and(|radius| enemies.iter().any(|enemy| enemy.distance(&cell) <= radius))
    }

    /// Plays the current maze from the start until the episode terminates.
    pub fn run_episode<R: Rng + ?Sized>(
        &mut self,
        episode: usize,
        selector: &mut StrategySelector,
        mode: EpisodeMode,
        rng: &mut R,
        observer: &mut dyn GameObserver,
    ) -> EpisodeSummary {
        let mut state = self.reset();
        observer.on_episode_start(episode, &self.world);

        let termination = loop {
            let action = match mode {
                EpisodeMode::Learn => selector.choose_action(state, rng),
                EpisodeMode::Greedy => selector.greedy_action(state),
            };
            let result = self.step(action, rng, observer);
            if mode == EpisodeMode::Learn {
                selector.update(state, action, result.reward, result.next_state);
            }
            state = result.next_state;
            if let Some(termination) = result.termination {
                break termination;
            }
        };

        let summary = self.summary(termination);
        observer.on_episode_finished(episode, &summary);
        summary
    }

    fn summary(&self, termination: Termination) -> EpisodeSummary {
        EpisodeSummary {
            termination,
            reward: self.total_reward,
            decisions: self.decisions,
            steps: self.steps,
            keys_collected: self.keys_collected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LearnerConfig;
    use crate::infra::Direction;
    use crate::planners::rl::NUM_STATES;
    use crate::state::{Enemy, Map};
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// Always draws zero, so enemies take the first open direction in N, E, S, W order.
    struct FirstChoice;

    impl RngCore for FirstChoice {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    struct Recorder {
        visits: Vec<Position>,
        deaths: Vec<Position>,
        finished: Vec<Termination>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                visits: Vec::new(),
                deaths: Vec::new(),
                finished: Vec::new(),
            }
        }
    }

    impl GameObserver for Recorder {
        fn on_episode_start(&mut self, _episode: usize, _world: &WorldState) {}

        fn on_strategy_selected(
            &mut self,
            _state: MacroState,
            _action: MacroAction,
            _target: Position,
            _world: &WorldState,
        ) {
        }

        fn on_agent_moved(&mut self, position: Position, _world: &WorldState) {
            self.visits.push(position);
        }

        fn on_agent_died(&mut self, collision: &crate::state::Collision, _world: &WorldState) {
            self.deaths.push(collision.position);
        }

        fn on_episode_finished(&mut self, _episode: usize, summary: &EpisodeSummary) {
            self.finished.push(summary.termination);
        }
    }

    fn maze(rows: &[&str], start: Position, goal: Position, keys: Vec<Position>) -> Maze {
        let map = Map::from_ascii(rows);
        let traps = map.interior_positions(Tile::Trap);
        Maze {
            map,
            start,
            goal,
            keys,
            traps,
            enemies: Vec::new(),
        }
    }

    fn two_key_maze() -> Maze {
        maze(
            &["#######", "#.K.K.#", "#####G#", "#######"],
            Position::new(1, 1),
            Position::new(2, 5),
            vec![Position::new(1, 2), Position::new(1, 4)],
        )
    }

    #[test]
    fn test_forced_two_key_run_wins_with_exact_reward() {
        let mut env = MazeEnv::new(two_key_maze(), EnvConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let mut observer = Recorder::new();
        let mut state = env.reset();
        let mut total = 0.0;
        let mut result;

        loop {
            let action = if state.has_all_keys() {
                MacroAction::SeekGoal
            } else {
                MacroAction::SeekKey
            };
            result = env.step(action, &mut rng, &mut observer);
            total += result.reward;
            state = result.next_state;
            if result.done() {
                break;
            }
        }

        assert_eq!(result.termination, Some(Termination::Won));
        let cells = observer.visits.len() as f64;
        assert_eq!(cells, 5.0);
        assert!((total - (-cells + 2.0 * 20.0 + 100.0)).abs() < 1e-9);
        assert!(env.world().agent.goal_discovered);
        assert!(observer.deaths.is_empty());
    }

    #[test]
    fn test_seek_key_falls_back_to_goal() {
        let mut env = MazeEnv::new(two_key_maze(), EnvConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        let mut observer = Recorder::new();
        env.reset();
        env.step(MacroAction::SeekKey, &mut rng, &mut observer);
        env.step(MacroAction::SeekKey, &mut rng, &mut observer);
        let result = env.step(MacroAction::SeekKey, &mut rng, &mut observer);
        assert_eq!(result.pursued, MacroAction::SeekGoal);
        assert_eq!(result.termination, Some(Termination::Won));
    }

    #[test]
    fn test_goal_without_keys_only_marks_discovery() {
        let mut env = MazeEnv::new(two_key_maze(), EnvConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekGoal, &mut rng, &mut observer);
        // Walking to the goal passes both keys, so they are picked up on the way.
        assert_eq!(result.keys_collected, 2);
        assert_eq!(result.termination, Some(Termination::Won));

        let mut env = MazeEnv::new(
            maze(
                &["#######", "#...K.#", "#G#####", "#######"],
                Position::new(1, 2),
                Position::new(2, 1),
                vec![Position::new(1, 4)],
            ),
            EnvConfig::default(),
        );
        env.reset();
        let result = env.step(MacroAction::SeekGoal, &mut rng, &mut observer);
        assert_eq!(result.termination, None);
        assert_eq!(result.next_state, MacroState::new(false, true));
        assert!((result.reward - -2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_target_is_a_dead_end() {
        let mut env = MazeEnv::new(
            maze(
                &["#######", "#..T.G#", "#######"],
                Position::new(1, 1),
                Position::new(1, 5),
                vec![Position::new(1, 2)],
            ),
            EnvConfig::default(),
        );
        let mut rng = StdRng::seed_from_u64(4);
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekGoal, &mut rng, &mut observer);
        assert_eq!(result.termination, Some(Termination::DeadEnd));
        assert!((result.reward - -50.0).abs() < 1e-9);
        assert_eq!(result.cells_walked, 0);
        assert_eq!(env.world().last_path, None);
    }

    #[test]
    fn test_swap_in_corridor_ends_episode() {
        let mut maze = maze(
            &["######", "#....#", "######"],
            Position::new(1, 1),
            Position::new(1, 4),
            vec![Position::new(1, 3)],
        );
        // Enemy at (1,2) heading west: its only forward move is onto the agent's start.
        maze.enemies = vec![Enemy::new(Position::new(1, 2), Some(Direction::West), 0)];
        let mut env = MazeEnv::new(maze, EnvConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekKey, &mut rng, &mut observer);

        assert_eq!(result.termination, Some(Termination::Caught));
        assert_eq!(result.cells_walked, 1);
        assert!((result.reward - (-1.0 + -100.0)).abs() < 1e-9);
        assert_eq!(observer.deaths, vec![Position::new(1, 2)]);
        assert!(!env.world().agent.has_collected(&Position::new(1, 3)));
    }

    /// Corridor with a side branch at (1,3). The enemy climbs the branch and turns east
    /// at the junction, straight across the agent's route down the branch to the key.
    fn junction_maze() -> Maze {
        let mut maze = maze(
            &[
                "###########",
                "#........G#",
                "###.#######",
                "###.#######",
                "###K#######",
                "###########",
            ],
            Position::new(1, 1),
            Position::new(1, 9),
            vec![Position::new(4, 3)],
        );
        maze.enemies = vec![Enemy::new(Position::new(3, 3), Some(Direction::North), 0)];
        maze
    }

    #[test]
    fn test_walking_into_junction_is_caught() {
        let mut env = MazeEnv::new(junction_maze(), EnvConfig::default());
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekKey, &mut FirstChoice, &mut observer);

        assert_eq!(result.termination, Some(Termination::Caught));
        assert_eq!(observer.visits, vec![Position::new(1, 2), Position::new(1, 3)]);
        assert_eq!(observer.deaths, vec![Position::new(1, 3)]);
    }

    #[test]
    fn test_holding_near_enemy_lets_it_pass() {
        let config = EnvConfig {
            wait_radius: Some(2),
            ..EnvConfig::default()
        };
        let mut env = MazeEnv::new(junction_maze(), config);
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekKey, &mut FirstChoice, &mut observer);

        assert_eq!(result.termination, None);
        assert!(observer.deaths.is_empty());
        // Held ticks are not visits and cost nothing.
        assert_eq!(
            observer.visits,
            vec![
                Position::new(1, 2),
                Position::new(1, 3),
                Position::new(2, 3),
                Position::new(3, 3),
                Position::new(4, 3)
            ]
        );
        assert_eq!(result.cells_walked, 5);
        assert_eq!(result.keys_collected, 1);
        assert!((result.reward - (-5.0 + 20.0)).abs() < 1e-9);
        // Five walked cells plus four ticks spent holding at (1,2).
        assert_eq!(env.world().tick, 9);
        assert_eq!(env.world().agent.position, Position::new(4, 3));
    }

    #[test]
    fn test_holding_gives_up_after_cap() {
        // The enemy never moves, so the agent waits out the cap, then steps onto it.
        let mut maze = maze(
            &["######", "#....#", "######"],
            Position::new(1, 1),
            Position::new(1, 4),
            vec![Position::new(1, 3)],
        );
        maze.enemies = vec![Enemy::new(Position::new(1, 2), None, u32::MAX)];
        let config = EnvConfig {
            wait_radius: Some(2),
            ..EnvConfig::default()
        };
        let mut env = MazeEnv::new(maze, config);
        let mut observer = Recorder::new();
        env.reset();
        let result = env.step(MacroAction::SeekKey, &mut FirstChoice, &mut observer);

        assert_eq!(result.termination, Some(Termination::Caught));
        assert_eq!(observer.deaths, vec![Position::new(1, 2)]);
        assert_eq!(env.world().tick, MAX_CONSECUTIVE_WAITS as u64 + 1);
    }

    #[test]
    fn test_decision_budget_truncates() {
        let mut env = MazeEnv::new(
            maze(
                &["#######", "#...K.#", "#G#####", "#######"],
                Position::new(1, 2),
                Position::new(2, 1),
                vec![Position::new(1, 4)],
            ),
            EnvConfig {
                max_strategic_steps: 2,
                ..EnvConfig::default()
            },
        );
        let mut rng = StdRng::seed_from_u64(6);
        let mut observer = Recorder::new();
        env.reset();
        assert_eq!(env.step(MacroAction::SeekGoal, &mut rng, &mut observer).termination, None);
        let result = env.step(MacroAction::SeekGoal, &mut rng, &mut observer);
        assert_eq!(result.termination, Some(Termination::OutOfDecisions));
        assert_eq!(result.cells_walked, 0);
    }

    #[test]
    fn test_learning_episode_updates_table() {
        let mut env = MazeEnv::new(two_key_maze(), EnvConfig::default());
        let mut selector = StrategySelector::new(LearnerConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut observer = Recorder::new();

        let summary = env.run_episode(1, &mut selector, EpisodeMode::Learn, &mut rng, &mut observer);
        assert!(summary.is_win());
        assert_eq!(observer.finished, vec![Termination::Won]);
        let touched = (0..NUM_STATES)
            .filter_map(MacroState::from_index)
            .flat_map(|s| MacroAction::ALL.map(|a| selector.table().get(s, a)))
            .any(|v| v != 0.0);
        assert!(touched);

        let before = selector.table().clone();
        let summary = env.run_episode(2, &mut selector, EpisodeMode::Greedy, &mut rng, &mut observer);
        assert!(summary.is_win());
        assert_eq!(selector.table(), &before);
    }
}
