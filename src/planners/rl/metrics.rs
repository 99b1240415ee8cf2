//! Training and evaluation metrics

use std::collections::VecDeque;
use std::time::Instant;

use super::env::EpisodeSummary;

/// Mean of the most recent samples, older ones fall out of the window.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    capacity: usize,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    /// 0.0 before the first sample
    pub fn average(&self) -> f64 {
        match self.window.len() {
            0 => 0.0,
            n => self.window.iter().sum::<f64>() / n as f64,
        }
    }
}

/// Training metrics tracker
#[derive(Debug)]
pub struct TrainingMetrics {
    /// Wins over the window (0 or 1 per episode)
    pub win_rate: MovingAverage,
    /// Episode rewards
    pub episode_rewards: MovingAverage,
    /// Episode lengths in grid cells
    pub episode_lengths: MovingAverage,
    /// Episodes recorded so far
    pub episodes: usize,
    pub wins: usize,
    pub deaths: usize,
    pub dead_ends: usize,
    /// Win rate (percent) captured at every log point
    pub win_rate_history: Vec<f64>,
    start_time: Instant,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            win_rate: MovingAverage::new(window_size),
            episode_rewards: MovingAverage::new(window_size),
            episode_lengths: MovingAverage::new(window_size),
            episodes: 0,
            wins: 0,
            deaths: 0,
            dead_ends: 0,
            win_rate_history: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Record episode completion
    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        use super::env::Termination;

        self.episodes += 1;
        self.win_rate.push(if summary.is_win() { 1.0 } else { 0.0 });
        self.episode_rewards.push(summary.reward);
        self.episode_lengths.push(summary.steps as f64);
        match summary.termination {
            Termination::Won => self.wins += 1,
            Termination::Caught => self.deaths += 1,
            Termination::DeadEnd => self.dead_ends += 1,
            Termination::OutOfDecisions => {}
        }
    }

    /// Windowed win rate in percent
    pub fn win_rate_percent(&self) -> f64 {
        self.win_rate.average() * 100.0
    }

    pub fn training_duration_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Log current metrics to console and append the win rate to the history
    pub fn log_to_console(&mut self, epsilon: f64) {
        let win_rate = self.win_rate_percent();
        self.win_rate_history.push(win_rate);

        tracing::info!(
            "Episode {} | Win Rate: {:.1}% | Epsilon: {:.3} | {:.1}s",
            self.episodes,
            win_rate,
            epsilon,
            self.training_duration_secs()
        );
        tracing::info!(
            "  Episode: reward={:.2}, length={:.1}, deaths={}, dead ends={}",
            self.episode_rewards.average(),
            self.episode_lengths.average(),
            self.deaths,
            self.dead_ends
        );
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Evaluation metrics for greedy demonstration runs
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetrics {
    /// Number of evaluation episodes
    pub num_episodes: usize,
    /// Total reward across all episodes
    pub total_reward: f64,
    /// Number of wins
    pub num_wins: usize,
    /// Total strategic decisions across all episodes
    pub total_decisions: usize,
    /// Number of deaths
    pub num_deaths: usize,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.num_episodes += 1;
        self.total_reward += summary.reward;
        self.total_decisions += summary.decisions;
        if summary.is_win() {
            self.num_wins += 1;
        }
        if summary.is_death() {
            self.num_deaths += 1;
        }
    }

    pub fn avg_reward(&self) -> f64 {
        if self.num_episodes > 0 {
            self.total_reward / self.num_episodes as f64
        } else {
            0.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.num_episodes > 0 {
            self.num_wins as f64 / self.num_episodes as f64
        } else {
            0.0
        }
    }

    pub fn avg_decisions(&self) -> f64 {
        if self.num_episodes > 0 {
            self.total_decisions as f64 / self.num_episodes as f64
        } else {
            0.0
        }
    }

    /// Print summary
    pub fn print_summary(&self) {
        tracing::info!("=== Demonstration Summary ===");
        tracing::info!("Episodes: {}", self.num_episodes);
        tracing::info!("Win Rate: {:.1}%", self.win_rate() * 100.0);
        tracing::info!("Avg Reward: {:.2}", self.avg_reward());
        tracing::info!("Avg Decisions: {:.1}", self.avg_decisions());
        tracing::info!("Deaths: {}", self.num_deaths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::rl::Termination;

    fn summary(termination: Termination, reward: f64, decisions: usize, steps: usize) -> EpisodeSummary {
        EpisodeSummary {
            termination,
            reward,
            decisions,
            steps,
            keys_collected: 0,
        }
    }

    #[test]
    fn test_moving_average_window() {
        let mut avg = MovingAverage::new(3);
        assert_eq!(avg.average(), 0.0);

        let expected = [1.0, 1.5, 2.0, 3.0, 4.0];
        for (value, mean) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().zip(expected) {
            avg.push(value);
            assert!((avg.average() - mean).abs() < 1e-9, "after {}", value);
        }
    }

    #[test]
    fn test_zero_capacity_keeps_latest_sample() {
        let mut avg = MovingAverage::new(0);
        avg.push(8.0);
        avg.push(2.0);
        assert!((avg.average() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_training_metrics_counts() {
        let mut metrics = TrainingMetrics::new(2);
        metrics.record_episode(&summary(Termination::Won, 100.0, 2, 10));
        metrics.record_episode(&summary(Termination::Caught, -110.0, 1, 10));
        metrics.record_episode(&summary(Termination::DeadEnd, -50.0, 1, 0));

        assert_eq!(metrics.episodes, 3);
        assert_eq!((metrics.wins, metrics.deaths, metrics.dead_ends), (1, 1, 1));
        // Window of two: only the last two episodes count.
        assert!(metrics.win_rate_percent().abs() < 1e-9);
        assert!((metrics.episode_rewards.average() - -80.0).abs() < 1e-9);

        metrics.log_to_console(0.5);
        assert_eq!(metrics.win_rate_history, vec![0.0]);
    }

    #[test]
    fn test_evaluation_metrics() {
        let mut metrics = EvaluationMetrics::new();

        metrics.record_episode(&summary(Termination::Won, 10.0, 4, 50));
        metrics.record_episode(&summary(Termination::Caught, 5.0, 2, 100));

        assert_eq!(metrics.num_episodes, 2);
        assert_eq!(metrics.num_deaths, 1);
        assert!((metrics.avg_reward() - 7.5).abs() < 1e-9);
        assert!((metrics.win_rate() - 0.5).abs() < 1e-9);
        assert!((metrics.avg_decisions() - 3.0).abs() < 1e-9);
    }
}
