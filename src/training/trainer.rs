use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::{RandomAgent, TrainableAgent};
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::TrainingError;
use crate::game::{Layout, Player};
use crate::training::episode::{
    episode_seed, evaluate, play_episode, EpisodeConfig, SelectionMode, Seating,
};
use crate::training::metrics::EpisodeStats;

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    pub checkpoint_interval: usize,
    pub checkpoint_dir: PathBuf,
    /// Selection granularity during self-play.
    pub selection: SelectionMode,
    /// Selection granularity during evaluation matches.
    pub eval_selection: SelectionMode,
    pub layout: Layout,
    pub max_turns: usize,
    /// Base seed for per-episode dice. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 10_000,
            log_interval: 100,
            eval_interval: 500,
            eval_games: 100,
            checkpoint_interval: 1000,
            checkpoint_dir: PathBuf::from("checkpoints"),
            selection: SelectionMode::PerDie,
            eval_selection: SelectionMode::FullRoll,
            layout: Layout::Standard,
            max_turns: 2_000,
            seed: None,
        }
    }
}

impl TrainerConfig {
    fn episode_config(&self, selection: SelectionMode) -> EpisodeConfig {
        EpisodeConfig {
            layout: self.layout,
            selection,
            max_turns: self.max_turns,
        }
    }
}

/// Self-play trainer: one learner plays both sides.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    pub fn new(config: TrainerConfig, checkpoint: CheckpointManagerConfig) -> Self {
        let checkpoint_manager = CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: config.checkpoint_dir.clone(),
            ..checkpoint
        });
        Trainer {
            config,
            checkpoint_manager,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training loop, continuing from the agent's episode count.
    pub fn train<A: TrainableAgent>(&self, agent: &mut A) -> Result<EpisodeStats, TrainingError> {
        let mut stats = EpisodeStats::new();
        let mut os_rng = StdRng::from_os_rng();
        let self_play = self.config.episode_config(self.config.selection);

        let start_episode = agent.episode_count() + 1;
        let end_episode = agent.episode_count() + self.config.num_episodes;
        let mut last_eval = 0.0;

        log::info!(
            "Starting {} training for {} episodes (episodes {}..{}), {:?} layout, {:?} selection",
            agent.algorithm_name(),
            self.config.num_episodes,
            start_episode,
            end_episode,
            self.config.layout,
            self.config.selection,
        );

        for episode in start_episode..=end_episode {
            let result = match self.config.seed {
                Some(base) => {
                    let mut rng = StdRng::seed_from_u64(episode_seed(base, episode));
                    play_episode(&mut Seating::SelfPlay(&mut *agent), &self_play, true, &mut rng)?
                }
                None => play_episode(
                    &mut Seating::SelfPlay(&mut *agent),
                    &self_play,
                    true,
                    &mut os_rng,
                )?,
            };
            stats.record(result);

            if episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                log::info!(
                    "Episode {}/{} | steps: {} | X wins({}): {:.1}% | avg_len: {:.1} | aborted: {}",
                    episode,
                    end_episode,
                    agent.step_count(),
                    window,
                    stats.win_ratio(Player::X, window) * 100.0,
                    stats.average_length(window),
                    stats.aborted(),
                );
            }

            if episode % self.config.eval_interval == 0 {
                last_eval = self.evaluate(agent, &mut os_rng)?;
                log::info!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    self.config.eval_games,
                    last_eval * 100.0
                );
            }

            if episode % self.config.checkpoint_interval == 0 {
                let window = self.config.log_interval;
                let metrics = CheckpointMetrics {
                    eval_win_rate: last_eval,
                    self_play_x_ratio: stats.win_ratio(Player::X, window),
                    average_game_length: stats.average_length(window),
                    aborted_games: stats.aborted(),
                    training_steps: agent.step_count(),
                };
                match self.checkpoint_manager.save_checkpoint(&*agent, &metrics, episode) {
                    Ok(path) => log::info!("  >> Checkpoint saved: {}", path.display()),
                    Err(e) => log::warn!("  >> Checkpoint failed: {e}"),
                }
            }
        }

        log::info!(
            "Training complete. Episodes this run: {}, X wins {}, O wins {}",
            stats.games_played(),
            stats.wins(Player::X),
            stats.wins(Player::O),
        );

        let final_wr = self.evaluate(agent, &mut os_rng)?;
        log::info!("Final eval vs Random: {:.1}% win rate", final_wr * 100.0);
        Ok(stats)
    }

    /// Evaluate the agent against `RandomAgent` over `eval_games`, alternating sides.
    pub fn evaluate<A: TrainableAgent>(
        &self,
        agent: &mut A,
        rng: &mut StdRng,
    ) -> Result<f32, TrainingError> {
        let mut random = RandomAgent::new();
        let config = self.config.episode_config(self.config.eval_selection);
        evaluate(agent, &mut random, self.config.eval_games, &config, rng)
    }
}
