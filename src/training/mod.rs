//! Training infrastructure: episode driver, self-play trainer and episode
//! statistics.

pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{
    episode_seed, evaluate, play_episode, playable_steps, EpisodeConfig, EpisodeResult,
    Seating, SelectionMode,
};
pub use metrics::EpisodeStats;
pub use trainer::{Trainer, TrainerConfig};
