use serde::{Deserialize, Serialize};

use crate::ai::{FeatureLayout, Policy};

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Most recent win ratio against the evaluation opponent.
    pub eval_win_rate: f32,
    /// Share of recent self-play games won by X.
    pub self_play_x_ratio: f32,
    pub average_game_length: f32,
    pub aborted_games: usize,
    pub training_steps: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdHyperparameters {
    pub learning_rate: f32,
    pub trace_decay: f32,
    pub epsilon: f64,
    pub hidden_units: usize,
    pub policy: Policy,
    pub feature_layout: FeatureLayout,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub algorithm: String,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: TdHyperparameters,
}

/// Learner state written to training_state.json. Eligibility traces are
/// not persisted; they restart at zero with the next episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdTrainingState {
    pub step_count: usize,
    pub episode_count: usize,
    #[serde(flatten)]
    pub hyperparameters: TdHyperparameters,
}
