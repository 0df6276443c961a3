use std::path::Path;

use crate::checkpoint::{CheckpointMetadata, CheckpointMetrics};
use crate::error::CheckpointError;
use crate::game::{Board, Player};

/// One step of experience, as seen by the player who moved.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub before: Board,
    pub after: Board,
    pub player: Player,
    /// 1.0 when this move won the game, otherwise 0.0.
    pub reward: f32,
    pub episode_end: bool,
}

/// Universal interface for all backgammon agents.
pub trait Agent {
    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Pick one of `candidates`, the boards `player` could move to.
    /// When `training` is true the agent may explore; otherwise it exploits.
    /// Never called with an empty slice.
    fn choose(&mut self, candidates: &[Board], player: Player, training: bool) -> usize;

    /// Learn from a completed move.
    fn observe(&mut self, _transition: &Transition) {}

    /// Called once when a game finishes, won or aborted.
    fn end_episode(&mut self) {}
}

/// Extension trait for agents that support the full training lifecycle.
pub trait TrainableAgent: Agent {
    /// Algorithm name for logs and checkpoint metadata.
    fn algorithm_name(&self) -> &str;
    /// Completed training episodes (for resume offset).
    fn episode_count(&self) -> usize;
    /// Completed learning updates.
    fn step_count(&self) -> usize;
    fn learning_enabled(&self) -> bool;
    /// Freeze or unfreeze learning, e.g. around evaluation matches.
    fn set_learning_enabled(&mut self, enabled: bool);
    /// Save network weights to a directory.
    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), CheckpointError>;
    /// Load network weights from a directory.
    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError>;
    /// Serialize training state to JSON.
    fn training_state_json(&self) -> Result<String, CheckpointError>;
    /// Restore training state from JSON written by `training_state_json`.
    fn restore_training_state_json(&mut self, json: &str) -> Result<(), CheckpointError>;
    /// Build checkpoint metadata for this agent.
    fn build_checkpoint_metadata(
        &self,
        metrics: &CheckpointMetrics,
        episode: usize,
        timestamp: u64,
    ) -> CheckpointMetadata;
}
