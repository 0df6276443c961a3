//! Checkpoint directories: network weights plus JSON training state and metadata.

mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{CheckpointMetadata, CheckpointMetrics, TdHyperparameters, TdTrainingState};
