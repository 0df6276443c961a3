use std::path::PathBuf;

use crate::game::{Move, Player};

/// Errors raised when a move is applied to a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("illegal move {mv} for player {player}")]
    Illegal { mv: Move, player: Player },

    #[error("die value {0} is outside 1..=6")]
    InvalidDie(u8),

    #[error("game is already over")]
    GameOver,

    #[error("play uses {used} dice but {required} can be played")]
    IncompletePlay { used: usize, required: usize },

    #[error("play does not lead to the board it claims")]
    PlayMismatch,
}

/// Errors raised when a board is built from explicit counts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("player {player} has {found} pieces accounted for, expected {expected}")]
    PieceCount {
        player: Player,
        found: u32,
        expected: u32,
    },

    #[error("physical point {point} is occupied by both players")]
    Overlap { point: usize },

    #[error("a board cannot hold {0} pieces per player")]
    TooManyPieces(u32),
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("agent chose candidate {index} but only {candidates} were offered")]
    InvalidChoice { index: usize, candidates: usize },

    #[error("move error: {0}")]
    Move(#[from] MoveError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Origin;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::Illegal {
            mv: Move::new(Origin::Point(3), 4),
            player: Player::O,
        };
        assert_eq!(err.to_string(), "illegal move 3/7 for player O");

        let err = MoveError::Illegal {
            mv: Move::new(Origin::Bar, 2),
            player: Player::X,
        };
        assert_eq!(err.to_string(), "illegal move bar/1 for player X");
    }

    #[test]
    fn test_incomplete_play_display() {
        let err = MoveError::IncompletePlay {
            used: 1,
            required: 2,
        };
        assert_eq!(err.to_string(), "play uses 1 dice but 2 can be played");
    }

    #[test]
    fn test_board_error_display() {
        let err = BoardError::PieceCount {
            player: Player::X,
            found: 14,
            expected: 15,
        };
        assert_eq!(
            err.to_string(),
            "player X has 14 pieces accounted for, expected 15"
        );
    }

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NoLatestSymlink(PathBuf::from("checkpoints"));
        assert_eq!(
            err.to_string(),
            "no 'latest' symlink found in checkpoints"
        );
    }

    #[test]
    fn test_training_error_display() {
        let err = TrainingError::InvalidChoice {
            index: 5,
            candidates: 3,
        };
        assert_eq!(
            err.to_string(),
            "agent chose candidate 5 but only 3 were offered"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("agent.learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: agent.learning_rate must be > 0"
        );
    }
}
