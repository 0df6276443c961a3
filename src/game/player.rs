use std::fmt;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::X, Player::O];

    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Slot of this player in per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::X => 0,
            Player::O => 1,
        }
    }

    /// Pick a player uniformly at random (used to decide who opens an episode)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Player {
        if rng.random_bool(0.5) {
            Player::X
        } else {
            Player::O
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
