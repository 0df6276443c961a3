//! Core backgammon rules: board representation, dice, move enumeration and
//! the turn state machine.

mod board;
mod dice;
mod player;
mod plays;
mod state;

pub use crate::error::{BoardError, MoveError};
pub use board::{Board, Layout, Move, Origin, BEAR_OFF, HOME_START, MAX_PIECES, NUM_POINTS};
pub use dice::DiceRoll;
pub use player::Player;
pub use plays::{enumerate_plays, enumerate_steps, max_dice_playable, Play, Step};
pub use state::GameState;
