use std::fmt;

use super::Player;
use crate::error::{BoardError, MoveError};

/// Number of points on the board.
pub const NUM_POINTS: usize = 24;
/// Destination index meaning "borne off".
pub const BEAR_OFF: usize = 24;
/// First point of the home board, in the mover's own coordinates.
pub const HOME_START: usize = 18;
/// Largest number of pieces a player may own.
pub const MAX_PIECES: u32 = 15;

const STANDARD_POINTS: [u8; NUM_POINTS] = [
    2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 3, 0, 5, 0, 0, 0, 0, 0,
];
const SIMPLE_POINTS: [u8; NUM_POINTS] = [
    3, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Where a moving piece starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    Bar,
    Point(usize),
}

impl Origin {
    /// Position on the mover's number line; the bar sits just before point 0.
    fn position(self) -> isize {
        match self {
            Origin::Bar => -1,
            Origin::Point(p) => p as isize,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Bar => f.write_str("bar"),
            Origin::Point(p) => write!(f, "{p}"),
        }
    }
}

/// A single piece movement: an origin and the die value spent on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub origin: Origin,
    pub die: u8,
}

impl Move {
    pub fn new(origin: Origin, die: u8) -> Self {
        Move { origin, die }
    }

    /// Destination in the mover's coordinates. `BEAR_OFF` means the piece
    /// leaves the board; larger values overshoot and are never legal.
    pub fn destination(&self) -> usize {
        (self.origin.position() + self.die as isize).max(0) as usize
    }

    pub fn is_bear_off(&self) -> bool {
        self.destination() == BEAR_OFF
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = self.destination();
        if destination == BEAR_OFF {
            write!(f, "{}/off", self.origin)
        } else {
            write!(f, "{}/{}", self.origin, destination)
        }
    }
}

/// Starting arrangement, identical for both players in their own coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Regular 15-piece backgammon start.
    #[default]
    Standard,
    /// Reduced 9-piece board for quick training runs.
    Simple,
}

impl Layout {
    pub fn points(self) -> [u8; NUM_POINTS] {
        match self {
            Layout::Standard => STANDARD_POINTS,
            Layout::Simple => SIMPLE_POINTS,
        }
    }
}

/// Two-player backgammon position.
///
/// Each player's points are stored in that player's own movement direction:
/// point 0 is furthest from home and point 23 is next to bearing off. The same
/// physical point is `i` for one player and `23 - i` for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    points: [[u8; NUM_POINTS]; 2],
    bar: [u8; 2],
    removed: [u8; 2],
    total_pieces: u8,
}

impl Board {
    /// Create a board in the given starting layout
    pub fn new(layout: Layout) -> Self {
        let points = layout.points();
        let total: u32 = points.iter().map(|&n| n as u32).sum();
        Board {
            points: [points, points],
            bar: [0; 2],
            removed: [0; 2],
            total_pieces: total as u8,
        }
    }

    /// Build a board from explicit counts, checking the piece invariant and
    /// that no physical point holds pieces of both players.
    pub fn from_parts(
        points: [[u8; NUM_POINTS]; 2],
        bar: [u8; 2],
        removed: [u8; 2],
        total_pieces: u32,
    ) -> Result<Self, BoardError> {
        if total_pieces > MAX_PIECES {
            return Err(BoardError::TooManyPieces(total_pieces));
        }
        for player in Player::BOTH {
            let i = player.index();
            let on_board: u32 = points[i].iter().map(|&n| n as u32).sum();
            let found = on_board + bar[i] as u32 + removed[i] as u32;
            if found != total_pieces {
                return Err(BoardError::PieceCount {
                    player,
                    found,
                    expected: total_pieces,
                });
            }
        }
        for point in 0..NUM_POINTS {
            if points[0][point] > 0 && points[1][NUM_POINTS - 1 - point] > 0 {
                return Err(BoardError::Overlap { point });
            }
        }
        Ok(Board {
            points,
            bar,
            removed,
            total_pieces: total_pieces as u8,
        })
    }

    /// All 24 point counts of `player`, in that player's coordinates
    pub fn points(&self, player: Player) -> &[u8; NUM_POINTS] {
        &self.points[player.index()]
    }

    pub fn point(&self, player: Player, index: usize) -> u8 {
        self.points[player.index()][index]
    }

    pub fn bar(&self, player: Player) -> u8 {
        self.bar[player.index()]
    }

    pub fn removed(&self, player: Player) -> u8 {
        self.removed[player.index()]
    }

    pub fn total_pieces(&self) -> u32 {
        self.total_pieces as u32
    }

    /// Pips left before every piece of `player` is borne off.
    pub fn pip_count(&self, player: Player) -> u32 {
        let i = player.index();
        let on_points: u32 = self.points[i]
            .iter()
            .enumerate()
            .map(|(p, &n)| n as u32 * (BEAR_OFF - p) as u32)
            .sum();
        on_points + self.bar[i] as u32 * (BEAR_OFF as u32 + 1)
    }

    /// True when nothing is on the bar and every remaining piece is in the
    /// home board.
    pub fn can_bear_off(&self, player: Player) -> bool {
        let i = player.index();
        self.bar[i] == 0 && self.points[i][..HOME_START].iter().all(|&n| n == 0)
    }

    /// Every legal single move for `player` using any value in `dice`.
    ///
    /// Repeated values (doubles) are checked once. While the player has a
    /// piece on the bar, only bar entries are considered.
    pub fn legal_moves(&self, dice: &[u8], player: Player) -> Vec<Move> {
        let mut values = dice.to_vec();
        values.sort_unstable();
        values.dedup();

        let mut moves = Vec::new();
        for die in values {
            if self.bar(player) > 0 {
                let mv = Move::new(Origin::Bar, die);
                if self.move_permitted(mv, player) {
                    moves.push(mv);
                }
            } else {
                for p in 0..NUM_POINTS {
                    let mv = Move::new(Origin::Point(p), die);
                    if self.move_permitted(mv, player) {
                        moves.push(mv);
                    }
                }
            }
        }
        moves
    }

    /// Check whether `player` may make `mv` on this board.
    pub fn move_permitted(&self, mv: Move, player: Player) -> bool {
        if !(1..=6).contains(&mv.die) {
            return false;
        }
        let me = player.index();
        let them = player.other().index();

        match mv.origin {
            Origin::Bar => {
                if self.bar[me] == 0 {
                    return false;
                }
            }
            Origin::Point(p) => {
                if p >= NUM_POINTS || self.points[me][p] == 0 || self.bar[me] > 0 {
                    return false;
                }
            }
        }

        let destination = mv.destination();
        if destination == BEAR_OFF {
            return self.can_bear_off(player);
        }
        if destination > BEAR_OFF {
            return false;
        }
        self.points[them][NUM_POINTS - 1 - destination] <= 1
    }

    /// Apply a validated move. Returns whether an opposing blot was hit.
    ///
    /// Illegal requests are rejected without touching the board.
    pub fn apply_move(&mut self, mv: Move, player: Player) -> Result<bool, MoveError> {
        if !(1..=6).contains(&mv.die) {
            return Err(MoveError::InvalidDie(mv.die));
        }
        if !self.move_permitted(mv, player) {
            return Err(MoveError::Illegal { mv, player });
        }
        Ok(self.perform(mv, player))
    }

    /// Apply a move already known to be legal.
    pub(crate) fn perform(&mut self, mv: Move, player: Player) -> bool {
        let me = player.index();
        let them = player.other().index();

        match mv.origin {
            Origin::Bar => self.bar[me] -= 1,
            Origin::Point(p) => self.points[me][p] -= 1,
        }

        let destination = mv.destination();
        if destination == BEAR_OFF {
            self.removed[me] += 1;
            return false;
        }

        self.points[me][destination] += 1;
        let mirrored = NUM_POINTS - 1 - destination;
        if self.points[them][mirrored] == 1 {
            self.points[them][mirrored] = 0;
            self.bar[them] += 1;
            log::debug!("{player} hits at {destination} (own coordinates)");
            true
        } else {
            false
        }
    }

    /// True once every piece of `player` has been borne off
    pub fn game_won(&self, player: Player) -> bool {
        self.removed[player.index()] as u32 == self.total_pieces as u32
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Layout::Standard)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, player) in Player::BOTH.into_iter().enumerate() {
            if n > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{player}:")?;
            for count in self.points(player) {
                write!(f, " {count}")?;
            }
            write!(
                f,
                " bar {} off {}",
                self.bar(player),
                self.removed(player)
            )?;
        }
        Ok(())
    }
}
