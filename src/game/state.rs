use rand::Rng;

use super::{max_dice_playable, Board, DiceRoll, Layout, Move, Play, Player};
use crate::error::MoveError;

/// Board plus whose turn it is, and the winner once the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    winner: Option<Player>,
    turns: usize,
}

impl GameState {
    /// Create a fresh game with `first` to move
    pub fn new(layout: Layout, first: Player) -> Self {
        Self::from_board(Board::new(layout), first)
    }

    /// Create a fresh game with the opening player drawn uniformly at random
    pub fn random_start<R: Rng + ?Sized>(layout: Layout, rng: &mut R) -> Self {
        Self::new(layout, Player::random(rng))
    }

    /// Resume from an arbitrary position
    pub fn from_board(board: Board, current_player: Player) -> Self {
        let winner = Player::BOTH.into_iter().find(|&p| board.game_won(p));
        GameState {
            board,
            current_player,
            winner,
            turns: 0,
        }
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Number of completed turns
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    /// Apply one move for the current player. Returns whether it hit a blot.
    pub fn apply_move(&mut self, mv: Move) -> Result<bool, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        let hit = self.board.apply_move(mv, self.current_player)?;
        self.check_win();
        Ok(hit)
    }

    /// Play a whole roll for the current player.
    ///
    /// Every move of `play` is replayed through [`Board::apply_move`] and must
    /// spend a value from `dice`. The play has to use as many dice as can be
    /// used and end on `play.board`. On any error the state is unchanged.
    pub fn enact(&mut self, play: &Play, dice: &DiceRoll) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        let player = self.current_player;
        let mut board = self.board;
        let mut remaining = dice.clone();
        for &mv in &play.moves {
            if !remaining.consume(mv.die) {
                return Err(MoveError::Illegal { mv, player });
            }
            board.apply_move(mv, player)?;
        }

        let required = max_dice_playable(&self.board, player, dice.values());
        if play.moves.len() < required {
            return Err(MoveError::IncompletePlay {
                used: play.moves.len(),
                required,
            });
        }
        if board != play.board {
            return Err(MoveError::PlayMismatch);
        }

        self.board = board;
        self.check_win();
        Ok(())
    }

    /// Hand the dice to the other player.
    pub fn pass_turn(&mut self) {
        self.current_player = self.current_player.other();
        self.turns += 1;
    }

    fn check_win(&mut self) {
        if self.board.game_won(self.current_player) {
            self.winner = Some(self.current_player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{enumerate_plays, Origin, NUM_POINTS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_state() {
        let state = GameState::new(Layout::Standard, Player::O);
        assert_eq!(state.current_player(), Player::O);
        assert!(!state.is_terminal());
        assert_eq!(state.turns(), 0);
    }

    #[test]
    fn test_random_start_is_fresh() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::random_start(Layout::Simple, &mut rng);
        assert_eq!(*state.board(), Board::new(Layout::Simple));
        assert!(state.winner().is_none());
    }

    #[test]
    fn test_pass_turn() {
        let mut state = GameState::new(Layout::Standard, Player::X);
        state.pass_turn();
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.turns(), 1);
    }

    #[test]
    fn test_win_detection_and_game_over() {
        let mut x = [0u8; NUM_POINTS];
        x[23] = 1;
        let mut o = [0u8; NUM_POINTS];
        o[10] = 2;
        let board = Board::from_parts([x, o], [0, 0], [14, 13], 15).unwrap();
        let mut state = GameState::from_board(board, Player::X);

        state.apply_move(Move::new(Origin::Point(23), 1)).unwrap();
        assert_eq!(state.winner(), Some(Player::X));
        assert_eq!(
            state.apply_move(Move::new(Origin::Point(10), 1)),
            Err(MoveError::GameOver)
        );
        let play = Play {
            moves: Vec::new(),
            board,
        };
        let dice = DiceRoll::new(1, 2).unwrap();
        assert_eq!(state.enact(&play, &dice), Err(MoveError::GameOver));
    }

    #[test]
    fn test_enact_accepts_enumerated_plays() {
        let dice = DiceRoll::new(3, 1).unwrap();
        let start = GameState::new(Layout::Standard, Player::X);
        for play in enumerate_plays(start.board(), Player::X, dice.values()) {
            let mut state = start;
            state.enact(&play, &dice).unwrap();
            assert_eq!(*state.board(), play.board);
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn test_enact_rejects_fabricated_board() {
        // X claims every piece borne off without making a single move
        let mut o = [0u8; NUM_POINTS];
        o[23] = 15;
        let won = Board::from_parts([[0; NUM_POINTS], o], [0, 0], [15, 0], 15).unwrap();
        let mut state = GameState::new(Layout::Standard, Player::X);
        let dice = DiceRoll::new(6, 5).unwrap();

        let empty = Play {
            moves: Vec::new(),
            board: won,
        };
        assert_eq!(
            state.enact(&empty, &dice),
            Err(MoveError::IncompletePlay {
                used: 0,
                required: 2
            })
        );

        let legal = enumerate_plays(state.board(), Player::X, dice.values())
            .into_iter()
            .next()
            .unwrap();
        let forged = Play {
            moves: legal.moves.clone(),
            board: won,
        };
        assert_eq!(state.enact(&forged, &dice), Err(MoveError::PlayMismatch));

        assert_eq!(*state.board(), Board::new(Layout::Standard));
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_enact_rejects_moves_outside_the_roll() {
        let mut state = GameState::new(Layout::Standard, Player::X);
        let dice = DiceRoll::new(3, 1).unwrap();
        let mv = Move::new(Origin::Point(0), 4);
        let mut board = *state.board();
        board.apply_move(mv, Player::X).unwrap();
        let play = Play {
            moves: vec![mv],
            board,
        };
        assert_eq!(
            state.enact(&play, &dice),
            Err(MoveError::Illegal {
                mv,
                player: Player::X
            })
        );

        // A legal first move that stops short of using both dice
        let short = Move::new(Origin::Point(0), 3);
        let mut board = *state.board();
        board.apply_move(short, Player::X).unwrap();
        let play = Play {
            moves: vec![short],
            board,
        };
        assert!(matches!(
            state.enact(&play, &dice),
            Err(MoveError::IncompletePlay { used: 1, required: 2 })
        ));
        assert_eq!(*state.board(), Board::new(Layout::Standard));
    }

    #[test]
    fn test_illegal_move_propagates() {
        let mut state = GameState::new(Layout::Standard, Player::X);
        let err = state.apply_move(Move::new(Origin::Point(11), 1)).unwrap_err();
        assert!(matches!(err, MoveError::Illegal { .. }));
        assert_eq!(*state.board(), Board::new(Layout::Standard));
    }
}
