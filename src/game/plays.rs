//! Move enumeration: every board reachable by spending a roll.

use std::collections::HashSet;

use super::{Board, Move, Player};

/// A complete use of a roll: the moves made and the board they lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub moves: Vec<Move>,
    pub board: Board,
}

/// A single move and the board it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub mv: Move,
    pub board: Board,
}

/// Enumerate the distinct boards `player` can reach with `dice`.
///
/// Every order of the dice and every choice of piece is explored depth
/// first. Only sequences that use the largest achievable number of dice are
/// kept, and each resulting board appears once (with the first sequence that
/// reached it). An empty result means no die can be played.
pub fn enumerate_plays(board: &Board, player: Player, dice: &[u8]) -> Vec<Play> {
    let mut leaves = Vec::new();
    let mut path = Vec::with_capacity(dice.len());
    explore(board, player, dice, &mut path, &mut leaves);

    let depth = leaves.iter().map(|play| play.moves.len()).max().unwrap_or(0);
    let mut seen = HashSet::new();
    let plays: Vec<Play> = leaves
        .into_iter()
        .filter(|play| play.moves.len() == depth)
        .filter(|play| seen.insert(play.board))
        .collect();

    log::debug!(
        "{player} dice {dice:?}: {} distinct plays using {depth} dice",
        plays.len()
    );
    plays
}

fn explore(
    board: &Board,
    player: Player,
    remaining: &[u8],
    path: &mut Vec<Move>,
    leaves: &mut Vec<Play>,
) {
    let moves = board.legal_moves(remaining, player);
    if moves.is_empty() {
        if !path.is_empty() {
            leaves.push(Play {
                moves: path.clone(),
                board: *board,
            });
        }
        return;
    }

    for mv in moves {
        let mut next = *board;
        next.perform(mv, player);
        let rest = without_one(remaining, mv.die);
        path.push(mv);
        explore(&next, player, &rest, path, leaves);
        path.pop();
    }
}

fn without_one(dice: &[u8], die: u8) -> Vec<u8> {
    let mut rest = dice.to_vec();
    if let Some(i) = rest.iter().position(|&d| d == die) {
        rest.remove(i);
    }
    rest
}

/// Every single legal move for the remaining dice, with its resulting board.
pub fn enumerate_steps(board: &Board, player: Player, dice: &[u8]) -> Vec<Step> {
    board
        .legal_moves(dice, player)
        .into_iter()
        .map(|mv| {
            let mut next = *board;
            next.perform(mv, player);
            Step { mv, board: next }
        })
        .collect()
}

/// The largest number of dice `player` can legally spend from `dice`.
///
/// Depth-only search: no boards are collected and the search stops as soon
/// as a line spends every die.
pub fn max_dice_playable(board: &Board, player: Player, dice: &[u8]) -> usize {
    if dice.is_empty() {
        return 0;
    }
    let mut best = 0;
    for mv in board.legal_moves(dice, player) {
        let mut next = *board;
        next.perform(mv, player);
        let depth = 1 + max_dice_playable(&next, player, &without_one(dice, mv.die));
        if depth > best {
            best = depth;
            if best == dice.len() {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Layout, Origin, NUM_POINTS};

    fn play_of(board: &Board, player: Player, moves: &[Move]) -> Board {
        let mut next = *board;
        for &mv in moves {
            next.apply_move(mv, player).unwrap();
        }
        next
    }

    #[test]
    fn test_opening_three_one() {
        let board = Board::new(Layout::Standard);
        let plays = enumerate_plays(&board, Player::X, &[3, 1]);
        assert!(!plays.is_empty());
        assert!(plays.iter().all(|p| p.moves.len() == 2));

        let boards: Vec<Board> = plays.iter().map(|p| p.board).collect();
        let split = play_of(
            &board,
            Player::X,
            &[
                Move::new(Origin::Point(0), 3),
                Move::new(Origin::Point(0), 1),
            ],
        );
        let five_point = play_of(
            &board,
            Player::X,
            &[
                Move::new(Origin::Point(16), 3),
                Move::new(Origin::Point(18), 1),
            ],
        );
        assert!(boards.contains(&split));
        assert!(boards.contains(&five_point));
    }

    #[test]
    fn test_results_are_distinct() {
        let board = Board::new(Layout::Standard);
        let plays = enumerate_plays(&board, Player::X, &[6, 6, 6, 6]);
        let unique: HashSet<Board> = plays.iter().map(|p| p.board).collect();
        assert_eq!(unique.len(), plays.len());
        assert!(plays.iter().all(|p| p.moves.len() == 4));
    }

    #[test]
    fn test_both_orders_explored() {
        // A lone X piece on 0 with O holding X's point 4: the 4 can only be
        // played after the 1.
        let mut x = [0u8; NUM_POINTS];
        x[0] = 1;
        let mut o = [0u8; NUM_POINTS];
        o[19] = 2;
        o[10] = 13;
        let board = Board::from_parts([x, o], [0, 0], [14, 0], 15).unwrap();

        let plays = enumerate_plays(&board, Player::X, &[4, 1]);
        assert_eq!(plays.len(), 1);
        assert_eq!(
            plays[0].moves,
            vec![
                Move::new(Origin::Point(0), 1),
                Move::new(Origin::Point(1), 4)
            ]
        );
        assert_eq!(plays[0].board.point(Player::X, 5), 1);
    }

    #[test]
    fn test_shorter_sequences_discarded() {
        // Moving the piece on 10 with the 1 first strands the 2; every other
        // line uses both dice.
        let mut x = [0u8; NUM_POINTS];
        x[0] = 1;
        x[10] = 1;
        let mut o = [0u8; NUM_POINTS];
        o[21] = 2; // X's point 2
        o[20] = 2; // X's point 3
        o[10] = 2; // X's point 13
        o[5] = 9;
        let board = Board::from_parts([x, o], [0, 0], [13, 0], 15).unwrap();

        let plays = enumerate_plays(&board, Player::X, &[1, 2]);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].moves.len(), 2);
        assert_eq!(plays[0].board.point(Player::X, 1), 1);
        assert_eq!(plays[0].board.point(Player::X, 12), 1);
        assert_eq!(max_dice_playable(&board, Player::X, &[1, 2]), 2);
    }

    #[test]
    fn test_no_legal_moves_yields_nothing() {
        // X on the bar facing a closed O home board
        let mut x = [0u8; NUM_POINTS];
        x[10] = 14;
        let mut o = [0u8; NUM_POINTS];
        for p in 18..24 {
            o[p] = 2;
        }
        o[2] = 3;
        let board = Board::from_parts([x, o], [1, 0], [0, 0], 15).unwrap();

        assert!(enumerate_plays(&board, Player::X, &[6, 5]).is_empty());
        assert!(enumerate_steps(&board, Player::X, &[6, 5]).is_empty());
        assert_eq!(max_dice_playable(&board, Player::X, &[6, 5]), 0);
    }

    #[test]
    fn test_partial_use_when_only_one_die_fits() {
        // The only X piece needs exactly a 1 to bear off; the 6 overshoots
        let mut x = [0u8; NUM_POINTS];
        x[23] = 1;
        let mut o = [0u8; NUM_POINTS];
        o[3] = 15;
        let board = Board::from_parts([x, o], [0, 0], [14, 0], 15).unwrap();

        let plays = enumerate_plays(&board, Player::X, &[6, 1]);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].moves, vec![Move::new(Origin::Point(23), 1)]);
        assert!(plays[0].board.game_won(Player::X));
    }

    #[test]
    fn test_max_dice_playable_agrees_with_enumeration() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(17);
        let mut board = Board::new(Layout::Standard);
        let mut player = Player::X;
        for _ in 0..150 {
            let a = rng.random_range(1..=6);
            let b = rng.random_range(1..=6);
            let dice = if a == b { vec![a; 4] } else { vec![a, b] };
            let plays = enumerate_plays(&board, player, &dice);
            let depth = plays.first().map_or(0, |p| p.moves.len());
            assert_eq!(max_dice_playable(&board, player, &dice), depth);

            if let Some(play) = plays.get(rng.random_range(0..plays.len().max(1))) {
                board = play.board;
            }
            if board.game_won(player) {
                break;
            }
            player = player.other();
        }
    }

    #[test]
    fn test_enumeration_leaves_input_untouched() {
        let board = Board::new(Layout::Standard);
        let copy = board;
        let _ = enumerate_plays(&board, Player::O, &[5, 2]);
        assert_eq!(board, copy);
    }

    #[test]
    fn test_steps_match_legal_moves() {
        let board = Board::new(Layout::Standard);
        let steps = enumerate_steps(&board, Player::X, &[6, 2]);
        let moves = board.legal_moves(&[6, 2], Player::X);
        assert_eq!(steps.len(), moves.len());
        for step in &steps {
            assert_eq!(step.board, play_of(&board, Player::X, &[step.mv]));
        }
    }
}
