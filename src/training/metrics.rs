use std::collections::VecDeque;

use crate::game::Player;
use crate::training::episode::EpisodeResult;

/// Episode counters with rolling window computations.
pub struct EpisodeStats {
    recent: VecDeque<EpisodeResult>,
    capacity: usize,
    games_played: usize, // lifetime count, never capped
    wins: [usize; 2],
    aborted: usize,
}

impl EpisodeStats {
    pub fn with_capacity(capacity: usize) -> Self {
        EpisodeStats {
            recent: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            games_played: 0,
            wins: [0; 2],
            aborted: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn record(&mut self, result: EpisodeResult) {
        self.games_played += 1;
        match result.winner {
            Some(player) => self.wins[player.index()] += 1,
            None => self.aborted += 1,
        }
        self.recent.push_back(result);
        if self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    pub fn games_played(&self) -> usize {
        self.games_played
    }

    /// Lifetime wins for `player`.
    pub fn wins(&self, player: Player) -> usize {
        self.wins[player.index()]
    }

    /// Games abandoned at the turn limit.
    pub fn aborted(&self) -> usize {
        self.aborted
    }

    /// Share of the last N games won by `player`.
    pub fn win_ratio(&self, player: Player, last_n: usize) -> f32 {
        let n = self.recent.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .recent
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner == Some(player))
            .count();
        wins as f32 / n as f32
    }

    /// Turns taken by the most recent game.
    pub fn last_length(&self) -> Option<usize> {
        self.recent.back().map(|r| r.turns)
    }

    /// Average game length in turns over the last N games.
    pub fn average_length(&self, last_n: usize) -> f32 {
        let n = self.recent.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.recent.iter().rev().take(n).map(|r| r.turns).sum();
        total as f32 / n as f32
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(winner: Option<Player>, turns: usize) -> EpisodeResult {
        EpisodeResult {
            winner,
            turns,
            moves: turns * 2,
        }
    }

    #[test]
    fn test_empty_stats() {
        let stats = EpisodeStats::new();
        assert_eq!(stats.games_played(), 0);
        assert_eq!(stats.win_ratio(Player::X, 10), 0.0);
        assert_eq!(stats.average_length(10), 0.0);
        assert_eq!(stats.last_length(), None);
    }

    #[test]
    fn test_counters() {
        let mut stats = EpisodeStats::new();
        stats.record(result(Some(Player::X), 30));
        stats.record(result(Some(Player::O), 40));
        stats.record(result(Some(Player::X), 50));
        stats.record(result(None, 100));

        assert_eq!(stats.games_played(), 4);
        assert_eq!(stats.wins(Player::X), 2);
        assert_eq!(stats.wins(Player::O), 1);
        assert_eq!(stats.aborted(), 1);
        assert_eq!(stats.last_length(), Some(100));
    }

    #[test]
    fn test_rolling_window() {
        let mut stats = EpisodeStats::new();
        stats.record(result(Some(Player::O), 10));
        stats.record(result(Some(Player::O), 10));
        stats.record(result(Some(Player::X), 20));
        stats.record(result(Some(Player::X), 40));

        assert!((stats.win_ratio(Player::X, 2) - 1.0).abs() < 1e-6);
        assert!((stats.win_ratio(Player::X, 4) - 0.5).abs() < 1e-6);
        assert!((stats.win_ratio(Player::O, 100) - 0.5).abs() < 1e-6);
        assert!((stats.average_length(2) - 30.0).abs() < 1e-6);
        assert!((stats.average_length(4) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_caps_window_not_lifetime() {
        let mut stats = EpisodeStats::with_capacity(2);
        for _ in 0..5 {
            stats.record(result(Some(Player::X), 10));
        }
        stats.record(result(Some(Player::O), 10));
        assert_eq!(stats.games_played(), 6);
        assert_eq!(stats.wins(Player::X), 5);
        assert!((stats.win_ratio(Player::X, 10) - 0.5).abs() < 1e-6);
    }
}
