use rand::Rng;

use crate::ai::{Agent, TrainableAgent, Transition};
use crate::error::TrainingError;
use crate::game::{
    enumerate_plays, enumerate_steps, max_dice_playable, Board, DiceRoll, GameState, Layout,
    Player, Step,
};

/// How much of a roll an agent commits to per decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// One move at a time, scored by the board right after that move.
    #[default]
    PerDie,
    /// The whole roll at once, scored by the board after every die is spent.
    FullRoll,
}

/// Rules of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeConfig {
    pub layout: Layout,
    pub selection: SelectionMode,
    /// Turns after which the game is abandoned with no winner.
    pub max_turns: usize,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        EpisodeConfig {
            layout: Layout::Standard,
            selection: SelectionMode::PerDie,
            max_turns: 2_000,
        }
    }
}

/// Who plays which side.
pub enum Seating<'a> {
    /// One agent plays both sides and sees every transition.
    SelfPlay(&'a mut dyn Agent),
    Versus {
        x: &'a mut dyn Agent,
        o: &'a mut dyn Agent,
    },
}

impl<'a> Seating<'a> {
    fn agent(&mut self, player: Player) -> &mut (dyn Agent + 'a) {
        match self {
            Seating::SelfPlay(agent) => &mut **agent,
            Seating::Versus { x, o } => match player {
                Player::X => &mut **x,
                Player::O => &mut **o,
            },
        }
    }

    fn end_episode(&mut self) {
        match self {
            Seating::SelfPlay(agent) => agent.end_episode(),
            Seating::Versus { x, o } => {
                x.end_episode();
                o.end_episode();
            }
        }
    }
}

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    /// `None` when the game hit the turn limit.
    pub winner: Option<Player>,
    pub turns: usize,
    /// Individual piece moves made by both players.
    pub moves: usize,
}

impl EpisodeResult {
    pub fn aborted(&self) -> bool {
        self.winner.is_none()
    }
}

/// Play one game from the opening position.
///
/// The first player is drawn at random. After every turn in which the mover
/// made at least one move, the mover's agent observes the turn's start and
/// end boards with reward 1 if the turn won the game and 0 otherwise.
/// `end_episode` is called on every seated agent when the game finishes.
pub fn play_episode<R: Rng + ?Sized>(
    seating: &mut Seating<'_>,
    config: &EpisodeConfig,
    training: bool,
    rng: &mut R,
) -> Result<EpisodeResult, TrainingError> {
    let mut state = GameState::random_start(config.layout, rng);
    let mut moves = 0;

    while !state.is_terminal() {
        if state.turns() >= config.max_turns {
            log::warn!(
                "abandoning game after {} turns without a winner",
                state.turns()
            );
            seating.end_episode();
            return Ok(EpisodeResult {
                winner: None,
                turns: state.turns(),
                moves,
            });
        }

        let player = state.current_player();
        let before = *state.board();
        let dice = DiceRoll::roll(rng);
        log::debug!("turn {}: {player} rolls {:?}", state.turns(), dice.values());

        let agent = seating.agent(player);
        let played = match config.selection {
            SelectionMode::PerDie => play_per_die(&mut state, dice, &mut *agent, training)?,
            SelectionMode::FullRoll => play_full_roll(&mut state, &dice, &mut *agent, training)?,
        };
        moves += played;

        if played > 0 {
            let won = state.is_terminal();
            agent.observe(&Transition {
                before,
                after: *state.board(),
                player,
                reward: if won { 1.0 } else { 0.0 },
                episode_end: won,
            });
        } else {
            log::debug!("{player} has no legal move");
        }

        if !state.is_terminal() {
            state.pass_turn();
        }
    }

    seating.end_episode();
    let winner = state.winner();
    log::debug!("{winner:?} wins after {} turns", state.turns() + 1);
    Ok(EpisodeResult {
        winner,
        turns: state.turns() + 1,
        moves,
    })
}

/// Moves `player` may make next with `dice` without giving up on using the
/// largest playable number of dice.
pub fn playable_steps(board: &Board, player: Player, dice: &DiceRoll) -> Vec<Step> {
    let target = max_dice_playable(board, player, dice.values());
    if target == 0 {
        return Vec::new();
    }
    enumerate_steps(board, player, dice.values())
        .into_iter()
        .filter(|step| {
            let mut rest = dice.clone();
            rest.consume(step.mv.die);
            1 + max_dice_playable(&step.board, player, rest.values()) == target
        })
        .collect()
}

fn play_per_die(
    state: &mut GameState,
    mut dice: DiceRoll,
    agent: &mut dyn Agent,
    training: bool,
) -> Result<usize, TrainingError> {
    let player = state.current_player();
    let mut played = 0;

    while !dice.is_empty() && !state.is_terminal() {
        let steps = playable_steps(state.board(), player, &dice);
        if steps.is_empty() {
            break;
        }
        let candidates: Vec<Board> = steps.iter().map(|s| s.board).collect();
        let index = agent.choose(&candidates, player, training);
        let step = steps.get(index).ok_or(TrainingError::InvalidChoice {
            index,
            candidates: steps.len(),
        })?;

        if state.apply_move(step.mv)? {
            log::debug!("{player} hits with {}", step.mv);
        }
        dice.consume(step.mv.die);
        played += 1;
    }
    Ok(played)
}

fn play_full_roll(
    state: &mut GameState,
    dice: &DiceRoll,
    agent: &mut dyn Agent,
    training: bool,
) -> Result<usize, TrainingError> {
    let player = state.current_player();
    let plays = enumerate_plays(state.board(), player, dice.values());
    if plays.is_empty() {
        return Ok(0);
    }

    let candidates: Vec<Board> = plays.iter().map(|p| p.board).collect();
    let index = agent.choose(&candidates, player, training);
    let play = plays.get(index).ok_or(TrainingError::InvalidChoice {
        index,
        candidates: plays.len(),
    })?;

    state.enact(play, dice)?;
    Ok(play.moves.len())
}

/// Win ratio of `agent` over `games` games against `opponent`, alternating
/// seats. Learning is switched off for the duration and restored afterwards,
/// even when a game fails. Abandoned games count as non-wins.
pub fn evaluate<A: TrainableAgent, R: Rng + ?Sized>(
    agent: &mut A,
    opponent: &mut dyn Agent,
    games: usize,
    config: &EpisodeConfig,
    rng: &mut R,
) -> Result<f32, TrainingError> {
    if games == 0 {
        return Ok(0.0);
    }

    let was_learning = agent.learning_enabled();
    agent.set_learning_enabled(false);

    let mut wins = 0;
    let mut outcome = Ok(());
    for game in 0..games {
        let agent_side = if game % 2 == 0 { Player::X } else { Player::O };
        let mut seating = match agent_side {
            Player::X => Seating::Versus {
                x: &mut *agent,
                o: &mut *opponent,
            },
            Player::O => Seating::Versus {
                x: &mut *opponent,
                o: &mut *agent,
            },
        };
        match play_episode(&mut seating, config, false, rng) {
            Ok(result) if result.winner == Some(agent_side) => wins += 1,
            Ok(_) => {}
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    agent.set_learning_enabled(was_learning);
    outcome?;
    log::debug!("evaluation: {wins}/{games} wins");
    Ok(wins as f32 / games as f32)
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-1a style mixing
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
