use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::{Agent, TrainableAgent, Transition};
use super::encoding::{encode, FeatureLayout, Features, NUM_FEATURES};
use super::network::{NeuralValue, ValueNetworkConfig};
use super::policy::{greedy_index, Policy};
use super::value::ValueFunction;
use crate::checkpoint::{CheckpointMetadata, CheckpointMetrics, TdHyperparameters, TdTrainingState};
use crate::error::CheckpointError;
use crate::game::{Board, Player};

pub const ALGORITHM_NAME: &str = "TD-lambda";

/// TD(λ) hyperparameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TdConfig {
    /// Step size α.
    pub learning_rate: f32,
    /// Trace decay λ.
    pub trace_decay: f32,
    /// Exploration rate ε for the epsilon-greedy policy.
    pub epsilon: f64,
    pub hidden_units: usize,
    pub policy: Policy,
    pub feature_layout: FeatureLayout,
    /// Seeds weight initialisation and move selection. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for TdConfig {
    fn default() -> Self {
        TdConfig {
            learning_rate: 0.1,
            trace_decay: 0.7,
            epsilon: 0.01,
            hidden_units: 40,
            policy: Policy::EpsilonGreedy,
            feature_layout: FeatureLayout::Tesauro,
            seed: None,
        }
    }
}

/// Value-function learner with accumulating eligibility traces.
///
/// Each update moves every parameter by `α · δ · e`, where the TD error
/// `δ = r + V(s') - V(s)` and the trace `e ← λ·e + ∇V(s')`. Traces are
/// allocated on the first update and zeroed at every episode end.
pub struct TdAgent<V = NeuralValue> {
    value: V,
    traces: Option<Vec<Vec<f32>>>,
    config: TdConfig,
    learning_enabled: bool,
    rng: StdRng,
    step_count: usize,
    episode_count: usize,
}

impl TdAgent<NeuralValue> {
    pub fn new(config: TdConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let network = ValueNetworkConfig {
            num_features: NUM_FEATURES,
            hidden_units: config.hidden_units,
        };
        let value = NeuralValue::new(network, &mut rng);
        Self::from_parts(value, config, rng)
    }
}

impl<V: ValueFunction> TdAgent<V> {
    /// Wrap an existing value function.
    pub fn with_value(value: V, config: TdConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::from_parts(value, config, rng)
    }

    fn from_parts(value: V, config: TdConfig, rng: StdRng) -> Self {
        TdAgent {
            value,
            traces: None,
            config,
            learning_enabled: true,
            rng,
            step_count: 0,
            episode_count: 0,
        }
    }

    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Forward pass on a feature vector.
    pub fn assess(&self, features: &[f32]) -> f32 {
        self.value.evaluate(features)
    }

    /// Features of `board` from `player`'s perspective.
    pub fn features(&self, board: &Board, player: Player) -> Features {
        encode(board, player, self.config.feature_layout)
    }

    /// Score candidate boards from `player`'s perspective in one batch.
    pub fn assess_boards(&self, boards: &[Board], player: Player) -> Vec<f32> {
        let batch: Vec<Features> = boards.iter().map(|b| self.features(b, player)).collect();
        self.value.evaluate_batch(&batch)
    }

    /// Pick an index into `values`: the configured policy when exploring,
    /// greedy otherwise.
    pub fn select(&mut self, values: &[f32], explore: bool) -> usize {
        if explore {
            self.config
                .policy
                .select(values, self.config.epsilon, &mut self.rng)
        } else {
            greedy_index(values, &mut self.rng)
        }
    }

    /// One TD(λ) step from `prev` to `next`. Returns the TD error, or `None`
    /// when learning is disabled.
    pub fn update(
        &mut self,
        prev: &[f32],
        next: &[f32],
        reward: f32,
        episode_end: bool,
    ) -> Option<f32> {
        if !self.learning_enabled {
            return None;
        }

        let (value_next, gradient) = self.value.value_and_gradient(next);
        let value_prev = self.value.evaluate(prev);
        let td_error = reward + value_next - value_prev;

        let traces = self
            .traces
            .get_or_insert_with(|| gradient.iter().map(|g| vec![0.0; g.len()]).collect());

        let lambda = self.config.trace_decay;
        let scale = self.config.learning_rate * td_error;
        let mut delta = Vec::with_capacity(traces.len());
        for (trace, grad) in traces.iter_mut().zip(&gradient) {
            for (e, g) in trace.iter_mut().zip(grad) {
                *e = lambda * *e + g;
            }
            delta.push(trace.iter().map(|e| scale * e).collect());
        }
        self.value.apply_delta(&delta);
        self.step_count += 1;

        if episode_end {
            self.reset_traces();
        }
        Some(td_error)
    }

    /// Zero every trace in place.
    pub fn reset_traces(&mut self) {
        if let Some(traces) = &mut self.traces {
            for trace in traces.iter_mut() {
                trace.fill(0.0);
            }
        }
    }

    /// Eligibility traces, once the first update has allocated them.
    pub fn traces(&self) -> Option<&[Vec<f32>]> {
        self.traces.as_deref()
    }

    pub fn learning_enabled(&self) -> bool {
        self.learning_enabled
    }

    pub fn set_learning_enabled(&mut self, enabled: bool) {
        self.learning_enabled = enabled;
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn hyperparameters(&self) -> TdHyperparameters {
        TdHyperparameters {
            learning_rate: self.config.learning_rate,
            trace_decay: self.config.trace_decay,
            epsilon: self.config.epsilon,
            hidden_units: self.config.hidden_units,
            policy: self.config.policy,
            feature_layout: self.config.feature_layout,
        }
    }

    /// Export current training state for checkpointing.
    pub fn training_state(&self) -> TdTrainingState {
        TdTrainingState {
            step_count: self.step_count,
            episode_count: self.episode_count,
            hyperparameters: self.hyperparameters(),
        }
    }

    /// Restore counters and hyperparameters from a checkpoint. The network
    /// shape is fixed at construction, so `hidden_units` is kept as is.
    pub fn restore_training_state(&mut self, state: &TdTrainingState) {
        self.step_count = state.step_count;
        self.episode_count = state.episode_count;
        let hp = &state.hyperparameters;
        self.config.learning_rate = hp.learning_rate;
        self.config.trace_decay = hp.trace_decay;
        self.config.epsilon = hp.epsilon;
        self.config.policy = hp.policy;
        self.config.feature_layout = hp.feature_layout;
        self.traces = None;
    }
}

impl<V: ValueFunction> Agent for TdAgent<V> {
    fn name(&self) -> &str {
        ALGORITHM_NAME
    }

    fn choose(&mut self, candidates: &[Board], player: Player, training: bool) -> usize {
        let values = self.assess_boards(candidates, player);
        let index = self.select(&values, training);
        log::debug!(
            "{player} picks candidate {index} of {} (value {:.4})",
            candidates.len(),
            values[index]
        );
        index
    }

    fn observe(&mut self, transition: &Transition) {
        let prev = self.features(&transition.before, transition.player);
        let next = self.features(&transition.after, transition.player);
        self.update(&prev, &next, transition.reward, transition.episode_end);
    }

    fn end_episode(&mut self) {
        self.reset_traces();
        if self.learning_enabled {
            self.episode_count += 1;
        }
    }
}

impl TrainableAgent for TdAgent<NeuralValue> {
    fn algorithm_name(&self) -> &str {
        ALGORITHM_NAME
    }

    fn episode_count(&self) -> usize {
        self.episode_count
    }

    fn step_count(&self) -> usize {
        self.step_count
    }

    fn learning_enabled(&self) -> bool {
        self.learning_enabled
    }

    fn set_learning_enabled(&mut self, enabled: bool) {
        self.learning_enabled = enabled;
    }

    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), CheckpointError> {
        self.value.save_to_dir(dir)
    }

    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError> {
        self.value.load_from_dir(dir)?;
        self.traces = None;
        Ok(())
    }

    fn training_state_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string_pretty(&self.training_state())?)
    }

    fn restore_training_state_json(&mut self, json: &str) -> Result<(), CheckpointError> {
        let state: TdTrainingState = serde_json::from_str(json)?;
        self.restore_training_state(&state);
        Ok(())
    }

    fn build_checkpoint_metadata(
        &self,
        metrics: &CheckpointMetrics,
        episode: usize,
        timestamp: u64,
    ) -> CheckpointMetadata {
        CheckpointMetadata {
            episode,
            timestamp,
            algorithm: ALGORITHM_NAME.to_string(),
            metrics: metrics.clone(),
            hyperparameters: self.hyperparameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::value::linear::LinearValue;
    use crate::game::Layout;

    fn linear_agent(alpha: f32, lambda: f32) -> TdAgent<LinearValue> {
        TdAgent::with_value(
            LinearValue::zeros(3),
            TdConfig {
                learning_rate: alpha,
                trace_decay: lambda,
                seed: Some(7),
                ..Default::default()
            },
        )
    }

    fn neural_agent() -> TdAgent {
        TdAgent::new(TdConfig {
            hidden_units: 8,
            seed: Some(3),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = TdConfig::default();
        assert!((config.learning_rate - 0.1).abs() < 1e-6);
        assert!((config.trace_decay - 0.7).abs() < 1e-6);
        assert!((config.epsilon - 0.01).abs() < 1e-9);
        assert_eq!(config.hidden_units, 40);
        assert_eq!(config.policy, Policy::EpsilonGreedy);
    }

    #[test]
    fn test_traces_allocated_lazily() {
        let mut agent = linear_agent(0.5, 0.5);
        assert!(agent.traces().is_none());
        agent.update(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 0.0, false);
        let traces = agent.traces().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].len(), 3);
        assert_eq!(traces[1].len(), 1);
    }

    #[test]
    fn test_td_arithmetic() {
        // All parameters start at zero.
        let mut agent = linear_agent(0.5, 0.5);

        // Step 1: V = 0 everywhere, reward 1 => td = 1.
        // trace = grad(next) = ([1, 0, 0], [1]); params += 0.5 * 1 * trace.
        let td = agent
            .update(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0], 1.0, false)
            .unwrap();
        assert!((td - 1.0).abs() < 1e-6);
        assert_eq!(agent.value().weights, vec![0.5, 0.0, 0.0]);
        assert!((agent.value().bias - 0.5).abs() < 1e-6);

        // Step 2: V(next=[0,0,1]) = 0.5, V(prev=[1,0,0]) = 1.0 => td = -0.5.
        // trace = 0.5 * ([1,0,0],[1]) + ([0,0,1],[1]) = ([0.5,0,1],[1.5]).
        // params += 0.5 * -0.5 * trace = -0.25 * trace.
        let td = agent
            .update(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0], 0.0, false)
            .unwrap();
        assert!((td + 0.5).abs() < 1e-6);
        let traces = agent.traces().unwrap();
        assert_eq!(traces[0], vec![0.5, 0.0, 1.0]);
        assert_eq!(traces[1], vec![1.5]);
        let w = &agent.value().weights;
        assert!((w[0] - 0.375).abs() < 1e-6);
        assert!(w[1].abs() < 1e-6);
        assert!((w[2] + 0.25).abs() < 1e-6);
        assert!((agent.value().bias - 0.125).abs() < 1e-6);
        assert_eq!(agent.step_count(), 2);
    }

    #[test]
    fn test_episode_end_zeroes_traces() {
        let mut agent = linear_agent(0.1, 0.7);
        agent.update(&[0.0, 1.0, 0.0], &[1.0, 1.0, 0.0], 0.0, false);
        agent.update(&[1.0, 1.0, 0.0], &[1.0, 1.0, 1.0], 1.0, true);
        let traces = agent.traces().unwrap();
        assert!(traces.iter().flatten().all(|&e| e == 0.0));
    }

    #[test]
    fn test_learning_disabled_is_noop() {
        let mut agent = linear_agent(0.5, 0.5);
        agent.set_learning_enabled(false);
        assert_eq!(agent.update(&[0.0; 3], &[1.0; 3], 1.0, true), None);
        assert_eq!(agent.value().weights, vec![0.0; 3]);
        assert!(agent.traces().is_none());
        assert_eq!(agent.step_count(), 0);
    }

    #[test]
    fn test_terminal_update_on_fresh_network() {
        let mut agent = neural_agent();
        let board = Board::new(Layout::Standard);
        let prev = agent.features(&board, Player::X);
        let next = agent.features(&board, Player::O);
        let before = agent.value().parameters();

        agent.update(&prev, &next, 1.0, true).unwrap();

        let traces = agent.traces().unwrap();
        assert!(traces.iter().flatten().all(|&e| e == 0.0));
        let after = agent.value().parameters();
        let moved: f32 = before
            .iter()
            .flatten()
            .zip(after.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(moved > 0.0, "parameters did not change");
    }

    #[test]
    fn test_choose_returns_valid_index() {
        let mut agent = neural_agent();
        let board = Board::new(Layout::Standard);
        let candidates: Vec<Board> = crate::game::enumerate_plays(&board, Player::X, &[6, 5])
            .into_iter()
            .map(|p| p.board)
            .collect();
        for training in [true, false] {
            let index = agent.choose(&candidates, Player::X, training);
            assert!(index < candidates.len());
        }
    }

    #[test]
    fn test_greedy_choice_matches_best_value() {
        let mut agent = neural_agent();
        let board = Board::new(Layout::Standard);
        let candidates: Vec<Board> = crate::game::enumerate_plays(&board, Player::O, &[4, 2])
            .into_iter()
            .map(|p| p.board)
            .collect();
        let values = agent.assess_boards(&candidates, Player::O);
        let index = agent.choose(&candidates, Player::O, false);
        let best = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(values[index], best);
    }

    #[test]
    fn test_observe_encodes_from_mover_perspective() {
        let mut agent = TdAgent::with_value(
            LinearValue::zeros(NUM_FEATURES),
            TdConfig {
                seed: Some(1),
                ..Default::default()
            },
        );
        let before = Board::new(Layout::Standard);
        let mut after = before;
        after
            .apply_move(crate::game::Move::new(crate::game::Origin::Point(0), 1), Player::X)
            .unwrap();
        agent.observe(&Transition {
            before,
            after,
            player: Player::X,
            reward: 1.0,
            episode_end: false,
        });
        // Gradient of a linear function is the input: X now has a blot on 0 and 1
        let traces = agent.traces().unwrap();
        assert_eq!(traces[0][0], 1.0);
        assert_eq!(traces[0][4], 1.0);
        assert_eq!(traces[0][1], 0.0);
    }

    #[test]
    fn test_end_episode_counts_only_while_learning() {
        let mut agent = linear_agent(0.1, 0.7);
        agent.end_episode();
        agent.set_learning_enabled(false);
        agent.end_episode();
        assert_eq!(agent.episode_count(), 1);
    }

    #[test]
    fn test_training_state_roundtrip() {
        let mut agent = neural_agent();
        agent.update(&[0.0; NUM_FEATURES], &[0.5; NUM_FEATURES], 0.0, false);
        let json = agent.training_state_json().unwrap();

        let mut restored = TdAgent::new(TdConfig {
            hidden_units: 8,
            learning_rate: 0.3,
            ..Default::default()
        });
        restored.restore_training_state_json(&json).unwrap();
        assert_eq!(restored.step_count(), 1);
        assert!((restored.config().learning_rate - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_weights_roundtrip_through_dir() {
        let dir = tempfile::tempdir().unwrap();
        let agent = neural_agent();
        agent.save_weights_to_dir(dir.path()).unwrap();

        let mut other = TdAgent::new(TdConfig {
            hidden_units: 8,
            seed: Some(99),
            ..Default::default()
        });
        other.load_weights_from_dir(dir.path()).unwrap();
        assert_eq!(other.value().parameters(), agent.value().parameters());
    }
}
