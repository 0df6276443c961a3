use super::encoding::Features;

/// A differentiable scalar evaluator of board features.
///
/// Parameters are exposed as flat blocks in a fixed order; gradients and
/// deltas use the same order and block lengths. Passing a feature slice of
/// the wrong length is a contract violation and panics.
pub trait ValueFunction {
    /// Expected feature vector length
    fn num_features(&self) -> usize;

    /// Estimated win probability for the perspective player.
    fn evaluate(&self, features: &[f32]) -> f32;

    /// Score several candidates at once.
    fn evaluate_batch(&self, batch: &[Features]) -> Vec<f32> {
        batch.iter().map(|f| self.evaluate(f)).collect()
    }

    /// Value plus its gradient with respect to every parameter block.
    fn value_and_gradient(&self, features: &[f32]) -> (f32, Vec<Vec<f32>>);

    /// Current parameter values, one block per parameter tensor.
    fn parameters(&self) -> Vec<Vec<f32>>;

    /// Add `delta` to every parameter, block by block.
    fn apply_delta(&mut self, delta: &[Vec<f32>]);
}

pub(crate) fn check_features(expected: usize, features: &[f32]) {
    assert_eq!(
        features.len(),
        expected,
        "feature vector has {} entries, value function expects {}",
        features.len(),
        expected
    );
}
