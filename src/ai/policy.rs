use rand::Rng;

/// How a learner picks among scored candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Greedy,
    #[default]
    EpsilonGreedy,
}

/// Index of the highest value, ties broken uniformly at random.
///
/// Panics on an empty slice.
pub fn greedy_index<R: Rng + ?Sized>(values: &[f32], rng: &mut R) -> usize {
    assert!(!values.is_empty(), "cannot select from zero candidates");
    let best = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let ties: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == best)
        .map(|(i, _)| i)
        .collect();
    match ties.len() {
        // All NaN: fall back to the first candidate
        0 => 0,
        1 => ties[0],
        n => ties[rng.random_range(0..n)],
    }
}

/// With probability `epsilon` a uniformly random index, otherwise greedy.
pub fn epsilon_greedy_index<R: Rng + ?Sized>(values: &[f32], epsilon: f64, rng: &mut R) -> usize {
    assert!(!values.is_empty(), "cannot select from zero candidates");
    if rng.random_bool(epsilon.clamp(0.0, 1.0)) {
        return rng.random_range(0..values.len());
    }
    greedy_index(values, rng)
}

impl Policy {
    pub fn select<R: Rng + ?Sized>(&self, values: &[f32], epsilon: f64, rng: &mut R) -> usize {
        match self {
            Policy::Greedy => greedy_index(values, rng),
            Policy::EpsilonGreedy => epsilon_greedy_index(values, epsilon, rng),
        }
    }
}
