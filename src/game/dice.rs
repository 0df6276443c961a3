use rand::Rng;

use crate::error::MoveError;

/// The dice values available for one turn. Doubles expand to four copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    values: Vec<u8>,
}

impl DiceRoll {
    /// Build a roll from two die faces.
    pub fn new(first: u8, second: u8) -> Result<Self, MoveError> {
        for die in [first, second] {
            if !(1..=6).contains(&die) {
                return Err(MoveError::InvalidDie(die));
            }
        }
        Ok(Self::expand(first, second))
    }

    /// Roll two independent fair dice.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let first = rng.random_range(1..=6);
        let second = rng.random_range(1..=6);
        Self::expand(first, second)
    }

    fn expand(first: u8, second: u8) -> Self {
        let values = if first == second {
            vec![first; 4]
        } else {
            vec![first, second]
        };
        DiceRoll { values }
    }

    /// Values not yet spent this turn
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn is_double(&self) -> bool {
        self.values.len() == 4
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Spend one copy of `die`. Returns false if it was not available.
    pub fn consume(&mut self, die: u8) -> bool {
        match self.values.iter().position(|&d| d == die) {
            Some(i) => {
                self.values.remove(i);
                true
            }
            None => false,
        }
    }
}
