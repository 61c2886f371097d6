//! Room-scoped dice.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[u8; 2]", try_from = "[u8; 2]")]
pub struct DiceRoll {
    first: u8,
    second: u8,
}

impl DiceRoll {
    pub fn new(first: u8, second: u8) -> Result<Self, DomainError> {
        if !(1..=6).contains(&first) || !(1..=6).contains(&second) {
            return Err(DomainError::validation(
                ValidationKind::Malformed,
                format!("dice values must be 1..=6, got {first} and {second}"),
            ));
        }
        Ok(Self { first, second })
    }

    pub fn values(&self) -> [u8; 2] {
        [self.first, self.second]
    }

    pub fn total(&self) -> u8 {
        self.first + self.second
    }

    pub fn is_doubles(&self) -> bool {
        self.first == self.second
    }
}

impl From<DiceRoll> for [u8; 2] {
    fn from(roll: DiceRoll) -> Self {
        roll.values()
    }
}

impl TryFrom<[u8; 2]> for DiceRoll {
    type Error = DomainError;

    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        DiceRoll::new(value[0], value[1])
    }
}

/// Source of dice rolls for one room.
///
/// `Scripted` plays back fixed rolls first and then continues from its seeded
/// generator, which is how tests stage exact landings.
#[derive(Debug, Clone, PartialEq)]
pub enum Dice {
    Seeded(ChaCha8Rng),
    Scripted {
        queue: VecDeque<DiceRoll>,
        fallback: ChaCha8Rng,
    },
}

impl Dice {
    pub fn seeded(seed: u64) -> Self {
        Dice::Seeded(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn scripted(rolls: impl IntoIterator<Item = DiceRoll>, seed: u64) -> Self {
        Dice::Scripted {
            queue: rolls.into_iter().collect(),
            fallback: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn roll(&mut self) -> DiceRoll {
        match self {
            Dice::Seeded(rng) => roll_with(rng),
            Dice::Scripted { queue, fallback } => match queue.pop_front() {
                Some(roll) => roll,
                None => roll_with(fallback),
            },
        }
    }

    /// Queue fixed rolls ahead of whatever comes next.
    pub fn push_scripted(&mut self, rolls: impl IntoIterator<Item = DiceRoll>) {
        match self {
            Dice::Scripted { queue, .. } => queue.extend(rolls),
            Dice::Seeded(rng) => {
                let fallback = rng.clone();
                *self = Dice::Scripted {
                    queue: rolls.into_iter().collect(),
                    fallback,
                };
            }
        }
    }
}

fn roll_with(rng: &mut ChaCha8Rng) -> DiceRoll {
    DiceRoll {
        first: rng.random_range(1..=6),
        second: rng.random_range(1..=6),
    }
}
