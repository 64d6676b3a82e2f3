use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod checks;
pub mod combatant;
pub mod config;
pub mod content;
pub mod encounter;
pub mod life;
pub mod prompt;
pub mod saving_throw;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod turn;

pub use combatant::{
    CharacterType, CombatSide, Combatant, HitDice, HitDiceFormula, ParticipantSheet, RosterRow,
};
pub use encounter::Encounter;
pub use life::{Health, LifeState};
pub use prompt::{ExitToMenu, Prompt, Reply};
pub use saving_throw::{SavingThrowCategory, SavingThrowRow, SavingThrowTable};
pub use store::{CombatStore, JsonStore, LogParty, LogRow, StoreError};

/// Pseudo-random die roller. Seeded for reproducible sessions, or scripted so
/// tests can dictate exact faces.
pub struct Dice {
    rng: ChaCha8Rng,
    scripted: VecDeque<i32>,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), scripted: VecDeque::new() }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy(), scripted: VecDeque::new() }
    }

    /// Faces are handed out in order before falling back to a fixed-seed stream.
    pub fn from_scripted(faces: Vec<i32>) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(0), scripted: faces.into() }
    }

    fn face(&mut self, sides: i32) -> i32 {
        match self.scripted.pop_front() {
            Some(face) => face,
            None => self.rng.gen_range(1..=sides.max(1)),
        }
    }

    /// One die: uniform in `[1 + modifier, sides + modifier]`.
    pub fn roll_die(&mut self, sides: i32, modifier: i32) -> i32 {
        self.face(sides) + modifier
    }

    /// `count` dice of `sides`, each shifted by `die_modifier`, plus
    /// `roll_modifier` once on the total.
    pub fn roll_dice(
        &mut self,
        count: i32,
        sides: i32,
        die_modifier: i32,
        roll_modifier: i32,
    ) -> i32 {
        let mut total = 0;
        for _ in 0..count {
            total += self.roll_die(sides, die_modifier);
        }
        total + roll_modifier
    }

    pub fn d20(&mut self) -> i32 {
        self.roll_die(20, 0)
    }
}
