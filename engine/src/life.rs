use serde::{Deserialize, Serialize};

use crate::combatant::CharacterType;

/// Hit points at or below this kill a non-monster outright.
pub const DEATH_THRESHOLD: i32 = -10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Conscious,
    Unconscious,
    Dead,
}

impl LifeState {
    /// Monsters die at 0; everyone else is unconscious down to -9 and dead at -10.
    pub fn classify(character_type: CharacterType, hp: i32) -> Self {
        match character_type {
            CharacterType::Monster if hp <= 0 => LifeState::Dead,
            CharacterType::Monster => LifeState::Conscious,
            _ if hp <= DEATH_THRESHOLD => LifeState::Dead,
            _ if hp <= 0 => LifeState::Unconscious,
            _ => LifeState::Conscious,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Subtract and clamp to `[0, max_hp]`. Negative amounts heal. Returns the
    /// hit points held before the change.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0, self.max_hp.max(0));
        before
    }

    /// Add `amount`, never above `max_hp`.
    pub fn regenerate(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monster_dies_at_zero() {
        assert_eq!(LifeState::classify(CharacterType::Monster, 0), LifeState::Dead);
        assert_eq!(LifeState::classify(CharacterType::Monster, 1), LifeState::Conscious);
    }

    #[test]
    fn characters_linger_until_minus_ten() {
        use CharacterType::*;
        for ct in [PlayerCharacter, NonPlayerCharacter] {
            assert_eq!(LifeState::classify(ct, 0), LifeState::Unconscious);
            assert_eq!(LifeState::classify(ct, -9), LifeState::Unconscious);
            assert_eq!(LifeState::classify(ct, -10), LifeState::Dead);
        }
    }

    #[test]
    fn damage_floors_at_zero_and_healing_caps_at_max() {
        let mut h = Health::new(10);
        assert_eq!(h.take_damage(25), 10);
        assert_eq!(h.hp, 0);
        h.take_damage(-30);
        assert_eq!(h.hp, 10);
    }

    #[test]
    fn regeneration_stops_at_max() {
        let mut h = Health { hp: 7, max_hp: 9 };
        h.regenerate(5);
        assert_eq!(h.hp, 9);
        assert!(!h.is_wounded());
    }
}
