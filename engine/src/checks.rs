use crate::combatant::Combatant;

pub const TO_HIT_DIE: i32 = 20;
pub const TO_HIT_DIE_MINIMUM: i32 = 1;
pub const CRITICAL_HIT: i32 = TO_HIT_DIE;
pub const CRITICAL_FUMBLE: i32 = 1;

/// Result of comparing a to-hit roll against an attacker/defender pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToHit {
    Critical,
    Hit,
    Miss,
    Fumble,
}

impl ToHit {
    pub fn is_hit(self) -> bool {
        matches!(self, ToHit::Critical | ToHit::Hit)
    }

    pub fn label(self) -> &'static str {
        match self {
            ToHit::Critical => "*Critical Hit*",
            ToHit::Hit => "hit",
            ToHit::Miss => "missed",
            ToHit::Fumble => "missed (fumble?)",
        }
    }
}

/// Natural 20 always hits, natural 1 always misses; otherwise compare
/// against the attacker's threshold for this defender.
pub fn resolve_to_hit(roll: i32, attacker: &Combatant, defender: &Combatant) -> ToHit {
    if roll == CRITICAL_HIT {
        ToHit::Critical
    } else if roll == CRITICAL_FUMBLE {
        ToHit::Fumble
    } else if attacker.was_hit_successful(
        roll,
        defender.sheet.armor_class,
        defender.defense_modifier,
    ) {
        ToHit::Hit
    } else {
        ToHit::Miss
    }
}

/// What a successful save does to incoming special-attack damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEffect {
    Negates,
    Halves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NotAllowed,
    Failed { roll: i32, needed: i32 },
    Made { roll: i32, needed: i32, effect: SaveEffect },
}

impl SaveOutcome {
    pub fn resolve(roll: i32, needed: i32, effect: SaveEffect) -> Self {
        if roll >= needed {
            SaveOutcome::Made { roll, needed, effect }
        } else {
            SaveOutcome::Failed { roll, needed }
        }
    }

    pub fn damage_factor(self) -> f64 {
        match self {
            SaveOutcome::Made { effect: SaveEffect::Negates, .. } => 0.0,
            SaveOutcome::Made { effect: SaveEffect::Halves, .. } => 0.5,
            _ => 1.0,
        }
    }

    /// Scale and truncate toward zero.
    pub fn apply(self, amount: i32) -> i32 {
        (amount as f64 * self.damage_factor()) as i32
    }
}

/// Experience earned for dealing `damage` to a defender at `hp` of `max_hp`,
/// capped at the hit points the defender actually had left.
pub fn calculate_earned_xp(max_hp: i32, hp: i32, damage: i32, total_xp: i32) -> i32 {
    if max_hp <= 0 {
        return 0;
    }
    let value = damage.min(hp);
    (value as f64 / max_hp as f64 * total_xp as f64) as i32
}
