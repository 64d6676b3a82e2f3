use std::fmt;

use serde::{Deserialize, Serialize};

use crate::life::{Health, LifeState};
use crate::saving_throw::{SavingThrowCategory, SavingThrowTable};
use crate::Dice;

/// Class code marking the referee's own pseudo-combatant.
pub const DUNGEON_MASTER_CLASS: &str = "DM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterType {
    #[serde(rename = "PC")]
    PlayerCharacter,
    #[serde(rename = "NPC")]
    NonPlayerCharacter,
    #[default]
    #[serde(rename = "M")]
    Monster,
}

impl CharacterType {
    pub fn code(self) -> &'static str {
        match self {
            CharacterType::PlayerCharacter => "PC",
            CharacterType::NonPlayerCharacter => "NPC",
            CharacterType::Monster => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombatSide {
    Friend,
    Foe,
}

impl CombatSide {
    /// Single-letter prefix used in `typeabbrseq` keys (Ally / Opponent).
    pub fn code(self) -> char {
        match self {
            CombatSide::Friend => 'A',
            CombatSide::Foe => 'O',
        }
    }
}

impl fmt::Display for CombatSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatSide::Friend => f.write_str("FRIEND"),
            CombatSide::Foe => f.write_str("FOE"),
        }
    }
}

/// How a sheet expresses its hit dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitDiceFormula {
    #[serde(rename = "DF")]
    DieFixed,
    #[serde(rename = "DFPF")]
    DieFixedPointsFixed,
    #[serde(rename = "DFPV")]
    DieFixedPointsVariable,
    #[serde(rename = "DV")]
    DieVariable,
    #[default]
    #[serde(rename = "PF")]
    PointsFixed,
    #[serde(rename = "PV")]
    PointsVariable,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitDice {
    pub formula: HitDiceFormula,
    pub dice: i32,
    pub die: i32,
    pub dice_min: i32,
    pub dice_max: i32,
    pub die_modifier: i32,
    /// Flat value per die; 0 means roll instead.
    pub die_value: i32,
    pub point_start: i32,
    pub point_min: i32,
    pub point_max: i32,
}

impl HitDice {
    pub fn roll(&self, dice: &mut Dice) -> i32 {
        use HitDiceFormula::*;
        match self.formula {
            DieFixed => self.fixed_dice(dice),
            DieFixedPointsFixed => self.fixed_dice(dice) + self.point_start,
            DieFixedPointsVariable => self.fixed_dice(dice) + self.variable_points(dice),
            DieVariable => {
                let count = self.dice_min - 1 + dice.roll_die(self.dice_max - self.dice_min + 1, 0);
                self.roll_count(dice, count)
            }
            PointsFixed => self.point_start,
            PointsVariable => self.variable_points(dice),
        }
    }

    fn fixed_dice(&self, dice: &mut Dice) -> i32 {
        self.roll_count(dice, self.dice)
    }

    fn roll_count(&self, dice: &mut Dice, count: i32) -> i32 {
        if self.die_value == 0 {
            dice.roll_dice(count, self.die, self.die_modifier, 0)
        } else {
            count * self.die_value
        }
    }

    // uniform over [point_min + 1, point_max + 1]
    fn variable_points(&self, dice: &mut Dice) -> i32 {
        self.point_min + dice.roll_die(self.point_max - self.point_min + 1, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub base: i32,
    pub adjustment: i32,
    pub hit_point_multiplier: i32,
    pub add_hit_point: bool,
}

impl Experience {
    pub fn value_for(&self, hp: i32) -> i32 {
        let mut xp = self.base + self.adjustment + hp * self.hit_point_multiplier;
        if self.add_hit_point {
            xp += hp;
        }
        xp
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Regeneration {
    /// Rounds to wait before regenerating; 0 means every round.
    pub round_start: u32,
    pub hit_points: i32,
    /// Only count rounds while wounded.
    pub after_damage: bool,
}

/// Explicit saving-throw class/level, overriding the sheet's class list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingThrowProfile {
    pub class_type: String,
    pub level: i32,
    /// Level used for the paralyzation/poison/death-magic column; 0 = same as `level`.
    pub level_pdm: i32,
}

/// Static capability sheet shared by every instance of a roster abbreviation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantSheet {
    pub abbr: String,
    pub name: String,
    pub character_type: CharacterType,
    /// Comma-separated for multi-classed characters.
    pub class_type: String,
    pub race_type: String,
    /// Comma-separated, parallel to `class_type`.
    pub level: String,
    pub armor_class: i32,
    pub to_hit_target: i32,
    pub attacks_per_round: f32,
    pub damage_per_attack: String,
    pub special_attack: String,
    pub special_defense: String,
    pub notes: String,
    pub missile_attack: bool,
    pub hit_dice: HitDice,
    pub experience: Experience,
    pub regeneration: Regeneration,
    pub saving_throw: SavingThrowProfile,
}

/// One live roster entry as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    pub side: CombatSide,
    pub abbr: String,
    pub seq: u32,
    #[serde(default)]
    pub group: String,
    /// 0 means "not rolled yet".
    #[serde(default)]
    pub hp_max: i32,
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub attack_modifier: i32,
    #[serde(default)]
    pub defense_modifier: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub fn combatant_key(side: CombatSide, abbr: &str, seq: u32) -> String {
    format!("{}{}{}", side.code(), abbr, seq)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub abbr: String,
    pub seq: u32,
    pub side: CombatSide,
    pub group: String,
    pub attack_modifier: i32,
    pub defense_modifier: i32,
    pub sheet: ParticipantSheet,
    pub health: Health,
    pub initiative: i32,
    pub inactive_reason: String,
    /// Last opponent picked, offered again on the next attack.
    pub defender_key: Option<String>,
    pub regeneration_counter: u32,
    pub experience_value: i32,
    /// Hit points were rolled at construction rather than loaded.
    pub rolled: bool,
    key: String,
}

impl Combatant {
    /// Builds a combatant, rolling hit points unless the row already carries them.
    pub fn new(row: &RosterRow, sheet: &ParticipantSheet, dice: &mut Dice) -> Self {
        let (health, rolled) = if row.hp_max != 0 {
            (Health { hp: row.hp, max_hp: row.hp_max }, false)
        } else {
            (Health::new(sheet.hit_dice.roll(dice)), true)
        };
        let experience_value = sheet.experience.value_for(health.max_hp);
        Self {
            abbr: row.abbr.clone(),
            seq: row.seq,
            side: row.side,
            group: row.group.replace(';', ","),
            attack_modifier: row.attack_modifier,
            defense_modifier: row.defense_modifier,
            sheet: sheet.clone(),
            health,
            initiative: 0,
            inactive_reason: String::new(),
            defender_key: None,
            regeneration_counter: 0,
            experience_value,
            rolled,
            key: combatant_key(row.side, &row.abbr, row.seq),
        }
    }

    /// `typeabbrseq`: side code + abbreviation + sequence.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn hp(&self) -> i32 {
        self.health.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.health.max_hp
    }

    pub fn character_type(&self) -> CharacterType {
        self.sheet.character_type
    }

    pub fn life_state(&self) -> LifeState {
        LifeState::classify(self.sheet.character_type, self.health.hp)
    }

    pub fn can_attack(&self) -> bool {
        self.health.hp > 0
    }

    pub fn is_dead(&self) -> bool {
        self.life_state() == LifeState::Dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn is_unconscious(&self) -> bool {
        self.life_state() == LifeState::Unconscious
    }

    pub fn is_inactive(&self) -> bool {
        self.initiative < crate::encounter::INITIATIVE_ACTIVE_MINIMUM
    }

    pub fn is_active(&self) -> bool {
        !self.is_inactive() && self.can_attack()
    }

    pub fn is_player_character(&self) -> bool {
        self.sheet.character_type == CharacterType::PlayerCharacter
    }

    pub fn is_monster(&self) -> bool {
        self.sheet.character_type == CharacterType::Monster
    }

    pub fn is_dungeon_master(&self) -> bool {
        self.class_types().any(|c| c.eq_ignore_ascii_case(DUNGEON_MASTER_CLASS))
    }

    pub fn class_types(&self) -> impl Iterator<Item = &str> {
        self.sheet.class_type.split(',').map(str::trim).filter(|c| !c.is_empty())
    }

    /// Levels parallel to the class list; blank or unparsable entries read as 0.
    pub fn levels(&self) -> Vec<i32> {
        if self.sheet.level.trim().is_empty() {
            return vec![0];
        }
        self.sheet
            .level
            .split(',')
            .map(|l| l.trim().parse().unwrap_or(0))
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.group.split(',').map(str::trim).filter(|g| !g.is_empty())
    }

    /// Lower armor class is better: modifiers move the target number, not the roll.
    pub fn was_hit_successful(
        &self,
        attack_roll: i32,
        defender_armor_class: i32,
        defender_defense_modifier: i32,
    ) -> bool {
        attack_roll >= self.to_hit_threshold(defender_armor_class, defender_defense_modifier)
    }

    pub fn to_hit_threshold(
        &self,
        defender_armor_class: i32,
        defender_defense_modifier: i32,
    ) -> i32 {
        self.sheet.to_hit_target - defender_armor_class + defender_defense_modifier
            - self.attack_modifier
    }

    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health.take_damage(amount)
    }

    pub fn regenerate_hit_points(&mut self) {
        self.health.regenerate(self.sheet.regeneration.hit_points);
    }

    /// Roll needed to save against `category`, best across all of this
    /// combatant's classes. `None` when the table has no row for them.
    pub fn saving_throw_needed(
        &self,
        table: &SavingThrowTable,
        category: SavingThrowCategory,
    ) -> Option<i32> {
        let profile = &self.sheet.saving_throw;
        if !profile.class_type.trim().is_empty() {
            let level = if category == SavingThrowCategory::ParalyzationPoisonDeathMagic
                && profile.level_pdm > 0
            {
                profile.level_pdm
            } else {
                profile.level
            };
            return table.lookup(profile.class_type.trim(), level, category);
        }
        let levels = self.levels();
        self.class_types()
            .enumerate()
            .filter_map(|(i, class)| {
                let level = levels.get(i).copied().unwrap_or(0);
                table.lookup(class, level, category)
            })
            .min()
    }

    pub fn format_special_attacks(&self) -> String {
        labelled("Special Attack", &self.sheet.special_attack)
    }

    pub fn format_special_defense(&self) -> String {
        labelled("Special Defense", &self.sheet.special_defense)
    }

    pub fn format_notes(&self) -> String {
        labelled("Notes", &self.sheet.notes)
    }

    pub fn format_damage_per_attack(&self) -> String {
        labelled("Damage/Attack", &self.sheet.damage_per_attack)
    }

    pub fn status(&self) -> String {
        match self.life_state() {
            LifeState::Dead => "DEAD".to_string(),
            LifeState::Unconscious => "UNCONSCIOUS".to_string(),
            LifeState::Conscious if self.is_inactive() => {
                if self.inactive_reason.is_empty() {
                    "INACTIVE".to_string()
                } else {
                    format!("INACTIVE ({})", self.inactive_reason)
                }
            }
            LifeState::Conscious => "ACTIVE".to_string(),
        }
    }
}

fn labelled(label: &str, text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("    * {}: {}", label, text.trim())
    }
}
