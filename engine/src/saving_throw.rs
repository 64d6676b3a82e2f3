use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingThrowCategory {
    ParalyzationPoisonDeathMagic,
    PetrificationPolymorph,
    RodStaffWand,
    BreathWeapon,
    Spell,
}

impl SavingThrowCategory {
    pub const ALL: [SavingThrowCategory; 5] = [
        SavingThrowCategory::ParalyzationPoisonDeathMagic,
        SavingThrowCategory::PetrificationPolymorph,
        SavingThrowCategory::RodStaffWand,
        SavingThrowCategory::BreathWeapon,
        SavingThrowCategory::Spell,
    ];
}

impl fmt::Display for SavingThrowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SavingThrowCategory::ParalyzationPoisonDeathMagic => {
                "Paralyzation, Poison or Death Magic"
            }
            SavingThrowCategory::PetrificationPolymorph => "Petrification or Polymorph",
            SavingThrowCategory::RodStaffWand => "Rod, Staff or Wand",
            SavingThrowCategory::BreathWeapon => "Breath Weapon",
            SavingThrowCategory::Spell => "Spell",
        };
        f.write_str(label)
    }
}

/// Thresholds for one class at one level breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrowRow {
    pub class_type: String,
    pub level: i32,
    pub paralyzation_poison_death_magic: i32,
    pub petrification_polymorph: i32,
    pub rod_staff_wand: i32,
    pub breath_weapon: i32,
    pub spell: i32,
}

impl SavingThrowRow {
    pub fn threshold(&self, category: SavingThrowCategory) -> i32 {
        match category {
            SavingThrowCategory::ParalyzationPoisonDeathMagic => {
                self.paralyzation_poison_death_magic
            }
            SavingThrowCategory::PetrificationPolymorph => self.petrification_polymorph,
            SavingThrowCategory::RodStaffWand => self.rod_staff_wand,
            SavingThrowCategory::BreathWeapon => self.breath_weapon,
            SavingThrowCategory::Spell => self.spell,
        }
    }
}

/// Rows grouped per class code (upper-cased), each group sorted by level.
#[derive(Debug, Clone, Default)]
pub struct SavingThrowTable {
    by_class: IndexMap<String, Vec<SavingThrowRow>>,
}

impl SavingThrowTable {
    pub fn new(rows: Vec<SavingThrowRow>) -> Self {
        let mut by_class: IndexMap<String, Vec<SavingThrowRow>> = IndexMap::new();
        for row in rows {
            by_class.entry(row.class_type.trim().to_uppercase()).or_default().push(row);
        }
        for rows in by_class.values_mut() {
            rows.sort_by_key(|r| r.level);
        }
        Self { by_class }
    }

    pub fn len(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Greatest breakpoint not above `level`; the first row if `level` is below all of them.
    pub fn lookup(
        &self,
        class_type: &str,
        level: i32,
        category: SavingThrowCategory,
    ) -> Option<i32> {
        let rows = self.by_class.get(&class_type.trim().to_uppercase())?;
        rows.iter()
            .rev()
            .find(|r| r.level <= level)
            .or_else(|| rows.first())
            .map(|r| r.threshold(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(class: &str, level: i32, base: i32) -> SavingThrowRow {
        SavingThrowRow {
            class_type: class.into(),
            level,
            paralyzation_poison_death_magic: base,
            petrification_polymorph: base + 1,
            rod_staff_wand: base + 2,
            breath_weapon: base + 3,
            spell: base + 4,
        }
    }

    #[test]
    fn picks_breakpoint_at_or_below_level() {
        let table = SavingThrowTable::new(vec![row("F", 5, 11), row("F", 1, 14), row("F", 3, 13)]);
        assert_eq!(
            table.lookup("F", 4, SavingThrowCategory::ParalyzationPoisonDeathMagic),
            Some(13)
        );
        assert_eq!(table.lookup("f", 9, SavingThrowCategory::Spell), Some(15));
        assert_eq!(table.lookup("F", 0, SavingThrowCategory::BreathWeapon), Some(17));
    }

    #[test]
    fn unknown_class_has_no_threshold() {
        let table = SavingThrowTable::new(vec![row("F", 1, 14)]);
        assert_eq!(table.lookup("MU", 3, SavingThrowCategory::Spell), None);
        assert_eq!(table.len(), 1);
    }
}
