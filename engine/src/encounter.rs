use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use thiserror::Error;

use crate::combatant::{combatant_key, CombatSide, Combatant};
use crate::saving_throw::SavingThrowTable;
use crate::store::{CombatStore, LogParty, LogRow, StoreError};
use crate::Dice;

pub const INITIATIVE_DIE_MAJOR: i32 = 6;
pub const INITIATIVE_DIE_MINOR: i32 = 999;
pub const INITIATIVE_INACTIVE_MINIMUM: i32 = 0;
pub const INITIATIVE_INACTIVE_MAXIMUM: i32 = 999;
pub const INITIATIVE_ACTIVE_MINIMUM: i32 = 1000;
/// Highest value the non-player roll can produce (6 * 1000 + 999).
pub const INITIATIVE_ACTIVE_MAXIMUM: i32 = 6999;
/// Cursor value once no attacker is left this round.
pub const INITIATIVE_NONE: i32 = -1;
pub const INITIATIVE_MINIMUM: i32 = INITIATIVE_INACTIVE_MINIMUM;
pub const INITIATIVE_MAXIMUM: i32 = INITIATIVE_ACTIVE_MAXIMUM;

#[derive(Debug, Error)]
pub enum EncounterError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("combatant {0} appears more than once in the roster")]
    DuplicateCombatant(String),

    #[error("roster entry {key} has no participant sheet for {abbr}")]
    MissingSheet { key: String, abbr: String },
}

/// One combat scenario: the live roster, the round counters and the
/// initiative cursor. Owns the persistence connection for its lifetime.
pub struct Encounter<S> {
    store: S,
    dice: Dice,
    combatants: Vec<Combatant>,
    saving_throws: SavingThrowTable,
    pub encounter_number: u32,
    pub round_number: u32,
    pub initiative_cursor: i32,
    pub is_missile_phase: bool,
    pub friend_count: usize,
    pub foe_count: usize,
    pub attack_number: u32,
}

impl<S: CombatStore> Encounter<S> {
    pub fn new(store: S, dice: Dice) -> Result<Self, EncounterError> {
        let mut encounter = Self {
            store,
            dice,
            combatants: Vec::new(),
            saving_throws: SavingThrowTable::default(),
            encounter_number: 1,
            round_number: 1,
            initiative_cursor: INITIATIVE_ACTIVE_MAXIMUM,
            is_missile_phase: true,
            friend_count: 0,
            foe_count: 0,
            attack_number: 1,
        };
        encounter.load_saving_throws()?;
        encounter.load_combatants()?;
        Ok(encounter)
    }

    pub fn load_saving_throws(&mut self) -> Result<usize, EncounterError> {
        self.saving_throws = SavingThrowTable::new(self.store.load_saving_throw_rows()?);
        Ok(self.saving_throws.len())
    }

    /// (Re)builds the roster from the store. Combatants already on the roster
    /// keep their initiative, inactive reason, remembered defender and
    /// regeneration counter; rows that vanished are dropped.
    pub fn load_combatants(&mut self) -> Result<usize, EncounterError> {
        let rows = self.store.load_roster_rows()?;
        let sheets = self.store.load_participant_sheets()?;
        let previous: HashMap<String, Combatant> =
            self.combatants.iter().map(|c| (c.key().to_string(), c.clone())).collect();

        let mut seen = HashSet::new();
        let mut fresh = Vec::with_capacity(rows.len());
        for row in &rows {
            let key = combatant_key(row.side, &row.abbr, row.seq);
            if !seen.insert(key.clone()) {
                return Err(EncounterError::DuplicateCombatant(key));
            }
            let sheet = sheets
                .get(&row.abbr)
                .ok_or_else(|| EncounterError::MissingSheet {
                    key: key.clone(),
                    abbr: row.abbr.clone(),
                })?;
            let mut combatant = Combatant::new(row, sheet, &mut self.dice);
            if let Some(prev) = previous.get(&key) {
                combatant.initiative = prev.initiative;
                combatant.inactive_reason = prev.inactive_reason.clone();
                combatant.defender_key = prev.defender_key.clone();
                combatant.regeneration_counter = prev.regeneration_counter;
            }
            fresh.push(combatant);
        }

        for c in fresh.iter_mut().filter(|c| c.rolled) {
            self.store.update_hit_points(c.side, &c.abbr, c.seq, c.max_hp(), c.hp())?;
            c.rolled = false;
        }

        self.combatants = fresh;
        self.sort_by_initiative();
        self.count_available_combatants();
        tracing::info!(
            combatants = self.combatants.len(),
            friends = self.friend_count,
            foes = self.foe_count,
            "roster loaded"
        );
        Ok(self.combatants.len())
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatants_mut(&mut self) -> &mut [Combatant] {
        &mut self.combatants
    }

    pub fn combatant(&self, idx: usize) -> &Combatant {
        &self.combatants[idx]
    }

    pub fn combatant_mut(&mut self, idx: usize) -> &mut Combatant {
        &mut self.combatants[idx]
    }

    pub fn find_combatant(&self, key: &str) -> Option<usize> {
        self.combatants.iter().position(|c| c.key().eq_ignore_ascii_case(key))
    }

    pub fn is_combatant(&self, key: &str) -> bool {
        self.find_combatant(key).is_some()
    }

    pub fn saving_throws(&self) -> &SavingThrowTable {
        &self.saving_throws
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.dice
    }

    /// Major die picks the tier, minor die breaks ties inside it.
    pub fn roll_nonplayer_initiative(&mut self) -> i32 {
        self.dice.roll_die(INITIATIVE_DIE_MAJOR, 0) * 1000
            + self.dice.roll_die(INITIATIVE_DIE_MINOR, 0)
    }

    /// Stable: equal initiatives keep roster order.
    pub fn sort_by_initiative(&mut self) {
        self.combatants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
    }

    /// Bumps later duplicates upward until every initiative is unique. Earlier
    /// entries in sorted order keep their value. A duplicate that would pass
    /// the active ceiling steps down to the nearest free value instead, so the
    /// round's starting cursor still reaches it. Returns whether anything moved.
    pub fn check_duplicate_initiative(&mut self) -> bool {
        self.sort_by_initiative();
        let mut taken = HashSet::new();
        let mut adjusted = false;
        for c in &mut self.combatants {
            if taken.contains(&c.initiative) {
                c.initiative = free_initiative(&taken, c.initiative);
                adjusted = true;
            }
            taken.insert(c.initiative);
        }
        if adjusted {
            self.sort_by_initiative();
        }
        adjusted
    }

    /// Friends count while able to act; foes count while merely alive.
    pub fn count_combatants(&self, side: CombatSide) -> usize {
        self.combatants
            .iter()
            .filter(|c| c.side == side)
            .filter(|c| match side {
                CombatSide::Friend => c.can_attack(),
                CombatSide::Foe => c.is_alive(),
            })
            .count()
    }

    pub fn count_available_combatants(&mut self) {
        self.friend_count = self.count_combatants(CombatSide::Friend);
        self.foe_count = self.count_combatants(CombatSide::Foe);
    }

    /// First combatant at or below the cursor that can act. Inactive ones are
    /// surfaced without moving the cursor; an active pick pins the cursor to
    /// its initiative.
    pub fn find_next_attacker(&mut self) -> Option<usize> {
        for (idx, c) in self.combatants.iter().enumerate() {
            if c.initiative > self.initiative_cursor || !c.can_attack() {
                continue;
            }
            if c.initiative < INITIATIVE_ACTIVE_MINIMUM {
                return Some(idx);
            }
            if self.is_missile_phase && !c.sheet.missile_attack {
                continue;
            }
            self.initiative_cursor = c.initiative;
            return Some(idx);
        }
        None
    }

    pub fn end_attacker_turn(&mut self) {
        self.initiative_cursor -= 1;
        self.attack_number = 1;
    }

    /// `reset` starts a fresh encounter's round count.
    pub fn prepare_next_round(&mut self, reset: bool) -> Result<(), StoreError> {
        if reset {
            self.round_number = 1;
        } else {
            self.round_number += 1;
        }
        self.initiative_cursor = INITIATIVE_ACTIVE_MAXIMUM;
        self.attack_number = 1;
        self.regenerate_combatants()?;
        tracing::info!(
            encounter = self.encounter_number,
            round = self.round_number,
            "round prepared"
        );
        Ok(())
    }

    pub fn prepare_next_encounter(&mut self) -> Result<(), StoreError> {
        self.encounter_number += 1;
        self.prepare_next_round(true)
    }

    pub fn regenerate_combatants(&mut self) -> Result<(), StoreError> {
        for idx in 0..self.combatants.len() {
            let c = &mut self.combatants[idx];
            let regen = &c.sheet.regeneration;
            if regen.hit_points == 0 {
                continue;
            }
            let wounded = c.health.is_wounded();
            if !regen.after_damage || wounded {
                c.regeneration_counter += 1;
            }
            if !wounded || c.regeneration_counter < regen.round_start {
                continue;
            }
            let amount = regen.hit_points;
            let after_damage = regen.after_damage;
            self.record_hit_point_change(idx, idx, -amount, 0, 0, "regeneration", |c| {
                c.regenerate_hit_points()
            })?;
            let c = &mut self.combatants[idx];
            if after_damage && !c.health.is_wounded() {
                c.regeneration_counter = 0;
            }
        }
        Ok(())
    }

    /// Applies `amount` damage to `target` on behalf of `actor`, bracketed by
    /// BEFORE/AFTER audit rows, then persists the target's hit points.
    pub fn apply_damage(
        &mut self,
        actor: usize,
        target: usize,
        amount: i32,
        xp_total: i32,
        xp_earned: i32,
        note: &str,
    ) -> Result<(), StoreError> {
        self.record_hit_point_change(actor, target, amount, xp_total, xp_earned, note, |c| {
            c.take_damage(amount);
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn record_hit_point_change(
        &mut self,
        actor: usize,
        target: usize,
        amount: i32,
        xp_total: i32,
        xp_earned: i32,
        note: &str,
        change: impl FnOnce(&mut Combatant),
    ) -> Result<(), StoreError> {
        let before = self.log_row(
            actor,
            Some(target),
            amount,
            xp_total,
            xp_earned,
            format!("{note} BEFORE"),
        );
        self.store.append_log(&before)?;
        let hp_before = self.combatants[target].hp();
        change(&mut self.combatants[target]);
        let after = self.log_row(actor, Some(target), 0, 0, 0, format!("{note} AFTER"));
        self.store.append_log(&after)?;
        let t = &self.combatants[target];
        tracing::debug!(
            combatant = t.key(),
            amount,
            hp_before,
            hp_after = t.hp(),
            note,
            "hit points changed"
        );
        self.store.update_hit_points(t.side, &t.abbr, t.seq, t.max_hp(), t.hp())
    }

    /// A miss leaves hit points alone, so it is a single row.
    pub fn log_miss(&mut self, actor: usize, target: usize, note: &str) -> Result<(), StoreError> {
        let xp_total = self.combatants[target].experience_value;
        let row = self.log_row(actor, Some(target), 0, xp_total, 0, note.to_string());
        self.store.append_log(&row)
    }

    /// Audit pair for an initiative change of `idx` from `previous`.
    pub fn log_initiative(&mut self, idx: usize, previous: i32) -> Result<(), StoreError> {
        let current = self.combatants[idx].initiative;
        self.combatants[idx].initiative = previous;
        let before = self.log_row(idx, None, 0, 0, 0, "initiative BEFORE".to_string());
        self.combatants[idx].initiative = current;
        let after = self.log_row(idx, None, 0, 0, 0, "initiative AFTER".to_string());
        self.store.append_log(&before)?;
        self.store.append_log(&after)?;
        tracing::debug!(
            combatant = self.combatants[idx].key(),
            previous,
            current,
            "initiative set"
        );
        Ok(())
    }

    fn log_row(
        &self,
        actor: usize,
        target: Option<usize>,
        damage: i32,
        xp_total: i32,
        xp_earned: i32,
        note: String,
    ) -> LogRow {
        let a = &self.combatants[actor];
        let subject = &self.combatants[target.unwrap_or(actor)];
        LogRow {
            encounter: self.encounter_number,
            round: self.round_number,
            attacker: LogParty::from(a),
            attack_number: self.attack_number,
            defender: target.map(|t| LogParty::from(&self.combatants[t])),
            defender_hp_max: subject.max_hp(),
            defender_hp: subject.hp(),
            damage,
            xp_total,
            xp_earned,
            note,
        }
    }

    /// After damage: a defender that is no longer alive is forgotten by its
    /// attacker, and a fallen foe leaves the cached count.
    pub fn note_defeat(&mut self, attacker: usize, defender: usize) -> bool {
        if self.combatants[defender].is_alive() {
            return false;
        }
        if self.combatants[defender].side == CombatSide::Foe {
            self.foe_count = self.foe_count.saturating_sub(1);
        }
        self.combatants[attacker].defender_key = None;
        tracing::info!(defender = self.combatants[defender].key(), "combatant defeated");
        true
    }

    /// End-of-round cleanup: foes at or below 0 hit points leave the roster
    /// and the store.
    pub fn delete_defeated_foes(&mut self) -> Result<usize, StoreError> {
        let before = self.combatants.len();
        self.combatants.retain(|c| !(c.side == CombatSide::Foe && c.hp() <= 0));
        let removed = before - self.combatants.len();
        let deleted = self.store.delete_defeated_foes()?;
        if removed > 0 || deleted > 0 {
            tracing::info!(removed, deleted, "defeated foes cleared");
        }
        self.count_available_combatants();
        Ok(removed)
    }

    pub fn attack_type_label(&self) -> &'static str {
        if self.is_missile_phase { "Missile" } else { "Melee" }
    }

    pub fn format_encounter(&self) -> String {
        format!(
            "Encounter: {} | Round: {} | Initiative: {} | {}",
            self.encounter_number,
            self.round_number,
            self.initiative_cursor,
            self.attack_type_label()
        )
    }

    pub fn format_combatants(&self) -> String {
        let mut out = format!(
            "{:<12} {:<6} {:<4} {:>5} {:>9} {:>4} {:<8} {}",
            "Combatant", "Side", "Type", "Init", "HP", "AC", "Group", "Status"
        );
        for c in &self.combatants {
            let _ = write!(
                out,
                "\n{:<12} {:<6} {:<4} {:>5} {:>9} {:>4} {:<8} {}",
                c.key(),
                c.side.to_string(),
                c.character_type().code(),
                c.initiative,
                format!("{}/{}", c.hp(), c.max_hp()),
                c.sheet.armor_class,
                c.group,
                c.status()
            );
        }
        out
    }

    /// Special attacks, defenses and notes of friendly non-monsters.
    pub fn format_combatant_information(&self) -> String {
        let mut out = String::from("Combatant Information:");
        let friends = self.combatants.iter().filter(|c| c.side == CombatSide::Friend);
        for c in friends.filter(|c| !c.is_monster()) {
            let lines: Vec<String> =
                [c.format_special_attacks(), c.format_special_defense(), c.format_notes()]
                    .into_iter()
                    .filter(|l| !l.is_empty())
                    .collect();
            if lines.is_empty() {
                continue;
            }
            let _ = write!(out, "\n  {}:", c.key());
            for line in lines {
                let _ = write!(out, "\n{line}");
            }
        }
        out
    }
}

fn free_initiative(taken: &HashSet<i32>, initiative: i32) -> i32 {
    let upward = (initiative..=INITIATIVE_MAXIMUM).find(|v| !taken.contains(v));
    upward
        .or_else(|| (INITIATIVE_MINIMUM..initiative).rev().find(|v| !taken.contains(v)))
        .unwrap_or(initiative)
}
