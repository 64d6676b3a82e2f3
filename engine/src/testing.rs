//! Headless collaborators for driving encounters without a terminal or disk.
//!
//! - `ScriptedPrompt` answers questions from a queue and records everything
//!   announced to it
//! - `MemoryStore` keeps every table and the audit log in memory
//! - `sheet` / `row` build minimal roster fixtures

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::combatant::{
    CharacterType, CombatSide, HitDice, HitDiceFormula, ParticipantSheet, RosterRow,
};
use crate::prompt::{ExitToMenu, Prompt, Reply};
use crate::saving_throw::SavingThrowRow;
use crate::store::{CombatStore, LogRow, StoreError};

/// A scripted operator answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Press enter: the question's default, or empty text.
    Enter,
    Number(i32),
    Text(String),
    Exit,
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Answer>,
    pub questions: Vec<String>,
    pub transcript: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers: answers.into(), ..Default::default() }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn announced(&self, needle: &str) -> bool {
        self.transcript.iter().any(|m| m.contains(needle))
    }

    fn next(&mut self, question: &str) -> Option<Answer> {
        self.questions.push(question.to_string());
        self.answers.pop_front()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_yes_no(&mut self, question: &str, default_yes: bool) -> Reply<bool> {
        match self.next(question) {
            Some(Answer::Yes) => Ok(true),
            Some(Answer::No) => Ok(false),
            Some(Answer::Enter) => Ok(default_yes),
            Some(Answer::Exit) | None => Err(ExitToMenu),
            Some(other) => panic!("expected yes/no for {question:?}, script had {other:?}"),
        }
    }

    fn ask_number(&mut self, question: &str, min: i32, max: i32) -> Reply<i32> {
        loop {
            match self.next(question) {
                Some(Answer::Number(n)) if (min..=max).contains(&n) => return Ok(n),
                Some(Answer::Number(n)) => {
                    self.announce(&format!("Value must be between {min} and {max}. Entered {n}."));
                }
                Some(Answer::Exit) | None => return Err(ExitToMenu),
                Some(other) => panic!("expected a number for {question:?}, script had {other:?}"),
            }
        }
    }

    fn ask_text(&mut self, question: &str) -> Reply<String> {
        match self.next(question) {
            Some(Answer::Text(s)) => Ok(s.trim().to_uppercase()),
            Some(Answer::Enter) => Ok(String::new()),
            Some(Answer::Exit) | None => Err(ExitToMenu),
            Some(other) => panic!("expected text for {question:?}, script had {other:?}"),
        }
    }

    fn announce(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub roster: Vec<RosterRow>,
    pub sheets: Vec<ParticipantSheet>,
    pub saving_throws: Vec<SavingThrowRow>,
    pub log: Vec<LogRow>,
}

impl MemoryStore {
    pub fn new(
        roster: Vec<RosterRow>,
        sheets: Vec<ParticipantSheet>,
        saving_throws: Vec<SavingThrowRow>,
    ) -> Self {
        Self { roster, sheets, saving_throws, log: Vec::new() }
    }

    pub fn roster_row(&self, side: CombatSide, abbr: &str, seq: u32) -> Option<&RosterRow> {
        self.roster.iter().find(|r| r.side == side && r.abbr == abbr && r.seq == seq)
    }
}

impl CombatStore for MemoryStore {
    fn load_roster_rows(&mut self) -> Result<Vec<RosterRow>, StoreError> {
        Ok(self.roster.iter().filter(|r| r.is_active).cloned().collect())
    }

    fn load_participant_sheets(
        &mut self,
    ) -> Result<IndexMap<String, ParticipantSheet>, StoreError> {
        Ok(self.sheets.iter().map(|s| (s.abbr.clone(), s.clone())).collect())
    }

    fn load_saving_throw_rows(&mut self) -> Result<Vec<SavingThrowRow>, StoreError> {
        Ok(self.saving_throws.clone())
    }

    fn update_hit_points(
        &mut self,
        side: CombatSide,
        abbr: &str,
        seq: u32,
        max_hp: i32,
        hp: i32,
    ) -> Result<(), StoreError> {
        let found =
            self.roster.iter_mut().find(|r| r.side == side && r.abbr == abbr && r.seq == seq);
        if let Some(row) = found {
            row.hp_max = max_hp;
            row.hp = hp;
        }
        Ok(())
    }

    fn delete_defeated_foes(&mut self) -> Result<usize, StoreError> {
        let before = self.roster.len();
        self.roster.retain(|r| !(r.side == CombatSide::Foe && r.hp <= 0));
        Ok(before - self.roster.len())
    }

    fn append_log(&mut self, row: &LogRow) -> Result<(), StoreError> {
        self.log.push(row.clone());
        Ok(())
    }
}

/// A sheet with fixed hit points.
pub fn sheet(
    abbr: &str,
    character_type: CharacterType,
    armor_class: i32,
    to_hit_target: i32,
    hp: i32,
) -> ParticipantSheet {
    ParticipantSheet {
        abbr: abbr.to_string(),
        name: abbr.to_string(),
        character_type,
        armor_class,
        to_hit_target,
        attacks_per_round: 1.0,
        hit_dice: HitDice {
            formula: HitDiceFormula::PointsFixed,
            point_start: hp,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// An active roster row whose hit points will be rolled from the sheet.
pub fn row(side: CombatSide, abbr: &str, seq: u32) -> RosterRow {
    RosterRow {
        side,
        abbr: abbr.to_string(),
        seq,
        group: match side {
            CombatSide::Friend => "A0".to_string(),
            CombatSide::Foe => "O0".to_string(),
        },
        hp_max: 0,
        hp: 0,
        attack_modifier: 0,
        defense_modifier: 0,
        is_active: true,
    }
}
