//! Persistence collaborator.
//!
//! The encounter engine only ever talks to a [`CombatStore`]: it loads the
//! roster, participant sheets and saving throw table once, writes hit points
//! back after every change, deletes defeated foes at the end of a round and
//! appends to the audit log. The log is append-only; nothing here edits or
//! removes a written row.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combatant::{CombatSide, Combatant, ParticipantSheet, RosterRow};
use crate::saving_throw::SavingThrowRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not valid UTF-8", .path.display())]
    Encoding { path: PathBuf },
}

/// Who took part in a logged action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogParty {
    pub side: CombatSide,
    pub abbr: String,
    pub seq: u32,
    pub group: String,
    pub initiative: i32,
}

impl From<&Combatant> for LogParty {
    fn from(c: &Combatant) -> Self {
        Self {
            side: c.side,
            abbr: c.abbr.clone(),
            seq: c.seq,
            group: c.group.clone(),
            initiative: c.initiative,
        }
    }
}

/// One audit row. `defender` is absent for rows that concern only the
/// acting combatant (initiative changes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub encounter: u32,
    pub round: u32,
    pub attacker: LogParty,
    pub attack_number: u32,
    pub defender: Option<LogParty>,
    pub defender_hp_max: i32,
    pub defender_hp: i32,
    pub damage: i32,
    pub xp_total: i32,
    pub xp_earned: i32,
    pub note: String,
}

pub trait CombatStore {
    /// Active roster rows only.
    fn load_roster_rows(&mut self) -> Result<Vec<RosterRow>, StoreError>;
    fn load_participant_sheets(&mut self) -> Result<IndexMap<String, ParticipantSheet>, StoreError>;
    fn load_saving_throw_rows(&mut self) -> Result<Vec<SavingThrowRow>, StoreError>;
    fn update_hit_points(
        &mut self,
        side: CombatSide,
        abbr: &str,
        seq: u32,
        max_hp: i32,
        hp: i32,
    ) -> Result<(), StoreError>;
    /// Removes foes at or below 0 hit points; returns how many went.
    fn delete_defeated_foes(&mut self) -> Result<usize, StoreError>;
    fn append_log(&mut self, row: &LogRow) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct StorePaths {
    pub roster: PathBuf,
    pub participants: PathBuf,
    pub saving_throws: PathBuf,
    pub log: PathBuf,
}

/// Tables kept as JSON arrays on disk, with the log as JSON Lines.
pub struct JsonStore {
    paths: StorePaths,
    log: BufWriter<File>,
}

impl JsonStore {
    /// Opens the log for appending; the handle lives as long as the store.
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        if let Some(dir) = paths.log.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.log)
            .map_err(|source| StoreError::Io { path: paths.log.clone(), source })?;
        tracing::info!(log = %paths.log.display(), "opened combat log");
        Ok(Self { paths, log: BufWriter::new(file) })
    }

    fn all_roster_rows(&self) -> Result<Vec<RosterRow>, StoreError> {
        read_json(&self.paths.roster)
    }

    fn save_roster_rows(&self, rows: &[RosterRow]) -> Result<(), StoreError> {
        write_json(&self.paths.roster, rows)
    }
}

impl CombatStore for JsonStore {
    fn load_roster_rows(&mut self) -> Result<Vec<RosterRow>, StoreError> {
        let mut rows = self.all_roster_rows()?;
        rows.retain(|r| r.is_active);
        Ok(rows)
    }

    fn load_participant_sheets(
        &mut self,
    ) -> Result<IndexMap<String, ParticipantSheet>, StoreError> {
        let sheets: Vec<ParticipantSheet> = read_json(&self.paths.participants)?;
        Ok(sheets.into_iter().map(|s| (s.abbr.clone(), s)).collect())
    }

    fn load_saving_throw_rows(&mut self) -> Result<Vec<SavingThrowRow>, StoreError> {
        read_json(&self.paths.saving_throws)
    }

    fn update_hit_points(
        &mut self,
        side: CombatSide,
        abbr: &str,
        seq: u32,
        max_hp: i32,
        hp: i32,
    ) -> Result<(), StoreError> {
        let mut rows = self.all_roster_rows()?;
        match rows.iter_mut().find(|r| r.side == side && r.abbr == abbr && r.seq == seq) {
            Some(row) => {
                row.hp_max = max_hp;
                row.hp = hp;
            }
            None => {
                tracing::warn!(%side, abbr, seq, "hit point update matched no roster row");
                return Ok(());
            }
        }
        self.save_roster_rows(&rows)
    }

    fn delete_defeated_foes(&mut self) -> Result<usize, StoreError> {
        let mut rows = self.all_roster_rows()?;
        let before = rows.len();
        rows.retain(|r| !(r.side == CombatSide::Foe && r.hp <= 0));
        let removed = before - rows.len();
        if removed > 0 {
            self.save_roster_rows(&rows)?;
        }
        Ok(removed)
    }

    fn append_log(&mut self, row: &LogRow) -> Result<(), StoreError> {
        let path = &self.paths.log;
        serde_json::to_writer(&mut self.log, row)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        self.log
            .write_all(b"\n")
            .and_then(|_| self.log.flush())
            .map_err(|source| StoreError::Io { path: path.clone(), source })
    }
}

/// Decode text honouring a UTF-8/UTF-16 byte-order mark.
pub fn read_text_auto(path: &Path) -> Result<String, StoreError> {
    let bytes =
        fs::read(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (text, _, had_errors) = enc.decode(&bytes[bom_len..]);
        if had_errors {
            return Err(StoreError::Encoding { path: path.to_path_buf() });
        }
        Ok(text.into_owned())
    } else {
        String::from_utf8(bytes).map_err(|_| StoreError::Encoding { path: path.to_path_buf() })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = read_text_auto(path)?;
    serde_json::from_str(&text)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, text).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}
