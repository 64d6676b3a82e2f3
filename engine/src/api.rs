use anyhow::{Context, Result};

use crate::config::MeleeConfig;
use crate::encounter::Encounter;
use crate::store::JsonStore;
use crate::Dice;

pub type Session = Encounter<JsonStore>;

pub fn dice_for(config: &MeleeConfig) -> Dice {
    match config.seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    }
}

/// Opens the data dir's tables and builds the first encounter from them.
pub fn open_session(config: &MeleeConfig) -> Result<Session> {
    let paths = config.store_paths();
    let store = JsonStore::open(paths.clone())
        .with_context(|| format!("failed to open combat store in {}", config.data_dir.display()))?;
    let encounter = Encounter::new(store, dice_for(config))
        .with_context(|| format!("failed to load roster from {}", paths.roster.display()))?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        seeded = config.seed.is_some(),
        saving_throw_rows = encounter.saving_throws().len(),
        "session opened"
    );
    Ok(encounter)
}
