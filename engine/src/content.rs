use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::MeleeConfig;

pub const BUILTIN_ROSTER: &str = include_str!("../content/roster.json");
pub const BUILTIN_PARTICIPANTS: &str = include_str!("../content/participants.json");
pub const BUILTIN_SAVING_THROWS: &str = include_str!("../content/saving_throws.json");

/// Writes the sample tables into the config's data dir. Existing files are
/// left alone unless `overwrite` is set.
pub fn install_builtin(config: &MeleeConfig, overwrite: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir: {}", config.data_dir.display()))?;
    let paths = config.store_paths();
    let files = [
        (paths.roster, BUILTIN_ROSTER),
        (paths.participants, BUILTIN_PARTICIPANTS),
        (paths.saving_throws, BUILTIN_SAVING_THROWS),
    ];
    if !overwrite {
        if let Some((existing, _)) = files.iter().find(|(p, _)| p.exists()) {
            bail!("{} already exists (use --force to replace it)", existing.display());
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, text) in files {
        write_table(&path, text)?;
        written.push(path);
    }
    tracing::info!(
        dir = %config.data_dir.display(),
        files = written.len(),
        "installed builtin tables"
    );
    Ok(written)
}

fn write_table(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
