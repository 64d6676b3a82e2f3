use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use melee_engine::api::{dice_for, open_session};
use melee_engine::config::MeleeConfig;
use melee_engine::content::install_builtin;
use melee_engine::Prompt;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod menu;
mod terminal;

use terminal::{TerminalPrompt, EXIT_TO_MENU};

#[derive(Subcommand)]
enum Cmd {
    /// Write the sample roster, participant sheets and saving throw table
    Init {
        /// Replace tables that already exist
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Interactive combat menu
    Run,
    /// Print the current roster and exit
    Roster,
    /// Roll COUNT dice of SIDES, each shifted by MODIFIER
    Roll {
        #[arg(long, default_value_t = 1)]
        count: i32,
        #[arg(long, default_value_t = 20)]
        sides: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        modifier: i32,
        /// Number of separate rolls
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
}

#[derive(Parser)]
#[command(name = "melee")]
#[command(about = "Melee Manager: tabletop combat adjudication")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the roster, sheets, saving throws and combat log
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// RNG seed for reproducible dice
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    cmd: Cmd,
}

impl Cli {
    fn melee_config(&self) -> Result<MeleeConfig> {
        let mut config = MeleeConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.melee_config()?;
    match cli.cmd {
        Cmd::Init { force } => {
            for path in install_builtin(&config, force)? {
                println!("wrote {}", path.display());
            }
        }
        Cmd::Run => {
            let mut encounter = open_session(&config)?;
            let mut prompt = TerminalPrompt::stdio();
            prompt.announce("MELEE MANAGER");
            prompt.announce(&format!("Enter '{EXIT_TO_MENU}' at any prompt to return to the menu"));
            menu::run_menu(&mut encounter, &mut prompt)?;
        }
        Cmd::Roster => {
            let encounter = open_session(&config)?;
            println!("{}", encounter.format_encounter());
            println!("{}", encounter.format_combatants());
        }
        Cmd::Roll { count, sides, modifier, times } => {
            let mut dice = dice_for(&config);
            for _ in 0..times {
                println!("{}", dice.roll_dice(count, sides, modifier, 0));
            }
        }
    }
    Ok(())
}
