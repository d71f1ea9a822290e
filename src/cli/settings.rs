//! Settings command implementation

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::store::{data_dir, AppSettings, DATA_DIR_ENV};

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: Option<SettingsAction>,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print every setting (the default)
    Show,

    /// Change one setting
    Set {
        /// Setting name, e.g. theme or codeViewerFontSize
        key: String,
        value: String,
    },

    /// Restore the defaults
    Reset,

    /// Print where settings are stored
    Path,
}

pub fn run(args: SettingsArgs) -> Result<()> {
    let dir = match data_dir() {
        Some(dir) => dir,
        None => bail!("Cannot determine a data directory; set {DATA_DIR_ENV}"),
    };

    match args.action.unwrap_or(SettingsAction::Show) {
        SettingsAction::Show => print_settings(&AppSettings::load(&dir)?),
        SettingsAction::Set { key, value } => {
            let mut settings = AppSettings::load(&dir)?;
            settings.set(&key, &value)?;
            settings.save(&dir)?;
            tracing::debug!("Saved settings to {}", AppSettings::path(&dir).display());
            print_settings(&settings);
        }
        SettingsAction::Reset => {
            let settings = AppSettings::default();
            settings.save(&dir)?;
            println!("Settings reset to defaults");
            print_settings(&settings);
        }
        SettingsAction::Path => println!("{}", AppSettings::path(&dir).display()),
    }
    Ok(())
}

fn print_settings(settings: &AppSettings) {
    for (key, value) in settings.entries() {
        println!("{key:<24} {value}");
    }
}
