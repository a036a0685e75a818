//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `fetch`: tab and drum MIDI download jobs with live progress
//! - `list`: files already in the download directory
//! - `config`: show or persist the effective configuration

mod fetch;
mod list;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::pipeline::JobKind;

pub use fetch::cmd_fetch;
pub use list::cmd_list;

/// tabripp CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Download directory (overrides the config file)
    #[arg(short, long, global = true, env = "TABRIPP_DIR")]
    pub dir: Option<PathBuf>,

    /// Songsterr base URL (overrides the config file)
    #[arg(long, global = true, env = "TABRIPP_BASE_URL")]
    pub base_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download the latest tab for one or more song links
    Tab {
        /// Song links or IDs ending in s<digits>
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// Download the latest tab and convert its drum track to MIDI
    Drum {
        /// Song links or IDs ending in s<digits>
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// List files in the download directory
    List,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    /// Config file merged with command-line overrides
    pub fn resolve_config(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load(),
        };
        if let Some(dir) = &self.dir {
            config.download.directory = dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.songsterr.base_url = base_url.clone();
        }
        config
    }
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if everything succeeded, `Ok(false)` if at least one
/// job failed.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let config = cli.resolve_config();

    match &cli.command {
        Commands::Tab { links } => cmd_fetch(&config, JobKind::TabOnly, links),
        Commands::Drum { links } => cmd_fetch(&config, JobKind::TabPlusDrumMidi, links),
        Commands::List => {
            cmd_list(&config)?;
            Ok(true)
        }
        Commands::Config { save } => {
            cmd_config(cli, &config, *save)?;
            Ok(true)
        }
    }
}

/// Print the merged config as TOML, optionally persisting it
fn cmd_config(cli: &Cli, config: &Config, save: bool) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);

    if save {
        match &cli.config {
            Some(path) => config::save_to(config, path)?,
            None => config::save(config)?,
        }
        println!("\nConfiguration saved.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_command() {
        let cli = Cli::try_parse_from(["tabripp", "tab", "s1", "https://x/a-s2"]).unwrap();
        match cli.command {
            Commands::Tab { links } => assert_eq!(links, ["s1", "https://x/a-s2"]),
            _ => panic!("expected tab command"),
        }
    }

    #[test]
    fn test_links_are_required() {
        assert!(Cli::try_parse_from(["tabripp", "drum"]).is_err());
    }

    #[test]
    fn test_config_save_writes_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "tabripp",
            "config",
            "--save",
            "--base-url",
            "http://mirror.local",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();

        assert!(run_command(&cli).unwrap());
        let saved = config::load_from(&path);
        assert_eq!(saved.songsterr.base_url, "http://mirror.local");
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing_config = dir.path().join("none.toml");
        let cli = Cli::try_parse_from([
            "tabripp",
            "list",
            "--dir",
            "/srv/tabs",
            "--base-url",
            "http://127.0.0.1:8080",
            "--config",
            missing_config.to_str().unwrap(),
        ])
        .unwrap();

        let config = cli.resolve_config();
        assert_eq!(config.download_dir(), PathBuf::from("/srv/tabs"));
        assert_eq!(config.songsterr.base_url, "http://127.0.0.1:8080");
    }
}
