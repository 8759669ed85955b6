//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::*;

use super::ConfigCommands;
use crate::config::{Config, ConfigSource, default_config_path};

pub fn handle_config_command(
    cmd: ConfigCommands,
    config: &Config,
    source: &ConfigSource,
    explicit: Option<&Path>,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            let target = init_target(path, explicit);
            init_config(&target, force)?;
            println!(
                "{} {}",
                "Configuration written to".bright_green(),
                target.display()
            );
            Ok(())
        }
        ConfigCommands::Show => {
            println!("{}", format!("# source: {}", source).dimmed());
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match source {
                ConfigSource::File(path) => println!("{}", path.display()),
                ConfigSource::Defaults => {
                    println!("{}", "No configuration file found, using built-in defaults".yellow());
                    println!("config init would write {}", default_config_path().display());
                }
            }
            Ok(())
        }
    }
}

fn init_target(path: Option<PathBuf>, explicit: Option<&Path>) -> PathBuf {
    path.or_else(|| explicit.map(Path::to_path_buf))
        .unwrap_or_else(default_config_path)
}

fn init_config(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            target.display()
        );
    }

    Config::default().save(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("recvfill.toml");

        init_config(&target, false).unwrap();
        assert_eq!(Config::load_from(&target).unwrap(), Config::default());

        assert!(init_config(&target, false).is_err());
        assert!(init_config(&target, true).is_ok());
    }

    #[test]
    fn test_init_target_precedence() {
        let explicit = PathBuf::from("global.toml");
        assert_eq!(
            init_target(Some(PathBuf::from("arg.toml")), Some(&explicit)),
            PathBuf::from("arg.toml")
        );
        assert_eq!(init_target(None, Some(&explicit)), explicit);
    }
}
