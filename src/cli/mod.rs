//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Bastion using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Bastion - batch maintenance for the Fatins document store
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(version, about, long_about = None)]
#[command(author = "Fatins Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bastion.toml", env = "BASTION_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BASTION_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate one document to the current field layout
    Migrate(commands::migrate::MigrateArgs),

    /// Migrate every document of a collection
    MigrateAll(commands::migrate_all::MigrateAllArgs),

    /// Export the whole store to a snapshot file
    Export(commands::export::ExportArgs),

    /// Seed schema templates
    Seed(commands::seed::SeedArgs),

    /// Print one document
    Show(commands::show::ShowArgs),

    /// List collections, or the documents of one collection
    List(commands::list::ListArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["bastion", "export"]);
        assert_eq!(cli.config, "bastion.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "bastion",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "list",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_migrate_by_path() {
        let cli = Cli::parse_from(["bastion", "migrate", "--path", "characters/c1", "--dry-run"]);
        match cli.command {
            Commands::Migrate(args) => {
                assert_eq!(args.path.as_deref(), Some("characters/c1"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_migrate_accepts_id_and_path_together() {
        let cli = Cli::parse_from(["bastion", "migrate", "--id", "a", "--path", "c/a"]);
        match cli.command {
            Commands::Migrate(args) => {
                assert_eq!(args.id.as_deref(), Some("a"));
                assert_eq!(args.path.as_deref(), Some("c/a"));
            }
            _ => panic!("expected migrate command"),
        }
    }

    #[test]
    fn test_cli_migrate_all_requires_collection() {
        assert!(Cli::try_parse_from(["bastion", "migrate-all"]).is_err());
        let cli = Cli::parse_from(["bastion", "migrate-all", "--collection", "characters"]);
        assert!(matches!(cli.command, Commands::MigrateAll(_)));
    }

    #[test]
    fn test_cli_seed_needs_template_or_all() {
        assert!(Cli::try_parse_from(["bastion", "seed"]).is_err());
        assert!(Cli::try_parse_from(["bastion", "seed", "weapon", "--all"]).is_err());

        let cli = Cli::parse_from(["bastion", "seed", "--all"]);
        match cli.command {
            Commands::Seed(args) => assert!(args.all && args.template.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config_and_init() {
        let cli = Cli::parse_from(["bastion", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));

        let cli = Cli::parse_from(["bastion", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
