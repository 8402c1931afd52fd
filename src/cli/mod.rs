//! Command-line interface for osm-geocoding.
//!
//! This module handles CLI argument parsing and config resolution. The
//! subcommand bodies live in the [`commands`] submodule.

pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use osm_geocoding_config::GeocoderConfig;
use std::path::PathBuf;

/// osm-geocoding - Debounced OpenStreetMap address search
#[derive(Debug, Parser)]
#[command(name = "osm-geocoding")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Comma-separated country codes to restrict results to (empty for worldwide)
    #[arg(long, global = true, value_name = "CODES")]
    pub countrycodes: Option<String>,

    /// Preferred language for display names
    #[arg(long, global = true, value_name = "LANG")]
    pub accept_language: Option<String>,

    /// Bound results to `x1,y1,x2,y2`
    #[arg(long, global = true, value_name = "BOX")]
    pub viewbox: Option<String>,

    /// Quiet period before a typed query is sent, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one query immediately and print the results
    Search {
        /// Free-text address to look up
        address: String,

        /// Print the raw result array as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive the widget from stdin: each line is the new input text
    ///
    /// Commands: `:focus`, `:esc`, `:click X Y`, `:select N`, `:quit`.
    Interactive,

    /// Print the effective configuration
    Config {
        /// Write it to the config file (fails if one exists unless --force)
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file with --init
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Config file location: `--config` or the platform default.
    pub fn config_file(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(GeocoderConfig::config_path)
    }

    /// Load the config file (defaults if absent), then apply flag overrides.
    ///
    /// The result is validated again after the overrides are applied.
    pub fn resolve_config(&self) -> anyhow::Result<GeocoderConfig> {
        let path = self.config_file();
        let config = GeocoderConfig::load_or_default(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        let config = self.apply_overrides(config);
        config.validate().context("Invalid command-line override")?;
        Ok(config)
    }

    /// Apply the command-line overrides to `config`.
    pub fn apply_overrides(&self, mut config: GeocoderConfig) -> GeocoderConfig {
        if let Some(countrycodes) = &self.countrycodes {
            config = config.with_countrycodes(countrycodes.clone());
        }
        if let Some(accept_language) = &self.accept_language {
            config = config.with_accept_language(accept_language.clone());
        }
        if let Some(viewbox) = &self.viewbox {
            config = config.with_viewbox(viewbox.clone());
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config = config.with_debounce_ms(debounce_ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "osm-geocoding",
            "search",
            "Kadıköy",
            "--countrycodes",
            "tr,cy",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.countrycodes.as_deref(), Some("tr,cy"));
        assert!(matches!(
            cli.command,
            Commands::Search { ref address, json: true } if address == "Kadıköy"
        ));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "osm-geocoding",
            "--accept-language",
            "en",
            "--viewbox",
            "28.5,41.3,29.5,40.8",
            "--debounce-ms",
            "250",
            "interactive",
        ])
        .unwrap();
        let config = cli.apply_overrides(GeocoderConfig::default());
        assert_eq!(config.accept_language, "en");
        assert_eq!(config.viewbox, "28.5,41.3,29.5,40.8");
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.countrycodes, "tr", "Untouched fields keep their values");
    }

    #[test]
    fn test_empty_countrycodes_means_worldwide() {
        let cli =
            Cli::try_parse_from(["osm-geocoding", "--countrycodes", "", "search", "x"]).unwrap();
        let config = cli.apply_overrides(GeocoderConfig::default());
        assert!(config.countrycodes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_config_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "debounce_ms: 400\naccept_language: de\n").unwrap();

        let cli = Cli::try_parse_from([
            "osm-geocoding",
            "--config",
            path.to_str().unwrap(),
            "--debounce-ms",
            "50",
            "config",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.accept_language, "de");
        assert_eq!(config.debounce_ms, 50, "Flag must win over the file");
    }

    #[test]
    fn test_resolve_config_rejects_bad_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let cli = Cli::try_parse_from([
            "osm-geocoding",
            "--config",
            path.to_str().unwrap(),
            "--viewbox",
            "not,a,box",
            "config",
        ])
        .unwrap();
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_log_level_arg_maps_to_filter() {
        assert_eq!(LogLevelArg::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevelArg::Off.to_level_filter(), log::LevelFilter::Off);
    }
}
