//! Command-line interface for the `birdlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::logging::Verbosity;

/// birdlog - a bird sighting log
///
/// Records sightings and derives life, year and month lists over a
/// hierarchy of birding locations.
#[derive(Debug, Parser)]
#[command(name = "birdlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (overrides configuration)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import families, birds and locations from a JSON checklist
    Import {
        /// Checklist file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print life list and period counts for today
    Stats,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Loads configuration and applies command-line overrides.
    pub fn load_config(&self) -> crate::error::BirdResult<Config> {
        let mut config = Config::load_from(self.config.clone())?;

        if let Some(path) = &self.database {
            config.storage.database_path = path.clone();
        }
        if let Command::Serve { host, port } = &self.command {
            if let Some(h) = host {
                config.server.host = h.clone();
            }
            if let Some(p) = port {
                config.server.port = *p;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Executes the parsed command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;

    match cli.command {
        Command::Serve { .. } => commands::serve(&config).await,
        Command::Import { file } => commands::import_checklist(&config, &file),
        Command::Stats => commands::stats(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["birdlog", "-v", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        assert!(matches!(
            cli.command,
            Command::Serve { port: Some(9000), host: None }
        ));
    }

    #[test]
    fn test_parse_import_requires_file() {
        assert!(Cli::try_parse_from(["birdlog", "import"]).is_err());
        let cli = Cli::try_parse_from(["birdlog", "import", "checklist.json"]).unwrap();
        assert!(matches!(cli.command, Command::Import { .. }));
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::try_parse_from(["birdlog", "-q", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_database_flag_overrides_config() {
        figment::Jail::expect_with(|_jail| {
            let cli = Cli::try_parse_from(["birdlog", "--database", "other.db", "stats"])
                .map_err(|e| e.to_string())?;
            let config = cli.load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.storage.database_path, PathBuf::from("other.db"));
            Ok(())
        });
    }

    #[test]
    fn test_zero_port_flag_is_rejected() {
        figment::Jail::expect_with(|_jail| {
            let cli = Cli::try_parse_from(["birdlog", "serve", "--port", "0"])
                .map_err(|e| e.to_string())?;
            assert!(cli.load_config().is_err());
            Ok(())
        });
    }
}
