use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tipsync", about = "tipsync: branch tip synchronization server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the sync server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Register an empty in-memory account (repeatable)
    #[arg(long = "account")]
    pub accounts: Vec<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Config file to show; prints the defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_args() {
        let cli = Cli::try_parse_from([
            "tipsync", "serve", "--bind", "0.0.0.0:9000", "--account", "alice", "--account", "bob",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
        assert_eq!(args.accounts, vec!["alice".to_string(), "bob".to_string()]);
        assert!(args.config.is_none());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        assert!(Cli::try_parse_from(["tipsync", "serve", "--bind", "nowhere"]).is_err());
    }
}
