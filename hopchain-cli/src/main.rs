//! entrypoint for hopchain-cli

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

use clap::{Parser, Subcommand};

pub mod cmd;
use self::cmd::{connect, probe};

pub mod trace;

#[derive(Debug, Parser)]
#[command(name = "hopchain")]
#[command(bin_name = "hopchain")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmds: CliCommands,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    Connect(connect::CliCommandConnect),
    Probe(probe::CliCommandProbe),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[expect(clippy::exit)]
    if let Err(err) = match cli.cmds {
        CliCommands::Connect(cfg) => connect::run(cfg).await,
        CliCommands::Probe(cfg) => probe::run(cfg).await,
    } {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_connect() {
        let cli = Cli::try_parse_from([
            "hopchain",
            "connect",
            "--forward",
            "ws://1.2.3.4:80/tunnel,ws:///inner",
            "-t",
            "5",
            "-v",
            "example.org:443",
        ])
        .unwrap();
        let CliCommands::Connect(cfg) = cli.cmds else {
            panic!("expected connect command, got {:?}", cli.cmds);
        };
        assert_eq!("example.org:443", cfg.target);
        assert_eq!("ws://1.2.3.4:80/tunnel,ws:///inner", cfg.chain.forward);
        assert_eq!(5, cfg.chain.timeout);
        assert!(cfg.chain.verbose);
    }

    #[test]
    fn parse_probe_defaults() {
        let cli = Cli::try_parse_from(["hopchain", "probe", "example.org:80"]).unwrap();
        let CliCommands::Probe(cfg) = cli.cmds else {
            panic!("expected probe command, got {:?}", cli.cmds);
        };
        assert_eq!("", cfg.chain.forward);
        assert_eq!(10, cfg.chain.timeout);
        assert!(!cfg.chain.verbose);
    }

    #[test]
    fn target_is_required() {
        assert!(Cli::try_parse_from(["hopchain", "connect"]).is_err());
    }
}
