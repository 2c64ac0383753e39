// ============================================================================
// src/main.rs – PBKDF2 Forge command line
// ============================================================================

mod cmd;
mod ui;
mod util;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cmd::{DeriveArgs, LayoutArgs};
use tracing_subscriber::EnvFilter;
use ui::UX;

#[derive(Debug, Parser)]
#[command(name = "pbkdf2_forge", version, about = "Forge keys from passwords with PBKDF2.")]
struct Cli {
    /// Suppress everything on stderr except failures
    #[arg(long, global = true)]
    quiet: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive a key from a password and salt
    Derive(DeriveArgs),
    /// Show how a key size splits into PRF blocks
    Layout(LayoutArgs),
    /// Run built-in known-answer checks
    SelfTest,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, ui: &UX) -> Result<()> {
    match &cli.command {
        Command::Derive(args) => cmd::run_derive(ui, args),
        Command::Layout(args) => cmd::run_layout(ui, args),
        Command::SelfTest => cmd::run_self_test(ui),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ui = UX::new(cli.quiet);

    if let Err(err) = run(&cli, &ui) {
        ui.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn derive_requires_exactly_one_salt_source() {
        assert!(Cli::try_parse_from(["pbkdf2_forge", "derive"]).is_err());
        assert!(Cli::try_parse_from([
            "pbkdf2_forge",
            "derive",
            "--salt",
            "00",
            "--salt-text",
            "x"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "pbkdf2_forge",
            "-vv",
            "derive",
            "--salt-text",
            "salt",
            "--prf",
            "hmac-sha512",
            "--block-index",
            "le64",
            "--iterations",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Derive(args) => {
                assert_eq!(args.prf, Some(pbkdf2_forge::PrfKind::HmacSha512));
                assert_eq!(args.block_index, Some(pbkdf2_forge::BlockIndexEncoding::Le64));
                assert_eq!(args.iterations, Some(10));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn layout_defaults_to_sha256_rfc8018() {
        let cli = Cli::try_parse_from(["pbkdf2_forge", "layout", "--key-size", "33"]).unwrap();
        match cli.command {
            Command::Layout(args) => {
                assert_eq!(args.prf, pbkdf2_forge::PrfKind::HmacSha256);
                assert_eq!(args.block_index, pbkdf2_forge::BlockIndexEncoding::Rfc8018);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
