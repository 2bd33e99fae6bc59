mod cmd;
mod exit;
mod input;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tictacnet", version, about = "Peer-to-peer tic-tac-toe over TCP")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). TICTACNET_LOG overrides it.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_subcommand() {
        let cli = Cli::try_parse_from([
            "tictacnet",
            "host",
            "--bind",
            "127.0.0.1",
            "--port",
            "4000",
            "--seed",
            "7",
        ])
        .expect("host args should parse");

        let Command::Host(args) = cli.command else {
            panic!("expected host command");
        };
        assert_eq!(args.port, Some(4000));
        assert_eq!(args.seed, Some(7));
        assert!(args.bind.is_loopback());
    }

    #[test]
    fn parses_join_subcommand() {
        let cli = Cli::try_parse_from([
            "tictacnet",
            "join",
            "192.168.1.20:4000",
            "--connect-timeout",
            "3s",
        ])
        .expect("join args should parse");
        assert!(matches!(cli.command, Command::Join(_)));
    }

    #[test]
    fn rejects_join_without_port() {
        let err = Cli::try_parse_from(["tictacnet", "join", "192.168.1.20"])
            .expect_err("address without port should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tictacnet", "netinfo", "--format", "json"])
            .expect("global flag should parse after subcommand");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
