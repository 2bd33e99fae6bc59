use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod host;
pub mod join;
pub mod netinfo;
pub mod play;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a game and wait for one opponent.
    Host(HostArgs),
    /// Join a game hosted at IP:PORT.
    Join(JoinArgs),
    /// Print the local address and a free port.
    Netinfo(NetinfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Host(args) => host::run(args, format),
        Command::Join(args) => join::run(args, format),
        Command::Netinfo(args) => netinfo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    /// Port to listen on. Default: a free ephemeral port.
    #[arg(long)]
    pub port: Option<u16>,
    /// Seed for turn order and colors, for reproducible games.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Socket read timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub read_timeout: String,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Host address, as printed by `tictacnet host`.
    pub address: SocketAddr,
    /// Give up connecting after this long (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
    /// Socket read timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub read_timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct NetinfoArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
