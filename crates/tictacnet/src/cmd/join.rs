use tictacnet_session::{join, PeerRole, SessionConfig, StopFlag};

use crate::cmd::{parse_duration, play, JoinArgs};
use crate::exit::{session_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: JoinArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SessionConfig {
        connect_timeout: parse_duration(&args.connect_timeout)?,
        read_timeout: parse_duration(&args.read_timeout)?,
        ..SessionConfig::default()
    };

    let interrupted = StopFlag::new();
    play::install_ctrlc_handler(interrupted.clone())?;

    let link = join(args.address, &config)
        .map_err(|err| session_error(&format!("could not join {}", args.address), err))?;

    play::run(PeerRole::Client, link, &config, format, interrupted)
}
