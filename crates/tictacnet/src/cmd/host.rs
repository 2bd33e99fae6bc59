use std::net::SocketAddr;

use tictacnet_session::{PeerRole, SessionConfig, SessionError, SessionListener, StopFlag};
use tictacnet_transport::{allocate_listen_port, detect_local_address, TransportError};

use crate::cmd::{parse_duration, play, HostArgs};
use crate::exit::{session_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_event, Event, OutputFormat};

pub fn run(args: HostArgs, format: OutputFormat) -> CliResult<i32> {
    let port = match args.port {
        Some(port) => port,
        None => allocate_listen_port()
            .map_err(|err| transport_error("port allocation failed", err))?,
    };
    let config = SessionConfig {
        bind_ip: args.bind,
        port,
        read_timeout: parse_duration(&args.read_timeout)?,
        rng_seed: args.seed,
        ..SessionConfig::default()
    };

    let listener =
        SessionListener::bind(&config).map_err(|err| session_error("bind failed", err))?;
    let address = listener.local_addr();
    let share = if address.ip().is_unspecified() {
        SocketAddr::new(detect_local_address(), address.port())
    } else {
        address
    };
    print_event(&Event::Listening { address, share }, format);

    let interrupted = StopFlag::new();
    play::install_ctrlc_handler(interrupted.clone())?;

    let link = match listener.accept(&interrupted) {
        Ok(link) => link,
        Err(SessionError::Transport(TransportError::Shutdown)) => {
            print_event(
                &Event::Notice {
                    message: "stopped waiting for an opponent",
                },
                format,
            );
            return Ok(SUCCESS);
        }
        Err(err) => return Err(session_error("accept failed", err)),
    };

    play::run(PeerRole::Host, link, &config, format, interrupted)
}
