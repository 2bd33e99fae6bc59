use std::fmt;
use std::io;

use tictacnet_frame::FrameError;
use tictacnet_session::{EndReason, SessionError};
use tictacnet_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: &io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err.io_source() {
        Some(source) => io_error(context, source),
        None => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, &source),
        FrameError::LineTooLong { .. } | FrameError::InvalidUtf8 => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
        SessionError::Terminated => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

/// Process exit code for a finished session.
pub fn end_reason_code(reason: &EndReason) -> i32 {
    match reason {
        EndReason::LocalExit => SUCCESS,
        EndReason::PeerDisconnected(_) => FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;

    #[test]
    fn connect_refused_is_transport_error() {
        let err = transport_error(
            "join failed",
            TransportError::Connect {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 1)),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("join failed: "));
    }

    #[test]
    fn transport_errors_classify_by_io_kind() {
        let err = transport_error(
            "bind failed",
            TransportError::Bind {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 80)),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);

        let err = transport_error(
            "bind failed",
            TransportError::Bind {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 4000)),
                source: io::Error::from(io::ErrorKind::AddrInUse),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = transport_error("accept failed", TransportError::Shutdown);
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert_eq!(err.message, "accept failed: transport shut down");
    }

    #[test]
    fn connect_timeout_maps_to_timeout() {
        let err = session_error(
            "join failed",
            SessionError::Transport(TransportError::Connect {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 1)),
                source: io::Error::from(io::ErrorKind::TimedOut),
            }),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn invalid_config_is_usage() {
        let err = session_error("bad", SessionError::InvalidConfig("palette".to_string()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn end_reasons() {
        assert_eq!(end_reason_code(&EndReason::LocalExit), SUCCESS);
        assert_eq!(
            end_reason_code(&EndReason::PeerDisconnected("eof".to_string())),
            FAILURE
        );
    }
}
