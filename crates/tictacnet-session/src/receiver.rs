use std::io::Read;
use std::thread::{self, JoinHandle};

use tictacnet_frame::{FrameError, LineReader, Message};
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatcher, SessionEvent};
use crate::error::{Result, SessionError};
use crate::lifecycle::StopFlag;

const THREAD_NAME: &str = "tictacnet-recv";

/// Read lines until the connection ends, posting each decoded message.
///
/// Runs on its own thread and never touches session state. Read timeouts
/// only re-check `stop`. Malformed lines are dropped. The first hard error
/// or EOF is posted as [`SessionEvent::PeerDisconnected`] unless `stop` is
/// already set, in which case the loop just returns.
pub fn receive_loop<R: Read>(mut reader: LineReader<R>, stop: StopFlag, dispatcher: Dispatcher) {
    loop {
        if stop.is_stopped() {
            debug!("receive loop stopped");
            return;
        }

        let line = match reader.read_line() {
            Ok(line) => line,
            Err(err) if err.is_timeout() => continue,
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "dropping unreadable line");
                continue;
            }
            Err(err) => {
                if stop.is_stopped() {
                    debug!(error = %err, "receive loop stopped");
                } else {
                    let detail = match err {
                        FrameError::ConnectionClosed => "connection closed".to_string(),
                        other => other.to_string(),
                    };
                    info!(%detail, "peer connection ended");
                    dispatcher.post(SessionEvent::PeerDisconnected(detail));
                }
                return;
            }
        };

        let message = match Message::decode(&line) {
            Ok(message) => message,
            Err(err) => {
                debug!(%line, error = %err, "dropping undecodable line");
                continue;
            }
        };

        if stop.is_stopped() {
            return;
        }
        if !dispatcher.post(SessionEvent::Remote(message)) {
            debug!("session owner gone, receive loop exiting");
            return;
        }
    }
}

/// Run [`receive_loop`] on a named background thread.
pub fn spawn_receive_loop<R>(
    reader: LineReader<R>,
    stop: StopFlag,
    dispatcher: Dispatcher,
) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || receive_loop(reader, stop, dispatcher))
        .map_err(SessionError::Spawn)
}
