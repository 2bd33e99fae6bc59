use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tictacnet_frame::{
    Color, FrameConfig, DEFAULT_IO_TIMEOUT, DEFAULT_MAX_LINE, MAX_MESSAGE_LEN,
};

use crate::error::{Result, SessionError};

/// Default time allowed for the client to reach the host.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval at which a waiting host checks for cancellation.
pub const DEFAULT_ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Colors the host draws from for each new game.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#E74C3C", "#3498DB", "#27AE60", "#F39C12", "#8E44AD", "#16A085", "#D35400", "#2C3E50",
];

/// Session behavior and socket configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address the host listens on.
    pub bind_ip: IpAddr,
    /// Port the host listens on; `0` lets the OS pick one.
    pub port: u16,
    pub connect_timeout: Duration,
    /// Read timeout on the data socket. Bounds how long the receive loop
    /// takes to notice its stop flag.
    pub read_timeout: Duration,
    pub write_timeout: Option<Duration>,
    pub accept_poll_interval: Duration,
    pub max_line_len: usize,
    /// Colors the host picks from; needs at least two distinct entries.
    pub palette: Vec<Color>,
    /// Seed for the host's turn and color draws. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_IO_TIMEOUT,
            write_timeout: Some(DEFAULT_IO_TIMEOUT),
            accept_poll_interval: DEFAULT_ACCEPT_POLL_INTERVAL,
            max_line_len: DEFAULT_MAX_LINE,
            palette: default_palette(),
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    /// Check that the configuration can run a session.
    pub fn validate(&self) -> Result<()> {
        let distinct: HashSet<&Color> = self.palette.iter().collect();
        if distinct.len() < 2 {
            return Err(SessionError::InvalidConfig(
                "palette needs at least two distinct colors".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(SessionError::InvalidConfig(
                "connect timeout must be non-zero".to_string(),
            ));
        }
        if self.read_timeout.is_zero() {
            return Err(SessionError::InvalidConfig(
                "read timeout must be non-zero".to_string(),
            ));
        }
        if self.write_timeout.is_some_and(|t| t.is_zero()) {
            return Err(SessionError::InvalidConfig(
                "write timeout must be non-zero".to_string(),
            ));
        }
        if self.accept_poll_interval.is_zero() {
            return Err(SessionError::InvalidConfig(
                "accept poll interval must be non-zero".to_string(),
            ));
        }
        if self.max_line_len < MAX_MESSAGE_LEN {
            return Err(SessionError::InvalidConfig(format!(
                "max line length must be at least {MAX_MESSAGE_LEN} bytes to carry START"
            )));
        }
        Ok(())
    }

    /// Line framing settings for the data socket.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_line_len: self.max_line_len,
            read_timeout: Some(self.read_timeout),
            write_timeout: self.write_timeout,
        }
    }
}

/// The built-in palette as validated colors.
pub fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|c| Color::new(*c).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SessionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.palette.len(), DEFAULT_PALETTE.len());
        assert_eq!(config.port, 0);
    }

    #[test]
    fn palette_needs_two_distinct_colors() {
        let red = Color::new("red").unwrap();
        let config = SessionConfig {
            palette: vec![red.clone(), red],
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let config = SessionConfig {
            read_timeout: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            write_timeout: Some(Duration::ZERO),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            write_timeout: None,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn max_line_len_must_carry_the_longest_message() {
        let config = SessionConfig {
            max_line_len: 16,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SessionError::InvalidConfig(_))
        ));

        let config = SessionConfig {
            max_line_len: MAX_MESSAGE_LEN - 1,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            max_line_len: MAX_MESSAGE_LEN,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn frame_config_follows_session_config() {
        let config = SessionConfig {
            max_line_len: 256,
            read_timeout: Duration::from_millis(250),
            write_timeout: None,
            ..SessionConfig::default()
        };
        let frame = config.frame_config();
        assert_eq!(frame.max_line_len, 256);
        assert_eq!(frame.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(frame.write_timeout, None);
    }
}
