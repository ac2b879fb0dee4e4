use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "b1ee.com";
pub const DEFAULT_PORT: u16 = 0xB1EE;

/// How long each scan runs before it is restarted in the other mode.
pub const SCAN_CYCLE: Duration = Duration::from_secs(15);
/// How long a connection attempt may stay pending before it is cancelled.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// How long an established connection is held before disconnecting.
pub const SUPERVISION_TIMEOUT: Duration = Duration::from_secs(10);
/// Lifetime of the alternate advertiser.
pub const ALTERNATE_LIFETIME: Duration = Duration::from_secs(30);
/// Upper bound on a single reactor wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Advertiser,
    AlternateAdvertiser,
    Scanner,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Role::Advertiser => write!(f, "advertiser"),
            Role::AlternateAdvertiser => write!(f, "alternate advertiser"),
            Role::Scanner => write!(f, "scanner"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub role: Role,
    /// Whether the scanner tries to connect to what it found at the end of
    /// each scan cycle.
    pub connect_after_scan: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            role: Role::Scanner,
            connect_after_scan: false,
        }
    }
}
