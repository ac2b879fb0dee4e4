//! # Overview
//!
//! A Bluetooth Low Energy host that drives a controller over a raw HCI byte
//! stream, usually a TCP connection to a remote controller.
//!
//! # Wire format
//!
//! Commands and events, along with their parameter layouts, live in the
//! [`interface`] module. Advertising data structures are built and parsed by
//! [`interface::adv`].
//!
//! # Sending commands
//!
//! The controller only accepts as many commands as it has granted credit
//! for. The [`pipeline`] module queues commands by priority and sends them
//! from a worker thread as credit arrives, then matches each completion event
//! to the command it answers.
//!
//! # Running a host
//!
//! [`Host`] ties a [`reactor::Reactor`] to the procedures in [`host`]:
//! controller reset, advertising, scanning and connecting. A typical run
//! looks like
//!
//! ```no_run
//! use hci_host::{Config, Host, Role};
//!
//! let config = Config {
//!     role: Role::Advertiser,
//!     ..Default::default()
//! };
//! let mut host = Host::connect(&config)?;
//! host.start();
//! host.run()?;
//! # Ok::<(), hci_host::Error>(())
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate thiserror;

pub use address::*;
pub use config::{Config, Role};
pub use host::Host;
pub use result::{Error, Result};

pub mod config;
pub mod host;
pub mod interface;
pub mod pipeline;
pub mod reactor;

mod address;
mod result;
mod util;
