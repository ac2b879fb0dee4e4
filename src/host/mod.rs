//! The host side of the link: procedures that configure the controller,
//! advertise, scan and connect, driven by the events the controller returns.
//!
//! [`Host`] pairs a [`Reactor`] with a [`ConnectionManager`]. The reactor
//! delivers bytes from the controller to the manager, which decodes them and
//! advances whatever procedure is in progress. Commands go out through the
//! manager's [`Pipeline`] on its own worker thread.

use std::collections::BTreeMap;
use std::net::TcpStream;
use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bitvec::prelude::*;
use bytes::Bytes;

pub use self::advertise::AdvertisingProfile;
pub use self::device::DeviceRecord;
pub use self::timer::{TimerRole, Timers};

use crate::config::{Config, Role, POLL_INTERVAL};
use crate::interface::{Event, ReturnParameters, ScanType};
use crate::pipeline::{self, Pipeline, Upper};
use crate::reactor::{Handler, Reactor, Transport};
use crate::{Address, DeviceKey, Result};

mod advertise;
mod connect;
mod device;
mod reset;
mod scan;
mod timer;

/// What the reset procedure learned about the controller.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ControllerInfo {
    pub address: Address,
    pub hci_version: u8,
    pub hci_revision: u16,
    pub lmp_version: u8,
    pub manufacturer: u16,
    pub lmp_subversion: u16,
    pub supported_commands: BitVec<u8, Lsb0>,
    pub features: u64,
    pub extended_features: u64,
    pub le_features: u64,
    pub acl_buffer_length: u16,
    pub acl_buffers: u16,
    pub sco_buffer_length: u8,
    pub sco_buffers: u16,
    pub le_buffer_length: u16,
    pub le_buffers: u8,
    pub white_list_size: u8,
    pub supported_states: u64,
    pub advertising_tx_power: i8,
}

impl ControllerInfo {
    /// Whether the supported-commands bitmap has bit `bit` of octet `octet`
    /// set.
    pub fn supports(&self, octet: usize, bit: usize) -> bool {
        self.supported_commands
            .get(octet * 8 + bit)
            .map(|set| *set)
            .unwrap_or(false)
    }
}

/// The return parameters of a successful Command Complete event.
fn returned(event: Option<&Event>) -> Option<&ReturnParameters> {
    match event {
        Some(Event::CommandComplete(complete)) if complete.status.is_success() => {
            Some(&complete.ret)
        }
        Some(Event::CommandComplete(complete)) => {
            warn!("{} failed: {}", complete.opcode, complete.status);
            None
        }
        _ => None,
    }
}

/// The procedure state machine. Every callback runs on the thread that
/// drives the reactor.
pub struct ConnectionManager {
    config: Config,
    pipeline: Pipeline<ConnectionManager>,
    timers: Timers,
    running: bool,
    info: ControllerInfo,
    profile: AdvertisingProfile,
    adv_data: Bytes,
    scan_response: Bytes,
    scan_type: ScanType,
    found_devices: BTreeMap<DeviceKey, DeviceRecord>,
    connect_list: Vec<DeviceRecord>,
    connection_handle: Option<u16>,
}

impl ConnectionManager {
    pub fn new(config: Config) -> Self {
        ConnectionManager {
            config,
            pipeline: Pipeline::new(),
            timers: Timers::default(),
            running: true,
            info: ControllerInfo::default(),
            profile: AdvertisingProfile::primary(),
            adv_data: Bytes::new(),
            scan_response: Bytes::new(),
            scan_type: ScanType::Passive,
            found_devices: BTreeMap::new(),
            connect_list: Vec::new(),
            connection_handle: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn found_devices(&self) -> &BTreeMap<DeviceKey, DeviceRecord> {
        &self.found_devices
    }

    /// Advertising data last handed to the controller.
    pub fn advertising_data(&self) -> &Bytes {
        &self.adv_data
    }

    pub fn scan_response(&self) -> &Bytes {
        &self.scan_response
    }

    pub fn connection_handle(&self) -> Option<u16> {
        self.connection_handle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Runs the sequence for the configured role.
    pub fn start(&mut self) {
        info!("starting as {}", self.config.role);
        self.reset();
        match self.config.role {
            Role::Advertiser => self.advertise(),
            Role::AlternateAdvertiser => self.advertise_alternate(),
            Role::Scanner => self.scan(ScanType::Passive),
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("stopping");
        }
        self.running = false;
    }

    /// Runs deferred callbacks and fires expired timers.
    pub fn service(&mut self, now: Instant) {
        pipeline::run_deferred(self);

        for role in self.timers.take_due(now) {
            debug!("timer {:?} expired", role);
            match role {
                TimerRole::ConnectTimeout => self.cancel_connect(),
                TimerRole::Supervision => self.disconnect(),
                TimerRole::ScanCycle => self.end_scan_cycle(),
                TimerRole::Shutdown => self.shutdown(),
            }
        }
    }

    fn arm(&mut self, role: TimerRole, after: Duration) {
        self.timers.start(role, after, Instant::now());
    }
}

impl Upper for ConnectionManager {
    fn pipeline(&mut self) -> &mut Pipeline<Self> {
        &mut self.pipeline
    }
}

impl Handler for ConnectionManager {
    fn handle_input(&mut self, _fd: RawFd, frame: Bytes) {
        self.pipeline.feed(&frame);
        while let Some(event) = self.pipeline.next_event() {
            pipeline::dispatch(self, &event);
        }
    }

    fn handle_close(&mut self, fd: RawFd) {
        warn!("HCI transport {} lost", fd);
        self.pipeline.stop();
        self.stop();
    }
}

/// A connection manager bound to one transport.
pub struct Host {
    reactor: Reactor,
    manager: ConnectionManager,
}

impl Host {
    /// Opens a TCP connection to the controller named in `config`.
    pub fn connect(config: &Config) -> Result<Host> {
        info!("connecting to {}:{}", config.host, config.port);
        let stream = TcpStream::connect((config.host.as_str(), config.port))?;
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        Host::new(Arc::new(stream), config.clone())
    }

    /// Binds to an already connected transport, which must be in
    /// non-blocking mode.
    pub fn new(transport: Arc<dyn Transport>, config: Config) -> Result<Host> {
        let mut reactor = Reactor::new();
        reactor.register(transport.clone());

        let mut manager = ConnectionManager::new(config);
        manager.pipeline.start(transport)?;

        Ok(Host { reactor, manager })
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }

    pub fn reset(&mut self) {
        self.manager.reset();
    }

    pub fn advertise(&mut self) {
        self.manager.advertise();
    }

    pub fn advertise_alternate(&mut self) {
        self.manager.advertise_alternate();
    }

    pub fn scan(&mut self, scan_type: ScanType) {
        self.manager.scan(scan_type);
    }

    pub fn start(&mut self) {
        self.manager.start();
    }

    pub fn stop(&mut self) {
        self.manager.stop();
    }

    /// One reactor iteration followed by timer and sentinel servicing.
    /// Returns `Ok(false)` once no transport is left.
    pub fn poll(&mut self, timeout: Duration) -> Result<bool> {
        let timeout = match self.manager.timers.next_deadline() {
            Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => timeout,
        };
        let active = self.reactor.poll_once(&mut self.manager, timeout)?;
        self.manager.service(Instant::now());
        Ok(active)
    }

    /// Polls until stopped or the transport is gone, then stops the worker.
    pub fn run(&mut self) -> Result<()> {
        while self.manager.is_running() {
            if !self.poll(POLL_INTERVAL)? {
                break;
            }
        }

        self.manager.pipeline.stop();
        Ok(())
    }
}
