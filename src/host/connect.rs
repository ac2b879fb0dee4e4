use super::{ConnectionManager, TimerRole};
use crate::config::{CONNECT_TIMEOUT, SUPERVISION_TIMEOUT};
use crate::interface::*;
use crate::pipeline::DEFAULT_PRIORITY;

impl ConnectionManager {
    /// Moves every recorded device into the connect list and starts on the
    /// first one.
    pub(super) fn connect_each(&mut self) {
        let found = std::mem::take(&mut self.found_devices);
        self.connect_list.extend(found.into_values());
        self.connect_next();
    }

    /// Connects to the next device in the list, or goes back to scanning in
    /// a random mode when the list is exhausted.
    fn connect_next(&mut self) {
        let device = match self.connect_list.pop() {
            Some(device) => device,
            None => {
                let scan_type = if rand::random::<bool>() {
                    ScanType::Active
                } else {
                    ScanType::Passive
                };
                self.scan(scan_type);
                return;
            }
        };

        info!("connecting to {}", device);
        self.pipeline.register(
            EventKey::LE_CONNECTION_COMPLETE,
            ConnectionManager::got_connection,
        );
        self.pipeline.register(
            EventKey::DISCONNECTION_COMPLETE,
            ConnectionManager::disconnect_complete,
        );
        self.pipeline.send_with(
            Command::LeCreateConnection(ConnectionParameters::to(
                device.key.address(),
                device.key.address_type(),
            )),
            DEFAULT_PRIORITY,
            ConnectionManager::connection_pending,
        );
    }

    fn connection_pending(&mut self, event: Option<&Event>) {
        match event.and_then(Event::status) {
            Some(status) if status.is_success() => {
                self.arm(TimerRole::ConnectTimeout, CONNECT_TIMEOUT);
            }
            Some(status) => {
                warn!("create connection rejected: {}", status);
                self.connect_next();
            }
            None => self.connect_next(),
        }
    }

    /// Gives up on the pending connection attempt. The controller answers
    /// with a failed LE Connection Complete.
    pub(super) fn cancel_connect(&mut self) {
        info!("connection attempt timed out");
        self.pipeline
            .send(Command::LeCreateConnectionCancel, DEFAULT_PRIORITY);
    }

    fn got_connection(&mut self, event: &Event) {
        let complete = match event {
            Event::LeConnectionComplete(complete) => complete,
            _ => return,
        };
        self.timers.cancel(TimerRole::ConnectTimeout);

        if complete.status.is_success() {
            info!(
                "connected to {} as {:#06x}",
                complete.peer_address, complete.connection_handle
            );
            self.connection_handle = Some(complete.connection_handle);
            self.arm(TimerRole::Supervision, SUPERVISION_TIMEOUT);
        } else {
            info!(
                "connection to {} failed: {}",
                complete.peer_address, complete.status
            );
            self.connect_next();
        }
    }

    /// Ends the connection held by the supervision timer.
    pub(super) fn disconnect(&mut self) {
        if let Some(connection_handle) = self.connection_handle {
            self.pipeline.send(
                Command::Disconnect {
                    connection_handle,
                    reason: ErrorCode::RemoteUserTerminatedConnection as u8,
                },
                DEFAULT_PRIORITY,
            );
        }
    }

    fn disconnect_complete(&mut self, event: &Event) {
        if let Event::DisconnectionComplete {
            connection_handle,
            reason,
            ..
        } = event
        {
            info!("connection {:#06x} closed: {}", connection_handle, reason);
        }
        self.timers.cancel(TimerRole::Supervision);
        self.connection_handle = None;
        self.connect_next();
    }
}
