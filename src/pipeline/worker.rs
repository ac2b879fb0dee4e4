use std::io;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::{lock, Awaiting, Shared};
use crate::reactor::{wait_writable, Transport};

const WRITE_WAIT: Duration = Duration::from_millis(100);

/// Body of the command worker thread. Sends one queued command per unit of
/// controller credit until stopped or until a write fails.
pub(super) fn run<H>(shared: Arc<Shared<H>>, transport: Arc<dyn Transport>) {
    debug!("command worker started");

    while shared.running.load(Ordering::SeqCst) {
        {
            let mut flow = lock(&shared.flow);
            while flow.credit == 0 && shared.running.load(Ordering::SeqCst) {
                flow = shared
                    .wake
                    .wait(flow)
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
            }
        }
        if !shared.running.load(Ordering::SeqCst) {
            break;
        }

        let item = match shared.queue.get() {
            Some(item) => item,
            None => break,
        };

        let command = match item.command {
            Some(command) => command,
            None => {
                // sentinels run on the reactor thread
                if let Some(callback) = item.callback {
                    lock(&shared.deferred).push_back(callback);
                }
                continue;
            }
        };

        let packet = match command.encode() {
            Ok(packet) => packet,
            Err(err) => {
                warn!("dropping {}: {}", command, err);
                continue;
            }
        };

        {
            let mut flow = lock(&shared.flow);
            flow.credit = flow.credit.saturating_sub(1);
            flow.awaiting.push_back(Awaiting {
                opcode: command.opcode().into(),
                callback: item.callback,
            });
        }

        debug!("send {}", command);
        if let Err(err) = send_all(&*transport, &packet, &shared) {
            warn!("write to controller failed: {}", err);
            shared.running.store(false, Ordering::SeqCst);
            if let Err(err) = transport.shutdown() {
                debug!("shutdown after failed write: {}", err);
            }
            break;
        }
    }

    debug!("command worker stopped");
}

fn send_all<H>(transport: &dyn Transport, mut data: &[u8], shared: &Shared<H>) -> io::Result<()> {
    while !data.is_empty() {
        match transport.send(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(sent) => data = &data[sent..],
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                if !shared.running.load(Ordering::SeqCst) {
                    return Err(io::ErrorKind::BrokenPipe.into());
                }
                wait_writable(transport.as_raw_fd(), WRITE_WAIT)?;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
