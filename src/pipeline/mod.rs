//! Command dispatch with controller flow control.
//!
//! Commands are queued by priority and written by a dedicated worker thread,
//! one per unit of credit granted by the controller. Every Command Complete
//! or Command Status event completes the oldest command still awaiting an
//! answer and resets the credit from its `num_hci_commands` field. All other
//! events are routed through a callback table keyed by [`EventKey`].
//!
//! The pipeline is generic over the context `H` its callbacks run against.
//! Callbacks only ever run on the thread that calls [`dispatch`] and
//! [`run_deferred`], never on the worker.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use bytes::*;

pub use self::queue::*;

use crate::interface::{next_frame, Command, Event, EventKey, Frame};
use crate::reactor::Transport;
use crate::{Error, Result};

mod queue;
mod worker;

/// Runs once a command has been answered, or with `None` for a sentinel.
pub type Completion<H> = Box<dyn FnOnce(&mut H, Option<&Event>) + Send>;

/// Handles an event that does not answer a command.
pub type EventCallback<H> = fn(&mut H, &Event);

/// A queued command, or a sentinel when `command` is `None`.
pub(crate) struct Item<H> {
    command: Option<Command>,
    callback: Option<Completion<H>>,
}

struct Awaiting<H> {
    opcode: u16,
    callback: Option<Completion<H>>,
}

struct Flow<H> {
    credit: u8,
    awaiting: VecDeque<Awaiting<H>>,
}

pub(crate) struct Shared<H> {
    queue: CommandQueue<Item<H>>,
    flow: Mutex<Flow<H>>,
    wake: Condvar,
    deferred: Mutex<VecDeque<Completion<H>>>,
    running: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Implemented by the context that owns a [`Pipeline`] over itself.
pub trait Upper: Sized + 'static {
    fn pipeline(&mut self) -> &mut Pipeline<Self>;
}

pub struct Pipeline<H> {
    shared: Arc<Shared<H>>,
    callbacks: HashMap<EventKey, EventCallback<H>>,
    inbound: BytesMut,
    worker: Option<JoinHandle<()>>,
}

impl<H: 'static> Pipeline<H> {
    pub fn new() -> Self {
        Pipeline {
            shared: Arc::new(Shared {
                queue: CommandQueue::new(PRIORITY_CLASSES),
                flow: Mutex::new(Flow {
                    credit: 1,
                    awaiting: VecDeque::new(),
                }),
                wake: Condvar::new(),
                deferred: Mutex::new(VecDeque::new()),
                running: AtomicBool::new(false),
            }),
            callbacks: HashMap::new(),
            inbound: BytesMut::new(),
            worker: None,
        }
    }

    /// Spawns the worker thread writing to `transport`.
    pub fn start(&mut self, transport: Arc<dyn Transport>) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::SeqCst);
        let shared = self.shared.clone();
        let worker = thread::Builder::new()
            .name("hci-worker".into())
            .spawn(move || worker::run(shared, transport))
            .map_err(|source| Error::IO { source })?;
        self.worker = Some(worker);

        Ok(())
    }

    /// Stops the worker and waits for it to exit. Commands still queued are
    /// discarded.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.queue.close();
        self.wake();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("command worker panicked");
            }
        }
    }

    /// Whether the worker is still able to send.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn send(&self, command: Command, priority: usize) {
        self.shared.queue.put(
            priority,
            Item {
                command: Some(command),
                callback: None,
            },
        );
    }

    /// Queues `command`; `completion` runs with the event that answers it.
    pub fn send_with<F>(&self, command: Command, priority: usize, completion: F)
    where
        F: FnOnce(&mut H, Option<&Event>) + Send + 'static,
    {
        self.shared.queue.put(
            priority,
            Item {
                command: Some(command),
                callback: Some(Box::new(completion)),
            },
        );
    }

    /// Queues a sentinel: `callback` runs with no event once every item
    /// ahead of it has been sent.
    pub fn defer<F>(&self, priority: usize, callback: F)
    where
        F: FnOnce(&mut H, Option<&Event>) + Send + 'static,
    {
        self.shared.queue.put(
            priority,
            Item {
                command: None,
                callback: Some(Box::new(callback)),
            },
        );
    }

    /// Routes events with `key` to `callback`, replacing any previous one.
    pub fn register(&mut self, key: EventKey, callback: EventCallback<H>) {
        self.callbacks.insert(key, callback);
    }

    pub fn unregister(&mut self, key: EventKey) {
        self.callbacks.remove(&key);
    }

    pub fn credit(&self) -> u8 {
        lock(&self.shared.flow).credit
    }

    /// Number of sent commands still waiting for their completion event.
    pub fn awaiting(&self) -> usize {
        lock(&self.shared.flow).awaiting.len()
    }

    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Appends bytes received from the controller.
    pub fn feed(&mut self, data: &[u8]) {
        self.inbound.extend_from_slice(data);
    }

    /// Decodes the next complete event from the received bytes. Packets that
    /// are not events, and events this crate does not know, are skipped.
    pub fn next_event(&mut self) -> Option<Event> {
        loop {
            match next_frame(&mut self.inbound) {
                Ok(None) => return None,
                Ok(Some(Frame::Event { code, params })) => match Event::decode(code, params) {
                    Ok(Some(event)) => {
                        debug!("recv {}", event);
                        return Some(event);
                    }
                    Ok(None) => debug!("ignoring event {:#04x}", code),
                    Err(err) => warn!("dropping malformed event {:#04x}: {}", code, err),
                },
                Ok(Some(Frame::AclData { handle, data })) => {
                    debug!("ignoring {} bytes of ACL data on {:#06x}", data.len(), handle)
                }
                Ok(Some(Frame::Command { opcode, .. })) => {
                    warn!("ignoring command packet {:#06x} from controller", opcode)
                }
                Err(err) => {
                    warn!("{} Discarding {} buffered bytes.", err, self.inbound.len());
                    self.inbound.clear();
                    return None;
                }
            }
        }
    }

    /// Pops the completion for a Command Complete or Command Status event
    /// and takes the credit it grants.
    fn complete(&self, event: &Event) -> Option<Completion<H>> {
        let num_hci_commands = event.num_hci_commands()?;
        let mut flow = lock(&self.shared.flow);

        let callback = match flow.awaiting.pop_front() {
            Some(awaiting) => {
                if Some(awaiting.opcode) != event.command_opcode() {
                    warn!(
                        "completion for {:#06x} arrived while {:#06x} was awaited",
                        event.command_opcode().unwrap_or_default(),
                        awaiting.opcode
                    );
                }
                awaiting.callback
            }
            None => {
                warn!("completion arrived with no command awaiting: {}", event);
                None
            }
        };

        flow.credit = if num_hci_commands >= 1 { 1 } else { 0 };
        callback
    }

    fn wake(&self) {
        let _flow = lock(&self.shared.flow);
        self.shared.wake.notify_all();
    }

    fn take_deferred(&self) -> Vec<Completion<H>> {
        lock(&self.shared.deferred).drain(..).collect()
    }
}

impl<H: 'static> Default for Pipeline<H> {
    fn default() -> Self {
        Pipeline::new()
    }
}

impl<H> Drop for Pipeline<H> {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.queue.close();
        {
            let _flow = lock(&self.shared.flow);
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Routes a decoded event: completion events to the oldest awaiting command,
/// everything else to the registered callback. Wakes the worker afterwards.
pub fn dispatch<H: Upper>(host: &mut H, event: &Event) {
    if event.num_hci_commands().is_some() {
        if let Some(completion) = host.pipeline().complete(event) {
            completion(host, Some(event));
        }
    } else if let Some(callback) = host.pipeline().callbacks.get(&event.key()).copied() {
        callback(host, event);
    }

    host.pipeline().wake();
}

/// Runs sentinel callbacks the worker has reached since the last call.
pub fn run_deferred<H: Upper>(host: &mut H) {
    let deferred = host.pipeline().take_deferred();
    for callback in deferred {
        callback(host, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{CommandComplete, Opcode, ReturnParameters, Status};
    use crate::Address;
    use std::io::Read;
    use std::os::unix::net::UnixStream;
    use std::time::{Duration, Instant};

    struct TestHost {
        pipeline: Pipeline<TestHost>,
        address: Option<Address>,
        reports: usize,
        sentinels: usize,
    }

    impl Upper for TestHost {
        fn pipeline(&mut self) -> &mut Pipeline<Self> {
            &mut self.pipeline
        }
    }

    fn setup() -> (TestHost, UnixStream) {
        let (local, remote) = UnixStream::pair().unwrap();
        local.set_nonblocking(true).unwrap();
        remote
            .set_read_timeout(Some(Duration::from_millis(300)))
            .unwrap();

        let mut host = TestHost {
            pipeline: Pipeline::new(),
            address: None,
            reports: 0,
            sentinels: 0,
        };
        host.pipeline.start(Arc::new(local)).unwrap();
        (host, remote)
    }

    fn read_packet(remote: &mut UnixStream) -> Option<Vec<u8>> {
        let mut header = [0u8; 4];
        remote.read_exact(&mut header).ok()?;
        let mut params = vec![0u8; header[3] as usize];
        remote.read_exact(&mut params).ok()?;
        let mut packet = header.to_vec();
        packet.extend(params);
        Some(packet)
    }

    fn deliver(host: &mut TestHost, event: Event) {
        let bytes = event.encode().unwrap();
        host.pipeline.feed(&bytes);
        while let Some(event) = host.pipeline.next_event() {
            dispatch(host, &event);
        }
    }

    fn complete(opcode: Opcode, num_hci_commands: u8, ret: ReturnParameters) -> Event {
        Event::CommandComplete(CommandComplete {
            num_hci_commands,
            opcode,
            status: Status::SUCCESS,
            ret,
        })
    }

    #[test]
    pub fn credit_gates_sending() {
        let (mut host, mut remote) = setup();
        host.pipeline.send(Command::Reset, DEFAULT_PRIORITY);
        host.pipeline
            .send_with(Command::ReadBdAddr, DEFAULT_PRIORITY, |host, event| {
                if let Some(Event::CommandComplete(CommandComplete {
                    ret: ReturnParameters::BdAddr(address),
                    ..
                })) = event
                {
                    host.address = Some(*address);
                }
            });

        assert_eq!(read_packet(&mut remote), Some(vec![0x01, 0x03, 0x0C, 0x00]));
        // no credit left until the controller answers
        assert_eq!(read_packet(&mut remote), None);
        assert_eq!(host.pipeline.credit(), 0);
        assert_eq!(host.pipeline.awaiting(), 1);

        deliver(&mut host, complete(Opcode::Reset, 1, ReturnParameters::None));
        assert_eq!(read_packet(&mut remote), Some(vec![0x01, 0x09, 0x10, 0x00]));

        let address = Address::from_u64(0x0011_2233_4455);
        deliver(&mut host, complete(Opcode::ReadBdAddr, 1, ReturnParameters::BdAddr(address)));
        assert_eq!(host.address, Some(address));
        assert_eq!(host.pipeline.awaiting(), 0);
        assert_eq!(host.pipeline.credit(), 1);
    }

    #[test]
    pub fn zero_credit_holds_queue() {
        let (mut host, mut remote) = setup();
        host.pipeline.send(Command::Reset, DEFAULT_PRIORITY);
        host.pipeline.send(Command::ReadBdAddr, DEFAULT_PRIORITY);
        assert!(read_packet(&mut remote).is_some());

        deliver(&mut host, complete(Opcode::Reset, 0, ReturnParameters::None));
        assert_eq!(host.pipeline.credit(), 0);
        assert_eq!(read_packet(&mut remote), None);

        deliver(
            &mut host,
            Event::CommandStatus {
                status: Status::SUCCESS,
                num_hci_commands: 255,
                opcode: 0x0000,
            },
        );
        assert_eq!(read_packet(&mut remote), Some(vec![0x01, 0x09, 0x10, 0x00]));
        assert_eq!(host.pipeline.credit(), 0);
        assert_eq!(host.pipeline.awaiting(), 1);
    }

    #[test]
    pub fn short_completion_still_releases_queue() {
        let (mut host, mut remote) = setup();
        host.pipeline
            .send_with(Command::ReadBdAddr, DEFAULT_PRIORITY, |host, event| {
                assert!(event.is_some());
                host.address = Some(Address::zero());
            });
        host.pipeline.send(Command::Reset, DEFAULT_PRIORITY);
        assert_eq!(read_packet(&mut remote), Some(vec![0x01, 0x09, 0x10, 0x00]));

        host.pipeline
            .feed(b"\x04\x0e\x06\x01\x09\x10\x01\x00\x00");
        while let Some(event) = host.pipeline.next_event() {
            dispatch(&mut host, &event);
        }

        assert_eq!(host.address, Some(Address::zero()));
        assert_eq!(read_packet(&mut remote), Some(vec![0x01, 0x03, 0x0C, 0x00]));
    }

    #[test]
    pub fn unexpected_completion_is_tolerated() {
        let (mut host, _remote) = setup();
        deliver(&mut host, complete(Opcode::Reset, 1, ReturnParameters::None));
        assert_eq!(host.pipeline.awaiting(), 0);
        assert_eq!(host.pipeline.credit(), 1);
    }

    #[test]
    pub fn event_callbacks_by_key() {
        let (mut host, _remote) = setup();
        let report = Event::LeAdvertisingReport(vec![]);

        deliver(&mut host, report.clone());
        assert_eq!(host.reports, 0);

        host.pipeline
            .register(EventKey::LE_ADVERTISING_REPORT, |host, _| host.reports += 1);
        deliver(&mut host, report.clone());
        deliver(&mut host, report.clone());
        assert_eq!(host.reports, 2);

        host.pipeline.unregister(EventKey::LE_ADVERTISING_REPORT);
        deliver(&mut host, report);
        assert_eq!(host.reports, 2);
    }

    #[test]
    pub fn sentinels_run_on_caller_thread() {
        let (mut host, mut remote) = setup();
        host.pipeline.send(Command::Reset, DEFAULT_PRIORITY);
        host.pipeline
            .defer(DEFAULT_PRIORITY, |host, event| {
                assert!(event.is_none());
                host.sentinels += 1;
            });
        assert!(read_packet(&mut remote).is_some());
        deliver(&mut host, complete(Opcode::Reset, 1, ReturnParameters::None));

        let deadline = Instant::now() + Duration::from_secs(2);
        while host.sentinels == 0 && Instant::now() < deadline {
            run_deferred(&mut host);
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(host.sentinels, 1);
    }

    #[test]
    pub fn unknown_indicator_discards_input() {
        let (mut host, _remote) = setup();
        host.pipeline.feed(b"\x09\x04\x0e\x04\x01\x03\x0c\x00");
        assert!(host.pipeline.next_event().is_none());
        host.pipeline.feed(b"\x04\x10\x01\x42");
        assert_eq!(
            host.pipeline.next_event(),
            Some(Event::HardwareError { hardware_code: 0x42 })
        );
    }

    #[test]
    pub fn write_failure_stops_worker() {
        let (mut host, remote) = setup();
        drop(remote);
        host.pipeline.send(Command::Reset, DEFAULT_PRIORITY);

        let deadline = Instant::now() + Duration::from_secs(2);
        while host.pipeline.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!host.pipeline.is_running());
        host.pipeline.stop();
    }
}
