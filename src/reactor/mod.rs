//! A small `poll(2)` reactor over non-blocking transports.
//!
//! The reactor owns a registry of [`Channel`]s keyed by descriptor. Each call
//! to [`Reactor::poll_once`] waits a bounded time for readiness, reads and
//! frames whatever arrived, flushes pending output and closes transports that
//! failed or hung up. Received frames and closures are reported to a
//! [`Handler`] supplied by the caller.

use std::collections::BTreeMap;
use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::time::Duration;

use bytes::*;

pub use self::framing::*;
pub use self::transport::*;

use crate::util::check_error;
use crate::{Error, Result};

mod framing;
mod transport;

/// Size of a single read or write.
pub const CHUNK_SIZE: usize = 4096;

/// Receives what the reactor observes on its transports.
pub trait Handler {
    /// Called once per frame, in arrival order.
    fn handle_input(&mut self, fd: RawFd, frame: Bytes);

    /// Called after a transport has been shut down and unregistered.
    fn handle_close(&mut self, fd: RawFd);
}

/// Per-transport state held by the reactor.
pub struct Channel {
    transport: Arc<dyn Transport>,
    framer: Framer,
    outgoing: BytesMut,
    connected: bool,
    close_when_done: bool,
}

impl Channel {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Channel {
            transport,
            framer: Framer::default(),
            outgoing: BytesMut::new(),
            connected: true,
            close_when_done: false,
        }
    }

    fn interest(&self) -> libc::c_short {
        if self.outgoing.is_empty() {
            libc::POLLIN
        } else {
            libc::POLLIN | libc::POLLOUT
        }
    }
}

#[derive(Default)]
pub struct Reactor {
    channels: BTreeMap<RawFd, Channel>,
}

impl Reactor {
    pub fn new() -> Self {
        Reactor::default()
    }

    /// Adds a transport to the registry. The transport must already be in
    /// non-blocking mode.
    pub fn register(&mut self, transport: Arc<dyn Transport>) -> RawFd {
        let fd = transport.as_raw_fd();
        self.channels.insert(fd, Channel::new(transport));
        fd
    }

    pub fn set_terminator(&mut self, fd: RawFd, terminator: Option<Terminator>) -> Result<()> {
        self.channel(fd)?.framer.set_terminator(terminator);
        Ok(())
    }

    /// Queues `data` for sending once the transport is writable.
    pub fn write(&mut self, fd: RawFd, data: &[u8]) -> Result<()> {
        self.channel(fd)?.outgoing.extend_from_slice(data);
        Ok(())
    }

    /// Closes the transport once its queued output has been sent.
    pub fn close_when_done(&mut self, fd: RawFd) -> Result<()> {
        self.channel(fd)?.close_when_done = true;
        Ok(())
    }

    pub fn transport(&self, fd: RawFd) -> Option<Arc<dyn Transport>> {
        self.channels.get(&fd).map(|channel| channel.transport.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    fn channel(&mut self, fd: RawFd) -> Result<&mut Channel> {
        self.channels.get_mut(&fd).ok_or(Error::TransportClosed)
    }

    /// Shuts a transport down, unregisters it and notifies `handler`.
    /// Closing an unknown descriptor does nothing.
    pub fn close<H: Handler>(&mut self, fd: RawFd, handler: &mut H) {
        if let Some(mut channel) = self.channels.remove(&fd) {
            channel.connected = false;
            if let Err(err) = channel.transport.shutdown() {
                debug!("shutdown of transport {} failed: {}", fd, err);
            }
            drop(channel);
            handler.handle_close(fd);
        }
    }

    /// Waits up to `timeout` for readiness and services every ready
    /// transport. Returns `Ok(false)` without waiting when nothing is
    /// registered.
    pub fn poll_once<H: Handler>(&mut self, handler: &mut H, timeout: Duration) -> io::Result<bool> {
        if self.channels.is_empty() {
            return Ok(false);
        }

        let mut pollfds: Vec<libc::pollfd> = self
            .channels
            .iter()
            .filter(|(_, channel)| channel.connected)
            .map(|(fd, channel)| libc::pollfd {
                fd: *fd,
                events: channel.interest(),
                revents: 0,
            })
            .collect();

        let ready = unsafe {
            libc::poll(
                pollfds.as_mut_ptr(),
                pollfds.len() as libc::nfds_t,
                timeout.as_millis() as libc::c_int,
            )
        };

        match check_error(ready) {
            Ok(0) => return Ok(true),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return Ok(true),
            Err(err) => return Err(err),
        }

        for pollfd in pollfds.iter().filter(|pollfd| pollfd.revents != 0) {
            let fd = pollfd.fd;

            if pollfd.revents & (libc::POLLIN | libc::POLLHUP) != 0 {
                self.handle_read(fd, handler);
            }
            if pollfd.revents & libc::POLLOUT != 0 {
                self.handle_write(fd, handler);
            }
            if pollfd.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
                self.close(fd, handler);
            }
        }

        Ok(true)
    }

    fn handle_read<H: Handler>(&mut self, fd: RawFd, handler: &mut H) {
        let channel = match self.channels.get_mut(&fd) {
            Some(channel) => channel,
            None => return,
        };

        let mut buf = [0u8; CHUNK_SIZE];
        match channel.transport.recv(&mut buf) {
            Ok(0) => {
                debug!("transport {} reached end of stream", fd);
                self.close(fd, handler);
            }
            Ok(len) => {
                channel.framer.push(&buf[..len]);
                while let Some(frame) = channel.framer.next_frame() {
                    handler.handle_input(fd, frame);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => {
                warn!("read from transport {} failed: {}", fd, err);
                self.close(fd, handler);
            }
        }
    }

    fn handle_write<H: Handler>(&mut self, fd: RawFd, handler: &mut H) {
        let channel = match self.channels.get_mut(&fd) {
            Some(channel) => channel,
            None => return,
        };

        if !channel.outgoing.is_empty() {
            let len = channel.outgoing.len().min(CHUNK_SIZE);
            match channel.transport.send(&channel.outgoing[..len]) {
                Ok(sent) => channel.outgoing.advance(sent),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return,
                Err(err) => {
                    warn!("write to transport {} failed: {}", fd, err);
                    self.close(fd, handler);
                    return;
                }
            }
        }

        if channel.outgoing.is_empty() && channel.close_when_done {
            self.close(fd, handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(RawFd, Bytes)>,
        closed: Vec<RawFd>,
    }

    impl Handler for Recorder {
        fn handle_input(&mut self, fd: RawFd, frame: Bytes) {
            self.frames.push((fd, frame));
        }

        fn handle_close(&mut self, fd: RawFd) {
            self.closed.push(fd);
        }
    }

    fn pair() -> (Arc<dyn Transport>, UnixStream) {
        let (local, remote) = UnixStream::pair().unwrap();
        local.set_nonblocking(true).unwrap();
        (Arc::new(local), remote)
    }

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[test]
    pub fn empty_reactor_returns_immediately() {
        let mut reactor = Reactor::new();
        let mut recorder = Recorder::default();
        assert!(!reactor.poll_once(&mut recorder, TIMEOUT).unwrap());
    }

    #[test]
    pub fn delimited_frames_are_delivered() {
        let (local, mut remote) = pair();
        let mut reactor = Reactor::new();
        let mut recorder = Recorder::default();
        let fd = reactor.register(local);
        reactor
            .set_terminator(fd, Some(Terminator::Delimiter(Bytes::from_static(b"\r\n"))))
            .unwrap();

        remote.write_all(b"ab\r\ncd").unwrap();
        assert!(reactor.poll_once(&mut recorder, TIMEOUT).unwrap());
        remote.write_all(b"\r\n").unwrap();
        assert!(reactor.poll_once(&mut recorder, TIMEOUT).unwrap());

        let frames: Vec<Bytes> = recorder.frames.into_iter().map(|(_, frame)| frame).collect();
        assert_eq!(frames, vec![&b"ab"[..], &b"cd"[..]]);
    }

    #[test]
    pub fn fixed_length_frames_are_delivered() {
        let (local, mut remote) = pair();
        let mut reactor = Reactor::new();
        let mut recorder = Recorder::default();
        let fd = reactor.register(local);
        reactor.set_terminator(fd, Some(Terminator::Length(4))).unwrap();

        remote.write_all(b"abcdefgh").unwrap();
        assert!(reactor.poll_once(&mut recorder, TIMEOUT).unwrap());

        let frames: Vec<Bytes> = recorder.frames.into_iter().map(|(_, frame)| frame).collect();
        assert_eq!(frames, vec![&b"abcd"[..], &b"efgh"[..]]);
    }

    #[test]
    pub fn output_is_flushed_then_closed() {
        let (local, mut remote) = pair();
        let mut reactor = Reactor::new();
        let mut recorder = Recorder::default();
        let fd = reactor.register(local);

        reactor.write(fd, b"hello").unwrap();
        reactor.close_when_done(fd).unwrap();
        assert!(reactor.poll_once(&mut recorder, TIMEOUT).unwrap());

        let mut received = Vec::new();
        remote.read_to_end(&mut received).unwrap();
        assert_eq!(received, b"hello");
        assert_eq!(recorder.closed, vec![fd]);
        assert!(reactor.is_empty());
        assert!(matches!(reactor.write(fd, b"x"), Err(Error::TransportClosed)));
    }

    #[test]
    pub fn peer_hangup_closes_transport() {
        let (local, remote) = pair();
        let mut reactor = Reactor::new();
        let mut recorder = Recorder::default();
        let fd = reactor.register(local);

        drop(remote);
        assert!(reactor.poll_once(&mut recorder, TIMEOUT).unwrap());
        assert_eq!(recorder.closed, vec![fd]);
        assert!(!reactor.poll_once(&mut recorder, TIMEOUT).unwrap());
    }
}
