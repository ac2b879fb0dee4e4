use bytes::*;
use num_traits::FromPrimitive;

use crate::{Error, Result};

/// Parameter blocks carry a one-byte length.
pub const MAX_PARAM_LEN: usize = 255;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum PacketIndicator {
    Command = 0x01,
    AclData = 0x02,
    Event = 0x04,
}

/// One complete packet split off the front of a byte stream.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Frame {
    Command { opcode: u16, params: Bytes },
    AclData { handle: u16, data: Bytes },
    Event { code: u8, params: Bytes },
}

/// Splits the next complete packet off `buf`. Leaves `buf` untouched and
/// returns `Ok(None)` while the packet at its front is incomplete.
///
/// An unrecognised indicator byte is an error; the stream cannot be
/// resynchronised after it, so callers should discard what they buffered.
pub fn next_frame(buf: &mut BytesMut) -> Result<Option<Frame>> {
    let indicator = match buf.first() {
        Some(indicator) => *indicator,
        None => return Ok(None),
    };

    match FromPrimitive::from_u8(indicator) {
        Some(PacketIndicator::Command) => {
            // [indicator][opcode:2][len:1][params]
            if buf.len() < 4 || buf.len() < 4 + buf[3] as usize {
                return Ok(None);
            }
            let len = buf[3] as usize;
            let mut packet = buf.split_to(4 + len).freeze();
            packet.advance(1);
            let opcode = packet.get_u16_le();
            packet.advance(1);
            Ok(Some(Frame::Command {
                opcode,
                params: packet,
            }))
        }
        Some(PacketIndicator::AclData) => {
            // [indicator][handle:2][len:2][data]
            if buf.len() < 5 {
                return Ok(None);
            }
            let len = u16::from_le_bytes([buf[3], buf[4]]) as usize;
            if buf.len() < 5 + len {
                return Ok(None);
            }
            let mut packet = buf.split_to(5 + len).freeze();
            packet.advance(1);
            let handle = packet.get_u16_le();
            packet.advance(2);
            Ok(Some(Frame::AclData {
                handle,
                data: packet,
            }))
        }
        Some(PacketIndicator::Event) => {
            // [indicator][code:1][len:1][params]
            if buf.len() < 3 || buf.len() < 3 + buf[2] as usize {
                return Ok(None);
            }
            let len = buf[2] as usize;
            let mut packet = buf.split_to(3 + len).freeze();
            packet.advance(1);
            let code = packet.get_u8();
            packet.advance(1);
            Ok(Some(Frame::Event {
                code,
                params: packet,
            }))
        }
        None => Err(Error::UnknownPacketIndicator { indicator }),
    }
}

fn check_len(params: &[u8]) -> Result<u8> {
    if params.len() > MAX_PARAM_LEN {
        return Err(Error::ParameterTooLong {
            len: params.len(),
            max_len: MAX_PARAM_LEN,
        });
    }

    Ok(params.len() as u8)
}

pub fn encode_command(opcode: u16, params: &[u8]) -> Result<Bytes> {
    let len = check_len(params)?;
    let mut buf = BytesMut::with_capacity(4 + params.len());

    buf.put_u8(PacketIndicator::Command as u8);
    buf.put_u16_le(opcode);
    buf.put_u8(len);
    buf.put_slice(params);

    Ok(buf.freeze())
}

pub fn encode_event(code: u8, params: &[u8]) -> Result<Bytes> {
    let len = check_len(params)?;
    let mut buf = BytesMut::with_capacity(3 + params.len());

    buf.put_u8(PacketIndicator::Event as u8);
    buf.put_u8(code);
    buf.put_u8(len);
    buf.put_slice(params);

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn partial_packets_stay_buffered() {
        let mut buf = BytesMut::from(&b"\x04\x0e\x04\x01\x03"[..]);
        assert_eq!(next_frame(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 5);

        buf.extend_from_slice(b"\x0c\x00\x04");
        assert_eq!(
            next_frame(&mut buf).unwrap(),
            Some(Frame::Event {
                code: 0x0e,
                params: Bytes::from_static(b"\x01\x03\x0c\x00"),
            })
        );
        assert_eq!(&buf[..], b"\x04");
        assert_eq!(next_frame(&mut buf).unwrap(), None);
    }

    #[test]
    pub fn acl_packets_are_framed() {
        let mut buf = BytesMut::from(&b"\x02\x40\x00\x02\x00\xaa\xbb\x01\x03\x0c\x00"[..]);
        assert_eq!(
            next_frame(&mut buf).unwrap(),
            Some(Frame::AclData {
                handle: 0x0040,
                data: Bytes::from_static(b"\xaa\xbb"),
            })
        );
        assert_eq!(
            next_frame(&mut buf).unwrap(),
            Some(Frame::Command {
                opcode: 0x0c03,
                params: Bytes::new(),
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    pub fn unknown_indicator() {
        let mut buf = BytesMut::from(&b"\x07\x00"[..]);
        match next_frame(&mut buf) {
            Err(Error::UnknownPacketIndicator { indicator: 0x07 }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    pub fn parameter_length_limit() {
        assert_eq!(encode_event(0x3e, &[0u8; 255]).unwrap().len(), 258);
        assert!(matches!(
            encode_command(0x0c03, &[0u8; 256]),
            Err(Error::ParameterTooLong { len: 256, max_len: 255 })
        ));
    }
}
