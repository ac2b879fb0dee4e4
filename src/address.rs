use std::fmt::{Display, Formatter};

use bytes::{Buf, BufMut};

/// A 48-bit Bluetooth device address. The bytes are kept in wire order, so
/// `bytes[0]` is the least significant octet.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Address {
    bytes: [u8; 6],
}

impl Address {
    pub const MAX: u64 = 0xFFFF_FFFF_FFFF;

    pub const fn new(bytes: [u8; 6]) -> Address {
        Address { bytes }
    }

    pub const fn zero() -> Address {
        Address { bytes: [0u8; 6] }
    }

    /// Builds an address from the low 48 bits of `value`.
    pub fn from_u64(value: u64) -> Address {
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&value.to_le_bytes()[..6]);
        Address { bytes }
    }

    pub fn as_u64(&self) -> u64 {
        (u64::from(self.high()) << 32) | u64::from(self.low())
    }

    /// The low 32-bit word, as it appears first on the wire.
    pub fn low(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// The high 16-bit word, as it appears after the low word on the wire.
    pub fn high(&self) -> u16 {
        u16::from_le_bytes([self.bytes[4], self.bytes[5]])
    }

    /// Reads an address as a little-endian 32-bit low word followed by a
    /// 16-bit high word. The caller must make sure 6 bytes are available.
    pub fn from_buf<B: Buf>(buf: &mut B) -> Address {
        let low = buf.get_u32_le();
        let high = buf.get_u16_le();
        Address::from_u64((u64::from(high) << 32) | u64::from(low))
    }

    pub fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.low());
        buf.put_u16_le(self.high());
    }
}

impl From<[u8; 6]> for Address {
    fn from(bytes: [u8; 6]) -> Self {
        Address { bytes }
    }
}

impl From<Address> for [u8; 6] {
    fn from(val: Address) -> Self {
        val.bytes
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum AddressType {
    Public = 0x00,
    Random = 0x01,
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType::Public
    }
}

/// Identifies a remote device independently of its address type: the
/// 48-bit address with bit 48 set when the address is random.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DeviceKey(u64);

impl DeviceKey {
    const RANDOM_BIT: u64 = 1 << 48;

    pub fn new(address: Address, address_type: AddressType) -> Self {
        match address_type {
            AddressType::Public => DeviceKey(address.as_u64()),
            AddressType::Random => DeviceKey(address.as_u64() | Self::RANDOM_BIT),
        }
    }

    pub fn address(&self) -> Address {
        Address::from_u64(self.0 & Address::MAX)
    }

    pub fn address_type(&self) -> AddressType {
        if self.0 & Self::RANDOM_BIT != 0 {
            AddressType::Random
        } else {
            AddressType::Public
        }
    }
}

impl From<DeviceKey> for u64 {
    fn from(val: DeviceKey) -> Self {
        val.0
    }
}

impl Display for DeviceKey {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self.address_type() {
            AddressType::Public => write!(f, "{} (public)", self.address()),
            AddressType::Random => write!(f, "{} (random)", self.address()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    pub fn address_bytes_symmetric() {
        let raw = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
        let addr = Address::from(raw);
        assert_eq!(<[u8; 6]>::from(addr), raw);
        assert_eq!(addr.as_ref(), &raw[..]);
        assert_eq!(addr.as_u64(), 0x6655_4433_2211);
        assert_eq!(addr.to_string(), "66:55:44:33:22:11");
    }

    #[test]
    pub fn address_wire_words() {
        for value in [0u64, Address::MAX, 0x0123_4567_89AB] {
            let addr = Address::from_u64(value);
            let mut buf = BytesMut::new();
            addr.put(&mut buf);
            assert_eq!(buf.len(), 6);
            assert_eq!(&buf[..4], &addr.low().to_le_bytes()[..]);
            assert_eq!(&buf[4..], &addr.high().to_le_bytes()[..]);
            assert_eq!(Address::from_buf(&mut buf.freeze()), addr);
        }
    }

    #[test]
    pub fn device_key_random_bit() {
        let addr = Address::from_u64(0xC0FF_EE00_1234);
        let public = DeviceKey::new(addr, AddressType::Public);
        let random = DeviceKey::new(addr, AddressType::Random);
        assert_ne!(public, random);
        assert_eq!(u64::from(random), 0x1_C0FF_EE00_1234);
        assert_eq!(random.address(), addr);
        assert_eq!(random.address_type(), AddressType::Random);
        assert_eq!(public.address_type(), AddressType::Public);
    }
}
