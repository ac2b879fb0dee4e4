use bytes::*;
use enumflags2::{bitflags, BitFlags};
use num_traits::FromPrimitive;

#[bitflags]
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdFlags {
    LeLimitedDiscoverableMode = 1 << 0,
    LeGeneralDiscoverableMode = 1 << 1,
    BrEdrNotSupported = 1 << 2,
    SimultaneousLeBrEdrController = 1 << 3,
    SimultaneousLeBrEdrHost = 1 << 4,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum AdType {
    Flags = 0x01,
    Uuid16Incomplete = 0x02,
    Uuid16Complete = 0x03,
    PartialName = 0x08,
    FullName = 0x09,
    TxPowerLevel = 0x0A,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum AdError {
    #[error("AD structure of length {} overruns the {} remaining bytes.", len, remaining)]
    Overrun { len: usize, remaining: usize },
    #[error("Unexpected data length {} for AD type {:?}.", len, ad_type)]
    UnexpectedDataLength { ad_type: AdType, len: usize },
}

/// Longest data a single AD structure can carry; the length byte also counts
/// the type.
pub const MAX_AD_DATA_LEN: usize = 254;

/// Builds a sequence of `[length][type][data]` AD structures.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AdvertisingData {
    buf: BytesMut,
}

impl AdvertisingData {
    pub fn new() -> Self {
        AdvertisingData::default()
    }

    /// Appends one structure. Data past [`MAX_AD_DATA_LEN`] bytes is dropped
    /// so that the length byte cannot overflow.
    pub fn push(&mut self, ad_type: AdType, data: &[u8]) -> &mut Self {
        let data = &data[..data.len().min(MAX_AD_DATA_LEN)];
        self.buf.put_u8(data.len() as u8 + 1);
        self.buf.put_u8(ad_type as u8);
        self.buf.put_slice(data);
        self
    }

    pub fn flags(&mut self, flags: BitFlags<AdFlags>) -> &mut Self {
        self.push(AdType::Flags, &[flags.bits()])
    }

    pub fn tx_power(&mut self, level: i8) -> &mut Self {
        self.push(AdType::TxPowerLevel, &level.to_le_bytes())
    }

    pub fn partial_name(&mut self, name: &str) -> &mut Self {
        self.push(AdType::PartialName, name.as_bytes())
    }

    pub fn full_name(&mut self, name: &str) -> &mut Self {
        self.push(AdType::FullName, name.as_bytes())
    }

    /// Adds a complete list of 16-bit service UUIDs. Nothing is added for an
    /// empty list.
    pub fn services(&mut self, uuids: &[u16]) -> &mut Self {
        if uuids.is_empty() {
            return self;
        }
        let mut data = BytesMut::with_capacity(uuids.len() * 2);
        for uuid in uuids {
            data.put_u16_le(*uuid);
        }
        self.push(AdType::Uuid16Complete, &data)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }
}

/// The fields of interest found in an advertising payload.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AdvertisingFields {
    pub flags: Option<BitFlags<AdFlags>>,
    pub partial_name: Option<String>,
    pub full_name: Option<String>,
    pub tx_power: Option<i8>,
    pub uuid16: Vec<u16>,
}

pub fn parse<T: Buf>(mut buf: T) -> Result<AdvertisingFields, AdError> {
    let mut fields = AdvertisingFields::default();

    while buf.has_remaining() {
        // [len][type][len - 1 bytes of data], zero length ends the payload
        let len = buf.get_u8() as usize;
        if len == 0 {
            break;
        }
        if len > buf.remaining() {
            return Err(AdError::Overrun {
                len,
                remaining: buf.remaining(),
            });
        }

        let ad_type = buf.get_u8();
        let mut data = buf.copy_to_bytes(len - 1);

        match FromPrimitive::from_u8(ad_type) {
            Some(AdType::Flags) => {
                if data.is_empty() {
                    return Err(AdError::UnexpectedDataLength {
                        ad_type: AdType::Flags,
                        len: 0,
                    });
                }
                fields.flags = Some(BitFlags::from_bits_truncate(data.get_u8()));
            }
            Some(ad_type @ AdType::Uuid16Incomplete) | Some(ad_type @ AdType::Uuid16Complete) => {
                if data.len() % 2 != 0 {
                    return Err(AdError::UnexpectedDataLength {
                        ad_type,
                        len: data.len(),
                    });
                }
                while data.has_remaining() {
                    fields.uuid16.push(data.get_u16_le());
                }
            }
            Some(AdType::PartialName) => {
                fields.partial_name = Some(String::from_utf8_lossy(&data).to_string());
            }
            Some(AdType::FullName) => {
                fields.full_name = Some(String::from_utf8_lossy(&data).to_string());
            }
            Some(AdType::TxPowerLevel) => {
                if data.len() != 1 {
                    return Err(AdError::UnexpectedDataLength {
                        ad_type: AdType::TxPowerLevel,
                        len: data.len(),
                    });
                }
                fields.tx_power = Some(data.get_i8());
            }
            None => {
                // skip unknown AD types
            }
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn ad_name_test() {
        let fields = parse(Bytes::from_static(b"\x04\x09ABC")).unwrap();
        assert!(fields.flags.is_none());
        assert!(fields.partial_name.is_none());
        assert_eq!(fields.full_name.as_deref(), Some("ABC"));
        assert!(fields.tx_power.is_none());
        assert!(fields.uuid16.is_empty());
    }

    #[test]
    pub fn ad_multiple_test() {
        let fields = parse(Bytes::from_static(b"\x02\x01\x06\x03\x03\xAB\xAC\x03\x08Hi\x02\x0A\xF4")).unwrap();
        assert_eq!(
            fields.flags,
            Some(AdFlags::BrEdrNotSupported | AdFlags::LeGeneralDiscoverableMode)
        );
        assert_eq!(fields.uuid16, vec![0xACAB]);
        assert_eq!(fields.partial_name.as_deref(), Some("Hi"));
        assert_eq!(fields.tx_power, Some(-12));
    }

    #[test]
    pub fn ad_padding_and_unknown_types() {
        let fields = parse(Bytes::from_static(b"\x03\xFF\x01\x02\x02\x0A\x00\x00\x00\x00")).unwrap();
        assert_eq!(fields.tx_power, Some(0));
    }

    #[test]
    pub fn ad_overrun() {
        assert_eq!(
            parse(Bytes::from_static(b"\x05\x09AB")),
            Err(AdError::Overrun {
                len: 5,
                remaining: 3
            })
        );
        assert!(parse(Bytes::from_static(b"\x04\x03\x01\x02\x03")).is_err());
    }

    #[test]
    pub fn builder_matches_parser() {
        let mut data = AdvertisingData::new();
        data.flags(AdFlags::LeGeneralDiscoverableMode | AdFlags::BrEdrNotSupported)
            .tx_power(-4)
            .partial_name("Host")
            .services(&[])
            .services(&[0x180F, 0x1800]);

        let bytes = data.to_bytes();
        assert_eq!(&bytes[..3], b"\x02\x01\x06");
        assert_eq!(&bytes[3..6], b"\x02\x0A\xFC");
        assert_eq!(&bytes[6..12], b"\x05\x08Host");

        let fields = parse(bytes).unwrap();
        assert_eq!(fields.tx_power, Some(-4));
        assert_eq!(fields.partial_name.as_deref(), Some("Host"));
        assert_eq!(fields.uuid16, vec![0x180F, 0x1800]);
    }

    #[test]
    pub fn oversized_structure_is_clamped() {
        let name = "x".repeat(300);
        let mut data = AdvertisingData::new();
        data.full_name(&name);

        let bytes = data.to_bytes();
        assert_eq!(bytes.len(), 2 + MAX_AD_DATA_LEN);
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(parse(bytes).unwrap().full_name.map(|name| name.len()), Some(MAX_AD_DATA_LEN));

        let mut exact = AdvertisingData::new();
        exact.push(AdType::FullName, &[b'y'; 255]);
        assert_eq!(exact.len(), 2 + MAX_AD_DATA_LEN);
    }
}
