use std::fmt::{Display, Formatter};

use bytes::*;
use num_traits::FromPrimitive;

use crate::interface::opcode::Opcode;
use crate::interface::packet;
use crate::util::BufExt;
use crate::{Address, AddressType, Result};

/// Size of the advertising and scan response data fields.
pub const ADV_DATA_LEN: usize = 31;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum AdvertisingType {
    ConnectableUndirected = 0x00,
    ConnectableDirectedHighDuty = 0x01,
    ScannableUndirected = 0x02,
    NonConnectableUndirected = 0x03,
    ConnectableDirectedLowDuty = 0x04,
}

impl Default for AdvertisingType {
    fn default() -> Self {
        AdvertisingType::ConnectableUndirected
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum ScanType {
    Passive = 0x00,
    Active = 0x01,
}

impl ScanType {
    pub fn toggle(self) -> ScanType {
        match self {
            ScanType::Passive => ScanType::Active,
            ScanType::Active => ScanType::Passive,
        }
    }
}

impl Default for ScanType {
    fn default() -> Self {
        ScanType::Passive
    }
}

impl Display for ScanType {
    fn fmt(&self, f: &mut Formatter) -> std::result::Result<(), std::fmt::Error> {
        match self {
            ScanType::Passive => write!(f, "passive"),
            ScanType::Active => write!(f, "active"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AdvertisingParameters {
    pub interval_min: u16,
    pub interval_max: u16,
    pub advertising_type: AdvertisingType,
    pub own_address_type: AddressType,
    pub direct_address_type: AddressType,
    pub direct_address: Address,
    pub channel_map: u8,
    pub filter_policy: u8,
}

impl AdvertisingParameters {
    const LEN: usize = 15;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.interval_min);
        buf.put_u16_le(self.interval_max);
        buf.put_u8(self.advertising_type as u8);
        buf.put_u8(self.own_address_type as u8);
        buf.put_u8(self.direct_address_type as u8);
        self.direct_address.put(buf);
        buf.put_u8(self.channel_map);
        buf.put_u8(self.filter_policy);
    }

    fn from_buf<B: Buf>(buf: &mut B) -> Result<Self> {
        buf.ensure(Self::LEN)?;
        Ok(AdvertisingParameters {
            interval_min: buf.get_u16_le(),
            interval_max: buf.get_u16_le(),
            advertising_type: buf.get_primitive_u8()?,
            own_address_type: buf.get_primitive_u8()?,
            direct_address_type: buf.get_primitive_u8()?,
            direct_address: buf.get_address(),
            channel_map: buf.get_u8(),
            filter_policy: buf.get_u8(),
        })
    }
}

impl Default for AdvertisingParameters {
    fn default() -> Self {
        AdvertisingParameters {
            interval_min: 0x0800,
            interval_max: 0x0800,
            advertising_type: AdvertisingType::ConnectableUndirected,
            own_address_type: AddressType::Public,
            direct_address_type: AddressType::Public,
            direct_address: Address::zero(),
            channel_map: 0x07,
            filter_policy: 0x00,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScanParameters {
    pub scan_type: ScanType,
    pub interval: u16,
    pub window: u16,
    pub own_address_type: AddressType,
    pub filter_policy: u8,
}

impl ScanParameters {
    const LEN: usize = 7;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.scan_type as u8);
        buf.put_u16_le(self.interval);
        buf.put_u16_le(self.window);
        buf.put_u8(self.own_address_type as u8);
        buf.put_u8(self.filter_policy);
    }

    fn from_buf<B: Buf>(buf: &mut B) -> Result<Self> {
        buf.ensure(Self::LEN)?;
        Ok(ScanParameters {
            scan_type: buf.get_primitive_u8()?,
            interval: buf.get_u16_le(),
            window: buf.get_u16_le(),
            own_address_type: buf.get_primitive_u8()?,
            filter_policy: buf.get_u8(),
        })
    }
}

impl Default for ScanParameters {
    fn default() -> Self {
        ScanParameters {
            scan_type: ScanType::Passive,
            interval: 0x0010,
            window: 0x0010,
            own_address_type: AddressType::Public,
            filter_policy: 0x00,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConnectionParameters {
    pub scan_interval: u16,
    pub scan_window: u16,
    pub filter_policy: u8,
    pub peer_address_type: AddressType,
    pub peer_address: Address,
    pub own_address_type: AddressType,
    pub interval_min: u16,
    pub interval_max: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
    pub min_ce_length: u16,
    pub max_ce_length: u16,
}

impl ConnectionParameters {
    const LEN: usize = 25;

    /// Default parameters for a connection to `peer_address`.
    pub fn to(peer_address: Address, peer_address_type: AddressType) -> Self {
        ConnectionParameters {
            peer_address,
            peer_address_type,
            ..Default::default()
        }
    }

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.scan_interval);
        buf.put_u16_le(self.scan_window);
        buf.put_u8(self.filter_policy);
        buf.put_u8(self.peer_address_type as u8);
        self.peer_address.put(buf);
        buf.put_u8(self.own_address_type as u8);
        buf.put_u16_le(self.interval_min);
        buf.put_u16_le(self.interval_max);
        buf.put_u16_le(self.latency);
        buf.put_u16_le(self.supervision_timeout);
        buf.put_u16_le(self.min_ce_length);
        buf.put_u16_le(self.max_ce_length);
    }

    fn from_buf<B: Buf>(buf: &mut B) -> Result<Self> {
        buf.ensure(Self::LEN)?;
        Ok(ConnectionParameters {
            scan_interval: buf.get_u16_le(),
            scan_window: buf.get_u16_le(),
            filter_policy: buf.get_u8(),
            peer_address_type: buf.get_primitive_u8()?,
            peer_address: buf.get_address(),
            own_address_type: buf.get_primitive_u8()?,
            interval_min: buf.get_u16_le(),
            interval_max: buf.get_u16_le(),
            latency: buf.get_u16_le(),
            supervision_timeout: buf.get_u16_le(),
            min_ce_length: buf.get_u16_le(),
            max_ce_length: buf.get_u16_le(),
        })
    }
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        ConnectionParameters {
            scan_interval: 0x0100,
            scan_window: 0x0100,
            filter_policy: 0x00,
            peer_address_type: AddressType::Public,
            peer_address: Address::zero(),
            own_address_type: AddressType::Public,
            interval_min: 0x0100,
            interval_max: 0x0400,
            latency: 0x0004,
            supervision_timeout: 0x0C80,
            min_ce_length: 0x0004,
            max_ce_length: 0x0008,
        }
    }
}

/// A command sent from the host to the controller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    Disconnect {
        connection_handle: u16,
        reason: u8,
    },
    SetEventMask {
        event_mask: u64,
    },
    Reset,
    ReadLeHostSupported,
    WriteLeHostSupported {
        le_supported: bool,
        simultaneous_le_host: bool,
    },
    ReadLocalVersionInformation,
    ReadLocalSupportedCommands,
    ReadLocalSupportedFeatures,
    ReadLocalExtendedFeatures {
        page_number: u8,
    },
    ReadBufferSize,
    ReadBdAddr,
    LeSetEventMask {
        event_mask: u64,
    },
    LeReadBufferSize,
    LeReadLocalSupportedFeatures,
    LeSetRandomAddress {
        random_address: Address,
    },
    LeSetAdvertisingParameters(AdvertisingParameters),
    LeReadAdvertisingChannelTxPower,
    /// Only the first 31 bytes of `data` are sent.
    LeSetAdvertisingData {
        data: Bytes,
    },
    /// Only the first 31 bytes of `data` are sent.
    LeSetScanResponseData {
        data: Bytes,
    },
    LeSetAdvertisingEnable {
        enable: bool,
    },
    LeSetScanParameters(ScanParameters),
    LeSetScanEnable {
        enable: bool,
        filter_duplicates: bool,
    },
    LeCreateConnection(ConnectionParameters),
    LeCreateConnectionCancel,
    LeReadWhiteListSize,
    LeReadSupportedStates,
}

fn put_data_field<B: BufMut>(buf: &mut B, data: &[u8]) {
    let len = data.len().min(ADV_DATA_LEN);
    buf.put_u8(len as u8);
    buf.put_slice(&data[..len]);
    buf.put_bytes(0, ADV_DATA_LEN - len);
}

fn get_data_field<B: Buf>(buf: &mut B) -> Result<Bytes> {
    buf.ensure(1 + ADV_DATA_LEN)?;
    let len = (buf.get_u8() as usize).min(ADV_DATA_LEN);
    let mut field = buf.copy_to_bytes(ADV_DATA_LEN);
    field.truncate(len);
    Ok(field)
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Disconnect { .. } => Opcode::Disconnect,
            Command::SetEventMask { .. } => Opcode::SetEventMask,
            Command::Reset => Opcode::Reset,
            Command::ReadLeHostSupported => Opcode::ReadLeHostSupported,
            Command::WriteLeHostSupported { .. } => Opcode::WriteLeHostSupported,
            Command::ReadLocalVersionInformation => Opcode::ReadLocalVersionInformation,
            Command::ReadLocalSupportedCommands => Opcode::ReadLocalSupportedCommands,
            Command::ReadLocalSupportedFeatures => Opcode::ReadLocalSupportedFeatures,
            Command::ReadLocalExtendedFeatures { .. } => Opcode::ReadLocalExtendedFeatures,
            Command::ReadBufferSize => Opcode::ReadBufferSize,
            Command::ReadBdAddr => Opcode::ReadBdAddr,
            Command::LeSetEventMask { .. } => Opcode::LeSetEventMask,
            Command::LeReadBufferSize => Opcode::LeReadBufferSize,
            Command::LeReadLocalSupportedFeatures => Opcode::LeReadLocalSupportedFeatures,
            Command::LeSetRandomAddress { .. } => Opcode::LeSetRandomAddress,
            Command::LeSetAdvertisingParameters(_) => Opcode::LeSetAdvertisingParameters,
            Command::LeReadAdvertisingChannelTxPower => Opcode::LeReadAdvertisingChannelTxPower,
            Command::LeSetAdvertisingData { .. } => Opcode::LeSetAdvertisingData,
            Command::LeSetScanResponseData { .. } => Opcode::LeSetScanResponseData,
            Command::LeSetAdvertisingEnable { .. } => Opcode::LeSetAdvertisingEnable,
            Command::LeSetScanParameters(_) => Opcode::LeSetScanParameters,
            Command::LeSetScanEnable { .. } => Opcode::LeSetScanEnable,
            Command::LeCreateConnection(_) => Opcode::LeCreateConnection,
            Command::LeCreateConnectionCancel => Opcode::LeCreateConnectionCancel,
            Command::LeReadWhiteListSize => Opcode::LeReadWhiteListSize,
            Command::LeReadSupportedStates => Opcode::LeReadSupportedStates,
        }
    }

    /// Writes the parameter block, without the packet header.
    pub fn put_params<B: BufMut>(&self, buf: &mut B) {
        match self {
            Command::Disconnect {
                connection_handle,
                reason,
            } => {
                buf.put_u16_le(*connection_handle);
                buf.put_u8(*reason);
            }
            Command::SetEventMask { event_mask } | Command::LeSetEventMask { event_mask } => {
                buf.put_u64_le(*event_mask)
            }
            Command::WriteLeHostSupported {
                le_supported,
                simultaneous_le_host,
            } => {
                buf.put_u8(*le_supported as u8);
                buf.put_u8(*simultaneous_le_host as u8);
            }
            Command::ReadLocalExtendedFeatures { page_number } => buf.put_u8(*page_number),
            Command::LeSetRandomAddress { random_address } => random_address.put(buf),
            Command::LeSetAdvertisingParameters(params) => params.put(buf),
            Command::LeSetAdvertisingData { data } | Command::LeSetScanResponseData { data } => {
                put_data_field(buf, data)
            }
            Command::LeSetAdvertisingEnable { enable } => buf.put_u8(*enable as u8),
            Command::LeSetScanParameters(params) => params.put(buf),
            Command::LeSetScanEnable {
                enable,
                filter_duplicates,
            } => {
                buf.put_u8(*enable as u8);
                buf.put_u8(*filter_duplicates as u8);
            }
            Command::LeCreateConnection(params) => params.put(buf),
            _ => {}
        }
    }

    /// Encodes the full packet, indicator included.
    pub fn encode(&self) -> Result<Bytes> {
        let mut params = BytesMut::new();
        self.put_params(&mut params);
        packet::encode_command(self.opcode().into(), &params)
    }

    /// Decodes a parameter block. Opcodes outside the supported subset
    /// produce `Ok(None)`.
    pub fn decode<B: Buf>(opcode: u16, mut buf: B) -> Result<Option<Command>> {
        let opcode: Opcode = match FromPrimitive::from_u16(opcode) {
            Some(opcode) => opcode,
            None => return Ok(None),
        };

        Ok(Some(match opcode {
            Opcode::Disconnect => {
                buf.ensure(3)?;
                Command::Disconnect {
                    connection_handle: buf.get_u16_le(),
                    reason: buf.get_u8(),
                }
            }
            Opcode::SetEventMask => {
                buf.ensure(8)?;
                Command::SetEventMask {
                    event_mask: buf.get_u64_le(),
                }
            }
            Opcode::Reset => Command::Reset,
            Opcode::ReadLeHostSupported => Command::ReadLeHostSupported,
            Opcode::WriteLeHostSupported => {
                buf.ensure(2)?;
                Command::WriteLeHostSupported {
                    le_supported: buf.get_bool(),
                    simultaneous_le_host: buf.get_bool(),
                }
            }
            Opcode::ReadLocalVersionInformation => Command::ReadLocalVersionInformation,
            Opcode::ReadLocalSupportedCommands => Command::ReadLocalSupportedCommands,
            Opcode::ReadLocalSupportedFeatures => Command::ReadLocalSupportedFeatures,
            Opcode::ReadLocalExtendedFeatures => {
                buf.ensure(1)?;
                Command::ReadLocalExtendedFeatures {
                    page_number: buf.get_u8(),
                }
            }
            Opcode::ReadBufferSize => Command::ReadBufferSize,
            Opcode::ReadBdAddr => Command::ReadBdAddr,
            Opcode::LeSetEventMask => {
                buf.ensure(8)?;
                Command::LeSetEventMask {
                    event_mask: buf.get_u64_le(),
                }
            }
            Opcode::LeReadBufferSize => Command::LeReadBufferSize,
            Opcode::LeReadLocalSupportedFeatures => Command::LeReadLocalSupportedFeatures,
            Opcode::LeSetRandomAddress => {
                buf.ensure(6)?;
                Command::LeSetRandomAddress {
                    random_address: buf.get_address(),
                }
            }
            Opcode::LeSetAdvertisingParameters => {
                Command::LeSetAdvertisingParameters(AdvertisingParameters::from_buf(&mut buf)?)
            }
            Opcode::LeReadAdvertisingChannelTxPower => Command::LeReadAdvertisingChannelTxPower,
            Opcode::LeSetAdvertisingData => Command::LeSetAdvertisingData {
                data: get_data_field(&mut buf)?,
            },
            Opcode::LeSetScanResponseData => Command::LeSetScanResponseData {
                data: get_data_field(&mut buf)?,
            },
            Opcode::LeSetAdvertisingEnable => {
                buf.ensure(1)?;
                Command::LeSetAdvertisingEnable {
                    enable: buf.get_bool(),
                }
            }
            Opcode::LeSetScanParameters => {
                Command::LeSetScanParameters(ScanParameters::from_buf(&mut buf)?)
            }
            Opcode::LeSetScanEnable => {
                buf.ensure(2)?;
                Command::LeSetScanEnable {
                    enable: buf.get_bool(),
                    filter_duplicates: buf.get_bool(),
                }
            }
            Opcode::LeCreateConnection => {
                Command::LeCreateConnection(ConnectionParameters::from_buf(&mut buf)?)
            }
            Opcode::LeCreateConnectionCancel => Command::LeCreateConnectionCancel,
            Opcode::LeReadWhiteListSize => Command::LeReadWhiteListSize,
            Opcode::LeReadSupportedStates => Command::LeReadSupportedStates,
        }))
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> std::result::Result<(), std::fmt::Error> {
        match self {
            Command::Disconnect {
                connection_handle,
                reason,
            } => write!(
                f,
                "Disconnect (handle {:#06x}, reason {:#04x})",
                connection_handle, reason
            ),
            Command::SetEventMask { event_mask } => {
                write!(f, "Set Event Mask ({:#018x})", event_mask)
            }
            Command::Reset => write!(f, "Reset"),
            Command::ReadLeHostSupported => write!(f, "Read LE Host Supported"),
            Command::WriteLeHostSupported {
                le_supported,
                simultaneous_le_host,
            } => write!(
                f,
                "Write LE Host Supported (le {}, simultaneous {})",
                le_supported, simultaneous_le_host
            ),
            Command::ReadLocalVersionInformation => write!(f, "Read Local Version Information"),
            Command::ReadLocalSupportedCommands => write!(f, "Read Local Supported Commands"),
            Command::ReadLocalSupportedFeatures => write!(f, "Read Local Supported Features"),
            Command::ReadLocalExtendedFeatures { page_number } => {
                write!(f, "Read Local Extended Features (page {})", page_number)
            }
            Command::ReadBufferSize => write!(f, "Read Buffer Size"),
            Command::ReadBdAddr => write!(f, "Read BD_ADDR"),
            Command::LeSetEventMask { event_mask } => {
                write!(f, "LE Set Event Mask ({:#018x})", event_mask)
            }
            Command::LeReadBufferSize => write!(f, "LE Read Buffer Size"),
            Command::LeReadLocalSupportedFeatures => write!(f, "LE Read Local Supported Features"),
            Command::LeSetRandomAddress { random_address } => {
                write!(f, "LE Set Random Address ({})", random_address)
            }
            Command::LeSetAdvertisingParameters(p) => write!(
                f,
                "LE Set Advertising Parameters (interval {:#06x}-{:#06x}, {:?}, own {:?}, channels {:#04x})",
                p.interval_min, p.interval_max, p.advertising_type, p.own_address_type, p.channel_map
            ),
            Command::LeReadAdvertisingChannelTxPower => {
                write!(f, "LE Read Advertising Channel Tx Power")
            }
            Command::LeSetAdvertisingData { data } => {
                write!(f, "LE Set Advertising Data ({:02x?})", data.as_ref())
            }
            Command::LeSetScanResponseData { data } => {
                write!(f, "LE Set Scan Response Data ({:02x?})", data.as_ref())
            }
            Command::LeSetAdvertisingEnable { enable } => {
                write!(f, "LE Set Advertising Enable ({})", enable)
            }
            Command::LeSetScanParameters(p) => write!(
                f,
                "LE Set Scan Parameters ({}, interval {:#06x}, window {:#06x})",
                p.scan_type, p.interval, p.window
            ),
            Command::LeSetScanEnable {
                enable,
                filter_duplicates,
            } => write!(
                f,
                "LE Set Scan Enable ({}, filter duplicates {})",
                enable, filter_duplicates
            ),
            Command::LeCreateConnection(p) => write!(
                f,
                "LE Create Connection ({} {:?}, interval {:#06x}-{:#06x}, latency {}, timeout {:#06x})",
                p.peer_address,
                p.peer_address_type,
                p.interval_min,
                p.interval_max,
                p.latency,
                p.supervision_timeout
            ),
            Command::LeCreateConnectionCancel => write!(f, "LE Create Connection Cancel"),
            Command::LeReadWhiteListSize => write!(f, "LE Read White List Size"),
            Command::LeReadSupportedStates => write!(f, "LE Read Supported States"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::packet::{next_frame, Frame};

    fn round_trip(command: Command) -> Command {
        let mut buf = BytesMut::from(&command.encode().unwrap()[..]);
        match next_frame(&mut buf).unwrap() {
            Some(Frame::Command { opcode, params }) => {
                assert_eq!(opcode, u16::from(command.opcode()));
                Command::decode(opcode, params).unwrap().unwrap()
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    pub fn reset_wire_format() {
        assert_eq!(&Command::Reset.encode().unwrap()[..], &[0x01, 0x03, 0x0C, 0x00]);
    }

    #[test]
    pub fn disconnect_wire_format() {
        let command = Command::Disconnect {
            connection_handle: 0x0040,
            reason: 0x13,
        };
        assert_eq!(
            &command.encode().unwrap()[..],
            &[0x01, 0x06, 0x04, 0x03, 0x40, 0x00, 0x13]
        );
        assert_eq!(round_trip(command.clone()), command);
    }

    #[test]
    pub fn parameter_blocks_round_trip() {
        let commands = vec![
            Command::SetEventMask {
                event_mask: 0x2000_0000_0000_8090,
            },
            Command::WriteLeHostSupported {
                le_supported: true,
                simultaneous_le_host: false,
            },
            Command::ReadLocalExtendedFeatures { page_number: 1 },
            Command::LeSetRandomAddress {
                random_address: Address::from_u64(Address::MAX),
            },
            Command::LeSetAdvertisingParameters(AdvertisingParameters {
                interval_min: 0x0400,
                interval_max: 0x1000,
                own_address_type: AddressType::Random,
                ..Default::default()
            }),
            Command::LeSetScanParameters(ScanParameters {
                scan_type: ScanType::Active,
                interval: 0x0180,
                window: 0x0100,
                ..Default::default()
            }),
            Command::LeSetScanEnable {
                enable: true,
                filter_duplicates: false,
            },
            Command::LeCreateConnection(ConnectionParameters::to(
                Address::zero(),
                AddressType::Random,
            )),
            Command::LeReadSupportedStates,
        ];

        for command in commands {
            assert_eq!(round_trip(command.clone()), command);
        }
    }

    #[test]
    pub fn create_connection_layout() {
        let params = ConnectionParameters::to(Address::from_u64(0x0000_1234_5678), AddressType::Public);
        let mut buf = BytesMut::new();
        params.put(&mut buf);
        assert_eq!(buf.len(), 25);
        assert_eq!(&buf[..4], &[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(&buf[6..12], &[0x78, 0x56, 0x34, 0x12, 0x00, 0x00]);
        assert_eq!(&buf[19..21], &[0x80, 0x0C]);
    }

    #[test]
    pub fn advertising_data_padding() {
        let empty = Command::LeSetAdvertisingData { data: Bytes::new() };
        let encoded = empty.encode().unwrap();
        assert_eq!(encoded.len(), 4 + 1 + ADV_DATA_LEN);
        assert_eq!(encoded[3], 32);
        assert_eq!(encoded[4], 0);
        assert_eq!(round_trip(empty.clone()), empty);

        let full = Command::LeSetScanResponseData {
            data: Bytes::from(vec![0xAA; ADV_DATA_LEN]),
        };
        assert_eq!(round_trip(full.clone()), full);

        let long = Command::LeSetAdvertisingData {
            data: Bytes::from(vec![0x55; 40]),
        };
        let encoded = long.encode().unwrap();
        assert_eq!(encoded.len(), 4 + 1 + ADV_DATA_LEN);
        assert_eq!(encoded[4], ADV_DATA_LEN as u8);
        match round_trip(long) {
            Command::LeSetAdvertisingData { data } => assert_eq!(data.len(), ADV_DATA_LEN),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    pub fn decode_unknown_and_truncated() {
        assert!(Command::decode(0x0000, Bytes::new()).unwrap().is_none());
        assert!(Command::decode(0x2005, Bytes::from_static(&[1, 2, 3])).is_err());
    }

    #[test]
    pub fn display_names() {
        assert_eq!(Command::Reset.to_string(), "Reset");
        assert_eq!(
            Command::LeSetScanEnable {
                enable: true,
                filter_duplicates: true
            }
            .to_string(),
            "LE Set Scan Enable (true, filter duplicates true)"
        );
    }
}
