use std::fmt::{Display, Formatter};

use bitvec::prelude::*;
use bytes::*;
use num_traits::FromPrimitive;

use crate::interface::opcode::Opcode;
use crate::interface::packet;
use crate::interface::status::Status;
use crate::util::BufExt;
use crate::{Address, AddressType, Result};

pub const DISCONNECTION_COMPLETE: u8 = 0x05;
pub const COMMAND_COMPLETE: u8 = 0x0E;
pub const COMMAND_STATUS: u8 = 0x0F;
pub const HARDWARE_ERROR: u8 = 0x10;
pub const LE_META: u8 = 0x3E;

pub const LE_CONNECTION_COMPLETE: u8 = 0x01;
pub const LE_ADVERTISING_REPORT: u8 = 0x02;
pub const LE_CONNECTION_UPDATE_COMPLETE: u8 = 0x03;

/// Key into an event callback table: the event code, with the sub-event code
/// in the high byte for LE meta events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct EventKey(pub u16);

impl EventKey {
    pub const DISCONNECTION_COMPLETE: EventKey = EventKey::new(DISCONNECTION_COMPLETE, 0);
    pub const HARDWARE_ERROR: EventKey = EventKey::new(HARDWARE_ERROR, 0);
    pub const LE_CONNECTION_COMPLETE: EventKey = EventKey::new(LE_META, LE_CONNECTION_COMPLETE);
    pub const LE_ADVERTISING_REPORT: EventKey = EventKey::new(LE_META, LE_ADVERTISING_REPORT);
    pub const LE_CONNECTION_UPDATE_COMPLETE: EventKey =
        EventKey::new(LE_META, LE_CONNECTION_UPDATE_COMPLETE);

    pub const fn new(code: u8, sub_code: u8) -> Self {
        EventKey(code as u16 | (sub_code as u16) << 8)
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum ConnectionRole {
    Central = 0x00,
    Peripheral = 0x01,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum ReportType {
    ConnectableUndirected = 0x00,
    ConnectableDirected = 0x01,
    ScannableUndirected = 0x02,
    NonConnectableUndirected = 0x03,
    ScanResponse = 0x04,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConnectionComplete {
    pub status: Status,
    pub connection_handle: u16,
    pub role: ConnectionRole,
    pub peer_address_type: AddressType,
    pub peer_address: Address,
    pub interval: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
    pub central_clock_accuracy: u8,
}

impl ConnectionComplete {
    const LEN: usize = 18;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AdvertisingReport {
    pub report_type: ReportType,
    pub address_type: AddressType,
    pub address: Address,
    pub data: Bytes,
    pub rssi: i8,
}

/// Return parameters of a Command Complete event, following the status byte.
/// Their layout is selected by the opcode of the completed command.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ReturnParameters {
    /// The command returns only a status, or it failed before producing
    /// anything else.
    None,
    LeHostSupported {
        le_supported: bool,
        simultaneous_le_host: bool,
    },
    LocalVersion {
        hci_version: u8,
        hci_revision: u16,
        lmp_version: u8,
        manufacturer: u16,
        lmp_subversion: u16,
    },
    SupportedCommands([u8; 64]),
    LocalFeatures(u64),
    ExtendedFeatures {
        page_number: u8,
        max_page_number: u8,
        features: u64,
    },
    BufferSize {
        acl_length: u16,
        sco_length: u8,
        acl_num: u16,
        sco_num: u16,
    },
    BdAddr(Address),
    LeBufferSize {
        le_length: u16,
        le_num: u8,
    },
    LeLocalFeatures(u64),
    TxPower(i8),
    WhiteListSize(u8),
    SupportedStates(u64),
}

impl ReturnParameters {
    fn from_buf<B: Buf>(opcode: Opcode, buf: &mut B) -> Result<Self> {
        Ok(match opcode {
            Opcode::ReadLeHostSupported => {
                buf.ensure(2)?;
                ReturnParameters::LeHostSupported {
                    le_supported: buf.get_bool(),
                    simultaneous_le_host: buf.get_bool(),
                }
            }
            Opcode::ReadLocalVersionInformation => {
                buf.ensure(8)?;
                ReturnParameters::LocalVersion {
                    hci_version: buf.get_u8(),
                    hci_revision: buf.get_u16_le(),
                    lmp_version: buf.get_u8(),
                    manufacturer: buf.get_u16_le(),
                    lmp_subversion: buf.get_u16_le(),
                }
            }
            Opcode::ReadLocalSupportedCommands => {
                buf.ensure(64)?;
                ReturnParameters::SupportedCommands(buf.get_array_u8())
            }
            Opcode::ReadLocalSupportedFeatures => {
                buf.ensure(8)?;
                ReturnParameters::LocalFeatures(buf.get_u64_le())
            }
            Opcode::ReadLocalExtendedFeatures => {
                buf.ensure(10)?;
                ReturnParameters::ExtendedFeatures {
                    page_number: buf.get_u8(),
                    max_page_number: buf.get_u8(),
                    features: buf.get_u64_le(),
                }
            }
            Opcode::ReadBufferSize => {
                buf.ensure(7)?;
                ReturnParameters::BufferSize {
                    acl_length: buf.get_u16_le(),
                    sco_length: buf.get_u8(),
                    acl_num: buf.get_u16_le(),
                    sco_num: buf.get_u16_le(),
                }
            }
            Opcode::ReadBdAddr => {
                buf.ensure(6)?;
                ReturnParameters::BdAddr(buf.get_address())
            }
            Opcode::LeReadBufferSize => {
                buf.ensure(3)?;
                ReturnParameters::LeBufferSize {
                    le_length: buf.get_u16_le(),
                    le_num: buf.get_u8(),
                }
            }
            Opcode::LeReadLocalSupportedFeatures => {
                buf.ensure(8)?;
                ReturnParameters::LeLocalFeatures(buf.get_u64_le())
            }
            Opcode::LeReadAdvertisingChannelTxPower => {
                buf.ensure(1)?;
                ReturnParameters::TxPower(buf.get_i8())
            }
            Opcode::LeReadWhiteListSize => {
                buf.ensure(1)?;
                ReturnParameters::WhiteListSize(buf.get_u8())
            }
            Opcode::LeReadSupportedStates => {
                buf.ensure(8)?;
                ReturnParameters::SupportedStates(buf.get_u64_le())
            }
            _ => ReturnParameters::None,
        })
    }

    fn put<B: BufMut>(&self, buf: &mut B) {
        match self {
            ReturnParameters::None => {}
            ReturnParameters::LeHostSupported {
                le_supported,
                simultaneous_le_host,
            } => {
                buf.put_u8(*le_supported as u8);
                buf.put_u8(*simultaneous_le_host as u8);
            }
            ReturnParameters::LocalVersion {
                hci_version,
                hci_revision,
                lmp_version,
                manufacturer,
                lmp_subversion,
            } => {
                buf.put_u8(*hci_version);
                buf.put_u16_le(*hci_revision);
                buf.put_u8(*lmp_version);
                buf.put_u16_le(*manufacturer);
                buf.put_u16_le(*lmp_subversion);
            }
            ReturnParameters::SupportedCommands(commands) => buf.put_slice(&commands[..]),
            ReturnParameters::LocalFeatures(features)
            | ReturnParameters::LeLocalFeatures(features)
            | ReturnParameters::SupportedStates(features) => buf.put_u64_le(*features),
            ReturnParameters::ExtendedFeatures {
                page_number,
                max_page_number,
                features,
            } => {
                buf.put_u8(*page_number);
                buf.put_u8(*max_page_number);
                buf.put_u64_le(*features);
            }
            ReturnParameters::BufferSize {
                acl_length,
                sco_length,
                acl_num,
                sco_num,
            } => {
                buf.put_u16_le(*acl_length);
                buf.put_u8(*sco_length);
                buf.put_u16_le(*acl_num);
                buf.put_u16_le(*sco_num);
            }
            ReturnParameters::BdAddr(address) => address.put(buf),
            ReturnParameters::LeBufferSize { le_length, le_num } => {
                buf.put_u16_le(*le_length);
                buf.put_u8(*le_num);
            }
            ReturnParameters::TxPower(level) => buf.put_i8(*level),
            ReturnParameters::WhiteListSize(size) => buf.put_u8(*size),
        }
    }

    /// Views a supported-commands bitmap as bits, octet 0 bit 0 first.
    pub fn supported_commands(&self) -> Option<&BitSlice<u8, Lsb0>> {
        match self {
            ReturnParameters::SupportedCommands(commands) => Some(commands.view_bits::<Lsb0>()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandComplete {
    pub num_hci_commands: u8,
    pub opcode: Opcode,
    pub status: Status,
    pub ret: ReturnParameters,
}

impl CommandComplete {
    /// Decodes the payload of a Command Complete event. The opcode at offset
    /// 1 picks the layout; commands this crate does not know, or which never
    /// answer with Command Complete, decode to `Ok(None)`.
    pub fn decode<B: Buf>(mut buf: B) -> Result<Option<CommandComplete>> {
        buf.ensure(3)?;
        let num_hci_commands = buf.get_u8();
        let opcode: Opcode = match FromPrimitive::from_u16(buf.get_u16_le()) {
            Some(Opcode::Disconnect) | Some(Opcode::LeCreateConnection) | None => return Ok(None),
            Some(opcode) => opcode,
        };

        buf.ensure(1)?;
        let status = Status(buf.get_u8());
        // the header alone still carries credit and completes a command
        let ret = if !status.is_success() && !buf.has_remaining() {
            ReturnParameters::None
        } else {
            match ReturnParameters::from_buf(opcode, &mut buf) {
                Ok(ret) => ret,
                Err(err) => {
                    warn!("malformed return parameters for {}: {}", opcode, err);
                    ReturnParameters::None
                }
            }
        };

        Ok(Some(CommandComplete {
            num_hci_commands,
            opcode,
            status,
            ret,
        }))
    }

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.num_hci_commands);
        buf.put_u16_le(self.opcode.into());
        buf.put_u8(self.status.into());
        self.ret.put(buf);
    }
}

/// An event sent from the controller to the host.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
    DisconnectionComplete {
        status: Status,
        connection_handle: u16,
        reason: Status,
    },
    CommandComplete(CommandComplete),
    CommandStatus {
        status: Status,
        num_hci_commands: u8,
        opcode: u16,
    },
    HardwareError {
        hardware_code: u8,
    },
    LeConnectionComplete(ConnectionComplete),
    LeAdvertisingReport(Vec<AdvertisingReport>),
    LeConnectionUpdateComplete {
        status: Status,
        connection_handle: u16,
        interval: u16,
        latency: u16,
        supervision_timeout: u16,
    },
}

impl Event {
    pub fn code(&self) -> u8 {
        match self {
            Event::DisconnectionComplete { .. } => DISCONNECTION_COMPLETE,
            Event::CommandComplete(_) => COMMAND_COMPLETE,
            Event::CommandStatus { .. } => COMMAND_STATUS,
            Event::HardwareError { .. } => HARDWARE_ERROR,
            Event::LeConnectionComplete(_)
            | Event::LeAdvertisingReport(_)
            | Event::LeConnectionUpdateComplete { .. } => LE_META,
        }
    }

    pub fn key(&self) -> EventKey {
        match self {
            Event::LeConnectionComplete(_) => EventKey::LE_CONNECTION_COMPLETE,
            Event::LeAdvertisingReport(_) => EventKey::LE_ADVERTISING_REPORT,
            Event::LeConnectionUpdateComplete { .. } => EventKey::LE_CONNECTION_UPDATE_COMPLETE,
            _ => EventKey::new(self.code(), 0),
        }
    }

    /// The controller's command credit, for events that carry one.
    pub fn num_hci_commands(&self) -> Option<u8> {
        match self {
            Event::CommandComplete(complete) => Some(complete.num_hci_commands),
            Event::CommandStatus {
                num_hci_commands, ..
            } => Some(*num_hci_commands),
            _ => None,
        }
    }

    /// Opcode of the command this event answers, for completion events.
    pub fn command_opcode(&self) -> Option<u16> {
        match self {
            Event::CommandComplete(complete) => Some(complete.opcode.into()),
            Event::CommandStatus { opcode, .. } => Some(*opcode),
            _ => None,
        }
    }

    /// Status of a completion event.
    pub fn status(&self) -> Option<Status> {
        match self {
            Event::CommandComplete(complete) => Some(complete.status),
            Event::CommandStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decodes an event payload. Unknown event and sub-event codes produce
    /// `Ok(None)`; payloads shorter than their layout produce an error.
    pub fn decode<B: Buf>(code: u8, mut buf: B) -> Result<Option<Event>> {
        Ok(Some(match code {
            DISCONNECTION_COMPLETE => {
                buf.ensure(4)?;
                Event::DisconnectionComplete {
                    status: Status(buf.get_u8()),
                    connection_handle: buf.get_u16_le(),
                    reason: Status(buf.get_u8()),
                }
            }
            COMMAND_COMPLETE => match CommandComplete::decode(buf)? {
                Some(complete) => Event::CommandComplete(complete),
                None => return Ok(None),
            },
            COMMAND_STATUS => {
                buf.ensure(4)?;
                Event::CommandStatus {
                    status: Status(buf.get_u8()),
                    num_hci_commands: buf.get_u8(),
                    opcode: buf.get_u16_le(),
                }
            }
            HARDWARE_ERROR => {
                buf.ensure(1)?;
                Event::HardwareError {
                    hardware_code: buf.get_u8(),
                }
            }
            LE_META => {
                buf.ensure(1)?;
                match buf.get_u8() {
                    LE_CONNECTION_COMPLETE => {
                        buf.ensure(ConnectionComplete::LEN)?;
                        Event::LeConnectionComplete(ConnectionComplete {
                            status: Status(buf.get_u8()),
                            connection_handle: buf.get_u16_le(),
                            role: buf.get_primitive_u8()?,
                            peer_address_type: buf.get_primitive_u8()?,
                            peer_address: buf.get_address(),
                            interval: buf.get_u16_le(),
                            latency: buf.get_u16_le(),
                            supervision_timeout: buf.get_u16_le(),
                            central_clock_accuracy: buf.get_u8(),
                        })
                    }
                    LE_ADVERTISING_REPORT => Event::LeAdvertisingReport(decode_reports(&mut buf)?),
                    LE_CONNECTION_UPDATE_COMPLETE => {
                        buf.ensure(9)?;
                        Event::LeConnectionUpdateComplete {
                            status: Status(buf.get_u8()),
                            connection_handle: buf.get_u16_le(),
                            interval: buf.get_u16_le(),
                            latency: buf.get_u16_le(),
                            supervision_timeout: buf.get_u16_le(),
                        }
                    }
                    _ => return Ok(None),
                }
            }
            _ => return Ok(None),
        }))
    }

    /// Encodes the full packet, indicator included.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        match self {
            Event::DisconnectionComplete {
                status,
                connection_handle,
                reason,
            } => {
                buf.put_u8(status.0);
                buf.put_u16_le(*connection_handle);
                buf.put_u8(reason.0);
            }
            Event::CommandComplete(complete) => complete.put(&mut buf),
            Event::CommandStatus {
                status,
                num_hci_commands,
                opcode,
            } => {
                buf.put_u8(status.0);
                buf.put_u8(*num_hci_commands);
                buf.put_u16_le(*opcode);
            }
            Event::HardwareError { hardware_code } => buf.put_u8(*hardware_code),
            Event::LeConnectionComplete(c) => {
                buf.put_u8(LE_CONNECTION_COMPLETE);
                buf.put_u8(c.status.0);
                buf.put_u16_le(c.connection_handle);
                buf.put_u8(c.role as u8);
                buf.put_u8(c.peer_address_type as u8);
                c.peer_address.put(&mut buf);
                buf.put_u16_le(c.interval);
                buf.put_u16_le(c.latency);
                buf.put_u16_le(c.supervision_timeout);
                buf.put_u8(c.central_clock_accuracy);
            }
            Event::LeAdvertisingReport(reports) => {
                buf.put_u8(LE_ADVERTISING_REPORT);
                encode_reports(reports, &mut buf);
            }
            Event::LeConnectionUpdateComplete {
                status,
                connection_handle,
                interval,
                latency,
                supervision_timeout,
            } => {
                buf.put_u8(LE_CONNECTION_UPDATE_COMPLETE);
                buf.put_u8(status.0);
                buf.put_u16_le(*connection_handle);
                buf.put_u16_le(*interval);
                buf.put_u16_le(*latency);
                buf.put_u16_le(*supervision_timeout);
            }
        }

        packet::encode_event(self.code(), &buf)
    }
}

// Each report is laid out whole before the next one starts: event type,
// address type, address, data length, data, RSSI.
fn decode_reports<B: Buf>(buf: &mut B) -> Result<Vec<AdvertisingReport>> {
    buf.ensure(1)?;
    let num_reports = buf.get_u8() as usize;

    let mut reports = Vec::with_capacity(num_reports);
    for _ in 0..num_reports {
        buf.ensure(9)?;
        let report_type = buf.get_primitive_u8::<ReportType>()?;
        let address_type = buf.get_primitive_u8::<AddressType>()?;
        let address = buf.get_address();
        let len = buf.get_u8() as usize;

        buf.ensure(len + 1)?;
        let data = buf.copy_to_bytes(len);
        reports.push(AdvertisingReport {
            report_type,
            address_type,
            address,
            data,
            rssi: buf.get_i8(),
        });
    }

    Ok(reports)
}

fn encode_reports<B: BufMut>(reports: &[AdvertisingReport], buf: &mut B) {
    buf.put_u8(reports.len() as u8);
    for report in reports {
        buf.put_u8(report.report_type as u8);
        buf.put_u8(report.address_type as u8);
        report.address.put(buf);
        buf.put_u8(report.data.len() as u8);
        buf.put_slice(&report.data);
        buf.put_i8(report.rssi);
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter) -> std::result::Result<(), std::fmt::Error> {
        match self {
            Event::DisconnectionComplete {
                status,
                connection_handle,
                reason,
            } => write!(
                f,
                "Disconnection Complete ({}, handle {:#06x}, reason {})",
                status, connection_handle, reason
            ),
            Event::CommandComplete(complete) => write!(
                f,
                "Command Complete ({:?}, {}, credit {}, {:?})",
                complete.opcode, complete.status, complete.num_hci_commands, complete.ret
            ),
            Event::CommandStatus {
                status,
                num_hci_commands,
                opcode,
            } => write!(
                f,
                "Command Status ({:#06x}, {}, credit {})",
                opcode, status, num_hci_commands
            ),
            Event::HardwareError { hardware_code } => {
                write!(f, "Hardware Error ({:#04x})", hardware_code)
            }
            Event::LeConnectionComplete(c) => write!(
                f,
                "LE Connection Complete ({}, handle {:#06x}, {:?}, {} {:?}, interval {:#06x})",
                c.status, c.connection_handle, c.role, c.peer_address, c.peer_address_type, c.interval
            ),
            Event::LeAdvertisingReport(reports) => {
                write!(f, "LE Advertising Report [")?;
                for (i, r) in reports.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{:?} {} {:?} rssi {} {:02x?}",
                        r.report_type,
                        r.address,
                        r.address_type,
                        r.rssi,
                        r.data.as_ref()
                    )?;
                }
                write!(f, "]")
            }
            Event::LeConnectionUpdateComplete {
                status,
                connection_handle,
                interval,
                latency,
                supervision_timeout,
            } => write!(
                f,
                "LE Connection Update Complete ({}, handle {:#06x}, interval {:#06x}, latency {}, timeout {:#06x})",
                status, connection_handle, interval, latency, supervision_timeout
            ),
        }
    }
}
