use std::fmt::{Display, Formatter};

pub const OGF_LINK_CONTROL: u8 = 0x01;
pub const OGF_CONTROLLER_BASEBAND: u8 = 0x03;
pub const OGF_INFORMATIONAL: u8 = 0x04;
pub const OGF_LE_CONTROLLER: u8 = 0x08;

/// Packs a 6-bit opcode group and a 10-bit command index into an opcode.
pub const fn pack(ogf: u8, ocf: u16) -> u16 {
    (((ogf as u16) << 10) & 0xFC00) | (ocf & 0x03FF)
}

/// Splits an opcode into its (OGF, OCF) pair.
pub const fn unpack(opcode: u16) -> (u8, u16) {
    ((opcode >> 10) as u8, opcode & 0x03FF)
}

/// The commands this host knows how to send and decode.
#[repr(u16)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, FromPrimitive)]
pub enum Opcode {
    Disconnect = pack(OGF_LINK_CONTROL, 0x0006),
    SetEventMask = pack(OGF_CONTROLLER_BASEBAND, 0x0001),
    Reset = pack(OGF_CONTROLLER_BASEBAND, 0x0003),
    ReadLeHostSupported = pack(OGF_CONTROLLER_BASEBAND, 0x006C),
    WriteLeHostSupported = pack(OGF_CONTROLLER_BASEBAND, 0x006D),
    ReadLocalVersionInformation = pack(OGF_INFORMATIONAL, 0x0001),
    ReadLocalSupportedCommands = pack(OGF_INFORMATIONAL, 0x0002),
    ReadLocalSupportedFeatures = pack(OGF_INFORMATIONAL, 0x0003),
    ReadLocalExtendedFeatures = pack(OGF_INFORMATIONAL, 0x0004),
    ReadBufferSize = pack(OGF_INFORMATIONAL, 0x0005),
    ReadBdAddr = pack(OGF_INFORMATIONAL, 0x0009),
    LeSetEventMask = pack(OGF_LE_CONTROLLER, 0x0001),
    LeReadBufferSize = pack(OGF_LE_CONTROLLER, 0x0002),
    LeReadLocalSupportedFeatures = pack(OGF_LE_CONTROLLER, 0x0003),
    LeSetRandomAddress = pack(OGF_LE_CONTROLLER, 0x0005),
    LeSetAdvertisingParameters = pack(OGF_LE_CONTROLLER, 0x0006),
    LeReadAdvertisingChannelTxPower = pack(OGF_LE_CONTROLLER, 0x0007),
    LeSetAdvertisingData = pack(OGF_LE_CONTROLLER, 0x0008),
    LeSetScanResponseData = pack(OGF_LE_CONTROLLER, 0x0009),
    LeSetAdvertisingEnable = pack(OGF_LE_CONTROLLER, 0x000A),
    LeSetScanParameters = pack(OGF_LE_CONTROLLER, 0x000B),
    LeSetScanEnable = pack(OGF_LE_CONTROLLER, 0x000C),
    LeCreateConnection = pack(OGF_LE_CONTROLLER, 0x000D),
    LeCreateConnectionCancel = pack(OGF_LE_CONTROLLER, 0x000E),
    LeReadWhiteListSize = pack(OGF_LE_CONTROLLER, 0x000F),
    LeReadSupportedStates = pack(OGF_LE_CONTROLLER, 0x001C),
}

impl Opcode {
    pub fn ogf(self) -> u8 {
        unpack(self as u16).0
    }

    pub fn ocf(self) -> u16 {
        unpack(self as u16).1
    }
}

impl From<Opcode> for u16 {
    fn from(val: Opcode) -> Self {
        val as u16
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), ::std::fmt::Error> {
        write!(f, "{:?} ({:#04x}|{:#05x})", self, self.ogf(), self.ocf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    pub fn pack_unpack_full_range() {
        for ogf in 0..=0x3Fu8 {
            for ocf in 0..=0x3FFu16 {
                assert_eq!(unpack(pack(ogf, ocf)), (ogf, ocf));
            }
        }
    }

    #[test]
    pub fn pack_masks_out_of_range_bits() {
        assert_eq!(pack(0x08, 0x040C), pack(0x08, 0x000C));
        assert_eq!(pack(0xFF, 0), 0xFC00);
    }

    #[test]
    pub fn known_opcodes() {
        assert_eq!(Opcode::Reset as u16, 0x0C03);
        assert_eq!(Opcode::Disconnect as u16, 0x0406);
        assert_eq!(Opcode::ReadBdAddr as u16, 0x1009);
        assert_eq!(Opcode::LeSetAdvertisingEnable as u16, 0x200A);
        assert_eq!(Opcode::LeReadSupportedStates as u16, 0x201C);
        assert_eq!(Opcode::LeCreateConnection.ogf(), OGF_LE_CONTROLLER);
        assert_eq!(Opcode::LeCreateConnection.ocf(), 0x000D);
        assert_eq!(Opcode::from_u16(0x200C), Some(Opcode::LeSetScanEnable));
        assert_eq!(Opcode::from_u16(0x0000), None);
    }
}
