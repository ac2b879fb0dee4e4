use std::fmt::{Display, Formatter};

use num_traits::FromPrimitive;

/// The status byte carried by completion events. Kept as the raw byte so that
/// codes this crate does not name still survive a decode/encode cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Status(pub u8);

impl Status {
    pub const SUCCESS: Status = Status(0x00);

    pub fn is_success(&self) -> bool {
        self.0 == 0x00
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        FromPrimitive::from_u8(self.0)
    }
}

impl From<ErrorCode> for Status {
    fn from(code: ErrorCode) -> Self {
        Status(code as u8)
    }
}

impl From<Status> for u8 {
    fn from(val: Status) -> Self {
        val.0
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> Result<(), ::std::fmt::Error> {
        if self.is_success() {
            return write!(f, "success");
        }

        match self.error_code() {
            Some(code) => write!(f, "{} ({:#04x})", code, self.0),
            None => write!(f, "{:#04x}", self.0),
        }
    }
}

/// Controller error codes (Core Specification Vol 1, Part F).
#[repr(u8)]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum ErrorCode {
    #[error("Unknown HCI Command")]
    UnknownHciCommand = 0x01,
    #[error("Unknown Connection Identifier")]
    UnknownConnectionIdentifier = 0x02,
    #[error("Hardware Failure")]
    HardwareFailure = 0x03,
    #[error("Page Timeout")]
    PageTimeout = 0x04,
    #[error("Authentication Failure")]
    AuthenticationFailure = 0x05,
    #[error("PIN or Key Missing")]
    PinOrKeyMissing = 0x06,
    #[error("Memory Capacity Exceeded")]
    MemoryCapacityExceeded = 0x07,
    #[error("Connection Timeout")]
    ConnectionTimeout = 0x08,
    #[error("Connection Limit Exceeded")]
    ConnectionLimitExceeded = 0x09,
    #[error("Synchronous Connection Limit To A Device Exceeded")]
    SynchronousConnectionLimitExceeded = 0x0A,
    #[error("ACL Connection Already Exists")]
    AclConnectionAlreadyExists = 0x0B,
    #[error("Command Disallowed")]
    CommandDisallowed = 0x0C,
    #[error("Connection Rejected due to Limited Resources")]
    RejectedLimitedResources = 0x0D,
    #[error("Connection Rejected due to Security Reasons")]
    RejectedSecurityReasons = 0x0E,
    #[error("Connection Rejected due to Unacceptable BD_ADDR")]
    RejectedUnacceptableBdAddr = 0x0F,
    #[error("Connection Accept Timeout Exceeded")]
    ConnectionAcceptTimeoutExceeded = 0x10,
    #[error("Unsupported Feature or Parameter Value")]
    UnsupportedFeatureOrParameterValue = 0x11,
    #[error("Invalid HCI Command Parameters")]
    InvalidHciCommandParameters = 0x12,
    #[error("Remote User Terminated Connection")]
    RemoteUserTerminatedConnection = 0x13,
    #[error("Remote Device Terminated Connection due to Low Resources")]
    RemoteLowResources = 0x14,
    #[error("Remote Device Terminated Connection due to Power Off")]
    RemotePowerOff = 0x15,
    #[error("Connection Terminated By Local Host")]
    ConnectionTerminatedByLocalHost = 0x16,
    #[error("Repeated Attempts")]
    RepeatedAttempts = 0x17,
    #[error("Pairing Not Allowed")]
    PairingNotAllowed = 0x18,
    #[error("Unknown LMP PDU")]
    UnknownLmpPdu = 0x19,
    #[error("Unsupported Remote Feature")]
    UnsupportedRemoteFeature = 0x1A,
    #[error("SCO Offset Rejected")]
    ScoOffsetRejected = 0x1B,
    #[error("SCO Interval Rejected")]
    ScoIntervalRejected = 0x1C,
    #[error("SCO Air Mode Rejected")]
    ScoAirModeRejected = 0x1D,
    #[error("Invalid LMP Parameters")]
    InvalidLmpParameters = 0x1E,
    #[error("Unspecified Error")]
    UnspecifiedError = 0x1F,
    #[error("Unsupported LMP Parameter Value")]
    UnsupportedLmpParameterValue = 0x20,
    #[error("Role Change Not Allowed")]
    RoleChangeNotAllowed = 0x21,
    #[error("LMP Response Timeout / LL Response Timeout")]
    LlResponseTimeout = 0x22,
    #[error("LMP Error Transaction Collision")]
    LmpErrorTransactionCollision = 0x23,
    #[error("LMP PDU Not Allowed")]
    LmpPduNotAllowed = 0x24,
    #[error("Encryption Mode Not Acceptable")]
    EncryptionModeNotAcceptable = 0x25,
    #[error("Link Key cannot be Changed")]
    LinkKeyCannotBeChanged = 0x26,
    #[error("Requested QoS Not Supported")]
    RequestedQosNotSupported = 0x27,
    #[error("Instant Passed")]
    InstantPassed = 0x28,
    #[error("Pairing With Unit Key Not Supported")]
    PairingWithUnitKeyNotSupported = 0x29,
    #[error("Different Transaction Collision")]
    DifferentTransactionCollision = 0x2A,
    #[error("QoS Unacceptable Parameter")]
    QosUnacceptableParameter = 0x2C,
    #[error("QoS Rejected")]
    QosRejected = 0x2D,
    #[error("Channel Assessment Not Supported")]
    ChannelAssessmentNotSupported = 0x2E,
    #[error("Insufficient Security")]
    InsufficientSecurity = 0x2F,
    #[error("Parameter Out Of Mandatory Range")]
    ParameterOutOfMandatoryRange = 0x30,
    #[error("Role Switch Pending")]
    RoleSwitchPending = 0x32,
    #[error("Reserved Slot Violation")]
    ReservedSlotViolation = 0x34,
    #[error("Role Switch Failed")]
    RoleSwitchFailed = 0x35,
    #[error("Controller Busy")]
    ControllerBusy = 0x3A,
    #[error("Unacceptable Connection Parameters")]
    UnacceptableConnectionParameters = 0x3B,
    #[error("Directed Advertising Timeout")]
    DirectedAdvertisingTimeout = 0x3C,
    #[error("Connection Terminated due to MIC Failure")]
    MicFailure = 0x3D,
    #[error("Connection Failed to be Established")]
    ConnectionFailedToBeEstablished = 0x3E,
}
