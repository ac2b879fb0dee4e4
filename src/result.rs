pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {:?}.", source)]
    IO {
        #[source]
        source: ::std::io::Error,
    },
    #[error("Expected at least {} bytes of parameters but only {} were available.", expected, actual)]
    Truncated { expected: usize, actual: usize },
    #[error("Unknown packet indicator: {:x}.", indicator)]
    UnknownPacketIndicator { indicator: u8 },
    #[error("The packet contained invalid data.")]
    InvalidData,
    #[error(
        "Parameters of {} bytes are too long; the maximum length is {} bytes.",
        len,
        max_len
    )]
    ParameterTooLong { len: usize, max_len: usize },
    #[error("The HCI transport has been closed.")]
    TransportClosed,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO { source: err }
    }
}
