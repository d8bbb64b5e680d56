use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A digest string could not be parsed as four 16-digit hex groups.
    #[error("malformed digest: {reason}")]
    MalformedDigest { reason: MalformedReason },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("expected 64 hex digits, found {0} bytes")]
    WrongLength(usize),
    #[error("non-hex character at byte {0}")]
    NonHexCharacter(usize),
}

impl From<MalformedReason> for Error {
    fn from(reason: MalformedReason) -> Self {
        Error::MalformedDigest { reason }
    }
}
