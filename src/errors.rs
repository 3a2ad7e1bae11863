use thiserror::Error;

/// Zone-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// No record with the given hashid (or no SOA where one is required)
    #[error("record not found: {0}")]
    NotFound(String),

    /// Unrecognized record type mnemonic
    #[error("unknown record type: {0}")]
    UnknownType(String),

    /// Unrecognized record class mnemonic
    #[error("unknown record class: {0}")]
    UnknownClass(String),

    /// Record content does not match the syntax of its type
    #[error("malformed record content: {0}")]
    MalformedContent(String),

    /// Zone file has no origin and none was supplied
    #[error("unknown zone origin: {0}")]
    UnknownOrigin(String),

    /// Bad argument to an API call (e.g. unsupported checksum size)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Zone file syntax error
    #[error("zone parse error: {0}")]
    ParseError(String),

    /// Invalid TTL value
    #[error("invalid TTL value: {0}")]
    InvalidTtl(String),

    /// Zone file exceeds maximum size
    #[error("zone file exceeds maximum size")]
    FileTooLarge,

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ZoneError {
    fn from(err: std::io::Error) -> Self {
        ZoneError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZoneError>;
