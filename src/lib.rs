//! In-memory record store for a single DNS zone's master file.
//!
//! Load a zone, look records up by their content-derived `hashid`, mutate
//! them through the CRUD operations on [`Zone`], and write the zone back
//! with an automatically advanced SOA serial.

pub mod checksum;
pub mod context;
pub mod errors;
pub mod parser;
pub mod rdata;
pub mod record;
pub mod zone;

pub use checksum::checksum;
pub use context::{load, manage};
pub use errors::{Result, ZoneError};
pub use parser::ZoneParser;
pub use rdata::{RdClass, RdType, RecordData};
pub use record::Record;
pub use zone::Zone;

/// Zone constants
pub mod constants {
    /// Default TTL if not specified (1 hour)
    pub const DEFAULT_TTL: u32 = 3600;

    /// Maximum zone file size (10MB)
    pub const MAX_ZONE_FILE_SIZE: usize = 10 * 1024 * 1024;
}
