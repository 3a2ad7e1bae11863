//! The read-only record view handed out by the zone store.

use crate::checksum::record_hashid;
use crate::rdata::{RdClass, RdType};

/// A single resource record, projected from the zone's internal structure.
///
/// Records are never stored; the zone store constructs them on demand from a
/// node / record-set / record-data triple. Identity is the `hashid`: a
/// checksum of the record's canonical text, computed once at construction.
/// A hashid is only valid against the zone state it was issued from; any
/// change to the record's text (including the SOA serial rewrite on save)
/// yields a different hashid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    hashid: String,
    origin: String,
    name: String,
    ttl: u32,
    rdclass: RdClass,
    rdtype: RdType,
    content: String,
}

impl Record {
    /// Only the zone store mints records
    pub(crate) fn new(
        origin: String,
        name: String,
        ttl: u32,
        rdclass: RdClass,
        rdtype: RdType,
        content: String,
    ) -> Self {
        let hashid = record_hashid(&format!("{name} {ttl} {rdclass} {rdtype} {content}"));
        Self {
            hashid,
            origin,
            name,
            ttl,
            rdclass,
            rdtype,
            content,
        }
    }

    /// The record's identity: checksum of `to_text()`
    pub fn hashid(&self) -> &str {
        &self.hashid
    }

    /// Owner name, relativized to the zone origin (`@` for the apex)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zone origin this record belongs to
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// TTL inherited from the record's set
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn rdclass(&self) -> RdClass {
        self.rdclass
    }

    pub fn rdtype(&self) -> RdType {
        self.rdtype
    }

    /// Canonical text form of the record data
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Master-file line for this record: `name ttl class type content`
    pub fn to_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name, self.ttl, self.rdclass, self.rdtype, self.content
        )
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
