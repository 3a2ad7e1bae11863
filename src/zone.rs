//! The zone store: nodes, record sets, CRUD, and the SOA serial manager.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use tracing::{debug, info};

use crate::errors::{Result, ZoneError};
use crate::rdata::{RdClass, RdType, RecordData};
use crate::record::Record;

/// Normalize a zone origin to lowercase, trailing-dot form
pub(crate) fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim().to_lowercase();
    if origin.ends_with('.') {
        origin
    } else {
        format!("{origin}.")
    }
}

/// Make a name absolute against an origin in trailing-dot form
pub(crate) fn absolutize(name: &str, origin: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "@" {
        origin.to_string()
    } else if name.ends_with('.') {
        name.to_lowercase()
    } else {
        format!("{}.{origin}", name.to_lowercase())
    }
}

/// Relativize a name to an origin: `@` for the apex, the bare prefix for
/// names inside the zone, and the absolute form for names outside it
pub(crate) fn relativize(name: &str, origin: &str) -> String {
    let name = absolutize(name, origin);
    if name == origin {
        return "@".to_string();
    }
    match name.strip_suffix(&format!(".{origin}")) {
        Some(prefix) => prefix.to_string(),
        None => name,
    }
}

/// A (type, class) bucket of record-data values sharing a TTL at one node
#[derive(Clone, Debug)]
struct RecordSet {
    rdclass: RdClass,
    rdtype: RdType,
    ttl: u32,
    rdatas: Vec<RecordData>,
}

/// A domain name's container for all record sets at that name
#[derive(Clone, Debug, Default)]
struct Node {
    sets: Vec<RecordSet>,
}

/// An in-memory DNS zone: all resource records under one origin.
///
/// Nodes are keyed by name relativized to the origin, record sets and
/// record data keep insertion order, so enumeration order is stable for a
/// given zone instance. Not synchronized; callers serialize access.
#[derive(Clone, Debug)]
pub struct Zone {
    origin: String,
    default_ttl: u32,
    file_path: Option<PathBuf>,
    nodes: BTreeMap<String, Node>,
}

impl Zone {
    /// Create a new empty zone for the given origin
    pub fn new(origin: &str, default_ttl: u32) -> Self {
        Self {
            origin: normalize_origin(origin),
            default_ttl,
            file_path: None,
            nodes: BTreeMap::new(),
        }
    }

    /// The zone origin in trailing-dot form, e.g. `example.com.`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Default TTL applied to records added without an explicit TTL
    pub fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// The file this zone was loaded from, if any
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub(crate) fn set_file_path(&mut self, path: PathBuf) {
        self.file_path = Some(path);
    }

    /// Every record in the zone, in stable enumeration order
    pub fn records(&self) -> Vec<Record> {
        let mut result = Vec::new();
        for (name, node) in &self.nodes {
            for set in &node.sets {
                for rdata in &set.rdatas {
                    result.push(self.project(name, set, rdata));
                }
            }
        }
        result
    }

    /// All records of the given type; `"ANY"` (case-insensitive) matches all
    pub fn get_records(&self, rdtype: &str) -> Result<Vec<Record>> {
        if rdtype.eq_ignore_ascii_case("ANY") {
            return Ok(self.records());
        }
        let rdtype = RdType::from_text(rdtype)?;
        Ok(self
            .records()
            .into_iter()
            .filter(|r| r.rdtype() == rdtype)
            .collect())
    }

    /// Look up a record by hashid. Linear scan; hashids depend on the full
    /// record text, so no index is kept.
    pub fn get_record(&self, hashid: &str) -> Result<Record> {
        self.records()
            .into_iter()
            .find(|r| r.hashid() == hashid)
            .ok_or_else(|| ZoneError::NotFound(format!("hashid {hashid} not found in zone")))
    }

    /// Filter records by type and, optionally, exact name and/or content.
    ///
    /// The name is relativized before matching. TXT content is compared in
    /// its stored quoted form, so the caller passes it unquoted.
    pub fn find_record(
        &self,
        rdtype: &str,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<Vec<Record>> {
        let name = name.map(|n| relativize(n, &self.origin));
        let content = content.map(|c| {
            if rdtype.eq_ignore_ascii_case("TXT") {
                format!("\"{c}\"")
            } else {
                c.to_string()
            }
        });

        Ok(self
            .get_records(rdtype)?
            .into_iter()
            .filter(|r| {
                name.as_deref().is_none_or(|n| r.name() == n)
                    && content.as_deref().is_none_or(|c| r.content() == c)
            })
            .collect())
    }

    /// Add a record with class `IN` and the zone's default TTL
    pub fn add_record(&mut self, name: &str, rdtype: &str, content: &str) -> Result<Record> {
        self.add_record_with(name, rdtype, content, "IN", None)
    }

    /// Add a record, parsing `content` with the type-specific codec.
    ///
    /// The node and record set for (name, type, class) are created on first
    /// use. An existing set keeps the smaller of its TTL and the given one.
    pub fn add_record_with(
        &mut self,
        name: &str,
        rdtype: &str,
        content: &str,
        rdclass: &str,
        ttl: Option<u32>,
    ) -> Result<Record> {
        let rdtype = RdType::from_text(rdtype)?;
        let rdclass = RdClass::from_text(rdclass)?;
        let rdata = RecordData::parse(rdtype, content, &self.origin)?;
        let name = relativize(name, &self.origin);
        let ttl = ttl.unwrap_or(self.default_ttl);
        Ok(self.insert_rdata(&name, rdclass, rdtype, ttl, rdata))
    }

    /// Remove the record with the given hashid.
    ///
    /// With `cascade`, a record set emptied by the removal is deleted, and
    /// the node too when that set was the only one at the name.
    pub fn remove_record(&mut self, hashid: &str, cascade: bool) -> Result<()> {
        let record = self.get_record(hashid)?;
        let name = record.name().to_string();

        // Scope the node borrow; the cascade may drop the node itself
        let (set_index, set_empty, only_set) = {
            let node = self
                .nodes
                .get_mut(&name)
                .ok_or_else(|| ZoneError::NotFound(format!("no node for name {name}")))?;

            let set_index = node
                .sets
                .iter()
                .position(|s| s.rdtype == record.rdtype() && s.rdclass == record.rdclass())
                .ok_or_else(|| {
                    ZoneError::NotFound(format!("no {} record set at {name}", record.rdtype()))
                })?;

            let set = &mut node.sets[set_index];
            let rdata_index = set
                .rdatas
                .iter()
                .position(|rd| rd.to_text() == record.content())
                .ok_or_else(|| ZoneError::NotFound(format!("hashid {hashid} not found in zone")))?;
            set.rdatas.remove(rdata_index);

            (set_index, set.rdatas.is_empty(), node.sets.len() == 1)
        };

        if cascade && set_empty {
            if only_set {
                // The node holds only the now-empty set; drop the node
                self.nodes.remove(&name);
            } else if let Some(node) = self.nodes.get_mut(&name) {
                node.sets.remove(set_index);
            }
        }

        debug!("removed record {hashid} from {name}");
        Ok(())
    }

    /// Replace a record's content, keeping its name, type, class, and TTL.
    ///
    /// The new content is parsed before the old record is touched, so a
    /// malformed replacement leaves the zone unchanged. Returns the new
    /// record; its hashid differs from the old one, which stops resolving.
    pub fn update_record(&mut self, hashid: &str, content: &str) -> Result<Record> {
        let record = self.get_record(hashid)?;
        let rdata = RecordData::parse(record.rdtype(), content, &self.origin)?;

        // No cascade: the set survives empty so type and TTL carry over
        self.remove_record(hashid, false)?;
        let name = record.name().to_string();
        Ok(self.insert_rdata(
            &name,
            record.rdclass(),
            record.rdtype(),
            record.ttl(),
            rdata,
        ))
    }

    /// The zone's SOA record
    pub fn soa(&self) -> Result<Record> {
        self.get_records("SOA")?
            .into_iter()
            .next()
            .ok_or_else(|| ZoneError::NotFound("zone has no SOA record".to_string()))
    }

    /// The serial field of the zone's SOA record
    pub fn soa_serial(&self) -> Result<u32> {
        match self.soa_rdata() {
            Some(RecordData::Soa { serial, .. }) => Ok(*serial),
            _ => Err(ZoneError::NotFound("zone has no SOA record".to_string())),
        }
    }

    /// Render the zone as master-file text, with `$ORIGIN` and `$TTL`
    /// directives so the output is self-describing
    pub fn to_text(&self) -> String {
        let mut out = format!("$ORIGIN {}\n$TTL {}\n\n", self.origin, self.default_ttl);
        for record in self.records() {
            out.push_str(&record.to_text());
            out.push('\n');
        }
        out
    }

    /// Write the zone master file, replacing the destination in full.
    ///
    /// Without `filename`, the file the zone was loaded from is rewritten.
    /// With `autoserial`, the SOA serial is advanced first; note this changes
    /// the SOA record's hashid.
    pub fn save(&mut self, filename: Option<&Path>, autoserial: bool) -> Result<()> {
        if autoserial {
            self.increment_serial()?;
        }

        let path = match filename {
            Some(p) => p.to_path_buf(),
            None => self
                .file_path
                .clone()
                .ok_or_else(|| ZoneError::Io("zone has no associated file".to_string()))?,
        };

        fs::write(&path, self.to_text())?;
        info!("saved zone {} to {}", self.origin, path.display());
        Ok(())
    }

    /// Advance the SOA serial: the candidate is today's date as YYYYMMDD00;
    /// when that does not exceed the current serial, current + 1 is used
    fn increment_serial(&mut self) -> Result<u32> {
        let current = self.soa_serial()?;

        let now = Local::now();
        let candidate = now.year() as u32 * 1_000_000 + now.month() * 10_000 + now.day() * 100;
        let next = if candidate <= current {
            current.checked_add(1).ok_or_else(|| {
                ZoneError::InvalidArgument(format!("SOA serial {current} cannot be incremented"))
            })?
        } else {
            candidate
        };

        if let Some(RecordData::Soa { serial, .. }) = self.soa_rdata_mut() {
            *serial = next;
        }

        debug!("zone {} serial {current} -> {next}", self.origin);
        Ok(next)
    }

    fn soa_rdata(&self) -> Option<&RecordData> {
        self.nodes.get("@").and_then(|node| {
            node.sets
                .iter()
                .find(|s| s.rdtype == RdType::SOA)
                .and_then(|s| s.rdatas.first())
        })
    }

    fn soa_rdata_mut(&mut self) -> Option<&mut RecordData> {
        self.nodes.get_mut("@").and_then(|node| {
            node.sets
                .iter_mut()
                .find(|s| s.rdtype == RdType::SOA)
                .and_then(|s| s.rdatas.first_mut())
        })
    }

    /// Append already-parsed record data, creating the node and record set
    /// on first use, and return the new record's projection
    pub(crate) fn insert_rdata(
        &mut self,
        name: &str,
        rdclass: RdClass,
        rdtype: RdType,
        ttl: u32,
        rdata: RecordData,
    ) -> Record {
        let node = self.nodes.entry(name.to_string()).or_default();

        let index = match node
            .sets
            .iter()
            .position(|s| s.rdtype == rdtype && s.rdclass == rdclass)
        {
            Some(i) => {
                let set = &mut node.sets[i];
                if set.rdatas.is_empty() {
                    set.ttl = ttl;
                } else {
                    set.ttl = set.ttl.min(ttl);
                }
                i
            }
            None => {
                node.sets.push(RecordSet {
                    rdclass,
                    rdtype,
                    ttl,
                    rdatas: Vec::new(),
                });
                node.sets.len() - 1
            }
        };

        let set = &mut node.sets[index];
        let content = rdata.to_text();
        set.rdatas.push(rdata);
        Record::new(
            self.origin.clone(),
            name.to_string(),
            set.ttl,
            rdclass,
            rdtype,
            content,
        )
    }

    fn project(&self, name: &str, set: &RecordSet, rdata: &RecordData) -> Record {
        Record::new(
            self.origin.clone(),
            name.to_string(),
            set.ttl,
            set.rdclass,
            set.rdtype,
            rdata.to_text(),
        )
    }
}
