//! RFC 1035 master-file parser.
//!
//! This is the zone store's external collaborator: it turns master-file text
//! into a populated [`Zone`]. Record content is validated through the
//! type-specific codec at load time.

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::constants;
use crate::errors::{Result, ZoneError};
use crate::rdata::{RdClass, RdType, RecordData, parse_ttl};
use crate::zone::{Zone, absolutize, normalize_origin, relativize};

/// A record line with its owner name resolved to absolute form
struct PendingRecord {
    fqdn: String,
    ttl: Option<u32>,
    rdclass: RdClass,
    rdtype: RdType,
    rdata: String,
}

/// Zone file parser
pub struct ZoneParser {
    /// Origin for relative names, in trailing-dot form; empty until known
    current_origin: String,
    /// Zone origin: the supplied one, or the first `$ORIGIN` in the file
    zone_origin: Option<String>,
    /// Default TTL from `$TTL`
    current_ttl: Option<u32>,
    /// Current class
    current_class: RdClass,
    /// Owner name of the previous record, for whitespace-led lines
    last_name: Option<String>,
    /// Line number for error reporting
    line_number: usize,
}

impl ZoneParser {
    pub fn new() -> Self {
        Self {
            current_origin: String::new(),
            zone_origin: None,
            current_ttl: None,
            current_class: RdClass::IN,
            last_name: None,
            line_number: 0,
        }
    }

    /// Parse a zone file from path
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P, origin: Option<&str>) -> Result<Zone> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        if contents.len() > constants::MAX_ZONE_FILE_SIZE {
            return Err(ZoneError::FileTooLarge);
        }

        let mut zone = self.parse(&contents, origin)?;
        zone.set_file_path(path.to_path_buf());
        Ok(zone)
    }

    /// Parse zone file contents.
    ///
    /// `origin` supplies the zone origin when the file carries no `$ORIGIN`;
    /// a record line seen before any origin is known fails with
    /// `UnknownOrigin`.
    pub fn parse(&mut self, contents: &str, origin: Option<&str>) -> Result<Zone> {
        self.line_number = 0;
        if let Some(origin) = origin {
            let origin = normalize_origin(origin);
            self.current_origin = origin.clone();
            self.zone_origin = Some(origin);
        }

        let mut pending: Vec<PendingRecord> = Vec::new();

        // Buffer for multi-line records
        let mut multi_line_buffer = String::new();
        let mut in_parentheses = false;
        let mut paren_start_line = 0;

        for line in contents.lines() {
            self.line_number += 1;

            let line = strip_comments(line);
            if line.trim().is_empty() && !in_parentheses {
                continue;
            }

            trace!("parsing line {}: {}", self.line_number, line);

            let (opens, closes) = unquoted_parens(line);

            if in_parentheses {
                multi_line_buffer.push(' ');
                multi_line_buffer.push_str(line.trim());

                if closes && !opens {
                    in_parentheses = false;
                    let complete_line = std::mem::take(&mut multi_line_buffer);
                    let record = self.resolve_record(&complete_line).map_err(|e| {
                        annotate_span(e, paren_start_line, self.line_number)
                    })?;
                    pending.push(record);
                }
                continue;
            }

            if opens && !closes {
                in_parentheses = true;
                paren_start_line = self.line_number;
                multi_line_buffer = line.to_string();
                continue;
            }

            if line.trim_start().starts_with('$') {
                self.parse_directive(line, &mut pending)?;
                continue;
            }

            let record = self
                .resolve_record(line)
                .map_err(|e| annotate_line(e, self.line_number))?;
            pending.push(record);
        }

        if in_parentheses {
            return Err(ZoneError::ParseError(format!(
                "unclosed parentheses starting at line {paren_start_line}"
            )));
        }

        let origin = self.zone_origin.clone().ok_or_else(|| {
            ZoneError::UnknownOrigin(
                "zone file has no $ORIGIN directive and no origin was supplied".to_string(),
            )
        })?;

        let mut zone = Zone::new(&origin, self.current_ttl.unwrap_or(constants::DEFAULT_TTL));

        for record in pending {
            let name = relativize(&record.fqdn, zone.origin());
            let rdata = RecordData::parse(record.rdtype, &record.rdata, zone.origin())?;
            let ttl = record.ttl.unwrap_or(zone.default_ttl());
            zone.insert_rdata(&name, record.rdclass, record.rdtype, ttl, rdata);
        }

        debug!(
            "parsed zone {} with {} records",
            zone.origin(),
            zone.records().len()
        );

        Ok(zone)
    }

    /// Parse a directive line
    fn parse_directive(&mut self, line: &str, pending: &mut Vec<PendingRecord>) -> Result<()> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(());
        }

        match parts[0].to_uppercase().as_str() {
            "$ORIGIN" => {
                if parts.len() < 2 {
                    return Err(ZoneError::ParseError(
                        "$ORIGIN requires a domain name".to_string(),
                    ));
                }
                let origin = normalize_origin(parts[1]);
                debug!("set origin to {origin}");
                self.current_origin = origin.clone();
                if self.zone_origin.is_none() {
                    self.zone_origin = Some(origin);
                }
            }
            "$TTL" => {
                if parts.len() < 2 {
                    return Err(ZoneError::ParseError("$TTL requires a value".to_string()));
                }
                let ttl = parse_ttl(parts[1])?;
                debug!("set default TTL to {ttl}");
                self.current_ttl = Some(ttl);
            }
            "$INCLUDE" => {
                if parts.len() < 2 {
                    return Err(ZoneError::ParseError(
                        "$INCLUDE requires a file path".to_string(),
                    ));
                }
                let sub_origin = parts.get(2).map(|o| normalize_origin(o));
                self.parse_include(parts[1], sub_origin, pending)?;
            }
            _ => {
                debug!("unknown directive: {}", parts[0]);
            }
        }

        Ok(())
    }

    /// Read an included file and collect its records, optionally under a
    /// different origin
    fn parse_include(
        &mut self,
        path: &str,
        sub_origin: Option<String>,
        pending: &mut Vec<PendingRecord>,
    ) -> Result<()> {
        debug!("processing $INCLUDE {path} {sub_origin:?}");

        let contents = fs::read_to_string(path).map_err(|e| {
            ZoneError::ParseError(format!("failed to read include file {path}: {e}"))
        })?;

        // Save parser state; the include runs under its own origin
        let saved_origin = self.current_origin.clone();
        let saved_line = self.line_number;
        let saved_name = self.last_name.take();

        if let Some(origin) = sub_origin {
            self.current_origin = origin;
        }
        self.line_number = 0;

        for line in contents.lines() {
            self.line_number += 1;

            let line = strip_comments(line);
            if line.trim().is_empty() {
                continue;
            }

            if line.trim_start().starts_with('$') {
                // Nested includes are honored; other directives stay local
                if line.trim_start().to_uppercase().starts_with("$INCLUDE") {
                    self.parse_directive(line, pending)?;
                }
                continue;
            }

            let record = self.resolve_record(line).map_err(|e| {
                ZoneError::ParseError(format!(
                    "error in included file {path} line {}: {e}",
                    self.line_number
                ))
            })?;
            pending.push(record);
        }

        self.current_origin = saved_origin;
        self.line_number = saved_line;
        self.last_name = saved_name;
        Ok(())
    }

    /// Parse a record line and resolve its owner name to absolute form
    fn resolve_record(&mut self, line: &str) -> Result<PendingRecord> {
        let (name, ttl, rdclass, rdtype, rdata) = self.parse_record(line)?;

        if self.current_origin.is_empty() {
            return Err(ZoneError::UnknownOrigin(
                "record seen before any origin was known".to_string(),
            ));
        }

        let fqdn = if name.is_empty() {
            self.last_name.clone().ok_or_else(|| {
                ZoneError::ParseError("record has no owner name to inherit".to_string())
            })?
        } else {
            absolutize(&name, &self.current_origin)
        };
        self.last_name = Some(fqdn.clone());

        Ok(PendingRecord {
            fqdn,
            // An explicit TTL wins; otherwise the $TTL in effect at this line
            ttl: ttl.or(self.current_ttl),
            rdclass,
            rdtype,
            rdata,
        })
    }

    /// Tokenize and parse one resource record line
    fn parse_record(
        &self,
        line: &str,
    ) -> Result<(String, Option<u32>, RdClass, RdType, String)> {
        let mut parts = Vec::new();
        let mut in_quotes = false;
        let mut in_parens = false;
        let mut current_part = String::new();

        // Split on whitespace, respecting quoted strings and parentheses
        for ch in line.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    current_part.push(ch);
                }
                '(' if !in_quotes => in_parens = true,
                ')' if !in_quotes => in_parens = false,
                ' ' | '\t' => {
                    if in_quotes || in_parens {
                        current_part.push(ch);
                    } else if !current_part.is_empty() {
                        parts.push(std::mem::take(&mut current_part));
                    }
                }
                _ => current_part.push(ch),
            }
        }
        if !current_part.is_empty() {
            parts.push(current_part);
        }

        if parts.is_empty() {
            return Err(ZoneError::ParseError("empty record line".to_string()));
        }

        let mut idx = 0;
        let name;
        let mut ttl = None;
        let mut rdclass = self.current_class;
        let mut rdtype = None;

        // A whitespace-led line inherits the previous owner name
        if line.starts_with(' ') || line.starts_with('\t') {
            name = String::new();
        } else {
            name = parts[idx].clone();
            idx += 1;
        }

        // TTL, class, and type may appear in any order before the rdata
        while idx < parts.len() && rdtype.is_none() {
            let field = &parts[idx];

            if let Ok(value) = parse_ttl(field) {
                ttl = Some(value);
                idx += 1;
                continue;
            }

            if let Ok(class) = RdClass::from_text(field) {
                rdclass = class;
                idx += 1;
                continue;
            }

            match RdType::from_text(field) {
                Ok(t) => {
                    rdtype = Some(t);
                    idx += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let rdtype =
            rdtype.ok_or_else(|| ZoneError::ParseError("missing record type".to_string()))?;

        if idx >= parts.len() {
            return Err(ZoneError::ParseError("missing record data".to_string()));
        }
        let rdata = parts[idx..].join(" ");

        Ok((name, ttl, rdclass, rdtype, rdata))
    }
}

impl Default for ZoneParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Report whether a line opens or closes a parenthesized group, ignoring
/// parentheses inside quoted strings
fn unquoted_parens(line: &str) -> (bool, bool) {
    let mut in_quotes = false;
    let mut opens = false;
    let mut closes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => opens = true,
            ')' if !in_quotes => closes = true,
            _ => {}
        }
    }
    (opens, closes)
}

/// Strip a `;` comment, honoring quoted strings
fn strip_comments(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

fn annotate_line(err: ZoneError, line: usize) -> ZoneError {
    match err {
        ZoneError::UnknownOrigin(_) => err,
        e => ZoneError::ParseError(format!("line {line}: {e}")),
    }
}

fn annotate_span(err: ZoneError, start: usize, end: usize) -> ZoneError {
    match err {
        ZoneError::UnknownOrigin(_) => err,
        e => ZoneError::ParseError(format!("lines {start}-{end}: {e}")),
    }
}
