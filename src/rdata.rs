//! Record types, classes, and the type-specific record-data codec.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::errors::{Result, ZoneError};
use crate::zone::relativize;

/// Resource record types supported in zone files
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RdType {
    A,
    AAAA,
    NS,
    CNAME,
    PTR,
    MX,
    TXT,
    SOA,
    SRV,
    CAA,
}

impl RdType {
    /// Parse a type mnemonic (case-insensitive)
    pub fn from_text(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RdType::A),
            "AAAA" => Ok(RdType::AAAA),
            "NS" => Ok(RdType::NS),
            "CNAME" => Ok(RdType::CNAME),
            "PTR" => Ok(RdType::PTR),
            "MX" => Ok(RdType::MX),
            "TXT" => Ok(RdType::TXT),
            "SOA" => Ok(RdType::SOA),
            "SRV" => Ok(RdType::SRV),
            "CAA" => Ok(RdType::CAA),
            _ => Err(ZoneError::UnknownType(s.to_string())),
        }
    }

    pub fn to_text(self) -> &'static str {
        match self {
            RdType::A => "A",
            RdType::AAAA => "AAAA",
            RdType::NS => "NS",
            RdType::CNAME => "CNAME",
            RdType::PTR => "PTR",
            RdType::MX => "MX",
            RdType::TXT => "TXT",
            RdType::SOA => "SOA",
            RdType::SRV => "SRV",
            RdType::CAA => "CAA",
        }
    }
}

impl std::fmt::Display for RdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_text())
    }
}

/// Resource record classes
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RdClass {
    #[default]
    IN,
    CS,
    CH,
    HS,
}

impl RdClass {
    /// Parse a class mnemonic (case-insensitive)
    pub fn from_text(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "IN" => Ok(RdClass::IN),
            "CS" => Ok(RdClass::CS),
            "CH" => Ok(RdClass::CH),
            "HS" => Ok(RdClass::HS),
            _ => Err(ZoneError::UnknownClass(s.to_string())),
        }
    }

    pub fn to_text(self) -> &'static str {
        match self {
            RdClass::IN => "IN",
            RdClass::CS => "CS",
            RdClass::CH => "CH",
            RdClass::HS => "HS",
        }
    }
}

impl std::fmt::Display for RdClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_text())
    }
}

/// Parse a TTL or interval value, with `s`/`m`/`h`/`d`/`w` suffixes
pub(crate) fn parse_ttl(s: &str) -> Result<u32> {
    let s = s.to_lowercase();

    let (num, unit) = match s.bytes().last() {
        Some(b's') => (&s[..s.len() - 1], 1),
        Some(b'm') => (&s[..s.len() - 1], 60),
        Some(b'h') => (&s[..s.len() - 1], 3600),
        Some(b'd') => (&s[..s.len() - 1], 86400),
        Some(b'w') => (&s[..s.len() - 1], 604800),
        _ => (s.as_str(), 1),
    };

    num.parse::<u32>()
        .map(|n| n * unit)
        .map_err(|_| ZoneError::InvalidTtl(s.to_string()))
}

/// The type-specific payload of a single resource record.
///
/// Immutable once constructed, except for the SOA serial which the zone
/// store rewrites on save. Domain-name fields are stored relativized to the
/// zone origin (`@` for the apex; names outside the zone stay absolute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Ptr(String),
    Mx {
        preference: u16,
        exchange: String,
    },
    Txt(Vec<String>),
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Caa {
        flags: u8,
        tag: String,
        value: String,
    },
}

impl RecordData {
    /// Parse record content in master-file text form.
    ///
    /// `origin` is the zone origin used to relativize domain-name fields.
    pub fn parse(rdtype: RdType, text: &str, origin: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ZoneError::MalformedContent(format!(
                "empty content for {rdtype} record"
            )));
        }

        match rdtype {
            RdType::A => Self::parse_a(text),
            RdType::AAAA => Self::parse_aaaa(text),
            RdType::NS => Ok(RecordData::Ns(Self::parse_name(text, origin, "NS")?)),
            RdType::CNAME => Ok(RecordData::Cname(Self::parse_name(text, origin, "CNAME")?)),
            RdType::PTR => Ok(RecordData::Ptr(Self::parse_name(text, origin, "PTR")?)),
            RdType::MX => Self::parse_mx(text, origin),
            RdType::TXT => Self::parse_txt(text),
            RdType::SOA => Self::parse_soa(text, origin),
            RdType::SRV => Self::parse_srv(text, origin),
            RdType::CAA => Self::parse_caa(text),
        }
    }

    /// Render the canonical text form used in record identity and on save
    pub fn to_text(&self) -> String {
        match self {
            RecordData::A(addr) => addr.to_string(),
            RecordData::Aaaa(addr) => addr.to_string(),
            RecordData::Ns(name) | RecordData::Cname(name) | RecordData::Ptr(name) => name.clone(),
            RecordData::Mx {
                preference,
                exchange,
            } => format!("{preference} {exchange}"),
            RecordData::Txt(chunks) => chunks
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(" "),
            RecordData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => format!("{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}"),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}"),
            RecordData::Caa { flags, tag, value } => format!("{flags} {tag} \"{value}\""),
        }
    }

    fn parse_a(text: &str) -> Result<Self> {
        let addr: Ipv4Addr = text
            .parse()
            .map_err(|_| ZoneError::MalformedContent(format!("invalid IPv4 address: {text}")))?;
        Ok(RecordData::A(addr))
    }

    fn parse_aaaa(text: &str) -> Result<Self> {
        let addr: Ipv6Addr = text
            .parse()
            .map_err(|_| ZoneError::MalformedContent(format!("invalid IPv6 address: {text}")))?;
        Ok(RecordData::Aaaa(addr))
    }

    fn parse_name(text: &str, origin: &str, rdtype: &str) -> Result<String> {
        let mut parts = text.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(name), None) => Ok(relativize(name, origin)),
            _ => Err(ZoneError::MalformedContent(format!(
                "{rdtype} record requires a single domain name, got: {text}"
            ))),
        }
    }

    fn parse_mx(text: &str, origin: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(ZoneError::MalformedContent(format!(
                "MX record requires 2 fields, got {}",
                parts.len()
            )));
        }

        let preference: u16 = parts[0]
            .parse()
            .map_err(|_| ZoneError::MalformedContent(format!("invalid MX preference: {}", parts[0])))?;

        Ok(RecordData::Mx {
            preference,
            exchange: relativize(parts[1], origin),
        })
    }

    fn parse_txt(text: &str) -> Result<Self> {
        // Tokenize into character-strings; unquoted words each become one
        // chunk, matching master-file conventions
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for ch in text.chars() {
            match ch {
                '"' => {
                    if in_quotes {
                        chunks.push(std::mem::take(&mut current));
                        in_quotes = false;
                    } else {
                        if !current.is_empty() {
                            chunks.push(std::mem::take(&mut current));
                        }
                        in_quotes = true;
                    }
                }
                c if c.is_whitespace() && !in_quotes => {
                    if !current.is_empty() {
                        chunks.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }

        if in_quotes {
            return Err(ZoneError::MalformedContent(format!(
                "unterminated quoted string in TXT content: {text}"
            )));
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        if chunks.is_empty() {
            return Err(ZoneError::MalformedContent(
                "TXT record requires at least one character-string".to_string(),
            ));
        }
        for chunk in &chunks {
            if chunk.len() > 255 {
                return Err(ZoneError::MalformedContent(format!(
                    "TXT character-string exceeds 255 bytes: {} bytes",
                    chunk.len()
                )));
            }
        }

        Ok(RecordData::Txt(chunks))
    }

    fn parse_soa(text: &str, origin: &str) -> Result<Self> {
        // SOA format: mname rname serial refresh retry expire minimum
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 7 {
            return Err(ZoneError::MalformedContent(format!(
                "SOA record requires 7 fields, got {}",
                parts.len()
            )));
        }

        let serial: u32 = parts[2]
            .parse()
            .map_err(|_| ZoneError::MalformedContent(format!("invalid SOA serial: {}", parts[2])))?;

        let mut intervals = [0u32; 4];
        for (slot, part) in intervals.iter_mut().zip(&parts[3..7]) {
            *slot = parse_ttl(part).map_err(|_| {
                ZoneError::MalformedContent(format!("invalid SOA interval: {part}"))
            })?;
        }

        Ok(RecordData::Soa {
            mname: relativize(parts[0], origin),
            rname: relativize(parts[1], origin),
            serial,
            refresh: intervals[0],
            retry: intervals[1],
            expire: intervals[2],
            minimum: intervals[3],
        })
    }

    fn parse_srv(text: &str, origin: &str) -> Result<Self> {
        // SRV format: priority weight port target
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(ZoneError::MalformedContent(format!(
                "SRV record requires 4 fields, got {}",
                parts.len()
            )));
        }

        let mut numbers = [0u16; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts[..3]) {
            *slot = part.parse().map_err(|_| {
                ZoneError::MalformedContent(format!("invalid SRV numeric value: {part}"))
            })?;
        }

        Ok(RecordData::Srv {
            priority: numbers[0],
            weight: numbers[1],
            port: numbers[2],
            target: relativize(parts[3], origin),
        })
    }

    fn parse_caa(text: &str) -> Result<Self> {
        // CAA format: flags tag value
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(ZoneError::MalformedContent(format!(
                "CAA record requires 3 fields, got {}",
                parts.len()
            )));
        }

        let flags: u8 = parts[0]
            .parse()
            .map_err(|_| ZoneError::MalformedContent(format!("invalid CAA flags: {}", parts[0])))?;

        Ok(RecordData::Caa {
            flags,
            tag: parts[1].to_string(),
            value: parts[2..].join(" ").trim_matches('"').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "example.com.";

    #[test]
    fn test_type_mnemonics() {
        assert_eq!(RdType::from_text("mx").unwrap(), RdType::MX);
        assert_eq!(RdType::from_text("AAAA").unwrap(), RdType::AAAA);
        assert_eq!(RdType::MX.to_text(), "MX");
        assert!(matches!(
            RdType::from_text("ERR"),
            Err(ZoneError::UnknownType(_))
        ));
    }

    #[test]
    fn test_class_mnemonics() {
        assert_eq!(RdClass::from_text("in").unwrap(), RdClass::IN);
        assert!(matches!(
            RdClass::from_text("XX"),
            Err(ZoneError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_parse_ttl_suffixes() {
        assert_eq!(parse_ttl("300").unwrap(), 300);
        assert_eq!(parse_ttl("5m").unwrap(), 300);
        assert_eq!(parse_ttl("1h").unwrap(), 3600);
        assert_eq!(parse_ttl("2d").unwrap(), 172800);
        assert_eq!(parse_ttl("4w").unwrap(), 2419200);
        assert!(parse_ttl("soon").is_err());
    }

    #[test]
    fn test_parse_a() {
        let rdata = RecordData::parse(RdType::A, "192.0.2.1", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "192.0.2.1");
        assert!(matches!(
            RecordData::parse(RdType::A, "192.0.2.256", ORIGIN),
            Err(ZoneError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_parse_aaaa_canonical() {
        let rdata = RecordData::parse(RdType::AAAA, "2001:db8:10:0::1", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "2001:db8:10::1");
    }

    #[test]
    fn test_parse_mx_relativizes_exchange() {
        let rdata = RecordData::parse(RdType::MX, "10 mail.example.com.", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "10 mail");

        let external = RecordData::parse(RdType::MX, "20 mx.example.net.", ORIGIN).unwrap();
        assert_eq!(external.to_text(), "20 mx.example.net.");
    }

    #[test]
    fn test_parse_cname_apex() {
        let rdata = RecordData::parse(RdType::CNAME, "example.com.", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "@");
    }

    #[test]
    fn test_parse_txt_quoting() {
        // Unquoted words each become one character-string
        let rdata = RecordData::parse(RdType::TXT, "hello, world!", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "\"hello,\" \"world!\"");

        // Quoted content is a single chunk, spaces preserved
        let rdata = RecordData::parse(RdType::TXT, "\"v=spf1 mx -all\"", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "\"v=spf1 mx -all\"");

        assert!(matches!(
            RecordData::parse(RdType::TXT, "\"unterminated", ORIGIN),
            Err(ZoneError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_parse_soa() {
        let rdata = RecordData::parse(
            RdType::SOA,
            "ns.example.com. username.example.com. 2007120710 1d 2h 4w 1h",
            ORIGIN,
        )
        .unwrap();
        assert_eq!(
            rdata.to_text(),
            "ns username 2007120710 86400 7200 2419200 3600"
        );

        assert!(matches!(
            RecordData::parse(RdType::SOA, "ns username 2007120710", ORIGIN),
            Err(ZoneError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_parse_srv() {
        let rdata =
            RecordData::parse(RdType::SRV, "0 5 5060 sip.example.com.", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "0 5 5060 sip");
    }

    #[test]
    fn test_parse_caa() {
        let rdata = RecordData::parse(RdType::CAA, "0 issue \"ca.example.net\"", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "0 issue \"ca.example.net\"");
    }

    #[test]
    fn test_parse_caa_loose_whitespace() {
        // Doubled spaces and tabs between fields must not shift the tag
        let rdata =
            RecordData::parse(RdType::CAA, "0  issue\t\"ca.example.net\"", ORIGIN).unwrap();
        assert_eq!(rdata.to_text(), "0 issue \"ca.example.net\"");

        assert!(matches!(
            RecordData::parse(RdType::CAA, "0 issue", ORIGIN),
            Err(ZoneError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_empty_content_rejected() {
        assert!(matches!(
            RecordData::parse(RdType::TXT, "   ", ORIGIN),
            Err(ZoneError::MalformedContent(_))
        ));
    }
}
