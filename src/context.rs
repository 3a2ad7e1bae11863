//! Load zones from disk and manage scoped zone sessions.

use std::path::Path;

use tracing::info;

use crate::errors::Result;
use crate::parser::ZoneParser;
use crate::zone::Zone;

/// Read a master zone file and construct a [`Zone`].
///
/// `origin` is required when the file carries no `$ORIGIN` directive.
pub fn load<P: AsRef<Path>>(filename: P, origin: Option<&str>) -> Result<Zone> {
    let path = filename.as_ref();
    let mut parser = ZoneParser::new();
    let zone = parser.parse_file(path, origin)?;
    info!(
        "loaded zone {} ({} records) from {}",
        zone.origin(),
        zone.records().len(),
        path.display()
    );
    Ok(zone)
}

/// Load a zone, run `f` on it, and release it.
///
/// With `autosave`, the zone is written back (serial bumped) on every exit
/// path, including when `f` fails; the closure's error takes precedence over
/// a save error.
pub fn manage<P, T, F>(filename: P, origin: Option<&str>, autosave: bool, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&mut Zone) -> Result<T>,
{
    let mut zone = load(filename, origin)?;
    let result = f(&mut zone);

    if autosave {
        let saved = zone.save(None, true);
        let value = result?;
        saved?;
        Ok(value)
    } else {
        result
    }
}
