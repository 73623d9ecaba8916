//! Runtime address -> routine lookups for an instrumented execution
//!
//! The instrumentation front end writes one line per routine it saw loaded:
//!
//! ```text
//! 0x7f3a2b4c0f00;/usr/lib/libcrypto.so.1.1;BN_mod_exp_mont;1893
//! 0x401136;/home/user/rsa_1024;main;244
//! ```
//!
//! Start addresses are hex (`0x` optional), sizes are decimal and may be empty.

use log::debug;
use std::fs;
use std::path::Path;

use super::parse_address;
use crate::domain::{RoutineRecord, SymbolizeError};

/// Finds the routine a runtime address belongs to
pub trait RoutineRegistry {
    fn routine_containing(&self, address: u64) -> Option<&RoutineRecord>;
}

impl<T: RoutineRegistry + ?Sized> RoutineRegistry for &T {
    fn routine_containing(&self, address: u64) -> Option<&RoutineRecord> {
        (**self).routine_containing(address)
    }
}

/// Routines sorted by runtime start address, one record per start address
#[derive(Debug, Clone, Default)]
pub struct RoutineTable {
    routines: Vec<RoutineRecord>,
}

impl RoutineTable {
    /// Load a routine file written by the instrumentation front end
    ///
    /// # Errors
    /// Returns `SymbolizeError::Open` if the file cannot be read and
    /// `SymbolizeError::Parse` on the first malformed line
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SymbolizeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SymbolizeError::open(path, e))?;
        let table = Self::parse(&text, &path.display().to_string())?;
        debug!("Loaded {} routines from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse routine file contents; `source_name` is only used in errors
    ///
    /// # Errors
    /// Returns `SymbolizeError::Parse` on the first malformed line
    pub fn parse(text: &str, source_name: &str) -> Result<Self, SymbolizeError> {
        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_routine_line(line).map_err(|reason| SymbolizeError::Parse {
                source_name: source_name.to_string(),
                line: idx + 1,
                reason,
            })?;
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Build from records in the order the front end reported them
    ///
    /// When two records share a start address the earlier one is kept.
    pub fn from_records<I: IntoIterator<Item = RoutineRecord>>(records: I) -> Self {
        let mut routines: Vec<RoutineRecord> = records.into_iter().collect();
        routines.sort_by_key(|r| r.start_address);
        routines.dedup_by_key(|r| r.start_address);
        Self { routines }
    }

    /// `name (module+0xoffset)` for the routine containing `address`
    #[must_use]
    pub fn describe(&self, address: u64) -> Option<String> {
        let routine = self.routine_containing(address)?;
        let offset = address - routine.start_address;
        Some(format!("{} ({}+0x{offset:x})", routine.name, routine.module))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutineRecord> {
        self.routines.iter()
    }
}

impl RoutineRegistry for RoutineTable {
    /// The routine with the greatest start address not above `address`,
    /// provided `address` is within its recorded size (end inclusive)
    fn routine_containing(&self, address: u64) -> Option<&RoutineRecord> {
        let end = self.routines.partition_point(|r| r.start_address <= address);
        let routine = self.routines.get(end.checked_sub(1)?)?;
        match routine.size {
            Some(size) if address - routine.start_address > size => None,
            _ => Some(routine),
        }
    }
}

fn parse_routine_line(line: &str) -> Result<RoutineRecord, String> {
    let mut fields = line.split(';');
    let start = fields.next().unwrap_or_default().trim();
    let module = fields.next().map(str::trim);
    let name = fields.next().map(str::trim);
    let size = fields.next().map(str::trim).filter(|s| !s.is_empty());

    let start_address =
        parse_address(start).ok_or_else(|| format!("invalid start address {start:?}"))?;
    let (Some(module), Some(name)) = (module, name) else {
        return Err("expected <start>;<module>;<name>[;<size>]".to_string());
    };
    if name.is_empty() {
        return Err("empty routine name".to_string());
    }
    let size = size
        .map(|s| s.parse::<u64>().map_err(|_| format!("invalid size {s:?}")))
        .transpose()?;

    Ok(RoutineRecord {
        name: name.to_string(),
        module: module.to_string(),
        start_address,
        size,
    })
}
