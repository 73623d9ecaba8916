//! Value records shared by the symbolization components

use serde::Serialize;
use std::fmt;

/// One row of a binary's line-number table: a static address and the source
/// line it was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSymbol {
    /// Compilation directory recorded for the unit the row came from
    pub directory: String,
    /// Source file as recorded in the line table (may be relative)
    pub file_name: String,
    pub address: u64,
    /// 1-based source line
    pub line_number: u64,
}

impl DebugSymbol {
    #[must_use]
    pub fn new(
        directory: impl Into<String>,
        file_name: impl Into<String>,
        address: u64,
        line_number: u64,
    ) -> Self {
        Self { directory: directory.into(), file_name: file_name.into(), address, line_number }
    }
}

impl fmt::Display for DebugSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x} {}", self.file_name, self.address, self.line_number)
    }
}

/// A routine observed by the instrumentation front end, positioned in the
/// traced (runtime) address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineRecord {
    pub name: String,
    /// Image the routine was loaded from, when the front end recorded it
    pub module: String,
    pub start_address: u64,
    pub size: Option<u64>,
}

/// A named entry of the binary's static symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticSymbol {
    pub name: String,
    /// Address in the on-disk (unrelocated) address space
    pub value: u64,
    pub size: u64,
}
