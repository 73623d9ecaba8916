//! Structured error types for tracesym
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Construction failures are `SymbolizeError`s; a lookup that finds nothing is a
//! `ResolveMiss` value, which callers are expected to handle as a normal outcome.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolizeError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode debug information in {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Malformed line {line} in {source_name}: {reason}")]
    Parse { source_name: String, line: usize, reason: String },
}

impl SymbolizeError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open { path: path.into(), source }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode { path: path.into(), reason: reason.to_string() }
    }
}

/// Why a runtime address did not resolve to a source location
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveMiss {
    #[error("no known routine contains 0x{0:x}")]
    NoRoutine(u64),

    /// The registry placed the address in a routine that starts after it.
    #[error("0x{address:x} lies before the start 0x{start:x} of routine {routine}")]
    OffsetUnderflow { address: u64, routine: String, start: u64 },

    #[error("routine {0} is not in the static symbol table")]
    UnknownSymbol(String),

    #[error("static address of {routine} + 0x{offset:x} overflows")]
    AddressOverflow { routine: String, offset: u64 },

    #[error("no line information at or before 0x{0:x}")]
    NoLineInfo(u64),
}
