//! Domain model for tracesym
//!
//! This module contains the value records passed between the symbolization
//! components and the errors they report.

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{DebugSymbol, RoutineRecord, StaticSymbol};

pub use errors::{ResolveMiss, SymbolizeError};
