//! Runtime address -> source location resolution
//!
//! Absolute addresses in a trace depend on where the binary was loaded, but
//! routine names do not. A runtime address is re-anchored by finding its
//! routine, taking the offset into that routine, and adding the offset to the
//! routine's static symbol value. The result indexes the debug line table.

use log::{trace, warn};
use std::path::Path;

use super::line_table::DebugLineTable;
use super::routines::{RoutineRegistry, RoutineTable};
use super::symbol_table::{ElfSymbolTable, StaticSymbolIndex};
use crate::domain::{DebugSymbol, ResolveMiss, SymbolizeError};

/// Symbolizes runtime addresses of one traced binary
///
/// All state is read-only after construction, so a resolver can be shared
/// between threads when its collaborators can.
#[derive(Debug)]
pub struct AddressResolver<S, R> {
    lines: DebugLineTable,
    symbols: S,
    routines: R,
}

impl AddressResolver<ElfSymbolTable, RoutineTable> {
    /// Build the line table and symbol index from `binary_path` and the
    /// routine registry from the front end's `routines_path`
    ///
    /// # Errors
    /// Returns the first `SymbolizeError` from loading any of the three
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        binary_path: P,
        routines_path: Q,
    ) -> Result<Self, SymbolizeError> {
        let lines = DebugLineTable::from_binary(&binary_path)?;
        let symbols = ElfSymbolTable::from_binary(&binary_path)?;
        let routines = RoutineTable::from_file(routines_path)?;
        Ok(Self::new(lines, symbols, routines))
    }
}

impl<S: StaticSymbolIndex, R: RoutineRegistry> AddressResolver<S, R> {
    pub fn new(lines: DebugLineTable, symbols: S, routines: R) -> Self {
        Self { lines, symbols, routines }
    }

    /// Source location of `runtime_address`, if it can be determined
    #[must_use]
    pub fn resolve(&self, runtime_address: u64) -> Option<&DebugSymbol> {
        self.explain(runtime_address).ok()
    }

    /// Like [`resolve`](Self::resolve), but says why a lookup missed
    ///
    /// # Errors
    /// Every `ResolveMiss` is an expected outcome, not a failure of the resolver
    pub fn explain(&self, runtime_address: u64) -> Result<&DebugSymbol, ResolveMiss> {
        let static_address = self.static_address(runtime_address)?;
        self.lines.locate(static_address).ok_or(ResolveMiss::NoLineInfo(static_address))
    }

    /// Translate `runtime_address` into the binary's static address space
    ///
    /// # Errors
    /// Returns a `ResolveMiss` when no routine contains the address, the routine
    /// is unknown to the static symbol table, or the offset arithmetic fails
    pub fn static_address(&self, runtime_address: u64) -> Result<u64, ResolveMiss> {
        let routine = self
            .routines
            .routine_containing(runtime_address)
            .ok_or(ResolveMiss::NoRoutine(runtime_address))?;

        let Some(offset) = runtime_address.checked_sub(routine.start_address) else {
            warn!(
                "Routine registry placed 0x{runtime_address:x} in {} starting at 0x{:x}",
                routine.name, routine.start_address
            );
            return Err(ResolveMiss::OffsetUnderflow {
                address: runtime_address,
                routine: routine.name.clone(),
                start: routine.start_address,
            });
        };

        let symbol = self
            .symbols
            .find_symbol(&routine.name)
            .ok_or_else(|| ResolveMiss::UnknownSymbol(routine.name.clone()))?;

        let static_address = symbol.value.checked_add(offset).ok_or_else(|| {
            ResolveMiss::AddressOverflow { routine: routine.name.clone(), offset }
        })?;

        trace!(
            "0x{runtime_address:x} = {}+0x{offset:x} -> static 0x{static_address:x}",
            routine.name
        );
        Ok(static_address)
    }

    #[must_use]
    pub fn line_table(&self) -> &DebugLineTable {
        &self.lines
    }

    #[must_use]
    pub fn symbols(&self) -> &S {
        &self.symbols
    }

    #[must_use]
    pub fn routines(&self) -> &R {
        &self.routines
    }
}
