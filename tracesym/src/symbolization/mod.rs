//! # Symbol Resolution and Address Translation
//!
//! This module turns raw instruction addresses from a dynamic execution trace
//! into source locations (file, line, compilation directory). When the analysis
//! engine flags an instruction as leaking secret-dependent behavior, this is
//! what tells the analyst which line of source produced it.
//!
//! ## Two Address Spaces
//!
//! **Static addresses** are the ones recorded in the binary on disk: the symbol
//! table and the DWARF line tables are indexed by them.
//!
//! **Runtime addresses** are what the instrumentation front end observes while
//! the program runs. Relocation, ASLR and the instrumentation itself can move
//! code, so the same instruction has a different address in every trace.
//!
//! ## Address Translation Flow
//!
//! ```text
//! runtime 0x7f3a2b4c10c0
//!    │  RoutineRegistry: greatest routine start <= address
//!    ▼
//! BN_mod_exp_mont @ runtime 0x7f3a2b4c0f00, offset 0x1c0
//!    │  StaticSymbolIndex: routine name -> symbol value
//!    ▼
//! BN_mod_exp_mont @ static 0x8b000  =>  static 0x8b1c0
//!    │  DebugLineTable: floor lookup
//!    ▼
//! crypto/bn/bn_exp.c 8b1c0 412
//! ```
//!
//! Routine names survive relocation, absolute addresses do not. Anchoring on
//! the name lets one static line table serve traces from any number of
//! differently relocated runs of the same binary.
//!
//! ## Module Structure
//!
//! - **`line_table`**: sorted address -> line rows, decoded from DWARF with
//!   `gimli`/`object` or parsed from an `objdump --dwarf=decodedline` dump
//! - **`symbol_table`**: the `StaticSymbolIndex` seam and its ELF `.symtab`
//!   implementation
//! - **`routines`**: the `RoutineRegistry` seam and the table parsed from the
//!   front end's routine file
//! - **`resolver`**: `AddressResolver`, composing the three
//!
//! ## Lookup Semantics
//!
//! - An exact address match returns that row
//! - Otherwise the row with the greatest address below the query is returned,
//!   including for queries past the last row
//! - Queries before the first row, addresses outside every known routine and
//!   routines missing from the symbol table are misses, not errors
//!
//! ## Example
//!
//! ```rust,ignore
//! let resolver = AddressResolver::open("./rsa_1024", "./rsa_1024.routines")?;
//!
//! match resolver.explain(0x7f3a_2b4c_10c0) {
//!     Ok(symbol) => println!("{symbol}"),
//!     Err(miss) => log::debug!("unresolved: {miss}"),
//! }
//! ```

pub mod line_table;
pub mod resolver;
pub mod routines;
pub mod symbol_table;

pub use line_table::DebugLineTable;
pub use resolver::AddressResolver;
pub use routines::{RoutineRegistry, RoutineTable};
pub use symbol_table::{ElfSymbolTable, StaticSymbolIndex};

/// Parse a hex address, with or without a `0x` prefix
#[must_use]
pub fn parse_address(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
