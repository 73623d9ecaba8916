//! # tracesym - Source Locations for Execution Trace Addresses
//!
//! tracesym is the symbolization layer of a side-channel analysis pipeline.
//! The analysis engine works on instruction addresses recorded while an
//! instrumented binary runs; tracesym maps each of those addresses back to the
//! source file and line that produced it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │ Instrumentation front end│      │   Target binary (ELF)    │
//! │   (routine file)         │      │  .symtab   .debug_line   │
//! └────────────┬─────────────┘      └─────┬─────────────┬──────┘
//!              │                          │             │
//!              ▼                          ▼             ▼
//!      ┌───────────────┐        ┌────────────────┐ ┌──────────────┐
//!      │ RoutineTable  │        │ ElfSymbolTable │ │DebugLineTable│
//!      └───────┬───────┘        └───────┬────────┘ └──────┬───────┘
//!              │  name, offset          │ static base     │ floor lookup
//!              └────────────┬───────────┴─────────────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │ AddressResolver │ ──▶ file, line, directory
//!                  └─────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`symbolization`]: line table, symbol table, routine registry and the
//!   resolver composing them
//! - [`domain`]: value records (`DebugSymbol`, `RoutineRecord`,
//!   `StaticSymbol`) and error types
//! - [`cli`]: command-line argument parsing
//! - [`preflight`]: target binary checks run by the CLI before decoding
//!
//! ## Typical Usage
//!
//! ```bash
//! # Static addresses, straight from the binary's DWARF
//! tracesym -b ./aes_128_cbc 0x401a2c
//!
//! # Runtime addresses flagged by the analysis engine
//! tracesym -b ./aes_128_cbc -r aes_128_cbc.routines < leaks.txt
//! ```
//!
//! All lookups are read-only: a built `DebugLineTable` or `AddressResolver`
//! can be queried from many threads at once.

pub mod cli;
pub mod domain;
pub mod preflight;
pub mod symbolization;
