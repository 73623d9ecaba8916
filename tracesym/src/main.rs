//! # tracesym - Main Entry Point
//!
//! Supports two operational modes:
//! - **Static** (`--binary <BIN>` or `--line-dump <FILE>`): addresses are looked
//!   up directly in the binary's line table
//! - **Runtime** (`--binary <BIN> --routines <FILE>`): addresses come from an
//!   instrumented run and are re-anchored through routine names first
//!
//! Addresses are taken from the command line, or from stdin one per line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use tracesym::cli::Args;
use tracesym::domain::{DebugSymbol, ResolveMiss};
use tracesym::preflight::run_preflight_checks;
use tracesym::symbolization::{
    parse_address, AddressResolver, DebugLineTable, ElfSymbolTable, RoutineTable,
};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let permission_denied = err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied)
    });
    let msg = err.to_string().to_lowercase();
    if permission_denied {
        EXIT_NOPERM
    } else if msg.contains("missing required argument") || msg.contains("invalid address") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Where lookups go, depending on which address space the input is in
enum Symbolizer {
    /// Line table plus, when a binary was given, its symbols for naming routines
    Static(DebugLineTable, Option<ElfSymbolTable>),
    Runtime(AddressResolver<ElfSymbolTable, RoutineTable>),
}

impl Symbolizer {
    fn lookup(&self, address: u64) -> Result<&DebugSymbol, ResolveMiss> {
        match self {
            Self::Static(lines, _) => {
                lines.locate(address).ok_or(ResolveMiss::NoLineInfo(address))
            }
            Self::Runtime(resolver) => resolver.explain(address),
        }
    }

    fn routine(&self, address: u64) -> Option<String> {
        match self {
            Self::Static(_, symbols) => {
                let symbol = symbols.as_ref()?.symbol_containing(address)?;
                Some(format!("{}+0x{:x}", symbol.name, address - symbol.value))
            }
            Self::Runtime(resolver) => resolver.routines().describe(address),
        }
    }
}

/// One `--json` output line
#[derive(Serialize)]
struct Report<'a> {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    routine: Option<String>,
    location: Option<&'a DebugSymbol>,
    miss: Option<String>,
}

fn build_symbolizer(args: &Args) -> Result<Symbolizer> {
    if let Some(binary) = &args.binary {
        run_preflight_checks(binary, args.quiet)?;
    }

    let lines = match (&args.line_dump, &args.binary) {
        (Some(dump), _) => DebugLineTable::from_decoded_line_dump_file(dump)?,
        (None, Some(binary)) => DebugLineTable::from_binary(binary)?,
        (None, None) => bail!(
            "Missing required argument: --binary or --line-dump\n\n\
             Run 'tracesym --help' for usage"
        ),
    };
    if lines.is_empty() {
        warn!("Line table is empty, no address will resolve");
    }
    info!("Line table: {} rows", lines.len());

    let Some(routines_path) = &args.routines else {
        // Routine names only appear in JSON reports
        let symbols = match &args.binary {
            Some(binary) if args.json => Some(ElfSymbolTable::from_binary(binary)?),
            _ => None,
        };
        return Ok(Symbolizer::Static(lines, symbols));
    };
    let binary: &Path = args
        .binary
        .as_deref()
        .context("Missing required argument: --binary is needed with --routines")?;

    let symbols = ElfSymbolTable::from_binary(binary)?;
    let routines = RoutineTable::from_file(routines_path)?;
    info!("Static symbols: {}, routines: {}", symbols.len(), routines.len());

    Ok(Symbolizer::Runtime(AddressResolver::new(lines, symbols, routines)))
}

fn write_result(
    out: &mut impl Write,
    symbolizer: &Symbolizer,
    address: u64,
    json: bool,
) -> Result<bool> {
    let result = symbolizer.lookup(address);
    if let Err(miss) = &result {
        debug!("0x{address:x}: {miss}");
    }

    if json {
        let report = Report {
            address: format!("0x{address:x}"),
            routine: symbolizer.routine(address),
            location: result.as_ref().ok().copied(),
            miss: result.as_ref().err().map(ToString::to_string),
        };
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        match &result {
            Ok(symbol) => writeln!(out, "{symbol}")?,
            Err(_) => writeln!(out, "?? {address:x} 0")?,
        }
    }

    Ok(result.is_ok())
}

fn run() -> Result<()> {
    let args = Args::parse();
    let symbolizer = build_symbolizer(&args)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut total = 0usize;
    let mut resolved = 0usize;

    if args.addresses.is_empty() {
        for (idx, line) in io::stdin().lock().lines().enumerate() {
            let line = line.context("Failed to read addresses from stdin")?;
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            let address = parse_address(token)
                .with_context(|| format!("Invalid address on stdin line {}: {token}", idx + 1))?;
            total += 1;
            resolved += usize::from(write_result(&mut out, &symbolizer, address, args.json)?);
        }
    } else {
        for token in &args.addresses {
            let address =
                parse_address(token).with_context(|| format!("Invalid address: {token}"))?;
            total += 1;
            resolved += usize::from(write_result(&mut out, &symbolizer, address, args.json)?);
        }
    }

    out.flush()?;

    if !args.quiet {
        eprintln!("resolved {resolved} of {total} addresses");
    }

    Ok(())
}
