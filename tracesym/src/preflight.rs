//! Pre-flight checks for tracesym
//!
//! Validates the target binary before decoding it, so that a wrong path or a
//! binary without debug info produces a clear, actionable message.

use anyhow::{bail, Context, Result};
use object::{Object, ObjectSection};
use std::path::Path;

/// Run all pre-flight checks on the target binary
///
/// # Errors
/// Returns an error if the binary does not exist, is not a regular file, or
/// cannot be read
pub fn run_preflight_checks(target_path: &Path, quiet: bool) -> Result<()> {
    check_binary_exists(target_path)?;
    check_debug_symbols(target_path, quiet)?;
    Ok(())
}

/// Check if the target binary exists and is a file
fn check_binary_exists(target_path: &Path) -> Result<()> {
    if !target_path.exists() {
        bail!(
            "Binary not found: {}\n\n\
             Make sure the path is correct and the binary exists.",
            target_path.display()
        );
    }
    if !target_path.is_file() {
        bail!(
            "Not a file: {}\n\n\
             --binary must point to an executable or shared object, not a directory.",
            target_path.display()
        );
    }
    Ok(())
}

/// Warn if the binary lacks line tables or a symbol table
fn check_debug_symbols(target_path: &Path, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }

    let file_data = std::fs::read(target_path)
        .with_context(|| format!("Failed to read binary: {}", target_path.display()))?;

    let Ok(obj) = object::File::parse(&*file_data) else {
        // Not a valid object file, let the decoder report it
        return Ok(());
    };

    let has_debug_line = obj.section_by_name(".debug_line").is_some_and(|s| s.size() > 0);
    let has_symtab = obj.section_by_name(".symtab").is_some_and(|s| s.size() > 0);

    if !has_debug_line && !has_symtab {
        eprintln!("warning: binary stripped, no address can be symbolized");
    } else if !has_debug_line {
        eprintln!("warning: no DWARF line info, rebuild the target with -g");
    } else if !has_symtab {
        eprintln!("warning: no .symtab, runtime addresses cannot be re-anchored");
    }

    Ok(())
}
