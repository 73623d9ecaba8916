//! Static address to source line table for one binary
//!
//! The table is a flat list of every line-number row from every compilation
//! unit, sorted by address. Lookups are floor searches over that list.

use anyhow::{bail, Context, Result};
use gimli::{EndianSlice, FileEntry, LineProgramHeader, RunTimeEndian, UnitRef};
use log::{debug, trace};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use super::parse_address;
use crate::domain::{DebugSymbol, SymbolizeError};

type Slice<'a> = EndianSlice<'a, RunTimeEndian>;

/// Sorted address -> source location facts for one binary
#[derive(Debug, Clone, Default)]
pub struct DebugLineTable {
    symbols: Vec<DebugSymbol>,
}

impl DebugLineTable {
    /// Decode the DWARF line tables of every compilation unit in `binary_path`
    ///
    /// # Errors
    /// Returns `SymbolizeError::Open` if the file cannot be read and
    /// `SymbolizeError::Decode` if it is not an object file or its debug
    /// information is missing or malformed
    pub fn from_binary<P: AsRef<Path>>(binary_path: P) -> Result<Self, SymbolizeError> {
        let path = binary_path.as_ref();
        let data = fs::read(path).map_err(|e| SymbolizeError::open(path, e))?;
        let rows =
            decode_line_rows(&data).map_err(|e| SymbolizeError::decode(path, format!("{e:#}")))?;

        let table = Self::from_rows(rows);
        debug!("Loaded {} line table rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse the text produced by `objdump --dwarf=decodedline`
    ///
    /// Rows that do not parse (preamble, end-of-sequence markers) are skipped.
    #[must_use]
    pub fn from_decoded_line_dump(dump: &str) -> Self {
        Self::from_rows(parse_decoded_line_dump(dump))
    }

    /// Read and parse a saved `objdump --dwarf=decodedline` dump
    ///
    /// # Errors
    /// Returns `SymbolizeError::Open` if the dump cannot be read
    pub fn from_decoded_line_dump_file<P: AsRef<Path>>(
        dump_path: P,
    ) -> Result<Self, SymbolizeError> {
        let path = dump_path.as_ref();
        let dump = fs::read_to_string(path).map_err(|e| SymbolizeError::open(path, e))?;
        let table = Self::from_decoded_line_dump(&dump);
        debug!("Loaded {} line table rows from dump {}", table.len(), path.display());
        Ok(table)
    }

    /// Build a table from already decoded rows
    ///
    /// The sort is stable, so rows sharing an address keep their input order.
    pub fn from_rows<I: IntoIterator<Item = DebugSymbol>>(rows: I) -> Self {
        let mut symbols: Vec<DebugSymbol> = rows.into_iter().collect();
        symbols.sort_by_key(|sym| sym.address);
        Self { symbols }
    }

    /// Find the row for `address`: the exact match, or else the row with the
    /// greatest address below it
    ///
    /// Addresses before the first row have no location. Addresses past the last
    /// row resolve to the last row. When several rows share an address the last
    /// of them is returned.
    #[must_use]
    pub fn locate(&self, address: u64) -> Option<&DebugSymbol> {
        let end = self.symbols.partition_point(|sym| sym.address <= address);
        end.checked_sub(1).and_then(|idx| self.symbols.get(idx))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Rows in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = &DebugSymbol> {
        self.symbols.iter()
    }
}

fn decode_line_rows(data: &[u8]) -> Result<Vec<DebugSymbol>> {
    let obj = object::File::parse(data).context("Failed to parse object file")?;

    if !obj.section_by_name(".debug_info").is_some_and(|s| s.size() > 0) {
        bail!("no DWARF .debug_info section (stripped or built without -g)");
    }

    let endian = if obj.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };

    let load_section = |id: gimli::SectionId| -> Result<Cow<[u8]>> {
        Ok(match obj.section_by_name(id.name()) {
            Some(section) => section
                .uncompressed_data()
                .with_context(|| format!("Failed to read section {}", id.name()))?,
            None => Cow::Borrowed(&[]),
        })
    };
    let sections = gimli::DwarfSections::load(load_section)?;
    let dwarf = sections.borrow(|section| EndianSlice::new(Cow::as_ref(section), endian));

    let mut rows = Vec::new();
    let mut units = dwarf.units();
    while let Some(header) = units.next()? {
        let unit = dwarf.unit(header)?;
        let unit = unit.unit_ref(&dwarf);

        let directory =
            unit.comp_dir.map(|dir| dir.to_string_lossy().into_owned()).unwrap_or_default();

        let Some(program) = unit.line_program.clone() else {
            continue;
        };

        let mut program_rows = program.rows();
        while let Some((line_header, row)) = program_rows.next_row()? {
            if row.end_sequence() {
                continue;
            }
            let (Some(line), Some(file)) = (row.line(), row.file(line_header)) else {
                trace!("Skipping row without file or line at 0x{:x}", row.address());
                continue;
            };
            rows.push(DebugSymbol::new(
                directory.clone(),
                file_path(unit, file, line_header)?,
                row.address(),
                line.get(),
            ));
        }
    }

    Ok(rows)
}

fn file_path<'a>(
    unit: UnitRef<'_, Slice<'a>>,
    file: &FileEntry<Slice<'a>>,
    header: &LineProgramHeader<Slice<'a>>,
) -> gimli::Result<String> {
    let mut path = PathBuf::new();
    if let Some(dir) = file.directory(header) {
        path.push(&*unit.attr_string(dir)?.to_string_lossy());
    }
    path.push(&*unit.attr_string(file.path_name())?.to_string_lossy());
    Ok(path.to_string_lossy().into_owned())
}

/// `objdump --dwarf=decodedline` layout:
///
/// ```text
/// CU: ./crypto/bn/bn_exp.c:
/// File name        Line number    Starting address    View    Stmt
/// bn_exp.c                 412            0x8b1c0               x
/// bn_exp.c                   -            0x8b210
///
/// ./include/openssl/bn.h:[++]
/// bn.h                      88            0x8b1d4               x
/// ```
fn parse_decoded_line_dump(dump: &str) -> Vec<DebugSymbol> {
    let mut rows = Vec::new();
    let mut directory = String::new();

    for (idx, raw) in dump.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("File name") {
            continue;
        }

        if let Some(unit) = line.strip_prefix("CU:") {
            let unit = unit.trim();
            directory = header_path(unit).unwrap_or(unit).to_string();
            continue;
        }

        if !line.contains(char::is_whitespace) {
            if let Some(path) = header_path(line) {
                directory = path.to_string();
                continue;
            }
        }

        match parse_dump_row(line) {
            Some((file_name, line_number, address)) => {
                rows.push(DebugSymbol::new(directory.clone(), file_name, address, line_number));
            }
            None => trace!("Skipping line {} of line dump: {line}", idx + 1),
        }
    }

    rows
}

fn header_path(line: &str) -> Option<&str> {
    line.strip_suffix(":[++]").or_else(|| line.strip_suffix(':'))
}

fn parse_dump_row(line: &str) -> Option<(&str, u64, u64)> {
    let mut fields = line.split_whitespace();
    let file_name = fields.next()?;
    let line_number = fields.next()?.parse::<u64>().ok().filter(|&n| n > 0)?;
    let address = parse_address(fields.next()?)?;
    Some((file_name, line_number, address))
}
