//! Routine name -> static address lookups against the binary's symbol table

use log::{debug, warn};
use object::{Object, ObjectSymbol, SymbolKind};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::{StaticSymbol, SymbolizeError};

/// Maps a routine name to its symbol in the binary's static address space
pub trait StaticSymbolIndex {
    fn find_symbol(&self, name: &str) -> Option<&StaticSymbol>;
}

impl<T: StaticSymbolIndex + ?Sized> StaticSymbolIndex for &T {
    fn find_symbol(&self, name: &str) -> Option<&StaticSymbol> {
        (**self).find_symbol(name)
    }
}

/// Symbols from an ELF `.symtab`
///
/// Names are compared with surrounding whitespace trimmed. When a name occurs
/// more than once the first symbol in table order wins.
#[derive(Debug, Clone, Default)]
pub struct ElfSymbolTable {
    symbols: Vec<StaticSymbol>,
    by_name: HashMap<String, usize>,
}

impl ElfSymbolTable {
    /// Read the static symbol table of `binary_path`
    ///
    /// # Errors
    /// Returns `SymbolizeError::Open` if the file cannot be read and
    /// `SymbolizeError::Decode` if it is not a parseable object file
    pub fn from_binary<P: AsRef<Path>>(binary_path: P) -> Result<Self, SymbolizeError> {
        let path = binary_path.as_ref();
        let data = fs::read(path).map_err(|e| SymbolizeError::open(path, e))?;
        let obj = object::File::parse(&*data).map_err(|e| SymbolizeError::decode(path, e))?;

        // Imports carry no static address, and file/section entries name no routine
        let defined = obj.symbols().filter(|sym| {
            !sym.is_undefined() && !matches!(sym.kind(), SymbolKind::File | SymbolKind::Section)
        });

        let table = Self::from_symbols(defined.filter_map(|sym| {
            let name = sym.name().ok()?;
            (!name.is_empty()).then(|| StaticSymbol {
                name: name.to_string(),
                value: sym.address(),
                size: sym.size(),
            })
        }));

        if table.is_empty() {
            warn!("{} has no static symbol table (stripped?)", path.display());
        } else {
            debug!("Loaded {} static symbols from {}", table.len(), path.display());
        }
        Ok(table)
    }

    pub fn from_symbols<I: IntoIterator<Item = StaticSymbol>>(symbols: I) -> Self {
        let mut table = Self::default();
        for mut sym in symbols {
            let trimmed = sym.name.trim();
            if trimmed.len() != sym.name.len() {
                sym.name = trimmed.to_string();
            }
            table.by_name.entry(sym.name.clone()).or_insert(table.symbols.len());
            table.symbols.push(sym);
        }
        table
    }

    /// The symbol whose `[value, value + size)` range holds `address`
    ///
    /// Zero-sized symbols only match their exact value. If ranges overlap, the
    /// one starting closest to `address` wins, then the first in table order.
    #[must_use]
    pub fn symbol_containing(&self, address: u64) -> Option<&StaticSymbol> {
        self.symbols
            .iter()
            .filter(|sym| {
                address.checked_sub(sym.value).is_some_and(|off| off < sym.size.max(1))
            })
            .min_by_key(|sym| address - sym.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl StaticSymbolIndex for ElfSymbolTable {
    fn find_symbol(&self, name: &str) -> Option<&StaticSymbol> {
        self.by_name.get(name.trim()).and_then(|&idx| self.symbols.get(idx))
    }
}
