use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::ErrorKind;

// ----------------------------------------------------------------------------
// Symbols

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub address: u32,
    pub section: String,
    /// Declared in an `EXTREF` and never locally defined.
    pub is_external: bool,
    /// False while the name is only a placeholder from `EXTDEF`/`EXTREF`.
    pub is_defined: bool,
}

/// Global symbol table keyed by name, in declaration order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// The symbol only if it is defined (non-external) in `section`.
    pub fn get_in(&self, name: &str, section: &str) -> Option<&Symbol> {
        self.symbols
            .get(name)
            .filter(|sym| sym.is_defined && !sym.is_external && sym.section == section)
    }

    /// Defines `name` at `address` in `section`, resolving a placeholder
    /// from a prior `EXTDEF`/`EXTREF` if one exists. Redefinition within
    /// the same section is an error.
    pub fn define(&mut self, name: &str, address: u32, section: &str) -> Result<(), ErrorKind> {
        let defined = Symbol {
            address,
            section: section.to_string(),
            is_external: false,
            is_defined: true,
        };
        match self.symbols.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let sym = entry.get_mut();
                if sym.is_defined && sym.section == section {
                    return Err(ErrorKind::DuplicateSymbol(
                        name.to_string(),
                        section.to_string(),
                    ));
                }
                *sym = defined;
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(defined);
                Ok(())
            }
        }
    }

    /// Records a placeholder for an `EXTDEF`/`EXTREF` name. Existing
    /// entries are left alone.
    pub fn declare(&mut self, name: &str, section: &str, external: bool) {
        self.symbols.entry(name.to_string()).or_insert(Symbol {
            address: 0,
            section: section.to_string(),
            is_external: external,
            is_defined: false,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Control sections

/// One relocatable unit: its origin, final length, and the names it
/// exports and imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub start: u32,
    pub length: u32,
    pub extdef: Vec<String>,
    pub extref: Vec<String>,
}

impl Section {
    pub fn new(name: &str, start: u32) -> Self {
        Section {
            name: name.to_string(),
            start,
            length: 0,
            extdef: Vec::new(),
            extref: Vec::new(),
        }
    }

    /// True when `name` is imported by this section.
    pub fn imports(&self, name: &str) -> bool {
        self.extref.iter().any(|r| r == name)
    }
}

// ----------------------------------------------------------------------------
// Literals

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub address: u32,
    pub section: String,
    pub len: u32,
}

/// Placed literals keyed by source form (including the leading `=`), in
/// placement order.
#[derive(Debug, Default)]
pub struct LiteralTable {
    literals: IndexMap<String, Literal>,
}

impl LiteralTable {
    pub fn contains(&self, form: &str) -> bool {
        self.literals.contains_key(form)
    }

    pub fn insert(&mut self, form: String, literal: Literal) {
        self.literals.insert(form, literal);
    }

    pub fn get(&self, form: &str) -> Option<&Literal> {
        self.literals.get(form)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}
