use arch::inst;

use crate::parser::Line;
use crate::symbol::{Section, SymbolTable};

// ----------------------------------------------------------------------------
// Records

/// Contiguous object bytes with a starting address. Payload is capped at
/// 30 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub start: u32,
    pub section: String,
    pub codes: Vec<String>,
}

impl TextRecord {
    fn new(start: u32, section: &str) -> Self {
        TextRecord {
            start,
            section: section.to_string(),
            codes: Vec::new(),
        }
    }

    pub fn byte_len(&self) -> u32 {
        self.codes.iter().map(|code| hex_bytes(code)).sum()
    }
}

/// One relocation directive: add or subtract `symbol`'s final address
/// into the field at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRecord {
    pub address: u32,
    pub half_bytes: u32,
    pub sign: char,
    pub symbol: String,
    pub section: String,
}

impl ModRecord {
    pub fn new(address: u32, half_bytes: u32, sign: char, symbol: &str, section: &str) -> Self {
        ModRecord {
            address,
            half_bytes,
            sign,
            symbol: symbol.to_string(),
            section: section.to_string(),
        }
    }
}

fn hex_bytes(code: &str) -> u32 {
    (code.len() as u32 + 1) / 2
}

// ----------------------------------------------------------------------------
// Text-record packing

const MAX_RECORD_BYTES: u32 = 30;

/// Groups the object code of each section into text records: a record
/// closes at a storage gap (`RESW`/`RESB`) and when the 30-byte payload
/// cap would be exceeded.
pub fn build_text_records(lines: &[Line], sections: &[Section]) -> Vec<TextRecord> {
    let mut records = Vec::new();
    for section in sections {
        let mut current: Option<TextRecord> = None;
        let mut bytes = 0;
        let mut last_end = None;

        let emitting = lines
            .iter()
            .filter(|line| line.section == section.name && !line.object_code.is_empty());
        for line in emitting {
            let address = match line.address {
                Some(address) => address,
                None => continue,
            };
            let len = hex_bytes(&line.object_code);
            let gap = last_end.map_or(false, |end| address > end);
            if gap || bytes + len > MAX_RECORD_BYTES {
                if let Some(record) = current.take() {
                    records.push(record);
                }
                bytes = 0;
            }
            let record = current.get_or_insert_with(|| TextRecord::new(address, &section.name));
            record.codes.push(line.object_code.clone());
            bytes = record.byte_len();
            last_end = Some(address + len);
        }
        if let Some(record) = current.take() {
            records.push(record);
        }
    }
    records
}

// ----------------------------------------------------------------------------
// Object program

/// Formats the whole object program: one H/D/R/T/M/E group per control
/// section, `^`-delimited, addresses in upper-case hex.
pub fn write_object_program(
    lines: &[Line],
    sections: &[Section],
    symbols: &SymbolTable,
    text: &[TextRecord],
    mods: &[ModRecord],
) -> String {
    let mut out = String::new();
    for (index, section) in sections.iter().enumerate() {
        out.push_str(&format!(
            "H^{:<6}^{:06X}^{:06X}\n",
            section.name, section.start, section.length
        ));

        if !section.extdef.is_empty() {
            out.push('D');
            for name in &section.extdef {
                let address = symbols.get(name).map_or(0, |sym| sym.address);
                out.push_str(&format!("^{:<6}^{:06X}", name, address));
            }
            out.push('\n');
        }

        if !section.extref.is_empty() {
            out.push('R');
            for name in &section.extref {
                out.push_str(&format!("^{:<6}", name));
            }
            out.push('\n');
        }

        for record in text.iter().filter(|r| r.section == section.name) {
            out.push_str(&format!(
                "T^{:06X}^{:02X}^{}\n",
                record.start,
                record.byte_len(),
                record.codes.join("^")
            ));
        }

        for record in mods.iter().filter(|m| m.section == section.name) {
            out.push_str(&format!(
                "M^{:06X}^{:02X}^{}{}\n",
                record.address, record.half_bytes, record.sign, record.symbol
            ));
        }

        match first_instruction_address(lines, &section.name) {
            Some(address) if index == 0 => out.push_str(&format!("E^{:06X}\n", address)),
            _ => out.push_str("E\n"),
        }
    }
    out
}

/// Address of the first catalog instruction in the section; the entry
/// point named by the main section's End record.
fn first_instruction_address(lines: &[Line], section: &str) -> Option<u32> {
    lines
        .iter()
        .filter(|line| line.section == section && !line.is_comment)
        .find(|line| inst::lookup(line.unextended_opcode()).is_some())
        .and_then(|line| line.address)
}
