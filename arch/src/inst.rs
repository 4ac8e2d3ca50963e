use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Instruction length class. Format 4 is not a class of its own: it is a
/// format-3/4 mnemonic written with the `+` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    One,
    Two,
    ThreeFour,
}

impl Format {
    /// Byte size of the unextended encoding.
    pub fn size(self) -> u32 {
        match self {
            Format::One => 1,
            Format::Two => 2,
            Format::ThreeFour => 3,
        }
    }
}

/// One catalog entry: length class plus the 8-bit operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub format: Format,
    pub code: u8,
}

static OPTAB: Lazy<HashMap<&'static str, Opcode>> = Lazy::new(|| {
    use Format::*;
    let defs: &[(&str, Format, u8)] = &[
        // Format 1
        ("FIX", One, 0xC4),
        ("FLOAT", One, 0xC0),
        ("HIO", One, 0xF4),
        ("NORM", One, 0xC8),
        ("SIO", One, 0xF0),
        ("TIO", One, 0xF8),
        // Format 2
        ("ADDR", Two, 0x90),
        ("CLEAR", Two, 0xB4),
        ("COMPR", Two, 0xA0),
        ("DIVR", Two, 0x9C),
        ("MULR", Two, 0x98),
        ("RMO", Two, 0xAC),
        ("SHIFTL", Two, 0xA4),
        ("SHIFTR", Two, 0xA8),
        ("SUBR", Two, 0x94),
        ("SVC", Two, 0xB0),
        ("TIXR", Two, 0xB8),
        // Format 3/4
        ("ADD", ThreeFour, 0x18),
        ("ADDF", ThreeFour, 0x58),
        ("AND", ThreeFour, 0x40),
        ("COMP", ThreeFour, 0x28),
        ("COMPF", ThreeFour, 0x88),
        ("DIV", ThreeFour, 0x24),
        ("DIVF", ThreeFour, 0x64),
        ("J", ThreeFour, 0x3C),
        ("JEQ", ThreeFour, 0x30),
        ("JGT", ThreeFour, 0x34),
        ("JLT", ThreeFour, 0x38),
        ("JSUB", ThreeFour, 0x48),
        ("LDA", ThreeFour, 0x00),
        ("LDB", ThreeFour, 0x68),
        ("LDCH", ThreeFour, 0x50),
        ("LDF", ThreeFour, 0x70),
        ("LDL", ThreeFour, 0x08),
        ("LDS", ThreeFour, 0x6C),
        ("LDT", ThreeFour, 0x74),
        ("LDX", ThreeFour, 0x04),
        ("LPS", ThreeFour, 0xD0),
        ("MUL", ThreeFour, 0x20),
        ("MULF", ThreeFour, 0x60),
        ("OR", ThreeFour, 0x44),
        ("RD", ThreeFour, 0xD8),
        ("RSUB", ThreeFour, 0x4C),
        ("SSK", ThreeFour, 0xEC),
        ("STA", ThreeFour, 0x0C),
        ("STB", ThreeFour, 0x78),
        ("STCH", ThreeFour, 0x54),
        ("STF", ThreeFour, 0x80),
        ("STI", ThreeFour, 0xD4),
        ("STL", ThreeFour, 0x14),
        ("STS", ThreeFour, 0x7C),
        ("STSW", ThreeFour, 0xE8),
        ("STT", ThreeFour, 0x84),
        ("STX", ThreeFour, 0x10),
        ("SUB", ThreeFour, 0x1C),
        ("SUBF", ThreeFour, 0x5C),
        ("TD", ThreeFour, 0xE0),
        ("TIX", ThreeFour, 0x2C),
        ("WD", ThreeFour, 0xDC),
    ];
    defs.iter()
        .map(|&(mnemonic, format, code)| (mnemonic, Opcode { format, code }))
        .collect()
});

/// Looks up a mnemonic (without any `+` prefix).
pub fn lookup(mnemonic: &str) -> Option<Opcode> {
    OPTAB.get(mnemonic).copied()
}

pub fn is_mnemonic(s: &str) -> bool {
    OPTAB.contains_key(s)
}

#[test]
fn test() {
    println!("{:?}", lookup("LDA"));
    assert_eq!(lookup("LDA").unwrap().code, 0x00);
    assert_eq!(lookup("RSUB").unwrap().code, 0x4C);
    assert_eq!(lookup("FIX").unwrap().format, Format::One);
    assert_eq!(lookup("TIXR").unwrap().format, Format::Two);
    assert_eq!(lookup("WD").unwrap().format, Format::ThreeFour);
    assert!(lookup("MOV").is_none());
    assert!(is_mnemonic("CLEAR"));
}
