use arch::inst;

// ----------------------------------------------------------------------------
// Line

/// Assembler directives. `USE` and `ORG` are recognized by the parser so
/// they land in the opcode field, then rejected by pass 1.
pub const DIRECTIVES: &[&str] = &[
    "START", "END", "CSECT", "EXTDEF", "EXTREF", "BASE", "NOBASE", "EQU", "ORG", "LTORG", "RESW",
    "RESB", "WORD", "BYTE", "USE",
];

/// One source line. The parser fills the text fields; pass 1 annotates
/// `address` and `section`, pass 2 fills `object_code`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub label: String,
    pub opcode: String,
    pub operand: String,
    pub comment: String,
    pub is_comment: bool,
    pub address: Option<u32>,
    pub object_code: String,
    pub section: String,
}

impl Line {
    /// Parses one physical line. Fields are tab-separated; the first token
    /// is the opcode when it names a known mnemonic or directive, and a
    /// label otherwise.
    pub fn parse(number: usize, raw: &str) -> Line {
        let mut line = Line {
            number,
            ..Line::default()
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('.') {
            line.is_comment = true;
            line.comment = raw.to_string();
            return line;
        }

        let mut fields = raw.split('\t').map(str::trim);
        let first = fields.next().unwrap_or("").to_ascii_uppercase();
        if is_opcode(&first) {
            line.opcode = first;
        } else {
            line.label = first;
            line.opcode = fields.next().unwrap_or("").to_ascii_uppercase();
        }
        line.operand = fold_operand(fields.next().unwrap_or(""));
        line.comment = fields.next().unwrap_or("").to_string();
        line
    }

    /// The mnemonic with any extended-format `+` prefix removed.
    pub fn unextended_opcode(&self) -> &str {
        self.opcode.strip_prefix('+').unwrap_or(&self.opcode)
    }

    pub fn is_extended(&self) -> bool {
        self.opcode.starts_with('+')
    }

    /// True for the synthetic lines materialized at a literal pool.
    pub fn is_literal_pool_entry(&self) -> bool {
        self.label == "*" && self.operand.starts_with('=')
    }
}

fn is_opcode(token: &str) -> bool {
    let mnemonic = token.strip_prefix('+').unwrap_or(token);
    inst::is_mnemonic(mnemonic) || DIRECTIVES.contains(&mnemonic)
}

/// Case-folds an operand, leaving everything from the first quote on
/// verbatim so `C'...'`/`X'...'` payloads survive as written.
fn fold_operand(operand: &str) -> String {
    match operand.find('\'') {
        Some(quote) => {
            let (head, payload) = operand.split_at(quote);
            format!("{}{}", head.to_ascii_uppercase(), payload)
        }
        None => operand.to_ascii_uppercase(),
    }
}
