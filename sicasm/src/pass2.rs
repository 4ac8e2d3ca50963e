use arch::inst::{self, Format, Opcode};
use arch::reg::Reg;

use crate::error::{Error, ErrorKind};
use crate::operand::{AddrMode, Constant, Expr, Operand};
use crate::parser::Line;
use crate::pass1::Pass1;
use crate::records::ModRecord;
use crate::symbol::Section;

/// What an operand body resolved to (see the resolution order in
/// [`Pass2::resolve`]).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolved {
    /// Imported name; the linker supplies the value, the field holds 0.
    External(String),
    /// Address of a symbol or literal in this program.
    Address(u32),
    /// A plain integer operand; absolute, never relocated.
    Value(u32),
}

impl Resolved {
    fn target(&self) -> u32 {
        match self {
            Resolved::External(_) => 0,
            Resolved::Address(addr) | Resolved::Value(addr) => *addr,
        }
    }
}

/// Second pass: validates every operand reference, then encodes object
/// code line by line and collects the modification records.
pub struct Pass2<'a> {
    tables: &'a Pass1,
    base: Option<u32>,
    mods: Vec<ModRecord>,
}

impl<'a> Pass2<'a> {
    pub fn run(lines: &mut [Line], tables: &'a Pass1) -> Result<Vec<ModRecord>, Error> {
        let mut pass = Pass2 {
            tables,
            base: None,
            mods: Vec::new(),
        };
        pass.validate(lines)?;
        for idx in 0..lines.len() {
            if lines[idx].is_comment {
                continue;
            }
            let line = lines[idx].clone();
            let code = pass
                .encode_line(&line)
                .map_err(|kind| Error::new(line.number, kind))?;
            lines[idx].object_code = code;
        }
        Ok(pass.mods)
    }

    // ------------------------------------------------------------------------
    // Validation

    /// Checks every operand before any object code is emitted: symbols
    /// must be defined locally, imported, or numeric, and format-2
    /// operands must name registers.
    fn validate(&self, lines: &[Line]) -> Result<(), Error> {
        const SKIP: &[&str] = &[
            "START", "END", "CSECT", "EXTDEF", "EXTREF", "BASE", "NOBASE", "RESW", "RESB", "LTORG",
            "EQU", "BYTE",
        ];
        for line in lines {
            if line.is_comment || line.operand.is_empty() || line.is_literal_pool_entry() {
                continue;
            }
            if SKIP.contains(&line.opcode.as_str()) {
                continue;
            }
            self.validate_line(line)
                .map_err(|kind| Error::new(line.number, kind))?;
        }
        Ok(())
    }

    fn validate_line(&self, line: &Line) -> Result<(), ErrorKind> {
        if line.opcode == "WORD" {
            match Expr::parse(&line.operand)? {
                Expr::Int(_) => {}
                Expr::Sym(name) => {
                    self.resolve(&name, &line.section)?;
                }
                Expr::Diff(left, right) => {
                    self.resolve(&left, &line.section)?;
                    self.resolve(&right, &line.section)?;
                }
                Expr::Here => {
                    return Err(ErrorKind::MalformedOperand(line.operand.clone()));
                }
            }
            return Ok(());
        }

        let opcode = match inst::lookup(line.unextended_opcode()) {
            Some(opcode) => opcode,
            None => return Ok(()),
        };
        match opcode.format {
            Format::One => Ok(()),
            Format::Two => {
                for name in line.operand.split(',') {
                    Reg::parse(name).map_err(|_| ErrorKind::InvalidRegister(name.to_string()))?;
                }
                Ok(())
            }
            Format::ThreeFour => {
                if line.operand.starts_with('=') {
                    return Ok(());
                }
                let operand = Operand::parse(&line.operand);
                if !operand.body.is_empty() {
                    self.resolve(&operand.body, &line.section)?;
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Encoding

    fn encode_line(&mut self, line: &Line) -> Result<String, ErrorKind> {
        if line.is_literal_pool_entry() {
            return Ok(Constant::parse_literal(&line.operand)?.encode());
        }
        match line.opcode.as_str() {
            "WORD" => self.encode_word(line),
            "BYTE" => Ok(Constant::parse(&line.operand)?.encode()),
            "BASE" => {
                match self.resolve(&line.operand, &line.section)? {
                    Resolved::Address(addr) | Resolved::Value(addr) => self.base = Some(addr),
                    Resolved::External(name) => {
                        return Err(ErrorKind::UndefinedSymbol(name));
                    }
                }
                Ok(String::new())
            }
            "NOBASE" => {
                self.base = None;
                Ok(String::new())
            }
            "CSECT" => {
                self.base = None;
                Ok(String::new())
            }
            "" | "START" | "END" | "EXTDEF" | "EXTREF" | "EQU" | "LTORG" | "RESW" | "RESB" => {
                Ok(String::new())
            }
            _ => self.encode_instruction(line),
        }
    }

    fn encode_instruction(&mut self, line: &Line) -> Result<String, ErrorKind> {
        let opcode = inst::lookup(line.unextended_opcode())
            .ok_or_else(|| ErrorKind::UnknownOpcode(line.opcode.clone()))?;
        match opcode.format {
            Format::One => Ok(format!("{:02X}", opcode.code)),
            Format::Two => self.encode_format2(line, opcode),
            Format::ThreeFour if line.is_extended() => self.encode_format4(line, opcode),
            Format::ThreeFour => self.encode_format3(line, opcode),
        }
    }

    fn encode_format2(&self, line: &Line, opcode: Opcode) -> Result<String, ErrorKind> {
        let mut nibbles = [0u8; 2];
        if !line.operand.is_empty() {
            for (slot, name) in nibbles.iter_mut().zip(line.operand.split(',')) {
                let reg =
                    Reg::parse(name).map_err(|_| ErrorKind::InvalidRegister(name.to_string()))?;
                *slot = reg.nibble();
            }
        }
        Ok(format!(
            "{:02X}{:X}{:X}",
            opcode.code, nibbles[0], nibbles[1]
        ))
    }

    /// 24-bit encoding. Displacement selection tries PC-relative first,
    /// then base-relative; when neither fits the truncated value is
    /// emitted with b=p=0.
    fn encode_format3(&mut self, line: &Line, opcode: Opcode) -> Result<String, ErrorKind> {
        let address = line.address.unwrap_or(0);
        let operand = Operand::parse(&line.operand);
        let (n, i) = mode_bits(operand.mode);
        let mut b = false;
        let mut p = false;

        let disp: i32 = if operand.body.is_empty() {
            0
        } else if let (AddrMode::Immediate, Ok(value)) =
            (operand.mode, operand.body.parse::<i32>())
        {
            value
        } else {
            let target = self.resolve(&operand.body, &line.section)?.target() as i32;
            let mut disp = target - (address as i32 + 3);
            if (-2048..=2047).contains(&disp) {
                p = true;
            } else if let Some(base) = self.base {
                disp = target - base as i32;
                if (0..=4095).contains(&disp) {
                    b = true;
                }
            }
            disp
        };

        let disp = (disp as u32) & 0xFFF;
        let byte1 = (opcode.code & 0xFC) | (n << 1) | i;
        let byte2 = u8::from(operand.indexed) << 7
            | u8::from(b) << 6
            | u8::from(p) << 5
            | ((disp >> 8) & 0x0F) as u8;
        let byte3 = (disp & 0xFF) as u8;
        Ok(format!("{byte1:02X}{byte2:02X}{byte3:02X}"))
    }

    /// 32-bit encoding with a 20-bit address field. Every symbolic target
    /// needs the linker's help: external names get a modification record
    /// naming them, internal ones a record naming the section.
    fn encode_format4(&mut self, line: &Line, opcode: Opcode) -> Result<String, ErrorKind> {
        let address = line.address.unwrap_or(0);
        let operand = Operand::parse(&line.operand);
        let (n, i) = mode_bits(operand.mode);

        let field: u32 = if operand.body.is_empty() {
            0
        } else if let (AddrMode::Immediate, Ok(value)) =
            (operand.mode, operand.body.parse::<i32>())
        {
            value as u32
        } else {
            match self.resolve(&operand.body, &line.section)? {
                Resolved::External(name) => {
                    self.mods
                        .push(ModRecord::new(address + 1, 5, '+', &name, &line.section));
                    0
                }
                Resolved::Address(addr) => {
                    self.mods
                        .push(ModRecord::new(address + 1, 5, '+', &line.section, &line.section));
                    addr
                }
                Resolved::Value(value) => value,
            }
        };

        let flags = (u32::from(n) << 5)
            | (u32::from(i) << 4)
            | (u32::from(operand.indexed) << 3)
            | 0x01;
        let word = (u32::from(opcode.code & 0xFC) << 24) | (flags << 20) | (field & 0xFFFFF);
        Ok(format!("{word:08X}"))
    }

    /// `WORD` emits the 24-bit value of its operand. In an `A-B`
    /// expression an external operand contributes 0 and yields one
    /// modification record with the matching sign.
    fn encode_word(&mut self, line: &Line) -> Result<String, ErrorKind> {
        let address = line.address.unwrap_or(0);
        let value = match Expr::parse(&line.operand)? {
            Expr::Int(value) => value as u32,
            Expr::Sym(name) => self.word_term(&name, line, address, '+')?,
            Expr::Diff(left, right) => {
                let left = self.word_term(&left, line, address, '+')?;
                let right = self.word_term(&right, line, address, '-')?;
                left.wrapping_sub(right)
            }
            Expr::Here => {
                return Err(ErrorKind::MalformedOperand(line.operand.clone()));
            }
        };
        Ok(format!("{:06X}", value & 0xFFFFFF))
    }

    fn word_term(
        &mut self,
        name: &str,
        line: &Line,
        address: u32,
        sign: char,
    ) -> Result<u32, ErrorKind> {
        match self.resolve(name, &line.section)? {
            Resolved::External(name) => {
                self.mods
                    .push(ModRecord::new(address, 6, sign, &name, &line.section));
                Ok(0)
            }
            Resolved::Address(addr) => Ok(addr),
            Resolved::Value(value) => Ok(value),
        }
    }

    // ------------------------------------------------------------------------
    // Resolution

    fn section(&self, name: &str) -> Option<&Section> {
        self.tables.sections.iter().find(|s| s.name == name)
    }

    /// Resolves an operand body for the instruction's section, in order:
    /// literal table for `=` forms, the section's import list, a symbol
    /// defined in the section, any symbol, then a plain integer.
    fn resolve(&self, body: &str, section: &str) -> Result<Resolved, ErrorKind> {
        if body.starts_with('=') {
            return match self.tables.literals.get(body) {
                Some(literal) => Ok(Resolved::Address(literal.address)),
                None => Err(ErrorKind::UndefinedSymbol(body.to_string())),
            };
        }
        if self.section(section).map_or(false, |s| s.imports(body)) {
            return Ok(Resolved::External(body.to_string()));
        }
        if let Some(sym) = self.tables.symbols.get_in(body, section) {
            return Ok(Resolved::Address(sym.address));
        }
        if let Some(sym) = self.tables.symbols.get(body) {
            return Ok(if sym.is_external {
                Resolved::External(body.to_string())
            } else {
                Resolved::Address(sym.address)
            });
        }
        if let Ok(value) = body.parse::<i64>() {
            return Ok(Resolved::Value(value as u32));
        }
        Err(ErrorKind::UndefinedSymbol(body.to_string()))
    }
}

fn mode_bits(mode: AddrMode) -> (u8, u8) {
    match mode {
        AddrMode::Immediate => (0, 1),
        AddrMode::Indirect => (1, 0),
        AddrMode::Simple => (1, 1),
    }
}
