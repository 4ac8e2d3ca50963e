use arch::inst::{self, Format};

use crate::error::{Error, ErrorKind};
use crate::operand::{Constant, Expr};
use crate::parser::Line;
use crate::symbol::{Literal, LiteralTable, Section, SymbolTable};

/// First pass: walks the parsed lines in order, assigns addresses, and
/// builds the symbol, literal, and control-section tables. Pass 2 reads
/// the tables but never writes them.
#[derive(Debug, Default)]
pub struct Pass1 {
    pub symbols: SymbolTable,
    pub literals: LiteralTable,
    pub sections: Vec<Section>,
    locctr: u32,
    current: String,
    pending: Vec<String>,
    pools: Vec<(usize, Vec<String>)>,
}

impl Pass1 {
    pub fn run(lines: &mut Vec<Line>) -> Result<Pass1, Error> {
        let mut pass = Pass1::default();
        for idx in 0..lines.len() {
            if lines[idx].is_comment {
                continue;
            }
            let number = lines[idx].number;
            pass.step(&mut lines[idx], idx)
                .map_err(|kind| Error::new(number, kind))?;
        }
        pass.insert_literal_lines(lines);
        Ok(pass)
    }

    fn step(&mut self, line: &mut Line, idx: usize) -> Result<(), ErrorKind> {
        self.directive(line, idx)?;
        line.section = self.current.clone();

        if !line.label.is_empty() && line.opcode != "EQU" {
            self.symbols.define(&line.label, self.locctr, &self.current)?;
        }

        let opcode = line.opcode.clone();
        match opcode.as_str() {
            "RESW" => {
                line.address = Some(self.locctr);
                self.locctr += 3 * parse_count(&line.operand)?;
            }
            "RESB" => {
                line.address = Some(self.locctr);
                self.locctr += parse_count(&line.operand)?;
            }
            "WORD" => {
                line.address = Some(self.locctr);
                self.locctr += 3;
            }
            "BYTE" => {
                line.address = Some(self.locctr);
                self.locctr += Constant::parse(&line.operand)?.byte_len();
            }
            "" => {}
            opcode if crate::parser::DIRECTIVES.contains(&opcode) => {}
            _ => self.instruction(line)?,
        }
        Ok(())
    }

    fn directive(&mut self, line: &mut Line, idx: usize) -> Result<(), ErrorKind> {
        let opcode = line.opcode.clone();
        match opcode.as_str() {
            "START" => {
                if !line.operand.is_empty() {
                    self.locctr = u32::from_str_radix(&line.operand, 16)
                        .map_err(|_| ErrorKind::MalformedOperand(line.operand.clone()))?;
                }
                if !line.label.is_empty() {
                    self.current = line.label.clone();
                    self.sections.push(Section::new(&line.label, self.locctr));
                }
            }
            "CSECT" => {
                if let Some(prev) = self.sections.last_mut() {
                    prev.length = self.locctr - prev.start;
                }
                if !line.label.is_empty() {
                    self.current = line.label.clone();
                    self.sections.push(Section::new(&line.label, 0));
                    self.locctr = 0;
                }
            }
            "END" => {
                self.flush_literals(idx)?;
                if let Some(prev) = self.sections.last_mut() {
                    prev.length = self.locctr - prev.start;
                }
            }
            "EXTDEF" => {
                for name in line.operand.split(',').map(str::trim) {
                    if let Some(section) = self.sections.last_mut() {
                        section.extdef.push(name.to_string());
                    }
                    self.symbols.declare(name, &self.current, false);
                }
            }
            "EXTREF" => {
                for name in line.operand.split(',').map(str::trim) {
                    if let Some(section) = self.sections.last_mut() {
                        section.extref.push(name.to_string());
                    }
                    self.symbols.declare(name, &self.current, true);
                }
            }
            "EQU" => {
                let value = self.eval_equ(&line.operand)?;
                line.address = Some(value);
                if !line.label.is_empty() {
                    self.symbols.define(&line.label, value, &self.current)?;
                }
            }
            "LTORG" => self.flush_literals(idx)?,
            "USE" | "ORG" => {
                return Err(ErrorKind::UnsupportedDirective(line.opcode.clone()));
            }
            _ => {}
        }
        Ok(())
    }

    fn instruction(&mut self, line: &mut Line) -> Result<(), ErrorKind> {
        let opcode = inst::lookup(line.unextended_opcode())
            .ok_or_else(|| ErrorKind::UnknownOpcode(line.opcode.clone()))?;
        if line.is_extended() && opcode.format != Format::ThreeFour {
            return Err(ErrorKind::MalformedOperand(line.opcode.clone()));
        }

        line.address = Some(self.locctr);

        if line.operand.starts_with('=') {
            Constant::parse_literal(&line.operand)?;
            if !self.literals.contains(&line.operand) && !self.pending.contains(&line.operand) {
                self.pending.push(line.operand.clone());
            }
        }

        self.locctr += if line.is_extended() {
            4
        } else {
            opcode.format.size()
        };
        Ok(())
    }

    /// Evaluates an `EQU` operand: `*`, an integer, a defined symbol, or
    /// the difference of two defined symbols. External names are rejected.
    fn eval_equ(&self, operand: &str) -> Result<u32, ErrorKind> {
        match Expr::parse(operand)? {
            Expr::Here => Ok(self.locctr),
            Expr::Int(value) => Ok(value as u32),
            Expr::Sym(name) => self.equ_term(&name),
            Expr::Diff(left, right) => {
                Ok(self.equ_term(&left)?.wrapping_sub(self.equ_term(&right)?))
            }
        }
    }

    fn equ_term(&self, name: &str) -> Result<u32, ErrorKind> {
        let imported = self
            .sections
            .last()
            .map_or(false, |section| section.imports(name));
        match self.symbols.get(name) {
            _ if imported => Err(ErrorKind::MalformedOperand(name.to_string())),
            Some(sym) if sym.is_external => Err(ErrorKind::MalformedOperand(name.to_string())),
            Some(sym) if sym.is_defined => Ok(sym.address),
            _ => Err(ErrorKind::UndefinedSymbol(name.to_string())),
        }
    }

    /// Places every pending literal at the current counter, in insertion
    /// order. Called at `LTORG` and at `END`. Forms placed by an earlier
    /// pool are skipped.
    fn flush_literals(&mut self, idx: usize) -> Result<(), ErrorKind> {
        let pending = std::mem::take(&mut self.pending);
        let mut placed = Vec::new();
        for form in pending {
            if self.literals.contains(&form) {
                continue;
            }
            let len = Constant::parse_literal(&form)?.byte_len();
            self.literals.insert(
                form.clone(),
                Literal {
                    address: self.locctr,
                    section: self.current.clone(),
                    len,
                },
            );
            self.locctr += len;
            placed.push(form);
        }
        if !placed.is_empty() {
            self.pools.push((idx, placed));
        }
        Ok(())
    }

    /// Splices one synthetic `*  =...` line per placed literal directly
    /// after the `LTORG`/`END` line that flushed it, so the listing and
    /// the record emitter see the pool in address order.
    fn insert_literal_lines(&self, lines: &mut Vec<Line>) {
        for (idx, forms) in self.pools.iter().rev() {
            let number = lines[*idx].number;
            let pool: Vec<Line> = forms
                .iter()
                .filter_map(|form| self.literals.get(form).map(|lit| (form, lit)))
                .map(|(form, lit)| Line {
                    number,
                    label: "*".to_string(),
                    operand: form.clone(),
                    address: Some(lit.address),
                    section: lit.section.clone(),
                    ..Line::default()
                })
                .collect();
            lines.splice(idx + 1..idx + 1, pool);
        }
    }
}

fn parse_count(operand: &str) -> Result<u32, ErrorKind> {
    operand
        .trim()
        .parse::<u32>()
        .map_err(|_| ErrorKind::MalformedOperand(operand.to_string()))
}
