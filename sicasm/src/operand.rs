use crate::error::ErrorKind;

// ----------------------------------------------------------------------------
// Addressing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Immediate,
    Indirect,
    Simple,
}

/// A format-3/4 operand split into its addressing mode, index flag, and
/// the bare target text (symbol, literal form, or number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub mode: AddrMode,
    pub indexed: bool,
    pub body: String,
}

impl Operand {
    pub fn parse(text: &str) -> Operand {
        let (mode, rest) = match text.as_bytes().first() {
            Some(b'#') => (AddrMode::Immediate, &text[1..]),
            Some(b'@') => (AddrMode::Indirect, &text[1..]),
            _ => (AddrMode::Simple, text),
        };
        let (body, indexed) = match rest.strip_suffix(",X") {
            Some(body) => (body, true),
            None => (rest, false),
        };
        Operand {
            mode,
            indexed,
            body: body.trim().to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Expressions

/// Operand expression of `EQU` and `WORD`: `*`, an integer, a symbol, or
/// the difference of two symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Here,
    Int(i32),
    Sym(String),
    Diff(String, String),
}

impl Expr {
    pub fn parse(text: &str) -> Result<Expr, ErrorKind> {
        let text = text.trim();
        if text == "*" {
            return Ok(Expr::Here);
        }
        if let Ok(value) = text.parse::<i32>() {
            return Ok(Expr::Int(value));
        }
        if let Some((left, right)) = text.split_once('-') {
            let (left, right) = (left.trim(), right.trim());
            if left.is_empty() || right.is_empty() {
                return Err(ErrorKind::MalformedOperand(text.to_string()));
            }
            return Ok(Expr::Diff(left.to_string(), right.to_string()));
        }
        if text.is_empty() {
            return Err(ErrorKind::MalformedOperand(text.to_string()));
        }
        Ok(Expr::Sym(text.to_string()))
    }
}

// ----------------------------------------------------------------------------
// Constants

/// A quoted constant: `C'chars'` is one byte per character, `X'hex'` packs
/// two hex digits per byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Char(String),
    Hex(String),
}

impl Constant {
    /// Parses the `C'...'`/`X'...'` form used by `BYTE`.
    pub fn parse(text: &str) -> Result<Constant, ErrorKind> {
        let malformed = || ErrorKind::MalformedOperand(text.to_string());
        let mut chars = text.chars();
        let kind = chars.next().ok_or_else(malformed)?;
        let payload = chars
            .as_str()
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(malformed)?;
        match kind {
            'C' | 'c' => Ok(Constant::Char(payload.to_string())),
            'X' | 'x' => {
                if payload.is_empty() || !payload.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(malformed());
                }
                Ok(Constant::Hex(payload.to_string()))
            }
            _ => Err(malformed()),
        }
    }

    /// Parses a literal, i.e. a constant with a leading `=`.
    pub fn parse_literal(text: &str) -> Result<Constant, ErrorKind> {
        match text.strip_prefix('=') {
            Some(rest) => Constant::parse(rest),
            None => Err(ErrorKind::MalformedOperand(text.to_string())),
        }
    }

    /// Storage size in bytes. Odd-length hex constants round up.
    pub fn byte_len(&self) -> u32 {
        match self {
            Constant::Char(chars) => chars.len() as u32,
            Constant::Hex(digits) => (digits.len() as u32 + 1) / 2,
        }
    }

    /// Object-code hex for the constant.
    pub fn encode(&self) -> String {
        match self {
            Constant::Char(chars) => chars.bytes().map(|b| format!("{b:02X}")).collect(),
            Constant::Hex(digits) => digits.to_ascii_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands() {
        let op = Operand::parse("#LENGTH");
        assert_eq!(op.mode, AddrMode::Immediate);
        assert_eq!(op.body, "LENGTH");
        let op = Operand::parse("@RETADR");
        assert_eq!(op.mode, AddrMode::Indirect);
        let op = Operand::parse("BUFFER,X");
        assert_eq!(op.mode, AddrMode::Simple);
        assert!(op.indexed);
        assert_eq!(op.body, "BUFFER");
        assert_eq!(Operand::parse("").body, "");
    }

    #[test]
    fn exprs() {
        assert_eq!(Expr::parse("*").unwrap(), Expr::Here);
        assert_eq!(Expr::parse("4096").unwrap(), Expr::Int(4096));
        assert_eq!(Expr::parse("-3").unwrap(), Expr::Int(-3));
        assert_eq!(
            Expr::parse("BUFEND-BUFFER").unwrap(),
            Expr::Diff("BUFEND".into(), "BUFFER".into())
        );
        assert_eq!(Expr::parse("MAXLEN").unwrap(), Expr::Sym("MAXLEN".into()));
        assert!(Expr::parse("-").is_err());
    }

    #[test]
    fn constants() {
        let c = Constant::parse("C'EOF'").unwrap();
        assert_eq!(c.byte_len(), 3);
        assert_eq!(c.encode(), "454F46");
        let x = Constant::parse("X'f1'").unwrap();
        assert_eq!(x.byte_len(), 1);
        assert_eq!(x.encode(), "F1");
        let odd = Constant::parse("X'ABC'").unwrap();
        assert_eq!(odd.byte_len(), 2);
        let lit = Constant::parse_literal("=C'EOF'").unwrap();
        assert_eq!(lit.encode(), "454F46");
        assert!(Constant::parse("D'5'").is_err());
        assert!(Constant::parse("X'GG'").is_err());
        assert!(Constant::parse_literal("C'EOF'").is_err());
    }
}
