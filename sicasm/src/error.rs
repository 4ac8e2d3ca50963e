use color_print::cprintln;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Unknown opcode: `{0}`")]
    UnknownOpcode(String),

    #[error("Invalid register: `{0}`")]
    InvalidRegister(String),

    #[error("Duplicate symbol: `{0}` already defined in section `{1}`")]
    DuplicateSymbol(String, String),

    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Unsupported directive: `{0}`")]
    UnsupportedDirective(String),

    #[error("Malformed operand: `{0}`")]
    MalformedOperand(String),
}

/// An [`ErrorKind`] tied to the 1-based source line it was diagnosed on.
/// Assembly stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct Error {
    pub line: usize,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(line: usize, kind: ErrorKind) -> Self {
        Error { line, kind }
    }

    /// Print the error with the file location and the offending source line.
    pub fn print_diag(&self, path: &str, source: &str) {
        cprintln!("<red,bold>error</>: {}", self.kind);
        cprintln!("     <blue>--></> <underline>{}:{}</>", path, self.line);
        cprintln!("      <blue>|</>");
        let content = source.lines().nth(self.line.saturating_sub(1)).unwrap_or("");
        cprintln!(" <blue>{:>4} |</> {}", self.line, content);
        cprintln!("      <blue>|</>");
    }
}
