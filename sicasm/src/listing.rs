use crate::parser::Line;
use crate::symbol::SymbolTable;

/// Formats the listing: one row per source line with its address and
/// object code, followed by the table of locally defined symbols.
pub fn write_listing(lines: &[Line], symbols: &SymbolTable) -> String {
    let mut out = String::new();
    out.push_str("Line#\tAddress\tLabel\t\tOpcode\t\tOperand\t\tObject Code\tComment\n");
    out.push_str("-----\t-------\t-----\t\t------\t\t-------\t\t-----------\t-------\n");

    for line in lines {
        if line.is_comment {
            out.push_str(&format!("{:>5}\t\t\t\t\t\t\t{}\n", line.number, line.comment));
            continue;
        }
        let address = line
            .address
            .map(|address| format!("{address:04X}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>5}\t{:>4}\t{:<8}\t{:<8}\t{:<12}\t{:<12}\t{}\n",
            line.number, address, line.label, line.opcode, line.operand, line.object_code,
            line.comment
        ));
    }

    out.push_str("\nSymbol Table:\n");
    out.push_str("Symbol\t\tAddress\t\tControl Section\n");
    out.push_str("------\t\t-------\t\t---------------\n");
    for (name, sym) in symbols.iter() {
        if sym.is_external || !sym.is_defined {
            continue;
        }
        out.push_str(&format!(
            "{:<8}\t{:04X}\t\t{}\n",
            name, sym.address, sym.section
        ));
    }
    out
}
