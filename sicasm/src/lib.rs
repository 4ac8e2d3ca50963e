pub mod error;
pub mod listing;
pub mod operand;
pub mod parser;
pub mod pass1;
pub mod pass2;
pub mod records;
pub mod symbol;

pub use error::{Error, ErrorKind};
pub use parser::Line;
pub use pass1::Pass1;
pub use pass2::Pass2;
pub use symbol::{Section, SymbolTable};

/// Everything one `assemble_source` call produces: the annotated lines,
/// the pass-1 tables, and the two output streams.
#[derive(Debug)]
pub struct Assembly {
    pub lines: Vec<Line>,
    pub symbols: SymbolTable,
    pub sections: Vec<Section>,
    pub listing: String,
    pub object: String,
}

/// Runs both passes over the source text and formats the listing and the
/// object program. Stops at the first diagnosed error.
pub fn assemble_source(source: &str) -> Result<Assembly, Error> {
    let mut lines: Vec<Line> = source
        .lines()
        .enumerate()
        .map(|(idx, raw)| Line::parse(idx + 1, raw))
        .collect();

    let tables = Pass1::run(&mut lines)?;
    let mods = Pass2::run(&mut lines, &tables)?;

    let text = records::build_text_records(&lines, &tables.sections);
    let object = records::write_object_program(&lines, &tables.sections, &tables.symbols, &text, &mods);
    let listing = listing::write_listing(&lines, &tables.symbols);

    Ok(Assembly {
        lines,
        symbols: tables.symbols,
        sections: tables.sections,
        listing,
        object,
    })
}
