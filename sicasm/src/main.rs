use clap::Parser;
use color_print::cprintln;

use sicasm::{assemble_source, Assembly};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.asm")]
    input: String,

    /// Listing output file
    #[clap(short, long, default_value = "main.lst")]
    listing: String,

    /// Object program output file
    #[clap(short, long, default_value = "main.obj")]
    object: String,

    /// Dump symbol table and control sections
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    println!("SIC/XE Assembler");

    println!("1. Read Source");
    println!("  < {}", args.input);
    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            cprintln!("<red,bold>error</>: Cannot open file `{}`: {}", args.input, err);
            std::process::exit(1);
        }
    };

    println!("2. Assemble");
    let assembly = match assemble_source(&source) {
        Ok(assembly) => assembly,
        Err(err) => {
            err.print_diag(&args.input, &source);
            std::process::exit(1);
        }
    };
    println!(
        "  - {} control sections, {} symbols",
        assembly.sections.len(),
        assembly.symbols.len()
    );

    println!("3. Write Listing");
    println!("  > {}", args.listing);
    write_file(&args.listing, &assembly.listing);

    println!("4. Write Object Program");
    println!("  > {}", args.object);
    write_file(&args.object, &assembly.object);

    if args.dump {
        dump_tables(&assembly);
    }
}

fn write_file(path: &str, content: &str) {
    if let Err(err) = std::fs::write(path, content) {
        cprintln!("<red,bold>error</>: Cannot write file `{}`: {}", path, err);
        std::process::exit(1);
    }
}

fn dump_tables(assembly: &Assembly) {
    println!("\nSymbol Table:");
    for (name, sym) in assembly.symbols.iter() {
        let kind = if sym.is_external {
            "ext"
        } else if sym.is_defined {
            "def"
        } else {
            "dcl"
        };
        cprintln!(
            "  <green>{:04X}</> <blue>{:<8}</> {:<8} {}",
            sym.address,
            name,
            sym.section,
            kind
        );
    }

    println!("\nControl Sections:");
    for section in &assembly.sections {
        cprintln!(
            "  <green>{:04X}-{:04X}</> <blue>{:<8}</> EXTDEF[{}] EXTREF[{}]",
            section.start,
            section.start + section.length,
            section.name,
            section.extdef.join(","),
            section.extref.join(",")
        );
    }
}
