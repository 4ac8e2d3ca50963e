use sicasm::assemble_source;

fn case(src: &str) -> String {
    let assembly = assemble_source(src).expect("assemble");
    println!("{}", assembly.listing);
    assembly.listing
}

#[test]
fn rows_carry_address_and_object_code() {
    let listing = case(
        "COPY\tSTART\t1000\n\
         . load alpha\n\
         FIRST\tLDA\tALPHA\n\
         ALPHA\tRESW\t1\n\
         \tEND\tCOPY\n",
    );
    let rows: Vec<&str> = listing.lines().collect();
    assert!(rows[0].starts_with("Line#"));

    let first = rows.iter().find(|r| r.contains("FIRST")).expect("FIRST row");
    assert!(first.contains("1000"));
    assert!(first.contains("LDA"));
    assert!(first.contains("032000"));

    // Comments are kept verbatim on their own row.
    let comment = rows.iter().find(|r| r.contains(". load alpha")).unwrap();
    assert!(comment.trim_start().starts_with('2'));

    // Directives that consume no storage show a blank address column.
    let end = rows.iter().find(|r| r.contains("END")).unwrap();
    assert!(!end.contains("1006"));
}

#[test]
fn literal_pool_rows() {
    let listing = case(
        "P\tSTART\t0\n\
         \tLDA\t=C'EOF'\n\
         \tLTORG\n\
         \tEND\n",
    );
    let pool = listing
        .lines()
        .find(|r| r.contains("=C'EOF'") && r.contains('*'))
        .expect("pool row");
    assert!(pool.contains("0003"));
    assert!(pool.contains("454F46"));
}

#[test]
fn symbol_table_dump() {
    let listing = case(
        "COPY\tSTART\t0\n\
         \tEXTREF\tRDREC\n\
         FIRST\tLDA\t#1\n\
         ALPHA\tRESW\t1\n\
         \tEND\n",
    );
    let dump = listing.split("Symbol Table:").nth(1).expect("dump");
    assert!(dump.contains("FIRST"));
    assert!(dump.contains("ALPHA"));
    assert!(dump.contains("COPY"));
    // External names are not part of the dump.
    assert!(!dump.contains("RDREC"));
}
