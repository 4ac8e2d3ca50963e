use sicasm::assemble_source;

fn case(src: &str) -> String {
    let assembly = assemble_source(src).expect("assemble");
    println!("{}", assembly.object);
    assembly.object
}

#[test]
fn single_section_records() {
    let object = case(
        "COPY\tSTART\t1000\n\
         FIRST\tLDA\tALPHA\n\
         ALPHA\tRESW\t1\n\
         \tEND\tCOPY\n",
    );
    let lines: Vec<&str> = object.lines().collect();
    assert_eq!(lines[0], "H^COPY  ^001000^000006");
    assert_eq!(lines[1], "T^001000^03^032000");
    assert_eq!(lines[2], "E^001000");
}

#[test]
fn text_record_segmentation() {
    // Ten 3-byte instructions fill one 30-byte record; the RESW gap opens
    // a second record for the trailing two.
    let mut src = String::from("P\tSTART\t0\n");
    for _ in 0..10 {
        src.push_str("\tRSUB\n");
    }
    src.push_str("\tRESW\t5\n");
    src.push_str("\tRSUB\n\tRSUB\n");
    src.push_str("\tEND\n");

    let object = case(&src);
    let text: Vec<&str> = object.lines().filter(|l| l.starts_with("T^")).collect();
    assert_eq!(text.len(), 2);
    assert!(text[0].starts_with("T^000000^1E^4F0000^"));
    assert_eq!(text[0].matches("4F0000").count(), 10);
    assert_eq!(text[1], "T^00002D^06^4F0000^4F0000");
}

#[test]
fn record_cap_without_gap() {
    // Eleven contiguous instructions: the eleventh spills into a second
    // record that starts at its own address.
    let mut src = String::from("P\tSTART\t0\n");
    for _ in 0..11 {
        src.push_str("\tRSUB\n");
    }
    src.push_str("\tEND\n");

    let object = case(&src);
    let text: Vec<&str> = object.lines().filter(|l| l.starts_with("T^")).collect();
    assert_eq!(text.len(), 2);
    assert_eq!(text[1], "T^00001E^03^4F0000");
}

#[test]
fn multi_section_program() {
    let object = case(
        "COPY\tSTART\t0\n\
         \tEXTDEF\tBUFFER\n\
         \tEXTREF\tRDREC\n\
         FIRST\tSTL\tRETADR\n\
         \t+JSUB\tRDREC\n\
         RETADR\tRESW\t1\n\
         BUFFER\tRESB\t4\n\
         MAXLEN\tWORD\tRDREC-COPY\n\
         RDREC\tCSECT\n\
         \tEXTREF\tBUFFER\n\
         \t+STA\tBUFFER\n\
         \tRSUB\n\
         \tEND\tFIRST\n",
    );
    let lines: Vec<&str> = object.lines().collect();
    assert_eq!(
        lines,
        vec![
            "H^COPY  ^000000^000011",
            "D^BUFFER^00000A",
            "R^RDREC ",
            "T^000000^07^172004^4B100000",
            "T^00000E^03^000000",
            "M^000004^05^+RDREC",
            "M^00000E^06^+RDREC",
            "E^000000",
            "H^RDREC ^000000^000007",
            "R^BUFFER",
            "T^000000^07^0F100000^4F0000",
            "M^000001^05^+BUFFER",
            "E",
        ]
    );
}

#[test]
fn word_difference_of_externals() {
    let object = case(
        "P\tSTART\t0\n\
         \tEXTREF\tBUFEND,BUFFER\n\
         MAXLEN\tWORD\tBUFEND-BUFFER\n\
         \tEND\n",
    );
    assert!(object.contains("T^000000^03^000000"));
    assert!(object.contains("M^000000^06^+BUFEND"));
    assert!(object.contains("M^000000^06^-BUFFER"));
}

#[test]
fn literal_bytes_emitted_once() {
    let object = case(
        "P\tSTART\t0\n\
         \tLDA\t=C'EOF'\n\
         \tLDB\t=C'EOF'\n\
         \tLTORG\n\
         \tLDT\t=C'EOF'\n\
         \tEND\n",
    );
    assert_eq!(object.matches("454F46").count(), 1);
}

#[test]
fn header_length_closure() {
    // Section length covers reserved storage that emits no bytes.
    let object = case(
        "P\tSTART\t0\n\
         \tLDA\t#1\n\
         \tRESB\t100\n\
         \tWORD\t2\n\
         \tEND\n",
    );
    assert!(object.contains("H^P     ^000000^00006A"));
}
