// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

use crate::table::RawTable;

/// Written at the start of every table file so spreadsheet apps read the CJK
/// text as UTF-8.
pub const BOM: char = '\u{FEFF}';

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant, leading BOM ignored).
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// First row is the header; the rest is data.
pub fn parse_table(text: &str, sep: char) -> RawTable {
    let mut rows = parse_rows(text, sep);
    if rows.is_empty() {
        return RawTable::default();
    }
    let headers = rows.remove(0);
    RawTable::new(headers, rows)
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Whole table (header line first) as one string, BOM included.
pub fn table_to_string<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>], sep: char) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let mut bom = [0u8; 4];
    buf.extend_from_slice(BOM.encode_utf8(&mut bom).as_bytes());

    let _ = write_row(&mut buf, headers, sep);
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_survive() {
        let rows = parse_rows("a,\"b,c\",\"say \"\"hi\"\"\"\r\n1,2,3\n", ',');
        assert_eq!(rows, vec![
            vec![s!("a"), s!("b,c"), s!("say \"hi\"")],
            vec![s!("1"), s!("2"), s!("3")],
        ]);
    }

    #[test]
    fn bom_is_written_and_skipped() {
        let text = table_to_string(&["身份別", "姓名"], &[vec![s!("董事"), s!("王,大明")]], ',');
        assert!(text.starts_with(BOM));
        let t = parse_table(&text, ',');
        assert_eq!(t.headers, vec!["身份別", "姓名"]);
        assert_eq!(t.cell(0, 1), "王,大明");
    }

    #[test]
    fn empty_text_is_empty_table() {
        assert!(parse_table("", ',').headers.is_empty());
    }
}
