// src/table.rs
//! HTML disclosure table → [`RawTable`].
//!
//! The portal renders one `<table class="hasBorder">` whose header spans two
//! rows: group cells such as `本月增加` carry a `colspan` over sub-headers such
//! as `自有股數(集中)`, and single cells such as `身份別` carry `rowspan="2"`.
//! Both spans are expanded into a full grid, then each column's header levels
//! are joined with one space ("本月增加 自有股數(集中)"). Repeated levels from a
//! rowspan collapse to one.
//!
//! Header rows are the rows inside `<thead>`, or else the leading rows made of
//! `<th>` cells only. A table without either uses its first row as the header.

use scraper::{ElementRef, Html, Selector};

use crate::core::sanitize::normalize_ws;

/// A parsed table: flattened column names plus text rows, every row padded or
/// cut to the header width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, s!());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn row_count(&self) -> usize { self.rows.len() }
    pub fn width(&self) -> usize { self.headers.len() }

    /// Cell text, "" when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// One row as (column name, cell) pairs in column order.
    pub fn row_pairs(&self, row: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers
            .iter()
            .enumerate()
            .map(move |(ci, h)| (h.as_str(), self.cell(row, ci)))
    }
}

struct Cell {
    text: String,
    colspan: usize,
    rowspan: usize,
}

struct Row {
    cells: Vec<Cell>,
    header: bool,
}

/// Parse the first `<table>` in `markup`. `None` if there is no table or it has no rows.
pub fn parse_html_table(markup: &str) -> Option<RawTable> {
    let doc = Html::parse_fragment(markup);
    let table_sel = Selector::parse("table").expect("table selector");
    let table = doc.select(&table_sel).next()?;
    parse_table_element(table)
}

/// Parse an already located `<table>` element.
pub fn parse_table_element(table: ElementRef<'_>) -> Option<RawTable> {
    let tr_sel = Selector::parse("tr").expect("tr selector");
    let rows: Vec<Row> = table.select(&tr_sel).map(read_row).filter(|r| !r.cells.is_empty()).collect();
    if rows.is_empty() {
        return None;
    }

    let mut n_header = rows.iter().take_while(|r| r.header).count();
    if n_header == 0 {
        // No marked header: first row names the columns.
        n_header = 1;
    }

    let grid = expand_spans(&rows);
    let (head, body) = grid.split_at(n_header);

    let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);
    let headers = flatten_headers(head, width);
    let rows = body
        .iter()
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .cloned()
        .collect();

    Some(RawTable::new(headers, rows))
}

fn read_row(tr: ElementRef<'_>) -> Row {
    let in_thead = tr
        .parent()
        .and_then(ElementRef::wrap)
        .map(|p| p.value().name().eq_ignore_ascii_case("thead"))
        .unwrap_or(false);

    let mut all_th = true;
    let cells: Vec<Cell> = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| {
            if el.value().name() != "th" { all_th = false; }
            Cell {
                text: normalize_ws(&el.text().collect::<Vec<_>>().join(" ")),
                colspan: span_attr(el, "colspan"),
                rowspan: span_attr(el, "rowspan"),
            }
        })
        .collect();

    let header = in_thead || (all_th && !cells.is_empty());
    Row { cells, header }
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Lay cells out on a rectangular grid, copying spanned text into every slot it covers.
fn expand_spans(rows: &[Row]) -> Vec<Vec<String>> {
    // carry[c] = (text, rows still covered below the current one)
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = row.cells.iter();
        let mut col = 0usize;

        loop {
            if col < carry.len() {
                if let Some((text, left)) = carry[col].as_mut() {
                    out.push(text.clone());
                    *left -= 1;
                    if *left == 0 { carry[col] = None; }
                    col += 1;
                    continue;
                }
            }
            let Some(cell) = cells.next() else { break };
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    if carry.len() <= col { carry.resize(col + 1, None); }
                    carry[col] = Some((cell.text.clone(), cell.rowspan - 1));
                }
                out.push(cell.text.clone());
                col += 1;
            }
        }
        // Rowspans reaching past the last explicit cell of this row.
        while col < carry.len() {
            if let Some((text, left)) = carry[col].as_mut() {
                out.push(text.clone());
                *left -= 1;
                if *left == 0 { carry[col] = None; }
            } else {
                out.push(s!());
            }
            col += 1;
        }
        grid.push(out);
    }
    grid
}

fn flatten_headers(head: &[Vec<String>], width: usize) -> Vec<String> {
    (0..width)
        .map(|ci| {
            let mut parts: Vec<&str> = Vec::new();
            for level in head {
                let Some(text) = level.get(ci) else { continue };
                if text.is_empty() || parts.last() == Some(&text.as_str()) { continue; }
                parts.push(text.as_str());
            }
            if parts.is_empty() { format!("Unnamed: {ci}") } else { parts.join(" ") }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROW: &str = r#"
        <table class="hasBorder">
          <tr class="tblHead">
            <th rowspan="2">身份別</th><th rowspan="2">姓&nbsp;名</th>
            <th colspan="2">本月增加</th>
          </tr>
          <tr class="tblHead"><th>自有股數(集中)</th><th>自有股數(其他)</th></tr>
          <tr class="odd"><td>董事</td><td>王大明</td><td>1,000</td><td>0</td></tr>
          <tr class="even"><td>經理人</td><td>李小華</td><td>0</td><td>5</td></tr>
        </table>"#;

    #[test]
    fn two_row_header_is_flattened() {
        let t = parse_html_table(TWO_ROW).unwrap();
        assert_eq!(
            t.headers,
            vec!["身份別", "姓 名", "本月增加 自有股數(集中)", "本月增加 自有股數(其他)"]
        );
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(0, 2), "1,000");
        assert_eq!(t.cell(1, 1), "李小華");
    }

    #[test]
    fn first_row_is_header_without_th() {
        let t = parse_html_table("<table><tr><td>a</td><td>b</td></tr><tr><td>1</td></tr></table>").unwrap();
        assert_eq!(t.headers, vec!["a", "b"]);
        assert_eq!(t.rows, vec![vec![s!("1"), s!()]]);
    }

    #[test]
    fn body_rowspan_is_copied_down() {
        let html = r#"<table>
            <tr><th>角色</th><th>值</th></tr>
            <tr><td rowspan="2">董事</td><td>1</td></tr>
            <tr><td>2</td></tr>
        </table>"#;
        let t = parse_html_table(html).unwrap();
        assert_eq!(t.cell(1, 0), "董事");
        assert_eq!(t.cell(1, 1), "2");
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let t = parse_html_table("<table><tr><th>身份別</th><th>姓名</th></tr></table>").unwrap();
        assert_eq!(t.width(), 2);
        assert!(t.is_empty());
    }

    #[test]
    fn no_table_is_none() {
        assert!(parse_html_table("<div>nothing</div>").is_none());
    }

    #[test]
    fn row_pairs_follow_columns() {
        let t = parse_html_table(TWO_ROW).unwrap();
        let pairs: Vec<_> = t.row_pairs(0).collect();
        assert_eq!(pairs[0], ("身份別", "董事"));
        assert_eq!(pairs[2], ("本月增加 自有股數(集中)", "1,000"));
    }
}
