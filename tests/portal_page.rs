// tests/portal_page.rs
use insider_scrape::{
    core::net::extract_table,
    extract::{ColumnMap, extract_changes, resolve_columns},
};

// Trimmed copy of a result page: a company banner table, then the
// disclosure table with a two-row header.
const PAGE: &str = r#"<html><body>
<div id="table01">
  <table class="noBorder"><tr><td>公司代號：2330</td><td>資料年月：113/05</td></tr></table>
  <table class="hasBorder">
    <tr class="tblHead">
      <th rowspan="2">身份別</th>
      <th rowspan="2">姓&nbsp;名</th>
      <th rowspan="2">上月實際持有股數</th>
      <th colspan="2">本月增加</th>
      <th colspan="2">本月減少</th>
      <th rowspan="2">本月實際自有持有股數</th>
    </tr>
    <tr class="tblHead">
      <th>自有股數(集中)</th><th>其他</th>
      <th>自有股數(集中)</th><th>其他</th>
    </tr>
    <tr class="odd">
      <td>董事長</td><td>王大明</td><td>1,000,000</td>
      <td>20,000</td><td>3</td><td>0</td><td>0</td><td>1,020,000</td>
    </tr>
    <tr class="even">
      <td>董事</td><td>李小華</td><td>500</td>
      <td>0</td><td>40</td><td>0</td><td>60</td><td>500</td>
    </tr>
    <tr class="odd">
      <td>經理人</td><td>陳美玲</td><td>3,000</td>
      <td>&nbsp;</td><td></td><td>1,500</td><td>0</td><td>1,500</td>
    </tr>
  </table>
</div></body></html>"#;

#[test]
fn two_row_header_resolves_to_the_self_held_columns() {
    let table = extract_table(PAGE).unwrap();

    assert_eq!(table.width(), 8);
    assert_eq!(table.headers[3], "本月增加 自有股數(集中)");
    assert_eq!(table.headers[4], "本月增加 其他");
    assert_eq!(table.headers[6], "本月減少 其他");

    let cols = resolve_columns(&table.headers).unwrap();
    assert_eq!(
        cols,
        ColumnMap { role: 0, name: 1, prior: 2, current: 7, increase: Some(3), decrease: Some(5) }
    );
}

#[test]
fn only_self_held_changes_are_reported() {
    let table = extract_table(PAGE).unwrap();
    let records = extract_changes(&table, "2330").unwrap();

    // 李小華 moved only "other" shares.
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.company_id, "2330");
    assert_eq!(first.person_name, "王大明");
    assert_eq!(first.role, "董事長");
    assert_eq!(first.prior_holding, 1_000_000.0);
    assert_eq!(first.current_holding, 1_020_000.0);
    assert_eq!((first.increase_delta, first.decrease_delta), (20_000.0, 0.0));

    let second = &records[1];
    assert_eq!(second.person_name, "陳美玲");
    assert_eq!((second.increase_delta, second.decrease_delta), (0.0, 1_500.0));
    assert_eq!(second.current_holding, 1_500.0);
}
