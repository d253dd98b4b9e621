// benches/extract.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use insider_scrape::{core::net::extract_table, extract::extract_changes};

/// A portal-shaped page: two header rows with spans, `n` insiders, every
/// third one with a change.
fn synthetic_page(n: usize) -> String {
    let mut html = String::from(
        "<html><body><table class=\"hasBorder\">\
         <tr><th rowspan=\"2\">身份別</th><th rowspan=\"2\">姓名</th>\
         <th rowspan=\"2\">上月實際持有股數</th>\
         <th colspan=\"2\">本月增加</th><th colspan=\"2\">本月減少</th>\
         <th rowspan=\"2\">本月實際自有持有股數</th></tr>\
         <tr><th>自有股數(集中)</th><th>其他</th><th>自有股數(集中)</th><th>其他</th></tr>",
    );
    for i in 0..n {
        let inc = if i % 3 == 0 { "1,000" } else { "0" };
        html.push_str(&format!(
            "<tr><td>董事</td><td>name{i}</td><td>12,345</td><td>{inc}</td><td>0</td><td>0</td><td>0</td><td>13,345</td></tr>"
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let page = synthetic_page(200);

    c.bench_function("extract_table", |b| {
        b.iter(|| {
            let t = extract_table(black_box(&page)).map(|t| t.row_count()).unwrap_or(0);
            black_box(t)
        })
    });

    let table = extract_table(&page).expect("synthetic page parses");
    c.bench_function("extract_changes", |b| {
        b.iter(|| {
            let recs = extract_changes(black_box(&table), "2330").map(|r| r.len()).unwrap_or(0);
            black_box(recs)
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
