use crate::record::{Column, Record};

/// Renders records as an aligned text table with a heading row.
pub fn render<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let rows: Vec<Vec<String>> = records
        .into_iter()
        .map(|record| Column::ALL.iter().map(|column| column.cell(record)).collect())
        .collect();

    let mut widths: Vec<usize> = Column::ALL
        .iter()
        .map(|column| column.heading().chars().count())
        .collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let headings = Column::ALL.iter().map(|column| column.heading().to_string());
    push_line(&mut out, headings, &widths);
    push_line(&mut out, widths.iter().map(|width| "-".repeat(*width)), &widths);
    for row in rows {
        push_line(&mut out, row.into_iter(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:^width$}"))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}
