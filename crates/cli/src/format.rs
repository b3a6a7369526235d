//! Table → text formatting.
//!
//! Tables are drawn with ASCII borders, one column per header:
//!
//! ```text
//! +------+----+
//! | Kind | ID |
//! +------+----+
//! | Org  | 1  |
//! +------+----+
//! ```

use dutil_core::Table;

/// Draw a table. Column width is measured in characters.
pub fn draw_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut lines = vec![border.clone(), format_row(&table.header, &widths), border.clone()];
    for row in &table.rows {
        lines.push(format_row(row, &widths));
    }
    lines.push(border);
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(padding + 1));
        line.push('|');
    }
    line
}
