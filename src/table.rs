//! Grid table layout.
//!
//! Cells arrive already serialized (possibly multi-line); this module only
//! measures and draws:
//!
//! ```text
//! +-----+----+
//! | a   | bb |
//! +=====+====+
//! | ccc | d  |
//! +-----+----+
//! ```

/// One serialized table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    /// Serialized cell content; may contain newlines.
    pub cells: Vec<String>,
    /// Draw the border below this row with `=`.
    pub header: bool,
}

/// Display width of one line of cell content.
#[inline]
fn width(line: &str) -> usize {
    line.chars().count()
}

/// Per-column widths: the longest line of any cell in the column.
pub fn column_widths(rows: &[GridRow]) -> Vec<usize> {
    let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (column, cell) in row.cells.iter().enumerate() {
            let longest = cell.lines().map(width).max().unwrap_or(0);
            widths[column] = widths[column].max(longest);
        }
    }
    widths
}

fn write_border(out: &mut String, widths: &[usize], fill: char) {
    out.push('+');
    for &w in widths {
        out.extend(std::iter::repeat_n(fill, w + 2));
        out.push('+');
    }
}

fn write_row(out: &mut String, widths: &[usize], row: &GridRow) {
    let cell_lines: Vec<Vec<&str>> = row
        .cells
        .iter()
        .map(|cell| cell.lines().collect())
        .collect();
    let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        if line > 0 {
            out.push('\n');
        }
        out.push('|');
        for (column, &w) in widths.iter().enumerate() {
            // Short rows and short cells are padded with blank content
            let text = cell_lines
                .get(column)
                .and_then(|lines| lines.get(line))
                .copied()
                .unwrap_or("");
            out.push(' ');
            out.push_str(text);
            out.extend(std::iter::repeat_n(' ', w - width(text)));
            out.push_str(" |");
        }
    }
}

/// Draw `rows` as a grid table into `out`, without a trailing newline.
///
/// A border precedes every row; the border after a header row uses `=`.
/// Writes nothing for a table without columns.
pub fn write_grid(out: &mut String, rows: &[GridRow]) {
    let widths = column_widths(rows);
    if widths.is_empty() {
        return;
    }

    let mut fill = '-';
    for row in rows {
        write_border(out, &widths, fill);
        out.push('\n');
        write_row(out, &widths, row);
        out.push('\n');
        fill = if row.header { '=' } else { '-' };
    }
    write_border(out, &widths, '-');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str], header: bool) -> GridRow {
        GridRow {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            header,
        }
    }

    fn grid(rows: &[GridRow]) -> String {
        let mut out = String::new();
        write_grid(&mut out, rows);
        out
    }

    #[test]
    fn test_two_by_two() {
        assert_eq!(
            grid(&[row(&["a", "bb"], false), row(&["ccc", "d"], false)]),
            "+-----+----+\n\
             | a   | bb |\n\
             +-----+----+\n\
             | ccc | d  |\n\
             +-----+----+"
        );
    }

    #[test]
    fn test_header_border() {
        assert_eq!(
            grid(&[row(&["Key", "Value"], true), row(&["x", "1"], false)]),
            "+-----+-------+\n\
             | Key | Value |\n\
             +=====+=======+\n\
             | x   | 1     |\n\
             +-----+-------+"
        );
    }

    #[test]
    fn test_empty_header_row_kept() {
        assert_eq!(
            grid(&[row(&["", ""], true), row(&["a", "b"], false)]),
            "+---+---+\n\
             |   |   |\n\
             +===+===+\n\
             | a | b |\n\
             +---+---+"
        );
    }

    #[test]
    fn test_multiline_cells_are_zipped() {
        assert_eq!(
            grid(&[row(&["one\ntwo", "x"], false)]),
            "+-----+---+\n\
             | one | x |\n\
             | two |   |\n\
             +-----+---+"
        );
    }

    #[test]
    fn test_ragged_rows() {
        assert_eq!(
            grid(&[row(&["a"], false), row(&["b", "c"], false)]),
            "+---+---+\n\
             | a |   |\n\
             +---+---+\n\
             | b | c |\n\
             +---+---+"
        );
    }

    #[test]
    fn test_unicode_width() {
        assert_eq!(column_widths(&[row(&["ü"], false)]), vec![1]);
    }

    #[test]
    fn test_no_columns() {
        assert_eq!(grid(&[]), "");
        assert_eq!(grid(&[row(&[], false)]), "");
    }
}
