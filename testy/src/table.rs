//! Renders rows of serializable data as a text table.
//!
//! Each row is serialized to JSON. Object rows contribute one column per field (in the order
//! the fields are first seen), anything else goes into a single `value` column.
//!
//! ```text
//! +------+-----+
//! | name | age |
//! +=============+
//! | joe  | 42  |
//! | anne | 37  |
//! +------+-----+
//! ```

use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorDetails};

const VALUE_COLUMN: &str = "value";
const MIN_COLUMN_WIDTH: usize = 3;
const ELLIPSIS: char = '…';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableFormat {
    /// Total width (borders included) that the table should fit in.
    /// Columns are truncated, widest first, until it does.
    pub max_width: usize,
}

impl Default for TableFormat {
    fn default() -> Self {
        TableFormat { max_width: 200 }
    }
}

pub trait ToTable {
    fn to_table_with_format(self, format: TableFormat) -> Result<String, Error>;

    fn to_table(self) -> Result<String, Error>
    where
        Self: Sized,
    {
        self.to_table_with_format(TableFormat::default())
    }

    /// Prints the table to stdout.
    #[expect(clippy::print_stdout)]
    fn dump_table(self) -> Result<(), Error>
    where
        Self: Sized,
    {
        println!("{}", self.to_table()?);
        Ok(())
    }
}

impl<I> ToTable for I
where
    I: IntoIterator,
    I::Item: Serialize,
{
    fn to_table_with_format(self, format: TableFormat) -> Result<String, Error> {
        let rows = self
            .into_iter()
            .map(|row| {
                serde_json::to_value(row).map_err(|e| {
                    Error::new(ErrorDetails::Serialization {
                        message: format!("Failed to serialize table row: {e}"),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(render(&rows, format))
    }
}

fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\r', '\n'], " ")
}

fn columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        let names: Vec<&str> = match row {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => vec![VALUE_COLUMN],
        };
        for name in names {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

fn cells(row: &Value, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| match row {
            Value::Object(map) => map.get(column).map(cell_text).unwrap_or_default(),
            other if column == VALUE_COLUMN => cell_text(other),
            _ => String::new(),
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    truncated.push(ELLIPSIS);
    truncated
}

fn total_width(widths: &[usize]) -> usize {
    // "| " before each cell, " " after it, and a final "|"
    widths.iter().map(|w| w + 3).sum::<usize>() + 1
}

/// Shrinks the widest column one character at a time until the table fits (or can't shrink).
fn fit_widths(widths: &mut [usize], max_width: usize) {
    while total_width(widths) > max_width {
        let Some(widest) = widths
            .iter_mut()
            .filter(|w| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|w| **w)
        else {
            break;
        };
        *widest -= 1;
    }
}

fn render(rows: &[Value], format: TableFormat) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let columns = columns(rows);
    let body: Vec<Vec<String>> = rows.iter().map(|row| cells(row, &columns)).collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    fit_widths(&mut widths, format.max_width);
    let fitted = |cells: &[String]| -> Vec<String> {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| truncate(cell, *width))
            .collect()
    };

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(fitted(columns.as_slice()));
    for row in &body {
        table.add_row(fitted(row.as_slice()));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Person {
        name: &'static str,
        age: u32,
    }

    /// Asserts on the header and data lines, and that the border lines are borders.
    fn assert_table(table: &str, header: &str, rows: &[&str]) {
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), rows.len() + 4, "{table}");
        assert_eq!(lines[1], header, "{table}");
        assert_eq!(&lines[3..3 + rows.len()], rows, "{table}");
        for border in [lines[0], lines[2], lines[lines.len() - 1]] {
            assert!(border.starts_with('+') && border.ends_with('+'), "{table}");
            assert_eq!(border.chars().count(), header.chars().count(), "{table}");
        }
    }

    #[test]
    fn test_struct_rows() {
        let table = vec![
            Person {
                name: "joe",
                age: 42,
            },
            Person {
                name: "anne",
                age: 37,
            },
        ]
        .to_table()
        .unwrap();
        assert_table(&table, "| name | age |", &["| joe  | 42  |", "| anne | 37  |"]);
        assert_eq!(table.lines().next(), Some("+------+-----+"));
    }

    #[test]
    fn test_scalar_rows_use_value_column() {
        let table = [1, 22].to_table().unwrap();
        assert_table(&table, "| value |", &["| 1     |", "| 22    |"]);
    }

    #[test]
    fn test_union_of_columns() {
        let rows = vec![
            serde_json::json!({"a": 1}),
            serde_json::json!({"b": "x\ny", "a": null}),
        ];
        let table = rows.to_table().unwrap();
        assert_table(&table, "| a | b   |", &["| 1 |     |", "|   | x y |"]);
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(Vec::<Person>::new().to_table().unwrap(), "");
    }

    #[test]
    fn test_truncates_to_max_width() {
        let rows = vec![serde_json::json!({"text": "a".repeat(50)})];
        let table = rows
            .to_table_with_format(TableFormat { max_width: 20 })
            .unwrap();
        assert!(table.lines().all(|line| line.chars().count() <= 20), "{table}");
        assert!(table.contains(&format!("| {}… |", "a".repeat(15))), "{table}");
    }
}
