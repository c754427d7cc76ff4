use serde::Serialize;

use crate::cli::OutputFormat;

const COLUMN_GAP: usize = 3;

pub trait TableOutputRow {
    fn get_name(&self) -> String;
    fn get_column_names() -> Vec<String>;
    fn get_column_count() -> usize;
    fn get_row(&self) -> Vec<String>;
}

/// Formats rows into left-aligned columns sized after their widest cell.
pub fn format_table<T: TableOutputRow>(rows: &[T], with_headers: bool) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    if with_headers {
        lines.push(T::get_column_names());
    }
    lines.extend(rows.iter().map(TableOutputRow::get_row));

    let mut widths = vec![0; T::get_column_count()];
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    for line in &lines {
        let last = line.len().saturating_sub(1);
        for (i, (cell, width)) in line.iter().zip(&widths).enumerate() {
            output.push_str(cell);
            if i != last {
                let padding = width - cell.chars().count() + COLUMN_GAP;
                output.extend(std::iter::repeat(' ').take(padding));
            }
        }
        output.push('\n');
    }

    output
}

pub trait CliPrint {
    fn print(&self, format: OutputFormat) -> anyhow::Result<()>;
}

impl<T: Serialize + TableOutputRow> CliPrint for Vec<T> {
    fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Names => {
                for row in self {
                    println!("{}", row.get_name());
                }
            }
            OutputFormat::Table => print!("{}", format_table(self, false)),
            OutputFormat::TableWithHeaders => print!("{}", format_table(self, true)),
            OutputFormat::Json => println!("{}", serde_json::to_string(self)?),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(self)?),
        }

        Ok(())
    }
}
