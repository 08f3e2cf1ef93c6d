//! Whitespace-separated text to spreadsheet conversion.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use serde::Serialize;

use crate::error::{Error, Result};

const OUTPUT_SUFFIX: &str = "_converted";
const SHEET_NAME: &str = "Data";
const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 50;

/// File format written by the transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// A parsed table. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Split comma-separated header names. Blank names are kept as blank columns.
#[must_use]
pub fn parse_custom_headers(raw: &str) -> Vec<String> {
    raw.split(',').map(|header| header.trim().to_string()).collect()
}

/// Parse whitespace-separated text into a table.
///
/// With `custom_headers` every line is data; otherwise the first line names
/// the columns. Lines are not trimmed, so leading or trailing whitespace
/// yields an empty edge cell. Rows wider than the header get `extra_N`
/// columns, and every row is padded to the final width.
pub fn parse_text_table(content: &str, custom_headers: Option<&[String]>) -> Result<ParsedTable> {
    let lines = content
        .trim_start_matches('\u{FEFF}')
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return Err(Error::Transform("No valid data found in file".to_string()));
    }

    let custom_headers = custom_headers.filter(|headers| !headers.is_empty());
    let (mut headers, data_lines) = match custom_headers {
        Some(headers) => (headers.to_vec(), &lines[..]),
        None => (split_cells(lines[0]), &lines[1..]),
    };

    let mut rows = data_lines
        .iter()
        .map(|line| split_cells(line))
        .collect::<Vec<_>>();

    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    let base = headers.len();
    headers.extend((base..widest).map(|index| format!("extra_{}", index - base + 1)));

    for row in &mut rows {
        row.resize(headers.len(), String::new());
    }

    Ok(ParsedTable { headers, rows })
}

/// Split on whitespace runs. An edge run produces an empty edge cell.
fn split_cells(line: &str) -> Vec<String> {
    let pieces = line.split(char::is_whitespace).collect::<Vec<_>>();
    let last = pieces.len().saturating_sub(1);
    pieces
        .iter()
        .enumerate()
        .filter(|(index, piece)| !piece.is_empty() || *index == 0 || *index == last)
        .map(|(_, piece)| (*piece).to_string())
        .collect()
}

/// Character width of each column: the longest of header and cells plus two,
/// clamped to `10..=50`.
#[must_use]
pub fn column_widths(table: &ParsedTable) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max);
            (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Write `table` to `path` as a single-sheet `Data` workbook.
pub fn write_xlsx(table: &ParsedTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row_index, row) in std::iter::once(&table.headers)
        .chain(&table.rows)
        .enumerate()
    {
        let row_index = u32::try_from(row_index)
            .map_err(|_| Error::Transform("Too many rows for a worksheet".to_string()))?;
        for (column, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            worksheet.write_string(row_index, sheet_column(column)?, cell.as_str())?;
        }
    }

    for (column, width) in column_widths(table).into_iter().enumerate() {
        // Clamped to at most 50, so the cast is exact.
        #[allow(clippy::cast_precision_loss)]
        worksheet.set_column_width(sheet_column(column)?, width as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn sheet_column(column: usize) -> Result<u16> {
    u16::try_from(column)
        .map_err(|_| Error::Transform("Too many columns for a worksheet".to_string()))
}

/// Render `table` as CSV text with a header record.
pub fn render_csv(table: &ParsedTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_records(&mut writer, table)?;
    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Transform(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| Error::Transform(error.to_string()))
}

/// Write `table` as CSV to `path`.
pub fn write_csv(table: &ParsedTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    write_records(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

fn write_records<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    table: &ParsedTable,
) -> Result<()> {
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    Ok(())
}

/// Output path for converting `input` to `format`.
///
/// `requested` names the file (the format's extension is appended when
/// missing); otherwise the input stem gets a `_converted` suffix. Relative
/// names land next to the input.
#[must_use]
pub fn output_file_name(input: &Path, requested: Option<&str>, format: OutputFormat) -> PathBuf {
    let directory = input.parent().unwrap_or_else(|| Path::new(""));
    let name = match requested.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let stem = input
                .file_stem()
                .map_or_else(|| "output".to_string(), |stem| stem.to_string_lossy().to_string());
            format!("{stem}{OUTPUT_SUFFIX}")
        }
    };

    let extension = format.extension();
    let has_extension = Path::new(&name)
        .extension()
        .is_some_and(|existing| existing.eq_ignore_ascii_case(extension));
    let name = if has_extension {
        name
    } else {
        format!("{name}.{extension}")
    };
    directory.join(name)
}
