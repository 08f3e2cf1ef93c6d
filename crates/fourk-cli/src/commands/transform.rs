use std::path::Path;

use fourk_core::transform::{
    output_file_name, parse_custom_headers, parse_text_table, render_csv, write_csv, write_xlsx,
    OutputFormat,
};

use crate::cli::TransformFormat;
use crate::error::CliError;

pub struct TransformOptions<'a> {
    pub input: &'a Path,
    pub headers: Option<&'a str>,
    pub output: Option<&'a str>,
    pub format: TransformFormat,
    pub to_stdout: bool,
}

pub fn run_transform(options: TransformOptions<'_>) -> Result<(), CliError> {
    let input = options.input;
    let raw = std::fs::read(input)?;
    let content =
        String::from_utf8(raw).map_err(|_| CliError::NotText(input.display().to_string()))?;

    let custom_headers = options
        .headers
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_custom_headers);
    let table = parse_text_table(&content, custom_headers.as_deref())?;

    if options.to_stdout {
        print!("{}", render_csv(&table)?);
        return Ok(());
    }

    let format = output_format(options.format);
    let path = output_file_name(input, options.output, format);
    match format {
        OutputFormat::Xlsx => write_xlsx(&table, &path)?,
        OutputFormat::Csv => write_csv(&table, &path)?,
    }
    println!(
        "Converted {} rows x {} columns to {}",
        table.rows.len(),
        table.column_count(),
        path.display()
    );
    Ok(())
}

const fn output_format(format: TransformFormat) -> OutputFormat {
    match format {
        TransformFormat::Xlsx => OutputFormat::Xlsx,
        TransformFormat::Csv => OutputFormat::Csv,
    }
}
