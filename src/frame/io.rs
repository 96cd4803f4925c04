use super::cell::Cell;
use super::dataset::Dataset;
use crate::error::{Result, ScourError};
use calamine::{Data, Reader as _};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::io::Cursor;

/// Sheet name used for XLSX downloads.
pub const XLSX_SHEET_NAME: &str = "cleaned";

/// Upload formats, chosen by filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Matches `.csv`, `.xlsx` and `.xls`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for any other name.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Ok(Self::Excel)
        } else {
            Err(ScourError::UnsupportedFormat(filename.to_owned()))
        }
    }
}

/// Download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// `xlsx` (any case) selects XLSX; anything else, or nothing, is CSV.
    pub fn from_query(format: Option<&str>) -> Self {
        match format {
            Some(f) if f.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "cleaned_data.csv",
            Self::Xlsx => "cleaned_data.xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// Parses uploaded file bytes into a dataset.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unknown extensions and `Parse` for
/// malformed content.
pub fn parse_upload(filename: &str, bytes: Vec<u8>) -> Result<Dataset> {
    match FileFormat::from_filename(filename)? {
        FileFormat::Csv => read_csv(bytes),
        FileFormat::Excel => read_excel(bytes),
    }
}

/// Tokens read as missing in CSV uploads, in addition to empty fields.
pub const CSV_NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// Integers beyond this magnitude do not survive a trip through an f64.
const MAX_EXACT_F64_INT: i64 = 1 << 53;

/// Reads CSV bytes; the first record is the header.
///
/// Header names go through the same cleanup as spreadsheet headers, and the
/// tokens in [`CSV_NULL_TOKENS`] count as missing.
pub fn read_csv(bytes: Vec<u8>) -> Result<Dataset> {
    let header = read_csv_header(&bytes)?;

    let parse_options = CsvParseOptions::default()
        .with_missing_is_null(true)
        .with_null_values(Some(NullValues::AllColumns(
            CSV_NULL_TOKENS.iter().map(|token| (*token).into()).collect(),
        )));
    let mut df = CsvReadOptions::default()
        .with_parse_options(parse_options)
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| ScourError::Parse(e.to_string()))?;

    if header.len() == df.width() {
        df.set_column_names(header)
            .map_err(|e| ScourError::Parse(e.to_string()))?;
    }
    Ok(Dataset::new(df))
}

// The header row alone, read as raw strings so that no token is nulled.
fn read_csv_header(bytes: &[u8]) -> Result<Vec<String>> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_n_rows(Some(1))
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| ScourError::Parse(e.to_string()))?;
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let raw = df
        .get_columns()
        .iter()
        .map(|column| {
            column
                .get(0)
                .map(|value| Cell::from_any_value(&value).display_text())
                .map_err(ScourError::from)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(unique_names(raw))
}

/// Reads the first worksheet; its first row is the header.
pub fn read_excel(bytes: Vec<u8>) -> Result<Dataset> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScourError::Parse("Workbook has no worksheets".to_owned()))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Dataset::default());
    };

    let names = header_names(header);
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(row.get(idx).map_or(Cell::Missing, cell_from_excel));
        }
    }

    Dataset::from_columns(names.into_iter().zip(columns).collect())
        .map_err(|e| ScourError::Parse(e.to_string()))
}

pub(crate) fn header_names(header: &[Data]) -> Vec<String> {
    unique_names(
        header
            .iter()
            .map(|data| cell_from_excel(data).display_text())
            .collect(),
    )
}

// Blank names become `Unnamed: <idx>`; repeats get `.1`, `.2`, ... suffixes.
fn unique_names(raw: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            };
            let seen = counts.entry(base.clone()).or_insert(0);
            let name = if *seen == 0 {
                base
            } else {
                format!("{base}.{seen}")
            };
            *seen += 1;
            name
        })
        .collect()
}

fn cell_from_excel(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::Bool(b) => Cell::Boolean(*b),
        Data::Int(v) => Cell::Integer(*v),
        // Workbooks store every number as a float.
        Data::Float(v) if is_exact_integer(*v) => Cell::Integer(*v as i64),
        Data::Float(v) => Cell::Float(*v),
        Data::String(s) if s.is_empty() => Cell::Missing,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(Cell::Float(dt.as_f64()), |value| Cell::Text(value.to_string())),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

fn is_exact_integer(v: f64) -> bool {
    let limit = MAX_EXACT_F64_INT as f64;
    v.fract() == 0.0 && (-limit..=limit).contains(&v)
}

/// Serializes the dataset as CSV with a header row. Missing cells are empty
/// fields.
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut df = dataset.frame().clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| ScourError::Other(format!("Failed to write CSV: {e}")))?;
    Ok(buf)
}

/// Serializes the dataset as a single-sheet XLSX workbook named
/// [`XLSX_SHEET_NAME`]. Missing cells are left blank.
pub fn to_xlsx_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(XLSX_SHEET_NAME)?;

    for (col_idx, name) in dataset.column_names().iter().enumerate() {
        let col = u16::try_from(col_idx)
            .map_err(|e| ScourError::Other(format!("Too many columns for XLSX: {e}")))?;
        worksheet.write_string(0, col, name)?;

        for (row_idx, cell) in dataset.column_cells(name)?.iter().enumerate() {
            let row = u32::try_from(row_idx + 1)
                .map_err(|e| ScourError::Other(format!("Too many rows for XLSX: {e}")))?;
            match cell {
                Cell::Missing => {}
                Cell::Boolean(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Cell::Integer(v) if (-MAX_EXACT_F64_INT..=MAX_EXACT_F64_INT).contains(v) => {
                    worksheet.write_number(row, col, *v as f64)?;
                }
                Cell::Integer(v) => {
                    worksheet.write_string(row, col, v.to_string())?;
                }
                Cell::Float(v) => {
                    worksheet.write_number(row, col, *v)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
