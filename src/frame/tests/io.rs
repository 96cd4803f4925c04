use super::*;
use crate::error::ScourError;
use crate::frame::io::{ExportFormat, FileFormat};
use calamine::{Data, Reader as _};
use std::io::Cursor;

#[test]
fn test_file_format_from_extension() {
    assert_eq!(FileFormat::from_filename("DATA.CSV").unwrap(), FileFormat::Csv);
    assert_eq!(FileFormat::from_filename("book.xlsx").unwrap(), FileFormat::Excel);
    assert_eq!(FileFormat::from_filename("old.xls").unwrap(), FileFormat::Excel);
    assert!(matches!(
        FileFormat::from_filename("notes.txt"),
        Err(ScourError::UnsupportedFormat(name)) if name == "notes.txt"
    ));
}

#[test]
fn test_export_format_from_query() {
    assert_eq!(ExportFormat::from_query(None), ExportFormat::Csv);
    assert_eq!(ExportFormat::from_query(Some("XLSX")), ExportFormat::Xlsx);
    assert_eq!(ExportFormat::from_query(Some("parquet")), ExportFormat::Csv);
    assert_eq!(ExportFormat::Xlsx.file_name(), "cleaned_data.xlsx");
}

#[test]
fn test_parse_upload_rejects_garbage_spreadsheet() {
    let result = parse_upload("broken.xlsx", b"definitely not a zip".to_vec());
    assert!(matches!(result, Err(ScourError::Parse(_))));
}

#[test]
fn test_csv_round_trip() -> Result<()> {
    let original = csv("name,score,flag\nann,1.5,true\nbob,,false\n\"c, d\",2.25,true\n");
    let bytes = to_csv_bytes(&original)?;
    let reloaded = parse_upload("cleaned_data.csv", bytes)?;

    assert_eq!(
        TableView::from_dataset(&original)?,
        TableView::from_dataset(&reloaded)?
    );
    assert_eq!(compute_stats(&original)?, compute_stats(&reloaded)?);
    Ok(())
}

#[test]
fn test_xlsx_round_trip() -> Result<()> {
    let original = Dataset::from_columns(vec![
        (
            "id".to_owned(),
            vec![Cell::Integer(1), Cell::Integer(2), Cell::Integer(-3)],
        ),
        ("name".to_owned(), texts(&["ann", "bob", "cy"])),
        (
            "score".to_owned(),
            vec![Cell::Float(1.5), Cell::Missing, Cell::Float(3.25)],
        ),
        (
            "active".to_owned(),
            vec![Cell::Boolean(true), Cell::Boolean(false), Cell::Boolean(true)],
        ),
    ])?;

    let bytes = to_xlsx_bytes(&original)?;
    let workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.clone()))?;
    assert_eq!(workbook.sheet_names(), vec![XLSX_SHEET_NAME.to_owned()]);

    let reloaded = parse_upload("cleaned_data.xlsx", bytes)?;
    assert_eq!(
        TableView::from_dataset(&original)?,
        TableView::from_dataset(&reloaded)?
    );
    assert_eq!(compute_stats(&reloaded)?.missing_values, 1);
    assert_eq!(
        reloaded.column_cells("id")?,
        vec![Cell::Integer(1), Cell::Integer(2), Cell::Integer(-3)]
    );
    Ok(())
}

#[test]
fn test_xlsx_keeps_large_integers_exact() -> Result<()> {
    let big = (1_i64 << 53) + 1;
    let original = Dataset::from_columns(vec![(
        "big".to_owned(),
        vec![Cell::Integer(big), Cell::Integer(7)],
    )])?;

    let reloaded = parse_upload("big.xlsx", to_xlsx_bytes(&original)?)?;
    let view = TableView::from_dataset(&reloaded)?;
    assert_eq!(view.data[0]["big"], big.to_string());
    assert_eq!(view.data[1]["big"], "7");
    Ok(())
}

#[test]
fn test_xlsx_mixed_numbers_stay_float() -> Result<()> {
    let original = Dataset::from_columns(vec![(
        "x".to_owned(),
        vec![Cell::Float(1.5), Cell::Float(2.0)],
    )])?;

    let reloaded = parse_upload("mixed.xlsx", to_xlsx_bytes(&original)?)?;
    assert_eq!(
        reloaded.column_cells("x")?,
        vec![Cell::Float(1.5), Cell::Float(2.0)]
    );
    Ok(())
}

#[test]
fn test_csv_null_tokens_are_missing() -> Result<()> {
    let dataset = csv("a,b\n1,NA\n2,N/A\n3,null\n4,ok\n");
    let stats = compute_stats(&dataset)?;
    assert_eq!(stats.missing_values, 3);
    assert_eq!(
        dataset.column_cells("b")?,
        vec![Cell::Missing, Cell::Missing, Cell::Missing, Cell::Text("ok".to_owned())]
    );
    Ok(())
}

#[test]
fn test_csv_header_names_match_spreadsheet_rules() -> Result<()> {
    let dataset = read_csv(b"a,a,\n1,2,3\n".to_vec())?;
    assert_eq!(dataset.column_names(), vec!["a", "a.1", "Unnamed: 2"]);
    assert_eq!(dataset.column_cells("a.1")?, vec![Cell::Integer(2)]);

    let header_only_token = csv("NA,b\n1,2\n");
    assert_eq!(header_only_token.column_names(), vec!["NA", "b"]);
    Ok(())
}

#[test]
fn test_header_names_are_unique() {
    let header = vec![
        Data::String("a".to_owned()),
        Data::Empty,
        Data::String("a".to_owned()),
        Data::Int(7),
    ];
    assert_eq!(
        header_names(&header),
        vec!["a", "Unnamed: 1", "a.1", "7"]
    );
}
