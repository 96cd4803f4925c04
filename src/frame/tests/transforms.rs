use super::*;
use crate::error::ScourError;
use serde_json::json;

fn subset(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

#[test]
fn test_simulate_counts_subset_duplicates() -> Result<()> {
    let dataset = csv("a,b\n1,\n1,2\n");
    let keys = subset(&["a"]);
    let outcome = dedupe(&dataset, Some(&keys), DedupeMode::Simulate)?;
    assert!(matches!(outcome, DedupeOutcome::Found(1)));
    Ok(())
}

#[test]
fn test_apply_keeps_first_occurrence() -> Result<()> {
    let dataset = csv("a,b\n1,\n1,2\n");
    let keys = subset(&["a"]);
    let DedupeOutcome::Deduplicated(deduped) =
        dedupe(&dataset, Some(&keys), DedupeMode::Apply)?
    else {
        panic!("apply mode should return a dataset");
    };

    let view = TableView::from_dataset(&deduped)?;
    assert_eq!(deduped.height(), 1);
    assert_eq!(view.columns, vec!["a", "b"]);
    assert_eq!(view.data[0]["a"], "1");
    assert_eq!(view.data[0]["b"], "");
    Ok(())
}

#[test]
fn test_dedupe_unknown_subset_column() {
    let dataset = csv("a,b\n1,2\n");
    let keys = subset(&["a", "nope"]);
    let result = dedupe(&dataset, Some(&keys), DedupeMode::Simulate);
    assert!(matches!(result, Err(ScourError::InvalidColumn(name)) if name == "nope"));
}

#[test]
fn test_empty_subset_compares_all_columns() -> Result<()> {
    let dataset = csv("a,b\n1,x\n1,y\n1,x\n");
    let empty: Vec<String> = Vec::new();
    assert_eq!(count_duplicates(&dataset, Some(&empty))?, 1);
    assert_eq!(count_duplicates(&dataset, None)?, 1);
    Ok(())
}

#[test]
fn test_drop_duplicates_preserves_relative_order() -> Result<()> {
    let dataset = csv("v\n3\n1\n3\n2\n1\n");
    let deduped = drop_duplicates(&dataset, None)?;
    assert_eq!(
        deduped.column_cells("v")?,
        vec![Cell::Integer(3), Cell::Integer(1), Cell::Integer(2)]
    );
    assert!(deduped.height() <= dataset.height());
    Ok(())
}

#[test]
fn test_drop_duplicates_is_idempotent() -> Result<()> {
    let dataset = csv("a,b\n1,x\n2,y\n1,x\n2,z\n2,y\n");
    let once = drop_duplicates(&dataset, None)?;
    let twice = drop_duplicates(&once, None)?;
    assert_eq!(
        TableView::from_dataset(&once)?,
        TableView::from_dataset(&twice)?
    );
    assert_eq!(once.height(), 3);
    Ok(())
}

#[test]
fn test_fill_missing_everywhere() -> Result<()> {
    let dataset = csv("a,b\n1,\n,2\n");
    let filled = fill_missing(&dataset, "X", None)?;

    let view = TableView::from_dataset(&filled)?;
    assert_eq!(view.data[0]["b"], "X");
    assert_eq!(view.data[1]["a"], "X");
    assert_eq!(view.data[0]["a"], "1", "non-missing cells are untouched");
    assert_eq!(view.data[1]["b"], "2", "non-missing cells are untouched");
    assert_eq!(compute_stats(&filled)?.missing_values, 0);
    Ok(())
}

#[test]
fn test_fill_missing_single_column() -> Result<()> {
    let dataset = csv("a,b\n1,\n,2\n");
    let filled = fill_missing(&dataset, "0", Some("a"))?;

    assert_eq!(
        filled.column_cells("a")?,
        vec![Cell::Integer(1), Cell::Integer(0)],
        "numeric fill stays numeric"
    );
    assert_eq!(filled.column_cells("b")?, dataset.column_cells("b")?);
    assert_eq!(compute_stats(&filled)?.missing_values, 1);
    Ok(())
}

#[test]
fn test_fill_missing_unknown_column_fills_all() -> Result<()> {
    let dataset = csv("a,b\n1,\n,2\n");
    let filled = fill_missing(&dataset, "?", Some("does-not-exist"))?;
    assert_eq!(compute_stats(&filled)?.missing_values, 0);
    assert_eq!(filled.column_names(), dataset.column_names());
    Ok(())
}

#[test]
fn test_fill_missing_text_into_numeric_column() -> Result<()> {
    let dataset = csv("id,score\n1,1.5\n2,\n3,2\n");
    let filled = fill_missing(&dataset, "n/a", Some("score"))?;
    assert_eq!(
        filled.column_cells("score")?,
        texts(&["1.5", "n/a", "2.0"])
    );
    Ok(())
}

#[test]
fn test_replace_aligns_to_current_columns() -> Result<()> {
    let current = csv("a,b\n1,2\n");
    let records = vec![json!({"b": "x", "extra": "dropped", "a": "1"})];
    let replaced = replace(Some(&current), &records)?;

    assert_eq!(replaced.column_names(), vec!["a", "b"]);
    assert_eq!(replaced.column_cells("a")?, texts(&["1"]));
    assert_eq!(replaced.column_cells("b")?, texts(&["x"]));
    Ok(())
}

#[test]
fn test_replace_fills_unsubmitted_columns_with_empty_text() -> Result<()> {
    let current = csv("a,b\n1,2\n");
    let records = vec![json!({"a": "5"}), json!({"a": "6"})];
    let replaced = replace(Some(&current), &records)?;

    assert_eq!(replaced.column_cells("b")?, texts(&["", ""]));
    assert_eq!(compute_stats(&replaced)?.missing_values, 0);
    Ok(())
}

#[test]
fn test_replace_without_current_uses_first_seen_order() -> Result<()> {
    let records = vec![json!({"x": 1}), json!({"y": true, "x": 3})];
    let replaced = replace(None, &records)?;

    assert_eq!(replaced.column_names(), vec!["x", "y"]);
    assert_eq!(
        replaced.column_cells("x")?,
        vec![Cell::Integer(1), Cell::Integer(3)]
    );
    assert_eq!(
        replaced.column_cells("y")?,
        vec![Cell::Missing, Cell::Boolean(true)]
    );
    Ok(())
}

#[test]
fn test_replace_rejects_non_records() {
    let result = replace(None, &[json!(1)]);
    assert!(matches!(result, Err(ScourError::InvalidPayload(_))));

    let result = replace(None, &[json!({"a": [1, 2]})]);
    assert!(matches!(result, Err(ScourError::InvalidPayload(_))));
}

#[test]
fn test_replace_with_no_records_keeps_columns() -> Result<()> {
    let current = csv("a,b\n1,2\n");
    let replaced = replace(Some(&current), &[])?;
    assert_eq!(replaced.height(), 0);
    assert_eq!(replaced.column_names(), vec!["a", "b"]);
    Ok(())
}
