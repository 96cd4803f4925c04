use polars::prelude::AnyValue;
use std::hash::{Hash, Hasher};

/// A single dataset value.
///
/// `Missing` is distinct from `Text(String::new())`; only the wire view
/// collapses the two.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Missing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Value domain of a column, inferred from its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Boolean,
    Integer,
    Float,
    Text,
}

impl CellKind {
    /// Narrowest kind that holds every non-missing cell, or `None` when all
    /// cells are missing. Integers widen to floats; any other mix is text.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Option<Self> {
        cells
            .into_iter()
            .filter_map(Cell::kind)
            .fold(None, |acc, kind| match (acc, kind) {
                (None, k) => Some(k),
                (Some(a), b) if a == b => Some(a),
                (Some(Self::Integer | Self::Float), Self::Integer | Self::Float) => {
                    Some(Self::Float)
                }
                _ => Some(Self::Text),
            })
    }
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Self::Missing => None,
            Self::Boolean(_) => Some(CellKind::Boolean),
            Self::Integer(_) => Some(CellKind::Integer),
            Self::Float(_) => Some(CellKind::Float),
            Self::Text(_) => Some(CellKind::Text),
        }
    }

    /// Display form used by the table view. Missing renders as `""`.
    pub fn display_text(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Boolean(true) => "True".to_owned(),
            Self::Boolean(false) => "False".to_owned(),
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => format_float(*v),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn from_any_value(value: &AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Missing,
            AnyValue::Boolean(b) => Self::Boolean(*b),
            AnyValue::String(s) => Self::Text((*s).to_owned()),
            AnyValue::StringOwned(s) => Self::Text(s.to_string()),
            AnyValue::Int32(v) => Self::Integer(i64::from(*v)),
            AnyValue::Int64(v) => Self::Integer(*v),
            AnyValue::UInt32(v) => Self::Integer(i64::from(*v)),
            AnyValue::UInt64(v) => i64::try_from(*v).map_or(Self::Float(*v as f64), Self::Integer),
            AnyValue::Float32(v) => Self::Float(f64::from(*v)),
            AnyValue::Float64(v) => Self::Float(*v),
            other => Self::Text(other.to_string()),
        }
    }

    /// Converts a JSON scalar. Arrays and objects have no cell form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(Self::Missing),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => Some(n.as_i64().map_or_else(
                || Self::Float(n.as_f64().unwrap_or(f64::NAN)),
                Self::Integer,
            )),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Interprets `text` in the value domain `kind`, falling back to text
    /// when it does not parse.
    pub fn coerce_text(text: &str, kind: Option<CellKind>) -> Self {
        let trimmed = text.trim();
        match kind {
            Some(CellKind::Integer) => trimmed
                .parse::<i64>()
                .map(Self::Integer)
                .or_else(|_| trimmed.parse::<f64>().map(Self::Float))
                .unwrap_or_else(|_| Self::Text(text.to_owned())),
            Some(CellKind::Float) => trimmed
                .parse::<f64>()
                .map_or_else(|_| Self::Text(text.to_owned()), Self::Float),
            Some(CellKind::Boolean) => match trimmed.to_lowercase().as_str() {
                "true" => Self::Boolean(true),
                "false" => Self::Boolean(false),
                _ => Self::Text(text.to_owned()),
            },
            Some(CellKind::Text) | None => Self::Text(text.to_owned()),
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

// All NaNs compare equal and -0.0 equals 0.0, so duplicate keys group the way
// a user reading the table would expect.
fn float_key(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => float_key(*a) == float_key(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Missing => {}
            Self::Boolean(b) => b.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Float(v) => float_key(*v).hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(Cell::Missing.display_text(), "");
        assert_eq!(Cell::Integer(42).display_text(), "42");
        assert_eq!(Cell::Float(2.0).display_text(), "2.0");
        assert_eq!(Cell::Float(2.5).display_text(), "2.5");
        assert_eq!(Cell::Boolean(true).display_text(), "True");
        assert_eq!(Cell::Text("x".to_owned()).display_text(), "x");
    }

    #[test]
    fn test_missing_is_not_empty_text() {
        assert_ne!(Cell::Missing, Cell::Text(String::new()));
        assert!(Cell::Missing.is_missing());
        assert!(!Cell::Text(String::new()).is_missing());
    }

    #[test]
    fn test_nan_cells_group_together() {
        assert_eq!(Cell::Float(f64::NAN), Cell::Float(f64::NAN));
        assert_eq!(Cell::Float(-0.0), Cell::Float(0.0));
    }

    #[test]
    fn test_infer_kind() {
        let ints = [Cell::Integer(1), Cell::Missing, Cell::Integer(3)];
        assert_eq!(CellKind::infer(&ints), Some(CellKind::Integer));

        let mixed_numbers = [Cell::Integer(1), Cell::Float(0.5)];
        assert_eq!(CellKind::infer(&mixed_numbers), Some(CellKind::Float));

        let mixed = [Cell::Integer(1), Cell::Text("a".to_owned())];
        assert_eq!(CellKind::infer(&mixed), Some(CellKind::Text));

        assert_eq!(CellKind::infer(&[Cell::Missing, Cell::Missing]), None);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(
            Cell::coerce_text("7", Some(CellKind::Integer)),
            Cell::Integer(7)
        );
        assert_eq!(
            Cell::coerce_text("7.5", Some(CellKind::Integer)),
            Cell::Float(7.5)
        );
        assert_eq!(
            Cell::coerce_text("X", Some(CellKind::Float)),
            Cell::Text("X".to_owned())
        );
        assert_eq!(
            Cell::coerce_text("TRUE", Some(CellKind::Boolean)),
            Cell::Boolean(true)
        );
        assert_eq!(Cell::coerce_text(" 1 ", None), Cell::Text(" 1 ".to_owned()));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Cell::from_json(&serde_json::json!(null)), Some(Cell::Missing));
        assert_eq!(Cell::from_json(&serde_json::json!(3)), Some(Cell::Integer(3)));
        assert_eq!(
            Cell::from_json(&serde_json::json!("a")),
            Some(Cell::Text("a".to_owned()))
        );
        assert_eq!(Cell::from_json(&serde_json::json!([1])), None);
    }
}
