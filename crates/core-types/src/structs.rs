use crate::enums::InputKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declaration of a single calculator input.
///
/// Definitions are compiled into the catalog as `'static` data, so this type is
/// serializable but never deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputField {
    /// The key used in the raw input map.
    pub name: &'static str,
    /// The label shown to the user and quoted in coercion errors.
    pub label: &'static str,
    pub kind: InputKind,
    pub placeholder: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    /// An optional tooltip explaining the expected format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<&'static str>,
}

impl InputField {
    pub const fn number(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            label,
            kind: InputKind::Number,
            placeholder,
            default: None,
            info: None,
        }
    }

    pub const fn text(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            kind: InputKind::Text,
            ..Self::number(name, label, placeholder)
        }
    }

    pub const fn textarea(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            kind: InputKind::TextArea,
            ..Self::number(name, label, placeholder)
        }
    }

    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn info(mut self, info: &'static str) -> Self {
        self.info = Some(info);
        self
    }
}

/// A single table cell. Most calculators pre-format their cells as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

/// An ordered header row plus ordered data rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// The outcome of a calculator, as one of three explicit shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationResult {
    /// A labeled, already formatted scalar.
    KeyValue {
        label: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        info: Option<String>,
    },
    /// A labeled table.
    Table { label: String, table: TableResult },
    /// A human-readable failure.
    Error { message: String },
}

impl CalculationResult {
    pub fn key_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        CalculationResult::KeyValue {
            label: label.into(),
            value: value.into(),
            info: None,
        }
    }

    pub fn table<H, R>(label: impl Into<String>, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<Cell>>,
    {
        CalculationResult::Table {
            label: label.into(),
            table: TableResult {
                headers: headers.into_iter().map(Into::into).collect(),
                rows: rows.into_iter().collect(),
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CalculationResult::Error {
            message: message.into(),
        }
    }

    /// Attaches tooltip text to a key/value result. Other variants are returned unchanged.
    pub fn with_info(self, text: impl Into<String>) -> Self {
        match self {
            CalculationResult::KeyValue { label, value, .. } => CalculationResult::KeyValue {
                label,
                value,
                info: Some(text.into()),
            },
            other => other,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            CalculationResult::KeyValue { label, .. } | CalculationResult::Table { label, .. } => {
                Some(label)
            }
            CalculationResult::Error { .. } => None,
        }
    }

    /// Returns the message of the first error in a batch, if any.
    ///
    /// A batch containing an error is displayed as that error alone.
    pub fn first_error(results: &[CalculationResult]) -> Option<&str> {
        results.iter().find_map(|r| match r {
            CalculationResult::Error { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_an_explicit_tag() {
        let kv = CalculationResult::key_value("Call Price", "$4.61").with_info("European");
        let json = serde_json::to_value(&kv).unwrap();
        assert_eq!(json["kind"], "key_value");
        assert_eq!(json["info"], "European");

        let err = CalculationResult::error("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn table_cells_serialize_untagged() {
        let table = CalculationResult::table(
            "Levels",
            ["Level", "Price"],
            vec![vec![Cell::from("50%"), Cell::from(101.5)]],
        );
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains(r#"["50%",101.5]"#));
    }

    #[test]
    fn first_error_finds_the_earliest_failure() {
        let batch = vec![
            CalculationResult::key_value("A", "1"),
            CalculationResult::error("first"),
            CalculationResult::error("second"),
        ];
        assert_eq!(CalculationResult::first_error(&batch), Some("first"));
        assert_eq!(CalculationResult::first_error(&batch[..1]), None);
    }

    #[test]
    fn field_builders_compose() {
        const FIELD: InputField = InputField::text("method", "Accounting Method", "FIFO")
            .default_value("FIFO")
            .info("Enter FIFO, LIFO, HIFO, or ACB");
        assert_eq!(FIELD.kind, InputKind::Text);
        assert_eq!(FIELD.default, Some("FIFO"));
        assert!(FIELD.info.is_some());
    }
}
