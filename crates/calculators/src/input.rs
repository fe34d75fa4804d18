//! Single-stage coercion of raw string inputs into a typed input map.

use crate::error::CalcError;
use crate::parse::{parse_number, parse_series};
use core_types::{InputField, InputKind};
use std::collections::HashMap;

/// A coerced input value.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// A `number` field holding a parsed scalar.
    Number(f64),
    /// A `number` field left blank. The calculator decides whether that is valid.
    Empty,
    /// A `number` field containing a comma, kept raw for series parsing.
    Series(String),
    /// Any `text` or `textarea` field.
    Text(String),
}

/// Upper bound on any count-valued input (periods, trades, bins).
pub const MAX_COUNT: usize = 1_000_000;

#[derive(Debug, Clone)]
struct Entry {
    label: &'static str,
    value: InputValue,
}

/// The strongly typed inputs handed to a calculator.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    entries: HashMap<&'static str, Entry>,
}

impl Inputs {
    /// Coerces `raw` against the declared `fields`.
    ///
    /// Fields missing from `raw` take their declared default (or the empty string).
    /// Names in `raw` that no field declares are ignored. A `number` field fails
    /// with [`CalcError::InvalidNumber`] when its text neither is blank, contains a
    /// comma, nor starts with a number.
    pub fn coerce(fields: &[InputField], raw: &HashMap<String, String>) -> Result<Self, CalcError> {
        let mut entries = HashMap::with_capacity(fields.len());
        for field in fields {
            let text = raw
                .get(field.name)
                .map(String::as_str)
                .or(field.default)
                .unwrap_or("");
            let value = coerce_value(field, text)?;
            entries.insert(
                field.name,
                Entry {
                    label: field.label,
                    value,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.entries.get(name).map(|e| &e.value)
    }

    fn label(&self, name: &str) -> String {
        self.entries
            .get(name)
            .map_or_else(|| name.to_string(), |e| e.label.to_string())
    }

    /// A required scalar.
    pub fn number(&self, name: &str) -> Result<f64, CalcError> {
        match self.get(name) {
            Some(InputValue::Number(n)) => Ok(*n),
            Some(InputValue::Text(t)) => parse_number(t).ok_or_else(|| CalcError::InvalidNumber {
                label: self.label(name),
            }),
            Some(InputValue::Series(_)) => Err(CalcError::InvalidNumber {
                label: self.label(name),
            }),
            Some(InputValue::Empty) | None => {
                Err(CalcError::MissingInput(self.label(name)))
            }
        }
    }

    /// An optional scalar that falls back to `default` when left blank.
    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, CalcError> {
        match self.get(name) {
            Some(InputValue::Empty) | None => Ok(default),
            _ => self.number(name),
        }
    }

    /// A required non-negative whole number, such as a period or a step count.
    ///
    /// Bounded by [`MAX_COUNT`]; calculators whose cost grows faster than linearly
    /// use [`Inputs::count_at_most`] with a tighter limit.
    pub fn count(&self, name: &str) -> Result<usize, CalcError> {
        self.count_at_most(name, MAX_COUNT)
    }

    /// A whole number no greater than `max`.
    pub fn count_at_most(&self, name: &str, max: usize) -> Result<usize, CalcError> {
        let n = self.number(name)?;
        if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
            return Err(CalcError::domain(format!(
                "\"{}\" must be a whole number.",
                self.label(name)
            )));
        }
        if n > max as f64 {
            return Err(CalcError::domain(format!(
                "\"{}\" must be at most {max}.",
                self.label(name)
            )));
        }
        Ok(n as usize)
    }

    /// Raw text. Numbers are rendered back to text; blanks read as `""`.
    pub fn text(&self, name: &str) -> String {
        match self.get(name) {
            Some(InputValue::Text(t)) | Some(InputValue::Series(t)) => t.clone(),
            Some(InputValue::Number(n)) => n.to_string(),
            Some(InputValue::Empty) | None => String::new(),
        }
    }

    /// A numeric series. A lone number is a one-element series.
    pub fn series(&self, name: &str) -> Vec<f64> {
        match self.get(name) {
            Some(InputValue::Text(t)) | Some(InputValue::Series(t)) => parse_series(t),
            Some(InputValue::Number(n)) if n.is_finite() => vec![*n],
            _ => Vec::new(),
        }
    }
}

fn coerce_value(field: &InputField, text: &str) -> Result<InputValue, CalcError> {
    match field.kind {
        InputKind::Text | InputKind::TextArea => Ok(InputValue::Text(text.to_string())),
        // Only a truly empty field is blank; whitespace is an invalid number.
        InputKind::Number if text.is_empty() => Ok(InputValue::Empty),
        InputKind::Number if text.contains(',') => Ok(InputValue::Series(text.to_string())),
        InputKind::Number => parse_number(text)
            .map(InputValue::Number)
            .ok_or_else(|| CalcError::InvalidNumber {
                label: field.label.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[InputField] = &[
        InputField::number("price", "Entry Price", "50"),
        InputField::number("fees", "Fees", "0").default_value("0"),
        InputField::text("method", "Method", "FIFO").default_value("FIFO"),
        InputField::textarea("series", "Prices", "1,2,3"),
    ];

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn numbers_are_parsed_and_defaults_filled() {
        let inputs = Inputs::coerce(FIELDS, &raw(&[("price", "50.5"), ("series", "1, 2, x, 3")])).unwrap();
        assert_eq!(inputs.number("price").unwrap(), 50.5);
        assert_eq!(inputs.number("fees").unwrap(), 0.0);
        assert_eq!(inputs.text("method"), "FIFO");
        assert_eq!(inputs.series("series"), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn invalid_number_names_the_label() {
        let err = Inputs::coerce(FIELDS, &raw(&[("price", "fifty")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid number for \"Entry Price\". Please enter a valid number."
        );
    }

    #[test]
    fn blanks_and_commas_pass_through() {
        let inputs = Inputs::coerce(FIELDS, &raw(&[("price", ""), ("fees", "1,2")])).unwrap();
        assert_eq!(inputs.get("price"), Some(&InputValue::Empty));
        assert_eq!(inputs.get("fees"), Some(&InputValue::Series("1,2".to_string())));
        assert!(matches!(inputs.number("price"), Err(CalcError::MissingInput(_))));
        assert_eq!(inputs.number_or("price", 7.0).unwrap(), 7.0);
        assert_eq!(inputs.series("fees"), vec![1.0, 2.0]);
    }

    #[test]
    fn counts_must_be_whole() {
        let inputs = Inputs::coerce(FIELDS, &raw(&[("price", "2.5"), ("fees", "3")])).unwrap();
        assert!(inputs.count("price").is_err());
        assert_eq!(inputs.count("fees").unwrap(), 3);
    }

    #[test]
    fn counts_are_bounded() {
        let inputs = Inputs::coerce(FIELDS, &raw(&[("price", "1e20"), ("fees", "10001")])).unwrap();
        assert_eq!(
            inputs.count("price").unwrap_err().to_string(),
            "\"Entry Price\" must be at most 1000000."
        );
        assert!(inputs.count("fees").is_ok());
        assert_eq!(
            inputs.count_at_most("fees", 10_000).unwrap_err().to_string(),
            "\"Fees\" must be at most 10000."
        );
    }

    #[test]
    fn whitespace_is_not_a_blank_number() {
        let err = Inputs::coerce(FIELDS, &raw(&[("price", "   ")])).unwrap_err();
        assert_eq!(err, CalcError::InvalidNumber { label: "Entry Price".to_string() });
    }
}
