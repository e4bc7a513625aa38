use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Typed bind parameter. Every variant is nullable so a NULL still carries
/// its PostgreSQL type when bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i32>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(Some(value.into()))
    }

    #[cfg(test)]
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Decimal(v) => v.is_none(),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(Some(v))
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(Some(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(Some(v))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(v: Option<i32>) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Option<Decimal>> for SqlValue {
    fn from(v: Option<Decimal>) -> Self {
        SqlValue::Decimal(v)
    }
}

/// Ordered list of `(logical field, value)` pairs for a partial update.
/// Order of insertion is the order clauses and placeholders are rendered in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    fields: Vec<(&'static str, SqlValue)>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.fields.push((field, value.into()));
        self
    }

    /// Adds the field only when it was supplied by the caller.
    pub fn set_if<T: Into<SqlValue>>(&mut self, field: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(field, v);
        }
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| *name == field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, SqlValue)> {
        self.fields.iter()
    }
}

impl FromIterator<(&'static str, SqlValue)> for FieldUpdates {
    fn from_iter<I: IntoIterator<Item = (&'static str, SqlValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Logical field name to physical column name. Fields not listed keep their
/// logical name.
pub type ColumnMap = &'static [(&'static str, &'static str)];

pub fn column_for(columns: ColumnMap, field: &'static str) -> &'static str {
    columns
        .iter()
        .find(|(logical, _)| *logical == field)
        .map(|(_, physical)| *physical)
        .unwrap_or(field)
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rendered SQL fragment and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    /// Placeholder index for the first parameter appended after this fragment.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Explicit boolean query parameter: only the literal strings `true` and
/// `false` are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    #[default]
    Unset,
}

impl<'de> Deserialize<'de> for TriState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "true" => Ok(TriState::True),
            "false" => Ok(TriState::False),
            other => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(other),
                &"\"true\" or \"false\"",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i32),
    Flag(TriState),
}

/// Sparse search input keyed by the names used in a resource's filter rules.
pub trait FilterTerms {
    fn term(&self, key: &str) -> Option<FilterValue>;
}

impl FilterTerms for [(&str, FilterValue)] {
    fn term(&self, key: &str) -> Option<FilterValue> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_falls_back_to_logical_name() {
        const COLUMNS: ColumnMap = &[("numEmployees", "num_employees")];
        assert_eq!(column_for(COLUMNS, "numEmployees"), "num_employees");
        assert_eq!(column_for(COLUMNS, "name"), "name");
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn tri_state_accepts_only_literal_booleans() {
        let t: TriState = serde_json::from_str("\"true\"").unwrap();
        let f: TriState = serde_json::from_str("\"false\"").unwrap();
        assert_eq!(t, TriState::True);
        assert_eq!(f, TriState::False);
        assert!(serde_json::from_str::<TriState>("\"yes\"").is_err());
        assert!(serde_json::from_str::<TriState>("\"\"").is_err());
    }

    #[test]
    fn set_if_skips_absent_fields() {
        let mut updates = FieldUpdates::new();
        updates.set_if("name", None::<String>).set_if("salary", Some(10));
        assert_eq!(updates.len(), 1);
        assert!(updates.contains("salary"));
        assert!(!updates.contains("name"));
    }
}
