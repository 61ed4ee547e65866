//! Identity normalization rules.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// How many trailing digits of a phone-like value make up its identity.
pub const PHONE_DIGITS_KEPT: usize = 10;

/// Reduces a raw field value to the identity compared for uniqueness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    /// Trim and lower-case. Emails, names, handles.
    #[default]
    Lowercase,
    /// Trim only.
    Exact,
    /// Keep the ASCII digits, then only the trailing [`PHONE_DIGITS_KEPT`].
    PhoneDigits,
}

impl Normalizer {
    /// Normalize a raw value.
    ///
    /// Returns `None` when nothing is left, which means the value does not
    /// constrain uniqueness at all.
    pub fn apply(&self, raw: &str) -> Option<String> {
        let normalized = match self {
            Normalizer::Lowercase => raw.trim().to_lowercase(),
            Normalizer::Exact => raw.trim().to_string(),
            Normalizer::PhoneDigits => {
                let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
                let start = digits.len().saturating_sub(PHONE_DIGITS_KEPT);
                digits[start..].iter().collect()
            }
        };
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}

/// A uniqueness constraint on one field or on a combination of fields.
///
/// `name` keys the identity set and is reported on collisions. When `fields`
/// is empty the constraint reads the field called `name`; otherwise the listed
/// fields are joined with a single space (e.g. first and last name) and the
/// constraint only applies when all of them are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueFieldSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub normalizer: Normalizer,
}

impl UniqueFieldSpec {
    /// Constraint on a single field.
    pub fn new(name: impl Into<String>, normalizer: Normalizer) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            normalizer,
        }
    }

    /// Constraint on several fields read together.
    pub fn composite<I, S>(name: impl Into<String>, fields: I, normalizer: Normalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            normalizer,
        }
    }

    /// Fields of the record this constraint reads.
    pub fn source_fields(&self) -> Vec<&str> {
        if self.fields.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.fields.iter().map(String::as_str).collect()
        }
    }

    /// The raw, not yet normalized value of this constraint in a record.
    pub fn raw_value(&self, record: &Record) -> Option<String> {
        let parts = self
            .source_fields()
            .into_iter()
            .map(|field| record.text(field))
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join(" "))
    }

    /// The normalized identity of a record under this constraint.
    pub fn identity_of(&self, record: &Record) -> Option<String> {
        self.normalizer.apply(&self.raw_value(record)?)
    }
}
