//! Grouping key: the seven fields that partition rows into groups.
//!
//! Values are kept verbatim (including empty strings); a missing or blank
//! value is an ordinary grouping value, not an error.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Semantic key fields in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    Store,
    Division,
    Section,
    Group,
    Department,
    Udf06,
    Floor,
}

impl KeyField {
    pub const ALL: [KeyField; 7] = [
        KeyField::Store,
        KeyField::Division,
        KeyField::Section,
        KeyField::Group,
        KeyField::Department,
        KeyField::Udf06,
        KeyField::Floor,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable field name (mapping files, error messages).
    pub fn as_str(self) -> &'static str {
        match self {
            KeyField::Store => "store",
            KeyField::Division => "division",
            KeyField::Section => "section",
            KeyField::Group => "group",
            KeyField::Department => "department",
            KeyField::Udf06 => "udf06",
            KeyField::Floor => "floor",
        }
    }

    /// Conventional CSV header for this field.
    pub fn default_header(self) -> &'static str {
        match self {
            KeyField::Store => "STORE",
            KeyField::Division => "DIVISION",
            KeyField::Section => "SECTION",
            KeyField::Group => "GROUP",
            KeyField::Department => "DEPARTMENT",
            KeyField::Udf06 => "UDF-06",
            KeyField::Floor => "FLOOR",
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite group key; ordering is lexicographic over the fields in `KeyField::ALL` order.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey([String; 7]);

impl GroupKey {
    pub fn new(values: [String; 7]) -> Self {
        Self(values)
    }

    /// Build from any iterator; missing trailing values become empty strings.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: [String; 7] = Default::default();
        for (slot, v) in values.iter_mut().zip(parts) {
            *slot = v.into();
        }
        Self(values)
    }

    pub fn get(&self, field: KeyField) -> &str {
        &self.0[field.index()]
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                f.write_str(" / ")?;
            }
            first = false;
            f.write_str(v)?;
        }
        Ok(())
    }
}
