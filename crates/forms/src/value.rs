//! Dynamic field values.
//!
//! `FieldValue` mirrors the JSON data model (plus a dedicated file variant) so
//! that any `Serialize` struct can be used as the initial values of a form and
//! the resolved values can be turned back into that struct.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata of a selected file. Only the size takes part in validation.
///
/// Objects with keys beyond `name` and `size` are not files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// The current value of a single field.
///
/// `Null` stands for an absent entry: a key that is configured but has no
/// initial value, or a value explicitly cleared by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    File(FileInfo),
    List(Vec<FieldValue>),
    Object(IndexMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileInfo> {
        match self {
            FieldValue::File(f) => Some(f),
            _ => None,
        }
    }

    /// Length used by the length validators: characters for text, items for
    /// lists, zero for everything else.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::List(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of the value.
    ///
    /// Booleans count as 1/0, `Null` and blank text as 0. Text that does not
    /// parse, files, lists and objects have no numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Null => Some(0.0),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(n) if n.is_nan() => None,
            FieldValue::Float(n) => Some(*n),
            FieldValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    Some(0.0)
                } else {
                    t.parse::<f64>().ok().filter(|n| !n.is_nan())
                }
            }
            FieldValue::File(_) | FieldValue::List(_) | FieldValue::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::File(file) => write!(f, "{} ({} bytes)", file.name, file.size),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            FieldValue::Object(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<FileInfo> for FieldValue {
    fn from(value: FileInfo) -> Self {
        FieldValue::File(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_maps_onto_variants() {
        let raw = serde_json::json!({
            "age": 21,
            "ratio": 0.5,
            "name": "Ada",
            "active": true,
            "missing": null,
            "avatar": { "name": "me.png", "size": 2048 },
            "tags": ["a", "b"],
        });
        let map: IndexMap<String, FieldValue> = serde_json::from_value(raw).unwrap();

        assert_eq!(map["age"], FieldValue::Int(21));
        assert_eq!(map["ratio"], FieldValue::Float(0.5));
        assert_eq!(map["name"], FieldValue::from("Ada"));
        assert_eq!(map["active"], FieldValue::Bool(true));
        assert_eq!(map["missing"], FieldValue::Null);
        assert_eq!(map["avatar"], FieldValue::File(FileInfo::new("me.png", 2048)));
        assert_eq!(map["tags"], FieldValue::from(vec!["a", "b"]));
    }

    #[test]
    fn nested_objects_that_are_not_files_stay_objects() {
        let raw = serde_json::json!({ "street": "Main", "no": 3 });
        let value: FieldValue = serde_json::from_value(raw).unwrap();
        assert!(matches!(value, FieldValue::Object(_)));
    }

    #[test]
    fn objects_with_extra_keys_are_not_files() {
        let raw = serde_json::json!({ "name": "cv.pdf", "size": 10, "owner": "ada" });
        let value: FieldValue = serde_json::from_value(raw.clone()).unwrap();

        let FieldValue::Object(map) = &value else {
            panic!("expected an object, got {value:?}");
        };
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("owner"), Some(&FieldValue::from("ada")));
        assert_eq!(serde_json::to_value(&value).unwrap(), raw);

        let file: FieldValue =
            serde_json::from_value(serde_json::json!({ "name": "cv.pdf", "size": 10 })).unwrap();
        assert_eq!(file, FieldValue::File(FileInfo::new("cv.pdf", 10)));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(FieldValue::Null.as_number(), Some(0.0));
        assert_eq!(FieldValue::Bool(true).as_number(), Some(1.0));
        assert_eq!(FieldValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(FieldValue::from("").as_number(), Some(0.0));
        assert_eq!(FieldValue::from("abc").as_number(), None);
        assert_eq!(FieldValue::from(vec![1, 2]).as_number(), None);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        assert_eq!(FieldValue::from("äöü").len(), 3);
        assert_eq!(FieldValue::from(vec!["x", "y"]).len(), 2);
        assert_eq!(FieldValue::Int(12345).len(), 0);
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
        assert_eq!(FieldValue::from(vec![1, 2]).to_string(), "1, 2");
    }
}
