//! Fields and the field store.
//!
//! A `Fields` snapshot is never edited in place by the form machinery: every
//! validation pass and every value edit produces a new snapshot that replaces
//! the previous one as a whole.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::trace;

use crate::errors::{FormError, Result};
use crate::options::FieldOptions;
use crate::value::FieldValue;

/// A single named input: its current value and the messages of the last
/// validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    pub errors: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The field mapping backing one form, keyed by field name in declaration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(IndexMap<String, Field>);

impl Fields {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    /// Value of a sibling field; `None` when no such field exists.
    pub fn value_of(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name).map(|f| &f.value)
    }

    pub fn errors_of(&self, name: &str) -> &[String] {
        self.0.get(name).map(|f| f.errors.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no field carries a message.
    pub fn is_valid(&self) -> bool {
        self.0.values().all(Field::is_valid)
    }

    /// Number of fields that carry at least one message.
    pub fn invalid_count(&self) -> usize {
        self.0.values().filter(|f| !f.is_valid()).count()
    }

    /// New snapshot in which only `name`'s value differs. The field keeps
    /// its messages until the next validation pass.
    pub fn with_value(&self, name: &str, value: impl Into<FieldValue>) -> Result<Fields> {
        if !self.0.contains_key(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        let value = value.into();
        let next = self
            .0
            .iter()
            .map(|(key, field)| {
                let field = if key == name {
                    Field {
                        value: value.clone(),
                        ..field.clone()
                    }
                } else {
                    field.clone()
                };
                (key.clone(), field)
            })
            .collect();
        Ok(Fields(next))
    }

    /// Plain values of all fields.
    pub fn values(&self) -> FormValues {
        FormValues(
            self.0
                .iter()
                .map(|(k, f)| (k.clone(), f.value.clone()))
                .collect(),
        )
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|f| (f.name.clone(), f)).collect())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = indexmap::map::Values<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// Ordered name -> plain value mapping: the initial values of a form and the
/// resolved values handed to the completion callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(IndexMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` into a name -> value mapping. `value` has to
    /// serialize to an object (a struct or a map).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => {
                Ok(serde_json::from_value(serde_json::Value::Object(map))?)
            }
            other => Err(FormError::InitialValues(json_kind(&other).to_string())),
        }
    }

    /// Convert into a typed value, e.g. the struct the form was created from.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let json = serde_json::to_value(&self.0)?;
        Ok(serde_json::from_value(json)?)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Build the initial field mapping: one field per configured name, holding
/// the matching initial value (or `Null`) and no messages.
///
/// Initial values without a configured field are ignored.
pub fn create_fields(options: &FieldOptions, initial: &FormValues) -> Fields {
    options
        .names()
        .map(|name| {
            let value = initial.get(name).cloned().unwrap_or_default();
            trace!(field = name, value = %value, "field created");
            Field::new(name, value)
        })
        .collect()
}
