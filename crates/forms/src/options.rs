//! Per-field configuration.
//!
//! `FieldOptions` is the declarative side of a form: the set of field names
//! and, for every name, the ordered validators that run on submit. It is
//! built once and never changes for the lifetime of a `Form`.

use indexmap::IndexMap;

use crate::validators::Validator;

/// Configuration of a single field.
#[derive(Default)]
pub struct FieldOption {
    pub validators: Vec<Box<dyn Validator>>,
}

impl FieldOption {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self { validators }
    }

    /// Append a validator (runs after the ones already present).
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl std::fmt::Debug for FieldOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOption")
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Ordered field name -> `FieldOption` mapping. Declaration order is the
/// field order of every `Fields` derived from it.
#[derive(Debug, Default)]
pub struct FieldOptions {
    entries: IndexMap<String, FieldOption>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with its validators. Declaring the same name twice
    /// replaces the earlier declaration but keeps its position.
    pub fn field(mut self, name: impl Into<String>, validators: Vec<Box<dyn Validator>>) -> Self {
        self.entries.insert(name.into(), FieldOption::new(validators));
        self
    }

    /// Declare a field without validators.
    pub fn plain(self, name: impl Into<String>) -> Self {
        self.field(name, Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, option: FieldOption) {
        self.entries.insert(name.into(), option);
    }

    pub fn get(&self, name: &str) -> Option<&FieldOption> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldOption)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{min_length, required};

    #[test]
    fn keeps_declaration_order() {
        let options = FieldOptions::new()
            .field("zeta", vec![required()])
            .plain("alpha")
            .field("mid", vec![required(), min_length(2)]);

        let names: Vec<&str> = options.names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(options.get("mid").map(|o| o.validators.len()), Some(2));
        assert_eq!(options.get("alpha").map(|o| o.validators.len()), Some(0));
    }

    #[test]
    fn redeclaring_replaces_in_place() {
        let options = FieldOptions::new()
            .plain("a")
            .plain("b")
            .field("a", vec![required()]);

        let names: Vec<&str> = options.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(options.get("a").map(|o| o.validators.len()), Some(1));
    }

    #[test]
    fn builder_appends_validators() {
        let option = FieldOption::default()
            .validator(required())
            .validator(min_length(3));
        assert_eq!(option.validators.len(), 2);
    }
}
