//! Validator runner.

use tracing::{debug, trace, warn};

use crate::errors::{FormError, Result};
use crate::field::{Field, Fields};
use crate::options::FieldOptions;

/// Recompute every field's messages.
///
/// Each field's validators run in declaration order against the field's value
/// and the complete input mapping; all of them run, and every non-empty
/// message is kept in that order. An empty message counts as a pass. The
/// input is left untouched and a new mapping is returned.
///
/// A field without an entry in `options` is a configuration error; no
/// partial mapping is returned in that case.
pub fn validate(fields: &Fields, options: &FieldOptions) -> Result<Fields> {
    let mut next = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(option) = options.get(&field.name) else {
            warn!(field = %field.name, "field has no configuration");
            return Err(FormError::UnknownField(field.name.clone()));
        };

        let errors: Vec<String> = option
            .validators
            .iter()
            .filter_map(|v| v.check(&field.value, fields))
            .filter(|message| !message.is_empty())
            .collect();

        trace!(field = %field.name, errors = errors.len(), "field validated");
        next.push(Field {
            errors,
            ..field.clone()
        });
    }

    let validated: Fields = next.into_iter().collect();
    debug!(
        fields = validated.len(),
        invalid = validated.invalid_count(),
        "validation pass finished"
    );
    Ok(validated)
}

/// True when every field of the mapping is free of messages.
pub fn is_valid(fields: &Fields) -> bool {
    fields.is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FormValues, create_fields};
    use crate::validators::{custom, max_length, min_length, min_value, required};
    use crate::value::FieldValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_all_messages_in_declaration_order() {
        let options = FieldOptions::new().field(
            "name",
            vec![
                min_length(5),
                custom(|_, _| Some("first custom".into())),
                max_length(1),
                custom(|_, _| Some("second custom".into())),
            ],
        );
        let fields = create_fields(&options, &FormValues::new().with("name", "abc"));

        let validated = validate(&fields, &options).unwrap();

        assert_eq!(
            validated.errors_of("name"),
            [
                "value should be greater than or equal to 5 characters.".to_string(),
                "first custom".to_string(),
                "value should be less than or equal to 1 characters.".to_string(),
                "second custom".to_string(),
            ]
        );
    }

    #[test]
    fn leaves_names_values_and_input_untouched() {
        let options = FieldOptions::new()
            .field("age", vec![min_value(18)])
            .field("email", vec![required()]);
        let fields = create_fields(&options, &FormValues::new().with("age", 15));

        let validated = validate(&fields, &options).unwrap();

        assert_eq!(validated.names().collect::<Vec<_>>(), ["age", "email"]);
        assert_eq!(validated.values(), fields.values());
        assert!(fields.is_valid(), "input must not gain messages");
        assert!(!is_valid(&validated));
        assert_eq!(validated.invalid_count(), 2);
    }

    #[test]
    fn is_idempotent() {
        let options = FieldOptions::new()
            .field("age", vec![min_value(18)])
            .field("nick", vec![required(), min_length(2)]);
        let fields = create_fields(&options, &FormValues::new().with("age", 15));

        let once = validate(&fields, &options).unwrap();
        let twice = validate(&once, &options).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn cross_field_rules_see_the_whole_mapping() {
        let options = FieldOptions::new()
            .field(
                "end",
                vec![custom(|value, fields| {
                    let start = fields.value_of("start").and_then(FieldValue::as_number);
                    match (start, value.as_number()) {
                        (Some(s), Some(e)) if e > s => None,
                        _ => Some("end must be after start".into()),
                    }
                })],
            )
            .plain("start");

        let ok = create_fields(&options, &FormValues::new().with("start", 1).with("end", 2));
        let bad = create_fields(&options, &FormValues::new().with("start", 3).with("end", 2));

        assert!(validate(&ok, &options).unwrap().is_valid());
        assert_eq!(
            validate(&bad, &options).unwrap().errors_of("end"),
            ["end must be after start".to_string()]
        );
    }

    #[test]
    fn replaces_stale_messages() {
        let options = FieldOptions::new().field("age", vec![min_value(18)]);
        let fields = create_fields(&options, &FormValues::new().with("age", 15));
        let invalid = validate(&fields, &options).unwrap();

        let fixed = invalid.with_value("age", 30).unwrap();
        assert!(!fixed.is_valid(), "messages stay until the next pass");

        assert!(validate(&fixed, &options).unwrap().is_valid());
    }

    #[test]
    fn unconfigured_field_fails_fast() {
        let options = FieldOptions::new().plain("a");
        let fields: Fields = vec![Field::new("a", 1), Field::new("b", 2)]
            .into_iter()
            .collect();

        let err = validate(&fields, &options).unwrap_err();
        assert!(matches!(err, FormError::UnknownField(name) if name == "b"));
    }

    #[test]
    fn empty_messages_count_as_passing() {
        let options = FieldOptions::new().field(
            "name",
            vec![
                custom(|_, _| Some(String::new())),
                custom(|_, _| Some("too plain".into())),
            ],
        );
        let fields = create_fields(&options, &FormValues::new().with("name", "x"));

        let validated = validate(&fields, &options).unwrap();
        assert_eq!(validated.errors_of("name"), ["too plain".to_string()]);

        let lenient = FieldOptions::new().field("name", vec![custom(|_, _| Some(String::new()))]);
        let validated = validate(&fields, &lenient).unwrap();
        assert!(validated.is_valid());
        assert!(validated.errors_of("name").is_empty());
    }
}
