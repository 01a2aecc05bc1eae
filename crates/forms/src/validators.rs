//! Field validators.
//!
//! A validator checks one rule against a field's value and, for cross-field
//! rules, against its siblings. It returns `None` when the rule holds and a
//! human readable message otherwise.
//!
//! The constructors below return boxed validators so they can be listed
//! directly in `FieldOptions::field`:
//!
//! ```ignore
//! FieldOptions::new()
//!     .field("password", vec![required(), min_length(12), is_same("password2")])
//!     .field("password2", vec![required()]);
//! ```

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::field::Fields;
use crate::value::FieldValue;

/// A single field-level rule.
pub trait Validator {
    fn check(&self, value: &FieldValue, fields: &Fields) -> Option<String>;
}

impl<F> Validator for F
where
    F: Fn(&FieldValue, &Fields) -> Option<String>,
{
    fn check(&self, value: &FieldValue, fields: &Fields) -> Option<String> {
        self(value, fields)
    }
}

/// Box an ad-hoc closure as a validator.
pub fn custom(
    f: impl Fn(&FieldValue, &Fields) -> Option<String> + 'static,
) -> Box<dyn Validator> {
    Box::new(f)
}

// --- global -------------------------------------------------------------------------------------

/// The field must hold a value.
#[derive(Debug, Clone, Copy)]
pub struct Required;

impl Validator for Required {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        if value.is_null() {
            Some("value shouldn't be null".to_string())
        } else {
            None
        }
    }
}

pub fn required() -> Box<dyn Validator> {
    Box::new(Required)
}

/// The field must equal another field. A missing sibling never matches.
#[derive(Debug, Clone)]
pub struct IsSame {
    pub other: String,
}

impl Validator for IsSame {
    fn check(&self, value: &FieldValue, fields: &Fields) -> Option<String> {
        match fields.value_of(&self.other) {
            Some(other) if other == value => None,
            _ => Some(format!(
                "the value should be the same as the value of {}",
                self.other
            )),
        }
    }
}

pub fn is_same(other: impl Into<String>) -> Box<dyn Validator> {
    Box::new(IsSame {
        other: other.into(),
    })
}

// --- string -------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Validator for MinLength {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        if value.len() >= self.0 {
            None
        } else {
            Some(format!(
                "value should be greater than or equal to {} characters.",
                self.0
            ))
        }
    }
}

pub fn min_length(min: usize) -> Box<dyn Validator> {
    Box::new(MinLength(min))
}

#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Validator for MaxLength {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        if value.len() <= self.0 {
            None
        } else {
            Some(format!(
                "value should be less than or equal to {} characters.",
                self.0
            ))
        }
    }
}

pub fn max_length(max: usize) -> Box<dyn Validator> {
    Box::new(MaxLength(max))
}

lazy_static! {
    static ref SIMPLE_MAIL: Regex = Regex::new(r"\S+@\S+\.\S+").expect("static regex");
}

/// Loose `something@something.tld` shape check.
#[derive(Debug, Clone, Copy)]
pub struct SimpleMail;

impl Validator for SimpleMail {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_text() {
            Some(text) if SIMPLE_MAIL.is_match(text) => None,
            _ => Some("please enter a valid email address".to_string()),
        }
    }
}

pub fn simple_mail() -> Box<dyn Validator> {
    Box::new(SimpleMail)
}

// --- number -------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct MinValue(pub f64);

impl Validator for MinValue {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_number() {
            Some(n) if n >= self.0 => None,
            _ => Some(format!("value should be greater than or equal to {}.", self.0)),
        }
    }
}

pub fn min_value(min: impl Into<f64>) -> Box<dyn Validator> {
    Box::new(MinValue(min.into()))
}

#[derive(Debug, Clone, Copy)]
pub struct MaxValue(pub f64);

impl Validator for MaxValue {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_number() {
            Some(n) if n <= self.0 => None,
            _ => Some(format!("value should be less than or equal to {}.", self.0)),
        }
    }
}

pub fn max_value(max: impl Into<f64>) -> Box<dyn Validator> {
    Box::new(MaxValue(max.into()))
}

#[derive(Debug, Clone, Copy)]
pub struct IsEven;

impl Validator for IsEven {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_number() {
            Some(n) if n % 2.0 == 0.0 => None,
            _ => Some("value should be even.".to_string()),
        }
    }
}

pub fn is_even() -> Box<dyn Validator> {
    Box::new(IsEven)
}

/// Any number that is not a multiple of two, fractions included.
/// Non-numbers fail.
#[derive(Debug, Clone, Copy)]
pub struct IsOdd;

impl Validator for IsOdd {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_number() {
            Some(n) if n % 2.0 != 0.0 => None,
            _ => Some("value should be odd.".to_string()),
        }
    }
}

pub fn is_odd() -> Box<dyn Validator> {
    Box::new(IsOdd)
}

// --- date ---------------------------------------------------------------------------------------

/// The field must hold a date (RFC 3339 timestamp or `YYYY-MM-DD`) strictly
/// before the given instant.
#[derive(Debug, Clone, Copy)]
pub struct IsBefore(pub DateTime<Utc>);

impl Validator for IsBefore {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_text().and_then(parse_date) {
            Some(date) if date < self.0 => None,
            _ => Some(format!(
                "the date should be before {}",
                self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
            )),
        }
    }
}

pub fn is_before(date: DateTime<Utc>) -> Box<dyn Validator> {
    Box::new(IsBefore(date))
}

/// Parse the date formats accepted by `IsBefore`. Plain dates are taken as
/// midnight UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// --- file ---------------------------------------------------------------------------------------

/// Upper bound for the size of a file field, in bytes. Non-file values fail.
#[derive(Debug, Clone, Copy)]
pub struct MaxFileSize(pub u64);

impl Validator for MaxFileSize {
    fn check(&self, value: &FieldValue, _fields: &Fields) -> Option<String> {
        match value.as_file() {
            Some(file) if file.size <= self.0 => None,
            _ => Some(format!(
                "the file size exceeded the maximum size of {} bytes",
                self.0
            )),
        }
    }
}

pub fn max_file_size(max: u64) -> Box<dyn Validator> {
    Box::new(MaxFileSize(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::value::FileInfo;
    use chrono::TimeZone;

    fn no_fields() -> Fields {
        Fields::default()
    }

    fn check(v: &dyn Validator, value: impl Into<FieldValue>) -> Option<String> {
        v.check(&value.into(), &no_fields())
    }

    #[test]
    fn required_rejects_null_only() {
        let v = required();
        assert_eq!(
            check(v.as_ref(), FieldValue::Null).as_deref(),
            Some("value shouldn't be null")
        );
        assert_eq!(check(v.as_ref(), ""), None);
        assert_eq!(check(v.as_ref(), 0), None);
    }

    #[test]
    fn is_same_compares_with_sibling() {
        let fields: Fields = vec![Field::new("password2", "abc")].into_iter().collect();
        let v = is_same("password2");

        assert_eq!(v.check(&"abc".into(), &fields), None);
        assert_eq!(
            v.check(&"abd".into(), &fields).as_deref(),
            Some("the value should be the same as the value of password2")
        );
    }

    #[test]
    fn is_same_fails_for_missing_sibling() {
        let v = is_same("ghost");
        assert!(v.check(&FieldValue::Null, &no_fields()).is_some());
    }

    #[test]
    fn length_bounds() {
        let min = min_length(3);
        let max = max_length(3);

        assert_eq!(check(min.as_ref(), "abc"), None);
        assert_eq!(
            check(min.as_ref(), "ab").as_deref(),
            Some("value should be greater than or equal to 3 characters.")
        );
        assert_eq!(check(max.as_ref(), "abc"), None);
        assert_eq!(
            check(max.as_ref(), "abcd").as_deref(),
            Some("value should be less than or equal to 3 characters.")
        );
        // absent values have length zero
        assert!(check(min.as_ref(), FieldValue::Null).is_some());
        assert_eq!(check(max.as_ref(), FieldValue::Null), None);
    }

    #[test]
    fn simple_mail_shape() {
        let v = simple_mail();
        for ok in ["a@b.c", "ada@example.com", "x y@b.cd"] {
            assert_eq!(check(v.as_ref(), ok), None, "expected OK for {ok}");
        }
        for bad in ["", "plain", "a@b", "@.", "a@.c"] {
            assert_eq!(
                check(v.as_ref(), bad).as_deref(),
                Some("please enter a valid email address"),
                "expected Err for {bad:?}"
            );
        }
        assert!(check(v.as_ref(), 12).is_some());
    }

    #[test]
    fn value_bounds_format_integral_numbers_plainly() {
        let min = min_value(18);
        let max = max_value(99.5);

        assert_eq!(
            check(min.as_ref(), 15).as_deref(),
            Some("value should be greater than or equal to 18.")
        );
        assert_eq!(check(min.as_ref(), 18), None);
        assert_eq!(check(min.as_ref(), "21"), None);
        assert!(check(min.as_ref(), "abc").is_some());

        assert_eq!(check(max.as_ref(), 99.5), None);
        assert_eq!(
            check(max.as_ref(), 100).as_deref(),
            Some("value should be less than or equal to 99.5.")
        );
    }

    #[test]
    fn parity() {
        let even = is_even();
        let odd = is_odd();

        assert_eq!(check(even.as_ref(), 4), None);
        assert_eq!(check(even.as_ref(), -2), None);
        assert_eq!(check(even.as_ref(), 3).as_deref(), Some("value should be even."));
        assert_eq!(check(odd.as_ref(), 3), None);
        assert_eq!(check(odd.as_ref(), -3), None);
        assert_eq!(check(odd.as_ref(), 4).as_deref(), Some("value should be odd."));
        assert_eq!(check(odd.as_ref(), 1.5), None);
        assert!(check(even.as_ref(), 1.5).is_some());
        assert!(check(odd.as_ref(), "x").is_some());
        assert!(check(even.as_ref(), "x").is_some());
    }

    #[test]
    fn date_before() {
        let cutoff = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let v = is_before(cutoff);

        assert_eq!(check(v.as_ref(), "1999-12-31"), None);
        assert_eq!(check(v.as_ref(), "1999-12-31T23:59:59Z"), None);
        assert_eq!(
            check(v.as_ref(), "2000-01-01").as_deref(),
            Some("the date should be before 2000-01-01T00:00:00Z")
        );
        assert!(check(v.as_ref(), "not a date").is_some());
        assert!(check(v.as_ref(), FieldValue::Null).is_some());
    }

    #[test]
    fn file_size_bound() {
        let v = max_file_size(1024);
        assert_eq!(check(v.as_ref(), FileInfo::new("a.png", 1024)), None);
        assert_eq!(
            check(v.as_ref(), FileInfo::new("b.png", 1025)).as_deref(),
            Some("the file size exceeded the maximum size of 1024 bytes")
        );
        assert!(check(v.as_ref(), "a.png").is_some());
    }

    #[test]
    fn closures_are_validators() {
        let v = custom(|value, _| {
            (value.as_text() == Some("admin")).then(|| "name is reserved".to_string())
        });
        assert_eq!(check(v.as_ref(), "ada"), None);
        assert_eq!(check(v.as_ref(), "admin").as_deref(), Some("name is reserved"));
    }
}
