//! Form state for component-style UIs.
//!
//! The crate is split into the declarative part (`options`, `validators`),
//! the data part (`value`, `field`) and the behavior (`validate`, `form`):
//!
//! - `create_fields` derives the initial `Fields` from `FieldOptions` and the
//!   initial values.
//! - `validate` recomputes every field's error list from its validators and
//!   returns a new mapping.
//! - `Form` owns the current mapping plus the submitting flag and runs the
//!   submit flow, invoking the completion callback only for a valid form.
//!
//! ```ignore
//! use forms::{Form, FieldOptions, validators::*};
//!
//! let options = FieldOptions::new()
//!     .field("age", vec![min_value(18)]);
//! let mut form = Form::new(options, &Profile { age: 21 }, |result| {
//!     println!("submitted {:?}", result.values);
//!     result.actions.set_submitting(false);
//! })?;
//! form.submit(())?;
//! ```

pub mod errors;
pub mod field;
pub mod form;
pub mod options;
pub mod validate;
pub mod validators;
pub mod value;

pub use errors::{FormError, Result};
pub use field::{Field, Fields, FormValues, create_fields};
pub use form::{
    Form, FormActions, FormChildProps, FormResult, FormStatus, SubmitOutcome,
};
pub use options::{FieldOption, FieldOptions};
pub use validate::{is_valid, validate};
pub use validators::Validator;
pub use value::{FieldValue, FileInfo};
