//! The submit flow.
//!
//! `Form` owns the two pieces of form-local state, the current `Fields`
//! snapshot and the submitting flag, together with the immutable
//! configuration and the completion callback.
//!
//! ```text
//!  Idle ──submit──▶ Validating ──errors──▶ Idle (fields carry messages)
//!                        │
//!                        └──valid──▶ Submitting ──set_submitting(false)──▶ Idle
//! ```
//!
//! The callback runs synchronously inside `submit`; the submitting flag is
//! reset by whoever holds the `FormActions` once the submission finished.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use serde::{Serialize, de::DeserializeOwned};
use strum::Display;
use tracing::{debug, info};

use crate::errors::Result;
use crate::field::{Fields, FormValues, create_fields};
use crate::options::FieldOptions;
use crate::validate::validate;
use crate::value::FieldValue;

/// Coarse state of a form, for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FormStatus {
    Idle,
    Submitting,
}

/// Result of a single submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form was valid and the completion callback has been invoked.
    Submitted,
    /// At least one field carries messages; the callback was not invoked.
    Invalid { invalid_fields: usize },
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

/// Capabilities handed to the completion callback.
///
/// Holds the submitting flag weakly: once the owning form is gone every call
/// is a no-op.
#[derive(Debug, Clone)]
pub struct FormActions {
    submitting: Weak<Cell<bool>>,
}

impl FormActions {
    /// Set the submitting flag. Returns `false` when the form no longer
    /// exists and nothing was changed.
    pub fn set_submitting(&self, submitting: bool) -> bool {
        match self.submitting.upgrade() {
            Some(flag) => {
                flag.set(submitting);
                true
            }
            None => {
                debug!("set_submitting on a dropped form ignored");
                false
            }
        }
    }

    /// Whether the owning form is still alive.
    pub fn is_mounted(&self) -> bool {
        self.submitting.strong_count() > 0
    }
}

/// Argument of the completion callback.
#[derive(Debug)]
pub struct FormResult<T, E> {
    pub values: T,
    pub event: E,
    pub actions: FormActions,
}

/// Argument of the child render function.
#[derive(Debug, Clone, Copy)]
pub struct FormChildProps<'a> {
    pub fields: &'a Fields,
    pub is_submitting: bool,
}

type OnSubmit<T, E> = Box<dyn FnMut(FormResult<T, E>)>;

/// Form state plus the submit flow.
///
/// `T` is the typed shape of the values (any serde struct or map), `E` the
/// host event that triggered the submit.
pub struct Form<T, E = ()> {
    options: FieldOptions,
    fields: Fields,
    submitting: Rc<Cell<bool>>,
    on_submit: OnSubmit<T, E>,
    _values: PhantomData<fn() -> T>,
}

impl<T, E> Form<T, E>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a form from its configuration, the initial values and the
    /// completion callback. `initial` has to serialize to an object.
    pub fn new(
        options: FieldOptions,
        initial: &T,
        on_submit: impl FnMut(FormResult<T, E>) + 'static,
    ) -> Result<Self> {
        let initial = FormValues::from_serialize(initial)?;
        Ok(Self::with_values(options, &initial, on_submit))
    }

    /// Like `new`, with untyped initial values.
    pub fn with_values(
        options: FieldOptions,
        initial: &FormValues,
        on_submit: impl FnMut(FormResult<T, E>) + 'static,
    ) -> Self {
        let fields = create_fields(&options, initial);
        Self {
            options,
            fields,
            submitting: Rc::new(Cell::new(false)),
            on_submit: Box::new(on_submit),
            _values: PhantomData,
        }
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Current field snapshot.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn status(&self) -> FormStatus {
        if self.is_submitting() {
            FormStatus::Submitting
        } else {
            FormStatus::Idle
        }
    }

    pub fn child_props(&self) -> FormChildProps<'_> {
        FormChildProps {
            fields: &self.fields,
            is_submitting: self.is_submitting(),
        }
    }

    /// Plain values of the current snapshot.
    pub fn values(&self) -> FormValues {
        self.fields.values()
    }

    /// A handle on the submitting flag, equal to the one the callback gets.
    pub fn actions(&self) -> FormActions {
        FormActions {
            submitting: Rc::downgrade(&self.submitting),
        }
    }

    /// Replace the snapshot with one where `name` holds `value`.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.fields = self.fields.with_value(name, value)?;
        Ok(())
    }

    /// Run the submit flow for `event`.
    ///
    /// The snapshot is always replaced by the validated one. Only when no
    /// field carries messages the submitting flag is raised and the callback
    /// invoked with the resolved values.
    pub fn submit(&mut self, event: E) -> Result<SubmitOutcome> {
        let validated = validate(&self.fields, &self.options)?;
        let invalid_fields = validated.invalid_count();
        self.fields = validated;

        if invalid_fields > 0 {
            debug!(invalid_fields, "submit rejected");
            return Ok(SubmitOutcome::Invalid { invalid_fields });
        }

        let values: T = self.fields.values().into_typed()?;
        self.submitting.set(true);
        info!(fields = self.fields.len(), "form submitted");

        let result = FormResult {
            values,
            event,
            actions: self.actions(),
        };
        (self.on_submit)(result);
        Ok(SubmitOutcome::Submitted)
    }
}

impl<T, E> std::fmt::Debug for Form<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("submitting", &self.submitting.get())
            .finish_non_exhaustive()
    }
}
