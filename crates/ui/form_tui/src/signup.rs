//! The sign-up page: field declarations, the child renderer and the
//! non-interactive `check` command.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use forms::{
    FieldOptions, FieldValue, Fields, Form, FormChildProps, FormValues, Validator,
    validators::{
        custom, is_before, is_same, max_length, max_value, min_length, min_value, required,
        simple_mail,
    },
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, rc::Rc};
use tracing::debug;

use crate::{components::InputKind, tui::Frame};

/// Values produced by a successful sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub password2: String,
    pub age: i64,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub newsletter: bool,
}

/// Field names in display order with their labels.
pub const LABELS: &[(&str, &str)] = &[
    ("email", "E-mail"),
    ("password", "Password"),
    ("password2", "Repeat password"),
    ("age", "Age"),
    ("birthday", "Birthday"),
    ("newsletter", "Newsletter"),
];

const LABEL_WIDTH: usize = 17;

pub fn options() -> FieldOptions {
    options_at(Utc::now())
}

/// Field declarations; `now` bounds the birthday.
pub fn options_at(now: DateTime<Utc>) -> FieldOptions {
    let before_now = is_before(now);
    FieldOptions::new()
        .field("email", vec![required(), simple_mail()])
        .field(
            "password",
            vec![
                required(),
                min_length(8),
                max_length(64),
                is_same("password2"),
            ],
        )
        .field("password2", vec![required()])
        .field("age", vec![required(), min_value(18), max_value(130)])
        .field(
            "birthday",
            // optional: only checked once something was entered
            vec![custom(move |value: &FieldValue, fields: &Fields| {
                if value.is_null() {
                    None
                } else {
                    before_now.check(value, fields)
                }
            })],
        )
        .plain("newsletter")
}

pub fn initial_values() -> FormValues {
    FormValues::new().with("newsletter", false)
}

pub fn input_kinds() -> Vec<(&'static str, InputKind)> {
    vec![("age", InputKind::Number), ("newsletter", InputKind::Toggle)]
}

fn label_of(name: &str) -> &str {
    LABELS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, label)| *label)
        .unwrap_or(name)
}

fn display_value(name: &str, value: &FieldValue) -> String {
    match (name, value) {
        (_, FieldValue::Null) => String::new(),
        (_, FieldValue::Bool(true)) => "[x]".to_string(),
        (_, FieldValue::Bool(false)) => "[ ]".to_string(),
        ("password" | "password2", value) => "*".repeat(value.len()),
        (_, value) => value.to_string(),
    }
}

/// Child renderer of the sign-up form: one line per field, its messages
/// below it, and a status line at the end.
pub fn render_fields(f: &mut Frame<'_>, area: Rect, props: FormChildProps<'_>, focused: Option<&str>) {
    let mut lines: Vec<Line> = Vec::with_capacity(props.fields.len() * 2 + 2);

    for field in props.fields.iter() {
        let is_focused = focused == Some(field.name.as_str());
        let marker = if is_focused { "> " } else { "  " };
        let label_style = if is_focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut value = display_value(&field.name, &field.value);
        if is_focused && !matches!(field.value, FieldValue::Bool(_)) {
            value.push('_');
        }

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(
                format!("{:<width$}", label_of(&field.name), width = LABEL_WIDTH),
                label_style,
            ),
            Span::raw(value),
        ]));
        for message in &field.errors {
            lines.push(Line::from(format!("    {message}")).fg(Color::Red));
        }
    }

    lines.push(Line::default());
    if props.is_submitting {
        lines.push(Line::from("Submitting…").fg(Color::Cyan).italic());
    } else {
        lines.push(Line::from("Enter submit · Tab next · Shift-Tab previous · Esc quit").dim());
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// Outcome of `check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckReport {
    Submitted { values: SignUp },
    Invalid { fields: Vec<FieldReport> },
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckReport::Submitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub errors: Vec<String>,
}

/// Fill the sign-up form from a JSON object and submit it once, without a
/// terminal.
pub fn check(json: &str) -> Result<CheckReport> {
    check_with(json, options())
}

pub fn check_with(json: &str, options: FieldOptions) -> Result<CheckReport> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let values = FormValues::from_serialize(&raw)?;

    let submitted: Rc<RefCell<Option<SignUp>>> = Rc::default();
    let sink = submitted.clone();
    let mut form: Form<SignUp> = Form::with_values(options, &values, move |result| {
        sink.borrow_mut().replace(result.values);
        result.actions.set_submitting(false);
    });

    let outcome = form.submit(())?;
    if let Some(values) = submitted.borrow_mut().take() {
        return Ok(CheckReport::Submitted { values });
    }
    debug!(?outcome, "check rejected");

    Ok(CheckReport::Invalid {
        fields: form
            .fields()
            .iter()
            .filter(|field| !field.is_valid())
            .map(|field| FieldReport {
                name: field.name.clone(),
                errors: field.errors.clone(),
            })
            .collect(),
    })
}
