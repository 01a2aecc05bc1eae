//! Generic form container.
//!
//! `GenericForm` is the terminal counterpart of a `<form>` element: it owns a
//! `forms::Form`, draws a plain container (a bordered block) and hands the
//! inner area to a caller-supplied child render function together with the
//! current field mapping and the submitting flag. It never draws field
//! content itself.
//!
//! Keys:
//! - Tab / Down, BackTab / Up: move focus between fields
//! - printable keys, Backspace, Delete, Left/Right: edit the focused text field
//! - Space / Left / Right on a toggle field: flip it
//! - Enter: submit (the key is consumed and never reaches the page)
//!
//! ```ignore
//! let form = GenericForm::new(options, &initial, on_submit, |f, area, props, focused| {
//!     // draw `props.fields` into `area`
//! })
//! .container(ContainerProps::default().title("Sign up"))
//! .input_kind("age", InputKind::Number);
//! ```

use std::collections::HashMap;

use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use forms::{
    FieldOptions, FieldValue, Form, FormChildProps, FormResult, FormValues, SubmitOutcome,
};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Block, Borders},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

/// Child render function: frame, inner area of the container, form state and
/// the name of the focused field.
pub type Children = Box<dyn Fn(&mut Frame<'_>, Rect, FormChildProps<'_>, Option<&str>)>;

/// How keystrokes on a field turn into a `FieldValue`.
///
/// - `Text`: the typed string, `Null` when empty
/// - `Number`: integer or float when the input parses, otherwise the raw text
///   (so numeric validators can report it)
/// - `Toggle`: boolean flipped with Space / Left / Right
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Toggle,
}

impl InputKind {
    pub fn parse(self, raw: &str) -> FieldValue {
        match self {
            InputKind::Text if raw.is_empty() => FieldValue::Null,
            InputKind::Text => FieldValue::Text(raw.to_string()),
            InputKind::Number => {
                let t = raw.trim();
                if t.is_empty() {
                    FieldValue::Null
                } else if let Ok(n) = t.parse::<i64>() {
                    FieldValue::Int(n)
                } else if let Ok(n) = t.parse::<f64>() {
                    FieldValue::Float(n)
                } else {
                    FieldValue::Text(raw.to_string())
                }
            }
            InputKind::Toggle => FieldValue::Bool(raw == "true"),
        }
    }
}

/// Presentation attributes of the container block.
#[derive(Debug, Clone)]
pub struct ContainerProps {
    pub title: Option<String>,
    pub borders: Borders,
    pub style: Style,
    pub border_style: Style,
}

impl Default for ContainerProps {
    fn default() -> Self {
        Self {
            title: None,
            borders: Borders::ALL,
            style: Style::default(),
            border_style: Style::default().fg(Color::White),
        }
    }
}

impl ContainerProps {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }
}

pub struct GenericForm<T> {
    form: Form<T, KeyEvent>,
    container: ContainerProps,
    children: Children,
    kinds: HashMap<String, InputKind>,
    focused: usize,
    input: Input,
}

impl<T> GenericForm<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(
        options: FieldOptions,
        initial: &FormValues,
        on_submit: impl FnMut(FormResult<T, KeyEvent>) + 'static,
        children: impl Fn(&mut Frame<'_>, Rect, FormChildProps<'_>, Option<&str>) + 'static,
    ) -> Self {
        let form = Form::with_values(options, initial, on_submit);
        Self::from_form(form, Box::new(children))
    }

    /// Create the container from typed initial values.
    pub fn from_typed(
        options: FieldOptions,
        initial: &T,
        on_submit: impl FnMut(FormResult<T, KeyEvent>) + 'static,
        children: impl Fn(&mut Frame<'_>, Rect, FormChildProps<'_>, Option<&str>) + 'static,
    ) -> Result<Self> {
        let form = Form::new(options, initial, on_submit)?;
        Ok(Self::from_form(form, Box::new(children)))
    }

    fn from_form(form: Form<T, KeyEvent>, children: Children) -> Self {
        let mut this = Self {
            form,
            container: ContainerProps::default(),
            children,
            kinds: HashMap::new(),
            focused: 0,
            input: Input::default(),
        };
        this.reset_input();
        this
    }

    pub fn container(mut self, container: ContainerProps) -> Self {
        self.container = container;
        self
    }

    pub fn input_kind(mut self, name: impl Into<String>, kind: InputKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self.reset_input();
        self
    }

    pub fn form(&self) -> &Form<T, KeyEvent> {
        &self.form
    }

    pub fn focused_field(&self) -> Option<&str> {
        self.form.fields().names().nth(self.focused)
    }

    /// Current edit buffer of the focused field.
    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    fn kind_of(&self, name: &str) -> InputKind {
        self.kinds.get(name).copied().unwrap_or_default()
    }

    fn focused_kind(&self) -> Option<InputKind> {
        self.focused_field().map(|name| self.kind_of(name))
    }

    fn field_count(&self) -> usize {
        self.form.fields().len()
    }

    fn focus_next(&mut self) {
        if self.field_count() == 0 {
            return;
        }
        self.focused = (self.focused + 1) % self.field_count();
        self.reset_input();
    }

    fn focus_prev(&mut self) {
        if self.field_count() == 0 {
            return;
        }
        if self.focused == 0 {
            self.focused = self.field_count() - 1;
        } else {
            self.focused -= 1;
        }
        self.reset_input();
    }

    /// Load the focused field's value into the edit buffer.
    fn reset_input(&mut self) {
        let current = self
            .focused_field()
            .and_then(|name| self.form.fields().value_of(name))
            .map(ToString::to_string)
            .unwrap_or_default();
        self.input = Input::new(current);
    }

    fn commit_input(&mut self) -> Result<()> {
        let Some(name) = self.focused_field().map(str::to_string) else {
            return Ok(());
        };
        let value = self.kind_of(&name).parse(self.input.value());
        self.form.set_value(&name, value)?;
        Ok(())
    }

    fn toggle_focused(&mut self) -> Result<()> {
        let Some(name) = self.focused_field().map(str::to_string) else {
            return Ok(());
        };
        let current = matches!(self.form.fields().value_of(&name), Some(FieldValue::Bool(true)));
        self.form.set_value(&name, !current)?;
        self.reset_input();
        Ok(())
    }

    /// Run the submit flow for `key`. A form that is already submitting
    /// ignores further submits.
    pub fn submit(&mut self, key: KeyEvent) -> Result<Option<SubmitOutcome>> {
        if self.form.is_submitting() {
            debug!("submit ignored while a submission is pending");
            return Ok(None);
        }
        let outcome = self.form.submit(key)?;
        debug!(?outcome, "submit handled");
        Ok(Some(outcome))
    }
}

impl<T> Component for GenericForm<T>
where
    T: Serialize + DeserializeOwned,
{
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                return Ok(Some(EventResponse::Stop(Action::Update)));
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                return Ok(Some(EventResponse::Stop(Action::Update)));
            }
            KeyCode::Enter => {
                let action = match self.submit(key)? {
                    Some(outcome) => Action::Submitted(outcome.is_submitted()),
                    None => Action::Update,
                };
                return Ok(Some(EventResponse::Stop(action)));
            }
            KeyCode::Esc => return Ok(None),
            _ => {}
        }

        match self.focused_kind() {
            Some(InputKind::Toggle) => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    self.toggle_focused()?;
                    return Ok(Some(EventResponse::Stop(Action::Update)));
                }
                Ok(None)
            }
            Some(_) => {
                if self.input.handle_event(&CrosstermEvent::Key(key)).is_some() {
                    self.commit_input()?;
                    return Ok(Some(EventResponse::Stop(Action::Update)));
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FocusNext => self.focus_next(),
            Action::FocusPrev => self.focus_prev(),
            Action::SubmissionFinished => self.reset_input(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let mut block = Block::default()
            .borders(self.container.borders)
            .border_set(symbols::border::ROUNDED)
            .border_style(self.container.border_style)
            .style(self.container.style);
        if let Some(title) = &self.container.title {
            block = block.title(format!(" {title} "));
        }

        let inner = block.inner(area);
        f.render_widget(block, area);

        let focused = self.focused_field();
        (self.children)(f, inner, self.form.child_props(), focused);
        Ok(())
    }
}
