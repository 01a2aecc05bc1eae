use std::{
    cell::RefCell,
    collections::VecDeque,
    fs::OpenOptions,
    io::Write,
    rc::Rc,
    time::{Duration, Instant},
};

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use forms::FormActions;
use ratatui::{
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::Action,
    cli::Cli,
    components::{Component, ContainerProps, GenericForm},
    config::Config,
    signup::{self, SignUp},
    tui::{Event, EventResponse, Frame, Tui},
};

/// A submission whose completion is simulated by the event loop.
#[derive(Debug)]
pub struct PendingSubmission {
    pub values: SignUp,
    pub actions: FormActions,
    pub due: Instant,
}

pub type PendingQueue = Rc<RefCell<VecDeque<PendingSubmission>>>;

pub struct App {
    pub config: Config,
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub form: GenericForm<SignUp>,
    pub pending: PendingQueue,
    pub status: Option<String>,
    pub should_quit: bool,
    pub should_suspend: bool,
}

impl App {
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        let pending: PendingQueue = Rc::default();
        let form = build_form(&config, pending.clone());

        Ok(Self {
            config,
            tick_rate: cli.tick_rate,
            frame_rate: cli.frame_rate,
            form,
            pending,
            status: None,
            should_quit: false,
            should_suspend: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = Tui::new()?
            .tick_rate(self.tick_rate)
            .frame_rate(self.frame_rate);
        tui.enter()?;
        self.form.init()?;

        loop {
            // 1. input / system events -> actions
            if let Some(event) = tui.next().await {
                let stop_event_propagation = match self.form.handle_events(event.clone())? {
                    Some(EventResponse::Continue(action)) => {
                        action_tx.send(action).ok();
                        false
                    }
                    Some(EventResponse::Stop(action)) => {
                        action_tx.send(action).ok();
                        true
                    }
                    None => false,
                };

                if !stop_event_propagation {
                    let action = match event {
                        Event::Quit => Some(Action::Quit),
                        Event::Tick => Some(Action::Tick),
                        Event::Render => Some(Action::Render),
                        Event::Resize(w, h) => Some(Action::Resize(w, h)),
                        Event::Key(key) => self.global_key(key),
                        _ => None,
                    };
                    if let Some(action) = action {
                        action_tx.send(action).ok();
                    }
                }
            }

            // 2. drain actions
            while let Ok(action) = action_rx.try_recv() {
                match &action {
                    Action::Tick | Action::Render => {}
                    _ => debug!("{action}"),
                }

                match action {
                    Action::Tick => {
                        if self.finish_due(Instant::now())? > 0 {
                            action_tx.send(Action::SubmissionFinished).ok();
                        }
                    }
                    Action::Quit => self.should_quit = true,
                    Action::Suspend => self.should_suspend = true,
                    Action::Resume => self.should_suspend = false,
                    Action::ClearScreen => tui.terminal.clear()?,
                    Action::Resize(w, h) => {
                        tui.resize(ratatui::layout::Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    Action::Submitted(submitted) => self.on_submitted(submitted),
                    Action::Error(ref message) => {
                        warn!("{message}");
                        self.status = Some(message.clone());
                    }
                    _ => {}
                }

                if let Some(next) = self.form.update(action)? {
                    action_tx.send(next).ok();
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume).ok();
                action_tx.send(Action::ClearScreen).ok();
                tui.resume()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    /// Keys the form did not consume.
    fn global_key(&self, key: KeyEvent) -> Option<Action> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(Action::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),
            (KeyCode::Char('z'), KeyModifiers::CONTROL) => Some(Action::Suspend),
            _ => None,
        }
    }

    fn on_submitted(&mut self, submitted: bool) {
        if submitted {
            self.status = Some("Submitting…".to_string());
        } else {
            let invalid = self.form.form().fields().invalid_count();
            self.status = Some(format!("{invalid} field(s) need attention"));
        }
    }

    /// Complete every pending submission due at `now`. Returns how many
    /// finished.
    pub fn finish_due(&mut self, now: Instant) -> Result<usize> {
        let mut finished = 0;
        loop {
            let next = {
                let mut queue = self.pending.borrow_mut();
                match queue.front() {
                    Some(p) if p.due <= now => queue.pop_front(),
                    _ => None,
                }
            };
            let Some(submission) = next else { break };

            self.complete(&submission)?;
            if !submission.actions.set_submitting(false) {
                debug!("form dropped before the submission finished");
            }
            finished += 1;
        }
        Ok(finished)
    }

    fn complete(&mut self, submission: &PendingSubmission) -> Result<()> {
        info!(email = %submission.values.email, "sign-up received");

        if let Some(path) = &self.config.form.output_file {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", serde_json::to_string(&submission.values)?)?;
            debug!(path = %path.display(), "submission written");
        }

        self.status = Some(format!("Signed up {}", submission.values.email));
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                action_tx
                    .send(Action::Error(format!("Failed to draw: {:?}", err)))
                    .ok();
            }
        })?;
        Ok(())
    }

    pub fn render(&mut self, f: &mut Frame<'_>) -> Result<()> {
        let [body, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());

        self.form.draw(f, body)?;

        let status = self.status.clone().unwrap_or_default();
        f.render_widget(Line::from(status).dim(), footer);
        Ok(())
    }
}

/// The sign-up form wired to `pending`: the completion callback queues the
/// values and the flag is reset once the configured latency has passed.
pub fn build_form(config: &Config, pending: PendingQueue) -> GenericForm<SignUp> {
    let latency = Duration::from_millis(config.form.submit_latency_ms);

    let form = GenericForm::new(
        signup::options(),
        &signup::initial_values(),
        move |result| {
            pending.borrow_mut().push_back(PendingSubmission {
                values: result.values,
                actions: result.actions,
                due: Instant::now() + latency,
            });
        },
        signup::render_fields,
    )
    .container(ContainerProps::default().title(config.form.title.clone()));

    signup::input_kinds()
        .into_iter()
        .fold(form, |form, (name, kind)| form.input_kind(name, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormConfig;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn app(output_file: Option<std::path::PathBuf>) -> App {
        let mut config = Config::default();
        config.form = FormConfig {
            title: "Join".into(),
            submit_latency_ms: 0,
            output_file,
        };
        let cli = Cli::try_parse_from(["signup"]).unwrap();
        App::new(&cli, config).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.form
            .handle_key_events(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn fill_valid(app: &mut App) {
        type_text(app, "ada@example.com");
        press(app, KeyCode::Tab);
        type_text(app, "correct horse");
        press(app, KeyCode::Tab);
        type_text(app, "correct horse");
        press(app, KeyCode::Tab);
        type_text(app, "36");
    }

    #[test]
    fn submission_completes_on_tick() {
        let path = std::env::temp_dir().join(format!("form_tui-out-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut app = app(Some(path.clone()));

        fill_valid(&mut app);
        press(&mut app, KeyCode::Enter);
        assert!(app.form.form().is_submitting());
        assert_eq!(app.pending.borrow().len(), 1);

        let finished = app.finish_due(Instant::now() + Duration::from_millis(1)).unwrap();

        assert_eq!(finished, 1);
        assert!(!app.form.form().is_submitting());
        assert!(app.pending.borrow().is_empty());
        assert_eq!(app.status.as_deref(), Some("Signed up ada@example.com"));

        let written = std::fs::read_to_string(&path).unwrap();
        let line: SignUp = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(line.email, "ada@example.com");
        assert_eq!(line.age, 36);
        assert!(!line.newsletter);
    }

    #[test]
    fn invalid_submit_queues_nothing() {
        let mut app = app(None);
        type_text(&mut app, "nope");
        press(&mut app, KeyCode::Enter);

        assert!(!app.form.form().is_submitting());
        assert!(app.pending.borrow().is_empty());
        assert_eq!(app.finish_due(Instant::now()).unwrap(), 0);
    }

    #[test]
    fn pending_submission_waits_for_latency() {
        let mut config = Config::default();
        config.form.submit_latency_ms = 60_000;
        let cli = Cli::try_parse_from(["signup"]).unwrap();
        let mut app = App::new(&cli, config).unwrap();

        fill_valid(&mut app);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.finish_due(Instant::now()).unwrap(), 0);
        assert!(app.form.form().is_submitting());
    }

    #[test]
    fn render_shows_title_and_invalid_count() {
        let mut app = app(None);
        type_text(&mut app, "ada@example.com");

        let response = app
            .form
            .handle_key_events(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        let Some(EventResponse::Stop(Action::Submitted(submitted))) = response else {
            panic!("Enter should be consumed as a submit, got {response:?}");
        };
        assert!(!submitted);
        app.on_submitted(submitted);

        let mut terminal = Terminal::new(TestBackend::new(70, 24)).unwrap();
        terminal.draw(|f| app.render(f).unwrap()).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains(" Join "));
        // password, password2 and age are still empty
        assert!(text.contains("3 field(s) need attention"));
        assert!(text.contains("value shouldn't be null"));
        assert!(!app.form.form().is_submitting());
    }

    #[test]
    fn escape_quits_ctrl_z_suspends() {
        let app = app(None);
        assert_eq!(
            app.global_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::Quit)
        );
        assert_eq!(
            app.global_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(Action::Suspend)
        );
        assert_eq!(
            app.global_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            None
        );
    }
}
