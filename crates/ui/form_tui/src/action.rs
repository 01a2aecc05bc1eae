use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),
    FocusNext,
    FocusPrev,
    /// Field values or messages changed; redraw.
    Update,
    /// A submit attempt ran; `true` when the completion callback fired.
    Submitted(bool),
    /// A pending submission finished and the submitting flag was reset.
    SubmissionFinished,
}
