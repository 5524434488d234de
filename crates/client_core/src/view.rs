//! Which of the three presentations is active.

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Form,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Submit refused before reaching the worker.
    Reject { message: String },
    Dispatch,
    Succeed,
    Fail { message: String },
    /// User acknowledged the finished batch ("Get More Images").
    Dismiss,
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::Reject { .. } => "reject",
            Transition::Dispatch => "dispatch",
            Transition::Succeed => "succeed",
            Transition::Fail { .. } => "fail",
            Transition::Dismiss => "dismiss",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal view transition '{transition}' from {from:?}")]
pub struct IllegalTransition {
    pub from: ViewState,
    pub transition: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    state: ViewState,
    status_message: Option<String>,
}

impl View {
    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn apply(&self, transition: Transition) -> Result<View, IllegalTransition> {
        let next = match (self.state, transition) {
            (ViewState::Form, Transition::Reject { message }) => View {
                state: ViewState::Form,
                status_message: Some(message),
            },
            (ViewState::Form, Transition::Dispatch) => View {
                state: ViewState::InProgress,
                status_message: None,
            },
            (ViewState::InProgress, Transition::Succeed) => View {
                state: ViewState::Done,
                status_message: None,
            },
            (ViewState::InProgress, Transition::Fail { message }) => View {
                state: ViewState::Form,
                status_message: Some(message),
            },
            (ViewState::Done, Transition::Dismiss) => View::default(),
            (from, transition) => {
                return Err(IllegalTransition {
                    from,
                    transition: transition.name(),
                })
            }
        };
        Ok(next)
    }
}
