//! Request orchestration over the form, the progress bridge and the view.
//!
//! [`FormController`] is the synchronous core: every method runs to
//! completion and leaves a consistent [`Snapshot`]. The async driver in
//! [`crate::driver`] owns one of these and feeds it commands, worker
//! notifications and the worker call's resolution one at a time.

use shared::{
    domain::{BulkRequest, FieldName, RequestId},
    error::WorkerFailure,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::{ControllerConfig, DisplayResolution},
    form::{Form, FormError},
    progress::{ProgressBridge, ProgressState},
    view::{Transition, View, ViewState},
    worker::ItemEventSource,
};

pub const FORM_INVALID_MESSAGE: &str = "Form is invalid";

/// Immutable picture of the controller handed to the view layer.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub form: Form,
    pub progress: ProgressState,
    pub view: View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    Dispatch {
        request_id: RequestId,
        request: BulkRequest,
    },
    Rejected,
    AlreadyInFlight,
    /// The completion view is showing; it must be dismissed first.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed,
    Failed(String),
    Rejected,
    AlreadyInFlight,
    Ignored,
}

pub struct FormController {
    form: Form,
    bridge: ProgressBridge,
    view: View,
    in_flight: Option<RequestId>,
}

impl FormController {
    pub fn new<S>(config: &ControllerConfig, display: DisplayResolution, events: &S) -> Self
    where
        S: ItemEventSource + ?Sized,
    {
        Self {
            form: Form::with_defaults(config.limits(), display),
            bridge: ProgressBridge::subscribe(events),
            view: View::default(),
            in_flight: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            form: self.form.clone(),
            progress: self.bridge.progress(),
            view: self.view.clone(),
        }
    }

    pub fn view_state(&self) -> ViewState {
        self.view.state()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub(crate) fn bridge_mut(&mut self) -> &mut ProgressBridge {
        &mut self.bridge
    }

    pub fn set_field_value(&mut self, name: FieldName, value: impl Into<String>) {
        let valid = self.form.set_field_value(name, value);
        debug!(field = %name, valid, "field updated");
    }

    /// Gates a submit on validation and single-flight, moving to `InProgress` on success.
    pub fn begin_submit(&mut self) -> SubmitDecision {
        if let Some(request_id) = self.in_flight {
            warn!(%request_id, "submit ignored; a request is already in flight");
            return SubmitDecision::AlreadyInFlight;
        }
        if self.view.state() != ViewState::Form {
            warn!(state = ?self.view.state(), "submit ignored outside the form view");
            return SubmitDecision::Ignored;
        }

        let request = if self.form.validate_all() {
            self.form.to_request()
        } else {
            Err(FormError::Invalid)
        };
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                info!("submit rejected: {err}");
                self.transition(Transition::Reject {
                    message: FORM_INVALID_MESSAGE.to_string(),
                });
                return SubmitDecision::Rejected;
            }
        };

        let request_id = RequestId::new();
        self.bridge.start_request(request.item_count);
        self.transition(Transition::Dispatch);
        self.in_flight = Some(request_id);
        info!(
            %request_id,
            item_count = request.item_count,
            width = request.width,
            height = request.height,
            destination = %request.destination_path.display(),
            "dispatching bulk request"
        );
        SubmitDecision::Dispatch {
            request_id,
            request,
        }
    }

    /// Applies the worker's resolution. `None` if no request was in flight.
    pub fn finish_submit(&mut self, result: Result<(), WorkerFailure>) -> Option<SubmitOutcome> {
        let Some(request_id) = self.in_flight.take() else {
            error!("worker resolution arrived with no request in flight");
            return None;
        };
        match result {
            Ok(()) => {
                info!(%request_id, progress = %self.bridge.progress().label(), "bulk request completed");
                self.transition(Transition::Succeed);
                Some(SubmitOutcome::Completed)
            }
            Err(failure) => {
                warn!(%request_id, code = ?failure.code, "bulk request failed: {failure}");
                self.bridge.reset();
                self.transition(Transition::Fail {
                    message: failure.message.clone(),
                });
                Some(SubmitOutcome::Failed(failure.message))
            }
        }
    }

    /// Returns to the form after a finished batch, keeping field values.
    pub fn dismiss(&mut self) -> bool {
        if self.view.state() != ViewState::Done {
            debug!(state = ?self.view.state(), "dismiss ignored");
            return false;
        }
        self.bridge.reset();
        self.transition(Transition::Dismiss)
    }

    pub fn teardown(mut self) {
        if let Some(request_id) = self.in_flight {
            warn!(%request_id, "controller torn down with a request in flight; its result will be dropped");
        }
        self.bridge.unsubscribe();
    }

    fn transition(&mut self, transition: Transition) -> bool {
        match self.view.apply(transition) {
            Ok(next) => {
                self.view = next;
                true
            }
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
