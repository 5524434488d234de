//! Runs a [`FormController`] on a single task and exposes it through a cloneable handle.

use std::sync::Arc;

use futures::future::OptionFuture;
use shared::{
    domain::{FieldName, RequestId},
    error::WorkerFailure,
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::{ControllerConfig, DisplayResolution},
    controller::{FormController, Snapshot, SubmitDecision, SubmitOutcome},
    worker::BackgroundWorker,
};

const COMMAND_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("form controller has shut down")]
    Closed,
}

enum ControllerCommand {
    SetField { name: FieldName, value: String },
    Submit { reply: oneshot::Sender<SubmitOutcome> },
    Dismiss,
    Shutdown { ack: oneshot::Sender<()> },
}

struct InFlight {
    request_id: RequestId,
    task: JoinHandle<Result<(), WorkerFailure>>,
    reply: oneshot::Sender<SubmitOutcome>,
}

#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ControllerHandle {
    pub async fn set_field(
        &self,
        name: FieldName,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        self.send(ControllerCommand::SetField {
            name,
            value: value.into(),
        })
        .await
    }

    /// Resolves when the request does: right away when rejected, otherwise
    /// once the worker call settles. Other commands keep flowing meanwhile.
    pub async fn submit(&self) -> Result<SubmitOutcome, ControllerError> {
        let (reply, outcome) = oneshot::channel();
        self.send(ControllerCommand::Submit { reply }).await?;
        outcome.await.map_err(|_| ControllerError::Closed)
    }

    pub async fn dismiss(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Dismiss).await
    }

    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        let (ack, done) = oneshot::channel();
        self.send(ControllerCommand::Shutdown { ack }).await?;
        done.await.map_err(|_| ControllerError::Closed)
    }

    pub fn current(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    async fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControllerError::Closed)
    }
}

/// Builds the controller, subscribes it to `worker`'s events and spawns its task.
///
/// The task ends on [`ControllerHandle::shutdown`] or when every handle is
/// dropped; either way the event subscription is released.
pub fn spawn_controller(
    config: &ControllerConfig,
    display: DisplayResolution,
    worker: Arc<dyn BackgroundWorker>,
) -> (ControllerHandle, JoinHandle<()>) {
    let controller = FormController::new(config, display, worker.as_ref());
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);

    let task = tokio::spawn(run_controller(controller, worker, command_rx, snapshot_tx));
    (
        ControllerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        task,
    )
}

async fn run_controller(
    mut controller: FormController,
    worker: Arc<dyn BackgroundWorker>,
    mut commands: mpsc::Receiver<ControllerCommand>,
    snapshots: watch::Sender<Snapshot>,
) {
    let mut in_flight: Option<InFlight> = None;
    let mut shutdown_ack = None;

    loop {
        // Replies go out after the snapshot they describe has been published.
        let mut reply = None;

        // Notifications first: anything the worker published before
        // resolving is counted before the resolution is applied.
        tokio::select! {
            biased;

            counted = controller.bridge_mut().next_completion() => {
                if counted.is_none() {
                    warn!("worker event stream closed; progress will no longer update");
                }
            }
            Some(joined) = OptionFuture::from(in_flight.as_mut().map(|flight| &mut flight.task)) => {
                let result = joined.unwrap_or_else(|err| {
                    Err(WorkerFailure::internal(format!(
                        "background worker task ended unexpectedly: {err}"
                    )))
                });
                if let Some(flight) = in_flight.take() {
                    debug!(request_id = %flight.request_id, "worker call settled");
                    reply = controller
                        .finish_submit(result)
                        .map(|outcome| (flight.reply, outcome));
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("all controller handles dropped");
                    break;
                };
                match command {
                    ControllerCommand::SetField { name, value } => {
                        controller.set_field_value(name, value);
                    }
                    ControllerCommand::Submit { reply: submit_reply } => {
                        match controller.begin_submit() {
                            SubmitDecision::Dispatch { request_id, request } => {
                                let worker = Arc::clone(&worker);
                                let task = tokio::spawn(async move {
                                    worker.retrieve_backgrounds(request).await
                                });
                                in_flight = Some(InFlight {
                                    request_id,
                                    task,
                                    reply: submit_reply,
                                });
                            }
                            SubmitDecision::Rejected => {
                                reply = Some((submit_reply, SubmitOutcome::Rejected));
                            }
                            SubmitDecision::AlreadyInFlight => {
                                reply = Some((submit_reply, SubmitOutcome::AlreadyInFlight));
                            }
                            SubmitDecision::Ignored => {
                                reply = Some((submit_reply, SubmitOutcome::Ignored));
                            }
                        }
                    }
                    ControllerCommand::Dismiss => {
                        controller.dismiss();
                    }
                    ControllerCommand::Shutdown { ack } => {
                        shutdown_ack = Some(ack);
                        break;
                    }
                }
            }
        }

        snapshots.send_replace(controller.snapshot());
        if let Some((reply, outcome)) = reply {
            let _ = reply.send(outcome);
        }
    }

    if let Some(flight) = in_flight.take() {
        // Dropping the JoinHandle detaches the worker call; it is not cancelled.
        info!(request_id = %flight.request_id, "detaching in-flight worker call");
    }
    controller.teardown();
    if let Some(ack) = shutdown_ack {
        let _ = ack.send(());
    }
    info!("form controller stopped");
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
