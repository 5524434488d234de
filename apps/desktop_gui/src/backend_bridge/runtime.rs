//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    spawn_controller, BackgroundWorker, ControllerHandle, MissingBackgroundWorker, SubmitOutcome,
};
use crossbeam_channel::{Receiver, Sender};
use retriever::BackgroundRetriever;

use crate::{
    backend_bridge::commands::BackendCommand,
    config::Settings,
    controller::events::{UiError, UiErrorContext, UiEvent},
};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let display = loop {
                match cmd_rx.recv() {
                    Ok(BackendCommand::Start { display }) => break display,
                    Ok(other) => {
                        tracing::debug!(command = other.name(), "dropping command received before start");
                    }
                    Err(_) => return,
                }
            };

            let worker = build_worker(&settings, &ui_tx);
            let display = settings.controller.display_or_fallback(display);
            let (handle, controller_task) = spawn_controller(&settings.controller, display, worker);
            forward_snapshots(&handle, ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Start { .. } => {
                        tracing::warn!("ignoring repeated start command");
                    }
                    BackendCommand::SetField { name, value } => {
                        if handle.set_field(name, value).await.is_err() {
                            break;
                        }
                    }
                    BackendCommand::Submit => {
                        let handle = handle.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            report_outcome(handle.submit().await, &ui_tx);
                        });
                    }
                    BackendCommand::Dismiss => {
                        if handle.dismiss().await.is_err() {
                            break;
                        }
                    }
                    BackendCommand::Shutdown => break,
                }
            }

            if let Err(err) = handle.shutdown().await {
                tracing::debug!("form controller already stopped: {err}");
            }
            if let Err(err) = controller_task.await {
                tracing::error!("form controller task failed: {err}");
            }
        });
    });
}

fn build_worker(settings: &Settings, ui_tx: &Sender<UiEvent>) -> Arc<dyn BackgroundWorker> {
    match BackgroundRetriever::new(settings.retriever.clone()) {
        Ok(retriever) => Arc::new(retriever),
        Err(err) => {
            let message = format!("backend worker startup failure: {err}");
            tracing::error!("{message}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                message,
            )));
            Arc::new(MissingBackgroundWorker::new(err.to_string()))
        }
    }
}

fn forward_snapshots(handle: &ControllerHandle, ui_tx: Sender<UiEvent>) {
    let mut snapshots = handle.subscribe();
    let initial = snapshots.borrow_and_update().clone();
    let _ = ui_tx.try_send(UiEvent::Snapshot(Box::new(initial)));
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if ui_tx.send(UiEvent::Snapshot(Box::new(snapshot))).is_err() {
                break;
            }
        }
    });
}

fn report_outcome(
    outcome: Result<SubmitOutcome, client_core::ControllerError>,
    ui_tx: &Sender<UiEvent>,
) {
    let event = match outcome {
        Ok(SubmitOutcome::Completed) => UiEvent::Info("Backgrounds saved".to_string()),
        Ok(SubmitOutcome::Failed(message)) => UiEvent::Info(format!("Request failed: {message}")),
        Ok(SubmitOutcome::Rejected) => UiEvent::Info("Fix the highlighted fields".to_string()),
        Ok(SubmitOutcome::AlreadyInFlight) => {
            UiEvent::Info("A request is already running".to_string())
        }
        Ok(SubmitOutcome::Ignored) => return,
        Err(err) => UiEvent::Error(UiError::from_message(
            UiErrorContext::Submit,
            format!("Backend command processor disconnected: {err}"),
        )),
    };
    let _ = ui_tx.try_send(event);
}
