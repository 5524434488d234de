//! Drives the form controller from command-line arguments without opening a window.

use std::sync::Arc;

use anyhow::{bail, Context};
use client_core::{
    spawn_controller, BackgroundWorker, ControllerHandle, DisplayResolution, Snapshot,
    SubmitOutcome, ViewState,
};
use retriever::BackgroundRetriever;
use shared::domain::FieldName;
use tracing::info;

use crate::config::Settings;

#[derive(Debug, Clone, Default)]
pub struct HeadlessRequest {
    pub count: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub path: Option<String>,
}

impl HeadlessRequest {
    /// Raw field input in form order; unset arguments keep the form defaults.
    fn field_values(&self) -> Vec<(FieldName, &str)> {
        [
            (FieldName::BackgroundsCount, self.count.as_deref()),
            (FieldName::ImageWidth, self.width.as_deref()),
            (FieldName::ImageHeight, self.height.as_deref()),
            (FieldName::DownloadPath, self.path.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }
}

pub async fn run(settings: Settings, request: HeadlessRequest) -> anyhow::Result<()> {
    let retriever = BackgroundRetriever::new(settings.retriever.clone())
        .context("failed to build background retriever")?;
    let worker: Arc<dyn BackgroundWorker> = Arc::new(retriever);
    run_with_worker(&settings, request, None, worker).await
}

pub async fn run_with_worker(
    settings: &Settings,
    request: HeadlessRequest,
    display: Option<DisplayResolution>,
    worker: Arc<dyn BackgroundWorker>,
) -> anyhow::Result<()> {
    let display = settings.controller.display_or_fallback(display);
    let (handle, controller_task) = spawn_controller(&settings.controller, display, worker);
    let progress_log = spawn_progress_log(&handle);

    let result = submit(&handle, &request).await;

    handle.shutdown().await.context("form controller stopped early")?;
    progress_log.abort();
    controller_task
        .await
        .context("form controller task failed")?;
    result
}

async fn submit(handle: &ControllerHandle, request: &HeadlessRequest) -> anyhow::Result<()> {
    for (name, value) in request.field_values() {
        handle.set_field(name, value).await?;
    }

    match handle.submit().await? {
        SubmitOutcome::Completed => {
            let snapshot = handle.current();
            info!(progress = %snapshot.progress.label(), "backgrounds saved");
            Ok(())
        }
        SubmitOutcome::Failed(message) => bail!("request failed: {message}"),
        SubmitOutcome::Rejected => bail!("{}", describe_rejection(&handle.current())),
        SubmitOutcome::AlreadyInFlight | SubmitOutcome::Ignored => {
            bail!("form controller was not ready for a new request")
        }
    }
}

fn spawn_progress_log(handle: &ControllerHandle) -> tokio::task::JoinHandle<()> {
    let mut snapshots = handle.subscribe();
    tokio::spawn(async move {
        let mut last_logged = None;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.view.state() != ViewState::InProgress {
                continue;
            }
            let label = snapshot.progress.label();
            if last_logged.as_ref() != Some(&label) {
                info!(
                    progress = %label,
                    percent = snapshot.progress.percent(),
                    "retrieving backgrounds"
                );
                last_logged = Some(label);
            }
        }
    })
}

/// One line per invalid field, prefixed by the form-level message.
pub fn describe_rejection(snapshot: &Snapshot) -> String {
    let mut lines = vec![snapshot
        .view
        .status_message()
        .unwrap_or("Form is invalid")
        .to_string()];
    for field in snapshot.form.fields() {
        if let Some(message) = field.error_message() {
            lines.push(format!("  {}: {message}", field.name().label()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "tests/headless_tests.rs"]
mod tests;
