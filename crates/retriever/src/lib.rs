//! Background worker that pulls wallpaper-sized images from a subreddit listing.

pub mod config;
pub mod error;
pub mod images;
pub mod ledger;
pub mod listing;
pub mod oauth;

use std::path::Path;

use async_trait::async_trait;
use client_core::{BackgroundFetcher, ItemEventSource};
use reqwest::Client;
use shared::{
    domain::BulkRequest,
    error::WorkerFailure,
    protocol::{ImageSaved, WorkerEvent},
};
use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, error, info};

pub use config::RetrieverConfig;
pub use error::RetrieverError;
use ledger::ExistingImages;
use oauth::OAuthToken;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct BackgroundRetriever {
    client: Client,
    config: RetrieverConfig,
    events: broadcast::Sender<WorkerEvent>,
}

impl BackgroundRetriever {
    pub fn new(config: RetrieverConfig) -> Result<Self, RetrieverError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(RetrieverError::Client)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client,
            config,
            events,
        })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Saves `request.item_count` new images into the destination, publishing
    /// one `image_saved` event per file written.
    pub async fn retrieve(&self, request: &BulkRequest) -> Result<u32, RetrieverError> {
        ensure_destination(&request.destination_path).await?;
        info!(
            count = request.item_count,
            width = request.width,
            height = request.height,
            path = %request.destination_path.display(),
            "retrieving backgrounds"
        );

        let token = oauth::fetch_application_only_token(&self.client, &self.config).await?;
        let mut ledger = ExistingImages::load(
            &request.destination_path,
            &self.config.existing_images_filename,
        )
        .await;

        let result = self.retrieve_batches(request, &token, &mut ledger).await;
        match (result, ledger.save().await) {
            (Ok(saved), Ok(())) => Ok(saved),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(save_err)) => {
                error!(error = %save_err, "failed to save existing images file after failed request");
                Err(err)
            }
        }
    }

    async fn retrieve_batches(
        &self,
        request: &BulkRequest,
        token: &OAuthToken,
        ledger: &mut ExistingImages,
    ) -> Result<u32, RetrieverError> {
        let deadline = Instant::now() + self.config.query_budget();
        let mut saved = 0u32;
        let mut after: Option<String> = None;

        while saved < request.item_count {
            if Instant::now() >= deadline {
                return Err(RetrieverError::TimeBudgetExhausted {
                    secs: self.config.max_aggregated_query_time_secs,
                    saved,
                    requested: request.item_count,
                });
            }

            let page =
                listing::fetch_listing(&self.client, &self.config, token, after.as_deref())
                    .await?;
            let candidates = images::select_candidates(
                &page,
                request.item_count - saved,
                request.width,
                request.height,
                ledger,
            );
            debug!(
                candidates = candidates.len(),
                posts = page.data.children.len(),
                "listing page scanned"
            );

            for candidate in candidates {
                images::download_image(
                    &self.client,
                    &self.config,
                    &candidate,
                    &request.destination_path,
                )
                .await?;
                let file_name = candidate.file_name()?;
                ledger.record(file_name.clone());
                saved += 1;
                // No subscribers is not an error for the worker.
                let _ = self
                    .events
                    .send(WorkerEvent::ImageSaved(ImageSaved::now(file_name)));
            }

            match page.data.after {
                Some(next) if !next.is_empty() => after = Some(next),
                _ if saved < request.item_count => {
                    return Err(RetrieverError::ListingExhausted {
                        saved,
                        requested: request.item_count,
                    });
                }
                _ => break,
            }
        }

        info!(saved, "background request complete");
        Ok(saved)
    }
}

async fn ensure_destination(path: &Path) -> Result<(), RetrieverError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(RetrieverError::DestinationMissing(path.to_path_buf())),
    }
}

#[async_trait]
impl BackgroundFetcher for BackgroundRetriever {
    async fn retrieve_backgrounds(&self, request: BulkRequest) -> Result<(), WorkerFailure> {
        self.retrieve(&request).await.map(|_| ()).map_err(|err| {
            error!(error = %err, "background request failed");
            WorkerFailure::from(err)
        })
    }
}

impl ItemEventSource for BackgroundRetriever {
    fn subscribe_events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
