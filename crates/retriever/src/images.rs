//! Picking images that fit the requested resolution and saving them to disk.

use std::path::{Path, PathBuf};

use reqwest::{header, Client, StatusCode};
use tracing::{debug, info};

use crate::{
    config::RetrieverConfig, error::RetrieverError, ledger::ExistingImages,
    listing::ListingResponse,
};

pub const ACCEPTABLE_ASPECT_DIFF: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub uid: String,
    pub title: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageCandidate {
    pub fn extension(&self) -> Result<&'static str, RetrieverError> {
        image_extension(&self.url)
    }

    pub fn file_name(&self) -> Result<String, RetrieverError> {
        Ok(format!("{}{}", self.uid, self.extension()?))
    }
}

pub fn image_extension(url: &str) -> Result<&'static str, RetrieverError> {
    if url.contains(".jpg") {
        Ok(".jpg")
    } else if url.contains(".png") {
        Ok(".png")
    } else {
        Err(RetrieverError::UnknownImageType(url.to_string()))
    }
}

/// Listing payloads HTML-escape query separators in preview URLs.
pub fn unescape_url(url: &str) -> String {
    url.replace("&amp;", "&")
}

pub fn above_min_size(candidate: &ImageCandidate, width: u32, height: u32) -> bool {
    candidate.width >= width && candidate.height >= height
}

pub fn within_aspect_ratio(candidate: &ImageCandidate, width: u32, height: u32) -> bool {
    if candidate.height == 0 || height == 0 {
        return false;
    }
    let actual = f64::from(candidate.width) / f64::from(candidate.height);
    let required = f64::from(width) / f64::from(height);
    (actual - required).abs() <= ACCEPTABLE_ASPECT_DIFF
}

pub fn fits_resolution(candidate: &ImageCandidate, width: u32, height: u32) -> bool {
    if !above_min_size(candidate, width, height) {
        debug!(
            uid = %candidate.uid,
            found = %format!("{}x{}", candidate.width, candidate.height),
            "image below minimum resolution"
        );
        return false;
    }
    if !within_aspect_ratio(candidate, width, height) {
        debug!(uid = %candidate.uid, "image aspect ratio out of range");
        return false;
    }
    true
}

/// At most `remaining` candidates from one listing page, skipping anything already on disk.
pub fn select_candidates(
    listing: &ListingResponse,
    remaining: u32,
    width: u32,
    height: u32,
    ledger: &ExistingImages,
) -> Vec<ImageCandidate> {
    let mut selected: Vec<ImageCandidate> = Vec::new();
    for child in &listing.data.children {
        let post = &child.data;
        let Some(preview) = &post.preview else {
            continue;
        };
        for image in &preview.images {
            if selected.len() as u32 >= remaining {
                return selected;
            }
            let candidate = ImageCandidate {
                uid: post.name.clone(),
                title: post.title.clone(),
                url: unescape_url(&image.source.url),
                width: image.source.width,
                height: image.source.height,
            };
            let file_name = match candidate.file_name() {
                Ok(file_name) => file_name,
                Err(err) => {
                    debug!(error = %err, "skipping image");
                    continue;
                }
            };
            if ledger.contains(&file_name) || selected.iter().any(|c| c.uid == candidate.uid) {
                continue;
            }
            if fits_resolution(&candidate, width, height) {
                selected.push(candidate);
            }
        }
    }
    selected
}

pub async fn download_image(
    client: &Client,
    config: &RetrieverConfig,
    candidate: &ImageCandidate,
    directory: &Path,
) -> Result<PathBuf, RetrieverError> {
    let path = directory.join(candidate.file_name()?);
    let response = client
        .get(&candidate.url)
        .header(header::USER_AGENT, config.user_agent())
        .send()
        .await
        .map_err(|source| RetrieverError::Http {
            url: candidate.url.clone(),
            source,
        })?;
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RetrieverError::RateLimited {
            url: candidate.url.clone(),
            status,
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RetrieverError::Status {
            url: candidate.url.clone(),
            status,
            body,
        });
    }
    let bytes = response.bytes().await.map_err(|source| RetrieverError::Http {
        url: candidate.url.clone(),
        source,
    })?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| RetrieverError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), title = %candidate.title, "saved image");
    Ok(path)
}

#[cfg(test)]
#[path = "tests/images_tests.rs"]
mod tests;
