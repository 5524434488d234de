//! Application-only OAuth for installed clients.

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{config::RetrieverConfig, error::RetrieverError};

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl OAuthToken {
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

pub async fn fetch_application_only_token(
    client: &Client,
    config: &RetrieverConfig,
) -> Result<OAuthToken, RetrieverError> {
    let url = config.access_token_url.as_str();
    let response = client
        .post(url)
        .basic_auth(&config.client_id, Some(""))
        .header(header::USER_AGENT, config.user_agent())
        .form(&[
            ("grant_type", config.grant_type.as_str()),
            ("device_id", config.device_id.as_str()),
        ])
        .send()
        .await
        .map_err(|source| RetrieverError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RetrieverError::RateLimited {
            url: url.to_string(),
            status,
        });
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RetrieverError::Unauthorized { status });
    }
    let body = response.text().await.map_err(|source| RetrieverError::Http {
        url: url.to_string(),
        source,
    })?;
    if status != StatusCode::OK {
        return Err(RetrieverError::Status {
            url: url.to_string(),
            status,
            body,
        });
    }

    let token: OAuthToken =
        serde_json::from_str(&body).map_err(|source| RetrieverError::Decode {
            url: url.to_string(),
            source,
        })?;
    debug!(expires_in = ?token.expires_in, "obtained application-only oauth token");
    Ok(token)
}
