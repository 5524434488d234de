//! Subreddit listing pages as returned by the API.

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::{config::RetrieverConfig, error::RetrieverError, oauth::OAuthToken};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub kind: String,
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild {
    pub data: ListingPost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingPost {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub preview: Option<ImagePreview>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePreview {
    #[serde(default)]
    pub images: Vec<PreviewImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewImage {
    pub source: ImageSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSource {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

pub fn listing_request_url(
    config: &RetrieverConfig,
    after: Option<&str>,
) -> Result<Url, RetrieverError> {
    let raw = config.listing_url();
    let mut url = Url::parse(&raw).map_err(|source| RetrieverError::Url { url: raw, source })?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("limit", &config.query_batch_size.to_string());
        if let Some(after) = after.filter(|after| !after.is_empty()) {
            query.append_pair("after", after);
        }
    }
    Ok(url)
}

pub async fn fetch_listing(
    client: &Client,
    config: &RetrieverConfig,
    token: &OAuthToken,
    after: Option<&str>,
) -> Result<ListingResponse, RetrieverError> {
    let url = listing_request_url(config, after)?;
    let url_text = url.to_string();
    let response = client
        .get(url)
        .header(header::USER_AGENT, config.user_agent())
        .header(header::AUTHORIZATION, token.authorization_header())
        .send()
        .await
        .map_err(|source| RetrieverError::Http {
            url: url_text.clone(),
            source,
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| RetrieverError::Http {
        url: url_text.clone(),
        source,
    })?;
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RetrieverError::RateLimited {
            url: url_text,
            status,
        });
    }
    if !status.is_success() {
        return Err(RetrieverError::Status {
            url: url_text,
            status,
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| RetrieverError::Decode {
        url: url_text,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_carries_limit_and_cursor() {
        let config = RetrieverConfig {
            api_endpoint: "http://localhost:1234".into(),
            subreddit: "earthporn".into(),
            search_type: "hot".into(),
            query_batch_size: 25,
            ..RetrieverConfig::default()
        };
        let first = listing_request_url(&config, None).expect("url");
        assert_eq!(first.as_str(), "http://localhost:1234/r/earthporn/hot?limit=25");

        let next = listing_request_url(&config, Some("t3_abc")).expect("url");
        assert_eq!(
            next.as_str(),
            "http://localhost:1234/r/earthporn/hot?limit=25&after=t3_abc"
        );
    }

    #[test]
    fn parses_posts_with_and_without_previews() {
        let body = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_b",
                "children": [
                    {"data": {"name": "t3_a", "title": "Lake", "preview": {"images": [
                        {"source": {"url": "https://i.example/a.jpg?x=1&amp;y=2", "width": 4000, "height": 2250}}
                    ]}}},
                    {"data": {"name": "t3_b", "title": "Text only"}}
                ]
            }
        }"#;
        let listing: ListingResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.after.as_deref(), Some("t3_b"));
        assert!(listing.data.children[1].data.preview.is_none());
    }
}
