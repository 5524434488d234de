use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub access_token_url: String,
    pub grant_type: String,
    pub device_id: String,
    pub client_id: String,
    pub api_endpoint: String,
    pub subreddit: String,
    pub search_type: String,
    pub application_name: String,
    pub platform: String,
    pub version: String,
    pub query_batch_size: u32,
    pub max_aggregated_query_time_secs: u64,
    pub http_timeout_secs: u64,
    pub existing_images_filename: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            access_token_url: "https://www.reddit.com/api/v1/access_token".into(),
            grant_type: "https://oauth.reddit.com/grants/installed_client".into(),
            device_id: "DO_NOT_TRACK_THIS_DEVICE".into(),
            client_id: "3gMaLS0rRxDTdEWErlrTEg".into(),
            api_endpoint: "https://oauth.reddit.com".into(),
            subreddit: "earthporn".into(),
            search_type: "hot".into(),
            application_name: "backdrop".into(),
            platform: std::env::consts::OS.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            query_batch_size: 100,
            max_aggregated_query_time_secs: 30,
            http_timeout_secs: 10,
            existing_images_filename: "backdrop_existing_images.json".into(),
        }
    }
}

impl RetrieverConfig {
    pub fn user_agent(&self) -> String {
        format!(
            "{}:{}:v{}",
            self.platform, self.application_name, self.version
        )
    }

    pub fn listing_url(&self) -> String {
        format!(
            "{}/r/{}/{}",
            self.api_endpoint.trim_end_matches('/'),
            self.subreddit,
            self.search_type
        )
    }

    pub fn query_budget(&self) -> Duration {
        Duration::from_secs(self.max_aggregated_query_time_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_joins_endpoint_subreddit_and_sort() {
        let config = RetrieverConfig {
            api_endpoint: "http://127.0.0.1:9000/".into(),
            subreddit: "wallpapers".into(),
            search_type: "top".into(),
            ..RetrieverConfig::default()
        };
        assert_eq!(config.listing_url(), "http://127.0.0.1:9000/r/wallpapers/top");
    }

    #[test]
    fn user_agent_names_platform_app_and_version() {
        let config = RetrieverConfig {
            platform: "linux".into(),
            application_name: "backdrop".into(),
            version: "0.1.0".into(),
            ..RetrieverConfig::default()
        };
        assert_eq!(config.user_agent(), "linux:backdrop:v0.1.0");
    }
}
