use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::ControllerConfig;
use retriever::RetrieverConfig;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "backdrop.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub retriever: RetrieverConfig,
}

/// Defaults, then the settings file, then `APP__*` environment variables.
///
/// An explicitly named file must exist; the default `backdrop.toml` is optional.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
        .controller
        .validate()
        .context("invalid [controller] settings")?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = parse_var(&lookup, "APP__MAX_BATCH_SIZE") {
        settings.controller.max_batch_size = v;
    }
    if let Some(v) = parse_var(&lookup, "APP__MAX_DIMENSION_PX") {
        settings.controller.max_dimension_px = v;
    }

    if let Some(v) = lookup("APP__ACCESS_TOKEN_URL") {
        settings.retriever.access_token_url = v;
    }
    if let Some(v) = lookup("APP__API_ENDPOINT") {
        settings.retriever.api_endpoint = v;
    }
    if let Some(v) = lookup("APP__CLIENT_ID") {
        settings.retriever.client_id = v;
    }
    if let Some(v) = lookup("APP__SUBREDDIT") {
        settings.retriever.subreddit = v;
    }
    if let Some(v) = lookup("APP__SEARCH_TYPE") {
        settings.retriever.search_type = v;
    }
    if let Some(v) = parse_var(&lookup, "APP__QUERY_BATCH_SIZE") {
        settings.retriever.query_batch_size = v;
    }
    if let Some(v) = parse_var(&lookup, "APP__MAX_AGGREGATED_QUERY_TIME_SECS") {
        settings.retriever.max_aggregated_query_time_secs = v;
    }
    if let Some(v) = parse_var(&lookup, "APP__HTTP_TIMEOUT_SECS") {
        settings.retriever.http_timeout_secs = v;
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_settings_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("backdrop-settings-{label}-{nanos}.toml"))
    }

    #[test]
    fn file_tables_override_defaults() {
        let path = temp_settings_path("tables");
        fs::write(
            &path,
            r#"
[controller]
max_batch_size = 20

[controller.fallback_display]
width = 2560
height = 1440

[retriever]
subreddit = "wallpapers"
"#,
        )
        .expect("write settings");

        let settings = load_settings(Some(&path)).expect("load");
        assert_eq!(settings.controller.max_batch_size, 20);
        assert_eq!(settings.controller.max_dimension_px, 7680);
        assert_eq!(settings.controller.fallback_display.width, 2560);
        assert_eq!(settings.retriever.subreddit, "wallpapers");
        assert_eq!(settings.retriever.search_type, "hot");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = temp_settings_path("missing");
        let err = load_settings(Some(&path)).expect_err("missing file");
        assert!(err.to_string().contains("failed to read settings file"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let path = temp_settings_path("zero");
        fs::write(&path, "[controller]\nmax_batch_size = 0\n").expect("write settings");
        let err = load_settings(Some(&path)).expect_err("invalid");
        assert_eq!(err.to_string(), "invalid [controller] settings");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn env_overrides_apply_and_bad_numbers_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("APP__MAX_BATCH_SIZE", "10"),
            ("APP__SUBREDDIT", "spaceporn"),
            ("APP__HTTP_TIMEOUT_SECS", "soon"),
        ]);
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.controller.max_batch_size, 10);
        assert_eq!(settings.retriever.subreddit, "spaceporn");
        assert_eq!(settings.retriever.http_timeout_secs, 10);
    }
}
