use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "recommend.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the recommendation service. Left empty when unset; the
    /// resulting request then fails as a transport error.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            request_timeout_secs: 30,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = match load_settings_file(Path::new(SETTINGS_FILE)) {
        Ok(Some(file_settings)) => file_settings,
        Ok(None) => Settings::default(),
        Err(error) => {
            let detail = format!("{error:#}");
            warn!(%detail, "ignoring unreadable settings file");
            Settings::default()
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let settings = toml::from_str::<Settings>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    Ok(Some(settings))
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    // Later keys win.
    for key in ["NEXT_PUBLIC_API_BASE_URL", "API_BASE_URL", "APP__API_BASE_URL"] {
        if let Some(v) = lookup(key) {
            settings.api_base_url = v;
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

/// `{base}/recommend`, tolerating a trailing slash on `base`.
pub fn recommend_endpoint(base_url: &str) -> String {
    format!("{}/recommend", base_url.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("recommend_core_{tag}_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn endpoint_appends_recommend_path() {
        assert_eq!(
            recommend_endpoint("http://api.local:8000"),
            "http://api.local:8000/recommend"
        );
        assert_eq!(
            recommend_endpoint("http://api.local:8000/v1/"),
            "http://api.local:8000/v1/recommend"
        );
        assert_eq!(recommend_endpoint(""), "/recommend");
    }

    #[test]
    fn env_overrides_defaults_with_later_keys_winning() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[
                ("NEXT_PUBLIC_API_BASE_URL", "http://first"),
                ("APP__API_BASE_URL", "http://last"),
                ("APP__REQUEST_TIMEOUT_SECS", "5"),
            ]),
        );
        assert_eq!(settings.api_base_url, "http://last");
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_keeps_previous_value() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]),
        );
        assert_eq!(settings.request_timeout_secs, 30);

        apply_env_overrides(&mut settings, lookup_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn missing_base_url_is_not_an_error() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, lookup_from(&[]));
        assert!(settings.api_base_url.is_empty());
    }

    #[test]
    fn reads_partial_settings_file() {
        let dir = temp_dir("settings");
        let path = dir.join(SETTINGS_FILE);
        fs::write(&path, "api_base_url = \"http://file.local\"\n").expect("write");

        let settings = load_settings_file(&path).expect("load").expect("present");
        assert_eq!(settings.api_base_url, "http://file.local");
        assert_eq!(settings.request_timeout_secs, 30);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn absent_file_yields_none_and_bad_file_errors() {
        let dir = temp_dir("settings_bad");
        assert!(load_settings_file(&dir.join("missing.toml"))
            .expect("absent is fine")
            .is_none());

        let path = dir.join(SETTINGS_FILE);
        fs::write(&path, "request_timeout_secs = \"ten\"").expect("write");
        let err = load_settings_file(&path).expect_err("type mismatch");
        assert!(format!("{err:#}").contains("failed to parse settings file"));

        fs::remove_dir_all(dir).expect("cleanup");
    }
}
