use std::{fs, path::Path, time::Duration};

use client_core::Timeouts;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub start_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            request_timeout_secs: 90,
            start_timeout_secs: 90,
        }
    }
}

impl Settings {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            start: Duration::from_secs(self.start_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    start_timeout_secs: Option<u64>,
}

pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(
                path = %config_path.display(),
                error = %err,
                "ignoring unparsable config file"
            ),
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.start_timeout_secs {
        settings.start_timeout_secs = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BEE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = lookup("APP__START_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.start_timeout_secs = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__START_TIMEOUT_SECS"),
        }
    }
}
