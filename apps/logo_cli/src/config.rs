use std::{collections::HashMap, fs, time::Duration};

use client_core::{ClientConfig, ControllerOptions, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};

const SETTINGS_FILE: &str = "logo_cli.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub timeout_ms: u64,
    pub single_flight: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            single_flight: false,
        }
    }
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            single_flight: self.single_flight,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("base_url").and_then(toml::Value::as_str) {
        settings.base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("timeout_ms").and_then(toml::Value::as_integer) {
        if let Ok(v) = u64::try_from(v) {
            settings.timeout_ms = v;
        }
    }
    if let Some(v) = file_cfg.get("single_flight").and_then(toml::Value::as_bool) {
        settings.single_flight = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("LOGO_API_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("APP__TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.timeout_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__SINGLE_FLIGHT") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.single_flight = parsed;
        }
    }
}
