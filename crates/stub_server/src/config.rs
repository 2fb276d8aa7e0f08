use std::{collections::HashMap, fs, net::SocketAddr};

use anyhow::Context;
use url::Url;

const SETTINGS_FILE: &str = "stub_server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub public_url: Option<String>,
    pub latency_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            public_url: None,
            latency_ms: 0,
        }
    }
}

impl Settings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))
    }

    /// Origin used when building image URLs; falls back to the bind address.
    pub fn image_origin(&self) -> anyhow::Result<Url> {
        let raw = match &self.public_url {
            Some(url) => url.trim().to_string(),
            None => format!("http://{}", self.bind_addr),
        };
        let mut url = Url::parse(&raw).with_context(|| format!("invalid public url '{raw}'"))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
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
    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.bind_addr = v.to_string();
    }
    if let Some(v) = file_cfg.get("public_url").and_then(toml::Value::as_str) {
        settings.public_url = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("latency_ms").and_then(toml::Value::as_integer) {
        if let Ok(v) = u64::try_from(v) {
            settings.latency_ms = v;
        }
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("STUB_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("APP__PUBLIC_URL") {
        settings.public_url = Some(v);
    }

    if let Some(v) = lookup("APP__LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.latency_ms = parsed;
        }
    }
}
