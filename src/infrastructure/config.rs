use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub refresh_interval_ms: u64,
    pub history_limit: usize,
    pub request_timeout_ms: u64,
    pub listen_addr: String,
    /// Fixed display offset; the host's local zone is used when unset.
    pub utc_offset_minutes: Option<i32>,
    /// Appended to a stroke color to get its translucent fill.
    pub fill_alpha: String,
    pub locations: Vec<LocationConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LocationConfig {
    pub name: String,
    pub key: Option<String>,
    pub color: Option<String>,
}

impl LocationConfig {
    pub fn new(name: &str, key: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            key: Some(key.to_string()),
            color: Some(color.to_string()),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            refresh_interval_ms: 30_000,
            history_limit: 12,
            request_timeout_ms: 10_000,
            listen_addr: "0.0.0.0:8081".to_string(),
            utc_offset_minutes: None,
            fill_alpha: "33".to_string(),
            locations: vec![
                LocationConfig::new("Dow's Lake", "dows", "rgb(75, 192, 192)"),
                LocationConfig::new("Fifth Avenue", "fifth", "rgb(255, 99, 132)"),
                LocationConfig::new("NAC", "nac", "rgb(54, 162, 235)"),
            ],
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.refresh_interval_ms == 0 {
            anyhow::bail!("refresh_interval_ms must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than zero");
        }
        if self.locations.is_empty() {
            anyhow::bail!("at least one location must be configured");
        }
        if let Some(offset) = self.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                anyhow::bail!("utc_offset_minutes out of range: {}", offset);
            }
        }
        Ok(self)
    }
}

/// Load `config/dashboard.toml` (optional) with `DASHBOARD__*` overrides on top.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_from("config/dashboard")
}

fn load_from(path: &str) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()
}
