//! Persistence configuration (§3, AMBIENT.6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub snapshot_retention_minutely_days: i64,
    pub snapshot_retention_hourly_days: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "marketwatch.sqlite".to_string(),
            max_connections: 8,
            snapshot_retention_minutely_days: 30,
            snapshot_retention_hourly_days: 365,
        }
    }
}
