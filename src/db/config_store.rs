//! Runtime-editable configuration overrides (§3 `AppConfig`, §6 precedence).
//!
//! This is the middle layer of "baked defaults < runtime DB-backed
//! overrides < environment variables" — callers read these key/value rows
//! and merge them onto [`crate::config::AppConfig`] before applying
//! environment overrides.

use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;

use super::model::AppConfigRow;
use super::schema::app_config::dsl::*;
use super::DbConnection;
use crate::error::{Error, Result};

/// Loads every runtime override as `(key, value)` pairs.
pub fn load_all(conn: &mut DbConnection) -> Result<Vec<(String, Value)>> {
    let rows: Vec<AppConfigRow> = app_config.load(conn).map_err(Error::Database)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_str(&row.value_json).ok().map(|v| (row.key, v)))
        .collect())
}

/// Upserts a single runtime override.
pub fn set(conn: &mut DbConnection, config_key: &str, value: &Value, by: Option<&str>) -> Result<()> {
    let row = AppConfigRow {
        key: config_key.to_string(),
        value_json: value.to_string(),
        updated_at: Utc::now().to_rfc3339(),
        updated_by: by.map(str::to_string),
    };
    diesel::insert_into(app_config)
        .values(&row)
        .on_conflict(key)
        .do_update()
        .set(&row)
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(())
}
