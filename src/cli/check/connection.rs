use std::path::Path;

use crate::cli::output;
use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Test REST and websocket connectivity to the upstream venue.
pub async fn execute_connection(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(Some(config_path))?;

    output::section("Connection Check");
    output::field("Gamma", &config.upstream.gamma_base_url);
    output::field("CLOB", &config.upstream.clob_base_url);
    output::field("Websocket", &config.websocket.url);

    print!("  REST API connectivity... ");
    let client = reqwest::Client::new();
    let url = format!("{}/markets", config.upstream.gamma_base_url);
    match client.get(&url).query(&[("limit", "1")]).send().await {
        Ok(response) if response.status().is_success() => println!("ok"),
        Ok(response) => {
            println!("failed");
            return Err(Error::Connection(format!("gamma API returned {}", response.status())));
        }
        Err(e) => {
            println!("failed");
            return Err(Error::Connection(e.to_string()));
        }
    }

    print!("  Websocket connectivity... ");
    match tokio_tungstenite::connect_async(&config.websocket.url).await {
        Ok(_) => println!("ok"),
        Err(e) => {
            println!("failed");
            return Err(Error::Connection(e.to_string()));
        }
    }

    output::success("connection checks passed");
    Ok(())
}
