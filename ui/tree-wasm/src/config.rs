//! Client configuration published by the tree server.

use gloo_net::http::Request;
use tn_api_types::AppConfig;
use tracing::{info, warn};

pub const CONFIG_URL: &str = "/app-config.json";

/// Fetch the published configuration, falling back to the built-in defaults.
pub async fn load() -> AppConfig {
    match fetch().await {
        Ok(config) => {
            info!(
                contract = %config.contract_address,
                token_id_mode = %config.token_id_mode,
                "configuration loaded"
            );
            config
        }
        Err(err) => {
            warn!(%err, url = CONFIG_URL, "configuration unavailable; using defaults");
            AppConfig::default()
        }
    }
}

async fn fetch() -> Result<AppConfig, String> {
    let response = Request::get(CONFIG_URL)
        .send()
        .await
        .map_err(|err| format!("fetch error: {err}"))?;

    if !response.ok() {
        return Err(format!("{} {}", response.status(), response.status_text()));
    }

    let text = response
        .text()
        .await
        .map_err(|err| format!("read error: {err}"))?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<AppConfig, String> {
    let config: AppConfig =
        serde_json::from_str(text).map_err(|err| format!("invalid configuration: {err}"))?;
    config.validate()?;
    Ok(config)
}
