//! Outbound HTTP plumbing shared by every provider adapter

use crate::config::HttpConfig;
use crate::error::{ProviderError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("motel-map/", env!("CARGO_PKG_VERSION"));

/// Build the single client used for all provider calls
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs));

    if !config.system_proxy {
        builder = builder.no_proxy();
    }

    Ok(builder.build()?)
}

/// Send a request and decode its JSON body
///
/// Non-success statuses become `ProviderError::Status` before the body is
/// looked at.
pub async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> std::result::Result<T, ProviderError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
