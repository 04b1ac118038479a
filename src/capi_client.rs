use crate::errors::AppError;
use crate::models::EventsPayload;
use reqwest;
use tracing;

/// Result of one upstream submission: the Graph API's parsed JSON body plus
/// whether the HTTP status was a success.
#[derive(Debug, Clone)]
pub struct CapiOutcome {
    pub accepted: bool,
    pub meta: serde_json::Value,
}

/// Client for the Meta Conversions API `events` endpoint.
#[derive(Clone)]
pub struct CapiClient {
    client: reqwest::Client,
    base_url: String,
    pixel_id: String,
    access_token: String,
}

impl CapiClient {
    /// Creates a new `CapiClient`.
    ///
    /// No request timeout is set: the relay makes exactly one upstream call
    /// per inbound request and surfaces a slow upstream to that caller
    /// instead of cutting it off.
    pub fn new(
        base_url: String,
        pixel_id: String,
        access_token: String,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create CAPI client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            pixel_id,
            access_token,
        })
    }

    /// Submits one events payload to the Graph API.
    ///
    /// Returns the upstream JSON body either way; `accepted` mirrors the
    /// upstream HTTP status. Transport failures and non-JSON upstream bodies
    /// map to `AppError::ExternalApiError`.
    pub async fn send_events(&self, payload: &EventsPayload) -> Result<CapiOutcome, AppError> {
        let url = format!(
            "{}/{}/events?access_token={}",
            self.base_url, self.pixel_id, self.access_token
        );
        // The URL carries the token, so log the endpoint without it
        tracing::info!(
            "Submitting {} event(s) to {}/{}/events",
            payload.data.len(),
            self.base_url,
            self.pixel_id
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("CAPI request failed: {}", e)))?;

        let accepted = response.status().is_success();
        let status = response.status();

        let meta: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse CAPI response: {}", e))
        })?;

        if accepted {
            tracing::info!("CAPI accepted event ({})", status);
        } else {
            tracing::warn!("CAPI rejected event ({}): {}", status, meta);
        }

        Ok(CapiOutcome { accepted, meta })
    }
}
