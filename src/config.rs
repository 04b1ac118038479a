use serde::Deserialize;

/// Fixed Meta pixel this relay reports to.
pub const PIXEL_ID: &str = "748503224834736";

/// Fallback `event_source_url` when the lead form does not send one.
pub const DEFAULT_EVENT_SOURCE_URL: &str = "https://nbclinic.jp/";

/// Default Graph API base (version pinned).
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Conversions API access token. Optional at startup: a missing token is
    /// reported per-request so the health endpoints stay up while the
    /// credential is being rotated.
    pub access_token: Option<String>,
    /// Routes events into Meta's test view instead of live reporting.
    pub test_event_code: Option<String>,
    /// Overridable so tests can point the relay at a mock server.
    pub graph_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            access_token: std::env::var("META_ACCESS_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            test_event_code: std::env::var("META_TEST_EVENT_CODE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            graph_base_url: std::env::var("META_GRAPH_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        if !config.graph_base_url.starts_with("http://")
            && !config.graph_base_url.starts_with("https://")
        {
            anyhow::bail!("META_GRAPH_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Graph base URL: {}", config.graph_base_url);
        tracing::debug!("Pixel ID: {}", PIXEL_ID);
        tracing::debug!("Server Port: {}", config.port);
        if config.access_token.is_none() {
            tracing::warn!("META_ACCESS_TOKEN not set; POST requests will be rejected");
        }
        if config.test_event_code.is_some() {
            tracing::info!("Test event code configured; events go to the test view");
        }

        Ok(config)
    }
}
