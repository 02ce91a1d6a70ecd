use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = std::env::var("API_BASE_URL")
            .map_err(|_| anyhow::anyhow!("API_BASE_URL must be set"))?;

        // A missing key is not fatal: every proxy operation reports it instead.
        let api_key = std::env::var("API_KEY").ok();
        if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            tracing::warn!("API_KEY is not set; proxy operations will be rejected");
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            ..Self::new(api_base_url, api_key)
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
