use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Base address of the pill identification backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request transport timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
