use url::Url;
use thiserror::Error;

pub const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:8000/predict";
pub const PREDICT_URL_VAR: &str = "PREDICT_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PREDICT_URL is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("PREDICT_URL must be an http(s) URL, got scheme '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub predict_url: Url,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(PREDICT_URL_VAR).ok();
        Self::from_predict_url(raw.as_deref())
    }

    fn from_predict_url(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_PREDICT_URL);
        let predict_url = Url::parse(raw)?;
        match predict_url.scheme() {
            "http" | "https" => Ok(Self { predict_url }),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}
