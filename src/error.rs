use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("feed request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("feed responded with HTTP {status} for {url}")]
    FetchStatus { status: u16, url: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed {field} field: {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("encoding length mismatch: {geo} geometry records vs {flat} property records")]
    SchemaMismatch { geo: usize, flat: usize },

    #[error("composed text is {len} characters, platform limit is {limit}")]
    ContentTooLong { len: usize, limit: usize },

    #[error("render failed: {0}")]
    Render(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
