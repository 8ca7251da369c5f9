use thiserror::Error;

/// Failures talking to the content service or decoding what it returns.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content service answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode content response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no post with slug `{slug}`")]
    NotFound { slug: String },

    #[error("document `{id}` is invalid: {reason}")]
    InvalidDocument { id: String, reason: String },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{key}`: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
