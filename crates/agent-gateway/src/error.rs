use pathe_core::PatheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode agent response: {0}")]
    Decode(String),

    #[error("gateway configuration error: {0}")]
    Config(String),
}

impl From<GatewayError> for PatheError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(message) => PatheError::Config(message),
            other => PatheError::Gateway(other.to_string()),
        }
    }
}
