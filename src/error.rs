use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong during one check invocation.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Caught before any network call is made.
    #[error("{0}")]
    Validation(String),

    /// The provider returned a non-2xx status.
    #[error("{provider} API error ({status}): {body}")]
    Http {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered 2xx but the expected answer field was absent.
    #[error("{provider} response contained no answer text")]
    EmptyResponse { provider: &'static str },

    /// No JSON array or fenced block anywhere in the model output. Carries
    /// the full raw text so the caller can inspect what the model said.
    #[error("no JSON found in model output: {raw}")]
    Extraction { raw: String },

    /// Truncated output with no complete object boundary to cut back to.
    #[error("could not repair truncated JSON output")]
    Repair,

    /// A JSON-looking substring was found but does not parse.
    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Unknown provider discriminator.
    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String),
}

impl CheckError {
    pub(crate) fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { provider, source }
    }
}
