//! The check pipeline: shared data model, per-provider adapters and the
//! dispatcher that routes one request to exactly one of them.

pub mod claude;
pub mod extract;
pub mod gemini;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::CheckError;

/// Which LLM vendor handles a given check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    OpenAI,
    Gemini,
}

impl Provider {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::OpenAI => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Provider {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            other => Err(CheckError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// One uploaded image, held in memory as a base64 data-URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    pub id: String,
    pub mime_type: String,
    pub data_uri: String,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data_uri: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mime_type: mime_type.into(),
            data_uri: data_uri.into(),
        }
    }

    /// Read an image file and encode it as a `data:<mime>;base64,` URI.
    /// The mime type is guessed from the file extension.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        use base64::Engine;

        let bytes = std::fs::read(path)?;
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        };
        let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(Self::new(mime, format!("data:{mime};base64,{payload}")))
    }

    /// The base64 payload with the `data:<mime>;base64,` prefix stripped.
    /// Splits on the first comma, the same way the data-URI was assembled.
    pub fn base64_payload(&self) -> &str {
        match self.data_uri.split_once(',') {
            Some((_, payload)) => payload,
            None => &self.data_uri,
        }
    }
}

/// Everything one check invocation needs. Built by the caller, consumed by
/// exactly one adapter, discarded after.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub text: String,
    pub images: Vec<ImageInput>,
    pub api_key: String,
    pub provider: Provider,
}

/// One issue reported by the model.
///
/// `kind` and `severity` are deliberately open strings: the models are asked
/// for a closed set (誤字 / 情報誤り / レイアウト, high / medium / low) but
/// nothing enforces it, and out-of-enum values pass through to the renderer
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "imageIndex", skip_serializing_if = "Option::is_none")]
    pub image_index: Option<u32>,
}

/// A completed check: the normalized result list plus call metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub results: Vec<CheckResult>,
    pub provider: String,
    pub model: String,
    pub timestamp: String,
}

/// Route a request to its adapter.
///
/// Validates the inputs first so a bad request never reaches the network,
/// then runs exactly one provider call. No fan-out, no fallback.
pub async fn run_check(
    config: &AppConfig,
    request: &CheckRequest,
) -> Result<CheckOutcome, CheckError> {
    validate(request)?;

    log::info!(
        "running check with {} ({} images, {} chars of text)",
        request.provider,
        request.images.len(),
        request.text.len()
    );

    let (results, model) = match request.provider {
        Provider::Claude => {
            let results = claude::check(config, request).await?;
            (results, config.claude_model.clone())
        }
        Provider::OpenAI => {
            let results = openai::check(config, request).await?;
            (results, config.openai_model.clone())
        }
        Provider::Gemini => {
            let results = gemini::check(config, request).await?;
            (results, config.gemini_model.clone())
        }
    };

    log::info!("check finished: {} issue(s) reported", results.len());

    Ok(CheckOutcome {
        results,
        provider: request.provider.name().to_string(),
        model,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

fn validate(request: &CheckRequest) -> Result<(), CheckError> {
    if request.text.trim().is_empty() {
        return Err(CheckError::Validation("article text is empty".to_string()));
    }
    if request.images.is_empty() {
        return Err(CheckError::Validation(
            "at least one image is required".to_string(),
        ));
    }
    if request.api_key.is_empty() {
        return Err(CheckError::Validation(format!(
            "no API key configured for {}",
            request.provider
        )));
    }
    Ok(())
}

/// Assign positional ids, overwriting whatever id the model invented.
pub(crate) fn assign_ids(mut results: Vec<CheckResult>) -> Vec<CheckResult> {
    for (index, result) in results.iter_mut().enumerate() {
        result.id = format!("result-{index}");
    }
    results
}
