//! Anthropic Messages API adapter.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{extract, CheckRequest, CheckResult};
use crate::config::AppConfig;
use crate::error::CheckError;

const PROVIDER: &str = "claude";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROMPT: &str = "以下の本文と画像を比較して、誤字・情報誤り・レイアウト崩れをチェックしてください。

【本文】
{TEXT}

【チェック項目】
1. 誤字・脱字
2. 本文と画像の情報の一致
3. レイアウトの崩れ

結果は以下のJSON形式で返してください：
[
  {
    \"type\": \"誤字\" | \"情報誤り\" | \"レイアウト\",
    \"severity\": \"high\" | \"medium\" | \"low\",
    \"description\": \"具体的な説明\",
    \"location\": \"場所（オプション）\",
    \"imageIndex\": 画像番号（オプション、0から始まる）
  }
]";

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentBlock {
    Text {
        r#type: String,
        text: String,
    },
    Image {
        r#type: String,
        source: ImageSource,
    },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    r#type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    r#type: String,
    #[serde(default)]
    text: String,
}

fn build_request(config: &AppConfig, request: &CheckRequest) -> ClaudeRequest {
    let mut content = vec![ContentBlock::Text {
        r#type: "text".to_string(),
        text: PROMPT.replace("{TEXT}", &request.text),
    }];

    // Claude wants the bare base64 payload, data-URI prefix stripped.
    for image in &request.images {
        content.push(ContentBlock::Image {
            r#type: "image".to_string(),
            source: ImageSource {
                r#type: "base64".to_string(),
                media_type: image.mime_type.clone(),
                data: image.base64_payload().to_string(),
            },
        });
    }

    ClaudeRequest {
        model: config.claude_model.clone(),
        max_tokens: config.claude_max_tokens,
        messages: vec![ClaudeMessage {
            role: "user".to_string(),
            content,
        }],
    }
}

pub async fn check(
    config: &AppConfig,
    request: &CheckRequest,
) -> Result<Vec<CheckResult>, CheckError> {
    let client = Client::new();
    let url = format!("{}/v1/messages", config.anthropic_base_url);

    let response = client
        .post(&url)
        .header("x-api-key", &request.api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
        .json(&build_request(config, request))
        .send()
        .await
        .map_err(|e| CheckError::transport(PROVIDER, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CheckError::Http {
            provider: PROVIDER,
            status,
            body,
        });
    }

    let body: ClaudeResponse = response
        .json()
        .await
        .map_err(|e| CheckError::transport(PROVIDER, e))?;

    // All text blocks joined; tool-use or other block types are skipped.
    let answer: String = body
        .content
        .iter()
        .filter(|block| block.r#type == "text")
        .map(|block| block.text.as_str())
        .collect();

    if answer.is_empty() {
        return Err(CheckError::EmptyResponse { provider: PROVIDER });
    }

    extract::extract_results(&answer, false)
}
