//! OpenAI Chat Completions adapter.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{extract, CheckRequest, CheckResult};
use crate::config::AppConfig;
use crate::error::CheckError;

const PROVIDER: &str = "openai";

const PROMPT: &str = "以下の本文（HTML/CSS含む）と画像を比較して、誤字・情報誤り・レイアウト崩れをチェックしてください。

【本文・HTML・CSS】
{TEXT}

【チェック項目】
1. 誤字・脱字
2. 本文と画像の情報の一致
3. CSSの色情報に基づく状態判定（例: 緑=あり、グレー=なし）
4. レイアウトの崩れ

結果は以下のJSON形式で返してください：
[
  {
    \"type\": \"誤字\" | \"情報誤り\" | \"レイアウト\",
    \"severity\": \"high\" | \"medium\" | \"low\",
    \"description\": \"具体的な説明\",
    \"location\": \"場所（オプション）\",
    \"imageIndex\": 画像番号（オプション、0から始まる）
  }
]

問題がない場合は空の配列 [] を返してください。";

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Content {
    Text { r#type: String, text: String },
    Image { r#type: String, image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

fn build_request(config: &AppConfig, request: &CheckRequest) -> OpenAIRequest {
    let mut content = vec![Content::Text {
        r#type: "text".to_string(),
        text: PROMPT.replace("{TEXT}", &request.text),
    }];

    // OpenAI takes the data-URI as-is, prefix included.
    for image in &request.images {
        content.push(Content::Image {
            r#type: "image_url".to_string(),
            image_url: ImageUrl {
                url: image.data_uri.clone(),
            },
        });
    }

    OpenAIRequest {
        model: config.openai_model.clone(),
        messages: vec![OpenAIMessage {
            role: "user".to_string(),
            content,
        }],
        max_tokens: config.openai_max_tokens,
    }
}

pub async fn check(
    config: &AppConfig,
    request: &CheckRequest,
) -> Result<Vec<CheckResult>, CheckError> {
    let client = Client::new();
    let url = format!("{}/v1/chat/completions", config.openai_base_url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", request.api_key))
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

    let body: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| CheckError::transport(PROVIDER, e))?;

    let answer = body
        .choices
        .first()
        .map(|choice| choice.message.content.clone())
        .ok_or(CheckError::EmptyResponse { provider: PROVIDER })?;

    extract::extract_results(&answer, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{ImageInput, Provider};

    fn sample_request() -> CheckRequest {
        CheckRequest {
            text: "本文テキスト".to_string(),
            images: vec![ImageInput::new(
                "image/png",
                "data:image/png;base64,aGVsbG8=",
            )],
            api_key: "sk-test".to_string(),
            provider: Provider::OpenAI,
        }
    }

    #[test]
    fn payload_keeps_the_full_data_uri() {
        let payload =
            serde_json::to_value(build_request(&AppConfig::default(), &sample_request())).unwrap();

        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["max_tokens"], 2000);

        let content = payload["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "text");
        assert!(content[0]["text"].as_str().unwrap().contains("本文テキスト"));

        // The one adapter that does NOT strip the prefix.
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/png;base64,aGVsbG8="
        );
    }

    #[test]
    fn http_error_carries_status_and_body() {
        let err = CheckError::Http {
            provider: PROVIDER,
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "{\"error\":{\"message\":\"Incorrect API key provided\"}}".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("openai"));
        assert!(message.contains("401"));
        assert!(message.contains("Incorrect API key provided"));
    }
}
