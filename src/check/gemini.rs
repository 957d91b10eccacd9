//! Google Gemini generateContent adapter.
//!
//! Two ways this one differs from the chat-style providers: the request is a
//! single contents/parts array instead of a message list, and the answer is
//! extracted tolerantly because gemini-2.5-flash is the provider observed to
//! truncate its output at the token limit.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{extract, CheckRequest, CheckResult};
use crate::config::AppConfig;
use crate::error::CheckError;

const PROVIDER: &str = "gemini";

const PROMPT: &str = "以下の本文（HTML/CSS含む）と画像を比較して、誤字・情報誤り・レイアウト崩れをチェックしてください。

【本文・HTML・CSS】
{TEXT}

【CSSルール】
- class=\"taglist\" の ul 要素内の li 要素について：
  * class=\"tag\" → グレー表示 = 「なし」を意味する
  * class=\"tag on\" → 色付き表示 = 「あり」を意味する
- 画像内の表示色（グレー/色付き）と、このCSSクラスが一致しているか必ず確認してください

【チェック項目】
1. 誤字・脱字
2. 本文と画像の情報の一致
3. CSSの色情報に基づく状態判定（例: 緑=あり、グレー=なし）
4. レイアウトの崩れ
5. 画像内に使用されている写真は適切か

【ルール】
 - チェックは本文を正とし、画像の情報に誤りがないか確認する
 - 本文情報自体の正誤やHTML、CSSのレイアウト崩れは判定しない（画像の正誤やレイアウト崩れのみチェックする）
 - 画像内のチェックはグレー＝なし/その他の色（オレンジや緑など）＝ありで判定
 - HTMLに「noimage.png」がある箇所は、不一致としてエラーにしない(現在チェックしている画像が入る予定の箇所のため)
 - 画像は本文の一部を省略・簡略化して表示する場合があります。
    以下のケースはエラーとして報告しないでください：
    1. 本文に詳細情報があるが、画像では省略されている
      例：本文「ギフトバック（有料）」→ 画像「ギフトバック」
      → これは正常です。エラーにしないでください。
    2. 本文に補足説明があるが、画像では記載されていない
      例：本文に括弧書きや注釈があるが、画像にはない
      → これは正常です。エラーにしないでください。

【画像内のチェックマークについて】
- 各項目は「チェックマーク + 項目名」のペアになっています
- 必ず「項目名の直前にあるチェックマーク」を参照してください
- 横並びの場合、項目名とチェックマークの位置関係を正確に判断してください

結果は以下のJSON形式のみで返してください（説明文は不要）：
[
  {
    \"type\": \"誤字\" | \"情報誤り\" | \"レイアウト\",
    \"severity\": \"high\" | \"medium\" | \"low\",
    \"description\": \"具体的な説明\",
    \"location\": \"場所（オプション）\",
    \"imageIndex\": 画像番号（オプション、0から始まる）
  }
]

問題がない場合は空の配列 [] を返してください。
必ずJSON配列のみを返し、前後に説明文を含めないでください。";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Image { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn build_request(config: &AppConfig, request: &CheckRequest) -> GeminiRequest {
    let mut parts = vec![Part::Text {
        text: PROMPT.replace("{TEXT}", &request.text),
    }];

    for image in &request.images {
        parts.push(Part::Image {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.base64_payload().to_string(),
            },
        });
    }

    GeminiRequest {
        contents: vec![GeminiContent { parts }],
        generation_config: GenerationConfig {
            max_output_tokens: config.gemini_max_output_tokens,
            temperature: config.gemini_temperature,
        },
    }
}

pub async fn check(
    config: &AppConfig,
    request: &CheckRequest,
) -> Result<Vec<CheckResult>, CheckError> {
    let client = Client::new();
    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.gemini_base_url, config.gemini_model, request.api_key
    );

    let response = client
        .post(&url)
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

    let body: GeminiResponse = response
        .json()
        .await
        .map_err(|e| CheckError::transport(PROVIDER, e))?;

    let answer = body
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.clone())
        .ok_or(CheckError::EmptyResponse { provider: PROVIDER })?;

    // Tolerant extraction: repair a response cut off at the token limit.
    extract::extract_results(&answer, true)
}
