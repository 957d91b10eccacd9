//! Clipboard contract of the page-capture browser extension.
//!
//! The extension popup serializes the active tab's DOM plus a computed-style
//! map and puts `{html, css, url, title}` on the clipboard as JSON. This
//! module parses that blob and renders the text block that gets pasted into
//! the article-text input.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("clipboard does not contain capture JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `html` or `css` absent or empty: the extension has not captured a
    /// page yet. Reported to the user, not a hard failure.
    #[error("no page capture available, run the extension on the target page first")]
    NoCapture,
}

/// One captured page. `css` is itself a JSON-encoded per-element style map,
/// kept opaque here; the model reads it as text.
#[derive(Debug, Clone, Deserialize)]
pub struct PageCapture {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl PageCapture {
    pub fn from_json(raw: &str) -> Result<Self, CaptureError> {
        let capture: Self = serde_json::from_str(raw)?;
        if capture.html.is_empty() || capture.css.is_empty() {
            return Err(CaptureError::NoCapture);
        }
        Ok(capture)
    }

    /// The block the input collector pastes into the text box: source info,
    /// raw HTML, then the computed-style map.
    pub fn formatted_text(&self) -> String {
        format!(
            "【取得元】\nタイトル: {}\nURL: {}\n\n【HTML】\n{}\n\n【計算済みCSS】\n{}",
            self.title, self.url, self.html, self.css
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_capture_and_formats_the_text_block() {
        let raw = r#"{
            "html": "<html><body><h1>セール</h1></body></html>",
            "css": "{\"element-0\":{\"color\":\"rgb(0, 0, 0)\"}}",
            "url": "https://example.com/sale",
            "title": "サマーセール"
        }"#;
        let capture = PageCapture::from_json(raw).unwrap();
        let text = capture.formatted_text();
        assert!(text.starts_with("【取得元】\nタイトル: サマーセール\nURL: https://example.com/sale"));
        assert!(text.contains("【HTML】\n<html><body><h1>セール</h1></body></html>"));
        assert!(text.contains("【計算済みCSS】\n{\"element-0\""));
    }

    #[test]
    fn missing_html_or_css_means_no_capture() {
        let err = PageCapture::from_json(r#"{"url":"https://example.com","title":"x"}"#).unwrap_err();
        assert!(matches!(err, CaptureError::NoCapture));

        let err =
            PageCapture::from_json(r#"{"html":"<p></p>","css":"","title":"x"}"#).unwrap_err();
        assert!(matches!(err, CaptureError::NoCapture));
    }

    #[test]
    fn non_json_clipboard_is_malformed() {
        let err = PageCapture::from_json("ただのテキスト").unwrap_err();
        assert!(matches!(err, CaptureError::Malformed(_)));
    }
}
