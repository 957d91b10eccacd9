//! Recovers a JSON array of check results from free-form model output.
//!
//! Models are asked for a bare JSON array but in practice answer with the
//! array wrapped in a ```json fence, with prose around it, or (Gemini)
//! truncated mid-object when the output token limit is hit. This module
//! contains the one shared recovery routine, parameterized by a
//! tolerate-truncation flag enabled only for the provider known to truncate.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{assign_ids, CheckResult};
use crate::error::CheckError;

// Fenced ```json block. The strict form requires the closing fence; the
// tolerant form also accepts a fence running to end-of-input.
static FENCE_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n((?s:.)*?)\n```").unwrap());
static FENCE_TOLERANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n((?s:.)*?)(\n```|$)").unwrap());

// Bare array. Strict: first `[` through the last `]`. Tolerant: first `[`
// through end-of-input, so a truncated tail is still captured for repair.
static ARRAY_STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(?s:.)*\]").unwrap());
static ARRAY_TOLERANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(?s:.)*").unwrap());

/// Pull a `Vec<CheckResult>` out of raw model output and assign positional
/// ids (`result-0`, `result-1`, ...) regardless of any id the model chose.
///
/// An empty array is a successful, empty result list, not an error.
pub fn extract_results(
    raw: &str,
    tolerate_truncation: bool,
) -> Result<Vec<CheckResult>, CheckError> {
    let json_text = locate_json(raw, tolerate_truncation).ok_or_else(|| {
        CheckError::Extraction {
            raw: raw.to_string(),
        }
    })?;

    let results = match serde_json::from_str::<Vec<CheckResult>>(json_text) {
        Ok(results) => results,
        Err(parse_err) if tolerate_truncation => {
            let repaired = repair_truncated(json_text).ok_or(CheckError::Repair)?;
            log::warn!("model output looked truncated, salvaged the complete leading objects");
            serde_json::from_str::<Vec<CheckResult>>(&repaired).map_err(|_| parse_err)?
        }
        Err(parse_err) => return Err(parse_err.into()),
    };

    Ok(assign_ids(results))
}

fn locate_json(raw: &str, tolerate_truncation: bool) -> Option<&str> {
    if tolerate_truncation {
        if let Some(captures) = FENCE_TOLERANT.captures(raw) {
            return Some(captures.get(1).unwrap().as_str());
        }
        return ARRAY_TOLERANT.find(raw).map(|m| m.as_str());
    }
    if let Some(captures) = FENCE_STRICT.captures(raw) {
        return Some(captures.get(1).unwrap().as_str());
    }
    ARRAY_STRICT.find(raw).map(|m| m.as_str())
}

/// Cut a truncated array back to its last complete object.
///
/// Finds the last `},` boundary, drops everything after it and closes the
/// array. Known limitation carried over from the original tool: a literal
/// `},` inside a string value is indistinguishable from a real object
/// boundary and will mis-truncate.
fn repair_truncated(json_text: &str) -> Option<String> {
    let boundary = json_text.rfind("},")?;
    Some(format!("{}]", &json_text[..=boundary]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_is_unwrapped() {
        let raw = "```json\n[{\"type\":\"情報誤り\",\"severity\":\"high\",\"description\":\"date mismatch\"}]\n```";
        let results = extract_results(raw, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "result-0");
        assert_eq!(results[0].kind, "情報誤り");
        assert_eq!(results[0].severity, "high");
        assert_eq!(results[0].description, "date mismatch");
    }

    #[test]
    fn bare_array_with_surrounding_prose_is_found() {
        let raw = "チェック結果は以下の通りです。\n[{\"type\":\"誤字\",\"severity\":\"low\",\"description\":\"脱字あり\",\"location\":\"2段落目\"}]\n以上です。";
        let results = extract_results(raw, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location.as_deref(), Some("2段落目"));
    }

    #[test]
    fn empty_array_is_success_not_error() {
        for tolerant in [false, true] {
            let results = extract_results("```json\n[]\n```", tolerant).unwrap();
            assert!(results.is_empty());
        }
    }

    #[test]
    fn plain_prose_is_an_extraction_error_carrying_the_raw_text() {
        let raw = "問題は見つかりませんでした。";
        let err = extract_results(raw, false).unwrap_err();
        match err {
            CheckError::Extraction { raw: carried } => assert_eq!(carried, raw),
            other => panic!("expected Extraction, got {other:?}"),
        }
    }

    #[test]
    fn model_assigned_ids_are_overwritten_in_order() {
        let raw = r#"[
            {"id":"x","type":"誤字","severity":"high","description":"a"},
            {"id":"y","type":"レイアウト","severity":"medium","description":"b"},
            {"id":"z","type":"情報誤り","severity":"low","description":"c"}
        ]"#;
        let results = extract_results(raw, false).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["result-0", "result-1", "result-2"]);
        assert_eq!(results[1].description, "b");
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = "```json\n[{\"type\":\"誤字\",\"severity\":\"high\",\"description\":\"a\"}]\n```";
        let first = extract_results(raw, true).unwrap();
        let second = extract_results(raw, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn strict_mode_requires_a_closed_array() {
        let raw = "[{\"type\":\"誤字\",\"severity\":\"high\",\"description\":\"a\"},";
        let err = extract_results(raw, false).unwrap_err();
        assert!(matches!(err, CheckError::Extraction { .. }));
    }

    #[test]
    fn truncated_output_is_repaired_to_the_complete_leading_objects() {
        let raw = "[{\"type\":\"誤字\",\"severity\":\"high\",\"description\":\"a\"}, {\"type\":\"情報誤り\",\"severity\":\"low\",\"description\":\"text cut off";
        let results = extract_results(raw, true).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, "誤字");
        assert_eq!(results[0].id, "result-0");
    }

    #[test]
    fn truncated_fenced_output_is_repaired_too() {
        let raw = "```json\n[{\"type\":\"レイアウト\",\"severity\":\"medium\",\"description\":\"ずれ\"}, {\"type\":\"誤字";
        let results = extract_results(raw, true).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, "レイアウト");
    }

    #[test]
    fn truncation_with_no_complete_object_is_a_repair_error() {
        let raw = "[{\"type\":\"誤字\",\"description\":\"cut";
        let err = extract_results(raw, true).unwrap_err();
        assert!(matches!(err, CheckError::Repair));
    }

    #[test]
    fn malformed_json_in_strict_mode_is_a_parse_error() {
        let raw = "[{\"type\": }]";
        let err = extract_results(raw, false).unwrap_err();
        assert!(matches!(err, CheckError::Parse(_)));
    }

    #[test]
    fn missing_fields_pass_through_as_defaults() {
        // No schema validation: the model dropping fields or inventing
        // severities is surfaced to the renderer, not rejected here.
        let raw = r#"[{"severity":"urgent"}]"#;
        let results = extract_results(raw, false).unwrap();
        assert_eq!(results[0].severity, "urgent");
        assert_eq!(results[0].kind, "");
        assert_eq!(results[0].description, "");
    }
}
