//! Two-stage oracle response parser: unwrap, then parse strictly

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::model::CandidateRange;
use crate::error::{HighlightError, HighlightResult};

/// Per-entry parse result; invalid entries carry the reason they were dropped
pub type EntryOutcome = Result<CandidateRange, String>;

/// Remove markdown code fences around a model response.
///
/// A ```json fence wins over a bare ``` fence; text without fences is
/// returned trimmed.
pub fn strip_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();

    let fenced = if let Some((_, rest)) = trimmed.split_once("```json") {
        Some(rest)
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        Some(rest)
    } else {
        None
    };

    match fenced {
        Some(rest) => rest.split("```").next().unwrap_or(rest).trim(),
        None => trimmed,
    }
}

/// Parse an oracle response into one outcome per array entry.
///
/// Fails when the payload is not a JSON array or when no entry is usable.
pub fn parse_response(raw: &str) -> HighlightResult<Vec<EntryOutcome>> {
    let body = strip_wrapping(raw);

    let value: Value = serde_json::from_str(body).map_err(|e| HighlightError::OracleParse {
        message: format!("{} (response began: {:?})", e, preview(body)),
    })?;

    let entries = value.as_array().ok_or_else(|| HighlightError::OracleParse {
        message: "response is not a JSON array".to_string(),
    })?;

    let outcomes: Vec<EntryOutcome> = entries.iter().map(parse_entry).collect();

    for (index, outcome) in outcomes.iter().enumerate() {
        if let Err(reason) = outcome {
            warn!("Skipping oracle entry {}: {}", index, reason);
        }
    }

    let valid = outcomes.iter().filter(|o| o.is_ok()).count();
    if valid == 0 {
        return Err(HighlightError::OracleParse {
            message: format!("none of the {} entries is a valid range", entries.len()),
        });
    }

    info!("Oracle proposed {} ranges ({} well-formed)", entries.len(), valid);
    Ok(outcomes)
}

fn parse_entry(entry: &Value) -> EntryOutcome {
    let object = entry
        .as_object()
        .ok_or_else(|| "entry is not an object".to_string())?;

    let text_field = |key: &str| -> Result<String, String> {
        match object.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Value::String(_)) | None => Err(format!("missing {}", key)),
            Some(other) => Err(format!("{} must be a string, got {}", key, other)),
        }
    };

    let start_time = text_field("start_time")?;
    let end_time = text_field("end_time")?;

    let score = match object.get("score") {
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|s| (1..=10).contains(s))
            .ok_or_else(|| format!("score {} is not an integer in 1..=10", n))?,
        Some(other) => return Err(format!("score must be an integer, got {}", other)),
        None => return Err("missing score".to_string()),
    };

    let reason = match object.get("reason") {
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => String::new(),
        Some(other) => return Err(format!("reason must be a string, got {}", other)),
    };

    Ok(CandidateRange {
        start_time,
        end_time,
        score: score as u8,
        reason,
    })
}

fn preview(body: &str) -> String {
    body.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"[
        {"start_time": "00:00", "end_time": "00:45", "score": 9, "reason": "Opening scripture"},
        {"start_time": "05:20", "end_time": "06:15", "score": 10, "reason": "Core point"}
    ]"#;

    #[test]
    fn test_strip_wrapping_variants() {
        assert_eq!(strip_wrapping("  [1]  "), "[1]");
        assert_eq!(strip_wrapping("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_wrapping("Here you go:\n```\n[2]\n```\nThanks"), "[2]");
    }

    #[test]
    fn test_parse_plain_array() {
        let outcomes = parse_response(RESPONSE).unwrap();
        assert_eq!(outcomes.len(), 2);
        let first = outcomes[0].as_ref().unwrap();
        assert_eq!(first.start_time, "00:00");
        assert_eq!(first.score, 9);
        assert_eq!(first.reason, "Opening scripture");
    }

    #[test]
    fn test_parse_fenced_array() {
        let fenced = format!("```json\n{}\n```", RESPONSE);
        let outcomes = parse_response(&fenced).unwrap();
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[test]
    fn test_invalid_entries_are_tagged_not_fatal() {
        let raw = r#"[
            {"start_time": "00:00", "end_time": "00:45", "score": 9, "reason": "ok"},
            {"start_time": "00:50", "score": 7, "reason": "no end"},
            {"start_time": "01:00", "end_time": "01:30", "score": 11},
            {"start_time": "01:00", "end_time": "01:30", "score": 7.5},
            {"start_time": 60, "end_time": "01:30", "score": 7},
            "not an object",
            {"start_time": "02:00", "end_time": "02:40", "score": 3}
        ]"#;

        let outcomes = parse_response(raw).unwrap();
        let valid: Vec<&CandidateRange> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].reason, "");
        assert_eq!(outcomes.iter().filter(|o| o.is_err()).count(), 5);
    }

    #[test]
    fn test_non_array_is_parse_error() {
        let err = parse_response(r#"{"ranges": []}"#).unwrap_err();
        assert!(matches!(err, HighlightError::OracleParse { .. }));
    }

    #[test]
    fn test_prose_is_parse_error() {
        let err = parse_response("I could not find any highlights.").unwrap_err();
        assert!(matches!(err, HighlightError::OracleParse { .. }));
    }

    #[test]
    fn test_no_valid_entries_is_parse_error() {
        let err = parse_response(r#"[{"score": 4}]"#).unwrap_err();
        assert!(matches!(err, HighlightError::OracleParse { .. }));

        let err = parse_response("[]").unwrap_err();
        assert!(matches!(err, HighlightError::OracleParse { .. }));
    }
}
