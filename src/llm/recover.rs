//! Recovery parsing for model output that is almost, but not quite, JSON.
//!
//! Applied only after a strict `serde_json` parse fails. Three repairs, in
//! order: strip markdown code fences, re-escape stray backslashes that are
//! not part of a valid JSON escape, and as a last resort cut the outermost
//! `{...}` or `[...]` span out of surrounding prose.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap()
    })
}

fn stray_backslash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A backslash not opening a valid JSON escape sequence.
    RE.get_or_init(|| Regex::new(r#"\\([^\\/"bfnrtu])"#).unwrap())
}

/// Parse loosely formatted model output into a JSON value.
pub fn clean_and_parse_json(raw: &str) -> Result<Value> {
    let unfenced = match fence_re().captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
        None => raw.trim(),
    };

    if let Ok(value) = serde_json::from_str(unfenced) {
        return Ok(value);
    }

    let repaired = stray_backslash_re().replace_all(unfenced, r"\\$1");
    if let Ok(value) = serde_json::from_str(&repaired) {
        debug!("parsed model output after backslash repair");
        return Ok(value);
    }

    if let Some(span) = outermost_json_span(&repaired) {
        if let Ok(value) = serde_json::from_str(span) {
            debug!("parsed model output after extracting embedded JSON");
            return Ok(value);
        }
    }

    Err(Error::Parse(format!(
        "model output is not valid JSON: {}",
        truncate(raw, 200)
    )))
}

/// The span from the first `{` to the last `}` (or `[`/`]`), whichever opens
/// first.
fn outermost_json_span(text: &str) -> Option<&str> {
    let obj = text.find('{').and_then(|start| {
        let end = text.rfind('}')?;
        (end > start).then_some((start, end))
    });
    let arr = text.find('[').and_then(|start| {
        let end = text.rfind(']')?;
        (end > start).then_some((start, end))
    });

    let (start, end) = match (obj, arr) {
        (Some(o), Some(a)) => {
            if o.0 < a.0 {
                o
            } else {
                a
            }
        }
        (Some(o), None) => o,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    Some(&text[start..=end])
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
