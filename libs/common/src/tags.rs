//! Tag list normalization
//!
//! Tags travel in three shapes: a JSON array from API callers, a
//! comma-separated string typed into a form, and a text column holding a
//! JSON-encoded array. Older rows may hold plain comma text instead, so the
//! read path accepts both encodings. Every tag handed back to a caller is
//! trimmed and non-empty, and an empty result is reported as no tags.

use serde_json::Value;
use thiserror::Error;

/// A tag payload that is neither a list nor text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tags must be a list of strings or comma-separated text")]
pub struct InvalidTags;

/// Trim every tag and drop the blank ones
pub fn clean<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Split comma-separated form input into tags
pub fn split_input(text: &str) -> Option<Vec<String>> {
    non_empty(clean(text.split(',')))
}

/// Render tags back into the text a user edits
pub fn join_for_edit(tags: &[String]) -> String {
    tags.join(", ")
}

/// Normalize a tag value received in a request body
///
/// `null` and blank text mean "no tags"; arrays may hold strings, numbers
/// or booleans; anything else is rejected.
pub fn from_value(value: &Value) -> Result<Option<Vec<String>>, InvalidTags> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(split_input(text)),
        Value::Array(items) => {
            let tags = items
                .iter()
                .map(|item| scalar_text(item).ok_or(InvalidTags))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(non_empty(clean(tags)))
        }
        _ => Err(InvalidTags),
    }
}

/// Canonical stored form: a JSON array of strings
pub fn encode(tags: &[String]) -> String {
    Value::from(tags.to_vec()).to_string()
}

/// Decode a stored tag column
///
/// JSON arrays are the canonical encoding; text that does not parse as JSON
/// is treated as a legacy comma-separated list.
pub fn decode(stored: &str) -> Option<Vec<String>> {
    if stored.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(stored) {
        Ok(Value::Array(items)) => non_empty(clean(items.iter().filter_map(scalar_text))),
        Ok(Value::String(text)) => split_input(&text),
        Ok(Value::Null) => None,
        _ => split_input(stored),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty(tags: Vec<String>) -> Option<Vec<String>> {
    if tags.is_empty() { None } else { Some(tags) }
}
