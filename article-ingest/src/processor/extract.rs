//! Total field extractors over loosely typed JSON.
//!
//! None of these functions fail: a missing or mistyped value collapses to the
//! type's zero value, so a sparse payload still maps to a complete article.

use serde_json::Value;

/// Read a string value, or `""` for anything that is not a JSON string.
pub fn extract_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Read an integer value, or `0` for anything that is not a JSON number.
///
/// Floats truncate toward zero and unsigned values above `i64::MAX` saturate.
pub fn extract_int(value: &Value) -> i64 {
    let Value::Number(n) = value else {
        return 0;
    };

    if let Some(i) = n.as_i64() {
        i
    } else if let Some(u) = n.as_u64() {
        i64::try_from(u).unwrap_or(i64::MAX)
    } else {
        // `as` saturates at the bounds and maps NaN to zero
        n.as_f64().map(|f| f as i64).unwrap_or(0)
    }
}

/// Collect the tag strings at `tags.tags[*].tag`.
///
/// Returns `None` when `tags` or the inner `tags` array is absent or mistyped.
/// Entries that are not objects are skipped; an object without a string `tag`
/// contributes `""`. Order and duplicates are kept.
pub fn extract_tags(entry: &Value) -> Option<Vec<String>> {
    let list = entry.get("tags")?.get("tags")?.as_array()?;

    Some(
        list.iter()
            .filter(|item| item.is_object())
            .map(|item| extract_string(&item["tag"]))
            .collect(),
    )
}
