//! Normalization of `hoverResult` contents into the stored hover blob.
//!
//! LSIF emitters produce hover contents as a mix of bare markdown strings
//! and `{ "language", "value" }` code blocks. Both normalize to a
//! [`CodeHover`], and the list serializes to the JSON array the sidecar
//! entries embed verbatim.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Hover values are display-only; anything beyond this many characters is
/// cut and flagged rather than shipped to the client.
const MAX_VALUE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeHover {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Normalize one entry of a `hoverResult`'s `contents` array.
///
/// A bare JSON string is markdown documentation; anything else must be a
/// code-block object carrying at least a `value`.
pub fn normalize(content: &RawValue) -> serde_json::Result<CodeHover> {
    let mut hover = match serde_json::from_str::<String>(content.get()) {
        Ok(value) => CodeHover {
            value,
            language: None,
            truncated: false,
        },
        Err(_) => serde_json::from_str::<CodeHover>(content.get())?,
    };
    truncate(&mut hover);
    Ok(hover)
}

fn truncate(hover: &mut CodeHover) {
    if let Some((cut, _)) = hover.value.char_indices().nth(MAX_VALUE_CHARS) {
        hover.value.truncate(cut);
        hover.truncated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_str(json: &str) -> CodeHover {
        let raw: &RawValue = serde_json::from_str(json).unwrap();
        normalize(raw).unwrap()
    }

    #[test]
    fn bare_string_is_markdown() {
        let hover = normalize_str(r#""x int""#);
        assert_eq!(hover.value, "x int");
        assert_eq!(hover.language, None);
        assert!(!hover.truncated);
    }

    #[test]
    fn object_keeps_language() {
        let hover = normalize_str(r#"{"language":"go","value":"func main()"}"#);
        assert_eq!(hover.value, "func main()");
        assert_eq!(hover.language.as_deref(), Some("go"));
    }

    #[test]
    fn long_values_are_truncated_on_a_char_boundary() {
        let long = "\u{00e9}".repeat(600);
        let hover = normalize_str(&serde_json::to_string(&long).unwrap());
        assert!(hover.truncated);
        assert_eq!(hover.value.chars().count(), 500);
    }

    #[test]
    fn malformed_content_is_an_error() {
        let raw: &RawValue = serde_json::from_str("[1,2]").unwrap();
        assert!(normalize(raw).is_err());
    }
}
