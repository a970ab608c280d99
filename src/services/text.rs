//! Text extraction and display cleanup for upstream responses.
//!
//! The upstream body is loosely shaped: the generated text may sit in a flat
//! `output_text` field, in nested `output[].content[].text` fragments, or
//! nowhere at all. Extraction tries each strategy in order until one yields
//! non-empty text.

use serde_json::Value;

/// Successful upstream body with explicit presence accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    body: Value,
}

impl UpstreamResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Top-level `output_text`, when it is a string.
    pub fn output_text(&self) -> Option<&str> {
        self.body.get("output_text").and_then(Value::as_str)
    }

    /// Every string `text` of every `content` fragment of every `output` item, in order.
    ///
    /// Items without a `content` array and fragments without a string `text`
    /// are skipped.
    pub fn content_fragments(&self) -> impl Iterator<Item = &str> {
        self.body
            .get("output")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter_map(|fragment| fragment.get("text").and_then(Value::as_str))
    }
}

/// A named way of pulling text out of an upstream response.
pub type ExtractionStrategy = fn(&UpstreamResponse) -> Option<String>;

/// Extraction strategies, evaluated in order until one yields text.
pub const EXTRACTION_STRATEGIES: &[(&str, ExtractionStrategy)] = &[
    ("output_text", flat_output_text),
    ("output_content", nested_output_content),
];

/// The aggregated `output_text`, used verbatim if it has visible content.
fn flat_output_text(response: &UpstreamResponse) -> Option<String> {
    response
        .output_text()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// All content fragments joined by newlines, trimmed.
fn nested_output_content(response: &UpstreamResponse) -> Option<String> {
    let joined = response.content_fragments().collect::<Vec<_>>().join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extract the generated text, or an empty string when no strategy finds any.
///
/// An empty result is a valid answer, not an error.
pub fn extract_text(response: &UpstreamResponse) -> String {
    for (name, strategy) in EXTRACTION_STRATEGIES {
        if let Some(text) = strategy(response) {
            tracing::debug!(strategy = *name, chars = text.len(), "Extracted upstream text");
            return text;
        }
    }
    tracing::debug!("Upstream response contained no text");
    String::new()
}

/// Replacements applied in order to strip LaTeX math delimiters.
///
/// Order matters: the delimiters are removed as whole units before any
/// remaining `\\` collapses to `\`, otherwise `\(` could leave a stray
/// backslash behind.
pub const CLEANUP_RULES: &[(&str, &str)] = &[
    (r"\(", ""),
    (r"\)", ""),
    (r"\[", ""),
    (r"\]", ""),
    (r"\\", r"\"),
];

/// Apply [`CLEANUP_RULES`] to `text`.
///
/// # Examples
///
/// ```
/// use classroom_relay::services::text::clean_math_delimiters;
///
/// assert_eq!(clean_math_delimiters(r"3/4 \( apples \)"), "3/4  apples ");
/// ```
pub fn clean_math_delimiters(text: &str) -> String {
    CLEANUP_RULES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            acc.replace(pattern, replacement)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(body: Value) -> UpstreamResponse {
        UpstreamResponse::new(body)
    }

    #[test]
    fn test_output_text_preferred() {
        let r = response(json!({
            "output_text": "flat",
            "output": [{ "content": [{ "text": "nested" }] }]
        }));
        assert_eq!(extract_text(&r), "flat");
    }

    #[test]
    fn test_output_text_not_trimmed() {
        let r = response(json!({ "output_text": "  keep spacing \n" }));
        assert_eq!(extract_text(&r), "  keep spacing \n");
    }

    #[test]
    fn test_blank_output_text_falls_back() {
        let r = response(json!({
            "output_text": "   ",
            "output": [{ "content": [{ "text": "A" }, { "text": "B" }] }]
        }));
        assert_eq!(extract_text(&r), "A\nB");
    }

    #[test]
    fn test_nested_fragments_joined_and_trimmed() {
        let r = response(json!({
            "output": [
                { "content": [{ "text": "  A" }, { "type": "refusal" }, { "text": "B" }] },
                { "type": "reasoning" },
                { "content": [{ "text": "C  " }] }
            ]
        }));
        assert_eq!(extract_text(&r), "A\nB\nC");
    }

    #[test]
    fn test_non_string_fields_ignored() {
        let r = response(json!({
            "output_text": 12,
            "output": [{ "content": [{ "text": 5 }, { "text": "ok" }] }]
        }));
        assert_eq!(extract_text(&r), "ok");

        let r = response(json!({ "output": "not-an-array" }));
        assert_eq!(extract_text(&r), "");
    }

    #[test]
    fn test_no_text_anywhere_is_empty() {
        assert_eq!(extract_text(&response(json!({}))), "");
        assert_eq!(extract_text(&response(json!({ "output": [] }))), "");
        assert_eq!(
            extract_text(&response(json!({ "output": [{ "content": [{ "text": "  " }] }] }))),
            ""
        );
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = EXTRACTION_STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["output_text", "output_content"]);
    }

    #[test]
    fn test_cleanup_removes_inline_delimiters() {
        assert_eq!(clean_math_delimiters(r"3/4 \( apples \)"), "3/4  apples ");
    }

    #[test]
    fn test_cleanup_removes_display_delimiters() {
        assert_eq!(clean_math_delimiters(r"\[ x^2 + 1 \]"), " x^2 + 1 ");
    }

    #[test]
    fn test_cleanup_collapses_double_backslash() {
        assert_eq!(clean_math_delimiters(r"a \\ b"), r"a \ b");
        assert_eq!(clean_math_delimiters(r"\\\\"), r"\\");
    }

    #[test]
    fn test_cleanup_delimiters_before_backslash_collapse() {
        // `\\(` loses its `\(` first, leaving one backslash; collapsing first
        // would have produced `\(` and then removed it entirely.
        assert_eq!(clean_math_delimiters(r"\\("), r"\");
    }

    #[test]
    fn test_cleanup_leaves_plain_text() {
        assert_eq!(clean_math_delimiters("1/2 + 1/4 = 3/4"), "1/2 + 1/4 = 3/4");
        assert_eq!(clean_math_delimiters("(a) [b]"), "(a) [b]");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cleanup_never_grows_text(text in r"[a-z \\()\[\]]{0,64}") {
                prop_assert!(clean_math_delimiters(&text).len() <= text.len());
            }

            #[test]
            fn cleanup_is_identity_without_backslashes(text in "[^\\\\]{0,64}") {
                prop_assert_eq!(clean_math_delimiters(&text), text);
            }
        }
    }
}
