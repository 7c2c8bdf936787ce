use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum post length, counted in Unicode scalar values.
pub const MAX_POST_CHARS: usize = 280;

/// Sanitised, validated post text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Sanitise and validate a raw request field.
    ///
    /// NUL characters are stripped and surrounding whitespace trimmed before
    /// the length checks run. All failures are collected, not just the first.
    pub fn parse(raw: Option<&Value>) -> Result<Self, PostTextError> {
        let text = match raw {
            None | Some(Value::Null) => {
                return Err(PostTextError::single("Post text is required", 0));
            }
            Some(Value::String(text)) => sanitize(text),
            Some(_) => {
                return Err(PostTextError::single("Post text must be a string", 0));
            }
        };

        let text_length = text.chars().count();
        let mut errors = Vec::new();

        if text.is_empty() {
            errors.push("Post text cannot be empty".to_string());
        }
        if text_length > MAX_POST_CHARS {
            errors.push(format!(
                "Post text exceeds {} character limit (current: {})",
                MAX_POST_CHARS, text_length
            ));
        }

        if errors.is_empty() {
            Ok(Self(text))
        } else {
            Err(PostTextError {
                errors,
                text_length,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the post.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Short prefix for log lines.
    pub fn preview(&self) -> String {
        const PREVIEW_CHARS: usize = 50;
        let mut preview: String = self.0.chars().take(PREVIEW_CHARS).collect();
        if self.char_count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        preview
    }
}

impl fmt::Display for PostText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize(text: &str) -> String {
    text.replace('\u{0}', "").trim().to_string()
}

/// Post text failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Post validation failed: {}", .errors.join(", "))]
pub struct PostTextError {
    pub errors: Vec<String>,
    pub text_length: usize,
}

impl PostTextError {
    fn single(message: &str, text_length: usize) -> Self {
        Self {
            errors: vec![message.to_string()],
            text_length,
        }
    }
}

/// A post accepted by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_text_is_trimmed() {
        let text = PostText::parse(Some(&json!("  hello world \n"))).unwrap();
        assert_eq!(text.as_str(), "hello world");
    }

    #[test]
    fn test_nul_characters_are_stripped() {
        let text = PostText::parse(Some(&json!("he\u{0}llo\u{0}"))).unwrap();
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn test_missing_text() {
        let err = PostText::parse(None).unwrap_err();
        assert_eq!(err.errors, vec!["Post text is required"]);

        let err = PostText::parse(Some(&Value::Null)).unwrap_err();
        assert_eq!(err.errors, vec!["Post text is required"]);
    }

    #[test]
    fn test_non_string_text() {
        let err = PostText::parse(Some(&json!(42))).unwrap_err();
        assert_eq!(err.errors, vec!["Post text must be a string"]);
    }

    #[test]
    fn test_blank_text() {
        let err = PostText::parse(Some(&json!("   \u{0} "))).unwrap_err();
        assert_eq!(err.errors, vec!["Post text cannot be empty"]);
        assert_eq!(err.text_length, 0);
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_POST_CHARS);
        assert!(PostText::parse(Some(&json!(at_limit))).is_ok());

        let too_long = "x".repeat(MAX_POST_CHARS + 1);
        let err = PostText::parse(Some(&json!(too_long))).unwrap_err();
        assert_eq!(err.text_length, 281);
        assert!(err.errors[0].contains("280 character limit"));
    }

    #[test]
    fn test_preview() {
        let short = PostText::parse(Some(&json!("short"))).unwrap();
        assert_eq!(short.preview(), "short");

        let long = PostText::parse(Some(&json!("a".repeat(60)))).unwrap();
        assert_eq!(long.preview(), format!("{}...", "a".repeat(50)));
    }
}
