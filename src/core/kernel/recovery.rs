use crate::core::errors::ErrorPayload;
use serde_json::Value;
use std::fmt;

/// Classes of rejection the retry ladder knows how to recover from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    InvalidTimestamp,
    InvalidSignature,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestamp => write!(f, "invalid timestamp"),
            Self::InvalidSignature => write!(f, "invalid signature"),
        }
    }
}

/// What the orchestrator does when a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Refresh the clock, rebuild with a fresh timestamp and retry
    ResyncAndRetry,
}

/// How a rule recognizes an error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMatcher {
    /// Numeric `code` field (also matches the same number sent as a string)
    Code(i64),
    /// String `code` field, exact match
    CodeStr(String),
    /// Case-insensitive substring of the `msg`/`message` field or raw text
    MessageContains(String),
}

impl ErrorMatcher {
    pub fn matches(&self, payload: &ErrorPayload) -> bool {
        match self {
            Self::Code(expected) => match payload.code() {
                Some(Value::Number(n)) => n.as_i64() == Some(*expected),
                Some(Value::String(s)) => s.parse::<i64>().ok() == Some(*expected),
                _ => false,
            },
            Self::CodeStr(expected) => {
                matches!(payload.code(), Some(Value::String(s)) if s == expected)
            }
            Self::MessageContains(needle) => payload
                .message()
                .is_some_and(|m| m.to_lowercase().contains(&needle.to_lowercase())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryRule {
    pub matcher: ErrorMatcher,
    pub class: ErrorClass,
    pub action: RecoveryAction,
}

/// Per-exchange mapping from error payloads to recovery actions.
///
/// Rules are checked in order; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryTable {
    rules: Vec<RecoveryRule>,
}

impl RecoveryTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, matcher: ErrorMatcher, class: ErrorClass) -> Self {
        self.rules.push(RecoveryRule {
            matcher,
            class,
            action: RecoveryAction::ResyncAndRetry,
        });
        self
    }

    pub fn classify(&self, payload: &ErrorPayload) -> Option<&RecoveryRule> {
        self.rules.iter().find(|rule| rule.matcher.matches(payload))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Bounds of the retry ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Window used from the second retry onwards
    pub widened_window: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            widened_window: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            widened_window: None,
        }
    }

    #[must_use]
    pub const fn with_widened_window(mut self, window: u64) -> Self {
        self.widened_window = Some(window);
        self
    }

    /// Window for a given 1-based attempt
    pub fn window_for_attempt(&self, attempt: u32, base: u64) -> u64 {
        match self.widened_window {
            Some(widened) if attempt >= 3 => widened.max(base),
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aster_table() -> RecoveryTable {
        RecoveryTable::new()
            .rule(ErrorMatcher::Code(-1021), ErrorClass::InvalidTimestamp)
            .rule(ErrorMatcher::Code(-1022), ErrorClass::InvalidSignature)
    }

    #[test]
    fn test_numeric_code_matches() {
        let payload = ErrorPayload::Json(json!({"code": -1022, "msg": "Signature invalid"}));
        let table = aster_table();
        let rule = table.classify(&payload).unwrap();
        assert_eq!(rule.class, ErrorClass::InvalidSignature);
    }

    #[test]
    fn test_string_code_matches_numeric_rule() {
        let payload = ErrorPayload::Json(json!({"code": "-1021"}));
        assert_eq!(
            aster_table().classify(&payload).map(|r| r.class),
            Some(ErrorClass::InvalidTimestamp)
        );
    }

    #[test]
    fn test_unknown_code_is_not_recoverable() {
        let payload = ErrorPayload::Json(json!({"code": -2010, "msg": "insufficient balance"}));
        assert!(aster_table().classify(&payload).is_none());
        assert!(aster_table()
            .classify(&ErrorPayload::Text("-1021".to_string()))
            .is_none());
    }

    #[test]
    fn test_message_match_is_case_insensitive() {
        let table = RecoveryTable::new().rule(
            ErrorMatcher::MessageContains("expired".to_string()),
            ErrorClass::InvalidTimestamp,
        );
        let payload = ErrorPayload::Json(json!({"code": "INVALID_CLIENT_REQUEST", "message": "Request has Expired"}));
        assert!(table.classify(&payload).is_some());
    }

    #[test]
    fn test_widened_window_applies_from_second_retry() {
        let policy = RetryPolicy::new(3).with_widened_window(60_000);
        assert_eq!(policy.window_for_attempt(1, 30_000), 30_000);
        assert_eq!(policy.window_for_attempt(2, 30_000), 30_000);
        assert_eq!(policy.window_for_attempt(3, 30_000), 60_000);
    }
}
