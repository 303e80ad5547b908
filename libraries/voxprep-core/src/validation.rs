//! Size and duration gate for recorded samples
//!
//! A rejected sample is an expected outcome, so the validator reports it as
//! data instead of an error.

use crate::types::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking a sample against a [`ValidationPolicy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the sample passed every check
    pub valid: bool,
    /// Measured duration in seconds (0.0 when rejected before decode)
    pub duration_seconds: f64,
    /// Reason for rejection, absent when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    /// A passing result
    pub fn accepted(duration_seconds: f64) -> Self {
        Self {
            valid: true,
            duration_seconds,
            message: None,
        }
    }

    /// A failing result with a user-facing reason
    pub fn rejected(duration_seconds: f64, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            duration_seconds,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "rejected: {}", message),
            None => write!(f, "accepted ({:.1}s)", self.duration_seconds),
        }
    }
}

/// Applies a [`ValidationPolicy`] to a blob and its decoded duration
///
/// Checks run in order and the first failure wins:
/// 1. blob size against `min_size_bytes`
/// 2. duration against `min_duration_seconds`
/// 3. duration against `max_duration_seconds`
pub struct DurationValidator;

impl DurationValidator {
    /// Validate a blob and its decoded duration
    pub fn validate(
        blob: &[u8],
        decoded_duration_seconds: f64,
        policy: &ValidationPolicy,
    ) -> ValidationResult {
        if let Some(rejection) = Self::check_size(blob, policy) {
            return ValidationResult {
                duration_seconds: decoded_duration_seconds,
                ..rejection
            };
        }

        if decoded_duration_seconds < policy.min_duration_seconds() {
            tracing::debug!(
                duration = decoded_duration_seconds,
                min = policy.min_duration_seconds(),
                "Sample shorter than policy minimum"
            );
            return ValidationResult::rejected(
                decoded_duration_seconds,
                format!(
                    "Recording is too short ({:.1}s). Minimum duration is {}s.",
                    decoded_duration_seconds,
                    policy.min_duration_seconds()
                ),
            );
        }

        if decoded_duration_seconds > policy.max_duration_seconds() {
            tracing::debug!(
                duration = decoded_duration_seconds,
                max = policy.max_duration_seconds(),
                "Sample longer than policy maximum"
            );
            return ValidationResult::rejected(
                decoded_duration_seconds,
                format!(
                    "Recording is too long ({:.1}s). Maximum duration is {}s.",
                    decoded_duration_seconds,
                    policy.max_duration_seconds()
                ),
            );
        }

        ValidationResult::accepted(decoded_duration_seconds)
    }

    /// Run only the size check, before anything is decoded
    ///
    /// Returns `None` when the blob is large enough.
    pub fn check_size(blob: &[u8], policy: &ValidationPolicy) -> Option<ValidationResult> {
        let size = blob.len() as u64;
        if size < policy.min_size_bytes() {
            tracing::debug!(
                size,
                min = policy.min_size_bytes(),
                "Sample smaller than policy minimum"
            );
            return Some(ValidationResult::rejected(
                0.0,
                format!(
                    "Recording is too small ({} bytes, minimum {} bytes). Please record a longer sample.",
                    size,
                    policy.min_size_bytes()
                ),
            ));
        }
        None
    }
}
