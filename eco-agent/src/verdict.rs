//! Verification verdict contract.
//!
//! The vision backend is asked to reply with ONLY a JSON object:
//! `{"is_valid": boolean, "points": number, "reason": "string"}`.
//! Models habitually wrap that object in a ` ```json ` fence, so the fence is
//! stripped before parsing. Anything else is a parse failure - a malformed
//! reply must never turn into a silent default verdict.

use serde::{Deserialize, Serialize};

use crate::backend::OracleError;

/// Instruction sent with every submitted photo.
pub const VERIFICATION_INSTRUCTION: &str = "Analyze this image. Is it a photo of a student \
disposing of plastic trash into a recycling bin? If yes, award points (10-50) based on the \
effort. Return ONLY a JSON object: {\"is_valid\": boolean, \"points\": number, \"reason\": \
\"string\"}";

/// Points awarded when the verdict omits the `points` field.
pub const DEFAULT_AWARD: u64 = 10;

/// Smallest award the contract permits.
pub const MIN_AWARD: u64 = 10;

/// Largest award the contract permits.
pub const MAX_AWARD: u64 = 50;

/// A parsed verification verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    /// Whether the photo shows a valid recycling action
    pub is_valid: bool,
    /// Awarded points, absent means the default award
    pub points: Option<u64>,
    /// The model's stated reason, shown to the student either way
    pub reason: String,
}

/// Raw wire shape; `points` stays untyped so a non-integer value can be
/// reported as a contract violation rather than a blanket parse error.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_valid: bool,
    points: Option<serde_json::Value>,
    reason: String,
}

impl VerificationVerdict {
    /// Parse a verdict from a backend's reply text.
    ///
    /// Strips an optional ` ```json ` fence first. Fails with
    /// [`OracleError::Parse`] on any shape mismatch (non-JSON text, missing
    /// `is_valid` or `reason`, an unclosed fence) and with
    /// [`OracleError::InvalidVerdict`] when `points` is present but not an
    /// integer in `[10, 50]`.
    pub fn parse(text: &str) -> Result<Self, OracleError> {
        let json = strip_fence(text)?;

        let raw: RawVerdict = serde_json::from_str(json)
            .map_err(|e| OracleError::Parse(format!("verdict JSON: {}", e)))?;

        let points = match raw.points {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => {
                let n = value.as_u64().ok_or_else(|| {
                    OracleError::InvalidVerdict(format!("points must be an integer, got {}", value))
                })?;
                if !(MIN_AWARD..=MAX_AWARD).contains(&n) {
                    return Err(OracleError::InvalidVerdict(format!(
                        "points {} outside [{}, {}]",
                        n, MIN_AWARD, MAX_AWARD
                    )));
                }
                Some(n)
            }
        };

        Ok(Self {
            is_valid: raw.is_valid,
            points,
            reason: raw.reason,
        })
    }

    /// Points to credit for this verdict.
    pub fn awarded_points(&self) -> u64 {
        self.points.unwrap_or(DEFAULT_AWARD)
    }
}

/// Extract the JSON payload, stripping a ` ```json ` fence when present.
fn strip_fence(text: &str) -> Result<&str, OracleError> {
    let trimmed = text.trim();

    match trimmed.split_once("```json") {
        Some((_, rest)) => {
            let inner = rest
                .split_once("```")
                .ok_or_else(|| OracleError::Parse("unclosed ```json fence".to_string()))?
                .0;
            Ok(inner.trim())
        }
        None => Ok(trimmed),
    }
}
