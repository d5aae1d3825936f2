//! Verdict application.
//!
//! Pure point/rank bookkeeping: no I/O, no clock, no store access.

use roster::RosterEntry;

use crate::verdict::VerificationVerdict;

/// Apply a verdict to a roster entry.
///
/// A negative verdict returns the entry unchanged. A positive verdict
/// credits the awarded points and recomputes the rank tier. Points only
/// ever grow, so the tier never downgrades.
pub fn apply_verdict(entry: &RosterEntry, verdict: &VerificationVerdict) -> RosterEntry {
    if !verdict.is_valid {
        return entry.clone();
    }

    let mut updated = entry.clone();
    updated.add_points(verdict.awarded_points());
    updated
}
