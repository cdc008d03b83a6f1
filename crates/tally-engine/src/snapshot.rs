//! State hashing and replay verification.
//!
//! A state's hash is the BLAKE3 digest of its canonical JSON encoding. Two
//! states with equal hashes are equal in every serialized field, which makes
//! the hash a cheap way to check that replaying a log reproduces the state
//! that was built up entry by entry.

use serde::{Deserialize, Serialize};
use tally_core::TallyError;

use crate::reconstruct::reconstruct;
use crate::state::GameState;

/// BLAKE3 hex digest of `state`'s JSON encoding.
pub fn state_hash(state: &GameState) -> Result<String, TallyError> {
    let json_bytes =
        serde_json::to_vec(state).map_err(|e| TallyError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

/// Outcome of [`verify_replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub entries_replayed: usize,
    /// Hash of the state as handed in.
    pub expected_hash: String,
    /// Hash of the state rebuilt from its log.
    pub actual_hash: String,
}

impl ReplayReport {
    /// `true` when the replay reproduced the state exactly.
    pub fn is_deterministic(&self) -> bool {
        self.expected_hash == self.actual_hash
    }
}

/// Rebuild `state` from its log and compare hashes.
///
/// # Errors
///
/// Propagates any replay error; a log that replays but produces a different
/// state is reported through [`ReplayReport::is_deterministic`] instead.
pub fn verify_replay(state: &GameState) -> Result<ReplayReport, TallyError> {
    let rebuilt = reconstruct(state)?;
    let report = ReplayReport {
        entries_replayed: rebuilt.log.len(),
        expected_hash: state_hash(state)?,
        actual_hash: state_hash(&rebuilt)?,
    };
    if !report.is_deterministic() {
        tracing::warn!(
            expected = %report.expected_hash,
            actual = %report.actual_hash,
            entries = report.entries_replayed,
            "replayed state diverges from the live state"
        );
    }
    Ok(report)
}
