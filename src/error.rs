//! Error types for the matching engine and its collaborators.
//!
//! The engine distinguishes three classes of failure (see `SPEC_FULL.md`
//! §7): benign no-ops are not represented as errors at all (they return a
//! sentinel outcome and log at `debug`), recoverable inconsistencies
//! (a replay sequence gap) surface as a re-emitted
//! [`crate::replay::ReplayEvent::Snapshot`] rather than an `Err` — the
//! caller reloads from it and resumes, there being nothing exceptional
//! to propagate — and there is no fatal class inside the engine itself;
//! I/O and parsing failures from the replay side live in [`ReplayError`].

use std::fmt;

/// Errors surfaced by a [`crate::replay::ReplaySource`] implementation.
/// These are collaborator-side concerns (I/O, malformed wire data) and
/// never originate inside the matcher.
#[derive(Debug)]
#[non_exhaustive]
pub enum ReplayError {
    Io {
        message: String,
        path: String,
    },
    Deserialization {
        message: String,
        path: String,
    },
    /// No snapshot file could be found to resolve a sequence gap.
    NoResyncSnapshot {
        after_sequence: u64,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Io { message, path } => {
                write!(f, "I/O error reading '{path}': {message}")
            }
            ReplayError::Deserialization { message, path } => {
                write!(f, "failed to parse '{path}': {message}")
            }
            ReplayError::NoResyncSnapshot { after_sequence } => write!(
                f,
                "no snapshot available to resync after sequence {after_sequence}"
            ),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Outcome of a `cancel` or `update` call. Unknown ids are a benign
/// no-op per `SPEC_FULL.md` §7/§9, not an error — but the caller may
/// still want to distinguish "nothing happened" from "it worked".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
}
