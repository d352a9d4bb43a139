//! The replay stream: an external collaborator contract, not part of the
//! matcher itself (`SPEC_FULL.md` §4.5/§9 — "do not embed gap detection
//! in the matcher"). A [`ReplaySource`] yields a snapshot first, then a
//! sequence of messages, detecting gaps and resynchronizing from a
//! fresh snapshot when one is found.
//!
//! Grounded in `original_source/order_book/orderstream.py`'s
//! `orderstream` generator. [`FileReplaySource`] is a supplemental,
//! in-repository concrete implementation; the historical-data
//! download/reformat pipeline that produces its input files is an
//! explicit Non-goal (spec §1) and is not implemented here.

mod file_source;

pub use file_source::FileReplaySource;

use crate::market::{Message, Snapshot};

/// One item yielded by a [`ReplaySource`]: exactly one of a fresh
/// snapshot (always the first yield, and again after a resync) or a
/// sequenced message.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    Snapshot(Snapshot),
    Message { sequence: u64, message: Message },
}

/// Yields a sequence of `(message | none, snapshot | none)` pairs per
/// spec §4.5, modeled here as a single `ReplayEvent` enum instead of a
/// pair-of-options so the "exactly one is non-null" contract is a type
/// invariant rather than a runtime one.
///
/// Contract (spec §4.5, unchanged):
/// - The first yield is always a snapshot.
/// - Messages carry a monotonic `sequence`.
/// - If `sequence > prev_sequence + max_sequence_skip`, the source
///   emits the next available snapshot whose sequence is `>=` the
///   message's and resumes from it; the caller must clear its book and
///   refill from that snapshot before consuming further messages.
/// - Messages whose `sequence < snapshot.sequence` are skipped silently.
pub trait ReplaySource {
    type Error;

    /// Returns the next event, or `Ok(None)` once the source is
    /// exhausted.
    fn next_event(&mut self) -> Result<Option<ReplayEvent>, Self::Error>;
}
