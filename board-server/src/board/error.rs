//! Board cache error types.
//!
//! Schema gaps (missing or null fields inside a service) are never
//! errors; they hydrate to documented defaults. Everything here is a
//! condition the caller must see: a failed parse leaves the previous
//! snapshot authoritative, an identity mismatch signals cache corruption,
//! and a stale version means an overlapping fetch lost the race.

/// Errors surfaced by [`super::DepartureBoard`].
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Malformed top-level JSON; the whole update is rejected and prior
    /// state is untouched.
    #[error("failed to parse feed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A real (non-sentinel) index beyond the current service count.
    #[error("service index {index} out of range ({count} services)")]
    IndexOutOfRange { index: usize, count: usize },

    /// A tier's stored train id disagrees with the sequence's train id at
    /// the same index: identity migration has corrupted the cache.
    #[error("train id mismatch at index {index}: sequence has {expected:?}, tier has {cached:?}")]
    TrainIdMismatch {
        index: usize,
        expected: String,
        cached: String,
    },

    /// The proposed snapshot version does not advance the published one.
    #[error("snapshot version {proposed} is not newer than published version {published}")]
    StaleVersion { proposed: u64, published: u64 },

    /// Ordinal departure request outside 1..=configured maximum.
    #[error("ordinal departure {requested} out of range (tracking {configured} departures)")]
    OrdinalOutOfRange { requested: usize, configured: usize },

    /// Departures were ingested before the reason-code table was loaded.
    #[error("reason codes must be loaded before ingesting departures")]
    ReasonCodesNotLoaded,
}
