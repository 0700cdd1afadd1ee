//! The departure board cache.
//!
//! [`DepartureBoard`] is the shared, versioned cache of one station's
//! departure board. Snapshots from the staff feed are ingested whole
//! and replace the previous board atomically; the per-service display
//! tiers are hydrated lazily, on first read and whenever the published
//! version moves on.
//!
//! One [`std::sync::Mutex`] guards all state. Every public method
//! acquires it exactly once for its whole operation, so each call is
//! atomic with respect to concurrent ingestion.

mod error;
mod state;
mod types;


pub use error::BoardError;
pub use types::{
    AdditionalServiceInfo, BasicServiceInfo, CallingPoint, CallingPointsInfo, ServiceIndex,
    ServiceSequence,
};

use std::sync::{Mutex, MutexGuard, PoisonError};

use state::BoardState;

/// Capacity settings for a [`DepartureBoard`].
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Most services retained from any one snapshot; the rest are
    /// dropped at ingestion.
    pub max_services: usize,

    /// How many upcoming departures the selection tracks.
    pub num_departures: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            max_services: 10,
            num_departures: 3,
        }
    }
}

impl BoardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_services(mut self, max_services: usize) -> Self {
        self.max_services = max_services;
        self
    }

    pub fn with_num_departures(mut self, num_departures: usize) -> Self {
        self.num_departures = num_departures;
        self
    }
}

/// A station departure board, safe to share across threads.
pub struct DepartureBoard {
    state: Mutex<BoardState>,
}

impl DepartureBoard {
    pub fn new(config: BoardConfig) -> Self {
        DepartureBoard {
            state: Mutex::new(BoardState::new(&config)),
        }
    }

    // A poisoned lock means a panic elsewhere, not torn data: ingestion
    // only mutates published state after all fallible work, so the
    // state behind a poisoned lock is still coherent.
    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the reason-code reference table. Must happen before the
    /// first snapshot is ingested. Returns the number of codes loaded.
    pub fn load_reason_codes(&self, json: &str) -> Result<usize, BoardError> {
        self.state().load_reason_codes(json)
    }

    /// One-call bootstrap: load the reason-code table if not already
    /// loaded, then ingest the first snapshot.
    pub fn create_from_json(
        &self,
        departures_json: &str,
        reasons_json: &str,
        version: u64,
    ) -> Result<(), BoardError> {
        let mut state = self.state();
        if !state.reasons_loaded() {
            state.load_reason_codes(reasons_json)?;
        }
        state.ingest(departures_json, version)?;
        state.refresh_selection()
    }

    /// Ingest a raw snapshot under a strictly newer version, then
    /// recompute the departure selection and warm the headline tier for
    /// the selected services.
    ///
    /// On any error (stale version, parse failure) the previously
    /// published board remains fully readable.
    pub fn update(&self, json: &str, version: u64) -> Result<(), BoardError> {
        let mut state = self.state();
        state.ingest(json, version)?;
        state.refresh_selection()
    }

    /// Version of the currently published snapshot, 0 before the first.
    pub fn version(&self) -> u64 {
        self.state().version()
    }

    /// Number of services in the published snapshot.
    pub fn service_count(&self) -> usize {
        self.state().service_count()
    }

    /// The board's station name, captured from the first snapshot that
    /// carried one.
    pub fn location_name(&self) -> String {
        self.state().location_name()
    }

    /// All network messages for the station, sanitized to plain text
    /// and pipe-joined.
    pub fn nrcc_messages(&self) -> String {
        self.state().nrcc_message()
    }

    /// Headline details for a service. The sentinel index yields the
    /// fixed null record.
    pub fn basic_info(&self, index: ServiceIndex) -> Result<BasicServiceInfo, BoardError> {
        self.state().basic_info(index)
    }

    /// Secondary details for a service. The sentinel index yields the
    /// fixed null record.
    pub fn additional_info(
        &self,
        index: ServiceIndex,
    ) -> Result<AdditionalServiceInfo, BoardError> {
        self.state().additional_info(index)
    }

    /// Comma-joined subsequent calling points for a service, pass-
    /// throughs excluded. `with_times` annotates each stop with its
    /// best-available departure time. `""` for the sentinel.
    pub fn calling_points(
        &self,
        index: ServiceIndex,
        with_times: bool,
    ) -> Result<String, BoardError> {
        self.state().calling_points(index, with_times)
    }

    /// Human-readable position of an inbound service, `""` for the
    /// sentinel or a service starting at this station.
    pub fn service_location(&self, index: ServiceIndex) -> Result<String, BoardError> {
        self.state().service_location(index)
    }

    /// Platform for a service, `""` for the sentinel or out-of-range.
    pub fn platform(&self, index: ServiceIndex) -> String {
        self.state().platform(index)
    }

    /// Restrict the departure selection to one platform.
    pub fn set_platform(&self, platform: impl Into<String>) {
        self.state().set_platform_filter(Some(platform.into()));
    }

    /// Remove the platform restriction.
    pub fn clear_platform(&self) {
        self.state().set_platform_filter(None);
    }

    /// The platform the selection is currently restricted to, if any.
    pub fn selected_platform(&self) -> Option<String> {
        self.state().platform_filter()
    }

    /// Index of the nth upcoming departure (1-based), or the sentinel
    /// when fewer than n departures exist. Errors when `ordinal` is 0
    /// or beyond the configured selection size.
    pub fn ordinal_departure(&self, ordinal: usize) -> Result<ServiceIndex, BoardError> {
        self.state().ordinal_departure(ordinal)
    }

    /// Index of the next departure, or the sentinel.
    pub fn first_departure(&self) -> Result<ServiceIndex, BoardError> {
        self.ordinal_departure(1)
    }

    /// Index of the departure after next, or the sentinel.
    pub fn second_departure(&self) -> Result<ServiceIndex, BoardError> {
        self.ordinal_departure(2)
    }

    /// Index of the third upcoming departure, or the sentinel.
    pub fn third_departure(&self) -> Result<ServiceIndex, BoardError> {
        self.ordinal_departure(3)
    }

    /// How many departures the selection tracks.
    pub fn num_departures(&self) -> usize {
        self.state().num_departures()
    }

    #[cfg(test)]
    pub(crate) fn raw_extractions(&self) -> u64 {
        self.state().raw_extractions()
    }

    #[cfg(test)]
    pub(crate) fn corrupt_basic_train_id(&self, index: usize, bogus: &str) {
        self.state().corrupt_basic_train_id(index, bogus);
    }
}
