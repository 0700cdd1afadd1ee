//! Unlocked board core.
//!
//! [`BoardState`] owns everything the public API publishes: the raw
//! snapshot, the ordering, the identity map, the three tier arenas and
//! the next-N selection. Every method here assumes the caller already
//! holds the board lock; `super::DepartureBoard` is the thin locked
//! wrapper, so the lock is acquired exactly once per call tree.
//!
//! Ingestion builds every replacement buffer before touching published
//! state, so a parse failure leaves the previous snapshot authoritative
//! and a reader can never observe a half-built snapshot.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::feed::{CallingLocation, EndpointLocation, NrccMessage, StationBoard, TrainService};
use crate::reasons::ReasonCodeTable;
use crate::sanitize;

use super::BoardConfig;
use super::error::BoardError;
use super::types::{
    AdditionalServiceInfo, BasicServiceInfo, CallingPoint, CallingPointsInfo, ServiceIndex,
    ServiceSequence,
};

/// Which calling-point list to derive from the raw snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Previous,
    Subsequent,
}

pub(crate) struct BoardState {
    // Configuration.
    max_services: usize,
    num_departures: usize,

    // Reference data, loaded once before the first ingestion.
    reasons: Option<ReasonCodeTable>,

    // Board metadata.
    location_name: String,
    nrcc_message: String,

    // The published snapshot: raw per-service DTOs plus the version they
    // were ingested under. Tiers re-read `snapshot` lazily on hydration.
    snapshot: Vec<TrainService>,
    version: u64,
    service_count: usize,

    // Tier arenas, all sized to `max_services`.
    sequence: Vec<ServiceSequence>,
    basic: Vec<BasicServiceInfo>,
    additional: Vec<AdditionalServiceInfo>,
    calling_points: Vec<CallingPointsInfo>,

    // Train id -> snapshot index, for identity migration.
    train_ids: HashMap<String, usize>,

    // All ingested services in effective-departure-time order.
    ordered: Vec<ServiceIndex>,

    // The next-N departures. Stale after publish or a platform change;
    // recomputed lazily by `ensure_selection`.
    selection: Vec<ServiceIndex>,
    selection_fresh: bool,
    platform_filter: Option<String>,

    // Number of raw-snapshot extraction passes, read by tests to prove
    // hydration idempotence.
    raw_extractions: u64,
}

impl BoardState {
    pub(crate) fn new(config: &BoardConfig) -> Self {
        BoardState {
            max_services: config.max_services,
            num_departures: config.num_departures,
            reasons: None,
            location_name: String::new(),
            nrcc_message: String::new(),
            snapshot: Vec::new(),
            version: 0,
            service_count: 0,
            sequence: vec![ServiceSequence::default(); config.max_services],
            basic: vec![BasicServiceInfo::default(); config.max_services],
            additional: vec![AdditionalServiceInfo::default(); config.max_services],
            calling_points: vec![CallingPointsInfo::default(); config.max_services],
            train_ids: HashMap::new(),
            ordered: Vec::new(),
            selection: vec![ServiceIndex::NONE; config.num_departures],
            selection_fresh: true,
            platform_filter: None,
            raw_extractions: 0,
        }
    }

    pub(crate) fn reasons_loaded(&self) -> bool {
        self.reasons.is_some()
    }

    /// Parse and install the reason-code table. Returns the code count.
    pub(crate) fn load_reason_codes(&mut self, json: &str) -> Result<usize, BoardError> {
        let table = ReasonCodeTable::from_json(json)?;
        let count = table.len();
        debug!(count, "reason codes loaded");
        self.reasons = Some(table);
        Ok(count)
    }

    /// Ingest one raw snapshot under a strictly newer version.
    ///
    /// Everything is built into fresh buffers and swapped in at the end;
    /// any failure before that point leaves published state untouched.
    pub(crate) fn ingest(&mut self, json: &str, version: u64) -> Result<(), BoardError> {
        if self.reasons.is_none() {
            return Err(BoardError::ReasonCodesNotLoaded);
        }
        if version <= self.version {
            return Err(BoardError::StaleVersion {
                proposed: version,
                published: self.version,
            });
        }

        let parsed: StationBoard = serde_json::from_str(json)?;
        let StationBoard {
            location_name,
            nrcc_messages,
            train_services,
        } = parsed;

        let mut services = train_services.unwrap_or_default();
        if services.len() > self.max_services {
            debug!(
                received = services.len(),
                keeping = self.max_services,
                "clamping snapshot to configured maximum"
            );
            services.truncate(self.max_services);
        }
        let service_count = services.len();

        let mut new_sequence = vec![ServiceSequence::default(); self.max_services];
        let mut new_basic = vec![BasicServiceInfo::default(); self.max_services];
        let mut new_additional = vec![AdditionalServiceInfo::default(); self.max_services];
        let mut new_points = vec![CallingPointsInfo::default(); self.max_services];
        let mut new_train_ids = HashMap::with_capacity(service_count);

        for (i, svc) in services.iter().enumerate() {
            let train_id = svc.train_id.clone().unwrap_or_default();

            let seq = &mut new_sequence[i];
            seq.train_id = train_id.clone();
            seq.platform = svc.platform.clone().unwrap_or_default();
            seq.version = version;
            // No valid scheduled time means the service terminates here:
            // arrival-only, never offered as a departure.
            if svc.std_specified.unwrap_or(false) {
                if let Some(scheduled) = parse_feed_time(svc.std.as_deref()) {
                    seq.scheduled = Some(scheduled);
                    if svc.etd_specified.unwrap_or(false) {
                        seq.estimated = parse_feed_time(svc.etd.as_deref());
                    }
                    seq.departure = seq.estimated.or(seq.scheduled);
                }
            }

            match self.train_ids.get(&train_id).copied() {
                Some(prev) if prev < self.service_count => {
                    // Identity migration: carry the cached tiers to the
                    // new position. Basic/Additional keep their stamps
                    // (judged against the new version at hydration);
                    // calling-point data is force-marked stale.
                    debug!(%train_id, from = prev, to = i, "migrating cached service");
                    new_basic[i] = self.basic[prev].clone();
                    new_additional[i] = self.additional[prev].clone();
                    let mut points = self.calling_points[prev].clone();
                    points.points_cached = false;
                    points.location_cached = false;
                    new_points[i] = points;
                }
                _ => {
                    debug!(%train_id, index = i, "new service, tiers unhydrated");
                    new_basic[i].train_id = train_id.clone();
                    new_additional[i].train_id = train_id.clone();
                    new_points[i].train_id = train_id.clone();
                }
            }

            new_train_ids.insert(train_id, i);
        }

        let ordered = order_departures(&new_sequence, service_count);
        let nrcc_message = join_nrcc(nrcc_messages);

        // Location only needs capturing once; the feed repeats it.
        let mut new_location = self.location_name.clone();
        if new_location.is_empty() {
            if let Some(name) = location_name {
                new_location = name;
            }
        }

        // Publish: one atomic swap of everything derived from the
        // snapshot, plus a selection reset so the next ordinal lookup
        // re-runs departure selection against the new ordering.
        self.snapshot = services;
        self.sequence = new_sequence;
        self.basic = new_basic;
        self.additional = new_additional;
        self.calling_points = new_points;
        self.train_ids = new_train_ids;
        self.ordered = ordered;
        self.version = version;
        self.service_count = service_count;
        self.location_name = new_location;
        self.nrcc_message = nrcc_message;
        self.selection = vec![ServiceIndex::NONE; self.num_departures];
        self.selection_fresh = false;

        debug!(version, services = service_count, "snapshot published");
        Ok(())
    }

    /// Rebuild the next-N selection from the current ordering and
    /// platform filter, then warm the headline tier for what it chose.
    pub(crate) fn refresh_selection(&mut self) -> Result<(), BoardError> {
        let mut selection = vec![ServiceIndex::NONE; self.num_departures];

        match &self.platform_filter {
            Some(platform) => {
                let mut slot = 0;
                for idx in &self.ordered {
                    if slot >= selection.len() {
                        break;
                    }
                    let Some(i) = idx.index() else { continue };
                    if self.sequence[i].platform == *platform {
                        // An arrival-only service at the platform leaves
                        // its slot empty; the ordering puts arrivals
                        // last, so no valid departure can follow it.
                        if self.sequence[i].departure.is_some() {
                            selection[slot] = *idx;
                        }
                        slot += 1;
                    }
                }
            }
            None => {
                for (slot, idx) in self.ordered.iter().take(self.num_departures).enumerate() {
                    if let Some(i) = idx.index() {
                        if self.sequence[i].departure.is_some() {
                            selection[slot] = *idx;
                        }
                    }
                }
            }
        }

        self.selection = selection;
        self.selection_fresh = true;

        for slot in 0..self.num_departures {
            if let Some(i) = self.selection[slot].index() {
                self.hydrate_basic(i)?;
            }
        }

        Ok(())
    }

    fn ensure_selection(&mut self) -> Result<(), BoardError> {
        if !self.selection_fresh {
            self.refresh_selection()?;
        }
        Ok(())
    }

    /// Index for the nth departure (1-based), or the sentinel when that
    /// slot has no service.
    pub(crate) fn ordinal_departure(&mut self, ordinal: usize) -> Result<ServiceIndex, BoardError> {
        if ordinal == 0 || ordinal > self.num_departures {
            return Err(BoardError::OrdinalOutOfRange {
                requested: ordinal,
                configured: self.num_departures,
            });
        }
        self.ensure_selection()?;
        Ok(self
            .selection
            .get(ordinal - 1)
            .copied()
            .unwrap_or(ServiceIndex::NONE))
    }

    pub(crate) fn basic_info(
        &mut self,
        index: ServiceIndex,
    ) -> Result<BasicServiceInfo, BoardError> {
        let Some(i) = index.index() else {
            debug!("basic info requested for the no-service sentinel");
            return Ok(BasicServiceInfo::null());
        };
        self.check_index(i)?;
        self.hydrate_basic(i)?;
        Ok(self.basic[i].clone())
    }

    pub(crate) fn additional_info(
        &mut self,
        index: ServiceIndex,
    ) -> Result<AdditionalServiceInfo, BoardError> {
        let Some(i) = index.index() else {
            debug!("additional info requested for the no-service sentinel");
            return Ok(AdditionalServiceInfo::null());
        };
        self.check_index(i)?;
        self.hydrate_additional(i)?;
        Ok(self.additional[i].clone())
    }

    /// Joined subsequent calling points, with or without per-stop times.
    /// Both strings are recomputed together on a miss so they can never
    /// diverge under the same version.
    pub(crate) fn calling_points(
        &mut self,
        index: ServiceIndex,
        with_times: bool,
    ) -> Result<String, BoardError> {
        let Some(i) = index.index() else {
            return Ok(String::new());
        };
        self.check_index(i)?;
        self.check_identity(i, "calling points")?;

        let info = &self.calling_points[i];
        if info.points_cached && info.points_version == self.version {
            return Ok(if with_times {
                info.calling_points_with_times.clone()
            } else {
                info.calling_points.clone()
            });
        }

        self.extract_calling_points(i, Direction::Subsequent);

        let mut plain = String::new();
        let mut with = String::new();
        let mut first = true;
        for stop in &self.calling_points[i].subsequent {
            if stop.is_pass {
                continue;
            }
            if !first {
                plain.push_str(", ");
                with.push(' ');
            }
            plain.push_str(&stop.location_name);
            if !stop.departure_time.is_empty() {
                with.push_str(&stop.location_name);
                with.push_str(" (");
                with.push_str(&stop.departure_time);
                with.push(')');
            }
            first = false;
        }

        let version = self.version;
        let info = &mut self.calling_points[i];
        info.calling_points = plain;
        info.calling_points_with_times = with;
        info.points_cached = true;
        info.points_version = version;

        Ok(if with_times {
            info.calling_points_with_times.clone()
        } else {
            info.calling_points.clone()
        })
    }

    /// "This service is between X and Y", derived from the previous
    /// calling points; `""` when the service starts at this station.
    pub(crate) fn service_location(&mut self, index: ServiceIndex) -> Result<String, BoardError> {
        let Some(i) = index.index() else {
            return Ok(String::new());
        };
        self.check_index(i)?;
        self.check_identity(i, "service location")?;

        let info = &self.calling_points[i];
        if info.location_cached && info.location_version == self.version {
            return Ok(info.service_location.clone());
        }

        self.extract_calling_points(i, Direction::Previous);

        let previous = &self.calling_points[i].previous;
        let stops: Vec<usize> = previous
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_pass)
            .map(|(pos, _)| pos)
            .collect();

        let location = if stops.is_empty() {
            String::new()
        } else {
            // Last stop the train has confirmedly called at; if it has
            // not reached any yet, fall back to the first recorded stop.
            let current = stops
                .iter()
                .rev()
                .find(|&&pos| previous[pos].arrival_type == "Actual")
                .copied()
                .unwrap_or(stops[0]);
            // First unconfirmed stop after it; none means the service is
            // approaching this board's station.
            let next = stops
                .iter()
                .find(|&&pos| pos > current && previous[pos].arrival_type != "Actual")
                .copied();

            let next_name = match next {
                Some(pos) => previous[pos].location_name.as_str(),
                None => self.location_name.as_str(),
            };
            format!(
                "This service is between {} and {}",
                previous[current].location_name, next_name
            )
        };

        let version = self.version;
        let info = &mut self.calling_points[i];
        info.service_location = location.clone();
        info.location_cached = true;
        info.location_version = version;

        Ok(location)
    }

    /// Platform for a service, `""` for the sentinel or out-of-range.
    pub(crate) fn platform(&self, index: ServiceIndex) -> String {
        match index.index() {
            Some(i) if i < self.service_count => self.sequence[i].platform.clone(),
            _ => String::new(),
        }
    }

    pub(crate) fn set_platform_filter(&mut self, platform: Option<String>) {
        self.platform_filter = platform;
        self.selection = vec![ServiceIndex::NONE; self.num_departures];
        self.selection_fresh = false;
    }

    pub(crate) fn platform_filter(&self) -> Option<String> {
        self.platform_filter.clone()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn service_count(&self) -> usize {
        self.service_count
    }

    pub(crate) fn num_departures(&self) -> usize {
        self.num_departures
    }

    pub(crate) fn location_name(&self) -> String {
        self.location_name.clone()
    }

    pub(crate) fn nrcc_message(&self) -> String {
        self.nrcc_message.clone()
    }

    pub(crate) fn raw_extractions(&self) -> u64 {
        self.raw_extractions
    }

    fn check_index(&self, index: usize) -> Result<(), BoardError> {
        if index >= self.service_count {
            return Err(BoardError::IndexOutOfRange {
                index,
                count: self.service_count,
            });
        }
        Ok(())
    }

    /// Fail loudly if the calling-points tier has drifted from the
    /// sequence at this index: that means identity migration corrupted
    /// the cache, never a recoverable condition.
    fn check_identity(&self, index: usize, what: &str) -> Result<(), BoardError> {
        let expected = &self.sequence[index].train_id;
        let cached = &self.calling_points[index].train_id;
        if cached != expected {
            tracing::error!(index, %expected, %cached, what, "tier identity mismatch");
            return Err(BoardError::TrainIdMismatch {
                index,
                expected: expected.clone(),
                cached: cached.clone(),
            });
        }
        Ok(())
    }

    /// Bring the Basic tier at `index` up to the published version.
    ///
    /// Static fields are computed once per train identifier; dynamic
    /// fields whenever the stamp disagrees with the published version.
    /// Idempotent: a second call under the same version does no raw
    /// extraction work.
    fn hydrate_basic(&mut self, index: usize) -> Result<(), BoardError> {
        let expected = &self.sequence[index].train_id;
        if self.basic[index].train_id != *expected {
            let cached = self.basic[index].train_id.clone();
            tracing::error!(index, %expected, %cached, "basic tier identity mismatch");
            return Err(BoardError::TrainIdMismatch {
                index,
                expected: expected.clone(),
                cached,
            });
        }

        if !self.basic[index].static_data_available {
            self.raw_extractions += 1;
            let svc = &self.snapshot[index];
            let scheduled_departure = time_display(svc.std.as_deref());
            let destination = first_location(&svc.destination);
            let operator = svc.operator.clone().unwrap_or_default();
            let coaches = match svc.length {
                Some(n) if n > 0 => n.to_string(),
                _ => String::new(),
            };

            let item = &mut self.basic[index];
            item.scheduled_departure = scheduled_departure;
            item.destination = destination;
            item.operator = operator;
            item.coaches = coaches;
            item.static_data_available = true;
        }

        if self.basic[index].version != self.version {
            self.raw_extractions += 1;
            let svc = &self.snapshot[index];
            let is_cancelled = svc.is_cancelled.unwrap_or(false);
            let cancel_code = svc.cancel_reason.as_ref().and_then(|r| r.value).unwrap_or(0);
            let delay_code = svc.delay_reason.as_ref().and_then(|r| r.value).unwrap_or(0);
            let adhoc_alerts = svc.adhoc_alerts.clone().unwrap_or_default();
            let etd_specified = svc.etd_specified.unwrap_or(false);
            let etd_display = time_display(svc.etd.as_deref());
            let is_marked_delayed = svc.departure_type.as_deref() == Some("Delayed");

            let (cancel_reason, delay_reason) = match &self.reasons {
                Some(table) => (
                    table.decode_cancel(cancel_code).to_string(),
                    table.decode_delay(delay_code).to_string(),
                ),
                None => (String::new(), String::new()),
            };

            let version = self.version;
            let item = &mut self.basic[index];
            item.is_cancelled = is_cancelled;
            item.cancel_reason = cancel_reason;
            item.delay_reason = delay_reason;
            item.adhoc_alerts = adhoc_alerts;

            // An estimate textually equal to the schedule reads as "On
            // Time" (literal comparison, no rounding tolerance). With no
            // estimate the status string stands in for the time, and a
            // "Delayed" departure type overrides it.
            item.estimated_departure = if etd_specified {
                if etd_display == item.scheduled_departure {
                    "On Time".to_string()
                } else {
                    etd_display
                }
            } else if is_cancelled {
                "Cancelled".to_string()
            } else {
                "On Time".to_string()
            };
            item.is_delayed = is_marked_delayed;
            if is_marked_delayed && !etd_specified {
                item.estimated_departure = "Delayed".to_string();
            }

            item.version = version;
        }

        Ok(())
    }

    /// Bring the Additional tier at `index` up to the published version.
    fn hydrate_additional(&mut self, index: usize) -> Result<(), BoardError> {
        let expected = &self.sequence[index].train_id;
        if self.additional[index].train_id != *expected {
            let cached = self.additional[index].train_id.clone();
            tracing::error!(index, %expected, %cached, "additional tier identity mismatch");
            return Err(BoardError::TrainIdMismatch {
                index,
                expected: expected.clone(),
                cached,
            });
        }

        if !self.additional[index].static_data_available {
            self.raw_extractions += 1;
            let svc = &self.snapshot[index];
            let origin = first_location(&svc.origin);
            let loading = svc
                .formation
                .as_ref()
                .and_then(|f| f.service_loading.as_ref())
                .and_then(|l| l.loading_percentage.as_ref());
            let loading_category = loading
                .and_then(|l| l.kind.clone())
                .unwrap_or_default();
            let loading_percentage = loading.and_then(|l| l.value).unwrap_or(0);
            let is_suppressed = svc.service_is_suppressed.unwrap_or(false);
            let is_passenger_service = svc.is_passenger_service.unwrap_or(false);

            let item = &mut self.additional[index];
            item.origin = origin;
            item.loading_category = loading_category;
            item.loading_percentage = loading_percentage;
            item.is_suppressed = is_suppressed;
            item.is_passenger_service = is_passenger_service;
            item.static_data_available = true;
        }

        if self.additional[index].version != self.version {
            self.raw_extractions += 1;
            let platform_is_hidden = self.snapshot[index].platform_is_hidden.unwrap_or(false);

            let version = self.version;
            let item = &mut self.additional[index];
            item.platform_is_hidden = platform_is_hidden;
            item.version = version;
        }

        Ok(())
    }

    /// Rebuild one calling-point list from the raw snapshot. Subsequent
    /// stops carry a best-available departure time (actual, else
    /// estimated, else scheduled); previous stops carry the arrival
    /// equivalent plus the arrival-confidence type.
    fn extract_calling_points(&mut self, index: usize, direction: Direction) {
        self.raw_extractions += 1;
        let svc = &self.snapshot[index];
        let locations: &[CallingLocation] = match direction {
            Direction::Subsequent => svc.subsequent_locations.as_deref().unwrap_or(&[]),
            Direction::Previous => svc.previous_locations.as_deref().unwrap_or(&[]),
        };

        let stops: Vec<CallingPoint> = locations
            .iter()
            .map(|loc| {
                let mut stop = CallingPoint {
                    location_name: loc.location_name.clone().unwrap_or_default(),
                    is_pass: loc.is_pass.unwrap_or(false),
                    is_cancelled: loc.is_cancelled.unwrap_or(false),
                    ..CallingPoint::default()
                };
                match direction {
                    Direction::Subsequent => {
                        stop.departure_time = if loc.atd_specified.unwrap_or(false) {
                            time_display(loc.atd.as_deref())
                        } else if loc.etd_specified.unwrap_or(false) {
                            time_display(loc.etd.as_deref())
                        } else if loc.std_specified.unwrap_or(false) {
                            time_display(loc.std.as_deref())
                        } else {
                            String::new()
                        };
                    }
                    Direction::Previous => {
                        stop.arrival_type = loc.arrival_type.clone().unwrap_or_default();
                        stop.arrival_time = if loc.ata_specified.unwrap_or(false) {
                            time_display(loc.ata.as_deref())
                        } else if loc.eta_specified.unwrap_or(false) {
                            time_display(loc.eta.as_deref())
                        } else if loc.sta_specified.unwrap_or(false) {
                            time_display(loc.sta.as_deref())
                        } else {
                            String::new()
                        };
                    }
                }
                stop
            })
            .collect();

        match direction {
            Direction::Subsequent => self.calling_points[index].subsequent = stops,
            Direction::Previous => self.calling_points[index].previous = stops,
        }
    }

    /// Test hook: corrupt a tier's stored train id to exercise the
    /// identity-violation path.
    #[cfg(test)]
    pub(crate) fn corrupt_basic_train_id(&mut self, index: usize, bogus: &str) {
        self.basic[index].train_id = bogus.to_string();
    }
}

/// Stable departure ordering: effective time ascending, arrival-only
/// services (no effective time) after every valid one, ties among those
/// by original index.
fn order_departures(sequence: &[ServiceSequence], count: usize) -> Vec<ServiceIndex> {
    let mut indices: Vec<usize> = (0..count).collect();
    indices.sort_by(|&a, &b| {
        match (sequence[a].departure, sequence[b].departure) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.cmp(&b)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(&b),
        }
    });
    indices.into_iter().map(ServiceIndex::new).collect()
}

/// Sanitize and pipe-join the NRCC messages.
fn join_nrcc(messages: Option<Vec<NrccMessage>>) -> String {
    let Some(messages) = messages else {
        return String::new();
    };
    let parts: Vec<String> = messages
        .into_iter()
        .filter_map(|m| m.xhtml_message)
        .map(|mut text| {
            sanitize::sanitize_in_place(&mut text);
            text
        })
        .collect();
    parts.join(" | ")
}

/// Parse a feed timestamp (`YYYY-MM-DDTHH:MM:SS`, anything after the
/// seconds ignored). `None` for absent or malformed values.
fn parse_feed_time(value: Option<&str>) -> Option<NaiveDateTime> {
    let value = value?.get(..19)?;
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

/// The `HH:MM` display slice of a feed timestamp, `""` when absent or
/// too short.
fn time_display(value: Option<&str>) -> String {
    value.and_then(|v| v.get(11..16)).unwrap_or("").to_string()
}

/// First location name of an origin/destination list, `""` when absent.
fn first_location(endpoints: &Option<Vec<EndpointLocation>>) -> String {
    endpoints
        .as_deref()
        .unwrap_or(&[])
        .first()
        .and_then(|e| e.location_name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_feed_time_variants() {
        assert!(parse_feed_time(Some("2025-06-23T10:30:00")).is_some());
        // Fractional seconds are ignored, not an error.
        assert!(parse_feed_time(Some("2025-06-23T10:30:00.123")).is_some());
        assert_eq!(parse_feed_time(Some("10:30")), None);
        assert_eq!(parse_feed_time(Some("")), None);
        assert_eq!(parse_feed_time(None), None);
    }

    #[test]
    fn time_display_slices_hhmm() {
        assert_eq!(time_display(Some("2025-06-23T10:30:00")), "10:30");
        assert_eq!(time_display(Some("short")), "");
        assert_eq!(time_display(None), "");
    }

    #[test]
    fn ordering_puts_arrivals_last() {
        let mk = |departure: Option<&str>| ServiceSequence {
            departure: departure.and_then(|d| parse_feed_time(Some(d))),
            ..ServiceSequence::default()
        };
        let sequence = vec![
            mk(None),
            mk(Some("2025-06-23T10:45:00")),
            mk(None),
            mk(Some("2025-06-23T10:15:00")),
        ];

        let ordered = order_departures(&sequence, 4);
        let indices: Vec<Option<usize>> = ordered.iter().map(|i| i.index()).collect();
        assert_eq!(indices, vec![Some(3), Some(1), Some(0), Some(2)]);
    }

    #[test]
    fn ordering_tie_breaks_by_index() {
        let mk = |departure: &str| ServiceSequence {
            departure: parse_feed_time(Some(departure)),
            ..ServiceSequence::default()
        };
        let sequence = vec![
            mk("2025-06-23T10:15:00"),
            mk("2025-06-23T10:15:00"),
            mk("2025-06-23T10:15:00"),
        ];

        let ordered = order_departures(&sequence, 3);
        let indices: Vec<Option<usize>> = ordered.iter().map(|i| i.index()).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn join_nrcc_sanitizes_and_joins() {
        let messages = vec![
            NrccMessage {
                xhtml_message: Some("<p>Engineering works.</p>Buses replace trains.".to_string()),
            },
            NrccMessage {
                xhtml_message: None,
            },
            NrccMessage {
                xhtml_message: Some("Check before travel &amp; allow time.\n".to_string()),
            },
        ];
        assert_eq!(
            join_nrcc(Some(messages)),
            "Buses replace trains. | Check before travel & allow time."
        );
        assert_eq!(join_nrcc(None), "");
    }
}
