//! Per-service cache records.
//!
//! Each service in the current snapshot owns one entry in each of three
//! independently-hydrated tiers, plus a minimal ordering record. Tiers
//! carry a version stamp: a stamp equal to the published snapshot version
//! means fresh, anything else means recompute. The static subset of a
//! tier is computed once per train identifier and survives snapshot churn
//! via identity migration.

use std::fmt;

use chrono::NaiveDateTime;

/// Index of a service in the published snapshot, or the reserved
/// "no service" sentinel.
///
/// The tier vectors are pre-sized arenas; the sentinel is the out-of-band
/// value returned when an ordinal departure slot has no service to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceIndex(usize);

impl ServiceIndex {
    /// The "no service" sentinel.
    pub const NONE: ServiceIndex = ServiceIndex(usize::MAX);

    /// Wrap a real snapshot index.
    pub fn new(index: usize) -> Self {
        ServiceIndex(index)
    }

    /// Whether this is the sentinel.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// The underlying index, or `None` for the sentinel.
    pub fn index(self) -> Option<usize> {
        if self.is_none() { None } else { Some(self.0) }
    }
}

impl fmt::Display for ServiceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(i) => write!(f, "{i}"),
            None => f.write_str("none"),
        }
    }
}

/// Minimal ordering record, one per ingested service.
///
/// A `None` departure means the service is arrival-only (terminates at
/// the board's station): it is never offered as a departure and sorts
/// after every service with a valid time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSequence {
    /// Stable train identifier; the identity key across snapshots.
    pub train_id: String,

    /// Platform string, `""` when the feed omits it.
    pub platform: String,

    /// Scheduled departure time, if the feed specified one.
    pub scheduled: Option<NaiveDateTime>,

    /// Estimated departure time, if the feed specified one.
    pub estimated: Option<NaiveDateTime>,

    /// Effective departure time: estimated if specified, else scheduled;
    /// `None` for arrival-only services.
    pub departure: Option<NaiveDateTime>,

    /// Snapshot version this record was built from.
    pub version: u64,
}

/// Display tier 1: the headline row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicServiceInfo {
    pub train_id: String,

    // Static subset: computed once per train identifier.
    pub scheduled_departure: String,
    pub destination: String,
    pub operator: String,
    pub coaches: String,

    // Dynamic subset: recomputed when the stamp disagrees with the
    // published snapshot version.
    pub estimated_departure: String,
    pub is_cancelled: bool,
    pub is_delayed: bool,
    pub cancel_reason: String,
    pub delay_reason: String,
    pub adhoc_alerts: String,

    /// Snapshot version the dynamic subset was computed from.
    pub(crate) version: u64,

    /// Distinguishes "never computed" from "computed" for the static
    /// subset.
    pub(crate) static_data_available: bool,
}

impl BasicServiceInfo {
    /// The fixed record returned for the "no service" sentinel. Values
    /// are deliberately conspicuous so a renderer cannot mistake them
    /// for real data.
    pub fn null() -> Self {
        BasicServiceInfo {
            train_id: "9999".to_string(),
            scheduled_departure: "99:99".to_string(),
            destination: "Nowhere".to_string(),
            operator: "Nobody".to_string(),
            coaches: String::new(),
            estimated_departure: "99:99".to_string(),
            is_cancelled: false,
            is_delayed: false,
            cancel_reason: "Null Service - Cancellation Reason".to_string(),
            delay_reason: "Null Service - Delay Reason".to_string(),
            adhoc_alerts: String::new(),
            version: 0,
            static_data_available: true,
        }
    }
}

/// Display tier 2: secondary details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalServiceInfo {
    pub train_id: String,

    // Static subset.
    pub origin: String,
    pub loading_category: String,
    pub loading_percentage: u64,
    pub is_suppressed: bool,
    pub is_passenger_service: bool,

    // Dynamic subset.
    pub platform_is_hidden: bool,

    pub(crate) version: u64,
    pub(crate) static_data_available: bool,
}

impl AdditionalServiceInfo {
    /// The fixed record returned for the "no service" sentinel.
    pub fn null() -> Self {
        AdditionalServiceInfo {
            train_id: "9999".to_string(),
            origin: "Nowhere".to_string(),
            loading_category: "999".to_string(),
            loading_percentage: 99,
            is_suppressed: false,
            is_passenger_service: true,
            platform_is_hidden: false,
            version: 0,
            static_data_available: true,
        }
    }
}

/// One stop on a service's route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallingPoint {
    pub location_name: String,

    /// The train passes without stopping.
    pub is_pass: bool,

    pub is_cancelled: bool,

    /// Best-available arrival time (actual, else estimated, else
    /// scheduled), `""` when none. Previous stops only.
    pub arrival_time: String,

    /// Arrival confidence ("Actual" once the train has called).
    pub arrival_type: String,

    /// Best-available departure time. Subsequent stops only.
    pub departure_time: String,
}

/// Display tier 3: calling points and derived location strings.
///
/// The two joined strings share one freshness flag and stamp and are
/// always recomputed together, so they can never diverge under the same
/// version. The service-location string is cached independently. Both
/// caches are force-marked stale on identity migration: intermediate
/// stops change every poll even when the headline details do not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallingPointsInfo {
    pub train_id: String,

    pub previous: Vec<CallingPoint>,
    pub subsequent: Vec<CallingPoint>,

    /// Joined subsequent stops, pass-throughs excluded.
    pub calling_points: String,

    /// As above, each stop annotated with its best-available time.
    pub calling_points_with_times: String,

    pub(crate) points_cached: bool,
    pub(crate) points_version: u64,

    /// "This service is between X and Y", `""` when the service starts
    /// at the board's station.
    pub service_location: String,

    pub(crate) location_cached: bool,
    pub(crate) location_version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_round_trip() {
        assert!(ServiceIndex::NONE.is_none());
        assert_eq!(ServiceIndex::NONE.index(), None);

        let idx = ServiceIndex::new(4);
        assert!(!idx.is_none());
        assert_eq!(idx.index(), Some(4));
    }

    #[test]
    fn sentinel_display() {
        assert_eq!(ServiceIndex::new(2).to_string(), "2");
        assert_eq!(ServiceIndex::NONE.to_string(), "none");
    }

    #[test]
    fn null_records_are_conspicuous() {
        let basic = BasicServiceInfo::null();
        assert_eq!(basic.train_id, "9999");
        assert_eq!(basic.destination, "Nowhere");
        assert_eq!(basic.scheduled_departure, "99:99");
        assert!(basic.static_data_available);

        let additional = AdditionalServiceInfo::null();
        assert_eq!(additional.train_id, "9999");
        assert_eq!(additional.origin, "Nowhere");
        assert_eq!(additional.loading_percentage, 99);
    }

    #[test]
    fn default_tier_is_never_hydrated() {
        let basic = BasicServiceInfo::default();
        assert!(!basic.static_data_available);
        assert_eq!(basic.version, 0);

        let points = CallingPointsInfo::default();
        assert!(!points.points_cached);
        assert!(!points.location_cached);
    }
}
