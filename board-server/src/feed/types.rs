//! Staff feed response DTOs.
//!
//! These map directly to the `GetArrDepBoardWithDetails` staff API JSON.
//! Every per-service field is optional: the feed omits fields and sends
//! nulls interchangeably, and neither may fail a parse. Times arrive as
//! `YYYY-MM-DDTHH:MM:SS` strings with a `*Specified` companion flag.

use serde::Deserialize;

/// Top-level departure board response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationBoard {
    /// Human-readable name of the board's station.
    pub location_name: Option<String>,

    /// Network Rail communication messages (XHTML fragments).
    pub nrcc_messages: Option<Vec<NrccMessage>>,

    /// Services at this station.
    pub train_services: Option<Vec<TrainService>>,
}

/// One Network Rail message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NrccMessage {
    /// Message body, markup included.
    pub xhtml_message: Option<String>,
}

/// One service on the board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainService {
    /// Whether a scheduled departure time is present. A service without
    /// one terminates here (arrival-only).
    pub std_specified: Option<bool>,

    /// Scheduled departure time.
    pub std: Option<String>,

    /// Whether an estimated departure time is present.
    pub etd_specified: Option<bool>,

    /// Estimated departure time.
    pub etd: Option<String>,

    /// Platform number/letter.
    pub platform: Option<String>,

    /// Stable train identifier; the identity key across snapshots.
    #[serde(rename = "trainid")]
    pub train_id: Option<String>,

    /// Destination station(s); the first entry is displayed.
    pub destination: Option<Vec<EndpointLocation>>,

    /// Origin station(s); the first entry is displayed.
    pub origin: Option<Vec<EndpointLocation>>,

    /// Train operating company name.
    pub operator: Option<String>,

    /// Train length in coaches.
    pub length: Option<u64>,

    /// Whether this service is cancelled.
    pub is_cancelled: Option<bool>,

    /// Numeric cancellation reason code.
    pub cancel_reason: Option<ReasonField>,

    /// Numeric delay reason code.
    pub delay_reason: Option<ReasonField>,

    /// Free-text ad-hoc alerts.
    pub adhoc_alerts: Option<String>,

    /// Departure forecast type ("Forecast", "Actual", "Delayed", ...).
    pub departure_type: Option<String>,

    /// Formation details (only loading data is consumed).
    pub formation: Option<Formation>,

    /// Whether the service is suppressed from public boards.
    /// The feed's own spelling is "Supressed".
    #[serde(rename = "serviceIsSupressed")]
    pub service_is_suppressed: Option<bool>,

    /// Whether this is a passenger service.
    pub is_passenger_service: Option<bool>,

    /// Whether the platform should be hidden from displays.
    pub platform_is_hidden: Option<bool>,

    /// Stops already made.
    pub previous_locations: Option<Vec<CallingLocation>>,

    /// Stops still to come.
    pub subsequent_locations: Option<Vec<CallingLocation>>,
}

/// Numeric reason code wrapper (`{"Value": 501}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ReasonField {
    #[serde(rename = "Value")]
    pub value: Option<u64>,
}

/// Origin or destination entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointLocation {
    pub location_name: Option<String>,
}

/// A calling point in `previousLocations`/`subsequentLocations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallingLocation {
    pub location_name: Option<String>,

    /// The train passes without stopping.
    pub is_pass: Option<bool>,

    pub is_cancelled: Option<bool>,

    /// Scheduled/estimated/actual arrival, each with its presence flag.
    pub sta_specified: Option<bool>,
    pub sta: Option<String>,
    pub eta_specified: Option<bool>,
    pub eta: Option<String>,
    pub ata_specified: Option<bool>,
    pub ata: Option<String>,

    /// Scheduled/estimated/actual departure, each with its presence flag.
    pub std_specified: Option<bool>,
    pub std: Option<String>,
    pub etd_specified: Option<bool>,
    pub etd: Option<String>,
    pub atd_specified: Option<bool>,
    pub atd: Option<String>,

    /// Arrival confidence: "Actual" once the train has called.
    pub arrival_type: Option<String>,
}

/// Formation wrapper; only service loading is consumed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    pub service_loading: Option<ServiceLoading>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLoading {
    pub loading_percentage: Option<LoadingPercentage>,
}

/// Loading category and percentage.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadingPercentage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_station_board() {
        let json = r#"{
            "locationName": "London Kings Cross",
            "nrccMessages": [
                {"xhtmlMessage": "<p>Engineering works this weekend.</p>"}
            ],
            "trainServices": [
                {
                    "stdSpecified": true,
                    "std": "2025-06-23T10:30:00",
                    "etdSpecified": true,
                    "etd": "2025-06-23T10:34:00",
                    "platform": "4",
                    "trainid": "1A23",
                    "operator": "London North Eastern Railway",
                    "length": 9,
                    "destination": [{"locationName": "Edinburgh"}],
                    "origin": [{"locationName": "London Kings Cross"}],
                    "departureType": "Forecast",
                    "isPassengerService": true
                }
            ]
        }"#;

        let board: StationBoard = serde_json::from_str(json).unwrap();
        assert_eq!(board.location_name.as_deref(), Some("London Kings Cross"));

        let services = board.train_services.unwrap();
        assert_eq!(services.len(), 1);

        let svc = &services[0];
        assert_eq!(svc.train_id.as_deref(), Some("1A23"));
        assert_eq!(svc.std_specified, Some(true));
        assert_eq!(svc.std.as_deref(), Some("2025-06-23T10:30:00"));
        assert_eq!(svc.platform.as_deref(), Some("4"));
        assert_eq!(svc.length, Some(9));
        assert_eq!(
            svc.destination.as_ref().unwrap()[0].location_name.as_deref(),
            Some("Edinburgh")
        );
    }

    #[test]
    fn nulls_and_omissions_both_parse() {
        let json = r#"{
            "trainServices": [
                {
                    "stdSpecified": null,
                    "std": null,
                    "platform": null,
                    "trainid": "2C45",
                    "isCancelled": null
                }
            ]
        }"#;

        let board: StationBoard = serde_json::from_str(json).unwrap();
        let svc = &board.train_services.unwrap()[0];
        assert_eq!(svc.std_specified, None);
        assert_eq!(svc.platform, None);
        assert_eq!(svc.is_cancelled, None);
        assert_eq!(svc.etd_specified, None);
    }

    #[test]
    fn deserialize_cancelled_service_with_reason_code() {
        let json = r#"{
            "stdSpecified": true,
            "std": "2025-06-23T14:00:00",
            "trainid": "9Z99",
            "isCancelled": true,
            "cancelReason": {"Value": 501},
            "delayReason": {"Value": null}
        }"#;

        let svc: TrainService = serde_json::from_str(json).unwrap();
        assert_eq!(svc.is_cancelled, Some(true));
        assert_eq!(svc.cancel_reason.unwrap().value, Some(501));
        assert_eq!(svc.delay_reason.unwrap().value, None);
    }

    #[test]
    fn deserialize_calling_location() {
        let json = r#"{
            "locationName": "Peterborough",
            "isPass": false,
            "staSpecified": true,
            "sta": "2025-06-23T11:15:00",
            "ataSpecified": true,
            "ata": "2025-06-23T11:16:00",
            "arrivalType": "Actual"
        }"#;

        let loc: CallingLocation = serde_json::from_str(json).unwrap();
        assert_eq!(loc.location_name.as_deref(), Some("Peterborough"));
        assert_eq!(loc.is_pass, Some(false));
        assert_eq!(loc.ata.as_deref(), Some("2025-06-23T11:16:00"));
        assert_eq!(loc.arrival_type.as_deref(), Some("Actual"));
    }

    #[test]
    fn deserialize_loading() {
        let json = r#"{
            "formation": {
                "serviceLoading": {
                    "loadingPercentage": {"type": "Typical", "value": 45}
                }
            }
        }"#;

        let svc: TrainService = serde_json::from_str(json).unwrap();
        let loading = svc
            .formation
            .unwrap()
            .service_loading
            .unwrap()
            .loading_percentage
            .unwrap();
        assert_eq!(loading.kind.as_deref(), Some("Typical"));
        assert_eq!(loading.value, Some(45));
    }

    #[test]
    fn misspelled_suppressed_field_maps() {
        let json = r#"{"trainid": "1A23", "serviceIsSupressed": true}"#;
        let svc: TrainService = serde_json::from_str(json).unwrap();
        assert_eq!(svc.service_is_suppressed, Some(true));
    }
}
