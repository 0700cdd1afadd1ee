//! Delay and cancellation reason codes.
//!
//! The staff feed carries delay/cancel reasons as numeric codes; the
//! human-readable text comes from a separate reference feed that is
//! fetched once at startup. The table is immutable after loading.

use std::collections::HashMap;

use serde::Deserialize;

/// One record of the reason-code reference feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonCodeRecord {
    /// Numeric reason code.
    pub code: u64,

    /// Text to show when the code explains a delay.
    pub late_reason: Option<String>,

    /// Text to show when the code explains a cancellation.
    pub canc_reason: Option<String>,
}

#[derive(Debug, Clone)]
struct Reason {
    delay: String,
    cancel: String,
}

/// Immutable code → reason-text lookup.
///
/// An unknown code decodes to the empty string: absent reason text is
/// normal and must never break rendering.
#[derive(Debug, Clone, Default)]
pub struct ReasonCodeTable {
    reasons: HashMap<u64, Reason>,
}

impl ReasonCodeTable {
    /// Parse the reference feed and build the table.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<ReasonCodeRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Build the table from already-parsed records. A record missing its
    /// delay or cancel text gets "No Reason" for that side.
    pub fn from_records(records: Vec<ReasonCodeRecord>) -> Self {
        let reasons = records
            .into_iter()
            .map(|r| {
                (
                    r.code,
                    Reason {
                        delay: r.late_reason.unwrap_or_else(|| "No Reason".to_string()),
                        cancel: r.canc_reason.unwrap_or_else(|| "No Reason".to_string()),
                    },
                )
            })
            .collect();
        Self { reasons }
    }

    /// Delay-reason text for `code`, or `""` if the code is unknown.
    pub fn decode_delay(&self, code: u64) -> &str {
        self.reasons.get(&code).map(|r| r.delay.as_str()).unwrap_or("")
    }

    /// Cancellation-reason text for `code`, or `""` if the code is unknown.
    pub fn decode_cancel(&self, code: u64) -> &str {
        self.reasons.get(&code).map(|r| r.cancel.as_str()).unwrap_or("")
    }

    /// Number of codes in the table.
    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    /// Whether the table holds no codes.
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"[
        {"code": 100, "lateReason": "This train has been delayed by a broken down train",
         "cancReason": "A broken down train"},
        {"code": 501, "lateReason": "This train has been delayed by a fault with the signalling system",
         "cancReason": "A fault with the signalling system"},
        {"code": 900}
    ]"#;

    #[test]
    fn decodes_known_codes() {
        let table = ReasonCodeTable::from_json(FEED).unwrap();
        assert_eq!(
            table.decode_delay(100),
            "This train has been delayed by a broken down train"
        );
        assert_eq!(table.decode_cancel(501), "A fault with the signalling system");
    }

    #[test]
    fn unknown_code_decodes_to_empty() {
        let table = ReasonCodeTable::from_json(FEED).unwrap();
        assert_eq!(table.decode_delay(9999), "");
        assert_eq!(table.decode_cancel(0), "");
    }

    #[test]
    fn missing_text_defaults() {
        let table = ReasonCodeTable::from_json(FEED).unwrap();
        assert_eq!(table.decode_delay(900), "No Reason");
        assert_eq!(table.decode_cancel(900), "No Reason");
    }

    #[test]
    fn decoding_is_call_order_independent() {
        let table = ReasonCodeTable::from_json(FEED).unwrap();
        let first = table.decode_cancel(100).to_string();
        table.decode_delay(501);
        table.decode_delay(9999);
        assert_eq!(table.decode_cancel(100), first);
    }

    #[test]
    fn malformed_feed_is_an_error() {
        assert!(ReasonCodeTable::from_json("not json").is_err());
        assert!(ReasonCodeTable::from_json(r#"{"code": 1}"#).is_err());
    }

    #[test]
    fn len_and_empty() {
        let table = ReasonCodeTable::from_json(FEED).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert!(ReasonCodeTable::default().is_empty());
    }
}
