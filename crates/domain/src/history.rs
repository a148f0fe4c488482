//! Watering history — append-only records of watering and moisture events.

use serde::{Deserialize, Serialize};

use crate::id::HistoryEntryId;
use crate::time::Timestamp;

/// One append-only record in a pot's watering history.
///
/// Entries are never edited or reordered once appended. A plain watering
/// event carries `water_amount` and no reading; a moisture-check reply
/// carries `soil_moisture` and no applied amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: HistoryEntryId,
    /// When the event happened — not necessarily when it was appended.
    pub date: Timestamp,
    /// Soil-moisture reading, present only for moisture-check replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    /// Amount of water applied, present only for watering events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_amount: Option<f64>,
}

impl HistoryEntry {
    /// A watering event: `amount` applied at `date`.
    #[must_use]
    pub fn watering(amount: f64, date: Timestamp) -> Self {
        Self {
            id: HistoryEntryId::new(),
            date,
            soil_moisture: None,
            water_amount: Some(amount),
        }
    }

    /// A moisture-check reply: `value` observed at `date`.
    #[must_use]
    pub fn moisture(value: f64, date: Timestamp) -> Self {
        Self {
            id: HistoryEntryId::new(),
            date,
            soil_moisture: Some(value),
            water_amount: None,
        }
    }
}

/// Projection returned by the latest-moisture query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoistureReading {
    pub soil_moisture: f64,
    pub date: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_build_watering_entry_without_reading() {
        let entry = HistoryEntry::watering(250.0, now());
        assert_eq!(entry.water_amount, Some(250.0));
        assert!(entry.soil_moisture.is_none());
    }

    #[test]
    fn should_build_moisture_entry_without_amount() {
        let entry = HistoryEntry::moisture(42.5, now());
        assert_eq!(entry.soil_moisture, Some(42.5));
        assert!(entry.water_amount.is_none());
    }

    #[test]
    fn should_serialize_with_camel_case_keys() {
        let entry = HistoryEntry::moisture(30.0, now());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("soilMoisture").is_some());
        assert!(json.get("waterAmount").is_none());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let entry = HistoryEntry::watering(100.0, now());
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
