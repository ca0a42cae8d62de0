// ==========================================
// Training Ingest - training domain model
// ==========================================
// Entities are identified by natural keys (region code, center code,
// program code + version, group code).
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

// ==========================================
// Region - regional office
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub region_code: i64, // natural key
    pub name: String,
}

// ==========================================
// TrainingCenter - training center
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCenter {
    pub center_code: i64, // natural key
    pub name: String,
    pub region_code: i64, // FK -> region
}

// ==========================================
// TrainingProgram - curriculum (code + version)
// ==========================================
// Roster ingestion creates it with zero hours; the DF-14 report fills
// the hours later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingProgram {
    pub program_code: i64, // composite key part 1
    pub version: i64,      // composite key part 2
    pub name: String,
    pub lecture_hours: i64,
    pub practical_hours: i64,
}

// ==========================================
// ProgramDuration - DF-14 hours update
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDuration {
    pub program_code: i64,
    pub version: i64,
    pub lecture_hours: Option<i64>,   // None keeps the stored value
    pub practical_hours: Option<i64>, // None keeps the stored value
}

// ==========================================
// CourseGroup - scheduled offering ("ficha")
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGroup {
    pub group_code: i64,   // natural key
    pub center_code: i64,  // FK -> training_center
    pub program_code: i64, // FK -> training_program (with version)
    pub version: i64,
    pub status: Option<String>,
    pub level_name: Option<String>,
    pub shift: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stage: String,
    pub modality: Option<String>,
    pub responsible_person: String,
    pub company_name: Option<String>,
    pub municipality: String,
    pub special_program_name: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub classroom_id: Option<i64>, // never written by ingestion
}

// ==========================================
// GroupOption - group search result (select / autocomplete)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOption {
    pub group_code: i64,
    pub status: Option<String>,
    pub shift: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stage: String,
    pub program_name: Option<String>, // None when the program row is missing
}

// ==========================================
// EnrollmentCounts - roster demographic aggregates
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCounts {
    pub group_code: i64,
    pub male_count: Option<i64>,
    pub female_count: Option<i64>,
    pub nonbinary_count: Option<i64>,
    pub total_count: Option<i64>,
    pub active_total_count: Option<i64>,
}

// ==========================================
// StatusCounts - DF-14 enrollment status aggregates
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub group_code: i64,
    pub capacity: Option<i64>,
    pub in_transit: Option<i64>,
    pub induction: Option<i64>,
    pub in_training: Option<i64>,
    pub conditioned: Option<i64>,
    pub deferred: Option<i64>,
    pub voluntary_withdrawal: Option<i64>,
    pub virtual_cancellation: Option<i64>,
    pub virtual_dropout: Option<i64>,
    pub cancelled: Option<i64>,
    pub pending_certification: Option<i64>,
    pub certified: Option<i64>,
    pub transferred: Option<i64>,
    pub other: Option<i64>,
}

// ==========================================
// GroupStatistics - persisted statistics row (read model)
// ==========================================
// Roster and DF-14 write disjoint column sets of the same row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub enrollment: EnrollmentCounts,
    pub status: StatusCounts,
}

// ==========================================
// GroupUpdate - partial update payload for a group
// ==========================================
// Only keys present in the request are applied. `classroom_id: null`
// clears the classroom; an omitted key leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub classroom_id: Option<Option<i64>>,
}

impl GroupUpdate {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none() && self.classroom_id.is_none()
    }
}

/// Distinguishes an explicit `null` from an omitted key.
fn present_value<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_update_distinguishes_null_from_missing() {
        let cleared: GroupUpdate = serde_json::from_str(r#"{"classroom_id": null}"#).unwrap();
        assert_eq!(cleared.classroom_id, Some(None));
        assert!(!cleared.is_empty());

        let untouched: GroupUpdate = serde_json::from_str(r#"{"start_time": "07:30:00"}"#).unwrap();
        assert_eq!(untouched.classroom_id, None);
        assert_eq!(
            untouched.start_time,
            Some(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_group_update_empty() {
        let update: GroupUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }
}
