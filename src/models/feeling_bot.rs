use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One bot check-in per user per calendar day. `sentimento` is free text
/// from the external emotion classifier, deliberately not a `Mood` label.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct FeelingBotDay {
    #[serde(skip_serializing)]
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub day: NaiveDate,
    pub sentimento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertBotFeelingRequest {
    /// Defaults to today when absent.
    pub day: Option<NaiveDate>,
    pub sentimento: String,
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_hides_ids() {
        let entry = FeelingBotDay {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            day: NaiveDate::from_ymd_opt(2025, 10, 21).unwrap(),
            sentimento: "cansado".into(),
            label: Some("21/10/2025".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["day"], "2025-10-21");
        assert_eq!(json["sentimento"], "cansado");
        assert_eq!(json["label"], "21/10/2025");
        assert!(json.get("id").is_none());
        assert!(json.get("user_id").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_label_omitted_when_absent() {
        let entry = FeelingBotDay {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            day: NaiveDate::from_ymd_opt(2025, 10, 22).unwrap(),
            sentimento: "animado".into(),
            label: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("label").is_none());
    }
}
