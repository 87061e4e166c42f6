use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One completed trail step. Immutable once written; `(user_id, trail_id,
/// trail_day_index)` is unique and indices are assigned sequentially from 1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TrailExecution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub trail_id: Uuid,
    pub day: NaiveDate,
    #[serde(rename = "diaDaTrilha")]
    pub trail_day_index: i32,
    #[serde(rename = "sentimentoDisparador", skip_serializing_if = "Option::is_none")]
    pub triggering_mood: Option<String>,
    #[serde(rename = "origemSentimento")]
    pub mood_source: String,
    #[serde(rename = "concluidoEm")]
    pub completed_at: DateTime<Utc>,
}

/// Where the triggering mood of an execution came from.
pub const MOOD_SOURCES: [&str; 4] = ["entrada", "saida", "bot", "manual"];

#[derive(Debug, Deserialize)]
pub struct RegisterExerciseRequest {
    pub day: Option<NaiveDate>,
    /// Short numeric trail id, the one the app uses.
    #[serde(rename = "trailId")]
    pub trail_id: Option<i32>,
    /// Catalog row UUID, accepted as an alternative to `trailId`.
    #[serde(rename = "trail_id")]
    pub trail_uuid: Option<Uuid>,
    #[serde(rename = "diaDaTrilha")]
    pub trail_day_index: i32,
    #[serde(rename = "sentimentoDisparador")]
    pub triggering_mood: Option<String>,
    #[serde(rename = "origemSentimento")]
    pub mood_source: Option<String>,
}

#[cfg(test)]
pub(crate) fn test_execution(
    user_id: Uuid,
    trail_id: Uuid,
    day: &str,
    trail_day_index: i32,
    triggering_mood: Option<&str>,
) -> TrailExecution {
    let day: NaiveDate = day.parse().expect("test day must be YYYY-MM-DD");
    TrailExecution {
        id: Uuid::new_v4(),
        user_id,
        trail_id,
        day,
        trail_day_index,
        triggering_mood: triggering_mood.map(str::to_string),
        mood_source: "bot".to_string(),
        completed_at: day.and_hms_opt(12, 0, 0).expect("valid time").and_utc(),
    }
}
