use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::mood::Mood;

/// One mood check-in record per (user, calendar day). `mood_exit` stays
/// empty until the day's exit check-in happens; such a day is "pending".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feeling {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: NaiveDate,
    #[serde(rename = "sentimento_de_entrada")]
    pub mood_entry: Mood,
    #[serde(rename = "sentimento_de_saida")]
    pub mood_exit: Option<Mood>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EntryCheckinRequest {
    pub day: NaiveDate,
    #[serde(rename = "sentimento_de_entrada")]
    pub mood_entry: Mood,
}

#[derive(Debug, Deserialize)]
pub struct ExitCheckinRequest {
    pub day: NaiveDate,
    #[serde(rename = "sentimento_de_saida")]
    pub mood_exit: Mood,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(rename = "sentimento_de_entrada")]
    pub mood_entry: Mood,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExitRequest {
    #[serde(rename = "sentimento_de_saida")]
    pub mood_exit: Mood,
}

#[derive(Debug, Deserialize)]
pub struct FeelingQuery {
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
}

#[cfg(test)]
pub(crate) fn test_feeling(
    user_id: Uuid,
    day: &str,
    mood_entry: Mood,
    mood_exit: Option<Mood>,
) -> Feeling {
    let day: NaiveDate = day.parse().expect("test day must be YYYY-MM-DD");
    let created_at = day.and_hms_opt(8, 0, 0).expect("valid time").and_utc();
    Feeling {
        id: Uuid::new_v4(),
        user_id,
        day,
        mood_entry,
        mood_exit,
        created_at,
        updated_at: created_at,
    }
}
