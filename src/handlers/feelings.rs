use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::feeling::{
    EntryCheckinRequest, ExitCheckinRequest, Feeling, FeelingQuery, UpdateEntryRequest,
    UpdateExitRequest,
};
use crate::AppState;

/// POST /api/v1/feelings/entrada — the day's entry check-in. Creates the
/// (user, day) record; the exit mood stays pending until the exit check-in.
pub async fn entry_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<EntryCheckinRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validate_day_not_future(body.day)?;

    let feeling = sqlx::query_as::<_, Feeling>(
        r#"
        INSERT INTO feelings (id, user_id, day, mood_entry)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, day) DO UPDATE
            SET mood_entry = EXCLUDED.mood_entry, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.day)
    .bind(body.mood_entry)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(serde_json::json!({ "feeling": feeling })))
}

/// POST /api/v1/feelings/saida — the day's exit check-in. When the exit
/// comes first the record is created with the entry mirroring it, matching
/// the schema requirement that every day has an entry mood.
pub async fn exit_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ExitCheckinRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validate_day_not_future(body.day)?;

    let feeling = sqlx::query_as::<_, Feeling>(
        r#"
        INSERT INTO feelings (id, user_id, day, mood_entry, mood_exit)
        VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT (user_id, day) DO UPDATE
            SET mood_exit = EXCLUDED.mood_exit, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.day)
    .bind(body.mood_exit)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(serde_json::json!({ "feeling": feeling })))
}

/// GET /api/v1/feelings?inicio&fim — the user's check-ins, newest day first.
pub async fn list_feelings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<FeelingQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let feelings = sqlx::query_as::<_, Feeling>(
        r#"
        SELECT * FROM feelings
        WHERE user_id = $1
          AND ($2::date IS NULL OR day >= $2)
          AND ($3::date IS NULL OR day <= $3)
        ORDER BY day DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(query.inicio)
    .bind(query.fim)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({ "feelings": feelings })))
}

/// PATCH /api/v1/feelings/entrada/{day} — update only, never creates.
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(day): Path<NaiveDate>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let feeling = sqlx::query_as::<_, Feeling>(
        r#"
        UPDATE feelings
        SET mood_entry = $3, updated_at = NOW()
        WHERE user_id = $1 AND day = $2
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(day)
    .bind(body.mood_entry)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No check-in recorded for that day".into()))?;

    Ok(Json(serde_json::json!({ "feeling": feeling })))
}

/// PATCH /api/v1/feelings/saida/{day} — update only, never creates.
pub async fn update_exit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(day): Path<NaiveDate>,
    Json(body): Json<UpdateExitRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let feeling = sqlx::query_as::<_, Feeling>(
        r#"
        UPDATE feelings
        SET mood_exit = $3, updated_at = NOW()
        WHERE user_id = $1 AND day = $2
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(day)
    .bind(body.mood_exit)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No check-in recorded for that day".into()))?;

    Ok(Json(serde_json::json!({ "feeling": feeling })))
}

/// Clients in timezones ahead of UTC can already be on the server's
/// "tomorrow" when they check in, so one day past today is still accepted.
const FUTURE_DAY_SLACK_DAYS: i64 = 1;

fn validate_day_not_future(day: NaiveDate) -> AppResult<()> {
    let today = Utc::now().date_naive();
    if day > today + chrono::Duration::days(FUTURE_DAY_SLACK_DAYS) {
        return Err(AppError::Validation(format!(
            "day cannot be more than {} day(s) ahead of today",
            FUTURE_DAY_SLACK_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_and_tomorrow_are_accepted() {
        let today = Utc::now().date_naive();
        assert!(validate_day_not_future(today).is_ok());
        assert!(validate_day_not_future(today + chrono::Duration::days(1)).is_ok());
    }

    #[test]
    fn test_beyond_the_slack_is_rejected() {
        let today = Utc::now().date_naive();
        let too_far = today + chrono::Duration::days(FUTURE_DAY_SLACK_DAYS + 1);
        match validate_day_not_future(too_far) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("ahead of today")),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}
