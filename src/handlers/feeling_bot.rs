use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::feeling_bot::{FeelingBotDay, UpsertBotFeelingRequest};
use crate::AppState;

/// POST /api/v1/feeling-bot — upsert the day's bot-detected emotion.
/// Absent `day` means today; a repeated post for the same day overwrites.
pub async fn upsert_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertBotFeelingRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let sentimento = body.sentimento.trim();
    if sentimento.is_empty() {
        return Err(AppError::Validation("sentimento is required".into()));
    }

    let day = body.day.unwrap_or_else(|| Utc::now().date_naive());

    let entry = sqlx::query_as::<_, FeelingBotDay>(
        r#"
        INSERT INTO feeling_bot_days (id, user_id, day, sentimento, label)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, day) DO UPDATE
            SET sentimento = EXCLUDED.sentimento,
                label = EXCLUDED.label,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(day)
    .bind(sentimento)
    .bind(&body.label)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "feelings_bot": entry })),
    ))
}

/// GET /api/v1/feeling-bot — the user's bot check-ins, newest day first.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let entries = sqlx::query_as::<_, FeelingBotDay>(
        "SELECT * FROM feeling_bot_days WHERE user_id = $1 ORDER BY day DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({ "feelings_bot": entries })))
}

/// DELETE /api/v1/feeling-bot/{day} — remove a single day's entry.
pub async fn delete_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(day): Path<NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = sqlx::query(
        "DELETE FROM feeling_bot_days WHERE user_id = $1 AND day = $2",
    )
    .bind(auth_user.id)
    .bind(day)
    .execute(&state.db)
    .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "No bot feeling recorded for {}",
            day
        )));
    }

    let remaining = sqlx::query_as::<_, FeelingBotDay>(
        "SELECT * FROM feeling_bot_days WHERE user_id = $1 ORDER BY day DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "message": format!("Bot feeling for {} removed", day),
        "feelings_bot": remaining,
    })))
}

/// DELETE /api/v1/feeling-bot — remove the user's whole bot history.
pub async fn delete_all(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = sqlx::query("DELETE FROM feeling_bot_days WHERE user_id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "No bot feelings recorded for this user".into(),
        ));
    }

    Ok(Json(serde_json::json!({
        "message": "All bot feelings removed",
    })))
}
