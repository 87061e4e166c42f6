use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::Mood;
use crate::models::trail::{Trail, TrailStep};
use crate::models::trail_execution::{RegisterExerciseRequest, TrailExecution, MOOD_SOURCES};
use crate::stats::trails::{resolve_next_exercise, trail_progress_overview, NextExercise};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub feeling: String,
}

/// Trail identity fields of the next-exercise payload.
#[derive(Debug, Serialize)]
pub struct TrailSummary {
    pub id: Uuid,
    #[serde(rename = "trailId")]
    pub trail_id: i32,
    pub code: String,
    pub nome: String,
}

#[derive(Debug, Serialize)]
pub struct LastExecutionView {
    #[serde(rename = "diaDaTrilha")]
    pub trail_day_index: i32,
    pub day: NaiveDate,
    #[serde(rename = "concluidoEm")]
    pub completed_at: DateTime<Utc>,
    #[serde(rename = "sentimentoDisparador", skip_serializing_if = "Option::is_none")]
    pub triggering_mood: Option<String>,
    #[serde(rename = "origemSentimento")]
    pub mood_source: String,
}

#[derive(Debug, Serialize)]
pub struct NextExerciseView {
    #[serde(rename = "diaDaTrilha")]
    pub trail_day_index: i32,
    pub step: TrailStep,
}

/// GET /api/v1/trails/next response shape; the dashboard's resume card
/// renders straight from it.
#[derive(Debug, Serialize)]
pub struct NextExerciseResponse {
    pub finished: bool,
    pub trail: Option<TrailSummary>,
    #[serde(rename = "lastExecution")]
    pub last_execution: Option<LastExecutionView>,
    #[serde(rename = "nextExercise")]
    pub next_exercise: Option<NextExerciseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn trail_summary(trail: &Trail) -> TrailSummary {
    TrailSummary {
        id: trail.id,
        trail_id: trail.trail_id,
        code: trail.code.clone(),
        nome: trail.name.clone(),
    }
}

fn last_execution_view(exec: &TrailExecution) -> LastExecutionView {
    LastExecutionView {
        trail_day_index: exec.trail_day_index,
        day: exec.day,
        completed_at: exec.completed_at,
        triggering_mood: exec.triggering_mood.clone(),
        mood_source: exec.mood_source.clone(),
    }
}

/// GET /api/v1/trails — the full catalog, ordered by short id.
pub async fn list_trails(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let trails = sqlx::query_as::<_, Trail>("SELECT * FROM trails ORDER BY trail_id ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "trails": trails })))
}

/// GET /api/v1/trails/id/{trailId} — lookup by the short numeric id.
pub async fn get_trail(
    State(state): State<AppState>,
    Path(trail_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let trail = sqlx::query_as::<_, Trail>("SELECT * FROM trails WHERE trail_id = $1")
        .bind(trail_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Trail not found".into()))?;

    Ok(Json(serde_json::json!({ "trail": trail })))
}

/// GET /api/v1/trails/obj/{id} — lookup by the catalog row's UUID.
pub async fn get_trail_by_uuid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let trail = sqlx::query_as::<_, Trail>("SELECT * FROM trails WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Trail not found".into()))?;

    Ok(Json(serde_json::json!({ "trail": trail })))
}

/// GET /api/v1/trails/progress — completion state of every catalog trail
/// for the current user.
pub async fn trail_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let executions = sqlx::query_as::<_, TrailExecution>(
        "SELECT * FROM trail_executions WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let catalog = sqlx::query_as::<_, Trail>("SELECT * FROM trails")
        .fetch_all(&state.db)
        .await?;

    let overview = trail_progress_overview(&executions, &catalog);
    Ok(Json(serde_json::json!({ "progress": overview })))
}

/// GET /api/v1/trails/recommendations?feeling=Label — trails tagged for
/// the given mood.
pub async fn recommend_trails(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let mood = Mood::parse(&query.feeling).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown feeling '{}'; expected one of: {}",
            query.feeling,
            Mood::ALL.map(Mood::label).join(", ")
        ))
    })?;

    let recommended = sqlx::query_as::<_, Trail>(
        "SELECT * FROM trails WHERE $1 = ANY(recommended_moods) ORDER BY trail_id ASC",
    )
    .bind(mood.label())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "feeling": mood.label(),
        "recommended": recommended,
    })))
}

/// POST /api/v1/trails/registro — record a completed trail step. Steps
/// must be completed strictly in order: the next valid index is always
/// one past the count of steps already done.
pub async fn register_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<RegisterExerciseRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let trail = match (body.trail_id, body.trail_uuid) {
        (Some(short_id), _) => {
            sqlx::query_as::<_, Trail>("SELECT * FROM trails WHERE trail_id = $1")
                .bind(short_id)
                .fetch_optional(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Trail trailId={} not found", short_id)))?
        }
        (None, Some(uuid)) => sqlx::query_as::<_, Trail>("SELECT * FROM trails WHERE id = $1")
            .bind(uuid)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trail id={} not found", uuid)))?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either trailId or trail_id is required".into(),
            ))
        }
    };

    let total_steps = trail.total_steps() as i32;
    if body.trail_day_index < 1 || body.trail_day_index > total_steps {
        return Err(AppError::Validation(format!(
            "diaDaTrilha must be between 1 and {}",
            total_steps
        )));
    }

    let mood_source = body.mood_source.unwrap_or_else(|| "bot".to_string());
    if !MOOD_SOURCES.contains(&mood_source.as_str()) {
        return Err(AppError::Validation(format!(
            "origemSentimento must be one of: {}",
            MOOD_SOURCES.join(", ")
        )));
    }

    // Sequential invariant: indices are assigned 1, 2, 3, ... with no gaps.
    let completed = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT trail_day_index) FROM trail_executions
        WHERE user_id = $1 AND trail_id = $2
        "#,
    )
    .bind(auth_user.id)
    .bind(trail.id)
    .fetch_one(&state.db)
    .await?;

    let expected = completed as i32 + 1;
    if body.trail_day_index != expected {
        return Err(AppError::Conflict(format!(
            "Out-of-order step: expected diaDaTrilha={}, got {}",
            expected, body.trail_day_index
        )));
    }

    let day = body.day.unwrap_or_else(|| Utc::now().date_naive());

    // The count check above races with concurrent registrations; the UNIQUE
    // (user_id, trail_id, trail_day_index) constraint is the backstop, so a
    // duplicate insert must surface as 409 rather than 500.
    let execution = sqlx::query_as::<_, TrailExecution>(
        r#"
        INSERT INTO trail_executions
            (id, user_id, trail_id, day, trail_day_index, triggering_mood, mood_source)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(trail.id)
    .bind(day)
    .bind(body.trail_day_index)
    .bind(&body.triggering_mood)
    .bind(&mood_source)
    .fetch_one(&state.db)
    .await
    .map_err(map_registro_insert_error)?;

    Ok(Json(serde_json::json!({ "registro": execution })))
}

fn map_registro_insert_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(
                "This trail step has already been registered".into(),
            );
        }
    }
    AppError::Database(err)
}

/// GET /api/v1/trails/next — resume point of the user's active trail.
pub async fn next_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<NextExerciseResponse>> {
    let executions = sqlx::query_as::<_, TrailExecution>(
        "SELECT * FROM trail_executions WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let catalog = sqlx::query_as::<_, Trail>("SELECT * FROM trails")
        .fetch_all(&state.db)
        .await?;

    let response = match resolve_next_exercise(&executions, &catalog) {
        NextExercise::NoActiveTrail => NextExerciseResponse {
            finished: false,
            trail: None,
            last_execution: None,
            next_exercise: None,
            message: Some("No active trail".into()),
        },
        NextExercise::Finished { trail, last } => NextExerciseResponse {
            finished: true,
            trail: Some(trail_summary(trail)),
            last_execution: Some(last_execution_view(last)),
            next_exercise: None,
            message: None,
        },
        NextExercise::InProgress {
            trail,
            last,
            next_index,
            step,
        } => NextExerciseResponse {
            finished: false,
            trail: Some(trail_summary(trail)),
            last_execution: Some(last_execution_view(last)),
            next_exercise: Some(NextExerciseView {
                trail_day_index: next_index,
                step: step.clone(),
            }),
            message: None,
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            if self.unique {
                "duplicate key value violates unique constraint"
            } else {
                "deadlock detected"
            }
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    #[test]
    fn test_duplicate_step_insert_maps_to_conflict() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: true }));
        assert!(matches!(
            map_registro_insert_error(err),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: false }));
        assert!(matches!(
            map_registro_insert_error(err),
            AppError::Database(_)
        ));
    }
}
