use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::feeling::Feeling;
use crate::models::trail::Trail;
use crate::models::trail_execution::TrailExecution;
use crate::stats::report::{build_report, Period, StatsReport};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}

/// GET /api/v1/trails/stats?period= — the dashboard report. This handler
/// owns the report's only store round-trip: it resolves the window, fetches
/// the window's rows once and hands them to the pure aggregation core.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsReport>> {
    let raw = query.period.as_deref().unwrap_or("all");
    let period = Period::parse(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid period '{}'; expected day, week, month, year or all",
            raw
        ))
    })?;

    let today = Utc::now().date_naive();
    let (inicio, fim) = period.window(today);

    let feelings = sqlx::query_as::<_, Feeling>(
        r#"
        SELECT * FROM feelings
        WHERE user_id = $1
          AND ($2::date IS NULL OR day >= $2)
          AND ($3::date IS NULL OR day <= $3)
        ORDER BY day ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(inicio)
    .bind(fim)
    .fetch_all(&state.db)
    .await?;

    let executions = sqlx::query_as::<_, TrailExecution>(
        r#"
        SELECT * FROM trail_executions
        WHERE user_id = $1
          AND ($2::date IS NULL OR day >= $2)
          AND ($3::date IS NULL OR day <= $3)
        ORDER BY day ASC, trail_day_index ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(inicio)
    .bind(fim)
    .fetch_all(&state.db)
    .await?;

    let catalog = sqlx::query_as::<_, Trail>("SELECT * FROM trails")
        .fetch_all(&state.db)
        .await?;

    let report = build_report(period, inicio, fim, &feelings, &executions, &catalog);
    Ok(Json(report))
}
