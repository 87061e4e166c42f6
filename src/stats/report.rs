use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::feeling::Feeling;
use crate::models::trail::Trail;
use crate::models::trail_execution::TrailExecution;
use crate::stats::calendar::compute_activity;
use crate::stats::mood::{aggregate_moods, mood_series, MoodSeriesPoint};
use crate::stats::trails::{
    aggregate_trail_progress, MonthTrailBucket, MoodBucket, TrailBucket, TrailBucketDetailed,
};

/// Named date-window selector for a stats report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl Period {
    pub fn parse(value: &str) -> Option<Period> {
        match value {
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    /// Resolves the inclusive `[inicio, fim]` window relative to `today`.
    /// `week` is the ISO calendar week (Monday through Sunday) containing
    /// `today`; `all` is unbounded and reports both ends as null.
    pub fn window(self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            Period::Day => (Some(today), Some(today)),
            Period::Week => {
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (Some(monday), Some(monday + Duration::days(6)))
            }
            Period::Month => {
                let first = today.with_day(1).expect("day 1 always exists");
                let last = match first.with_month(first.month() + 1) {
                    Some(next_month) => next_month - Duration::days(1),
                    None => NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                        .expect("jan 1 always exists")
                        - Duration::days(1),
                };
                (Some(first), Some(last))
            }
            Period::Year => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1),
                NaiveDate::from_ymd_opt(today.year(), 12, 31),
            ),
            Period::All => (None, None),
        }
    }
}

/// The report consumed by the dashboard. Field names and nesting are the
/// chart contract; do not rename.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsReport {
    pub period: Period,
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
    #[serde(rename = "totalExercicios")]
    pub total_executions: i64,
    #[serde(rename = "totalTrilhas")]
    pub total_trails: i64,
    #[serde(rename = "diasAtivos")]
    pub active_days: i64,
    #[serde(rename = "totalCheckins")]
    pub total_checkins: i64,
    #[serde(rename = "longestStreakDays")]
    pub longest_streak_days: i64,
    #[serde(rename = "humorMedio")]
    pub mood_average: Option<f64>,
    #[serde(rename = "humorSamples")]
    pub mood_samples: i64,
    #[serde(rename = "porTrilha")]
    pub per_trail: Vec<TrailBucket>,
    #[serde(rename = "porTrilhaDetalhada")]
    pub per_trail_detailed: Vec<TrailBucketDetailed>,
    #[serde(rename = "porSentimento")]
    pub per_mood: Vec<MoodBucket>,
    #[serde(rename = "humorEvolucaoEntrada")]
    pub mood_series_entry: Vec<MoodSeriesPoint>,
    #[serde(rename = "humorEvolucaoSaida")]
    pub mood_series_exit: Vec<MoodSeriesPoint>,
    #[serde(rename = "porMesTrilha")]
    pub per_month_trail: Vec<MonthTrailBucket>,
}

/// Composes the calendar, mood and trail aggregators into one report.
/// Pure: the caller fetches the window's rows once and passes them in, so
/// two calls over the same rows produce identical output.
pub fn build_report(
    period: Period,
    inicio: Option<NaiveDate>,
    fim: Option<NaiveDate>,
    feelings: &[Feeling],
    executions: &[TrailExecution],
    catalog: &[Trail],
) -> StatsReport {
    let active_days: BTreeSet<NaiveDate> = feelings
        .iter()
        .map(|f| f.day)
        .chain(executions.iter().map(|e| e.day))
        .collect();
    let activity = compute_activity(&active_days);

    let moods = aggregate_moods(feelings);
    let (mood_series_entry, mood_series_exit) = mood_series(feelings);
    let progress = aggregate_trail_progress(executions, catalog);

    StatsReport {
        period,
        inicio,
        fim,
        total_executions: progress.total_executions,
        total_trails: progress.total_trails,
        active_days: activity.active_days,
        total_checkins: feelings.len() as i64,
        longest_streak_days: activity.longest_streak_days,
        mood_average: moods.average,
        mood_samples: moods.samples,
        per_trail: progress.per_trail,
        per_trail_detailed: progress.per_trail_detailed,
        per_mood: progress.per_mood,
        mood_series_entry,
        mood_series_exit,
        per_month_trail: progress.per_month_trail,
    }
}
