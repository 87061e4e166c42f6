use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use uuid::Uuid;

use crate::models::trail::{Trail, TrailStep};
use crate::models::trail_execution::TrailExecution;

/// Per-trail execution count, keyed by the catalog row id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrailBucket {
    #[serde(rename = "_id")]
    pub trail_id: Uuid,
    #[serde(rename = "totalExercicios")]
    pub total_executions: i64,
}

/// Same grouping, enriched from the catalog. A join miss keeps the bucket
/// and just omits the enrichment fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrailBucketDetailed {
    #[serde(rename = "_id")]
    pub trail_id: Uuid,
    #[serde(rename = "totalExercicios")]
    pub total_executions: i64,
    #[serde(rename = "trailId", skip_serializing_if = "Option::is_none")]
    pub short_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Execution count per triggering mood; the null bucket collects
/// executions recorded without one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodBucket {
    #[serde(rename = "_id")]
    pub mood: Option<String>,
    #[serde(rename = "totalExercicios")]
    pub total_executions: i64,
}

/// Execution count per (month of year, trail), for monthly trend charts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTrailBucket {
    /// "01".."12"
    pub month: String,
    #[serde(rename = "trailId")]
    pub short_id: Option<i32>,
    #[serde(rename = "totalExercicios")]
    pub total_executions: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailProgress {
    pub total_executions: i64,
    pub total_trails: i64,
    pub per_trail: Vec<TrailBucket>,
    pub per_trail_detailed: Vec<TrailBucketDetailed>,
    pub per_mood: Vec<MoodBucket>,
    pub per_month_trail: Vec<MonthTrailBucket>,
}

/// Groups a window's executions by trail, triggering mood and month.
/// All groupings go through BTree maps so repeated reports over the same
/// rows serialize byte-identically.
pub fn aggregate_trail_progress(executions: &[TrailExecution], catalog: &[Trail]) -> TrailProgress {
    let by_uuid: BTreeMap<Uuid, &Trail> = catalog.iter().map(|t| (t.id, t)).collect();

    let mut per_trail: BTreeMap<Uuid, i64> = BTreeMap::new();
    let mut per_mood: BTreeMap<Option<String>, i64> = BTreeMap::new();
    let mut per_month: BTreeMap<(String, Uuid), i64> = BTreeMap::new();

    for exec in executions {
        *per_trail.entry(exec.trail_id).or_default() += 1;
        *per_mood.entry(exec.triggering_mood.clone()).or_default() += 1;

        let month = format!("{:02}", chrono::Datelike::month(&exec.day));
        *per_month.entry((month, exec.trail_id)).or_default() += 1;
    }

    let per_trail_detailed = per_trail
        .iter()
        .map(|(&trail_id, &total_executions)| {
            let trail = by_uuid.get(&trail_id);
            if trail.is_none() {
                tracing::warn!(%trail_id, "Execution references a trail missing from the catalog");
            }
            TrailBucketDetailed {
                trail_id,
                total_executions,
                short_id: trail.map(|t| t.trail_id),
                code: trail.map(|t| t.code.clone()),
                name: trail.map(|t| t.name.clone()),
            }
        })
        .collect();

    TrailProgress {
        total_executions: executions.len() as i64,
        total_trails: per_trail.len() as i64,
        per_trail: per_trail
            .iter()
            .map(|(&trail_id, &total_executions)| TrailBucket {
                trail_id,
                total_executions,
            })
            .collect(),
        per_trail_detailed,
        per_mood: per_mood
            .into_iter()
            .map(|(mood, total_executions)| MoodBucket {
                mood,
                total_executions,
            })
            .collect(),
        per_month_trail: per_month
            .into_iter()
            .map(|((month, trail_id), total_executions)| MonthTrailBucket {
                month,
                short_id: by_uuid.get(&trail_id).map(|t| t.trail_id),
                total_executions,
            })
            .collect(),
    }
}

/// Resume point for the user's active trail (the trail of their most
/// recent execution).
#[derive(Debug, Clone, PartialEq)]
pub enum NextExercise<'a> {
    /// No executions at all — distinct from having finished a trail.
    NoActiveTrail,
    Finished {
        trail: &'a Trail,
        last: &'a TrailExecution,
    },
    InProgress {
        trail: &'a Trail,
        last: &'a TrailExecution,
        next_index: i32,
        step: &'a TrailStep,
    },
}

/// Determines the next exercise of the active trail. Completed steps are
/// counted as DISTINCT indices rather than the max index, so a gap or
/// duplicate in the sequence (a data-integrity violation) degrades the
/// resume point instead of corrupting the report; the violation is logged.
pub fn resolve_next_exercise<'a>(
    executions: &'a [TrailExecution],
    catalog: &'a [Trail],
) -> NextExercise<'a> {
    let Some(last) = executions
        .iter()
        .max_by_key(|e| (e.completed_at, e.day, e.id))
    else {
        return NextExercise::NoActiveTrail;
    };

    let Some(trail) = catalog.iter().find(|t| t.id == last.trail_id) else {
        tracing::warn!(trail_id = %last.trail_id, "Active trail missing from the catalog");
        return NextExercise::NoActiveTrail;
    };

    let indices: BTreeSet<i32> = executions
        .iter()
        .filter(|e| e.trail_id == trail.id)
        .map(|e| e.trail_day_index)
        .collect();

    let completed = indices.len() as i32;
    let max_index = indices.iter().next_back().copied().unwrap_or(0);
    if max_index != completed {
        tracing::warn!(
            trail_id = %trail.id,
            completed,
            max_index,
            "Trail execution indices have a gap; resuming from the distinct count"
        );
    }

    if completed as usize >= trail.total_steps() {
        return NextExercise::Finished { trail, last };
    }

    let next_index = completed + 1;
    match trail.step(next_index) {
        Some(step) => NextExercise::InProgress {
            trail,
            last,
            next_index,
            step,
        },
        None => {
            tracing::warn!(
                trail_id = %trail.id,
                next_index,
                "Trail catalog has no step at the resume position"
            );
            NextExercise::NoActiveTrail
        }
    }
}

/// Per-catalog-trail completion state for the trail overview screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrailProgressEntry {
    #[serde(rename = "trailId")]
    pub short_id: i32,
    pub code: String,
    pub nome: String,
    #[serde(rename = "totalDias")]
    pub total_steps: i32,
    #[serde(rename = "diasConcluidos")]
    pub completed_steps: i32,
    #[serde(rename = "progressPercent")]
    pub percent: i32,
    pub status: &'static str,
}

/// One entry per catalog trail, in `trailId` order, whether or not the
/// user has started it. Completed steps are distinct indices, consistent
/// with [`resolve_next_exercise`].
pub fn trail_progress_overview(
    executions: &[TrailExecution],
    catalog: &[Trail],
) -> Vec<TrailProgressEntry> {
    let mut by_trail: BTreeMap<Uuid, BTreeSet<i32>> = BTreeMap::new();
    for exec in executions {
        by_trail
            .entry(exec.trail_id)
            .or_default()
            .insert(exec.trail_day_index);
    }

    let mut entries: Vec<TrailProgressEntry> = catalog
        .iter()
        .map(|trail| {
            let total = trail.total_steps() as i32;
            let completed = by_trail
                .get(&trail.id)
                .map(|indices| indices.len() as i32)
                .unwrap_or(0)
                .min(total);
            let percent = if total > 0 {
                (completed * 100) / total
            } else {
                0
            };
            let status = if completed == 0 {
                "not_started"
            } else if completed < total {
                "in_progress"
            } else {
                "completed"
            };
            TrailProgressEntry {
                short_id: trail.trail_id,
                code: trail.code.clone(),
                nome: trail.name.clone(),
                total_steps: total,
                completed_steps: completed,
                percent,
                status,
            }
        })
        .collect();

    entries.sort_by_key(|e| e.short_id);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trail::test_trail;
    use crate::models::trail_execution::test_execution;

    fn catalog() -> Vec<Trail> {
        vec![
            test_trail(5, "TRILHA_CINCO", 7),
            test_trail(9, "TRILHA_NOVE", 3),
        ]
    }

    #[test]
    fn test_empty_window() {
        let progress = aggregate_trail_progress(&[], &catalog());
        assert_eq!(progress, TrailProgress::default());
    }

    #[test]
    fn test_per_trail_counts_sum_to_total() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, Some("Ansiedade")),
            test_execution(user, cat[0].id, "2025-10-02", 2, Some("Ansiedade")),
            test_execution(user, cat[1].id, "2025-11-02", 1, None),
        ];

        let progress = aggregate_trail_progress(&executions, &cat);
        assert_eq!(progress.total_executions, 3);
        assert_eq!(progress.total_trails, 2);
        let summed: i64 = progress.per_trail.iter().map(|b| b.total_executions).sum();
        assert_eq!(summed, progress.total_executions);
    }

    #[test]
    fn test_detailed_buckets_join_the_catalog() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![test_execution(user, cat[0].id, "2025-10-01", 1, None)];

        let progress = aggregate_trail_progress(&executions, &cat);
        let bucket = &progress.per_trail_detailed[0];
        assert_eq!(bucket.short_id, Some(5));
        assert_eq!(bucket.code.as_deref(), Some("TRILHA_CINCO"));
        assert_eq!(bucket.name.as_deref(), Some("Trilha 5"));
    }

    #[test]
    fn test_join_miss_keeps_the_bucket() {
        let user = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let executions = vec![test_execution(user, unknown, "2025-10-01", 1, None)];

        let progress = aggregate_trail_progress(&executions, &catalog());
        assert_eq!(progress.total_executions, 1);
        let bucket = &progress.per_trail_detailed[0];
        assert_eq!(bucket.trail_id, unknown);
        assert_eq!(bucket.short_id, None);
        assert_eq!(bucket.code, None);
    }

    #[test]
    fn test_null_mood_bucket() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, Some("Estresse")),
            test_execution(user, cat[0].id, "2025-10-02", 2, None),
        ];

        let progress = aggregate_trail_progress(&executions, &cat);
        assert!(progress
            .per_mood
            .iter()
            .any(|b| b.mood.is_none() && b.total_executions == 1));
        assert!(progress
            .per_mood
            .iter()
            .any(|b| b.mood.as_deref() == Some("Estresse") && b.total_executions == 1));
    }

    #[test]
    fn test_monthly_buckets() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[0].id, "2025-10-20", 2, None),
            test_execution(user, cat[0].id, "2025-11-03", 3, None),
        ];

        let progress = aggregate_trail_progress(&executions, &cat);
        assert_eq!(
            progress.per_month_trail,
            vec![
                MonthTrailBucket {
                    month: "10".into(),
                    short_id: Some(5),
                    total_executions: 2
                },
                MonthTrailBucket {
                    month: "11".into(),
                    short_id: Some(5),
                    total_executions: 1
                },
            ]
        );
    }

    #[test]
    fn test_next_exercise_mid_trail() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[0].id, "2025-10-02", 2, None),
            test_execution(user, cat[0].id, "2025-10-03", 3, None),
        ];

        match resolve_next_exercise(&executions, &cat) {
            NextExercise::InProgress {
                trail, next_index, step, ..
            } => {
                assert_eq!(trail.trail_id, 5);
                assert_eq!(next_index, 4);
                assert_eq!(step.ordem, 4);
            }
            other => panic!("expected InProgress, got {:?}", other),
        }
    }

    #[test]
    fn test_next_exercise_finished() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[1].id, "2025-10-01", 1, None),
            test_execution(user, cat[1].id, "2025-10-02", 2, None),
            test_execution(user, cat[1].id, "2025-10-03", 3, None),
        ];

        match resolve_next_exercise(&executions, &cat) {
            NextExercise::Finished { trail, last } => {
                assert_eq!(trail.trail_id, 9);
                assert_eq!(last.trail_day_index, 3);
            }
            other => panic!("expected Finished, got {:?}", other),
        }
    }

    #[test]
    fn test_no_executions_means_no_active_trail() {
        assert_eq!(
            resolve_next_exercise(&[], &catalog()),
            NextExercise::NoActiveTrail
        );
    }

    #[test]
    fn test_active_trail_is_the_most_recent_one() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[1].id, "2025-10-05", 1, None),
        ];

        match resolve_next_exercise(&executions, &cat) {
            NextExercise::InProgress { trail, next_index, .. } => {
                assert_eq!(trail.trail_id, 9);
                assert_eq!(next_index, 2);
            }
            other => panic!("expected InProgress on trail 9, got {:?}", other),
        }
    }

    #[test]
    fn test_progress_overview_covers_the_whole_catalog() {
        let overview = trail_progress_overview(&[], &catalog());
        assert_eq!(overview.len(), 2);
        assert!(overview
            .iter()
            .all(|e| e.status == "not_started" && e.completed_steps == 0 && e.percent == 0));
        assert_eq!(overview[0].short_id, 5);
        assert_eq!(overview[1].short_id, 9);
    }

    #[test]
    fn test_progress_overview_mid_trail_percent() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[0].id, "2025-10-02", 2, None),
            test_execution(user, cat[1].id, "2025-10-01", 1, None),
            test_execution(user, cat[1].id, "2025-10-02", 2, None),
            test_execution(user, cat[1].id, "2025-10-03", 3, None),
        ];

        let overview = trail_progress_overview(&executions, &cat);
        // 2 of 7 steps
        assert_eq!(overview[0].status, "in_progress");
        assert_eq!(overview[0].completed_steps, 2);
        assert_eq!(overview[0].percent, 28);
        // 3 of 3 steps
        assert_eq!(overview[1].status, "completed");
        assert_eq!(overview[1].percent, 100);
    }

    #[test]
    fn test_progress_overview_duplicate_indices_count_once() {
        let user = Uuid::new_v4();
        let cat = catalog();
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[0].id, "2025-10-02", 1, None),
        ];

        let overview = trail_progress_overview(&executions, &cat);
        assert_eq!(overview[0].completed_steps, 1);
    }

    #[test]
    fn test_gap_in_indices_degrades_to_distinct_count() {
        let user = Uuid::new_v4();
        let cat = catalog();
        // Index 2 is missing; distinct count (2) keeps the resume point safe.
        let executions = vec![
            test_execution(user, cat[0].id, "2025-10-01", 1, None),
            test_execution(user, cat[0].id, "2025-10-03", 4, None),
        ];

        match resolve_next_exercise(&executions, &cat) {
            NextExercise::InProgress { next_index, .. } => assert_eq!(next_index, 3),
            other => panic!("expected InProgress, got {:?}", other),
        }
    }
}
