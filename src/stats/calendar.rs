use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Active-day count and longest consecutive-day run for one user's window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivitySummary {
    pub active_days: i64,
    pub longest_streak_days: i64,
}

/// Computes activity over the set of distinct days with at least one
/// check-in or completed exercise. The caller restricts the set to the
/// report window before calling; days compare by calendar value only, so
/// there is no wall-clock or timezone drift.
///
/// Two days are consecutive when their difference is exactly one calendar
/// day. Empty input yields zeros.
pub fn compute_activity(active_days: &BTreeSet<NaiveDate>) -> ActivitySummary {
    let active = active_days.len() as i64;

    let mut longest = 0i64;
    let mut run = 0i64;
    let mut prev: Option<NaiveDate> = None;

    // BTreeSet iterates ascending, so one scan suffices.
    for &day in active_days {
        run = match prev {
            Some(p) if day == p + chrono::Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    ActivitySummary {
        active_days: active,
        longest_streak_days: longest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(input: &[&str]) -> BTreeSet<NaiveDate> {
        input.iter().map(|d| d.parse().unwrap()).collect()
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let summary = compute_activity(&BTreeSet::new());
        assert_eq!(summary, ActivitySummary::default());
    }

    #[test]
    fn test_single_day() {
        let summary = compute_activity(&days(&["2025-10-01"]));
        assert_eq!(summary.active_days, 1);
        assert_eq!(summary.longest_streak_days, 1);
    }

    #[test]
    fn test_contiguous_run_equals_active_days() {
        let summary = compute_activity(&days(&["2025-10-01", "2025-10-02", "2025-10-03"]));
        assert_eq!(summary.active_days, 3);
        assert_eq!(summary.longest_streak_days, 3);
    }

    #[test]
    fn test_gap_resets_the_run() {
        let summary = compute_activity(&days(&[
            "2025-10-01",
            "2025-10-02",
            "2025-10-04",
            "2025-10-05",
            "2025-10-06",
        ]));
        assert_eq!(summary.active_days, 5);
        assert_eq!(summary.longest_streak_days, 3);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let summary = compute_activity(&days(&["2025-10-31", "2025-11-01", "2025-11-02"]));
        assert_eq!(summary.longest_streak_days, 3);
    }

    #[test]
    fn test_streak_never_exceeds_active_days() {
        let sets = [
            days(&[]),
            days(&["2025-01-01"]),
            days(&["2025-01-01", "2025-03-05", "2025-03-06"]),
            days(&["2025-02-27", "2025-02-28", "2025-03-01"]),
        ];
        for set in &sets {
            let summary = compute_activity(set);
            assert!(summary.longest_streak_days <= summary.active_days);
        }
    }
}
