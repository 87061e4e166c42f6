use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::feeling::Feeling;

/// Per-label counts and the numeric mood average over a set of feelings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodAggregate {
    pub counts: BTreeMap<String, i64>,
    pub average: Option<f64>,
    pub samples: i64,
}

/// One point of a day-keyed mood series: how many check-ins of each label
/// landed on that day.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodSeriesPoint {
    pub day: NaiveDate,
    pub counts: BTreeMap<String, i64>,
}

/// Counts every label occurrence across both the entry and the exit field.
/// A feeling with both set contributes two samples; a pending one (no exit
/// yet) contributes one. The average maps labels through the fixed ordinal
/// scale and is `None` when there are no samples.
pub fn aggregate_moods(feelings: &[Feeling]) -> MoodAggregate {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    let mut samples = 0i64;
    let mut total = 0i64;

    for feeling in feelings {
        *counts.entry(feeling.mood_entry.label().to_string()).or_default() += 1;
        samples += 1;
        total += feeling.mood_entry.scale_value();

        if let Some(exit) = feeling.mood_exit {
            *counts.entry(exit.label().to_string()).or_default() += 1;
            samples += 1;
            total += exit.scale_value();
        }
    }

    let average = (samples > 0).then(|| total as f64 / samples as f64);

    MoodAggregate {
        counts,
        average,
        samples,
    }
}

/// Builds the two parallel day-keyed series the dashboard charts: entry
/// moods and exit moods. They stay separate because the two check-ins of a
/// day are semantically distinct (how the day started vs. ended); the exit
/// series only carries days whose exit check-in happened.
pub fn mood_series(feelings: &[Feeling]) -> (Vec<MoodSeriesPoint>, Vec<MoodSeriesPoint>) {
    let mut entry_days: BTreeMap<NaiveDate, BTreeMap<String, i64>> = BTreeMap::new();
    let mut exit_days: BTreeMap<NaiveDate, BTreeMap<String, i64>> = BTreeMap::new();

    for feeling in feelings {
        *entry_days
            .entry(feeling.day)
            .or_default()
            .entry(feeling.mood_entry.label().to_string())
            .or_default() += 1;

        if let Some(exit) = feeling.mood_exit {
            *exit_days
                .entry(feeling.day)
                .or_default()
                .entry(exit.label().to_string())
                .or_default() += 1;
        }
    }

    let to_points = |days: BTreeMap<NaiveDate, BTreeMap<String, i64>>| {
        days.into_iter()
            .map(|(day, counts)| MoodSeriesPoint { day, counts })
            .collect()
    };

    (to_points(entry_days), to_points(exit_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feeling::test_feeling;
    use crate::models::mood::Mood;
    use uuid::Uuid;

    #[test]
    fn test_empty_input() {
        let agg = aggregate_moods(&[]);
        assert_eq!(agg.samples, 0);
        assert_eq!(agg.average, None);
        assert!(agg.counts.is_empty());
    }

    #[test]
    fn test_pending_feeling_contributes_one_sample() {
        let user = Uuid::new_v4();
        let feelings = vec![test_feeling(user, "2025-10-01", Mood::Anxiety, None)];

        let agg = aggregate_moods(&feelings);
        assert_eq!(agg.samples, 1);
        assert_eq!(agg.counts.get("Ansiedade"), Some(&1));
        assert_eq!(agg.average, Some(2.0));
    }

    #[test]
    fn test_three_happy_to_sad_days() {
        let user = Uuid::new_v4();
        let feelings = vec![
            test_feeling(user, "2025-10-01", Mood::Happiness, Some(Mood::Sadness)),
            test_feeling(user, "2025-10-02", Mood::Happiness, Some(Mood::Sadness)),
            test_feeling(user, "2025-10-03", Mood::Happiness, Some(Mood::Sadness)),
        ];

        let agg = aggregate_moods(&feelings);
        assert_eq!(agg.samples, 6);
        assert_eq!(agg.counts.get("Felicidade"), Some(&3));
        assert_eq!(agg.counts.get("Tristeza"), Some(&3));
        // (3 * 4 + 3 * 1) / 6
        assert_eq!(agg.average, Some(2.5));
    }

    #[test]
    fn test_average_stays_in_scale_bounds() {
        let user = Uuid::new_v4();
        let feelings = vec![
            test_feeling(user, "2025-10-01", Mood::Stress, Some(Mood::Stress)),
            test_feeling(user, "2025-10-02", Mood::Happiness, None),
            test_feeling(user, "2025-10-03", Mood::Sadness, Some(Mood::Anxiety)),
        ];

        let agg = aggregate_moods(&feelings);
        let avg = agg.average.unwrap();
        assert!((1.0..=4.0).contains(&avg));
        assert_eq!(
            agg.samples,
            feelings.len() as i64
                + feelings.iter().filter(|f| f.mood_exit.is_some()).count() as i64
        );
    }

    #[test]
    fn test_series_keeps_entry_and_exit_separate() {
        let user = Uuid::new_v4();
        let feelings = vec![
            test_feeling(user, "2025-10-01", Mood::Happiness, Some(Mood::Sadness)),
            test_feeling(user, "2025-10-02", Mood::Anxiety, None),
        ];

        let (entrada, saida) = mood_series(&feelings);

        assert_eq!(entrada.len(), 2);
        assert_eq!(entrada[0].counts.get("Felicidade"), Some(&1));
        assert_eq!(entrada[1].counts.get("Ansiedade"), Some(&1));

        // Pending day is absent from the exit series.
        assert_eq!(saida.len(), 1);
        assert_eq!(saida[0].day, "2025-10-01".parse().unwrap());
        assert_eq!(saida[0].counts.get("Tristeza"), Some(&1));
    }

    #[test]
    fn test_series_points_are_day_ordered() {
        let user = Uuid::new_v4();
        let feelings = vec![
            test_feeling(user, "2025-10-03", Mood::Stress, None),
            test_feeling(user, "2025-10-01", Mood::Stress, None),
            test_feeling(user, "2025-10-02", Mood::Stress, None),
        ];

        let (entrada, _) = mood_series(&feelings);
        let days: Vec<_> = entrada.iter().map(|p| p.day).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }
}
