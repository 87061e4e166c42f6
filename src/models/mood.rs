use serde::{Deserialize, Serialize};

/// Fixed mood label set of the check-in dropdown. Wire values are the
/// Portuguese labels the mobile app sends and renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_label")]
pub enum Mood {
    #[sqlx(rename = "Ansiedade")]
    #[serde(rename = "Ansiedade")]
    Anxiety,
    #[sqlx(rename = "Estresse")]
    #[serde(rename = "Estresse")]
    Stress,
    #[sqlx(rename = "Felicidade")]
    #[serde(rename = "Felicidade")]
    Happiness,
    #[sqlx(rename = "Tristeza")]
    #[serde(rename = "Tristeza")]
    Sadness,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Anxiety, Mood::Stress, Mood::Happiness, Mood::Sadness];

    /// Wire label, identical to the serde rename.
    pub fn label(self) -> &'static str {
        match self {
            Mood::Anxiety => "Ansiedade",
            Mood::Stress => "Estresse",
            Mood::Happiness => "Felicidade",
            Mood::Sadness => "Tristeza",
        }
    }

    /// Fixed ordinal scale used for the mood average. Deliberately treated
    /// as an interval scale by the dashboard; downstream charts depend on
    /// exactly this mapping.
    pub fn scale_value(self) -> i64 {
        match self {
            Mood::Sadness => 1,
            Mood::Anxiety => 2,
            Mood::Stress => 3,
            Mood::Happiness => 4,
        }
    }

    pub fn parse(label: &str) -> Option<Mood> {
        Mood::ALL.iter().copied().find(|m| m.label() == label)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_matches_dashboard_axis() {
        assert_eq!(Mood::Sadness.scale_value(), 1);
        assert_eq!(Mood::Anxiety.scale_value(), 2);
        assert_eq!(Mood::Stress.scale_value(), 3);
        assert_eq!(Mood::Happiness.scale_value(), 4);
    }

    #[test]
    fn test_parse_roundtrip() {
        for mood in Mood::ALL {
            assert_eq!(Mood::parse(mood.label()), Some(mood));
        }
        assert_eq!(Mood::parse("Neutro"), None);
    }
}
