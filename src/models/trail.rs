use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One step of a trail's fixed sequence (`ordem` is 1..N).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailStep {
    pub ordem: i32,
    pub titulo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(rename = "duracaoMinutos", skip_serializing_if = "Option::is_none")]
    pub duracao_minutos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objetivo: Option<String>,
}

/// Static trail definition: an ordered sequence of guided-activity steps,
/// tagged with the moods it is recommended for. Read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trail {
    pub id: Uuid,
    #[serde(rename = "trailId")]
    pub trail_id: i32,
    pub code: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dias")]
    pub steps: Json<Vec<TrailStep>>,
    #[serde(rename = "sentimentosRecomendados")]
    pub recommended_moods: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trail {
    pub fn total_steps(&self) -> usize {
        self.steps.0.len()
    }

    /// Look up a step by its 1-based position. Prefers the declared `ordem`
    /// field; falls back to array position for catalogs missing it.
    pub fn step(&self, ordem: i32) -> Option<&TrailStep> {
        self.steps
            .0
            .iter()
            .find(|s| s.ordem == ordem)
            .or_else(|| usize::try_from(ordem - 1).ok().and_then(|i| self.steps.0.get(i)))
    }
}

#[cfg(test)]
pub(crate) fn test_trail(trail_id: i32, code: &str, total_steps: i32) -> Trail {
    let steps = (1..=total_steps)
        .map(|ordem| TrailStep {
            ordem,
            titulo: format!("Passo {}", ordem),
            descricao: None,
            duracao_minutos: Some(5),
            objetivo: None,
        })
        .collect();

    Trail {
        id: Uuid::from_u128(trail_id as u128),
        trail_id,
        code: code.to_string(),
        name: format!("Trilha {}", trail_id),
        description: None,
        steps: Json(steps),
        recommended_moods: vec!["Ansiedade".to_string()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_lookup_by_ordem() {
        let trail = test_trail(1, "TRILHA_TESTE", 7);
        assert_eq!(trail.total_steps(), 7);
        assert_eq!(trail.step(4).map(|s| s.ordem), Some(4));
        assert_eq!(trail.step(8), None);
    }
}
