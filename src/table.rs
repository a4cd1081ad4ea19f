//! Resultatentabel: gefilterde toewijzingen met afgeleide weergavevelden.

use serde::Serialize;

use crate::config::ViewConfig;
use crate::model::{GeotagResponse, ResponseError};

/// Eén rij in de tabel, verwijst terug naar de toewijzing via `assignment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub assignment: usize,
    pub text: String,
    pub cats: String,
    pub score: f64,
    pub coverage: f64,
    pub ambiguity: f64,
    pub opacity: f64,
    pub likelihood: f64,
}

impl ResultRow {
    #[must_use]
    pub fn coverage_text(&self) -> String {
        format!("{:.2}", self.coverage)
    }

    #[must_use]
    pub fn ambiguity_text(&self) -> String {
        format!("{:.2}", self.ambiguity)
    }

    #[must_use]
    pub fn score_text(&self) -> String {
        format!("{:.2}%", self.score * 100.0)
    }
}

/// Toewijzingen boven de drempel, aangevuld tot minstens `rank_cutoff + 1` rijen.
pub fn build_rows(
    response: &GeotagResponse,
    config: &ViewConfig,
) -> Result<Vec<ResultRow>, ResponseError> {
    let mut rows = Vec::new();
    for (index, assignment) in response.assignments.iter().enumerate() {
        if assignment.likelihood < config.likelihood_threshold && index > config.rank_cutoff {
            continue;
        }

        let category = assignment.primary_category(index)?;
        let score = category.normalized_prob;
        let coverage = if category.stats.total == 0.0 {
            0.0
        } else {
            category.stats.coverage / category.stats.total
        };
        let cats = category.cats_label();

        rows.push(ResultRow {
            assignment: index,
            text: category.txt.clone().unwrap_or_else(|| cats.clone()),
            cats,
            score,
            coverage,
            ambiguity: category.stats.ambiguity,
            opacity: row_opacity(score),
            likelihood: assignment.likelihood,
        });
    }
    Ok(rows)
}

/// Vierdemachtswortel plus een vaste basis, zodat ook kleine scores zichtbaar blijven.
#[must_use]
pub fn row_opacity(score: f64) -> f64 {
    (score.max(0.0).sqrt().sqrt() + 0.2).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Category, CategoryStats};

    fn assignment(likelihood: f64, prob: f64) -> Assignment {
        Assignment {
            likelihood,
            categories: vec![Category {
                category: ["_|P|PPL".into(), "_|EU|IE".into(), "_|Prominent6".into()],
                stats: CategoryStats {
                    coverage: 2.0,
                    total: 4.0,
                    ambiguity: 1.333,
                },
                normalized_prob: prob,
                txt: None,
            }],
            cell_interpretations: vec![Vec::new()],
        }
    }

    #[test]
    fn keeps_likely_rows_and_the_top_ranks() {
        let config = ViewConfig {
            rank_cutoff: 2,
            ..ViewConfig::default()
        };
        let response = GeotagResponse {
            assignments: vec![
                assignment(1e-9, 0.1),
                assignment(1e-9, 0.1),
                assignment(1e-9, 0.1),
                assignment(0.4, 0.1),
                assignment(1e-9, 0.1),
            ],
            ..GeotagResponse::default()
        };

        let rows = build_rows(&response, &config).unwrap();
        let kept: Vec<_> = rows.iter().map(|r| r.assignment).collect();
        assert_eq!(kept, [0, 1, 2, 3]);
    }

    #[test]
    fn derived_fields() {
        let response = GeotagResponse {
            assignments: vec![assignment(0.9, 0.0625)],
            ..GeotagResponse::default()
        };
        let row = &build_rows(&response, &ViewConfig::default()).unwrap()[0];

        assert_eq!(row.coverage_text(), "0.50");
        assert_eq!(row.ambiguity_text(), "1.33");
        assert_eq!(row.score_text(), "6.25%");
        assert!((row.opacity - 0.7).abs() < 1e-12);
        assert_eq!(row.text, "PPL, _|EU|IE, Prominent6");
    }

    #[test]
    fn zero_total_has_zero_coverage() {
        let mut a = assignment(0.9, 0.5);
        a.categories[0].stats.total = 0.0;
        let response = GeotagResponse {
            assignments: vec![a],
            ..GeotagResponse::default()
        };
        assert_eq!(build_rows(&response, &ViewConfig::default()).unwrap()[0].coverage, 0.0);
    }

    #[test]
    fn missing_category_fails() {
        let response = GeotagResponse {
            assignments: vec![Assignment::default()],
            ..GeotagResponse::default()
        };
        assert!(matches!(
            build_rows(&response, &ViewConfig::default()),
            Err(ResponseError::NoCategory(0))
        ));
    }

    #[test]
    fn opacity_is_monotonic() {
        let scores = [0.0, 1e-8, 1e-4, 0.01, 0.1, 0.3, 0.5, 0.9, 1.0];
        for pair in scores.windows(2) {
            assert!(row_opacity(pair[0]) <= row_opacity(pair[1]));
        }
        assert!(row_opacity(0.0) > 0.0);
        assert_eq!(row_opacity(1.0), 1.0);
    }
}
