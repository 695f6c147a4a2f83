//! Diagnostic ranking of the features behind the main model's advantage score.

use serde::Serialize;

use crate::features::FeatureSet;
use crate::model::main::terms;
use crate::model::Feature;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    /// Signed `weight × value`; positive favours team 1.
    pub contribution: f64,
    /// Share of the total absolute contribution, in percent.
    pub score: f64,
}

/// Every main-model term, ranked by the magnitude of its contribution. Terms that contribute
/// nothing keep their model order at the bottom of the ranking, and score zero.
pub fn rank(features: &FeatureSet) -> Vec<FeatureImportance> {
    let terms = terms(features);
    let magnitude = terms.iter().map(|term| term.contribution().abs()).sum::<f64>();
    let mut ranked = terms
        .iter()
        .map(|term| {
            let contribution = term.contribution();
            let score = if magnitude > 0.0 {
                contribution.abs() / magnitude * 100.0
            } else {
                0.0
            };
            FeatureImportance {
                feature: term.feature,
                contribution,
                score,
            }
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use chrono::{TimeZone, Utc};
    use strum::IntoEnumIterator;
    use tinyrand::{Seeded, Wyrand};

    use crate::domain::{Category, Location, TeamInfo, Teams};
    use crate::features::{extract_enhanced, extract_standard, MatchContext};
    use crate::model::main::weights;
    use crate::record::{pair_scores, MatchRecordStore};

    use super::*;

    fn teams() -> Teams {
        Teams {
            team1: TeamInfo::new("Arsenal", Some(3)),
            team2: TeamInfo::new("Tottenham", Some(8)),
        }
    }

    #[test]
    fn without_data_only_ranking_counts() {
        let teams = teams();
        let context = MatchContext {
            teams: &teams,
            importance: 1.0,
            location: Location::Neutral,
        };
        let ranked = rank(&extract_standard(&MatchRecordStore::default(), &context));
        assert_eq!(10, ranked.len());
        assert_eq!(Feature::Ranking, ranked[0].feature);
        assert_float_absolute_eq!(weights::RANKING * 0.5, ranked[0].contribution);
        assert_eq!(100.0, ranked[0].score);
        assert!(ranked[1..].iter().all(|entry| entry.score == 0.0));
    }

    #[test]
    fn nothing_to_rank() {
        let teams = Teams {
            team1: TeamInfo::new("Arsenal", None),
            team2: TeamInfo::new("Tottenham", None),
        };
        let context = MatchContext {
            teams: &teams,
            importance: 1.0,
            location: Location::Neutral,
        };
        let ranked = rank(&extract_enhanced(&MatchRecordStore::default(), &context));
        assert_eq!(Feature::iter().collect::<Vec<_>>(), ranked.iter().map(|entry| entry.feature).collect::<Vec<_>>());
        assert!(ranked.iter().all(|entry| entry.score == 0.0));
    }

    #[test]
    fn scores_sum_to_100_and_descend() {
        let teams = teams();
        let context = MatchContext {
            teams: &teams,
            importance: 1.5,
            location: Location::Home,
        };
        let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut rand = Wyrand::seed(3);
        let mut store = MatchRecordStore::default();
        store.replace(Category::HeadToHead, &pair_scores(&[2, 3, 0, 4], &[0, 1, 2, 2]), as_of, &mut rand);
        store.replace(Category::Team1VsOther, &pair_scores(&[3, 2, 1], &[1, 0, 1]), as_of, &mut rand);
        store.replace(Category::Team2VsOther, &pair_scores(&[1, 0, 2], &[2, 0, 2]), as_of, &mut rand);

        let ranked = rank(&extract_enhanced(&store, &context));
        assert_eq!(12, ranked.len());
        assert_float_absolute_eq!(100.0, ranked.iter().map(|entry| entry.score).sum::<f64>());
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
