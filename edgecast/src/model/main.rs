//! The main model: a weighted linear advantage score over the basic, advanced and trend features,
//! mapped through the logistic curve.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::features::FeatureSet;
use crate::model::{compose, expected_goals, lerp, logistic_win_probability, Model, ModelError, Prediction, MIN_DRAW};

pub mod weights {
    pub const RECENT_FORM: f64 = 3.2;
    pub const HEAD_TO_HEAD: f64 = 2.8;
    pub const OVERALL_PERFORMANCE: f64 = 2.2;
    pub const HOME_ADVANTAGE: f64 = 1.7;
    pub const RANKING: f64 = 1.2;
    pub const MATCH_IMPORTANCE: f64 = 2.0;
    pub const SCORING_TREND: f64 = 1.8;
    pub const DEFENSIVE_TREND: f64 = 1.6;
    pub const MOMENTUM: f64 = 2.5;
    pub const CONSISTENCY: f64 = 1.5;
    pub const PSYCHOLOGICAL_EDGE: f64 = 1.4;
    pub const PLAYSTYLE_MATCHUP: f64 = 1.6;
}

/// Divisor applied to the summed contributions to obtain the advantage score.
pub const ADVANTAGE_SCALE: f64 = 4.0;

const GOAL_DIFF_SCALE: f64 = 3.0;
const RANKING_SCALE: f64 = 10.0;
const TREND_SCALE: f64 = 2.0;

const BASE_DRAW: f64 = 28.0;
const DRAW_PER_GOAL: f64 = 4.0;
const DRAW_PER_POINT_OF_LEAN: f64 = 0.4;
const MAX_DRAW: f64 = 38.0;
const DERBY_DRAW_BONUS: f64 = 5.0;

const HEAD_TO_HEAD_TOTAL_WEIGHT: f64 = 0.3;
const HEAD_TO_HEAD_MARGIN_WEIGHT: f64 = 0.2;
const TREND_TOTAL_WEIGHT: f64 = 0.25;
const EXPECTED_MARGIN_WEIGHT: f64 = 0.6;
const ADVANTAGE_MARGIN_WEIGHT: f64 = 0.4;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Feature {
    #[strum(serialize = "Recent form")]
    RecentForm,
    #[strum(serialize = "Head-to-head")]
    HeadToHead,
    #[strum(serialize = "Overall performance")]
    OverallPerformance,
    #[strum(serialize = "Home advantage")]
    HomeAdvantage,
    Ranking,
    #[strum(serialize = "Match importance")]
    MatchImportance,
    #[strum(serialize = "Scoring trend")]
    ScoringTrend,
    #[strum(serialize = "Defensive trend")]
    DefensiveTrend,
    Momentum,
    Consistency,
    #[strum(serialize = "Psychological edge")]
    PsychologicalEdge,
    #[strum(serialize = "Playstyle matchup")]
    PlaystyleMatchup,
}
impl Feature {
    pub fn weight(&self) -> f64 {
        match self {
            Feature::RecentForm => weights::RECENT_FORM,
            Feature::HeadToHead => weights::HEAD_TO_HEAD,
            Feature::OverallPerformance => weights::OVERALL_PERFORMANCE,
            Feature::HomeAdvantage => weights::HOME_ADVANTAGE,
            Feature::Ranking => weights::RANKING,
            Feature::MatchImportance => weights::MATCH_IMPORTANCE,
            Feature::ScoringTrend => weights::SCORING_TREND,
            Feature::DefensiveTrend => weights::DEFENSIVE_TREND,
            Feature::Momentum => weights::MOMENTUM,
            Feature::Consistency => weights::CONSISTENCY,
            Feature::PsychologicalEdge => weights::PSYCHOLOGICAL_EDGE,
            Feature::PlaystyleMatchup => weights::PLAYSTYLE_MATCHUP,
        }
    }
}

/// One feature's normalised value, signed in team 1's favour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Term {
    pub feature: Feature,
    pub value: f64,
}
impl Term {
    pub fn contribution(&self) -> f64 {
        self.feature.weight() * self.value
    }
}

/// The terms of the advantage score. The psychological and playstyle terms are present only when
/// enhanced statistics are available.
pub fn terms(features: &FeatureSet) -> Vec<Term> {
    let basic = &features.basic;
    let (team1, team2) = (&features.advanced.team1, &features.advanced.team2);
    let (trend1, trend2) = (&features.trends.team1, &features.trends.team2);

    let form = team1.form_rating - team2.form_rating;
    let ranking = (basic.ranking_gap / RANKING_SCALE).clamp(-1.0, 1.0);
    let stakes = (basic.importance - 1.0).clamp(0.0, 1.0);
    let home = basic.location_factor
        * if basic.location_factor > 0.0 {
            team1.home_advantage
        } else {
            team2.home_advantage
        };

    let mut terms = vec![
        Term {
            feature: Feature::RecentForm,
            value: form,
        },
        Term {
            feature: Feature::HeadToHead,
            value: basic.head_to_head.dominance,
        },
        Term {
            feature: Feature::OverallPerformance,
            value: ((basic.team1.goal_diff_per_game - basic.team2.goal_diff_per_game) / GOAL_DIFF_SCALE)
                .clamp(-1.0, 1.0),
        },
        Term {
            feature: Feature::HomeAdvantage,
            value: home,
        },
        Term {
            feature: Feature::Ranking,
            value: ranking,
        },
        Term {
            feature: Feature::MatchImportance,
            value: stakes * (ranking + form) / 2.0,
        },
        Term {
            feature: Feature::ScoringTrend,
            value: (trend1.scoring - trend2.scoring).clamp(-TREND_SCALE, TREND_SCALE) / TREND_SCALE,
        },
        Term {
            feature: Feature::DefensiveTrend,
            value: (trend1.defensive - trend2.defensive).clamp(-TREND_SCALE, TREND_SCALE) / TREND_SCALE,
        },
        Term {
            feature: Feature::Momentum,
            value: (team1.momentum_index - team2.momentum_index) / 2.0,
        },
        Term {
            feature: Feature::Consistency,
            value: basic.team1.consistency - basic.team2.consistency,
        },
    ];
    if let Some(vip) = &features.vip {
        let psychology = &vip.psychology;
        terms.push(Term {
            feature: Feature::PsychologicalEdge,
            value: (psychology.comeback_advantage + psychology.lead_retention_advantage) / 2.0
                + psychology.home_psychology,
        });
        terms.push(Term {
            feature: Feature::PlaystyleMatchup,
            value: (vip.shots.conversion_advantage + vip.possession.efficiency_advantage).clamp(-1.0, 1.0),
        });
    }
    terms
}

/// The summed term contributions, scaled down by [`ADVANTAGE_SCALE`].
pub fn advantage(features: &FeatureSet) -> f64 {
    terms(features).iter().map(Term::contribution).sum::<f64>() / ADVANTAGE_SCALE
}

#[derive(Debug, Default)]
pub struct MainModel;
impl MainModel {
    pub const NAME: &'static str = "main";

    /// Uses the enhanced statistics when present but does not require them.
    pub fn forecast(&self, features: &FeatureSet) -> Prediction {
        let advantage = advantage(features);
        let team1_win = logistic_win_probability(advantage);
        let team2_win = logistic_win_probability(-advantage);
        let mut draw = (BASE_DRAW
            - DRAW_PER_GOAL * features.basic.combined_avg_goals()
            - DRAW_PER_POINT_OF_LEAN * (team1_win - team2_win).abs())
        .clamp(MIN_DRAW, MAX_DRAW);
        if features.is_derby() {
            draw += DERBY_DRAW_BONUS;
        }

        let (expected1, expected2) = expected_goals(features);
        let head_to_head = &features.basic.head_to_head;
        let (trend1, trend2) = (&features.trends.team1, &features.trends.team2);
        let mut projected_total = expected1 + expected2;
        let mut projected_margin =
            EXPECTED_MARGIN_WEIGHT * (expected1 - expected2) + ADVANTAGE_MARGIN_WEIGHT * advantage;
        if head_to_head.matches > 0 {
            projected_total = lerp(projected_total, head_to_head.avg_total, HEAD_TO_HEAD_TOTAL_WEIGHT);
            projected_margin = lerp(projected_margin, head_to_head.avg_margin, HEAD_TO_HEAD_MARGIN_WEIGHT);
        }
        projected_total += TREND_TOTAL_WEIGHT
            * (trend1.scoring + trend2.scoring - trend1.defensive - trend2.defensive)
            / 2.0;

        Prediction {
            probabilities: compose(team1_win, team2_win, draw),
            projected_total: projected_total.max(0.0),
            projected_margin,
        }
    }
}
impl Model for MainModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, ModelError> {
        Ok(self.forecast(features))
    }
}
