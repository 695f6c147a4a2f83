//! The matchup model: leans on the head-to-head record, falling back to overall performance when
//! the teams have not met.

use crate::features::FeatureSet;
use crate::model::{compose, expected_goals, lerp, logistic_win_probability, Model, ModelError, Prediction, MAX_ADVANTAGE, MIN_DRAW};

const DOMINANCE_WEIGHT: f64 = 2.0;
const MARGIN_WEIGHT: f64 = 0.5;
const MAX_MARGIN: f64 = 3.0;
const RANKING_WEIGHT: f64 = 0.5;
const RANKING_SCALE: f64 = 10.0;
const GOAL_DIFF_WEIGHT: f64 = 0.6;

const BASE_DRAW: f64 = 24.0;
const HEAD_TO_HEAD_DRAW_WEIGHT: f64 = 0.5;
const DRAW_PER_ADVANTAGE: f64 = 3.0;
const MAX_DRAW: f64 = 35.0;

const HEAD_TO_HEAD_PROJECTION_WEIGHT: f64 = 0.6;

#[derive(Debug, Default)]
pub struct MatchupModel;
impl MatchupModel {
    pub const NAME: &'static str = "matchup";
}
impl Model for MatchupModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, ModelError> {
        let basic = &features.basic;
        let head_to_head = &basic.head_to_head;
        let ranking = (basic.ranking_gap / RANKING_SCALE).clamp(-1.0, 1.0) * RANKING_WEIGHT;
        let (expected1, expected2) = expected_goals(features);

        let (advantage, draw, projected_total, projected_margin) = if head_to_head.matches > 0 {
            let advantage = head_to_head.dominance * DOMINANCE_WEIGHT
                + head_to_head.avg_margin.clamp(-MAX_MARGIN, MAX_MARGIN) * MARGIN_WEIGHT
                + ranking;
            let draw = lerp(BASE_DRAW, head_to_head.draw_rate * 100.0, HEAD_TO_HEAD_DRAW_WEIGHT);
            let total = lerp(expected1 + expected2, head_to_head.avg_total, HEAD_TO_HEAD_PROJECTION_WEIGHT);
            let margin = lerp(expected1 - expected2, head_to_head.avg_margin, HEAD_TO_HEAD_PROJECTION_WEIGHT);
            (advantage, draw, total, margin)
        } else {
            let advantage = (basic.team1.goal_diff_per_game - basic.team2.goal_diff_per_game) * GOAL_DIFF_WEIGHT
                + ranking;
            (advantage, BASE_DRAW, expected1 + expected2, expected1 - expected2)
        };
        let advantage = advantage.clamp(-MAX_ADVANTAGE, MAX_ADVANTAGE);
        let draw = (draw - DRAW_PER_ADVANTAGE * advantage.abs()).clamp(MIN_DRAW, MAX_DRAW);

        Ok(Prediction {
            probabilities: compose(
                logistic_win_probability(advantage),
                logistic_win_probability(-advantage),
                draw,
            ),
            projected_total: projected_total.max(0.0),
            projected_margin,
        })
    }
}
