//! The stats model: shot quality, possession efficiency and half-time patterns.

use crate::features::FeatureSet;
use crate::model::{compose, expected_goals, lerp, logistic_win_probability, Model, ModelError, Prediction, MAX_ADVANTAGE, MIN_DRAW};

const ACCURACY_WEIGHT: f64 = 4.0;
const CONVERSION_WEIGHT: f64 = 5.0;
const POSSESSION_EFFICIENCY_WEIGHT: f64 = 1.5;
const POSSESSION_SCALE: f64 = 20.0;
const LEAD_RATE_WEIGHT: f64 = 1.5;
const SECOND_HALF_WEIGHT: f64 = 0.8;

const BASE_DRAW: f64 = 24.0;
const DRAW_PER_ADVANTAGE: f64 = 4.0;
const MAX_DRAW: f64 = 30.0;

const SHOT_PROJECTION_WEIGHT: f64 = 0.5;

#[derive(Debug, Default)]
pub struct StatsModel;
impl StatsModel {
    pub const NAME: &'static str = "stats";
}
impl Model for StatsModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, ModelError> {
        let vip = features
            .vip
            .as_ref()
            .ok_or(ModelError::MissingVipStats { model: Self::NAME })?;
        let (shots, possession, half_time) = (&vip.shots, &vip.possession, &vip.half_time);

        let advantage = (shots.accuracy_advantage * ACCURACY_WEIGHT
            + shots.conversion_advantage * CONVERSION_WEIGHT
            + possession.efficiency_advantage * POSSESSION_EFFICIENCY_WEIGHT
            + possession.possession_advantage / POSSESSION_SCALE
            + half_time.lead_rate_advantage * LEAD_RATE_WEIGHT
            + half_time.second_half_advantage * SECOND_HALF_WEIGHT)
            .clamp(-MAX_ADVANTAGE, MAX_ADVANTAGE);
        let draw = (BASE_DRAW - DRAW_PER_ADVANTAGE * advantage.abs()).clamp(MIN_DRAW, MAX_DRAW);

        let (expected1, expected2) = expected_goals(features);
        let (mut projected_total, mut projected_margin) = (expected1 + expected2, expected1 - expected2);
        if shots.team1.on_target > 0 && shots.team2.on_target > 0 {
            let shot_goals1 = shots.team1.on_target_per_game * shots.team1.conversion;
            let shot_goals2 = shots.team2.on_target_per_game * shots.team2.conversion;
            projected_total = lerp(projected_total, shot_goals1 + shot_goals2, SHOT_PROJECTION_WEIGHT);
            projected_margin = lerp(projected_margin, shot_goals1 - shot_goals2, SHOT_PROJECTION_WEIGHT);
        }

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
