//! Synthetic enrichment: plausible half-time, shot and possession figures derived from a final
//! score. Generated once when a record is ingested.

use serde::{Deserialize, Serialize};
use tinyrand::Rand;

use crate::domain::Pair;
use crate::sampling::{coin_flip, uniform, uniform_int};

/// Share of the full-time goals that are assigned to the first half.
pub const FIRST_HALF_SHARE: f64 = 0.3;

const SHOTS_PER_GOAL_MIN: u32 = 7;
const SHOTS_PER_GOAL_MAX: u32 = 10;
const EXTRA_SHOTS_MAX: u32 = 4;
const ON_TARGET_SHARE_MIN: f64 = 0.30;
const ON_TARGET_SHARE_MAX: f64 = 0.45;

const POSSESSION_PER_GOAL: f64 = 3.0;
const POSSESSION_NOISE: f64 = 5.0;
const POSSESSION_MIN: f64 = 30.0;
const POSSESSION_MAX: f64 = 70.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotStats {
    pub total: u16,
    pub on_target: u16,
    /// Goals per shot on target; 0 without shots on target.
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub half_time: Pair<u8>,
    pub shots: Pair<ShotStats>,
    pub possession: Pair<f64>,
}

pub fn enrich(score: &Pair<u8>, rand: &mut impl Rand) -> Enrichment {
    let half_time = half_time(score, rand);
    let shots = Pair::new(shots(score.focus, rand), shots(score.opponent, rand));
    let possession = possession(score, rand);
    Enrichment {
        half_time,
        shots,
        possession,
    }
}

/// Splits the full-time score into a half-time score. Each first-half goal goes to either team on a
/// coin flip, unless that team has no full-time goals left to give, in which case it goes to the
/// other.
pub fn half_time(score: &Pair<u8>, rand: &mut impl Rand) -> Pair<u8> {
    let first_half_goals = (score.total() as f64 * FIRST_HALF_SHARE).round() as u16;
    let mut half_time = Pair::new(0, 0);
    for _ in 0..first_half_goals {
        if coin_flip(rand) && half_time.focus < score.focus {
            half_time.focus += 1;
        } else if half_time.opponent < score.opponent {
            half_time.opponent += 1;
        } else if half_time.focus < score.focus {
            half_time.focus += 1;
        }
    }
    half_time
}

pub fn shots(goals: u8, rand: &mut impl Rand) -> ShotStats {
    let per_goal = uniform_int(rand, SHOTS_PER_GOAL_MIN, SHOTS_PER_GOAL_MAX) as u16;
    let extra = uniform_int(rand, 0, EXTRA_SHOTS_MAX) as u16;
    let total = goals as u16 * per_goal + extra;
    let share = uniform(rand, ON_TARGET_SHARE_MIN, ON_TARGET_SHARE_MAX);
    let on_target = u16::max(goals as u16, (total as f64 * share).round() as u16);
    let efficiency = if on_target > 0 {
        goals as f64 / on_target as f64
    } else {
        0.0
    };
    ShotStats {
        total,
        on_target,
        efficiency,
    }
}

/// Possession split, tilted three points per goal of margin towards the team that scored more.
pub fn possession(score: &Pair<u8>, rand: &mut impl Rand) -> Pair<f64> {
    let diff = score.focus as f64 - score.opponent as f64;
    let noise = uniform(rand, -POSSESSION_NOISE, POSSESSION_NOISE);
    let focus = (50.0 + POSSESSION_PER_GOAL * diff + noise).clamp(POSSESSION_MIN, POSSESSION_MAX);
    Pair::new(round_tenth(focus), round_tenth(100.0 - focus))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
