//! Discrete probability distribution over full-time scores.

use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::domain::{Score, Selection};
use crate::edge::{Settle, Settlement};
use crate::model::Probabilities;
use crate::poisson;
use crate::probs::SliceExt;

/// Goals per side covered by the analytic distribution.
pub const MAX_ANALYTIC_GOALS: u8 = 10;

/// Total-goals buckets `0..=6` and a final `7+` bucket.
pub const GOAL_BUCKETS: usize = 8;

/// Label of the total-goals bucket at `index`.
pub fn bucket_label(index: usize) -> String {
    if index + 1 < GOAL_BUCKETS {
        index.to_string()
    } else {
        format!("{index}+")
    }
}

/// Bucket index for a match with `total` goals.
pub fn bucket_of(total: u16) -> usize {
    (total as usize).min(GOAL_BUCKETS - 1)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreProbability {
    pub score: Score,
    /// In percent.
    pub probability: f64,
}

/// Square grid of score probabilities, indexed by `(team 1 goals, team 2 goals)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreGrid {
    dim: usize,
    cells: Vec<f64>,
}
impl ScoreGrid {
    pub fn allocate(max_goals: u8) -> Self {
        let dim = max_goals as usize + 1;
        Self {
            dim,
            cells: vec![0.0; dim * dim],
        }
    }

    /// Independent Poisson goal counts at the given rates, truncated at `max_goals` per side and
    /// renormalised.
    pub fn from_poisson(team1_rate: f64, team2_rate: f64, max_goals: u8) -> Self {
        let team1 = poisson::distribution(team1_rate, max_goals);
        let team2 = poisson::distribution(team2_rate, max_goals);
        let mut grid = Self::allocate(max_goals);
        for (team1_goals, team1_prob) in team1.iter().enumerate() {
            for (team2_goals, team2_prob) in team2.iter().enumerate() {
                grid[(team1_goals, team2_goals)] = team1_prob * team2_prob;
            }
        }
        grid.cells.normalise(1.0);
        grid
    }

    /// Relative frequencies of the counted scores.
    pub fn from_counts(counts: &FxHashMap<Score, u64>) -> Self {
        let max_goals = counts
            .keys()
            .map(|score| score.team1.max(score.team2))
            .max()
            .unwrap_or_default();
        let mut grid = Self::allocate(max_goals);
        for (score, &count) in counts {
            grid[(score.team1 as usize, score.team2 as usize)] = count as f64;
        }
        grid.cells.normalise(1.0);
        grid
    }

    pub fn max_goals(&self) -> u8 {
        (self.dim - 1) as u8
    }

    /// Probability of `score`; 0 beyond the grid.
    pub fn get(&self, score: &Score) -> f64 {
        let (row, col) = (score.team1 as usize, score.team2 as usize);
        if row < self.dim && col < self.dim {
            self[(row, col)]
        } else {
            0.0
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Score, f64)> + '_ {
        self.cells.iter().enumerate().map(|(index, &prob)| {
            let score = Score::new((index / self.dim) as u8, (index % self.dim) as u8);
            (score, prob)
        })
    }

    pub fn sum(&self) -> f64 {
        self.cells.sum()
    }

    /// Win/draw/loss probabilities, in percent.
    pub fn outcome_probabilities(&self) -> Probabilities {
        let mut outcomes = [0.0; 3];
        for (score, prob) in self.iter() {
            let index = match score.team1.cmp(&score.team2) {
                std::cmp::Ordering::Greater => 0,
                std::cmp::Ordering::Equal => 1,
                std::cmp::Ordering::Less => 2,
            };
            outcomes[index] += prob;
        }
        Probabilities::new(outcomes[0] * 100.0, outcomes[1] * 100.0, outcomes[2] * 100.0)
    }

    /// Expected goals of each team.
    pub fn expectations(&self) -> (f64, f64) {
        self.iter().fold((0.0, 0.0), |(team1, team2), (score, prob)| {
            (team1 + score.team1 as f64 * prob, team2 + score.team2 as f64 * prob)
        })
    }

    /// The `n` most probable scores, most probable first. Equally probable scores are ordered by
    /// fewer team 1 goals, then fewer team 2 goals.
    pub fn top_scores(&self, n: usize) -> Vec<ScoreProbability> {
        let mut scores = self
            .iter()
            .filter(|(_, prob)| *prob > 0.0)
            .map(|(score, prob)| ScoreProbability {
                score,
                probability: prob * 100.0,
            })
            .collect::<Vec<_>>();
        scores.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.score.cmp(&b.score))
        });
        scores.truncate(n);
        scores
    }

    /// Probability of each total-goals bucket, in percent.
    pub fn goal_buckets(&self) -> [f64; GOAL_BUCKETS] {
        let mut buckets = [0.0; GOAL_BUCKETS];
        for (score, prob) in self.iter() {
            buckets[bucket_of(score.total())] += prob * 100.0;
        }
        buckets
    }
}

impl Index<(usize, usize)> for ScoreGrid {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.cells[row * self.dim + col]
    }
}

impl IndexMut<(usize, usize)> for ScoreGrid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.cells[row * self.dim + col]
    }
}

impl Settle for ScoreGrid {
    fn settle(&self, selection: &Selection) -> Settlement {
        let mut settlement = Settlement::default();
        for (score, prob) in self.iter() {
            settlement.add(selection.settle(&score), prob);
        }
        settlement
    }
}
