//! Monte Carlo simulation of the upcoming match. Each trial draws a full-time score from per-team
//! Poisson goal rates, optionally over-dispersed by a gamma-distributed multiplier, and tallies the
//! outcome, the score, the total-goals bucket and the verdict of every configured selection.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tinyrand::{Rand, Seeded, Wyrand};

use crate::domain::{Score, Selection, Verdict};
use crate::edge::{Settle, Settlement};
use crate::features::TotalsStats;
use crate::grid::{bucket_of, ScoreGrid, GOAL_BUCKETS};
use crate::model::Probabilities;
use crate::poisson;
use crate::sampling::{clock_seed, gamma};

pub const DEFAULT_TRIALS: u64 = 10_000;

/// Goals per side at which a simulated score is capped.
pub const MAX_SIMULATED_GOALS: u8 = 15;

/// Lowest goal rate of either team.
pub const MIN_RATE: f64 = 0.05;

const PARTITION_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Expected goals of each team.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rates {
    pub team1: f64,
    pub team2: f64,
}
impl Rates {
    /// Splits the projected total about the projected margin, clamped to within ±total. The rates
    /// sum to the total unless a side falls to [`MIN_RATE`].
    pub fn from_projection(projected_total: f64, projected_margin: f64) -> Self {
        let projected_total = projected_total.max(0.0);
        let projected_margin = projected_margin.clamp(-projected_total, projected_total);
        Self {
            team1: ((projected_total + projected_margin) / 2.0).max(MIN_RATE),
            team2: ((projected_total - projected_margin) / 2.0).max(MIN_RATE),
        }
    }
}

/// Variability of the goal rates between trials.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dispersion {
    /// Rates are fixed; goal counts are Poisson.
    Poisson,
    /// Each rate is scaled by a Gamma(shape, 1/shape) draw of unit mean, yielding negative-binomial
    /// goal counts.
    Gamma { shape: f64 },
}
impl Dispersion {
    /// Over-dispersed when the historical total-goals variance exceeds its mean, with the shape
    /// matched to the excess: `mean² / (variance - mean)`.
    pub fn from_totals(totals: &TotalsStats) -> Self {
        if totals.samples >= 2 && totals.mean > 0.0 && totals.variance > totals.mean {
            Dispersion::Gamma {
                shape: totals.mean.powi(2) / (totals.variance - totals.mean),
            }
        } else {
            Dispersion::Poisson
        }
    }

    fn perturb(&self, rate: f64, rand: &mut impl Rand) -> f64 {
        match self {
            Dispersion::Poisson => rate,
            Dispersion::Gamma { shape } => rate * gamma(rand, *shape, 1.0 / shape),
        }
    }
}

/// Draws one full-time score.
pub fn sample_score(rates: &Rates, dispersion: &Dispersion, rand: &mut impl Rand) -> Score {
    let team1_rate = dispersion.perturb(rates.team1, rand);
    let team2_rate = dispersion.perturb(rates.team2, rand);
    Score::new(
        poisson::sample(team1_rate, MAX_SIMULATED_GOALS, rand),
        poisson::sample(team2_rate, MAX_SIMULATED_GOALS, rand),
    )
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerdictTally {
    pub win: u64,
    pub push: u64,
    pub loss: u64,
}
impl VerdictTally {
    fn add(&mut self, verdict: Verdict, count: u64) {
        match verdict {
            Verdict::Win => self.win += count,
            Verdict::Push => self.push += count,
            Verdict::Loss => self.loss += count,
        }
    }

    fn merge(&mut self, other: &VerdictTally) {
        self.win += other.win;
        self.push += other.push;
        self.loss += other.loss;
    }
}

/// Frequency counts over a set of trials.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationBatch {
    pub trials: u64,
    /// Team 1 wins, draws and team 2 wins.
    pub outcomes: [u64; 3],
    pub scores: FxHashMap<Score, u64>,
    pub goal_buckets: [u64; GOAL_BUCKETS],
    pub tallies: Vec<(Selection, VerdictTally)>,
}
impl SimulationBatch {
    pub fn new(selections: &[Selection]) -> Self {
        Self {
            trials: 0,
            outcomes: [0; 3],
            scores: FxHashMap::default(),
            goal_buckets: [0; GOAL_BUCKETS],
            tallies: selections
                .iter()
                .map(|&selection| (selection, VerdictTally::default()))
                .collect(),
        }
    }

    pub fn record(&mut self, score: Score) {
        self.trials += 1;
        let outcome = match score.team1.cmp(&score.team2) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Equal => 1,
            std::cmp::Ordering::Less => 2,
        };
        self.outcomes[outcome] += 1;
        *self.scores.entry(score).or_default() += 1;
        self.goal_buckets[bucket_of(score.total())] += 1;
        for (selection, tally) in &mut self.tallies {
            tally.add(selection.settle(&score), 1);
        }
    }

    /// Combines the counts of two batches. The merge is commutative and associative.
    pub fn merge(mut self, other: SimulationBatch) -> SimulationBatch {
        self.trials += other.trials;
        for (total, count) in self.outcomes.iter_mut().zip(other.outcomes) {
            *total += count;
        }
        for (score, count) in other.scores {
            *self.scores.entry(score).or_default() += count;
        }
        for (total, count) in self.goal_buckets.iter_mut().zip(other.goal_buckets) {
            *total += count;
        }
        for (selection, other_tally) in &other.tallies {
            match self.tallies.iter_mut().find(|(existing, _)| existing == selection) {
                Some((_, tally)) => tally.merge(other_tally),
                None => self.tallies.push((*selection, *other_tally)),
            }
        }
        self
    }

    /// Empirical win/draw/loss frequencies, in percent; even when no trials were run.
    pub fn probabilities(&self) -> Probabilities {
        if self.trials == 0 {
            return Probabilities::even();
        }
        let percent = |count: u64| count as f64 * 100.0 / self.trials as f64;
        Probabilities::new(
            percent(self.outcomes[0]),
            percent(self.outcomes[1]),
            percent(self.outcomes[2]),
        )
    }

    pub fn score_grid(&self) -> ScoreGrid {
        ScoreGrid::from_counts(&self.scores)
    }
}

impl Settle for SimulationBatch {
    /// Reads the tally of a simulated selection; any other selection is settled against the
    /// simulated scores.
    fn settle(&self, selection: &Selection) -> Settlement {
        match self.tallies.iter().find(|(tallied, _)| tallied == selection) {
            Some((_, tally)) => Settlement::from_counts(tally.win, tally.push, tally.loss),
            None => {
                let mut tally = VerdictTally::default();
                for (score, &count) in &self.scores {
                    tally.add(selection.settle(score), count);
                }
                Settlement::from_counts(tally.win, tally.push, tally.loss)
            }
        }
    }
}

/// Runs trials in one or more partitions. Each partition draws from its own generator, seeded
/// from the configured seed (or the clock) and the partition index. A seeded simulation is
/// reproducible for a given partition count.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulator {
    trials: u64,
    partitions: usize,
    seed: Option<u64>,
}
impl Default for Simulator {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            partitions: 1,
            seed: None,
        }
    }
}
impl Simulator {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn simulate(&self, rates: Rates, dispersion: Dispersion, selections: &[Selection]) -> SimulationBatch {
        let base_seed = self.seed.unwrap_or_else(clock_seed);
        let partitions = self.partitions.max(1) as u64;
        if partitions == 1 {
            return run_partition(self.trials, base_seed, &rates, &dispersion, selections);
        }

        (0..partitions)
            .into_par_iter()
            .map(|partition| {
                let trials = self.trials / partitions + u64::from(partition < self.trials % partitions);
                let seed = base_seed.wrapping_add(partition.wrapping_mul(PARTITION_SEED_STRIDE));
                run_partition(trials, seed, &rates, &dispersion, selections)
            })
            .reduce(|| SimulationBatch::new(selections), SimulationBatch::merge)
    }
}

fn run_partition(
    trials: u64,
    seed: u64,
    rates: &Rates,
    dispersion: &Dispersion,
    selections: &[Selection],
) -> SimulationBatch {
    let mut rand = Wyrand::seed(seed);
    let mut batch = SimulationBatch::new(selections);
    for _ in 0..trials {
        batch.record(sample_score(rates, dispersion, &mut rand));
    }
    batch
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use crate::domain::{Handicap, Side, TotalLine};
    use crate::grid::MAX_ANALYTIC_GOALS;
    use crate::probs::SliceExt;
    use edgecast_testing::assert_slice_f64_absolute;

    use super::*;

    fn selections() -> Vec<Selection> {
        vec![
            Selection::Over(TotalLine::from_halves(5)),
            Selection::Under(TotalLine::from_halves(5)),
            Selection::Handicap(Side::Team1, Handicap::from_halves(-2)),
        ]
    }

    #[test]
    fn rates_from_projection() {
        assert_eq!(Rates { team1: 1.6, team2: 1.0 }, Rates::from_projection(2.6, 0.6));
        assert_eq!(Rates { team1: MIN_RATE, team2: 1.0 }, Rates::from_projection(1.0, -3.0));
        assert_eq!(Rates { team1: 2.0, team2: MIN_RATE }, Rates::from_projection(2.0, 2.5));
        assert_eq!(Rates { team1: MIN_RATE, team2: MIN_RATE }, Rates::from_projection(0.0, 0.0));
    }

    #[test]
    fn dispersion_from_totals() {
        let totals = |mean, variance| TotalsStats {
            samples: 10,
            mean,
            variance,
        };
        assert_eq!(Dispersion::Gamma { shape: 4.0 }, Dispersion::from_totals(&totals(2.0, 3.0)));
        assert_eq!(Dispersion::Poisson, Dispersion::from_totals(&totals(2.0, 2.0)));
        assert_eq!(Dispersion::Poisson, Dispersion::from_totals(&totals(0.0, 1.0)));
        assert_eq!(Dispersion::Poisson, Dispersion::from_totals(&TotalsStats::default()));
    }

    #[test]
    fn record_tallies_everything() {
        let mut batch = SimulationBatch::new(&selections());
        for score in [Score::new(2, 1), Score::new(0, 0), Score::new(1, 1), Score::new(4, 4)] {
            batch.record(score);
        }
        assert_eq!(4, batch.trials);
        assert_eq!([1, 3, 0], batch.outcomes);
        assert_eq!([1, 0, 1, 1, 0, 0, 0, 1], batch.goal_buckets);
        assert_eq!(Some(&1), batch.scores.get(&Score::new(2, 1)));
        assert_eq!(
            VerdictTally {
                win: 2,
                push: 0,
                loss: 2
            },
            batch.tallies[0].1
        );
        assert_eq!(
            VerdictTally {
                win: 0,
                push: 1,
                loss: 3
            },
            batch.tallies[2].1
        );
    }

    #[test]
    fn merge_is_commutative() {
        let simulator = Simulator::default().with_trials(500);
        let rates = Rates::from_projection(2.6, 0.4);
        let a = simulator.clone().with_seed(Some(1)).simulate(rates, Dispersion::Poisson, &selections());
        let b = simulator.with_seed(Some(2)).simulate(rates, Dispersion::Poisson, &selections());
        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(1_000, ab.trials);
        assert_eq!(1_000, ab.outcomes.iter().sum::<u64>());
        assert_eq!(1_000, ab.scores.values().sum::<u64>());
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let rates = Rates::from_projection(2.8, -0.3);
        let dispersion = Dispersion::Gamma { shape: 3.0 };
        for partitions in [1, 4] {
            let simulator = Simulator::default().with_partitions(partitions).with_seed(Some(42));
            let first = simulator.simulate(rates, dispersion, &selections());
            let second = simulator.simulate(rates, dispersion, &selections());
            assert_eq!(first, second);
            assert_eq!(DEFAULT_TRIALS, first.trials);
            assert_eq!(DEFAULT_TRIALS, first.goal_buckets.iter().sum::<u64>());
        }
    }

    #[test]
    fn converges_to_analytic_distribution() {
        let rates = Rates::from_projection(2.6, 0.6);
        let batch = Simulator::default()
            .with_trials(40_000)
            .with_seed(Some(7))
            .simulate(rates, Dispersion::Poisson, &selections());
        let analytic = ScoreGrid::from_poisson(rates.team1, rates.team2, MAX_ANALYTIC_GOALS);
        assert_slice_f64_absolute(
            &analytic.outcome_probabilities().to_array(),
            &batch.probabilities().to_array(),
            1.5,
        );
        let over = batch.settle(&selections()[0]);
        assert_float_absolute_eq!(analytic.settle(&selections()[0]).win, over.win, 0.015);
    }

    #[test]
    fn gamma_dispersion_widens_totals() {
        let rates = Rates::from_projection(2.6, 0.0);
        let simulator = Simulator::default().with_trials(20_000).with_seed(Some(11));
        let variance = |batch: &SimulationBatch| {
            let totals = batch
                .scores
                .iter()
                .flat_map(|(score, &count)| std::iter::repeat(score.total() as f64).take(count as usize))
                .collect::<Vec<_>>();
            totals.variance()
        };
        let poisson = variance(&simulator.simulate(rates, Dispersion::Poisson, &[]));
        let dispersed = variance(&simulator.simulate(rates, Dispersion::Gamma { shape: 1.0 }, &[]));
        assert!(poisson < 3.2, "poisson variance {poisson}");
        assert!(dispersed > 4.0, "dispersed variance {dispersed}");
    }

    #[test]
    fn settle_untallied_selection_from_scores() {
        let batch = Simulator::default()
            .with_trials(2_000)
            .with_seed(Some(3))
            .simulate(Rates::from_projection(2.4, 0.2), Dispersion::Poisson, &selections());
        let tallied = batch.settle(&selections()[2]);
        let mut untallied = batch.clone();
        untallied.tallies.clear();
        let from_scores = untallied.settle(&selections()[2]);
        assert_float_absolute_eq!(tallied.win, from_scores.win, 1e-12);
        assert_float_absolute_eq!(tallied.push, from_scores.push, 1e-12);
        assert_float_absolute_eq!(tallied.loss, from_scores.loss, 1e-12);
        assert_float_absolute_eq!(1.0, tallied.win + tallied.push + tallied.loss);
    }
}
