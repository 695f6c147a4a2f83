//! Betting edges: the model's probability of each configured selection winning, measured against
//! the break-even probability of an even-money wager on it.

use serde::Serialize;
use strum_macros::Display;

use crate::domain::{Category, Selection, Side, Teams, Verdict};
use crate::features::DataQuality;
use crate::probs::ratio_or;
use crate::record::{MatchRecord, MatchRecordStore};

/// Edge, in percentage points, at or above which a selection is a strong play.
pub const STRONG_EDGE: f64 = 8.5;
pub const MODERATE_EDGE: f64 = 5.0;
pub const WEAK_EDGE: f64 = 3.0;

/// Probabilities of a selection winning, pushing and losing, as fractions of 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Settlement {
    pub win: f64,
    pub push: f64,
    pub loss: f64,
}
impl Settlement {
    pub fn add(&mut self, verdict: Verdict, prob: f64) {
        match verdict {
            Verdict::Win => self.win += prob,
            Verdict::Push => self.push += prob,
            Verdict::Loss => self.loss += prob,
        }
    }

    /// Relative frequencies of the tallied verdicts; all zero when nothing was tallied.
    pub fn from_counts(win: u64, push: u64, loss: u64) -> Self {
        let total = (win + push + loss) as f64;
        Self {
            win: ratio_or(win as f64, total, 0.0),
            push: ratio_or(push as f64, total, 0.0),
            loss: ratio_or(loss as f64, total, 0.0),
        }
    }

    /// Win probability at which an even-money wager neither gains nor loses: half of the non-push
    /// mass.
    pub fn break_even(&self) -> f64 {
        (1.0 - self.push).max(0.0) / 2.0
    }
}

/// A distribution over match scores against which selections can be settled.
pub trait Settle {
    fn settle(&self, selection: &Selection) -> Settlement;
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
pub enum EdgeStrength {
    None,
    Weak,
    Moderate,
    Strong,
}
impl EdgeStrength {
    pub fn classify(edge: f64) -> Self {
        if edge >= STRONG_EDGE {
            EdgeStrength::Strong
        } else if edge >= MODERATE_EDGE {
            EdgeStrength::Moderate
        } else if edge >= WEAK_EDGE {
            EdgeStrength::Weak
        } else {
            EdgeStrength::None
        }
    }
}

/// How a selection would have fared over the stored records.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HitRate {
    pub samples: usize,
    pub wins: usize,
    pub pushes: usize,
    /// Wins as a percentage of the samples; 0 without samples.
    pub rate: f64,
}
impl HitRate {
    /// Totals are tallied over every record; handicaps over the head-to-head records only.
    pub fn of(selection: &Selection, store: &MatchRecordStore) -> Self {
        let verdicts = match selection {
            Selection::Over(_) | Selection::Under(_) => store
                .iter()
                .map(|record| historical_verdict(selection, record))
                .collect::<Vec<_>>(),
            Selection::Handicap(..) => store
                .records(Category::HeadToHead)
                .iter()
                .map(|record| historical_verdict(selection, record))
                .collect(),
        };
        let samples = verdicts.len();
        let wins = verdicts.iter().filter(|&&verdict| verdict == Verdict::Win).count();
        let pushes = verdicts.iter().filter(|&&verdict| verdict == Verdict::Push).count();
        Self {
            samples,
            wins,
            pushes,
            rate: ratio_or(wins as f64, samples as f64, 0.0) * 100.0,
        }
    }
}

/// Settles `selection` against a stored record, reading the precomputed menu outcome when the
/// line is on the menu. Handicap selections assume a head-to-head record.
fn historical_verdict(selection: &Selection, record: &MatchRecord) -> Verdict {
    match selection {
        Selection::Over(line) | Selection::Under(line) => {
            let over = match record.total_outcome(*line) {
                Some(outcome) if outcome.over => Verdict::Win,
                Some(_) => Verdict::Loss,
                None => line.settle_over(record.total()),
            };
            if matches!(selection, Selection::Over(_)) {
                over
            } else {
                over.flip()
            }
        }
        Selection::Handicap(side, handicap) => {
            let focus = *side == Side::Team1;
            match record.handicap_outcome(*handicap) {
                Some(outcome) if focus => outcome.focus,
                Some(outcome) => outcome.opponent,
                None => handicap.settle(*record.score.get(focus), *record.score.get(!focus)),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineEdge {
    pub selection: Selection,
    pub label: String,
    /// Model probability of the selection winning, in percent.
    pub probability: f64,
    /// Model probability of a push, in percent.
    pub push: f64,
    /// In percent.
    pub break_even: f64,
    /// `probability - break_even`, in percentage points.
    pub edge: f64,
    pub strength: EdgeStrength,
    pub historical: HitRate,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeReport {
    pub edges: Vec<LineEdge>,
    pub data_quality: DataQuality,
}
impl EdgeReport {
    /// The selection with the largest edge, provided it is at least weak.
    pub fn best(&self) -> Option<&LineEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.strength > EdgeStrength::None)
            .max_by(|a, b| a.edge.total_cmp(&b.edge))
    }
}

/// Prices every selection against `distribution`, in the order given.
pub fn calculate(
    distribution: &impl Settle,
    selections: &[Selection],
    store: &MatchRecordStore,
    teams: &Teams,
) -> Vec<LineEdge> {
    selections
        .iter()
        .map(|selection| {
            let settlement = distribution.settle(selection);
            let probability = settlement.win * 100.0;
            let break_even = settlement.break_even() * 100.0;
            let edge = probability - break_even;
            LineEdge {
                selection: *selection,
                label: selection.label(teams),
                probability,
                push: settlement.push * 100.0,
                break_even,
                edge,
                strength: EdgeStrength::classify(edge),
                historical: HitRate::of(selection, store),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use chrono::{TimeZone, Utc};
    use tinyrand::{Seeded, Wyrand};

    use crate::domain::{Handicap, Score, TeamInfo, TotalLine};
    use crate::record::pair_scores;

    use super::*;

    /// Settles every selection against a single certain score.
    struct Certain(Score);

    impl Settle for Certain {
        fn settle(&self, selection: &Selection) -> Settlement {
            let mut settlement = Settlement::default();
            settlement.add(selection.settle(&self.0), 1.0);
            settlement
        }
    }

    fn teams() -> Teams {
        Teams {
            team1: TeamInfo::new("Liverpool", Some(4)),
            team2: TeamInfo::new("Manchester City", Some(2)),
        }
    }

    fn store() -> MatchRecordStore {
        let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut rand = Wyrand::seed(7);
        let mut store = MatchRecordStore::default();
        store.replace(
            Category::HeadToHead,
            &pair_scores(&[1, 2, 1, 2], &[1, 0, 2, 1]),
            as_of,
            &mut rand,
        );
        store.replace(
            Category::Team1VsOther,
            &pair_scores(&[3, 0], &[2, 0]),
            as_of,
            &mut rand,
        );
        store
    }

    #[test]
    fn break_even_accounts_for_push() {
        assert_eq!(0.5, Settlement::from_counts(3, 0, 1).break_even());
        assert_eq!(0.4, Settlement::from_counts(3, 2, 5).break_even());
        assert_eq!(Settlement::default(), Settlement::from_counts(0, 0, 0));
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(EdgeStrength::Strong, EdgeStrength::classify(8.5));
        assert_eq!(EdgeStrength::Moderate, EdgeStrength::classify(8.49));
        assert_eq!(EdgeStrength::Moderate, EdgeStrength::classify(5.0));
        assert_eq!(EdgeStrength::Weak, EdgeStrength::classify(3.0));
        assert_eq!(EdgeStrength::None, EdgeStrength::classify(2.99));
        assert_eq!(EdgeStrength::None, EdgeStrength::classify(-20.0));
    }

    #[test]
    fn historical_totals_use_every_record() {
        let store = store();
        // totals 2, 2, 3, 3, 5, 0
        let over = HitRate::of(&Selection::Over(TotalLine::from_halves(5)), &store);
        assert_eq!(6, over.samples);
        assert_eq!(3, over.wins);
        assert_float_absolute_eq!(50.0, over.rate);

        let under = HitRate::of(&Selection::Under(TotalLine::from_halves(6)), &store);
        assert_eq!(3, under.wins);
        assert_eq!(2, under.pushes);
    }

    #[test]
    fn historical_handicaps_use_head_to_head() {
        let store = store();
        // head-to-head margins for team 1: 0, +2, -1, +1
        let team1 = HitRate::of(&Selection::Handicap(Side::Team1, Handicap::from_halves(-1)), &store);
        assert_eq!(4, team1.samples);
        assert_eq!(2, team1.wins);

        let team2 = HitRate::of(&Selection::Handicap(Side::Team2, Handicap::from_halves(2)), &store);
        assert_eq!(2, team2.wins);
        assert_eq!(1, team2.pushes);

        let off_menu = HitRate::of(&Selection::Handicap(Side::Team1, Handicap::from_halves(-8)), &store);
        assert_eq!(0, off_menu.wins);
        assert_eq!(0.0, off_menu.rate);
    }

    #[test]
    fn calculate_against_certain_score() {
        let store = store();
        let selections = [
            Selection::Over(TotalLine::from_halves(5)),
            Selection::Handicap(Side::Team1, Handicap::from_halves(-2)),
            Selection::Handicap(Side::Team2, Handicap::from_halves(2)),
        ];
        let edges = calculate(&Certain(Score::new(2, 1)), &selections, &store, &teams());
        assert_eq!(3, edges.len());

        assert_eq!("Over 2.5", edges[0].label);
        assert_eq!(100.0, edges[0].probability);
        assert_eq!(50.0, edges[0].break_even);
        assert_eq!(50.0, edges[0].edge);
        assert_eq!(EdgeStrength::Strong, edges[0].strength);

        assert_eq!("Liverpool -1", edges[1].label);
        assert_eq!(0.0, edges[1].probability);
        assert_eq!(100.0, edges[1].push);
        assert_eq!(0.0, edges[1].break_even);
        assert_eq!(0.0, edges[1].edge);
        assert_eq!(EdgeStrength::None, edges[1].strength);

        assert_eq!("Manchester City +1", edges[2].label);
        assert_eq!(100.0, edges[2].push);
    }

    #[test]
    fn best_edge() {
        let store = store();
        let selections = [
            Selection::Under(TotalLine::from_halves(5)),
            Selection::Over(TotalLine::from_halves(5)),
            Selection::Handicap(Side::Team1, Handicap::from_halves(0)),
        ];
        let edges = calculate(&Certain(Score::new(1, 1)), &selections, &store, &teams());
        let report = EdgeReport {
            edges,
            data_quality: DataQuality::assess(&store),
        };
        let best = report.best().unwrap();
        assert_eq!(Selection::Under(TotalLine::from_halves(5)), best.selection);

        let report = EdgeReport {
            edges: calculate(&Certain(Score::new(0, 0)), &selections[1..], &store, &teams()),
            data_quality: DataQuality::assess(&store),
        };
        assert!(report.best().is_none());
    }
}
