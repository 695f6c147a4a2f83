//! Feature extraction: reduces the record store to the flat set of statistics that the models
//! consume. Every ratio falls back to a neutral value when its denominator is empty, so extraction
//! never fails.

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::debug;

use crate::domain::{Category, Location, Side, TeamResult, Teams};
use crate::probs::{ratio_or, SliceExt};
use crate::record::{MatchRecordStore, Perspective};

pub mod vip;

pub use vip::VipStats;

/// Form rating and win rate assumed in the absence of data.
pub const NEUTRAL_FORM: f64 = 0.5;

/// Number of most recent matches considered for form and momentum.
pub const RECENT_MATCHES: usize = 5;

/// Weight decay applied to each successively older match in the recent window.
pub const RECENCY_DECAY: f64 = 0.8;

/// Importance at or above which a match is treated as a derby.
pub const DERBY_IMPORTANCE: f64 = 1.5;

const HOME_ADVANTAGE_BASE: f64 = 0.35;
const MAX_STRENGTH: f64 = 3.0;

pub const MIN_MATCHES_FOR_GOOD: usize = 4;
pub const MIN_MATCHES_FOR_EXCELLENT: usize = 8;
pub const MIN_HEAD_TO_HEAD_FOR_EXCELLENT: usize = 2;

/// The circumstances of the upcoming match.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    pub teams: &'a Teams,
    pub importance: f64,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub matches: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub avg_scored: f64,
    pub avg_conceded: f64,
    pub win_rate: f64,
    /// Mean of 1/0.5/0 points per match; neutral without matches.
    pub points_rate: f64,
    pub goal_diff_per_game: f64,
    /// `1 / (1 + σ)` of the per-match goal difference; neutral without matches.
    pub consistency: f64,
}
impl TeamStats {
    pub fn from_perspectives(perspectives: &[Perspective]) -> Self {
        let matches = perspectives.len();
        let count = |result: TeamResult| perspectives.iter().filter(|perspective| perspective.result() == result).count();
        let (wins, draws, losses) = (count(TeamResult::Win), count(TeamResult::Draw), count(TeamResult::Loss));
        let scored = perspectives.iter().map(|perspective| perspective.scored as f64).collect::<Vec<_>>();
        let conceded = perspectives.iter().map(|perspective| perspective.conceded as f64).collect::<Vec<_>>();
        let goal_diffs = perspectives.iter().map(Perspective::goal_difference).collect::<Vec<_>>();
        let points = perspectives.iter().map(|perspective| perspective.result().points()).collect::<Vec<_>>();

        let (points_rate, consistency) = if matches == 0 {
            (NEUTRAL_FORM, 0.5)
        } else {
            (points.mean(), 1.0 / (1.0 + goal_diffs.std_dev()))
        };
        Self {
            matches,
            wins,
            draws,
            losses,
            avg_scored: scored.mean(),
            avg_conceded: conceded.mean(),
            win_rate: ratio_or(wins as f64, matches as f64, 0.0),
            points_rate,
            goal_diff_per_game: goal_diffs.mean(),
            consistency,
        }
    }
}

/// Head-to-head history, from team 1's point of view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadStats {
    pub matches: usize,
    pub team1_wins: usize,
    pub team2_wins: usize,
    pub draws: usize,
    /// `(team 1 wins - team 2 wins) / matches`.
    pub dominance: f64,
    pub draw_rate: f64,
    pub avg_total: f64,
    /// Mean signed goal difference in team 1's favour.
    pub avg_margin: f64,
}
impl HeadToHeadStats {
    pub fn from_store(store: &MatchRecordStore) -> Self {
        let records = store.records(Category::HeadToHead);
        let matches = records.len();
        if matches == 0 {
            return Self::default();
        }
        let team1_wins = records.iter().filter(|record| record.score.focus > record.score.opponent).count();
        let team2_wins = records.iter().filter(|record| record.score.focus < record.score.opponent).count();
        let draws = matches - team1_wins - team2_wins;
        let totals = records.iter().map(|record| record.total() as f64).collect::<Vec<_>>();
        let margins = records
            .iter()
            .map(|record| record.score.focus as f64 - record.score.opponent as f64)
            .collect::<Vec<_>>();
        Self {
            matches,
            team1_wins,
            team2_wins,
            draws,
            dominance: (team1_wins as f64 - team2_wins as f64) / matches as f64,
            draw_rate: draws as f64 / matches as f64,
            avg_total: totals.mean(),
            avg_margin: margins.mean(),
        }
    }
}

/// Total goals per match across every stored record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalsStats {
    pub samples: usize,
    pub mean: f64,
    pub variance: f64,
}
impl TotalsStats {
    pub fn from_store(store: &MatchRecordStore) -> Self {
        let totals = store.iter().map(|record| record.total() as f64).collect::<Vec<_>>();
        Self {
            samples: totals.len(),
            mean: totals.mean(),
            variance: totals.variance(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub team1: TeamStats,
    pub team2: TeamStats,
    pub head_to_head: HeadToHeadStats,
    pub totals: TotalsStats,
    /// Team 2's ranking minus team 1's; positive when team 1 is ranked higher. 0 when either
    /// team is unranked.
    pub ranking_gap: f64,
    pub location_factor: f64,
    pub importance: f64,
}
impl BasicStats {
    pub fn team(&self, side: Side) -> &TeamStats {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    /// Sum of the two teams' average goals scored.
    pub fn combined_avg_goals(&self) -> f64 {
        self.team1.avg_scored + self.team2.avg_scored
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    /// Scoring rate relative to the two-team baseline.
    pub attack: f64,
    /// Inverse conceding rate relative to the two-team baseline.
    pub defense: f64,
    pub form_rating: f64,
    /// Recent form less the longer-run points rate.
    pub momentum_index: f64,
    pub home_advantage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvancedStats {
    pub team1: TeamStrength,
    pub team2: TeamStrength,
}
impl AdvancedStats {
    pub fn team(&self, side: Side) -> &TeamStrength {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }
}

/// Change between the older and the more recent half of a team's matches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTrend {
    /// Rise in goals scored per match.
    pub scoring: f64,
    /// Fall in goals conceded per match.
    pub defensive: f64,
    /// Rise in points per match.
    pub form: f64,
}
impl TeamTrend {
    /// `chronological` must be ordered oldest first.
    pub fn from_chronological(chronological: &[Perspective]) -> Self {
        if chronological.len() < 2 {
            return Self::default();
        }
        let (older, recent) = chronological.split_at(chronological.len() / 2);
        Self {
            scoring: mean_by(recent, |p| p.scored as f64) - mean_by(older, |p| p.scored as f64),
            defensive: mean_by(older, |p| p.conceded as f64) - mean_by(recent, |p| p.conceded as f64),
            form: mean_by(recent, |p| p.result().points()) - mean_by(older, |p| p.result().points()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub team1: TeamTrend,
    pub team2: TeamTrend,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum DataTier {
    Insufficient,
    Good,
    Excellent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub total_matches: usize,
    pub head_to_head_matches: usize,
    pub team1_matches: usize,
    pub team2_matches: usize,
    pub tier: DataTier,
    /// Further matches needed to reach the good tier.
    pub matches_needed: usize,
}
impl DataQuality {
    pub fn assess(store: &MatchRecordStore) -> Self {
        let total_matches = store.len();
        let head_to_head_matches = store.records(Category::HeadToHead).len();
        let tier = if total_matches >= MIN_MATCHES_FOR_EXCELLENT && head_to_head_matches >= MIN_HEAD_TO_HEAD_FOR_EXCELLENT
        {
            DataTier::Excellent
        } else if total_matches >= MIN_MATCHES_FOR_GOOD {
            DataTier::Good
        } else {
            DataTier::Insufficient
        };
        Self {
            total_matches,
            head_to_head_matches,
            team1_matches: store.records(Category::Team1VsOther).len(),
            team2_matches: store.records(Category::Team2VsOther).len(),
            tier,
            matches_needed: MIN_MATCHES_FOR_GOOD.saturating_sub(total_matches),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub basic: BasicStats,
    pub advanced: AdvancedStats,
    pub trends: Trends,
    pub data_quality: DataQuality,
    pub vip: Option<VipStats>,
}
impl FeatureSet {
    pub fn is_derby(&self) -> bool {
        match &self.vip {
            Some(vip) => vip.psychology.is_derby,
            None => self.basic.importance >= DERBY_IMPORTANCE,
        }
    }
}

/// Extracts the standard features, without the enhanced statistics block.
pub fn extract_standard(store: &MatchRecordStore, context: &MatchContext) -> FeatureSet {
    let team1_perspectives = chronological(store.perspectives(Side::Team1));
    let team2_perspectives = chronological(store.perspectives(Side::Team2));
    let team1 = TeamStats::from_perspectives(&team1_perspectives);
    let team2 = TeamStats::from_perspectives(&team2_perspectives);

    let ranking_gap = match (context.teams.team1.ranking, context.teams.team2.ranking) {
        (Some(ranking1), Some(ranking2)) => ranking2 as f64 - ranking1 as f64,
        _ => 0.0,
    };
    let advanced = AdvancedStats {
        team1: strength(&team1, &team2, &team1_perspectives),
        team2: strength(&team2, &team1, &team2_perspectives),
    };
    let trends = Trends {
        team1: TeamTrend::from_chronological(&team1_perspectives),
        team2: TeamTrend::from_chronological(&team2_perspectives),
    };
    let basic = BasicStats {
        team1,
        team2,
        head_to_head: HeadToHeadStats::from_store(store),
        totals: TotalsStats::from_store(store),
        ranking_gap,
        location_factor: context.location.factor(),
        importance: context.importance,
    };
    let data_quality = DataQuality::assess(store);
    debug!(
        "extracted standard features from {} records ({} tier)",
        data_quality.total_matches, data_quality.tier
    );
    FeatureSet {
        basic,
        advanced,
        trends,
        data_quality,
        vip: None,
    }
}

/// Extracts the standard features together with the enhanced statistics block.
pub fn extract_enhanced(store: &MatchRecordStore, context: &MatchContext) -> FeatureSet {
    let mut features = extract_standard(store, context);
    features.vip = Some(vip::extract(store, context));
    features
}

pub(crate) fn mean_by(perspectives: &[Perspective], f: impl Fn(&Perspective) -> f64) -> f64 {
    perspectives.iter().map(f).collect::<Vec<_>>().mean()
}

fn chronological(mut perspectives: Vec<Perspective>) -> Vec<Perspective> {
    perspectives.sort_by_key(Perspective::timestamp);
    perspectives
}

/// Up to `RECENT_MATCHES` matches, newest first. Matches on the same date keep their relative
/// order, with head-to-head ahead of other opponents.
pub(crate) fn recent<'a>(perspectives: &[Perspective<'a>]) -> Vec<Perspective<'a>> {
    let mut newest_first = perspectives.to_vec();
    newest_first.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    newest_first.truncate(RECENT_MATCHES);
    newest_first
}

/// Recency-weighted mean of match points over `newest_first`; neutral when empty.
pub(crate) fn weighted_form(newest_first: &[Perspective]) -> f64 {
    let (mut weighted_points, mut weight_sum) = (0.0, 0.0);
    for (index, perspective) in newest_first.iter().enumerate() {
        let weight = RECENCY_DECAY.powi(index as i32);
        weighted_points += perspective.result().points() * weight;
        weight_sum += weight;
    }
    ratio_or(weighted_points, weight_sum, NEUTRAL_FORM)
}

fn strength(team: &TeamStats, other: &TeamStats, perspectives: &[Perspective]) -> TeamStrength {
    let with_data = [team, other]
        .into_iter()
        .filter(|stats| stats.matches > 0)
        .collect::<Vec<_>>();
    let baseline_scored = with_data.iter().map(|stats| stats.avg_scored).collect::<Vec<_>>().mean();
    let baseline_conceded = with_data.iter().map(|stats| stats.avg_conceded).collect::<Vec<_>>().mean();

    let attack = if team.matches == 0 || baseline_scored == 0.0 {
        1.0
    } else {
        (team.avg_scored / baseline_scored).clamp(0.0, MAX_STRENGTH)
    };
    let defense = if team.matches == 0 || baseline_conceded == 0.0 {
        1.0
    } else if team.avg_conceded == 0.0 {
        MAX_STRENGTH
    } else {
        (baseline_conceded / team.avg_conceded).clamp(0.0, MAX_STRENGTH)
    };
    let form_rating = weighted_form(&recent(perspectives));
    TeamStrength {
        attack,
        defense,
        form_rating,
        momentum_index: form_rating - team.points_rate,
        home_advantage: HOME_ADVANTAGE_BASE * (0.5 + team.win_rate),
    }
}
