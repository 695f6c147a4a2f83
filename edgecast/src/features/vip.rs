//! Enhanced statistics drawn from the enriched fields of each record: shot quality, possession
//! efficiency, half-time splits, momentum streaks and psychological factors.

use serde::{Deserialize, Serialize};

use crate::domain::{Location, Side, TeamResult};
use crate::features::{chronological, mean_by, recent, weighted_form, MatchContext, DERBY_IMPORTANCE};
use crate::probs::ratio_or;
use crate::record::{MatchRecordStore, Perspective};

/// Goal-difference ratio reported when a team scored without conceding.
pub const CLEAN_RECORD_RATIO: f64 = 3.0;

/// Rating assumed for comebacks and lead retention in the absence of qualifying matches.
pub const NEUTRAL_RESILIENCE: f64 = 0.5;

const HOME_PSYCHOLOGY_WEIGHT: f64 = 0.2;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotProfile {
    pub total_shots: u32,
    pub on_target: u32,
    /// On target per shot.
    pub accuracy: f64,
    /// Goals per shot on target.
    pub conversion: f64,
    pub shots_per_game: f64,
    pub on_target_per_game: f64,
}
impl ShotProfile {
    pub fn from_perspectives(perspectives: &[Perspective]) -> Self {
        let matches = perspectives.len() as f64;
        let total_shots = perspectives.iter().map(|p| p.shots.total as u32).sum::<u32>();
        let on_target = perspectives.iter().map(|p| p.shots.on_target as u32).sum::<u32>();
        let goals = perspectives.iter().map(|p| p.scored as u32).sum::<u32>();
        Self {
            total_shots,
            on_target,
            accuracy: ratio_or(on_target as f64, total_shots as f64, 0.0),
            conversion: ratio_or(goals as f64, on_target as f64, 0.0),
            shots_per_game: ratio_or(total_shots as f64, matches, 0.0),
            on_target_per_game: ratio_or(on_target as f64, matches, 0.0),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotData {
    pub team1: ShotProfile,
    pub team2: ShotProfile,
    pub accuracy_advantage: f64,
    pub conversion_advantage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PossessionProfile {
    /// Average share of possession, in percent; 50 without matches.
    pub avg_possession: f64,
    /// Average of goals per ten points of possession.
    pub efficiency: f64,
}
impl PossessionProfile {
    pub fn from_perspectives(perspectives: &[Perspective]) -> Self {
        if perspectives.is_empty() {
            return Self {
                avg_possession: 50.0,
                efficiency: 0.0,
            };
        }
        Self {
            avg_possession: mean_by(perspectives, |p| p.possession),
            efficiency: mean_by(perspectives, |p| ratio_or(p.scored as f64, p.possession / 10.0, 0.0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PossessionData {
    pub team1: PossessionProfile,
    pub team2: PossessionProfile,
    pub possession_advantage: f64,
    pub efficiency_advantage: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HalfTimeProfile {
    /// Share of matches led at half time.
    pub lead_rate: f64,
    /// Share of matches level at half time.
    pub level_rate: f64,
    pub second_half_avg_goals: f64,
}
impl HalfTimeProfile {
    pub fn from_perspectives(perspectives: &[Perspective]) -> Self {
        let matches = perspectives.len() as f64;
        let count = |result: TeamResult| {
            perspectives
                .iter()
                .filter(|p| p.half_time_result() == result)
                .count() as f64
        };
        Self {
            lead_rate: ratio_or(count(TeamResult::Win), matches, 0.0),
            level_rate: ratio_or(count(TeamResult::Draw), matches, 0.0),
            second_half_avg_goals: mean_by(perspectives, |p| p.second_half_scored() as f64),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HalfTimeData {
    pub team1: HalfTimeProfile,
    pub team2: HalfTimeProfile,
    pub lead_rate_advantage: f64,
    pub second_half_advantage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub matches: usize,
    /// Recency-weighted points over the recent window; 0.5 without matches.
    pub form_rating: f64,
    pub win_streak: u32,
    pub unbeaten_streak: u32,
    pub lose_streak: u32,
    /// Goals scored over goals conceded in the recent window.
    pub goal_diff_ratio: f64,
    pub recent_goals_per_game: f64,
}
impl Momentum {
    /// `newest_first` holds the recent window, most recent match first. Streaks are run over the
    /// window in that order.
    pub fn from_recent(newest_first: &[Perspective]) -> Self {
        let (mut win_streak, mut unbeaten_streak, mut lose_streak) = (0, 0, 0);
        for perspective in newest_first {
            match perspective.result() {
                TeamResult::Win => {
                    win_streak += 1;
                    unbeaten_streak += 1;
                    lose_streak = 0;
                }
                TeamResult::Draw => {
                    win_streak = 0;
                    unbeaten_streak += 1;
                    lose_streak = 0;
                }
                TeamResult::Loss => {
                    win_streak = 0;
                    unbeaten_streak = 0;
                    lose_streak += 1;
                }
            }
        }

        let scored = newest_first.iter().map(|p| p.scored as f64).sum::<f64>();
        let conceded = newest_first.iter().map(|p| p.conceded as f64).sum::<f64>();
        let goal_diff_ratio = if conceded > 0.0 {
            scored / conceded
        } else if scored > 0.0 {
            CLEAN_RECORD_RATIO
        } else {
            1.0
        };
        Self {
            matches: newest_first.len(),
            form_rating: weighted_form(newest_first),
            win_streak,
            unbeaten_streak,
            lose_streak,
            goal_diff_ratio,
            recent_goals_per_game: ratio_or(scored, newest_first.len() as f64, 0.0),
        }
    }

    fn net_streak(&self) -> f64 {
        self.win_streak as f64 - self.lose_streak as f64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MomentumData {
    pub team1: Momentum,
    pub team2: Momentum,
    pub form_advantage: f64,
    /// Team 1's net streak (wins less losses) less team 2's.
    pub streak_advantage: f64,
    pub goal_diff_ratio_advantage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resilience {
    /// Share of half-time deficits that finished level or better.
    pub comeback_rating: f64,
    /// Share of half-time leads converted into wins.
    pub lead_retention: f64,
    pub trailed_at_half: usize,
    pub led_at_half: usize,
}
impl Resilience {
    pub fn from_perspectives(perspectives: &[Perspective]) -> Self {
        let trailed = perspectives
            .iter()
            .filter(|p| p.half_time_result() == TeamResult::Loss)
            .collect::<Vec<_>>();
        let recovered = trailed.iter().filter(|p| p.result() != TeamResult::Loss).count();
        let led = perspectives
            .iter()
            .filter(|p| p.half_time_result() == TeamResult::Win)
            .collect::<Vec<_>>();
        let held = led.iter().filter(|p| p.result() == TeamResult::Win).count();
        Self {
            comeback_rating: ratio_or(recovered as f64, trailed.len() as f64, NEUTRAL_RESILIENCE),
            lead_retention: ratio_or(held as f64, led.len() as f64, NEUTRAL_RESILIENCE),
            trailed_at_half: trailed.len(),
            led_at_half: led.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PsychologicalFactors {
    pub is_derby: bool,
    /// +1 when team 1 is at home, -1 when away, 0 at a neutral venue.
    pub home_advantage: f64,
    pub team1: Resilience,
    pub team2: Resilience,
    pub comeback_advantage: f64,
    pub lead_retention_advantage: f64,
    pub home_psychology: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VipStats {
    pub shots: ShotData,
    pub possession: PossessionData,
    pub half_time: HalfTimeData,
    pub momentum: MomentumData,
    pub psychology: PsychologicalFactors,
}

pub fn extract(store: &MatchRecordStore, context: &MatchContext) -> VipStats {
    let team1 = chronological(store.perspectives(Side::Team1));
    let team2 = chronological(store.perspectives(Side::Team2));

    let shots = {
        let (team1, team2) = (ShotProfile::from_perspectives(&team1), ShotProfile::from_perspectives(&team2));
        ShotData {
            accuracy_advantage: team1.accuracy - team2.accuracy,
            conversion_advantage: team1.conversion - team2.conversion,
            team1,
            team2,
        }
    };
    let possession = {
        let (team1, team2) = (
            PossessionProfile::from_perspectives(&team1),
            PossessionProfile::from_perspectives(&team2),
        );
        PossessionData {
            possession_advantage: team1.avg_possession - team2.avg_possession,
            efficiency_advantage: team1.efficiency - team2.efficiency,
            team1,
            team2,
        }
    };
    let half_time = {
        let (team1, team2) = (HalfTimeProfile::from_perspectives(&team1), HalfTimeProfile::from_perspectives(&team2));
        HalfTimeData {
            lead_rate_advantage: team1.lead_rate - team2.lead_rate,
            second_half_advantage: team1.second_half_avg_goals - team2.second_half_avg_goals,
            team1,
            team2,
        }
    };
    let momentum = {
        let (team1, team2) = (Momentum::from_recent(&recent(&team1)), Momentum::from_recent(&recent(&team2)));
        MomentumData {
            form_advantage: team1.form_rating - team2.form_rating,
            streak_advantage: team1.net_streak() - team2.net_streak(),
            goal_diff_ratio_advantage: team1.goal_diff_ratio - team2.goal_diff_ratio,
            team1,
            team2,
        }
    };
    let psychology = psychology(&team1, &team2, context.importance, context.location);
    VipStats {
        shots,
        possession,
        half_time,
        momentum,
        psychology,
    }
}

fn psychology(team1: &[Perspective], team2: &[Perspective], importance: f64, location: Location) -> PsychologicalFactors {
    let (team1, team2) = (Resilience::from_perspectives(team1), Resilience::from_perspectives(team2));
    let home_advantage = location.factor();
    PsychologicalFactors {
        is_derby: importance >= DERBY_IMPORTANCE,
        home_advantage,
        comeback_advantage: team1.comeback_rating - team2.comeback_rating,
        lead_retention_advantage: team1.lead_retention - team2.lead_retention,
        home_psychology: home_advantage * HOME_PSYCHOLOGY_WEIGHT,
        team1,
        team2,
    }
}
