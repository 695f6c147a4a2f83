//! Historical match records and the store that files them by category.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tinyrand::Rand;
use tracing::{debug, warn};

use crate::domain::{
    BettingLines, Category, Handicap, MatchOutcome, Pair, PointSpread, Side, TeamResult, Teams, TotalLine, Verdict,
};
use crate::enrich::{enrich, Enrichment, ShotStats};

/// Spacing between the synthetic timestamps assigned to consecutive ingested matches.
pub const MATCH_SPACING_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no scores given")]
    EmptySequence,

    #[error("'{0}' is not a score")]
    NotNumeric(String),

    #[error("score {0} is negative")]
    Negative(String),
}

/// Parses a comma-separated sequence of scores, e.g. `"2, 0, 1"`.
pub fn parse_scores(text: &str) -> Result<Vec<u8>, InputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::EmptySequence);
    }
    text.split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry.parse::<u8>().map_err(|_| match entry.parse::<i64>() {
                Ok(value) if value < 0 => InputError::Negative(entry.into()),
                _ => InputError::NotNumeric(entry.into()),
            })
        })
        .collect()
}

/// Pairs the focus team's scores with the opponents' scores, up to the length of the shorter
/// sequence.
pub fn pair_scores(focus: &[u8], opponent: &[u8]) -> Vec<Pair<u8>> {
    if focus.len() != opponent.len() {
        warn!(
            "score sequences differ in length ({} vs {}); pairing the first {}",
            focus.len(),
            opponent.len(),
            usize::min(focus.len(), opponent.len())
        );
    }
    focus
        .iter()
        .zip(opponent)
        .map(|(&focus, &opponent)| Pair::new(focus, opponent))
        .collect()
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SpreadCover {
    #[strum(serialize = "Favorite Covered")]
    FavoriteCovered,
    #[strum(serialize = "Underdog Covered")]
    UnderdogCovered,
    Push,
}

/// Whether the favourite covered a positive `spread`. `None` when no spread is in effect.
pub fn spread_cover(score: &Pair<u8>, favourite_is_focus: bool, spread: f64) -> Option<SpreadCover> {
    if spread <= 0.0 || !spread.is_finite() {
        return None;
    }
    let score = if favourite_is_focus { *score } else { score.swap() };
    let adjusted = score.focus as f64 - spread;
    let underdog = score.opponent as f64;
    Some(if adjusted > underdog {
        SpreadCover::FavoriteCovered
    } else if adjusted < underdog {
        SpreadCover::UnderdogCovered
    } else {
        SpreadCover::Push
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalOutcome {
    pub line: TotalLine,
    pub over: bool,
    pub under: bool,
}

/// Settlement of a handicap given to either participant of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandicapOutcome {
    pub handicap: Handicap,
    pub focus: Verdict,
    pub opponent: Verdict,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub category: Category,
    /// 1-based position within the category at ingestion.
    pub match_number: usize,
    pub score: Pair<u8>,
    pub timestamp: DateTime<Utc>,
    pub half_time: Pair<u8>,
    pub shots: Pair<ShotStats>,
    pub possession: Pair<f64>,
    pub over_under: Vec<TotalOutcome>,
    pub handicaps: Vec<HandicapOutcome>,
    pub spread_cover: Option<SpreadCover>,
    pub total_over_line: Option<bool>,
}
impl MatchRecord {
    pub fn new(
        category: Category,
        match_number: usize,
        score: Pair<u8>,
        timestamp: DateTime<Utc>,
        enrichment: Enrichment,
    ) -> Self {
        let over_under = TotalLine::MENU
            .iter()
            .map(|&line| {
                let over = line.settle_over(score.total()) == Verdict::Win;
                TotalOutcome {
                    line,
                    over,
                    under: !over,
                }
            })
            .collect();
        let handicaps = Handicap::MENU
            .iter()
            .map(|&handicap| HandicapOutcome {
                handicap,
                focus: handicap.settle(score.focus, score.opponent),
                opponent: handicap.settle(score.opponent, score.focus),
            })
            .collect();
        Self {
            category,
            match_number,
            score,
            timestamp,
            half_time: enrichment.half_time,
            shots: enrichment.shots,
            possession: enrichment.possession,
            over_under,
            handicaps,
            spread_cover: None,
            total_over_line: None,
        }
    }

    pub fn total(&self) -> u16 {
        self.score.total()
    }

    pub fn margin(&self) -> u8 {
        self.score.margin()
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.score.outcome()
    }

    pub fn label(&self, teams: &Teams) -> String {
        self.outcome().label(teams, self.category)
    }

    pub fn total_outcome(&self, line: TotalLine) -> Option<&TotalOutcome> {
        self.over_under.iter().find(|outcome| outcome.line == line)
    }

    pub fn handicap_outcome(&self, handicap: Handicap) -> Option<&HandicapOutcome> {
        self.handicaps.iter().find(|outcome| outcome.handicap == handicap)
    }

    /// Recomputes the fields derived from the configured total line and point spread.
    pub fn apply_lines(&mut self, total_line: Option<f64>, point_spread: Option<&PointSpread>) {
        self.total_over_line = total_line
            .filter(|&line| line > 0.0)
            .map(|line| self.total() as f64 > line);
        self.spread_cover = point_spread.and_then(|spread| {
            spread_cover(&self.score, spread.direction == self.category.focus(), spread.value)
        });
    }

    /// The record as seen by `side`, or `None` if that team did not take part.
    pub fn perspective(&self, side: Side) -> Option<Perspective<'_>> {
        if !self.category.involves(side) {
            return None;
        }
        let focus = self.category.focus() == side;
        Some(Perspective {
            record: self,
            scored: *self.score.get(focus),
            conceded: *self.score.get(!focus),
            half_time_scored: *self.half_time.get(focus),
            half_time_conceded: *self.half_time.get(!focus),
            shots: self.shots.get(focus),
            possession: *self.possession.get(focus),
        })
    }
}

/// One team's view of a record, with fields named from that team's point of view.
#[derive(Clone, Copy, Debug)]
pub struct Perspective<'a> {
    pub record: &'a MatchRecord,
    pub scored: u8,
    pub conceded: u8,
    pub half_time_scored: u8,
    pub half_time_conceded: u8,
    pub shots: &'a ShotStats,
    pub possession: f64,
}
impl Perspective<'_> {
    pub fn result(&self) -> TeamResult {
        TeamResult::of(self.scored, self.conceded)
    }

    pub fn half_time_result(&self) -> TeamResult {
        TeamResult::of(self.half_time_scored, self.half_time_conceded)
    }

    pub fn goal_difference(&self) -> f64 {
        self.scored as f64 - self.conceded as f64
    }

    pub fn second_half_scored(&self) -> u8 {
        self.scored - self.half_time_scored
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.record.timestamp
    }
}

/// Holds the historical records of the two teams, one collection per [`Category`], each ordered
/// oldest to newest.
#[derive(Clone, Debug, Default)]
pub struct MatchRecordStore {
    head_to_head: Vec<MatchRecord>,
    team1: Vec<MatchRecord>,
    team2: Vec<MatchRecord>,
    total_line: Option<f64>,
    point_spread: Option<PointSpread>,
}
impl MatchRecordStore {
    pub fn records(&self, category: Category) -> &[MatchRecord] {
        match category {
            Category::HeadToHead => &self.head_to_head,
            Category::Team1VsOther => &self.team1,
            Category::Team2VsOther => &self.team2,
        }
    }

    pub(crate) fn records_mut(&mut self, category: Category) -> &mut Vec<MatchRecord> {
        match category {
            Category::HeadToHead => &mut self.head_to_head,
            Category::Team1VsOther => &mut self.team1,
            Category::Team2VsOther => &mut self.team2,
        }
    }

    /// Replaces every record in `category` with freshly enriched records built from `scores`,
    /// listed oldest first. The newest match is dated one week before `as_of`, with earlier
    /// matches at weekly intervals before it. Returns the number of records ingested.
    pub fn replace(
        &mut self,
        category: Category,
        scores: &[Pair<u8>],
        as_of: DateTime<Utc>,
        rand: &mut impl Rand,
    ) -> usize {
        let count = scores.len();
        let (total_line, point_spread) = (self.total_line, self.point_spread);
        let mut records = scores
            .iter()
            .enumerate()
            .map(|(index, score)| {
                let timestamp = as_of - Duration::days(MATCH_SPACING_DAYS * (count - index) as i64);
                let mut record = MatchRecord::new(category, index + 1, *score, timestamp, enrich(score, rand));
                record.apply_lines(total_line, point_spread.as_ref());
                record
            })
            .collect::<Vec<_>>();
        records.sort_by_key(|record| record.timestamp);
        *self.records_mut(category) = records;
        debug!("ingested {count} records under {category}");
        count
    }

    pub fn clear(&mut self) {
        self.head_to_head.clear();
        self.team1.clear();
        self.team2.clear();
    }

    /// Records the configured lines and recomputes the line-dependent fields of every record.
    pub fn apply_lines(&mut self, lines: &BettingLines) {
        self.total_line = lines.total_line;
        self.point_spread = lines.point_spread;
        let (total_line, point_spread) = (self.total_line, self.point_spread);
        for category in [Category::HeadToHead, Category::Team1VsOther, Category::Team2VsOther] {
            for record in self.records_mut(category) {
                record.apply_lines(total_line, point_spread.as_ref());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.head_to_head.len() + self.team1.len() + self.team2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records: head-to-head first, then team 1's and team 2's other matches.
    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.head_to_head.iter().chain(&self.team1).chain(&self.team2)
    }

    /// Every match that `side` played, head-to-head first and then against other opponents.
    pub fn perspectives(&self, side: Side) -> Vec<Perspective<'_>> {
        self.head_to_head
            .iter()
            .chain(self.records(Category::against_others(side)))
            .filter_map(|record| record.perspective(side))
            .collect()
    }
}

#[cfg(test)]
mod tests;
