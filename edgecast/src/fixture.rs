//! Analysis fixtures: a request together with the raw score sequences of each category, as typed
//! by the user. Two demonstration fixtures are built in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tinyrand::Rand;
use tracing::info;

use crate::domain::{Category, Location, Pair, PointSpread, Side, TeamInfo, Teams};
use crate::domain::{BettingLines, Handicap, TotalLine};
use crate::engine::AnalysisRequest;
use crate::record::{pair_scores, parse_scores, InputError, MatchRecordStore};

/// Comma-separated scores of the focus team and of its opponents, oldest match first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    #[serde(default)]
    pub own: String,
    #[serde(default)]
    pub opponent: String,
}
impl ScoreSheet {
    pub fn new(own: impl Into<String>, opponent: impl Into<String>) -> Self {
        Self {
            own: own.into(),
            opponent: opponent.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.own.trim().is_empty() && self.opponent.trim().is_empty()
    }

    /// The paired scores; a blank sheet has none.
    pub fn parse(&self) -> Result<Vec<Pair<u8>>, InputError> {
        if self.is_blank() {
            return Ok(vec![]);
        }
        Ok(pair_scores(&parse_scores(&self.own)?, &parse_scores(&self.opponent)?))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub request: AnalysisRequest,

    /// Reference date for the synthetic match timestamps; the current time when absent.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,

    #[serde(default)]
    pub head_to_head: ScoreSheet,

    /// Team 1's matches against other opponents.
    #[serde(default)]
    pub team1: ScoreSheet,

    /// Team 2's matches against other opponents.
    #[serde(default)]
    pub team2: ScoreSheet,
}
impl Fixture {
    pub fn sheet(&self, category: Category) -> &ScoreSheet {
        match category {
            Category::HeadToHead => &self.head_to_head,
            Category::Team1VsOther => &self.team1,
            Category::Team2VsOther => &self.team2,
        }
    }

    /// Replaces the store's lines and records with those of the fixture. Every sheet is parsed
    /// before the store is touched, so a malformed sheet leaves the store unchanged. Returns the
    /// number of records ingested.
    pub fn populate(&self, store: &mut MatchRecordStore, rand: &mut impl Rand) -> Result<usize, InputError> {
        let categories = [Category::HeadToHead, Category::Team1VsOther, Category::Team2VsOther];
        let mut parsed = Vec::with_capacity(categories.len());
        for category in categories {
            parsed.push((category, self.sheet(category).parse()?));
        }

        let as_of = self.as_of.unwrap_or_else(Utc::now);
        store.apply_lines(&self.request.lines);
        let mut ingested = 0;
        for (category, scores) in parsed {
            ingested += store.replace(category, &scores, as_of, rand);
        }
        info!(
            "loaded {ingested} records for {} v {}",
            self.request.teams.team1.name, self.request.teams.team2.name
        );
        Ok(ingested)
    }

    /// Liverpool v Manchester City at a neutral venue.
    pub fn standard_sample() -> Self {
        let mut request = AnalysisRequest::new(Teams {
            team1: TeamInfo::new("Liverpool", Some(4)),
            team2: TeamInfo::new("Manchester City", Some(2)),
        });
        request.lines = BettingLines {
            total_line: Some(2.5),
            point_spread: Some(PointSpread::new(1.0, Side::Team1)),
            totals: vec![TotalLine::from_halves(5)],
            handicaps: vec![Handicap::from_halves(-1)],
        };
        Self {
            request,
            as_of: None,
            head_to_head: ScoreSheet::new("1,2,1,2,0", "1,2,0,1,1"),
            team1: ScoreSheet::new("2,3,1,0,2,3", "0,1,0,0,1,1"),
            team2: ScoreSheet::new("3,2,1,3,4,2", "0,0,0,1,1,2"),
        }
    }

    /// Arsenal v Tottenham: a derby, with Arsenal at home.
    pub fn vip_sample() -> Self {
        let mut request = AnalysisRequest::new(Teams {
            team1: TeamInfo::new("Arsenal", Some(3)),
            team2: TeamInfo::new("Tottenham", Some(5)),
        });
        request.importance = 1.5;
        request.location = Location::Home;
        request.lines = BettingLines {
            total_line: Some(2.5),
            point_spread: Some(PointSpread::new(0.5, Side::Team1)),
            totals: vec![TotalLine::from_halves(5)],
            handicaps: vec![Handicap::from_halves(-1)],
        };
        Self {
            request,
            as_of: None,
            head_to_head: ScoreSheet::new("2,3,0,4,1,2,1", "0,1,2,2,1,2,2"),
            team1: ScoreSheet::new("3,2,1,2,4,1,0,3,2", "1,0,1,0,2,0,0,2,1"),
            team2: ScoreSheet::new("3,1,2,0,2,1,3,0,2", "2,0,2,1,2,0,1,1,2"),
        }
    }
}
