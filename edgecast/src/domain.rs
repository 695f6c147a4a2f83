use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub mod line;

pub use line::{BettingLines, Handicap, InvalidLine, PointSpread, Selection, TotalLine, Verdict};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum Side {
    Team1,
    Team2,
}
impl Side {
    pub fn flip(&self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

/// The three collections that historical matches are filed under.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum Category {
    #[strum(serialize = "Head-to-head")]
    HeadToHead,
    #[strum(serialize = "Team 1 vs other")]
    Team1VsOther,
    #[strum(serialize = "Team 2 vs other")]
    Team2VsOther,
}
impl Category {
    /// The team whose score occupies the focus slot of records in this category.
    pub fn focus(&self) -> Side {
        match self {
            Category::HeadToHead | Category::Team1VsOther => Side::Team1,
            Category::Team2VsOther => Side::Team2,
        }
    }

    pub fn involves(&self, side: Side) -> bool {
        match self {
            Category::HeadToHead => true,
            Category::Team1VsOther => side == Side::Team1,
            Category::Team2VsOther => side == Side::Team2,
        }
    }

    /// The category holding a team's matches against other opponents.
    pub fn against_others(side: Side) -> Category {
        match side {
            Side::Team1 => Category::Team1VsOther,
            Side::Team2 => Category::Team2VsOther,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Home,
    Away,
    #[default]
    Neutral,
}
impl Location {
    /// +1 when team 1 is at home, -1 when away, 0 at a neutral venue.
    pub fn factor(&self) -> f64 {
        match self {
            Location::Home => 1.0,
            Location::Away => -1.0,
            Location::Neutral => 0.0,
        }
    }
}

/// A value held for each of the two participants of a recorded match, named by role rather than by
/// slot. The focus is the team a record is filed for; the opponent is whoever they played.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair<T> {
    pub focus: T,
    pub opponent: T,
}
impl<T> Pair<T> {
    pub fn new(focus: T, opponent: T) -> Self {
        Self { focus, opponent }
    }

    pub fn swap(self) -> Self {
        Self {
            focus: self.opponent,
            opponent: self.focus,
        }
    }

    pub fn get(&self, focus: bool) -> &T {
        if focus {
            &self.focus
        } else {
            &self.opponent
        }
    }
}
impl Pair<u8> {
    pub fn total(&self) -> u16 {
        self.focus as u16 + self.opponent as u16
    }

    pub fn margin(&self) -> u8 {
        self.focus.abs_diff(self.opponent)
    }

    pub fn outcome(&self) -> MatchOutcome {
        match self.focus.cmp(&self.opponent) {
            std::cmp::Ordering::Greater => MatchOutcome::FocusWin,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
            std::cmp::Ordering::Less => MatchOutcome::OpponentWin,
        }
    }
}

/// A full-time score of the upcoming match, as projected or simulated.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub team1: u8,
    pub team2: u8,
}
impl Score {
    pub fn new(team1: u8, team2: u8) -> Self {
        Self { team1, team2 }
    }

    pub fn nil_all() -> Self {
        Self { team1: 0, team2: 0 }
    }

    pub fn total(&self) -> u16 {
        self.team1 as u16 + self.team2 as u16
    }

    pub fn goals(&self, side: Side) -> u8 {
        match side {
            Side::Team1 => self.team1,
            Side::Team2 => self.team2,
        }
    }

    /// The winning side, or `None` for a draw.
    pub fn winner(&self) -> Option<Side> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(Side::Team1),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some(Side::Team2),
        }
    }
}
impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.team1, self.team2)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    FocusWin,
    Draw,
    OpponentWin,
}
impl MatchOutcome {
    /// Renders the outcome for display, e.g. "Arsenal Wins", "Opponent Wins" or "Draw".
    pub fn label(&self, teams: &Teams, category: Category) -> String {
        match self {
            MatchOutcome::FocusWin => format!("{} Wins", teams.name(category.focus())),
            MatchOutcome::Draw => "Draw".into(),
            MatchOutcome::OpponentWin => match category {
                Category::HeadToHead => format!("{} Wins", teams.name(Side::Team2)),
                _ => "Opponent Wins".into(),
            },
        }
    }
}

/// A result seen from one team's point of view.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TeamResult {
    Win,
    Draw,
    Loss,
}
impl TeamResult {
    pub fn of(scored: u8, conceded: u8) -> Self {
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => TeamResult::Win,
            std::cmp::Ordering::Equal => TeamResult::Draw,
            std::cmp::Ordering::Less => TeamResult::Loss,
        }
    }

    /// 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn points(&self) -> f64 {
        match self {
            TeamResult::Win => 1.0,
            TeamResult::Draw => 0.5,
            TeamResult::Loss => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    #[serde(default)]
    pub ranking: Option<u16>,
}
impl TeamInfo {
    pub fn new(name: impl Into<String>, ranking: Option<u16>) -> Self {
        Self {
            name: name.into(),
            ranking,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub team1: TeamInfo,
    pub team2: TeamInfo,
}
impl Teams {
    pub fn get(&self, side: Side) -> &TeamInfo {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn name(&self, side: Side) -> &str {
        &self.get(side).name
    }
}
