//! Betting lines, held in half-goal units. Settlement, including pushes on whole lines, reduces
//! to integer comparisons.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Score, Side, Teams};

const MAX_LINE_GOALS: f64 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidLine {
    #[error("line {0} is not a finite number")]
    NotFinite(f64),

    #[error("line {0} is not a multiple of 0.5")]
    NotHalfGoal(f64),

    #[error("line {0} is outside of the supported range")]
    OutOfRange(f64),
}

fn to_halves(value: f64) -> Result<i16, InvalidLine> {
    if !value.is_finite() {
        return Err(InvalidLine::NotFinite(value));
    }
    if value.abs() > MAX_LINE_GOALS {
        return Err(InvalidLine::OutOfRange(value));
    }
    let halves = value * 2.0;
    if (halves - halves.round()).abs() > 1e-9 {
        return Err(InvalidLine::NotHalfGoal(value));
    }
    Ok(halves.round() as i16)
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Verdict {
    Win,
    Push,
    Loss,
}
impl Verdict {
    fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Verdict::Win,
            Ordering::Equal => Verdict::Push,
            Ordering::Less => Verdict::Loss,
        }
    }

    pub fn flip(&self) -> Verdict {
        match self {
            Verdict::Win => Verdict::Loss,
            Verdict::Push => Verdict::Push,
            Verdict::Loss => Verdict::Win,
        }
    }
}

/// A total-goals line. `TotalLine::from_halves(5)` is the 2.5 line.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TotalLine(u8);
impl TotalLine {
    /// The thresholds whose outcomes are precomputed for every record.
    pub const MENU: [TotalLine; 4] = [TotalLine(1), TotalLine(3), TotalLine(5), TotalLine(7)];

    pub const fn from_halves(halves: u8) -> Self {
        Self(halves)
    }

    pub fn halves(&self) -> u8 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub fn is_whole(&self) -> bool {
        self.0 % 2 == 0
    }

    /// Settles a bet on the over, given the total goals scored.
    pub fn settle_over(&self, total: u16) -> Verdict {
        Verdict::from_ordering((total * 2).cmp(&(self.0 as u16)))
    }
}
impl TryFrom<f64> for TotalLine {
    type Error = InvalidLine;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let halves = to_halves(value)?;
        if halves < 0 {
            return Err(InvalidLine::OutOfRange(value));
        }
        Ok(Self(halves as u8))
    }
}
impl From<TotalLine> for f64 {
    fn from(line: TotalLine) -> Self {
        line.value()
    }
}
impl Display for TotalLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// An Asian handicap applied to one side's score. Negative handicaps are given to the favourite.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Handicap(i8);
impl Handicap {
    /// The handicaps, from -2.5 to +2.5 in half-goal steps, whose outcomes are precomputed for every
    /// record.
    pub const MENU: [Handicap; 11] = [
        Handicap(-5),
        Handicap(-4),
        Handicap(-3),
        Handicap(-2),
        Handicap(-1),
        Handicap(0),
        Handicap(1),
        Handicap(2),
        Handicap(3),
        Handicap(4),
        Handicap(5),
    ];

    pub const fn from_halves(halves: i8) -> Self {
        Self(halves)
    }

    pub fn halves(&self) -> i8 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub fn is_whole(&self) -> bool {
        self.0 % 2 == 0
    }

    /// The same line from the opposing side's point of view.
    pub fn flip(&self) -> Handicap {
        Handicap(-self.0)
    }

    /// Settles a bet on the side receiving this handicap, given that side's score and the opposing
    /// score. A push occurs exactly when the adjusted score equals the opposing score.
    pub fn settle(&self, own: u8, opposing: u8) -> Verdict {
        let adjusted = own as i16 * 2 + self.0 as i16;
        Verdict::from_ordering(adjusted.cmp(&(opposing as i16 * 2)))
    }
}
impl TryFrom<f64> for Handicap {
    type Error = InvalidLine;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Ok(Self(to_halves(value)? as i8))
    }
}
impl From<Handicap> for f64 {
    fn from(handicap: Handicap) -> Self {
        handicap.value()
    }
}
impl Display for Handicap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "0"),
            halves if halves % 2 == 0 => write!(f, "{:+}", halves / 2),
            _ => write!(f, "{:+.1}", self.value()),
        }
    }
}

/// A point spread of `value` goals given by the favourite named in `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointSpread {
    pub value: f64,
    #[serde(default = "default_direction")]
    pub direction: Side,
}
impl PointSpread {
    pub fn new(value: f64, direction: Side) -> Self {
        Self { value, direction }
    }

    /// The spread as a handicap on the favourite.
    pub fn favourite_handicap(&self) -> Result<Handicap, InvalidLine> {
        Handicap::try_from(-self.value)
    }
}

fn default_direction() -> Side {
    Side::Team1
}

/// A wager that can be settled against a full-time score of the upcoming match.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Over(TotalLine),
    Under(TotalLine),
    Handicap(Side, Handicap),
}
impl Selection {
    pub fn settle(&self, score: &Score) -> Verdict {
        match self {
            Selection::Over(line) => line.settle_over(score.total()),
            Selection::Under(line) => line.settle_over(score.total()).flip(),
            Selection::Handicap(side, handicap) => {
                handicap.settle(score.goals(*side), score.goals(side.flip()))
            }
        }
    }

    pub fn label(&self, teams: &Teams) -> String {
        match self {
            Selection::Over(line) => format!("Over {line}"),
            Selection::Under(line) => format!("Under {line}"),
            Selection::Handicap(side, handicap) => format!("{} {handicap}", teams.name(*side)),
        }
    }
}

/// The lines configured for the upcoming match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BettingLines {
    /// Headline total-goals line, also used to mark each record as over or under.
    #[serde(default)]
    pub total_line: Option<f64>,

    #[serde(default)]
    pub point_spread: Option<PointSpread>,

    /// Selected over/under thresholds.
    #[serde(default)]
    pub totals: Vec<TotalLine>,

    /// Selected handicaps on team 1; each is also priced from team 2's side.
    #[serde(default)]
    pub handicaps: Vec<Handicap>,
}
impl BettingLines {
    /// Every selection implied by the configured lines, without duplicates. Headline lines that
    /// cannot be expressed in half-goal units are skipped with a warning.
    pub fn selections(&self) -> Vec<Selection> {
        let mut selections = vec![];
        let mut push = |selection: Selection| {
            if !selections.contains(&selection) {
                selections.push(selection);
            }
        };

        if let Some(total_line) = self.total_line {
            match TotalLine::try_from(total_line) {
                Ok(line) => {
                    push(Selection::Over(line));
                    push(Selection::Under(line));
                }
                Err(err) => warn!("total line not priced: {err}"),
            }
        }
        for &line in &self.totals {
            push(Selection::Over(line));
            push(Selection::Under(line));
        }
        if let Some(spread) = &self.point_spread {
            match spread.favourite_handicap() {
                Ok(handicap) => {
                    push(Selection::Handicap(spread.direction, handicap));
                    push(Selection::Handicap(spread.direction.flip(), handicap.flip()));
                }
                Err(err) => warn!("point spread not priced: {err}"),
            }
        }
        for &handicap in &self.handicaps {
            push(Selection::Handicap(Side::Team1, handicap));
            push(Selection::Handicap(Side::Team2, handicap.flip()));
        }
        selections
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::TeamInfo;

    use super::*;

    #[test]
    fn total_line_from_f64() {
        assert_eq!(Ok(TotalLine(5)), TotalLine::try_from(2.5));
        assert_eq!(Ok(TotalLine(6)), TotalLine::try_from(3.0));
        assert_eq!(Err(InvalidLine::NotHalfGoal(2.3)), TotalLine::try_from(2.3));
        assert_eq!(Err(InvalidLine::OutOfRange(-0.5)), TotalLine::try_from(-0.5));
        assert!(matches!(TotalLine::try_from(f64::NAN), Err(InvalidLine::NotFinite(_))));
    }

    #[test]
    fn total_line_settlement() {
        let line = TotalLine::try_from(2.5).unwrap();
        assert_eq!(Verdict::Win, line.settle_over(3));
        assert_eq!(Verdict::Loss, line.settle_over(2));
        let line = TotalLine::try_from(3.5).unwrap();
        assert_eq!(Verdict::Loss, line.settle_over(3));
        let line = TotalLine::try_from(2.0).unwrap();
        assert!(line.is_whole());
        assert_eq!(Verdict::Push, line.settle_over(2));
    }

    #[test]
    fn handicap_settlement() {
        let minus_half = Handicap::try_from(-0.5).unwrap();
        assert_eq!(Verdict::Win, minus_half.settle(2, 1));
        assert_eq!(Verdict::Loss, minus_half.settle(1, 1));

        let minus_one = Handicap::try_from(-1.0).unwrap();
        assert_eq!(Verdict::Push, minus_one.settle(2, 1));
        assert_eq!(Verdict::Win, minus_one.settle(3, 1));
        assert_eq!(Verdict::Loss, minus_one.settle(1, 1));

        let level = Handicap::from_halves(0);
        assert_eq!(Verdict::Push, level.settle(2, 2));
        assert_eq!(Verdict::Push, level.flip().settle(2, 2));
    }

    #[test]
    fn handicap_display() {
        assert_eq!("0", Handicap::from_halves(0).to_string());
        assert_eq!("-2", Handicap::from_halves(-4).to_string());
        assert_eq!("+1", Handicap::from_halves(2).to_string());
        assert_eq!("-0.5", Handicap::from_halves(-1).to_string());
        assert_eq!("+2.5", Handicap::from_halves(5).to_string());
    }

    #[test]
    fn menus() {
        let totals = TotalLine::MENU.iter().map(TotalLine::value).collect::<Vec<_>>();
        assert_eq!(vec![0.5, 1.5, 2.5, 3.5], totals);
        assert_eq!(-2.5, Handicap::MENU[0].value());
        assert_eq!(2.5, Handicap::MENU[10].value());
    }

    #[test]
    fn selection_settlement() {
        let score = Score::new(1, 2);
        let two_and_half = TotalLine::from_halves(5);
        assert_eq!(Verdict::Win, Selection::Over(two_and_half).settle(&score));
        assert_eq!(Verdict::Loss, Selection::Under(two_and_half).settle(&score));

        let plus_one = Handicap::from_halves(2);
        assert_eq!(Verdict::Push, Selection::Handicap(Side::Team1, plus_one).settle(&score));
        assert_eq!(Verdict::Win, Selection::Handicap(Side::Team2, plus_one).settle(&score));
    }

    #[test]
    fn selection_labels() {
        let teams = Teams {
            team1: TeamInfo::new("Liverpool", Some(4)),
            team2: TeamInfo::new("Manchester City", Some(2)),
        };
        assert_eq!("Over 2.5", Selection::Over(TotalLine::from_halves(5)).label(&teams));
        assert_eq!(
            "Manchester City -1",
            Selection::Handicap(Side::Team2, Handicap::from_halves(-2)).label(&teams)
        );
    }

    #[test]
    fn spread_as_handicap() {
        let spread = PointSpread::new(1.0, Side::Team2);
        assert_eq!(Ok(Handicap::from_halves(-2)), spread.favourite_handicap());
        assert!(PointSpread::new(0.3, Side::Team1).favourite_handicap().is_err());
    }

    #[test]
    fn selections_from_lines() {
        let lines = BettingLines {
            total_line: Some(2.5),
            point_spread: Some(PointSpread::new(0.5, Side::Team1)),
            totals: vec![TotalLine::from_halves(5), TotalLine::from_halves(3)],
            handicaps: vec![Handicap::from_halves(-1), Handicap::from_halves(2)],
        };
        let two_and_half = TotalLine::from_halves(5);
        let one_and_half = TotalLine::from_halves(3);
        assert_eq!(
            vec![
                Selection::Over(two_and_half),
                Selection::Under(two_and_half),
                Selection::Over(one_and_half),
                Selection::Under(one_and_half),
                Selection::Handicap(Side::Team1, Handicap::from_halves(-1)),
                Selection::Handicap(Side::Team2, Handicap::from_halves(1)),
                Selection::Handicap(Side::Team1, Handicap::from_halves(2)),
                Selection::Handicap(Side::Team2, Handicap::from_halves(-2)),
            ],
            lines.selections()
        );
    }

    #[test]
    fn unpriceable_headline_lines_are_skipped() {
        let lines = BettingLines {
            total_line: Some(2.25),
            point_spread: Some(PointSpread::new(0.75, Side::Team2)),
            ..BettingLines::default()
        };
        assert!(lines.selections().is_empty());
    }

    #[test]
    fn serde_as_decimal() {
        let line: TotalLine = serde_json::from_str("2.5").unwrap();
        assert_eq!(TotalLine::from_halves(5), line);
        assert_eq!("-0.5", serde_json::to_string(&Handicap::from_halves(-1)).unwrap());
        assert!(serde_json::from_str::<Handicap>("0.25").is_err());
    }
}
