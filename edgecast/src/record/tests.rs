use chrono::TimeZone;
use tinyrand::{Seeded, Wyrand};

use crate::domain::TeamInfo;

use super::*;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn pairs(focus: &[u8], opponent: &[u8]) -> Vec<Pair<u8>> {
    pair_scores(focus, opponent)
}

fn teams() -> Teams {
    Teams {
        team1: TeamInfo::new("Liverpool", Some(4)),
        team2: TeamInfo::new("Manchester City", Some(2)),
    }
}

#[test]
fn parse_valid_scores() {
    assert_eq!(Ok(vec![1, 2, 0, 4]), parse_scores("1,2, 0 ,4"));
    assert_eq!(Ok(vec![3]), parse_scores(" 3 "));
}

#[test]
fn parse_invalid_scores() {
    assert_eq!(Err(InputError::EmptySequence), parse_scores("  "));
    assert_eq!(Err(InputError::NotNumeric("x".into())), parse_scores("1,x,2"));
    assert_eq!(Err(InputError::NotNumeric("".into())), parse_scores("1,,2"));
    assert_eq!(Err(InputError::NotNumeric("1.5".into())), parse_scores("1.5"));
    assert_eq!(Err(InputError::Negative("-1".into())), parse_scores("2,-1"));
}

#[test]
fn pairing_truncates_to_shorter() {
    let pairs = pair_scores(&[1, 2, 3], &[0, 0]);
    assert_eq!(vec![Pair::new(1, 0), Pair::new(2, 0)], pairs);
}

#[test]
fn spread_cover_outcomes() {
    assert_eq!(Some(SpreadCover::FavoriteCovered), spread_cover(&Pair::new(2, 1), true, 0.5));
    assert_eq!(Some(SpreadCover::UnderdogCovered), spread_cover(&Pair::new(2, 1), false, 0.5));
    assert_eq!(Some(SpreadCover::Push), spread_cover(&Pair::new(2, 1), true, 1.0));
    assert_eq!(Some(SpreadCover::UnderdogCovered), spread_cover(&Pair::new(2, 2), true, 0.5));
    assert_eq!(None, spread_cover(&Pair::new(2, 2), true, 0.0));
    assert_eq!(None, spread_cover(&Pair::new(2, 2), true, -1.0));
}

#[test]
fn fixed_menu_outcomes() {
    let mut rand = Wyrand::seed(1);
    let score = Pair::new(2, 1);
    let record = MatchRecord::new(Category::HeadToHead, 1, score, as_of(), enrich(&score, &mut rand));
    assert_eq!(4, record.over_under.len());
    assert_eq!(11, record.handicaps.len());

    let over_2_5 = record.total_outcome(TotalLine::from_halves(5)).unwrap();
    assert!(over_2_5.over);
    assert!(!over_2_5.under);
    let over_3_5 = record.total_outcome(TotalLine::from_halves(7)).unwrap();
    assert!(!over_3_5.over);
    assert!(record.total_outcome(TotalLine::from_halves(9)).is_none());

    let minus_one = record.handicap_outcome(Handicap::from_halves(-2)).unwrap();
    assert_eq!(Verdict::Push, minus_one.focus);
    assert_eq!(Verdict::Loss, minus_one.opponent);
    let plus_one = record.handicap_outcome(Handicap::from_halves(2)).unwrap();
    assert_eq!(Verdict::Win, plus_one.focus);
    assert_eq!(Verdict::Push, plus_one.opponent);
    let minus_two_and_half = record.handicap_outcome(Handicap::from_halves(-5)).unwrap();
    assert_eq!(Verdict::Loss, minus_two_and_half.focus);
}

#[test]
fn total_over_line() {
    let mut rand = Wyrand::seed(2);
    let score = Pair::new(2, 1);
    let mut record = MatchRecord::new(Category::Team1VsOther, 1, score, as_of(), enrich(&score, &mut rand));
    assert_eq!(None, record.total_over_line);
    record.apply_lines(Some(2.5), None);
    assert_eq!(Some(true), record.total_over_line);
    record.apply_lines(Some(3.5), None);
    assert_eq!(Some(false), record.total_over_line);
    record.apply_lines(Some(0.0), None);
    assert_eq!(None, record.total_over_line);
}

#[test]
fn spread_cover_follows_favourite_role() {
    let mut rand = Wyrand::seed(3);
    let score = Pair::new(2, 1);

    let mut record = MatchRecord::new(Category::HeadToHead, 1, score, as_of(), enrich(&score, &mut rand));
    record.apply_lines(None, Some(&PointSpread::new(0.5, Side::Team1)));
    assert_eq!(Some(SpreadCover::FavoriteCovered), record.spread_cover);
    record.apply_lines(None, Some(&PointSpread::new(0.5, Side::Team2)));
    assert_eq!(Some(SpreadCover::UnderdogCovered), record.spread_cover);

    // team 2 scored 2 against another opponent's 1 and was the favourite
    let mut record = MatchRecord::new(Category::Team2VsOther, 1, score, as_of(), enrich(&score, &mut rand));
    record.apply_lines(None, Some(&PointSpread::new(1.0, Side::Team2)));
    assert_eq!(Some(SpreadCover::Push), record.spread_cover);
    record.apply_lines(None, None);
    assert_eq!(None, record.spread_cover);
}

#[test]
fn perspectives_by_role() {
    let mut rand = Wyrand::seed(4);
    let score = Pair::new(3, 1);
    let record = MatchRecord::new(Category::HeadToHead, 1, score, as_of(), enrich(&score, &mut rand));

    let team1 = record.perspective(Side::Team1).unwrap();
    assert_eq!((3, 1), (team1.scored, team1.conceded));
    assert_eq!(TeamResult::Win, team1.result());
    assert_eq!(record.half_time.focus, team1.half_time_scored);
    assert_eq!(record.possession.focus, team1.possession);

    let team2 = record.perspective(Side::Team2).unwrap();
    assert_eq!((1, 3), (team2.scored, team2.conceded));
    assert_eq!(TeamResult::Loss, team2.result());
    assert_eq!(record.shots.opponent, *team2.shots);
    assert_eq!(-2.0, team2.goal_difference());

    let record = MatchRecord::new(Category::Team2VsOther, 1, score, as_of(), enrich(&score, &mut rand));
    assert!(record.perspective(Side::Team1).is_none());
    assert_eq!(3, record.perspective(Side::Team2).unwrap().scored);
}

#[test]
fn labels() {
    let mut rand = Wyrand::seed(5);
    let score = Pair::new(0, 2);
    let record = MatchRecord::new(Category::HeadToHead, 1, score, as_of(), enrich(&score, &mut rand));
    assert_eq!("Manchester City Wins", record.label(&teams()));
    let record = MatchRecord::new(Category::Team1VsOther, 1, score, as_of(), enrich(&score, &mut rand));
    assert_eq!("Opponent Wins", record.label(&teams()));
}

#[test]
fn replace_assigns_weekly_timestamps() {
    let mut rand = Wyrand::seed(6);
    let mut store = MatchRecordStore::default();
    let ingested = store.replace(Category::HeadToHead, &pairs(&[1, 2, 1], &[0, 2, 3]), as_of(), &mut rand);
    assert_eq!(3, ingested);

    let records = store.records(Category::HeadToHead);
    assert_eq!(
        vec![1, 2, 3],
        records.iter().map(|record| record.match_number).collect::<Vec<_>>()
    );
    assert_eq!(as_of() - Duration::days(21), records[0].timestamp);
    assert_eq!(as_of() - Duration::days(7), records[2].timestamp);
    assert!(records.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
    assert_eq!(Pair::new(1, 3), records[2].score);
}

#[test]
fn replace_does_not_append() {
    let mut rand = Wyrand::seed(7);
    let mut store = MatchRecordStore::default();
    store.replace(
        Category::HeadToHead,
        &pairs(&[1, 2, 1, 2, 0], &[1, 2, 0, 1, 1]),
        as_of(),
        &mut rand,
    );
    assert_eq!(5, store.records(Category::HeadToHead).len());
    store.replace(Category::HeadToHead, &pairs(&[4, 4, 4], &[0, 0, 0]), as_of(), &mut rand);
    assert_eq!(3, store.records(Category::HeadToHead).len());
    assert!(store
        .records(Category::HeadToHead)
        .iter()
        .all(|record| record.score == Pair::new(4, 0)));
    assert_eq!(3, store.len());
}

#[test]
fn replace_carries_configured_lines() {
    let mut rand = Wyrand::seed(8);
    let mut store = MatchRecordStore::default();
    store.apply_lines(&BettingLines {
        total_line: Some(2.5),
        point_spread: Some(PointSpread::new(0.5, Side::Team1)),
        ..BettingLines::default()
    });
    store.replace(Category::Team1VsOther, &pairs(&[2, 0], &[1, 0]), as_of(), &mut rand);
    let records = store.records(Category::Team1VsOther);
    assert_eq!(Some(true), records[0].total_over_line);
    assert_eq!(Some(SpreadCover::FavoriteCovered), records[0].spread_cover);
    assert_eq!(Some(false), records[1].total_over_line);
    assert_eq!(Some(SpreadCover::UnderdogCovered), records[1].spread_cover);
}

#[test]
fn apply_lines_recomputes_existing_records() {
    let mut rand = Wyrand::seed(9);
    let mut store = MatchRecordStore::default();
    store.replace(Category::Team2VsOther, &pairs(&[3], &[1]), as_of(), &mut rand);
    assert_eq!(None, store.records(Category::Team2VsOther)[0].total_over_line);

    store.apply_lines(&BettingLines {
        total_line: Some(3.5),
        ..BettingLines::default()
    });
    assert_eq!(Some(true), store.records(Category::Team2VsOther)[0].total_over_line);
    store.apply_lines(&BettingLines::default());
    assert_eq!(None, store.records(Category::Team2VsOther)[0].total_over_line);
}

#[test]
fn clear_and_iterate() {
    let mut rand = Wyrand::seed(10);
    let mut store = MatchRecordStore::default();
    assert!(store.is_empty());
    store.replace(Category::HeadToHead, &pairs(&[1], &[1]), as_of(), &mut rand);
    store.replace(Category::Team1VsOther, &pairs(&[2, 3], &[0, 0]), as_of(), &mut rand);
    store.replace(Category::Team2VsOther, &pairs(&[0], &[5]), as_of(), &mut rand);
    assert_eq!(4, store.len());
    assert_eq!(
        vec![Category::HeadToHead, Category::Team1VsOther, Category::Team1VsOther, Category::Team2VsOther],
        store.iter().map(|record| record.category).collect::<Vec<_>>()
    );

    let team2 = store.perspectives(Side::Team2);
    assert_eq!(2, team2.len());
    assert_eq!((1, 1), (team2[0].scored, team2[0].conceded));
    assert_eq!((0, 5), (team2[1].scored, team2[1].conceded));

    store.clear();
    assert!(store.is_empty());
}
