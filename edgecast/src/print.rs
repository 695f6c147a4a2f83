//! Console tables summarising an [`Analysis`].

use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::edge::{EdgeReport, EdgeStrength};
use crate::engine::Analysis;
use crate::features::DataQuality;
use crate::grid::{bucket_label, ScoreProbability};
use crate::importance::FeatureImportance;
use crate::model::MemberPrediction;

fn label_col(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(Left))
}

fn value_col(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(HAlign::Right))
}

fn header(cells: &[&'static str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.iter().map(|&cell| cell.into()).collect(),
    )
}

/// Model probabilities against the outcome frequencies of the score distribution.
pub fn tabulate_probabilities(analysis: &Analysis) -> Table {
    let mut table = Table::default()
        .with_cols(vec![label_col(20), value_col(8), value_col(12)])
        .with_row(header(&["Outcome", "Model", "Distribution"]));
    let rows = [
        (
            format!("{} win", analysis.teams.team1.name),
            analysis.probabilities.team1_win,
            analysis.distribution.team1_win,
        ),
        ("Draw".to_string(), analysis.probabilities.draw, analysis.distribution.draw),
        (
            format!("{} win", analysis.teams.team2.name),
            analysis.probabilities.team2_win,
            analysis.distribution.team2_win,
        ),
    ];
    for (label, model, distribution) in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                format!("{model:.1}%").into(),
                format!("{distribution:.1}%").into(),
            ],
        ));
    }
    table
}

pub fn tabulate_projection(analysis: &Analysis) -> Table {
    let mut table = Table::default().with_cols(vec![label_col(20), value_col(10)]);
    let rows = [
        ("Pipeline", analysis.pipeline.to_string()),
        ("Projected score", analysis.projected_score.to_string()),
        ("Projected total", format!("{:.2}", analysis.projected_total)),
        ("Projected margin", format!("{:+.2}", analysis.projected_margin)),
        ("Simulated trials", analysis.trials.to_string()),
    ];
    for (label, value) in rows {
        table.push_row(Row::new(Styles::default(), vec![label.into(), value.into()]));
    }
    table
}

pub fn tabulate_members(members: &[MemberPrediction]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(10),
            value_col(6),
            value_col(7),
            value_col(7),
            value_col(7),
            value_col(6),
            value_col(7),
        ])
        .with_row(header(&["Model", "Weight", "T1 win", "Draw", "T2 win", "Total", "Margin"]));
    for member in members {
        let prediction = &member.prediction;
        table.push_row(Row::new(
            Styles::default(),
            vec![
                member.model.into(),
                format!("{:.2}", member.weight).into(),
                format!("{:.1}", prediction.probabilities.team1_win).into(),
                format!("{:.1}", prediction.probabilities.draw).into(),
                format!("{:.1}", prediction.probabilities.team2_win).into(),
                format!("{:.2}", prediction.projected_total).into(),
                format!("{:+.2}", prediction.projected_margin).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_scores(scores: &[ScoreProbability]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![label_col(6), value_col(8)])
        .with_row(header(&["Score", "Prob"]));
    for entry in scores {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                entry.score.to_string().into(),
                format!("{:.2}%", entry.probability).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_goal_buckets(buckets: &[f64]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![label_col(6), value_col(8)])
        .with_row(header(&["Goals", "Prob"]));
    for (index, prob) in buckets.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            vec![bucket_label(index).into(), format!("{prob:.2}%").into()],
        ));
    }
    table
}

pub fn tabulate_edges(report: &EdgeReport) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(24),
            value_col(7),
            value_col(6),
            value_col(10),
            value_col(7),
            label_col(9),
            value_col(12),
        ])
        .with_row(header(&["Selection", "Prob", "Push", "Break-even", "Edge", "Strength", "Historical"]));
    let best = report.best().map(|edge| edge.selection);
    for edge in &report.edges {
        let strength = match edge.strength {
            EdgeStrength::None => "-".to_string(),
            strength if Some(edge.selection) == best => format!("{strength}*"),
            strength => strength.to_string(),
        };
        let historical = if edge.historical.samples == 0 {
            "-".to_string()
        } else {
            format!(
                "{}/{} ({:.0}%)",
                edge.historical.wins, edge.historical.samples, edge.historical.rate
            )
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                edge.label.clone().into(),
                format!("{:.1}%", edge.probability).into(),
                format!("{:.1}%", edge.push).into(),
                format!("{:.1}%", edge.break_even).into(),
                format!("{:+.1}", edge.edge).into(),
                strength.into(),
                historical.into(),
            ],
        ));
    }
    table
}

pub fn tabulate_importance(ranked: &[FeatureImportance]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![label_col(20), value_col(12), value_col(7)])
        .with_row(header(&["Feature", "Contribution", "Score"]));
    for entry in ranked {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                entry.feature.to_string().into(),
                format!("{:+.3}", entry.contribution).into(),
                format!("{:.1}", entry.score).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_data_quality(quality: &DataQuality) -> Table {
    let mut table = Table::default().with_cols(vec![label_col(20), value_col(12)]);
    let rows = [
        ("Tier", quality.tier.to_string()),
        ("Total matches", quality.total_matches.to_string()),
        ("Head-to-head", quality.head_to_head_matches.to_string()),
        ("Team 1 v others", quality.team1_matches.to_string()),
        ("Team 2 v others", quality.team2_matches.to_string()),
        ("Matches needed", quality.matches_needed.to_string()),
    ];
    for (label, value) in rows {
        table.push_row(Row::new(Styles::default(), vec![label.into(), value.into()]));
    }
    table
}
