//! The analysis pipeline. The enhanced pipeline extracts the full feature set, runs the model
//! ensemble and simulates the match; should it fail, [`analyze`] falls back to the main model over
//! the standard features with an analytic score distribution.

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{BettingLines, Location, Score, Side, Teams};
use crate::edge::{self, EdgeReport};
use crate::features::{extract_enhanced, extract_standard, FeatureSet, MatchContext};
use crate::grid::{ScoreGrid, ScoreProbability, GOAL_BUCKETS, MAX_ANALYTIC_GOALS};
use crate::importance::{self, FeatureImportance};
use crate::mc::{Dispersion, Rates, Simulator, DEFAULT_TRIALS};
use crate::model::ensemble::reconcile;
use crate::model::{Ensemble, EnsembleError, MainModel, MemberPrediction, Prediction, Probabilities};
use crate::record::MatchRecordStore;
use crate::timed::Timed;

/// Number of most probable scores reported.
pub const TOP_SCORES: usize = 10;

fn default_trials() -> u64 {
    DEFAULT_TRIALS
}

fn default_partitions() -> usize {
    1
}

fn default_importance() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_trials")]
    pub trials: u64,

    /// Absent for a clock-derived seed.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_partitions")]
    pub partitions: usize,
}
impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            seed: None,
            partitions: default_partitions(),
        }
    }
}
impl SimulationConfig {
    pub fn simulator(&self) -> Simulator {
        Simulator::default()
            .with_trials(self.trials)
            .with_partitions(self.partitions)
            .with_seed(self.seed)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidRequest {
    #[error("{0} has a blank name")]
    BlankName(Side),

    #[error("both teams are named '{0}'")]
    SameTeams(String),

    #[error("match importance must be at least 1, got {0}")]
    Importance(f64),

    #[error("at least one simulation trial is required")]
    NoTrials,

    #[error("at least one simulation partition is required")]
    NoPartitions,

    #[error("total line must be positive, got {0}")]
    TotalLine(f64),

    #[error("point spread must be positive, got {0}")]
    PointSpread(f64),
}

/// Everything that configures one analysis, apart from the stored records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub teams: Teams,

    #[serde(default = "default_importance")]
    pub importance: f64,

    #[serde(default)]
    pub location: Location,

    #[serde(default)]
    pub lines: BettingLines,

    #[serde(default)]
    pub simulation: SimulationConfig,
}
impl AnalysisRequest {
    pub fn new(teams: Teams) -> Self {
        Self {
            teams,
            importance: default_importance(),
            location: Location::default(),
            lines: BettingLines::default(),
            simulation: SimulationConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidRequest> {
        for side in [Side::Team1, Side::Team2] {
            if self.teams.name(side).trim().is_empty() {
                return Err(InvalidRequest::BlankName(side));
            }
        }
        let (team1, team2) = (self.teams.name(Side::Team1).trim(), self.teams.name(Side::Team2).trim());
        if team1.eq_ignore_ascii_case(team2) {
            return Err(InvalidRequest::SameTeams(team1.to_string()));
        }
        if !self.importance.is_finite() || self.importance < 1.0 {
            return Err(InvalidRequest::Importance(self.importance));
        }
        if self.simulation.trials == 0 {
            return Err(InvalidRequest::NoTrials);
        }
        if self.simulation.partitions == 0 {
            return Err(InvalidRequest::NoPartitions);
        }
        if let Some(total_line) = self.lines.total_line {
            if !total_line.is_finite() || total_line <= 0.0 {
                return Err(InvalidRequest::TotalLine(total_line));
            }
        }
        if let Some(spread) = &self.lines.point_spread {
            if !spread.value.is_finite() || spread.value <= 0.0 {
                return Err(InvalidRequest::PointSpread(spread.value));
            }
        }
        Ok(())
    }

    pub fn context(&self) -> MatchContext {
        MatchContext {
            teams: &self.teams,
            importance: self.importance,
            location: self.location,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Ensemble(#[from] EnsembleError),

    #[error("ensemble produced a non-finite prediction: {0:?}")]
    NonFinite(Prediction),

    #[error("simulation ran no trials")]
    NoTrials,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Pipeline {
    Enhanced,
    Standard,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub pipeline: Pipeline,
    pub teams: Teams,
    /// Model probabilities, in percent.
    pub probabilities: Probabilities,
    pub projected_total: f64,
    pub projected_margin: f64,
    pub projected_score: Score,
    pub members: Vec<MemberPrediction>,
    /// Outcome frequencies of the score distribution, in percent.
    pub distribution: Probabilities,
    /// Simulated trials; 0 when the distribution was derived analytically.
    pub trials: u64,
    pub top_scores: Vec<ScoreProbability>,
    /// Total-goals bucket probabilities, in percent.
    pub goal_buckets: [f64; GOAL_BUCKETS],
    pub importance: Vec<FeatureImportance>,
    pub edges: EdgeReport,
}

/// Runs the enhanced pipeline, falling back to [`standard`] if it fails.
pub fn analyze(store: &MatchRecordStore, request: &AnalysisRequest) -> Analysis {
    match enhanced(store, request) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!("enhanced analysis failed, falling back to the standard model: {err}");
            standard(store, request)
        }
    }
}

pub fn enhanced(store: &MatchRecordStore, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
    let features = extract_enhanced(store, &request.context());
    let ensemble = Ensemble::standard().predict(&features)?;
    let prediction = ensemble.combined;
    if !prediction.is_finite() {
        return Err(AnalysisError::NonFinite(prediction));
    }
    info!(
        "ensemble: {:.1}/{:.1}/{:.1}, total {:.2}, margin {:+.2}",
        prediction.probabilities.team1_win,
        prediction.probabilities.draw,
        prediction.probabilities.team2_win,
        prediction.projected_total,
        prediction.projected_margin
    );

    let selections = request.lines.selections();
    let rates = Rates::from_projection(prediction.projected_total, prediction.projected_margin);
    let dispersion = Dispersion::from_totals(&features.basic.totals);
    debug!("simulating with {rates:?}, {dispersion:?}");
    let simulator = request.simulation.simulator();
    let batch = Timed::value(|| simulator.simulate(rates, dispersion, &selections));
    info!("simulated {} trials in {:?}", batch.value.trials, batch.elapsed);
    let batch = batch.value;
    if batch.trials == 0 {
        return Err(AnalysisError::NoTrials);
    }

    let grid = batch.score_grid();
    let edges = edge::calculate(&batch, &selections, store, &request.teams);
    Ok(assemble(
        Pipeline::Enhanced,
        request,
        &features,
        prediction,
        ensemble.members,
        batch.probabilities(),
        batch.trials,
        &grid,
        edges,
    ))
}

/// The main model over the standard features, priced against independent Poisson goal counts.
pub fn standard(store: &MatchRecordStore, request: &AnalysisRequest) -> Analysis {
    let features = extract_standard(store, &request.context());
    let prediction = reconcile(MainModel.forecast(&features));
    let rates = Rates::from_projection(prediction.projected_total, prediction.projected_margin);
    let grid = ScoreGrid::from_poisson(rates.team1, rates.team2, MAX_ANALYTIC_GOALS);
    let selections = request.lines.selections();
    let edges = edge::calculate(&grid, &selections, store, &request.teams);
    let members = vec![MemberPrediction {
        model: MainModel::NAME,
        weight: 1.0,
        prediction,
    }];
    assemble(
        Pipeline::Standard,
        request,
        &features,
        prediction,
        members,
        grid.outcome_probabilities(),
        0,
        &grid,
        edges,
    )
}

fn assemble(
    pipeline: Pipeline,
    request: &AnalysisRequest,
    features: &FeatureSet,
    prediction: Prediction,
    members: Vec<MemberPrediction>,
    distribution: Probabilities,
    trials: u64,
    grid: &ScoreGrid,
    edges: Vec<edge::LineEdge>,
) -> Analysis {
    Analysis {
        pipeline,
        teams: request.teams.clone(),
        probabilities: prediction.probabilities,
        projected_total: prediction.projected_total,
        projected_margin: prediction.projected_margin,
        projected_score: prediction.projected_score(),
        members,
        distribution,
        trials,
        top_scores: grid.top_scores(TOP_SCORES),
        goal_buckets: grid.goal_buckets(),
        importance: importance::rank(features),
        edges: EdgeReport {
            edges,
            data_quality: features.data_quality.clone(),
        },
    }
}
