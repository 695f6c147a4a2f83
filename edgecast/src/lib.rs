//! A heuristic forecaster for the next meeting of two teams. Ingests historical scores (head-to-head
//! and each team's matches against other opponents), extracts a feature set, blends four scoring
//! models into an ensemble, runs a Monte Carlo simulation of the final score and measures the edge
//! of configured over/under and handicap lines against the simulated distribution.

#![allow(clippy::too_many_arguments)]

pub mod domain;
pub mod edge;
pub mod engine;
pub mod enrich;
pub mod features;
pub mod file;
pub mod fixture;
pub mod grid;
pub mod importance;
pub mod mc;
pub mod model;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod record;
pub mod sampling;
pub mod timed;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
