use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use edgecast::engine::{analyze, Pipeline};
use edgecast::file::{ReadJsonFile, WriteJsonFile};
use edgecast::fixture::Fixture;
use edgecast::print;
use edgecast::record::MatchRecordStore;
use edgecast::sampling;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Sample {
    Standard,
    Vip,
}

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the fixture from
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// analyse a built-in sample fixture
    #[clap(long, value_enum)]
    sample: Option<Sample>,

    /// number of simulation trials
    #[clap(short = 't', long)]
    trials: Option<u64>,

    /// seed for the synthetic enrichment and the simulation
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// number of parallel simulation partitions
    #[clap(short = 'p', long)]
    partitions: Option<usize>,

    /// file to write the analysis to, as JSON
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.file.is_none() && self.sample.is_none() || self.file.is_some() && self.sample.is_some() {
            bail!("either the -f or the --sample flag must be specified");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut fixture = read_fixture(&args)?;
    if let Some(trials) = args.trials {
        fixture.request.simulation.trials = trials;
    }
    if let Some(partitions) = args.partitions {
        fixture.request.simulation.partitions = partitions;
    }
    if args.seed.is_some() {
        fixture.request.simulation.seed = args.seed;
    }
    fixture.request.validate()?;

    let mut store = MatchRecordStore::default();
    let mut rand = sampling::seeded(fixture.request.simulation.seed);
    fixture.populate(&mut store, &mut rand)?;

    let analysis = analyze(&store, &fixture.request);
    if analysis.pipeline == Pipeline::Standard {
        info!("analysis used the standard pipeline");
    }

    let console = Console::default();
    println!(
        "{} v {}",
        analysis.teams.team1.name, analysis.teams.team2.name
    );
    println!("{}", console.render(&print::tabulate_projection(&analysis)));
    println!("{}", console.render(&print::tabulate_probabilities(&analysis)));
    println!("{}", console.render(&print::tabulate_members(&analysis.members)));
    println!("Most likely scores:");
    println!("{}", console.render(&print::tabulate_scores(&analysis.top_scores)));
    println!("Total goals:");
    println!("{}", console.render(&print::tabulate_goal_buckets(&analysis.goal_buckets)));
    println!("Edges:");
    println!("{}", console.render(&print::tabulate_edges(&analysis.edges)));
    match analysis.edges.best() {
        Some(best) => println!("Best play: {} ({:+.1}, {})", best.label, best.edge, best.strength),
        None => println!("No selection clears the weak edge threshold"),
    }
    println!("Feature importance:");
    println!("{}", console.render(&print::tabulate_importance(&analysis.importance)));
    println!("Data quality:");
    println!("{}", console.render(&print::tabulate_data_quality(&analysis.edges.data_quality)));

    if let Some(output) = &args.output {
        analysis.write_json_file(output)?;
        info!("wrote analysis to {}", output.display());
    }
    Ok(())
}

fn read_fixture(args: &Args) -> anyhow::Result<Fixture> {
    match (&args.file, args.sample) {
        (Some(path), _) => {
            debug!("reading fixture from {}", path.display());
            Ok(Fixture::read_json_file(path)?)
        }
        (None, Some(Sample::Standard)) => Ok(Fixture::standard_sample()),
        (None, Some(Sample::Vip)) => Ok(Fixture::vip_sample()),
        (None, None) => bail!("no fixture source"),
    }
}
