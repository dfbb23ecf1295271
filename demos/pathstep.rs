//! Multi-goal stepwise A* demo.
//!
//! Run: cargo run --bin pathstep -- --animate
//!
//! Without `--animate` the search runs to completion and the final grid is
//! printed.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use pathstep_core::Config;
use pathstep_demos::{load_config, render, term};
use pathstep_search::{RouteStatus, Session};

/// Stepwise A* through several goals on a random grid
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for walls and goals
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid columns
    #[arg(long)]
    cols: Option<i32>,

    /// Grid rows
    #[arg(long)]
    rows: Option<i32>,

    /// Number of goals
    #[arg(short, long)]
    goals: Option<usize>,

    /// Wall probability per interior cell
    #[arg(short, long)]
    walls: Option<f64>,

    /// Animate the search in the terminal
    #[arg(short, long)]
    animate: bool,

    /// Search steps per second when animating
    #[arg(long, default_value = "20")]
    fps: u32,
}

impl Args {
    fn to_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(goals) = self.goals {
            config.num_goals = goals;
        }
        if let Some(walls) = self.walls {
            config.wall_probability = walls;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let mut session = Session::new(args.to_config()?)?;

    if args.animate {
        return term::run(&mut session, args.fps);
    }

    while session.step().is_some() {}
    for line in render(&session) {
        println!("{line}");
    }
    info!(
        "{} after {} expansions",
        match session.status() {
            RouteStatus::Failed(e) => e.to_string(),
            status => status.label().to_string(),
        },
        session.expansions()
    );
    Ok(())
}
