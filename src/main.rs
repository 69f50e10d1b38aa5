//! CLI for map generation

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use pathfinding_map_creator::{run, Config};

/// Allows you to generate path finding maps. Right now gridmaps are the only one allowed
#[derive(Parser, Debug)]
#[command(name = "pathfinding-map-creator", version, about, long_about = None)]
struct Args {
    /// The seed for any pseudo random generator
    #[arg(long)]
    random_seed: u64,

    /// The directory receiving the generated map
    #[arg(long)]
    output_main_directory: PathBuf,

    /// Name of the map to generate. `METHOD` is replaced by the generation method
    #[arg(long = "generated-map-pystring")]
    generated_map_template: String,

    /// How the map is generated. Allowed values: RANDOM (obstruct random cells)
    #[arg(long)]
    generation_method: String,

    /// Preexisting map to perturb. If absent, a blank map is built
    #[arg(long)]
    base_map_path: Option<PathBuf>,

    /// Width of the blank map, when no base map is given
    #[arg(long)]
    width: Option<usize>,

    /// Height of the blank map, when no base map is given
    #[arg(long)]
    height: Option<usize>,

    /// With RANDOM, the number of cells to make untraversable. May use
    /// WIDTH, HEIGHT and TOTALCELL (number of traversable cells)
    #[arg(long = "untraversable-cell-pystring")]
    untraversable_cell_formula: Option<String>,
}

impl Args {
    /// Check option combinations clap cannot express
    fn into_config(self) -> pathfinding_map_creator::Result<Config> {
        Config::new(
            self.random_seed,
            self.output_main_directory,
            self.generated_map_template,
            self.generation_method,
            self.base_map_path,
            self.width,
            self.height,
            self.untraversable_cell_formula,
        )
    }
}

/// Generate the map described by the arguments, save it
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    let report = run(&config).context("Map generation failed")?;
    info!(
        "saved {}x{} map with {} obstructed cells to {}",
        report.map.width(),
        report.map.height(),
        report.obstructed.len(),
        report.output_path.display()
    );
    Ok(())
}
