//! Map generation

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{Config, MapOrigin};
use crate::error::{MapCreatorError, Result};
use crate::formula::{evaluate_count, render_template, Bindings};
use crate::graph::{to_graph, GridBranching};
use crate::grid_map::{GridMap, Location};
use crate::moving_ai::MovingAiFormat;
use crate::terrain::{BLOCKED, OPEN};

/// How a map is perturbed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMethod {
    /// Obstruct cells chosen uniformly at random
    Random,
}

impl FromStr for GenerationMethod {
    type Err = MapCreatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RANDOM" => Ok(GenerationMethod::Random),
            other => Err(MapCreatorError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMethod::Random => write!(f, "RANDOM"),
        }
    }
}

/// Result of [obstruct_random]
#[derive(Clone, Debug)]
pub struct Obstruction {
    /// Copy of the base map with the chosen cells blocked
    pub map: GridMap,
    /// Cells that were blocked, in draw order
    pub obstructed: Vec<Location>,
}

/// Block `cells_to_obstruct` traversable cells chosen uniformly at random
///
/// Cells are drawn without replacement from the traversable cells of
/// `base`; `base` itself is left untouched. The resulting map may no
/// longer be connected.
///
/// Returns [MapCreatorError::OutOfRange] if there are fewer traversable
/// cells than requested.
pub fn obstruct_random<R: Rng + ?Sized>(
    base: &GridMap,
    cells_to_obstruct: usize,
    random: &mut R,
) -> Result<Obstruction> {
    let mut traversable = base.traversable_cells();
    if cells_to_obstruct > traversable.len() {
        return Err(MapCreatorError::OutOfRange {
            requested: cells_to_obstruct,
            available: traversable.len(),
        });
    }

    let mut obstructed = Vec::with_capacity(cells_to_obstruct);
    for _ in 0..cells_to_obstruct {
        let index = random.gen_range(0..traversable.len());
        obstructed.push(traversable.swap_remove(index));
    }

    let mut map = base.clone();
    for loc in &obstructed {
        info!("obstructing {}", loc);
        map.set_cell_terrain(*loc, BLOCKED)?;
    }
    Ok(Obstruction { map, obstructed })
}

/// Map generator holding the random stream of a run
pub struct MapGenerator {
    random: StdRng,
}

impl MapGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            random: StdRng::seed_from_u64(seed),
        }
    }

    /// See [obstruct_random]
    pub fn obstruct_random(
        &mut self,
        base: &GridMap,
        cells_to_obstruct: usize,
    ) -> Result<Obstruction> {
        obstruct_random(base, cells_to_obstruct, &mut self.random)
    }
}

/// Outcome of a successful [run]
#[derive(Debug)]
pub struct GenerationReport {
    /// File the map was written to
    pub output_path: PathBuf,
    pub map: GridMap,
    pub obstructed: Vec<Location>,
}

/// Load or build the map to perturb
pub fn acquire_map(name: &str, origin: &MapOrigin, format: &MovingAiFormat) -> Result<GridMap> {
    match origin {
        MapOrigin::File(path) => {
            let mut map = format.load(path)?;
            map.rename(name);
            Ok(map)
        }
        MapOrigin::Blank { width, height } => {
            debug!("building blank {}x{} map `{}`", width, height, name);
            GridMap::blank(name, *width, *height, OPEN, format.palette().clone())
        }
    }
}

/// Generate a map and save it under the output directory
///
/// Nothing is written unless every step before saving succeeds.
pub fn run(config: &Config) -> Result<GenerationReport> {
    let method: GenerationMethod = config.generation_method.parse()?;
    let mut generator = MapGenerator::new(config.random_seed);

    let map_name = render_template(
        &config.generated_map_template,
        &Bindings::new().with("METHOD", method.to_string().as_str()),
    );
    let output_path = config
        .output_main_directory
        .join(format!("{}.map", map_name));

    let format = MovingAiFormat::default();
    let base = acquire_map(&map_name, &config.origin, &format)?;

    // Not used by RANDOM, kept for methods that care about connectivity
    let graph = to_graph(&base, GridBranching::Eight);
    debug!(
        "base map graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let obstruction = match method {
        GenerationMethod::Random => {
            let formula = config
                .untraversable_cell_formula
                .as_deref()
                .ok_or_else(|| {
                    MapCreatorError::Configuration(
                        "--untraversable-cell-pystring is required by RANDOM".to_string(),
                    )
                })?;
            let bindings = Bindings::new()
                .with("WIDTH", base.width())
                .with("HEIGHT", base.height())
                .with("TOTALCELL", base.traversable_cells().len());
            let cells_to_obstruct = evaluate_count(formula, &bindings)?;
            debug!("obstructing {} cells of `{}`", cells_to_obstruct, map_name);
            generator.obstruct_random(&base, cells_to_obstruct)?
        }
    };

    fs::create_dir_all(&config.output_main_directory).map_err(|source| MapCreatorError::Io {
        path: config.output_main_directory.clone(),
        source,
    })?;
    format.save(&obstruction.map, &output_path)?;

    Ok(GenerationReport {
        output_path,
        map: obstruction.map,
        obstructed: obstruction.obstructed,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    use rand::{rngs::StdRng, SeedableRng};

    use crate::{
        config::{Config, MapOrigin},
        error::MapCreatorError,
        generator::{obstruct_random, run, GenerationMethod, MapGenerator},
        grid_map::{GridMap, Location},
        moving_ai::MovingAiFormat,
        terrain::{Cost, Palette, BLOCKED, OPEN},
    };

    fn blank(width: usize, height: usize) -> GridMap {
        GridMap::blank("blank", width, height, OPEN, Palette::default()).unwrap()
    }

    /// Fresh, empty directory under the system temp dir
    fn scratch_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pathfinding-map-creator-{}-{}",
            test,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn config(dir: &Path, origin: MapOrigin, formula: Option<&str>) -> Config {
        Config {
            random_seed: 42,
            output_main_directory: dir.to_path_buf(),
            generated_map_template: "test_METHOD".to_string(),
            generation_method: "RANDOM".to_string(),
            origin,
            untraversable_cell_formula: formula.map(str::to_string),
        }
    }

    #[test]
    fn parse_generation_method() {
        assert_eq!(
            "RANDOM".parse::<GenerationMethod>().unwrap(),
            GenerationMethod::Random
        );
        assert!(matches!(
            "random".parse::<GenerationMethod>(),
            Err(MapCreatorError::UnsupportedMethod(m)) if m == "random"
        ));
    }

    #[test]
    fn obstructs_distinct_traversable_cells() {
        let text = "type octile\nheight 3\nwidth 4\nmap\n..@.\nT..S\n@..W\n";
        let base = MovingAiFormat::default().parse("base", text).unwrap();
        let before = base.clone();
        let mut random = StdRng::seed_from_u64(7);

        let res = obstruct_random(&base, 6, &mut random).unwrap();

        assert_eq!(res.obstructed.len(), 6);
        let unique: HashSet<Location> = res.obstructed.iter().copied().collect();
        assert_eq!(unique.len(), 6);
        for loc in &res.obstructed {
            assert!(base.is_traversable(*loc));
            assert_eq!(res.map.symbol_at(*loc).unwrap(), BLOCKED);
        }
        assert_eq!(res.map.count_symbol(BLOCKED), base.count_symbol(BLOCKED) + 6);
        // Untouched cells keep their terrain
        for loc in base.locations().filter(|l| !unique.contains(l)) {
            assert_eq!(res.map.symbol_at(loc).unwrap(), base.symbol_at(loc).unwrap());
        }
        assert_eq!(base, before);
    }

    #[test]
    fn too_many_cells_is_out_of_range() {
        let base = blank(2, 2);
        let mut random = StdRng::seed_from_u64(0);
        assert!(matches!(
            obstruct_random(&base, 5, &mut random),
            Err(MapCreatorError::OutOfRange {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn zero_cells_keeps_map() {
        let base = blank(3, 3);
        let mut random = StdRng::seed_from_u64(0);
        let res = obstruct_random(&base, 0, &mut random).unwrap();
        assert_eq!(res.map, base);
        assert!(res.obstructed.is_empty());
    }

    #[test]
    fn all_cells_empties_traversable_set() {
        let base = blank(3, 2);
        let mut random = StdRng::seed_from_u64(0);
        let res = obstruct_random(&base, 6, &mut random).unwrap();
        assert!(res.map.traversable_cells().is_empty());
        assert_eq!(res.map.count_symbol(BLOCKED), 6);
    }

    #[test]
    fn same_seed_same_cells() {
        let base = blank(10, 10);
        let a = MapGenerator::new(3).obstruct_random(&base, 20).unwrap();
        let b = MapGenerator::new(3).obstruct_random(&base, 20).unwrap();
        assert_eq!(a.obstructed, b.obstructed);
        assert_eq!(a.map, b.map);
    }

    #[test]
    fn random_stream_is_shared_between_calls() {
        let base = blank(10, 10);
        let mut gen = MapGenerator::new(3);
        let first = gen.obstruct_random(&base, 20).unwrap();
        let second = gen.obstruct_random(&base, 20).unwrap();
        assert_ne!(first.obstructed, second.obstructed);
    }

    #[test]
    fn cells_are_chosen_uniformly_across_seeds() {
        const RUNS: u64 = 9000;
        let base = blank(3, 3);
        let mut counts = [0usize; 9];
        for seed in 0..RUNS {
            let res = MapGenerator::new(seed).obstruct_random(&base, 1).unwrap();
            let loc = res.obstructed[0];
            counts[loc.y * 3 + loc.x] += 1;
        }
        // 1000 expected per cell, standard deviation is about 31
        for count in counts {
            assert!((850..=1150).contains(&count), "counts {:?}", counts);
        }
    }

    #[test]
    fn run_blank_map_end_to_end() {
        let dir = scratch_dir("blank");
        let cfg = config(
            &dir,
            MapOrigin::Blank {
                width: 5,
                height: 5,
            },
            Some("5"),
        );

        let report = run(&cfg).unwrap();
        assert_eq!(report.output_path, dir.join("test_RANDOM.map"));

        let format = MovingAiFormat::default();
        let saved = format.load(&report.output_path).unwrap();
        assert_eq!((saved.width(), saved.height()), (5, 5));
        assert_eq!(saved.count_symbol(BLOCKED), 5);
        assert_eq!(saved.count_symbol(OPEN), 20);
        for loc in &report.obstructed {
            assert_eq!(saved.cost_at(*loc).unwrap(), Cost::Infinite);
        }

        let again = run(&cfg).unwrap();
        assert_eq!(again.obstructed, report.obstructed);
        assert_eq!(
            fs::read_to_string(&again.output_path).unwrap(),
            format.render(&saved)
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_perturbs_base_map_with_formula() {
        let dir = scratch_dir("base");
        fs::create_dir_all(&dir).unwrap();
        let base_path = dir.join("base.map");
        fs::write(
            &base_path,
            "type octile\nheight 2\nwidth 5\nmap\n@@...\n.....\n",
        )
        .unwrap();
        let cfg = config(
            &dir.join("out"),
            MapOrigin::File(base_path),
            Some("TOTALCELL // 2 + WIDTH - HEIGHT - 3"),
        );

        let report = run(&cfg).unwrap();
        // 8 traversable cells: 8 // 2 + 5 - 2 - 3
        assert_eq!(report.obstructed.len(), 4);
        assert_eq!(report.map.count_symbol(BLOCKED), 6);
        assert_eq!(report.map.name(), "test_RANDOM");
        assert!(report.output_path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_out_of_range_writes_nothing() {
        let dir = scratch_dir("range");
        let cfg = config(
            &dir,
            MapOrigin::Blank {
                width: 2,
                height: 2,
            },
            Some("WIDTH * HEIGHT + 1"),
        );
        assert!(matches!(run(&cfg), Err(MapCreatorError::OutOfRange { .. })));
        assert!(!dir.join("test_RANDOM.map").exists());
    }

    #[test]
    fn run_rejects_unknown_method_and_missing_formula() {
        let dir = scratch_dir("method");
        let origin = MapOrigin::Blank {
            width: 2,
            height: 2,
        };

        let mut cfg = config(&dir, origin.clone(), Some("1"));
        cfg.generation_method = "MAZE".to_string();
        assert!(matches!(
            run(&cfg),
            Err(MapCreatorError::UnsupportedMethod(m)) if m == "MAZE"
        ));

        let cfg = config(&dir, origin, None);
        assert!(matches!(run(&cfg), Err(MapCreatorError::Configuration(_))));
        assert!(!dir.exists());
    }

    #[test]
    fn run_missing_base_map_is_io_error() {
        let dir = scratch_dir("missing");
        let cfg = config(&dir, MapOrigin::File(dir.join("nope.map")), Some("1"));
        assert!(matches!(run(&cfg), Err(MapCreatorError::Io { .. })));
    }
}
