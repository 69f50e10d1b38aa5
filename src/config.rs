//! Run configuration

use std::path::PathBuf;

use crate::error::{MapCreatorError, Result};

/// Where the map to perturb comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapOrigin {
    /// Existing Moving AI map file
    File(PathBuf),
    /// Freshly built map filled with open terrain
    Blank { width: usize, height: usize },
}

/// Settings of a single generation run
///
/// Built once at startup and passed by reference afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Seed of the random stream shared by the whole run
    pub random_seed: u64,
    /// Directory receiving the generated map
    pub output_main_directory: PathBuf,
    /// Template of the generated map name, may use `METHOD`
    pub generated_map_template: String,
    /// Generation strategy, see [crate::generator::GenerationMethod]
    pub generation_method: String,
    pub origin: MapOrigin,
    /// Formula of the number of cells to obstruct, may use `WIDTH`,
    /// `HEIGHT` and `TOTALCELL`
    pub untraversable_cell_formula: Option<String>,
}

impl Config {
    /// Validate and assemble a configuration
    ///
    /// ## Arguments
    /// - `base_map_path`: Map to load; when absent a blank map of
    ///   `width` x `height` is built, so both must then be given and
    ///   non-zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        random_seed: u64,
        output_main_directory: PathBuf,
        generated_map_template: String,
        generation_method: String,
        base_map_path: Option<PathBuf>,
        width: Option<usize>,
        height: Option<usize>,
        untraversable_cell_formula: Option<String>,
    ) -> Result<Self> {
        let origin = match (base_map_path, width, height) {
            (Some(path), _, _) => MapOrigin::File(path),
            (None, Some(width), Some(height)) if width > 0 && height > 0 => {
                MapOrigin::Blank { width, height }
            }
            (None, Some(_), Some(_)) => {
                return Err(MapCreatorError::Configuration(
                    "--width and --height must be positive".to_string(),
                ))
            }
            (None, _, _) => {
                return Err(MapCreatorError::Configuration(
                    "--width and --height are required without --base-map-path".to_string(),
                ))
            }
        };
        Ok(Config {
            random_seed,
            output_main_directory,
            generated_map_template,
            generation_method,
            origin,
            untraversable_cell_formula,
        })
    }
}
