//! Errors raised while creating maps

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::grid_map::Location;

/// Everything that can abort a map generation run
#[derive(Debug, Error)]
pub enum MapCreatorError {
    /// Missing or inconsistent options
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// `--generation-method` is not a known strategy
    #[error("invalid generation method `{0}`")]
    UnsupportedMethod(String),

    /// More cells requested than there are traversable cells
    #[error("cannot obstruct {requested} cells, only {available} are traversable")]
    OutOfRange { requested: usize, available: usize },

    /// Reading or writing a map file failed
    #[error("I/O error on `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Map text does not follow the Moving AI layout
    #[error("malformed map at line {line}: {message}")]
    MapFormat { line: usize, message: String },

    /// Terrain symbol not registered in the palette
    #[error("unknown terrain symbol `{0}`")]
    UnknownTerrain(char),

    #[error("location {location} outside of {width}x{height} map")]
    LocationOutOfBounds {
        location: Location,
        width: usize,
        height: usize,
    },

    /// Template or formula could not be evaluated
    #[error("formula error: {0}")]
    Formula(String),
}

pub type Result<T> = std::result::Result<T, MapCreatorError>;
