//! Generate grid maps for pathfinding benchmarks
//!
//! A map is either loaded from a [Moving AI](https://movingai.com/benchmarks/formats.html)
//! `.map` file or built blank, then perturbed by turning some of its
//! traversable cells into obstacles, and finally written back as a `.map`
//! file.
//!
//! # Examples
//! ```
//! use pathfinding_map_creator::{obstruct_random, GridMap, MovingAiFormat, Palette, BLOCKED, OPEN};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let base = GridMap::blank("demo", 5, 5, OPEN, Palette::default()).unwrap();
//! let mut random = StdRng::seed_from_u64(42);
//! let res = obstruct_random(&base, 5, &mut random).unwrap();
//!
//! assert_eq!(res.map.count_symbol(BLOCKED), 5);
//! assert_eq!(base.count_symbol(BLOCKED), 0);
//! print!("{}", MovingAiFormat::default().render(&res.map));
//! ```

pub mod config;
pub mod error;
pub mod formula;
pub mod generator;
pub mod graph;
pub mod grid_map;
pub mod moving_ai;
pub mod terrain;

pub use config::{Config, MapOrigin};
pub use error::{MapCreatorError, Result};
pub use generator::{obstruct_random, run, GenerationMethod, GenerationReport, MapGenerator};
pub use grid_map::{GridMap, Location};
pub use moving_ai::MovingAiFormat;
pub use terrain::{Palette, BLOCKED, OPEN};
