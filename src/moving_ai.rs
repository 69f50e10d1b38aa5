//! Reading and writing maps in the Moving AI benchmark format
//!
//! ```text
//! type octile
//! height 2
//! width 3
//! map
//! ..@
//! .T.
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::debug;

use crate::error::{MapCreatorError, Result};
use crate::grid_map::GridMap;
use crate::terrain::{Color, Cost, Palette};

/// Map reader and writer bound to a terrain palette
#[derive(Clone, Debug, Default)]
pub struct MovingAiFormat {
    palette: Palette,
}

impl MovingAiFormat {
    pub fn new(palette: Palette) -> Self {
        MovingAiFormat { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cost_map(&self) -> BTreeMap<char, Cost> {
        self.palette.cost_map()
    }

    pub fn color_map(&self) -> BTreeMap<char, Color> {
        self.palette.color_map()
    }

    /// Load a map file; the map is named after the file stem.
    pub fn load(&self, path: &Path) -> Result<GridMap> {
        let text = fs::read_to_string(path).map_err(|source| MapCreatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("loading map `{}` from {}", name, path.display());
        self.parse(&name, &text)
    }

    /// Parse map text
    ///
    /// - `name`: Name given to the resulting map.
    /// - `text`: Header (`type`, `height`, `width`, `map`) followed by the rows.
    ///
    /// Returns error, if the header is malformed, the rows do not match
    /// the declared dimensions or a symbol is not in the palette.
    pub fn parse(&self, name: &str, text: &str) -> Result<GridMap> {
        // Errors not tied to a single row point at the end of the text
        let last_line = text.lines().count().max(1);
        let mut lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .enumerate()
            .map(|(i, l)| (i + 1, l));

        let mut next_line = |expected: &str| {
            lines.next().ok_or_else(|| {
                format_error(
                    last_line,
                    &format!("unexpected end of file, expected `{}`", expected),
                )
            })
        };

        let (line, header) = next_line("type")?;
        match header.split_whitespace().collect_vec().as_slice() {
            ["type", _] => (),
            _ => return Err(format_error(line, "expected `type <name>`")),
        }
        let height = parse_dimension(next_line("height")?, "height")?;
        let width = parse_dimension(next_line("width")?, "width")?;
        let (line, header) = next_line("map")?;
        if header.trim() != "map" {
            return Err(format_error(line, "expected `map`"));
        }

        // `height` is untrusted, do not preallocate from it
        let mut rows: Vec<Vec<char>> = Vec::new();
        for (line, row) in lines {
            if rows.len() == height {
                if row.trim().is_empty() {
                    continue;
                }
                return Err(format_error(line, &format!("more than {} rows", height)));
            }
            let cells: Vec<char> = row.chars().collect();
            if cells.len() != width {
                return Err(format_error(
                    line,
                    &format!("row has {} cells, expected {}", cells.len(), width),
                ));
            }
            if let Some(c) = cells.iter().find(|c| !self.palette.contains(**c)) {
                return Err(format_error(line, &format!("unknown terrain `{}`", c)));
            }
            rows.push(cells);
        }
        if rows.len() != height {
            return Err(format_error(
                last_line,
                &format!("found {} rows, expected {}", rows.len(), height),
            ));
        }

        GridMap::from_rows(name, rows, self.palette.clone())
    }

    /// Render a map as Moving AI text, newline-terminated
    pub fn render(&self, map: &GridMap) -> String {
        let body = map.rows().iter().map(|row| row.iter().join("")).join("\n");
        format!(
            "type octile\nheight {}\nwidth {}\nmap\n{}\n",
            map.height(),
            map.width(),
            body
        )
    }

    /// Write a map file
    pub fn save(&self, map: &GridMap, path: &Path) -> Result<()> {
        debug!("saving map `{}` to {}", map.name(), path.display());
        fs::write(path, self.render(map)).map_err(|source| MapCreatorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn format_error(line: usize, message: &str) -> MapCreatorError {
    MapCreatorError::MapFormat {
        line,
        message: message.to_string(),
    }
}

fn parse_dimension((line, text): (usize, &str), key: &str) -> Result<usize> {
    match text.split_whitespace().collect_vec().as_slice() {
        [k, value] if *k == key => value
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format_error(line, &format!("invalid {} `{}`", key, value))),
        _ => Err(format_error(line, &format!("expected `{} <number>`", key))),
    }
}
