//! Grid maps and their cells

use std::fmt;

use crate::error::{MapCreatorError, Result};
use crate::terrain::{Cost, Palette, Terrain};

/// Cell coordinate, `x` is the column and `y` the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub x: usize,
    pub y: usize,
}

impl Location {
    pub fn new(x: usize, y: usize) -> Self {
        Location { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Named rectangular grid of terrain symbols
///
/// Dimensions are fixed at construction, and every cell holds a symbol
/// registered in the map palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    name: String,
    width: usize,
    height: usize,
    /// Terrain symbols, `cells[y][x]`
    cells: Vec<Vec<char>>,
    palette: Palette,
}

impl GridMap {
    /// Build a map where every cell holds `fill`
    pub fn blank(
        name: &str,
        width: usize,
        height: usize,
        fill: char,
        palette: Palette,
    ) -> Result<Self> {
        if !palette.contains(fill) {
            return Err(MapCreatorError::UnknownTerrain(fill));
        }
        Ok(GridMap {
            name: name.to_string(),
            width,
            height,
            cells: (0..height).map(|_| vec![fill; width]).collect(),
            palette,
        })
    }

    /// Build a map from rows of symbols
    ///
    /// All rows must have the same length and only contain symbols of
    /// `palette`.
    pub fn from_rows(name: &str, rows: Vec<Vec<char>>, palette: Palette) -> Result<Self> {
        let width = rows.first().map_or(0, |row| row.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MapCreatorError::MapFormat {
                    line: y + 1,
                    message: format!("row has {} cells, expected {}", row.len(), width),
                });
            }
            if let Some(c) = row.iter().find(|c| !palette.contains(**c)) {
                return Err(MapCreatorError::UnknownTerrain(*c));
            }
        }
        Ok(GridMap {
            name: name.to_string(),
            width,
            height: rows.len(),
            cells: rows,
            palette,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.cells
    }

    pub fn contains(&self, loc: Location) -> bool {
        loc.x < self.width && loc.y < self.height
    }

    fn check_bounds(&self, loc: Location) -> Result<()> {
        if self.contains(loc) {
            Ok(())
        } else {
            Err(MapCreatorError::LocationOutOfBounds {
                location: loc,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Terrain symbol of a cell
    pub fn symbol_at(&self, loc: Location) -> Result<char> {
        self.check_bounds(loc)?;
        Ok(self.cells[loc.y][loc.x])
    }

    pub fn terrain_at(&self, loc: Location) -> Result<Terrain> {
        let symbol = self.symbol_at(loc)?;
        self.palette
            .get(symbol)
            .copied()
            .ok_or(MapCreatorError::UnknownTerrain(symbol))
    }

    pub fn cost_at(&self, loc: Location) -> Result<Cost> {
        Ok(self.terrain_at(loc)?.cost)
    }

    /// Whether the cell can be entered. Cells outside the map cannot.
    pub fn is_traversable(&self, loc: Location) -> bool {
        self.cost_at(loc).map_or(false, Cost::is_finite)
    }

    /// Replace the terrain of a single cell
    pub fn set_cell_terrain(&mut self, loc: Location, symbol: char) -> Result<()> {
        self.check_bounds(loc)?;
        if !self.palette.contains(symbol) {
            return Err(MapCreatorError::UnknownTerrain(symbol));
        }
        self.cells[loc.y][loc.x] = symbol;
        Ok(())
    }

    /// Every cell with finite cost, in row-major order
    pub fn traversable_cells(&self) -> Vec<Location> {
        self.locations()
            .filter(|loc| self.is_traversable(*loc))
            .collect()
    }

    /// Number of cells holding `symbol`
    pub fn count_symbol(&self, symbol: char) -> usize {
        self.cells.iter().flatten().filter(|c| **c == symbol).count()
    }

    /// All locations of the map, row-major
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Location { x, y }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::MapCreatorError,
        grid_map::{GridMap, Location},
        terrain::{Cost, Palette, BLOCKED, OPEN},
    };

    fn rows(text: &str) -> Vec<Vec<char>> {
        text.trim().lines().map(|l| l.trim().chars().collect()).collect()
    }

    #[test]
    fn blank_map_is_fully_traversable() {
        let map = GridMap::blank("blank", 4, 3, OPEN, Palette::default()).unwrap();
        assert_eq!(map.size(), 12);
        assert_eq!(map.traversable_cells().len(), 12);
        assert_eq!(
            map.cost_at(Location::new(3, 2)).unwrap(),
            Cost::Finite(1000)
        );
    }

    #[test]
    fn traversable_cells_skip_blocked_terrain() {
        let map = GridMap::from_rows(
            "walls",
            rows(
                "
                .@T
                S@W",
            ),
            Palette::default(),
        )
        .unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(
            map.traversable_cells(),
            vec![
                Location::new(0, 0),
                Location::new(2, 0),
                Location::new(0, 1),
                Location::new(2, 1),
            ]
        );
        assert_eq!(map.count_symbol(BLOCKED), 2);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = GridMap::from_rows("bad", rows("...\n.."), Palette::default());
        assert!(matches!(res, Err(MapCreatorError::MapFormat { line: 2, .. })));
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let res = GridMap::from_rows("bad", rows("..x"), Palette::default());
        assert!(matches!(res, Err(MapCreatorError::UnknownTerrain('x'))));

        let mut map = GridMap::blank("blank", 2, 2, OPEN, Palette::default()).unwrap();
        assert!(map.set_cell_terrain(Location::new(0, 0), 'x').is_err());
    }

    #[test]
    fn out_of_bounds_cells_are_not_traversable() {
        let mut map = GridMap::blank("blank", 2, 2, OPEN, Palette::default()).unwrap();
        assert!(!map.is_traversable(Location::new(2, 0)));
        assert!(matches!(
            map.set_cell_terrain(Location::new(0, 2), BLOCKED),
            Err(MapCreatorError::LocationOutOfBounds { .. })
        ));
    }
}
