//! Terrain palette

use std::collections::BTreeMap;
use std::fmt;

/// Symbol of the reserved, permanently blocked terrain
pub const BLOCKED: char = '@';
/// Symbol used to fill freshly built maps
pub const OPEN: char = '.';

/// Cost of entering a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Cost {
    Finite(u64),
    Infinite,
}

impl Cost {
    pub fn is_finite(self) -> bool {
        matches!(self, Cost::Finite(_))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(c) => write!(f, "{}", c),
            Cost::Infinite => write!(f, "inf"),
        }
    }
}

/// Display color of a terrain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Green,
    Cyan,
    Blue,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Terrain {
    pub cost: Cost,
    pub color: Color,
}

/// Registered terrains, keyed by their map symbol
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    terrains: BTreeMap<char, Terrain>,
}

impl Palette {
    /// Palette containing a single terrain
    pub fn new(symbol: char, cost: Cost, color: Color) -> Self {
        let mut palette = Palette {
            terrains: BTreeMap::new(),
        };
        palette.add_terrain(symbol, cost, color);
        palette
    }

    /// Register (or replace) a terrain
    pub fn add_terrain(&mut self, symbol: char, cost: Cost, color: Color) -> &mut Self {
        self.terrains.insert(symbol, Terrain { cost, color });
        self
    }

    pub fn get(&self, symbol: char) -> Option<&Terrain> {
        self.terrains.get(&symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.terrains.contains_key(&symbol)
    }

    /// Cost of every registered symbol
    pub fn cost_map(&self) -> BTreeMap<char, Cost> {
        self.terrains.iter().map(|(s, t)| (*s, t.cost)).collect()
    }

    /// Color of every registered symbol
    pub fn color_map(&self) -> BTreeMap<char, Color> {
        self.terrains.iter().map(|(s, t)| (*s, t.color)).collect()
    }
}

impl Default for Palette {
    /// Terrains of the Moving AI benchmark maps
    fn default() -> Self {
        let mut palette = Palette::new(OPEN, Cost::Finite(1000), Color::White);
        palette
            .add_terrain('T', Cost::Finite(1500), Color::Green)
            .add_terrain('S', Cost::Finite(2000), Color::Cyan)
            .add_terrain('W', Cost::Finite(2500), Color::Blue)
            .add_terrain(BLOCKED, Cost::Infinite, Color::Black);
        palette
    }
}
