//! Adjacency graph of a grid map

use petgraph::graph::{DiGraph, NodeIndex};

use crate::grid_map::{GridMap, Location};
use crate::terrain::Cost;

/// Moves allowed between neighbouring cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridBranching {
    /// Horizontal and vertical moves
    Four,
    /// Horizontal, vertical and diagonal moves
    Eight,
}

impl GridBranching {
    fn deltas(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        const EIGHT: [(isize, isize); 8] = [
            (0, -1),
            (1, -1),
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
            (-1, -1),
        ];
        match self {
            GridBranching::Four => &FOUR,
            GridBranching::Eight => &EIGHT,
        }
    }
}

/// Directed graph of the traversable cells of a map
///
/// Node weights are the cell locations; edge weights are the cost of
/// entering the target cell, multiplied by √2 for diagonal moves.
pub struct GridGraph {
    graph: DiGraph<Location, u64>,
    /// Node indices, `nodes[y][x]`
    nodes: Vec<Vec<Option<NodeIndex>>>,
}

impl GridGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Graph node of a cell, if the cell is traversable
    pub fn node_at(&self, loc: Location) -> Option<NodeIndex> {
        self.nodes.get(loc.y)?.get(loc.x).copied().flatten()
    }

    pub fn graph(&self) -> &DiGraph<Location, u64> {
        &self.graph
    }
}

/// Build the adjacency graph of `map`
///
/// Diagonal moves are only allowed when both cells sharing an edge with
/// the move are traversable, so that corners cannot be cut.
pub fn to_graph(map: &GridMap, branching: GridBranching) -> GridGraph {
    let mut graph = DiGraph::new();
    let mut nodes: Vec<Vec<Option<NodeIndex>>> = (0..map.height())
        .map(|_| (0..map.width()).map(|_| None).collect())
        .collect();

    for source in map.traversable_cells() {
        let node_a = get_or_create_node(source, &mut nodes, &mut graph);
        for &(dx, dy) in branching.deltas() {
            let Some(target) = offset(source, dx, dy) else {
                continue;
            };
            let Ok(Cost::Finite(cost)) = map.cost_at(target) else {
                continue;
            };
            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && !(map.is_traversable(Location::new(target.x, source.y))
                    && map.is_traversable(Location::new(source.x, target.y)))
            {
                continue;
            }
            let node_b = get_or_create_node(target, &mut nodes, &mut graph);
            let weight = if diagonal {
                (cost as f64 * std::f64::consts::SQRT_2).round() as u64
            } else {
                cost
            };
            graph.add_edge(node_a, node_b, weight);
        }
    }
    GridGraph { graph, nodes }
}

fn offset(loc: Location, dx: isize, dy: isize) -> Option<Location> {
    Some(Location::new(
        loc.x.checked_add_signed(dx)?,
        loc.y.checked_add_signed(dy)?,
    ))
}

/// Get node index from `nodes`, or create a new node in `graph`.
fn get_or_create_node(
    loc: Location,
    nodes: &mut [Vec<Option<NodeIndex>>],
    graph: &mut DiGraph<Location, u64>,
) -> NodeIndex {
    if let Some(node) = nodes[loc.y][loc.x] {
        node
    } else {
        let node = graph.add_node(loc);
        nodes[loc.y][loc.x] = Some(node);
        node
    }
}
