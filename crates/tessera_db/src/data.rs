//! Core netlist data structures.
//!
//! Defines the physical netlist used by detailed placement: nodes (cells with
//! a position), edges (nets), and pins (a node's connection to an edge, with
//! an offset from the node centre). The [`Design`] owns all of them plus the
//! [`Architecture`].

use crate::arch::{Architecture, DEFAULT_REGION};
use crate::ids::{EdgeId, NodeId, PinId};
use crate::stats::DesignStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_common::{InternalError, PlacementHash, Point, Rect, TesseraResult};

/// Tolerance used when comparing cell heights and row coordinates.
pub const GEOM_EPS: f64 = 1e-6;

/// A cell instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// The node's ID (assigned by [`Design::add_node`]).
    pub id: NodeId,
    /// Instance name.
    pub name: String,
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
    /// Fixed cells never move and block the rows they overlap.
    pub fixed: bool,
    /// Placement group constraint.
    pub region: u32,
    /// Pins owned by this node (filled by [`Design::connect`]).
    pub pins: Vec<PinId>,
}

impl Node {
    /// Creates a movable node in the default region.
    pub fn movable(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: NodeId::from_raw(0),
            name: name.into(),
            x,
            y,
            width,
            height,
            fixed: false,
            region: DEFAULT_REGION,
            pins: Vec::new(),
        }
    }

    /// Creates a fixed node (terminal or blockage).
    pub fn fixed(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            fixed: true,
            ..Self::movable(name, x, y, width, height)
        }
    }

    /// Sets the region-id.
    pub fn in_region(mut self, region: u32) -> Self {
        self.region = region;
        self
    }

    /// Returns the centre position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the left edge.
    pub fn left(&self) -> f64 {
        self.x - 0.5 * self.width
    }

    /// Returns the right edge.
    pub fn right(&self) -> f64 {
        self.x + 0.5 * self.width
    }

    /// Returns the bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y - 0.5 * self.height
    }

    /// Returns the top edge.
    pub fn top(&self) -> f64 {
        self.y + 0.5 * self.height
    }

    /// Returns the cell outline.
    pub fn outline(&self) -> Rect {
        Rect::new(self.left(), self.bottom(), self.right(), self.top())
    }

    /// Returns the cell area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A node's connection point on an edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// The pin's ID.
    pub id: PinId,
    /// Owning node.
    pub node: NodeId,
    /// Owning edge.
    pub edge: EdgeId,
    /// Horizontal offset from the node centre.
    pub dx: f64,
    /// Vertical offset from the node centre.
    pub dy: f64,
}

/// A net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The edge's ID.
    pub id: EdgeId,
    /// Net name.
    pub name: String,
    /// Pins on this net, in connection order.
    pub pins: Vec<PinId>,
}

impl Edge {
    /// Returns the number of pins on this net.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

/// The physical netlist plus its architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// Chip bounds, rows and regions.
    pub arch: Architecture,
    /// All nodes.
    pub nodes: Vec<Node>,
    /// All pins.
    pub pins: Vec<Pin>,
    /// All edges.
    pub edges: Vec<Edge>,
    /// Auxiliary index: node name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub node_by_name: HashMap<String, NodeId>,
    /// Auxiliary index: edge name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub edge_by_name: HashMap<String, EdgeId>,
}

impl Design {
    /// Creates an empty design on the given architecture.
    pub fn new(arch: Architecture) -> Self {
        Self {
            arch,
            nodes: Vec::new(),
            pins: Vec::new(),
            edges: Vec::new(),
            node_by_name: HashMap::new(),
            edge_by_name: HashMap::new(),
        }
    }

    /// Adds a node and returns its ID.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        node.id = id;
        node.pins.clear();
        self.node_by_name.insert(node.name.clone(), id);
        self.nodes.push(node);
        id
    }

    /// Creates a net connecting the given `(node, dx, dy)` pins and returns
    /// its ID. Pins are linked into both the edge and their node.
    pub fn connect(&mut self, name: impl Into<String>, pins: &[(NodeId, f64, f64)]) -> EdgeId {
        let edge_id = EdgeId::from_index(self.edges.len());
        let mut edge = Edge {
            id: edge_id,
            name: name.into(),
            pins: Vec::with_capacity(pins.len()),
        };
        for &(node, dx, dy) in pins {
            let pin_id = PinId::from_index(self.pins.len());
            self.pins.push(Pin {
                id: pin_id,
                node,
                edge: edge_id,
                dx,
                dy,
            });
            edge.pins.push(pin_id);
            self.nodes[node.index()].pins.push(pin_id);
        }
        self.edge_by_name.insert(edge.name.clone(), edge_id);
        self.edges.push(edge);
        edge_id
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.index()]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Moves a node's centre.
    pub fn set_position(&mut self, id: NodeId, pos: Point) {
        let node = &mut self.nodes[id.index()];
        node.x = pos.x;
        node.y = pos.y;
    }

    /// Returns the absolute location of a pin.
    pub fn pin_position(&self, id: PinId) -> Point {
        let pin = self.pin(id);
        let node = self.node(pin.node);
        Point::new(node.x + pin.dx, node.y + pin.dy)
    }

    /// Returns `true` if the node is exactly one row tall.
    pub fn is_single_height(&self, id: NodeId) -> bool {
        match self.arch.row_height() {
            Some(h) => (self.node(id).height - h).abs() <= GEOM_EPS,
            None => false,
        }
    }

    /// Returns the bounding box of an edge's pins.
    pub fn edge_bbox(&self, id: EdgeId) -> Rect {
        let mut bbox = Rect::empty();
        for &pin in &self.edge(id).pins {
            let p = self.pin_position(pin);
            bbox.expand(p.x, p.y);
        }
        bbox
    }

    /// Returns the half-perimeter wirelength of one edge (zero for nets
    /// with fewer than two pins).
    pub fn edge_hpwl(&self, id: EdgeId) -> f64 {
        if self.edge(id).pin_count() <= 1 {
            return 0.0;
        }
        self.edge_bbox(id).half_perimeter()
    }

    /// Returns the total HPWL split into its horizontal and vertical parts.
    pub fn hpwl_xy(&self) -> (f64, f64) {
        let mut hx = 0.0;
        let mut hy = 0.0;
        for edge in &self.edges {
            if edge.pin_count() <= 1 {
                continue;
            }
            let bbox = self.edge_bbox(edge.id);
            hx += bbox.xmax - bbox.xmin;
            hy += bbox.ymax - bbox.ymin;
        }
        (hx, hy)
    }

    /// Computes the total half-perimeter wirelength across all nets.
    pub fn total_hpwl(&self) -> f64 {
        let (hx, hy) = self.hpwl_xy();
        hx + hy
    }

    /// Fingerprints the current positions of all nodes.
    pub fn placement_hash(&self) -> PlacementHash {
        let points: Vec<Point> = self.nodes.iter().map(Node::position).collect();
        PlacementHash::from_points(&points)
    }

    /// Summarises cell counts, areas and utilisation.
    pub fn stats(&self) -> DesignStats {
        DesignStats::collect(self)
    }

    /// Verifies that every cross reference between nodes, pins and edges is
    /// in range and mutually consistent.
    pub fn check_consistency(&self) -> TesseraResult<()> {
        for (i, pin) in self.pins.iter().enumerate() {
            if pin.id.index() != i {
                return Err(InternalError::new(format!("pin {i} carries id {}", pin.id)));
            }
            let node = self.nodes.get(pin.node.index()).ok_or_else(|| {
                InternalError::new(format!("pin {i} references missing node {}", pin.node))
            })?;
            let edge = self.edges.get(pin.edge.index()).ok_or_else(|| {
                InternalError::new(format!("pin {i} references missing edge {}", pin.edge))
            })?;
            if !node.pins.contains(&pin.id) {
                return Err(InternalError::new(format!(
                    "pin {i} is not listed on node '{}'",
                    node.name
                )));
            }
            if !edge.pins.contains(&pin.id) {
                return Err(InternalError::new(format!(
                    "pin {i} is not listed on edge '{}'",
                    edge.name
                )));
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.index() != i {
                return Err(InternalError::new(format!("node {i} carries id {}", node.id)));
            }
            if let Some(p) = node.pins.iter().find(|p| p.index() >= self.pins.len()) {
                return Err(InternalError::new(format!(
                    "node '{}' lists missing pin {p}",
                    node.name
                )));
            }
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.id.index() != i {
                return Err(InternalError::new(format!("edge {i} carries id {}", edge.id)));
            }
            if let Some(p) = edge.pins.iter().find(|p| p.index() >= self.pins.len()) {
                return Err(InternalError::new(format!(
                    "edge '{}' lists missing pin {p}",
                    edge.name
                )));
            }
        }
        Ok(())
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.node_by_name.clear();
        for node in &self.nodes {
            self.node_by_name.insert(node.name.clone(), node.id);
        }
        self.edge_by_name.clear();
        for edge in &self.edges {
            self.edge_by_name.insert(edge.name.clone(), edge.id);
        }
    }
}
