use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid position. Used as the graph key, so it is `Copy + Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Cost of walking from `self` to `other` with 8-connected moves:
    /// `min(|dx|,|dy|)` diagonal steps plus the straight remainder.
    pub fn traversal_cost(&self, other: &Coordinate) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.min(dy) + dx.abs_diff(dy)
    }

    pub fn chebyshev(&self, other: &Coordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn euclidean(&self, other: &Coordinate) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// One 8-connected step from `self` in the direction of `other`.
    pub fn step_towards(&self, other: &Coordinate) -> Coordinate {
        self.offset((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    pub fn is_adjacent(&self, other: &Coordinate) -> bool {
        self.chebyshev(other) == 1
    }

    pub fn neighbours(self) -> impl Iterator<Item = Coordinate> {
        DIRECTIONS.iter().map(move |(dx, dy)| self.offset(*dx, *dy))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub coordinate: Coordinate,
    pub color: Color,
    #[serde(default)]
    pub priority: bool,
}

impl Packet {
    pub fn new(coordinate: Coordinate, color: impl Into<Color>) -> Self {
        Self { coordinate, color: color.into(), priority: false }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate && self.color == other.color
    }
}

impl Eq for Packet {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub coordinate: Coordinate,
    pub color: Color,
}

impl Destination {
    pub fn new(coordinate: Coordinate, color: impl Into<Color>) -> Self {
        Self { coordinate, color: color.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStation {
    pub coordinate: Coordinate,
    pub in_use: bool,
    pub occupant_battery: Option<u32>,
}

impl ChargingStation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate, in_use: false, occupant_battery: None }
    }

    /// The cell an agent stands on to charge: one row above the station.
    pub fn pad(&self) -> Coordinate {
        self.coordinate.offset(0, -1)
    }

    pub fn occupy(&mut self, battery: u32) {
        self.in_use = true;
        self.occupant_battery = Some(battery);
    }

    pub fn release(&mut self) {
        self.in_use = false;
        self.occupant_battery = None;
    }
}

impl PartialEq for ChargingStation {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for ChargingStation {}

/// Any point of interest the agent can discover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Packet(Packet),
    Destination(Destination),
    ChargingStation(ChargingStation),
}

impl Target {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Target::Packet(p) => p.coordinate,
            Target::Destination(d) => d.coordinate,
            Target::ChargingStation(s) => s.coordinate,
        }
    }

    pub fn color(&self) -> Option<&Color> {
        match self {
            Target::Packet(p) => Some(&p.color),
            Target::Destination(d) => Some(&d.color),
            Target::ChargingStation(_) => None,
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            Target::Packet(p) => NodeKind::Packet(p.color.clone()),
            Target::Destination(d) => NodeKind::Destination(d.color.clone()),
            Target::ChargingStation(_) => NodeKind::ChargingStation,
        }
    }
}

/// Classification of a map node. Refined from `Free` once, degraded back to
/// `Free` only when the target turns out to be stale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Free,
    Packet(Color),
    Destination(Color),
    ChargingStation,
}

impl NodeKind {
    pub fn is_free(&self) -> bool {
        matches!(self, NodeKind::Free)
    }
}

/// The single request an agent hands to the host each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Step(Coordinate),
    PickPacket(Coordinate),
    PutPacket(Coordinate),
    Skip,
}
