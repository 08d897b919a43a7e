use super::types::{ChargingStation, Color, Coordinate, Destination, Packet, Target};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Packet { color: Color, priority: bool },
    Destination { color: Color },
    ChargingStation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub walkable: bool,
    pub item: Option<Item>,
    pub agent: bool,
}

impl Cell {
    pub fn floor() -> Self {
        Self { walkable: true, item: None, agent: false }
    }

    pub fn wall() -> Self {
        Self { walkable: false, item: None, agent: false }
    }

    pub fn with_item(item: Item) -> Self {
        Self { walkable: true, item: Some(item), agent: false }
    }

    /// An agent may step here: walkable floor, no item, nobody standing on it.
    pub fn is_free(&self) -> bool {
        self.walkable && self.item.is_none() && !self.agent
    }
}

/// The rectangle of cells the host lets the agent see this tick. `None`
/// cells are outside the world or unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub origin: Coordinate,
    pub width: u32,
    pub height: u32,
    cells: Vec<Option<Cell>>,
}

impl ObservationWindow {
    /// Window of unknown cells with `origin` as its top-left corner.
    pub fn new(origin: Coordinate, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    /// Window centred on `center` reaching `radius` cells in each direction,
    /// every cell filled with open floor.
    pub fn open_around(center: Coordinate, radius: u32) -> Self {
        let side = radius * 2 + 1;
        let origin = center.offset(-(radius as i32), -(radius as i32));
        let mut window = Self::new(origin, side, side);
        window.cells.iter_mut().for_each(|c| *c = Some(Cell::floor()));
        window
    }

    fn index_of(&self, coordinate: &Coordinate) -> Option<usize> {
        let dx = coordinate.x - self.origin.x;
        let dy = coordinate.y - self.origin.y;
        if dx < 0 || dy < 0 || dx >= self.width as i32 || dy >= self.height as i32 {
            return None;
        }
        Some(dy as usize * self.width as usize + dx as usize)
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.index_of(coordinate).is_some()
    }

    pub fn cell(&self, coordinate: &Coordinate) -> Option<&Cell> {
        self.index_of(coordinate).and_then(|i| self.cells[i].as_ref())
    }

    pub fn set_cell(&mut self, coordinate: Coordinate, cell: Option<Cell>) {
        if let Some(i) = self.index_of(&coordinate) {
            self.cells[i] = cell;
        }
    }

    pub fn is_walkable(&self, coordinate: &Coordinate) -> bool {
        self.cell(coordinate).is_some_and(Cell::is_free)
    }

    /// Known cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Cell)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let x = self.origin.x + (i % self.width as usize) as i32;
            let y = self.origin.y + (i / self.width as usize) as i32;
            cell.as_ref().map(|c| (Coordinate::new(x, y), c))
        })
    }

    pub fn walkable_neighbours(&self, of: &Coordinate) -> Vec<Coordinate> {
        of.neighbours().filter(|n| self.is_walkable(n)).collect()
    }

    /// Every target visible in the window.
    pub fn targets(&self) -> Vec<Target> {
        self.iter()
            .filter_map(|(coordinate, cell)| {
                cell.item.as_ref().map(|item| match item {
                    Item::Packet { color, priority } => Target::Packet(
                        Packet::new(coordinate, color.clone()).with_priority(*priority),
                    ),
                    Item::Destination { color } => {
                        Target::Destination(Destination::new(coordinate, color.clone()))
                    }
                    Item::ChargingStation => Target::ChargingStation(ChargingStation::new(coordinate)),
                })
            })
            .collect()
    }

    pub fn packet_at(&self, coordinate: &Coordinate) -> Option<&Color> {
        match self.cell(coordinate)?.item.as_ref()? {
            Item::Packet { color, .. } => Some(color),
            _ => None,
        }
    }

    pub fn destination_at(&self, coordinate: &Coordinate) -> Option<&Color> {
        match self.cell(coordinate)?.item.as_ref()? {
            Item::Destination { color } => Some(color),
            _ => None,
        }
    }

    pub fn agent_at(&self, coordinate: &Coordinate) -> bool {
        self.cell(coordinate).is_some_and(|c| c.agent)
    }
}

/// Everything the host hands the agent at the start of a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub position: Coordinate,
    pub window: ObservationWindow,
    /// Battery as measured by the host, when it reports one.
    pub battery: Option<u32>,
    /// Color of the packet currently held, if any.
    pub carrying: Option<Color>,
}

impl Observation {
    pub fn new(position: Coordinate, window: ObservationWindow) -> Self {
        Self { position, window, battery: None, carrying: None }
    }

    pub fn with_battery(mut self, battery: u32) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn carrying(mut self, color: impl Into<Color>) -> Self {
        self.carrying = Some(color.into());
        self
    }
}
