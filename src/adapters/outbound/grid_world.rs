use crate::common::{DomainError, DomainResult};
use crate::config::{EnergyConfig, SimulationConfig};
use crate::domains::energy::BatteryState;
use crate::domains::world::{
    Action, ActionSink, Cell, ChargingStation, Color, Coordinate, Item, Observation,
    ObservationWindow,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};

const PLACEMENT_ATTEMPTS: usize = 1_000;

/// Physical state of one agent as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentBody {
    pub position: Coordinate,
    pub battery: BatteryState,
    pub carrying: Option<Color>,
}

/// A small turn-based grid host: walls, items, agents and their batteries.
/// It validates and applies the actions couriers submit and produces their
/// observation windows.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    walls: HashSet<Coordinate>,
    items: HashMap<Coordinate, Item>,
    agents: BTreeMap<String, AgentBody>,
    energy: EnergyConfig,
    view_radius: u32,
    delivered: usize,
}

impl GridWorld {
    pub fn new(width: u32, height: u32, energy: EnergyConfig, view_radius: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            walls: HashSet::new(),
            items: HashMap::new(),
            agents: BTreeMap::new(),
            energy,
            view_radius,
            delivered: 0,
        }
    }

    /// Random world from the simulation settings. Every station keeps its
    /// pad clear and every color gets one destination.
    pub fn generate<R: Rng + ?Sized>(
        simulation: &SimulationConfig,
        energy: &EnergyConfig,
        rng: &mut R,
    ) -> DomainResult<Self> {
        simulation
            .validate()
            .map_err(|e| DomainError::InvalidCommand { reason: e.to_string() })?;
        let mut world = Self::new(simulation.width, simulation.height, energy.clone(), simulation.view_radius);
        let mut reserved = HashSet::new();

        let walls = (simulation.width * simulation.height / 12) as usize;
        for _ in 0..walls {
            if let Some(cell) = world.random_free_cell(rng, &reserved) {
                world.add_wall(cell);
            }
        }

        for _ in 0..simulation.stations {
            let spot = (0..PLACEMENT_ATTEMPTS)
                .filter_map(|_| world.random_free_cell(rng, &reserved))
                .find(|c| world.is_open(&c.offset(0, -1)) && !reserved.contains(&c.offset(0, -1)));
            let station = spot.ok_or_else(|| placement_error("charging station"))?;
            reserved.insert(station.offset(0, -1));
            world.place_item(station, Item::ChargingStation);
        }

        for color in &simulation.colors {
            let cell = world
                .random_free_cell(rng, &reserved)
                .ok_or_else(|| placement_error("destination"))?;
            world.place_item(cell, Item::Destination { color: Color::new(color.as_str()) });
        }

        for _ in 0..simulation.packets {
            let Some(color) = simulation.colors.choose(rng) else { break };
            let cell = world
                .random_free_cell(rng, &reserved)
                .ok_or_else(|| placement_error("packet"))?;
            let priority = rng.gen_bool(0.2);
            world.place_item(cell, Item::Packet { color: Color::new(color.as_str()), priority });
        }

        for index in 0..simulation.agents {
            let cell = world
                .random_free_cell(rng, &reserved)
                .ok_or_else(|| placement_error("agent"))?;
            world.place_agent(format!("courier-{}", index + 1), cell)?;
        }

        Ok(world)
    }

    pub fn add_wall(&mut self, coordinate: Coordinate) {
        self.walls.insert(coordinate);
    }

    pub fn place_item(&mut self, coordinate: Coordinate, item: Item) {
        self.items.insert(coordinate, item);
    }

    pub fn place_agent(&mut self, id: impl Into<String>, position: Coordinate) -> DomainResult<()> {
        let id = id.into();
        if !self.is_open(&position) {
            return Err(DomainError::InvalidCommand { reason: format!("cannot place {id} at {position}") });
        }
        let body = AgentBody {
            position,
            battery: BatteryState::full(self.energy.max_battery),
            carrying: None,
        };
        self.agents.insert(id, body);
        Ok(())
    }

    pub fn agent(&self, id: &str) -> Option<&AgentBody> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut AgentBody> {
        self.agents.get_mut(id)
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    pub fn item_at(&self, coordinate: &Coordinate) -> Option<&Item> {
        self.items.get(coordinate)
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn packets_left(&self) -> usize {
        let on_floor = self.items.values().filter(|i| matches!(i, Item::Packet { .. })).count();
        let in_hand = self.agents.values().filter(|a| a.carrying.is_some()).count();
        on_floor + in_hand
    }

    pub fn stations(&self) -> Vec<ChargingStation> {
        self.items
            .iter()
            .filter(|(_, item)| matches!(item, Item::ChargingStation))
            .map(|(c, _)| ChargingStation::new(*c))
            .collect()
    }

    /// What `id` sees this tick: a square of `view_radius` around it.
    pub fn observe(&self, id: &str) -> DomainResult<Observation> {
        let body = self.body(id)?;
        let radius = self.view_radius as i32;
        let side = self.view_radius * 2 + 1;
        let origin = body.position.offset(-radius, -radius);
        let mut window = ObservationWindow::new(origin, side, side);

        for dy in 0..side as i32 {
            for dx in 0..side as i32 {
                let coordinate = origin.offset(dx, dy);
                window.set_cell(coordinate, self.cell_for(id, &coordinate));
            }
        }

        let mut observation = Observation::new(body.position, window).with_battery(body.battery.level());
        if let Some(color) = &body.carrying {
            observation = observation.carrying(color.clone());
        }
        Ok(observation)
    }

    /// Validate and perform `action` for agent `id`.
    pub fn apply(&mut self, id: &str, action: Action) -> DomainResult<()> {
        match action {
            Action::Skip => Ok(()),
            Action::Step(to) => self.step(id, to),
            Action::PickPacket(at) => self.pick(id, at),
            Action::PutPacket(at) => self.put(id, at),
        }
    }

    /// Agents standing on a pad recharge at the end of the tick.
    pub fn end_tick(&mut self) {
        let pads: HashSet<Coordinate> = self.stations().iter().map(ChargingStation::pad).collect();
        let rate = self.energy.recharge_rate;
        for body in self.agents.values_mut() {
            if pads.contains(&body.position) {
                body.battery.charge(rate);
            }
        }
    }

    fn step(&mut self, id: &str, to: Coordinate) -> DomainResult<()> {
        let body = self.body(id)?;
        if !body.position.is_adjacent(&to) {
            return Err(invalid(format!("{id} cannot jump from {} to {to}", body.position)));
        }
        if !self.is_open(&to) || self.agents.values().any(|a| a.position == to) {
            return Err(invalid(format!("{to} is blocked")));
        }
        let cost = self.energy.cost_per_step(body.carrying.is_some());
        if body.battery.level() < cost {
            return Err(invalid(format!("{id} has too little battery to move")));
        }
        if let Some(body) = self.agents.get_mut(id) {
            body.position = to;
            body.battery.drain(cost);
        }
        Ok(())
    }

    fn pick(&mut self, id: &str, at: Coordinate) -> DomainResult<()> {
        let body = self.body(id)?;
        if body.carrying.is_some() {
            return Err(invalid(format!("{id} already carries a packet")));
        }
        if body.position.chebyshev(&at) > 1 {
            return Err(invalid(format!("{at} is out of reach for {id}")));
        }
        let color = match self.items.get(&at) {
            Some(Item::Packet { color, .. }) => color.clone(),
            _ => return Err(DomainError::StaleTarget { coordinate: at }),
        };
        self.items.remove(&at);
        if let Some(body) = self.agents.get_mut(id) {
            body.carrying = Some(color);
        }
        Ok(())
    }

    fn put(&mut self, id: &str, at: Coordinate) -> DomainResult<()> {
        let body = self.body(id)?;
        let Some(packet) = body.carrying.clone() else {
            return Err(invalid(format!("{id} carries nothing")));
        };
        if body.position.chebyshev(&at) > 1 {
            return Err(invalid(format!("{at} is out of reach for {id}")));
        }
        match self.items.get(&at) {
            Some(Item::Destination { color }) if *color == packet => {}
            Some(Item::Destination { color }) => {
                return Err(DomainError::ColorMismatch { packet, destination: color.clone() });
            }
            _ => return Err(DomainError::StaleTarget { coordinate: at }),
        }
        if let Some(body) = self.agents.get_mut(id) {
            body.carrying = None;
        }
        self.delivered += 1;
        Ok(())
    }

    fn body(&self, id: &str) -> DomainResult<&AgentBody> {
        self.agents
            .get(id)
            .ok_or_else(|| invalid(format!("unknown agent {id}")))
    }

    fn in_bounds(&self, coordinate: &Coordinate) -> bool {
        (0..self.width).contains(&coordinate.x) && (0..self.height).contains(&coordinate.y)
    }

    /// In bounds, no wall, no item.
    fn is_open(&self, coordinate: &Coordinate) -> bool {
        self.in_bounds(coordinate) && !self.walls.contains(coordinate) && !self.items.contains_key(coordinate)
    }

    fn cell_for(&self, viewer: &str, coordinate: &Coordinate) -> Option<Cell> {
        if !self.in_bounds(coordinate) {
            return None;
        }
        if self.walls.contains(coordinate) {
            return Some(Cell::wall());
        }
        let mut cell = match self.items.get(coordinate) {
            Some(item) => Cell::with_item(item.clone()),
            None => Cell::floor(),
        };
        cell.agent = self
            .agents
            .iter()
            .any(|(id, a)| id != viewer && a.position == *coordinate);
        Some(cell)
    }

    fn random_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        reserved: &HashSet<Coordinate>,
    ) -> Option<Coordinate> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        (0..PLACEMENT_ATTEMPTS)
            .map(|_| Coordinate::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height)))
            .find(|c| {
                self.is_open(c) && !reserved.contains(c) && !self.agents.values().any(|a| a.position == *c)
            })
    }
}

fn invalid(reason: String) -> DomainError {
    DomainError::InvalidCommand { reason }
}

fn placement_error(what: &str) -> DomainError {
    DomainError::InfrastructureError(format!("no room left to place a {what}"))
}

/// Sink that holds the submitted action until the host applies it.
#[derive(Debug, Default, Clone)]
pub struct ActionSlot {
    action: Option<Action>,
}

impl ActionSlot {
    pub fn take(&mut self) -> Option<Action> {
        self.action.take()
    }
}

impl ActionSink for ActionSlot {
    fn submit(&mut self, action: Action) -> DomainResult<()> {
        if self.action.is_some() {
            return Err(invalid("one action per tick".to_string()));
        }
        self.action = Some(action);
        Ok(())
    }
}
