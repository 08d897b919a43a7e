use crate::domains::world::{
    ChargingStation, Color, Coordinate, Destination, Item, ObservationWindow, Packet, Target,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of folding one observation window into the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observed {
    /// Targets seen for the first time.
    pub discovered: Vec<Target>,
    /// Targets that should be visible in the window but are gone.
    pub vanished: Vec<Target>,
}

/// Everything this agent knows about packets, destinations and charging
/// stations, whether seen directly or heard over broadcast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetRegistry {
    packets: Vec<Packet>,
    destinations: Vec<Destination>,
    stations: Vec<ChargingStation>,
    claimed: BTreeSet<Coordinate>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, window: &ObservationWindow) -> Observed {
        let mut observed = Observed::default();

        for (coordinate, cell) in window.iter() {
            let Some(item) = &cell.item else { continue };
            match item {
                Item::Packet { color, priority } => {
                    if let Some(existing) = self.packets.iter_mut().find(|p| p.coordinate == coordinate) {
                        existing.priority = *priority;
                        if existing.color != *color {
                            existing.color = color.clone();
                            self.claimed.remove(&coordinate);
                        }
                        continue;
                    }
                    let packet = Packet::new(coordinate, color.clone()).with_priority(*priority);
                    observed.discovered.push(Target::Packet(packet.clone()));
                    self.packets.push(packet);
                }
                Item::Destination { color } => {
                    let destination = Destination::new(coordinate, color.clone());
                    if self.add_destination(destination.clone()) {
                        observed.discovered.push(Target::Destination(destination));
                    }
                }
                Item::ChargingStation => {
                    let station = ChargingStation::new(coordinate);
                    if self.add_station(station.clone()) {
                        observed.discovered.push(Target::ChargingStation(station));
                    }
                }
            }
        }

        let gone_packets: Vec<Packet> = self
            .packets
            .iter()
            .filter(|p| window.cell(&p.coordinate).is_some() && window.packet_at(&p.coordinate).is_none())
            .cloned()
            .collect();
        for packet in gone_packets {
            self.remove_packet(&packet.coordinate);
            observed.vanished.push(Target::Packet(packet));
        }

        let gone_destinations: Vec<Destination> = self
            .destinations
            .iter()
            .filter(|d| window.cell(&d.coordinate).is_some() && window.destination_at(&d.coordinate).is_none())
            .cloned()
            .collect();
        for destination in gone_destinations {
            self.remove_destination(&destination.coordinate);
            observed.vanished.push(Target::Destination(destination));
        }

        observed
    }

    /// Fold in targets reported by peers. Returns the ones that were new.
    /// Occupancy of already known stations is left alone; it only changes
    /// through claim/release messages or direct observation.
    pub fn merge(&mut self, targets: impl IntoIterator<Item = Target>) -> Vec<Target> {
        let mut added = Vec::new();
        for target in targets {
            let is_new = match &target {
                Target::Packet(p) => self.add_packet(p.clone()),
                Target::Destination(d) => self.add_destination(d.clone()),
                Target::ChargingStation(s) => self.add_station(s.clone()),
            };
            if is_new {
                added.push(target);
            }
        }
        added
    }

    pub fn add_packet(&mut self, packet: Packet) -> bool {
        if self.packets.iter().any(|p| p.coordinate == packet.coordinate) {
            return false;
        }
        self.packets.push(packet);
        true
    }

    pub fn add_destination(&mut self, destination: Destination) -> bool {
        if self.destinations.contains(&destination) {
            return false;
        }
        self.destinations.push(destination);
        true
    }

    pub fn add_station(&mut self, station: ChargingStation) -> bool {
        if self.stations.contains(&station) {
            return false;
        }
        self.stations.push(station);
        true
    }

    pub fn remove_packet(&mut self, coordinate: &Coordinate) -> Option<Packet> {
        self.claimed.remove(coordinate);
        let idx = self.packets.iter().position(|p| p.coordinate == *coordinate)?;
        Some(self.packets.remove(idx))
    }

    pub fn remove_destination(&mut self, coordinate: &Coordinate) -> Option<Destination> {
        let idx = self.destinations.iter().position(|d| d.coordinate == *coordinate)?;
        Some(self.destinations.remove(idx))
    }

    pub fn packet(&self, coordinate: &Coordinate) -> Option<&Packet> {
        self.packets.iter().find(|p| p.coordinate == *coordinate)
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    pub fn stations_mut(&mut self) -> &mut [ChargingStation] {
        &mut self.stations
    }

    pub fn station(&self, coordinate: &Coordinate) -> Option<&ChargingStation> {
        self.stations.iter().find(|s| s.coordinate == *coordinate)
    }

    pub fn station_mut(&mut self, coordinate: &Coordinate) -> Option<&mut ChargingStation> {
        self.stations.iter_mut().find(|s| s.coordinate == *coordinate)
    }

    pub fn contains_destination(&self, destination: &Destination) -> bool {
        self.destinations.contains(destination)
    }

    pub fn destinations_for<'a>(&'a self, color: &'a Color) -> impl Iterator<Item = &'a Destination> + 'a {
        self.destinations.iter().filter(move |d| d.color == *color)
    }

    pub fn has_destination_for(&self, color: &Color) -> bool {
        self.destinations_for(color).next().is_some()
    }

    /// Take a packet out of the available pool. Returns false when it is
    /// unknown or already claimed.
    pub fn claim(&mut self, coordinate: &Coordinate) -> bool {
        self.packet(coordinate).is_some() && self.claimed.insert(*coordinate)
    }

    pub fn release(&mut self, coordinate: &Coordinate) {
        self.claimed.remove(coordinate);
    }

    pub fn is_claimed(&self, coordinate: &Coordinate) -> bool {
        self.claimed.contains(coordinate)
    }

    pub fn available_packets(&self) -> impl Iterator<Item = &Packet> {
        self.packets.iter().filter(|p| !self.claimed.contains(&p.coordinate))
    }

    /// True when the window covers `coordinate` and shows no packet there,
    /// i.e. somebody else already picked it up.
    pub fn packet_already_handled(&self, coordinate: &Coordinate, window: &ObservationWindow) -> bool {
        window.cell(coordinate).is_some() && window.packet_at(coordinate).is_none()
    }

    /// Snapshot of every known target, for sharing with peers.
    pub fn all_targets(&self) -> Vec<Target> {
        self.packets
            .iter()
            .cloned()
            .map(Target::Packet)
            .chain(self.destinations.iter().cloned().map(Target::Destination))
            .chain(self.stations.iter().cloned().map(Target::ChargingStation))
            .collect()
    }
}
