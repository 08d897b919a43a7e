use super::task::Task;
use crate::config::EnergyConfig;
use crate::domains::energy::BatteryState;
use crate::domains::targets::TargetRegistry;
use crate::domains::world::{Color, Coordinate, Destination, Packet};
use std::cmp::Ordering;

/// Chooses which packet to fetch and where to bring it.
#[derive(Debug, Clone)]
pub struct TaskSelector {
    energy: EnergyConfig,
}

impl TaskSelector {
    pub fn new(energy: EnergyConfig) -> Self {
        Self { energy }
    }

    /// Pick the next (packet, destination) pair, or keep `current` while its
    /// packet is still known.
    ///
    /// Candidates are ordered priority first, then packets with a known
    /// same-color destination, then by distance. The first pair whose full
    /// round (agent -> packet -> destination) fits in the battery wins and
    /// its packet is claimed.
    pub fn select_task(
        &self,
        registry: &mut TargetRegistry,
        agent: Coordinate,
        battery: &BatteryState,
        current: Option<&Task>,
    ) -> Option<Task> {
        if let Some(task) = current {
            let still_valid = task
                .packet()
                .is_some_and(|p| registry.packet(&p.coordinate).is_some());
            if still_valid {
                return Some(task.clone());
            }
        }

        let mut candidates: Vec<Packet> = registry.available_packets().cloned().collect();
        candidates.sort_by(|a, b| self.candidate_order(registry, agent, a, b));

        for packet in candidates {
            let Some(destination) = self.feasible_destination(registry, agent, &packet, battery) else {
                continue;
            };
            let Ok(task) = Task::new(packet.clone(), destination) else {
                continue;
            };
            registry.claim(&packet.coordinate);
            return Some(task);
        }
        None
    }

    /// Nearest known destination for a packet that is already being carried.
    pub fn select_destination(
        &self,
        registry: &TargetRegistry,
        color: &Color,
        from: Coordinate,
    ) -> Option<Destination> {
        registry
            .destinations_for(color)
            .min_by_key(|d| from.traversal_cost(&d.coordinate))
            .cloned()
    }

    /// Energy to walk to the packet and then carry it to the destination.
    pub fn projected_energy(&self, agent: Coordinate, packet: &Packet, destination: &Destination) -> u32 {
        let to_packet = agent.traversal_cost(&packet.coordinate);
        let to_destination = packet.coordinate.traversal_cost(&destination.coordinate);
        to_packet * self.energy.step_cost + to_destination * self.energy.carry_step_cost
    }

    fn feasible_destination(
        &self,
        registry: &TargetRegistry,
        agent: Coordinate,
        packet: &Packet,
        battery: &BatteryState,
    ) -> Option<Destination> {
        let mut destinations: Vec<&Destination> = registry.destinations_for(&packet.color).collect();
        destinations.sort_by_key(|d| packet.coordinate.traversal_cost(&d.coordinate));
        destinations
            .into_iter()
            .find(|d| self.projected_energy(agent, packet, d) <= battery.level())
            .cloned()
    }

    fn candidate_order(&self, registry: &TargetRegistry, agent: Coordinate, a: &Packet, b: &Packet) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then_with(|| {
                registry
                    .has_destination_for(&b.color)
                    .cmp(&registry.has_destination_for(&a.color))
            })
            .then_with(|| {
                agent
                    .euclidean(&a.coordinate)
                    .total_cmp(&agent.euclidean(&b.coordinate))
            })
    }
}
