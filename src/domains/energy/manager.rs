use super::battery::BatteryState;
use crate::config::EnergyConfig;
use crate::domains::world::{ChargingStation, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    MustCharge { station: Coordinate },
    MustLeaveChargingPad,
}

/// Decides when the agent has to detour to a charger and when it may leave.
#[derive(Debug, Clone)]
pub struct BatteryManager {
    energy: EnergyConfig,
}

impl BatteryManager {
    pub fn new(energy: EnergyConfig) -> Self {
        Self { energy }
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.energy
    }

    pub fn tick(
        &self,
        agent: Coordinate,
        battery: &BatteryState,
        stations: &[ChargingStation],
        carrying: bool,
        charging: bool,
    ) -> Decision {
        if charging {
            if battery.level() >= self.energy.resume_level() {
                return Decision::MustLeaveChargingPad;
            }
            return Decision::Continue;
        }
        let Some(station) = self.choose_station(agent, stations) else {
            return Decision::Continue;
        };
        let needed = self.energy_to_reach(agent, station, carrying) + self.energy.safety_margin;
        if needed > battery.level() {
            Decision::MustCharge { station: station.coordinate }
        } else {
            Decision::Continue
        }
    }

    pub fn energy_to_reach(&self, agent: Coordinate, station: &ChargingStation, carrying: bool) -> u32 {
        agent.chebyshev(&station.pad()) * self.energy.cost_per_step(carrying)
    }

    /// Ticks until the current occupant is expected to leave: `Some(0)` for a
    /// free station, `None` when the occupant never reported its battery.
    pub fn remaining_occupancy(&self, station: &ChargingStation) -> Option<u32> {
        if !station.in_use {
            return Some(0);
        }
        let occupant = station.occupant_battery?;
        let missing = self.energy.max_battery.saturating_sub(occupant);
        Some(missing.div_ceil(self.energy.recharge_rate.max(1)))
    }

    /// Whether the station should be free by the time the agent walks there.
    pub fn is_available_on_arrival(&self, agent: Coordinate, station: &ChargingStation) -> bool {
        self.remaining_occupancy(station)
            .is_some_and(|remaining| agent.chebyshev(&station.pad()) >= remaining)
    }

    /// Nearest station expected to be free on arrival; when every station is
    /// contested, the one that frees up soonest relative to the walk there.
    pub fn choose_station<'a>(
        &self,
        agent: Coordinate,
        stations: &'a [ChargingStation],
    ) -> Option<&'a ChargingStation> {
        let nearest_available = stations
            .iter()
            .filter(|s| self.is_available_on_arrival(agent, s))
            .min_by_key(|s| agent.chebyshev(&s.pad()));
        if nearest_available.is_some() {
            return nearest_available;
        }
        stations.iter().min_by_key(|s| {
            let travel = agent.chebyshev(&s.pad());
            let wait = self.remaining_occupancy(s).unwrap_or(self.energy.max_battery);
            travel.max(wait)
        })
    }
}
