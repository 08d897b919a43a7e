use super::courier_service::CourierService;
use crate::adapters::inbound::{BroadcastHub, HubEndpoint, InMemoryStore};
use crate::adapters::outbound::{ActionSlot, GridWorld};
use crate::common::ApplicationResult;
use crate::config::Config;
use crate::domains::courier::CourierProjection;
use crate::domains::logger::{AgentLogger, DynLogger};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// One courier as hosted by the simulation: its decision service plus the
/// memory and radio it owns.
struct HostedCourier {
    service: CourierService,
    memory: InMemoryStore,
    endpoint: HubEndpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub delivered: usize,
    pub packets_left: usize,
    pub couriers: BTreeMap<String, CourierProjection>,
}

/// Drives every courier of a [`GridWorld`] in lockstep, one action each per
/// tick, in agent id order.
pub struct Simulation {
    world: GridWorld,
    hub: BroadcastHub,
    couriers: Vec<HostedCourier>,
    stats: BTreeMap<String, CourierProjection>,
    rng: StdRng,
    logger: DynLogger,
    tick: u64,
}

impl Simulation {
    /// Generate a world from `config.simulation` and host a courier on every
    /// agent in it.
    pub fn new(config: &Config, logger: DynLogger) -> ApplicationResult<Self> {
        let mut rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = GridWorld::generate(&config.simulation, &config.energy, &mut rng)?;
        Ok(Self::with_world(world, config, logger, rng))
    }

    pub fn with_world(world: GridWorld, config: &Config, logger: DynLogger, rng: StdRng) -> Self {
        let hub = match config.simulation.communication_range {
            0 => BroadcastHub::new(),
            range => BroadcastHub::with_range(range),
        };
        let couriers = world
            .agent_ids()
            .into_iter()
            .map(|id| HostedCourier {
                service: CourierService::new(id.clone(), config, AgentLogger::shared(id.clone(), logger.clone())),
                memory: InMemoryStore::new(),
                endpoint: hub.endpoint(id),
            })
            .collect();

        Self {
            world,
            hub,
            couriers,
            stats: BTreeMap::new(),
            rng,
            logger,
            tick: 0,
        }
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &BTreeMap<String, CourierProjection> {
        &self.stats
    }

    pub fn step(&mut self) -> ApplicationResult<()> {
        self.tick += 1;
        for courier in self.couriers.iter_mut() {
            let id = courier.service.agent_id().to_string();
            let observation = self.world.observe(&id)?;
            self.hub.update_position(&id, observation.position);

            let mut slot = ActionSlot::default();
            let report = courier.service.run_tick(
                &observation,
                &mut courier.memory,
                &mut courier.endpoint,
                &mut slot,
                &mut self.rng,
            )?;

            let stats = self.stats.entry(id.clone()).or_default();
            report.events.iter().for_each(|e| stats.apply(e));

            if let Some(action) = slot.take() {
                if let Err(e) = self.world.apply(&id, action) {
                    self.logger.warn(&format!("[{id}] tick {}: {e}", self.tick));
                }
            }
        }
        self.world.end_tick();
        Ok(())
    }

    /// Run up to `ticks` ticks, stopping early once every packet is delivered.
    pub fn run(&mut self, ticks: u64) -> ApplicationResult<SimulationSummary> {
        for _ in 0..ticks {
            if self.world.packets_left() == 0 {
                break;
            }
            self.step()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            ticks: self.tick,
            delivered: self.world.delivered(),
            packets_left: self.world.packets_left(),
            couriers: self.stats.clone(),
        }
    }
}
