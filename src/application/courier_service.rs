use crate::common::{AggregateRoot, ApplicationResult, DomainError, Snapshot};
use crate::config::Config;
use crate::domains::courier::{Behavior, CourierAgent, CourierEvent, CourierMessage};
use crate::domains::energy::BatteryState;
use crate::domains::logger::DynLogger;
use crate::domains::world::{Action, ActionSink, BroadcastChannel, MemoryStore, Observation};
use rand::Rng;

/// Memory-store key holding the serialized courier context.
pub const CONTEXT_KEY: &str = "courier/context";
const AGGREGATE_TYPE: &str = "CourierAgent";

/// What one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub action: Action,
    pub events: Vec<CourierEvent>,
    pub sent: usize,
}

/// Wires one courier to its host ports: restores the context from memory,
/// reads the inbox, decides, then writes everything back.
pub struct CourierService {
    agent_id: String,
    behavior: Behavior,
    max_battery: u32,
    logger: DynLogger,
}

impl CourierService {
    pub fn new(agent_id: impl Into<String>, config: &Config, logger: DynLogger) -> Self {
        Self {
            agent_id: agent_id.into(),
            behavior: Behavior::new(config),
            max_battery: config.energy.max_battery,
            logger,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn run_tick<R: Rng + ?Sized>(
        &self,
        observation: &Observation,
        memory: &mut dyn MemoryStore,
        channel: &mut dyn BroadcastChannel,
        sink: &mut dyn ActionSink,
        rng: &mut R,
    ) -> ApplicationResult<TickReport> {
        let mut agent = self.load_context(memory, observation);
        let inbox = self.read_inbox(channel);

        let outcome = self.behavior.tick(&mut agent, observation, &inbox, rng);

        let mut sent = 0;
        for message in &outcome.outgoing {
            match message.encode() {
                Ok(payload) => {
                    channel.send(payload);
                    sent += 1;
                }
                Err(e) => self.logger.error(&format!("dropping outgoing message: {e}")),
            }
        }

        let events = agent.drain_events();
        for event in &events {
            self.logger.info(&event.describe());
        }

        if let Err(e) = sink.submit(outcome.action.clone()) {
            self.logger.warn(&format!("action {:?} rejected: {e}", outcome.action));
        }

        self.save_context(memory, &agent)?;

        Ok(TickReport { action: outcome.action, events, sent })
    }

    /// Restore the context, or start over at the observed position when
    /// nothing usable is stored.
    pub fn load_context(&self, memory: &dyn MemoryStore, observation: &Observation) -> CourierAgent {
        let Some(blob) = memory.get(CONTEXT_KEY) else {
            return self.fresh_context(observation);
        };
        let restored = Snapshot::from_bytes(&blob).and_then(|s| s.restore::<CourierAgent>());
        match restored {
            Ok(agent) if agent.id == self.agent_id => agent,
            Ok(agent) => {
                self.logger.warn(&format!(
                    "stored context belongs to {}, starting fresh",
                    agent.id
                ));
                self.fresh_context(observation)
            }
            Err(e) => {
                self.logger.warn(&format!("discarding corrupt context: {e}"));
                self.fresh_context(observation)
            }
        }
    }

    pub fn save_context(&self, memory: &mut dyn MemoryStore, agent: &CourierAgent) -> ApplicationResult<()> {
        let snapshot = Snapshot::new(&agent.id, AGGREGATE_TYPE, agent.version(), agent)
            .map_err(DomainError::from)?;
        memory.set(CONTEXT_KEY, snapshot.to_bytes()?);
        Ok(())
    }

    /// Decode and consume every pending broadcast. Malformed payloads are
    /// consumed too, with a warning.
    pub fn read_inbox(&self, channel: &mut dyn BroadcastChannel) -> Vec<CourierMessage> {
        let raw = channel.receive_all();
        let mut inbox = Vec::with_capacity(raw.len());
        for (index, payload) in raw.iter().enumerate().rev() {
            match CourierMessage::decode(payload) {
                Ok(message) => inbox.push(message),
                Err(e) => self.logger.warn(&format!("skipping malformed broadcast: {e}")),
            }
            channel.remove(index);
        }
        inbox.reverse();
        inbox
    }

    /// Drop everything this courier keeps in memory.
    pub fn forget(&self, memory: &mut dyn MemoryStore) {
        for key in memory.keys() {
            if key.starts_with("courier/") {
                memory.remove(&key);
            }
        }
    }

    fn fresh_context(&self, observation: &Observation) -> CourierAgent {
        let battery = match observation.battery {
            Some(level) => BatteryState::new(level, self.max_battery),
            None => BatteryState::full(self.max_battery),
        };
        CourierAgent::new(self.agent_id.clone(), observation.position, battery)
    }
}
