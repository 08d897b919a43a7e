use super::events::CourierEvent;
use super::projections::CourierProjection;
use crate::common::{AggregateRoot, DomainResult};
use crate::domains::energy::BatteryState;
use crate::domains::mapping::{GraphBuilder, MapGraph};
use crate::domains::path_planning::Path;
use crate::domains::targets::TargetRegistry;
use crate::domains::tasking::{Task, TaskPhase};
use crate::domains::world::{Color, Coordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    #[default]
    Explore,
    ToPacket,
    PickingUp,
    ToDestination,
    PuttingDown,
    ToCharger,
    Charging,
}

impl BehaviorState {
    pub fn is_charging_detour(&self) -> bool {
        matches!(self, BehaviorState::ToCharger | BehaviorState::Charging)
    }

    /// Task phase matching this behavior.
    pub fn task_phase(&self) -> TaskPhase {
        match self {
            BehaviorState::Explore => TaskPhase::Idle,
            BehaviorState::ToPacket | BehaviorState::PickingUp => TaskPhase::ToPacket,
            BehaviorState::ToDestination | BehaviorState::PuttingDown => TaskPhase::ToDestination,
            BehaviorState::ToCharger | BehaviorState::Charging => TaskPhase::Charging,
        }
    }
}

/// Everything a courier remembers between ticks. This is the unit that is
/// serialized into the agent's memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierAgent {
    pub id: String,
    pub tick: u64,
    pub position: Coordinate,
    pub graph: MapGraph,
    pub builder: GraphBuilder,
    pub registry: TargetRegistry,
    pub task: Option<Task>,
    pub battery: BatteryState,
    pub path: Path,
    pub state: BehaviorState,
    /// State to resume once charging is done.
    pub interrupted: Option<BehaviorState>,
    /// Station the current charging detour is aimed at.
    pub charger: Option<Coordinate>,
    pub carrying: Option<Color>,
    pub heading: Option<(i32, i32)>,
    /// A pick/put action was emitted last tick and awaits confirmation.
    pub awaiting_confirmation: bool,
    pub stats: CourierProjection,
    pub version: u64,
    #[serde(skip)]
    uncommitted_events: Vec<CourierEvent>,
}

impl CourierAgent {
    /// Fresh context: graph seeded at the current position, nothing known.
    pub fn new(id: String, position: Coordinate, battery: BatteryState) -> Self {
        let mut agent = Self {
            id: id.clone(),
            tick: 0,
            position,
            graph: MapGraph::seeded(position),
            builder: GraphBuilder::starting_at(position),
            registry: TargetRegistry::new(),
            task: None,
            battery,
            path: Path::default(),
            state: BehaviorState::Explore,
            interrupted: None,
            charger: None,
            carrying: None,
            heading: None,
            awaiting_confirmation: false,
            stats: CourierProjection::default(),
            version: 0,
            uncommitted_events: Vec::new(),
        };
        agent.record(CourierEvent::AgentInitialized {
            agent_id: id,
            position,
            tick: 0,
            timestamp: chrono::Utc::now(),
        });
        agent
    }

    /// Apply and queue an event. Applying courier events cannot fail.
    pub fn record(&mut self, event: CourierEvent) {
        if self.apply(&event).is_ok() {
            self.add_event(event);
        }
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying.is_some()
    }

    /// Drop the current task, handing its packet back to the pool.
    pub fn abandon_task(&mut self, reason: impl Into<String>) {
        let task = self.task.take();
        if let Some(packet) = task.as_ref().and_then(|t| t.packet()) {
            self.registry.release(&packet.coordinate);
        }
        self.path.clear();
        self.awaiting_confirmation = false;
        self.record(CourierEvent::TaskAbandoned {
            agent_id: self.id.clone(),
            task_id: task.map(|t| t.id),
            reason: reason.into(),
            tick: self.tick,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Switch behavior, keeping the task phase in step.
    pub fn transition(&mut self, next: BehaviorState) {
        self.state = next;
        if let Some(task) = self.task.as_mut() {
            task.phase = next.task_phase();
        }
    }
}

impl AggregateRoot for CourierAgent {
    type Event = CourierEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        self.stats.apply(event);
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}
