use super::aggregate::{BehaviorState, CourierAgent};
use super::events::CourierEvent;
use super::messages::CourierMessage;
use crate::config::{Config, EnergyConfig};
use crate::domains::energy::{BatteryManager, Decision};
use crate::domains::mapping::MapGraph;
use crate::domains::path_planning::{explore_step, random_step, Navigator, RoutePlanner};
use crate::domains::tasking::{Task, TaskSelector};
use crate::domains::world::{
    Action, ChargingStation, Color, Coordinate, Destination, NodeKind, Observation,
    ObservationWindow, Packet, Target,
};
use chrono::Utc;
use rand::Rng;

/// Upper bound on state changes inside one tick. Every chain that does not
/// end in an action is short, so hitting this means the agent skips a turn.
const MAX_TRANSITIONS_PER_TICK: usize = 8;

enum Transition {
    Act(Action),
    Goto(BehaviorState),
}

/// Result of one decision tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub action: Action,
    pub outgoing: Vec<CourierMessage>,
}

/// The courier's behavior: one dispatch function per [`BehaviorState`],
/// chained inside a tick until one of them produces an action.
#[derive(Debug, Clone)]
pub struct Behavior {
    selector: TaskSelector,
    batteries: BatteryManager,
    planner: RoutePlanner,
    energy: EnergyConfig,
    share_every: u64,
}

impl Behavior {
    pub fn new(config: &Config) -> Self {
        Self {
            selector: TaskSelector::new(config.energy.clone()),
            batteries: BatteryManager::new(config.energy.clone()),
            planner: RoutePlanner::new(config.planning.algorithm),
            energy: config.energy.clone(),
            share_every: config.planning.share_targets_every,
        }
    }

    /// Run one tick: fold in what was observed and heard, then decide.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        observation: &Observation,
        inbox: &[CourierMessage],
        rng: &mut R,
    ) -> TickOutcome {
        let mut outgoing = Vec::new();

        agent.tick += 1;
        agent.position = observation.position;
        if let Some(level) = observation.battery {
            agent.battery.sync(level);
        }
        agent.carrying = observation.carrying.clone();

        let own_id = agent.id.clone();
        for message in inbox.iter().filter(|m| m.sender() != own_id) {
            self.receive(agent, message);
        }
        self.perceive(agent, &observation.window);
        self.check_battery(agent, &observation.window, &mut outgoing);

        let action = self.dispatch(agent, &observation.window, rng, &mut outgoing);
        self.account(agent, &action);

        if agent.state == BehaviorState::Charging {
            if let Some(station) = agent.charger {
                outgoing.push(CourierMessage::StationHeartbeat {
                    agent: agent.id.clone(),
                    station,
                    battery: agent.battery.level(),
                });
            }
        }
        if self.share_every > 0 && agent.tick % self.share_every == 0 {
            outgoing.push(CourierMessage::TargetsShared {
                agent: agent.id.clone(),
                targets: agent.registry.all_targets(),
            });
        }

        TickOutcome { action, outgoing }
    }

    fn receive(&self, agent: &mut CourierAgent, message: &CourierMessage) {
        match message {
            CourierMessage::StationClaimed { station, battery, .. }
            | CourierMessage::StationHeartbeat { station, battery, .. } => {
                let known = ChargingStation::new(*station);
                map_station(agent, &known);
                agent.registry.add_station(known);
                if let Some(known) = agent.registry.station_mut(station) {
                    known.occupy(*battery);
                }
            }
            CourierMessage::StationReleased { station, .. } => {
                let ours = agent.state == BehaviorState::Charging && agent.charger == Some(*station);
                if !ours {
                    if let Some(known) = agent.registry.station_mut(station) {
                        known.release();
                    }
                }
            }
            CourierMessage::TargetsShared { targets, .. } => {
                for target in agent.registry.merge(targets.iter().cloned()) {
                    match &target {
                        Target::ChargingStation(station) => map_station(agent, station),
                        other => {
                            agent.graph.add_node(other.coordinate(), other.node_kind());
                        }
                    }
                }
            }
        }
    }

    /// Registry and graph update from the observation window.
    fn perceive(&self, agent: &mut CourierAgent, window: &ObservationWindow) {
        let position = agent.position;
        agent.builder.record_position(&mut agent.graph, position);

        let observed = agent.registry.observe(window);

        for target in window.targets() {
            let coordinate = target.coordinate();
            let pad = match &target {
                Target::ChargingStation(station) => Some(station.pad()),
                _ => None,
            };
            if is_attached(&agent.graph, coordinate, pad) {
                agent.graph.add_node(coordinate, target.node_kind());
            } else {
                agent
                    .builder
                    .connect_target(&mut agent.graph, position, coordinate, target.node_kind());
            }
            if let Some(pad) = pad {
                if window.is_walkable(&pad) && !is_attached(&agent.graph, pad, Some(coordinate)) {
                    agent.builder.connect_target(&mut agent.graph, position, pad, NodeKind::Free);
                }
                // The pad may lie outside the window; the station edge keeps
                // it routable either way.
                agent.graph.add_edge(pad, coordinate);
            }
        }

        for gone in &observed.vanished {
            agent.graph.mark_free(&gone.coordinate());
        }

        if !observed.discovered.is_empty() {
            agent.record(CourierEvent::TargetsDiscovered {
                agent_id: agent.id.clone(),
                count: observed.discovered.len(),
                tick: agent.tick,
                timestamp: Utc::now(),
            });
        }

        // Pads we can see tell us directly whether a station is busy.
        for station in agent.registry.stations_mut() {
            let pad = station.pad();
            if pad == position || window.cell(&pad).is_none() {
                continue;
            }
            if window.agent_at(&pad) {
                station.in_use = true;
            } else if station.in_use {
                station.release();
            }
        }
    }

    fn check_battery(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        outgoing: &mut Vec<CourierMessage>,
    ) {
        let charging = agent.state == BehaviorState::Charging;
        let decision = self.batteries.tick(
            agent.position,
            &agent.battery,
            agent.registry.stations(),
            agent.is_carrying(),
            charging,
        );

        match decision {
            Decision::MustCharge { station } if !agent.state.is_charging_detour() => {
                self.settle_confirmation(agent, window);
                agent.interrupted = Some(agent.state);
                agent.charger = Some(station);
                agent.path.clear();
                agent.transition(BehaviorState::ToCharger);
                agent.record(CourierEvent::ChargingRequested {
                    agent_id: agent.id.clone(),
                    station,
                    battery: agent.battery.level(),
                    tick: agent.tick,
                    timestamp: Utc::now(),
                });
            }
            Decision::MustCharge { station } if agent.state == BehaviorState::ToCharger => {
                if agent.charger != Some(station) {
                    agent.charger = Some(station);
                    agent.path.clear();
                }
            }
            Decision::MustLeaveChargingPad => self.leave_charger(agent, outgoing),
            _ => {}
        }
    }

    /// Resolve a pick/put emitted last tick before anything interrupts it,
    /// so its outcome is recorded against the task it belonged to.
    fn settle_confirmation(&self, agent: &mut CourierAgent, window: &ObservationWindow) {
        if !agent.awaiting_confirmation {
            return;
        }
        let transition = match agent.state {
            BehaviorState::PickingUp => self.picking_up(agent, window),
            BehaviorState::PuttingDown => self.putting_down(agent),
            _ => {
                agent.awaiting_confirmation = false;
                return;
            }
        };
        if let Transition::Goto(next) = transition {
            agent.transition(next);
        }
    }

    fn leave_charger(&self, agent: &mut CourierAgent, outgoing: &mut Vec<CourierMessage>) {
        if let Some(station) = agent.charger {
            if let Some(known) = agent.registry.station_mut(&station) {
                known.release();
            }
            outgoing.push(CourierMessage::StationReleased { agent: agent.id.clone(), station });
            agent.record(CourierEvent::ChargingFinished {
                agent_id: agent.id.clone(),
                station,
                battery: agent.battery.level(),
                tick: agent.tick,
                timestamp: Utc::now(),
            });
        }
        let resume = resume_state(agent);
        agent.path.clear();
        agent.transition(resume);
    }

    fn dispatch<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        rng: &mut R,
        outgoing: &mut Vec<CourierMessage>,
    ) -> Action {
        for _ in 0..MAX_TRANSITIONS_PER_TICK {
            let transition = match agent.state {
                BehaviorState::Explore => self.explore(agent, window, rng),
                BehaviorState::ToPacket => self.to_packet(agent, window, rng),
                BehaviorState::PickingUp => self.picking_up(agent, window),
                BehaviorState::ToDestination => self.to_destination(agent, window, rng),
                BehaviorState::PuttingDown => self.putting_down(agent),
                BehaviorState::ToCharger => self.to_charger(agent, window, rng, outgoing),
                BehaviorState::Charging => self.charging(agent),
            };
            match transition {
                Transition::Act(action) => return action,
                Transition::Goto(next) => agent.transition(next),
            }
        }
        Action::Skip
    }

    fn explore<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        rng: &mut R,
    ) -> Transition {
        let position = agent.position;

        if let Some(color) = agent.carrying.clone() {
            if let Some(destination) = self.selector.select_destination(&agent.registry, &color, position) {
                if retarget(agent, &color, destination) {
                    return Transition::Goto(BehaviorState::ToDestination);
                }
            }
            return wander(agent, window, rng);
        }

        let selected =
            self.selector
                .select_task(&mut agent.registry, position, &agent.battery, agent.task.as_ref());
        let Some(task) = selected else {
            agent.task = None;
            return wander(agent, window, rng);
        };

        let is_new = agent.task.as_ref().map(|t| t.id) != Some(task.id);
        if is_new {
            if let (Some(packet), Some(destination)) = (task.packet(), task.destination()) {
                agent.record(CourierEvent::TaskSelected {
                    agent_id: agent.id.clone(),
                    task_id: task.id,
                    packet: packet.coordinate,
                    destination: destination.coordinate,
                    color: packet.color.clone(),
                    tick: agent.tick,
                    timestamp: Utc::now(),
                });
            }
            agent.path.clear();
        }
        agent.task = Some(task);
        Transition::Goto(BehaviorState::ToPacket)
    }

    fn to_packet<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        rng: &mut R,
    ) -> Transition {
        if agent.is_carrying() {
            return Transition::Goto(BehaviorState::ToDestination);
        }
        let Some(packet) = agent.task.as_ref().and_then(|t| t.packet()).cloned() else {
            agent.task = None;
            return Transition::Goto(BehaviorState::Explore);
        };

        let coordinate = packet.coordinate;
        let stale = agent.registry.packet(&coordinate).is_none()
            || agent.registry.packet_already_handled(&coordinate, window);
        if stale {
            agent.registry.remove_packet(&coordinate);
            agent.graph.mark_free(&coordinate);
            agent.abandon_task(format!("packet at {coordinate} is gone"));
            return Transition::Goto(BehaviorState::Explore);
        }

        if agent.position.is_adjacent(&coordinate) && window.packet_at(&coordinate).is_some() {
            return Transition::Goto(BehaviorState::PickingUp);
        }
        self.travel(agent, window, coordinate, rng)
    }

    fn picking_up(&self, agent: &mut CourierAgent, window: &ObservationWindow) -> Transition {
        let Some(packet) = agent.task.as_ref().and_then(|t| t.packet()).cloned() else {
            agent.awaiting_confirmation = false;
            return Transition::Goto(BehaviorState::Explore);
        };

        if let Some(color) = agent.carrying.clone() {
            agent.awaiting_confirmation = false;
            agent.registry.remove_packet(&packet.coordinate);
            agent.graph.mark_free(&packet.coordinate);
            agent.record(CourierEvent::PacketPickedUp {
                agent_id: agent.id.clone(),
                packet: packet.coordinate,
                color,
                tick: agent.tick,
                timestamp: Utc::now(),
            });
            agent.path.clear();
            return Transition::Goto(BehaviorState::ToDestination);
        }

        if agent.awaiting_confirmation {
            agent.abandon_task(format!("pickup at {} was not confirmed", packet.coordinate));
            return Transition::Goto(BehaviorState::Explore);
        }

        if !agent.position.is_adjacent(&packet.coordinate) || window.packet_at(&packet.coordinate).is_none() {
            return Transition::Goto(BehaviorState::ToPacket);
        }
        agent.awaiting_confirmation = true;
        Transition::Act(Action::PickPacket(packet.coordinate))
    }

    fn to_destination<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        rng: &mut R,
    ) -> Transition {
        let position = agent.position;
        let Some(color) = agent.carrying.clone() else {
            agent.abandon_task("no packet in hand");
            return Transition::Goto(BehaviorState::Explore);
        };

        let current = agent.task.as_ref().and_then(|t| t.destination()).cloned();
        let destination = match current {
            Some(destination) if agent.registry.contains_destination(&destination) => destination,
            stale => {
                if let Some(gone) = stale {
                    agent.graph.mark_free(&gone.coordinate);
                    agent.path.clear();
                }
                let replacement = self.selector.select_destination(&agent.registry, &color, position);
                match replacement {
                    Some(destination) if retarget(agent, &color, destination.clone()) => destination,
                    _ => {
                        if let Some(task) = agent.task.as_mut() {
                            task.clear_destination();
                        }
                        return wander(agent, window, rng);
                    }
                }
            }
        };

        if position.is_adjacent(&destination.coordinate) {
            return Transition::Goto(BehaviorState::PuttingDown);
        }
        self.travel(agent, window, destination.coordinate, rng)
    }

    fn putting_down(&self, agent: &mut CourierAgent) -> Transition {
        if agent.awaiting_confirmation {
            agent.awaiting_confirmation = false;
            if agent.is_carrying() {
                return Transition::Goto(BehaviorState::ToDestination);
            }
            if let Some(destination) = agent.task.take().and_then(|t| t.destination().cloned()) {
                agent.record(CourierEvent::PacketDelivered {
                    agent_id: agent.id.clone(),
                    destination: destination.coordinate,
                    color: destination.color,
                    tick: agent.tick,
                    timestamp: Utc::now(),
                });
            }
            agent.path.clear();
            return Transition::Goto(BehaviorState::Explore);
        }

        if !agent.is_carrying() {
            agent.abandon_task("packet lost before delivery");
            return Transition::Goto(BehaviorState::Explore);
        }
        let Some(destination) = agent.task.as_ref().and_then(|t| t.destination()).cloned() else {
            return Transition::Goto(BehaviorState::ToDestination);
        };
        if !agent.position.is_adjacent(&destination.coordinate) {
            return Transition::Goto(BehaviorState::ToDestination);
        }
        agent.awaiting_confirmation = true;
        Transition::Act(Action::PutPacket(destination.coordinate))
    }

    fn to_charger<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        rng: &mut R,
        outgoing: &mut Vec<CourierMessage>,
    ) -> Transition {
        let station = agent.charger.and_then(|c| agent.registry.station(&c)).cloned();
        let Some(station) = station else {
            return Transition::Goto(resume_state(agent));
        };
        let pad = station.pad();

        if agent.position == pad {
            let battery = agent.battery.level();
            if let Some(known) = agent.registry.station_mut(&station.coordinate) {
                known.occupy(battery);
            }
            outgoing.push(CourierMessage::StationClaimed {
                agent: agent.id.clone(),
                station: station.coordinate,
                battery,
            });
            agent.record(CourierEvent::ChargingStarted {
                agent_id: agent.id.clone(),
                station: station.coordinate,
                battery,
                tick: agent.tick,
                timestamp: Utc::now(),
            });
            agent.path.clear();
            return Transition::Goto(BehaviorState::Charging);
        }

        if window.agent_at(&pad) {
            if let Some(known) = agent.registry.station_mut(&station.coordinate) {
                known.in_use = true;
            }
            let step = random_step(window, agent.position, rng);
            return Transition::Act(step.map(Action::Step).unwrap_or(Action::Skip));
        }
        self.travel(agent, window, pad, rng)
    }

    fn charging(&self, agent: &mut CourierAgent) -> Transition {
        let pad = agent
            .charger
            .and_then(|c| agent.registry.station(&c))
            .map(ChargingStation::pad);
        match pad {
            Some(pad) if pad == agent.position => Transition::Act(Action::Skip),
            Some(_) => Transition::Goto(BehaviorState::ToCharger),
            None => Transition::Goto(resume_state(agent)),
        }
    }

    fn travel<R: Rng + ?Sized>(
        &self,
        agent: &mut CourierAgent,
        window: &ObservationWindow,
        goal: Coordinate,
        rng: &mut R,
    ) -> Transition {
        let navigator = Navigator::new(&self.planner);
        let step = navigator.next_step(
            &mut agent.graph,
            &agent.builder,
            window,
            agent.position,
            goal,
            &mut agent.path,
            rng,
        );
        Transition::Act(step.map(Action::Step).unwrap_or(Action::Skip))
    }

    /// Local battery bookkeeping for the action just chosen. The host's
    /// reading, when present, overrides it next tick.
    fn account(&self, agent: &mut CourierAgent, action: &Action) {
        if let Action::Step(_) = action {
            agent.battery.drain(self.energy.cost_per_step(agent.is_carrying()));
        }
        if agent.state == BehaviorState::Charging {
            let on_pad = agent
                .charger
                .and_then(|c| agent.registry.station(&c))
                .is_some_and(|s| s.pad() == agent.position);
            if on_pad {
                agent.battery.charge(self.energy.recharge_rate);
            }
        }
    }
}

/// Station node plus its pad, linked so a route to the pad always exists once
/// the station itself is reachable.
fn map_station(agent: &mut CourierAgent, station: &ChargingStation) {
    agent.graph.add_node(station.coordinate, NodeKind::ChargingStation);
    agent.graph.add_edge(station.pad(), station.coordinate);
}

/// Whether `node` has an edge to anything besides `partner`.
fn is_attached(graph: &MapGraph, node: Coordinate, partner: Option<Coordinate>) -> bool {
    graph.neighbours(&node).iter().any(|(n, _)| Some(*n) != partner)
}

fn wander<R: Rng + ?Sized>(agent: &mut CourierAgent, window: &ObservationWindow, rng: &mut R) -> Transition {
    let step = explore_step(window, agent.position, &mut agent.heading, rng);
    Transition::Act(step.map(Action::Step).unwrap_or(Action::Skip))
}

/// Point the task at `destination`, rebuilding it around the carried packet
/// when the current one does not match.
fn retarget(agent: &mut CourierAgent, color: &Color, destination: Destination) -> bool {
    let mut task = match agent.task.take() {
        Some(task) if task.color() == Some(color) => task,
        _ => Task::carrying(Packet::new(agent.position, color.clone())),
    };
    let ok = task.set_destination(destination).is_ok();
    agent.task = Some(task);
    ok
}

/// Forget the charger and pick the state to go back to.
fn resume_state(agent: &mut CourierAgent) -> BehaviorState {
    agent.charger = None;
    agent
        .interrupted
        .take()
        .filter(|s| !s.is_charging_detour())
        .unwrap_or(BehaviorState::Explore)
}
