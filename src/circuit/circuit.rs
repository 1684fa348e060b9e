use std::fmt;

use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;

use crate::circuit::component::{Component, ComponentId, Source, SourceType};
use crate::circuit::connection::{Connection, ConnectionId, Port, PortType};
use crate::circuit::geometry::Point;
use crate::error::ConnectionError;

/// Default distance under which a point selects a connection
pub const CONNECTION_HIT_THRESHOLD: f64 = 5.0;

/// Distance under which a point selects a port
pub const PORT_HIT_THRESHOLD: f64 = 10.0;

/// A logic circuit: components connected by directed wires
///
/// Components and connections are owned by the circuit and refer to each other by id.
/// The circuit maintains the following invariants:
///   * both endpoints of a connection exist;
///   * each input slot is driven by at most one connection;
///   * connections added through [`Circuit::add_connection`] never close a cycle.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    components: FxHashMap<ComponentId, Component>,
    connections: FxHashMap<ConnectionId, Connection>,
    next_id: usize,
    revision: u64,
}

impl Circuit {
    /// Create a new empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of components
    pub fn nb_components(&self) -> usize {
        self.components.len()
    }

    /// Return the number of connections
    pub fn nb_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns whether the circuit has no component
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Counter incremented on every change of topology
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get a component by id
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Get a mutable component by id
    pub fn component_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Get a connection by id
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// All components, sorted by id
    pub fn components(&self) -> Vec<&Component> {
        self.components
            .values()
            .sorted_by(|a, b| a.id().cmp(b.id()))
            .collect()
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.values_mut()
    }

    /// All connections, sorted by id
    pub fn connections(&self) -> Vec<&Connection> {
        self.connections
            .values()
            .sorted_by(|a, b| a.id().cmp(b.id()))
            .collect()
    }

    /// Input sources, sorted by id
    pub fn sources(&self) -> Vec<&Component> {
        self.components()
            .into_iter()
            .filter(|c| c.is_source())
            .collect()
    }

    /// Output sinks, sorted by id
    pub fn sinks(&self) -> Vec<&Component> {
        self.components().into_iter().filter(|c| c.is_sink()).collect()
    }

    /// Gates, sorted by id
    pub fn gates(&self) -> Vec<&Component> {
        self.components().into_iter().filter(|c| c.is_gate()).collect()
    }

    /// Component driving each input slot of a component
    pub fn inputs_of(&self, id: &ComponentId) -> Vec<Option<&ComponentId>> {
        match self.components.get(id) {
            None => Vec::new(),
            Some(c) => c
                .inputs()
                .iter()
                .map(|slot| {
                    slot.as_ref()
                        .and_then(|conn| self.connections.get(conn))
                        .map(|conn| conn.from())
                })
                .collect(),
        }
    }

    /// Current value on each input slot of a component; empty slots read as false
    pub fn input_values(&self, id: &ComponentId) -> Vec<bool> {
        self.inputs_of(id)
            .into_iter()
            .map(|up| {
                up.and_then(|u| self.components.get(u))
                    .map(|c| c.output())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Connections leaving a component, sorted by id
    pub fn fanout(&self, id: &ComponentId) -> Vec<&Connection> {
        self.connections()
            .into_iter()
            .filter(|c| c.from() == id)
            .collect()
    }

    fn fresh_component_id(&mut self, prefix: &str) -> ComponentId {
        loop {
            self.next_id += 1;
            let id = ComponentId::new(format!("{}-{}", prefix, self.next_id));
            if !self.components.contains_key(&id) {
                return id;
            }
        }
    }

    fn fresh_connection_id(&mut self) -> ConnectionId {
        loop {
            self.next_id += 1;
            let id = ConnectionId::new(format!("connection-{}", self.next_id));
            if !self.connections.contains_key(&id) {
                return id;
            }
        }
    }

    /// Add a component, assigning an id if it has none, and return its id
    ///
    /// A component with the id of an existing one replaces it, together with its connections.
    pub fn add_component(&mut self, mut component: Component) -> ComponentId {
        if !component.id().is_assigned() {
            let id = self.fresh_component_id(component.kind().category());
            component.set_id(id);
        } else if self.components.contains_key(component.id()) {
            let id = component.id().clone();
            self.remove_component(&id);
        }
        for slot in 0..component.arity() {
            component.set_input(slot, None);
        }
        let id = component.id().clone();
        self.components.insert(id.clone(), component);
        self.revision += 1;
        id
    }

    /// Remove a component and every connection attached to it
    pub fn remove_component(&mut self, id: &ComponentId) -> bool {
        if !self.components.contains_key(id) {
            return false;
        }
        let incident: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.from() == id || c.to() == id)
            .map(|c| c.id().clone())
            .collect();
        for c in incident {
            self.remove_connection(&c);
        }
        self.components.remove(id);
        self.revision += 1;
        true
    }

    /// Connect the output port of a component to an input port of another
    ///
    /// An existing connection on the same input slot is replaced.
    /// On error, the circuit is left unchanged.
    pub fn add_connection(
        &mut self,
        from: &ComponentId,
        from_port: Port,
        to: &ComponentId,
        to_port: Port,
    ) -> Result<ConnectionId, ConnectionError> {
        if from_port.kind != PortType::Output || to_port.kind != PortType::Input {
            return Err(ConnectionError::WrongPortTypes);
        }
        self.insert_connection(from, to, to_port.index, true)
    }

    /// Connect the output of a component to an input slot of another
    pub fn connect(
        &mut self,
        from: &ComponentId,
        to: &ComponentId,
        slot: usize,
    ) -> Result<ConnectionId, ConnectionError> {
        self.add_connection(from, Port::output(), to, Port::input(slot))
    }

    /// Connect without checking for cycles
    ///
    /// This is meant for feedback circuits imported from elsewhere; the evaluator tolerates them.
    pub fn force_connection(
        &mut self,
        from: &ComponentId,
        to: &ComponentId,
        slot: usize,
    ) -> Result<ConnectionId, ConnectionError> {
        self.insert_connection(from, to, slot, false)
    }

    fn insert_connection(
        &mut self,
        from: &ComponentId,
        to: &ComponentId,
        slot: usize,
        check_cycle: bool,
    ) -> Result<ConnectionId, ConnectionError> {
        let source = self
            .components
            .get(from)
            .ok_or_else(|| ConnectionError::UnknownComponent(from.clone()))?;
        let target = self
            .components
            .get(to)
            .ok_or_else(|| ConnectionError::UnknownComponent(to.clone()))?;
        if from == to {
            return Err(ConnectionError::SelfLoop(from.clone()));
        }
        if !source.has_output_port() {
            return Err(ConnectionError::WrongPortTypes);
        }
        if slot >= target.arity() {
            return Err(ConnectionError::SlotOutOfRange {
                component: to.clone(),
                slot,
                arity: target.arity(),
            });
        }
        if check_cycle && self.would_create_cycle(from, to) {
            return Err(ConnectionError::WouldCreateCycle {
                from: from.clone(),
                to: to.clone(),
            });
        }
        let old = target.inputs()[slot].clone();
        if let Some(old) = old {
            self.remove_connection(&old);
        }
        let id = self.fresh_connection_id();
        self.connections.insert(
            id.clone(),
            Connection::new(id.clone(), from.clone(), to.clone(), slot),
        );
        if let Some(target) = self.components.get_mut(to) {
            target.set_input(slot, Some(id.clone()));
        }
        self.revision += 1;
        Ok(id)
    }

    /// Remove a connection, freeing the input slot it drives
    pub fn remove_connection(&mut self, id: &ConnectionId) -> bool {
        let Some(conn) = self.connections.remove(id) else {
            return false;
        };
        if let Some(target) = self.components.get_mut(conn.to()) {
            let drives_slot = target
                .inputs()
                .get(conn.slot())
                .and_then(|s| s.as_ref())
                .is_some_and(|c| c == id);
            if drives_slot {
                target.set_input(conn.slot(), None);
            }
        }
        self.revision += 1;
        true
    }

    /// Remove all components and connections
    pub fn clear(&mut self) {
        self.components.clear();
        self.connections.clear();
        self.revision += 1;
    }

    fn successors(&self) -> FxHashMap<&ComponentId, Vec<&ComponentId>> {
        let mut ret: FxHashMap<&ComponentId, Vec<&ComponentId>> = FxHashMap::default();
        for c in self.connections.values() {
            ret.entry(c.from()).or_default().push(c.to());
        }
        ret
    }

    /// Returns whether a connection from `from` to `to` would close a cycle
    pub fn would_create_cycle(&self, from: &ComponentId, to: &ComponentId) -> bool {
        let successors = self.successors();
        let mut visited = FxHashSet::default();
        let mut stack = vec![to];
        while let Some(id) = stack.pop() {
            if id == from {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(next) = successors.get(id) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }

    /// Find a component that belongs to a cycle, if any
    pub fn find_cycle(&self) -> Option<ComponentId> {
        let successors = self.successors();
        let mut done = FxHashSet::default();
        let mut on_path = FxHashSet::default();
        for start in self.components.keys().sorted() {
            if done.contains(start) {
                continue;
            }
            // Depth-first search with the index of the next successor to visit
            let mut stack = vec![(start, 0)];
            on_path.insert(start);
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let next = successors.get(node).and_then(|s| s.get(top.1)).copied();
                top.1 += 1;
                match next {
                    Some(n) if on_path.contains(n) => return Some(n.clone()),
                    Some(n) if !done.contains(n) => {
                        on_path.insert(n);
                        stack.push((n, 0));
                    }
                    Some(_) => (),
                    None => {
                        on_path.remove(node);
                        done.insert(node);
                        stack.pop();
                    }
                }
            }
        }
        None
    }

    /// Returns whether the connections form a cycle
    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Component whose bounding box contains the point
    pub fn component_at(&self, p: Point) -> Option<&Component> {
        self.components()
            .into_iter()
            .find(|c| c.bounds().contains(p))
    }

    /// Connection passing within `threshold` of the point
    pub fn connection_at(&self, p: Point, threshold: f64) -> Option<&Connection> {
        self.connections().into_iter().find(|c| {
            let (Some(a), Some(b)) = (self.components.get(c.from()), self.components.get(c.to()))
            else {
                return false;
            };
            p.distance_to_segment(a.output_position(), b.input_position(c.slot())) <= threshold
        })
    }

    /// Port whose centre is close to the point
    pub fn port_at(&self, p: Point) -> Option<(ComponentId, Port)> {
        for c in self.components() {
            for slot in 0..c.arity() {
                if c.input_position(slot).distance(p) <= PORT_HIT_THRESHOLD {
                    return Some((c.id().clone(), Port::input(slot)));
                }
            }
            if c.has_output_port() && c.output_position().distance(p) <= PORT_HIT_THRESHOLD {
                return Some((c.id().clone(), Port::output()));
            }
        }
        None
    }

    fn source_mut(&mut self, id: &ComponentId, kind: SourceType) -> Option<&mut Source> {
        self.components
            .get_mut(id)?
            .as_source_mut()
            .filter(|s| s.kind() == kind)
    }

    /// Set the value of a switch
    pub fn set_switch(&mut self, id: &ComponentId, value: bool) -> bool {
        match self.source_mut(id, SourceType::Switch) {
            Some(s) => {
                s.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Press or release a button
    pub fn press_button(&mut self, id: &ComponentId, pressed: bool) -> bool {
        match self.source_mut(id, SourceType::Button) {
            Some(s) => {
                s.set_value(pressed);
                true
            }
            None => false,
        }
    }

    /// Flip a switch, or enable/disable a clock
    pub fn toggle(&mut self, id: &ComponentId) -> bool {
        let Some(source) = self.components.get_mut(id).and_then(|c| c.as_source_mut()) else {
            return false;
        };
        match source.kind() {
            SourceType::Switch => {
                let v = source.value();
                source.set_value(!v);
                true
            }
            SourceType::Clock => {
                if let Some(clock) = source.clock_mut() {
                    clock.enabled = !clock.enabled;
                }
                true
            }
            _ => false,
        }
    }

    /// Change the frequency of a clock, in Hz
    pub fn set_clock_frequency(&mut self, id: &ComponentId, hz: f64) -> bool {
        match self
            .source_mut(id, SourceType::Clock)
            .and_then(|s| s.clock_mut())
        {
            Some(clock) => {
                clock.set_frequency(hz);
                true
            }
            None => false,
        }
    }

    /// Change the label of a component
    pub fn set_label(&mut self, id: &ComponentId, label: Option<String>) -> bool {
        match self.components.get_mut(id) {
            Some(c) => {
                c.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Move a component on the drawing plane
    pub fn move_component(&mut self, id: &ComponentId, dx: f64, dy: f64) -> bool {
        match self.components.get_mut(id) {
            Some(c) => {
                c.set_position(c.position().shifted(dx, dy));
                true
            }
            None => false,
        }
    }

    /// Check consistency between components and connections
    pub fn check(&self) {
        for conn in self.connections.values() {
            assert!(
                self.components.contains_key(conn.from()),
                "Connection {} has no source",
                conn.id()
            );
            let target = self.components.get(conn.to());
            assert!(target.is_some(), "Connection {} has no target", conn.id());
            if let Some(target) = target {
                assert_eq!(
                    target.inputs().get(conn.slot()),
                    Some(&Some(conn.id().clone())),
                    "Connection {} is not attached to its slot",
                    conn.id()
                );
            }
        }
        for c in self.components.values() {
            for (slot, conn) in c.inputs().iter().enumerate() {
                if let Some(conn) = conn {
                    let conn = self.connections.get(conn);
                    assert!(conn.is_some(), "Dangling connection on {}", c.id());
                    if let Some(conn) = conn {
                        assert_eq!(conn.to(), c.id());
                        assert_eq!(conn.slot(), slot);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit with {} components, {} connections:",
            self.nb_components(),
            self.nb_connections()
        )?;
        for c in self.components() {
            write!(f, "\t{} = {}", c.id(), c.kind())?;
            if c.arity() > 0 {
                let inputs = self
                    .inputs_of(c.id())
                    .into_iter()
                    .map(|i| i.map(|i| i.as_str()).unwrap_or("_"))
                    .join(", ");
                write!(f, "({})", inputs)?;
            }
            if let Some(label) = c.label() {
                write!(f, " \"{}\"", label)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
