use fxhash::FxHashSet;
use tracing::{debug, info, warn};

use crate::circuit::{Circuit, ComponentId};
use crate::sim::oscillation::{snapshot, OscillationDetected, OscillationDetector};

/// Configuration of the simulator
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Number of ticks considered by the oscillation guard
    pub oscillation_window: usize,
    /// Number of repetitions of a state that triggers the oscillation guard
    pub oscillation_threshold: usize,
    /// Whether to run the oscillation guard
    pub detect_oscillations: bool,
    /// Time between two manual steps, in milliseconds
    pub step_interval: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            oscillation_window: 10,
            oscillation_threshold: 5,
            detect_oscillations: true,
            step_interval: 50.0,
        }
    }
}

/// Order in which components are evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Each component exactly once, drivers before the components they drive
    pub order: Vec<ComponentId>,
    /// Components reached again while their inputs were being ordered
    pub cycles: Vec<ComponentId>,
}

struct OrderVisitor<'a> {
    circuit: &'a Circuit,
    visited: FxHashSet<&'a ComponentId>,
    in_progress: FxHashSet<&'a ComponentId>,
    ret: EvaluationOrder,
}

impl<'a> OrderVisitor<'a> {
    fn visit(&mut self, id: &'a ComponentId) {
        if self.visited.contains(id) {
            return;
        }
        if self.in_progress.contains(id) {
            warn!(
                component = %id,
                "Feedback loop detected, using the value from the previous tick"
            );
            self.ret.cycles.push(id.clone());
            return;
        }
        self.in_progress.insert(id);
        let circuit = self.circuit;
        for up in circuit.inputs_of(id).into_iter().flatten() {
            self.visit(up);
        }
        self.in_progress.remove(id);
        self.visited.insert(id);
        self.ret.order.push(id.clone());
    }
}

/// Compute the evaluation order: depth-first from the sinks, then the remaining components
///
/// A component met again while its inputs are being visited closes a feedback loop.
/// That branch is not followed, so the loop reads the value computed at the previous tick.
pub fn evaluation_order(circuit: &Circuit) -> EvaluationOrder {
    let mut visitor = OrderVisitor {
        circuit,
        visited: FxHashSet::default(),
        in_progress: FxHashSet::default(),
        ret: EvaluationOrder::default(),
    };
    for sink in circuit.sinks() {
        visitor.visit(sink.id());
    }
    for c in circuit.components() {
        visitor.visit(c.id());
    }
    visitor.ret
}

/// Result of a tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Components whose value changed, in evaluation order
    pub changed: Vec<ComponentId>,
    /// Clocks that toggled during the tick
    pub toggled_clocks: Vec<ComponentId>,
    /// Oscillation guard report
    pub oscillation: Option<OscillationDetected>,
}

/// Value on an input slot, as reported by [`Simulator::trace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedInput {
    /// Input slot
    pub slot: usize,
    /// Driving component, if connected
    pub from: Option<ComponentId>,
    /// Value read on the slot
    pub value: bool,
}

/// Inputs and output of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Traced component
    pub id: ComponentId,
    /// Current output
    pub output: bool,
    /// Value on each input slot
    pub inputs: Vec<TracedInput>,
}

/// Tick-driven evaluator of a circuit
///
/// The evaluation order is cached, and recomputed whenever the topology of the circuit changes.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    order: EvaluationOrder,
    revision: Option<u64>,
    oscillations: OscillationDetector,
    last_time: f64,
    nb_evaluations: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::with_config(SimulatorConfig::default())
    }
}

impl Simulator {
    /// Create a simulator with the default configuration
    pub fn new() -> Simulator {
        Simulator::default()
    }

    /// Create a simulator with the given configuration
    pub fn with_config(config: SimulatorConfig) -> Simulator {
        let oscillations =
            OscillationDetector::new(config.oscillation_window, config.oscillation_threshold);
        Simulator {
            config,
            order: EvaluationOrder::default(),
            revision: None,
            oscillations,
            last_time: 0.0,
            nb_evaluations: 0,
        }
    }

    /// Configuration of the simulator
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Total number of component evaluations
    pub fn nb_evaluations(&self) -> u64 {
        self.nb_evaluations
    }

    /// Timestamp of the last tick, in milliseconds
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    fn refresh(&mut self, circuit: &Circuit) {
        if self.revision != Some(circuit.revision()) {
            self.order = evaluation_order(circuit);
            self.revision = Some(circuit.revision());
            self.oscillations.clear();
            debug!(
                nb_components = self.order.order.len(),
                nb_cycles = self.order.cycles.len(),
                "Rebuilt evaluation order"
            );
        }
    }

    /// Current evaluation order
    pub fn order(&mut self, circuit: &Circuit) -> &EvaluationOrder {
        self.refresh(circuit);
        &self.order
    }

    /// Evaluate every component once, without clocks; return the components that changed
    pub fn evaluate(&mut self, circuit: &mut Circuit) -> Vec<ComponentId> {
        self.refresh(circuit);
        let mut changed = Vec::new();
        for id in &self.order.order {
            let values = circuit.input_values(id);
            if let Some(c) = circuit.component_mut(id) {
                self.nb_evaluations += 1;
                if c.evaluate(&values) {
                    changed.push(id.clone());
                }
            }
        }
        changed
    }

    /// Advance the simulation to a timestamp in milliseconds
    ///
    /// Clocks toggle first, then every component is evaluated once.
    pub fn tick(&mut self, circuit: &mut Circuit, now: f64) -> TickReport {
        let mut report = TickReport::default();
        for c in circuit.components_mut() {
            let id = c.id().clone();
            let Some(source) = c.as_source_mut() else {
                continue;
            };
            if source.clock().is_some_and(|clock| clock.is_due(now)) {
                if let Some(clock) = source.clock_mut() {
                    clock.last_toggle = now;
                }
                source.set_value(!source.value());
                report.toggled_clocks.push(id);
            }
        }
        report.toggled_clocks.sort();
        self.last_time = now;

        report.changed = self.evaluate(circuit);
        if self.config.detect_oscillations {
            report.oscillation = self.oscillations.record(snapshot(circuit));
            if let Some(osc) = &report.oscillation {
                info!(count = osc.count, "Oscillation detected");
            }
        }
        report
    }

    /// Advance the simulation by one step interval
    pub fn step(&mut self, circuit: &mut Circuit) -> TickReport {
        let now = self.last_time + self.config.step_interval;
        self.tick(circuit, now)
    }

    /// Return the sources, sinks and gates to their initial state
    pub fn reset(&mut self, circuit: &mut Circuit) {
        let now = self.last_time;
        for c in circuit.components_mut() {
            c.reset(now);
        }
        self.oscillations.clear();
        self.revision = None;
    }

    /// Values seen on the inputs of a component
    pub fn trace(&self, circuit: &Circuit, id: &ComponentId) -> Option<Trace> {
        let component = circuit.component(id)?;
        let values = circuit.input_values(id);
        let inputs = circuit
            .inputs_of(id)
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(slot, (from, value))| TracedInput {
                slot,
                from: from.cloned(),
                value,
            })
            .collect();
        Some(Trace {
            id: id.clone(),
            output: component.output(),
            inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluation_order, Simulator, SimulatorConfig};
    use crate::circuit::{Circuit, Component, GateType, Point, SinkType, SourceType};

    #[test]
    fn test_order() {
        let mut c = Circuit::new();
        let a = c.add_component(Component::source(SourceType::Switch, Point::default()));
        let g1 = c.add_component(Component::gate(GateType::Not, Point::default()));
        let g2 = c.add_component(Component::gate(GateType::Not, Point::default()));
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        c.connect(&a, &g1, 0).unwrap();
        c.connect(&g1, &g2, 0).unwrap();
        c.connect(&g2, &o, 0).unwrap();
        let order = evaluation_order(&c);
        assert_eq!(order.order, vec![a, g1, g2, o]);
        assert!(order.cycles.is_empty());
    }

    #[test]
    fn test_unconnected_gates() {
        let mut c = Circuit::new();
        let g = c.add_component(Component::gate(GateType::Nand, Point::default()));
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        let mut sim = Simulator::new();
        let changed = sim.evaluate(&mut c);
        assert_eq!(changed, vec![g.clone()]);
        assert!(c.component(&g).unwrap().output());
        assert!(!c.component(&o).unwrap().output());
    }

    #[test]
    fn test_clock() {
        let mut c = Circuit::new();
        let clk = c.add_component(Component::source(SourceType::Clock, Point::default()));
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        c.connect(&clk, &o, 0).unwrap();
        let mut sim = Simulator::with_config(SimulatorConfig {
            detect_oscillations: false,
            ..SimulatorConfig::default()
        });
        assert!(sim.tick(&mut c, 100.0).toggled_clocks.is_empty());
        let report = sim.tick(&mut c, 500.0);
        assert_eq!(report.toggled_clocks, vec![clk.clone()]);
        assert_eq!(report.changed, vec![clk.clone(), o.clone()]);
        assert!(c.component(&o).unwrap().output());
        assert!(sim.tick(&mut c, 999.0).toggled_clocks.is_empty());
        sim.tick(&mut c, 1000.0);
        assert!(!c.component(&o).unwrap().output());

        c.toggle(&clk);
        assert!(sim.tick(&mut c, 5000.0).toggled_clocks.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut c = Circuit::new();
        let sw = c.add_component(Component::source(SourceType::Switch, Point::default()));
        let low = c.add_component(Component::source(SourceType::Low, Point::default()));
        let high = c.add_component(Component::source(SourceType::High, Point::default()));
        let g = c.add_component(Component::gate(GateType::Or, Point::default()));
        c.connect(&sw, &g, 0).unwrap();
        c.connect(&low, &g, 1).unwrap();
        let mut sim = Simulator::new();
        c.set_switch(&sw, true);
        sim.step(&mut c);
        assert!(c.component(&g).unwrap().output());
        sim.reset(&mut c);
        assert!(!c.component(&sw).unwrap().output());
        assert!(c.component(&high).unwrap().output());
        assert!(!c.component(&g).unwrap().output());
        sim.step(&mut c);
        assert!(!c.component(&g).unwrap().output());
    }

    #[test]
    fn test_order_rebuilt() {
        let mut c = Circuit::new();
        let sw = c.add_component(Component::source(SourceType::Switch, Point::default()));
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        let mut sim = Simulator::new();
        c.set_switch(&sw, true);
        sim.evaluate(&mut c);
        assert!(!c.component(&o).unwrap().output());
        c.connect(&sw, &o, 0).unwrap();
        sim.evaluate(&mut c);
        assert!(c.component(&o).unwrap().output());
    }

    #[test]
    fn test_trace() {
        let mut c = Circuit::new();
        let sw = c.add_component(Component::source(SourceType::Switch, Point::default()));
        let g = c.add_component(Component::gate(GateType::And, Point::default()));
        c.connect(&sw, &g, 1).unwrap();
        c.set_switch(&sw, true);
        let mut sim = Simulator::new();
        sim.evaluate(&mut c);
        let trace = sim.trace(&c, &g).unwrap();
        assert!(!trace.output);
        assert_eq!(trace.inputs.len(), 2);
        assert_eq!(trace.inputs[0].from, None);
        assert!(!trace.inputs[0].value);
        assert_eq!(trace.inputs[1].from, Some(sw));
        assert!(trace.inputs[1].value);
    }
}
