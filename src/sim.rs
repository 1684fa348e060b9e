//! Tick-driven simulation of a circuit
//!
//! ```
//! # use boolsim::circuit::{Circuit, Component, GateType, Point, SinkType, SourceType};
//! use boolsim::sim::Simulator;
//! let mut circuit = Circuit::new();
//! let a = circuit.add_component(Component::source(SourceType::Switch, Point::default()));
//! let g = circuit.add_component(Component::gate(GateType::Not, Point::default()));
//! let o = circuit.add_component(Component::sink(SinkType::Bulb, Point::default()));
//! circuit.connect(&a, &g, 0).unwrap();
//! circuit.connect(&g, &o, 0).unwrap();
//!
//! let mut sim = Simulator::new();
//! sim.tick(&mut circuit, 0.0);
//! assert!(circuit.component(&o).unwrap().output());
//! ```

mod oscillation;
mod simulator;

use crate::circuit::{Circuit, ComponentId, OutputValue};

pub use oscillation::{snapshot, OscillationDetected, OscillationDetector};
pub use simulator::{
    evaluation_order, EvaluationOrder, Simulator, SimulatorConfig, TickReport, Trace, TracedInput,
};

/// Evaluate a circuit once with the given switch values
///
/// Returns the value of each sink, sorted by id.
pub fn simulate_comb(circuit: &mut Circuit, switches: &[(ComponentId, bool)]) -> Vec<OutputValue> {
    for (id, value) in switches {
        circuit.set_switch(id, *value);
    }
    let mut sim = Simulator::new();
    sim.evaluate(circuit);
    circuit.sinks().iter().map(|s| s.value()).collect()
}

/// Run a circuit for a number of ticks spaced by `interval` milliseconds; return the tick reports
pub fn simulate(circuit: &mut Circuit, nb_ticks: usize, interval: f64) -> Vec<TickReport> {
    let mut sim = Simulator::new();
    (1..=nb_ticks)
        .map(|i| sim.tick(circuit, i as f64 * interval))
        .collect()
}
