//! Structural analysis of a circuit
//!
//! ```
//! use boolsim::analysis::analyze;
//! use boolsim::expr::parse_to_circuit;
//! let circuit = parse_to_circuit("(A OR B) AND NOT C").unwrap();
//! let analysis = analyze(&circuit);
//!
//! assert_eq!(analysis.nb_gates, 3);
//! assert!(analysis.warnings.is_empty());
//!
//! // Show the analysis
//! println!("{}", analysis);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::circuit::{Circuit, ComponentId, GateType};
use crate::expr::circuit_expression;

/// Cost of a gate in the complexity score
pub fn gate_weight(gate: GateType) -> f64 {
    use GateType::*;
    match gate {
        Not => 1.0,
        And | Or => 2.0,
        Nand | Nor => 2.5,
        Xor => 3.0,
    }
}

/// Problem found in a circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "component", rename_all = "snake_case")]
pub enum Warning {
    /// A gate has an empty input slot
    UnconnectedInput(ComponentId),
    /// A sink has nothing connected to its first slot
    FloatingOutput(ComponentId),
    /// The connections form a cycle
    FeedbackLoop,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnconnectedInput(id) => write!(f, "Gate {} has unconnected inputs", id),
            Warning::FloatingOutput(id) => write!(f, "Output {} is not connected", id),
            Warning::FeedbackLoop => write!(f, "Circuit contains feedback loops"),
        }
    }
}

/// Local simplification opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    /// A Not gate driven by another Not gate
    DoubleNegation {
        /// The outer Not gate
        outer: ComponentId,
        /// The inner Not gate
        inner: ComponentId,
    },
    /// An And or Or gate with both inputs from the same component
    RedundantGate {
        /// The gate
        gate: ComponentId,
        /// Its function
        kind: GateType,
    },
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::DoubleNegation { outer, inner } => {
                write!(f, "Double negation can be removed ({} and {})", outer, inner)
            }
            Suggestion::RedundantGate { gate, kind } => write!(
                f,
                "{} gate with identical inputs can be simplified ({})",
                kind, gate
            ),
        }
    }
}

/// Summary of a circuit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Number of input sources
    pub nb_inputs: usize,
    /// Number of output sinks
    pub nb_outputs: usize,
    /// Number of gates
    pub nb_gates: usize,
    /// Number of connections
    pub nb_connections: usize,
    /// Number of gates of each type
    pub gate_usage: BTreeMap<GateType, usize>,
    /// Longest chain of components from a source
    pub depth: usize,
    /// Weighted gate count plus half the depth
    pub complexity: f64,
    /// Problems found
    pub warnings: Vec<Warning>,
    /// Expression of the first output
    pub expression: Option<String>,
    /// Simplification opportunities
    pub suggestions: Vec<Suggestion>,
}

/// Number of gates of each type
pub fn gate_usage(circuit: &Circuit) -> BTreeMap<GateType, usize> {
    let mut ret = BTreeMap::new();
    for g in circuit.gates() {
        if let Some(t) = g.gate_type() {
            *ret.entry(t).or_insert(0) += 1;
        }
    }
    ret
}

fn component_depth<'a>(
    circuit: &'a Circuit,
    id: &'a ComponentId,
    depths: &mut FxHashMap<&'a ComponentId, usize>,
    in_progress: &mut FxHashSet<&'a ComponentId>,
) -> usize {
    if let Some(d) = depths.get(id) {
        return *d;
    }
    let Some(c) = circuit.component(id) else {
        return 0;
    };
    if c.is_source() {
        depths.insert(id, 0);
        return 0;
    }
    if !in_progress.insert(id) {
        // Feedback loop
        return 0;
    }
    let max_input = circuit
        .inputs_of(id)
        .into_iter()
        .flatten()
        .map(|up| component_depth(circuit, up, depths, in_progress))
        .max()
        .unwrap_or(0);
    in_progress.remove(id);
    depths.insert(id, max_input + 1);
    max_input + 1
}

/// Length of the longest chain of components, sources being at depth 0
pub fn depth(circuit: &Circuit) -> usize {
    let mut depths = FxHashMap::default();
    let mut in_progress = FxHashSet::default();
    circuit
        .components()
        .into_iter()
        .map(|c| component_depth(circuit, c.id(), &mut depths, &mut in_progress))
        .max()
        .unwrap_or(0)
}

/// Complexity score: sum of the gate weights plus half the depth
pub fn complexity(circuit: &Circuit, depth: usize) -> f64 {
    circuit
        .gates()
        .iter()
        .filter_map(|g| g.gate_type())
        .map(gate_weight)
        .sum::<f64>()
        + 0.5 * depth as f64
}

/// Unconnected gate inputs, feedback loops and floating outputs
pub fn warnings(circuit: &Circuit) -> Vec<Warning> {
    let mut ret = Vec::new();
    for g in circuit.gates() {
        if g.inputs().iter().any(|i| i.is_none()) {
            ret.push(Warning::UnconnectedInput(g.id().clone()));
        }
    }
    if circuit.has_cycle() {
        ret.push(Warning::FeedbackLoop);
    }
    for s in circuit.sinks() {
        if s.inputs().first().map_or(true, |i| i.is_none()) {
            ret.push(Warning::FloatingOutput(s.id().clone()));
        }
    }
    ret
}

/// Find double negations and And/Or gates with identical inputs
pub fn suggest_optimizations(circuit: &Circuit) -> Vec<Suggestion> {
    let mut ret = Vec::new();
    for g in circuit.gates() {
        let inputs = circuit.inputs_of(g.id());
        match g.gate_type() {
            Some(GateType::Not) => {
                let Some(inner) = inputs[0] else {
                    continue;
                };
                if circuit.component(inner).and_then(|c| c.gate_type()) == Some(GateType::Not) {
                    ret.push(Suggestion::DoubleNegation {
                        outer: g.id().clone(),
                        inner: inner.clone(),
                    });
                }
            }
            Some(kind @ (GateType::And | GateType::Or)) => {
                if let (Some(a), Some(b)) = (inputs[0], inputs[1]) {
                    if a == b {
                        ret.push(Suggestion::RedundantGate {
                            gate: g.id().clone(),
                            kind,
                        });
                    }
                }
            }
            _ => (),
        }
    }
    ret
}

/// Analyze a circuit
pub fn analyze(circuit: &Circuit) -> Analysis {
    let depth = depth(circuit);
    Analysis {
        nb_inputs: circuit.sources().len(),
        nb_outputs: circuit.sinks().len(),
        nb_gates: circuit.gates().len(),
        nb_connections: circuit.nb_connections(),
        gate_usage: gate_usage(circuit),
        depth,
        complexity: complexity(circuit, depth),
        warnings: warnings(circuit),
        expression: circuit_expression(circuit),
        suggestions: suggest_optimizations(circuit),
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Gates: {}", self.nb_gates)?;
        for (g, nb) in &self.gate_usage {
            writeln!(f, "      {}: {}", g, nb)?;
        }
        writeln!(f, "  Connections: {}", self.nb_connections)?;
        writeln!(f, "  Depth: {}", self.depth)?;
        writeln!(f, "  Complexity: {}", self.complexity)?;
        if let Some(e) = &self.expression {
            writeln!(f, "  Expression: {}", e)?;
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  {}", w)?;
            }
        }
        if !self.suggestions.is_empty() {
            writeln!(f, "Suggestions:")?;
            for s in &self.suggestions {
                writeln!(f, "  {}", s)?;
            }
        }
        fmt::Result::Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{analyze, depth, suggest_optimizations, warnings, Suggestion, Warning};
    use crate::circuit::{Circuit, Component, GateType, Point, SinkType, SourceType};
    use crate::expr::parse_to_circuit;

    #[test]
    fn test_basic() {
        let c = parse_to_circuit("(A OR B) AND NOT C").unwrap();
        let a = analyze(&c);
        assert_eq!(a.nb_inputs, 3);
        assert_eq!(a.nb_outputs, 1);
        assert_eq!(a.nb_gates, 3);
        assert_eq!(a.nb_connections, 6);
        // Switch, OR, AND, bulb
        assert_eq!(a.depth, 3);
        assert_eq!(a.complexity, 2.0 + 2.0 + 1.0 + 1.5);
        assert_eq!(a.gate_usage.get(&GateType::Or), Some(&1));
        assert_eq!(a.gate_usage.get(&GateType::Xor), None);
        assert!(a.warnings.is_empty());
        assert_eq!(a.expression.as_deref(), Some("((A OR B) AND NOT C)"));
        let s = a.to_string();
        assert!(s.starts_with("Stats:\n  Inputs: 3\n"));
    }

    #[test]
    fn test_empty() {
        let c = Circuit::new();
        let a = analyze(&c);
        assert_eq!(a.depth, 0);
        assert_eq!(a.complexity, 0.0);
        assert_eq!(a.expression, None);
    }

    #[test]
    fn test_warnings() {
        let mut c = Circuit::new();
        let a = c.add_component(Component::source(SourceType::Switch, Point::default()));
        let g = c.add_component(Component::gate(GateType::Xor, Point::default()));
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()).with_label("L"));
        c.connect(&a, &g, 0).unwrap();
        let w = warnings(&c);
        assert_eq!(
            w,
            vec![Warning::UnconnectedInput(g.clone()), Warning::FloatingOutput(o.clone())]
        );
        assert_eq!(w[0].to_string(), format!("Gate {} has unconnected inputs", g));

        let n1 = c.add_component(Component::gate(GateType::Not, Point::default()));
        let n2 = c.add_component(Component::gate(GateType::Not, Point::default()));
        c.connect(&n1, &n2, 0).unwrap();
        c.force_connection(&n2, &n1, 0).unwrap();
        c.connect(&n2, &o, 0).unwrap();
        let w = warnings(&c);
        assert!(w.contains(&Warning::FeedbackLoop));
        assert!(!w.contains(&Warning::FloatingOutput(o)));
        // The loop does not prevent computing a depth
        assert!(depth(&c) >= 2);
    }

    #[test]
    fn test_suggestions() {
        let c = parse_to_circuit("NOT NOT (A AND A)").unwrap();
        let s = suggest_optimizations(&c);
        assert_eq!(s.len(), 2);
        assert!(s
            .iter()
            .any(|s| matches!(s, Suggestion::DoubleNegation { .. })));
        assert!(s.iter().any(|s| matches!(
            s,
            Suggestion::RedundantGate {
                kind: GateType::And,
                ..
            }
        )));
        assert!(suggest_optimizations(&parse_to_circuit("A AND B").unwrap()).is_empty());
    }

    #[test]
    fn test_json() {
        let c = parse_to_circuit("A XOR B").unwrap();
        let json = serde_json::to_value(analyze(&c)).unwrap();
        assert_eq!(json["nb_gates"], 1);
        assert_eq!(json["gate_usage"]["XOR"], 1);
        assert_eq!(json["expression"], "(A XOR B)");
    }
}
