//! Synthesis of a circuit from an expression

use fxhash::FxHashMap;

use crate::circuit::{Circuit, Component, ComponentId, GateType, Point, SinkType, SourceType};
use crate::error::ExprError;
use crate::expr::ast::Expr;
use crate::expr::parser::parse;

/// Row of the root gate
const ROOT_ROW: f64 = 200.0;

/// Vertical offset of the operands of a binary gate
const ROW_SPACING: f64 = 40.0;

/// Horizontal distance between two levels of gates
const COLUMN_SPACING: f64 = 150.0;

struct Builder {
    circuit: Circuit,
    inputs: FxHashMap<String, ComponentId>,
    constants: [Option<ComponentId>; 2],
}

impl Builder {
    fn column(level: usize) -> f64 {
        200.0 + COLUMN_SPACING * (level - 1) as f64
    }

    fn position(&self, id: &ComponentId) -> Point {
        self.circuit
            .component(id)
            .map(|c| c.position())
            .unwrap_or_default()
    }

    fn add_gate(
        &mut self,
        gate: GateType,
        position: Point,
        operands: &[&ComponentId],
    ) -> ComponentId {
        let id = format!("gate-{}", self.circuit.nb_components());
        let id = self
            .circuit
            .add_component(Component::gate(gate, position).with_id(id));
        for (slot, op) in operands.iter().enumerate() {
            self.circuit
                .connect(op, &id, slot)
                .expect("Circuits built from expressions are acyclic");
        }
        id
    }

    fn constant(&mut self, value: bool, row: f64) -> ComponentId {
        if let Some(id) = &self.constants[value as usize] {
            return id.clone();
        }
        let kind = if value {
            SourceType::High
        } else {
            SourceType::Low
        };
        let id = self.circuit.add_component(
            Component::source(kind, Point::new(50.0, row))
                .with_id(format!("const-{}", value as u8)),
        );
        self.constants[value as usize] = Some(id.clone());
        id
    }

    /// Build the subtree; return the component computing it and its level
    fn build(&mut self, e: &Expr, row: f64) -> (ComponentId, usize) {
        match e {
            Expr::Variable(v) => {
                let id = self.inputs.get(v).cloned();
                (id.unwrap_or_else(|| self.constant(false, row)), 0)
            }
            Expr::Constant(c) => (self.constant(*c, row), 0),
            Expr::Not(a) => {
                let (a, level) = self.build(a, row);
                let y = self.position(&a).y;
                let pos = Point::new(Builder::column(level + 1), y);
                (self.add_gate(GateType::Not, pos, &[&a]), level + 1)
            }
            Expr::Binary(op, a, b) => {
                let (a, level_a) = self.build(a, row - ROW_SPACING);
                let (b, level_b) = self.build(b, row + ROW_SPACING);
                let level = level_a.max(level_b) + 1;
                let y = (self.position(&a).y + self.position(&b).y) / 2.0;
                let pos = Point::new(Builder::column(level), y);
                (self.add_gate(op.gate_type(), pos, &[&a, &b]), level)
            }
        }
    }
}

/// Build a circuit computing the expression
///
/// Each variable becomes a switch labeled with its name, each operator a gate,
/// and the result drives a bulb labeled `Output`.
pub fn expr_to_circuit(e: &Expr) -> Circuit {
    let mut circuit = Circuit::new();
    let mut inputs = FxHashMap::default();
    for (i, name) in e.variables().into_iter().enumerate() {
        let switch = Component::source(
            SourceType::Switch,
            Point::new(50.0 + 100.0 * i as f64, 100.0),
        )
        .with_id(format!("input-{}", name))
        .with_label(name.as_str());
        inputs.insert(name, circuit.add_component(switch));
    }
    let mut builder = Builder {
        circuit,
        inputs,
        constants: [None, None],
    };
    let (root, _) = builder.build(e, ROOT_ROW);
    let pos = builder.position(&root).shifted(COLUMN_SPACING, 0.0);
    let mut circuit = builder.circuit;
    let output = circuit.add_component(
        Component::sink(SinkType::Bulb, pos)
            .with_id("output-main")
            .with_label("Output"),
    );
    circuit
        .connect(&root, &output, 0)
        .expect("Circuits built from expressions are acyclic");
    circuit
}

/// Parse an expression and build the corresponding circuit
pub fn parse_to_circuit(text: &str) -> Result<Circuit, ExprError> {
    let e = parse(text)?;
    Ok(expr_to_circuit(&e))
}
