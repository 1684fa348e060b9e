//! Recovery of an expression from a circuit

use fxhash::FxHashSet;

use crate::circuit::{Circuit, ComponentId, ComponentKind, GateType, SourceType};
use crate::expr::ast::Expr;

fn node_expr<'a>(
    circuit: &'a Circuit,
    id: &'a ComponentId,
    on_path: &mut FxHashSet<&'a ComponentId>,
) -> Option<Expr> {
    let c = circuit.component(id)?;
    let g = match c.kind() {
        ComponentKind::Source(s) => {
            return Some(match (s.kind(), c.label()) {
                (SourceType::High, None) => Expr::Constant(true),
                (SourceType::Low, None) => Expr::Constant(false),
                _ => Expr::Variable(c.display_name().to_string()),
            })
        }
        ComponentKind::Sink(_) => return None,
        ComponentKind::Gate(g) => *g,
    };
    if !on_path.insert(id) {
        return None;
    }
    let mut operands = Vec::new();
    for up in circuit.inputs_of(id) {
        match up.and_then(|u| node_expr(circuit, u, on_path)) {
            Some(e) => operands.push(e),
            None => {
                on_path.remove(id);
                return None;
            }
        }
    }
    on_path.remove(id);

    let mut operands = operands.into_iter();
    let a = operands.next()?;
    Some(match g {
        GateType::Not => Expr::not(a),
        GateType::And => Expr::and(a, operands.next()?),
        GateType::Or => Expr::or(a, operands.next()?),
        GateType::Xor => Expr::xor(a, operands.next()?),
        GateType::Nand => Expr::not(Expr::and(a, operands.next()?)),
        GateType::Nor => Expr::not(Expr::or(a, operands.next()?)),
    })
}

/// Expression computed at a component; for a sink, the expression of its first input
///
/// Sources are read as variables named after their label or id; unlabeled constant sources
/// are read as constants. Nand and Nor gates are written with a negation.
/// Returns None if a slot on the way is not connected, or on a feedback loop.
pub fn circuit_to_expr(circuit: &Circuit, id: &ComponentId) -> Option<Expr> {
    let c = circuit.component(id)?;
    let mut on_path = FxHashSet::default();
    if c.is_sink() {
        let up = circuit.inputs_of(id).first().copied().flatten()?;
        node_expr(circuit, up, &mut on_path)
    } else {
        node_expr(circuit, id, &mut on_path)
    }
}

/// Expression of the first sink of the circuit
pub fn circuit_expression(circuit: &Circuit) -> Option<String> {
    let sink = circuit.sinks().first()?.id().clone();
    circuit_to_expr(circuit, &sink).map(|e| e.to_string())
}

/// Expression of each sink, by sink name
pub fn circuit_expressions(circuit: &Circuit) -> Vec<(String, Option<Expr>)> {
    circuit
        .sinks()
        .iter()
        .map(|s| (s.display_name().to_string(), circuit_to_expr(circuit, s.id())))
        .collect()
}
