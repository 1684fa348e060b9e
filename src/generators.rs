//! Circuit generators and templates

use crate::circuit::{Circuit, Component, ComponentId, GateType, Point, SinkType, SourceType};

fn switch(circuit: &mut Circuit, name: &str, row: usize) -> ComponentId {
    circuit.add_component(
        Component::source(SourceType::Switch, Point::new(50.0, 100.0 + 80.0 * row as f64))
            .with_id(format!("input-{}", name))
            .with_label(name),
    )
}

fn bulb(circuit: &mut Circuit, name: &str, column: usize, row: usize) -> ComponentId {
    circuit.add_component(
        Component::sink(
            SinkType::Bulb,
            Point::new(200.0 + 150.0 * column as f64, 100.0 + 80.0 * row as f64),
        )
        .with_id(format!("output-{}", name))
        .with_label(name),
    )
}

fn gate(
    circuit: &mut Circuit,
    gate: GateType,
    inputs: &[&ComponentId],
    column: usize,
    row: usize,
) -> ComponentId {
    let id = circuit.add_component(Component::gate(
        gate,
        Point::new(200.0 + 150.0 * column as f64, 100.0 + 80.0 * row as f64),
    ));
    for (slot, i) in inputs.iter().enumerate() {
        circuit
            .connect(i, &id, slot)
            .expect("Generated circuits are acyclic");
    }
    id
}

fn drive(circuit: &mut Circuit, from: &ComponentId, to: &ComponentId) {
    circuit
        .connect(from, to, 0)
        .expect("Generated circuits are acyclic");
}

/// Adder generators
pub mod adder {
    use super::{bulb, drive, gate, switch};
    use crate::circuit::{Circuit, GateType};

    /// Half adder with inputs A and B, and outputs Sum and Carry
    pub fn half_adder() -> Circuit {
        let mut ret = Circuit::new();
        let a = switch(&mut ret, "A", 0);
        let b = switch(&mut ret, "B", 1);
        let s = gate(&mut ret, GateType::Xor, &[&a, &b], 0, 0);
        let c = gate(&mut ret, GateType::And, &[&a, &b], 0, 1);
        let sum = bulb(&mut ret, "Sum", 1, 0);
        let carry = bulb(&mut ret, "Carry", 1, 1);
        drive(&mut ret, &s, &sum);
        drive(&mut ret, &c, &carry);
        ret
    }

    /// Full adder with inputs A, B and Cin, and outputs Sum and Cout
    pub fn full_adder() -> Circuit {
        let mut ret = Circuit::new();
        let a = switch(&mut ret, "A", 0);
        let b = switch(&mut ret, "B", 1);
        let cin = switch(&mut ret, "Cin", 2);
        let p = gate(&mut ret, GateType::Xor, &[&a, &b], 0, 0);
        let g = gate(&mut ret, GateType::And, &[&a, &b], 0, 1);
        let s = gate(&mut ret, GateType::Xor, &[&p, &cin], 1, 0);
        let t = gate(&mut ret, GateType::And, &[&p, &cin], 1, 1);
        let c = gate(&mut ret, GateType::Or, &[&g, &t], 2, 1);
        let sum = bulb(&mut ret, "Sum", 3, 0);
        let cout = bulb(&mut ret, "Cout", 3, 1);
        drive(&mut ret, &s, &sum);
        drive(&mut ret, &c, &cout);
        ret
    }

    /// A simple and slow ripple-carry adder, with inputs Ai, Bi and outputs Si, Cout
    pub fn ripple_carry(len: usize) -> Circuit {
        assert!(len > 0);
        let mut ret = Circuit::new();
        let mut carry = None;
        for i in 0..len {
            let a = switch(&mut ret, &format!("A{}", i), 2 * i);
            let b = switch(&mut ret, &format!("B{}", i), 2 * i + 1);
            let p = gate(&mut ret, GateType::Xor, &[&a, &b], 3 * i, 2 * i);
            let g = gate(&mut ret, GateType::And, &[&a, &b], 3 * i, 2 * i + 1);
            let (s, c) = match carry {
                None => (p, g),
                Some(c) => {
                    let s = gate(&mut ret, GateType::Xor, &[&p, &c], 3 * i + 1, 2 * i);
                    let t = gate(&mut ret, GateType::And, &[&p, &c], 3 * i + 1, 2 * i + 1);
                    let c = gate(&mut ret, GateType::Or, &[&g, &t], 3 * i + 2, 2 * i + 1);
                    (s, c)
                }
            };
            let o = bulb(&mut ret, &format!("S{}", i), 3 * len, 2 * i);
            drive(&mut ret, &s, &o);
            carry = Some(c);
        }
        if let Some(c) = carry {
            let o = bulb(&mut ret, "Cout", 3 * len, 2 * len);
            drive(&mut ret, &c, &o);
        }
        ret
    }
}

/// Simple generators to test functionality
pub mod testcases {
    use super::{bulb, drive, gate, switch};
    use crate::circuit::{Circuit, Component, GateType, Point, SinkType};

    /// A chain of inverters between a switch and a bulb
    pub fn not_chain(len: usize) -> Circuit {
        let mut ret = Circuit::new();
        let mut x = switch(&mut ret, "A", 0);
        for i in 0..len {
            x = gate(&mut ret, GateType::Not, &[&x], i, 0);
        }
        let o = bulb(&mut ret, "Output", len, 0);
        drive(&mut ret, &x, &o);
        ret
    }

    /// A loop of an odd number of inverters, observed by a probe
    ///
    /// The loop is closed with [`Circuit::force_connection`]; regular connections reject cycles.
    pub fn ring_oscillator(len: usize) -> Circuit {
        assert!(
            len >= 3 && len % 2 == 1,
            "A ring oscillator needs an odd number of inverters"
        );
        let mut ret = Circuit::new();
        let first = ret.add_component(Component::gate(GateType::Not, Point::new(200.0, 100.0)));
        let mut x = first.clone();
        for i in 1..len {
            x = gate(&mut ret, GateType::Not, &[&x], i, 0);
        }
        ret.force_connection(&x, &first, 0)
            .expect("The ring only connects existing gates");
        let probe = ret.add_component(
            Component::sink(SinkType::Probe, Point::new(200.0 + 150.0 * len as f64, 200.0))
                .with_id("output-probe")
                .with_label("Probe"),
        );
        drive(&mut ret, &x, &probe);
        ret
    }

    /// One gate of each type, fed by switches A and B and driving a bulb named after the gate
    pub fn gate_zoo() -> Circuit {
        let mut ret = Circuit::new();
        let a = switch(&mut ret, "A", 0);
        let b = switch(&mut ret, "B", 1);
        for (i, t) in GateType::ALL.into_iter().enumerate() {
            let inputs = if t.arity() == 1 { vec![&a] } else { vec![&a, &b] };
            let g = gate(&mut ret, t, &inputs, 0, i);
            let o = bulb(&mut ret, t.name(), 1, i);
            drive(&mut ret, &g, &o);
        }
        ret
    }
}

/// Random expressions, for property tests
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::expr::{BinaryOp, Expr};

    const OPS: [BinaryOp; 5] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Nand,
        BinaryOp::Nor,
    ];

    fn random_node(rng: &mut SmallRng, nb_vars: usize, depth: usize) -> Expr {
        if depth == 0 || rng.gen_ratio(1, 4) {
            if rng.gen_ratio(1, 16) {
                return Expr::Constant(rng.gen());
            }
            let v = rng.gen_range(0..nb_vars);
            return Expr::Variable(variable_name(v));
        }
        if rng.gen_ratio(1, 5) {
            return Expr::not(random_node(rng, nb_vars, depth - 1));
        }
        let op = OPS[rng.gen_range(0..OPS.len())];
        Expr::binary(
            op,
            random_node(rng, nb_vars, depth - 1),
            random_node(rng, nb_vars, depth - 1),
        )
    }

    /// Name of the i-th variable: A to Z, then X26, X27...
    pub fn variable_name(i: usize) -> String {
        if i < 26 {
            ((b'A' + i as u8) as char).to_string()
        } else {
            format!("X{}", i)
        }
    }

    /// A random expression over at most `nb_vars` variables, with at most `depth` operator levels
    pub fn random_expr(nb_vars: usize, depth: usize, seed: u64) -> Expr {
        assert!(nb_vars > 0);
        let mut rng = SmallRng::seed_from_u64(seed);
        random_node(&mut rng, nb_vars, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::adder::{full_adder, half_adder, ripple_carry};
    use super::random::{random_expr, variable_name};
    use super::testcases::{gate_zoo, not_chain, ring_oscillator};
    use crate::table::TruthTable;

    #[test]
    fn test_adders() {
        let mut c = half_adder();
        c.check();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.outputs(), ["Carry", "Sum"]);
        assert_eq!(t.output_column(0), vec![false, false, false, true]);
        assert_eq!(t.output_column(1), vec![false, true, true, false]);

        let mut c = full_adder();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.inputs(), ["A", "B", "Cin"]);
        for row in t.rows() {
            let total = row.inputs.iter().filter(|b| **b).count();
            // Outputs are Cout, Sum
            assert_eq!(row.outputs, vec![total >= 2, total % 2 == 1]);
        }
    }

    #[test]
    fn test_ripple_carry() {
        let mut c = ripple_carry(2);
        c.check();
        assert!(!c.has_cycle());
        let t = TruthTable::from_circuit(&mut c).unwrap();
        // Inputs are A0, A1, B0, B1; outputs are Cout, S0, S1
        assert_eq!(t.inputs(), ["A0", "A1", "B0", "B1"]);
        assert_eq!(t.outputs(), ["Cout", "S0", "S1"]);
        for row in t.rows() {
            let a = row.inputs[0] as usize + 2 * row.inputs[1] as usize;
            let b = row.inputs[2] as usize + 2 * row.inputs[3] as usize;
            let s = row.outputs[1] as usize
                + 2 * row.outputs[2] as usize
                + 4 * row.outputs[0] as usize;
            assert_eq!(s, a + b);
        }
    }

    #[test]
    fn test_testcases() {
        let mut c = not_chain(3);
        c.check();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.output_column(0), vec![true, false]);

        let c = ring_oscillator(3);
        c.check();
        assert!(c.has_cycle());
        assert_eq!(c.gates().len(), 3);

        let mut c = gate_zoo();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.outputs(), ["AND", "NAND", "NOR", "NOT", "OR", "XOR"]);
        assert_eq!(t.output_column(1), vec![true, true, true, false]);
        assert_eq!(t.output_column(3), vec![true, true, false, false]);
    }

    #[test]
    fn test_random() {
        assert_eq!(variable_name(0), "A");
        assert_eq!(variable_name(27), "X27");
        for seed in 0..20 {
            let e = random_expr(3, 4, seed);
            assert_eq!(e, random_expr(3, 4, seed));
            assert!(e.depth() <= 4);
            assert!(e.variables().len() <= 3);
        }
    }
}
