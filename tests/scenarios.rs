use boolsim::analysis::analyze;
use boolsim::circuit::{Circuit, Component, ComponentId, GateType, Point, SinkType, SourceType};
use boolsim::equiv::{circuits_equivalent, compare_truth_tables, compare_with_expression};
use boolsim::error::ConnectionError;
use boolsim::expr::{circuit_expression, parse, parse_to_circuit, simplify_expression, truth_table};
use boolsim::generators::adder::full_adder;
use boolsim::generators::random::random_expr;
use boolsim::generators::testcases::ring_oscillator;
use boolsim::io::{read_json, to_json_string, LoadOptions};
use boolsim::sim::{simulate, Simulator};
use boolsim::table::TruthTable;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_gate_truth_tables() {
    use GateType::*;
    let rows = [(false, false), (false, true), (true, false), (true, true)];
    let expected = [
        (And, [false, false, false, true]),
        (Or, [false, true, true, true]),
        (Xor, [false, true, true, false]),
        (Nand, [true, true, true, false]),
        (Nor, [true, false, false, false]),
    ];
    for (g, outputs) in expected {
        for ((a, b), o) in rows.iter().zip(outputs) {
            assert_eq!(g.eval(&[*a, *b]), o, "{}({}, {})", g, a, b);
        }
    }
    assert!(Not.eval(&[false]));
    assert!(!Not.eval(&[true]));
}

#[test]
fn test_cycle_rejection() {
    let mut c = Circuit::new();
    let g1 = c.add_component(Component::gate(GateType::And, Point::default()));
    let g2 = c.add_component(Component::gate(GateType::Or, Point::default()));
    c.connect(&g1, &g2, 0).unwrap();
    let nb_components = c.nb_components();
    let nb_connections = c.nb_connections();
    assert!(matches!(
        c.connect(&g2, &g1, 0),
        Err(ConnectionError::WouldCreateCycle { .. })
    ));
    assert_eq!(c.nb_components(), nb_components);
    assert_eq!(c.nb_connections(), nb_connections);
    assert_eq!(c.inputs_of(&g1), vec![None, None]);
    c.check();
}

#[test]
fn test_print_parse_round_trip() {
    for seed in 0..200 {
        let e = random_expr(4, 5, seed);
        if e.simplify() != e {
            continue;
        }
        assert_eq!(parse(&e.to_string()).unwrap(), e, "{}", e);
    }
}

#[test]
fn test_simplify_idempotent() {
    for seed in 0..200 {
        let text = random_expr(3, 5, seed).to_string();
        let once = simplify_expression(&text).unwrap();
        let twice = simplify_expression(&once).unwrap();
        assert_eq!(once, twice, "{}", text);
    }
}

#[test]
fn test_synthesis_matches_expression() {
    let mut nb_tested = 0;
    for seed in 0..200 {
        let e = random_expr(4, 4, seed);
        let text = e.to_string();
        if text.contains(['0', '1']) {
            // Constants become sources, which are enumerated as table inputs
            continue;
        }
        let vars = e.variables();
        let mut circuit = parse_to_circuit(&text).unwrap();
        let table = TruthTable::from_circuit(&mut circuit).unwrap();
        assert_eq!(table.inputs(), vars.as_slice());
        let expected = TruthTable::from_expr(&e, &vars);
        assert!(compare_truth_tables(&table, &expected), "{}", text);
        assert_eq!(table.output_column(0), truth_table(&text, &vars).unwrap());
        nb_tested += 1;
    }
    assert!(nb_tested > 30);
}

/// Value of a component computed recursively from the sources, without an evaluation order
fn recursive_value(circuit: &Circuit, id: &ComponentId) -> bool {
    let c = circuit.component(id).unwrap();
    if let Some(s) = c.as_source() {
        return s.value();
    }
    let inputs: Vec<bool> = circuit
        .inputs_of(id)
        .into_iter()
        .map(|up| up.is_some_and(|up| recursive_value(circuit, up)))
        .collect();
    match c.gate_type() {
        Some(g) => g.eval(&inputs),
        None => inputs[0],
    }
}

fn random_dag(seed: u64, nb_inputs: usize, nb_gates: usize) -> Circuit {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut c = Circuit::new();
    let mut nodes = Vec::new();
    for _ in 0..nb_inputs {
        nodes.push(c.add_component(Component::source(SourceType::Switch, Point::default())));
    }
    for _ in 0..nb_gates {
        let g = GateType::ALL[rng.gen_range(0..GateType::ALL.len())];
        let id = c.add_component(Component::gate(g, Point::default()));
        for slot in 0..g.arity() {
            let from = &nodes[rng.gen_range(0..nodes.len())];
            c.connect(from, &id, slot).unwrap();
        }
        nodes.push(id);
    }
    for _ in 0..3 {
        let o = c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        let from = &nodes[rng.gen_range(0..nodes.len())];
        c.connect(from, &o, 0).unwrap();
    }
    c
}

#[test]
fn test_evaluation_order() {
    let mut rng = SmallRng::seed_from_u64(1);
    for seed in 0..20 {
        let mut c = random_dag(seed, 4, 30);
        let order = Simulator::new().order(&c).clone();
        assert!(order.cycles.is_empty());
        assert_eq!(order.order.len(), c.nb_components());
        for (i, id) in order.order.iter().enumerate() {
            for up in c.inputs_of(id).into_iter().flatten() {
                let j = order.order.iter().position(|x| x == up).unwrap();
                assert!(j < i);
            }
        }

        let mut sim = Simulator::new();
        for _ in 0..4 {
            let switches: Vec<ComponentId> = c.sources().iter().map(|s| s.id().clone()).collect();
            for s in &switches {
                c.set_switch(s, rng.gen());
            }
            sim.evaluate(&mut c);
            for comp in c.components() {
                assert_eq!(comp.output(), recursive_value(&c, comp.id()), "{}", comp.id());
            }
        }
    }
}

#[test]
fn test_and_scenario() {
    let mut c = parse_to_circuit("A AND B").unwrap();
    let sources = c.sources();
    assert_eq!(sources.len(), 2);
    assert!(sources
        .iter()
        .all(|s| s.as_source().unwrap().kind() == SourceType::Switch));
    let labels: Vec<_> = sources.iter().map(|s| s.label().unwrap()).collect();
    assert_eq!(labels, vec!["A", "B"]);
    assert_eq!(c.gates().len(), 1);
    assert_eq!(c.gates()[0].gate_type(), Some(GateType::And));
    assert_eq!(c.sinks().len(), 1);
    assert_eq!(
        c.sinks()[0].as_sink().unwrap().kind(),
        SinkType::Bulb
    );

    let t = TruthTable::from_circuit(&mut c).unwrap();
    let rows: Vec<_> = t
        .rows()
        .iter()
        .map(|r| (r.inputs.clone(), r.outputs[0]))
        .collect();
    assert_eq!(
        rows,
        vec![
            (vec![false, false], false),
            (vec![false, true], false),
            (vec![true, false], false),
            (vec![true, true], true),
        ]
    );
}

#[test]
fn test_expression_round_trip_scenario() {
    let text = "(A OR B) AND NOT C";
    let circuit = parse_to_circuit(text).unwrap();
    let extracted = circuit_expression(&circuit).unwrap();
    let vars: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    let expected = truth_table(text, &vars).unwrap();
    let actual = truth_table(&extracted, &vars).unwrap();
    assert_eq!(expected.len(), 8);
    assert_eq!(expected, actual);
}

#[test]
fn test_nand_extraction() {
    let circuit = parse_to_circuit("A NAND B").unwrap();
    assert_eq!(circuit_expression(&circuit).unwrap(), "NOT (A AND B)");
}

#[test]
fn test_simplify_scenario() {
    assert_eq!(simplify_expression("NOT NOT A").unwrap(), "A");
    assert_eq!(simplify_expression("A XOR A").unwrap(), "0");
}

#[test]
fn test_grading() {
    let mut c = parse_to_circuit("A OR B").unwrap();
    let cmp = compare_with_expression(&mut c, "A XOR B").unwrap().unwrap();
    assert_eq!(cmp.matches, vec![0, 1, 2]);
    assert_eq!(cmp.mismatches.len(), 1);
    assert_eq!(cmp.mismatches[0].inputs, vec![true, true]);
    assert_eq!(cmp.accuracy(), 75.0);
}

#[test]
fn test_document_round_trip() {
    let mut c = full_adder();
    let text = to_json_string(&c);
    let (mut d, report) = read_json(text.as_bytes(), &LoadOptions { strict: true }).unwrap();
    assert!(report.is_complete());
    assert!(circuits_equivalent(&mut c, &mut d));
    let t = TruthTable::from_circuit(&mut d).unwrap();
    assert!(t.to_csv().starts_with("A,B,Cin,,Cout,Sum\n0,0,0,,0,0\n"));
}

#[test]
fn test_analysis() {
    let a = analyze(&full_adder());
    assert_eq!(a.nb_inputs, 3);
    assert_eq!(a.nb_outputs, 2);
    assert_eq!(a.nb_gates, 5);
    assert_eq!(a.depth, 4);
    assert_eq!(a.complexity, 3.0 + 3.0 + 2.0 + 2.0 + 2.0 + 2.0);
    assert!(a.warnings.is_empty());
}

#[test]
fn test_ring_oscillator() {
    let mut c = ring_oscillator(3);
    let reports = simulate(&mut c, 20, 50.0);
    assert!(reports.iter().any(|r| r.oscillation.is_some()));

    // A circuit without feedback settles
    let mut c = full_adder();
    let reports = simulate(&mut c, 20, 50.0);
    assert!(reports.iter().all(|r| r.oscillation.is_none()));
}
