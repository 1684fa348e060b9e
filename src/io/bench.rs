//! IO for .bench (ISCAS) files

use std::io::{BufRead, BufReader, Read, Write};

use fxhash::{FxHashMap, FxHashSet};

use crate::circuit::{
    Circuit, Component, ComponentId, GateType, Point, SinkType, SourceType,
};
use crate::error::BenchError;

/// A `name = OP(args)` statement
#[derive(Debug, Clone)]
struct Statement {
    line: usize,
    name: String,
    op: String,
    args: Vec<String>,
}

/// What drives a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    Input(usize),
    Statement(usize),
    Constant(bool),
}

#[derive(Debug, Default)]
struct Netlist {
    inputs: Vec<String>,
    outputs: Vec<(usize, String)>,
    statements: Vec<Statement>,
}

fn parse_netlist<R: Read>(r: R) -> Result<Netlist, BenchError> {
    let mut ret = Netlist::default();
    for (i, l) in BufReader::new(r).lines().enumerate() {
        let line = i + 1;
        let s = l?;
        let t = s.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if !t.contains('=') {
            let parts: Vec<_> = t
                .split(&['(', ')'])
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() != 2 {
                return Err(BenchError::Syntax {
                    line,
                    message: format!("Expected INPUT(name) or OUTPUT(name), got {}", t),
                });
            }
            match parts[0] {
                "INPUT" | "PINPUT" => ret.inputs.push(parts[1].to_string()),
                "OUTPUT" | "POUTPUT" => ret.outputs.push((line, parts[1].to_string())),
                _ => {
                    return Err(BenchError::Syntax {
                        line,
                        message: format!("Unknown keyword {}", parts[0]),
                    })
                }
            }
        } else {
            let mut parts: Vec<String> = t
                .split(&['=', '(', ',', ')'])
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 2 {
                return Err(BenchError::Syntax {
                    line,
                    message: format!("Incomplete statement {}", t),
                });
            }
            let args = parts.split_off(2);
            let op = parts.pop().unwrap_or_default();
            let name = parts.pop().unwrap_or_default();
            ret.statements.push(Statement {
                line,
                name,
                op,
                args,
            });
        }
    }
    Ok(ret)
}

/// Component type of a statement; None for buffers and constants, which only alias signals
fn statement_gate(s: &Statement) -> Result<Option<GateType>, BenchError> {
    let op = s.op.to_uppercase();
    let (gate, arity) = match op.as_str() {
        "BUF" | "BUFF" => (None, 1),
        "GND" | "VSS" | "VDD" => (None, 0),
        _ => match GateType::from_name(&op) {
            Some(g) => (Some(g), g.arity()),
            None => return Err(BenchError::UnsupportedGate(s.op.clone())),
        },
    };
    if s.args.len() != arity {
        if gate.is_some() && s.args.len() > arity {
            return Err(BenchError::UnsupportedGate(format!(
                "{} with {} inputs",
                op,
                s.args.len()
            )));
        }
        return Err(BenchError::Syntax {
            line: s.line,
            message: format!("{} expects {} inputs, got {}", op, arity, s.args.len()),
        });
    }
    Ok(gate)
}

struct Resolver<'a> {
    netlist: &'a Netlist,
    names: FxHashMap<&'a str, Driver>,
}

impl<'a> Resolver<'a> {
    fn new(netlist: &'a Netlist) -> Result<Resolver<'a>, BenchError> {
        let mut names = FxHashMap::default();
        for (i, name) in netlist.inputs.iter().enumerate() {
            if names.insert(name.as_str(), Driver::Input(i)).is_some() {
                return Err(BenchError::Redefined(name.clone()));
            }
        }
        for (i, s) in netlist.statements.iter().enumerate() {
            if names.insert(s.name.as_str(), Driver::Statement(i)).is_some() {
                return Err(BenchError::Redefined(s.name.clone()));
            }
        }
        // ABC-style naming for constant signals
        names.entry("gnd").or_insert(Driver::Constant(false));
        names.entry("vdd").or_insert(Driver::Constant(true));
        Ok(Resolver { netlist, names })
    }

    /// Follow buffers and constant statements to the signal that actually drives a name
    fn resolve(&self, name: &str) -> Result<Driver, BenchError> {
        let mut current = name;
        for _ in 0..=self.netlist.statements.len() {
            let driver = *self
                .names
                .get(current)
                .ok_or_else(|| BenchError::UndefinedSignal(current.to_string()))?;
            let Driver::Statement(i) = driver else {
                return Ok(driver);
            };
            let s = &self.netlist.statements[i];
            match s.op.to_uppercase().as_str() {
                "BUF" | "BUFF" => current = &s.args[0],
                "GND" | "VSS" => return Ok(Driver::Constant(false)),
                "VDD" => return Ok(Driver::Constant(true)),
                _ => return Ok(driver),
            }
        }
        Err(BenchError::UndefinedSignal(name.to_string()))
    }
}

fn input_id(name: &str) -> ComponentId {
    ComponentId::new(format!("input-{}", name))
}

fn gate_id(name: &str) -> ComponentId {
    ComponentId::new(format!("gate-{}", name))
}

fn constant(circuit: &mut Circuit, value: bool) -> ComponentId {
    let id = ComponentId::new(format!("const-{}", value as u8));
    if circuit.component(&id).is_none() {
        let kind = if value {
            SourceType::High
        } else {
            SourceType::Low
        };
        circuit.add_component(Component::source(kind, Point::new(50.0, 20.0)).with_id(id.clone()));
    }
    id
}

fn driver_component(
    circuit: &mut Circuit,
    netlist: &Netlist,
    driver: Driver,
) -> ComponentId {
    match driver {
        Driver::Input(i) => input_id(&netlist.inputs[i]),
        Driver::Statement(i) => gate_id(&netlist.statements[i].name),
        Driver::Constant(v) => constant(circuit, v),
    }
}

/// Read a circuit in .bench format, as used by the ISCAS benchmarks
///
/// Inputs become switches, gates become gate components and outputs become bulbs,
/// all labeled with their signal name. Buffers are folded into the signal they copy.
/// Only single-input and two-input gates are supported:
/// ```text
///     # This is a comment
///     INPUT(i0)
///     INPUT(i1)
///     x0 = AND(i0, i1)
///     x1 = NAND(x0, i1)
///     x2 = OR(x0, i0)
///     x3 = NOR(i0, x1)
///     x4 = XOR(x3, x2)
///     x5 = BUF(x4)
///     x6 = NOT(x5)
///     x7 = gnd
///     OUTPUT(x6)
/// ```
pub fn read_bench<R: Read>(r: R) -> Result<Circuit, BenchError> {
    let netlist = parse_netlist(r)?;
    let gates = netlist
        .statements
        .iter()
        .map(statement_gate)
        .collect::<Result<Vec<_>, _>>()?;
    let resolver = Resolver::new(&netlist)?;

    let mut circuit = Circuit::new();
    for (i, name) in netlist.inputs.iter().enumerate() {
        circuit.add_component(
            Component::source(SourceType::Switch, Point::new(50.0, 100.0 + 80.0 * i as f64))
                .with_id(input_id(name))
                .with_label(name.as_str()),
        );
    }
    for (i, (s, g)) in netlist.statements.iter().zip(&gates).enumerate() {
        if let Some(g) = g {
            let pos = Point::new(200.0 + 150.0 * (i / 10) as f64, 100.0 + 80.0 * (i % 10) as f64);
            circuit.add_component(
                Component::gate(*g, pos)
                    .with_id(gate_id(&s.name))
                    .with_label(s.name.as_str()),
            );
        }
    }
    for (s, g) in netlist.statements.iter().zip(&gates) {
        if g.is_none() {
            continue;
        }
        for (slot, arg) in s.args.iter().enumerate() {
            let driver = resolver.resolve(arg)?;
            let from = driver_component(&mut circuit, &netlist, driver);
            circuit.connect(&from, &gate_id(&s.name), slot)?;
        }
    }
    let x = 200.0 + 150.0 * (netlist.statements.len() / 10 + 1) as f64;
    for (i, (_, name)) in netlist.outputs.iter().enumerate() {
        let driver = resolver.resolve(name)?;
        let from = driver_component(&mut circuit, &netlist, driver);
        let o = circuit.add_component(
            Component::sink(SinkType::Bulb, Point::new(x, 100.0 + 80.0 * i as f64))
                .with_id(format!("output-{}", name))
                .with_label(name.as_str()),
        );
        circuit.connect(&from, &o, 0)?;
    }
    Ok(circuit)
}

/// Name of a component as a .bench signal: characters that would break a statement are replaced
fn signal_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || "=(),#".contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Write a circuit in .bench format, as used by the ISCAS benchmarks
///
/// Sources are written as inputs, except constant sources which become `gnd` and `vdd`.
/// Each sink slot becomes an output, named after the sink with the slot index for displays.
/// Unconnected slots read as `gnd`.
pub fn write_bench<W: Write>(w: &mut W, circuit: &Circuit) -> Result<(), BenchError> {
    let mut names: FxHashMap<&ComponentId, String> = FxHashMap::default();
    let mut used = FxHashSet::default();
    for c in circuit.components() {
        let name = match c.as_source().map(|s| s.kind()) {
            Some(SourceType::High) if c.label().is_none() => "vdd".to_string(),
            Some(SourceType::Low) if c.label().is_none() => "gnd".to_string(),
            Some(_) => signal_name(c.display_name()),
            None => signal_name(c.id().as_str()),
        };
        if c.is_gate() || c.label().is_some() || !["vdd", "gnd"].contains(&name.as_str()) {
            if !used.insert(name.clone()) {
                return Err(BenchError::Redefined(name));
            }
        }
        names.insert(c.id(), name);
    }
    let signal = |id: Option<&ComponentId>| -> String {
        id.and_then(|id| names.get(id))
            .cloned()
            .unwrap_or_else(|| "gnd".to_string())
    };

    writeln!(w, "# .bench (ISCAS) file")?;
    writeln!(w, "# Generated by boolsim")?;
    for c in circuit.sources() {
        match c.as_source().map(|s| s.kind()) {
            Some(SourceType::High | SourceType::Low) => (),
            _ => writeln!(w, "INPUT({})", names[c.id()])?,
        }
    }
    writeln!(w)?;

    let mut outputs = Vec::new();
    for c in circuit.sinks() {
        let base = signal_name(c.display_name());
        let inputs = circuit.inputs_of(c.id());
        for (slot, driver) in inputs.into_iter().enumerate() {
            let name = if c.arity() > 1 {
                format!("{}_{}", base, slot)
            } else {
                base.clone()
            };
            if !used.insert(name.clone()) {
                return Err(BenchError::Redefined(name));
            }
            outputs.push((name, signal(driver)));
        }
    }
    for (name, _) in &outputs {
        writeln!(w, "OUTPUT({})", name)?;
    }
    writeln!(w)?;

    for c in circuit.sources() {
        let value = match c.as_source().map(|s| s.kind()) {
            Some(SourceType::High) => "vdd",
            Some(SourceType::Low) => "gnd",
            _ => continue,
        };
        if c.label().is_some() {
            writeln!(w, "{} = {}", names[c.id()], value)?;
        }
    }
    for g in circuit.gates() {
        let Some(t) = g.gate_type() else {
            continue;
        };
        let rep = circuit
            .inputs_of(g.id())
            .into_iter()
            .map(signal)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(w, "{} = {}({})", names[g.id()], t, rep)?;
    }
    for (name, driver) in &outputs {
        writeln!(w, "{} = BUF({})", name, driver)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_bench, write_bench};
    use crate::circuit::{ComponentId, GateType};
    use crate::error::BenchError;
    use crate::expr::parse_to_circuit;
    use crate::table::TruthTable;

    #[test]
    fn test_basic_read() {
        let example = "# .bench (ISCAS) file
INPUT(i0)
INPUT(i1)

OUTPUT(x6)
OUTPUT(x7)

x0 = AND(i0, i1)
x1 = NAND(x0, i1)
x2 = OR(x0, i0)
x3 = NOR(i0, x1)
x4 = XOR(  x3, x2 )
x5 = BUF(x4)
x6   =  NOT(x5)
x7 = gnd
";
        let mut c = read_bench(example.as_bytes()).unwrap();
        c.check();
        // 2 switches, 6 gates, a constant and 2 bulbs
        assert_eq!(c.nb_components(), 11);
        assert_eq!(c.gates().len(), 6);
        assert_eq!(
            c.inputs_of(&ComponentId::new("gate-x6")),
            vec![Some(&ComponentId::new("gate-x4"))]
        );
        assert_eq!(
            c.inputs_of(&ComponentId::new("output-x7")),
            vec![Some(&ComponentId::new("const-0"))]
        );
        assert_eq!(
            c.component(&ComponentId::new("gate-x3")).unwrap().gate_type(),
            Some(GateType::Nor)
        );
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.outputs(), ["x6", "x7"]);
    }

    #[test]
    fn test_errors() {
        let undefined = "INPUT(a)\nOUTPUT(x)\nx = AND(a, b)\n";
        assert!(matches!(
            read_bench(undefined.as_bytes()),
            Err(BenchError::UndefinedSignal(s)) if s == "b"
        ));
        let unsupported = "INPUT(a)\nOUTPUT(x)\nx = DFF(a)\n";
        assert!(matches!(
            read_bench(unsupported.as_bytes()),
            Err(BenchError::UnsupportedGate(_))
        ));
        let wide = "INPUT(a)\nINPUT(b)\nINPUT(c)\nOUTPUT(x)\nx = AND(a, b, c)\n";
        assert!(matches!(
            read_bench(wide.as_bytes()),
            Err(BenchError::UnsupportedGate(_))
        ));
        let redefined = "INPUT(a)\nOUTPUT(a)\na = NOT(a)\n";
        assert!(matches!(
            read_bench(redefined.as_bytes()),
            Err(BenchError::Redefined(_))
        ));
        let syntax = "INPUT(a)\nFOO(a)\n";
        assert!(matches!(
            read_bench(syntax.as_bytes()),
            Err(BenchError::Syntax { line: 2, .. })
        ));
        let cycle = "INPUT(a)\nOUTPUT(y)\nx = AND(a, y)\ny = NOT(x)\n";
        assert!(matches!(
            read_bench(cycle.as_bytes()),
            Err(BenchError::Connection(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut c = parse_to_circuit("(A NAND B) XOR NOT (C OR 1)").unwrap();
        let mut buf = Vec::new();
        write_bench(&mut buf, &c).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("INPUT(A)"));
        assert!(text.contains("OUTPUT(Output)"));
        assert!(text.contains("NAND(A, B)"));
        assert!(text.contains("vdd)"));
        let mut d = read_bench(text.as_bytes()).unwrap();
        d.check();
        let a = TruthTable::from_circuit(&mut c).unwrap();
        let b = TruthTable::from_circuit(&mut d).unwrap();
        assert_eq!(a.output_column(0), b.output_column(0));
    }
}
