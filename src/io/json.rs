//! Circuit documents in JSON
//!
//! A document lists the components with their kind, position and state, then the connections:
//! ```text
//! {
//!   "components": [
//!     { "id": "input-A", "type": "input", "subtype": "switch", "x": 50, "y": 100,
//!       "inputs": 0, "output": false, "label": "A", "value": false },
//!     { "id": "gate-1", "type": "gate", "subtype": "NOT", "x": 200, "y": 100,
//!       "inputs": 1, "output": true }
//!   ],
//!   "connections": [
//!     { "id": "connection-3", "fromComponentId": "input-A", "fromPortType": "output",
//!       "fromPortIndex": 0, "toComponentId": "gate-1", "toPortType": "input", "toPortIndex": 0 }
//!   ]
//! }
//! ```

use std::io::{Read, Write};

use fxhash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::circuit::{
    Circuit, Component, ComponentId, ComponentKind, ConnectionId, OutputValue, Point, Port,
    PortType, SinkType,
};
use crate::error::{ConnectionError, DocumentError};

/// Options controlling how a document is turned into a circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail when the connections form a cycle, instead of skipping the edges that close it
    pub strict: bool,
}

/// Connections that could not be restored while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Document id of each skipped connection, and the reason
    pub skipped: Vec<(ConnectionId, ConnectionError)>,
}

impl LoadReport {
    /// Returns whether every connection was restored
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A component as stored in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Identifier
    pub id: ComponentId,
    /// Category: gate, input or output
    #[serde(rename = "type")]
    pub category: String,
    /// Subtype within the category
    pub subtype: String,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Number of input slots; informative, connections are restored from the connection list
    #[serde(default, deserialize_with = "deserialize_arity")]
    pub inputs: usize,
    /// Value at the time of saving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputValue>,
    /// Label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Stored value of a source, or the number shown by a display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<OutputValue>,
    /// Frequency of a clock, in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Whether a clock is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Older documents list the connection on each slot instead of the arity
#[derive(Deserialize)]
#[serde(untagged)]
enum InputsField {
    Arity(usize),
    Slots(Vec<Option<ConnectionId>>),
}

fn deserialize_arity<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    Ok(match InputsField::deserialize(d)? {
        InputsField::Arity(n) => n,
        InputsField::Slots(slots) => slots.len(),
    })
}

/// A connection as stored in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    /// Identifier
    pub id: ConnectionId,
    /// Driving component
    pub from_component_id: ComponentId,
    /// Port type on the driving side, normally output
    pub from_port_type: PortType,
    /// Port index on the driving side
    #[serde(default)]
    pub from_port_index: usize,
    /// Receiving component
    pub to_component_id: ComponentId,
    /// Port type on the receiving side, normally input
    pub to_port_type: PortType,
    /// Input slot on the receiving side
    pub to_port_index: usize,
}

/// Serializable form of a circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitDocument {
    /// Components, sorted by id
    pub components: Vec<ComponentRecord>,
    /// Connections, sorted by id
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

impl ComponentRecord {
    fn from_component(c: &Component) -> ComponentRecord {
        let source = c.as_source();
        let clock = source.and_then(|s| s.clock());
        ComponentRecord {
            id: c.id().clone(),
            category: c.kind().category().to_string(),
            subtype: c.kind().subtype().to_string(),
            x: c.position().x,
            y: c.position().y,
            inputs: c.arity(),
            output: Some(c.value()),
            label: c.label().map(|l| l.to_string()),
            value: match (source, c.as_sink()) {
                (Some(s), _) => Some(OutputValue::Bool(s.value())),
                (_, Some(s)) if s.kind() == SinkType::Display => Some(s.value()),
                _ => None,
            },
            frequency: clock.map(|c| c.frequency()),
            enabled: clock.map(|c| c.enabled),
        }
    }

    fn to_component(&self) -> Result<Component, DocumentError> {
        let mut kind = ComponentKind::from_names(&self.category, &self.subtype).ok_or_else(|| {
            DocumentError::UnknownComponent {
                category: self.category.clone(),
                subtype: self.subtype.clone(),
            }
        })?;
        if let ComponentKind::Source(s) = &mut kind {
            if let Some(v) = self.value {
                s.set_value(v.as_bool());
            }
            if let Some(clock) = s.clock_mut() {
                if let Some(f) = self.frequency {
                    clock.set_frequency(f);
                }
                if let Some(e) = self.enabled {
                    clock.enabled = e;
                }
            }
        }
        let mut c = Component::new(kind, Point::new(self.x, self.y)).with_id(self.id.clone());
        c.set_label(self.label.clone());
        Ok(c)
    }
}

impl CircuitDocument {
    /// Build the document describing a circuit
    pub fn from_circuit(circuit: &Circuit) -> CircuitDocument {
        CircuitDocument {
            components: circuit
                .components()
                .into_iter()
                .map(ComponentRecord::from_component)
                .collect(),
            connections: circuit
                .connections()
                .into_iter()
                .map(|c| ConnectionRecord {
                    id: c.id().clone(),
                    from_component_id: c.from().clone(),
                    from_port_type: PortType::Output,
                    from_port_index: 0,
                    to_component_id: c.to().clone(),
                    to_port_type: PortType::Input,
                    to_port_index: c.slot(),
                })
                .collect(),
        }
    }

    fn components(&self) -> Result<Circuit, DocumentError> {
        let mut circuit = Circuit::new();
        let mut seen = FxHashSet::default();
        for rec in &self.components {
            if rec.id.is_assigned() && !seen.insert(&rec.id) {
                return Err(DocumentError::DuplicateId(rec.id.clone()));
            }
            circuit.add_component(rec.to_component()?);
        }
        Ok(circuit)
    }

    /// Rebuild the circuit
    ///
    /// Connections are replayed in document order. Those that are rejected, for example because
    /// they would close a cycle, are skipped and listed in the report. In strict mode, a document
    /// whose connections form a cycle is rejected as a whole.
    pub fn to_circuit(
        &self,
        options: &LoadOptions,
    ) -> Result<(Circuit, LoadReport), DocumentError> {
        let mut circuit = self.components()?;
        if options.strict {
            let mut forced = circuit.clone();
            for rec in &self.connections {
                // Invalid edges are reported during the replay below
                if rec.from_port_type != PortType::Output || rec.to_port_type != PortType::Input {
                    continue;
                }
                let _ = forced.force_connection(
                    &rec.from_component_id,
                    &rec.to_component_id,
                    rec.to_port_index,
                );
            }
            if let Some(id) = forced.find_cycle() {
                return Err(DocumentError::Cycle(id));
            }
        }
        let mut report = LoadReport::default();
        for rec in &self.connections {
            let res = circuit.add_connection(
                &rec.from_component_id,
                Port {
                    kind: rec.from_port_type,
                    index: rec.from_port_index,
                },
                &rec.to_component_id,
                Port {
                    kind: rec.to_port_type,
                    index: rec.to_port_index,
                },
            );
            if let Err(e) = res {
                warn!("Skipping connection {}: {}", rec.id, e);
                report.skipped.push((rec.id.clone(), e));
            }
        }
        Ok((circuit, report))
    }
}

/// Read a circuit document
pub fn read_json<R: Read>(
    r: R,
    options: &LoadOptions,
) -> Result<(Circuit, LoadReport), DocumentError> {
    let doc: CircuitDocument = serde_json::from_reader(r)?;
    doc.to_circuit(options)
}

/// Write a circuit document
pub fn write_json<W: Write>(w: &mut W, circuit: &Circuit) -> Result<(), DocumentError> {
    serde_json::to_writer_pretty(&mut *w, &CircuitDocument::from_circuit(circuit))?;
    writeln!(w)?;
    Ok(())
}

/// Circuit document as a string
pub fn to_json_string(circuit: &Circuit) -> String {
    serde_json::to_string_pretty(&CircuitDocument::from_circuit(circuit))
        .expect("Circuit documents are always serializable")
}
