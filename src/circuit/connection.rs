//! Wires between an output port and an input slot

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::component::ComponentId;

/// Unique identifier of a connection within a circuit
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create an identifier from a string
    pub fn new(id: impl Into<String>) -> ConnectionId {
        ConnectionId(id.into())
    }

    /// Get the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }
}

/// Direction of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Input slot of a gate or sink
    Input,
    /// Output of a gate or source
    Output,
}

/// Port of a component: its direction and index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port {
    /// Direction
    pub kind: PortType,
    /// Index among the ports of the same direction
    pub index: usize,
}

impl Port {
    /// The single output port
    pub fn output() -> Port {
        Port {
            kind: PortType::Output,
            index: 0,
        }
    }

    /// Input port at the given slot
    pub fn input(index: usize) -> Port {
        Port {
            kind: PortType::Input,
            index,
        }
    }
}

/// Directed edge from the output of a component to an input slot of another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    from: ComponentId,
    to: ComponentId,
    slot: usize,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, from: ComponentId, to: ComponentId, slot: usize) -> Self {
        Connection { id, from, to, slot }
    }

    /// Identifier of the connection
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Component driving the connection
    pub fn from(&self) -> &ComponentId {
        &self.from
    }

    /// Component receiving the connection
    pub fn to(&self) -> &ComponentId {
        &self.to
    }

    /// Input slot on the receiving component
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Port on the driving component
    pub fn from_port(&self) -> Port {
        Port::output()
    }

    /// Port on the receiving component
    pub fn to_port(&self) -> Port {
        Port::input(self.slot)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}[{}]", self.from, self.to, self.slot)
    }
}
