//! Representation and handling of logic circuits

#[allow(clippy::module_inception)]
mod circuit;
pub mod component;
pub mod connection;
pub mod geometry;

pub use circuit::{Circuit, CONNECTION_HIT_THRESHOLD, PORT_HIT_THRESHOLD};
pub use component::{
    Clock, Component, ComponentId, ComponentKind, GateType, OutputValue, Sink, SinkType, Source,
    SourceType,
};
pub use connection::{Connection, ConnectionId, Port, PortType};
pub use geometry::{Point, Rect};
