//! Components of a circuit: logic gates, input sources and output sinks

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::connection::ConnectionId;
use crate::circuit::geometry::{Point, Rect};

/// Number of values remembered by a probe
pub const PROBE_HISTORY_LEN: usize = 50;

/// Tone of a speaker, in Hz
pub const SPEAKER_TONE: f64 = 440.0;

/// Lowest allowed clock frequency, in Hz
pub const MIN_CLOCK_FREQUENCY: f64 = 0.1;

/// Highest allowed clock frequency, in Hz
pub const MAX_CLOCK_FREQUENCY: f64 = 10.0;

/// Unique identifier of a component within a circuit
///
/// Identifiers are strings, so that documents can carry arbitrary ids such as `input-A` or
/// `gate-3`.
/// The empty id means that the circuit will assign one on insertion.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create an identifier from a string
    pub fn new(id: impl Into<String>) -> ComponentId {
        ComponentId(id.into())
    }

    /// Get the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the identifier has been assigned
    pub fn is_assigned(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> ComponentId {
        ComponentId::new(s)
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> ComponentId {
        ComponentId(s)
    }
}

/// Logic function of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateType {
    /// 2-input And
    And,
    /// 2-input Or
    Or,
    /// Inverter
    Not,
    /// 2-input Xor
    Xor,
    /// 2-input Nand
    Nand,
    /// 2-input Nor
    Nor,
}

impl GateType {
    /// All gate types
    pub const ALL: [GateType; 6] = [
        GateType::And,
        GateType::Or,
        GateType::Not,
        GateType::Xor,
        GateType::Nand,
        GateType::Nor,
    ];

    /// Number of inputs of the gate
    pub fn arity(self) -> usize {
        match self {
            GateType::Not => 1,
            _ => 2,
        }
    }

    /// Compute the output of the gate; missing inputs read as false
    pub fn eval(self, inputs: &[bool]) -> bool {
        use GateType::*;
        let a = inputs.first().copied().unwrap_or(false);
        let b = inputs.get(1).copied().unwrap_or(false);
        match self {
            And => a && b,
            Or => a || b,
            Not => !a,
            Xor => a ^ b,
            Nand => !(a && b),
            Nor => !(a || b),
        }
    }

    /// Name of the gate, as used in documents and expressions
    pub fn name(self) -> &'static str {
        use GateType::*;
        match self {
            And => "AND",
            Or => "OR",
            Not => "NOT",
            Xor => "XOR",
            Nand => "NAND",
            Nor => "NOR",
        }
    }

    /// Parse a gate name, ignoring case
    pub fn from_name(name: &str) -> Option<GateType> {
        GateType::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceType {
    /// Latching switch
    Switch,
    /// Momentary push button
    Button,
    /// Periodic square wave
    Clock,
    /// Constant one
    High,
    /// Constant zero
    Low,
}

impl SourceType {
    /// All source types
    pub const ALL: [SourceType; 5] = [
        SourceType::Switch,
        SourceType::Button,
        SourceType::Clock,
        SourceType::High,
        SourceType::Low,
    ];

    /// Name of the source, as used in documents
    pub fn name(self) -> &'static str {
        use SourceType::*;
        match self {
            Switch => "switch",
            Button => "button",
            Clock => "clock",
            High => "high",
            Low => "low",
        }
    }

    /// Parse a source name, ignoring case
    pub fn from_name(name: &str) -> Option<SourceType> {
        SourceType::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Value of the source after creation or reset
    pub fn initial_value(self) -> bool {
        self == SourceType::High
    }
}

/// Kind of output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SinkType {
    /// Light bulb
    Bulb,
    /// 4-bit hexadecimal display
    Display,
    /// Logic probe, remembering its recent values
    Probe,
    /// Speaker
    Speaker,
}

impl SinkType {
    /// All sink types
    pub const ALL: [SinkType; 4] = [
        SinkType::Bulb,
        SinkType::Display,
        SinkType::Probe,
        SinkType::Speaker,
    ];

    /// Number of inputs of the sink
    pub fn arity(self) -> usize {
        match self {
            SinkType::Display => 4,
            _ => 1,
        }
    }

    /// Name of the sink, as used in documents
    pub fn name(self) -> &'static str {
        use SinkType::*;
        match self {
            Bulb => "bulb",
            Display => "display",
            Probe => "probe",
            Speaker => "speaker",
        }
    }

    /// Parse a sink name, ignoring case
    pub fn from_name(name: &str) -> Option<SinkType> {
        SinkType::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

/// Value shown by a component: a single bit, or a number for displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// Single bit
    Bool(bool),
    /// Number between 0 and 15
    Number(u8),
}

impl OutputValue {
    /// Boolean view of the value; numbers are true when non-zero
    pub fn as_bool(self) -> bool {
        match self {
            OutputValue::Bool(b) => b,
            OutputValue::Number(n) => n != 0,
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Bool(b) => write!(f, "{}", *b as u8),
            OutputValue::Number(n) => write!(f, "{:X}", n),
        }
    }
}

/// State of a clock source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    /// Whether the clock toggles
    pub enabled: bool,
    frequency: f64,
    /// Timestamp of the last toggle, in milliseconds
    pub last_toggle: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Clock {
            enabled: true,
            frequency: 1.0,
            last_toggle: 0.0,
        }
    }
}

impl Clock {
    /// Frequency in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Set the frequency in Hz, clamped to the allowed range
    pub fn set_frequency(&mut self, hz: f64) {
        self.frequency = if hz.is_nan() {
            1.0
        } else {
            hz.clamp(MIN_CLOCK_FREQUENCY, MAX_CLOCK_FREQUENCY)
        };
    }

    /// Half of the period, in milliseconds
    pub fn half_period(&self) -> f64 {
        500.0 / self.frequency
    }

    /// Returns whether the clock is due to toggle at this timestamp
    pub fn is_due(&self, now: f64) -> bool {
        self.enabled && now - self.last_toggle >= self.half_period()
    }
}

/// Input source and its state
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    kind: SourceType,
    value: bool,
    clock: Option<Clock>,
}

impl Source {
    /// Create a source in its initial state
    pub fn new(kind: SourceType) -> Source {
        Source {
            kind,
            value: kind.initial_value(),
            clock: (kind == SourceType::Clock).then(Clock::default),
        }
    }

    /// Kind of source
    pub fn kind(&self) -> SourceType {
        self.kind
    }

    /// Stored value of the source; for buttons, whether it is pressed
    pub fn value(&self) -> bool {
        self.value
    }

    /// Overwrite the stored value
    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    /// Clock state, for clock sources
    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    /// Mutable clock state, for clock sources
    pub fn clock_mut(&mut self) -> Option<&mut Clock> {
        self.clock.as_mut()
    }

    fn reset(&mut self, now: f64) {
        self.value = self.kind.initial_value();
        if let Some(clock) = &mut self.clock {
            clock.last_toggle = now;
        }
    }
}

/// Output sink and its state
#[derive(Debug, Clone, PartialEq)]
pub struct Sink {
    kind: SinkType,
    bits: Vec<bool>,
    history: VecDeque<bool>,
}

impl Sink {
    /// Create a sink in its initial state
    pub fn new(kind: SinkType) -> Sink {
        Sink {
            kind,
            bits: vec![false; kind.arity()],
            history: VecDeque::new(),
        }
    }

    /// Kind of sink
    pub fn kind(&self) -> SinkType {
        self.kind
    }

    /// Input values seen at the last evaluation
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Displayed value: the bit for single-input sinks, the sum of bit·2^slot for displays
    pub fn value(&self) -> OutputValue {
        match self.kind {
            SinkType::Display => OutputValue::Number(
                self.bits
                    .iter()
                    .enumerate()
                    .map(|(i, b)| (*b as u8) << i)
                    .sum(),
            ),
            _ => OutputValue::Bool(self.bits[0]),
        }
    }

    /// Recent values of a probe, oldest first
    pub fn history(&self) -> &VecDeque<bool> {
        &self.history
    }

    /// Tone of a speaker, in Hz
    pub fn tone(&self) -> Option<f64> {
        (self.kind == SinkType::Speaker).then_some(SPEAKER_TONE)
    }

    /// Record new input values; return whether the displayed value changed
    fn update(&mut self, inputs: &[bool]) -> bool {
        let old = self.value();
        for (bit, v) in self.bits.iter_mut().zip(inputs) {
            *bit = *v;
        }
        if self.kind == SinkType::Probe {
            self.history.push_back(self.bits[0]);
            if self.history.len() > PROBE_HISTORY_LEN {
                self.history.pop_front();
            }
        }
        old != self.value()
    }

    fn reset(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = false);
        self.history.clear();
    }
}

/// Kind of a component, with its kind-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Logic gate
    Gate(GateType),
    /// Input source, without inputs
    Source(Source),
    /// Output sink, without output
    Sink(Sink),
}

impl ComponentKind {
    /// Number of input slots
    pub fn arity(&self) -> usize {
        match self {
            ComponentKind::Gate(g) => g.arity(),
            ComponentKind::Source(_) => 0,
            ComponentKind::Sink(s) => s.kind().arity(),
        }
    }

    /// Category name, as used in documents: `gate`, `input` or `output`
    pub fn category(&self) -> &'static str {
        match self {
            ComponentKind::Gate(_) => "gate",
            ComponentKind::Source(_) => "input",
            ComponentKind::Sink(_) => "output",
        }
    }

    /// Subtype name, as used in documents
    pub fn subtype(&self) -> &'static str {
        match self {
            ComponentKind::Gate(g) => g.name(),
            ComponentKind::Source(s) => s.kind().name(),
            ComponentKind::Sink(s) => s.kind().name(),
        }
    }

    /// Build a kind from its document names
    pub fn from_names(category: &str, subtype: &str) -> Option<ComponentKind> {
        match category {
            "gate" => GateType::from_name(subtype).map(ComponentKind::Gate),
            "input" => {
                SourceType::from_name(subtype).map(|s| ComponentKind::Source(Source::new(s)))
            }
            "output" => SinkType::from_name(subtype).map(|s| ComponentKind::Sink(Sink::new(s))),
            _ => None,
        }
    }

    /// Size of the component on the drawing plane
    pub fn size(&self) -> (f64, f64) {
        match self {
            ComponentKind::Gate(_) => (80.0, 60.0),
            ComponentKind::Sink(s) if s.kind() == SinkType::Display => (80.0, 100.0),
            _ => (60.0, 60.0),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subtype())
    }
}

/// A node of the circuit
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: ComponentId,
    kind: ComponentKind,
    position: Point,
    label: Option<String>,
    inputs: Vec<Option<ConnectionId>>,
    output: bool,
    changed: bool,
}

impl Component {
    /// Create a component without identifier; the circuit assigns one on insertion
    pub fn new(kind: ComponentKind, position: Point) -> Component {
        let output = match &kind {
            ComponentKind::Source(s) => s.value(),
            _ => false,
        };
        Component {
            id: ComponentId::default(),
            inputs: vec![None; kind.arity()],
            kind,
            position,
            label: None,
            output,
            changed: false,
        }
    }

    /// Create a gate
    pub fn gate(gate: GateType, position: Point) -> Component {
        Component::new(ComponentKind::Gate(gate), position)
    }

    /// Create an input source
    pub fn source(source: SourceType, position: Point) -> Component {
        Component::new(ComponentKind::Source(Source::new(source)), position)
    }

    /// Create an output sink
    pub fn sink(sink: SinkType, position: Point) -> Component {
        Component::new(ComponentKind::Sink(Sink::new(sink)), position)
    }

    /// Set the identifier
    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Component {
        self.id = id.into();
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Component {
        self.label = Some(label.into());
        self
    }

    /// Identifier of the component
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: ComponentId) {
        self.id = id;
    }

    /// Kind of the component
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Gate function, for gates
    pub fn gate_type(&self) -> Option<GateType> {
        match self.kind {
            ComponentKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Source state, for input sources
    pub fn as_source(&self) -> Option<&Source> {
        match &self.kind {
            ComponentKind::Source(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable source state, for input sources
    pub fn as_source_mut(&mut self) -> Option<&mut Source> {
        match &mut self.kind {
            ComponentKind::Source(s) => Some(s),
            _ => None,
        }
    }

    /// Sink state, for output sinks
    pub fn as_sink(&self) -> Option<&Sink> {
        match &self.kind {
            ComponentKind::Sink(s) => Some(s),
            _ => None,
        }
    }

    /// Returns whether the component is a gate
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, ComponentKind::Gate(_))
    }

    /// Returns whether the component is an input source
    pub fn is_source(&self) -> bool {
        matches!(self.kind, ComponentKind::Source(_))
    }

    /// Returns whether the component is an output sink
    pub fn is_sink(&self) -> bool {
        matches!(self.kind, ComponentKind::Sink(_))
    }

    /// Optional label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Change the label
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Label if present, identifier otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    /// Position of the top-left corner
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the component
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Number of input slots
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Connection attached to each input slot
    pub fn inputs(&self) -> &[Option<ConnectionId>] {
        &self.inputs
    }

    pub(crate) fn set_input(&mut self, slot: usize, connection: Option<ConnectionId>) {
        self.inputs[slot] = connection;
    }

    /// Output value computed by the last evaluation
    pub fn output(&self) -> bool {
        self.output
    }

    /// Value shown by the component; displays show a number
    pub fn value(&self) -> OutputValue {
        match &self.kind {
            ComponentKind::Sink(s) => s.value(),
            _ => OutputValue::Bool(self.output),
        }
    }

    /// Returns whether the last evaluation changed the value
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Returns whether the component has an output port
    pub fn has_output_port(&self) -> bool {
        !self.is_sink()
    }

    /// Bounding box on the drawing plane
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.kind.size();
        Rect::new(self.position, w, h)
    }

    /// Position of an input port
    pub fn input_position(&self, slot: usize) -> Point {
        let (_, h) = self.kind.size();
        let Point { x, y } = self.position;
        match &self.kind {
            ComponentKind::Sink(s) if s.kind() == SinkType::Display => {
                Point::new(x, y + h / 5.0 * (slot + 1) as f64)
            }
            _ => {
                let n = self.arity().max(1) as f64;
                Point::new(x, y + h / (n + 1.0) * (slot + 1) as f64)
            }
        }
    }

    /// Position of the output port
    pub fn output_position(&self) -> Point {
        let (w, h) = self.kind.size();
        self.position.shifted(w, h / 2.0)
    }

    /// Evaluate the component from its input values; return whether its value changed
    pub(crate) fn evaluate(&mut self, inputs: &[bool]) -> bool {
        let (output, sink_changed) = match &mut self.kind {
            ComponentKind::Gate(g) => (g.eval(inputs), false),
            ComponentKind::Source(s) => (s.value(), false),
            ComponentKind::Sink(s) => {
                let changed = s.update(inputs);
                (s.value().as_bool(), changed)
            }
        };
        self.changed = sink_changed || output != self.output;
        self.output = output;
        self.changed
    }

    /// Return the component to its initial state
    pub(crate) fn reset(&mut self, now: f64) {
        match &mut self.kind {
            ComponentKind::Gate(_) => self.output = false,
            ComponentKind::Source(s) => {
                s.reset(now);
                self.output = s.value();
            }
            ComponentKind::Sink(s) => {
                s.reset();
                self.output = false;
            }
        }
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_functions() {
        use GateType::*;
        let table = [
            (And, [false, false, false, true]),
            (Or, [false, true, true, true]),
            (Xor, [false, true, true, false]),
            (Nand, [true, true, true, false]),
            (Nor, [true, false, false, false]),
        ];
        for (g, expected) in table {
            for (i, e) in expected.iter().enumerate() {
                let a = i & 2 != 0;
                let b = i & 1 != 0;
                assert_eq!(g.eval(&[a, b]), *e, "{g} {a} {b}");
            }
        }
        assert!(Not.eval(&[false]));
        assert!(!Not.eval(&[true]));
        assert!(Not.eval(&[]));
    }

    #[test]
    fn test_names() {
        for g in GateType::ALL {
            assert_eq!(GateType::from_name(g.name()), Some(g));
        }
        assert_eq!(GateType::from_name("nand"), Some(GateType::Nand));
        assert_eq!(SourceType::from_name("CLOCK"), Some(SourceType::Clock));
        assert_eq!(SinkType::from_name("probe"), Some(SinkType::Probe));
        assert!(ComponentKind::from_names("gate", "XNOR").is_none());
        assert!(ComponentKind::from_names("wire", "AND").is_none());
    }

    #[test]
    fn test_arity() {
        assert_eq!(Component::gate(GateType::Not, Point::default()).arity(), 1);
        assert_eq!(Component::gate(GateType::Xor, Point::default()).arity(), 2);
        assert_eq!(
            Component::source(SourceType::Switch, Point::default()).arity(),
            0
        );
        assert_eq!(
            Component::sink(SinkType::Display, Point::default()).arity(),
            4
        );
        assert_eq!(Component::sink(SinkType::Bulb, Point::default()).arity(), 1);
    }

    #[test]
    fn test_display_value() {
        let mut c = Component::sink(SinkType::Display, Point::default());
        assert!(c.evaluate(&[true, false, true, false]));
        assert_eq!(c.value(), OutputValue::Number(5));
        assert!(c.output());
        assert!(!c.evaluate(&[true, false, true, false]));
        c.evaluate(&[true, true, true, true]);
        assert_eq!(c.value(), OutputValue::Number(15));
        assert_eq!(c.value().to_string(), "F");
    }

    #[test]
    fn test_probe_history() {
        let mut c = Component::sink(SinkType::Probe, Point::default());
        for i in 0..60 {
            c.evaluate(&[i % 2 == 0]);
        }
        let history = c.as_sink().unwrap().history();
        assert_eq!(history.len(), PROBE_HISTORY_LEN);
        assert!(!history[history.len() - 1]);
        c.reset(0.0);
        assert!(c.as_sink().unwrap().history().is_empty());
    }

    #[test]
    fn test_clock_frequency() {
        let mut clock = Clock::default();
        assert_eq!(clock.half_period(), 500.0);
        clock.set_frequency(100.0);
        assert_eq!(clock.frequency(), MAX_CLOCK_FREQUENCY);
        clock.set_frequency(0.0);
        assert_eq!(clock.frequency(), MIN_CLOCK_FREQUENCY);
        clock.set_frequency(2.0);
        assert!(!clock.is_due(249.0));
        assert!(clock.is_due(250.0));
    }

    #[test]
    fn test_sources_reset() {
        let mut high = Component::source(SourceType::High, Point::default());
        assert!(high.output());
        high.as_source_mut().unwrap().set_value(false);
        high.evaluate(&[]);
        assert!(!high.output());
        high.reset(0.0);
        assert!(high.output());

        let mut sw = Component::source(SourceType::Switch, Point::default());
        sw.as_source_mut().unwrap().set_value(true);
        assert!(sw.evaluate(&[]));
        sw.reset(0.0);
        assert!(!sw.output());
    }

    #[test]
    fn test_ports() {
        let g = Component::gate(GateType::And, Point::new(100.0, 100.0));
        assert_eq!(g.input_position(0), Point::new(100.0, 120.0));
        assert_eq!(g.input_position(1), Point::new(100.0, 140.0));
        assert_eq!(g.output_position(), Point::new(180.0, 130.0));
        let d = Component::sink(SinkType::Display, Point::new(0.0, 0.0));
        assert_eq!(d.input_position(3), Point::new(0.0, 80.0));
        assert!(!d.has_output_port());
        let b = Component::sink(SinkType::Bulb, Point::new(0.0, 0.0));
        assert_eq!(b.input_position(0), Point::new(0.0, 30.0));
    }
}
