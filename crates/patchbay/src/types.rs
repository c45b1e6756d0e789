use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::connector::{Connector, PhysicalConnector};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One placement of a device in a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "in_out",
        }
    }

    pub fn can_send(&self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }

    pub fn can_receive(&self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "in_out" => Ok(Self::InOut),
            _ => Err(format!("Unknown port direction: {}", s)),
        }
    }
}

/// Signal tags a port can carry. Ordering follows declaration order and
/// drives the order signals appear in generated descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Audio,
    Midi,
    Sync,
    UsbAudio,
    UsbMidi,
    Cv,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Midi => "midi",
            Self::Sync => "sync",
            Self::UsbAudio => "usb_audio",
            Self::UsbMidi => "usb_midi",
            Self::Cv => "cv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Midi => "MIDI",
            Self::Sync => "sync",
            Self::UsbAudio => "USB audio",
            Self::UsbMidi => "USB MIDI",
            Self::Cv => "CV",
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio | Self::UsbAudio)
    }

    pub fn is_midi(&self) -> bool {
        matches!(self, Self::Midi | Self::UsbMidi)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(Self::Audio),
            "midi" => Ok(Self::Midi),
            "sync" => Ok(Self::Sync),
            "usb_audio" => Ok(Self::UsbAudio),
            "usb_midi" => Ok(Self::UsbMidi),
            "cv" => Ok(Self::Cv),
            _ => Err(format!("Unknown signal: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Audio,
    Midi,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Midi => write!(f, "MIDI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioWiring {
    BalancedMono,
    UnbalancedMono,
    UnbalancedStereo,
}

impl AudioWiring {
    pub fn is_mono(&self) -> bool {
        matches!(self, Self::BalancedMono | Self::UnbalancedMono)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub direction: Direction,
    pub connector: Connector,
    pub signals: BTreeSet<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_wiring: Option<AudioWiring>,
    /// Overrides whatever family the connector code would resolve to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_connector: Option<PhysicalConnector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Port {
    pub fn new(id: impl Into<String>, direction: Direction, connector: Connector, signals: &[Signal]) -> Self {
        Self {
            id: id.into(),
            name: None,
            direction,
            connector,
            signals: signals.iter().copied().collect(),
            domain: None,
            audio_wiring: None,
            physical_connector: None,
            notes: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_wiring(mut self, wiring: AudioWiring) -> Self {
        self.audio_wiring = Some(wiring);
        self
    }

    pub fn with_physical_connector(mut self, family: PhysicalConnector) -> Self {
        self.physical_connector = Some(family);
        self
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Explicit domain, else inferred from the plain audio/midi tags.
    /// Audio wins when both are present.
    pub fn resolved_domain(&self) -> Option<Domain> {
        self.domain.or_else(|| {
            if self.signals.contains(&Signal::Audio) {
                Some(Domain::Audio)
            } else if self.signals.contains(&Signal::Midi) {
                Some(Domain::Midi)
            } else {
                None
            }
        })
    }

    pub fn carries_audio(&self) -> bool {
        self.signals.iter().any(Signal::is_audio)
    }

    pub fn carries_midi(&self) -> bool {
        self.signals.iter().any(Signal::is_midi)
    }

    pub fn shared_signals(&self, other: &Port) -> BTreeSet<Signal> {
        self.signals.intersection(&other.signals).copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Cleared for devices that cannot play the workspace test tone.
    #[serde(default = "default_test_tone")]
    pub test_tone: bool,
}

fn default_test_tone() -> bool {
    true
}

impl Device {
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manufacturer: None,
            category: None,
            description: None,
            ports: Vec::new(),
            tags: Vec::new(),
            test_tone: true,
        }
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn port(&self, id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    /// Tagged `monitor`, or a category mentioning monitors.
    pub fn is_monitor(&self) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case("monitor"))
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains("monitor"))
    }

    pub fn has_audio_output(&self) -> bool {
        self.ports
            .iter()
            .any(|p| p.direction.can_send() && p.carries_audio())
    }

    pub fn is_midi_capable(&self) -> bool {
        self.ports.iter().any(Port::carries_midi)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInstance {
    pub id: InstanceId,
    pub device: Device,
}

impl DeviceInstance {
    pub fn new(id: impl Into<InstanceId>, device: Device) -> Self {
        Self { id: id.into(), device }
    }

    /// Catalog name, else the raw instance id.
    pub fn display_name(&self) -> &str {
        if self.device.name.is_empty() {
            &self.id.0
        } else {
            &self.device.name
        }
    }
}

/// One end of a declared connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReference {
    pub instance_id: InstanceId,
    pub device_id: DeviceId,
    pub port_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_name: Option<String>,
}

impl PortReference {
    pub fn new(instance: &DeviceInstance, port: &Port) -> Self {
        Self {
            instance_id: instance.id.clone(),
            device_id: instance.device.id.clone(),
            port_id: port.id.clone(),
            device_name: Some(instance.device.name.clone()),
            port_name: port.name.clone(),
        }
    }

    /// Same port on the same instance, ignoring display hints.
    pub fn same_port(&self, other: &PortReference) -> bool {
        self.instance_id == other.instance_id && self.port_id == other.port_id
    }

    pub fn device_label(&self) -> &str {
        self.device_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.device_id.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from: PortReference,
    pub to: PortReference,
    #[serde(default)]
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl Connection {
    pub fn pending(id: impl Into<String>, from: PortReference, to: PortReference) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            status: ConnectionStatus::Pending,
            issues: Vec::new(),
        }
    }

    /// True when both connections join the same two ports, in either order.
    pub fn links_same_ports(&self, other: &Connection) -> bool {
        (self.from.same_port(&other.from) && self.to.same_port(&other.to))
            || (self.from.same_port(&other.to) && self.to.same_port(&other.from))
    }

    pub fn touches(&self, instance: &InstanceId) -> bool {
        &self.from.instance_id == instance || &self.to.instance_id == instance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableSuggestion {
    pub description: String,
    pub connector: Connector,
    pub from: PortReference,
    pub to: PortReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adapters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions {
    #[serde(default)]
    pub clock_masters: Vec<InstanceId>,
}

impl InferenceOptions {
    pub fn with_clock_master(mut self, instance: impl Into<InstanceId>) -> Self {
        self.clock_masters.push(instance.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub connections: Vec<Connection>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<CableSuggestion>,
    pub workflows: Vec<String>,
}
