//! Mutable network state owned by the caller: placed instances, declared
//! connections, and clock-master designations.
//!
//! The workspace never patches inference output. Every state change reruns
//! the engine over the whole snapshot and writes the fresh statuses back, so
//! routing queries always see the current verdicts.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::infer;
use crate::routing::{AudioRoutes, Downstream};
use crate::types::{
    Connection, Device, DeviceInstance, InferenceOptions, InferenceResult, InstanceId, PortReference,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("Port {port} not found on instance {instance}")]
    UnknownPort { instance: InstanceId, port: String },

    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    #[error("A port cannot be connected to itself")]
    SelfConnection,

    #[error("Those ports are already connected by {0}")]
    DuplicateConnection(String),
}

/// Which end of a connection to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    instances: Vec<DeviceInstance>,
    connections: Vec<Connection>,
    clock_masters: Vec<InstanceId>,
    result: InferenceResult,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a workspace from a saved snapshot. Connections keep their ids.
    pub fn from_parts(
        instances: Vec<DeviceInstance>,
        connections: Vec<Connection>,
        clock_masters: Vec<InstanceId>,
    ) -> Self {
        let mut ws = Self {
            instances,
            connections,
            clock_masters,
            result: InferenceResult::default(),
        };
        ws.refresh();
        ws
    }

    pub fn instances(&self) -> &[DeviceInstance] {
        &self.instances
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn clock_masters(&self) -> &[InstanceId] {
        &self.clock_masters
    }

    /// Output of the most recent engine run.
    pub fn last_result(&self) -> &InferenceResult {
        &self.result
    }

    pub fn instance(&self, id: &InstanceId) -> Option<&DeviceInstance> {
        self.instances.iter().find(|i| &i.id == id)
    }

    /// Place a device; returns the new instance id (device id + placement nonce).
    pub fn place(&mut self, device: Device) -> InstanceId {
        let nonce = Uuid::new_v4().simple().to_string();
        let id = InstanceId(format!("{}-{}", device.id, &nonce[..8]));
        info!(instance = %id, device = %device.id, "placed device");
        self.instances.push(DeviceInstance::new(id.clone(), device));
        self.refresh();
        id
    }

    /// Remove an instance along with its connections and clock designation.
    pub fn remove_instance(&mut self, id: &InstanceId) -> Result<DeviceInstance, WorkspaceError> {
        let pos = self
            .instances
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| WorkspaceError::UnknownInstance(id.clone()))?;

        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        self.clock_masters.retain(|m| m != id);
        debug!(instance = %id, dropped = before - self.connections.len(), "removed instance");

        let removed = self.instances.remove(pos);
        self.refresh();
        Ok(removed)
    }

    fn reference(&self, instance: &InstanceId, port: &str) -> Result<PortReference, WorkspaceError> {
        let inst = self
            .instance(instance)
            .ok_or_else(|| WorkspaceError::UnknownInstance(instance.clone()))?;
        let port_def = inst.device.port(port).ok_or_else(|| WorkspaceError::UnknownPort {
            instance: instance.clone(),
            port: port.to_string(),
        })?;
        Ok(PortReference::new(inst, port_def))
    }

    fn check_link(&self, candidate: &Connection, ignore: Option<&str>) -> Result<(), WorkspaceError> {
        if candidate.from.same_port(&candidate.to) {
            return Err(WorkspaceError::SelfConnection);
        }
        if let Some(existing) = self
            .connections
            .iter()
            .filter(|c| Some(c.id.as_str()) != ignore)
            .find(|c| c.links_same_ports(candidate))
        {
            return Err(WorkspaceError::DuplicateConnection(existing.id.clone()));
        }
        Ok(())
    }

    /// Declare a connection in the given orientation. Returns its id.
    pub fn connect(
        &mut self,
        from: (&InstanceId, &str),
        to: (&InstanceId, &str),
    ) -> Result<String, WorkspaceError> {
        let connection = Connection::pending(
            Uuid::new_v4().to_string(),
            self.reference(from.0, from.1)?,
            self.reference(to.0, to.1)?,
        );
        self.check_link(&connection, None)?;

        let id = connection.id.clone();
        debug!(connection = %id, from = %from.0, to = %to.0, "declared connection");
        self.connections.push(connection);
        self.refresh();
        Ok(id)
    }

    /// Move one end of an existing connection to another port.
    pub fn reassign(
        &mut self,
        connection_id: &str,
        endpoint: Endpoint,
        instance: &InstanceId,
        port: &str,
    ) -> Result<(), WorkspaceError> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| WorkspaceError::UnknownConnection(connection_id.to_string()))?;

        let reference = self.reference(instance, port)?;
        let current = &self.connections[pos];
        let (from, to) = match endpoint {
            Endpoint::From => (reference, current.to.clone()),
            Endpoint::To => (current.from.clone(), reference),
        };
        let updated = Connection::pending(connection_id, from, to);
        self.check_link(&updated, Some(connection_id))?;

        self.connections[pos] = updated;
        self.refresh();
        Ok(())
    }

    pub fn disconnect(&mut self, connection_id: &str) -> Result<Connection, WorkspaceError> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| WorkspaceError::UnknownConnection(connection_id.to_string()))?;
        let removed = self.connections.remove(pos);
        self.refresh();
        Ok(removed)
    }

    pub fn set_clock_master(&mut self, instance: &InstanceId, master: bool) -> Result<(), WorkspaceError> {
        if self.instance(instance).is_none() {
            return Err(WorkspaceError::UnknownInstance(instance.clone()));
        }
        self.clock_masters.retain(|m| m != instance);
        if master {
            self.clock_masters.push(instance.clone());
        }
        self.refresh();
        Ok(())
    }

    pub fn options(&self) -> InferenceOptions {
        InferenceOptions {
            clock_masters: self.clock_masters.clone(),
        }
    }

    /// Run inference over the current snapshot and adopt the new statuses.
    pub fn evaluate(&mut self) -> InferenceResult {
        self.refresh();
        info!(
            connections = self.result.connections.len(),
            warnings = self.result.warnings.len(),
            "evaluated network"
        );
        self.result.clone()
    }

    fn refresh(&mut self) {
        let result = infer(&self.instances, &self.connections, &self.options());
        self.connections = result.connections.clone();
        debug!(
            connections = result.connections.len(),
            warnings = result.warnings.len(),
            "refreshed network"
        );
        self.result = result;
    }

    pub fn routes(&self) -> AudioRoutes<'_> {
        AudioRoutes::build(&self.instances, &self.connections)
    }

    pub fn test_tone_available(&self, instance: &InstanceId) -> bool {
        self.routes().test_tone_available(instance)
    }

    pub fn downstream(&self, instance: &InstanceId) -> Downstream {
        self.routes().downstream(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::types::{ConnectionStatus, Direction, Port, Signal};

    fn synth() -> Device {
        Device::new("volca", "Volca")
            .with_port(Port::new("out", Direction::Out, Connector::EighthInchTs, &[Signal::Audio]))
            .with_port(Port::new("midi_in", Direction::In, Connector::MidiDin, &[Signal::Midi]))
    }

    fn speaker() -> Device {
        Device::new("pm0", "Pocket Monitor")
            .with_tag("monitor")
            .with_port(Port::new("in", Direction::In, Connector::Ts35, &[Signal::Audio]))
    }

    #[test]
    fn test_place_gives_unique_ids_per_placement() {
        let mut ws = Workspace::new();
        let a = ws.place(synth());
        let b = ws.place(synth());
        assert_ne!(a, b);
        assert!(a.0.starts_with("volca-"));
        assert_eq!(ws.instances().len(), 2);
    }

    #[test]
    fn test_connect_rejects_duplicates_in_either_direction() {
        let mut ws = Workspace::new();
        let s = ws.place(synth());
        let m = ws.place(speaker());
        let id = ws.connect((&s, "out"), (&m, "in")).unwrap();

        assert_eq!(
            ws.connect((&m, "in"), (&s, "out")),
            Err(WorkspaceError::DuplicateConnection(id))
        );
        assert_eq!(ws.connect((&s, "out"), (&s, "out")), Err(WorkspaceError::SelfConnection));
        assert!(matches!(
            ws.connect((&s, "nope"), (&m, "in")),
            Err(WorkspaceError::UnknownPort { .. })
        ));
    }

    #[test]
    fn test_remove_instance_cascades() {
        let mut ws = Workspace::new();
        let s = ws.place(synth());
        let m = ws.place(speaker());
        ws.connect((&s, "out"), (&m, "in")).unwrap();
        ws.set_clock_master(&s, true).unwrap();

        ws.remove_instance(&s).unwrap();
        assert!(ws.connections().is_empty());
        assert!(ws.clock_masters().is_empty());
        assert_eq!(ws.remove_instance(&s), Err(WorkspaceError::UnknownInstance(s)));
    }

    #[test]
    fn test_evaluate_writes_statuses_and_gates_test_tone() {
        let mut ws = Workspace::new();
        let s = ws.place(synth());
        let m = ws.place(speaker());
        ws.connect((&s, "out"), (&m, "in")).unwrap();

        let result = ws.evaluate();
        assert_eq!(result.connections[0].status, ConnectionStatus::Valid);
        assert_eq!(ws.connections()[0].status, ConnectionStatus::Valid);
        assert!(ws.test_tone_available(&s));
        assert!(!ws.test_tone_available(&m));
        assert_eq!(ws.downstream(&s).instances, vec![m]);
    }

    #[test]
    fn test_reassign_endpoint() {
        let mut ws = Workspace::new();
        let s = ws.place(synth());
        let m1 = ws.place(speaker());
        let m2 = ws.place(speaker());
        let id = ws.connect((&s, "out"), (&m1, "in")).unwrap();

        ws.reassign(&id, Endpoint::To, &m2, "in").unwrap();
        assert_eq!(ws.connections()[0].to.instance_id, m2);
        assert_eq!(
            ws.reassign("missing", Endpoint::To, &m2, "in"),
            Err(WorkspaceError::UnknownConnection("missing".into()))
        );
    }

    fn interface() -> Device {
        Device::new("iface", "Interface")
            .with_port(Port::new("line_out", Direction::Out, Connector::Ts35, &[Signal::Audio]))
            .with_port(Port::new("usb", Direction::InOut, Connector::UsbC, &[Signal::UsbAudio]))
    }

    fn usb_speaker() -> Device {
        speaker().with_port(Port::new("usb", Direction::In, Connector::UsbB, &[Signal::UsbAudio]))
    }

    #[test]
    fn test_connect_reevaluates_without_explicit_call() {
        let mut ws = Workspace::new();
        let i = ws.place(interface());
        let m = ws.place(usb_speaker());
        ws.connect((&i, "usb"), (&m, "usb")).unwrap();

        assert_eq!(ws.connections()[0].status, ConnectionStatus::Invalid);
        assert_eq!(ws.last_result().connections[0].status, ConnectionStatus::Invalid);
        assert!(!ws.test_tone_available(&i));
        assert!(ws.downstream(&i).instances.is_empty());
    }

    #[test]
    fn test_reassign_drops_stale_verdict() {
        let mut ws = Workspace::new();
        let i = ws.place(interface());
        let m = ws.place(usb_speaker());
        let id = ws.connect((&i, "line_out"), (&m, "in")).unwrap();
        assert_eq!(ws.connections()[0].status, ConnectionStatus::Valid);
        assert!(ws.test_tone_available(&i));

        ws.reassign(&id, Endpoint::From, &i, "usb").unwrap();
        ws.reassign(&id, Endpoint::To, &m, "usb").unwrap();

        let conn = &ws.connections()[0];
        assert_eq!(conn.status, ConnectionStatus::Invalid);
        assert!(conn.issues.iter().any(|i| i.contains("cannot connect to")));
        assert!(!ws.test_tone_available(&i));
    }

    #[test]
    fn test_disconnect() {
        let mut ws = Workspace::new();
        let s = ws.place(synth());
        let m = ws.place(speaker());
        let id = ws.connect((&s, "out"), (&m, "in")).unwrap();
        ws.disconnect(&id).unwrap();
        assert!(ws.connections().is_empty());
        assert!(ws.disconnect(&id).is_err());
    }
}
