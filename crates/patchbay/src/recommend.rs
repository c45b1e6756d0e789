//! Cable recommendations for two devices that are not placed anywhere yet.

use std::collections::BTreeSet;

use crate::engine::infer;
use crate::types::{Connection, Device, DeviceInstance, InferenceOptions, InstanceId, PortReference};

/// Synthetic instance id for recommendation runs, stable per device.
pub fn pairing_instance_id(device: &Device) -> InstanceId {
    InstanceId(format!("pairing:{}", device.id))
}

/// Every output→input pairing between `a` and `b`, in both directions.
pub fn candidate_connections(a: &DeviceInstance, b: &DeviceInstance) -> Vec<Connection> {
    let mut connections = Vec::new();
    for (from, to) in [(a, b), (b, a)] {
        for out in from.device.ports.iter().filter(|p| p.direction.can_send()) {
            for inp in to.device.ports.iter().filter(|p| p.direction.can_receive()) {
                connections.push(Connection::pending(
                    format!("{}:{}->{}:{}", from.id, out.id, to.id, inp.id),
                    PortReference::new(from, out),
                    PortReference::new(to, inp),
                ));
            }
        }
    }
    connections
}

/// Plain-text cable suggestions for connecting `a` and `b`, sorted and
/// deduplicated. Empty when the devices expose no complementary ports.
pub fn recommend(a: &Device, b: &Device) -> Vec<String> {
    let instances = [
        DeviceInstance::new(pairing_instance_id(a), a.clone()),
        DeviceInstance::new(pairing_instance_id(b), b.clone()),
    ];

    let connections = candidate_connections(&instances[0], &instances[1]);
    if connections.is_empty() {
        return Vec::new();
    }

    let result = infer(&instances, &connections, &InferenceOptions::default());

    let phrases: BTreeSet<String> = result
        .suggestions
        .iter()
        .map(|s| format!("{} → {}: Use {}", s.from.device_label(), s.to.device_label(), s.description))
        .collect();

    if phrases.is_empty() {
        return result.workflows.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    }
    phrases.into_iter().collect()
}
