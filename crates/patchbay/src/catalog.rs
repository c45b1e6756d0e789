//! Device catalogs and saved network snapshots (JSON).
//!
//! Unknown connector or signal codes fail at parse time because both are
//! closed enums. Structural problems the type system can't express are
//! rejected by [`validate_device`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::{Connection, Device, DeviceId, DeviceInstance, InstanceId};
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Duplicate device id: {0}")]
    DuplicateDevice(DeviceId),

    #[error("Device {device} declares port {port} more than once")]
    DuplicatePort { device: DeviceId, port: String },

    #[error("Port {port} on device {device} carries no signals")]
    EmptySignals { device: DeviceId, port: String },

    #[error("Instance {instance} refers to unknown device {device}")]
    UnknownDevice { instance: InstanceId, device: DeviceId },
}

pub fn validate_device(device: &Device) -> Result<(), CatalogError> {
    let mut ports = HashSet::new();
    for port in &device.ports {
        if !ports.insert(port.id.as_str()) {
            return Err(CatalogError::DuplicatePort {
                device: device.id.clone(),
                port: port.id.clone(),
            });
        }
        if port.signals.is_empty() {
            return Err(CatalogError::EmptySignals {
                device: device.id.clone(),
                port: port.id.clone(),
            });
        }
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Ordered collection of device definitions: catalog entries plus any
/// custom devices the user authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    devices: Vec<Device>,
}

impl Catalog {
    pub fn new(devices: Vec<Device>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for device in devices {
            catalog.add(device)?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let devices: Vec<Device> = read_json(path)?;
        let catalog = Self::new(devices)?;
        debug!(path = %path.display(), devices = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn add(&mut self, device: Device) -> Result<(), CatalogError> {
        validate_device(&device)?;
        if self.get(&device.id).is_some() {
            return Err(CatalogError::DuplicateDevice(device.id));
        }
        self.devices.push(device);
        Ok(())
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedInstance {
    pub id: InstanceId,
    pub device: DeviceId,
}

/// A saved network: placements, declared connections, clock masters, and
/// any custom devices that aren't in the shared catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub instances: Vec<PlacedInstance>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clock_masters: Vec<InstanceId>,
}

impl NetworkFile {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        read_json(path)
    }

    /// Resolve placements against `catalog` plus this file's custom devices.
    pub fn into_workspace(self, catalog: &Catalog) -> Result<Workspace, CatalogError> {
        let mut known = catalog.clone();
        for device in self.devices {
            known.add(device)?;
        }

        let instances = self
            .instances
            .into_iter()
            .map(|placed| {
                known
                    .get(&placed.device)
                    .cloned()
                    .map(|device| DeviceInstance::new(placed.id.clone(), device))
                    .ok_or(CatalogError::UnknownDevice {
                        instance: placed.id,
                        device: placed.device,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Workspace::from_parts(instances, self.connections, self.clock_masters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"[
        {
            "id": "volca-keys",
            "name": "Volca Keys",
            "category": "Synth",
            "ports": [
                {"id": "out", "direction": "out", "connector": "eighth_inch_trs", "signals": ["audio"], "audio_wiring": "unbalanced_stereo"},
                {"id": "midi_in", "direction": "in", "connector": "midi_din", "signals": ["midi"]}
            ]
        },
        {
            "id": "hs5",
            "name": "HS5",
            "category": "Studio Monitor",
            "ports": [
                {"id": "in", "direction": "in", "connector": "xlr_trs_combo", "signals": ["audio"]}
            ]
        }
    ]"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_catalog() {
        let file = write_temp(CATALOG);
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&"hs5".into()).unwrap().is_monitor());
    }

    #[test]
    fn test_unknown_connector_is_rejected() {
        let file = write_temp(
            r#"[{"id": "x", "name": "X", "ports": [{"id": "p", "direction": "out", "connector": "rca", "signals": ["audio"]}]}]"#,
        );
        assert!(matches!(Catalog::load(file.path()), Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_empty_signals_rejected() {
        let file = write_temp(
            r#"[{"id": "x", "name": "X", "ports": [{"id": "p", "direction": "out", "connector": "usb_b", "signals": []}]}]"#,
        );
        assert!(matches!(Catalog::load(file.path()), Err(CatalogError::EmptySignals { .. })));
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let devices = vec![Device::new("a", "A"), Device::new("a", "A again")];
        assert!(matches!(Catalog::new(devices), Err(CatalogError::DuplicateDevice(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::FileRead { .. }));
    }

    #[test]
    fn test_network_resolves_catalog_and_custom_devices() {
        let catalog = Catalog::load(write_temp(CATALOG).path()).unwrap();
        let network: NetworkFile = serde_json::from_str(
            r#"{
                "devices": [{"id": "custom-box", "name": "Custom Box", "ports": []}],
                "instances": [
                    {"id": "keys-1", "device": "volca-keys"},
                    {"id": "box-1", "device": "custom-box"}
                ],
                "connections": [],
                "clock_masters": ["keys-1"]
            }"#,
        )
        .unwrap();

        let ws = network.into_workspace(&catalog).unwrap();
        assert_eq!(ws.instances().len(), 2);
        assert_eq!(ws.instances()[1].device.name, "Custom Box");
        assert_eq!(ws.clock_masters(), &[InstanceId::from("keys-1")]);
    }

    #[test]
    fn test_network_with_unknown_device() {
        let network = NetworkFile {
            instances: vec![PlacedInstance {
                id: "x-1".into(),
                device: "x".into(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            network.into_workspace(&Catalog::default()),
            Err(CatalogError::UnknownDevice { .. })
        ));
    }
}
