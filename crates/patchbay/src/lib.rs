//! Compatibility and cable inference for ad-hoc audio/MIDI rigs.
//!
//! Given placed devices and the links a user has declared between their
//! ports, decide which links work, what cable or adapter each needs, and
//! what is worth warning about (signal mismatches, balanced/unbalanced and
//! stereo/mono wiring, missing MIDI clock master, audio that never reaches a
//! monitor).
//!
//! ```
//! use patchbay::{infer, Connection, Connector, Device, DeviceInstance, Direction,
//!     InferenceOptions, Port, PortReference, Signal};
//!
//! let keystep = DeviceInstance::new("keystep-1", Device::new("keystep", "Keystep")
//!     .with_port(Port::new("midi_out", Direction::Out, Connector::TrsMidi, &[Signal::Midi])));
//! let digitakt = DeviceInstance::new("digitakt-1", Device::new("digitakt", "Digitakt")
//!     .with_port(Port::new("midi_in", Direction::In, Connector::Din5, &[Signal::Midi])));
//!
//! let link = Connection::pending(
//!     "c1",
//!     PortReference::new(&keystep, &keystep.device.ports[0]),
//!     PortReference::new(&digitakt, &digitakt.device.ports[0]),
//! );
//!
//! let result = infer(&[keystep, digitakt], &[link], &InferenceOptions::default());
//! assert_eq!(result.workflows, vec!["Keystep → Digitakt: Use TRS-A to DIN-5 MIDI cable."]);
//! ```

pub mod catalog;
pub mod connector;
pub mod engine;
pub mod recommend;
pub mod report;
pub mod resolver;
pub mod routing;
pub mod types;
pub mod workspace;

pub use catalog::{Catalog, CatalogError, NetworkFile, PlacedInstance};
pub use connector::{adapter_chain, adapter_label, adapter_phrase, Connector, PhysicalConnector};
pub use engine::infer;
pub use recommend::recommend;
pub use resolver::{physical_connector, resolve, Compatibility};
pub use routing::{AudioRoutes, Downstream};
pub use types::*;
pub use workspace::{Endpoint, Workspace, WorkspaceError};
