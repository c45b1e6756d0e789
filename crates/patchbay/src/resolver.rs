//! Connector compatibility between two ports.
//!
//! Pure and total: anything the tables don't cover comes back as
//! [`Compatibility::Incompatible`], never as an error.

use crate::connector::{adapter_chain, Connector, PhysicalConnector};
use crate::types::Port;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// A straight cable fits both ends.
    Direct { connector: Connector },
    /// Needs the listed adapters; `connector` is the destination's family.
    Adapted {
        connector: Connector,
        adapters: Vec<String>,
    },
    Incompatible,
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        !matches!(self, Self::Incompatible)
    }

    pub fn connector(&self) -> Option<Connector> {
        match self {
            Self::Direct { connector } | Self::Adapted { connector, .. } => Some(*connector),
            Self::Incompatible => None,
        }
    }

    pub fn adapters(&self) -> &[String] {
        match self {
            Self::Adapted { adapters, .. } => adapters,
            _ => &[],
        }
    }
}

/// Override field first, then a canonical code, then the legacy table.
pub fn physical_connector(port: &Port) -> Option<PhysicalConnector> {
    port.physical_connector
        .or_else(|| PhysicalConnector::from_canonical(port.connector))
        .or_else(|| port.connector.legacy_family())
}

pub fn resolve(from: &Port, to: &Port) -> Compatibility {
    if let (Some(a), Some(b)) = (physical_connector(from), physical_connector(to)) {
        if a == b {
            return Compatibility::Direct { connector: a.connector() };
        }

        if let Some(jack) = combo_jack(from, b).or_else(|| combo_jack(to, a)) {
            return Compatibility::Direct { connector: jack.connector() };
        }

        if let Some(jack) = PhysicalConnector::shared_jack(a, b) {
            return Compatibility::Direct { connector: jack.connector() };
        }

        if let Some(chain) = adapter_chain(a, b) {
            return Compatibility::Adapted {
                connector: b.connector(),
                adapters: chain.iter().map(|c| c.to_string()).collect(),
            };
        }
    }

    if from.connector == to.connector {
        return Compatibility::Direct { connector: from.connector };
    }

    Compatibility::Incompatible
}

/// A combo XLR/TRS jack takes a 6.35 mm TS or TRS plug as-is, unless the
/// port pins its family with an override.
fn combo_jack(port: &Port, other: PhysicalConnector) -> Option<PhysicalConnector> {
    (port.physical_connector.is_none()
        && port.connector == Connector::XlrTrsCombo
        && other.is_quarter_inch_jack())
    .then_some(other)
}
