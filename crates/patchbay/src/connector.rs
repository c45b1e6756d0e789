//! Connector codes, physical families, and the static lookup tables the
//! resolver dispatches on.
//!
//! Connector codes come in two flavours: canonical physical codes
//! (`trs_6_35`, `din_5`, ...) and the legacy friendly names older catalogs
//! use (`quarter_inch_trs`, `midi_din`, ...). Both resolve to the same
//! [`PhysicalConnector`] family. Codes with no mechanical adapter concept
//! (USB, CV, sync) resolve to no family at all and only ever match
//! themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every connector code a port may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Connector {
    #[serde(rename = "ts_6_35")]
    Ts635,
    #[serde(rename = "trs_6_35")]
    Trs635,
    #[serde(rename = "ts_3_5")]
    Ts35,
    #[serde(rename = "trs_3_5")]
    Trs35,
    #[serde(rename = "xlr_3")]
    Xlr3,
    #[serde(rename = "din_5")]
    Din5,
    #[serde(rename = "quarter_inch_ts")]
    QuarterInchTs,
    #[serde(rename = "quarter_inch_trs")]
    QuarterInchTrs,
    #[serde(rename = "eighth_inch_ts")]
    EighthInchTs,
    #[serde(rename = "eighth_inch_trs")]
    EighthInchTrs,
    #[serde(rename = "xlr")]
    Xlr,
    #[serde(rename = "xlr_trs_combo")]
    XlrTrsCombo,
    #[serde(rename = "midi_din")]
    MidiDin,
    #[serde(rename = "trs_midi")]
    TrsMidi,
    #[serde(rename = "usb_a")]
    UsbA,
    #[serde(rename = "usb_b")]
    UsbB,
    #[serde(rename = "usb_c")]
    UsbC,
    #[serde(rename = "usb_micro")]
    UsbMicro,
    #[serde(rename = "cv")]
    Cv,
    #[serde(rename = "sync")]
    Sync,
}

impl Connector {
    pub const ALL: [Connector; 20] = [
        Self::Ts635,
        Self::Trs635,
        Self::Ts35,
        Self::Trs35,
        Self::Xlr3,
        Self::Din5,
        Self::QuarterInchTs,
        Self::QuarterInchTrs,
        Self::EighthInchTs,
        Self::EighthInchTrs,
        Self::Xlr,
        Self::XlrTrsCombo,
        Self::MidiDin,
        Self::TrsMidi,
        Self::UsbA,
        Self::UsbB,
        Self::UsbC,
        Self::UsbMicro,
        Self::Cv,
        Self::Sync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ts635 => "ts_6_35",
            Self::Trs635 => "trs_6_35",
            Self::Ts35 => "ts_3_5",
            Self::Trs35 => "trs_3_5",
            Self::Xlr3 => "xlr_3",
            Self::Din5 => "din_5",
            Self::QuarterInchTs => "quarter_inch_ts",
            Self::QuarterInchTrs => "quarter_inch_trs",
            Self::EighthInchTs => "eighth_inch_ts",
            Self::EighthInchTrs => "eighth_inch_trs",
            Self::Xlr => "xlr",
            Self::XlrTrsCombo => "xlr_trs_combo",
            Self::MidiDin => "midi_din",
            Self::TrsMidi => "trs_midi",
            Self::UsbA => "usb_a",
            Self::UsbB => "usb_b",
            Self::UsbC => "usb_c",
            Self::UsbMicro => "usb_micro",
            Self::Cv => "cv",
            Self::Sync => "sync",
        }
    }

    /// Human-readable name used in cable descriptions and issue text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ts635 | Self::QuarterInchTs => "6.35 mm TS",
            Self::Trs635 | Self::QuarterInchTrs => "6.35 mm TRS",
            Self::Ts35 | Self::EighthInchTs => "3.5 mm TS",
            Self::Trs35 | Self::EighthInchTrs => "3.5 mm TRS",
            Self::Xlr3 | Self::Xlr => "XLR",
            Self::XlrTrsCombo => "XLR/TRS combo",
            Self::Din5 | Self::MidiDin => "DIN-5 MIDI",
            Self::TrsMidi => "TRS MIDI",
            Self::UsbA => "USB-A",
            Self::UsbB => "USB-B",
            Self::UsbC => "USB-C",
            Self::UsbMicro => "Micro-USB",
            Self::Cv => "CV patch",
            Self::Sync => "sync",
        }
    }

    /// Legacy friendly name to canonical family.
    ///
    /// Canonical codes are not legacy names and map to `None` here; use
    /// [`PhysicalConnector::from_canonical`] for those.
    pub fn legacy_family(&self) -> Option<PhysicalConnector> {
        match self {
            Self::QuarterInchTs => Some(PhysicalConnector::Ts635),
            Self::QuarterInchTrs => Some(PhysicalConnector::Trs635),
            Self::EighthInchTs => Some(PhysicalConnector::Ts35),
            Self::EighthInchTrs => Some(PhysicalConnector::Trs35),
            Self::Xlr | Self::XlrTrsCombo => Some(PhysicalConnector::Xlr3),
            Self::MidiDin => Some(PhysicalConnector::Din5),
            Self::TrsMidi => Some(PhysicalConnector::Trs35),
            Self::UsbA | Self::UsbB | Self::UsbC | Self::UsbMicro | Self::Cv | Self::Sync => None,
            Self::Ts635 | Self::Trs635 | Self::Ts35 | Self::Trs35 | Self::Xlr3 | Self::Din5 => None,
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Connector {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown connector: {}", s))
    }
}

/// The mechanical plug/jack class, independent of wiring intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhysicalConnector {
    #[serde(rename = "ts_6_35")]
    Ts635,
    #[serde(rename = "trs_6_35")]
    Trs635,
    #[serde(rename = "ts_3_5")]
    Ts35,
    #[serde(rename = "trs_3_5")]
    Trs35,
    #[serde(rename = "xlr_3")]
    Xlr3,
    #[serde(rename = "din_5")]
    Din5,
}

impl PhysicalConnector {
    pub fn from_canonical(connector: Connector) -> Option<Self> {
        match connector {
            Connector::Ts635 => Some(Self::Ts635),
            Connector::Trs635 => Some(Self::Trs635),
            Connector::Ts35 => Some(Self::Ts35),
            Connector::Trs35 => Some(Self::Trs35),
            Connector::Xlr3 => Some(Self::Xlr3),
            Connector::Din5 => Some(Self::Din5),
            _ => None,
        }
    }

    pub fn connector(&self) -> Connector {
        match self {
            Self::Ts635 => Connector::Ts635,
            Self::Trs635 => Connector::Trs635,
            Self::Ts35 => Connector::Ts35,
            Self::Trs35 => Connector::Trs35,
            Self::Xlr3 => Connector::Xlr3,
            Self::Din5 => Connector::Din5,
        }
    }

    pub fn is_quarter_inch_jack(&self) -> bool {
        matches!(self, Self::Ts635 | Self::Trs635)
    }

    /// If both families are phone jacks of the same size that differ only in
    /// contact count, the narrower (TS) family they share.
    pub fn shared_jack(a: Self, b: Self) -> Option<Self> {
        match (a, b) {
            (Self::Ts635, Self::Trs635) | (Self::Trs635, Self::Ts635) => Some(Self::Ts635),
            (Self::Ts35, Self::Trs35) | (Self::Trs35, Self::Ts35) => Some(Self::Ts35),
            _ => None,
        }
    }
}

impl fmt::Display for PhysicalConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.connector().as_str())
    }
}

pub const STEREO_BREAKOUT: &str = "stereo_breakout_3_5_to_dual_6_35";
pub const TS_3_5_TO_6_35: &str = "ts_3_5_to_6_35";
pub const TRS_6_35_TO_3_5: &str = "trs_6_35_to_3_5";
pub const XLR_TO_TRS_6_35: &str = "xlr_to_trs_6_35";
pub const XLR_TO_TS_6_35: &str = "xlr_to_ts_6_35";
pub const TRS_A_TO_DIN_5: &str = "trs_a_to_din_5";

/// Unordered family pairs that can be bridged, with the adapters to use.
const ADAPTER_MATRIX: &[(PhysicalConnector, PhysicalConnector, &[&str])] = &[
    (PhysicalConnector::Trs35, PhysicalConnector::Trs635, &[STEREO_BREAKOUT]),
    (PhysicalConnector::Trs35, PhysicalConnector::Ts635, &[STEREO_BREAKOUT]),
    (PhysicalConnector::Ts35, PhysicalConnector::Ts635, &[TS_3_5_TO_6_35]),
    (PhysicalConnector::Ts35, PhysicalConnector::Trs635, &[TS_3_5_TO_6_35]),
    (PhysicalConnector::Xlr3, PhysicalConnector::Trs635, &[XLR_TO_TRS_6_35]),
    (PhysicalConnector::Xlr3, PhysicalConnector::Ts635, &[XLR_TO_TS_6_35]),
    (PhysicalConnector::Xlr3, PhysicalConnector::Trs35, &[XLR_TO_TRS_6_35, TRS_6_35_TO_3_5]),
    (PhysicalConnector::Trs35, PhysicalConnector::Din5, &[TRS_A_TO_DIN_5]),
];

const ADAPTER_LABELS: &[(&str, &str)] = &[
    (STEREO_BREAKOUT, "3.5 mm TRS to dual 6.35 mm TS stereo breakout cable"),
    (TS_3_5_TO_6_35, "3.5 mm TS to 6.35 mm TS cable"),
    (TRS_6_35_TO_3_5, "6.35 mm to 3.5 mm TRS adapter"),
    (XLR_TO_TRS_6_35, "XLR to 6.35 mm TRS cable"),
    (XLR_TO_TS_6_35, "XLR to 6.35 mm TS cable"),
    (TRS_A_TO_DIN_5, "TRS-A to DIN-5 MIDI cable"),
];

/// Adapter chain bridging two families, in either order.
pub fn adapter_chain(a: PhysicalConnector, b: PhysicalConnector) -> Option<&'static [&'static str]> {
    ADAPTER_MATRIX
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, chain)| *chain)
}

/// Human-readable adapter name, or the raw code when none is registered.
pub fn adapter_label(code: &str) -> &str {
    ADAPTER_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Joins an adapter chain into the phrase used after "Use ...".
pub fn adapter_phrase<S: AsRef<str>>(codes: &[S]) -> String {
    codes
        .iter()
        .map(|c| adapter_label(c.as_ref()))
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_codes_round_trip_through_from_str() {
        for connector in Connector::ALL {
            assert_eq!(connector.as_str().parse::<Connector>().unwrap(), connector);
        }
        assert!("banana".parse::<Connector>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Connector::EighthInchTrs).unwrap();
        assert_eq!(json, "\"eighth_inch_trs\"");
        let back: Connector = serde_json::from_str("\"din_5\"").unwrap();
        assert_eq!(back, Connector::Din5);
    }

    #[test]
    fn test_legacy_and_canonical_agree() {
        assert_eq!(Connector::QuarterInchTrs.legacy_family(), PhysicalConnector::from_canonical(Connector::Trs635));
        assert_eq!(Connector::MidiDin.legacy_family(), Some(PhysicalConnector::Din5));
        assert_eq!(Connector::TrsMidi.legacy_family(), Some(PhysicalConnector::Trs35));
        assert_eq!(Connector::UsbB.legacy_family(), None);
        assert_eq!(Connector::Cv.legacy_family(), None);
    }

    #[test]
    fn test_every_family_round_trips_to_its_canonical_code() {
        for connector in Connector::ALL {
            if let Some(family) = PhysicalConnector::from_canonical(connector) {
                assert_eq!(family.connector(), connector);
            }
        }
    }

    #[test]
    fn test_adapter_matrix_is_symmetric() {
        assert_eq!(
            adapter_chain(PhysicalConnector::Din5, PhysicalConnector::Trs35),
            adapter_chain(PhysicalConnector::Trs35, PhysicalConnector::Din5)
        );
        assert!(adapter_chain(PhysicalConnector::Din5, PhysicalConnector::Xlr3).is_none());
    }

    #[test]
    fn test_adapter_labels_fall_back_to_code() {
        assert_eq!(adapter_label(TRS_A_TO_DIN_5), "TRS-A to DIN-5 MIDI cable");
        assert_eq!(adapter_label("mystery_dongle"), "mystery_dongle");
        assert_eq!(
            adapter_phrase(&[XLR_TO_TRS_6_35, TRS_6_35_TO_3_5]),
            "XLR to 6.35 mm TRS cable + 6.35 mm to 3.5 mm TRS adapter"
        );
    }

    #[test]
    fn test_shared_jack_prefers_ts() {
        assert_eq!(
            PhysicalConnector::shared_jack(PhysicalConnector::Trs635, PhysicalConnector::Ts635),
            Some(PhysicalConnector::Ts635)
        );
        assert_eq!(PhysicalConnector::shared_jack(PhysicalConnector::Ts35, PhysicalConnector::Trs635), None);
    }
}
