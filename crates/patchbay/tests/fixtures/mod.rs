#![allow(dead_code)]

use patchbay::{
    AudioWiring, Connection, Connector, Device, DeviceInstance, Direction, Port, PortReference,
    Signal,
};

pub fn volca_keys() -> Device {
    Device::new("volca-keys", "Volca Keys")
        .with_category("Synth")
        .with_port(
            Port::new("out", Direction::Out, Connector::EighthInchTrs, &[Signal::Audio])
                .with_name("Headphone Out")
                .with_wiring(AudioWiring::UnbalancedStereo),
        )
        .with_port(Port::new("midi_in", Direction::In, Connector::MidiDin, &[Signal::Midi]))
}

pub fn scarlett() -> Device {
    Device::new("scarlett-2i2", "Scarlett 2i2")
        .with_category("Audio Interface")
        .with_port(
            Port::new("input_1", Direction::In, Connector::QuarterInchTrs, &[Signal::Audio])
                .with_wiring(AudioWiring::BalancedMono),
        )
        .with_port(
            Port::new("input_2", Direction::In, Connector::QuarterInchTrs, &[Signal::Audio])
                .with_wiring(AudioWiring::BalancedMono),
        )
        .with_port(
            Port::new("main_out_l", Direction::Out, Connector::Trs635, &[Signal::Audio])
                .with_wiring(AudioWiring::BalancedMono),
        )
        .with_port(Port::new(
            "usb",
            Direction::InOut,
            Connector::UsbC,
            &[Signal::UsbAudio, Signal::UsbMidi],
        ))
}

pub fn keystep() -> Device {
    Device::new("keystep", "Keystep")
        .with_category("Controller")
        .with_port(Port::new("midi_out", Direction::Out, Connector::TrsMidi, &[Signal::Midi]))
        .with_port(Port::new("cv_out", Direction::Out, Connector::Cv, &[Signal::Cv]))
}

pub fn digitakt() -> Device {
    Device::new("digitakt", "Digitakt")
        .with_category("Drum Machine")
        .with_port(Port::new("midi_in", Direction::In, Connector::Din5, &[Signal::Midi]))
        .with_port(Port::new("midi_out", Direction::Out, Connector::Din5, &[Signal::Midi]))
        .with_port(
            Port::new("main_out", Direction::Out, Connector::Trs635, &[Signal::Audio])
                .with_wiring(AudioWiring::BalancedMono),
        )
}

pub fn minilogue() -> Device {
    Device::new("minilogue", "Minilogue")
        .with_category("Synth")
        .with_port(Port::new("midi_in", Direction::In, Connector::MidiDin, &[Signal::Midi]))
        .with_port(Port::new("audio_in", Direction::In, Connector::QuarterInchTs, &[Signal::Audio]))
        .with_port(Port::new("out", Direction::Out, Connector::QuarterInchTs, &[Signal::Audio]))
}

pub fn midi_thru() -> Device {
    Device::new("midi-thru", "MIDI Thru")
        .with_category("Utility")
        .with_port(Port::new("in", Direction::In, Connector::Din5, &[Signal::Midi]))
        .with_port(Port::new("thru", Direction::Out, Connector::Din5, &[Signal::Midi]))
}

pub fn monitor() -> Device {
    Device::new("hs5", "HS5")
        .with_category("Studio Monitor")
        .with_port(
            Port::new("input", Direction::In, Connector::XlrTrsCombo, &[Signal::Audio])
                .with_wiring(AudioWiring::BalancedMono),
        )
}

/// A small rig assembled in test code: placed instances plus the links
/// declared between them.
#[derive(Default)]
pub struct TestRig {
    pub instances: Vec<DeviceInstance>,
    pub connections: Vec<Connection>,
}

impl TestRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, id: &str, device: Device) -> Self {
        self.instances.push(DeviceInstance::new(id, device));
        self
    }

    pub fn link(mut self, from: (&str, &str), to: (&str, &str)) -> Self {
        let id = format!("c{}", self.connections.len() + 1);
        let connection = Connection::pending(id, self.reference(from), self.reference(to));
        self.connections.push(connection);
        self
    }

    fn reference(&self, (instance, port): (&str, &str)) -> PortReference {
        let instance = self
            .instances
            .iter()
            .find(|i| i.id.0 == instance)
            .unwrap_or_else(|| panic!("no instance {} in rig", instance));
        let port = instance
            .device
            .port(port)
            .unwrap_or_else(|| panic!("no port {} on {}", port, instance.id));
        PortReference::new(instance, port)
    }
}
